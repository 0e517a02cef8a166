//! Test data factory
//!
//! Builds valid, randomized domain entities. Nothing here touches the network.
//! Identifiers come from a process-wide counter seeded from the wall clock, so
//! two entities created in the same run never share an id or username.

use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use petstore_api_client::models::{Category, Order, OrderStatus, Pet, PetStatus, Tag, User};
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const ANIMAL_NAMES: &[&str] = &[
    "Rex", "Bella", "Milo", "Luna", "Charlie", "Daisy", "Max", "Nala", "Oscar", "Coco", "Simba",
    "Pepper", "Ziggy", "Biscuit", "Hazel",
];

const DEPARTMENTS: &[&str] = &[
    "Dogs", "Cats", "Birds", "Fish", "Reptiles", "Rodents", "Outdoors", "Toys", "Grocery",
];

const WORDS: &[&str] = &[
    "fluffy", "playful", "calm", "vaccinated", "trained", "young", "senior", "rescue", "spotted",
    "striped",
];

const FIRST_NAMES: &[&str] = &[
    "John", "Jane", "Alex", "Sam", "Maria", "Wei", "Aisha", "Pedro", "Olga", "Kenji",
];

const LAST_NAMES: &[&str] = &[
    "Doe", "Smith", "Garcia", "Chen", "Okafor", "Silva", "Ivanova", "Tanaka", "Novak", "Khan",
];

/// Photo URL used by [`minimal_pet`]
pub const PLACEHOLDER_PHOTO: &str = "http://example.com/photo.jpg";

/// Ship date format the Petstore emits, e.g. `2024-12-31T00:00:00.000+0000`
const SHIP_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

static NEXT_ID: Lazy<AtomicI64> = Lazy::new(|| {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX / 2))
        .unwrap_or(1);
    AtomicI64::new(millis)
});

/// Next identifier, unique within this process
pub fn unique_id() -> i64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

fn pick(words: &[&'static str]) -> &'static str {
    words.choose(&mut rand::thread_rng()).copied().unwrap_or("x")
}

/// Pet with every field populated, status `available`
pub fn random_pet() -> Pet {
    let id = unique_id();
    Pet {
        id: Some(id),
        category: Some(random_category()),
        name: pick(ANIMAL_NAMES).to_string(),
        photo_urls: vec![format!("https://images.example.com/pets/{id}.jpg")],
        tags: vec![random_tag()],
        status: Some(PetStatus::Available),
    }
}

/// [`random_pet`] with the given status
pub fn pet_with_status(status: PetStatus) -> Pet {
    Pet {
        status: Some(status),
        ..random_pet()
    }
}

/// Pet with only the required fields: id, name and one photo URL
pub fn minimal_pet() -> Pet {
    Pet {
        id: Some(unique_id()),
        category: None,
        name: pick(ANIMAL_NAMES).to_string(),
        photo_urls: vec![PLACEHOLDER_PHOTO.to_string()],
        tags: Vec::new(),
        status: None,
    }
}

pub fn random_category() -> Category {
    Category {
        id: Some(rand::thread_rng().gen_range(1..100)),
        name: Some(pick(DEPARTMENTS).to_string()),
    }
}

pub fn random_tag() -> Tag {
    Tag {
        id: Some(rand::thread_rng().gen_range(1..100)),
        name: Some(pick(WORDS).to_string()),
    }
}

/// Placed, complete order for a random pet, shipping within a month
pub fn random_order() -> Order {
    let mut rng = rand::thread_rng();
    let ship_date = Utc::now() + Duration::days(rng.gen_range(1..30));
    Order {
        id: Some(unique_id()),
        pet_id: Some(rng.gen_range(1..1000)),
        quantity: Some(rng.gen_range(1..10)),
        ship_date: Some(ship_date.format(SHIP_DATE_FORMAT).to_string()),
        status: Some(OrderStatus::Placed),
        complete: true,
    }
}

/// [`random_order`] for an existing pet
pub fn order_for_pet(pet_id: i64) -> Order {
    Order {
        pet_id: Some(pet_id),
        ..random_order()
    }
}

/// User with every field populated and a unique username
pub fn random_user() -> User {
    let id = unique_id();
    let first = pick(FIRST_NAMES);
    let last = pick(LAST_NAMES);
    let username = format!("{}{id}", pick(WORDS));
    let password: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();

    User {
        id: Some(id),
        email: Some(format!(
            "{}.{}.{id}@example.com",
            first.to_lowercase(),
            last.to_lowercase()
        )),
        username,
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        password: Some(password),
        phone: Some(format!("555-{:04}", rand::thread_rng().gen_range(0..10_000))),
        user_status: Some(1),
    }
}

/// [`random_user`] with a fixed username
pub fn user_with_username(username: impl Into<String>) -> User {
    User {
        username: username.into(),
        ..random_user()
    }
}
