//! Shared fixtures for the functional suites
//!
//! By default the suites talk to [`FakePetstore`], a stateful in-process stand-in
//! for the Swagger Petstore built on wiremock. With `--features live` they use
//! the environment selected by `PETSTORE_ENV` instead.

#![allow(dead_code)]

use petstore_api_client::{Config, ConfigProvider};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Once};
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Match, Mock, MockServer, Request, Respond, ResponseTemplate};

pub const API_KEY: &str = "special-key";

static LOGGING: Once = Once::new();

/// Install the log subscriber once per test binary
pub fn init_logging() {
    LOGGING.call_once(|| {
        let _ = petstore_telemetry::init();
    });
}

/// Where a suite sends its requests
pub struct Target {
    /// Kept alive for the duration of the test; `None` when running live
    pub fake: Option<FakePetstore>,
    pub provider: ConfigProvider,
}

pub async fn target() -> Target {
    init_logging();
    if cfg!(feature = "live") {
        Target {
            fake: None,
            provider: ConfigProvider::from_env(),
        }
    } else {
        let fake = FakePetstore::start().await;
        let provider = fake.provider();
        Target {
            fake: Some(fake),
            provider,
        }
    }
}

#[derive(Default)]
struct State {
    pets: BTreeMap<i64, Value>,
    orders: BTreeMap<i64, Value>,
    users: BTreeMap<String, Value>,
}

type Shared = Arc<Mutex<State>>;

/// In-memory Petstore answering on `<server>/v2`
///
/// Requests without `api_key: special-key` match no mock and get wiremock's
/// default 404.
pub struct FakePetstore {
    pub server: MockServer,
    state: Shared,
}

impl FakePetstore {
    pub async fn start() -> Self {
        let fake = Self {
            server: MockServer::start().await,
            state: Shared::default(),
        };
        fake.mount_pets().await;
        fake.mount_store().await;
        fake.mount_users().await;
        fake
    }

    pub fn base_url(&self) -> String {
        format!("{}/v2", self.server.uri())
    }

    pub fn provider(&self) -> ConfigProvider {
        ConfigProvider::from(Config::new(self.base_url(), API_KEY).with_environment("fake"))
    }

    pub fn has_pet(&self, id: i64) -> bool {
        self.state.lock().unwrap().pets.contains_key(&id)
    }

    pub fn has_order(&self, id: i64) -> bool {
        self.state.lock().unwrap().orders.contains_key(&id)
    }

    pub fn has_user(&self, username: &str) -> bool {
        self.state.lock().unwrap().users.contains_key(username)
    }

    async fn mount<R: Respond + 'static>(
        &self,
        verb: &str,
        route: impl Match + 'static,
        priority: u8,
        responder: R,
    ) {
        Mock::given(method(verb))
            .and(route)
            .and(header("api_key", API_KEY))
            .respond_with(responder)
            .with_priority(priority)
            .mount(&self.server)
            .await;
    }

    async fn mount_pets(&self) {
        let state = self.state.clone();
        self.mount("POST", path("/v2/pet"), 5, move |req: &Request| {
            upsert_pet(&state, req)
        })
        .await;

        let state = self.state.clone();
        self.mount("PUT", path("/v2/pet"), 5, move |req: &Request| {
            upsert_pet(&state, req)
        })
        .await;

        let state = self.state.clone();
        self.mount(
            "GET",
            path("/v2/pet/findByStatus"),
            1,
            move |req: &Request| {
                let wanted = query(req, "status").unwrap_or_default();
                let pets: Vec<Value> = state
                    .lock()
                    .unwrap()
                    .pets
                    .values()
                    .filter(|pet| pet["status"] == wanted.as_str())
                    .cloned()
                    .collect();
                ResponseTemplate::new(200).set_body_json(pets)
            },
        )
        .await;

        let state = self.state.clone();
        self.mount("GET", path_regex(r"^/v2/pet/-?\d+$"), 5, move |req: &Request| {
            match numeric_id(req).and_then(|id| state.lock().unwrap().pets.get(&id).cloned()) {
                Some(pet) => ResponseTemplate::new(200).set_body_json(pet),
                None => not_found("Pet not found"),
            }
        })
        .await;

        let state = self.state.clone();
        self.mount("DELETE", path_regex(r"^/v2/pet/-?\d+$"), 5, move |req: &Request| {
            match numeric_id(req).filter(|id| state.lock().unwrap().pets.remove(id).is_some()) {
                Some(id) => ResponseTemplate::new(200).set_body_json(message(200, id)),
                None => ResponseTemplate::new(404),
            }
        })
        .await;
    }

    async fn mount_store(&self) {
        let state = self.state.clone();
        self.mount("POST", path("/v2/store/order"), 5, move |req: &Request| {
            let Some(mut order) = json_body(req) else {
                return ResponseTemplate::new(400).set_body_json(message(400, "Invalid Order"));
            };
            let mut state = state.lock().unwrap();
            let id = order["id"]
                .as_i64()
                .unwrap_or_else(|| next_key(&state.orders));
            order["id"] = json!(id);
            state.orders.insert(id, order.clone());
            ResponseTemplate::new(200).set_body_json(order)
        })
        .await;

        let state = self.state.clone();
        self.mount("GET", path("/v2/store/inventory"), 1, move |_: &Request| {
            let mut counts: BTreeMap<String, i64> = BTreeMap::new();
            for pet in state.lock().unwrap().pets.values() {
                if let Some(status) = pet["status"].as_str() {
                    *counts.entry(status.to_string()).or_default() += 1;
                }
            }
            counts.entry("available".to_string()).or_default();
            ResponseTemplate::new(200).set_body_json(counts)
        })
        .await;

        let state = self.state.clone();
        self.mount(
            "GET",
            path_regex(r"^/v2/store/order/-?\d+$"),
            5,
            move |req: &Request| {
                match numeric_id(req).and_then(|id| state.lock().unwrap().orders.get(&id).cloned())
                {
                    Some(order) => ResponseTemplate::new(200).set_body_json(order),
                    None => not_found("Order not found"),
                }
            },
        )
        .await;

        let state = self.state.clone();
        self.mount(
            "DELETE",
            path_regex(r"^/v2/store/order/-?\d+$"),
            5,
            move |req: &Request| {
                match numeric_id(req)
                    .filter(|id| state.lock().unwrap().orders.remove(id).is_some())
                {
                    Some(id) => ResponseTemplate::new(200).set_body_json(message(200, id)),
                    None => ResponseTemplate::new(404)
                        .set_body_json(message(404, "Order Not Found")),
                }
            },
        )
        .await;
    }

    async fn mount_users(&self) {
        self.mount("GET", path("/v2/user/login"), 1, move |req: &Request| {
            if query(req, "username").is_none() {
                return ResponseTemplate::new(400)
                    .set_body_json(message(400, "Invalid username/password supplied"));
            }
            ResponseTemplate::new(200)
                .set_body_json(message(200, "logged in user session:1700000000000"))
        })
        .await;

        self.mount("GET", path("/v2/user/logout"), 1, move |_: &Request| {
            ResponseTemplate::new(200).set_body_json(message(200, "ok"))
        })
        .await;

        let state = self.state.clone();
        self.mount("POST", path("/v2/user"), 5, move |req: &Request| {
            let Some(user) = json_body(req) else {
                return ResponseTemplate::new(400).set_body_json(message(400, "bad input"));
            };
            let Some(username) = user["username"].as_str().map(str::to_string) else {
                return ResponseTemplate::new(400).set_body_json(message(400, "no username"));
            };
            let id = user["id"].as_i64().unwrap_or_default();
            state.lock().unwrap().users.insert(username, user);
            ResponseTemplate::new(200).set_body_json(message(200, id))
        })
        .await;

        let state = self.state.clone();
        self.mount("GET", path_regex(r"^/v2/user/[^/]+$"), 5, move |req: &Request| {
            match state.lock().unwrap().users.get(&last_segment(req)) {
                Some(user) => ResponseTemplate::new(200).set_body_json(user),
                None => not_found("User not found"),
            }
        })
        .await;

        let state = self.state.clone();
        self.mount("PUT", path_regex(r"^/v2/user/[^/]+$"), 5, move |req: &Request| {
            let Some(user) = json_body(req) else {
                return ResponseTemplate::new(400).set_body_json(message(400, "bad input"));
            };
            let id = user["id"].as_i64().unwrap_or_default();
            let mut state = state.lock().unwrap();
            state.users.remove(&last_segment(req));
            if let Some(username) = user["username"].as_str() {
                state.users.insert(username.to_string(), user.clone());
            }
            ResponseTemplate::new(200).set_body_json(message(200, id))
        })
        .await;

        let state = self.state.clone();
        self.mount(
            "DELETE",
            path_regex(r"^/v2/user/[^/]+$"),
            5,
            move |req: &Request| {
                let username = last_segment(req);
                if state.lock().unwrap().users.remove(&username).is_some() {
                    ResponseTemplate::new(200).set_body_json(message(200, username))
                } else {
                    ResponseTemplate::new(404)
                }
            },
        )
        .await;
    }
}

fn upsert_pet(state: &Shared, req: &Request) -> ResponseTemplate {
    let Some(mut pet) = json_body(req) else {
        return ResponseTemplate::new(405).set_body_json(message(405, "Invalid input"));
    };
    let mut state = state.lock().unwrap();
    let id = pet["id"].as_i64().unwrap_or_else(|| next_key(&state.pets));
    pet["id"] = json!(id);
    state.pets.insert(id, pet.clone());
    ResponseTemplate::new(200).set_body_json(pet)
}

fn json_body(req: &Request) -> Option<Value> {
    serde_json::from_slice(&req.body).ok()
}

fn query(req: &Request, name: &str) -> Option<String> {
    req.url
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

fn last_segment(req: &Request) -> String {
    req.url
        .path_segments()
        .and_then(Iterator::last)
        .unwrap_or_default()
        .to_string()
}

fn numeric_id(req: &Request) -> Option<i64> {
    last_segment(req).parse().ok()
}

fn next_key(map: &BTreeMap<i64, Value>) -> i64 {
    map.keys().next_back().map_or(1, |last| last + 1)
}

fn message(code: u16, text: impl ToString) -> Value {
    json!({"code": code, "type": "unknown", "message": text.to_string()})
}

fn not_found(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({"code": 1, "type": "error", "message": text}))
}
