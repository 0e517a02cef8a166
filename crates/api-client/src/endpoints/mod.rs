//! Endpoint-specific API implementations
//!
//! Each module wraps one resource of the Petstore API. Operations return the
//! raw [`ApiResponse`](crate::exchange::ApiResponse) so callers can assert on
//! status codes before decoding bodies.
//!
//! | Module | Resource | Description |
//! |--------|----------|-------------|
//! | `pet` | `/pet` | Pet CRUD and lookup by status |
//! | `store` | `/store` | Orders and inventory |
//! | `user` | `/user` | User CRUD, login and logout |

pub mod pet;
pub mod store;
pub mod user;

pub use pet::PetApi;
pub use store::StoreApi;
pub use user::UserApi;
