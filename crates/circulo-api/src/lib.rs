pub mod auth;
pub mod credentials;
pub mod error;
pub mod extract;
pub mod follows;
pub mod guard;
pub mod middleware;
pub mod routes;
pub mod token;
pub mod users;
pub mod validation;

pub use auth::{AppState, AppStateInner};
pub use routes::router;
