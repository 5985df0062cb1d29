pub mod auth;
pub mod cookie;
pub mod entries;
pub mod error;
pub mod middleware;

pub use auth::{AppState, AppStateInner};
pub use error::ApiError;
