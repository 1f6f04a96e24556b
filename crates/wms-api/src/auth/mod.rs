pub mod cookies;
pub mod guard;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod refresh_token;
pub mod routes;
pub mod service;

pub use guard::{Authorized, Permission, PermissionGuard};
pub use middleware::AuthUser;
pub use routes::routes;
