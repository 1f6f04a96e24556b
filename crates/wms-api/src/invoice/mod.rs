pub mod model;
pub mod print;
pub mod routes;
pub mod service;

pub use routes::routes;
