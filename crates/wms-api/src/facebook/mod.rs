//! Facebook page integration.
//!
//! Pages managed by the configured user token are pulled from the Graph API
//! together with their conversations and post comments, and stored locally so
//! staff can browse customer conversations next to the rest of the data.

pub mod client;
pub mod model;
pub mod routes;
pub mod sync;

pub use client::{GraphClient, GraphError};
pub use routes::routes;
