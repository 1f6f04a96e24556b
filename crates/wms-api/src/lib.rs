pub mod activity_log;
pub mod auth;
pub mod config;
pub mod customer;
pub mod customer_group;
pub mod error;
pub mod export;
pub mod facebook;
pub mod inventory;
pub mod invoice;
pub mod jobs;
pub mod metrics;
pub mod middleware;
pub mod normalization;
pub mod pagination;
pub mod product;
pub mod role;
pub mod router;
pub mod state;
pub mod tracing;
pub mod user;
pub mod validation;
pub mod warehouse;

pub use config::ApiConfig;
pub use state::{ApiState, AuthConfig};
