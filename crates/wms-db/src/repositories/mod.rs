// All repository functions are generic over `E: Executor<'e, Database = Postgres>`
// so they accept both a `&PgPool` (direct query) and a `&mut Transaction` (atomic operations).

pub mod activity_log;
pub mod auth;
pub mod customer;
pub mod customer_group;
pub mod facebook;
pub mod inventory;
pub mod invoice;
pub mod product;
pub mod role;
pub mod user;
pub mod warehouse;
