//! Entity store on SQLite.
//!
//! - `schema`: connection and table management
//! - `queries`: upsert/get/all by key
//! - `models`: report-layer views
//! - `analysis`: queries that resolve references between entities

pub mod analysis;
pub mod models;
pub mod queries;
pub mod schema;


pub use models::*;
pub use schema::EntityStore;
