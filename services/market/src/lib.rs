//! Product listing service for the second-hand market
//!
//! Exposes product upload, product detail and product state changes over
//! HTTP. Users and products live in PostgreSQL, photos in S3.

pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod settings;
pub mod state;
pub mod storage;

pub use routes::create_router;
pub use state::AppState;
