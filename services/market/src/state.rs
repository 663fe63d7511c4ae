//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    middleware::JwtVerifier,
    repositories::{ProductStore, UserStore},
    storage::PhotoStore,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub user_store: Arc<dyn UserStore>,
    pub product_store: Arc<dyn ProductStore>,
    pub photo_store: Arc<dyn PhotoStore>,
    pub jwt_verifier: JwtVerifier,
}
