use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::token::TokenService;

/// Per-process dependencies handed to every handler and service.
#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub tokens: Arc<TokenService>,
    /// Merge repeated cart adds for the same product into one row.
    pub cart_merge_on_add: bool,
}

impl AppState {
    pub fn new(orm: DatabaseConnection, tokens: TokenService) -> Self {
        Self {
            orm,
            tokens: Arc::new(tokens),
            cart_merge_on_add: false,
        }
    }

    pub fn with_cart_merge_on_add(mut self, enabled: bool) -> Self {
        self.cart_merge_on_add = enabled;
        self
    }
}
