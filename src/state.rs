use std::sync::Arc;

use crate::{
    auth::{StaticTokenValidator, TokenValidator},
    config::Config,
    store::NfsStore,
};

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<NfsStore>,
    pub tokens: Arc<dyn TokenValidator>,
}

impl AppState {
    /// State with an empty store and the tokens listed in `config`
    pub fn new(config: Config) -> Self {
        let tokens = StaticTokenValidator::from_config(&config.tokens);
        Self::with_validator(config, tokens)
    }

    pub fn with_validator(config: Config, tokens: impl TokenValidator + 'static) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(NfsStore::new()),
            tokens: Arc::new(tokens),
        }
    }
}
