// src/state.rs
use std::sync::Arc;

use crate::config::Config;
use crate::services::gemini::{ChatModel, GeminiClient};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    /// `None` when no API key is configured; the endpoint then answers with
    /// the configuration fallback instead of calling out.
    pub model: Option<Arc<dyn ChatModel>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let model = config.api_key.as_ref().map(|key| {
            Arc::new(GeminiClient::new(key.clone(), &config)) as Arc<dyn ChatModel>
        });
        Self { config, model }
    }

    /// State with an externally supplied model, used by tests to plug in a
    /// stub client.
    pub fn with_model(config: Config, model: Arc<dyn ChatModel>) -> Self {
        Self {
            config,
            model: Some(model),
        }
    }
}
