pub mod config;
pub mod facilities;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use facilities::MapRenderer;
use services::{ChatService, ReportAnalyzer, SessionRegistry};
use std::sync::Arc;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub chat: Arc<ChatService>,
    pub reports: Arc<ReportAnalyzer>,
    pub renderer: Arc<MapRenderer>,
}

impl AppState {
    pub fn new(
        registry: Arc<SessionRegistry>,
        chat: Arc<ChatService>,
        reports: Arc<ReportAnalyzer>,
        renderer: Arc<MapRenderer>,
    ) -> Self {
        Self {
            registry,
            chat,
            reports,
            renderer,
        }
    }
}
