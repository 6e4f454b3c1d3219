//! HTTP handlers for the care portal.
//!
//! Pages are askama templates; the `/api` routes are JSON endpoints used by
//! the pages' scripts.

pub mod app;
pub mod basic_health;
pub mod chatbot;
pub mod facilities;
pub mod metrics;
pub mod report;

use crate::services::PortalSession;
use crate::AppState;
use serde::Serialize;
use service_core::error::AppError;
use std::sync::Arc;
use tower_sessions::Session;
use uuid::Uuid;

/// Session key holding the visitor's portal session id.
pub const SESSION_KEY: &str = "portal_session_id";

/// Resolve (or start) the visitor's [`PortalSession`] from the cookie session.
pub async fn portal_session(
    state: &AppState,
    session: &Session,
) -> Result<Arc<PortalSession>, AppError> {
    let existing: Option<Uuid> = session
        .get(SESSION_KEY)
        .await
        .map_err(|e| AppError::InternalError(anyhow::Error::new(e)))?;

    let portal = state.registry.get_or_create(existing);

    if existing != Some(portal.id) {
        session
            .insert(SESSION_KEY, portal.id)
            .await
            .map_err(|e| AppError::InternalError(anyhow::Error::new(e)))?;
    }

    Ok(portal)
}

/// Serialize a value for embedding inside an inline `<script>` block.
pub fn script_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    let json = serde_json::to_string(value).map_err(|e| AppError::InternalError(e.into()))?;
    Ok(json.replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_json_cannot_close_the_script_tag() {
        let json = script_json(&serde_json::json!({ "name": "</script><b>" })).unwrap();
        assert!(!json.contains("</script>"));
        assert!(json.contains("<\\/script>"));
    }
}
