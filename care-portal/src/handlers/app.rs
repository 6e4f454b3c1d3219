use crate::models::navigation::PageKey;
use askama::Template;
use axum::{
    extract::Path,
    response::{IntoResponse, Redirect},
    Json,
};
use serde_json::json;
use service_core::error::AppError;

pub struct CardView {
    pub title: &'static str,
    pub description: &'static str,
    pub href: String,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub cards: Vec<CardView>,
}

pub async fn index() -> impl IntoResponse {
    HomeTemplate {
        cards: PageKey::FEATURES
            .iter()
            .map(|card| CardView {
                title: card.title,
                description: card.description,
                href: card.key.href(),
            })
            .collect(),
    }
}

/// Navigation boundary: pages hand over a page key, the shell picks the route.
pub async fn navigate(Path(page_key): Path<String>) -> Result<Redirect, AppError> {
    let key: PageKey = page_key
        .parse()
        .map_err(|e| AppError::NotFound(anyhow::Error::new(e)))?;
    Ok(Redirect::to(key.path()))
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "care-portal",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
