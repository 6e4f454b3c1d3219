use crate::models::navigation::PageKey;
use crate::services::report::ReportRequest;
use crate::AppState;
use askama::Template;
use axum::{extract::State, Json};
use serde::Serialize;
use service_core::error::AppError;
use validator::Validate;

#[derive(Template)]
#[template(path = "report.html")]
pub struct ReportTemplate {
    pub back_href: String,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub summary: String,
}

pub async fn report_page() -> ReportTemplate {
    ReportTemplate {
        back_href: PageKey::Home.href(),
    }
}

pub async fn analyze_report(
    State(state): State<AppState>,
    Json(payload): Json<ReportRequest>,
) -> Result<Json<ReportResponse>, AppError> {
    payload.validate()?;
    if payload.report.trim().is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Please paste the text of your report"
        )));
    }

    let summary = state.reports.analyze(&payload.report).await.map_err(|e| {
        tracing::warn!(error = %e, "Report analysis failed");
        AppError::BadGateway("the report could not be analyzed, please try again later".into())
    })?;

    Ok(Json(ReportResponse { summary }))
}
