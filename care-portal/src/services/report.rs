//! Medical report simplification.

use super::providers::{GenerationParams, ProviderError, TextProvider};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

const REPORT_INSTRUCTION: &str = "You explain medical reports to patients. \
Summarize the report below in simple, non-technical language: what was \
tested, which values are outside the normal range, and what that generally \
means. Do not diagnose. End by suggesting the patient discuss the results \
with their doctor.";

/// Pasted report text.
#[derive(Debug, Deserialize, Validate)]
pub struct ReportRequest {
    #[validate(length(min = 1, max = 20000, message = "Report must be 1-20000 characters"))]
    pub report: String,
}

pub struct ReportAnalyzer {
    provider: Arc<dyn TextProvider>,
    params: GenerationParams,
}

impl ReportAnalyzer {
    pub fn new(provider: Arc<dyn TextProvider>) -> Self {
        Self {
            provider,
            params: GenerationParams {
                system_instruction: Some(REPORT_INSTRUCTION.to_string()),
                temperature: Some(0.2),
                max_tokens: Some(2048),
            },
        }
    }

    /// Produce a plain-language summary of `report`.
    pub async fn analyze(&self, report: &str) -> Result<String, ProviderError> {
        let response = self.provider.generate(report.trim(), &self.params).await?;

        tracing::info!(
            report_len = report.len(),
            output_tokens = response.output_tokens,
            "Report summarized"
        );

        Ok(response.text)
    }
}
