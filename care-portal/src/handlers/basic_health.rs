use crate::models::navigation::PageKey;
use crate::services::health::{assess, BasicHealthInput, BmiReport};
use askama::Template;
use axum::Form;
use validator::{Validate, ValidationErrors};

#[derive(Template)]
#[template(path = "basic_health.html")]
pub struct BasicHealthTemplate {
    pub back_href: String,
    pub report: Option<BmiReport>,
    pub errors: Vec<String>,
}

impl BasicHealthTemplate {
    fn new(report: Option<BmiReport>, errors: Vec<String>) -> Self {
        Self {
            back_href: PageKey::Home.href(),
            report,
            errors,
        }
    }
}

pub async fn basic_health_page() -> BasicHealthTemplate {
    BasicHealthTemplate::new(None, Vec::new())
}

pub async fn basic_health_submit(Form(input): Form<BasicHealthInput>) -> BasicHealthTemplate {
    match input.validate() {
        Ok(()) => BasicHealthTemplate::new(Some(assess(&input)), Vec::new()),
        Err(errors) => BasicHealthTemplate::new(None, error_messages(&errors)),
    }
}

fn error_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field))
            })
        })
        .collect();
    messages.sort();
    messages
}
