//! Page keys passed through the navigation boundary.
//!
//! Pages never route themselves; they hand a [`PageKey`] to `/navigate/:key`
//! and the shell resolves it to a path.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageKey {
    Home,
    BasicHealth,
    ReportAnalyzer,
    Chatbot,
    FindFacilities,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown page: {0}")]
pub struct UnknownPage(pub String);

/// A dashboard card pointing at one feature page.
#[derive(Debug, Clone, Copy)]
pub struct FeatureCard {
    pub key: PageKey,
    pub title: &'static str,
    pub description: &'static str,
}

impl PageKey {
    /// Dashboard cards, in display order.
    pub const FEATURES: [FeatureCard; 4] = [
        FeatureCard {
            key: PageKey::BasicHealth,
            title: "Basic Healthcare",
            description: "Enter your age, weight, and height to get generalized health advice and calculate your BMI.",
        },
        FeatureCard {
            key: PageKey::ReportAnalyzer,
            title: "AI Report Analyzer",
            description: "Paste your medical report text here to get a simplified, easy-to-understand summary.",
        },
        FeatureCard {
            key: PageKey::Chatbot,
            title: "AI Healthcare Chatbot",
            description: "Have a health question? Chat with our AI to get information and guidance.",
        },
        FeatureCard {
            key: PageKey::FindFacilities,
            title: "Find Facilities Near You",
            description: "Locate nearby hospitals, clinics, and pharmacies based on your current location.",
        },
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PageKey::Home => "home",
            PageKey::BasicHealth => "basicHealth",
            PageKey::ReportAnalyzer => "reportAnalyzer",
            PageKey::Chatbot => "chatbot",
            PageKey::FindFacilities => "findFacilities",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            PageKey::Home => "/",
            PageKey::BasicHealth => "/basic-health",
            PageKey::ReportAnalyzer => "/report-analyzer",
            PageKey::Chatbot => "/chatbot",
            PageKey::FindFacilities => "/find-facilities",
        }
    }

    /// Link that goes through the navigation boundary.
    pub fn href(&self) -> String {
        format!("/navigate/{}", self.as_str())
    }
}

impl FromStr for PageKey {
    type Err = UnknownPage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(PageKey::Home),
            "basicHealth" => Ok(PageKey::BasicHealth),
            "reportAnalyzer" => Ok(PageKey::ReportAnalyzer),
            "chatbot" => Ok(PageKey::Chatbot),
            "findFacilities" => Ok(PageKey::FindFacilities),
            other => Err(UnknownPage(other.to_string())),
        }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
