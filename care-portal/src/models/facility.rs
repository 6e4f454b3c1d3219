use super::geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Place categories the locator searches for, in query order.
pub const FACILITY_CATEGORIES: [FacilityCategory; 3] = [
    FacilityCategory::Hospital,
    FacilityCategory::Pharmacy,
    FacilityCategory::Doctor,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilityCategory {
    Hospital,
    Pharmacy,
    Doctor,
}

impl FacilityCategory {
    /// Places API place type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FacilityCategory::Hospital => "hospital",
            FacilityCategory::Pharmacy => "pharmacy",
            FacilityCategory::Doctor => "doctor",
        }
    }
}

impl fmt::Display for FacilityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One nearby facility as returned by the places service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityResult {
    pub name: String,
    pub location: Coordinate,
    pub category: FacilityCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vicinity: Option<String>,
}

impl FacilityResult {
    pub fn new(name: impl Into<String>, location: Coordinate, category: FacilityCategory) -> Self {
        Self {
            name: name.into(),
            location,
            category,
            place_id: None,
            vicinity: None,
        }
    }
}
