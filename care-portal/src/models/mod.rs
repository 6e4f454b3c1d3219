pub mod chat;
pub mod facility;
pub mod geo;
pub mod navigation;

pub use chat::{ChatMessage, Sender};
pub use facility::{FacilityCategory, FacilityResult, FACILITY_CATEGORIES};
pub use geo::{Coordinate, InvalidCoordinate, DEFAULT_CENTER};
pub use navigation::PageKey;
