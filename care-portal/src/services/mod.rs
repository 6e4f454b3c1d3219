pub mod chat;
pub mod health;
pub mod metrics;
pub mod providers;
pub mod report;
pub mod sessions;

pub use chat::{ChatService, ChatTranscript};
pub use report::ReportAnalyzer;
pub use sessions::{PortalSession, SessionRegistry};
