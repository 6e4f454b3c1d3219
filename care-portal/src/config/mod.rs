use crate::facilities::map::MapSettings;
use crate::models::geo::Coordinate;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::error::AppError;
use std::time::Duration;

/// Workspace member name, used to locate `config/base.yaml`.
pub const MEMBER_NAME: &str = "care-portal";

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub maps: MapsSettings,
    pub genai: GenaiSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Mark the session cookie `Secure`; enable behind HTTPS.
    #[serde(default)]
    pub secure_cookies: bool,
    /// Idle time after which a visitor's session (chat transcript, search
    /// state) is dropped.
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: u64,
}

fn default_session_idle_minutes() -> u64 {
    24 * 60
}

#[derive(Deserialize, Clone)]
pub struct MapsSettings {
    /// Google Maps Platform key, shared by the browser map script and the
    /// Places web service.
    pub api_key: Secret<String>,
    #[serde(default = "default_places_base_url")]
    pub places_base_url: String,
    #[serde(default = "default_latitude")]
    pub default_latitude: f64,
    #[serde(default = "default_longitude")]
    pub default_longitude: f64,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    #[serde(default = "default_search_zoom")]
    pub search_zoom: u8,
    #[serde(default = "default_radius_meters")]
    pub radius_meters: u32,
    #[serde(default = "default_locate_timeout_secs")]
    pub locate_timeout_secs: u64,
}

fn default_places_base_url() -> String {
    "https://maps.googleapis.com".to_string()
}

fn default_latitude() -> f64 {
    22.5726
}

fn default_longitude() -> f64 {
    88.3639
}

fn default_zoom() -> u8 {
    12
}

fn default_search_zoom() -> u8 {
    14
}

fn default_radius_meters() -> u32 {
    5000
}

fn default_locate_timeout_secs() -> u64 {
    30
}

impl MapsSettings {
    pub fn map_settings(&self) -> Result<MapSettings, AppError> {
        let default_center = Coordinate::try_new(self.default_latitude, self.default_longitude)
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("maps default center: {}", e)))?;

        Ok(MapSettings {
            api_key: self.api_key.clone(),
            default_center,
            zoom: self.zoom,
            search_zoom: self.search_zoom,
        })
    }

    pub fn locate_timeout(&self) -> Duration {
        Duration::from_secs(self.locate_timeout_secs)
    }
}

/// Which text-generation backend serves the chatbot and report analyzer.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Mock,
}

#[derive(Deserialize, Clone)]
pub struct GenaiSettings {
    pub provider: ProviderKind,
    #[serde(default = "empty_secret")]
    pub api_key: Secret<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_genai_base_url")]
    pub base_url: String,
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_genai_base_url() -> String {
    crate::services::providers::gemini::GEMINI_API_BASE.to_string()
}

#[derive(Deserialize, Clone)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP/gRPC collector; span export is off when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    /// Check deployment-time requirements that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.maps.api_key.expose_secret().trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "maps.api_key is required (set APP_MAPS__API_KEY)"
            )));
        }

        if self.genai.provider == ProviderKind::Gemini
            && self.genai.api_key.expose_secret().trim().is_empty()
        {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "genai.api_key is required for the gemini provider (set APP_GENAI__API_KEY)"
            )));
        }

        if self.maps.radius_meters == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "maps.radius_meters must be positive"
            )));
        }

        self.maps.map_settings().map(|_| ())
    }
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let settings: Settings = service_core::config::load_settings(MEMBER_NAME)?;
    settings.validate()?;
    Ok(settings)
}
