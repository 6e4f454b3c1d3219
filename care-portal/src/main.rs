use care_portal::config::{get_configuration, ProviderKind, Settings};
use care_portal::facilities::places::PlacesConfig;
use care_portal::facilities::{GooglePlacesClient, MapRenderer, PlacesService};
use care_portal::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use care_portal::services::providers::mock::MockTextProvider;
use care_portal::services::providers::TextProvider;
use care_portal::services::sessions::SessionDefaults;
use care_portal::services::{metrics, ChatService, ReportAnalyzer, SessionRegistry};
use care_portal::startup::{build_router, SessionOptions};
use care_portal::AppState;
use dotenvy::dotenv;
use service_core::observability::init_tracing;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

fn text_provider(settings: &Settings) -> anyhow::Result<Arc<dyn TextProvider>> {
    let provider: Arc<dyn TextProvider> = match settings.genai.provider {
        ProviderKind::Gemini => Arc::new(GeminiTextProvider::new(GeminiConfig {
            api_key: settings.genai.api_key.clone(),
            model: settings.genai.model.clone(),
            base_url: settings.genai.base_url.clone(),
        })?),
        ProviderKind::Mock => Arc::new(MockTextProvider::new(true)),
    };

    info!(
        provider = ?settings.genai.provider,
        model = %settings.genai.model,
        "Initialized text provider"
    );

    Ok(provider)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "care-portal",
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    )?;
    metrics::init_metrics()?;

    let provider = text_provider(&configuration)?;

    let places: Arc<dyn PlacesService> = Arc::new(GooglePlacesClient::new(PlacesConfig {
        api_key: configuration.maps.api_key.clone(),
        base_url: configuration.maps.places_base_url.clone(),
        timeout: Duration::from_secs(15),
    })?);

    let renderer = Arc::new(MapRenderer::new(configuration.maps.map_settings()?));

    let registry = Arc::new(SessionRegistry::new(
        places,
        SessionDefaults {
            radius_meters: configuration.maps.radius_meters,
            search_zoom: configuration.maps.search_zoom,
            locate_timeout: configuration.maps.locate_timeout(),
        },
    ));
    let session_idle = Duration::from_secs(configuration.server.session_idle_minutes * 60);
    registry.spawn_pruner(session_idle);

    let state = AppState::new(
        registry,
        Arc::new(ChatService::new(provider.clone())),
        Arc::new(ReportAnalyzer::new(provider)),
        renderer,
    );

    let app = build_router(
        state,
        SessionOptions {
            secure_cookies: configuration.server.secure_cookies,
            idle_minutes: configuration.server.session_idle_minutes as i64,
        },
    );

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting care-portal on {}", address);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            tracing::error!("Server error: {}", e);
            anyhow::anyhow!("Server error: {}", e)
        })?;

    Ok(())
}
