//! Wiring & DI. Entry point: bootstrap adapters, inject into the pipeline,
//! run the transport. No business logic here.

use dotenv::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use verabot::adapters::ai::{GeminiAdapter, MockAnalysisAdapter};
use verabot::adapters::console::ConsoleTransport;
use verabot::adapters::factcheck::VeraAdapter;
use verabot::ports::{AnalysisPort, FactCheckPort, PipelinePort};
use verabot::shared::config::AppConfig;
use verabot::usecases::{FactCheckPipeline, SizeLimits};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found"),
    }

    let cfg = AppConfig::load().unwrap_or_default();

    // Transport collaborators download into this directory.
    let temp_dir = cfg.temp_download_path_or_default();
    tokio::fs::create_dir_all(&temp_dir).await?;

    // --- Analysis adapter (Gemini, or mock when unconfigured) ---
    let analysis: Arc<dyn AnalysisPort> = if cfg.is_gemini_configured() {
        info!(model = %cfg.gemini_model_or_default(), "content analysis enabled with Gemini adapter");
        Arc::new(GeminiAdapter::new(
            cfg.gemini_api_key().unwrap_or_default(),
            cfg.gemini_model_or_default(),
            Duration::from_secs(cfg.gemini_timeout_secs_or_default()),
        ))
    } else {
        warn!("VERABOT_GEMINI_API_KEY not set, using mock analysis adapter");
        Arc::new(MockAnalysisAdapter::new())
    };

    // --- Fact-check adapter ---
    let vera_url = cfg
        .vera_api_url()
        .ok_or_else(|| anyhow::anyhow!("Set VERABOT_VERA_API_URL (env or .env)"))?;
    let fact_check: Arc<dyn FactCheckPort> = Arc::new(VeraAdapter::new(
        vera_url,
        cfg.vera_api_key_or_default(),
        cfg.vera_auth_scheme_or_default(),
        cfg.vera_user_field_or_default(),
        Duration::from_secs(cfg.vera_timeout_secs_or_default()),
    ));

    // --- Pipeline ---
    let limits = SizeLimits {
        file_mb: cfg.max_file_size_mb_or_default(),
        image_mb: cfg.max_image_size_mb_or_default(),
        video_mb: cfg.max_video_size_mb_or_default(),
        audio_mb: cfg.max_audio_size_mb_or_default(),
    };
    let pipeline: Arc<dyn PipelinePort> =
        Arc::new(FactCheckPipeline::new(analysis, fact_check, limits));

    // --- Transport (console stand-in) ---
    let transport = ConsoleTransport::new(pipeline, "console");
    transport.run().await?;

    Ok(())
}
