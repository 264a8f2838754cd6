//! Lucky Draw - prize draw presentation runner
//!
//! Loads the roster and settings, then runs the draw session headless:
//! reels are driven in real time (or instantly for rehearsals), cues and
//! reel phases go to the log, and the winner list is exported at the end.
//!
//! Usage: `luckydraw [config.toml]`

use std::path::PathBuf;
use std::sync::Arc;

use luckydraw_caption::{CaptionDispatcher, CaptionGenerator, GeminiCaptions, TemplateCaptions};
use luckydraw_core::{DrawSession, Result, RngSource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod show;
mod state;

use config::{CaptionConfig, CaptionProvider};

fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Lucky Draw");

    let config_arg = std::env::args_os().nth(1).map(PathBuf::from);

    // Initialize application state
    let app_state = match state::AppState::new(config_arg.as_deref()) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tokio runtime for caption requests and the frame loop
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(app_state)) {
        tracing::error!("Show failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(app_state: state::AppState) -> Result<()> {
    let config = &app_state.config;
    let roster = app_state.load_roster()?;

    let rng = match config.rehearsal.seed {
        Some(seed) => RngSource::seeded(seed),
        None => RngSource::from_entropy(),
    };
    let mut session = DrawSession::new(config.effective_settings(), rng)?;
    session.load_roster(roster.candidates, roster.prizes)?;
    session.begin()?;

    let (dispatcher, captions) =
        CaptionDispatcher::new(caption_generator(&config.caption), config.caption.timeout());

    let mut show = show::Show::new(session, dispatcher, captions, config.rehearsal.clone());
    let report = show.run(&app_state.export_dir()).await?;

    tracing::info!(
        path = %report.export.display(),
        data_dir = %app_state.data_dir().display(),
        "Winner list written"
    );
    Ok(())
}

/// Configured caption generator, falling back to templates when the hosted
/// one is not usable
fn caption_generator(config: &CaptionConfig) -> Arc<dyn CaptionGenerator> {
    match config.provider {
        CaptionProvider::Template => Arc::new(TemplateCaptions::new()),
        CaptionProvider::Gemini => match GeminiCaptions::from_env(config.model.clone()) {
            Ok(generator) => {
                tracing::info!(model = generator.model(), "Using Gemini captions");
                Arc::new(generator)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Gemini unavailable, using template captions");
                Arc::new(TemplateCaptions::new())
            }
        },
    }
}
