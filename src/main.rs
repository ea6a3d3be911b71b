//! Application entry point for SpeakEval.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (defaults on first run).
//! 3. Create a current-thread [`tokio`] runtime.
//! 4. Load the theme preference and spawn the console view.
//! 5. Build the relay client and spawn the playback task.
//! 6. Wire stdin capture into the conversation controller and run the
//!    session until it completes or stdin closes.

use std::sync::Arc;

use speak_eval::{
    capture::ConsoleCapture,
    config::{new_shared_preferences, AppConfig, AppPaths, TomlPreferenceStore},
    conversation::ConversationController,
    events::event_channel,
    playback::{FilePlayback, PlaybackPort, PlaybackQueue},
    relay::{HttpRelayClient, RelayClient},
    ui::ConsoleView,
};

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("SpeakEval starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (single thread; everything waits on I/O)
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(run(config));
    Ok(())
}

async fn run(config: AppConfig) {
    // 4. Preferences + view
    let prefs = new_shared_preferences(Box::new(TomlPreferenceStore::new(
        AppPaths::new().preferences_file,
    )));
    let (events_tx, events_rx) = event_channel();
    let view = tokio::spawn(ConsoleView::new(prefs.clone()).run(events_rx));

    // 5. Relay + playback
    let relay: Arc<dyn RelayClient> = Arc::new(HttpRelayClient::from_config(&config.relay));
    let port = FilePlayback::from_config(&config);
    log::info!(
        "Relays: {} / {}; audio written to {}",
        config.relay.evaluate_url(),
        config.relay.speak_url(),
        port.dir().display()
    );
    let port: Arc<dyn PlaybackPort> = Arc::new(port);
    let playback =
        PlaybackQueue::new(Arc::clone(&relay), port, &config.playback, events_tx.clone()).spawn();

    // 6. Capture + controller
    let capture = ConsoleCapture::from_stdin(prefs);
    let mut controller = ConversationController::new(
        &config,
        relay,
        playback,
        Box::new(capture),
        events_tx,
    );
    controller.run().await;

    // Dropping the controller closes the last event sender once playback
    // has wound down, which ends the view.
    drop(controller);
    if let Err(e) = view.await {
        log::error!("console view stopped unexpectedly: {e}");
    }
    log::info!("SpeakEval shutting down");
}
