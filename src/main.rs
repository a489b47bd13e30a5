//! signe-engine: runs one practice session against a simulated detector
//!
//! The simulated child holds up each sign, loses the hand once for a frame
//! along the way, then holds long enough to succeed. Narration is queued
//! to a player task that logs each utterance.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use signe_engine::config::Config;
use signe_engine::detector::{spawn_frame_source, DetectionAdapter, SimulatedDetector};
use signe_engine::events::SessionEvent;
use signe_engine::hold::SystemClock;
use signe_engine::lifecycle::ShutdownSignal;
use signe_engine::narration::QueuedNarrator;
use signe_engine::session::{Phase, SessionCommand, SessionController, SessionRuntime};

/// Roughly 30 frames per second
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "signe-engine starting");

    let config = Config::load()?;
    let catalog = config.catalog()?;
    info!(
        items = catalog.len(),
        hold_ms = config.session.hold.hold_duration_ms,
        celebration_ms = config.session.celebration.as_millis() as u64,
        "configuration loaded"
    );

    let shutdown = ShutdownSignal::new();
    let clock = Arc::new(SystemClock::new());

    // Controller -> presentation layer
    let (event_tx, mut event_rx) = broadcast::channel::<SessionEvent>(64);
    // Presentation layer -> controller; kept open for the whole session
    let (_command_tx, command_rx) = mpsc::channel::<SessionCommand>(8);

    let (narrator, mut utterances) = QueuedNarrator::new(8);
    let player = tokio::spawn(async move {
        while let Some(utterance) = utterances.recv().await {
            info!(language = %utterance.language, text = %utterance.text, "speaking");
        }
    });

    let script = SimulatedDetector::child_practicing(
        catalog.len(),
        config.session.hold.hold_duration_ms,
        config.session.celebration.as_millis() as u64,
        FRAME_INTERVAL,
    );
    let detector = SimulatedDetector::new(script, FRAME_INTERVAL);
    let detector_stop = detector.stop_handle();
    let frames = spawn_frame_source(detector, 64);

    let controller = SessionController::new(
        catalog.into_items(),
        config.session.clone(),
        Arc::new(narrator),
        clock.clone(),
        event_tx,
    )?;
    let mut runtime = SessionRuntime::new(controller, DetectionAdapter::any_hand(clock));

    info!("session initialized, entering main loop");

    tokio::select! {
        _ = runtime.run(frames, command_rx) => {
            info!("session runtime exited");
        }

        // Render progression the way a presentation layer would
        _ = async {
            loop {
                match event_rx.recv().await {
                    Ok(SessionEvent::HoldProgress { .. }) => {}
                    Ok(event) => {
                        info!(%event, "session event");
                        if let SessionEvent::Snapshot(snapshot) = event {
                            if snapshot.phase == Phase::Finished {
                                shutdown.trigger();
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "session event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        } => {
            info!("session event handler exited");
        }

        result = shutdown.wait() => {
            result?;
            info!("shutdown requested");
        }
    }

    // Cleanup
    info!("shutting down...");

    detector_stop.store(false, std::sync::atomic::Ordering::SeqCst);
    let controller = runtime.controller();
    info!(
        score = controller.score(),
        items = controller.item_count(),
        completed = ?controller.completed(),
        "lesson summary"
    );

    drop(runtime);
    if let Err(e) = player.await {
        warn!(?e, "narration player failed");
    }

    info!("signe-engine stopped");

    Ok(())
}
