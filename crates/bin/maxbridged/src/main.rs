//! # maxbridged: the maxbridge daemon
//!
//! Composition root that wires the hub adapter into the bridge and runs
//! the refresh loop.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Construct the event bus and log every published event
//! - Discover the hub's thermostats and run the refresh loop
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no synchronization logic belongs here.

mod config;

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing_subscriber::EnvFilter;

use maxbridge_adapter_virtual::VirtualCube;
use maxbridge_app::bridge::{Bridge, BridgeState};
use maxbridge_app::event_bus::InProcessEventBus;
use maxbridge_app::runtime::stop_signal;
use maxbridge_domain::event::{Event, EventKind};

use crate::config::Config;

const EVENT_BUS_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(EVENT_BUS_CAPACITY));
    tokio::spawn(log_events(event_bus.subscribe()));

    // Bridge
    let mut bridge = Bridge::new(config.bridge_config(), Arc::clone(&event_bus));
    tokio::spawn(log_state(bridge.subscribe_state()));
    tracing::info!(
        name = %bridge.info().display_name,
        address = %config.hub.address,
        port = config.hub.port,
        "starting maxbridge"
    );

    bridge
        .discover(VirtualCube::new(config.virtual_cube.clone()))
        .await;

    // Shutdown
    let (stop, signal) = stop_signal();
    tokio::spawn(async move {
        shutdown_signal().await;
        stop.stop();
    });

    bridge.run(signal).await;
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

/// Log every event published on the bus.
async fn log_events(receiver: broadcast::Receiver<Event>) {
    let mut events = BroadcastStream::new(receiver);
    while let Some(result) = events.next().await {
        match result {
            Ok(event) => {
                match &event.kind {
                    EventKind::CharacteristicChanged {
                        serial,
                        characteristic,
                        value,
                    } => tracing::info!(%serial, %characteristic, %value, "characteristic changed"),
                    EventKind::CommandDelivered {
                        serial,
                        command_id,
                        target_temperature,
                        attempts,
                    } => tracing::info!(
                        %serial,
                        %command_id,
                        target_temperature,
                        attempts,
                        "command delivered"
                    ),
                }
                match serde_json::to_string(&event) {
                    Ok(json) => tracing::debug!(event = %json, "event published"),
                    Err(err) => tracing::warn!(%err, "failed to serialize event"),
                }
            }
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event logger lagged, some events were dropped");
            }
        }
    }
}

/// Log bridge lifecycle transitions.
async fn log_state(mut states: watch::Receiver<BridgeState>) {
    while states.changed().await.is_ok() {
        let state = *states.borrow_and_update();
        tracing::info!(%state, "bridge state changed");
    }
}
