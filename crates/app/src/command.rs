//! Command dispatch: delivering user writes to an unreliable hub.
//!
//! A write from a controller must not wait for the hub: the dispatcher
//! spawns a task and returns at once. The task keeps sending the command
//! until the hub accepts it. Timeouts are retried immediately and without
//! limit; any other hub error ends the task.
//!
//! Each device has a single command slot. Dispatching a new command aborts
//! the retry loop of the one it replaces. Hub calls of one device are
//! serialized through a lock that the blocking call itself holds, and an
//! attempt only starts if its command is still the latest one. A stale call
//! already running on the hub therefore always completes before the newer
//! command is sent, and the latest value wins.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;

use maxbridge_domain::event::{Event, EventKind};
use maxbridge_domain::id::CommandId;

use crate::ports::{EventPublisher, HubClient};
use crate::runtime::run_blocking;

struct PendingCommand {
    id: CommandId,
    handle: JoinHandle<()>,
}

/// Serializes the hub calls of one device.
#[derive(Default)]
struct Link {
    lock: Arc<tokio::sync::Mutex<()>>,
    generation: AtomicU64,
}

/// Per-device sender of target-temperature commands.
pub struct CommandDispatcher<H, P> {
    hub: Arc<H>,
    serial: String,
    publisher: P,
    pending: Mutex<Option<PendingCommand>>,
    link: Arc<Link>,
}

impl<H, P> CommandDispatcher<H, P>
where
    H: HubClient,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    /// Create a dispatcher for the device with the given serial.
    pub fn new(hub: Arc<H>, serial: impl Into<String>, publisher: P) -> Self {
        Self {
            hub,
            serial: serial.into(),
            publisher,
            pending: Mutex::new(None),
            link: Arc::new(Link::default()),
        }
    }

    /// Schedule delivery of a new target temperature, superseding any
    /// command still in flight for this device.
    ///
    /// Returns immediately. Must be called from within a tokio runtime.
    pub fn dispatch(&self, temperature: f64) -> CommandId {
        let id = CommandId::new();
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let generation = self.link.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(previous) = pending.take()
            && !previous.handle.is_finished()
        {
            previous.handle.abort();
            tracing::info!(
                serial = %self.serial,
                superseded = %previous.id,
                command_id = %id,
                "superseding pending target temperature command"
            );
        }

        let handle = tokio::spawn(deliver(
            Arc::clone(&self.hub),
            Arc::clone(&self.link),
            self.serial.clone(),
            Delivery {
                id,
                generation,
                temperature,
            },
            self.publisher.clone(),
        ));
        *pending = Some(PendingCommand { id, handle });
        id
    }

    /// The command still being delivered, if any.
    #[must_use]
    pub fn pending(&self) -> Option<CommandId> {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        pending
            .as_ref()
            .filter(|command| !command.handle.is_finished())
            .map(|command| command.id)
    }
}

#[derive(Clone, Copy)]
struct Delivery {
    id: CommandId,
    generation: u64,
    temperature: f64,
}

/// Retry loop of a single command.
async fn deliver<H, P>(
    hub: Arc<H>,
    link: Arc<Link>,
    serial: String,
    delivery: Delivery,
    publisher: P,
)
where
    H: HubClient,
    P: EventPublisher,
{
    let Delivery {
        id,
        generation,
        temperature,
    } = delivery;
    let mut attempts: u32 = 0;
    loop {
        let guard = Arc::clone(&link.lock).lock_owned().await;
        if link.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(%serial, command_id = %id, "command superseded before sending");
            return;
        }
        attempts = attempts.saturating_add(1);

        let job_hub = Arc::clone(&hub);
        let job_serial = serial.clone();
        let result = run_blocking(move || {
            let result = job_hub.set_target_temperature(&job_serial, temperature);
            drop(guard);
            result
        })
        .await;

        match result {
            Ok(()) => {
                tracing::info!(
                    %serial,
                    command_id = %id,
                    temperature,
                    attempts,
                    "target temperature set"
                );
                let event = Event::new(EventKind::CommandDelivered {
                    serial: serial.clone(),
                    command_id: id,
                    target_temperature: temperature,
                    attempts,
                });
                if let Err(err) = publisher.publish(event).await {
                    tracing::warn!(%serial, %err, "failed to publish command delivery");
                }
                return;
            }
            Err(err) if err.is_timeout() => {
                tracing::warn!(
                    %serial,
                    command_id = %id,
                    attempts,
                    %err,
                    "setting target temperature timed out, retrying"
                );
            }
            Err(err) => {
                tracing::error!(
                    %serial,
                    command_id = %id,
                    attempts,
                    %err,
                    "setting target temperature failed, giving up"
                );
                return;
            }
        }
    }
}
