//! Runtime primitives: running blocking hub I/O and cooperative stopping.

use std::time::Duration;

use tokio::sync::watch;

use maxbridge_domain::error::BridgeError;

/// Run a blocking job on the blocking thread pool and await its result.
///
/// Keeps socket waits off the async scheduler so that reads of other
/// accessories are not stalled behind a slow hub.
///
/// # Errors
///
/// Returns the job's own error converted into [`BridgeError`], or
/// [`BridgeError::Job`] if the job panicked or was cancelled.
pub async fn run_blocking<T, E, F>(job: F) -> Result<T, BridgeError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    BridgeError: From<E>,
{
    match tokio::task::spawn_blocking(job).await {
        Ok(result) => result.map_err(BridgeError::from),
        Err(err) => Err(BridgeError::Job(Box::new(err))),
    }
}

/// Create a connected stop handle / stop signal pair.
#[must_use]
pub fn stop_signal() -> (StopHandle, StopSignal) {
    let (sender, receiver) = watch::channel(false);
    (StopHandle { sender }, StopSignal { receiver })
}

/// Process-wide trigger for graceful shutdown.
#[derive(Debug)]
pub struct StopHandle {
    sender: watch::Sender<bool>,
}

impl StopHandle {
    /// Fire the signal. Idempotent.
    pub fn stop(&self) {
        self.sender.send_replace(true);
    }

    /// Another receiving side of this handle.
    #[must_use]
    pub fn signal(&self) -> StopSignal {
        StopSignal {
            receiver: self.sender.subscribe(),
        }
    }
}

/// Receiving side of the stop trigger.
///
/// Dropping every [`StopHandle`] counts as a stop: nobody is left who
/// could end the process gracefully.
#[derive(Debug, Clone)]
pub struct StopSignal {
    receiver: watch::Receiver<bool>,
}

impl StopSignal {
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Wait up to `timeout` for the stop signal.
    ///
    /// Returns `true` as soon as the signal fires (immediately if it already
    /// has), `false` once the timeout elapsed without it.
    pub async fn wait_or_cancelled(&mut self, timeout: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.receiver.wait_for(|stopped| *stopped) => true,
            () = tokio::time::sleep(timeout) => false,
        }
    }

    /// Wait until the signal fires.
    pub async fn cancelled(&mut self) {
        let _ = self.receiver.wait_for(|stopped| *stopped).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maxbridge_domain::error::HubError;

    #[tokio::test]
    async fn should_return_job_result() {
        let value = run_blocking(|| Ok::<_, HubError>(21.5_f64)).await.unwrap();
        assert!((value - 21.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn should_convert_job_error() {
        let result: Result<(), _> =
            run_blocking(|| Err(HubError::CommandTimeout { command: "refresh" })).await;
        assert!(matches!(result, Err(BridgeError::Hub(_))));
    }

    #[tokio::test]
    async fn should_report_panicking_job() {
        let result: Result<(), BridgeError> =
            run_blocking(|| -> Result<(), HubError> { panic!("socket exploded") }).await;
        assert!(matches!(result, Err(BridgeError::Job(_))));
    }

    #[tokio::test]
    async fn should_time_out_when_not_stopped() {
        let (_handle, mut signal) = stop_signal();
        assert!(!signal.wait_or_cancelled(Duration::from_millis(10)).await);
        assert!(!signal.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn should_wait_for_the_full_interval() {
        let (_handle, mut signal) = stop_signal();
        let started = tokio::time::Instant::now();

        assert!(!signal.wait_or_cancelled(Duration::from_secs(60)).await);
        assert!(started.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test]
    async fn should_return_immediately_when_already_stopped() {
        let (handle, mut signal) = stop_signal();
        handle.stop();
        let cancelled = tokio::time::timeout(
            Duration::from_secs(1),
            signal.wait_or_cancelled(Duration::from_secs(3600)),
        )
        .await
        .unwrap();
        assert!(cancelled);
    }

    #[tokio::test]
    async fn should_wake_when_stopped_during_wait() {
        let (handle, mut signal) = stop_signal();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.stop();
        });

        let cancelled = tokio::time::timeout(
            Duration::from_secs(1),
            signal.wait_or_cancelled(Duration::from_secs(3600)),
        )
        .await
        .unwrap();
        assert!(cancelled);
    }

    #[tokio::test]
    async fn should_treat_dropped_handle_as_stop() {
        let (handle, mut signal) = stop_signal();
        drop(handle);
        assert!(signal.wait_or_cancelled(Duration::from_secs(3600)).await);
    }

    #[tokio::test]
    async fn should_share_signal_between_receivers() {
        let (handle, signal) = stop_signal();
        let mut other = handle.signal();
        handle.stop();
        assert!(signal.is_stopped());
        other.cancelled().await;
    }
}
