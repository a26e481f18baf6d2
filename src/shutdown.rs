use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

pub type ShutdownSender = broadcast::Sender<()>;
pub type ShutdownReceiver = broadcast::Receiver<()>;

/// Broadcast channel size for shutdown notifications (single signal fan-out).
const SHUTDOWN_CHANNEL_CAPACITY: usize = 1;

#[must_use]
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    broadcast::channel::<()>(SHUTDOWN_CHANNEL_CAPACITY)
}

/// Non-blocking check used between iterations.
///
/// A lagged or closed channel counts as a stop: either a signal was sent
/// that this receiver missed, or nobody is left to keep the run alive.
pub fn stop_requested(shutdown_rx: &mut ShutdownReceiver) -> bool {
    match shutdown_rx.try_recv() {
        Ok(()) | Err(TryRecvError::Closed | TryRecvError::Lagged(_)) => true,
        Err(TryRecvError::Empty) => false,
    }
}
