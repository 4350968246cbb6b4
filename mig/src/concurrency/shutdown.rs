use tokio::sync::watch;

/// Transmitter side of the shutdown coordination channel.
///
/// Broadcasts a cancellation signal to every per-table worker subscribed
/// to it. Workers respond by failing their current loop with
/// [`crate::error::ErrorKind::Cancelled`] at the next batch boundary.
#[derive(Debug, Clone)]
pub struct ShutdownTx(watch::Sender<()>);

impl ShutdownTx {
    /// Triggers shutdown for all subscribed workers.
    pub fn shutdown(&self) -> Result<(), watch::error::SendError<()>> {
        self.0.send(())
    }

    /// Creates a new shutdown receiver.
    pub fn subscribe(&self) -> ShutdownRx {
        self.0.subscribe()
    }
}

/// Receiver side of the shutdown coordination channel.
pub type ShutdownRx = watch::Receiver<()>;

/// Creates a new shutdown coordination channel.
pub fn create_shutdown_channel() -> (ShutdownTx, ShutdownRx) {
    let (tx, rx) = watch::channel(());
    (ShutdownTx(tx), rx)
}

/// Returns true once shutdown has been triggered.
///
/// A closed channel counts as triggered: with no transmitter left there is
/// nobody to drive the run to completion.
pub fn shutdown_requested(rx: &ShutdownRx) -> bool {
    rx.has_changed().unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_is_observed_by_existing_receivers() {
        let (tx, rx) = create_shutdown_channel();
        assert!(!shutdown_requested(&rx));

        tx.shutdown().unwrap();
        assert!(shutdown_requested(&rx));
    }

    #[test]
    fn cloned_receivers_inherit_the_pending_signal() {
        let (tx, rx) = create_shutdown_channel();
        tx.shutdown().unwrap();

        let cloned = rx.clone();
        assert!(shutdown_requested(&cloned));
    }

    #[test]
    fn closed_channel_counts_as_triggered() {
        let (tx, rx) = create_shutdown_channel();
        drop(tx);
        assert!(shutdown_requested(&rx));
    }
}
