use tokio::sync::broadcast;

/// One-shot broadcast used to announce the run deadline to every task.
pub type ShutdownSender = broadcast::Sender<()>;
pub type ShutdownReceiver = broadcast::Receiver<()>;

#[must_use]
pub fn channel() -> (ShutdownSender, ShutdownReceiver) {
    broadcast::channel(1)
}
