//! Per-run control signals
//!
//! Pause, cancel, and continue are flags on a per-run signal pair, never
//! process-global state, so concurrent runs cannot interfere with each
//! other. The run loop wakes on a watch channel instead of polling.

use tokio::sync::watch;

/// Snapshot of the control flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalFlags {
    /// A pause was requested
    pub pause_requested: bool,
    /// Cancellation was requested
    pub cancel_requested: bool,
    /// A continue past the current pause was signalled
    pub continue_from_pause: bool,
}

/// Sender half of a run's control signals
///
/// The UI or session layer flips flags through this; the run loop observes
/// them at round boundaries.
#[derive(Debug, Clone)]
pub struct RunSignals {
    tx: watch::Sender<SignalFlags>,
}

impl RunSignals {
    /// Create a fresh signal pair
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SignalFlags::default());
        Self { tx }
    }

    /// Request a cooperative pause at the next round boundary
    pub fn request_pause(&self) {
        self.tx.send_modify(|f| {
            f.pause_requested = true;
            f.continue_from_pause = false;
        });
    }

    /// Request cancellation; observable even while paused
    pub fn request_cancel(&self) {
        self.tx.send_modify(|f| f.cancel_requested = true);
    }

    /// Release a paused run
    pub fn signal_continue(&self) {
        self.tx.send_modify(|f| {
            f.pause_requested = false;
            f.continue_from_pause = true;
        });
    }

    /// Current flag snapshot
    #[must_use]
    pub fn flags(&self) -> SignalFlags {
        *self.tx.borrow()
    }

    /// Watch half for the run loop
    pub(crate) fn watch(&self) -> SignalWatch {
        SignalWatch {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for RunSignals {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver half used inside the run loop
#[derive(Debug)]
pub(crate) struct SignalWatch {
    rx: watch::Receiver<SignalFlags>,
}

impl SignalWatch {
    /// Current flag snapshot
    pub(crate) fn flags(&self) -> SignalFlags {
        *self.rx.borrow()
    }

    /// Wait until the pause is released or the run is cancelled
    ///
    /// Returns `true` when cancellation was observed while paused.
    pub(crate) async fn wait_while_paused(&mut self) -> bool {
        loop {
            let flags = *self.rx.borrow();
            if flags.cancel_requested {
                return true;
            }
            if !flags.pause_requested || flags.continue_from_pause {
                return false;
            }
            if self.rx.changed().await.is_err() {
                // every sender is gone; nothing can release the pause
                return false;
            }
        }
    }
}
