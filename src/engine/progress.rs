//! Progress reporting seam between measurements and their observers

use tokio::sync::mpsc;

/// Receives intermediate throughput estimates in Mbps.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, mbps: f64);
}

impl<F> ProgressObserver for F
where
    F: Fn(f64) + Send + Sync,
{
    fn on_progress(&self, mbps: f64) {
        self(mbps)
    }
}

impl ProgressObserver for mpsc::UnboundedSender<f64> {
    fn on_progress(&self, mbps: f64) {
        // A dropped receiver just means nobody is watching any more
        let _ = self.send(mbps);
    }
}

/// Observer that discards every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _mbps: f64) {}
}
