//! Download throughput sampling over a live byte stream

use super::{progress::ProgressObserver, EngineSettings};
use crate::{
    client::HttpTransport,
    error::{AppError, Result},
    types::{mbps, round1},
};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

/// Elapsed time below this is treated as this, so tiny bodies don't explode the rate
const MIN_ELAPSED_SECS: f64 = 0.1;

/// Lowest throughput a measured download reports
const MIN_RESULT_MBPS: f64 = 0.1;

/// Stream, deadline and sampling in one: the abort deadline covers both the
/// request and the body read.
pub async fn attempt_download(
    transport: &dyn HttpTransport,
    settings: &EngineSettings,
    progress: &dyn ProgressObserver,
) -> Result<f64> {
    let deadline = Instant::now() + settings.download_timeout;
    let url = settings.download_url.as_str();

    let measured = timeout_at(deadline, async {
        let stream = transport.stream(url).await?;
        sample_throughput(stream, settings.sample_window, settings.report_threshold, progress).await
    })
    .await;

    match measured {
        Ok(result) => result,
        Err(_) => Err(AppError::timeout(format!(
            "Download from {} aborted after {} ms",
            url,
            settings.download_timeout.as_millis()
        ))),
    }
}

/// Read `stream` for at most `window`, reporting running estimates once
/// more than `threshold` has elapsed. Returns Mbps to one decimal.
pub async fn sample_throughput<S>(
    mut stream: S,
    window: Duration,
    threshold: Duration,
    progress: &dyn ProgressObserver,
) -> Result<f64>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
{
    let start = Instant::now();
    let cutoff = start + window;
    let mut total: u64 = 0;

    loop {
        let chunk = match timeout_at(cutoff, stream.next()).await {
            Ok(Some(chunk)) => chunk?,
            Ok(None) => break,
            Err(_) => {
                tracing::debug!(bytes = total, "sample window elapsed, cancelling read");
                break;
            }
        };

        total += chunk.len() as u64;
        let elapsed = start.elapsed();

        if elapsed > threshold {
            progress.on_progress(round1(mbps(total, elapsed.as_secs_f64())));
        }
        if elapsed > window {
            break;
        }
    }

    // Dropping the stream here cancels whatever is still in flight
    drop(stream);

    if total == 0 {
        return Err(AppError::http_request("Download returned no data"));
    }

    let seconds = start.elapsed().as_secs_f64().max(MIN_ELAPSED_SECS);
    let result = round1(mbps(total, seconds)).max(MIN_RESULT_MBPS);
    tracing::debug!(bytes = total, seconds, mbps = result, "download sampled");

    Ok(result)
}
