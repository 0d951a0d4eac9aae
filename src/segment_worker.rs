use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::error::Result;
use crate::progress::ProgressTracker;
use crate::rate_limiter::RateLimiter;
use crate::sink::SegmentSink;
use crate::transport::Transport;

/// Everything one worker needs to transfer its slice of the resource.
pub struct WorkerContext {
    pub transport: Arc<dyn Transport>,
    pub url: Arc<String>,
    pub path: Arc<String>,
    /// Inclusive byte range to request, `None` for the whole resource.
    pub range: Option<(u64, u64)>,
    /// Absolute offset the received bytes are written at.
    pub write_offset: u64,
    pub worker: usize,
    pub tracker: Arc<ProgressTracker>,
    pub limiter: Arc<RateLimiter>,
    pub cancel: CancellationToken,
}

/// Runs one segment transfer to completion, an error, or cancellation.
pub async fn run(ctx: WorkerContext) -> Result<()> {
    match transfer(&ctx).await {
        Ok(()) => {
            debug!(worker = ctx.worker, "segment finished");
            Ok(())
        }
        Err(e) => {
            error!(worker = ctx.worker, "segment failed: {}", e);
            Err(e)
        }
    }
}

async fn transfer(ctx: &WorkerContext) -> Result<()> {
    if ctx.cancel.is_cancelled() {
        return Ok(());
    }
    let mut sink = SegmentSink::open(&ctx.path, ctx.write_offset).await?;
    let mut body = ctx.transport.fetch(&ctx.url, ctx.range).await?;
    while let Some(chunk) = body.next().await {
        if ctx.cancel.is_cancelled() {
            return Ok(());
        }
        let chunk = chunk?;
        ctx.limiter.acquire(chunk.len() as u64).await;
        sink.write(&chunk).await?;
        ctx.tracker.record(ctx.worker, chunk.len() as u64);
    }
    sink.finish().await
}
