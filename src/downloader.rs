use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::console::ConsoleReporter;
use crate::download_job::{DownloadJob, TransferMode};
use crate::error::Result;
use crate::progress::ProgressTracker;
use crate::rate_limiter::RateLimiter;
use crate::segment::plan_segments;
use crate::segment_worker::{self, WorkerContext};
use crate::sink;
use crate::transport::Transport;

/// Outcome of one job, available once every worker has returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    /// Workers launched for this job.
    pub segments: usize,
    /// Workers that returned an error.
    pub failed: usize,
    /// Bytes received across all workers.
    pub transferred: u64,
    pub cancelled: bool,
}

struct WorkerSpec {
    range: Option<(u64, u64)>,
    write_offset: u64,
}

struct JobPlan {
    total_size: Option<u64>,
    workers: Vec<WorkerSpec>,
}

impl JobPlan {
    fn unsegmented(total_size: Option<u64>) -> JobPlan {
        JobPlan {
            total_size,
            workers: vec![WorkerSpec {
                range: None,
                write_offset: 0,
            }],
        }
    }
}

pub struct Downloader {
    transport: Arc<dyn Transport>,
    job: DownloadJob,
    cancel: CancellationToken,
}

impl Downloader {
    pub fn new(
        transport: Arc<dyn Transport>,
        job: DownloadJob,
        cancel: CancellationToken,
    ) -> Downloader {
        Downloader {
            transport,
            job,
            cancel,
        }
    }

    /// Runs the job to completion. Every worker is awaited before the
    /// report is produced, whether or not siblings failed.
    pub async fn run(&self) -> Result<DownloadReport> {
        let plan = self.prepare().await?;
        sink::allocate(&self.job.path, plan.total_size.unwrap_or(0)).await?;

        let tracker = Arc::new(ProgressTracker::new(plan.total_size, plan.workers.len()));
        let limiter = Arc::new(RateLimiter::new(self.job.speed_limit));

        let render_stop = CancellationToken::new();
        let render_handle = tokio::spawn({
            let tracker = tracker.clone();
            let stop = render_stop.clone();
            async move {
                let reporter = ConsoleReporter::default();
                reporter.run(&tracker, &stop).await;
            }
        });

        let mut handles: Vec<JoinHandle<Result<()>>> = Vec::with_capacity(plan.workers.len());
        for (worker, spec) in plan.workers.iter().enumerate() {
            let ctx = WorkerContext {
                transport: self.transport.clone(),
                url: self.job.url.clone(),
                path: self.job.path.clone(),
                range: spec.range,
                write_offset: spec.write_offset,
                worker,
                tracker: tracker.clone(),
                limiter: limiter.clone(),
                cancel: self.cancel.clone(),
            };
            handles.push(tokio::spawn(segment_worker::run(ctx)));
        }

        let segments = handles.len();
        let mut failed = 0;
        for handle in handles {
            match handle.await {
                Ok(result) => {
                    if result.is_err() {
                        failed += 1;
                    }
                }
                Err(_) => {
                    failed += 1;
                }
            }
        }

        render_stop.cancel();
        let _ = render_handle.await;

        let report = DownloadReport {
            segments,
            failed,
            transferred: tracker.transferred(),
            cancelled: self.cancel.is_cancelled(),
        };
        match (report.cancelled, report.failed) {
            (true, _) => println!("Download cancelled"),
            (false, 0) => println!("Download complete"),
            (false, n) => println!("Download complete, {} of {} segments failed", n, segments),
        }
        Ok(report)
    }

    async fn prepare(&self) -> Result<JobPlan> {
        match self.job.mode {
            TransferMode::Single => Ok(JobPlan::unsegmented(None)),
            TransferMode::Replicate => {
                let total_size = match self.transport.probe(&self.job.url).await {
                    Ok(info) => info.total_length,
                    Err(e) => {
                        warn!("size probe failed: {}", e);
                        None
                    }
                };
                let workers = (0..self.job.worker_count)
                    .map(|_| WorkerSpec {
                        range: None,
                        write_offset: 0,
                    })
                    .collect();
                Ok(JobPlan {
                    total_size,
                    workers,
                })
            }
            TransferMode::Segmented => {
                let info = match self.transport.probe(&self.job.url).await {
                    Ok(info) => info,
                    Err(e) => {
                        warn!("size probe failed, using a single fetch: {}", e);
                        return Ok(JobPlan::unsegmented(None));
                    }
                };
                match info.total_length {
                    Some(size) if size > 0 && info.accept_ranges => {
                        let workers = plan_segments(size, self.job.worker_count)
                            .into_iter()
                            .map(|segment| WorkerSpec {
                                range: Some((segment.start, segment.end)),
                                write_offset: segment.start,
                            })
                            .collect();
                        Ok(JobPlan {
                            total_size: Some(size),
                            workers,
                        })
                    }
                    Some(size) if size > 0 => {
                        info!("no byte range support, using a single fetch");
                        Ok(JobPlan::unsegmented(Some(size)))
                    }
                    Some(_) => Ok(JobPlan::unsegmented(Some(0))),
                    None => {
                        info!("content length unknown, using a single fetch");
                        Ok(JobPlan::unsegmented(None))
                    }
                }
            }
        }
    }
}
