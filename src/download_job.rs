use std::sync::Arc;
use crate::error::{DownloadError, Result};

/// How the configured workers share the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// One worker streams the whole body, no size probe, no ranges.
    Single,
    /// Each worker fetches one byte-range slice of the resource.
    Segmented,
    /// Each worker fetches the entire resource (diagnostic mode).
    Replicate,
}

/// Immutable input of one download job, read-only once built.
pub struct DownloadJob {
    pub url: Arc<String>,
    pub path: Arc<String>,
    pub worker_count: u64,
    pub mode: TransferMode,
    /// Aggregate transfer cap in bytes per second, 0 = unlimited.
    pub speed_limit: u64,
    /// Per-request timeout in seconds, 0 = none.
    pub timeout_secs: u64,
}

pub struct DownloadJobBuilder {
    job: DownloadJob,
}

impl DownloadJobBuilder {
    fn new(job: DownloadJob) -> Self {
        Self { job }
    }

    pub fn set_url(mut self, url: impl Into<String>) -> DownloadJobBuilder {
        self.job.url = Arc::new(url.into());
        self
    }

    pub fn set_file_path(mut self, path: impl Into<String>) -> DownloadJobBuilder {
        self.job.path = Arc::new(path.into());
        self
    }

    pub fn set_worker_count(mut self, worker_count: u64) -> DownloadJobBuilder {
        self.job.worker_count = worker_count;
        self
    }

    pub fn set_mode(mut self, mode: TransferMode) -> DownloadJobBuilder {
        self.job.mode = mode;
        self
    }

    pub fn set_speed_limit(mut self, bytes_per_second: u64) -> DownloadJobBuilder {
        self.job.speed_limit = bytes_per_second;
        self
    }

    pub fn set_timeout(mut self, seconds: u64) -> DownloadJobBuilder {
        self.job.timeout_secs = seconds;
        self
    }

    pub fn build(self) -> Result<DownloadJob> {
        self.validate()
    }

    fn validate(self) -> Result<DownloadJob> {
        if self.job.url.is_empty() {
            return Err(DownloadError::EmptyUrl);
        }
        if self.job.path.is_empty() {
            return Err(DownloadError::EmptyPath);
        }
        if self.job.worker_count == 0 {
            return Err(DownloadError::ZeroWorkers);
        }
        Ok(self.job)
    }
}

impl DownloadJob {
    pub fn new() -> DownloadJobBuilder {
        let job = DownloadJob {
            url: Arc::new(String::new()),
            path: Arc::new(String::new()),
            worker_count: 1,
            mode: TransferMode::Segmented,
            speed_limit: 0,
            timeout_secs: 0,
        };
        DownloadJobBuilder::new(job)
    }
}
