use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadError {
    EmptyUrl,
    EmptyPath,
    ZeroWorkers,
    Client(String),
    Probe(String),
    Request(String),
    Status(u16),
    FileOpen(String),
    FileSeek,
    FileWrite,
    FileFlush,
    Preallocate(String),
}

pub type Result<T> = core::result::Result<T, DownloadError>;

impl Display for DownloadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DownloadError::EmptyUrl => write!(f, "no url configured"),
            DownloadError::EmptyPath => write!(f, "no destination path configured"),
            DownloadError::ZeroWorkers => write!(f, "worker count must be at least 1"),
            DownloadError::Client(message) => {
                write!(f, "client initialization failed: {}", message)
            }
            DownloadError::Probe(message) => write!(f, "size probe failed: {}", message),
            DownloadError::Request(message) => write!(f, "request failed: {}", message),
            DownloadError::Status(code) => write!(f, "unexpected http status {}", code),
            DownloadError::FileOpen(message) => write!(f, "cannot open {}", message),
            DownloadError::FileSeek => write!(f, "seek failed on destination file"),
            DownloadError::FileWrite => write!(f, "write failed on destination file"),
            DownloadError::FileFlush => write!(f, "flush failed on destination file"),
            DownloadError::Preallocate(message) => {
                write!(f, "cannot reserve destination file: {}", message)
            }
        }
    }
}
