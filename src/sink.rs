use std::io::SeekFrom;
use std::path::Path;
use tokio::fs;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use crate::error::{DownloadError, Result};

/// Creates (or truncates) the destination and reserves `total_size` bytes so
/// segment writers can position themselves anywhere inside it. Parent
/// directories are created on demand.
pub async fn allocate(path: &str, total_size: u64) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.exists() {
            let _ = fs::create_dir_all(parent).await;
        }
    }
    let file = match File::create(path).await {
        Ok(file) => file,
        Err(e) => return Err(DownloadError::FileOpen(format!("{}: {}", path, e))),
    };
    if total_size > 0 {
        if let Err(e) = file.set_len(total_size).await {
            return Err(DownloadError::Preallocate(e.to_string()));
        }
    }
    Ok(())
}

/// One worker's positioned view into the shared destination file.
///
/// Opening never truncates; each worker only touches bytes from its own
/// offset onward, so concurrent sinks on the same path stay out of each
/// other's ranges.
pub struct SegmentSink {
    file: File,
}

impl SegmentSink {
    pub async fn open(path: &str, offset: u64) -> Result<SegmentSink> {
        let mut file = match OpenOptions::new()
            .create(true)
            .write(true)
            .open(path)
            .await
        {
            Ok(file) => file,
            Err(e) => return Err(DownloadError::FileOpen(format!("{}: {}", path, e))),
        };
        if let Err(_e) = file.seek(SeekFrom::Start(offset)).await {
            return Err(DownloadError::FileSeek);
        }
        Ok(SegmentSink { file })
    }

    pub async fn write(&mut self, buffer: &[u8]) -> Result<()> {
        if let Err(_e) = self.file.write_all(buffer).await {
            return Err(DownloadError::FileWrite);
        }
        Ok(())
    }

    /// Flushes outstanding writes and closes the handle.
    pub async fn finish(mut self) -> Result<()> {
        if let Err(_e) = self.file.flush().await {
            return Err(DownloadError::FileFlush);
        }
        Ok(())
    }
}
