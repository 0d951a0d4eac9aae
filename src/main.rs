use std::process::ExitCode;
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use segfetch::download_job::{DownloadJob, TransferMode};
use segfetch::downloader::Downloader;
use segfetch::transport::HttpTransport;

#[derive(Parser, Debug)]
#[command(name = "segfetch", version, about = "Segmented download accelerator for HTTP(S)")]
struct Cli {
    /// Resource to download.
    url: String,
    /// Destination file path.
    outfile: String,
    /// Number of concurrent workers; omit for a plain single fetch.
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    workers: Option<u64>,
    /// Fetch the whole resource once per worker instead of splitting it.
    #[arg(long, requires = "workers")]
    replicate: bool,
    /// Cap aggregate download speed, in bytes per second (0 = unlimited).
    #[arg(long, value_name = "BYTES_PER_SEC", default_value_t = 0)]
    limit_rate: u64,
    /// Per-request timeout in seconds (0 = no timeout).
    #[arg(long, value_name = "SECS", default_value_t = 0)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
            let _ = e.print();
            return code;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mode = match (cli.workers, cli.replicate) {
        (None, _) => TransferMode::Single,
        (Some(_), true) => TransferMode::Replicate,
        (Some(_), false) => TransferMode::Segmented,
    };

    let job = match DownloadJob::new()
        .set_url(cli.url)
        .set_file_path(cli.outfile)
        .set_worker_count(cli.workers.unwrap_or(1))
        .set_mode(mode)
        .set_speed_limit(cli.limit_rate)
        .set_timeout(cli.timeout)
        .build()
    {
        Ok(job) => job,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "Downloading {} to {} using {} workers",
        job.url, job.path, job.worker_count
    );

    let transport = match HttpTransport::new(job.timeout_secs) {
        Ok(transport) => transport,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let downloader = Downloader::new(Arc::new(transport), job, cancel);
    match downloader.run().await {
        Ok(report) => match report.failed > 0 || report.cancelled {
            true => ExitCode::FAILURE,
            false => ExitCode::SUCCESS,
        },
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
