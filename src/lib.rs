//! # segfetch
//!
//! A segmented download accelerator for HTTP(S).
//!
//! Features:
//! - Range-based segmented downloads into one pre-sized file
//! - Single-fetch fallback for servers without a usable size
//! - Per-worker progress counters with a live console status line
//! - Global rate limiting (token-bucket)
//! - Cooperative cancellation between chunks

pub mod console;
pub mod download_job;
pub mod downloader;
pub mod error;
pub mod progress;
pub mod rate_limiter;
pub mod segment;
pub mod segment_worker;
pub mod sink;
pub mod transport;
