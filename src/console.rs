use std::io::Write;
use std::time::Duration;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use crate::progress::{ProgressSnapshot, ProgressTracker};

pub const BAR_WIDTH: usize = 40;

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// Formats a byte rate with two-decimal unit scaling: `B/s` below one
/// kibibyte, `KB/s` below one mebibyte, `MB/s` above.
pub fn format_speed(bytes_per_sec: f64) -> String {
    if bytes_per_sec < KIB {
        format!("{:.2} B/s", bytes_per_sec)
    } else if bytes_per_sec < MIB {
        format!("{:.2} KB/s", bytes_per_sec / KIB)
    } else {
        format!("{:.2} MB/s", bytes_per_sec / MIB)
    }
}

/// Renders the ASCII bar: `=` for finished cells, one `>` at the boundary,
/// blanks for the rest. A full bar has no boundary marker left to draw.
pub fn render_bar(fraction: f64, width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64) as usize;
    if filled >= width {
        return "=".repeat(width);
    }
    let mut bar = String::with_capacity(width);
    bar.push_str(&"=".repeat(filled));
    bar.push('>');
    bar.push_str(&" ".repeat(width - filled - 1));
    bar
}

/// One line of live status. With a known total: bar, percentage, speed.
/// Without one: transferred bytes and speed only.
pub fn status_line(snapshot: &ProgressSnapshot) -> String {
    let speed = match snapshot.speed() {
        Some(bytes_per_sec) => format_speed(bytes_per_sec),
        None => String::from("measuring..."),
    };
    match snapshot.fraction() {
        Some(fraction) => format!(
            "[{}] {:6.2}% {}",
            render_bar(fraction, BAR_WIDTH),
            fraction * 100.0,
            speed,
        ),
        None => format!("{} bytes {}", snapshot.transferred, speed),
    }
}

/// Owns the terminal line for one job. Successive draws overwrite in place
/// with a carriage return; nothing else may print to stdout while a job
/// runs.
pub struct ConsoleReporter {
    last_width: Mutex<usize>,
}

impl ConsoleReporter {
    pub fn new() -> ConsoleReporter {
        ConsoleReporter {
            last_width: Mutex::new(0),
        }
    }

    /// Redraws every 100ms until `stop` fires, then draws the final state
    /// and terminates the line.
    pub async fn run(&self, tracker: &ProgressTracker, stop: &CancellationToken) {
        let mut ticker = tokio::time::interval(Duration::from_millis(100));
        loop {
            tokio::select! {
                _ = stop.cancelled() => break,
                _ = ticker.tick() => self.draw(&tracker.snapshot()),
            }
        }
        self.draw(&tracker.snapshot());
        println!();
    }

    fn draw(&self, snapshot: &ProgressSnapshot) {
        let line = status_line(snapshot);
        let mut last_width = self.last_width.lock();
        // pad over leftovers of a longer previous line
        let padding = last_width.saturating_sub(line.len());
        *last_width = line.len();
        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "\r{}{}", line, " ".repeat(padding));
        let _ = stdout.flush();
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_units_scale_at_1024_boundaries() {
        assert_eq!(format_speed(500.0), "500.00 B/s");
        assert_eq!(format_speed(2048.0), "2.00 KB/s");
        assert_eq!(format_speed(5.0 * 1024.0 * 1024.0), "5.00 MB/s");
        assert_eq!(format_speed(1023.99), "1023.99 B/s");
        assert_eq!(format_speed(1024.0), "1.00 KB/s");
    }

    #[test]
    fn half_full_bar_has_twenty_cells_and_a_marker() {
        let bar = render_bar(0.5, 40);
        assert_eq!(bar.len(), 40);
        assert_eq!(bar, format!("{}>{}", "=".repeat(20), " ".repeat(19)));
    }

    #[test]
    fn bar_edges_render_cleanly() {
        assert_eq!(render_bar(0.0, 40), format!(">{}", " ".repeat(39)));
        assert_eq!(render_bar(1.0, 40), "=".repeat(40));
        // out-of-range input is clamped, never panics
        assert_eq!(render_bar(2.0, 40), "=".repeat(40));
        assert_eq!(render_bar(-1.0, 40), format!(">{}", " ".repeat(39)));
    }

    #[test]
    fn status_line_with_known_total_shows_bar_and_percent() {
        let snapshot = ProgressSnapshot {
            transferred: 500,
            total_size: Some(1000),
            elapsed_secs: 1.0,
        };
        let line = status_line(&snapshot);
        assert!(line.contains("50.00%"));
        assert!(line.contains("500.00 B/s"));
        assert!(line.starts_with('['));
    }

    #[test]
    fn status_line_without_total_shows_bytes() {
        let snapshot = ProgressSnapshot {
            transferred: 1234,
            total_size: None,
            elapsed_secs: 0.0,
        };
        let line = status_line(&snapshot);
        assert_eq!(line, "1234 bytes measuring...");
    }
}
