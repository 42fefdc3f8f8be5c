//! Logging setup and per-dataset progress reporting.
//!
//! Library code only talks to the `tracing` facade; binaries call [`init`]
//! once at start-up to install a `tracing-subscriber` formatter.

use std::time::Instant;

use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber.
///
/// The filter defaults to `default_level` and can be overridden through
/// `RUST_LOG`. Calling this twice returns an error instead of panicking.
pub fn init(default_level: &str) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))
}

/// Progress counter for one dataset, logged once per finished batch.
pub struct DatasetProgress {
    name: String,
    total: usize,
    done: usize,
    start_time: Instant,
}

impl DatasetProgress {
    pub fn new(name: &str, total: usize) -> Self {
        tracing::info!("Dataset {}: {} images", name, total);
        Self {
            name: name.to_string(),
            total,
            done: 0,
            start_time: Instant::now(),
        }
    }

    /// Records `count` more processed images.
    pub fn iters_done(&mut self, count: usize) {
        self.done = (self.done + count).min(self.total);

        let elapsed = self.start_time.elapsed().as_secs_f64();
        let per_sec = if elapsed > 0.0 { self.done as f64 / elapsed } else { 0.0 };
        tracing::debug!(
            "Dataset {}: {}/{} ({:.1} images/s)",
            self.name,
            self.done,
            self.total,
            per_sec
        );
    }

    pub fn done(&self) -> usize {
        self.done
    }

    pub fn is_complete(&self) -> bool {
        self.done == self.total
    }
}
