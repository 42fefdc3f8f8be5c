use std::sync::{atomic::AtomicBool, Arc, Mutex, MutexGuard};

use annostat::catalog::SyntheticOptions;
use annostat::{ScanConfig, ScanEvent, ScanReport};

// ---------------------------------------------------------------------------
// Project source
// ---------------------------------------------------------------------------

/// Where `POST /scan/start` gets its project from.
#[derive(Debug, Clone)]
pub enum ProjectSource {
    /// A `ProjectDump` JSON file, re-read on every start.
    Dump(String),
    Synthetic(SyntheticOptions),
}

impl ProjectSource {
    pub fn label(&self) -> String {
        match self {
            ProjectSource::Dump(path) => format!("dump {}", path),
            ProjectSource::Synthetic(opts) => format!("synthetic project, seed {}", opts.seed),
        }
    }
}

// ---------------------------------------------------------------------------
// Scan status
// ---------------------------------------------------------------------------

pub enum ScanStatus {
    /// No scan has been started yet.
    Idle,
    /// A scan is running in a background thread.
    Running { stop_flag: Arc<AtomicBool> },
    /// The scan completed, naturally or via Stop.
    Done { was_stopped: bool, elapsed_ms: u64 },
    /// The scan failed with an error.
    Failed { reason: String },
}

impl ScanStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, ScanStatus::Running { .. })
    }
}

// ---------------------------------------------------------------------------
// Flash messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum FlashKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        FlashMessage { kind: FlashKind::Success, text: text.into() }
    }
    pub fn error(text: impl Into<String>) -> Self {
        FlashMessage { kind: FlashKind::Error, text: text.into() }
    }
}

// ---------------------------------------------------------------------------
// Main state struct
// ---------------------------------------------------------------------------

pub struct DashboardState {
    pub source: ProjectSource,
    /// Config for new scans; its channel and stop flag are set per run.
    pub config: ScanConfig,
    pub scan: ScanStatus,
    /// Every event of the most recent scan, in emission order. SSE
    /// subscribers replay it from the start.
    pub event_history: Vec<ScanEvent>,
    /// Final report of the most recent finished scan.
    pub report: Option<ScanReport>,
    /// One-shot flash message for the next page render.
    pub flash: Option<FlashMessage>,
}

impl DashboardState {
    pub fn new(source: ProjectSource, config: ScanConfig) -> Self {
        DashboardState {
            source,
            config,
            scan: ScanStatus::Idle,
            event_history: Vec::new(),
            report: None,
            flash: None,
        }
    }

    /// Takes and returns the current flash message, clearing it.
    pub fn take_flash(&mut self) -> Option<FlashMessage> {
        self.flash.take()
    }
}

/// Shared state type, passed to every handler.
pub type SharedState = Arc<Mutex<DashboardState>>;

/// Locks the shared state. A handler that panicked while holding the lock
/// leaves the state usable.
pub fn lock(state: &SharedState) -> MutexGuard<'_, DashboardState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
