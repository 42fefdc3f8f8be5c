use std::io::Cursor;
use std::sync::{atomic::{AtomicBool, Ordering}, mpsc, Arc};
use std::thread;

use tiny_http::Response;
use tracing::{error, info};

use annostat::catalog::generate_project;
use annostat::{run_scan, MemoryCatalog, ProjectDump, ScanEvent};

use crate::routes::redirect;
use crate::state::{lock, FlashMessage, ProjectSource, ScanStatus, SharedState};

// ---------------------------------------------------------------------------
// POST /scan/start
// ---------------------------------------------------------------------------

pub fn handle_start(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = lock(&state);

    // If already running, don't start another.
    if st.scan.is_running() {
        st.flash = Some(FlashMessage::error("A scan is already running."));
        drop(st);
        return redirect("/");
    }

    let source = st.source.clone();
    let mut config = st.config.clone();

    let (tx, rx) = mpsc::channel::<ScanEvent>();
    let stop_flag = Arc::new(AtomicBool::new(false));
    config.progress_tx = Some(tx);
    config.stop_flag = Some(stop_flag.clone());

    st.scan = ScanStatus::Running { stop_flag };
    st.event_history.clear();
    st.report = None;
    drop(st);

    let state_clone = state.clone();
    thread::spawn(move || {
        // Moves events into the shared history as they arrive; ends when the
        // scan drops its sender.
        let collector_state = state_clone.clone();
        let collector = thread::spawn(move || {
            for event in rx {
                lock(&collector_state).event_history.push(event);
            }
        });

        let result = load_catalog(&source)
            .and_then(|(catalog, project_id)| run_scan(&catalog, project_id, &config));
        drop(config);
        let _ = collector.join();

        let mut st = lock(&state_clone);
        match result {
            Ok(report) => {
                info!("Dashboard scan of {:?} done: {} images", report.project.name, report.table.len());
                st.scan = ScanStatus::Done { was_stopped: report.was_stopped, elapsed_ms: report.elapsed_ms };
                st.report = Some(report);
            }
            Err(e) => {
                error!("Dashboard scan failed: {}", e);
                st.scan = ScanStatus::Failed { reason: e.to_string() };
            }
        }
    });

    redirect("/")
}

fn load_catalog(source: &ProjectSource) -> annostat::Result<(MemoryCatalog, u64)> {
    let dump = match source {
        ProjectSource::Dump(path) => ProjectDump::load_json(path)?,
        ProjectSource::Synthetic(options) => generate_project(options),
    };
    let project_id = dump.project.id;
    Ok((MemoryCatalog::from_dump(dump), project_id))
}

// ---------------------------------------------------------------------------
// POST /scan/stop
// ---------------------------------------------------------------------------

pub fn handle_stop(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = lock(&state);
    let requested = match &st.scan {
        ScanStatus::Running { stop_flag } => {
            stop_flag.store(true, Ordering::Relaxed);
            true
        }
        _ => false,
    };
    if requested {
        st.flash = Some(FlashMessage::success("Stop requested. The scan ends after the current batch."));
    }
    drop(st);
    redirect("/")
}
