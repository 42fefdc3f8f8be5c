use std::io::Cursor;

use tiny_http::Response;

use crate::render::{html_escape, render_page};
use crate::routes::html_response;
use crate::state::{lock, FlashKind, FlashMessage, ScanStatus, SharedState};

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

/// The dashboard page. Table, progress and charts are filled in by the page
/// script from `/scan/events`; this handler only renders the controls and
/// the status line.
pub fn handle_get(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = lock(&state);
    let flash = st.take_flash();
    let source = st.source.label();
    let running = st.scan.is_running();
    let has_report = st.report.is_some();

    let (badge, detail) = match &st.scan {
        ScanStatus::Idle => ("Idle", String::new()),
        ScanStatus::Running { .. } => ("Running", String::new()),
        ScanStatus::Done { was_stopped: true, elapsed_ms } => {
            ("Stopped", format!("stopped after {:.1}s", *elapsed_ms as f64 / 1000.0))
        }
        ScanStatus::Done { was_stopped: false, elapsed_ms } => {
            ("Done", format!("finished in {:.1}s", *elapsed_ms as f64 / 1000.0))
        }
        ScanStatus::Failed { reason } => ("Failed", reason.clone()),
    };
    drop(st);

    let hide = |show: bool| if show { "" } else { "hidden" };

    html_response(render_page(running, |tmpl| {
        tmpl.replace("{{FLASH}}", &render_flash_html(flash.as_ref()))
            .replace("{{SOURCE_LABEL}}", &html_escape(&source))
            .replace("{{STATUS_BADGE}}", badge)
            .replace("{{STATUS_DETAIL}}", &html_escape(&detail))
            .replace("{{START_HIDE}}", hide(!running))
            .replace("{{STOP_HIDE}}", hide(running))
            .replace("{{REPORT_HIDE}}", hide(has_report))
    }))
}

fn render_flash_html(flash: Option<&FlashMessage>) -> String {
    match flash {
        Some(f) => {
            let class = match f.kind {
                FlashKind::Success => "flash-success",
                FlashKind::Error => "flash-error",
            };
            format!(r#"<div class="flash {}">{}</div>"#, class, html_escape(&f.text))
        }
        None => String::new(),
    }
}
