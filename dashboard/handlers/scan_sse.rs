use std::thread;
use std::time::Duration;

use tiny_http::Request;

use crate::state::{lock, ScanStatus, SharedState};
use crate::util::sse::{format_scan_event, format_sse_event, format_sse_keepalive, write_sse, SSE_RESPONSE_HEAD};

const POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Polls without news between two keep-alive pings.
const PING_EVERY: u32 = 8;

/// `GET /scan/events`: Server-Sent Events handler.
///
/// Takes ownership of `request` to stream into the connection. The whole
/// event history of the current scan is replayed first, so a page opened
/// mid-scan (or after it) sees every batch. New events follow as the scan
/// emits them. Once the scan is no longer running and everything was sent,
/// a final `closed` (or `failed`) event ends the stream.
pub fn handle(request: Request, state: SharedState) {
    let mut writer = request.into_writer();
    if !write_sse(&mut writer, SSE_RESPONSE_HEAD) {
        return;
    }

    let mut sent = 0usize;
    let mut idle_polls = 0u32;
    loop {
        // History and status are read under one lock. The scan thread only
        // leaves `Running` after every event is in the history.
        let (pending, final_frame) = {
            let st = lock(&state);
            let pending = st.event_history[sent.min(st.event_history.len())..].to_vec();
            let final_frame = match &st.scan {
                ScanStatus::Running { .. } => None,
                ScanStatus::Failed { reason } => {
                    Some(format_sse_event("failed", &serde_json::json!({ "reason": reason }).to_string()))
                }
                _ => Some(format_sse_event("closed", "{}")),
            };
            (pending, final_frame)
        };

        if pending.is_empty() {
            if let Some(frame) = final_frame {
                let _ = write_sse(&mut writer, &frame);
                return;
            }
            idle_polls += 1;
            if idle_polls % PING_EVERY == 0 && !write_sse(&mut writer, format_sse_keepalive()) {
                return;
            }
            thread::sleep(POLL_INTERVAL);
            continue;
        }

        idle_polls = 0;
        for event in &pending {
            if let Some(frame) = format_scan_event(event) {
                if !write_sse(&mut writer, &frame) {
                    return;
                }
            }
        }
        sent += pending.len();
    }
}
