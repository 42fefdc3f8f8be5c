use std::io::Cursor;

use tiny_http::Response;

use crate::routes::{json_download_response, not_found};
use crate::state::{lock, SharedState};

/// `GET /scan/report`: the last finished scan's report as a JSON download.
pub fn handle_download(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = lock(&state);
    let Some(report) = st.report.as_ref() else {
        return not_found();
    };
    match serde_json::to_string_pretty(report) {
        Ok(body) => json_download_response(body, &format!("{}_report.json", report.project.name)),
        Err(_) => not_found(),
    }
}
