use std::io::Cursor;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::handlers;
use crate::state::SharedState;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn headers(pairs: &[(&str, &str)]) -> Vec<Header> {
    pairs
        .iter()
        .filter_map(|(name, value)| Header::from_bytes(name.as_bytes(), value.as_bytes()).ok())
        .collect()
}

fn bytes_response(status: u16, headers: Vec<Header>, body: Vec<u8>) -> Response<Cursor<Vec<u8>>> {
    let len = body.len();
    Response::new(StatusCode(status), headers, Cursor::new(body), Some(len), None)
}

pub fn html_response(body: String) -> Response<Cursor<Vec<u8>>> {
    bytes_response(200, headers(&[("Content-Type", "text/html; charset=utf-8")]), body.into_bytes())
}

pub fn redirect(location: &str) -> Response<Cursor<Vec<u8>>> {
    bytes_response(303, headers(&[("Location", location), ("Content-Length", "0")]), Vec::new())
}

pub fn json_download_response(body: String, filename: &str) -> Response<Cursor<Vec<u8>>> {
    let disposition = format!("attachment; filename=\"{}\"", filename);
    bytes_response(
        200,
        headers(&[("Content-Type", "application/json"), ("Content-Disposition", &disposition)]),
        body.into_bytes(),
    )
}

pub fn not_found() -> Response<Cursor<Vec<u8>>> {
    bytes_response(404, headers(&[("Content-Type", "text/plain")]), b"404 Not Found".to_vec())
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches incoming requests to the appropriate handler.
///
/// The SSE handler takes ownership of the request to stream into it; every
/// other handler returns a response the dispatcher sends.
pub fn dispatch(request: Request, state: SharedState) {
    let method = request.method().clone();
    let url = request.url().to_owned();
    let path = url.split('?').next().unwrap_or("").to_owned();

    if method == Method::Get && path == "/scan/events" {
        handlers::scan_sse::handle(request, state);
        return;
    }

    let response = match (method, path.as_str()) {
        (Method::Get, "/") => handlers::home::handle_get(state),
        (Method::Post, "/scan/start") => handlers::scan::handle_start(state),
        (Method::Post, "/scan/stop") => handlers::scan::handle_stop(state),
        (Method::Get, "/scan/report") => handlers::report::handle_download(state),
        _ => not_found(),
    };

    let _ = request.respond(response);
}
