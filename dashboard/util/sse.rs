use std::io::Write;

use annostat::ScanEvent;

/// Status line and headers of an SSE stream, written by hand because the
/// handler streams straight into the connection.
pub const SSE_RESPONSE_HEAD: &str = "HTTP/1.1 200 OK\r\n\
                                     Content-Type: text/event-stream\r\n\
                                     Cache-Control: no-cache\r\n\
                                     Connection: keep-alive\r\n\
                                     X-Accel-Buffering: no\r\n\
                                     \r\n";

/// Formats a named SSE event with a JSON data payload.
///
/// Output format:
/// ```text
/// event: <name>
/// data: <json>
///
/// ```
pub fn format_sse_event(event_name: &str, json_data: &str) -> String {
    format!("event: {}\ndata: {}\n\n", event_name, json_data)
}

/// SSE frame for a scan event; the data is the event's tagged JSON form.
pub fn format_scan_event(event: &ScanEvent) -> Option<String> {
    serde_json::to_string(event)
        .ok()
        .map(|json| format_sse_event(event.name(), &json))
}

/// Keep-alive comment. EventSource clients ignore it but it keeps the
/// connection from timing out.
pub fn format_sse_keepalive() -> &'static str {
    ": ping\n\n"
}

/// Writes one SSE message and flushes. Returns `false` once the client has
/// disconnected.
pub fn write_sse<W: Write>(writer: &mut W, msg: &str) -> bool {
    writer.write_all(msg.as_bytes()).is_ok() && writer.flush().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_event_frame() {
        let frame = format_scan_event(&ScanEvent::Progress(100)).unwrap();
        assert_eq!(frame, "event: progress\ndata: {\"event\":\"progress\",\"data\":100}\n\n");
    }

    #[test]
    fn test_write_sse_reports_success() {
        let mut buf: Vec<u8> = Vec::new();
        assert!(write_sse(&mut buf, format_sse_keepalive()));
        assert_eq!(buf, b": ping\n\n");
    }
}
