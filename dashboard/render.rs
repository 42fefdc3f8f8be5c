/// Template renderer for the dashboard page.
///
/// The page is a single HTML template (`dashboard/assets/dashboard.html`)
/// with `{{TOKEN}}` placeholders, loaded at compile time. Tokens the caller
/// does not fill are blanked so raw placeholders never reach the browser.

const TEMPLATE: &str = include_str!("assets/dashboard.html");

/// Renders the page; `scan_running` is exposed to the page script, `fill`
/// substitutes the remaining placeholders.
pub fn render_page<F>(scan_running: bool, fill: F) -> String
where
    F: FnOnce(String) -> String,
{
    let html = TEMPLATE.replace("{{SCAN_RUNNING}}", if scan_running { "true" } else { "false" });
    blank_remaining(fill(html))
}

fn blank_remaining(mut html: String) -> String {
    while let Some(start) = html.find("{{") {
        if let Some(end) = html[start..].find("}}") {
            html.replace_range(start..start + end + 2, "");
        } else {
            break;
        }
    }
    html
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
