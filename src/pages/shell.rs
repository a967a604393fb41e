use axum::response::Html;

use crate::config::AppConfig;
use crate::middleware::Caller;

/// Wrap page content in the document every page shares.
///
/// The toast and modal hosts are always emitted so client code can mount into
/// them from any page.
pub fn render(config: &AppConfig, caller: &Caller, content: &str) -> Html<String> {
    let title = escape(&config.api.app_title);
    let signed_in = match caller.id() {
        Some(user_id) => format!(r#"<span class="caller" data-user-id="{0}">{0}</span>"#, escape(user_id)),
        None => r#"<a class="caller" href="/">Sign in</a>"#.to_string(),
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
<header><a href="/">{title}</a> {signed_in}</header>
<div id="toast-host"></div>
<div id="modal-host"></div>
<main>
{content}
</main>
</body>
</html>
"#
    ))
}

/// Minimal HTML text escaping for interpolated values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
