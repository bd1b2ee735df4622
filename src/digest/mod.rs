//! # Digest Rendering
//!
//! Pure rendering of fetched events into the bounded notification body.
//! Event fields come straight off a public feed and are escaped before
//! they reach anyone's inbox.

use crate::feed::FeedEvent;

/// Most events a single digest will render; the rest are truncated.
pub const MAX_EVENTS: usize = 10;

/// Rendered stand-in for a field the event did not carry
const PLACEHOLDER: &str = "Unknown";

/// Render events into the notification body.
///
/// An empty slice produces the fixed "no updates" body. Otherwise the
/// first [`MAX_EVENTS`] events become a two-column table, fields escaped,
/// absent fields shown as `Unknown`. The unsubscribe link is always the
/// last element.
pub fn render_digest(events: &[FeedEvent], unsubscribe_url: &str) -> String {
    if events.is_empty() {
        return format!(
            "<h2>GitHub Timeline Updates</h2><p>No updates available</p>{}",
            unsubscribe_link(unsubscribe_url)
        );
    }

    let mut html = String::from("<h2>GitHub Timeline Updates</h2>\n");
    html.push_str("<table border=\"1\">\n");
    html.push_str("  <tr><th>Event</th><th>User</th></tr>\n");

    for event in events.iter().take(MAX_EVENTS) {
        let kind = event
            .kind
            .as_deref()
            .map(escape_html)
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        let user = event
            .actor_login()
            .map(escape_html)
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        html.push_str(&format!("  <tr><td>{}</td><td>{}</td></tr>\n", kind, user));
    }

    html.push_str("</table>\n");
    html.push_str(&unsubscribe_link(unsubscribe_url));
    html
}

fn unsubscribe_link(url: &str) -> String {
    format!(
        "<p><a href=\"{}\" id=\"unsubscribe-button\">Unsubscribe</a></p>",
        url
    )
}

/// Escape a string for embedding in HTML text or attribute content.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Actor;

    const UNSUB: &str = "http://localhost/unsubscribe.php";

    fn event(kind: &str, login: &str) -> FeedEvent {
        FeedEvent {
            kind: Some(kind.to_string()),
            actor: Some(Actor {
                login: Some(login.to_string()),
            }),
        }
    }

    #[test]
    fn test_empty_events_render_no_updates_body() {
        let html = render_digest(&[], UNSUB);

        assert!(html.contains("No updates available"));
        assert!(html.contains(UNSUB));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn test_events_render_as_table_rows() {
        let events = vec![event("PushEvent", "octocat"), event("ForkEvent", "hubot")];
        let html = render_digest(&events, UNSUB);

        assert!(html.contains("<tr><th>Event</th><th>User</th></tr>"));
        assert!(html.contains("<tr><td>PushEvent</td><td>octocat</td></tr>"));
        assert!(html.contains("<tr><td>ForkEvent</td><td>hubot</td></tr>"));
        assert!(html.contains("id=\"unsubscribe-button\""));
    }

    #[test]
    fn test_truncates_to_first_ten_events() {
        let events: Vec<FeedEvent> = (0..12)
            .map(|i| event(&format!("Event{}", i), &format!("user{}", i)))
            .collect();
        let html = render_digest(&events, UNSUB);

        assert_eq!(html.matches("<tr><td>").count(), MAX_EVENTS);
        assert!(html.contains("<td>Event0</td>"));
        assert!(html.contains("<td>Event9</td>"));
        assert!(!html.contains("<td>Event10</td>"));
        assert!(!html.contains("<td>Event11</td>"));
    }

    #[test]
    fn test_absent_fields_render_placeholder() {
        let events = vec![FeedEvent::default()];
        let html = render_digest(&events, UNSUB);

        assert!(html.contains("<tr><td>Unknown</td><td>Unknown</td></tr>"));
    }

    #[test]
    fn test_fields_are_escaped_against_markup_injection() {
        let events = vec![event("<script>alert(1)</script>", "a&b\"c'd")];
        let html = render_digest(&events, UNSUB);

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("a&amp;b&quot;c&#039;d"));
    }

    #[test]
    fn test_escape_html_passes_safe_text_through() {
        assert_eq!(escape_html("PushEvent"), "PushEvent");
        assert_eq!(escape_html(""), "");
    }
}
