//! Target-page matching for the navigation re-poll gate.

use url::Url;

/// Returns `true` when `url` is the notification inbox (or a subpage of it)
/// on the given feed host. Unparseable URLs never match.
pub fn is_target_page(url: &str, feed_host: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }

    let Some(host) = parsed.host_str() else {
        return false;
    };
    if host != feed_host && host.strip_prefix("www.") != Some(feed_host) {
        return false;
    }

    let path = parsed.path();
    path == "/notifications" || path.starts_with("/notifications/")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn inbox_and_subpages_match() {
        assert!(is_target_page("https://github.com/notifications", "github.com"));
        assert!(is_target_page(
            "https://github.com/notifications/beta",
            "github.com"
        ));
        assert!(is_target_page(
            "https://www.github.com/notifications?query=is%3Aunread",
            "github.com"
        ));
    }

    #[test]
    fn other_pages_do_not_match() {
        assert!(!is_target_page("https://github.com/", "github.com"));
        assert!(!is_target_page(
            "https://github.com/rust-lang/rust/issues",
            "github.com"
        ));
        assert!(!is_target_page(
            "https://github.com/notificationsettings",
            "github.com"
        ));
    }

    #[test]
    fn other_hosts_and_schemes_do_not_match() {
        assert!(!is_target_page(
            "https://example.com/notifications",
            "github.com"
        ));
        assert!(!is_target_page("ftp://github.com/notifications", "github.com"));
        assert!(!is_target_page("not a url", "github.com"));
    }
}
