//! Join-link detection and normalization for conferencing URLs.
//!
//! This module provides functionality to:
//! - Unwrap Microsoft Outlook SafeLinks
//! - Detect Microsoft Teams and Cisco Webex join links
//! - Find a join link inside free text (event body, location)
//! - Rewrite a join link so it opens the conferencing client directly

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Regex for extracting URLs from text.
static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"'\)\]]+"#).expect("Invalid URL regex"));

/// Regex for detecting Microsoft Outlook SafeLinks.
///
/// SafeLinks wrap the original URL in a redirect through
/// `safelinks.protection.outlook.com`. The original URL is encoded in the
/// `url` query parameter.
static SAFELINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[^/]*safelinks\.protection\.outlook\.com/?\?[^?]*url=([^&]+)")
        .expect("Invalid SafeLink regex")
});

/// Regex for detecting Microsoft Teams meeting URLs.
static TEAMS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://teams\.(microsoft\.com|live\.com)/").expect("Invalid Teams regex")
});

/// Regex for detecting Cisco Webex meeting URLs.
static WEBEX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://([^/]*\.)?webex\.com/").expect("Invalid Webex regex")
});

/// The conferencing service behind a join link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    Teams,
    Webex,
}

impl JoinKind {
    /// Returns a human-readable name for this service.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Teams => "Microsoft Teams",
            Self::Webex => "Cisco Webex",
        }
    }
}

/// Classifies a URL as a known conferencing provider's join link.
///
/// SafeLinks are unwrapped before matching. Returns `None` for anything
/// that is not a recognized provider.
pub fn detect_join_kind(url: &str) -> Option<JoinKind> {
    classify(&unwrap_safelink(url))
}

/// Matches an already-unwrapped URL against the provider patterns.
fn classify(url: &str) -> Option<JoinKind> {
    if TEAMS_REGEX.is_match(url) {
        Some(JoinKind::Teams)
    } else if WEBEX_REGEX.is_match(url) {
        Some(JoinKind::Webex)
    } else {
        None
    }
}

/// Unwraps a Microsoft Outlook SafeLink to get the original URL.
///
/// SafeLinks are used by Microsoft 365 to protect users from malicious
/// links. They redirect through `safelinks.protection.outlook.com` with the
/// original URL encoded in the `url` query parameter.
///
/// If the URL is not a SafeLink, it is returned unchanged.
pub fn unwrap_safelink(url: &str) -> String {
    if let Some(caps) = SAFELINK_REGEX.captures(url) {
        if let Some(encoded) = caps.get(1) {
            if let Ok(decoded) = urlencoding::decode(encoded.as_str()) {
                return decoded.into_owned();
            }
        }
    }
    url.to_string()
}

/// Finds the first recognized join link in free text.
///
/// Scans the text for URLs, unwraps SafeLinks, and returns the first one
/// that belongs to a known provider. Used for payloads that carry the join
/// link inside the body or location instead of a dedicated field.
pub fn extract_join_url(text: &str) -> Option<String> {
    URL_REGEX.find_iter(text).find_map(|m| {
        let unwrapped = unwrap_safelink(m.as_str());
        classify(&unwrapped).map(|_| unwrapped)
    })
}

/// Rewrites a join link into a form that opens the conferencing client
/// directly.
///
/// Teams links move onto the `msteams:` application scheme; Webex links
/// gain `launchApp=true` so the browser interstitial is skipped. Returns
/// `None` when the URL does not belong to a recognized provider or cannot
/// be rewritten.
pub fn direct_join_url(url: &str) -> Option<String> {
    let unwrapped = unwrap_safelink(url);
    match classify(&unwrapped)? {
        JoinKind::Teams => teams_app_url(&unwrapped),
        JoinKind::Webex => webex_app_url(&unwrapped),
    }
}

/// Swaps the scheme of a Teams web link for the `msteams:` app protocol.
fn teams_app_url(url: &str) -> Option<String> {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .map(|rest| format!("msteams://{}", rest))
}

/// Appends `launchApp=true` to a Webex link unless it is already present.
fn webex_app_url(url: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    let already = parsed
        .query_pairs()
        .any(|(key, value)| key == "launchApp" && value == "true");
    if !already {
        parsed.query_pairs_mut().append_pair("launchApp", "true");
    }
    Some(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod safelinks {
        use super::*;

        #[test]
        fn unwraps_safelink() {
            let safelink = "https://nam01.safelinks.protection.outlook.com/?url=https%3A%2F%2Fteams.microsoft.com%2Fl%2Fmeetup-join%2Fabc&data=xyz";
            let result = unwrap_safelink(safelink);
            assert_eq!(result, "https://teams.microsoft.com/l/meetup-join/abc");
        }

        #[test]
        fn unwraps_safelink_with_encoded_query() {
            let safelink = "https://eur01.safelinks.protection.outlook.com/?url=https%3A%2F%2Fcompany.webex.com%2Fmeet%2Fjdoe%3FMTID%3Dm123&sdata=qrs";
            let result = unwrap_safelink(safelink);
            assert_eq!(result, "https://company.webex.com/meet/jdoe?MTID=m123");
        }

        #[test]
        fn returns_non_safelink_unchanged() {
            let url = "https://teams.microsoft.com/l/meetup-join/abc";
            assert_eq!(unwrap_safelink(url), url);
        }
    }

    mod detection {
        use super::*;

        #[test]
        fn detects_teams() {
            let kind = detect_join_kind("https://teams.microsoft.com/l/meetup-join/19%3ameeting_abc%40thread.v2/0");
            assert_eq!(kind, Some(JoinKind::Teams));
        }

        #[test]
        fn detects_teams_live() {
            let kind = detect_join_kind("https://teams.live.com/meet/abc123");
            assert_eq!(kind, Some(JoinKind::Teams));
        }

        #[test]
        fn detects_webex() {
            let kind = detect_join_kind("https://company.webex.com/meet/jdoe");
            assert_eq!(kind, Some(JoinKind::Webex));
        }

        #[test]
        fn detects_webex_without_subdomain() {
            let kind = detect_join_kind("https://webex.com/join/room");
            assert_eq!(kind, Some(JoinKind::Webex));
        }

        #[test]
        fn detects_through_safelink() {
            let safelink = "https://nam01.safelinks.protection.outlook.com/?url=https%3A%2F%2Fteams.microsoft.com%2Fl%2Fmeetup-join%2Fabc";
            assert_eq!(detect_join_kind(safelink), Some(JoinKind::Teams));
        }

        #[test]
        fn rejects_other_providers() {
            assert_eq!(detect_join_kind("https://zoom.us/j/123456789"), None);
            assert_eq!(detect_join_kind("https://meet.google.com/abc-defg-hij"), None);
            assert_eq!(detect_join_kind("https://example.com/teams"), None);
        }

        #[test]
        fn display_names() {
            assert_eq!(JoinKind::Teams.display_name(), "Microsoft Teams");
            assert_eq!(JoinKind::Webex.display_name(), "Cisco Webex");
        }
    }

    mod extraction {
        use super::*;

        #[test]
        fn finds_join_link_in_text() {
            let text = "Join here: https://teams.microsoft.com/l/meetup-join/abc and bring notes";
            let url = extract_join_url(text);
            assert_eq!(
                url.as_deref(),
                Some("https://teams.microsoft.com/l/meetup-join/abc")
            );
        }

        #[test]
        fn skips_unrecognized_urls() {
            let text = r#"
                Agenda: https://docs.example.com/agenda
                Meeting: https://company.webex.com/meet/jdoe
            "#;
            let url = extract_join_url(text);
            assert_eq!(url.as_deref(), Some("https://company.webex.com/meet/jdoe"));
        }

        #[test]
        fn first_recognized_link_wins() {
            let text = "A https://teams.microsoft.com/l/meetup-join/a then B https://company.webex.com/meet/b";
            let url = extract_join_url(text);
            assert_eq!(
                url.as_deref(),
                Some("https://teams.microsoft.com/l/meetup-join/a")
            );
        }

        #[test]
        fn unwraps_safelinks_in_text() {
            let text = "Join: https://nam01.safelinks.protection.outlook.com/?url=https%3A%2F%2Fteams.microsoft.com%2Fl%2Fmeetup-join%2Fabc";
            let url = extract_join_url(text);
            assert_eq!(
                url.as_deref(),
                Some("https://teams.microsoft.com/l/meetup-join/abc")
            );
        }

        #[test]
        fn extracts_from_html() {
            let text = r#"<a href="https://teams.microsoft.com/l/meetup-join/abc">Join Meeting</a>"#;
            let url = extract_join_url(text);
            assert_eq!(
                url.as_deref(),
                Some("https://teams.microsoft.com/l/meetup-join/abc")
            );
        }

        #[test]
        fn handles_text_without_join_links() {
            assert_eq!(extract_join_url("No links at all."), None);
            assert_eq!(extract_join_url("Only https://example.com here."), None);
            assert_eq!(extract_join_url(""), None);
        }
    }

    mod direct_join {
        use super::*;

        #[test]
        fn teams_uses_app_scheme() {
            let url = direct_join_url("https://teams.microsoft.com/l/meetup-join/abc");
            assert_eq!(
                url.as_deref(),
                Some("msteams://teams.microsoft.com/l/meetup-join/abc")
            );
        }

        #[test]
        fn webex_gains_launch_param() {
            let url = direct_join_url("https://company.webex.com/meet/jdoe");
            assert_eq!(
                url.as_deref(),
                Some("https://company.webex.com/meet/jdoe?launchApp=true")
            );
        }

        #[test]
        fn webex_keeps_existing_query() {
            let url = direct_join_url("https://company.webex.com/meet/jdoe?MTID=m123");
            assert_eq!(
                url.as_deref(),
                Some("https://company.webex.com/meet/jdoe?MTID=m123&launchApp=true")
            );
        }

        #[test]
        fn webex_launch_param_is_idempotent() {
            let url = direct_join_url("https://company.webex.com/meet/jdoe?launchApp=true");
            assert_eq!(
                url.as_deref(),
                Some("https://company.webex.com/meet/jdoe?launchApp=true")
            );
        }

        #[test]
        fn unwraps_safelink_before_rewriting() {
            let safelink = "https://nam01.safelinks.protection.outlook.com/?url=https%3A%2F%2Fteams.microsoft.com%2Fl%2Fmeetup-join%2Fabc";
            let url = direct_join_url(safelink);
            assert_eq!(
                url.as_deref(),
                Some("msteams://teams.microsoft.com/l/meetup-join/abc")
            );
        }

        #[test]
        fn unrecognized_provider_has_no_direct_url() {
            assert_eq!(direct_join_url("https://zoom.us/j/123456789"), None);
            assert_eq!(direct_join_url("https://example.com/meeting"), None);
            assert_eq!(direct_join_url("not-a-url"), None);
        }
    }
}
