//! # Access Gate
//!
//! Core logic of the cookie-based access gate. Every protected route is
//! guarded by a single synchronous evaluation of the request `Cookie`
//! header: a visitor is `Verified` (completed the external verification
//! redirect chain), in `Ads` mode (opted to view advertisements), or
//! `Denied` (sent to the key-generation page).
//!
//! The gate performs no network call and no server-side verification; it
//! is a pure function of the cookie header. The flags carry their own
//! expiry through the cookie `max-age`, enforced by the browser.

use std::collections::HashMap;

/// Access decision for a single request, derived from the cookie header.
/// Precedence is `Verified` over `Ads` over `Denied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    Verified,
    Ads,
    Denied,
}

/// Parses a `Cookie` header into a key/value map.
///
/// Segments are split on `;` and trimmed; the first `=` separates key from
/// value. Malformed segments (no `=`, empty) are ignored rather than
/// reported — a broken cookie must never take the gate down, it simply
/// falls through to `Denied`.
pub fn parse_cookie_header(header: &str) -> HashMap<&str, &str> {
    header
        .split(';')
        .filter_map(|segment| segment.trim().split_once('='))
        .collect()
}

/// Evaluates the gate for a request.
pub fn evaluate_access(cookie_header: &str) -> AccessState {
    let cookies = parse_cookie_header(cookie_header);

    if cookies.get("verified").copied() == Some("true") {
        AccessState::Verified
    } else if cookies.get("ads").copied() == Some("true") {
        AccessState::Ads
    } else {
        AccessState::Denied
    }
}

/// `Set-Cookie` value granting ads-mode access for `max_age` seconds.
pub fn ads_cookie(max_age: u64) -> String {
    format!("ads=true; max-age={}; path=/", max_age)
}

/// `Set-Cookie` value granting verified access for `max_age` seconds.
pub fn verified_cookie(max_age: u64) -> String {
    format!("verified=true; max-age={}; path=/", max_age)
}

/// Renders a duration in seconds as a human label: minutes below one hour,
/// hours below one day, days otherwise. Truncating integer division.
pub fn validity_label(seconds: u64) -> String {
    if seconds < 3600 {
        format!("{} minutes", seconds / 60)
    } else if seconds < 86400 {
        format!("{} hours", seconds / 3600)
    } else {
        format!("{} days", seconds / 86400)
    }
}

/// Appends the third-party ad script tag and the ad placeholder panel to a
/// rendered HTML page. Idempotent: a page already carrying the script tag
/// is returned unchanged, so re-rendering never duplicates the element.
pub fn inject_ad_markup(html: &str, script_url: &str) -> String {
    if html.contains(script_url) {
        return html.to_string();
    }

    let ad_block = format!(
        concat!(
            r#"<script src="{}" async></script>"#,
            r#"<div id="ads-container">"#,
            "<p>Advertisement</p>",
            "<div>Ad Space</div>",
            "</div>"
        ),
        script_url
    );

    match html.rfind("</body>") {
        Some(idx) => {
            let mut out = String::with_capacity(html.len() + ad_block.len());
            out.push_str(&html[..idx]);
            out.push_str(&ad_block);
            out.push_str(&html[idx..]);
            out
        }
        None => format!("{}{}", html, ad_block),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verified_cookie_wins_regardless_of_other_cookies() {
        assert_eq!(evaluate_access("verified=true"), AccessState::Verified);
        assert_eq!(
            evaluate_access("session=abc; verified=true; ads=true"),
            AccessState::Verified
        );
        assert_eq!(
            evaluate_access("  verified=true ; theme=dark"),
            AccessState::Verified
        );
    }

    #[test]
    fn ads_cookie_grants_ads_mode_without_verified() {
        assert_eq!(evaluate_access("ads=true"), AccessState::Ads);
        assert_eq!(evaluate_access("theme=dark; ads=true"), AccessState::Ads);
    }

    #[test]
    fn neither_flag_denies() {
        assert_eq!(evaluate_access(""), AccessState::Denied);
        assert_eq!(evaluate_access("theme=dark"), AccessState::Denied);
        assert_eq!(evaluate_access("verified=false; ads=false"), AccessState::Denied);
        // Value comparison is exact, not truthy.
        assert_eq!(evaluate_access("verified=TRUE"), AccessState::Denied);
    }

    #[test]
    fn parsing_is_total_over_malformed_input() {
        assert_eq!(evaluate_access(";;;"), AccessState::Denied);
        assert_eq!(evaluate_access("noequals"), AccessState::Denied);
        assert_eq!(evaluate_access("=true"), AccessState::Denied);
        assert_eq!(evaluate_access("verified"), AccessState::Denied);
        // A valid pair still wins next to garbage.
        assert_eq!(evaluate_access("garbage; ;ads=true;"), AccessState::Ads);
        assert_eq!(
            evaluate_access("broken;verified=true;=;x"),
            AccessState::Verified
        );
    }

    #[test]
    fn malformed_segments_are_skipped_by_the_parser() {
        let cookies = parse_cookie_header("a=1; broken; b=2; =; c=x=y");
        assert_eq!(cookies.get("a"), Some(&"1"));
        assert_eq!(cookies.get("b"), Some(&"2"));
        // First '=' splits; the remainder stays in the value.
        assert_eq!(cookies.get("c"), Some(&"x=y"));
        assert_eq!(cookies.get("broken"), None);
    }

    #[test]
    fn validity_labels_use_truncating_division() {
        assert_eq!(validity_label(1800), "30 minutes");
        assert_eq!(validity_label(3599), "59 minutes");
        assert_eq!(validity_label(3600), "1 hours");
        assert_eq!(validity_label(7200), "2 hours");
        assert_eq!(validity_label(86399), "23 hours");
        assert_eq!(validity_label(86400), "1 days");
        assert_eq!(validity_label(604800), "7 days");
        assert_eq!(validity_label(0), "0 minutes");
    }

    #[test]
    fn cookie_strings_carry_max_age_and_path() {
        assert_eq!(ads_cookie(3600), "ads=true; max-age=3600; path=/");
        assert_eq!(verified_cookie(86400), "verified=true; max-age=86400; path=/");
    }

    #[test]
    fn ad_markup_injection_is_idempotent() {
        let page = "<html><body><h1>Batches</h1></body></html>";
        let url = "//cdn.monetag.io/js/monetag.js";

        let once = inject_ad_markup(page, url);
        assert_eq!(once.matches(url).count(), 1);
        assert!(once.contains("ads-container"));
        // Script tag lands inside the body.
        assert!(once.rfind("</body>").unwrap() > once.find("<script").unwrap());

        let twice = inject_ad_markup(&once, url);
        assert_eq!(twice, once);
    }

    #[test]
    fn ad_markup_appends_when_page_has_no_body_tag() {
        let injected = inject_ad_markup("<p>bare fragment</p>", "https://ads.example/x.js");
        assert_eq!(injected.matches("<script").count(), 1);
    }
}
