use chrono::{DateTime, Utc};

use sealbox_session::SESSION_COOKIE_NAME;

/// Build the `Set-Cookie` value carrying a session token. HttpOnly and
/// SameSite=Lax always; Secure only in the production posture.
pub fn session_cookie(token: &str, expires_at_ms: i64, secure: bool) -> String {
    let expires = DateTime::<Utc>::from_timestamp_millis(expires_at_ms)
        .unwrap_or_default()
        .format("%a, %d %b %Y %H:%M:%S GMT");

    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Expires={}",
        SESSION_COOKIE_NAME, token, expires
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that drops the session on the client.
pub fn clear_session_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE_NAME
    )
}

/// Pull one cookie's value out of a raw `Cookie` request header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').map(str::trim).find_map(|pair| {
        pair.split_once('=')
            .and_then(|(k, v)| (k == name).then_some(v))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_carries_required_attributes() {
        let cookie = session_cookie("tok.sig", 1_900_000_000_000, false);
        assert!(cookie.starts_with("user_session=tok.sig; "));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Expires="));
        assert!(!cookie.contains("Secure"));

        assert!(session_cookie("t", 1_900_000_000_000, true).contains("; Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie();
        assert!(cookie.starts_with("user_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn cookie_value_finds_named_cookie() {
        let header = "theme=dark; user_session=abc.def; other=1";
        assert_eq!(cookie_value(header, "user_session"), Some("abc.def"));
        assert_eq!(cookie_value(header, "theme"), Some("dark"));
        assert_eq!(cookie_value(header, "missing"), None);
        assert_eq!(cookie_value("", "user_session"), None);
    }
}
