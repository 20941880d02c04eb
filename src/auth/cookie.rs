use crate::config::SecurityConfig;

pub const SESSION_COOKIE: &str = "accessToken";

/// `Set-Cookie` value carrying the session token.
pub fn session_cookie(token: &str, security: &SecurityConfig) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        token,
        security.session_expiry_minutes * 60
    );
    if security.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Expires the session cookie immediately.
pub fn clear_session_cookie(security: &SecurityConfig) -> String {
    let mut cookie = format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE);
    if security.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Find the session token in a raw `Cookie` header.
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn formats_session_cookie() {
        let mut security = AppConfig::development().security;
        assert_eq!(
            session_cookie("abc", &security),
            "accessToken=abc; HttpOnly; SameSite=Lax; Path=/; Max-Age=900"
        );
        security.secure_cookies = true;
        assert!(session_cookie("abc", &security).ends_with("; Secure"));
        assert!(clear_session_cookie(&security).contains("Max-Age=0"));
    }

    #[test]
    fn extracts_token_among_other_cookies() {
        assert_eq!(token_from_cookie_header("theme=dark; accessToken=tok.en.x; lang=en"), Some("tok.en.x"));
        assert_eq!(token_from_cookie_header("accessToken="), None);
        assert_eq!(token_from_cookie_header("theme=dark"), None);
    }
}
