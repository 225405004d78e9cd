//! Session cookie handling
//!
//! Builds the `Set-Cookie` values for `/jwt` and `/logOut` and pulls the
//! session token back out of a request's `Cookie` headers.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use cookie::{Cookie, SameSite};

/// Cookie name for the session token
pub const SESSION_COOKIE_NAME: &str = "token";

/// Configuration for session cookies
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub secure: bool,
    pub path: String,
    pub same_site: SameSite,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: true,
            path: "/".to_string(),
            same_site: SameSite::Strict,
        }
    }
}

impl CookieConfig {
    /// Cookie settings for the deployment environment
    ///
    /// Production serves the browser client from another site, so the
    /// cookie must be sent cross-site.
    pub fn for_environment(production: bool) -> Self {
        Self {
            same_site: if production {
                SameSite::None
            } else {
                SameSite::Strict
            },
            ..Default::default()
        }
    }
}

/// HttpOnly cookie carrying a freshly issued session token
pub fn session_cookie(token: &str, config: &CookieConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token.to_string()))
        .path(config.path.clone())
        .http_only(true)
        .secure(config.secure)
        .same_site(config.same_site)
        .build()
}

/// Expired cookie that makes the browser drop the session token
pub fn logout_cookie(config: &CookieConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path(config.path.clone())
        .http_only(true)
        .secure(config.secure)
        .same_site(config.same_site)
        .max_age(cookie::time::Duration::ZERO)
        .expires(cookie::time::OffsetDateTime::UNIX_EPOCH)
        .build()
}

/// Extract the session token from request cookies
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE_NAME && !c.value().is_empty())
        .map(|c| c.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("a.b.c", &CookieConfig::for_environment(false));

        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "a.b.c");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_production_cookie_is_cross_site() {
        let cookie = session_cookie("a.b.c", &CookieConfig::for_environment(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn test_logout_cookie_expires_immediately() {
        let cookie = logout_cookie(&CookieConfig::default());
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(cookie::time::Duration::ZERO));
    }

    #[test]
    fn test_extract_session_token() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("lang=en; token=a.b.c"));

        assert_eq!(extract_session_token(&headers), Some("a.b.c".to_string()));
    }

    #[test]
    fn test_extract_session_token_missing() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_session_token(&headers), None);

        headers.insert(COOKIE, HeaderValue::from_static("token="));
        assert_eq!(extract_session_token(&headers), None);
    }
}
