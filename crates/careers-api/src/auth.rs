//! Operator session: a single shared secret exchanged for an HTTP-only
//! session cookie. Every operator route extracts [`AdminSession`] and gets a
//! 401 when the cookie is absent or wrong.

use axum::async_trait;
use axum::extract::FromRef;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::error::ApiError;

pub const SESSION_COOKIE: &str = "careers_admin";
const SESSION_VALUE: &str = "authenticated";
const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Server-held shared secret compared against the login payload.
    pub admin_password: String,
    /// Secure flag on the cookie; on in production, off for local HTTP.
    pub cookie_secure: bool,
}

impl SessionConfig {
    pub fn verify_password(&self, provided: &str) -> bool {
        !self.admin_password.is_empty() && provided == self.admin_password
    }

    /// Cookie set on a successful login: HTTP-only, SameSite=Strict, fixed
    /// 24-hour expiry.
    pub fn session_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, SESSION_VALUE))
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Strict)
            .max_age(time::Duration::hours(SESSION_TTL_HOURS))
            .build()
    }

    /// Expired twin of the session cookie, used by logout.
    pub fn logout_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Strict)
            .max_age(time::Duration::ZERO)
            .build()
    }
}

pub fn is_authenticated(jar: &CookieJar) -> bool {
    jar.get(SESSION_COOKIE)
        .is_some_and(|cookie| cookie.value() == SESSION_VALUE)
}

/// Extractor gating operator routes.
#[derive(Debug, Clone)]
pub struct AdminSession;

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    SessionConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        if is_authenticated(&jar) {
            Ok(AdminSession)
        } else {
            Err(ApiError::Unauthorized("operator session required".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secure: bool) -> SessionConfig {
        SessionConfig {
            admin_password: "hunter2".into(),
            cookie_secure: secure,
        }
    }

    #[test]
    fn password_check_is_exact() {
        let config = config(false);
        assert!(config.verify_password("hunter2"));
        assert!(!config.verify_password("hunter2 "));
        assert!(!config.verify_password(""));
    }

    #[test]
    fn empty_server_secret_never_authenticates() {
        let config = SessionConfig {
            admin_password: String::new(),
            cookie_secure: false,
        };
        assert!(!config.verify_password(""));
    }

    #[test]
    fn session_cookie_is_hardened() {
        let cookie = config(true).session_cookie();
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), SESSION_VALUE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(24)));
    }

    #[test]
    fn logout_cookie_expires_immediately() {
        let cookie = config(false).logout_cookie();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }

    #[test]
    fn jar_without_session_is_anonymous() {
        let jar = CookieJar::default();
        assert!(!is_authenticated(&jar));

        let jar = jar.add(Cookie::new(SESSION_COOKIE, "wrong"));
        assert!(!is_authenticated(&jar));

        let jar = CookieJar::default().add(Cookie::new(SESSION_COOKIE, SESSION_VALUE));
        assert!(is_authenticated(&jar));
    }
}
