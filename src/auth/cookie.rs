//! Token transport over HTTP cookies.

use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Cookie carrying the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

const COOKIE_PATH: &str = "/";

/// Sets, clears and reads token cookies.
///
/// Every cookie is `HttpOnly`, `SameSite=Lax`, `Path=/`, and `Secure` unless
/// disabled for plain-HTTP development. Set and clear share one attribute set,
/// otherwise browsers keep the old cookie.
#[derive(Debug, Clone, Copy)]
pub struct CookieTransport {
    secure: bool,
}

impl CookieTransport {
    /// Create a transport; `secure` controls the `Secure` attribute.
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    fn base(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path(COOKIE_PATH)
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build()
    }

    /// Add a cookie named `name` holding `token`, living as long as the token.
    pub fn attach(
        &self,
        jar: CookieJar,
        name: &'static str,
        token: String,
        ttl: Duration,
    ) -> CookieJar {
        let mut cookie = self.base(name, token);
        cookie.set_max_age(time::Duration::seconds(
            i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
        ));
        jar.add(cookie)
    }

    /// Add a deletion directive for `name`.
    ///
    /// The directive is emitted whether or not the request carried the cookie.
    pub fn clear(&self, jar: CookieJar, name: &'static str) -> CookieJar {
        let mut cookie = self.base(name, String::new());
        cookie.make_removal();
        jar.add(cookie)
    }

    /// Read the token stored under `name`, ignoring empty values.
    pub fn extract<'a>(&self, jar: &'a CookieJar, name: &str) -> Option<&'a str> {
        jar.get(name)
            .map(|cookie| cookie.value())
            .filter(|value| !value.is_empty())
    }
}

impl Default for CookieTransport {
    fn default() -> Self {
        Self::new(true)
    }
}
