use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration as TimeDuration;

use crate::services::auth::service::ProviderSession;

pub const ACCESS_TOKEN_COOKIE: &str = "hm_access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "hm_refresh_token";
pub const CODE_VERIFIER_COOKIE: &str = "hm_code_verifier";

pub const CODE_VERIFIER_TTL_MINUTES: i64 = 10;
pub const DEFAULT_ACCESS_TTL_SECONDS: i64 = 3600;
pub const REFRESH_TTL_DAYS: i64 = 30;

pub fn http_only_cookie(
    name: &'static str,
    value: String,
    max_age: TimeDuration,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

/// Cookie that overwrites `name` with an already-expired value.
pub fn expired_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    http_only_cookie(name, String::new(), TimeDuration::seconds(0), secure)
}

/// Stores a provider session. The access cookie lives as long as the token;
/// the refresh cookie is only replaced when the provider rotated it.
pub fn with_session_cookies(jar: CookieJar, session: &ProviderSession, secure: bool) -> CookieJar {
    let access_ttl = session
        .expires_in
        .filter(|ttl| *ttl > 0)
        .unwrap_or(DEFAULT_ACCESS_TTL_SECONDS);
    let jar = jar.add(http_only_cookie(
        ACCESS_TOKEN_COOKIE,
        session.access_token.clone(),
        TimeDuration::seconds(access_ttl),
        secure,
    ));
    match session.refresh_token.clone().filter(|t| !t.is_empty()) {
        Some(refresh) => jar.add(http_only_cookie(
            REFRESH_TOKEN_COOKIE,
            refresh,
            TimeDuration::days(REFRESH_TTL_DAYS),
            secure,
        )),
        None => jar,
    }
}

pub fn without_session_cookies(jar: CookieJar, secure: bool) -> CookieJar {
    jar.add(expired_cookie(ACCESS_TOKEN_COOKIE, secure))
        .add(expired_cookie(REFRESH_TOKEN_COOKIE, secure))
}
