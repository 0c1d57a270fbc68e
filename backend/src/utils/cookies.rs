use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

#[derive(Debug, Clone, Copy)]
pub struct CookieOptions {
    pub secure: bool,
    pub same_site: SameSite,
}

pub const SESSION_COOKIE_NAME: &str = "session_secret";
pub const ORGANIZATION_COOKIE_NAME: &str = "c_org";
pub const COOKIE_PATH: &str = "/";

/// The client-side lifetime is independent of the server-side session expiry;
/// every request re-validates the token.
pub fn build_session_cookie(token: &str, max_age: Duration, options: CookieOptions) -> String {
    build_cookie(SESSION_COOKIE_NAME, token, max_age, true, options)
}

pub fn build_clear_session_cookie(options: CookieOptions) -> String {
    build_cookie(SESSION_COOKIE_NAME, "", Duration::ZERO, true, options)
}

/// Readable by the frontend so it can restore the selected organization.
pub fn build_organization_cookie(
    organization_id: &str,
    max_age: Duration,
    options: CookieOptions,
) -> String {
    build_cookie(
        ORGANIZATION_COOKIE_NAME,
        organization_id,
        max_age,
        false,
        options,
    )
}

fn build_cookie(
    name: &str,
    value: &str,
    max_age: Duration,
    http_only: bool,
    options: CookieOptions,
) -> String {
    let mut cookie = format!(
        "{}={}; Path={}; Max-Age={}",
        name,
        value,
        COOKIE_PATH,
        max_age.as_secs()
    );
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    cookie.push_str("; SameSite=");
    cookie.push_str(same_site_value(options.same_site));
    if options.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn extract_cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key.trim() == name {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}

fn same_site_value(same_site: SameSite) -> &'static str {
    match same_site {
        SameSite::Lax => "Lax",
        SameSite::Strict => "Strict",
        SameSite::None => "None",
    }
}
