use std::net::IpAddr;

use axum::http::HeaderMap;

use crate::config::Config;

pub const DEFAULT_REDIRECT_PATH: &str = "/dashboard";

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        // Proxies may append; the first entry is the client-facing one.
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn host_without_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

pub fn is_loopback_host(host: &str) -> bool {
    let name = host_without_port(host).to_ascii_lowercase();
    if name == "localhost" || name.ends_with(".localhost") {
        return true;
    }
    match name.parse::<IpAddr>() {
        Ok(ip) => ip.is_loopback() || ip.is_unspecified(),
        Err(_) => false,
    }
}

/// Public origin the browser used to reach us. Loopback hosts are swapped
/// for the canonical origin in production so redirects never point at the
/// container itself.
pub fn request_origin(headers: &HeaderMap, config: &Config) -> String {
    let host = header_value(headers, "x-forwarded-host").or_else(|| header_value(headers, "host"));

    let origin = match host {
        Some(host) => {
            let scheme = header_value(headers, "x-forwarded-proto").unwrap_or_else(|| {
                if is_loopback_host(host) {
                    "http"
                } else {
                    "https"
                }
            });
            format!("{scheme}://{host}")
        }
        None => config.site_url.clone(),
    };

    if config.is_production() && origin_is_loopback(&origin) {
        return config.canonical_origin.clone();
    }
    origin.trim_end_matches('/').to_string()
}

fn origin_is_loopback(origin: &str) -> bool {
    let host = origin
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(origin)
        .split('/')
        .next()
        .unwrap_or_default();
    is_loopback_host(host)
}

/// Only same-site absolute paths are honoured as post-login targets.
pub fn sanitize_redirect_path(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(path)
            if path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\") =>
        {
            path.to_string()
        }
        _ => DEFAULT_REDIRECT_PATH.to_string(),
    }
}
