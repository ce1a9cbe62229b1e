//! Client address extraction
//!
//! The recorded source address is diagnostics only, never an access-control
//! input, so the first `X-Forwarded-For` entry is taken as-is when it parses
//! as an IP address.

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

/// Best-effort client address: first forwarded-for entry, then `X-Real-IP`,
/// then the socket peer address.
pub fn extract_client_ip(headers: &HeaderMap, socket_addr: Option<&SocketAddr>) -> Option<String> {
    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(first_forwarded_for)
    {
        return Some(ip);
    }

    if let Some(ip) = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ip| is_valid_ip(ip))
    {
        return Some(ip.to_string());
    }

    socket_addr.map(|addr| addr.ip().to_string())
}

fn first_forwarded_for(header_value: &str) -> Option<String> {
    header_value
        .split(',')
        .map(str::trim)
        .find(|s| !s.is_empty())
        .filter(|ip| is_valid_ip(ip))
        .map(String::from)
}

fn is_valid_ip(ip_str: &str) -> bool {
    ip_str.parse::<IpAddr>().is_ok()
}

/// Extractor for the optional client address. Never rejects.
#[derive(Debug, Clone)]
pub struct ClientIpOpt(pub Option<String>);

impl<S> FromRequestParts<S> for ClientIpOpt
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(ClientIpOpt(extract_client_ip(&parts.headers, peer.as_ref())))
    }
}
