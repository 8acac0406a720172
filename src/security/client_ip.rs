//! Client address resolution behind reverse proxies.
//!
//! The relay runs behind a proxy that appends the caller's address to
//! `X-Forwarded-For`. With `n` trusted hops the client is the address `n`
//! positions to the left of the socket peer in the chain
//! `[xff_0, xff_1, ..., xff_k, peer]`, capped at the leftmost entry.

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Resolve the rate-limit key for a request.
pub fn client_key(headers: &HeaderMap, peer: Option<IpAddr>, trusted_hops: usize) -> String {
    let peer = peer.map(|ip| ip.to_string()).unwrap_or_else(|| "unknown".to_string());
    if trusted_hops == 0 {
        return peer;
    }

    // Nearest hop first
    let mut chain = vec![peer];
    let forwarded: Vec<String> = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(normalize)
        .collect();
    chain.extend(forwarded.into_iter().rev());

    let index = trusted_hops.min(chain.len() - 1);
    chain.swap_remove(index)
}

/// Canonical form of an address entry; strips ports, keeps unparseable text as-is.
fn normalize(entry: &str) -> String {
    if let Ok(ip) = entry.parse::<IpAddr>() {
        return ip.to_string();
    }
    if let Ok(addr) = entry.parse::<SocketAddr>() {
        return addr.ip().to_string();
    }
    entry.to_string()
}
