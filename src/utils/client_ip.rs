//! Client IP resolution for per-client rate limiting.

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Resolves the address a request should be attributed to.
///
/// With `behind_proxy` unset only the socket peer counts, since forwarding
/// headers are client-controlled. Behind a proxy the left-most
/// `X-Forwarded-For` entry wins, then `X-Real-IP`, then the peer.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> IpAddr {
    if !behind_proxy {
        return peer.ip();
    }

    forwarded_for(headers)
        .or_else(|| header_ip(headers, X_REAL_IP))
        .unwrap_or_else(|| peer.ip())
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get(X_FORWARDED_FOR)?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .and_then(|first| first.trim().parse().ok())
}

fn header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "10.0.0.9:51234".parse().unwrap()
    }

    #[test]
    fn test_peer_used_when_not_behind_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.5"));

        assert_eq!(
            client_ip(&headers, peer(), false),
            "10.0.0.9".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_forwarded_for_first_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static("203.0.113.5, 70.41.3.18, 150.172.238.178"),
        );
        headers.insert(X_REAL_IP, HeaderValue::from_static("198.51.100.1"));

        assert_eq!(
            client_ip(&headers, peer(), true),
            "203.0.113.5".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REAL_IP, HeaderValue::from_static("2001:db8::1"));

        assert_eq!(
            client_ip(&headers, peer(), true),
            "2001:db8::1".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_garbage_headers_fall_back_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("not-an-ip"));

        assert_eq!(
            client_ip(&headers, peer(), true),
            "10.0.0.9".parse::<IpAddr>().unwrap()
        );
    }
}
