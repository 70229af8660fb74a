//! Client IP resolution for rate limiting.
//!
//! The server runs behind proxies in every deployment, so the socket peer
//! address is useless; the real client IP arrives in a forwarding header.

use axum::http::HeaderMap;

/// Forwarding headers in trust order. The first present one wins.
const IP_HEADERS: [&str; 4] = [
    "cf-connecting-ip",
    "x-forwarded-for",
    "x-real-ip",
    "fly-client-ip",
];

/// Resolve the client IP from forwarding headers.
///
/// `x-forwarded-for` may carry a proxy chain; only the first hop is the
/// client. Requests with no forwarding header at all share the `unknown`
/// rate-limit bucket.
#[must_use]
pub fn client_ip(headers: &HeaderMap) -> String {
    for name in IP_HEADERS {
        if let Some(value) = headers.get(name).and_then(|h| h.to_str().ok()) {
            let first_hop = value.split(',').next().unwrap_or(value).trim();
            if !first_hop.is_empty() {
                return first_hop.to_string();
            }
        }
    }
    "unknown".to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_missing_headers_fall_back_to_unknown() {
        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn test_cloudflare_header_wins() {
        let map = headers(&[
            ("cf-connecting-ip", "203.0.113.7"),
            ("x-forwarded-for", "10.0.0.1"),
        ]);
        assert_eq!(client_ip(&map), "203.0.113.7");
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let map = headers(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1, 172.16.0.1")]);
        assert_eq!(client_ip(&map), "203.0.113.7");
    }

    #[test]
    fn test_empty_header_is_skipped() {
        let map = headers(&[("cf-connecting-ip", ""), ("x-real-ip", "198.51.100.2")]);
        assert_eq!(client_ip(&map), "198.51.100.2");
    }
}
