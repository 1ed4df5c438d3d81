//! Rate limiting for credential endpoints using governor and `tower_governor`.
//!
//! `POST /login` and `POST /register` are the only endpoints that do
//! password hashing, so they are the only ones limited.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Proxy headers consulted for the client address, in order.
const CLIENT_IP_HEADERS: [&str; 2] = ["x-forwarded-for", "x-real-ip"];

/// Key extractor keyed on the client IP.
///
/// Prefers the first address in a proxy header, then falls back to the
/// peer address recorded by `into_make_service_with_connect_info`.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        forwarded_ip(req.headers())
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    CLIENT_IP_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    })
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for credential endpoints: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
///
/// # Panics
///
/// Never panics: `per_second(6)` and `burst_size(5)` are always accepted by
/// `GovernorConfigBuilder`.
#[must_use]
#[allow(clippy::expect_used)]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/login");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_prefers_first_forwarded_address() {
        let req = request(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1")]);
        let ip = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_falls_back_to_connect_info() {
        let mut req = request(&[]);
        let peer: SocketAddr = "192.0.2.4:5123".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));
        assert_eq!(ClientIpKeyExtractor.extract(&req).unwrap(), peer.ip());
    }

    #[test]
    fn test_no_address_is_an_error() {
        assert!(ClientIpKeyExtractor.extract(&request(&[])).is_err());
    }
}
