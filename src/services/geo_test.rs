use super::*;
use axum::http::HeaderValue;

fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.insert(*name, HeaderValue::from_static(value));
    }
    map
}

fn peer() -> Option<SocketAddr> {
    Some("203.0.113.9:51234".parse().unwrap())
}

#[test]
fn client_ip_prefers_client_ip_header() {
    let h = headers(&[("x-client-ip", "198.51.100.1"), ("x-forwarded-for", "192.0.2.1")]);
    assert_eq!(client_ip(&h, peer()), Some("198.51.100.1".parse().unwrap()));
}

#[test]
fn client_ip_uses_first_forwarded_hop() {
    let h = headers(&[("x-forwarded-for", " 192.0.2.1 , 10.0.0.1")]);
    assert_eq!(client_ip(&h, peer()), Some("192.0.2.1".parse().unwrap()));
}

#[test]
fn client_ip_falls_back_to_peer() {
    assert_eq!(client_ip(&HeaderMap::new(), peer()), Some("203.0.113.9".parse().unwrap()));
    assert_eq!(client_ip(&HeaderMap::new(), None), None);
}

#[test]
fn client_ip_invalid_header_does_not_fall_through() {
    let h = headers(&[("x-client-ip", "not-an-ip")]);
    assert_eq!(client_ip(&h, peer()), None);
}

#[test]
fn client_ip_accepts_ipv6() {
    let h = headers(&[("x-forwarded-for", "2001:db8::1")]);
    assert_eq!(client_ip(&h, None), Some("2001:db8::1".parse().unwrap()));
}

#[test]
fn parse_country_variants() {
    assert_eq!(parse_country(r#"{"countryName":"Germany","ipVersion":4}"#), "Germany");
    assert_eq!(parse_country(r#"{"countryName":"  "}"#), UNKNOWN_COUNTRY);
    assert_eq!(parse_country(r#"{"ipVersion":4}"#), UNKNOWN_COUNTRY);
    assert_eq!(parse_country("<html>"), DECODE_ERROR);
}

#[tokio::test]
async fn disabled_locator_skips_network() {
    let geo = GeoLocator::disabled();
    assert_eq!(geo.country_for(&HeaderMap::new(), peer()).await, UNKNOWN_COUNTRY);
}

#[tokio::test]
async fn invalid_ip_reported_before_lookup() {
    let geo = GeoLocator::disabled();
    let h = headers(&[("x-client-ip", "bogus")]);
    assert_eq!(geo.country_for(&h, peer()).await, INVALID_IP);
}
