//! # Gateway Rewriting
//!
//! Token URIs routinely arrive as `ipfs://` URIs or point at gateways that
//! refuse cross-origin fetches. Both get rewritten onto one canonical HTTP
//! gateway before anything tries to fetch them.

use url::form_urlencoded;

/// The canonical IPFS gateway host everything is rewritten onto.
pub const DEFAULT_GATEWAY_HOST: &str = "gateway.pinata.cloud";

/// The gateway host that gets rewritten away (rate-limits browser fetches).
const REWRITTEN_HOST: &str = "ipfs.io";

/// Rewrites a token URI to a fetchable HTTP URL.
///
/// - `ipfs://<cid>` becomes `https://gateway.pinata.cloud/ipfs/<cid>`
/// - any URL mentioning `ipfs.io` is pointed at the canonical gateway
/// - everything else passes through untouched
#[must_use]
pub fn to_http_url(uri: &str) -> String {
    if uri.is_empty() {
        return String::new();
    }
    let mut rewritten = uri.to_string();
    if let Some(cid) = rewritten.strip_prefix("ipfs://") {
        rewritten = format!("https://{DEFAULT_GATEWAY_HOST}/ipfs/{cid}");
    }
    if rewritten.contains(REWRITTEN_HOST) {
        rewritten = rewritten.replace(REWRITTEN_HOST, DEFAULT_GATEWAY_HOST);
    }
    rewritten
}

/// Builds the relay URL for `target`.
///
/// `proxy_base` is the relay origin (empty for same-origin use); the target
/// is percent-encoded into the `url` query parameter the relay expects.
#[must_use]
pub fn proxied(proxy_base: &str, target: &str) -> String {
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("url", target)
        .finish();
    format!("{}/api/proxy?{query}", proxy_base.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipfs_scheme_is_rewritten() {
        assert_eq!(
            to_http_url("ipfs://QmHash/1.json"),
            "https://gateway.pinata.cloud/ipfs/QmHash/1.json"
        );
    }

    #[test]
    fn test_ipfs_io_host_is_rewritten() {
        assert_eq!(
            to_http_url("https://ipfs.io/ipfs/QmHash"),
            "https://gateway.pinata.cloud/ipfs/QmHash"
        );
    }

    #[test]
    fn test_plain_https_passes_through() {
        let url = "https://example.com/meta/1.json";
        assert_eq!(to_http_url(url), url);
    }

    #[test]
    fn test_empty_uri_stays_empty() {
        assert_eq!(to_http_url(""), "");
    }

    #[test]
    fn test_proxied_percent_encodes_the_target() {
        let url = proxied("", "https://example.com/a?b=c&d=e");
        assert_eq!(
            url,
            "/api/proxy?url=https%3A%2F%2Fexample.com%2Fa%3Fb%3Dc%26d%3De"
        );
    }

    #[test]
    fn test_proxied_joins_base_cleanly() {
        let url = proxied("http://127.0.0.1:8080/", "https://example.com/x");
        assert!(url.starts_with("http://127.0.0.1:8080/api/proxy?url="));
    }
}
