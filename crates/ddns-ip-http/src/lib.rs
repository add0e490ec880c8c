// # HTTP IP Source
//
// This crate provides an HTTP-based IP source for the DDNS system.
//
// ## Behaviour
//
// Each call to `current` fetches the configured URL once (10 second timeout)
// and extracts the first address of the requested family from the body.
// Plain-text responses ("203.0.113.5\n") and small JSON documents
// (`{"ip":"203.0.113.5"}`) both work.
//
// A source answers only for the record type it was created for; any other
// type gets `Ok(None)`. Nothing is cached between calls.

use ddns_core::ProviderRegistry;
use ddns_core::config::IpSourceConfig;
use ddns_core::traits::{IpSource, IpSourceFactory};
use ddns_core::{Error, RecordType, Result};

use std::net::IpAddr;
use std::time::Duration;

/// Default IPv4 lookup service (plain text)
pub const DEFAULT_IPV4_URL: &str = "https://api.ipify.org";

/// Default IPv6 lookup service (plain text)
pub const DEFAULT_IPV6_URL: &str = "https://api6.ipify.org";

/// Per-request deadline
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based IP source
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// Record type this source answers for
    record_type: RecordType,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "https://api.ipify.org")
    /// - `record_type`: family to extract from the response
    pub fn new(url: impl Into<String>, record_type: RecordType) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| Error::ip_source(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            record_type,
            client,
        })
    }

    /// Fetch current IP from HTTP service
    async fn fetch_ip(&self) -> Result<IpAddr> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::ip_source(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(Error::ip_source(format!(
                "{} returned HTTP {}",
                self.url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::ip_source(format!("Failed to read response: {}", e)))?;

        extract_address(&body, self.record_type).ok_or_else(|| {
            Error::ip_source(format!(
                "No {} address in response from {}",
                self.record_type, self.url
            ))
        })
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self, record_type: RecordType) -> Result<Option<IpAddr>> {
        if record_type != self.record_type {
            return Ok(None);
        }

        let ip = self.fetch_ip().await?;
        tracing::debug!("{} reports {} address {}", self.url, record_type, ip);
        Ok(Some(ip))
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

/// First address of the family of `record_type` found in `body`
fn extract_address(body: &str, record_type: RecordType) -> Option<IpAddr> {
    body.split(|c: char| !(c.is_ascii_hexdigit() || c == '.' || c == ':'))
        .filter(|token| !token.is_empty())
        .filter_map(|token| {
            // "address:203.0.113.5" leaves a stray leading colon
            token
                .parse::<IpAddr>()
                .or_else(|_| token.trim_matches(':').parse())
                .ok()
        })
        .find(|ip| record_type.matches(ip))
}

/// Factory for creating HTTP IP sources
pub struct HttpFactory;

impl IpSourceFactory for HttpFactory {
    fn create(
        &self,
        config: &IpSourceConfig,
        record_type: RecordType,
    ) -> Result<Box<dyn IpSource>> {
        match config {
            IpSourceConfig::Http { url } => {
                config.validate(record_type)?;
                Ok(Box::new(HttpIpSource::new(url.clone(), record_type)?))
            }
            _ => Err(Error::config("Invalid config for HTTP IP source")),
        }
    }
}

/// Register the HTTP IP source with a registry
pub fn register(registry: &ProviderRegistry) {
    registry.register_ip_source("http", Box::new(HttpFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_text() {
        assert_eq!(
            extract_address("203.0.113.5\n", RecordType::A),
            Some("203.0.113.5".parse().unwrap())
        );
        assert_eq!(extract_address("203.0.113.5\n", RecordType::Aaaa), None);
    }

    #[test]
    fn test_extract_from_json() {
        let body = r#"{"ip":"2001:db8::5","country":"NL"}"#;
        assert_eq!(
            extract_address(body, RecordType::Aaaa),
            Some("2001:db8::5".parse().unwrap())
        );
    }

    #[test]
    fn test_extract_skips_other_family() {
        let body = "ipv6=2001:db8::1 ipv4=198.51.100.7";
        assert_eq!(
            extract_address(body, RecordType::A),
            Some("198.51.100.7".parse().unwrap())
        );
    }

    #[test]
    fn test_extract_after_label() {
        assert_eq!(
            extract_address("Current IP Address: 203.0.113.9", RecordType::A),
            Some("203.0.113.9".parse().unwrap())
        );
        assert_eq!(
            extract_address("::1", RecordType::Aaaa),
            Some("::1".parse().unwrap())
        );
    }

    #[test]
    fn test_extract_nothing() {
        assert_eq!(extract_address("<html>rate limited</html>", RecordType::A), None);
        assert_eq!(extract_address("", RecordType::Aaaa), None);
    }

    #[test]
    fn test_factory_creation() {
        let factory = HttpFactory;

        let config = IpSourceConfig::Http {
            url: "https://api.ipify.org".to_string(),
        };

        let source = factory.create(&config, RecordType::A).unwrap();
        assert_eq!(source.source_name(), "http");
    }

    #[test]
    fn test_factory_rejects_bad_scheme_and_other_types() {
        let factory = HttpFactory;

        let bad_url = IpSourceConfig::Http {
            url: "ftp://example.com/ip".to_string(),
        };
        assert!(matches!(factory.create(&bad_url, RecordType::A), Err(Error::Config(_))));

        let fixed = IpSourceConfig::Static {
            address: "203.0.113.5".parse().unwrap(),
        };
        assert!(factory.create(&fixed, RecordType::A).is_err());
    }

    #[test]
    fn test_register() {
        let registry = ProviderRegistry::new();
        register(&registry);
        assert!(registry.has_ip_source("http"));
        assert!(registry.has_ip_source("static"));
    }
}
