// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of `DnsProvider`.
//
// Each trait method is exactly one HTTP request. The provider does not retry,
// back off, or cache; the reconciler decides what a failure means for the
// domain being processed.
//
// ## Dry-Run Mode
//
// Zone and record lookups are performed as usual. Create, update and delete
// requests are logged with their payload and reported as successful without
// being sent.
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - Provider construction fails if the token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=...&name=...&per_page=50`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`
// - Delete DNS Record: DELETE `/zones/:zone_id/dns_records/:record_id`

mod client;
pub mod types;

use async_trait::async_trait;
use ddns_core::config::ProviderConfig;
use ddns_core::traits::DnsProviderFactory;
use ddns_core::{DnsProvider, Error, Record, RecordPayload, RecordType, Result, Zone};
use reqwest::Method;

use client::ApiClient;
use types::{RecordResult, ZoneResult, written_record_id};

pub use client::{CLOUDFLARE_API_BASE, REQUEST_TIMEOUT};

/// Name used in logs and provider errors
pub const PROVIDER_NAME: &str = "cloudflare";

/// Page size for record lookups
const RECORDS_PER_PAGE: &str = "50";

/// Cloudflare DNS provider
///
/// Stateless apart from the HTTP client; every call re-reads the API.
pub struct CloudflareProvider {
    client: ApiClient,

    /// Dry-run mode: perform GET requests, log writes instead of sending them
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.client.base_url())
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a provider against the public Cloudflare API
    ///
    /// # Errors
    ///
    /// `Error::Config` if the token is empty, `Error::Transport` if the HTTP
    /// client cannot be built.
    pub fn new(api_token: impl Into<String>, dry_run: bool) -> Result<Self> {
        Self::with_base_url(CLOUDFLARE_API_BASE, api_token, dry_run)
    }

    /// Create a provider against another API base URL (mock servers, proxies)
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        dry_run: bool,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        Ok(Self {
            client: ApiClient::new(base_url, api_token)?,
            dry_run,
        })
    }

    /// Create a provider in live mode
    pub fn new_live(api_token: impl Into<String>) -> Result<Self> {
        Self::new(api_token, false)
    }

    /// Create a provider in dry-run mode
    pub fn new_dry_run(api_token: impl Into<String>) -> Result<Self> {
        Self::new(api_token, true)
    }

    /// Whether writes are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn records_path(zone_id: &str) -> String {
        format!("zones/{}/dns_records", zone_id)
    }

    fn record_path(zone_id: &str, record_id: &str) -> String {
        format!("zones/{}/dns_records/{}", zone_id, record_id)
    }

    fn log_dry_run(&self, method: Method, path: &str, payload: Option<&RecordPayload>) {
        match payload.map(serde_json::to_string) {
            Some(Ok(body)) => tracing::info!(
                "[DRY-RUN] Would send {} {}/{} with payload: {}",
                method,
                self.client.base_url(),
                path,
                body
            ),
            _ => tracing::info!(
                "[DRY-RUN] Would send {} {}/{}",
                method,
                self.client.base_url(),
                path
            ),
        }
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn find_zone(&self, top_domain: &str) -> Result<Zone> {
        tracing::debug!("Looking up zone for {}", top_domain);

        let zones = self
            .client
            .get::<Vec<ZoneResult>>("zones", &[("name", top_domain)])
            .await?
            .into_result()?
            .unwrap_or_default();

        let zone = zones
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("Zone not found: {}", top_domain)))?;

        tracing::debug!("Found zone {} ({})", zone.name, zone.id);
        Ok(zone.into())
    }

    async fn list_records(
        &self,
        zone_id: &str,
        record_type: RecordType,
        fqdn: &str,
    ) -> Result<Vec<Record>> {
        let records = self
            .client
            .get::<Vec<RecordResult>>(
                &Self::records_path(zone_id),
                &[
                    ("type", record_type.as_str()),
                    ("name", fqdn),
                    ("per_page", RECORDS_PER_PAGE),
                ],
            )
            .await?
            .into_result()?
            .unwrap_or_default();

        Ok(records.into_iter().map(Record::from).collect())
    }

    async fn create_record(&self, zone_id: &str, payload: &RecordPayload) -> Result<()> {
        let path = Self::records_path(zone_id);
        if self.dry_run {
            self.log_dry_run(Method::POST, &path, Some(payload));
            return Ok(());
        }

        let created = self
            .client
            .send::<_, serde_json::Value>(Method::POST, &path, payload)
            .await?
            .into_result()?;

        if let Some(id) = created.as_ref().and_then(written_record_id) {
            tracing::debug!("Cloudflare assigned record id {}", id);
        }
        Ok(())
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> Result<()> {
        let path = Self::record_path(zone_id, record_id);
        if self.dry_run {
            self.log_dry_run(Method::PUT, &path, Some(payload));
            return Ok(());
        }

        self.client
            .send::<_, serde_json::Value>(Method::PUT, &path, payload)
            .await?
            .into_result()?;
        Ok(())
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()> {
        let path = Self::record_path(zone_id, record_id);
        if self.dry_run {
            self.log_dry_run(Method::DELETE, &path, None);
            return Ok(());
        }

        let deleted = self
            .client
            .delete::<serde_json::Value>(&path)
            .await?
            .into_result()?;

        if let Some(id) = deleted.as_ref().and_then(written_record_id) {
            tracing::debug!("Cloudflare confirmed deletion of {}", id);
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating Cloudflare providers
pub struct CloudflareFactory;

impl DnsProviderFactory for CloudflareFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::Cloudflare { api_token, dry_run } => {
                if api_token.trim().is_empty() {
                    return Err(Error::config("Cloudflare API token is required"));
                }

                if *dry_run {
                    tracing::warn!(
                        "Cloudflare provider running in DRY-RUN mode - no changes will be made"
                    );
                }

                Ok(Box::new(CloudflareProvider::new(api_token.clone(), *dry_run)?))
            }
        }
    }
}

/// Register the Cloudflare provider with a registry
///
/// # Example
///
/// ```rust
/// use ddns_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// ddns_provider_cloudflare::register(&registry);
/// assert!(registry.has_provider("cloudflare"));
/// ```
pub fn register(registry: &ddns_core::ProviderRegistry) {
    registry.register_provider(PROVIDER_NAME, Box::new(CloudflareFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_creation() {
        let factory = CloudflareFactory;

        let config = ProviderConfig::Cloudflare {
            api_token: "test_token".to_string(),
            dry_run: false,
        };

        let provider = factory.create(&config).unwrap();
        assert_eq!(provider.provider_name(), "cloudflare");
    }

    #[test]
    fn test_factory_missing_token() {
        let factory = CloudflareFactory;

        let config = ProviderConfig::Cloudflare {
            api_token: "".to_string(),
            dry_run: false,
        };

        assert!(matches!(factory.create(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(
            CloudflareProvider::new("  ", false),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_dry_run_mode() {
        let provider_dry = CloudflareProvider::new_dry_run("token").unwrap();
        let provider_live = CloudflareProvider::new_live("token").unwrap();

        assert!(provider_dry.is_dry_run(), "Dry-run provider should have dry_run=true");
        assert!(!provider_live.is_dry_run(), "Live provider should have dry_run=false");
    }

    #[test]
    fn test_api_token_not_exposed_in_debug() {
        let provider = CloudflareProvider::new("secret_token_12345", false).unwrap();

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_token"));
        assert!(debug_str.contains("CloudflareProvider"));
        assert!(debug_str.contains(CLOUDFLARE_API_BASE));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider =
            CloudflareProvider::with_base_url("http://127.0.0.1:9/client/v4/", "token", false)
                .unwrap();
        assert_eq!(provider.client.base_url(), "http://127.0.0.1:9/client/v4");
    }

    #[test]
    fn test_register() {
        let registry = ddns_core::ProviderRegistry::new();
        register(&registry);
        assert!(registry.has_provider("cloudflare"));
    }
}
