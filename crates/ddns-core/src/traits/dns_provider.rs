// # DNS Provider Trait
//
// Defines the record API the reconciler drives: zone resolution, record
// lookup, and record create/update/delete.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{DnsProvider, RecordType};
//
// let zone = provider.find_zone("example.com").await?;
// let records = provider
//     .list_records(&zone.id, RecordType::A, "www.example.com")
//     .await?;
// ```

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::domain::RecordType;

/// Provider zone (administrative unit for a top-level domain)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Provider zone identifier
    pub id: String,
    /// Zone name (e.g. "example.com")
    pub name: String,
}

/// A DNS record held by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Provider record identifier
    pub id: String,
    /// Record type
    pub record_type: RecordType,
    /// Fully-qualified record name
    pub name: String,
    /// Record content (the IP address)
    pub content: String,
    /// Whether traffic is proxied through the provider
    pub proxied: bool,
    /// Creation timestamp as returned by the provider (RFC 3339)
    pub created_on: String,
    /// Modification timestamp as returned by the provider (RFC 3339)
    pub modified_on: String,
}

impl Record {
    /// Timestamp used to elect the latest duplicate
    ///
    /// `created_on` wins; `modified_on` is the fallback. `None` when neither
    /// parses as RFC 3339.
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.created_on)
            .or_else(|_| DateTime::parse_from_rfc3339(&self.modified_on))
            .ok()
    }
}

/// Body of a create or update request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordPayload {
    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Record name (subdomain label on create, full name on update)
    pub name: String,
    /// Desired content (the IP address)
    pub content: String,
    /// Time-to-live in seconds (1 = provider automatic)
    pub ttl: u32,
    /// Whether traffic is proxied through the provider
    pub proxied: bool,
}

/// Trait for DNS provider implementations
///
/// Each method is a single request against the provider. Implementations do
/// not retry, do not cache, and report provider-side failures as
/// [`crate::Error::Transport`], [`crate::Error::Provider`] or
/// [`crate::Error::NotFound`].
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Resolve the zone for a top-level domain
    ///
    /// # Returns
    ///
    /// - `Ok(Zone)`: The first matching zone
    /// - `Err(Error::NotFound)`: No zone with that name
    /// - `Err(Error)`: Transport or provider failure
    async fn find_zone(&self, top_domain: &str) -> Result<Zone, crate::Error>;

    /// List records of `record_type` named `fqdn` in a zone
    ///
    /// Order is provider-defined. A response with `success: false` is an error.
    async fn list_records(
        &self,
        zone_id: &str,
        record_type: RecordType,
        fqdn: &str,
    ) -> Result<Vec<Record>, crate::Error>;

    /// Create a record
    async fn create_record(
        &self,
        zone_id: &str,
        payload: &RecordPayload,
    ) -> Result<(), crate::Error>;

    /// Replace an existing record
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> Result<(), crate::Error>;

    /// Delete a record
    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
