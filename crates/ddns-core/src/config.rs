//! Configuration types for the DDNS system
//!
//! This module defines all configuration structures used throughout the crate.
//! Configuration is plain serde data; it can be loaded from a JSON file with
//! [`DdnsConfig::from_file`] or assembled by the embedding binary.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::Path;

use crate::domain::{Domain, DomainSet, RecordType};
use crate::error::{Error, Result};

/// TTL value the provider treats as "automatic"
pub const AUTO_TTL: u32 = 1;

/// Accepted explicit TTL range in seconds
const TTL_RANGE: std::ops::RangeInclusive<u32> = 60..=86400;

/// Main DDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// A records to manage
    #[serde(default)]
    pub ipv4: Option<RecordSetConfig>,

    /// AAAA records to manage
    #[serde(default)]
    pub ipv6: Option<RecordSetConfig>,

    /// Settings applied to written records
    #[serde(default)]
    pub records: RecordSettings,
}

impl DdnsConfig {
    /// Create a configuration for a provider with no record sets
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            ipv4: None,
            ipv6: None,
            records: RecordSettings::default(),
        }
    }

    /// Load a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Record set configured for a record type
    pub fn record_set(&self, record_type: RecordType) -> Option<&RecordSetConfig> {
        match record_type {
            RecordType::A => self.ipv4.as_ref(),
            RecordType::Aaaa => self.ipv6.as_ref(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.provider.validate()?;
        self.records.validate()?;

        let mut managed = 0;
        for record_type in RecordType::ALL {
            if let Some(set) = self.record_set(record_type) {
                set.validate(record_type)?;
                managed += set.domains.len();
            }
        }

        if managed == 0 {
            return Err(Error::config("No domains configured"));
        }

        Ok(())
    }

    /// Parse the configured domain names into a [`DomainSet`]
    pub fn domain_set(&self) -> Result<DomainSet> {
        let parse = |set: Option<&RecordSetConfig>| -> Result<Vec<Domain>> {
            set.map(|set| set.domains.iter().map(|d| Domain::parse(d)).collect())
                .unwrap_or_else(|| Ok(Vec::new()))
        };

        Ok(DomainSet::new(
            parse(self.ipv4.as_ref())?,
            parse(self.ipv6.as_ref())?,
        ))
    }
}

/// Domains managed for one record type, and where their address comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSetConfig {
    /// Source of the desired address
    pub ip_source: IpSourceConfig,

    /// Managed domain names (`www.example.com`, `www:example.co.uk`)
    #[serde(default)]
    pub domains: Vec<String>,
}

impl RecordSetConfig {
    /// Create a record set
    pub fn new(ip_source: IpSourceConfig, domains: Vec<String>) -> Self {
        Self { ip_source, domains }
    }

    fn validate(&self, record_type: RecordType) -> Result<()> {
        self.ip_source.validate(record_type)?;
        for domain in &self.domains {
            Domain::parse(domain)?;
        }
        Ok(())
    }
}

/// IP source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpSourceConfig {
    /// Fixed address
    Static {
        /// The address to publish
        address: IpAddr,
    },

    /// HTTP-based IP source (uses external service)
    Http {
        /// URL to fetch IP from
        url: String,
    },
}

impl IpSourceConfig {
    /// Validate the IP source configuration
    pub fn validate(&self, record_type: RecordType) -> Result<()> {
        match self {
            IpSourceConfig::Static { address } => {
                if !record_type.matches(address) {
                    return Err(Error::config(format!(
                        "Static address {} cannot be used for {} records",
                        address, record_type
                    )));
                }
                Ok(())
            }
            IpSourceConfig::Http { url } => {
                if url.is_empty() {
                    return Err(Error::config("HTTP IP source URL cannot be empty"));
                }
                if !url.starts_with("https://") && !url.starts_with("http://") {
                    return Err(Error::config(format!(
                        "HTTP IP source URL must use HTTP or HTTPS scheme. Got: {}",
                        url
                    )));
                }
                Ok(())
            }
        }
    }

    /// Get the IP source type name
    pub fn type_name(&self) -> &str {
        match self {
            IpSourceConfig::Static { .. } => "static",
            IpSourceConfig::Http { .. } => "http",
        }
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider
    Cloudflare {
        /// Cloudflare API token
        api_token: String,
        /// Perform reads only; log writes instead of sending them
        #[serde(default)]
        dry_run: bool,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<()> {
        match self {
            ProviderConfig::Cloudflare { api_token, .. } => {
                if api_token.trim().is_empty() {
                    return Err(Error::config("Cloudflare API token cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
        }
    }
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Cloudflare { dry_run, .. } => f
                .debug_struct("Cloudflare")
                .field("api_token", &"<REDACTED>")
                .field("dry_run", dry_run)
                .finish(),
        }
    }
}

/// Settings applied to every written record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSettings {
    /// Time-to-live in seconds; 1 lets the provider choose
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Proxy flag for newly created records (updates keep the existing flag)
    #[serde(default)]
    pub proxied: bool,
}

impl RecordSettings {
    /// Validate the record settings
    pub fn validate(&self) -> Result<()> {
        if self.ttl != AUTO_TTL && !TTL_RANGE.contains(&self.ttl) {
            return Err(Error::config(format!(
                "TTL must be {} (automatic) or between {} and {} seconds. Got: {}",
                AUTO_TTL,
                TTL_RANGE.start(),
                TTL_RANGE.end(),
                self.ttl
            )));
        }
        Ok(())
    }
}

impl Default for RecordSettings {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            proxied: false,
        }
    }
}

fn default_ttl() -> u32 {
    AUTO_TTL
}
