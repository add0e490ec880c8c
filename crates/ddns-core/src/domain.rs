// # Domain Model
//
// Managed names, record types and per-domain update status.
//
// A managed name is split into a subdomain label and the top (registrable)
// domain that identifies the provider zone:
//
// - `www.example.com`    -> sub `www`,  top `example.com`
// - `example.com`        -> apex,       top `example.com`
// - `www:example.co.uk`  -> sub `www`,  top `example.co.uk` (explicit split)
//
// Without a colon the last two labels are taken as the top domain.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Record name the provider uses for the zone apex
pub const APEX_RECORD_NAME: &str = "@";

/// Maximum length of a fully-qualified domain name (RFC 1035)
const MAX_NAME_LEN: usize = 253;

/// Maximum length of a single label (RFC 1035)
const MAX_LABEL_LEN: usize = 63;

/// DNS record type managed by the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record
    #[serde(rename = "A")]
    A,
    /// IPv6 address record
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// All managed record types, in processing order
    pub const ALL: [RecordType; 2] = [RecordType::A, RecordType::Aaaa];

    /// Wire name of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }

    /// Whether `ip` belongs to the address family of this record type
    pub fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            RecordType::A => ip.is_ipv4(),
            RecordType::Aaaa => ip.is_ipv6(),
        }
    }

    /// Record type for an address
    pub fn for_ip(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => RecordType::A,
            IpAddr::V6(_) => RecordType::Aaaa,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            other => Err(Error::invalid_input(format!(
                "Unsupported record type: {}",
                other
            ))),
        }
    }
}

/// Outcome of reconciling one domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateStatus {
    /// The record was created or updated
    Success,
    /// Zone resolution, record lookup, or the write failed
    Failed,
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateStatus::Success => f.write_str("success"),
            UpdateStatus::Failed => f.write_str("failed"),
        }
    }
}

/// A managed domain name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    /// Subdomain label(s); empty for the zone apex
    pub sub_domain: String,

    /// Top (registrable) domain, used to resolve the zone
    pub top_domain: String,

    /// Status of the last pass; `None` until reconciled
    pub status: Option<UpdateStatus>,
}

impl Domain {
    /// Create a domain from already-split parts
    pub fn new(sub_domain: impl Into<String>, top_domain: impl Into<String>) -> Self {
        Self {
            sub_domain: sub_domain.into(),
            top_domain: top_domain.into(),
            status: None,
        }
    }

    /// Parse a configured domain name
    ///
    /// Accepts `sub.example.com`, `example.com` and `sub:example.co.uk`.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim().trim_end_matches('.').to_ascii_lowercase();
        if input.is_empty() {
            return Err(Error::invalid_input("Domain name cannot be empty"));
        }

        let (sub, top) = match input.split_once(':') {
            Some((sub, top)) => (sub.to_string(), top.to_string()),
            None => {
                let labels: Vec<&str> = input.split('.').collect();
                if labels.len() < 2 {
                    return Err(Error::invalid_input(format!(
                        "Domain name needs at least two labels: '{}'",
                        input
                    )));
                }
                let split = labels.len() - 2;
                (labels[..split].join("."), labels[split..].join("."))
            }
        };

        let domain = Self::new(sub, top);
        domain.validate()?;
        Ok(domain)
    }

    /// Fully-qualified name used for record lookups
    pub fn fqdn(&self) -> String {
        if self.is_apex() {
            self.top_domain.clone()
        } else {
            format!("{}.{}", self.sub_domain, self.top_domain)
        }
    }

    /// Name sent to the provider when creating a record
    pub fn record_name(&self) -> &str {
        if self.is_apex() {
            APEX_RECORD_NAME
        } else {
            &self.sub_domain
        }
    }

    /// Whether this domain is the zone apex
    pub fn is_apex(&self) -> bool {
        self.sub_domain.is_empty() || self.sub_domain == APEX_RECORD_NAME
    }

    fn validate(&self) -> Result<()> {
        if !self.top_domain.contains('.') {
            return Err(Error::invalid_input(format!(
                "Top domain needs at least two labels: '{}'",
                self.top_domain
            )));
        }

        let fqdn = self.fqdn();
        if fqdn.len() > MAX_NAME_LEN {
            return Err(Error::invalid_input(format!(
                "Domain name too long: {} chars (max {}). Got: {}",
                fqdn.len(),
                MAX_NAME_LEN,
                fqdn
            )));
        }

        for label in fqdn.split('.') {
            validate_label(label, &fqdn)?;
        }

        Ok(())
    }
}

fn validate_label(label: &str, name: &str) -> Result<()> {
    if label.is_empty() {
        return Err(Error::invalid_input(format!(
            "Domain name has empty label: '{}'",
            name
        )));
    }

    if label.len() > MAX_LABEL_LEN {
        return Err(Error::invalid_input(format!(
            "Domain label too long: {} chars (max {}). Label: '{}'",
            label.len(),
            MAX_LABEL_LEN,
            label
        )));
    }

    // Wildcard and service labels (`*`, `_acme`) are accepted as-is
    if label == "*" {
        return Ok(());
    }

    if !label
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::invalid_input(format!(
            "Domain label contains invalid characters. Label: '{}'",
            label
        )));
    }

    if label.starts_with('-') || label.ends_with('-') {
        return Err(Error::invalid_input(format!(
            "Domain label cannot start or end with hyphen. Label: '{}'",
            label
        )));
    }

    Ok(())
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fqdn())
    }
}

/// Result of reconciling one domain for one record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainOutcome {
    /// Record type that was reconciled
    pub record_type: RecordType,
    /// Fully-qualified name of the domain
    pub domain: String,
    /// Final status
    pub status: UpdateStatus,
}

/// Caller-owned collection of managed domains, grouped by record type
///
/// The reconciler never mutates domains; outcomes are folded in with
/// [`DomainSet::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainSet {
    ipv4: Vec<Domain>,
    ipv6: Vec<Domain>,
}

impl DomainSet {
    /// Create a set from IPv4 (A) and IPv6 (AAAA) domain lists
    pub fn new(ipv4: Vec<Domain>, ipv6: Vec<Domain>) -> Self {
        Self { ipv4, ipv6 }
    }

    /// Domains managed for a record type
    pub fn for_type(&self, record_type: RecordType) -> &[Domain] {
        match record_type {
            RecordType::A => &self.ipv4,
            RecordType::Aaaa => &self.ipv6,
        }
    }

    fn for_type_mut(&mut self, record_type: RecordType) -> &mut Vec<Domain> {
        match record_type {
            RecordType::A => &mut self.ipv4,
            RecordType::Aaaa => &mut self.ipv6,
        }
    }

    /// Fold reconciliation outcomes into the matching domains
    pub fn apply(&mut self, outcomes: &[DomainOutcome]) {
        for outcome in outcomes {
            for domain in self.for_type_mut(outcome.record_type) {
                if domain.fqdn() == outcome.domain {
                    domain.status = Some(outcome.status);
                }
            }
        }
    }

    /// Clear statuses before a new pass
    pub fn reset_statuses(&mut self) {
        for domain in self.ipv4.iter_mut().chain(self.ipv6.iter_mut()) {
            domain.status = None;
        }
    }

    /// Total number of managed (domain, type) pairs
    pub fn len(&self) -> usize {
        self.ipv4.len() + self.ipv6.len()
    }

    /// Whether no domains are managed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
