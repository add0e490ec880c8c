//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Supply the desired address per record type
//! - [`DnsProvider`]: Read and write records via provider APIs

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::{IpSource, IpSourceFactory};
pub use dns_provider::{DnsProvider, DnsProviderFactory, Record, RecordPayload, Zone};
