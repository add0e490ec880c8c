// # IP Source Trait
//
// Defines the interface the reconciler uses to learn the desired address for
// each record type.
//
// ## Implementations
//
// - Static addresses: [`crate::source::StaticIpSource`]
// - Per-family composition: [`crate::source::DualStackSource`]
// - HTTP lookup services: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{IpSource, RecordType};
//
// match source.current(RecordType::A).await? {
//     Some(ip) => println!("desired A content: {ip}"),
//     None => println!("no IPv4 update needed"),
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

use crate::domain::RecordType;

/// Trait for IP source implementations
///
/// # Contract
///
/// - `Ok(Some(ip))`: reconcile `record_type` towards `ip`; the address must
///   belong to the family of `record_type`
/// - `Ok(None)`: no update needed for this type; its domains are skipped and
///   keep an unset status
/// - `Err(Error)`: the address could not be determined; the type is skipped
///
/// IP sources are observers. They never touch the DNS provider.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Desired address for a record type
    async fn current(&self, record_type: RecordType) -> Result<Option<IpAddr>, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}

/// Helper trait for constructing IP sources from configuration
pub trait IpSourceFactory: Send + Sync {
    /// Create an IpSource answering for `record_type`
    fn create(
        &self,
        config: &crate::config::IpSourceConfig,
        record_type: RecordType,
    ) -> Result<Box<dyn IpSource>, crate::Error>;
}
