// # Static IP Source
//
// Publishes a fixed, configured address. Useful for hosts with a known
// address, for tests, and for pinning one family while the other is looked
// up dynamically.

use async_trait::async_trait;
use std::net::IpAddr;

use crate::config::IpSourceConfig;
use crate::domain::RecordType;
use crate::error::{Error, Result};
use crate::traits::{IpSource, IpSourceFactory};

/// IP source returning a fixed address
///
/// Answers `None` for the record type of the other address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticIpSource {
    address: IpAddr,
}

impl StaticIpSource {
    /// Create a source for `address`
    pub fn new(address: IpAddr) -> Self {
        Self { address }
    }

    /// The configured address
    pub fn address(&self) -> IpAddr {
        self.address
    }
}

#[async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self, record_type: RecordType) -> Result<Option<IpAddr>> {
        Ok(record_type
            .matches(&self.address)
            .then_some(self.address))
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

/// Factory for creating static IP sources
pub struct StaticFactory;

impl IpSourceFactory for StaticFactory {
    fn create(
        &self,
        config: &IpSourceConfig,
        record_type: RecordType,
    ) -> Result<Box<dyn IpSource>> {
        match config {
            IpSourceConfig::Static { address } => {
                config.validate(record_type)?;
                Ok(Box::new(StaticIpSource::new(*address)))
            }
            _ => Err(Error::config("Invalid config for static IP source")),
        }
    }
}
