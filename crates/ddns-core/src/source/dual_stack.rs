use async_trait::async_trait;
use std::net::IpAddr;

use crate::domain::RecordType;
use crate::error::{Error, Result};
use crate::traits::IpSource;

/// Routes A lookups to an IPv4 source and AAAA lookups to an IPv6 source
///
/// A missing source means "no update needed" for that type.
#[derive(Default)]
pub struct DualStackSource {
    ipv4: Option<Box<dyn IpSource>>,
    ipv6: Option<Box<dyn IpSource>>,
}

impl DualStackSource {
    /// Create a source with optional per-family delegates
    pub fn new(ipv4: Option<Box<dyn IpSource>>, ipv6: Option<Box<dyn IpSource>>) -> Self {
        Self { ipv4, ipv6 }
    }

    /// Set the IPv4 delegate
    pub fn with_ipv4(mut self, source: Box<dyn IpSource>) -> Self {
        self.ipv4 = Some(source);
        self
    }

    /// Set the IPv6 delegate
    pub fn with_ipv6(mut self, source: Box<dyn IpSource>) -> Self {
        self.ipv6 = Some(source);
        self
    }

    fn delegate(&self, record_type: RecordType) -> Option<&dyn IpSource> {
        match record_type {
            RecordType::A => self.ipv4.as_deref(),
            RecordType::Aaaa => self.ipv6.as_deref(),
        }
    }
}

#[async_trait]
impl IpSource for DualStackSource {
    async fn current(&self, record_type: RecordType) -> Result<Option<IpAddr>> {
        let Some(source) = self.delegate(record_type) else {
            return Ok(None);
        };

        let ip = source.current(record_type).await?;
        if let Some(ip) = ip
            && !record_type.matches(&ip)
        {
            return Err(Error::ip_source(format!(
                "{} source returned {} for {} records",
                source.source_name(),
                ip,
                record_type
            )));
        }

        Ok(ip)
    }

    fn source_name(&self) -> &'static str {
        "dual-stack"
    }
}
