//! Test doubles and common utilities for reconciliation contract tests
//!
//! [`MockDnsProvider`] keeps an in-memory zone/record table, applies writes
//! the way the provider would, records every call, and can be told to fail
//! specific operations.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsProvider, IpSource, Record, RecordPayload, Zone};
use ddns_core::{Domain, RecordSettings, RecordType, Reconciler};
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

/// A provider call, as observed by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FindZone(String),
    ListRecords {
        zone_id: String,
        record_type: RecordType,
        name: String,
    },
    Create {
        zone_id: String,
        payload: RecordPayload,
    },
    Update {
        zone_id: String,
        record_id: String,
        payload: RecordPayload,
    },
    Delete {
        zone_id: String,
        record_id: String,
    },
}

/// Operations the mock can be told to fail
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailOn {
    /// Zone lookup for this top domain fails with a transport error
    ZoneLookup(String),
    /// Record listing fails with `success: false`
    ListRecords,
    /// Create and update fail with `success: false`
    Writes,
    /// Deleting this record id fails
    Delete(String),
}

#[derive(Default)]
struct MockState {
    zones: Vec<Zone>,
    /// (zone id, record)
    records: Vec<(String, Record)>,
    calls: Vec<Call>,
    failures: HashSet<FailOn>,
    next_id: usize,
}

/// In-memory DNS provider that tracks calls
///
/// Clones share state, so a test can keep one handle while the
/// reconciler owns another.
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone
    pub fn with_zone(self, id: &str, name: &str) -> Self {
        self.state.lock().unwrap().zones.push(Zone {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    /// Add an existing record to a zone
    pub fn with_record(self, zone_id: &str, record: Record) -> Self {
        self.state
            .lock()
            .unwrap()
            .records
            .push((zone_id.to_string(), record));
        self
    }

    /// Make an operation fail
    pub fn failing(self, failure: FailOn) -> Self {
        self.state.lock().unwrap().failures.insert(failure);
        self
    }

    /// Every call made so far
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Forget recorded calls (keeps records)
    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Records currently stored for a zone, type and name
    pub fn records(&self, zone_id: &str, record_type: RecordType, name: &str) -> Vec<Record> {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .filter(|(zone, r)| zone == zone_id && r.record_type == record_type && r.name == name)
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub fn creates(&self) -> Vec<RecordPayload> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create { payload, .. } => Some(payload),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<(String, RecordPayload)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Update {
                    record_id, payload, ..
                } => Some((record_id, payload)),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete { record_id, .. } => Some(record_id),
                _ => None,
            })
            .collect()
    }

    fn record_call(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn fails(&self, failure: &FailOn) -> bool {
        self.state.lock().unwrap().failures.contains(failure)
    }

    fn zone_name(&self, zone_id: &str) -> String {
        self.state
            .lock()
            .unwrap()
            .zones
            .iter()
            .find(|z| z.id == zone_id)
            .map(|z| z.name.clone())
            .unwrap_or_default()
    }

    /// Expand a record name the way the provider does ("www" -> "www.example.com")
    fn expand_name(&self, zone_id: &str, name: &str) -> String {
        let zone = self.zone_name(zone_id);
        if name == "@" {
            zone
        } else if name == zone || name.ends_with(&format!(".{}", zone)) {
            name.to_string()
        } else {
            format!("{}.{}", name, zone)
        }
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn find_zone(&self, top_domain: &str) -> Result<Zone> {
        self.record_call(Call::FindZone(top_domain.to_string()));

        if self.fails(&FailOn::ZoneLookup(top_domain.to_string())) {
            return Err(Error::transport("connection reset by peer"));
        }

        self.state
            .lock()
            .unwrap()
            .zones
            .iter()
            .find(|z| z.name == top_domain)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("Zone not found: {}", top_domain)))
    }

    async fn list_records(
        &self,
        zone_id: &str,
        record_type: RecordType,
        fqdn: &str,
    ) -> Result<Vec<Record>> {
        self.record_call(Call::ListRecords {
            zone_id: zone_id.to_string(),
            record_type,
            name: fqdn.to_string(),
        });

        if self.fails(&FailOn::ListRecords) {
            return Err(Error::provider("mock", "Invalid request headers"));
        }

        Ok(self.records(zone_id, record_type, fqdn))
    }

    async fn create_record(&self, zone_id: &str, payload: &RecordPayload) -> Result<()> {
        self.record_call(Call::Create {
            zone_id: zone_id.to_string(),
            payload: payload.clone(),
        });

        if self.fails(&FailOn::Writes) {
            return Err(Error::provider("mock", "Record quota exceeded"));
        }

        let name = self.expand_name(zone_id, &payload.name);
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let timestamp = format!("2030-01-01T00:00:{:02}Z", state.next_id % 60);
        let record = Record {
            id: format!("created-{}", state.next_id),
            record_type: payload.record_type,
            name,
            content: payload.content.clone(),
            proxied: payload.proxied,
            created_on: timestamp.clone(),
            modified_on: timestamp,
        };
        state.records.push((zone_id.to_string(), record));
        Ok(())
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> Result<()> {
        self.record_call(Call::Update {
            zone_id: zone_id.to_string(),
            record_id: record_id.to_string(),
            payload: payload.clone(),
        });

        if self.fails(&FailOn::Writes) {
            return Err(Error::provider("mock", "Record quota exceeded"));
        }

        let name = self.expand_name(zone_id, &payload.name);
        let mut state = self.state.lock().unwrap();
        let (_, record) = state
            .records
            .iter_mut()
            .find(|(zone, r)| zone == zone_id && r.id == record_id)
            .ok_or_else(|| Error::provider("mock", "Record does not exist"))?;
        record.record_type = payload.record_type;
        record.name = name;
        record.content = payload.content.clone();
        record.proxied = payload.proxied;
        Ok(())
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()> {
        self.record_call(Call::Delete {
            zone_id: zone_id.to_string(),
            record_id: record_id.to_string(),
        });

        if self.fails(&FailOn::Delete(record_id.to_string())) {
            return Err(Error::transport("operation timed out"));
        }

        self.state
            .lock()
            .unwrap()
            .records
            .retain(|(zone, r)| !(zone == zone_id && r.id == record_id));
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// An IP source with fixed answers per record type
pub struct FixedIpSource {
    pub ipv4: Option<IpAddr>,
    pub ipv6: Option<IpAddr>,
    pub fail: bool,
}

impl FixedIpSource {
    pub fn v4(ip: &str) -> Self {
        Self {
            ipv4: Some(ip.parse().unwrap()),
            ipv6: None,
            fail: false,
        }
    }

    pub fn none() -> Self {
        Self {
            ipv4: None,
            ipv6: None,
            fail: false,
        }
    }
}

#[async_trait::async_trait]
impl IpSource for FixedIpSource {
    async fn current(&self, record_type: RecordType) -> Result<Option<IpAddr>> {
        if self.fail {
            return Err(Error::ip_source("lookup service unavailable"));
        }
        Ok(match record_type {
            RecordType::A => self.ipv4,
            RecordType::Aaaa => self.ipv6,
        })
    }

    fn source_name(&self) -> &'static str {
        "fixed"
    }
}

/// Build an A record for `www.example.com`
pub fn a_record(id: &str, content: &str, created_on: &str, modified_on: &str) -> Record {
    Record {
        id: id.to_string(),
        record_type: RecordType::A,
        name: "www.example.com".to_string(),
        content: content.to_string(),
        proxied: false,
        created_on: created_on.to_string(),
        modified_on: modified_on.to_string(),
    }
}

/// Reconciler over a shared mock with TTL 300 and proxying off
pub fn reconciler(provider: &MockDnsProvider) -> Reconciler {
    Reconciler::new(
        Box::new(provider.clone()),
        RecordSettings {
            ttl: 300,
            proxied: false,
        },
    )
}

pub fn domain(name: &str) -> Domain {
    Domain::parse(name).unwrap()
}
