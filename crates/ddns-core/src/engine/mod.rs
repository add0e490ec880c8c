//! Core reconciliation engine
//!
//! The [`Reconciler`] brings provider state towards the desired address:
//! - Asking the IpSource for the desired address per record type
//! - Resolving the zone of each managed domain
//! - Looking up existing records of that type and name
//! - Creating or updating the record
//! - Pruning duplicate records
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  IpSource   │─── desired IP per record type ───┐
//! └─────────────┘                                  │
//!                                                  ▼
//!                                         ┌──────────────┐
//!                                         │  Reconciler  │
//!                                         └──────────────┘
//!                                                  │
//!                  ┌───────────────────────────────┼──────────────────────┐
//!                  ▼                               ▼                      ▼
//!          ┌──────────────┐               ┌──────────────┐       ┌──────────────┐
//!          │ DnsProvider  │               │ DnsProvider  │       │ DomainOutcome│
//!          │ (zone/lookup)│               │ (write/prune)│       │  (returned)  │
//!          └──────────────┘               └──────────────┘       └──────────────┘
//! ```
//!
//! ## Per-domain flow
//!
//! ```text
//! Start → ZoneResolved → RecordsQueried → {Created|Updated} → DuplicatesPruned → {Success|Failed}
//! ```
//!
//! Zone resolution and record lookup failures go straight to `Failed` and
//! skip pruning. A failed write still prunes. Delete failures are logged and
//! never change the status.
//!
//! ## Ordering
//!
//! Record types are processed one after another (A, then AAAA) and domains
//! one after another. Exactly one provider request is in flight at a time.
//! Nothing is retried within a pass.

use std::net::IpAddr;

use tracing::{debug, error, info, warn};

use crate::config::RecordSettings;
use crate::domain::{Domain, DomainOutcome, DomainSet, RecordType, UpdateStatus};
use crate::error::Result;
use crate::traits::{DnsProvider, IpSource, Record, RecordPayload};

/// Input unit processed per record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileRequest {
    /// Record type to reconcile
    pub record_type: RecordType,
    /// Desired record content
    pub ip: IpAddr,
    /// Domains managed for this type
    pub domains: Vec<Domain>,
}

/// Summary of a full pass over all record types
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// One outcome per reconciled (domain, type)
    pub outcomes: Vec<DomainOutcome>,
    /// Record types skipped because the IP source had no address
    pub skipped: Vec<RecordType>,
}

impl PassReport {
    /// Number of domains that ended the pass successfully
    pub fn succeeded(&self) -> usize {
        self.count(UpdateStatus::Success)
    }

    /// Number of domains that ended the pass failed
    pub fn failed(&self) -> usize {
        self.count(UpdateStatus::Failed)
    }

    /// Whether no domain failed
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, status: UpdateStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

/// Result of the duplicate pruning step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneSummary {
    /// Record kept as the latest, if one could be elected
    pub kept: Option<String>,
    /// Records deleted
    pub deleted: Vec<String>,
    /// Records whose deletion failed
    pub failed: Vec<String>,
}

/// Core reconciliation engine
///
/// Owns the DNS provider and the settings applied to written records. Holds
/// no state between passes; every pass re-reads the provider.
pub struct Reconciler {
    /// DNS provider for reading and writing records
    provider: Box<dyn DnsProvider>,

    /// TTL and proxy flag for written records
    settings: RecordSettings,
}

impl Reconciler {
    /// Create a new reconciler
    pub fn new(provider: Box<dyn DnsProvider>, settings: RecordSettings) -> Self {
        Self { provider, settings }
    }

    /// Provider name (for logging)
    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Run one full reconciliation pass
    ///
    /// For each record type the source is asked for the desired address. If
    /// it has none (or fails), the type is skipped and its domains keep an
    /// unset status. Otherwise every domain of that type is reconciled and the
    /// outcomes are folded into `domains`.
    pub async fn run_pass(&self, source: &dyn IpSource, domains: &mut DomainSet) -> PassReport {
        let mut report = PassReport::default();
        domains.reset_statuses();

        for record_type in RecordType::ALL {
            if domains.for_type(record_type).is_empty() {
                continue;
            }

            let ip = match source.current(record_type).await {
                Ok(Some(ip)) if record_type.matches(&ip) => ip,
                Ok(Some(ip)) => {
                    warn!(
                        "IP source {} returned {} for {} records, skipping",
                        source.source_name(),
                        ip,
                        record_type
                    );
                    report.skipped.push(record_type);
                    continue;
                }
                Ok(None) => {
                    debug!("No {} update needed", record_type);
                    report.skipped.push(record_type);
                    continue;
                }
                Err(e) => {
                    error!(
                        "Failed to get {} address from {}: {}",
                        record_type,
                        source.source_name(),
                        e
                    );
                    report.skipped.push(record_type);
                    continue;
                }
            };

            let request = ReconcileRequest {
                record_type,
                ip,
                domains: domains.for_type(record_type).to_vec(),
            };

            let outcomes = self.reconcile(&request).await;
            domains.apply(&outcomes);
            report.outcomes.extend(outcomes);
        }

        info!(
            "Pass complete: {} succeeded, {} failed, {} record type(s) skipped",
            report.succeeded(),
            report.failed(),
            report.skipped.len()
        );

        report
    }

    /// Reconcile every domain of a request, one after another
    ///
    /// A failure on one domain never aborts the others.
    pub async fn reconcile(&self, request: &ReconcileRequest) -> Vec<DomainOutcome> {
        let content = request.ip.to_string();
        let mut outcomes = Vec::with_capacity(request.domains.len());

        for domain in &request.domains {
            outcomes.push(
                self.reconcile_domain(request.record_type, &content, domain)
                    .await,
            );
        }

        outcomes
    }

    /// Reconcile a single domain and report its outcome
    pub async fn reconcile_domain(
        &self,
        record_type: RecordType,
        content: &str,
        domain: &Domain,
    ) -> DomainOutcome {
        let fqdn = domain.fqdn();

        let status = match self.converge(record_type, content, domain, &fqdn).await {
            Ok(()) => UpdateStatus::Success,
            Err(e) => {
                if e.is_provider_side() {
                    error!("Failed to reconcile {} record {}: {}", record_type, fqdn, e);
                } else {
                    warn!("Skipped {} record {}: {}", record_type, fqdn, e);
                }
                UpdateStatus::Failed
            }
        };

        DomainOutcome {
            record_type,
            domain: fqdn,
            status,
        }
    }

    async fn converge(
        &self,
        record_type: RecordType,
        content: &str,
        domain: &Domain,
        fqdn: &str,
    ) -> Result<()> {
        let zone = self.provider.find_zone(&domain.top_domain).await?;
        debug!("Resolved zone {} ({}) for {}", zone.name, zone.id, fqdn);

        let records = self
            .provider
            .list_records(&zone.id, record_type, fqdn)
            .await?;
        debug!("Found {} existing {} record(s) for {}", records.len(), record_type, fqdn);

        let written = match records.first() {
            None => self.create(&zone.id, record_type, content, domain).await,
            Some(existing) => self.update(&zone.id, existing, content).await,
        };

        if records.len() > 1 {
            self.prune_duplicates(&zone.id, &records).await;
        }

        written
    }

    async fn create(
        &self,
        zone_id: &str,
        record_type: RecordType,
        content: &str,
        domain: &Domain,
    ) -> Result<()> {
        let payload = RecordPayload {
            record_type,
            name: domain.record_name().to_string(),
            content: content.to_string(),
            ttl: self.settings.ttl,
            proxied: self.settings.proxied,
        };

        self.provider.create_record(zone_id, &payload).await?;
        info!("Created {} record {} -> {}", record_type, domain, content);
        Ok(())
    }

    async fn update(&self, zone_id: &str, existing: &Record, content: &str) -> Result<()> {
        let payload = RecordPayload {
            record_type: existing.record_type,
            name: existing.name.clone(),
            content: content.to_string(),
            ttl: self.settings.ttl,
            proxied: existing.proxied,
        };

        self.provider
            .update_record(zone_id, &existing.id, &payload)
            .await?;

        if existing.content == content {
            debug!(
                "Refreshed {} record {} ({} unchanged)",
                existing.record_type, existing.name, content
            );
        } else {
            info!(
                "Updated {} record {} -> {} (was: {})",
                existing.record_type, existing.name, content, existing.content
            );
        }
        Ok(())
    }

    /// Delete every record except the latest one
    ///
    /// `records` is the list read before the write, so a record created in
    /// the same pass is never considered. When no record has a parsable
    /// timestamp nothing is deleted.
    pub async fn prune_duplicates(&self, zone_id: &str, records: &[Record]) -> PruneSummary {
        let mut summary = PruneSummary::default();

        let Some(latest) = latest_record(records) else {
            warn!(
                "Cannot determine the latest of {} duplicate record(s), leaving them in place",
                records.len()
            );
            return summary;
        };
        summary.kept = Some(latest.id.clone());

        for record in records.iter().filter(|r| r.id != latest.id) {
            match self.provider.delete_record(zone_id, &record.id).await {
                Ok(()) => {
                    info!(
                        "Deleted duplicate {} record {} ({}, id {})",
                        record.record_type, record.name, record.content, record.id
                    );
                    summary.deleted.push(record.id.clone());
                }
                Err(e) => {
                    warn!(
                        "Failed to delete duplicate {} record {} (id {}): {}",
                        record.record_type, record.name, record.id, e
                    );
                    summary.failed.push(record.id.clone());
                }
            }
        }

        summary
    }
}

/// Elect the latest record by `created_on`, falling back to `modified_on`
///
/// Records with no parsable timestamp never win. Among equal timestamps the
/// first in list order wins.
pub fn latest_record(records: &[Record]) -> Option<&Record> {
    let mut latest: Option<(&Record, chrono::DateTime<chrono::FixedOffset>)> = None;

    for record in records {
        let Some(timestamp) = record.timestamp() else {
            continue;
        };

        if latest.is_none_or(|(_, best)| timestamp > best) {
            latest = Some((record, timestamp));
        }
    }

    latest.map(|(record, _)| record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, created_on: &str, modified_on: &str) -> Record {
        Record {
            id: id.to_string(),
            record_type: RecordType::A,
            name: "www.example.com".to_string(),
            content: "203.0.113.1".to_string(),
            proxied: false,
            created_on: created_on.to_string(),
            modified_on: modified_on.to_string(),
        }
    }

    #[test]
    fn test_latest_by_created_on() {
        let records = vec![
            record("old", "2024-01-01T00:00:00Z", "2025-06-01T00:00:00Z"),
            record("new", "2024-03-01T00:00:00Z", "2024-03-01T00:00:00Z"),
            record("mid", "2024-02-01T00:00:00Z", ""),
        ];
        assert_eq!(latest_record(&records).unwrap().id, "new");
    }

    #[test]
    fn test_latest_falls_back_to_modified_on() {
        let records = vec![
            record("a", "2024-01-01T00:00:00Z", ""),
            record("b", "not-a-date", "2024-05-01T00:00:00Z"),
        ];
        assert_eq!(latest_record(&records).unwrap().id, "b");
    }

    #[test]
    fn test_latest_skips_unparsable() {
        let records = vec![
            record("broken", "", "garbage"),
            record("ok", "2024-01-01T00:00:00Z", ""),
        ];
        assert_eq!(latest_record(&records).unwrap().id, "ok");

        let all_broken = vec![record("x", "", ""), record("y", "?", "?")];
        assert!(latest_record(&all_broken).is_none());
        assert!(latest_record(&[]).is_none());
    }

    #[test]
    fn test_latest_tie_keeps_first() {
        let records = vec![
            record("first", "2024-01-01T00:00:00Z", ""),
            record("second", "2024-01-01T00:00:00Z", ""),
        ];
        assert_eq!(latest_record(&records).unwrap().id, "first");
    }

    #[test]
    fn test_latest_compares_across_offsets() {
        let records = vec![
            record("utc", "2024-01-01T10:00:00Z", ""),
            record("plus-two", "2024-01-01T11:00:00+02:00", ""),
        ];
        // 11:00+02:00 is 09:00Z
        assert_eq!(latest_record(&records).unwrap().id, "utc");
    }

    #[test]
    fn test_pass_report_counts() {
        let report = PassReport {
            outcomes: vec![
                DomainOutcome {
                    record_type: RecordType::A,
                    domain: "a.example.com".to_string(),
                    status: UpdateStatus::Success,
                },
                DomainOutcome {
                    record_type: RecordType::A,
                    domain: "b.example.com".to_string(),
                    status: UpdateStatus::Failed,
                },
            ],
            skipped: vec![RecordType::Aaaa],
        };
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
    }
}
