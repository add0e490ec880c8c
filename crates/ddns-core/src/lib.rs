// # ddns-core
//
// Core library for the DDNS reconciliation system.
//
// ## Architecture Overview
//
// This library provides the core functionality for dynamic DNS updates:
// - **IpSource**: Trait supplying the desired address per record type
// - **DnsProvider**: Trait for reading and writing records via provider APIs
// - **Reconciler**: Core engine that converges each managed name to exactly
//   one record with the desired content
// - **ProviderRegistry**: Plugin-based registry for providers and IP sources
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Stateless Passes**: Provider state is re-read on every pass; nothing is cached
// 3. **Plugin-Based**: Providers are registered dynamically, no hard-coded if-else
// 4. **Library-First**: All core functionality can be used as a library
// 5. **Failure Isolation**: One domain's failure never aborts the others

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod registry;
pub mod source;
pub mod traits;

// Re-export core types for convenience
pub use config::{DdnsConfig, IpSourceConfig, ProviderConfig, RecordSetConfig, RecordSettings};
pub use domain::{Domain, DomainOutcome, DomainSet, RecordType, UpdateStatus};
pub use engine::{PassReport, ReconcileRequest, Reconciler};
pub use error::{Error, Result};
pub use registry::ProviderRegistry;
pub use source::{DualStackSource, StaticIpSource};
pub use traits::{DnsProvider, IpSource, Record, RecordPayload, Zone};
