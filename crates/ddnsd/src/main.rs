// # ddnsd - DDNS Daemon
//
// Thin integration layer: reads configuration, installs logging, registers
// providers and IP sources, then drives `Reconciler::run_pass`. All DNS logic
// lives in ddns-core and the provider crates.
//
// ## Configuration
//
// Either point `DDNS_CONFIG_FILE` at a JSON `DdnsConfig`, or use the
// environment variables below.
//
// ### DNS Provider
// - `DDNS_PROVIDER_TYPE`: Provider type (cloudflare)
// - `DDNS_PROVIDER_API_TOKEN`: API token
// - `DDNS_MODE`: `live` (default) or `dry-run`
//
// ### Records
// - `DDNS_IPV4_DOMAINS` / `DDNS_IPV6_DOMAINS`: Comma-separated domains
//   (`www.example.com`, `www:example.co.uk`)
// - `DDNS_IPV4_ADDRESS` / `DDNS_IPV6_ADDRESS`: Fixed address to publish
// - `DDNS_IPV4_URL` / `DDNS_IPV6_URL`: Lookup service (defaults to ipify)
// - `DDNS_TTL`: 1 (automatic) or 60-86400
// - `DDNS_PROXIED`: Proxy flag for newly created records
//
// ### Daemon
// - `DDNS_INTERVAL_SECS`: Run a pass every N seconds; unset runs one pass
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error
//
// `DDNS_MODE=dry-run` and `DDNS_LOG_LEVEL` also apply with a config file.
//
// ## Example
//
// ```bash
// export DDNS_PROVIDER_API_TOKEN=your_token
// export DDNS_IPV4_DOMAINS=example.com,www.example.com
// export DDNS_INTERVAL_SECS=300
//
// ddnsd
// ```

use anyhow::{Context, Result};
use ddns_core::config::{DdnsConfig, IpSourceConfig, ProviderConfig, RecordSetConfig};
use ddns_core::{DomainSet, DualStackSource, PassReport, ProviderRegistry, RecordType, Reconciler};
use std::env;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

/// Accepted range for `DDNS_INTERVAL_SECS`
const INTERVAL_RANGE: std::ops::RangeInclusive<u64> = 10..=86400;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
/// - 3: One-shot pass finished with failed domains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
    /// At least one domain failed in a one-shot run
    DomainsFailed = 3,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Daemon settings: the core configuration plus process-level knobs
#[derive(Debug)]
struct Settings {
    config: DdnsConfig,
    interval: Option<Duration>,
    log_level: Level,
}

impl Settings {
    /// Load settings from the process environment
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through a variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let log_level = parse_log_level(var("DDNS_LOG_LEVEL").as_deref().unwrap_or("info"))?;

        let interval = var("DDNS_INTERVAL_SECS")
            .map(|s| {
                let secs: u64 = s
                    .parse()
                    .with_context(|| format!("DDNS_INTERVAL_SECS must be a number. Got: {}", s))?;
                if !INTERVAL_RANGE.contains(&secs) {
                    anyhow::bail!(
                        "DDNS_INTERVAL_SECS must be between {} and {} seconds. Got: {}",
                        INTERVAL_RANGE.start(),
                        INTERVAL_RANGE.end(),
                        secs
                    );
                }
                Ok(Duration::from_secs(secs))
            })
            .transpose()?;

        let dry_run = match var("DDNS_MODE").as_deref() {
            None | Some("live") => false,
            Some("dry-run") => true,
            Some(other) => anyhow::bail!(
                "DDNS_MODE '{}' is not valid. Valid modes: live, dry-run",
                other
            ),
        };

        let mut config = match var("DDNS_CONFIG_FILE") {
            Some(path) => DdnsConfig::from_file(&path)
                .with_context(|| format!("Failed to load DDNS_CONFIG_FILE {}", path))?,
            None => config_from_vars(&var)?,
        };

        if dry_run {
            let ProviderConfig::Cloudflare { dry_run: flag, .. } = &mut config.provider;
            *flag = true;
        }

        config.validate()?;

        Ok(Self {
            config,
            interval,
            log_level,
        })
    }
}

/// Build a `DdnsConfig` from `DDNS_*` variables
fn config_from_vars(var: &impl Fn(&str) -> Option<String>) -> Result<DdnsConfig> {
    let provider = match var("DDNS_PROVIDER_TYPE").as_deref().unwrap_or("cloudflare") {
        "cloudflare" => ProviderConfig::Cloudflare {
            api_token: var("DDNS_PROVIDER_API_TOKEN").context(
                "DDNS_PROVIDER_API_TOKEN is required. \
                Set it via: export DDNS_PROVIDER_API_TOKEN=your_token",
            )?,
            dry_run: false,
        },
        other => anyhow::bail!(
            "DDNS_PROVIDER_TYPE '{}' is not supported. \
            Supported providers: cloudflare",
            other
        ),
    };

    let mut config = DdnsConfig::new(provider);
    config.ipv4 = record_set_from_vars(var, RecordType::A)?;
    config.ipv6 = record_set_from_vars(var, RecordType::Aaaa)?;

    if let Some(ttl) = var("DDNS_TTL") {
        config.records.ttl = ttl
            .parse()
            .with_context(|| format!("DDNS_TTL must be a number. Got: {}", ttl))?;
    }
    if let Some(proxied) = var("DDNS_PROXIED") {
        config.records.proxied = parse_bool(&proxied)
            .with_context(|| format!("DDNS_PROXIED must be true or false. Got: {}", proxied))?;
    }

    Ok(config)
}

fn record_set_from_vars(
    var: &impl Fn(&str) -> Option<String>,
    record_type: RecordType,
) -> Result<Option<RecordSetConfig>> {
    let prefix = match record_type {
        RecordType::A => "DDNS_IPV4",
        RecordType::Aaaa => "DDNS_IPV6",
    };

    let domains: Vec<String> = var(&format!("{}_DOMAINS", prefix))
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if domains.is_empty() {
        return Ok(None);
    }

    let ip_source = match (
        var(&format!("{}_ADDRESS", prefix)),
        var(&format!("{}_URL", prefix)),
    ) {
        (Some(_), Some(_)) => anyhow::bail!(
            "Set only one of {}_ADDRESS and {}_URL",
            prefix,
            prefix
        ),
        (Some(address), None) => IpSourceConfig::Static {
            address: address
                .parse()
                .with_context(|| format!("{}_ADDRESS is not an IP address: {}", prefix, address))?,
        },
        (None, Some(url)) => IpSourceConfig::Http { url },
        (None, None) => default_ip_source(record_type)?,
    };

    Ok(Some(RecordSetConfig::new(ip_source, domains)))
}

#[cfg(feature = "http")]
fn default_ip_source(record_type: RecordType) -> Result<IpSourceConfig> {
    let url = match record_type {
        RecordType::A => ddns_ip_http::DEFAULT_IPV4_URL,
        RecordType::Aaaa => ddns_ip_http::DEFAULT_IPV6_URL,
    };
    Ok(IpSourceConfig::Http {
        url: url.to_string(),
    })
}

#[cfg(not(feature = "http"))]
fn default_ip_source(record_type: RecordType) -> Result<IpSourceConfig> {
    anyhow::bail!(
        "No address source for {} records: built without the http feature, \
        set an explicit address",
        record_type
    )
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "DDNS_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Everything a pass needs
struct Components {
    reconciler: Reconciler,
    source: DualStackSource,
    domains: DomainSet,
}

/// Register available providers and build components from configuration
fn build_components(config: &DdnsConfig) -> Result<Components> {
    let registry = ProviderRegistry::new();

    #[cfg(feature = "cloudflare")]
    ddns_provider_cloudflare::register(&registry);

    #[cfg(feature = "http")]
    ddns_ip_http::register(&registry);

    info!(
        "Registered providers: {:?}, IP sources: {:?}",
        registry.list_providers(),
        registry.list_ip_sources()
    );

    let provider = registry.create_provider(&config.provider)?;
    let source = registry.create_sources(config)?;
    let domains = config.domain_set()?;

    Ok(Components {
        reconciler: Reconciler::new(provider, config.records),
        source,
        domains,
    })
}

fn main() -> ExitCode {
    // Load configuration from environment
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(settings.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddnsd daemon");
    info!("Configuration loaded: {:?}", settings.config.provider);

    let components = match build_components(&settings.config) {
        Ok(components) => components,
        Err(e) => {
            error!("Failed to initialize: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Requests are awaited one at a time; a single thread is enough
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run_daemon(components, settings.interval).await {
            Ok(code) => code,
            Err(e) => {
                error!("Daemon error: {:#}", e);
                DdnsExitCode::RuntimeError
            }
        }
    });

    code.into()
}

/// Run one pass, or a pass every `interval` until a shutdown signal
async fn run_daemon(
    mut components: Components,
    interval: Option<Duration>,
) -> Result<DdnsExitCode> {
    info!(
        "Managing {} domain(s) via {}",
        components.domains.len(),
        components.reconciler.provider_name()
    );

    let Some(interval) = interval else {
        let report = run_once(&mut components).await;
        return Ok(if report.is_success() {
            DdnsExitCode::CleanShutdown
        } else {
            DdnsExitCode::DomainsFailed
        });
    };

    info!("Running a pass every {:?}", interval);
    let mut shutdown = ShutdownSignal::new()?;
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            signal = shutdown.recv() => {
                info!("Received shutdown signal: {}", signal);
                info!("Shutting down daemon");
                return Ok(DdnsExitCode::CleanShutdown);
            }
            _ = ticker.tick() => {
                run_once(&mut components).await;
            }
        }
    }
}

async fn run_once(components: &mut Components) -> PassReport {
    let report = components
        .reconciler
        .run_pass(&components.source, &mut components.domains)
        .await;

    for record_type in RecordType::ALL {
        for domain in components.domains.for_type(record_type) {
            match domain.status {
                Some(status) => info!("{} {}: {}", record_type, domain, status),
                None if report.skipped.contains(&record_type) => {
                    info!("{} {}: skipped", record_type, domain)
                }
                None => {}
            }
        }
    }

    if !report.is_success() {
        warn!("{} domain(s) failed; retrying on the next pass", report.failed());
    }

    report
}

/// SIGTERM / SIGINT listener, registered before the first pass
#[cfg(unix)]
struct ShutdownSignal {
    sigterm: Signal,
    sigint: Signal,
}

#[cfg(unix)]
impl ShutdownSignal {
    fn new() -> Result<Self> {
        Ok(Self {
            sigterm: signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?,
            sigint: signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?,
        })
    }

    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigint.recv() => "SIGINT",
        }
    }
}

/// CTRL-C listener for non-Unix platforms
#[cfg(not(unix))]
struct ShutdownSignal;

#[cfg(not(unix))]
impl ShutdownSignal {
    fn new() -> Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> &'static str {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                error!("Failed to wait for CTRL-C: {}", e);
                std::future::pending().await
            }
        }
    }
}
