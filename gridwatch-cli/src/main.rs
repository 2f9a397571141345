//! gridwatch CLI
//!
//! Command-line client for reading data-grid cluster state through a
//! node's management bridge.
//!
//! # Operations
//! - `--raw <PATH>` - Query any management object (see `--mode`)
//! - `--member-count` - Number of members, locators excluded
//! - `--get-regions` - Full paths of all regions
//! - `--check-rebalance [/REGION]` - Bucket churn over the settle interval
//! - `--queue-size [QUEUE]` - Outstanding events in an async event queue
//!
//! `--count [SECS]` repeats the selected operation forever.
//!
//! # Configuration
//! Config file: ~/.gridwatch/config.toml

use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use console::style;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod symbols;

use commands::{Context, Operation};
use gridwatch_core::{BridgeClient, Mode, SessionCache};
use gridwatch_rebalancer::{Detector, DetectorConfig};

#[derive(Parser, Debug)]
#[command(name = "gridwatch")]
#[command(about = "Data-grid cluster monitor over the JMX management bridge")]
#[command(version)]
struct Cli {
    /// Host to connect to (overrides config file)
    host: Option<String>,

    /// Port the management bridge is listening on (overrides config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Raw management object path to query
    #[arg(short, long, value_name = "PATH")]
    raw: Option<String>,

    /// Bridge mode for --raw
    #[arg(short, long, value_enum, default_value_t = ModeArg::Read)]
    mode: ModeArg,

    /// Print the number of members
    #[arg(long)]
    member_count: bool,

    /// Print the list of regions
    #[arg(long)]
    get_regions: bool,

    /// Check whether regions have finished rebalancing
    #[arg(long, value_name = "/REGION", num_args = 0..=1, default_missing_value = "*")]
    check_rebalance: Option<String>,

    /// Print the size of an async event queue
    #[arg(long, value_name = "QUEUE", num_args = 0..=1, default_missing_value = "*")]
    queue_size: Option<String>,

    /// Repeat the command with an interval in seconds
    #[arg(short, long, value_name = "INTERVAL", num_args = 0..=1, default_missing_value = "1")]
    count: Option<u64>,

    /// Seconds between the two snapshots of a rebalance check (overrides config file)
    #[arg(long, value_name = "SECS")]
    settle: Option<u64>,

    /// Print the rebalance report summary and debug logs on stderr (RUST_LOG still wins when set)
    #[arg(short, long)]
    verbose: bool,

    /// Config file to use instead of ~/.gridwatch/config.toml
    #[arg(long, value_name = "FILE", env = "GRIDWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    show_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Read,
    Exec,
    List,
    Search,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Read => Mode::Read,
            ModeArg::Exec => Mode::Exec,
            ModeArg::List => Mode::List,
            ModeArg::Search => Mode::Search,
        }
    }
}

impl Cli {
    /// The single operation to run per iteration.
    /// Precedence: raw, member count, regions, rebalance, queue size.
    fn operation(&self) -> Option<Operation> {
        if let Some(object_path) = &self.raw {
            Some(Operation::Raw {
                mode: self.mode.into(),
                object_path: object_path.clone(),
            })
        } else if self.member_count {
            Some(Operation::MemberCount)
        } else if self.get_regions {
            Some(Operation::Regions)
        } else if let Some(region) = &self.check_rebalance {
            Some(Operation::Rebalance {
                region: region.clone(),
            })
        } else {
            self.queue_size.as_ref().map(|queue| Operation::QueueSize {
                queue: queue.clone(),
            })
        }
    }
}

/// Log level used when RUST_LOG is not set
fn default_log_level(verbose: bool) -> tracing::Level {
    if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    }
}

fn log_filter(verbose: bool) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default_log_level(verbose).into())
        .from_env_lossy()
}

/// Host, port and settle interval for this run.
/// Command-line flags override the config file.
fn resolve(cli: &Cli, cfg: &config::GridwatchConfig) -> Result<(String, u16, Duration)> {
    let host = cli
        .host
        .clone()
        .or_else(|| cfg.bridge.host.clone())
        .context("No host given. Pass HOST or set bridge.host in the config file")?;
    let port = cli.port.unwrap_or(cfg.bridge.port);
    let settle_interval = cli
        .settle
        .map(Duration::from_secs)
        .unwrap_or_else(|| cfg.rebalance.settle_interval());
    Ok((host, port, settle_interval))
}

/// One iteration of a repeated operation. A failure is printed on stderr
/// and does not end the loop; returns whether the iteration succeeded.
async fn run_repeated(operation: &Operation, ctx: &Context) -> bool {
    match operation.run(ctx).await {
        Ok(()) => true,
        Err(e) => {
            eprintln!("{} {:#}", style(symbols::CROSS).red(), e);
            false
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(cli.verbose))
        .init();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => config::config_file_path()?,
    };

    if cli.init_config {
        return init_config(&config_path);
    }

    let cfg = config::load_config_from(&config_path);

    if cli.show_config {
        show_config(&cfg, &config_path);
        return Ok(());
    }

    let Some(operation) = cli.operation() else {
        eprintln!(
            "{} Nothing to do. Pick one of --raw, --member-count, --get-regions, --check-rebalance, --queue-size",
            style(symbols::WARN).yellow()
        );
        return Ok(());
    };

    let (host, port, settle_interval) = resolve(&cli, &cfg)?;

    let sessions = match cfg.bridge.request_timeout() {
        Some(timeout) => SessionCache::with_request_timeout(timeout),
        None => SessionCache::new(),
    };

    let ctx = Context {
        client: BridgeClient::with_context(Arc::new(sessions), &cfg.bridge.context),
        detector: Detector::new(DetectorConfig::with_settle_interval(settle_interval)),
        host,
        port,
        verbose: cli.verbose,
    };

    tracing::debug!(host = %ctx.host, port = ctx.port, ?operation, "Starting");

    match cli.count {
        None => operation.run(&ctx).await,
        Some(interval) => loop {
            run_repeated(&operation, &ctx).await;
            tokio::time::sleep(Duration::from_secs(interval)).await;
        },
    }
}

fn init_config(path: &std::path::Path) -> Result<()> {
    if path.exists() {
        println!(
            "{} Config file already exists at {}",
            style(symbols::WARN).yellow(),
            path.display()
        );
        return Ok(());
    }

    config::save_config_to(path, &config::GridwatchConfig::default())?;
    println!(
        "{} Config file written to {}",
        style(symbols::CHECK).green(),
        path.display()
    );
    Ok(())
}

fn show_config(cfg: &config::GridwatchConfig, path: &std::path::Path) {
    println!();
    println!("{}", style("gridwatch Configuration").bold().underlined());
    println!();
    println!("{}", style("[bridge]").cyan());
    match &cfg.bridge.host {
        Some(host) => println!("  host = \"{}\"", host),
        None => println!("  host = {}", style("(unset)").dim()),
    }
    println!("  port = {}", cfg.bridge.port);
    println!("  context = \"{}\"", cfg.bridge.context);
    match cfg.bridge.request_timeout_secs {
        Some(secs) => println!("  request_timeout_secs = {}", secs),
        None => println!("  request_timeout_secs = {}", style("(client default)").dim()),
    }
    println!();
    println!("{}", style("[rebalance]").cyan());
    println!("  settle_interval_secs = {}", cfg.rebalance.settle_interval_secs);
    println!();
    println!("{} {}", style("Config file:").dim(), path.display());
    if !path.exists() {
        println!(
            "{} Run '{}' to create it",
            style("(not created yet)").yellow(),
            style("gridwatch --init-config").green()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("gridwatch").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_member_count_operation() {
        let cli = parse(&["node1", "--member-count"]);
        assert_eq!(cli.host.as_deref(), Some("node1"));
        assert_eq!(cli.port, None);
        assert_eq!(cli.operation(), Some(Operation::MemberCount));
    }

    #[test]
    fn test_bare_check_rebalance_means_all_regions() {
        let cli = parse(&["node1", "--check-rebalance"]);
        assert_eq!(
            cli.operation(),
            Some(Operation::Rebalance {
                region: "*".to_string()
            })
        );

        let cli = parse(&["node1", "--check-rebalance", "/orders"]);
        assert_eq!(
            cli.operation(),
            Some(Operation::Rebalance {
                region: "/orders".to_string()
            })
        );
    }

    #[test]
    fn test_queue_size_and_count_defaults() {
        let cli = parse(&["node1", "--queue-size", "audit", "-c"]);
        assert_eq!(
            cli.operation(),
            Some(Operation::QueueSize {
                queue: "audit".to_string()
            })
        );
        assert_eq!(cli.count, Some(1));

        let cli = parse(&["node1", "--queue-size", "-c", "10"]);
        assert_eq!(
            cli.operation(),
            Some(Operation::QueueSize {
                queue: "*".to_string()
            })
        );
        assert_eq!(cli.count, Some(10));
    }

    #[test]
    fn test_raw_takes_precedence() {
        let cli = parse(&[
            "node1",
            "-p",
            "9000",
            "--member-count",
            "--raw",
            "GemFire:type=Member,*",
            "-m",
            "search",
        ]);
        assert_eq!(cli.port, Some(9000));
        assert_eq!(
            cli.operation(),
            Some(Operation::Raw {
                mode: Mode::Search,
                object_path: "GemFire:type=Member,*".to_string()
            })
        );
    }

    #[test]
    fn test_no_operation() {
        let cli = parse(&["node1"]);
        assert_eq!(cli.operation(), None);
        assert_eq!(cli.count, None);
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let result =
            Cli::try_parse_from(["gridwatch", "node1", "--raw", "x", "--mode", "write"]);
        assert!(result.is_err());
    }

    fn file_config(host: Option<&str>, port: u16, settle_secs: u64) -> config::GridwatchConfig {
        let mut cfg = config::GridwatchConfig::default();
        cfg.bridge.host = host.map(str::to_string);
        cfg.bridge.port = port;
        cfg.rebalance.settle_interval_secs = settle_secs;
        cfg
    }

    #[test]
    fn test_resolve_without_host_fails() {
        let cli = parse(&["--member-count"]);
        let err = resolve(&cli, &file_config(None, 8778, 5)).unwrap_err();
        assert!(err.to_string().contains("bridge.host"));
    }

    #[test]
    fn test_resolve_uses_config_file() {
        let cli = parse(&["--member-count"]);
        let (host, port, settle) = resolve(&cli, &file_config(Some("locator1"), 9001, 30)).unwrap();
        assert_eq!(host, "locator1");
        assert_eq!(port, 9001);
        assert_eq!(settle, Duration::from_secs(30));
    }

    #[test]
    fn test_resolve_flags_override_config_file() {
        let cli = parse(&["node1", "-p", "9000", "--settle", "2", "--check-rebalance"]);
        let (host, port, settle) = resolve(&cli, &file_config(Some("locator1"), 9001, 30)).unwrap();
        assert_eq!(host, "node1");
        assert_eq!(port, 9000);
        assert_eq!(settle, Duration::from_secs(2));
    }

    #[test]
    fn test_verbose_raises_log_level() {
        assert_eq!(default_log_level(false), tracing::Level::WARN);
        assert_eq!(default_log_level(true), tracing::Level::DEBUG);

        if std::env::var("RUST_LOG").is_err() {
            assert_eq!(
                log_filter(true).max_level_hint(),
                Some(tracing::level_filters::LevelFilter::DEBUG)
            );
            assert_eq!(
                log_filter(false).max_level_hint(),
                Some(tracing::level_filters::LevelFilter::WARN)
            );
        }
    }

    #[tokio::test]
    async fn test_repeated_failure_is_reported_and_loop_continues() {
        // Nothing listens on port 1
        let ctx = Context {
            client: BridgeClient::new(Arc::new(SessionCache::new())),
            detector: Detector::default(),
            host: "127.0.0.1".to_string(),
            port: 1,
            verbose: false,
        };

        assert!(!run_repeated(&Operation::MemberCount, &ctx).await);
        assert!(!run_repeated(&Operation::Regions, &ctx).await);
        assert_eq!(ctx.client.sessions().len(), 1);
    }
}
