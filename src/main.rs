use std::{path::PathBuf, time::Instant};

use clap::Parser;
use log::info;

use route_planner_core::{
    PlannerOptions, RecordId, Result, RoutePlanner, Settings, TransportProfile, logging,
    options::{
        DEFAULT_GEOCODE_DELAY_MS, DEFAULT_GEOCODER_URL, DEFAULT_MAX_ADDRESSES,
        DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_ROUTER_URL, DEFAULT_USER_AGENT, LogFormat, LogLevel,
    },
};

mod input;

/// Geocode a list of addresses and route through them.
#[derive(Debug, Parser)]
#[command(name = "route-planner", version)]
struct Cli {
    /// Address file, one `id<TAB>address` or bare address per line. Defaults to stdin.
    input: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_GEOCODER_URL)]
    geocoder_url: String,
    #[arg(long, default_value = DEFAULT_ROUTER_URL)]
    router_url: String,
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
    /// Per-request HTTP timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    request_timeout: u64,
    /// Pause between geocoding requests in milliseconds.
    #[arg(long, default_value_t = DEFAULT_GEOCODE_DELAY_MS)]
    geocode_delay_ms: u64,

    /// driving, cycling or walking.
    #[arg(long, default_value = "driving", value_parser = TransportProfile::parse)]
    profile: TransportProfile,
    /// Visit stops in nearest-neighbor order instead of input order.
    #[arg(long)]
    best_route: bool,
    #[arg(long)]
    no_optimization: bool,
    #[arg(long, default_value_t = DEFAULT_MAX_ADDRESSES)]
    max_addresses: usize,
    /// Drop addresses that fail to geocode instead of aborting.
    #[arg(long)]
    skip_failed: bool,

    #[arg(long, default_value = "warn", value_parser = LogLevel::parse)]
    log_level: LogLevel,
    #[arg(long, default_value = "compact", value_parser = LogFormat::parse)]
    log_format: LogFormat,
    #[arg(long)]
    no_log_timestamp: bool,
    /// Append logs to this file instead of stderr.
    #[arg(long, default_value = "")]
    log_output: String,
}

impl Cli {
    fn planner_options(&self) -> PlannerOptions {
        PlannerOptions {
            geocoder_url: self.geocoder_url.clone(),
            router_url: self.router_url.clone(),
            user_agent: self.user_agent.clone(),
            request_timeout_secs: self.request_timeout,
            geocode_delay_ms: self.geocode_delay_ms,
            settings: Settings {
                profile: self.profile,
                optimization_enabled: !self.no_optimization,
                max_addresses: self.max_addresses,
                auto_geocode: false,
            },
            log_level: self.log_level,
            log_format: self.log_format,
            log_timestamp: !self.no_log_timestamp,
            log_output: self.log_output.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let now = Instant::now();
    let cli = Cli::parse();
    let options = cli.planner_options();
    logging::init_logger(&options)?;
    let records = input::read_records(cli.input.as_deref())?;

    info!("input: records={}", records.len());
    info!("options: {options}");

    let mut planner = RoutePlanner::from_options(&options)?;
    planner.reset_source(&records);
    let eligible = planner.eligible_records().to_vec();
    planner.bulk_select(eligible).await?;

    let mut failed: Vec<RecordId> = Vec::new();
    for (id, reason) in planner.selection().errored_records() {
        eprintln!("{id}: {reason}");
        failed.push(id.clone());
    }
    if cli.skip_failed {
        for id in &failed {
            planner.toggle(id)?;
        }
    }

    if cli.best_route {
        planner.calculate_best_route().await?;
    } else {
        planner.calculate_as_selected().await?;
    }

    for (idx, address) in planner.export_order().iter().enumerate() {
        println!("{}. {address}", idx + 1);
    }
    if let Some(summary) = planner.summary() {
        println!(
            "{} / {} ({}, {})",
            summary.distance_label(),
            summary.duration_label(),
            summary.profile,
            summary.ordering
        );
        info!("output: {summary}");
    }
    if let Some(url) = planner.google_maps_url() {
        println!("{url}");
    }
    if let Some(url) = planner.apple_maps_url() {
        println!("{url}");
    }

    info!("done: time={:.2}s", now.elapsed().as_secs_f32());
    Ok(())
}
