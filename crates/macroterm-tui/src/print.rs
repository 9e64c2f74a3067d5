//! Plain-text output for `--print`.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};

use macroterm_core::api::{abort_pair, DashboardClient, Loaded};
use macroterm_core::cache::{age_display, CacheStorage, HttpNetwork, OfflineWorker, ResponseSource};
use macroterm_core::config::Config;
use macroterm_core::view::{self, Pill};

/// Load the dashboard once and print the overview to stdout.
pub async fn print_overview(config: &Config) -> Result<()> {
    let storage = CacheStorage::new(&config.cache_dir()?)?;
    let network = HttpNetwork::new(config.request_timeout())?;
    let worker = OfflineWorker::new(config.worker_config()?, storage, network);
    let client = DashboardClient::new(Arc::new(worker))?;

    let (_handle, registration) = abort_pair();
    let loaded = client
        .fetch_dashboard(registration)
        .await
        .with_context(|| format!("Failed to load {}", client.url()))?;

    print!("{}", format_overview(&loaded)?);
    Ok(())
}

fn pills(pills: &[Pill]) -> String {
    if pills.is_empty() {
        view::PLACEHOLDER.to_string()
    } else {
        pills
            .iter()
            .map(|p| format!("[{}] {}", p.signal.as_str(), p.text))
            .collect::<Vec<_>>()
            .join("  ")
    }
}

pub fn format_overview(loaded: &Loaded) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_overview(&mut out, loaded)?;
    Ok(out)
}

fn write_overview(out: &mut impl fmt::Write, loaded: &Loaded) -> fmt::Result {
    let snapshot = &loaded.dashboard;
    let header = view::header(Some(snapshot));
    let overview = view::overview(snapshot);

    writeln!(out, "MACRO TERMINAL")?;
    writeln!(out, "Last update: {}", header.last_updated)?;
    if let ResponseSource::Cache { cached_at } = loaded.source {
        writeln!(out, "Offline: cached {}", age_display(cached_at))?;
    }
    if let Some(risk) = header.risk {
        writeln!(out, "Risk: {}", risk.text)?;
    }
    writeln!(out)?;
    writeln!(out, "Risk score: {}/100", overview.gauge.value)?;
    writeln!(out, "Drivers:    {}", pills(&overview.drivers))?;
    writeln!(out, "GPR:        {}", pills(std::slice::from_ref(&overview.gpr)))?;
    writeln!(out, "EPU:        {}", pills(std::slice::from_ref(&overview.epu)))?;
    writeln!(out, "Hotspots:   {}", pills(&overview.hotspots))?;

    if !overview.regions.is_empty() {
        writeln!(out)?;
        writeln!(out, "Regions:")?;
        for chip in &overview.regions {
            writeln!(out, "  {:<8}{}", chip.tab.title(), chip.summary)?;
        }
    }
    Ok(())
}
