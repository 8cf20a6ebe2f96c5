mod bootstrap;
mod report;

use anyhow::{Context, Result};
use calstats_core::settings::Settings;
use calstats_data::analysis::{analyze_calendar, StatsOptions};
use calstats_data::reader::window_cutoff;
use chrono::Utc;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Calendar Stats v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Events: {}, Config: {}, Window: {} days, Timezone: {}",
        settings.events.display(),
        settings.config.display(),
        settings.days_back,
        settings.timezone
    );

    let timezone = bootstrap::resolve_timezone(&settings.timezone);
    let cutoff = window_cutoff(settings.window_days(), Utc::now());

    let (config, events) = bootstrap::load_inputs(&settings, timezone, cutoff).await?;
    if config.is_empty() {
        tracing::warn!("No stakeholders configured; group breakdowns will be empty");
    }

    let options = StatsOptions {
        top_n: settings.top as usize,
        timezone,
        vendor_keyword: settings.vendor_keyword.clone(),
    };
    let result = analyze_calendar(&events, &config, &options, settings.window_days());

    if settings.json_output() {
        let json = serde_json::to_string_pretty(&result).context("serialising statistics")?;
        println!("{}", json);
    } else {
        print!("{}", report::render_text(&result));
    }

    Ok(())
}
