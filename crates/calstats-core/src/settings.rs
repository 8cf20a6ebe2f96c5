use clap::Parser;
use std::path::PathBuf;

use crate::stakeholders::StakeholderConfig;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Meeting attendance and time statistics from a calendar export
#[derive(Parser, Debug, Clone)]
#[command(
    name = "calendar-stats",
    about = "Meeting attendance and time statistics from a calendar export",
    version
)]
pub struct Settings {
    /// Calendar export: an events.list JSON file or a directory of page files
    #[arg(long, short = 'e', default_value = "events.json")]
    pub events: PathBuf,

    /// Stakeholder config (exec_team / gartner_analysts / direct_reports)
    #[arg(long, short = 'c', default_value = "config.json")]
    pub config: PathBuf,

    /// Per-user stakeholder override (defaults to ~/.calendar-stats/config.json)
    #[arg(long)]
    pub override_config: Option<PathBuf>,

    /// Only count events starting within the last N days (0 = all history)
    #[arg(long, default_value = "90", value_parser = clap::value_parser!(u32).range(0..=3650))]
    pub days_back: u32,

    /// Length of the top-attendee rankings
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..=100))]
    pub top: u32,

    /// Timezone for week buckets and all-day events (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Keyword that marks a vendor-analyst meeting
    #[arg(long, default_value = "gartner")]
    pub vendor_keyword: String,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse the process arguments and resolve `"auto"` values.
    pub fn load() -> Self {
        Self::resolve_auto_values(Settings::parse())
    }

    /// Same as [`Settings::load`] but with an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::resolve_auto_values(Settings::parse_from(args))
    }

    /// Look-back window in days, `None` for all history.
    pub fn window_days(&self) -> Option<u32> {
        (self.days_back > 0).then_some(self.days_back)
    }

    /// The override file to layer over `--config`.
    pub fn override_path(&self) -> PathBuf {
        self.override_config
            .clone()
            .unwrap_or_else(StakeholderConfig::user_config_path)
    }

    /// Whether JSON output was requested.
    pub fn json_output(&self) -> bool {
        self.format == "json"
    }

    /// Resolve the `"auto"` timezone and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = crate::time_utils::get_system_timezone();
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
