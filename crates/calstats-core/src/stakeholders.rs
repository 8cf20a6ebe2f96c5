//! Stakeholder configuration: who counts as exec team, analysts and direct
//! reports.
//!
//! The on-disk shape is loose (any field may be missing or hold a non-list);
//! [`StakeholderConfig`] is the validated form, built once at load time.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, StatsError};

// ── StakeholderGroup ──────────────────────────────────────────────────────────

/// The three configured stakeholder lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StakeholderGroup {
    ExecTeam,
    GartnerAnalysts,
    DirectReports,
}

impl StakeholderGroup {
    pub const ALL: [StakeholderGroup; 3] = [
        StakeholderGroup::ExecTeam,
        StakeholderGroup::GartnerAnalysts,
        StakeholderGroup::DirectReports,
    ];

    /// JSON field name of this group.
    pub fn key(&self) -> &'static str {
        match self {
            StakeholderGroup::ExecTeam => "exec_team",
            StakeholderGroup::GartnerAnalysts => "gartner_analysts",
            StakeholderGroup::DirectReports => "direct_reports",
        }
    }

    /// Heading used in text reports.
    pub fn title(&self) -> &'static str {
        match self {
            StakeholderGroup::ExecTeam => "Exec Team",
            StakeholderGroup::GartnerAnalysts => "Gartner Analysts",
            StakeholderGroup::DirectReports => "Direct Reports",
        }
    }
}

// ── StakeholderConfig ─────────────────────────────────────────────────────────

/// Validated stakeholder lists. Emails are trimmed, lower-cased and
/// de-duplicated (first occurrence kept).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StakeholderConfig {
    pub exec_team: Vec<String>,
    pub gartner_analysts: Vec<String>,
    pub direct_reports: Vec<String>,
}

impl StakeholderConfig {
    /// Build a config from plain lists, applying the same normalisation as
    /// the file loader.
    pub fn new<S: AsRef<str>>(
        exec_team: &[S],
        gartner_analysts: &[S],
        direct_reports: &[S],
    ) -> Self {
        Self {
            exec_team: normalize_emails(exec_team.iter().map(AsRef::as_ref)),
            gartner_analysts: normalize_emails(gartner_analysts.iter().map(AsRef::as_ref)),
            direct_reports: normalize_emails(direct_reports.iter().map(AsRef::as_ref)),
        }
    }

    /// Members of `group`.
    pub fn members(&self, group: StakeholderGroup) -> &[String] {
        match group {
            StakeholderGroup::ExecTeam => &self.exec_team,
            StakeholderGroup::GartnerAnalysts => &self.gartner_analysts,
            StakeholderGroup::DirectReports => &self.direct_reports,
        }
    }

    pub fn is_empty(&self) -> bool {
        StakeholderGroup::ALL
            .iter()
            .all(|g| self.members(*g).is_empty())
    }

    /// Return the path of the per-user override file,
    /// `~/.calendar-stats/config.json`.
    pub fn user_config_path() -> PathBuf {
        Self::user_config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// The override path rooted at `base_dir` (used for testing).
    pub fn user_config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".calendar-stats").join("config.json")
    }

    /// Load a single config file. A missing file yields an empty config.
    pub fn load_from(path: &Path) -> Result<Self> {
        Ok(RawStakeholderConfig::read(path)?
            .unwrap_or_default()
            .into_config())
    }

    /// Load `default_path`, then overlay `override_path` when it exists.
    ///
    /// Every list present in the override replaces the default's list; lists
    /// the override omits are kept from the default.
    pub fn load_layered(default_path: &Path, override_path: Option<&Path>) -> Result<Self> {
        let mut raw = RawStakeholderConfig::read(default_path)?.unwrap_or_default();
        if let Some(path) = override_path {
            if let Some(overlay) = RawStakeholderConfig::read(path)? {
                debug!("Applying stakeholder override from {}", path.display());
                raw = raw.merge(overlay);
            }
        }
        let config = raw.into_config();
        debug!(
            "Stakeholders: {} exec, {} analysts, {} direct reports",
            config.exec_team.len(),
            config.gartner_analysts.len(),
            config.direct_reports.len()
        );
        Ok(config)
    }
}

// ── RawStakeholderConfig ──────────────────────────────────────────────────────

/// The loose on-disk form. Fields are kept as raw JSON so a non-list value
/// degrades to an empty list instead of failing the whole file.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawStakeholderConfig {
    #[serde(default)]
    exec_team: Option<Value>,
    #[serde(default)]
    gartner_analysts: Option<Value>,
    #[serde(default)]
    direct_reports: Option<Value>,
}

impl RawStakeholderConfig {
    /// Read `path`; `Ok(None)` when the file does not exist.
    fn read(path: &Path) -> Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No stakeholder config at {}", path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(StatsError::FileRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let value: Value = serde_json::from_str(&content)?;
        if !value.is_object() {
            return Err(StatsError::Config(format!(
                "{} must contain a JSON object",
                path.display()
            )));
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    fn merge(self, overlay: Self) -> Self {
        Self {
            exec_team: overlay.exec_team.or(self.exec_team),
            gartner_analysts: overlay.gartner_analysts.or(self.gartner_analysts),
            direct_reports: overlay.direct_reports.or(self.direct_reports),
        }
    }

    fn into_config(self) -> StakeholderConfig {
        StakeholderConfig {
            exec_team: list_field(StakeholderGroup::ExecTeam, self.exec_team),
            gartner_analysts: list_field(StakeholderGroup::GartnerAnalysts, self.gartner_analysts),
            direct_reports: list_field(StakeholderGroup::DirectReports, self.direct_reports),
        }
    }
}

/// Convert a raw field to an email list; anything but an array is empty.
fn list_field(group: StakeholderGroup, value: Option<Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let emails = items.iter().filter_map(|item| match item {
                Value::String(s) => Some(s.as_str()),
                other => {
                    warn!("Ignoring non-string entry in {}: {}", group.key(), other);
                    None
                }
            });
            normalize_emails(emails)
        }
        Some(other) => {
            warn!(
                "Stakeholder field {} is not a list ({}); treating as empty",
                group.key(),
                other
            );
            Vec::new()
        }
    }
}

fn normalize_emails<'a>(emails: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for email in emails {
        let email = email.trim().to_lowercase();
        if !email.is_empty() && !out.contains(&email) {
            out.push(email);
        }
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
