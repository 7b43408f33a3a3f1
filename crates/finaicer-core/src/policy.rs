//! Policy configuration for the anomaly engine and budget allocator
//!
//! Every numeric threshold the rules use lives here rather than in rule code.
//!
//! ## Configuration Resolution
//!
//! Policy is loaded with a two-layer resolution:
//! 1. Explicit path, or the override in the data dir
//!    (~/.local/share/finaicer/config/policy.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/policy.toml");

/// Longest accepted duplicate lookback (one year)
pub const MAX_DUPLICATE_WINDOW_MINUTES: i64 = 365 * 24 * 60;

/// Thresholds used by the anomaly detectors
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyPolicy {
    /// Minimum same-category spending entries before averaging
    pub min_category_history: usize,
    /// Medium alert above `average * high_spending_multiplier`
    pub high_spending_multiplier: f64,
    /// High alert above `average * very_high_spending_multiplier`
    pub very_high_spending_multiplier: f64,
    /// Lookback from evaluation time for duplicate matches
    pub duplicate_window_minutes: i64,
    /// First hour of the night window (inclusive)
    pub unusual_hour_start: u32,
    /// Last hour of the night window (inclusive)
    pub unusual_hour_end: u32,
    /// Amounts must exceed this for the night window to matter
    pub unusual_hour_min_amount: f64,
    pub budget_warning_percent: f64,
    pub budget_exceeded_percent: f64,
}

impl Default for AnomalyPolicy {
    fn default() -> Self {
        Self {
            min_category_history: 3,
            high_spending_multiplier: 3.0,
            very_high_spending_multiplier: 5.0,
            duplicate_window_minutes: 5,
            unusual_hour_start: 1,
            unusual_hour_end: 5,
            unusual_hour_min_amount: 50_000.0,
            budget_warning_percent: 80.0,
            budget_exceeded_percent: 100.0,
        }
    }
}

/// One slice of the fallback budget split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultAllocation {
    pub category: String,
    /// Fraction of the budgetable total (all shares sum to 1)
    pub share: f64,
}

impl DefaultAllocation {
    pub fn new(category: impl Into<String>, share: f64) -> Self {
        Self {
            category: category.into(),
            share,
        }
    }
}

/// Parameters of the budget allocation heuristic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetPolicy {
    /// Assumed monthly income when the history has none
    pub default_monthly_income: f64,
    /// Fraction of average monthly income to budget
    pub spending_share: f64,
    /// Goals are rounded to the nearest multiple of this
    pub rounding_increment: f64,
    /// Split used when there is no spending history
    pub default_split: Vec<DefaultAllocation>,
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        Self {
            default_monthly_income: 2_000_000.0,
            spending_share: 0.8,
            rounding_increment: 1_000.0,
            default_split: vec![
                DefaultAllocation::new("Alimentación", 0.3),
                DefaultAllocation::new("Transporte", 0.2),
                DefaultAllocation::new("Servicios", 0.2),
                DefaultAllocation::new("Compras", 0.3),
            ],
        }
    }
}

/// Complete policy
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolicyConfig {
    pub anomaly: AnomalyPolicy,
    pub budget: BudgetPolicy,
}

impl PolicyConfig {
    /// Load from `path` if given and present, else the data-dir override, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) if path.exists() => read_config(path)?,
            Some(path) => {
                return Err(Error::NotFound(format!(
                    "Policy file {}",
                    path.display()
                )))
            }
            None => match default_config_path() {
                Some(default_path) if default_path.exists() => read_config(&default_path)?,
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        parse_config(&content)
    }

    /// Render as TOML (same layout as the config file)
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to render policy: {}", e)))
    }

    /// Reject values the rules cannot work with
    pub fn validate(&self) -> Result<()> {
        let a = &self.anomaly;
        if a.min_category_history == 0 {
            return Err(Error::Config(
                "min_category_history must be at least 1".into(),
            ));
        }
        if a.high_spending_multiplier <= 0.0 || !a.high_spending_multiplier.is_finite() {
            return Err(Error::Config(
                "high_spending_multiplier must be positive".into(),
            ));
        }
        if a.very_high_spending_multiplier < a.high_spending_multiplier
            || !a.very_high_spending_multiplier.is_finite()
        {
            return Err(Error::Config(
                "very_high_spending_multiplier must be >= high_spending_multiplier".into(),
            ));
        }
        if !(0..=MAX_DUPLICATE_WINDOW_MINUTES).contains(&a.duplicate_window_minutes) {
            return Err(Error::Config(format!(
                "duplicate_window_minutes must be within 0-{}",
                MAX_DUPLICATE_WINDOW_MINUTES
            )));
        }
        if a.unusual_hour_start > 23 || a.unusual_hour_end > 23 {
            return Err(Error::Config("unusual hours must be within 0-23".into()));
        }
        if a.unusual_hour_start > a.unusual_hour_end {
            return Err(Error::Config(
                "unusual_hour_start must not be after unusual_hour_end".into(),
            ));
        }
        if a.unusual_hour_min_amount < 0.0 || !a.unusual_hour_min_amount.is_finite() {
            return Err(Error::Config(
                "unusual_hour_min_amount must be non-negative".into(),
            ));
        }
        if a.budget_warning_percent <= 0.0
            || a.budget_warning_percent > a.budget_exceeded_percent
            || !a.budget_warning_percent.is_finite()
            || !a.budget_exceeded_percent.is_finite()
        {
            return Err(Error::Config(
                "budget_warning_percent must be positive and <= budget_exceeded_percent".into(),
            ));
        }

        let b = &self.budget;
        if b.default_monthly_income < 0.0 || !b.default_monthly_income.is_finite() {
            return Err(Error::Config(
                "default_monthly_income must be non-negative".into(),
            ));
        }
        if !(b.spending_share > 0.0 && b.spending_share <= 1.0) {
            return Err(Error::Config("spending_share must be in (0, 1]".into()));
        }
        if b.rounding_increment <= 0.0 || !b.rounding_increment.is_finite() {
            return Err(Error::Config("rounding_increment must be positive".into()));
        }
        if b.default_split.iter().any(|s| s.share < 0.0 || !s.share.is_finite()) {
            return Err(Error::Config("default_split shares must not be negative".into()));
        }
        let total: f64 = b.default_split.iter().map(|s| s.share).sum();
        if (total - 1.0).abs() > 1e-6 {
            return Err(Error::Config(format!(
                "default_split shares must sum to 1 (got {})",
                total
            )));
        }

        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finaicer").join("config").join("policy.toml"))
}

fn read_config(path: &Path) -> Result<String> {
    debug!(path = %path.display(), "Loading policy override");
    fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    anomaly: Option<RawAnomaly>,
    budget: Option<RawBudget>,
}

#[derive(Debug, Deserialize)]
struct RawAnomaly {
    min_category_history: Option<usize>,
    high_spending_multiplier: Option<f64>,
    very_high_spending_multiplier: Option<f64>,
    duplicate_window_minutes: Option<i64>,
    unusual_hour_start: Option<u32>,
    unusual_hour_end: Option<u32>,
    unusual_hour_min_amount: Option<f64>,
    budget_warning_percent: Option<f64>,
    budget_exceeded_percent: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawBudget {
    default_monthly_income: Option<f64>,
    spending_share: Option<f64>,
    rounding_increment: Option<f64>,
    default_split: Option<Vec<DefaultAllocation>>,
}

/// Parse policy from TOML content, layered over the defaults
pub fn parse_config(content: &str) -> Result<PolicyConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid policy TOML: {}", e)))?;

    let mut config = PolicyConfig::default();

    if let Some(anomaly) = raw.anomaly {
        let a = &mut config.anomaly;
        if let Some(v) = anomaly.min_category_history {
            a.min_category_history = v;
        }
        if let Some(v) = anomaly.high_spending_multiplier {
            a.high_spending_multiplier = v;
        }
        if let Some(v) = anomaly.very_high_spending_multiplier {
            a.very_high_spending_multiplier = v;
        }
        if let Some(v) = anomaly.duplicate_window_minutes {
            a.duplicate_window_minutes = v;
        }
        if let Some(v) = anomaly.unusual_hour_start {
            a.unusual_hour_start = v;
        }
        if let Some(v) = anomaly.unusual_hour_end {
            a.unusual_hour_end = v;
        }
        if let Some(v) = anomaly.unusual_hour_min_amount {
            a.unusual_hour_min_amount = v;
        }
        if let Some(v) = anomaly.budget_warning_percent {
            a.budget_warning_percent = v;
        }
        if let Some(v) = anomaly.budget_exceeded_percent {
            a.budget_exceeded_percent = v;
        }
    }

    if let Some(budget) = raw.budget {
        let b = &mut config.budget;
        if let Some(v) = budget.default_monthly_income {
            b.default_monthly_income = v;
        }
        if let Some(v) = budget.spending_share {
            b.spending_share = v;
        }
        if let Some(v) = budget.rounding_increment {
            b.rounding_increment = v;
        }
        if let Some(split) = budget.default_split {
            b.default_split = split;
        }
    }

    config.validate()?;
    Ok(config)
}
