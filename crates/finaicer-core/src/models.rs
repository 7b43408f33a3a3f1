//! Domain models for FinAicer

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

/// Category name → monthly spending goal
///
/// Replaced wholesale when regenerated or edited; the engine never merges into it.
pub type Budgets = BTreeMap<String, f64>;

/// Kind of money movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
    Withdrawal,
    Other,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
            Self::Withdrawal => "withdrawal",
            Self::Other => "other",
        }
    }

    /// Expenses and withdrawals are the only movements that count as spending
    pub fn is_spending(&self) -> bool {
        matches!(self, Self::Expense | Self::Withdrawal)
    }

    pub fn is_income(&self) -> bool {
        matches!(self, Self::Income)
    }

    /// Parse a classifier label, falling back to `Other` for anything unknown
    pub fn coerce(label: &str) -> Self {
        label.parse().unwrap_or_else(|_| {
            warn!(label, "Unknown transaction type, coercing to other");
            Self::Other
        })
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "ingreso" => Ok(Self::Income),
            "expense" | "gasto" => Ok(Self::Expense),
            "transfer" | "transferencia" => Ok(Self::Transfer),
            "withdrawal" | "retiro" => Ok(Self::Withdrawal),
            "other" | "otro" => Ok(Self::Other),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransactionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::coerce(&label))
    }
}

/// A classified financial transaction
///
/// Never mutated after creation. The wire format accepts the classifier's
/// Spanish field names as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    /// ISO-8601 date or date-time
    #[serde(alias = "fecha")]
    pub timestamp: String,
    #[serde(alias = "entidad")]
    pub entity: String,
    /// Non-negative magnitude; direction comes from `transaction_type`
    #[serde(alias = "monto")]
    pub amount: f64,
    #[serde(rename = "type", alias = "tipo")]
    pub transaction_type: TransactionType,
    #[serde(alias = "categoria")]
    pub category: String,
    #[serde(default, alias = "subcategoria", skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// Original message the classifier saw
    #[serde(default, alias = "rawSms", skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        timestamp: impl Into<String>,
        entity: impl Into<String>,
        amount: f64,
        transaction_type: TransactionType,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp: timestamp.into(),
            entity: entity.into(),
            amount,
            transaction_type,
            category: category.into(),
            subcategory: None,
            raw_text: None,
        }
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_raw_text(mut self, raw_text: impl Into<String>) -> Self {
        self.raw_text = Some(raw_text.into());
        self
    }

    pub fn is_spending(&self) -> bool {
        self.transaction_type.is_spending()
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type.is_income()
    }

    /// `YYYY-MM` bucket key (the first seven characters of the timestamp)
    pub fn month_key(&self) -> &str {
        self.timestamp.get(..7).unwrap_or(&self.timestamp)
    }

    /// Parse the timestamp, reading offset-less values in `offset`
    pub fn parsed_timestamp(&self, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.timestamp, offset)
    }
}

/// Parse an ISO-8601 date or date-time
///
/// Values carrying their own offset keep it; naive date-times and bare dates
/// (taken as midnight) are read in `offset`. Returns `None` for anything else.
pub fn parse_timestamp(value: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return offset.from_local_datetime(&naive).single();
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| offset.from_local_datetime(&naive).single())
}

/// How urgent an alert is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Behavioral anomaly vs. budget threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Anomaly,
    Budget,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anomaly => "anomaly",
            Self::Budget => "budget",
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The rule that produced an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertRule {
    /// Amount far above the category average
    HighSpending,
    /// Same amount and entity seen moments ago
    Duplicate,
    /// Large spending during the night window
    UnusualHour,
    /// Category spend crossed 100% of its goal
    BudgetExceeded,
    /// Category spend crossed the warning percentage
    BudgetWarning,
    /// The caller could not classify an incoming message
    ClassificationFailure,
}

impl AlertRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighSpending => "high_spending",
            Self::Duplicate => "duplicate",
            Self::UnusualHour => "unusual_hour",
            Self::BudgetExceeded => "budget_exceeded",
            Self::BudgetWarning => "budget_warning",
            Self::ClassificationFailure => "classification_failure",
        }
    }

    pub fn alert_type(&self) -> AlertType {
        match self {
            Self::BudgetExceeded | Self::BudgetWarning => AlertType::Budget,
            _ => AlertType::Anomaly,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::HighSpending => "High Spending",
            Self::Duplicate => "Duplicate Transaction",
            Self::UnusualHour => "Unusual Hour",
            Self::BudgetExceeded => "Budget Exceeded",
            Self::BudgetWarning => "Budget Warning",
            Self::ClassificationFailure => "Classification Failed",
        }
    }
}

impl std::fmt::Display for AlertRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user-facing notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    /// When the alert was raised (not when the transaction happened)
    pub timestamp: DateTime<Utc>,
    /// Absent only for classification failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub message: String,
    pub severity: AlertSeverity,
    pub alert_type: AlertType,
    pub rule: AlertRule,
}

impl Alert {
    /// Create an alert raised by `rule` for a transaction
    pub fn for_transaction(
        rule: AlertRule,
        severity: AlertSeverity,
        transaction_id: &str,
        message: impl Into<String>,
        raised_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: alert_id(rule, transaction_id, raised_at, 0),
            timestamp: raised_at,
            transaction_id: Some(transaction_id.to_string()),
            message: message.into(),
            severity,
            alert_type: rule.alert_type(),
            rule,
        }
    }

    /// Alert the caller raises when the external classifier fails
    ///
    /// `seq` separates failures raised at the same instant; callers pass
    /// the number of alerts they already hold.
    pub fn classification_failure(raised_at: DateTime<Utc>, seq: usize) -> Self {
        let rule = AlertRule::ClassificationFailure;
        Self {
            id: alert_id(rule, "", raised_at, seq),
            timestamp: raised_at,
            transaction_id: None,
            message: "Failed to classify the last message.".to_string(),
            severity: AlertSeverity::High,
            alert_type: rule.alert_type(),
            rule,
        }
    }
}

/// `alert_<millis>_<rule>_<8 hex of sha256(transaction id, instant, seq)>`
fn alert_id(rule: AlertRule, transaction_id: &str, raised_at: DateTime<Utc>, seq: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(transaction_id.as_bytes());
    hasher.update(raised_at.timestamp_nanos_opt().unwrap_or_default().to_be_bytes());
    hasher.update((seq as u64).to_be_bytes());
    let digest = hex::encode(hasher.finalize());
    format!(
        "alert_{}_{}_{}",
        raised_at.timestamp_millis(),
        rule.as_str(),
        &digest[..8]
    )
}
