//! Anomaly detection
//!
//! Four independent rules run against each new transaction:
//! - High spending: amount far above the category's historical average
//! - Duplicate: same amount and entity seen within minutes of evaluation
//! - Unusual hour: large spending while the clock is in the night window
//! - Budget threshold: category spend crossing the warning or limit percentage
//!
//! Rules abstain (return `None`) when they lack a basis; they never fail.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Timelike, Utc};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::format::format_amount;
use crate::models::{Alert, AlertRule, AlertSeverity, Budgets, Transaction};
use crate::policy::AnomalyPolicy;

/// Runs every detector and aggregates their alerts
#[derive(Clone)]
pub struct AnomalyEngine {
    policy: AnomalyPolicy,
    clock: Arc<dyn Clock>,
}

impl Default for AnomalyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnomalyEngine {
    pub fn new() -> Self {
        Self::with_policy(AnomalyPolicy::default())
    }

    pub fn with_policy(policy: AnomalyPolicy) -> Self {
        Self {
            policy,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for the duplicate window and the night window
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> &AnomalyPolicy {
        &self.policy
    }

    /// Evaluate a new transaction against prior history and the active budget
    ///
    /// `history` must not yet contain `transaction`: budget crossings are
    /// measured from the spend already in history, so including the
    /// transaction would count it twice and suppress the crossing.
    ///
    /// Alerts come back in rule order: high spending, duplicate, unusual
    /// hour, then budget.
    pub fn evaluate(
        &self,
        transaction: &Transaction,
        history: &[Transaction],
        budgets: Option<&Budgets>,
    ) -> Vec<Alert> {
        let now = self.clock.now();
        let policy = &self.policy;

        let mut alerts: Vec<Alert> = [
            detect_high_spending(transaction, history, policy, now),
            detect_duplicate(transaction, history, policy, now),
            detect_unusual_hour(transaction, policy, now),
        ]
        .into_iter()
        .flatten()
        .collect();

        if let Some(budgets) = budgets {
            let spent = spent_by_category(history);
            if let Some(&goal) = budgets.get(&transaction.category) {
                let spent_before = spent.get(&transaction.category).copied().unwrap_or(0.0);
                alerts.extend(detect_budget_threshold(
                    transaction,
                    goal,
                    spent_before,
                    policy,
                    now,
                ));
            } else {
                debug!(
                    category = %transaction.category,
                    "No budget goal for category, skipping threshold check"
                );
            }
        }

        debug!(
            transaction = %transaction.id,
            alerts = alerts.len(),
            "Anomaly evaluation complete"
        );

        alerts
    }
}

/// Evaluate with the default policy and the system clock
pub fn evaluate_anomalies(
    transaction: &Transaction,
    history: &[Transaction],
    budgets: Option<&Budgets>,
) -> Vec<Alert> {
    AnomalyEngine::new().evaluate(transaction, history, budgets)
}

/// Total spending (expenses and withdrawals) per category
pub fn spent_by_category(history: &[Transaction]) -> HashMap<String, f64> {
    let mut spent: HashMap<String, f64> = HashMap::new();
    for tx in history.iter().filter(|tx| tx.is_spending()) {
        *spent.entry(tx.category.clone()).or_default() += tx.amount;
    }
    spent
}

/// Flag spending far above the category's average
///
/// The baseline is the mean of prior spending in the same category; it needs
/// at least `min_category_history` entries. Both multipliers are strict.
pub fn detect_high_spending(
    transaction: &Transaction,
    history: &[Transaction],
    policy: &AnomalyPolicy,
    now: DateTime<FixedOffset>,
) -> Option<Alert> {
    if !transaction.is_spending() {
        return None;
    }

    let amounts: Vec<f64> = history
        .iter()
        .filter(|tx| tx.category == transaction.category && tx.is_spending())
        .map(|tx| tx.amount)
        .collect();

    if amounts.len() < policy.min_category_history {
        debug!(
            category = %transaction.category,
            samples = amounts.len(),
            "Not enough category history for an average"
        );
        return None;
    }

    let average = amounts.iter().sum::<f64>() / amounts.len() as f64;
    let amount = format_amount(transaction.amount);

    let (severity, message) = if transaction.amount > average * policy.very_high_spending_multiplier
    {
        (
            AlertSeverity::High,
            format!(
                "Critical alert: spending of {} at {} is {:.0}% of your average for '{}'.",
                amount,
                transaction.entity,
                policy.very_high_spending_multiplier * 100.0,
                transaction.category
            ),
        )
    } else if transaction.amount > average * policy.high_spending_multiplier {
        (
            AlertSeverity::Medium,
            format!(
                "Unusual spending of {} at {}, well above your average for '{}'.",
                amount, transaction.entity, transaction.category
            ),
        )
    } else {
        return None;
    };

    debug!(
        transaction = %transaction.id,
        average,
        severity = %severity,
        "High spending detected"
    );

    Some(Alert::for_transaction(
        AlertRule::HighSpending,
        severity,
        &transaction.id,
        message,
        now.with_timezone(&Utc),
    ))
}

/// Flag a likely double submission
///
/// Any other history entry with the same amount and entity whose timestamp is
/// within the window before `now` counts; one alert is raised however many
/// entries match. Entries with unreadable timestamps never match.
pub fn detect_duplicate(
    transaction: &Transaction,
    history: &[Transaction],
    policy: &AnomalyPolicy,
    now: DateTime<FixedOffset>,
) -> Option<Alert> {
    // A window too wide to represent has no lower bound
    let cutoff = Duration::try_minutes(policy.duplicate_window_minutes)
        .and_then(|window| now.checked_sub_signed(window));
    let offset = *now.offset();

    let matched = history.iter().find(|tx| {
        tx.id != transaction.id
            && tx.amount == transaction.amount
            && tx.entity == transaction.entity
            && tx
                .parsed_timestamp(offset)
                .is_some_and(|timestamp| cutoff.map_or(true, |cutoff| timestamp >= cutoff))
    })?;

    debug!(
        transaction = %transaction.id,
        matched = %matched.id,
        "Duplicate transaction detected"
    );

    Some(Alert::for_transaction(
        AlertRule::Duplicate,
        AlertSeverity::High,
        &transaction.id,
        format!(
            "Critical alert: duplicate transaction detected for {} at {}.",
            format_amount(transaction.amount),
            transaction.entity
        ),
        now.with_timezone(&Utc),
    ))
}

/// Flag large spending while the clock is inside the night window
///
/// Uses the hour of evaluation, not the transaction's own timestamp.
pub fn detect_unusual_hour(
    transaction: &Transaction,
    policy: &AnomalyPolicy,
    now: DateTime<FixedOffset>,
) -> Option<Alert> {
    if !transaction.is_spending() || transaction.amount <= policy.unusual_hour_min_amount {
        return None;
    }

    let hour = now.hour();
    if hour < policy.unusual_hour_start || hour > policy.unusual_hour_end {
        return None;
    }

    debug!(transaction = %transaction.id, hour, "Unusual hour detected");

    Some(Alert::for_transaction(
        AlertRule::UnusualHour,
        AlertSeverity::Medium,
        &transaction.id,
        format!(
            "Alert: transaction of {} at {} made at an unusual hour ({}:00).",
            format_amount(transaction.amount),
            transaction.entity,
            hour
        ),
        now.with_timezone(&Utc),
    ))
}

/// Flag the transaction that first pushes category spend past a threshold
///
/// `spent_before` is the category's spend excluding `transaction`. Only the
/// crossing raises an alert; once usage is past a threshold, later
/// transactions stay silent. Jumping past both thresholds at once raises only
/// the limit alert. A zero goal disables the rule for the category.
pub fn detect_budget_threshold(
    transaction: &Transaction,
    goal: f64,
    spent_before: f64,
    policy: &AnomalyPolicy,
    now: DateTime<FixedOffset>,
) -> Option<Alert> {
    if !transaction.is_spending() || goal <= 0.0 {
        return None;
    }

    let spent_after = spent_before + transaction.amount;
    let usage_before = spent_before / goal * 100.0;
    let usage_after = spent_after / goal * 100.0;

    let crossed = |threshold: f64| usage_after >= threshold && usage_before < threshold;

    let (rule, severity, message) = if crossed(policy.budget_exceeded_percent) {
        (
            AlertRule::BudgetExceeded,
            AlertSeverity::High,
            format!(
                "Limit exceeded: {} at {} took '{}' past {:.0}% of its budget ({:.0}% used).",
                format_amount(transaction.amount),
                transaction.entity,
                transaction.category,
                policy.budget_exceeded_percent,
                usage_after
            ),
        )
    } else if crossed(policy.budget_warning_percent) {
        (
            AlertRule::BudgetWarning,
            AlertSeverity::Medium,
            format!(
                "Budget alert: after {} at {} you have spent more than {:.0}% of your limit for '{}'.",
                format_amount(transaction.amount),
                transaction.entity,
                policy.budget_warning_percent,
                transaction.category
            ),
        )
    } else {
        return None;
    };

    debug!(
        transaction = %transaction.id,
        category = %transaction.category,
        usage_before,
        usage_after,
        rule = %rule,
        "Budget threshold crossed"
    );

    Some(Alert::for_transaction(
        rule,
        severity,
        &transaction.id,
        message,
        now.with_timezone(&Utc),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlertType, TransactionType};
    use crate::test_utils::{clock_at, expense, tx, NIGHT, NOON};

    fn noon() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(NOON).unwrap()
    }

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    fn food_history() -> Vec<Transaction> {
        vec![
            expense("h1", "Alimentación", 100_000.0),
            expense("h2", "Alimentación", 100_000.0),
            expense("h3", "Alimentación", 100_000.0),
        ]
    }

    fn food(amount: f64) -> Transaction {
        expense("new", "Alimentación", amount)
    }

    // ========== High Spending ==========

    #[test]
    fn test_high_spending_abstains_with_short_history() {
        let history = vec![
            expense("h1", "Alimentación", 100.0),
            expense("h2", "Alimentación", 100.0),
        ];
        let policy = AnomalyPolicy::default();
        assert!(detect_high_spending(&food(1_000_000.0), &history, &policy, noon()).is_none());
    }

    #[test]
    fn test_high_spending_exact_multiplier_does_not_fire() {
        let policy = AnomalyPolicy::default();
        assert!(detect_high_spending(&food(300_000.0), &food_history(), &policy, noon()).is_none());
    }

    #[test]
    fn test_high_spending_medium_band() {
        let policy = AnomalyPolicy::default();

        let alert = detect_high_spending(&food(300_001.0), &food_history(), &policy, noon()).unwrap();
        assert_eq!(alert.severity, AlertSeverity::Medium);
        assert_eq!(alert.alert_type, AlertType::Anomaly);
        assert_eq!(alert.rule, AlertRule::HighSpending);
        assert_eq!(alert.transaction_id.as_deref(), Some("new"));
        assert!(alert.message.contains("300,001"));
        assert!(alert.message.contains("Alimentación"));

        // Exactly 5x is still medium
        let alert = detect_high_spending(&food(500_000.0), &food_history(), &policy, noon()).unwrap();
        assert_eq!(alert.severity, AlertSeverity::Medium);
    }

    #[test]
    fn test_high_spending_high_band() {
        let policy = AnomalyPolicy::default();
        let alert = detect_high_spending(&food(500_001.0), &food_history(), &policy, noon()).unwrap();
        assert_eq!(alert.severity, AlertSeverity::High);
        assert!(alert.message.contains("500%"));
    }

    #[test]
    fn test_high_spending_ignores_other_categories_and_types() {
        let history = vec![
            expense("h1", "Alimentación", 100.0),
            expense("h2", "Transporte", 100.0),
            tx("h3", "2024-03-01", "Bank", 100.0, TransactionType::Transfer, "Alimentación"),
            tx("h4", "2024-03-01", "Job", 100.0, TransactionType::Income, "Alimentación"),
        ];
        let policy = AnomalyPolicy::default();
        assert!(detect_high_spending(&food(1_000_000.0), &history, &policy, noon()).is_none());
    }

    #[test]
    fn test_high_spending_counts_withdrawals() {
        let history = vec![
            expense("h1", "Retiro en efectivo", 100.0),
            tx("h2", "2024-03-01", "ATM", 100.0, TransactionType::Withdrawal, "Retiro en efectivo"),
            tx("h3", "2024-03-01", "ATM", 100.0, TransactionType::Withdrawal, "Retiro en efectivo"),
        ];
        let new = tx("new", "2024-03-02", "ATM", 400.0, TransactionType::Withdrawal, "Retiro en efectivo");
        let policy = AnomalyPolicy::default();
        let alert = detect_high_spending(&new, &history, &policy, noon()).unwrap();
        assert_eq!(alert.severity, AlertSeverity::Medium);
    }

    #[test]
    fn test_high_spending_ignores_income() {
        let new = tx("new", "2024-03-02", "Job", 9_000_000.0, TransactionType::Income, "Alimentación");
        let policy = AnomalyPolicy::default();
        assert!(detect_high_spending(&new, &food_history(), &policy, noon()).is_none());
    }

    // ========== Duplicate ==========

    fn shop(id: &str, timestamp: &str) -> Transaction {
        tx(id, timestamp, "Éxito", 120_000.0, TransactionType::Expense, "Compras")
    }

    #[test]
    fn test_duplicate_single_alert_for_many_matches() {
        let history = vec![
            shop("a", "2024-03-15T11:58:00"),
            shop("b", "2024-03-15T11:59:00"),
        ];
        let new = shop("new", "2024-03-15T12:00:00");
        let policy = AnomalyPolicy::default();

        let alert = detect_duplicate(&new, &history, &policy, noon()).unwrap();
        assert_eq!(alert.severity, AlertSeverity::High);
        assert_eq!(alert.rule, AlertRule::Duplicate);

        let engine = AnomalyEngine::new().with_clock(clock_at(NOON));
        let alerts = engine.evaluate(&new, &history, None);
        assert_eq!(
            alerts
                .iter()
                .filter(|a| a.rule == AlertRule::Duplicate)
                .count(),
            1
        );
    }

    #[test]
    fn test_duplicate_window_measured_from_now() {
        let policy = AnomalyPolicy::default();
        let new = shop("new", "2024-03-15T12:00:00");

        // Exactly at the cutoff still matches
        let history = vec![shop("a", "2024-03-15T11:55:00")];
        assert!(detect_duplicate(&new, &history, &policy, noon()).is_some());

        let history = vec![shop("a", "2024-03-15T11:54:59")];
        assert!(detect_duplicate(&new, &history, &policy, noon()).is_none());

        // Same timestamps, but evaluated an hour later
        let history = vec![shop("a", "2024-03-15T11:59:00")];
        assert!(detect_duplicate(&new, &history, &policy, at("2024-03-15T13:00:00-05:00")).is_none());
    }

    #[test]
    fn test_duplicate_requires_same_amount_and_entity() {
        let policy = AnomalyPolicy::default();
        let new = shop("new", "2024-03-15T12:00:00");

        let mut other_entity = shop("a", "2024-03-15T11:59:00");
        other_entity.entity = "Carulla".to_string();
        let mut other_amount = shop("b", "2024-03-15T11:59:00");
        other_amount.amount = 120_001.0;

        let history = vec![other_entity, other_amount];
        assert!(detect_duplicate(&new, &history, &policy, noon()).is_none());
    }

    #[test]
    fn test_duplicate_skips_same_id_and_bad_timestamps() {
        let policy = AnomalyPolicy::default();
        let new = shop("new", "2024-03-15T12:00:00");

        let history = vec![shop("new", "2024-03-15T11:59:00"), shop("a", "hace un rato")];
        assert!(detect_duplicate(&new, &history, &policy, noon()).is_none());
    }

    #[test]
    fn test_duplicate_applies_to_any_type() {
        let policy = AnomalyPolicy::default();
        let new = tx("new", "2024-03-15", "Nequi", 50.0, TransactionType::Transfer, "Transferencia");
        let history = vec![tx("a", "2024-03-15T11:58:00-05:00", "Nequi", 50.0, TransactionType::Transfer, "Transferencia")];
        assert!(detect_duplicate(&new, &history, &policy, noon()).is_some());
    }

    #[test]
    fn test_duplicate_oversized_window_has_no_lower_bound() {
        let new = shop("new", "2024-03-15T12:00:00");
        let history = vec![shop("a", "2001-01-01T00:00:00")];

        for minutes in [1_000_000_000_000, i64::MAX] {
            let policy = AnomalyPolicy {
                duplicate_window_minutes: minutes,
                ..Default::default()
            };
            assert!(detect_duplicate(&new, &history, &policy, noon()).is_some());

            let engine = AnomalyEngine::with_policy(policy).with_clock(clock_at(NOON));
            let alerts = engine.evaluate(&expense("other", "Compras", 1.0), &[], None);
            assert!(alerts.is_empty());
        }
    }

    // ========== Unusual Hour ==========

    #[test]
    fn test_unusual_hour_inside_window() {
        let policy = AnomalyPolicy::default();
        let alert = detect_unusual_hour(&food(60_000.0), &policy, at(NIGHT)).unwrap();
        assert_eq!(alert.severity, AlertSeverity::Medium);
        assert!(alert.message.contains("3:00"));
    }

    #[test]
    fn test_unusual_hour_window_is_inclusive() {
        let policy = AnomalyPolicy::default();
        let new = food(60_000.0);
        assert!(detect_unusual_hour(&new, &policy, at("2024-03-15T00:59:00-05:00")).is_none());
        assert!(detect_unusual_hour(&new, &policy, at("2024-03-15T01:00:00-05:00")).is_some());
        assert!(detect_unusual_hour(&new, &policy, at("2024-03-15T05:59:00-05:00")).is_some());
        assert!(detect_unusual_hour(&new, &policy, at("2024-03-15T06:00:00-05:00")).is_none());
    }

    #[test]
    fn test_unusual_hour_amount_is_strict() {
        let policy = AnomalyPolicy::default();
        assert!(detect_unusual_hour(&food(50_000.0), &policy, at(NIGHT)).is_none());
        assert!(detect_unusual_hour(&food(50_000.01), &policy, at(NIGHT)).is_some());
    }

    #[test]
    fn test_unusual_hour_ignores_transaction_time_and_income() {
        let policy = AnomalyPolicy::default();
        // Recorded at 3am, evaluated at noon
        let new = expense("n", "Compras", 90_000.0);
        let mut night_tx = new.clone();
        night_tx.timestamp = "2024-03-15T03:00:00".to_string();
        assert!(detect_unusual_hour(&night_tx, &policy, noon()).is_none());

        let salary = tx("s", "2024-03-15", "Job", 90_000.0, TransactionType::Income, "Nómina");
        assert!(detect_unusual_hour(&salary, &policy, at(NIGHT)).is_none());
    }

    // ========== Budget Threshold ==========

    #[test]
    fn test_budget_warning_on_crossing() {
        let policy = AnomalyPolicy::default();
        let alert =
            detect_budget_threshold(&food(15_000.0), 100_000.0, 70_000.0, &policy, noon()).unwrap();
        assert_eq!(alert.rule, AlertRule::BudgetWarning);
        assert_eq!(alert.severity, AlertSeverity::Medium);
        assert_eq!(alert.alert_type, AlertType::Budget);
    }

    #[test]
    fn test_budget_warning_silent_once_crossed() {
        let policy = AnomalyPolicy::default();
        assert!(detect_budget_threshold(&food(5_000.0), 100_000.0, 85_000.0, &policy, noon()).is_none());
    }

    #[test]
    fn test_budget_exceeded_on_crossing() {
        let policy = AnomalyPolicy::default();
        let alert =
            detect_budget_threshold(&food(10_000.0), 100_000.0, 95_000.0, &policy, noon()).unwrap();
        assert_eq!(alert.rule, AlertRule::BudgetExceeded);
        assert_eq!(alert.severity, AlertSeverity::High);

        // Landing exactly on 100% counts as crossing
        let alert =
            detect_budget_threshold(&food(5_000.0), 100_000.0, 95_000.0, &policy, noon()).unwrap();
        assert_eq!(alert.rule, AlertRule::BudgetExceeded);

        assert!(detect_budget_threshold(&food(1_000.0), 100_000.0, 105_000.0, &policy, noon()).is_none());
    }

    #[test]
    fn test_budget_jump_past_both_thresholds_is_one_alert() {
        let policy = AnomalyPolicy::default();
        let alert =
            detect_budget_threshold(&food(60_000.0), 100_000.0, 50_000.0, &policy, noon()).unwrap();
        assert_eq!(alert.rule, AlertRule::BudgetExceeded);
    }

    #[test]
    fn test_budget_threshold_abstains() {
        let policy = AnomalyPolicy::default();
        assert!(detect_budget_threshold(&food(10_000.0), 0.0, 0.0, &policy, noon()).is_none());
        assert!(detect_budget_threshold(&food(10_000.0), 100_000.0, 0.0, &policy, noon()).is_none());

        let salary = tx("s", "2024-03-15", "Job", 900_000.0, TransactionType::Income, "Alimentación");
        assert!(detect_budget_threshold(&salary, 100_000.0, 0.0, &policy, noon()).is_none());
    }

    #[test]
    fn test_spent_by_category() {
        let history = vec![
            expense("a", "Compras", 10.0),
            expense("b", "Compras", 15.0),
            tx("c", "2024-03-01", "ATM", 5.0, TransactionType::Withdrawal, "Compras"),
            tx("d", "2024-03-01", "Job", 99.0, TransactionType::Income, "Compras"),
            expense("e", "Transporte", 7.0),
        ];
        let spent = spent_by_category(&history);
        assert_eq!(spent["Compras"], 30.0);
        assert_eq!(spent["Transporte"], 7.0);
        assert_eq!(spent.len(), 2);
    }

    // ========== Aggregator ==========

    #[test]
    fn test_evaluate_orders_alerts_by_rule() {
        let history = vec![
            expense("h1", "Compras", 10_000.0),
            expense("h2", "Compras", 10_000.0),
            expense("h3", "Compras", 10_000.0),
            tx("h4", "2024-03-15T02:58:00", "Tienda X", 600_000.0, TransactionType::Transfer, "Transferencia"),
        ];
        let new = tx("new", "2024-03-15T03:00:00", "Tienda X", 600_000.0, TransactionType::Expense, "Compras");
        let budgets = Budgets::from([("Compras".to_string(), 500_000.0)]);

        let engine = AnomalyEngine::new().with_clock(clock_at(NIGHT));
        let alerts = engine.evaluate(&new, &history, Some(&budgets));

        let rules: Vec<AlertRule> = alerts.iter().map(|a| a.rule).collect();
        assert_eq!(
            rules,
            vec![
                AlertRule::HighSpending,
                AlertRule::Duplicate,
                AlertRule::UnusualHour,
                AlertRule::BudgetExceeded,
            ]
        );
        assert_eq!(alerts[0].severity, AlertSeverity::High);
        assert!(alerts.iter().all(|a| a.transaction_id.as_deref() == Some("new")));
    }

    #[test]
    fn test_evaluate_without_budgets_skips_budget_rule() {
        let history = vec![expense("h1", "Compras", 95_000.0)];
        let engine = AnomalyEngine::new().with_clock(clock_at(NOON));
        let alerts = engine.evaluate(&expense("new", "Compras", 10_000.0), &history, None);
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_evaluate_missing_category_goal_abstains() {
        let budgets = Budgets::from([("Transporte".to_string(), 1.0)]);
        let engine = AnomalyEngine::new().with_clock(clock_at(NOON));
        let alerts = engine.evaluate(&expense("new", "Compras", 10_000.0), &[], Some(&budgets));
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_evaluate_budget_crossing_is_edge_triggered() {
        let budgets = Budgets::from([("Compras".to_string(), 100_000.0)]);
        let engine = AnomalyEngine::new().with_clock(clock_at(NOON));
        let mut history = vec![expense("h1", "Compras", 90_000.0)];

        let first = expense("t1", "Compras", 20_000.0);
        let alerts = engine.evaluate(&first, &history, Some(&budgets));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].rule, AlertRule::BudgetExceeded);
        history.insert(0, first);

        let second = expense("t2", "Compras", 5_000.0);
        let alerts = engine.evaluate(&second, &history, Some(&budgets));
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_evaluate_uses_policy() {
        let policy = AnomalyPolicy {
            min_category_history: 1,
            high_spending_multiplier: 1.5,
            ..Default::default()
        };
        let engine = AnomalyEngine::with_policy(policy).with_clock(clock_at(NOON));
        let history = vec![expense("h1", "Compras", 100.0)];
        let alerts = engine.evaluate(&expense("new", "Compras", 151.0), &history, None);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::Medium);
        assert_eq!(engine.policy().high_spending_multiplier, 1.5);
    }
}
