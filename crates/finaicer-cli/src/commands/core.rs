//! Shared command utilities

use finaicer_core::models::{Alert, AlertSeverity};
use finaicer_core::{AnomalyEngine, BudgetAllocator, PolicyConfig};

/// Engine using the policy's thresholds and the system clock
pub fn build_engine(policy: &PolicyConfig) -> AnomalyEngine {
    AnomalyEngine::with_policy(policy.anomaly.clone())
}

pub fn build_allocator(policy: &PolicyConfig) -> BudgetAllocator {
    BudgetAllocator::with_policy(policy.budget.clone())
}

pub fn severity_icon(severity: AlertSeverity) -> &'static str {
    match severity {
        AlertSeverity::High => "🔴",
        AlertSeverity::Medium => "🟠",
        AlertSeverity::Low => "🟡",
    }
}

pub fn print_alerts(alerts: &[Alert]) {
    if alerts.is_empty() {
        println!("✅ No alerts for this transaction.");
        return;
    }

    println!();
    println!(
        "🚨 {} alert{}",
        alerts.len(),
        if alerts.len() == 1 { "" } else { "s" }
    );
    println!("   ─────────────────────────────────────────────────────────────");
    for alert in alerts {
        println!(
            "   {} {:22} {}",
            severity_icon(alert.severity),
            alert.rule.label(),
            alert.message
        );
    }
}
