//! 风控评分基准测试
//!
//! 评分是创建链路的热点纯函数，目标单次 < 10µs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;

use mallcore::domain::{
    decide, evaluate, DistributorHistory, RiskConfigSnapshot, RiskInput,
};
use mallcore::service::risk_config_service::CONFIG_DEFAULTS;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn snapshot() -> RiskConfigSnapshot {
    let value = |key: &str| {
        CONFIG_DEFAULTS
            .iter()
            .find(|d| d.key == key)
            .map(|d| d.value)
            .unwrap()
    };
    let mut weights = BTreeMap::new();
    for def in CONFIG_DEFAULTS {
        if let Some(name) = def.key.strip_prefix("weight_") {
            weights.insert(name.to_string(), def.value.parse().unwrap());
        }
    }
    RiskConfigSnapshot {
        fee_rate: dec(value("fee_rate")),
        min_withdrawal_amount: dec(value("min_withdrawal_amount")),
        auto_approve_enabled: true,
        auto_approve_max_amount: dec(value("auto_approve_max_amount")),
        min_account_age_days: 30,
        require_identity_verification: true,
        max_requests_per_day: 3,
        max_amount_per_day: dec(value("max_amount_per_day")),
        max_amount_per_month: dec(value("max_amount_per_month")),
        settlement_cooldown_days: 15,
        medium_threshold: 10,
        high_threshold: 30,
        weights,
    }
}

fn clean_history() -> DistributorHistory {
    DistributorHistory {
        account_age_days: 200,
        identity_verified: true,
        today_count: 0,
        today_amount: Decimal::ZERO,
        month_count: 0,
        month_amount: Decimal::ZERO,
        average_amount: Some(dec("500")),
        prior_rejected_count: 0,
    }
}

fn risky_history() -> DistributorHistory {
    DistributorHistory {
        account_age_days: 3,
        identity_verified: false,
        today_count: 3,
        today_amount: dec("9000"),
        month_count: 8,
        month_amount: dec("45000"),
        average_amount: Some(dec("100")),
        prior_rejected_count: 2,
    }
}

fn bench_evaluate(c: &mut Criterion) {
    let config = snapshot();
    let requested_at: DateTime<Utc> = "2026-08-10T12:00:00Z".parse().unwrap();
    let mut group = c.benchmark_group("risk_evaluate");

    for (name, history, amount) in [
        ("clean", clean_history(), dec("300")),
        ("risky", risky_history(), dec("6000")),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &history, |b, history| {
            b.iter(|| {
                evaluate(black_box(&RiskInput {
                    amount,
                    requested_at,
                    history,
                    config: &config,
                }))
                .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_full_decision(c: &mut Criterion) {
    let config = snapshot();
    let requested_at: DateTime<Utc> = "2026-08-10T12:00:00Z".parse().unwrap();
    let history = clean_history();
    let amount = dec("300");

    c.bench_function("evaluate_then_gate", |b| {
        b.iter(|| {
            let evaluation = evaluate(black_box(&RiskInput {
                amount,
                requested_at,
                history: &history,
                config: &config,
            }))
            .unwrap();
            decide(amount, &history, &evaluation, &config)
        })
    });
}

criterion_group!(benches, bench_evaluate, bench_full_decision);
criterion_main!(benches);
