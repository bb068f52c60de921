//! Mock telemetry handlers.
//!
//! Every endpoint synthesizes a fresh payload per request; nothing is
//! persisted or shared between requests beyond the RNG. Row construction is
//! split out of the handlers into pure functions taking the clock reading
//! and an RNG, so payload shapes are testable without HTTP plumbing.

use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Deserialize;
use std::num::IntErrorKind;
use uuid::Uuid;

use crate::api::routes::{ApiError, AppState};
use crate::models::{
    format_timestamp, Alert, Envelope, HealthStatus, PerformanceSample, Portfolio, Position,
    Submission, TestRun, MODULES,
};

const TEST_RUN_ROWS: usize = 3;
const SUBMISSION_ROWS: usize = 5;
const ALERT_ROWS: usize = 3;

/// Hard cap on `/api/performance` rows regardless of the requested limit.
const PERFORMANCE_ROW_CAP: usize = 10;
const DEFAULT_PERFORMANCE_LIMIT: usize = 500;
const DEFAULT_INTERVAL: &str = "5m";

const DEFAULT_TEST_NAME: &str = "strategy_alpha";
const DEFAULT_TEST_STATE: &str = "COMPLETED";
const DEFAULT_ALERT_STATUS: &str = "CRITICAL";
const ALERT_METRIC: &str = "latency_ms_p95";
const ALERT_THRESHOLD: i64 = 150;

// ===== Query Parameters =====

#[derive(Debug, Deserialize)]
pub struct TestRunQuery {
    /// Accepted but not applied as a filter (mock behavior).
    pub date_from: Option<String>,
    /// Accepted but not applied as a filter (mock behavior).
    pub date_to: Option<String>,
    pub test_name: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmissionQuery {
    pub test_id: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PortfolioQuery {
    pub test_id: Option<String>,
    pub portfolio_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PerformanceQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub interval: Option<String>,
    pub module: Option<String>,
    pub test_id: Option<String>,
    pub host: Option<String>,
    /// Accepted but unused (mock behavior).
    pub asset: Option<String>,
    /// Accepted but unused (mock behavior).
    pub status: Option<String>,
    /// Parsed manually so a bad value yields a 400 naming the field.
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub module: Option<String>,
    pub test_id: Option<String>,
    pub status: Option<String>,
}

// ===== Route Handlers =====

/// Health check: fixed "connected" status plus the current timestamp.
pub async fn get_health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "connected".to_string(),
        last_update: format_timestamp(state.clock.now()),
    })
}

/// List recent test runs (3 synthetic rows).
pub async fn get_test_runs(
    Query(params): Query<TestRunQuery>,
    State(state): State<AppState>,
) -> Json<Envelope<TestRun>> {
    let now = state.clock.now();
    let mut rng = state.rng.lock();

    let test_name = non_empty(params.test_name);
    let run_state = non_empty(params.state);
    let data = build_test_runs(now, &mut *rng, test_name.as_deref(), run_state.as_deref());

    Json(Envelope::new(data, now))
}

/// List submissions for a test (5 synthetic rows).
pub async fn get_submissions(
    Query(params): Query<SubmissionQuery>,
    State(state): State<AppState>,
) -> Json<Envelope<Submission>> {
    let now = state.clock.now();
    let mut rng = state.rng.lock();

    let test_id = non_empty(params.test_id);
    let data = build_submissions(&mut *rng, test_id.as_deref());

    Json(Envelope::new(data, now))
}

/// Current portfolio snapshot (always a single row).
pub async fn get_portfolio(
    Query(params): Query<PortfolioQuery>,
    State(state): State<AppState>,
) -> Json<Envelope<Portfolio>> {
    let now = state.clock.now();
    let mut rng = state.rng.lock();

    let portfolio_id = non_empty(params.portfolio_id);
    let test_id = non_empty(params.test_id);
    let data = vec![build_portfolio(
        &mut *rng,
        portfolio_id.as_deref(),
        test_id.as_deref(),
    )];

    Json(Envelope::new(data, now))
}

/// Performance samples, one per 5-minute step back from now.
///
/// `limit` defaults to 500 but rows are hard-capped at 10; `asset` and
/// `status` are accepted but never applied.
pub async fn get_performance(
    Query(params): Query<PerformanceQuery>,
    State(state): State<AppState>,
) -> Result<Json<Envelope<PerformanceSample>>, ApiError> {
    // Any integer is accepted; negatives yield zero rows and out-of-range
    // magnitudes saturate. Only non-integer text is a client error.
    let limit = match non_empty(params.limit) {
        Some(raw) => match raw.parse::<i64>() {
            Ok(v) => usize::try_from(v).unwrap_or(0),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => usize::MAX,
                IntErrorKind::NegOverflow => 0,
                _ => {
                    return Err(ApiError::InvalidParameter {
                        field: "limit",
                        value: raw,
                    })
                }
            },
        },
        None => DEFAULT_PERFORMANCE_LIMIT,
    };

    let interval =
        non_empty(params.interval).unwrap_or_else(|| DEFAULT_INTERVAL.to_string());

    let now = state.clock.now();
    let mut rng = state.rng.lock();

    let module = non_empty(params.module);
    let test_id = non_empty(params.test_id);
    let host = non_empty(params.host);
    let data = build_performance_samples(
        now,
        &mut *rng,
        limit.min(PERFORMANCE_ROW_CAP),
        module.as_deref(),
        test_id.as_deref(),
        host.as_deref(),
    );

    Ok(Json(Envelope::new(data, now).with_interval(interval)))
}

/// Active alerts (3 synthetic rows, always on the p95 latency metric).
pub async fn get_alerts(
    Query(params): Query<AlertQuery>,
    State(state): State<AppState>,
) -> Json<Envelope<Alert>> {
    let now = state.clock.now();
    let mut rng = state.rng.lock();

    let module = non_empty(params.module);
    let test_id = non_empty(params.test_id);
    let status = non_empty(params.status);
    let data = build_alerts(
        now,
        &mut *rng,
        module.as_deref(),
        test_id.as_deref(),
        status.as_deref(),
    );

    Json(Envelope::new(data, now))
}

// ===== Row Builders =====

pub fn build_test_runs(
    now: DateTime<Utc>,
    rng: &mut impl Rng,
    test_name: Option<&str>,
    state: Option<&str>,
) -> Vec<TestRun> {
    let started_at = format_timestamp(now - Duration::minutes(45));
    let ended_at = format_timestamp(now);

    (0..TEST_RUN_ROWS)
        .map(|_| TestRun {
            test_id: Uuid::new_v4().to_string(),
            test_name: test_name.unwrap_or(DEFAULT_TEST_NAME).to_string(),
            started_at: started_at.clone(),
            ended_at: ended_at.clone(),
            pnl: round_to(rng.gen_range(-5000.0..5000.0), 2),
            drawdown: round_to(rng.gen_range(-500.0..0.0), 2),
            duration_sec: 2700,
            return_frac: round_to(rng.gen_range(-0.1..0.1), 4),
            link_status: "OK".to_string(),
            state: state.unwrap_or(DEFAULT_TEST_STATE).to_string(),
        })
        .collect()
}

pub fn build_submissions(rng: &mut impl Rng, test_id: Option<&str>) -> Vec<Submission> {
    (0..SUBMISSION_ROWS)
        .map(|_| Submission {
            submission_id: Uuid::new_v4().to_string(),
            test_id: test_id
                .map(str::to_string)
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            score: round_to(rng.gen_range(0.0..1.0), 2),
        })
        .collect()
}

pub fn build_portfolio(
    rng: &mut impl Rng,
    portfolio_id: Option<&str>,
    test_id: Option<&str>,
) -> Portfolio {
    Portfolio {
        portfolio_id: portfolio_id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        test_id: test_id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        state: "ACTIVE".to_string(),
        cash_balance: round_to(rng.gen_range(1000.0..50000.0), 2),
        // The position list is fixed; only the cash balance varies.
        positions: vec![
            Position {
                asset_id: "AAPL".to_string(),
                quantity: 50,
                avg_price: 178.3,
            },
            Position {
                asset_id: "GOOGL".to_string(),
                quantity: 10,
                avg_price: 1450.2,
            },
        ],
    }
}

pub fn build_performance_samples(
    now: DateTime<Utc>,
    rng: &mut impl Rng,
    rows: usize,
    module: Option<&str>,
    test_id: Option<&str>,
    host: Option<&str>,
) -> Vec<PerformanceSample> {
    (0..rows)
        .map(|i| PerformanceSample {
            timestamp: format_timestamp(now - Duration::minutes(i as i64 * 5)),
            module: module
                .map(str::to_string)
                .unwrap_or_else(|| random_module(rng)),
            test_id: test_id
                .map(str::to_string)
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            host: host.map(str::to_string).unwrap_or_else(|| node_host(i)),
            throughput: rng.gen_range(10_000..=20_000),
            latency_ms_p95: rng.gen_range(50..=200),
            cpu_usage: round_to(rng.gen_range(0.0..1.0), 2),
            memory_usage_mb: rng.gen_range(1_000..=4_000),
            errors: rng.gen_range(0..=5),
        })
        .collect()
}

pub fn build_alerts(
    now: DateTime<Utc>,
    rng: &mut impl Rng,
    module: Option<&str>,
    test_id: Option<&str>,
    status: Option<&str>,
) -> Vec<Alert> {
    (0..ALERT_ROWS)
        .map(|i| Alert {
            timestamp: format_timestamp(now - Duration::minutes(i as i64)),
            module: module
                .map(str::to_string)
                .unwrap_or_else(|| random_module(rng)),
            test_id: test_id
                .map(str::to_string)
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            // Host is always the round-robin node, never caller-supplied.
            host: node_host(i),
            metric: ALERT_METRIC.to_string(),
            value: rng.gen_range(150..=300),
            threshold: ALERT_THRESHOLD,
            status: status.unwrap_or(DEFAULT_ALERT_STATUS).to_string(),
        })
        .collect()
}

// ===== Helpers =====

/// Round-robin host label: node-01 through node-05.
fn node_host(index: usize) -> String {
    format!("node-{:02}", (index % 5) + 1)
}

fn random_module(rng: &mut impl Rng) -> String {
    MODULES[rng.gen_range(0..MODULES.len())].to_string()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Empty query parameters behave as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
