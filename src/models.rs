use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Pipeline stage labels used by `/api/performance` and `/api/alerts`.
pub const MODULES: &[&str] = &[
    "ingestion_module",
    "scoring_module",
    "portfolio_building_module",
    "execution_module",
];

/// ISO-8601 with microsecond precision and a literal trailing "Z".
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Response metadata attached to every list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub rows: usize,
    pub generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
}

/// The `{meta, data}` wrapper returned by every list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub meta: Meta,
    pub data: Vec<T>,
}

impl<T> Envelope<T> {
    pub fn new(data: Vec<T>, generated_at: DateTime<Utc>) -> Self {
        Self {
            meta: Meta {
                rows: data.len(),
                generated_at: format_timestamp(generated_at),
                interval: None,
            },
            data,
        }
    }

    pub fn with_interval(mut self, interval: String) -> Self {
        self.meta.interval = Some(interval);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub last_update: String,
}

/// One completed strategy test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRun {
    pub test_id: String,
    pub test_name: String,
    pub started_at: String,
    pub ended_at: String,
    pub pnl: f64,
    pub drawdown: f64,
    pub duration_sec: i64,
    #[serde(rename = "return")]
    pub return_frac: f64,
    pub link_status: String,
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub submission_id: String,
    pub test_id: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub asset_id: String,
    pub quantity: i64,
    pub avg_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub portfolio_id: String,
    pub test_id: String,
    pub state: String,
    pub cash_balance: f64,
    pub positions: Vec<Position>,
}

/// One synthetic performance sample for a pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub timestamp: String,
    pub module: String,
    pub test_id: String,
    pub host: String,
    pub throughput: i64,
    pub latency_ms_p95: i64,
    pub cpu_usage: f64,
    pub memory_usage_mb: i64,
    pub errors: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub timestamp: String,
    pub module: String,
    pub test_id: String,
    pub host: String,
    pub metric: String,
    pub value: i64,
    pub threshold: i64,
    pub status: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .unwrap_or(8000);

        Self { host, port }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_carry_z_suffix_and_micros() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 45).unwrap();
        let formatted = format_timestamp(ts);
        assert_eq!(formatted, "2025-03-01T12:30:45.000000Z");
    }

    #[test]
    fn envelope_rows_track_data_len() {
        let env = Envelope::new(vec![1u8, 2, 3], Utc::now());
        assert_eq!(env.meta.rows, 3);
        assert!(env.meta.interval.is_none());

        let env = env.with_interval("5m".to_string());
        assert_eq!(env.meta.interval.as_deref(), Some("5m"));
    }
}
