//! Mock Telemetry API
//!
//! Simulates a telemetry/dashboard backend for a trading-test platform.
//! Every endpoint returns freshly generated, schema-shaped JSON so a
//! frontend can be built against a stable API before the real backend
//! exists. Exposes modules for the binary and integration tests.

pub mod api;
pub mod clock;
pub mod middleware;
pub mod models;
