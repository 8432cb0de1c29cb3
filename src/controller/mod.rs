pub mod healthcheck;
pub mod metrics;
