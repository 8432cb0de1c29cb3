use prometheus::{core::Collector, GaugeVec, HistogramVec};

use crate::{error::Error, types::QueryInfo};

use super::{histogram_opts, opts};

/// Per-chain diagnostics over every query outcome of a cycle.
///
/// Runs after the other queriers finished, so it is fed the merged
/// outcome list instead of taking part in the cycle itself.
#[derive(Debug)]
pub struct QueriesQuerier {
    chains: Vec<String>,
}

impl QueriesQuerier {
    pub fn new(chains: Vec<String>) -> QueriesQuerier {
        QueriesQuerier { chains }
    }

    pub fn get_metrics(
        &self,
        queries: &[QueryInfo],
    ) -> Result<Vec<Box<dyn Collector>>, Error> {
        let success = GaugeVec::new(
            opts("success", "Successful queries count per chain"),
            &["chain"],
        )?;
        let error = GaugeVec::new(
            opts("error", "Failed queries count per chain"),
            &["chain"],
        )?;
        let timings = GaugeVec::new(
            opts("timings", "External LCD query timing, in seconds"),
            &["chain", "url"],
        )?;
        let duration = HistogramVec::new(
            histogram_opts(
                "query_duration_seconds",
                "Duration of outbound queries per chain, in seconds",
            ),
            &["chain"],
        )?;

        for chain in &self.chains {
            success.with_label_values(&[chain.as_str()]).set(0.0);
            error.with_label_values(&[chain.as_str()]).set(0.0);
        }

        for query in queries {
            let chain = query.chain.as_str();
            let seconds = query.duration.as_secs_f64();

            if query.success {
                success.with_label_values(&[chain]).inc();
            } else {
                error.with_label_values(&[chain]).inc();
            }

            timings
                .with_label_values(&[chain, query.url.as_str()])
                .set(seconds);
            duration.with_label_values(&[chain]).observe(seconds);
        }

        Ok(vec![
            Box::new(success),
            Box::new(error),
            Box::new(timings),
            Box::new(duration),
        ])
    }
}
