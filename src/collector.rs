use std::{sync::Arc, time::Instant};

use chrono::Utc;
use futures::future::join_all;
use prometheus::{Encoder, Registry, TextEncoder};
use tracing::{debug, info_span, warn, Span};

use crate::{
    configuration::Config,
    error::Error,
    ledger::Ledger,
    manager::Manager,
    querier::{
        BalanceQuerier, Cycle, DenomCoefficientQuerier, PriceQuerier,
        QueriesQuerier, Querier, UptimeQuerier,
    },
    types::QueryInfo,
};

/// Merged result of one collection cycle.
#[derive(Debug)]
pub struct Snapshot {
    pub registry: Registry,
    pub queries: Vec<QueryInfo>,
}

impl Snapshot {
    pub fn render(&self) -> Result<String, Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = vec![];

        encoder.encode(&metric_families, &mut buffer)?;

        String::from_utf8(buffer)
            .map_err(|e| Error::ServerError(e.to_string()))
    }
}

#[derive(Debug)]
pub struct Collector {
    manager: Arc<Manager>,
    queriers: Vec<Arc<dyn Querier>>,
    queries_querier: QueriesQuerier,
    span: Span,
}

impl Collector {
    pub fn new(config: Arc<Config>, parent: &Span) -> Result<Collector, Error> {
        let span = info_span!(parent: parent, "collector");
        let manager = Arc::new(Manager::new(config.clone(), &span)?);

        let queriers: Vec<Arc<dyn Querier>> = vec![
            Arc::new(BalanceQuerier),
            Arc::new(PriceQuerier),
            Arc::new(UptimeQuerier::new(Utc::now())),
            Arc::new(DenomCoefficientQuerier),
        ];

        let queries_querier = QueriesQuerier::new(
            config.chains.iter().map(|chain| chain.name.clone()).collect(),
        );

        Ok(Collector {
            manager,
            queriers,
            queries_querier,
            span,
        })
    }

    /// Runs every querier in parallel and merges their output.
    ///
    /// A querier that fails or panics is logged and left out of the
    /// snapshot. Only the diagnostics registration can fail the cycle.
    pub async fn collect(&self, parent: &Span) -> Result<Snapshot, Error> {
        let cycle = Arc::new(Cycle::new(self.manager.clone(), parent.clone()));
        let registry = Registry::new();
        let ledger = Arc::new(Ledger::new());

        let mut tasks = Vec::with_capacity(self.queriers.len());

        for querier in &self.queriers {
            let querier = querier.clone();
            let cycle = cycle.clone();
            let registry = registry.clone();
            let ledger = ledger.clone();

            tasks.push(tokio::spawn(async move {
                let start = Instant::now();
                let output = querier.get_metrics(&cycle).await?;

                for collector in output.collectors {
                    registry.register(collector)?;
                }
                ledger.extend(output.queries);

                debug!(
                    parent: &cycle.span,
                    "Querier {} finished in {:?}",
                    querier.name(),
                    start.elapsed()
                );

                Ok::<(), Error>(())
            }));
        }

        for result in join_all(tasks).await {
            match result {
                Ok(Ok(())) => {},
                Ok(Err(e)) => {
                    warn!(parent: &cycle.span, "Querier failed: {}", e)
                },
                Err(e) => {
                    warn!(parent: &cycle.span, "Querier task panicked: {}", e)
                },
            }
        }

        let queries = ledger.snapshot();
        for collector in self.queries_querier.get_metrics(&queries)? {
            registry.register(collector)?;
        }

        debug!(
            parent: &self.span,
            "Cycle finished with {} queries",
            queries.len()
        );

        Ok(Snapshot { registry, queries })
    }
}
