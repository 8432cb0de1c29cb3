use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use prometheus::{core::Collector, HistogramOpts, Opts};
use tokio::sync::OnceCell;
use tracing::Span;

use crate::{
    error::Error,
    manager::{Manager, PriceSnapshot},
    types::QueryInfo,
};

pub use self::{
    balance::BalanceQuerier, denom_coefficient::DenomCoefficientQuerier,
    price::PriceQuerier, queries::QueriesQuerier, uptime::UptimeQuerier,
};

mod balance;
mod denom_coefficient;
mod price;
mod queries;
mod uptime;

pub const METRICS_NAMESPACE: &str = "cosmos_wallets_exporter";

/// Metric collectors produced by one querier together with the outbound
/// queries it made to build them.
pub struct QuerierOutput {
    pub collectors: Vec<Box<dyn Collector>>,
    pub queries: Vec<QueryInfo>,
}

impl QuerierOutput {
    pub fn new(
        collectors: Vec<Box<dyn Collector>>,
        queries: Vec<QueryInfo>,
    ) -> QuerierOutput {
        QuerierOutput {
            collectors,
            queries,
        }
    }
}

#[async_trait]
pub trait Querier: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    async fn get_metrics(&self, cycle: &Cycle) -> Result<QuerierOutput, Error>;
}

/// State shared by every querier during one collection cycle.
///
/// Prices are fetched lazily on first use and at most once per cycle.
#[derive(Debug)]
pub struct Cycle {
    manager: Arc<Manager>,
    prices: OnceCell<PriceSnapshot>,
    pub span: Span,
}

impl Cycle {
    pub fn new(manager: Arc<Manager>, span: Span) -> Cycle {
        Cycle {
            manager,
            prices: OnceCell::new(),
            span,
        }
    }

    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    pub async fn prices(&self) -> &PriceSnapshot {
        self.prices
            .get_or_init(|| self.manager.fetch_prices())
            .await
    }
}

pub fn opts(name: &str, help: &str) -> Opts {
    Opts::new(name, help).namespace(METRICS_NAMESPACE)
}

pub fn histogram_opts(name: &str, help: &str) -> HistogramOpts {
    HistogramOpts::new(name, help).namespace(METRICS_NAMESPACE)
}

pub fn bool_to_f64(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::configuration::{parse_configuration, Chain, DenomInfo, Wallet};
    use prometheus::{proto::MetricFamily, Registry};
    use serde_json::json;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    pub fn denom(
        name: &str,
        display: Option<&str>,
        currency: Option<&str>,
    ) -> DenomInfo {
        DenomInfo {
            denom: name.to_owned(),
            display_denom: display.map(str::to_owned),
            denom_coefficient: 1_000_000,
            denom_exponent: None,
            coingecko_currency: currency.map(str::to_owned),
        }
    }

    pub fn chain(name: &str, endpoint: &str, addresses: &[&str]) -> Chain {
        Chain {
            name: name.to_owned(),
            lcd_endpoint: endpoint.to_owned(),
            base_denom: None,
            denoms: vec![denom("uatom", Some("atom"), Some("cosmos"))],
            wallets: addresses
                .iter()
                .map(|address| Wallet {
                    address: address.to_string(),
                    name: String::from("name"),
                    group: String::from("group"),
                })
                .collect(),
        }
    }

    pub fn cycle(price_api: &str, chains: Vec<Chain>) -> Cycle {
        let mut config = parse_configuration("").unwrap();
        config.price_api = price_api.to_owned();
        config.chains = chains;

        let manager = Manager::new(Arc::new(config), &Span::none()).unwrap();
        Cycle::new(Arc::new(manager), Span::none())
    }

    pub async fn price_server(expected_calls: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cosmos": { "usd": 5.84 }
            })))
            .expect(expected_calls)
            .mount(&server)
            .await;

        server
    }

    pub fn gather(output: QuerierOutput) -> Vec<MetricFamily> {
        let registry = Registry::new();
        for collector in output.collectors {
            registry.register(collector).unwrap();
        }

        registry.gather()
    }

    pub fn family<'a>(
        families: &'a [MetricFamily],
        name: &str,
    ) -> &'a MetricFamily {
        families
            .iter()
            .find(|family| family.get_name() == name)
            .unwrap_or_else(|| panic!("metric {} not found", name))
    }

    pub fn label<'a>(
        metric: &'a prometheus::proto::Metric,
        name: &str,
    ) -> &'a str {
        metric
            .get_label()
            .iter()
            .find(|pair| pair.get_name() == name)
            .map(|pair| pair.get_value())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_cycle_fetches_prices_once() {
        let server = price_server(1).await;
        let cycle = Arc::new(cycle(
            &server.uri(),
            vec![chain("chain", "http://127.0.0.1:1", &["address"])],
        ));

        let first = cycle.clone();
        let second = cycle.clone();
        let (a, b) = tokio::join!(
            async move { first.prices().await.prices.len() },
            async move { second.prices().await.prices.len() },
        );

        assert_eq!(a, 1);
        assert_eq!(b, 1);
        assert!(cycle.prices().await.query.as_ref().unwrap().success);
    }

    #[test]
    fn test_opts_namespace() {
        let opts = opts("balance", "help");
        assert_eq!(opts.fq_name(), "cosmos_wallets_exporter_balance");
    }
}
