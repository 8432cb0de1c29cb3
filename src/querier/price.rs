use async_trait::async_trait;
use prometheus::GaugeVec;

use crate::error::Error;

use super::{opts, Cycle, Querier, QuerierOutput};

/// Renders the USD price of every denom with a price feed. Owns the
/// outcome of the cycle's single price request.
#[derive(Debug, Default)]
pub struct PriceQuerier;

#[async_trait]
impl Querier for PriceQuerier {
    fn name(&self) -> &'static str {
        "price"
    }

    async fn get_metrics(&self, cycle: &Cycle) -> Result<QuerierOutput, Error> {
        let snapshot = cycle.prices().await;

        let price = GaugeVec::new(
            opts("price", "Price of 1 token in display denom in USD"),
            &["chain", "denom"],
        )?;

        for chain in &cycle.manager().config.chains {
            for denom in &chain.denoms {
                let value = denom
                    .coingecko_currency()
                    .and_then(|currency| snapshot.prices.get(currency));

                if let Some(value) = value {
                    price
                        .with_label_values(&[chain.name.as_str(), denom.get_name()])
                        .set(*value);
                }
            }
        }

        Ok(QuerierOutput::new(
            vec![Box::new(price)],
            snapshot.query.iter().cloned().collect(),
        ))
    }
}
