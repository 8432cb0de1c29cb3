use async_trait::async_trait;
use prometheus::GaugeVec;

use crate::error::Error;

use super::{opts, Cycle, Querier, QuerierOutput};

#[derive(Debug, Default)]
pub struct DenomCoefficientQuerier;

#[async_trait]
impl Querier for DenomCoefficientQuerier {
    fn name(&self) -> &'static str {
        "denom_coefficient"
    }

    async fn get_metrics(&self, cycle: &Cycle) -> Result<QuerierOutput, Error> {
        let coefficient = GaugeVec::new(
            opts("denom_coefficient", "Denom coefficient info"),
            &["chain", "denom", "display_denom"],
        )?;

        for chain in &cycle.manager().config.chains {
            for denom in &chain.denoms {
                coefficient
                    .with_label_values(&[
                        chain.name.as_str(),
                        denom.denom.as_str(),
                        denom.get_name(),
                    ])
                    .set(denom.coefficient() as f64);
            }
        }

        Ok(QuerierOutput::new(vec![Box::new(coefficient)], vec![]))
    }
}
