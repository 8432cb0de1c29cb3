use async_trait::async_trait;
use prometheus::GaugeVec;
use tracing::debug;

use crate::error::Error;

use super::{bool_to_f64, opts, Cycle, Querier, QuerierOutput};

const WALLET_LABELS: [&str; 4] = ["chain", "address", "name", "group"];
const BALANCE_LABELS: [&str; 5] = ["chain", "address", "name", "group", "denom"];

#[derive(Debug, Default)]
pub struct BalanceQuerier;

#[async_trait]
impl Querier for BalanceQuerier {
    fn name(&self) -> &'static str {
        "balance"
    }

    async fn get_metrics(&self, cycle: &Cycle) -> Result<QuerierOutput, Error> {
        let prices = cycle.prices().await;
        let entries = cycle.manager().get_all_balances(&prices.prices).await;

        let success = GaugeVec::new(
            opts("wallet_success", "Whether the wallet scrape was successful"),
            &WALLET_LABELS,
        )?;
        let query_time = GaugeVec::new(
            opts("wallet_query_time", "Time it took to query the wallet balance, in seconds"),
            &WALLET_LABELS,
        )?;
        let balance = GaugeVec::new(
            opts("balance", "Wallet balance in display denom"),
            &BALANCE_LABELS,
        )?;
        let balance_usd = GaugeVec::new(
            opts("balance_usd", "Wallet balance of the chain base denom in USD"),
            &WALLET_LABELS,
        )?;

        let mut queries = Vec::with_capacity(entries.len());

        for entry in entries {
            let labels = [
                entry.chain.as_str(),
                entry.wallet.address.as_str(),
                entry.wallet.name.as_str(),
                entry.wallet.group.as_str(),
            ];

            success
                .with_label_values(&labels)
                .set(bool_to_f64(entry.success));
            query_time
                .with_label_values(&labels)
                .set(entry.duration.as_secs_f64());

            for item in &entry.balances {
                balance
                    .with_label_values(&[
                        labels[0],
                        labels[1],
                        labels[2],
                        labels[3],
                        item.denom.as_str(),
                    ])
                    .set(item.amount);
            }

            if let Some(usd_value) = entry.usd_value {
                balance_usd.with_label_values(&labels).set(usd_value);
            }

            if let Some(query) = entry.query {
                queries.push(query);
            }
        }

        debug!(
            parent: &cycle.span,
            "Collected balances, {} wallet queries", queries.len()
        );

        Ok(QuerierOutput::new(
            vec![
                Box::new(success),
                Box::new(query_time),
                Box::new(balance),
                Box::new(balance_usd),
            ],
            queries,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::querier::tests::{chain, cycle, family, gather, label, price_server};
    use serde_json::json;
    use wiremock::{
        matchers::{method, path_regex},
        Mock, MockServer, ResponseTemplate,
    };

    #[tokio::test]
    async fn test_balance_metrics() {
        let prices = price_server(1).await;
        let lcd = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex("^/cosmos/bank/v1beta1/balances/.+$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "balances": [
                    { "denom": "uatom", "amount": "234567" },
                    { "denom": "uother", "amount": "5" }
                ]
            })))
            .mount(&lcd)
            .await;

        let cycle = cycle(
            &prices.uri(),
            vec![
                chain("healthy", &lcd.uri(), &["address-a"]),
                chain("broken", "http://127.0.0.1:1", &["address-b"]),
            ],
        );

        let output = BalanceQuerier
            .get_metrics(&cycle)
            .await
            .unwrap();

        assert_eq!(output.queries.len(), 2);
        assert!(output.queries[0].success);
        assert!(!output.queries[1].success);

        let families = gather(output);

        let success = family(&families, "cosmos_wallets_exporter_wallet_success");
        assert_eq!(success.get_metric().len(), 2);
        for metric in success.get_metric() {
            let expected = match label(metric, "chain") {
                "healthy" => 1.0,
                _ => 0.0,
            };
            assert_eq!(metric.get_gauge().get_value(), expected);
            assert_eq!(label(metric, "group"), "group");
        }

        let balance = family(&families, "cosmos_wallets_exporter_balance");
        assert_eq!(balance.get_metric().len(), 2);
        let atom = balance
            .get_metric()
            .iter()
            .find(|metric| label(metric, "denom") == "atom")
            .unwrap();
        assert!((atom.get_gauge().get_value() - 0.234567).abs() < 1e-12);

        let usd = family(&families, "cosmos_wallets_exporter_balance_usd");
        assert_eq!(usd.get_metric().len(), 1);
        assert_eq!(label(&usd.get_metric()[0], "address"), "address-a");
        assert!(
            (usd.get_metric()[0].get_gauge().get_value() - 0.234567 * 5.84).abs()
                < 1e-9
        );
    }
}
