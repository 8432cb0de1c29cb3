use std::collections::HashMap;

use tracing::{debug_span, error, Span};

use crate::{
    error::Error,
    provider::http::{always_pass, HTTP},
    types::{CoinGeckoPrice, QueryInfo},
};

pub const COINGECKO_CHAIN: &str = "coingecko";

#[derive(Debug)]
pub struct Coingecko {
    api: String,
    http: HTTP,
    span: Span,
}

impl Coingecko {
    pub fn new(api: &str, parent: &Span) -> Result<Coingecko, Error> {
        let span = debug_span!(parent: parent, "coingecko");
        let http = HTTP::new(COINGECKO_CHAIN, &span)?;

        Ok(Coingecko {
            api: api.trim_end_matches('/').to_owned(),
            http,
            span,
        })
    }

    pub fn get_prices_url(&self, ids: &[String]) -> String {
        format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.api,
            ids.join(",")
        )
    }

    /// Fetches USD prices for the whole batch in one request.
    ///
    /// Ids missing from the response are left out of the map. An empty
    /// batch is not sent at all.
    pub async fn fetch_prices(
        &self,
        currencies: &[String],
    ) -> (HashMap<String, f64>, Option<QueryInfo>) {
        if currencies.is_empty() {
            return (HashMap::new(), None);
        }

        let url = self.get_prices_url(currencies);
        let (query_info, result) =
            self.http.get::<CoinGeckoPrice, _>(&url, always_pass()).await;

        let response = match result {
            Ok(fetched) => fetched.data,
            Err(e) => {
                error!(parent: &self.span, "Could not get rate: {}", e);
                return (HashMap::new(), Some(query_info));
            },
        };

        let prices = response
            .into_iter()
            .filter(|(currency, _)| currencies.contains(currency))
            .filter_map(|(currency, values)| {
                values.get("usd").map(|price| (currency, *price))
            })
            .collect();

        (prices, Some(query_info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[tokio::test]
    async fn test_prices_url() {
        let coingecko =
            Coingecko::new("https://api.coingecko.com/api/v3/", &Span::none())
                .unwrap();

        assert_eq!(
            coingecko.get_prices_url(&ids(&["cosmos", "osmosis"])),
            "https://api.coingecko.com/api/v3/simple/price?ids=cosmos,osmosis&vs_currencies=usd"
        );
    }

    #[tokio::test]
    async fn test_fetch_prices_ok_omits_missing_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", "cosmos,random"))
            .and(query_param("vs_currencies", "usd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cosmos": { "usd": 5.84 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let coingecko = Coingecko::new(&server.uri(), &Span::none()).unwrap();
        let (prices, query_info) =
            coingecko.fetch_prices(&ids(&["cosmos", "random"])).await;

        let query_info = query_info.unwrap();
        assert!(query_info.success);
        assert_eq!(query_info.chain, COINGECKO_CHAIN);
        assert_eq!(prices.len(), 1);
        assert!((prices["cosmos"] - 5.84).abs() < f64::EPSILON);
        assert!(!prices.contains_key("random"));
    }

    #[tokio::test]
    async fn test_fetch_prices_skips_entries_without_usd() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cosmos": { "eur": 5.0 },
                "osmosis": { "usd": 0.5 }
            })))
            .mount(&server)
            .await;

        let coingecko = Coingecko::new(&server.uri(), &Span::none()).unwrap();
        let (prices, query_info) =
            coingecko.fetch_prices(&ids(&["cosmos", "osmosis"])).await;

        assert!(query_info.unwrap().success);
        assert_eq!(prices.len(), 1);
        assert!((prices["osmosis"] - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_fetch_prices_fail() {
        let coingecko =
            Coingecko::new("http://127.0.0.1:1", &Span::none()).unwrap();
        let (prices, query_info) =
            coingecko.fetch_prices(&ids(&["cosmos"])).await;

        assert!(prices.is_empty());
        assert!(!query_info.unwrap().success);
    }

    #[tokio::test]
    async fn test_fetch_prices_empty_batch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let coingecko = Coingecko::new(&server.uri(), &Span::none()).unwrap();
        let (prices, query_info) = coingecko.fetch_prices(&[]).await;

        assert!(prices.is_empty());
        assert!(query_info.is_none());
    }
}
