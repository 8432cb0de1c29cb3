use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use tracing::{debug, debug_span, Span};

use crate::{
    configuration::Chain,
    error::Error,
    provider::http::{check_height_after, get_block_height, HTTP},
    types::{BalanceResponse, QueryInfo},
};

/// Bank module client for one chain's LCD endpoint.
///
/// Remembers the last block height seen per address so that a response
/// which is not newer than one already processed gets rejected.
#[derive(Debug)]
pub struct LCD {
    pub chain: Arc<Chain>,
    http: HTTP,
    last_heights: Mutex<HashMap<String, u64>>,
    span: Span,
}

impl LCD {
    pub fn new(chain: Arc<Chain>, parent: &Span) -> Result<LCD, Error> {
        let span = debug_span!(parent: parent, "lcd", chain = %chain.name);
        let http = HTTP::new(&chain.name, &span)?;

        Ok(LCD {
            chain,
            http,
            last_heights: Mutex::new(HashMap::new()),
            span,
        })
    }

    pub async fn get_wallet_balances(
        &self,
        address: &str,
    ) -> (QueryInfo, Result<BalanceResponse, Error>) {
        let url = self.chain.balances_url(address);

        // Compared against the cache as it is when the response arrives,
        // not when the request was sent.
        let (mut query_info, result) = self
            .http
            .get::<BalanceResponse, _>(&url, |response| {
                check_height_after(self.last_height(address))(response)
            })
            .await;

        let fetched = match result {
            Ok(fetched) => fetched,
            Err(e) => return (query_info, Err(e)),
        };

        let raised = match get_block_height(&fetched.headers) {
            Ok(Some(height)) => self.raise_height(address, height),
            Ok(None) => {
                debug!(
                    parent: &self.span,
                    "No block height in response for {}", address
                );
                Ok(())
            },
            Err(e) => Err(e),
        };

        if let Err(e) = raised {
            query_info.success = false;
            return (query_info, Err(e));
        }

        (query_info, Ok(fetched.data))
    }

    pub fn last_height(&self, address: &str) -> Option<u64> {
        let heights = self
            .last_heights
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        heights.get(address).copied()
    }

    /// Raises the cached height, or rejects `height` if a response at the
    /// same or a newer height was already accepted for this address.
    fn raise_height(&self, address: &str, height: u64) -> Result<(), Error> {
        let mut heights = self
            .last_heights
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match heights.get_mut(address) {
            Some(previous) if height <= *previous => Err(Error::StaleHeight {
                previous: *previous,
                current: height,
            }),
            Some(previous) => {
                *previous = height;
                Ok(())
            },
            None => {
                heights.insert(address.to_owned(), height);
                Ok(())
            },
        }
    }
}
