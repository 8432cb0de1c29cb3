use std::time::{Duration, Instant};

use reqwest::{header::HeaderMap, Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, debug_span, warn, Span};

use crate::{
    error::{self, Error},
    types::QueryInfo,
};

pub const USER_AGENT: &str = "cosmos-wallets-exporter";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const HEADER_BLOCK_HEIGHT: &str = "grpc-metadata-x-cosmos-block-height";

/// Decoded body together with the headers it arrived with.
#[derive(Debug)]
pub struct Fetched<T> {
    pub data: T,
    pub headers: HeaderMap,
}

#[derive(Debug)]
pub struct HTTP {
    chain: String,
    http: Client,
    span: Span,
}

impl HTTP {
    pub fn new(chain: &str, parent: &Span) -> Result<HTTP, Error> {
        let http = match Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                return Err(error::Error::ReqwestError(e));
            },
        };

        Ok(HTTP {
            chain: chain.to_owned(),
            http,
            span: debug_span!(parent: parent, "http", chain = %chain),
        })
    }

    /// Runs a GET and decodes the JSON body into `T`.
    ///
    /// A non-2xx status is an error. `predicate` sees the response before
    /// the body is read and can reject it. The recorded duration stops once
    /// the response head arrives.
    pub async fn get<T, P>(
        &self,
        url: &str,
        predicate: P,
    ) -> (QueryInfo, Result<Fetched<T>, Error>)
    where
        T: DeserializeOwned,
        P: FnOnce(&Response) -> Result<(), Error>,
    {
        let mut query_info = QueryInfo::new(&self.chain, url);
        let start = Instant::now();

        debug!(parent: &self.span, "Doing a query {}", url);

        let response = self.http.get(url).send().await;
        query_info.duration = start.elapsed();

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                warn!(parent: &self.span, "Query {} failed: {}", url, e);
                return (query_info, Err(Error::ReqwestError(e)));
            },
        };

        debug!(
            parent: &self.span,
            "Query {} finished in {:?}", url, query_info.duration
        );

        if let Err(e) = response.error_for_status_ref() {
            warn!(parent: &self.span, "Query {} failed: {}", url, e);
            return (query_info, Err(Error::ReqwestError(e)));
        }

        if let Err(e) = predicate(&response) {
            return (query_info, Err(e));
        }

        let headers = response.headers().clone();
        let result = match response.bytes().await {
            Ok(body) => serde_json::from_slice::<T>(&body).map_err(Error::from),
            Err(e) => Err(Error::ReqwestError(e)),
        };

        query_info.success = result.is_ok();

        (query_info, result.map(|data| Fetched { data, headers }))
    }
}

pub fn always_pass() -> impl FnOnce(&Response) -> Result<(), Error> {
    |_| Ok(())
}

/// Rejects responses whose block height is not strictly above `previous`.
/// Responses without a height header always pass.
pub fn check_height_after(
    previous: Option<u64>,
) -> impl FnOnce(&Response) -> Result<(), Error> {
    move |response| {
        let current = get_block_height(response.headers())?;

        match (previous, current) {
            (Some(previous), Some(current)) if current <= previous => {
                Err(Error::StaleHeight { previous, current })
            },
            _ => Ok(()),
        }
    }
}

pub fn get_block_height(headers: &HeaderMap) -> Result<Option<u64>, Error> {
    let value = match headers.get(HEADER_BLOCK_HEIGHT) {
        Some(value) => value.to_str()?,
        None => return Ok(None),
    };

    if value.is_empty() {
        return Ok(None);
    }

    Ok(Some(value.parse()?))
}
