use std::{
    collections::HashSet, fs, net::SocketAddr, ops::Deref, path::Path,
    sync::Arc,
};

use serde::Deserialize;
use tracing::{Level, Span};
use url::Url;

use crate::{collector::Collector, error::Error};

pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:9550";
pub const DEFAULT_PRICE_API: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_DENOM_COEFFICIENT: u64 = 1_000_000;

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

#[derive(Debug)]
pub struct State {
    pub config: Arc<Config>,
    pub collector: Collector,
    pub span: Span,
}

impl State {
    pub fn new(config: Config, span: Span) -> Result<State, Error> {
        let config = Arc::new(config);
        let collector = Collector::new(config.clone(), &span)?;

        Ok(Self {
            config,
            collector,
            span,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    #[serde(default = "default_price_api")]
    pub price_api: String,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub chains: Vec<Chain>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl LogConfig {
    pub fn max_level(&self) -> Level {
        match self.level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Chain {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lcd_endpoint: String,
    pub base_denom: Option<String>,
    #[serde(default)]
    pub denoms: Vec<DenomInfo>,
    #[serde(default)]
    pub wallets: Vec<Wallet>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DenomInfo {
    pub denom: String,
    pub display_denom: Option<String>,
    #[serde(default = "default_denom_coefficient")]
    pub denom_coefficient: u64,
    pub denom_exponent: Option<u32>,
    pub coingecko_currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Wallet {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub group: String,
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        if self.chains.is_empty() {
            return Err(Error::ConfigurationError(String::from(
                "no chains provided",
            )));
        }

        self.listen_address.parse::<SocketAddr>().map_err(|e| {
            Error::ConfigurationError(format!(
                "invalid listen address {}: {}",
                self.listen_address, e
            ))
        })?;

        Url::parse(&self.price_api).map_err(|e| {
            Error::ConfigurationError(format!("invalid price api url: {}", e))
        })?;

        for (index, chain) in self.chains.iter().enumerate() {
            if let Err(e) = chain.validate() {
                return Err(Error::ConfigurationError(format!(
                    "error in chain {}: {}",
                    index, e
                )));
            }
        }

        Ok(())
    }

    /// Distinct price-feed ids across every chain, in configuration order.
    pub fn get_coingecko_currencies(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut currencies = vec![];

        for chain in &self.chains {
            for denom in &chain.denoms {
                if let Some(currency) = denom.coingecko_currency() {
                    if seen.insert(currency) {
                        currencies.push(currency.to_owned());
                    }
                }
            }
        }

        currencies
    }

    pub fn wallets_count(&self) -> usize {
        self.chains.iter().map(|chain| chain.wallets.len()).sum()
    }
}

impl Chain {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err(String::from("empty chain name"));
        }

        if self.lcd_endpoint.is_empty() {
            return Err(String::from("no LCD endpoint provided"));
        }

        if let Err(e) = Url::parse(&self.lcd_endpoint) {
            return Err(format!("invalid LCD endpoint: {}", e));
        }

        if self.wallets.is_empty() {
            return Err(String::from("no wallets provided"));
        }

        for (index, wallet) in self.wallets.iter().enumerate() {
            if let Err(e) = wallet.validate() {
                return Err(format!("error in wallet {}: {}", index, e));
            }
        }

        for (index, denom) in self.denoms.iter().enumerate() {
            if let Err(e) = denom.validate() {
                return Err(format!("error in denom {}: {}", index, e));
            }
        }

        if let Some(base_denom) = &self.base_denom {
            if self.find_denom_by_name(base_denom).is_none() {
                return Err(format!(
                    "base denom {} is not in the denoms list",
                    base_denom
                ));
            }
        }

        Ok(())
    }

    pub fn find_denom_by_name(&self, denom: &str) -> Option<&DenomInfo> {
        self.denoms.iter().find(|item| item.denom == denom)
    }

    /// The denom priced in USD: the declared base denom, else the first one.
    pub fn base_denom_info(&self) -> Option<&DenomInfo> {
        match &self.base_denom {
            Some(base_denom) => self.find_denom_by_name(base_denom),
            None => self.denoms.first(),
        }
    }

    pub fn balances_url(&self, address: &str) -> String {
        format!(
            "{}/cosmos/bank/v1beta1/balances/{}",
            self.lcd_endpoint.trim_end_matches('/'),
            address
        )
    }
}

impl DenomInfo {
    pub fn validate(&self) -> Result<(), String> {
        if self.denom.is_empty() {
            return Err(String::from("empty denom"));
        }

        match self.denom_exponent {
            Some(exponent) => {
                if 10u64.checked_pow(exponent).is_none() {
                    return Err(format!("denom exponent {} is too big", exponent));
                }
            },
            None => {
                if self.denom_coefficient == 0 {
                    return Err(String::from("denom coefficient is zero"));
                }
            },
        }

        Ok(())
    }

    pub fn get_name(&self) -> &str {
        match self.display_denom.as_deref() {
            Some(display) if !display.is_empty() => display,
            _ => &self.denom,
        }
    }

    pub fn coefficient(&self) -> u64 {
        match self.denom_exponent {
            Some(exponent) => 10u64
                .checked_pow(exponent)
                .unwrap_or(DEFAULT_DENOM_COEFFICIENT),
            None => self.denom_coefficient,
        }
    }

    pub fn coingecko_currency(&self) -> Option<&str> {
        self.coingecko_currency
            .as_deref()
            .filter(|currency| !currency.is_empty())
    }
}

impl Wallet {
    pub fn validate(&self) -> Result<(), String> {
        if self.address.is_empty() {
            return Err(String::from("address for wallet is not specified"));
        }

        Ok(())
    }
}

fn default_listen_address() -> String {
    String::from(DEFAULT_LISTEN_ADDRESS)
}

fn default_price_api() -> String {
    String::from(DEFAULT_PRICE_API)
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_denom_coefficient() -> u64 {
    DEFAULT_DENOM_COEFFICIENT
}

pub fn parse_configuration(config: &str) -> Result<Config, Error> {
    let config: Config = toml::from_str(config)?;
    Ok(config)
}

pub fn get_configuration<P: AsRef<Path>>(path: P) -> Result<Config, Error> {
    let config_string = fs::read_to_string(path)?;
    let config = parse_configuration(&config_string)?;
    config.validate()?;

    Ok(config)
}
