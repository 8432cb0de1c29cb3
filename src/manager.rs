use std::{collections::HashMap, str::FromStr, sync::Arc, time::Instant};

use bigdecimal::{BigDecimal, ToPrimitive};
use tracing::{debug, error, info_span, Span};

use crate::{
    configuration::{Chain, Config, Wallet},
    error::Error,
    futures_set::join_all_indexed,
    provider::{Coingecko, LCD},
    types::{Balance, ConvertedBalance, QueryInfo, WalletBalanceEntry},
};

/// USD prices of one cycle, keyed by price-feed id.
#[derive(Debug, Clone, Default)]
pub struct PriceSnapshot {
    pub prices: HashMap<String, f64>,
    pub query: Option<QueryInfo>,
}

/// Fans balance queries out over every configured (chain, wallet) pair.
#[derive(Debug)]
pub struct Manager {
    pub config: Arc<Config>,
    pub lcds: Vec<Arc<LCD>>,
    pub coingecko: Coingecko,
    span: Span,
}

impl Manager {
    pub fn new(config: Arc<Config>, parent: &Span) -> Result<Manager, Error> {
        let span = info_span!(parent: parent, "manager");
        let mut lcds = Vec::with_capacity(config.chains.len());

        for chain in &config.chains {
            let lcd = LCD::new(Arc::new(chain.clone()), &span)?;
            lcds.push(Arc::new(lcd));
        }

        let coingecko = Coingecko::new(&config.price_api, &span)?;

        Ok(Manager {
            config,
            lcds,
            coingecko,
            span,
        })
    }

    pub async fn fetch_prices(&self) -> PriceSnapshot {
        let currencies = self.config.get_coingecko_currencies();
        let (prices, query) = self.coingecko.fetch_prices(&currencies).await;

        PriceSnapshot { prices, query }
    }

    /// Queries every wallet in parallel, one task per wallet.
    ///
    /// Returns one entry per wallet in configuration order, failed or not.
    /// A task that panicked yields a failed entry for its wallet.
    pub async fn get_all_balances(
        &self,
        prices: &HashMap<String, f64>,
    ) -> Vec<WalletBalanceEntry> {
        let prices = Arc::new(prices.clone());
        let mut tasks = Vec::with_capacity(self.config.wallets_count());
        let mut targets = Vec::with_capacity(self.config.wallets_count());

        for lcd in &self.lcds {
            for wallet in &lcd.chain.wallets {
                targets.push((lcd.chain.clone(), wallet.clone()));

                let lcd = lcd.clone();
                let wallet = wallet.clone();
                let prices = prices.clone();
                let span = self.span.clone();

                tasks.push(async move {
                    get_wallet_balance(&lcd, &wallet, &prices, &span).await
                });
            }
        }

        debug!(parent: &self.span, "Querying {} wallets", tasks.len());

        let slots = join_all_indexed(tasks).await;

        fill_failed_slots(slots, targets, &self.span)
    }
}

fn fill_failed_slots(
    slots: Vec<Option<WalletBalanceEntry>>,
    targets: Vec<(Arc<Chain>, Wallet)>,
    span: &Span,
) -> Vec<WalletBalanceEntry> {
    slots
        .into_iter()
        .zip(targets)
        .map(|(slot, (chain, wallet))| match slot {
            Some(entry) => entry,
            None => {
                error!(
                    parent: span,
                    "Balance task for chain={} wallet={} did not finish",
                    chain.name,
                    wallet.address
                );

                let mut entry = WalletBalanceEntry::new(&chain.name, &wallet);
                entry.query = Some(QueryInfo::new(
                    &chain.name,
                    &chain.balances_url(&wallet.address),
                ));
                entry
            },
        })
        .collect()
}

async fn get_wallet_balance(
    lcd: &LCD,
    wallet: &Wallet,
    prices: &HashMap<String, f64>,
    span: &Span,
) -> WalletBalanceEntry {
    let start = Instant::now();
    let chain = &lcd.chain;
    let mut entry = WalletBalanceEntry::new(&chain.name, wallet);

    let (query_info, result) = lcd.get_wallet_balances(&wallet.address).await;
    entry.query = Some(query_info);

    let converted = result.and_then(|response| {
        let balances = convert_balances(chain, &response.balances)?;
        let usd_value = get_usd_price(chain, &response.balances, prices)?;
        Ok((balances, usd_value))
    });

    match converted {
        Ok((balances, usd_value)) => {
            entry.success = true;
            entry.balances = balances;
            entry.usd_value = usd_value;
        },
        Err(e) => {
            error!(
                parent: span,
                "Error querying balance chain={} wallet={}: {}",
                chain.name,
                wallet.address,
                e
            );
        },
    }

    entry.duration = start.elapsed();
    entry
}

pub fn convert_balances(
    chain: &Chain,
    balances: &[Balance],
) -> Result<Vec<ConvertedBalance>, Error> {
    balances
        .iter()
        .map(|balance| convert_balance(chain, balance))
        .collect()
}

/// Scales a raw amount with the matching denom info, or keeps it raw when
/// the chain has none for this denom.
pub fn convert_balance(
    chain: &Chain,
    balance: &Balance,
) -> Result<ConvertedBalance, Error> {
    let amount = BigDecimal::from_str(&balance.amount)?;

    match chain.find_denom_by_name(&balance.denom) {
        Some(denom_info) => {
            let amount = amount / BigDecimal::from(denom_info.coefficient());

            Ok(ConvertedBalance {
                denom: denom_info.get_name().to_owned(),
                amount: to_f64(&amount)?,
            })
        },
        None => Ok(ConvertedBalance {
            denom: balance.denom.to_owned(),
            amount: to_f64(&amount)?,
        }),
    }
}

/// USD value of the wallet's base denom holdings. Other denoms are not
/// counted even if they have a price feed.
pub fn get_usd_price(
    chain: &Chain,
    balances: &[Balance],
    prices: &HashMap<String, f64>,
) -> Result<Option<f64>, Error> {
    let Some(base_denom) = chain.base_denom_info() else {
        return Ok(None);
    };

    let Some(price) = base_denom
        .coingecko_currency()
        .and_then(|currency| prices.get(currency))
    else {
        return Ok(None);
    };

    let coefficient = BigDecimal::from(base_denom.coefficient());
    let mut total = 0.0;

    for balance in balances.iter().filter(|b| b.denom == base_denom.denom) {
        let amount = BigDecimal::from_str(&balance.amount)? / coefficient.clone();
        total += to_f64(&amount)? * price;
    }

    Ok(Some(total))
}

fn to_f64(value: &BigDecimal) -> Result<f64, Error> {
    value
        .to_f64()
        .ok_or_else(|| Error::AmountError(value.to_string()))
}
