use std::time::Duration;

use crate::configuration::Wallet;

use super::QueryInfo;

/// A balance scaled to display units.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedBalance {
    pub denom: String,
    pub amount: f64,
}

#[derive(Debug, Clone)]
pub struct WalletBalanceEntry {
    pub chain: String,
    pub wallet: Wallet,
    pub success: bool,
    pub duration: Duration,
    pub query: Option<QueryInfo>,
    pub balances: Vec<ConvertedBalance>,
    pub usd_value: Option<f64>,
}

impl WalletBalanceEntry {
    pub fn new(chain: &str, wallet: &Wallet) -> Self {
        WalletBalanceEntry {
            chain: chain.to_owned(),
            wallet: wallet.clone(),
            success: false,
            duration: Duration::ZERO,
            query: None,
            balances: vec![],
            usd_value: None,
        }
    }
}
