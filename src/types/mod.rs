pub use self::{
    balance::{Balance, BalanceResponse},
    coin_gecko_price::CoinGeckoPrice,
    query_info::QueryInfo,
    wallet_balance_entry::{ConvertedBalance, WalletBalanceEntry},
};

mod balance;
mod coin_gecko_price;
mod query_info;
mod wallet_balance_entry;
