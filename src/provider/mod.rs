pub use self::{
    coingecko::{Coingecko, COINGECKO_CHAIN},
    http::{Fetched, HTTP},
    lcd::LCD,
};

mod coingecko;
pub mod http;
mod lcd;
