use std::collections::HashMap;

pub type CoinGeckoPrice = HashMap<String, HashMap<String, f64>>;
