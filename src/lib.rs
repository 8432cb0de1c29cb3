#![allow(non_camel_case_types)]

pub mod cli;
pub mod collector;
pub mod configuration;
pub mod controller;
pub mod error;
pub mod futures_set;
pub mod ledger;
pub mod manager;
pub mod provider;
pub mod querier;
pub mod server;
pub mod types;
