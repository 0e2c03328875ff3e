pub mod args;
pub mod cli;
pub mod config;
pub mod convert;
pub mod ledger;
pub mod money;
pub mod sync;
pub mod terminal;
