mod client;
mod maps;
mod payload;
mod submit;

pub use client::LedgerClient;
pub use maps::{refresh_maps, LedgerMaps, NameMap};
pub use submit::{submit, SyncOutcome};
