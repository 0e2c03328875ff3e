use anyhow::Result;

use super::client::LedgerClient;

/// Name-to-id map with load-bearing insertion order: prefix resolution scans
/// entries in the order the API returned them and the first overlap wins.
#[derive(Debug, Default)]
pub struct NameMap {
    entries: Vec<MapEntry>,
}

#[derive(Debug)]
struct MapEntry {
    name: String,
    id: String,
}

impl NameMap {
    pub fn insert(&mut self, name: &str, id: &str) {
        // An empty name would prefix-match every lookup.
        if name.is_empty() || id.is_empty() {
            return;
        }
        self.entries.push(MapEntry {
            name: name.to_string(),
            id: id.to_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), entry.id.as_str()))
    }

    /// Exact match first; otherwise the first entry (in insertion order)
    /// where either name is a prefix of the other. Catalog names commonly
    /// extend the short codes humans type, e.g. "0-115-0" against
    /// "0-115-0 INVENTORY - PARTS".
    pub fn resolve(&self, label: &str) -> Option<&str> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        if let Some(entry) = self.entries.iter().find(|entry| entry.name == label) {
            return Some(&entry.id);
        }
        self.entries
            .iter()
            .find(|entry| entry.name.starts_with(label) || label.starts_with(&entry.name))
            .map(|entry| entry.id.as_str())
    }
}

pub struct LedgerMaps {
    pub accounts: NameMap,
    pub vendors: NameMap,
}

/// Rebuilds both maps from the remote ledger. Runs to completion before any
/// submission starts; the maps are read-only afterwards.
pub async fn refresh_maps(client: &LedgerClient) -> Result<LedgerMaps> {
    log::info!("Requesting account and vendor maps...");
    let account_entities = client.query_entities("Account").await?;
    let vendor_entities = client.query_entities("Vendor").await?;

    let mut accounts = NameMap::default();
    for entity in &account_entities {
        // Fully qualified names keep sub-accounts unambiguous.
        let name = entity["FullyQualifiedName"]
            .as_str()
            .or_else(|| entity["Name"].as_str())
            .unwrap_or("");
        accounts.insert(name, entity["Id"].as_str().unwrap_or(""));
    }
    let mut vendors = NameMap::default();
    for entity in &vendor_entities {
        vendors.insert(
            entity["DisplayName"].as_str().unwrap_or(""),
            entity["Id"].as_str().unwrap_or(""),
        );
    }
    log::info!(
        "Requesting account and vendor maps...done ({} accounts, {} vendors)",
        accounts.len(),
        vendors.len()
    );
    Ok(LedgerMaps { accounts, vendors })
}
