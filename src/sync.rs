//! Pulls a full [`Snapshot`] from a Supabase-style REST backend.
//!
//! All five tables are fetched concurrently; the pull fails as a whole if any
//! single table cannot be fetched or decoded.

use crate::error::{RentalFinanceError, Result};
use crate::schema::Snapshot;
use log::{debug, info};
use reqwest::Client;
use serde::de::DeserializeOwned;

pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_VAR: &str = "SUPABASE_ANON_KEY";

/// Remote table names, in snapshot field order.
pub const REMOTE_TABLES: [&str; 5] = [
    "properties",
    "rooms",
    "tenants",
    "transactions",
    "suppliers",
];

#[derive(Clone)]
pub struct RemoteSource {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl RemoteSource {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    /// Reads the endpoint and key from `SUPABASE_URL` and `SUPABASE_ANON_KEY`.
    pub fn from_env() -> Result<Self> {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| RentalFinanceError::ValidationError {
                    entity: "remote source".to_string(),
                    details: format!("environment variable {} is not set", name),
                })
        };
        Ok(Self::new(read(SUPABASE_URL_VAR)?, read(SUPABASE_ANON_KEY_VAR)?))
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}?select=*", self.base_url, table)
    }

    async fn fetch_table<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>> {
        let response = self
            .client
            .get(self.table_url(table))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RentalFinanceError::RemoteTable {
                table: table.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let rows: Vec<T> = serde_json::from_slice(&bytes)?;
        debug!("Fetched {} rows from '{}'", rows.len(), table);
        Ok(rows)
    }

    pub async fn pull_snapshot(&self) -> Result<Snapshot> {
        let [properties, rooms, tenants, transactions, suppliers] = REMOTE_TABLES;

        let (properties, rooms, tenants, transactions, suppliers) = futures::try_join!(
            self.fetch_table(properties),
            self.fetch_table(rooms),
            self.fetch_table(tenants),
            self.fetch_table(transactions),
            self.fetch_table(suppliers),
        )?;

        let snapshot = Snapshot {
            properties,
            rooms,
            tenants,
            transactions,
            suppliers,
        };
        info!(
            "Pulled snapshot from {}: {} properties, {} rooms, {} tenants, {} transactions, {} suppliers",
            self.base_url,
            snapshot.properties.len(),
            snapshot.rooms.len(),
            snapshot.tenants.len(),
            snapshot.transactions.len(),
            snapshot.suppliers.len()
        );
        Ok(snapshot)
    }
}
