use crate::error::{RentalFinanceError, Result};
use crate::schema::{Property, Room, Snapshot, Supplier, Tenant, Transaction};
use log::{info, warn};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Contents of a backup file. Every list is optional; a restore only replaces
/// the lists the file actually carries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotPatch {
    pub properties: Option<Vec<Property>>,
    pub rooms: Option<Vec<Room>>,
    pub tenants: Option<Vec<Tenant>>,
    pub transactions: Option<Vec<Transaction>>,
    pub suppliers: Option<Vec<Supplier>>,
}

impl SnapshotPatch {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns `base` with every present list replaced.
    pub fn apply(self, base: &Snapshot) -> Snapshot {
        Snapshot {
            properties: self.properties.unwrap_or_else(|| base.properties.clone()),
            rooms: self.rooms.unwrap_or_else(|| base.rooms.clone()),
            tenants: self.tenants.unwrap_or_else(|| base.tenants.clone()),
            transactions: self
                .transactions
                .unwrap_or_else(|| base.transactions.clone()),
            suppliers: self.suppliers.unwrap_or_else(|| base.suppliers.clone()),
        }
    }
}

fn invalid(entity: impl Into<String>, details: impl Into<String>) -> RentalFinanceError {
    RentalFinanceError::ValidationError {
        entity: entity.into(),
        details: details.into(),
    }
}

fn ensure_unique<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(invalid(format!("{} {}", kind, id), "duplicate id"));
        }
    }
    Ok(())
}

impl Snapshot {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Restores a backup on top of this snapshot. Lists missing from the file
    /// are kept; the result is validated before it is returned.
    pub fn restore(&self, json: &str) -> Result<Snapshot> {
        let restored = SnapshotPatch::from_json(json)?.apply(self);
        restored.validate()?;
        info!(
            "Restored backup: {} properties, {} rooms, {} tenants, {} transactions, {} suppliers",
            restored.properties.len(),
            restored.rooms.len(),
            restored.tenants.len(),
            restored.transactions.len(),
            restored.suppliers.len()
        );
        Ok(restored)
    }

    pub fn save_backup(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    pub fn load_backup(&self, path: impl AsRef<Path>) -> Result<Snapshot> {
        let json = std::fs::read_to_string(path)?;
        self.restore(&json)
    }

    /// Checks the record invariants the dashboards rely on.
    ///
    /// Transaction foreign keys are not checked: dangling links are tolerated
    /// and simply match nothing.
    pub fn validate(&self) -> Result<()> {
        ensure_unique("property", self.properties.iter().map(|p| p.id.as_str()))?;
        ensure_unique("room", self.rooms.iter().map(|r| r.id.as_str()))?;
        ensure_unique("tenant", self.tenants.iter().map(|t| t.id.as_str()))?;
        ensure_unique("supplier", self.suppliers.iter().map(|s| s.id.as_str()))?;
        ensure_unique(
            "transaction",
            self.transactions.iter().map(|t| t.id.as_str()),
        )?;

        for room in &self.rooms {
            if self.property(&room.property_id).is_none() {
                return Err(invalid(
                    format!("room {}", room.id),
                    format!("references unknown property '{}'", room.property_id),
                ));
            }
            if room.price.is_nan() || room.price < 0.0 {
                return Err(invalid(
                    format!("room {}", room.id),
                    format!("price {} must not be negative", room.price),
                ));
            }
        }

        for tenant in &self.tenants {
            if !(1..=31).contains(&tenant.due_day) {
                return Err(invalid(
                    format!("tenant {}", tenant.id),
                    format!("due day {} must be between 1 and 31", tenant.due_day),
                ));
            }
            if let Some(exit) = tenant.exit_date {
                if exit < tenant.entry_date {
                    return Err(invalid(
                        format!("tenant {}", tenant.id),
                        format!("exit date {} before entry date {}", exit, tenant.entry_date),
                    ));
                }
            }
            if let Some(room_id) = tenant.linked_room() {
                if self.room(room_id).is_none() {
                    warn!("Tenant {} is assigned to unknown room {}", tenant.id, room_id);
                }
            }
        }

        for supplier in &self.suppliers {
            if let Some(due_day) = supplier.due_day {
                if due_day > 31 {
                    return Err(invalid(
                        format!("supplier {}", supplier.id),
                        format!("due day {} must be between 1 and 31", due_day),
                    ));
                }
            }
        }

        for transaction in &self.transactions {
            if transaction.amount.is_nan() || transaction.amount < 0.0 {
                return Err(invalid(
                    format!("transaction {}", transaction.id),
                    format!("amount {} must not be negative", transaction.amount),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PropertyKind;

    fn base() -> Snapshot {
        Snapshot::from_json(
            r#"{
                "properties": [{"id": "p1", "name": "Casa", "type": "Casa", "address": "Rua A"}],
                "rooms": [{"id": "r1", "propertyId": "p1", "number": "C1", "price": 700}],
                "tenants": [{"id": "t1", "name": "Lia", "entryDate": "2024-01-15", "dueDay": 8, "roomId": "r1"}],
                "transactions": [],
                "suppliers": []
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_backup_round_trip() {
        let snapshot = base();
        let json = snapshot.to_json_pretty().unwrap();
        assert!(json.contains("\"propertyId\": \"p1\""));
        assert_eq!(Snapshot::from_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn test_restore_replaces_only_present_lists() {
        let snapshot = base();
        let restored = snapshot
            .restore(
                r#"{"properties": [
                    {"id": "p1", "name": "Casa", "type": "Casa", "address": "Rua A"},
                    {"id": "p2", "name": "Apto", "type": "Apartamento", "address": "Rua B"}
                ]}"#,
            )
            .unwrap();

        assert_eq!(restored.properties.len(), 2);
        assert_eq!(restored.properties[1].kind, PropertyKind::Apartamento);
        assert_eq!(restored.rooms, snapshot.rooms);
        assert_eq!(restored.tenants, snapshot.tenants);
    }

    #[test]
    fn test_restore_rejects_malformed_json() {
        let result = base().restore("{\"rooms\": [");
        assert!(matches!(
            result,
            Err(RentalFinanceError::SerializationError(_))
        ));
    }

    #[test]
    fn test_restore_rejects_room_without_property() {
        let result = base().restore(r#"{"properties": []}"#);
        assert!(matches!(
            result,
            Err(RentalFinanceError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_invariants() {
        let mut snapshot = base();
        assert!(snapshot.validate().is_ok());

        snapshot.tenants[0].exit_date = chrono::NaiveDate::from_ymd_opt(2023, 1, 1);
        assert!(snapshot.validate().is_err());

        let mut snapshot = base();
        snapshot.tenants[0].due_day = 32;
        assert!(snapshot.validate().is_err());

        let mut snapshot = base();
        snapshot.rooms[0].price = -1.0;
        assert!(snapshot.validate().is_err());

        let mut snapshot = base();
        let duplicate = snapshot.rooms[0].clone();
        snapshot.rooms.push(duplicate);
        let err = snapshot.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate id"));
    }

    #[test]
    fn test_save_and_load_backup_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        let snapshot = base();
        snapshot.save_backup(&path).unwrap();

        let loaded = Snapshot::default().load_backup(&path).unwrap();
        assert_eq!(loaded, snapshot);
    }
}
