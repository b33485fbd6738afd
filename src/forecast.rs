use crate::alerts::LinkedEntity;
use crate::predictor::TransactionDraft;
use crate::schema::{PropertyFilter, Snapshot, TransactionType, RENT_CATEGORY};
use crate::utils::first_name;
use chrono::{Datelike, Days, NaiveDate};
use log::debug;
use serde::Serialize;

/// Days scanned by the forecast, today included.
pub const DEFAULT_FORECAST_WINDOW_DAYS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastItem {
    pub kind: TransactionType,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub category: String,
    pub property_id: Option<String>,
    pub linked: LinkedEntity,
}

impl ForecastItem {
    /// Prefill for recording this expected payment.
    pub fn to_draft(&self) -> TransactionDraft {
        let (tenant_id, room_id, supplier_id) = match &self.linked {
            LinkedEntity::Tenant { tenant_id, room_id } => {
                (Some(tenant_id.clone()), Some(room_id.clone()), None)
            }
            LinkedEntity::Supplier { supplier_id } => (None, None, Some(supplier_id.clone())),
        };

        TransactionDraft {
            kind: self.kind,
            description: self.description.clone(),
            amount: Some(self.amount),
            date: self.date,
            category: self.category.clone(),
            property_id: self.property_id.clone(),
            tenant_id,
            room_id,
            supplier_id,
        }
    }
}

/// Rent and bills falling due in the next `window_days` days that have no
/// transaction recorded on that exact date yet.
pub fn build_forecast(
    snapshot: &Snapshot,
    filter: &PropertyFilter,
    today: NaiveDate,
    window_days: u32,
) -> Vec<ForecastItem> {
    let mut upcoming = Vec::new();

    for offset in 0..window_days {
        let Some(target) = today.checked_add_days(Days::new(offset as u64)) else {
            break;
        };
        let day = target.day();

        for tenant in snapshot
            .tenants
            .iter()
            .filter(|t| t.is_active() && t.due_day == day)
        {
            let Some(room) = snapshot.room_of(tenant) else {
                continue;
            };
            if !filter.matches(Some(room.property_id.as_str())) {
                continue;
            }

            let recorded = snapshot
                .transactions
                .iter()
                .any(|t| t.linked_tenant() == Some(tenant.id.as_str()) && t.date == target);
            if recorded {
                continue;
            }

            upcoming.push(ForecastItem {
                kind: TransactionType::Revenue,
                description: format!("Aluguel {}", first_name(&tenant.name)),
                amount: room.price,
                date: target,
                category: RENT_CATEGORY.to_string(),
                property_id: Some(room.property_id.clone()),
                linked: LinkedEntity::Tenant {
                    tenant_id: tenant.id.clone(),
                    room_id: room.id.clone(),
                },
            });
        }

        for supplier in snapshot
            .suppliers
            .iter()
            .filter(|s| s.scheduled_due_day() == Some(day))
        {
            if !filter.admits_unattached(supplier.linked_property()) {
                continue;
            }

            let recorded = snapshot
                .transactions
                .iter()
                .any(|t| t.linked_supplier() == Some(supplier.id.as_str()) && t.date == target);
            if recorded {
                continue;
            }

            upcoming.push(ForecastItem {
                kind: TransactionType::Expense,
                description: supplier.name.clone(),
                amount: supplier.expected_amount(),
                date: target,
                category: supplier.category.as_str().to_string(),
                property_id: supplier.linked_property().map(str::to_string),
                linked: LinkedEntity::Supplier {
                    supplier_id: supplier.id.clone(),
                },
            });
        }
    }

    upcoming.sort_by_key(|item| item.date);
    debug!(
        "{} payments expected between {} and the next {} days",
        upcoming.len(),
        today,
        window_days
    );
    upcoming
}
