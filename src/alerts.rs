//! Overdue obligations for the current month.
//!
//! A tenant is overdue once today's day-of-month passes their due day with no
//! rent recorded this month. Suppliers follow the same rule against expenses,
//! but only rent counts towards the pending total.

use crate::schema::{PropertyFilter, Snapshot};
use crate::utils::{clean_amount, YearMonth};
use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Rent,
    Expense,
}

/// Record an alert or forecast entry refers back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entity", rename_all = "lowercase")]
pub enum LinkedEntity {
    Tenant { tenant_id: String, room_id: String },
    Supplier { supplier_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: String,
    pub kind: AlertKind,
    pub title: String,
    pub subtitle: String,
    pub amount: f64,
    pub due_day: u32,
    pub linked: LinkedEntity,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AlertReport {
    pub alerts: Vec<Alert>,
    /// Sum of overdue rent. Supplier bills are not included.
    pub pending_total: f64,
}

pub fn detect_overdue(
    snapshot: &Snapshot,
    filter: &PropertyFilter,
    today: NaiveDate,
) -> AlertReport {
    let month = YearMonth::of(today);
    let day = today.day();
    let mut report = AlertReport::default();

    for tenant in snapshot.tenants.iter().filter(|t| t.is_active()) {
        let Some(room) = snapshot.room_of(tenant) else {
            continue;
        };
        if !filter.matches(Some(room.property_id.as_str())) {
            continue;
        }

        let paid = snapshot
            .transactions
            .iter()
            .any(|t| t.pays_tenant_in(&tenant.id, month));

        if !paid && day > tenant.due_day {
            report.alerts.push(Alert {
                id: format!("alert-rent-{}", tenant.id),
                kind: AlertKind::Rent,
                title: tenant.name.clone(),
                subtitle: format!("Aluguel • {}", room.number),
                amount: room.price,
                due_day: tenant.due_day,
                linked: LinkedEntity::Tenant {
                    tenant_id: tenant.id.clone(),
                    room_id: room.id.clone(),
                },
            });
            report.pending_total = clean_amount(report.pending_total + room.price);
        }
    }

    for supplier in &snapshot.suppliers {
        let Some(due_day) = supplier.scheduled_due_day() else {
            continue;
        };
        if !filter.admits_unattached(supplier.linked_property()) {
            continue;
        }

        let paid = snapshot
            .transactions
            .iter()
            .any(|t| t.pays_supplier_in(&supplier.id, month));

        if !paid && day > due_day {
            report.alerts.push(Alert {
                id: format!("alert-exp-{}", supplier.id),
                kind: AlertKind::Expense,
                title: supplier.name.clone(),
                subtitle: supplier.subtitle().to_string(),
                amount: supplier.expected_amount(),
                due_day,
                linked: LinkedEntity::Supplier {
                    supplier_id: supplier.id.clone(),
                },
            });
        }
    }

    debug!(
        "{} overdue alerts in {}, pending rent {:.2}",
        report.alerts.len(),
        month,
        report.pending_total
    );

    report
}
