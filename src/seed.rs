//! Demo transaction history.
//!
//! Produces one rent payment per tenant per month since move-in and one bill
//! per scheduled supplier per month since a fixed start, all dated on the due
//! day and never after `today`. Variable-cost bills are perturbed by up to
//! ten percent either way using the caller's random source.

use crate::schema::{Snapshot, Supplier, Tenant, Transaction, TransactionType, RENT_CATEGORY};
use crate::utils::{clean_amount, first_name, YearMonth};
use chrono::NaiveDate;
use log::{debug, info};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Largest relative deviation applied to variable-cost bills.
pub const VARIABLE_COST_SPREAD: f64 = 0.1;

pub fn default_supplier_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN)
}

pub struct SeedGenerator {
    supplier_start: NaiveDate,
    variation: Uniform<f64>,
}

impl Default for SeedGenerator {
    fn default() -> Self {
        Self::new(default_supplier_start())
    }
}

impl SeedGenerator {
    pub fn new(supplier_start: NaiveDate) -> Self {
        Self {
            supplier_start,
            variation: Uniform::new_inclusive(-VARIABLE_COST_SPREAD, VARIABLE_COST_SPREAD),
        }
    }

    /// All generated transactions, newest first.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        snapshot: &Snapshot,
        today: NaiveDate,
        rng: &mut R,
    ) -> Vec<Transaction> {
        let mut generated: Vec<Transaction> = snapshot
            .tenants
            .iter()
            .flat_map(|tenant| self.rent_history(snapshot, tenant, today))
            .collect();
        let rent_count = generated.len();

        for supplier in &snapshot.suppliers {
            generated.extend(self.bill_history(supplier, today, rng));
        }

        debug!(
            "Seeded {} rent and {} bill transactions",
            rent_count,
            generated.len() - rent_count
        );

        generated.sort_by(|a, b| b.date.cmp(&a.date));
        info!(
            "Generated {} seed transactions up to {}",
            generated.len(),
            today
        );
        generated
    }

    fn rent_history(
        &self,
        snapshot: &Snapshot,
        tenant: &Tenant,
        today: NaiveDate,
    ) -> Vec<Transaction> {
        let Some(room) = snapshot.room_of(tenant) else {
            return Vec::new();
        };
        let property_id = snapshot
            .property(&room.property_id)
            .map(|p| p.id.clone());

        let start = tenant.entry_date;
        let end = tenant.exit_date.map_or(today, |exit| exit.min(today));

        let mut history = Vec::new();
        let mut month = YearMonth::of(start);
        while month.first_day() <= end {
            let due = month.due_date(tenant.due_day);
            if due >= start && due <= end {
                history.push(Transaction {
                    id: format!("gen-rent-{}-{}", tenant.id, due),
                    description: format!(
                        "{} - Aluguel {}",
                        first_name(&tenant.name),
                        month.label()
                    ),
                    amount: room.price,
                    date: due,
                    kind: TransactionType::Revenue,
                    category: RENT_CATEGORY.to_string(),
                    property_id: property_id.clone(),
                    tenant_id: Some(tenant.id.clone()),
                    room_id: Some(room.id.clone()),
                    supplier_id: None,
                });
            }
            month = month.next();
        }
        history
    }

    fn bill_history<R: Rng + ?Sized>(
        &self,
        supplier: &Supplier,
        today: NaiveDate,
        rng: &mut R,
    ) -> Vec<Transaction> {
        let Some((due_day, base_value)) = supplier.schedule() else {
            return Vec::new();
        };

        let mut history = Vec::new();
        let mut month = YearMonth::of(self.supplier_start);
        while month.first_day() <= today {
            let due = month.due_date(due_day);
            if due >= self.supplier_start && due <= today {
                let amount = if supplier.is_variable() {
                    base_value * (1.0 + self.variation.sample(rng))
                } else {
                    base_value
                };

                history.push(Transaction {
                    id: format!("gen-util-{}-{}", supplier.id, due),
                    description: format!("{} - {}", supplier.name, month.label()),
                    amount: clean_amount(amount),
                    date: due,
                    kind: TransactionType::Expense,
                    category: supplier.category.as_str().to_string(),
                    property_id: supplier.property_id.clone(),
                    tenant_id: None,
                    room_id: None,
                    supplier_id: Some(supplier.id.clone()),
                });
            }
            month = month.next();
        }
        history
    }
}
