use crate::schema::{Snapshot, TransactionType, RENT_CATEGORY};
use crate::utils::{first_name, YearMonth};
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

/// A transaction waiting to be confirmed: everything but the id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionDraft {
    pub kind: TransactionType,
    pub description: String,
    pub amount: Option<f64>,
    pub date: NaiveDate,
    pub category: String,
    pub property_id: Option<String>,
    pub tenant_id: Option<String>,
    pub room_id: Option<String>,
    pub supplier_id: Option<String>,
}

impl TransactionDraft {
    /// Empty form dated today.
    pub fn blank(kind: TransactionType, today: NaiveDate) -> Self {
        Self {
            kind,
            description: String::new(),
            amount: None,
            date: today,
            category: kind.default_category().to_string(),
            property_id: None,
            tenant_id: None,
            room_id: None,
            supplier_id: None,
        }
    }
}

/// Month whose obligation is still open: this one, or the next once paid.
fn open_month(paid_this_month: bool, current: YearMonth) -> YearMonth {
    if paid_this_month {
        current.next()
    } else {
        current
    }
}

/// Most urgent unpaid obligation of the given kind, as a prefilled draft.
///
/// Revenue looks at active tenants with a room, expense at suppliers with
/// both a due day and a base value. The earliest due date wins, ties going to
/// the first record. Without candidates a blank draft dated today is returned.
pub fn predict_next_transaction(
    snapshot: &Snapshot,
    kind: TransactionType,
    today: NaiveDate,
) -> TransactionDraft {
    let current = YearMonth::of(today);

    let candidates: Vec<TransactionDraft> = match kind {
        TransactionType::Revenue => snapshot
            .tenants
            .iter()
            .filter(|t| t.is_active())
            .filter_map(|tenant| {
                let room = snapshot.room_of(tenant)?;
                let paid = snapshot
                    .transactions
                    .iter()
                    .any(|t| t.pays_tenant_in(&tenant.id, current));
                let target = open_month(paid, current);

                Some(TransactionDraft {
                    kind,
                    description: format!(
                        "Aluguel {} - {}",
                        first_name(&tenant.name),
                        target.label()
                    ),
                    amount: Some(room.price),
                    date: target.due_date(tenant.due_day),
                    category: RENT_CATEGORY.to_string(),
                    property_id: Some(room.property_id.clone()),
                    tenant_id: Some(tenant.id.clone()),
                    room_id: Some(room.id.clone()),
                    supplier_id: None,
                })
            })
            .collect(),
        TransactionType::Expense => snapshot
            .suppliers
            .iter()
            .filter_map(|supplier| {
                let (due_day, base_value) = supplier.schedule()?;
                let paid = snapshot
                    .transactions
                    .iter()
                    .any(|t| t.pays_supplier_in(&supplier.id, current));
                let target = open_month(paid, current);

                Some(TransactionDraft {
                    kind,
                    description: format!("{} - {}", supplier.name, target.label()),
                    amount: Some(base_value),
                    date: target.due_date(due_day),
                    category: supplier.category.as_str().to_string(),
                    property_id: supplier.linked_property().map(str::to_string),
                    tenant_id: None,
                    room_id: None,
                    supplier_id: Some(supplier.id.clone()),
                })
            })
            .collect(),
    };

    debug!("{} candidate {:?} obligations", candidates.len(), kind);

    candidates
        .into_iter()
        .min_by_key(|draft| draft.date)
        .unwrap_or_else(|| TransactionDraft::blank(kind, today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Room, Supplier, SupplierCategory, Tenant, Transaction};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn room(id: &str, price: f64) -> Room {
        Room {
            id: id.to_string(),
            property_id: "p1".to_string(),
            number: id.to_string(),
            area: 0.0,
            description: String::new(),
            is_occupied: true,
            tenant_id: None,
            price,
        }
    }

    fn tenant(id: &str, name: &str, room_id: &str, due_day: u32) -> Tenant {
        Tenant {
            id: id.to_string(),
            name: name.to_string(),
            nickname: None,
            cpf: String::new(),
            profession: String::new(),
            whatsapp: None,
            phone: None,
            email: None,
            entry_date: date(2024, 1, 1),
            exit_date: None,
            due_day,
            room_id: Some(room_id.to_string()),
            description: None,
        }
    }

    fn supplier(id: &str, due_day: Option<u32>, base_value: Option<f64>) -> Supplier {
        Supplier {
            id: id.to_string(),
            name: format!("Conta {}", id),
            category: SupplierCategory::Utilidade,
            specialty: String::new(),
            frequency: String::new(),
            due_day,
            base_value,
            cost_type: None,
            phone: String::new(),
            address: None,
            whatsapp: None,
            account_number: None,
            obs: None,
            property_id: Some(String::new()),
        }
    }

    fn rent(tenant_id: &str, on: NaiveDate) -> Transaction {
        Transaction {
            id: format!("rent-{}", on),
            description: String::new(),
            amount: 700.0,
            date: on,
            kind: TransactionType::Revenue,
            category: RENT_CATEGORY.to_string(),
            property_id: None,
            tenant_id: Some(tenant_id.to_string()),
            room_id: None,
            supplier_id: None,
        }
    }

    #[test]
    fn test_earliest_unpaid_tenant_wins() {
        let snapshot = Snapshot {
            rooms: vec![room("r1", 700.0), room("r2", 850.0)],
            tenants: vec![tenant("t1", "Lia Souza", "r1", 20), tenant("t2", "Julia", "r2", 8)],
            ..Default::default()
        };

        let draft =
            predict_next_transaction(&snapshot, TransactionType::Revenue, date(2026, 10, 16));
        assert_eq!(draft.tenant_id.as_deref(), Some("t2"));
        assert_eq!(draft.date, date(2026, 10, 8));
        assert_eq!(draft.amount, Some(850.0));
        assert_eq!(draft.description, "Aluguel Julia - Out/26");
        assert_eq!(draft.category, "Aluguel");
        assert_eq!(draft.property_id.as_deref(), Some("p1"));
    }

    #[test]
    fn test_paid_tenant_rolls_to_next_month() {
        let snapshot = Snapshot {
            rooms: vec![room("r1", 700.0), room("r2", 850.0)],
            tenants: vec![tenant("t1", "Lia", "r1", 20), tenant("t2", "Julia", "r2", 8)],
            transactions: vec![rent("t2", date(2026, 10, 8))],
            ..Default::default()
        };

        let draft =
            predict_next_transaction(&snapshot, TransactionType::Revenue, date(2026, 10, 16));
        assert_eq!(draft.tenant_id.as_deref(), Some("t1"));
        assert_eq!(draft.date, date(2026, 10, 20));

        let snapshot = Snapshot {
            tenants: vec![tenant("t2", "Julia", "r2", 8)],
            ..snapshot
        };
        let draft =
            predict_next_transaction(&snapshot, TransactionType::Revenue, date(2026, 10, 16));
        assert_eq!(draft.date, date(2026, 11, 8));
        assert_eq!(draft.description, "Aluguel Julia - Nov/26");
    }

    #[test]
    fn test_december_payment_rolls_into_next_year() {
        let snapshot = Snapshot {
            rooms: vec![room("r1", 700.0)],
            tenants: vec![tenant("t1", "Lia", "r1", 31)],
            transactions: vec![rent("t1", date(2026, 12, 2))],
            ..Default::default()
        };
        let draft =
            predict_next_transaction(&snapshot, TransactionType::Revenue, date(2026, 12, 10));
        assert_eq!(draft.date, date(2027, 1, 31));
    }

    #[test]
    fn test_due_day_clamped_in_short_month() {
        let snapshot = Snapshot {
            rooms: vec![room("r1", 700.0)],
            tenants: vec![tenant("t1", "Lia", "r1", 31)],
            ..Default::default()
        };
        let draft =
            predict_next_transaction(&snapshot, TransactionType::Revenue, date(2027, 2, 3));
        assert_eq!(draft.date, date(2027, 2, 28));
    }

    #[test]
    fn test_expense_requires_schedule() {
        let snapshot = Snapshot {
            suppliers: vec![
                supplier("s1", None, Some(50.0)),
                supplier("s2", Some(25), Some(114.89)),
                supplier("s3", Some(3), None),
            ],
            ..Default::default()
        };
        let draft =
            predict_next_transaction(&snapshot, TransactionType::Expense, date(2026, 10, 16));
        assert_eq!(draft.supplier_id.as_deref(), Some("s2"));
        assert_eq!(draft.amount, Some(114.89));
        assert_eq!(draft.date, date(2026, 10, 25));
        assert_eq!(draft.description, "Conta s2 - Out/26");
        assert_eq!(draft.category, "Utilidade");
        assert_eq!(draft.property_id, None);
    }

    #[test]
    fn test_fallback_without_candidates() {
        let today = date(2026, 10, 16);
        let snapshot = Snapshot::default();

        let revenue = predict_next_transaction(&snapshot, TransactionType::Revenue, today);
        assert_eq!(revenue, TransactionDraft::blank(TransactionType::Revenue, today));
        assert_eq!(revenue.category, "Aluguel");

        let expense = predict_next_transaction(&snapshot, TransactionType::Expense, today);
        assert_eq!(expense.date, today);
        assert_eq!(expense.category, "Utilidade");
        assert_eq!(expense.amount, None);
    }

    #[test]
    fn test_ties_keep_first_tenant() {
        let snapshot = Snapshot {
            rooms: vec![room("r1", 700.0), room("r2", 850.0)],
            tenants: vec![tenant("t1", "A", "r1", 5), tenant("t2", "B", "r2", 5)],
            ..Default::default()
        };
        let draft =
            predict_next_transaction(&snapshot, TransactionType::Revenue, date(2026, 10, 16));
        assert_eq!(draft.tenant_id.as_deref(), Some("t1"));
    }
}
