use crate::interval::intersection_days;
use crate::period::ResolvedPeriod;
use crate::schema::{PropertyFilter, Snapshot, Transaction, TransactionType};
use crate::trend::{build_trend, TrendPoint};
use crate::utils::clean_amount;
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

/// Cleaned revenue, expense and profit over a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PeriodTotals {
    pub revenue: f64,
    pub expense: f64,
    pub profit: f64,
}

impl PeriodTotals {
    pub fn from_transactions<'t, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'t Transaction>,
    {
        let (revenue, expense) =
            transactions
                .into_iter()
                .fold((0.0, 0.0), |(rev, exp), t| match t.kind {
                    TransactionType::Revenue => (rev + t.amount, exp),
                    TransactionType::Expense => (rev, exp + t.amount),
                });

        let revenue = clean_amount(revenue);
        let expense = clean_amount(expense);
        Self {
            revenue,
            expense,
            profit: clean_amount(revenue - expense),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Occupancy {
    pub occupied_days: u64,
    pub potential_days: u64,
    /// Whole percent. Exceeds 100 when tenancies on one room overlap.
    pub rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub profit: f64,
    pub revenue: f64,
    pub expense: f64,
    pub occupancy: u32,
    pub chart: Vec<TrendPoint>,
}

pub struct Aggregator<'a> {
    snapshot: &'a Snapshot,
    filter: &'a PropertyFilter,
    today: NaiveDate,
}

impl<'a> Aggregator<'a> {
    pub fn new(snapshot: &'a Snapshot, filter: &'a PropertyFilter, today: NaiveDate) -> Self {
        Self {
            snapshot,
            filter,
            today,
        }
    }

    pub fn filter_transactions(&self, period: &ResolvedPeriod) -> Vec<&'a Transaction> {
        self.snapshot
            .transactions
            .iter()
            .filter(|t| self.filter.matches(t.linked_property()) && period.includes(t.date))
            .collect()
    }

    /// Filtered transactions, newest first.
    pub fn movements(&self, period: &ResolvedPeriod) -> Vec<Transaction> {
        let mut movements: Vec<Transaction> = self
            .filter_transactions(period)
            .into_iter()
            .cloned()
            .collect();
        movements.sort_by(|a, b| b.date.cmp(&a.date));
        movements
    }

    pub fn totals(&self, period: &ResolvedPeriod) -> PeriodTotals {
        PeriodTotals::from_transactions(self.filter_transactions(period))
    }

    /// Tenant-occupied days over room-days available in the period.
    ///
    /// Every tenant ever assigned to a room contributes its own overlap, so
    /// overlapping tenancies are counted twice.
    pub fn occupancy(&self, period: &ResolvedPeriod) -> Occupancy {
        let rooms: Vec<_> = self
            .snapshot
            .rooms
            .iter()
            .filter(|r| self.filter.matches(Some(r.property_id.as_str())))
            .collect();

        let potential_days = rooms.len() as u64 * period.days();

        let occupied_days: u64 = rooms
            .iter()
            .flat_map(|room| {
                self.snapshot
                    .tenants
                    .iter()
                    .filter(move |t| t.linked_room() == Some(room.id.as_str()))
            })
            .map(|tenant| {
                intersection_days(
                    period.start,
                    period.end,
                    tenant.entry_date,
                    tenant.occupancy_end(self.today),
                )
            })
            .sum();

        let rate = if potential_days > 0 {
            (100.0 * occupied_days as f64 / potential_days as f64).round() as u32
        } else {
            0
        };

        Occupancy {
            occupied_days,
            potential_days,
            rate,
        }
    }

    pub fn stats(&self, period: &ResolvedPeriod) -> DashboardStats {
        let filtered = self.filter_transactions(period);
        debug!(
            "{} of {} transactions fall in period '{}'",
            filtered.len(),
            self.snapshot.transactions.len(),
            period.label
        );

        let totals = PeriodTotals::from_transactions(filtered);
        let occupancy = self.occupancy(period);
        debug!(
            "Occupancy {} of {} room-days ({}%)",
            occupancy.occupied_days, occupancy.potential_days, occupancy.rate
        );

        DashboardStats {
            profit: totals.profit,
            revenue: totals.revenue,
            expense: totals.expense,
            occupancy: occupancy.rate,
            chart: build_trend(&self.snapshot.transactions, self.filter, self.today),
        }
    }
}

pub fn compute_dashboard_stats(
    snapshot: &Snapshot,
    filter: &PropertyFilter,
    period: &ResolvedPeriod,
    today: NaiveDate,
) -> DashboardStats {
    Aggregator::new(snapshot, filter, today).stats(period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::{resolve_period, PeriodMode};
    use crate::schema::{Property, PropertyKind, Room, Tenant};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn property(id: &str) -> Property {
        Property {
            id: id.to_string(),
            name: format!("Imóvel {}", id),
            kind: PropertyKind::Casa,
            address: String::new(),
            description: None,
        }
    }

    fn room(id: &str, property_id: &str, price: f64) -> Room {
        Room {
            id: id.to_string(),
            property_id: property_id.to_string(),
            number: id.to_uppercase(),
            area: 10.0,
            description: String::new(),
            is_occupied: false,
            tenant_id: None,
            price,
        }
    }

    fn tenant(id: &str, room_id: &str, entry: NaiveDate, exit: Option<NaiveDate>) -> Tenant {
        Tenant {
            id: id.to_string(),
            name: format!("Inquilino {}", id),
            nickname: None,
            cpf: String::new(),
            profession: String::new(),
            whatsapp: None,
            phone: None,
            email: None,
            entry_date: entry,
            exit_date: exit,
            due_day: 10,
            room_id: Some(room_id.to_string()),
            description: None,
        }
    }

    fn transaction(
        id: &str,
        kind: TransactionType,
        amount: f64,
        on: NaiveDate,
        property_id: Option<&str>,
    ) -> Transaction {
        Transaction {
            id: id.to_string(),
            description: id.to_string(),
            amount,
            date: on,
            kind,
            category: "Outros".to_string(),
            property_id: property_id.map(str::to_string),
            tenant_id: None,
            room_id: None,
            supplier_id: None,
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            properties: vec![property("p1"), property("p2")],
            rooms: vec![room("r1", "p1", 700.0), room("r2", "p1", 850.0), room("r3", "p2", 900.0)],
            tenants: vec![
                tenant("t1", "r1", date(2024, 1, 15), None),
                tenant("t2", "r3", date(2026, 10, 11), None),
            ],
            transactions: vec![
                transaction("a", TransactionType::Revenue, 700.0, date(2026, 10, 8), Some("p1")),
                transaction("b", TransactionType::Revenue, 900.1, date(2026, 10, 16), Some("p2")),
                transaction("c", TransactionType::Expense, 99.9, date(2026, 10, 10), Some("p1")),
                transaction("d", TransactionType::Revenue, 850.0, date(2026, 10, 20), Some("p1")),
                transaction("e", TransactionType::Expense, 470.33, date(2026, 9, 18), Some("p1")),
                transaction("f", TransactionType::Revenue, 700.0, date(2026, 9, 8), None),
            ],
            suppliers: vec![],
        }
    }

    #[test]
    fn test_current_period_excludes_future_days() {
        let snapshot = snapshot();
        let today = date(2026, 10, 16);
        let period = resolve_period(PeriodMode::Current, today);
        let aggregator = Aggregator::new(&snapshot, &PropertyFilter::All, today);

        let totals = aggregator.totals(&period);
        assert_eq!(totals.revenue, 1600.1);
        assert_eq!(totals.expense, 99.9);
        assert_eq!(totals.profit, 1500.2);
    }

    #[test]
    fn test_last_period_and_property_filter() {
        let snapshot = snapshot();
        let today = date(2026, 10, 16);
        let period = resolve_period(PeriodMode::Last, today);

        let all = Aggregator::new(&snapshot, &PropertyFilter::All, today).totals(&period);
        assert_eq!(all.revenue, 700.0);
        assert_eq!(all.expense, 470.33);
        assert_eq!(all.profit, 229.67);

        let p1 = PropertyFilter::from("p1");
        let filtered = Aggregator::new(&snapshot, &p1, today).totals(&period);
        assert_eq!(filtered.revenue, 0.0);
        assert_eq!(filtered.profit, -470.33);
    }

    #[test]
    fn test_profit_identity_for_every_mode() {
        let snapshot = snapshot();
        let today = date(2026, 10, 16);
        for mode in [PeriodMode::All, PeriodMode::Current, PeriodMode::Last] {
            let period = resolve_period(mode, today);
            let stats = compute_dashboard_stats(&snapshot, &PropertyFilter::All, &period, today);
            assert_eq!(stats.profit, clean_amount(stats.revenue - stats.expense));
        }
    }

    #[test]
    fn test_occupancy_current_month() {
        let snapshot = snapshot();
        let today = date(2026, 10, 16);
        let period = resolve_period(PeriodMode::Current, today);
        let occupancy = Aggregator::new(&snapshot, &PropertyFilter::All, today).occupancy(&period);

        // 3 rooms x 16 days; t1 covers all 16, t2 covers 11..=16.
        assert_eq!(occupancy.potential_days, 48);
        assert_eq!(occupancy.occupied_days, 22);
        assert_eq!(occupancy.rate, 46);
    }

    #[test]
    fn test_occupancy_without_rooms_is_zero() {
        let snapshot = Snapshot::default();
        let today = date(2026, 10, 16);
        let period = resolve_period(PeriodMode::Current, today);
        let occupancy = Aggregator::new(&snapshot, &PropertyFilter::All, today).occupancy(&period);
        assert_eq!(occupancy.rate, 0);
        assert_eq!(occupancy.potential_days, 0);
    }

    #[test]
    fn test_overlapping_tenancies_exceed_full_occupancy() {
        let mut snapshot = snapshot();
        snapshot.rooms.truncate(1);
        snapshot
            .tenants
            .push(tenant("t3", "r1", date(2025, 6, 1), Some(date(2026, 12, 31))));

        let today = date(2026, 10, 16);
        let period = resolve_period(PeriodMode::Last, today);
        let occupancy = Aggregator::new(&snapshot, &PropertyFilter::All, today).occupancy(&period);

        assert_eq!(occupancy.potential_days, 30);
        assert_eq!(occupancy.occupied_days, 60);
        assert_eq!(occupancy.rate, 200);
    }

    #[test]
    fn test_movements_newest_first() {
        let snapshot = snapshot();
        let today = date(2026, 10, 16);
        let period = resolve_period(PeriodMode::All, today);
        let movements = Aggregator::new(&snapshot, &PropertyFilter::All, today).movements(&period);

        assert_eq!(movements.len(), 6);
        assert_eq!(movements[0].id, "d");
        assert_eq!(movements[5].id, "f");
        assert!(movements.windows(2).all(|w| w[0].date >= w[1].date));
    }
}
