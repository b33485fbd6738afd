use crate::utils::YearMonth;
use chrono::NaiveDate;
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Category used for rent transactions and forecasts.
pub const RENT_CATEGORY: &str = "Aluguel";

/// Treats a missing or empty-string id as absent.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

mod optional_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer};

    /// Accepts `null`, a missing field or `""` as "no date".
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Revenue,
    Expense,
}

impl TransactionType {
    /// Category a blank entry form starts with.
    pub fn default_category(&self) -> &'static str {
        match self {
            TransactionType::Revenue => RENT_CATEGORY,
            TransactionType::Expense => SupplierCategory::Utilidade.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum PropertyKind {
    Casa,
    Apartamento,
    Kitnet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum SupplierCategory {
    #[schemars(description = "Recurring utility or tax bill (water, power, internet, property tax)")]
    Utilidade,

    #[schemars(description = "Professional hired on demand (plumber, electrician, carpenter)")]
    Profissional,
}

impl SupplierCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplierCategory::Utilidade => "Utilidade",
            SupplierCategory::Profissional => "Profissional",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CostType {
    Fixed,
    Variable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub address: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub property_id: String,
    pub number: String,
    #[serde(default)]
    pub area: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_occupied: bool,
    pub tenant_id: Option<String>,
    #[schemars(description = "Monthly rent charged for the room")]
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub nickname: Option<String>,
    #[serde(default)]
    pub cpf: String,
    #[serde(default)]
    pub profession: String,
    pub whatsapp: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub entry_date: NaiveDate,
    #[serde(default, deserialize_with = "optional_date::deserialize")]
    #[schemars(description = "Absent while the tenant still lives in the room")]
    pub exit_date: Option<NaiveDate>,
    #[schemars(description = "Day of month (1-31) the rent is due")]
    pub due_day: u32,
    pub room_id: Option<String>,
    pub description: Option<String>,
}

impl Tenant {
    pub fn is_active(&self) -> bool {
        self.exit_date.is_none()
    }

    pub fn linked_room(&self) -> Option<&str> {
        non_empty(&self.room_id)
    }

    /// Last day the tenant occupies the room, `today` while still active.
    pub fn occupancy_end(&self, today: NaiveDate) -> NaiveDate {
        self.exit_date.unwrap_or(today)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub category: SupplierCategory,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub frequency: String,
    #[schemars(description = "Day of month the bill is due. Absent for on-demand suppliers")]
    pub due_day: Option<u32>,
    #[schemars(description = "Expected monthly amount. Absent for on-demand suppliers")]
    pub base_value: Option<f64>,
    pub cost_type: Option<CostType>,
    #[serde(default)]
    pub phone: String,
    pub address: Option<String>,
    pub whatsapp: Option<String>,
    pub account_number: Option<String>,
    pub obs: Option<String>,
    pub property_id: Option<String>,
}

impl Supplier {
    /// Due day of a billed supplier. Zero counts as unset.
    pub fn scheduled_due_day(&self) -> Option<u32> {
        self.due_day.filter(|day| *day > 0)
    }

    /// Due day and amount of a supplier that produces monthly obligations.
    pub fn schedule(&self) -> Option<(u32, f64)> {
        let due_day = self.scheduled_due_day()?;
        let base_value = self.base_value.filter(|value| *value != 0.0)?;
        Some((due_day, base_value))
    }

    pub fn expected_amount(&self) -> f64 {
        self.base_value.unwrap_or(0.0)
    }

    pub fn is_variable(&self) -> bool {
        self.cost_type == Some(CostType::Variable)
    }

    pub fn linked_property(&self) -> Option<&str> {
        non_empty(&self.property_id)
    }

    /// Specialty when set, category otherwise.
    pub fn subtitle(&self) -> &str {
        if self.specialty.is_empty() {
            self.category.as_str()
        } else {
            &self.specialty
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub description: String,
    #[schemars(description = "Always positive. The sign is implied by the type")]
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub property_id: Option<String>,
    pub tenant_id: Option<String>,
    pub room_id: Option<String>,
    pub supplier_id: Option<String>,
}

impl Transaction {
    pub fn linked_property(&self) -> Option<&str> {
        non_empty(&self.property_id)
    }

    pub fn linked_tenant(&self) -> Option<&str> {
        non_empty(&self.tenant_id)
    }

    pub fn linked_room(&self) -> Option<&str> {
        non_empty(&self.room_id)
    }

    pub fn linked_supplier(&self) -> Option<&str> {
        non_empty(&self.supplier_id)
    }

    pub fn is_revenue(&self) -> bool {
        self.kind == TransactionType::Revenue
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// Rent payment from `tenant_id` dated within `month`.
    pub fn pays_tenant_in(&self, tenant_id: &str, month: YearMonth) -> bool {
        self.is_revenue() && self.linked_tenant() == Some(tenant_id) && month.contains(self.date)
    }

    /// Bill payment to `supplier_id` dated within `month`.
    pub fn pays_supplier_in(&self, supplier_id: &str, month: YearMonth) -> bool {
        self.is_expense()
            && self.linked_supplier() == Some(supplier_id)
            && month.contains(self.date)
    }
}

/// Restricts dashboards to one property, or lets everything through.
///
/// Serialized as `"all"` or the property id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PropertyFilter {
    #[default]
    All,
    Property(String),
}

impl PropertyFilter {
    pub fn matches(&self, property_id: Option<&str>) -> bool {
        match self {
            PropertyFilter::All => true,
            PropertyFilter::Property(id) => property_id == Some(id.as_str()),
        }
    }

    /// Like [`matches`](Self::matches), but records attached to no property
    /// always pass.
    pub fn admits_unattached(&self, property_id: Option<&str>) -> bool {
        property_id.is_none() || self.matches(property_id)
    }
}

impl From<&str> for PropertyFilter {
    fn from(value: &str) -> Self {
        match value {
            "all" => PropertyFilter::All,
            id => PropertyFilter::Property(id.to_string()),
        }
    }
}

impl Serialize for PropertyFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropertyFilter::All => serializer.serialize_str("all"),
            PropertyFilter::Property(id) => serializer.serialize_str(id),
        }
    }
}

impl<'de> Deserialize<'de> for PropertyFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(PropertyFilter::from(raw.as_str()))
    }
}

impl JsonSchema for PropertyFilter {
    fn schema_name() -> String {
        "PropertyFilter".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        String::json_schema(gen)
    }
}

/// Display names behind a transaction's foreign keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionLinks {
    pub property_name: String,
    pub room_number: Option<String>,
    pub tenant_name: Option<String>,
    pub supplier_name: Option<String>,
}

/// Label shown when a transaction is not attached to a known property.
pub const GENERAL_PROPERTY_LABEL: &str = "Geral";

/// Immutable view of every record the dashboards are derived from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Snapshot {
    pub properties: Vec<Property>,
    pub rooms: Vec<Room>,
    pub tenants: Vec<Tenant>,
    pub transactions: Vec<Transaction>,
    pub suppliers: Vec<Supplier>,
}

impl Snapshot {
    pub fn property(&self, id: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }

    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn tenant(&self, id: &str) -> Option<&Tenant> {
        self.tenants.iter().find(|t| t.id == id)
    }

    pub fn supplier(&self, id: &str) -> Option<&Supplier> {
        self.suppliers.iter().find(|s| s.id == id)
    }

    /// Room a tenant is assigned to, if it still exists.
    pub fn room_of(&self, tenant: &Tenant) -> Option<&Room> {
        tenant.linked_room().and_then(|id| self.room(id))
    }

    pub fn active_tenant_for_room(&self, room_id: &str) -> Option<&Tenant> {
        self.tenants
            .iter()
            .find(|t| t.is_active() && t.linked_room() == Some(room_id))
    }

    /// Rooms of a property ordered by number, with digit runs compared
    /// numerically (`C2` before `C10`).
    pub fn rooms_for_property(&self, property_id: &str) -> Vec<&Room> {
        let mut rooms: Vec<&Room> = self
            .rooms
            .iter()
            .filter(|r| r.property_id == property_id)
            .collect();
        rooms.sort_by(|a, b| natural_cmp(&a.number, &b.number));
        rooms
    }

    pub fn tenants_in_view(&self, active_only: bool) -> Vec<&Tenant> {
        self.tenants
            .iter()
            .filter(|t| !active_only || t.is_active())
            .collect()
    }

    pub fn transaction_links(&self, transaction: &Transaction) -> TransactionLinks {
        let property_name = transaction
            .linked_property()
            .and_then(|id| self.property(id))
            .map(|p| p.name.clone())
            .unwrap_or_else(|| GENERAL_PROPERTY_LABEL.to_string());

        let (room_number, tenant_name, supplier_name) = match transaction.kind {
            TransactionType::Revenue => (
                transaction
                    .linked_room()
                    .and_then(|id| self.room(id))
                    .map(|r| r.number.clone()),
                transaction
                    .linked_tenant()
                    .and_then(|id| self.tenant(id))
                    .map(|t| t.name.clone()),
                None,
            ),
            TransactionType::Expense => (
                None,
                None,
                transaction
                    .linked_supplier()
                    .and_then(|id| self.supplier(id))
                    .map(|s| s.name.clone()),
            ),
        };

        TransactionLinks {
            property_name,
            room_number,
            tenant_name,
            supplier_name,
        }
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(Snapshot)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let ordering = take_number(&mut left).cmp(&take_number(&mut right));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                let ordering = l.to_lowercase().cmp(r.to_lowercase());
                if ordering != Ordering::Equal {
                    return ordering;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_number(chars: &mut Peekable<Chars<'_>>) -> u64 {
    let mut number = 0u64;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        number = number.saturating_mul(10).saturating_add(digit as u64);
        chars.next();
    }
    number
}
