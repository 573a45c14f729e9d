use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::collection::{Collection, RawDocument};
use super::fields;
use super::Record;

/// Expense category. Anything unrecognised lands in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Food,
    Transport,
    Shopping,
    Entertainment,
    Bills,
    Healthcare,
    Education,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 8] = [
        ExpenseCategory::Food,
        ExpenseCategory::Transport,
        ExpenseCategory::Shopping,
        ExpenseCategory::Entertainment,
        ExpenseCategory::Bills,
        ExpenseCategory::Healthcare,
        ExpenseCategory::Education,
        ExpenseCategory::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::Food => "Food",
            ExpenseCategory::Transport => "Transport",
            ExpenseCategory::Shopping => "Shopping",
            ExpenseCategory::Entertainment => "Entertainment",
            ExpenseCategory::Bills => "Bills",
            ExpenseCategory::Healthcare => "Healthcare",
            ExpenseCategory::Education => "Education",
            ExpenseCategory::Other => "Other",
        }
    }

    /// Case-insensitive lookup; absent or unknown input maps to `Other`.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        raw.map(str::trim)
            .and_then(|s| Self::ALL.into_iter().find(|c| c.label().eq_ignore_ascii_case(s)))
            .unwrap_or(ExpenseCategory::Other)
    }
}

impl Default for ExpenseCategory {
    fn default() -> Self {
        ExpenseCategory::Other
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single spending entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: String,

    pub description: String,

    /// Always non-negative; malformed amounts decode as 0
    pub amount: Decimal,

    pub category: ExpenseCategory,

    /// Spending date; `None` when missing or unparsable
    pub date: Option<NaiveDate>,

    /// Download URL of an uploaded receipt, if any
    #[serde(default)]
    pub bill_url: Option<String>,
}

impl ExpenseRecord {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        amount: Decimal,
        category: ExpenseCategory,
        date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            amount,
            category,
            date,
            bill_url: None,
        }
    }
}

impl Record for ExpenseRecord {
    const COLLECTION: Collection = Collection::Expenses;

    fn from_document(doc: &RawDocument) -> Self {
        let category = fields::optional_text(doc, "category");
        Self {
            id: doc.id.clone(),
            description: fields::text(doc, "description"),
            amount: fields::amount_or_zero(doc, "amount"),
            category: ExpenseCategory::parse_lenient(category.as_deref()),
            date: fields::optional_date(doc, "date"),
            bill_url: fields::optional_text(doc, "billUrl"),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}
