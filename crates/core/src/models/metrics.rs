use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::expense::ExpenseCategory;
use super::investment::InvestmentType;

/// Spend for one expense category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub total: Decimal,

    /// Share of total expenses (0-100, 2 dp)
    pub share_percentage: Decimal,
}

/// Recurring spend of active subscriptions, split by billing frequency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionLoad {
    /// Raw sum of active amounts regardless of frequency
    pub total: Decimal,
    pub weekly: Decimal,
    pub monthly: Decimal,
    pub yearly: Decimal,

    /// Active spend normalised to one month (weekly × 52 / 12, yearly / 12)
    pub monthly_equivalent: Decimal,

    pub active_count: usize,
    pub inactive_count: usize,
}

/// Current value held in one investment type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSlice {
    pub investment_type: InvestmentType,
    pub value: Decimal,

    /// Share of total current value (0-100, 2 dp)
    pub allocation_percentage: Decimal,
}

/// Per-holding performance line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentReturn {
    pub id: String,
    pub name: String,
    pub principal: Decimal,
    pub current_value: Decimal,
    pub returns: Decimal,
    pub return_percentage: Decimal,
}

/// Everything derived from the three record stores. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub total_expenses: Decimal,

    /// Categories in order of first occurrence in the expense store
    pub expense_by_category: Vec<CategoryTotal>,

    /// Active recurring spend; equals `subscription_load.total`
    pub total_subscriptions: Decimal,
    pub subscription_load: SubscriptionLoad,

    pub total_invested_principal: Decimal,
    pub total_current_value: Decimal,
    pub total_returns: Decimal,

    /// Aggregate return on principal; 0 when nothing was invested
    pub return_percentage: Decimal,

    /// Types with a non-zero value, in `InvestmentType::ALL` order
    pub portfolio_by_type: Vec<AllocationSlice>,
    pub investment_returns: Vec<InvestmentReturn>,

    /// total_current_value − total_expenses − total_subscriptions
    pub net_worth: Decimal,
}

impl DerivedMetrics {
    /// Labelled totals for the financial overview chart.
    pub fn overview(&self) -> [(&'static str, Decimal); 3] {
        [
            ("Expenses", self.total_expenses),
            ("Subscriptions", self.total_subscriptions),
            ("Investments", self.total_current_value),
        ]
    }

    pub fn category_total(&self, category: ExpenseCategory) -> Option<Decimal> {
        self.expense_by_category
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.total)
    }

    pub fn type_value(&self, investment_type: InvestmentType) -> Option<Decimal> {
        self.portfolio_by_type
            .iter()
            .find(|s| s.investment_type == investment_type)
            .map(|s| s.value)
    }
}

/// `part / whole × 100`, or `None` when `whole` is 0 or the ratio does not
/// fit in a `Decimal` (a tiny principal against a large gain).
pub fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        return None;
    }
    part.checked_div(whole)?.checked_mul(Decimal::ONE_HUNDRED)
}
