use rust_decimal::Decimal;
use tracing::warn;

use crate::models::expense::{ExpenseCategory, ExpenseRecord};
use crate::models::investment::{InvestmentRecord, InvestmentType};
use crate::models::metrics::{
    percent_of, AllocationSlice, CategoryTotal, DerivedMetrics, InvestmentReturn,
    SubscriptionLoad,
};
use crate::models::subscription::{BillingFrequency, SubscriptionRecord};

/// Computes the derived dashboard metrics from the current record stores.
///
/// Pure business logic: no I/O, no cache, deterministic for identical
/// input. Always called with the complete current store contents, never
/// with deltas.
pub struct AggregationService;

impl AggregationService {
    pub fn new() -> Self {
        Self
    }

    /// Compute every derived metric in one pass over the three stores.
    pub fn compute(
        &self,
        expenses: &[ExpenseRecord],
        subscriptions: &[SubscriptionRecord],
        investments: &[InvestmentRecord],
    ) -> DerivedMetrics {
        let (total_expenses, expense_by_category) = self.expense_breakdown(expenses);
        let subscription_load = self.subscription_load(subscriptions);

        let total_invested_principal: Decimal = investments.iter().map(|i| i.amount).sum();
        let total_current_value: Decimal =
            investments.iter().map(InvestmentRecord::effective_value).sum();
        let total_returns = total_current_value - total_invested_principal;
        let return_percentage = match percent_of(total_returns, total_invested_principal) {
            Some(pct) => pct,
            None if total_invested_principal.is_zero() => Decimal::ZERO,
            None => {
                warn!(
                    returns = %total_returns,
                    principal = %total_invested_principal,
                    "Return percentage out of range"
                );
                Decimal::ZERO
            }
        };

        let net_worth = total_current_value - total_expenses - subscription_load.total;

        DerivedMetrics {
            total_expenses,
            expense_by_category,
            total_subscriptions: subscription_load.total,
            subscription_load,
            total_invested_principal,
            total_current_value,
            total_returns,
            return_percentage,
            portfolio_by_type: self.portfolio_by_type(investments, total_current_value),
            investment_returns: self.investment_returns(investments),
            net_worth,
        }
    }

    /// Total spend and per-category totals, categories in first-seen order.
    pub fn expense_breakdown(&self, expenses: &[ExpenseRecord]) -> (Decimal, Vec<CategoryTotal>) {
        let mut totals: Vec<(ExpenseCategory, Decimal)> = Vec::new();
        for expense in expenses {
            match totals.iter_mut().find(|(c, _)| *c == expense.category) {
                Some((_, total)) => *total += expense.amount,
                None => totals.push((expense.category, expense.amount)),
            }
        }

        let total: Decimal = expenses.iter().map(|e| e.amount).sum();
        let categories = totals
            .into_iter()
            .map(|(category, sum)| CategoryTotal {
                category,
                total: sum,
                share_percentage: percentage_of(sum, total),
            })
            .collect();
        (total, categories)
    }

    /// Active recurring spend, split by billing frequency.
    pub fn subscription_load(&self, subscriptions: &[SubscriptionRecord]) -> SubscriptionLoad {
        let mut load = SubscriptionLoad::default();
        for sub in subscriptions {
            if !sub.active {
                load.inactive_count += 1;
                continue;
            }
            load.active_count += 1;
            load.total += sub.amount;
            match sub.frequency {
                BillingFrequency::Weekly => load.weekly += sub.amount,
                BillingFrequency::Monthly => load.monthly += sub.amount,
                BillingFrequency::Yearly => load.yearly += sub.amount,
            }
        }

        let weeks_per_year = Decimal::from(52);
        let months_per_year = Decimal::from(12);
        load.monthly_equivalent = (load.monthly
            + load.weekly * weeks_per_year / months_per_year
            + load.yearly / months_per_year)
            .round_dp(2);
        load
    }

    /// Current value per investment type, dropping types that sum to zero.
    pub fn portfolio_by_type(
        &self,
        investments: &[InvestmentRecord],
        total_current_value: Decimal,
    ) -> Vec<AllocationSlice> {
        InvestmentType::ALL
            .iter()
            .filter_map(|investment_type| {
                let value: Decimal = investments
                    .iter()
                    .filter(|i| i.investment_type == *investment_type)
                    .map(InvestmentRecord::effective_value)
                    .sum();
                if value.is_zero() {
                    return None;
                }
                Some(AllocationSlice {
                    investment_type: *investment_type,
                    value,
                    allocation_percentage: percentage_of(value, total_current_value),
                })
            })
            .collect()
    }

    pub fn investment_returns(&self, investments: &[InvestmentRecord]) -> Vec<InvestmentReturn> {
        investments
            .iter()
            .map(|i| InvestmentReturn {
                id: i.id.clone(),
                name: i.name.clone(),
                principal: i.amount,
                current_value: i.effective_value(),
                returns: i.returns(),
                return_percentage: i.return_percentage().round_dp(2),
            })
            .collect()
    }
}

impl Default for AggregationService {
    fn default() -> Self {
        Self::new()
    }
}

/// Newest expenses first, at most `limit` of them.
///
/// The sort is stable, so equal dates keep snapshot order. Undated
/// expenses sort after every dated one.
pub fn recent_expenses(expenses: &[ExpenseRecord], limit: usize) -> Vec<ExpenseRecord> {
    let mut sorted: Vec<&ExpenseRecord> = expenses.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.into_iter().take(limit).cloned().collect()
}

/// `part / whole × 100` rounded to 2 dp; 0 when `whole` is 0.
fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    percent_of(part, whole).map_or(Decimal::ZERO, |pct| pct.round_dp(2))
}
