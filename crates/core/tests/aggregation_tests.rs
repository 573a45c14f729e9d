// ═══════════════════════════════════════════════════════════════════
// Aggregation Tests — AggregationService and recent_expenses
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use finance_dashboard_core::models::expense::{ExpenseCategory, ExpenseRecord};
use finance_dashboard_core::models::investment::{InvestmentRecord, InvestmentType};
use finance_dashboard_core::models::subscription::{BillingFrequency, SubscriptionRecord};
use finance_dashboard_core::services::aggregation_service::{recent_expenses, AggregationService};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn expense(id: &str, amount: Decimal, category: ExpenseCategory) -> ExpenseRecord {
    ExpenseRecord::new(id, format!("expense {id}"), amount, category, None)
}

fn dated(id: &str, date: Option<NaiveDate>) -> ExpenseRecord {
    ExpenseRecord::new(id, id, dec!(1), ExpenseCategory::Other, date)
}

fn sub(id: &str, amount: Decimal, frequency: BillingFrequency, active: bool) -> SubscriptionRecord {
    SubscriptionRecord::new(id, format!("sub {id}"), amount, frequency, active)
}

fn inv(
    id: &str,
    investment_type: InvestmentType,
    principal: Decimal,
    current: Option<Decimal>,
) -> InvestmentRecord {
    InvestmentRecord::new(id, format!("inv {id}"), investment_type, principal, current)
}

// ═══════════════════════════════════════════════════════════════════
//  Expenses
// ═══════════════════════════════════════════════════════════════════

mod expenses {
    use super::*;

    #[test]
    fn category_scenario() {
        let records = vec![
            expense("1", dec!(100), ExpenseCategory::Food),
            expense("2", dec!(50), ExpenseCategory::Food),
            expense("3", dec!(20), ExpenseCategory::Other),
        ];
        let metrics = AggregationService::new().compute(&records, &[], &[]);

        assert_eq!(metrics.total_expenses, dec!(170));
        assert_eq!(metrics.expense_by_category.len(), 2);
        assert_eq!(metrics.category_total(ExpenseCategory::Food), Some(dec!(150)));
        assert_eq!(metrics.category_total(ExpenseCategory::Other), Some(dec!(20)));
        assert_eq!(metrics.category_total(ExpenseCategory::Bills), None);
    }

    #[test]
    fn categories_in_first_occurrence_order() {
        let records = vec![
            expense("1", dec!(5), ExpenseCategory::Transport),
            expense("2", dec!(5), ExpenseCategory::Bills),
            expense("3", dec!(5), ExpenseCategory::Transport),
            expense("4", dec!(5), ExpenseCategory::Education),
        ];
        let (_, categories) = AggregationService::new().expense_breakdown(&records);
        let order: Vec<ExpenseCategory> = categories.iter().map(|c| c.category).collect();
        assert_eq!(
            order,
            vec![
                ExpenseCategory::Transport,
                ExpenseCategory::Bills,
                ExpenseCategory::Education
            ]
        );
    }

    #[test]
    fn category_totals_sum_exactly_to_total() {
        let amounts = [dec!(0.1), dec!(0.2), dec!(0.3), dec!(19.99), dec!(1234.56), dec!(0.07)];
        let categories = [
            ExpenseCategory::Food,
            ExpenseCategory::Shopping,
            ExpenseCategory::Food,
            ExpenseCategory::Healthcare,
            ExpenseCategory::Shopping,
            ExpenseCategory::Other,
        ];
        let records: Vec<ExpenseRecord> = amounts
            .iter()
            .zip(categories.iter())
            .enumerate()
            .map(|(i, (a, c))| expense(&i.to_string(), *a, *c))
            .collect();

        let metrics = AggregationService::new().compute(&records, &[], &[]);
        let summed: Decimal = metrics.expense_by_category.iter().map(|c| c.total).sum();
        assert_eq!(summed, metrics.total_expenses);
        assert_eq!(metrics.total_expenses, dec!(1255.22));
    }

    #[test]
    fn share_percentages() {
        let records = vec![
            expense("1", dec!(75), ExpenseCategory::Food),
            expense("2", dec!(25), ExpenseCategory::Bills),
        ];
        let (_, categories) = AggregationService::new().expense_breakdown(&records);
        assert_eq!(categories[0].share_percentage, dec!(75));
        assert_eq!(categories[1].share_percentage, dec!(25));
    }

    #[test]
    fn zero_amounts_count_but_add_nothing() {
        let records = vec![expense("1", dec!(0), ExpenseCategory::Food)];
        let metrics = AggregationService::new().compute(&records, &[], &[]);
        assert_eq!(metrics.total_expenses, dec!(0));
        assert_eq!(metrics.expense_by_category[0].share_percentage, dec!(0));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Subscriptions
// ═══════════════════════════════════════════════════════════════════

mod subscriptions {
    use super::*;

    #[test]
    fn active_only_split_by_frequency() {
        let records = vec![
            sub("1", dec!(200), BillingFrequency::Monthly, true),
            sub("2", dec!(1200), BillingFrequency::Yearly, true),
            sub("3", dec!(99), BillingFrequency::Monthly, false),
        ];
        let load = AggregationService::new().subscription_load(&records);

        assert_eq!(load.monthly, dec!(200));
        assert_eq!(load.yearly, dec!(1200));
        assert_eq!(load.weekly, dec!(0));
        assert_eq!(load.total, dec!(1400));
        assert_eq!(load.active_count, 2);
        assert_eq!(load.inactive_count, 1);
    }

    #[test]
    fn monthly_equivalent_normalises_frequencies() {
        let records = vec![
            sub("1", dec!(100), BillingFrequency::Monthly, true),
            sub("2", dec!(1200), BillingFrequency::Yearly, true),
            sub("3", dec!(30), BillingFrequency::Weekly, true),
        ];
        let load = AggregationService::new().subscription_load(&records);
        // 100 + 1200/12 + 30*52/12 = 100 + 100 + 130
        assert_eq!(load.monthly_equivalent, dec!(330));
    }

    #[test]
    fn total_subscriptions_matches_load() {
        let records = vec![
            sub("1", dec!(10), BillingFrequency::Weekly, true),
            sub("2", dec!(5), BillingFrequency::Monthly, false),
        ];
        let metrics = AggregationService::new().compute(&[], &records, &[]);
        assert_eq!(metrics.total_subscriptions, dec!(10));
        assert_eq!(metrics.total_subscriptions, metrics.subscription_load.total);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Investments
// ═══════════════════════════════════════════════════════════════════

mod investments {
    use super::*;

    #[test]
    fn returns_scenario() {
        let records = vec![
            inv("1", InvestmentType::Stocks, dec!(1000), Some(dec!(1200))),
            inv("2", InvestmentType::Bonds, dec!(500), Some(dec!(400))),
        ];
        let metrics = AggregationService::new().compute(&[], &[], &records);

        assert_eq!(metrics.total_invested_principal, dec!(1500));
        assert_eq!(metrics.total_current_value, dec!(1600));
        assert_eq!(metrics.total_returns, dec!(100));
        assert_eq!(metrics.return_percentage.round_dp(2), dec!(6.67));
    }

    #[test]
    fn zero_principal_has_zero_return_percentage() {
        let records = vec![inv("1", InvestmentType::Crypto, dec!(0), Some(dec!(40)))];
        let metrics = AggregationService::new().compute(&[], &[], &records);
        assert_eq!(metrics.return_percentage, dec!(0));

        let empty = AggregationService::new().compute(&[], &[], &[]);
        assert_eq!(empty.return_percentage, dec!(0));
    }

    #[test]
    fn unset_current_value_uses_principal() {
        let records = vec![
            inv("1", InvestmentType::Gold, dec!(300), None),
            inv("2", InvestmentType::Gold, dec!(200), Some(dec!(260))),
        ];
        let metrics = AggregationService::new().compute(&[], &[], &records);
        assert_eq!(metrics.total_current_value, dec!(560));
        assert_eq!(metrics.type_value(InvestmentType::Gold), Some(dec!(560)));
    }

    #[test]
    fn portfolio_excludes_zero_types_and_keeps_chart_order() {
        let records = vec![
            inv("1", InvestmentType::Gold, dec!(100), Some(dec!(100))),
            inv("2", InvestmentType::Stocks, dec!(300), Some(dec!(300))),
            inv("3", InvestmentType::Bonds, dec!(50), Some(dec!(0))),
        ];
        let metrics = AggregationService::new().compute(&[], &[], &records);
        let types: Vec<InvestmentType> = metrics
            .portfolio_by_type
            .iter()
            .map(|s| s.investment_type)
            .collect();

        assert_eq!(types, vec![InvestmentType::Stocks, InvestmentType::Gold]);
        assert_eq!(metrics.type_value(InvestmentType::Bonds), None);
        assert_eq!(metrics.portfolio_by_type[0].allocation_percentage, dec!(75));
        assert_eq!(metrics.portfolio_by_type[1].allocation_percentage, dec!(25));
    }

    #[test]
    fn per_investment_returns_in_store_order() {
        let records = vec![
            inv("b", InvestmentType::Stocks, dec!(1000), Some(dec!(1200))),
            inv("a", InvestmentType::Stocks, dec!(300), Some(dec!(200))),
        ];
        let returns = AggregationService::new().investment_returns(&records);
        assert_eq!(returns[0].id, "b");
        assert_eq!(returns[0].returns, dec!(200));
        assert_eq!(returns[0].return_percentage, dec!(20));
        assert_eq!(returns[1].returns, dec!(-100));
        assert_eq!(returns[1].return_percentage, dec!(-33.33));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Net worth & overview
// ═══════════════════════════════════════════════════════════════════

mod net_worth {
    use super::*;

    #[test]
    fn empty_collections_give_zero() {
        let metrics = AggregationService::new().compute(&[], &[], &[]);
        assert_eq!(metrics.net_worth, dec!(0));
        assert!(metrics.expense_by_category.is_empty());
        assert!(metrics.portfolio_by_type.is_empty());
    }

    #[test]
    fn identity_holds_across_inputs() {
        let service = AggregationService::new();
        let expenses = vec![
            expense("1", dec!(120.40), ExpenseCategory::Food),
            expense("2", dec!(80), ExpenseCategory::Bills),
        ];
        let subs = vec![
            sub("1", dec!(499), BillingFrequency::Monthly, true),
            sub("2", dec!(49), BillingFrequency::Weekly, false),
        ];
        let invs = vec![
            inv("1", InvestmentType::FixedDeposit, dec!(10000), Some(dec!(10450))),
            inv("2", InvestmentType::Crypto, dec!(2000), None),
        ];

        for n in 0..=2 {
            let m = service.compute(&expenses[..n], &subs[..n], &invs[..n]);
            assert_eq!(
                m.net_worth,
                m.total_current_value - m.total_expenses - m.total_subscriptions
            );
        }

        let full = service.compute(&expenses, &subs, &invs);
        assert_eq!(full.net_worth, dec!(12450) - dec!(200.40) - dec!(499));
    }

    #[test]
    fn net_worth_may_be_negative() {
        let expenses = vec![expense("1", dec!(900), ExpenseCategory::Shopping)];
        let metrics = AggregationService::new().compute(&expenses, &[], &[]);
        assert_eq!(metrics.net_worth, dec!(-900));
    }

    #[test]
    fn overview_labels_and_values() {
        let expenses = vec![expense("1", dec!(10), ExpenseCategory::Food)];
        let subs = vec![sub("1", dec!(20), BillingFrequency::Monthly, true)];
        let invs = vec![inv("1", InvestmentType::Stocks, dec!(30), Some(dec!(35)))];
        let metrics = AggregationService::new().compute(&expenses, &subs, &invs);
        assert_eq!(
            metrics.overview(),
            [
                ("Expenses", dec!(10)),
                ("Subscriptions", dec!(20)),
                ("Investments", dec!(35))
            ]
        );
    }

    #[test]
    fn deterministic_for_identical_input() {
        let service = AggregationService::new();
        let expenses = vec![expense("1", dec!(3.5), ExpenseCategory::Food)];
        let invs = vec![inv("1", InvestmentType::Stocks, dec!(30), Some(dec!(35)))];
        assert_eq!(
            service.compute(&expenses, &[], &invs),
            service.compute(&expenses, &[], &invs)
        );
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Recent transactions
// ═══════════════════════════════════════════════════════════════════

mod recent {
    use super::*;

    #[test]
    fn newest_first_truncated() {
        let records: Vec<ExpenseRecord> = (1..=7)
            .map(|day| dated(&format!("e{day}"), Some(d(2025, 1, day))))
            .collect();
        let recent = recent_expenses(&records, 5);
        let ids: Vec<&str> = recent.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e7", "e6", "e5", "e4", "e3"]);
    }

    #[test]
    fn ties_keep_snapshot_order() {
        let same = Some(d(2025, 3, 1));
        let records = vec![
            dated("first", same),
            dated("newer", Some(d(2025, 3, 2))),
            dated("second", same),
            dated("third", same),
        ];
        let recent = recent_expenses(&records, 5);
        let ids: Vec<&str> = recent.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["newer", "first", "second", "third"]);
    }

    #[test]
    fn undated_sort_last() {
        let records = vec![dated("none", None), dated("dated", Some(d(2020, 1, 1)))];
        let recent = recent_expenses(&records, 5);
        assert_eq!(recent[0].id, "dated");
        assert_eq!(recent[1].id, "none");
    }

    #[test]
    fn fewer_than_limit() {
        let records = vec![dated("only", Some(d(2025, 1, 1)))];
        assert_eq!(recent_expenses(&records, 5).len(), 1);
        assert!(recent_expenses(&[], 5).is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Extreme amounts
// ═══════════════════════════════════════════════════════════════════

mod extreme_amounts {
    use super::*;
    use finance_dashboard_core::models::collection::RawDocument;
    use finance_dashboard_core::models::fields::MAX_AMOUNT;
    use finance_dashboard_core::models::Record;
    use serde_json::json;

    #[test]
    fn oversized_amounts_decode_to_zero_and_aggregate() {
        let huge = "50000000000000000000000000000";
        let records: Vec<ExpenseRecord> = ["a", "b"]
            .iter()
            .map(|id| {
                ExpenseRecord::from_document(&RawDocument::from_json(
                    *id,
                    json!({"amount": huge, "category": "Food"}),
                ))
            })
            .collect();
        assert!(records.iter().all(|e| e.amount.is_zero()));

        let metrics = AggregationService::new().compute(&records, &[], &[]);
        assert_eq!(metrics.total_expenses, dec!(0));
        assert_eq!(metrics.category_total(ExpenseCategory::Food), Some(dec!(0)));
    }

    #[test]
    fn amounts_at_the_limit_sum_without_overflow() {
        let max = Decimal::from(MAX_AMOUNT);
        let expenses: Vec<ExpenseRecord> = (0..1000)
            .map(|i| expense(&i.to_string(), max, ExpenseCategory::Bills))
            .collect();
        let subs: Vec<SubscriptionRecord> = (0..1000)
            .map(|i| sub(&i.to_string(), max, BillingFrequency::Weekly, true))
            .collect();

        let metrics = AggregationService::new().compute(&expenses, &subs, &[]);
        assert_eq!(metrics.total_expenses, max * Decimal::from(1000));
        assert_eq!(metrics.total_subscriptions, max * Decimal::from(1000));
        assert_eq!(
            metrics.subscription_load.monthly_equivalent,
            (max * Decimal::from(1000) * Decimal::from(52) / Decimal::from(12)).round_dp(2)
        );
        assert_eq!(metrics.net_worth, -(max * Decimal::from(2000)));
    }

    #[test]
    fn tiny_principal_large_gain_reports_zero_percentage() {
        let records = vec![inv(
            "1",
            InvestmentType::Crypto,
            dec!(0.0000000000000000000000000001),
            Some(Decimal::from(MAX_AMOUNT)),
        )];
        let metrics = AggregationService::new().compute(&[], &[], &records);

        assert!(metrics.total_returns > dec!(0));
        assert_eq!(metrics.return_percentage, dec!(0));
        assert_eq!(metrics.investment_returns[0].return_percentage, dec!(0));
        assert_eq!(metrics.portfolio_by_type[0].allocation_percentage, dec!(100));
    }
}
