use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::collection::{Collection, RawDocument};
use super::fields;
use super::Record;

/// How often a subscription bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingFrequency {
    Weekly,
    Monthly,
    Yearly,
}

impl BillingFrequency {
    pub fn label(&self) -> &'static str {
        match self {
            BillingFrequency::Weekly => "weekly",
            BillingFrequency::Monthly => "monthly",
            BillingFrequency::Yearly => "yearly",
        }
    }

    /// Unknown or missing frequencies fall back to monthly, the form default.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("weekly") => BillingFrequency::Weekly,
            Some("yearly") => BillingFrequency::Yearly,
            _ => BillingFrequency::Monthly,
        }
    }
}

impl Default for BillingFrequency {
    fn default() -> Self {
        BillingFrequency::Monthly
    }
}

impl std::fmt::Display for BillingFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubscriptionCategory {
    Entertainment,
    Software,
    Education,
    Health,
    News,
    Other,
}

impl SubscriptionCategory {
    pub const ALL: [SubscriptionCategory; 6] = [
        SubscriptionCategory::Entertainment,
        SubscriptionCategory::Software,
        SubscriptionCategory::Education,
        SubscriptionCategory::Health,
        SubscriptionCategory::News,
        SubscriptionCategory::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SubscriptionCategory::Entertainment => "Entertainment",
            SubscriptionCategory::Software => "Software",
            SubscriptionCategory::Education => "Education",
            SubscriptionCategory::Health => "Health",
            SubscriptionCategory::News => "News",
            SubscriptionCategory::Other => "Other",
        }
    }

    pub fn parse_lenient(raw: Option<&str>) -> Self {
        raw.map(str::trim)
            .and_then(|s| Self::ALL.into_iter().find(|c| c.label().eq_ignore_ascii_case(s)))
            .unwrap_or(SubscriptionCategory::Other)
    }
}

impl std::fmt::Display for SubscriptionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A recurring charge. Only active subscriptions count towards spend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    pub frequency: BillingFrequency,
    pub next_billing: Option<NaiveDate>,
    pub category: SubscriptionCategory,

    /// Paused subscriptions stay listed but are excluded from totals
    pub active: bool,
}

impl SubscriptionRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        amount: Decimal,
        frequency: BillingFrequency,
        active: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            amount,
            frequency,
            next_billing: None,
            category: SubscriptionCategory::Other,
            active,
        }
    }
}

impl Record for SubscriptionRecord {
    const COLLECTION: Collection = Collection::Subscriptions;

    fn from_document(doc: &RawDocument) -> Self {
        let frequency = fields::optional_text(doc, "frequency");
        let category = fields::optional_text(doc, "category");
        Self {
            id: doc.id.clone(),
            name: fields::text(doc, "name"),
            amount: fields::amount_or_zero(doc, "amount"),
            frequency: BillingFrequency::parse_lenient(frequency.as_deref()),
            next_billing: fields::optional_date(doc, "nextBilling"),
            category: SubscriptionCategory::parse_lenient(category.as_deref()),
            active: fields::flag(doc, "active"),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}
