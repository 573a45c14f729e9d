use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::collection::{Collection, RawDocument};
use super::fields;
use super::metrics::percent_of;
use super::Record;

/// Investment vehicle. Determines the portfolio slice a holding falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvestmentType {
    Stocks,
    MutualFunds,
    Bonds,
    RealEstate,
    Crypto,
    Gold,
    FixedDeposit,
    Other,
}

impl InvestmentType {
    /// Chart order of the portfolio breakdown.
    pub const ALL: [InvestmentType; 8] = [
        InvestmentType::Stocks,
        InvestmentType::MutualFunds,
        InvestmentType::Bonds,
        InvestmentType::RealEstate,
        InvestmentType::Crypto,
        InvestmentType::Gold,
        InvestmentType::FixedDeposit,
        InvestmentType::Other,
    ];

    /// Label as stored in documents.
    pub fn label(&self) -> &'static str {
        match self {
            InvestmentType::Stocks => "Stocks",
            InvestmentType::MutualFunds => "Mutual Funds",
            InvestmentType::Bonds => "Bonds",
            InvestmentType::RealEstate => "Real Estate",
            InvestmentType::Crypto => "Crypto",
            InvestmentType::Gold => "Gold",
            InvestmentType::FixedDeposit => "FD",
            InvestmentType::Other => "Other",
        }
    }

    pub fn parse_lenient(raw: Option<&str>) -> Self {
        raw.map(str::trim)
            .and_then(|s| Self::ALL.into_iter().find(|t| t.label().eq_ignore_ascii_case(s)))
            .unwrap_or(InvestmentType::Other)
    }
}

impl std::fmt::Display for InvestmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A holding with its invested principal and (optionally) a marked value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentRecord {
    pub id: String,
    pub name: String,
    pub investment_type: InvestmentType,

    /// Invested principal
    pub amount: Decimal,

    /// Latest marked value; `None` means "still worth the principal"
    pub current_value: Option<Decimal>,

    pub purchase_date: Option<NaiveDate>,

    #[serde(default)]
    pub notes: String,
}

impl InvestmentRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        investment_type: InvestmentType,
        amount: Decimal,
        current_value: Option<Decimal>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            investment_type,
            amount,
            current_value,
            purchase_date: None,
            notes: String::new(),
        }
    }

    /// Current value, falling back to principal when unset.
    pub fn effective_value(&self) -> Decimal {
        self.current_value.unwrap_or(self.amount)
    }

    /// Gain or loss; negative when the holding is under water.
    pub fn returns(&self) -> Decimal {
        self.effective_value() - self.amount
    }

    /// Returns as a percentage of principal. 0 when nothing was invested or
    /// the ratio is out of range.
    pub fn return_percentage(&self) -> Decimal {
        percent_of(self.returns(), self.amount).unwrap_or(Decimal::ZERO)
    }
}

impl Record for InvestmentRecord {
    const COLLECTION: Collection = Collection::Investments;

    fn from_document(doc: &RawDocument) -> Self {
        let investment_type = fields::optional_text(doc, "type");
        Self {
            id: doc.id.clone(),
            name: fields::text(doc, "name"),
            investment_type: InvestmentType::parse_lenient(investment_type.as_deref()),
            amount: fields::amount_or_zero(doc, "amount"),
            current_value: fields::optional_amount(doc, "currentValue"),
            purchase_date: fields::optional_date(doc, "purchaseDate"),
            notes: fields::text(doc, "notes"),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}
