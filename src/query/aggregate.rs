use rust_decimal::Decimal;

use crate::models::{Currency, Record, StoredRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GroupBy {
    Company,
    CompanyCurrency,
    Currency,
    Status,
    Unit,
}

impl GroupBy {
    /// Key column names; `party` names the company column of the ledger.
    pub(crate) fn headers(&self, party: &'static str) -> Vec<&'static str> {
        match self {
            Self::Company => vec![party],
            Self::CompanyCurrency => vec![party, "Currency"],
            Self::Currency => vec!["Currency"],
            Self::Status => vec!["Status"],
            Self::Unit => vec!["Unit"],
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "company" | "subject" => Some(Self::Company),
            "company+currency" | "company-currency" | "cc" => Some(Self::CompanyCurrency),
            "currency" => Some(Self::Currency),
            "status" => Some(Self::Status),
            "unit" => Some(Self::Unit),
            _ => None,
        }
    }

    pub(crate) fn all() -> &'static [GroupBy] {
        &[
            Self::Company,
            Self::CompanyCurrency,
            Self::Currency,
            Self::Status,
            Self::Unit,
        ]
    }

    fn key(&self, record: &Record) -> Vec<String> {
        let status = || {
            record
                .status
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|| "-".into())
        };
        match self {
            Self::Company => vec![record.company.clone()],
            Self::CompanyCurrency => vec![record.company.clone(), record.currency.to_string()],
            Self::Currency => vec![record.currency.to_string()],
            Self::Status => vec![status()],
            Self::Unit => vec![record.unit.to_string()],
        }
    }
}

impl std::fmt::Display for GroupBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.headers("Company").join(" + "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Measure {
    TotalPrice,
    Quantity,
}

impl Measure {
    pub(crate) fn of(&self, record: &Record) -> Decimal {
        match self {
            Self::TotalPrice => record.total_price(),
            Self::Quantity => record.quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GroupTotal {
    pub(crate) key: Vec<String>,
    pub(crate) total: Decimal,
    pub(crate) count: usize,
}

impl GroupTotal {
    pub(crate) fn label(&self) -> String {
        self.key.join(" / ")
    }
}

/// Per-key sums in first-seen order. Only keys present in the input appear.
pub(crate) fn group_totals<'a, I>(
    records: I,
    group_by: GroupBy,
    measure: Measure,
) -> Vec<GroupTotal>
where
    I: IntoIterator<Item = &'a StoredRecord>,
{
    let mut groups: Vec<GroupTotal> = Vec::new();
    for record in records {
        let key = group_by.key(record);
        let value = measure.of(record);
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => {
                group.total = group.total.saturating_add(value);
                group.count += 1;
            }
            None => groups.push(GroupTotal {
                key,
                total: value,
                count: 1,
            }),
        }
    }
    groups
}

pub(crate) fn sum<'a, I>(records: I, measure: Measure) -> Decimal
where
    I: IntoIterator<Item = &'a StoredRecord>,
{
    records
        .into_iter()
        .fold(Decimal::ZERO, |acc, r| acc.saturating_add(measure.of(r)))
}

/// Total price of the rows still marked unpaid; the "total owed" metric.
pub(crate) fn unpaid_total<'a, I>(records: I) -> Decimal
where
    I: IntoIterator<Item = &'a StoredRecord>,
{
    records
        .into_iter()
        .filter(|r| r.is_unpaid())
        .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.total_price()))
}

/// Totals per currency, first-seen order. Amounts in different currencies are
/// never added together.
pub(crate) fn totals_by_currency<'a, I>(records: I) -> Vec<(Currency, Decimal)>
where
    I: IntoIterator<Item = &'a StoredRecord>,
{
    let mut totals: Vec<(Currency, Decimal)> = Vec::new();
    for record in records {
        let value = record.total_price();
        match totals.iter_mut().find(|(c, _)| *c == record.currency) {
            Some((_, total)) => *total = total.saturating_add(value),
            None => totals.push((record.currency, value)),
        }
    }
    totals
}
