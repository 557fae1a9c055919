use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{Currency, PaymentStatus, Unit};

/// One invoice or expense line item.
///
/// The total is not a field: it is always `quantity * price_per_unit`, so an
/// edit to either factor can never leave a stale total behind.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Record {
    pub date: NaiveDate,
    pub company: String,
    pub item_id: String,
    pub item_name: String,
    pub quantity: Decimal,
    pub unit: Unit,
    pub price_per_unit: Decimal,
    pub currency: Currency,
    /// `None` for ledgers without a Status column.
    pub status: Option<PaymentStatus>,
}

impl Record {
    pub(crate) fn new(date: NaiveDate, company: impl Into<String>) -> Self {
        Self {
            date,
            company: company.into(),
            item_id: String::new(),
            item_name: String::new(),
            quantity: Decimal::ZERO,
            unit: Unit::default(),
            price_per_unit: Decimal::ZERO,
            currency: Currency::default(),
            status: None,
        }
    }

    /// Saturates at `Decimal::MAX`; validated records never get there.
    pub(crate) fn total_price(&self) -> Decimal {
        self.quantity.saturating_mul(self.price_per_unit)
    }

    pub(crate) fn is_unpaid(&self) -> bool {
        self.status == Some(PaymentStatus::Unpaid)
    }
}

/// Stable handle for a stored row. Positions shift on delete; ids do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct RecordId(pub(crate) u64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StoredRecord {
    pub id: RecordId,
    pub record: Record,
}

impl std::ops::Deref for StoredRecord {
    type Target = Record;

    fn deref(&self) -> &Record {
        &self.record
    }
}
