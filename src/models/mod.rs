mod currency;
mod record;
mod schema;
mod status;
mod unit;

pub(crate) use currency::Currency;
pub(crate) use record::{Record, RecordId, StoredRecord};
pub(crate) use schema::{Column, LedgerKind, Schema};
pub(crate) use status::PaymentStatus;
pub(crate) use unit::Unit;
