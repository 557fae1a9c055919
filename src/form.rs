use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::models::{Column, Currency, PaymentStatus, Record, Schema, Unit};

/// Raw entry-form fields, exactly as typed. Blank fields take the same
/// defaults the entry form shows: today, zero, USD, unpaid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RecordForm {
    pub(crate) date: String,
    pub(crate) company: String,
    pub(crate) item_id: String,
    pub(crate) item_name: String,
    pub(crate) quantity: String,
    pub(crate) unit: String,
    pub(crate) price_per_unit: String,
    pub(crate) currency: String,
    pub(crate) status: String,
}

impl RecordForm {
    /// Prefill a form from an existing record, for edits.
    pub(crate) fn from_record(record: &Record) -> Self {
        Self {
            date: record.date.format("%Y-%m-%d").to_string(),
            company: record.company.clone(),
            item_id: record.item_id.clone(),
            item_name: record.item_name.clone(),
            quantity: record.quantity.to_string(),
            unit: record.unit.as_str().to_string(),
            price_per_unit: record.price_per_unit.to_string(),
            currency: record.currency.as_str().to_string(),
            status: record
                .status
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
        }
    }

    /// Set one field by its short name (`date`, `company`, `qty`, ...).
    pub(crate) fn set(&mut self, field: &str, value: &str) -> Result<(), ValidationError> {
        let slot = match field.trim().to_lowercase().as_str() {
            "date" | "d" => &mut self.date,
            "company" | "subject" | "c" => &mut self.company,
            "item-id" | "item_id" | "id" => &mut self.item_id,
            "item" | "item-name" | "item_name" | "name" => &mut self.item_name,
            "qty" | "quantity" | "q" => &mut self.quantity,
            "unit" | "u" => &mut self.unit,
            "price" | "price-per-unit" | "p" => &mut self.price_per_unit,
            "currency" | "cur" => &mut self.currency,
            "status" | "s" => &mut self.status,
            other => return Err(ValidationError::UnknownField(other.to_string())),
        };
        *slot = value.trim().to_string();
        Ok(())
    }

    /// Apply `field=value` assignments from a command line on top of this form.
    pub(crate) fn apply(&mut self, args: &str) -> Result<(), ValidationError> {
        for (field, value) in parse_assignments(args) {
            self.set(&field, &value)?;
        }
        Ok(())
    }

    /// The inverse of [`apply`](Self::apply) for the fields `schema` shows.
    pub(crate) fn to_assignments(&self, schema: &Schema) -> String {
        let mut pairs = vec![
            format!("date={}", self.date),
            format!("company={}", self.company),
        ];
        if schema.has(Column::ItemId) {
            pairs.push(format!("id={}", self.item_id));
        }
        pairs.push(format!("item={}", self.item_name));
        pairs.push(format!("qty={}", self.quantity));
        pairs.push(format!("unit={}", self.unit));
        pairs.push(format!("price={}", self.price_per_unit));
        pairs.push(format!("currency={}", self.currency));
        if schema.has_status() {
            pairs.push(format!("status={}", self.status));
        }
        pairs.join(" ")
    }

    pub(crate) fn validate(&self, schema: &Schema) -> Result<Record, ValidationError> {
        let date = if self.date.trim().is_empty() {
            chrono::Local::now().date_naive()
        } else {
            parse_date(&self.date).ok_or_else(|| ValidationError::InvalidDate(self.date.clone()))?
        };

        let quantity = parse_amount_field("Quantity", &self.quantity)?;
        let price_per_unit = parse_amount_field("Price per Unit", &self.price_per_unit)?;

        let currency = if self.currency.trim().is_empty() {
            Currency::default()
        } else {
            Currency::parse(&self.currency)
                .ok_or_else(|| ValidationError::UnknownCurrency(self.currency.clone()))?
        };

        let status = if !schema.has_status() {
            None
        } else if self.status.trim().is_empty() {
            Some(PaymentStatus::Unpaid)
        } else {
            Some(
                PaymentStatus::parse(&self.status)
                    .ok_or_else(|| ValidationError::UnknownStatus(self.status.clone()))?,
            )
        };

        let unit = if self.unit.trim().is_empty() {
            Unit::default()
        } else {
            Unit::parse(&self.unit)
        };

        Ok(Record {
            date,
            company: self.company.trim().to_string(),
            item_id: if schema.has(Column::ItemId) {
                self.item_id.trim().to_string()
            } else {
                String::new()
            },
            item_name: self.item_name.trim().to_string(),
            quantity,
            unit,
            price_per_unit,
            currency,
            status,
        })
    }
}

/// Upper bound for a quantity or a unit price. Two bounded factors always
/// multiply without overflowing a `Decimal`.
pub(crate) const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Non-negative decimal no larger than [`MAX_AMOUNT`]; blank means zero.
pub(crate) fn parse_amount_field(
    field: &'static str,
    raw: &str,
) -> Result<Decimal, ValidationError> {
    let value = parse_decimal(raw).ok_or_else(|| ValidationError::InvalidNumber {
        field,
        value: raw.to_string(),
    })?;
    if value < Decimal::ZERO {
        return Err(ValidationError::Negative { field });
    }
    if value > Decimal::from(MAX_AMOUNT) {
        return Err(ValidationError::TooLarge { field });
    }
    Ok(value)
}

/// Split `company=Acme Trading qty=3 price=4.5` into pairs. A token without
/// `=` continues the previous value, so free-text values need no quoting.
pub(crate) fn parse_assignments(args: &str) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for token in args.split_whitespace() {
        match token.split_once('=') {
            Some((field, value)) if !field.is_empty() => {
                pairs.push((field.to_string(), value.to_string()));
            }
            _ => {
                if let Some((_, value)) = pairs.last_mut() {
                    if !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(token);
                }
            }
        }
    }
    pairs
}

pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    // Spreadsheet tools sometimes append a midnight time component
    let s = s.split_whitespace().next().unwrap_or("");
    let s = s.split('T').next().unwrap_or("");
    for fmt in &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%m-%d-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Blank parses as zero. Currency symbols and thousands separators are dropped.
pub(crate) fn parse_decimal(s: &str) -> Option<Decimal> {
    let cleaned = s
        .replace(['$', ',', '€', '£', '"'], "")
        .trim()
        .to_string();
    if cleaned.is_empty() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

#[cfg(test)]
#[path = "form_tests.rs"]
mod tests;
