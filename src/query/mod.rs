//! Stateless filtering and aggregation over a store snapshot.

mod aggregate;

pub(crate) use aggregate::{
    group_totals, sum, totals_by_currency, unpaid_total, GroupBy, GroupTotal, Measure,
};

use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};

use crate::error::ValidationError;
use crate::form::{parse_assignments, parse_date};
use crate::models::{Column, Currency, PaymentStatus, Record, StoredRecord, Unit};

/// Case-insensitive text criterion.
#[derive(Debug, Clone)]
pub(crate) enum TextMatch {
    Contains(String),
    Pattern(Regex),
}

impl TextMatch {
    /// Blank input is no criterion at all.
    pub(crate) fn contains(needle: &str) -> Option<Self> {
        let needle = needle.trim();
        if needle.is_empty() {
            None
        } else {
            Some(Self::Contains(needle.to_lowercase()))
        }
    }

    pub(crate) fn pattern(pattern: &str) -> Result<Option<Self>, regex::Error> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Ok(None);
        }
        let re = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Some(Self::Pattern(re)))
    }

    pub(crate) fn is_match(&self, haystack: &str) -> bool {
        match self {
            Self::Contains(needle) => haystack.to_lowercase().contains(needle.as_str()),
            Self::Pattern(re) => re.is_match(haystack),
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        match self {
            Self::Contains(needle) => needle,
            Self::Pattern(re) => re.as_str(),
        }
    }
}

/// Conjunction of optional criteria. `Filter::default()` matches everything.
#[derive(Debug, Clone, Default)]
pub(crate) struct Filter {
    pub(crate) date_from: Option<NaiveDate>,
    pub(crate) date_to: Option<NaiveDate>,
    pub(crate) company: Option<TextMatch>,
    pub(crate) item_id: Option<TextMatch>,
    pub(crate) item_name: Option<TextMatch>,
    pub(crate) units: Vec<Unit>,
    pub(crate) currencies: Vec<Currency>,
    pub(crate) statuses: Vec<PaymentStatus>,
}

impl Filter {
    pub(crate) fn matches(&self, record: &Record) -> bool {
        if self.date_from.is_some_and(|from| record.date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| record.date > to) {
            return false;
        }
        if !text_matches(&self.company, &record.company)
            || !text_matches(&self.item_id, &record.item_id)
            || !text_matches(&self.item_name, &record.item_name)
        {
            return false;
        }
        if !self.units.is_empty() && !self.units.contains(&record.unit) {
            return false;
        }
        if !self.currencies.is_empty() && !self.currencies.contains(&record.currency) {
            return false;
        }
        if !self.statuses.is_empty()
            && !record.status.is_some_and(|s| self.statuses.contains(&s))
        {
            return false;
        }
        true
    }

    /// Set one criterion from text, e.g. `("company", "acme")` or
    /// `("currency", "usd,eur")`. A blank value clears the criterion. Text
    /// values wrapped in slashes (`/^ac/`) are patterns; `regex` forces that.
    pub(crate) fn set(
        &mut self,
        field: &str,
        value: &str,
        regex: bool,
    ) -> Result<(), ValidationError> {
        let value = value.trim();
        match field.trim().to_lowercase().as_str() {
            "from" | "date-from" => self.date_from = parse_bound(value)?,
            "to" | "date-to" => self.date_to = parse_bound(value)?,
            "company" | "subject" | "c" => self.company = text_criterion(value, regex)?,
            "item-id" | "item_id" | "id" => self.item_id = text_criterion(value, regex)?,
            "item" | "item-name" | "item_name" | "name" => {
                self.item_name = text_criterion(value, regex)?;
            }
            "unit" | "u" => self.units = split_list(value).map(Unit::parse).collect(),
            "currency" | "cur" => {
                self.currencies = split_list(value)
                    .map(|v| {
                        Currency::parse(v).ok_or_else(|| ValidationError::UnknownCurrency(v.into()))
                    })
                    .collect::<Result<_, _>>()?;
            }
            "status" | "s" => {
                self.statuses = split_list(value)
                    .map(|v| {
                        PaymentStatus::parse(v).ok_or_else(|| ValidationError::UnknownStatus(v.into()))
                    })
                    .collect::<Result<_, _>>()?;
            }
            other => return Err(ValidationError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    /// Apply `field=value` assignments as typed on a command line. Nothing
    /// changes unless every assignment is valid.
    pub(crate) fn apply(&mut self, args: &str) -> Result<(), ValidationError> {
        let mut next = self.clone();
        for (field, value) in parse_assignments(args) {
            next.set(&field, &value, false)?;
        }
        *self = next;
        Ok(())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.date_from.is_none()
            && self.date_to.is_none()
            && self.company.is_none()
            && self.item_id.is_none()
            && self.item_name.is_none()
            && self.units.is_empty()
            && self.currencies.is_empty()
            && self.statuses.is_empty()
    }

    /// Short human description of the active criteria, for titles and logs.
    pub(crate) fn describe(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        match (self.date_from, self.date_to) {
            (Some(from), Some(to)) => parts.push(format!("{from}..{to}")),
            (Some(from), None) => parts.push(format!("from {from}")),
            (None, Some(to)) => parts.push(format!("to {to}")),
            (None, None) => {}
        }
        if let Some(m) = &self.company {
            parts.push(format!("company~'{}'", m.as_str()));
        }
        if let Some(m) = &self.item_id {
            parts.push(format!("id~'{}'", m.as_str()));
        }
        if let Some(m) = &self.item_name {
            parts.push(format!("item~'{}'", m.as_str()));
        }
        if !self.units.is_empty() {
            parts.push(join_labels("unit", self.units.iter().map(|u| u.as_str())));
        }
        if !self.currencies.is_empty() {
            parts.push(join_labels("currency", self.currencies.iter().map(|c| c.as_str())));
        }
        if !self.statuses.is_empty() {
            parts.push(join_labels("status", self.statuses.iter().map(|s| s.as_str())));
        }
        parts.join(" ")
    }
}

fn join_labels<'a>(name: &str, labels: impl Iterator<Item = &'a str>) -> String {
    format!("{name}={}", labels.collect::<Vec<_>>().join("|"))
}

fn parse_bound(value: &str) -> Result<Option<NaiveDate>, ValidationError> {
    if value.is_empty() {
        return Ok(None);
    }
    parse_date(value)
        .map(Some)
        .ok_or_else(|| ValidationError::InvalidDate(value.to_string()))
}

fn text_criterion(value: &str, regex: bool) -> Result<Option<TextMatch>, ValidationError> {
    let slashed = value
        .strip_prefix('/')
        .and_then(|v| v.strip_suffix('/'))
        .filter(|v| !v.is_empty());
    let pattern = match slashed {
        Some(pattern) => pattern,
        None if regex => value,
        None => return Ok(TextMatch::contains(value)),
    };
    TextMatch::pattern(pattern).map_err(|e| ValidationError::InvalidPattern(e.to_string()))
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|v| !v.is_empty())
}

fn text_matches(criterion: &Option<TextMatch>, value: &str) -> bool {
    criterion.as_ref().map_or(true, |m| m.is_match(value))
}

/// The ordered subsequence of `snapshot` matching every criterion.
pub(crate) fn filter<'a>(
    snapshot: &'a [StoredRecord],
    criteria: &Filter,
) -> Vec<&'a StoredRecord> {
    let view: Vec<&StoredRecord> = snapshot.iter().filter(|r| criteria.matches(r)).collect();
    tracing::debug!(
        total = snapshot.len(),
        matched = view.len(),
        criteria = %criteria.describe(),
        "filtered records"
    );
    view
}

/// Unique cell values of `column`, in first-seen order.
pub(crate) fn distinct_values<'a, I>(records: I, column: Column) -> Vec<String>
where
    I: IntoIterator<Item = &'a StoredRecord>,
{
    let mut seen: Vec<String> = Vec::new();
    for record in records {
        let value = column.cell(record);
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

/// Earliest and latest record dates; the default bounds of a date filter.
pub(crate) fn date_span<'a, I>(records: I) -> Option<(NaiveDate, NaiveDate)>
where
    I: IntoIterator<Item = &'a StoredRecord>,
{
    records.into_iter().fold(None, |span, r| match span {
        None => Some((r.date, r.date)),
        Some((lo, hi)) => Some((lo.min(r.date), hi.max(r.date))),
    })
}

#[cfg(test)]
mod tests;
