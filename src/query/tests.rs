#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::RecordId;

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

#[allow(clippy::too_many_arguments)]
fn row(
    id: u64,
    date: NaiveDate,
    company: &str,
    item: &str,
    qty: Decimal,
    price: Decimal,
    currency: Currency,
    status: Option<PaymentStatus>,
) -> StoredRecord {
    StoredRecord {
        id: RecordId(id),
        record: Record {
            item_id: format!("{}-{id}", item.to_uppercase()),
            item_name: item.into(),
            quantity: qty,
            price_per_unit: price,
            currency,
            status,
            ..Record::new(date, company)
        },
    }
}

fn snapshot() -> Vec<StoredRecord> {
    use PaymentStatus::{Paid, Unpaid};
    vec![
        row(1, day(1, 5), "Acme", "flour", dec!(2), dec!(5.00), Currency::Usd, Some(Unpaid)),
        row(2, day(1, 20), "Beta", "salt", dec!(1), dec!(3.00), Currency::Eur, Some(Paid)),
        row(3, day(2, 1), "Acme", "sugar", dec!(1), dec!(10.00), Currency::Usd, Some(Paid)),
        row(4, day(2, 14), "acme corp", "oil", dec!(4), dec!(1.25), Currency::Eur, Some(Unpaid)),
        row(5, day(3, 2), "Gamma", "flour", dec!(3), dec!(2.00), Currency::Usd, Some(Unpaid)),
    ]
}

fn ids(view: &[&StoredRecord]) -> Vec<u64> {
    view.iter().map(|r| r.id.0).collect()
}

// ── filter ────────────────────────────────────────────────────

#[test]
fn test_default_filter_returns_everything_in_order() {
    let snap = snapshot();
    let view = filter(&snap, &Filter::default());
    assert_eq!(ids(&view), vec![1, 2, 3, 4, 5]);
    assert!(Filter::default().is_empty());
}

#[test]
fn test_filter_empty_snapshot() {
    assert!(filter(&[], &Filter::default()).is_empty());
}

#[test]
fn test_date_bounds_are_inclusive() {
    let snap = snapshot();
    let f = Filter {
        date_from: Some(day(1, 20)),
        date_to: Some(day(2, 14)),
        ..Filter::default()
    };
    assert_eq!(ids(&filter(&snap, &f)), vec![2, 3, 4]);
}

#[test]
fn test_company_contains_is_case_insensitive() {
    let snap = snapshot();
    let f = Filter {
        company: TextMatch::contains("ACME"),
        ..Filter::default()
    };
    assert_eq!(ids(&filter(&snap, &f)), vec![1, 3, 4]);
}

#[test]
fn test_blank_text_criterion_matches_everything() {
    assert!(TextMatch::contains("   ").is_none());
    assert!(TextMatch::pattern("").unwrap().is_none());
}

#[test]
fn test_pattern_criterion() {
    let snap = snapshot();
    let f = Filter {
        company: TextMatch::pattern("^acme$").unwrap(),
        ..Filter::default()
    };
    assert_eq!(ids(&filter(&snap, &f)), vec![1, 3]);
    assert!(TextMatch::pattern("(unclosed").is_err());
}

#[test]
fn test_criteria_combine_with_and() {
    let snap = snapshot();
    let f = Filter {
        company: TextMatch::contains("acme"),
        currencies: vec![Currency::Usd],
        statuses: vec![PaymentStatus::Unpaid],
        ..Filter::default()
    };
    assert_eq!(ids(&filter(&snap, &f)), vec![1]);
}

#[test]
fn test_item_filters() {
    let snap = snapshot();
    let by_name = Filter {
        item_name: TextMatch::contains("flour"),
        ..Filter::default()
    };
    assert_eq!(ids(&filter(&snap, &by_name)), vec![1, 5]);

    let by_id = Filter {
        item_id: TextMatch::contains("SALT-2"),
        ..Filter::default()
    };
    assert_eq!(ids(&filter(&snap, &by_id)), vec![2]);
}

#[test]
fn test_status_filter_excludes_statusless_rows() {
    let mut snap = snapshot();
    snap[0].record.status = None;
    let f = Filter {
        statuses: vec![PaymentStatus::Unpaid],
        ..Filter::default()
    };
    assert_eq!(ids(&filter(&snap, &f)), vec![4, 5]);
}

#[test]
fn test_unit_filter() {
    let mut snap = snapshot();
    snap[2].record.unit = Unit::Kilogram;
    let f = Filter {
        units: vec![Unit::Kilogram],
        ..Filter::default()
    };
    assert_eq!(ids(&filter(&snap, &f)), vec![3]);
}

#[test]
fn test_describe_lists_active_criteria() {
    let f = Filter {
        date_from: Some(day(1, 1)),
        company: TextMatch::contains("Acme"),
        currencies: vec![Currency::Usd, Currency::Eur],
        ..Filter::default()
    };
    assert_eq!(f.describe(), "from 2024-01-01 company~'acme' currency=USD|EUR");
    assert_eq!(Filter::default().describe(), "");
}

// ── aggregate ─────────────────────────────────────────────────

#[test]
fn test_group_totals_first_seen_order() {
    let snap = snapshot();
    let totals = group_totals(&snap, GroupBy::Company, Measure::TotalPrice);
    let labels: Vec<String> = totals.iter().map(|t| t.label()).collect();
    assert_eq!(labels, vec!["Acme", "Beta", "acme corp", "Gamma"]);
    assert_eq!(totals[0].total, dec!(20.00));
    assert_eq!(totals[0].count, 2);
}

#[test]
fn test_group_totals_sum_to_filtered_total() {
    let snap = snapshot();
    let f = Filter {
        date_from: Some(day(1, 10)),
        ..Filter::default()
    };
    let view = filter(&snap, &f);
    for group_by in GroupBy::all() {
        let totals = group_totals(view.iter().copied(), *group_by, Measure::TotalPrice);
        let grouped: Decimal = totals.iter().map(|t| t.total).sum();
        assert_eq!(grouped, sum(view.iter().copied(), Measure::TotalPrice));
    }
}

#[test]
fn test_group_by_company_and_currency() {
    let snap = snapshot();
    let totals = group_totals(&snap, GroupBy::CompanyCurrency, Measure::Quantity);
    assert_eq!(totals[0].key, vec!["Acme".to_string(), "USD".to_string()]);
    assert_eq!(totals[0].total, dec!(3));
    assert_eq!(totals.len(), 4);
}

#[test]
fn test_group_totals_empty_input() {
    assert!(group_totals(&[], GroupBy::Company, Measure::TotalPrice).is_empty());
}

#[test]
fn test_unpaid_total() {
    let snap = snapshot();
    // 10.00 + 5.00 + 6.00
    assert_eq!(unpaid_total(&snap), dec!(21.00));
}

#[test]
fn test_sums_saturate_instead_of_overflowing() {
    use PaymentStatus::Unpaid;
    let snap = vec![
        row(1, day(1, 5), "Acme", "gold", Decimal::MAX, dec!(2), Currency::Usd, Some(Unpaid)),
        row(2, day(1, 6), "Acme", "gold", Decimal::MAX, dec!(1), Currency::Usd, Some(Unpaid)),
    ];
    assert_eq!(snap[0].total_price(), Decimal::MAX);
    assert_eq!(sum(&snap, Measure::TotalPrice), Decimal::MAX);
    assert_eq!(sum(&snap, Measure::Quantity), Decimal::MAX);
    assert_eq!(unpaid_total(&snap), Decimal::MAX);
    assert_eq!(totals_by_currency(&snap), vec![(Currency::Usd, Decimal::MAX)]);
    assert_eq!(
        group_totals(&snap, GroupBy::Company, Measure::TotalPrice)[0].total,
        Decimal::MAX
    );
}

#[test]
fn test_totals_by_currency() {
    let snap = snapshot();
    let totals = totals_by_currency(&snap);
    assert_eq!(
        totals,
        vec![(Currency::Usd, dec!(26.00)), (Currency::Eur, dec!(8.00))]
    );
}

#[test]
fn test_group_by_parse_and_display() {
    assert_eq!(GroupBy::parse("cc"), Some(GroupBy::CompanyCurrency));
    assert_eq!(GroupBy::parse("Status"), Some(GroupBy::Status));
    assert_eq!(GroupBy::parse("colour"), None);
    assert_eq!(GroupBy::CompanyCurrency.to_string(), "Company + Currency");
}

// ── helpers ───────────────────────────────────────────────────

#[test]
fn test_distinct_values() {
    let snap = snapshot();
    assert_eq!(
        distinct_values(&snap, Column::Currency),
        vec!["USD".to_string(), "EUR".to_string()]
    );
    assert!(distinct_values(&[], Column::Company).is_empty());
}

#[test]
fn test_date_span() {
    let snap = snapshot();
    assert_eq!(date_span(&snap), Some((day(1, 5), day(3, 2))));
    assert_eq!(date_span(&[]), None);
}

// ── set / apply ───────────────────────────────────────────────

#[test]
fn test_set_parses_each_field() {
    let mut f = Filter::default();
    f.set("from", "2024-01-10", false).unwrap();
    f.set("to", "02/14/2024", false).unwrap();
    f.set("currency", "usd, eur", false).unwrap();
    f.set("status", "unpaid", false).unwrap();
    f.set("unit", "kg", false).unwrap();
    assert_eq!(f.date_from, Some(day(1, 10)));
    assert_eq!(f.date_to, Some(day(2, 14)));
    assert_eq!(f.currencies, vec![Currency::Usd, Currency::Eur]);
    assert_eq!(f.statuses, vec![PaymentStatus::Unpaid]);
    assert_eq!(f.units, vec![Unit::Kilogram]);

    f.set("currency", "", false).unwrap();
    assert!(f.currencies.is_empty());
}

#[test]
fn test_set_slashed_value_is_pattern() {
    let snap = snapshot();
    let mut f = Filter::default();
    f.set("company", "/^(beta|gamma)$/", false).unwrap();
    assert_eq!(ids(&filter(&snap, &f)), vec![2, 5]);

    let mut forced = Filter::default();
    forced.set("item", "^s", true).unwrap();
    assert_eq!(ids(&filter(&snap, &forced)), vec![2, 3]);
}

#[test]
fn test_set_rejects_bad_values() {
    let mut f = Filter::default();
    assert!(matches!(
        f.set("from", "soon", false),
        Err(ValidationError::InvalidDate(_))
    ));
    assert!(matches!(
        f.set("currency", "usd,doge", false),
        Err(ValidationError::UnknownCurrency(_))
    ));
    assert!(matches!(
        f.set("company", "(", true),
        Err(ValidationError::InvalidPattern(_))
    ));
    assert!(matches!(
        f.set("colour", "red", false),
        Err(ValidationError::UnknownField(_))
    ));
    assert!(f.is_empty());
}

#[test]
fn test_apply_is_all_or_nothing() {
    let mut f = Filter::default();
    f.apply("company=Acme Trading status=paid").unwrap();
    assert_eq!(f.company.as_ref().unwrap().as_str(), "acme trading");
    assert_eq!(f.statuses, vec![PaymentStatus::Paid]);

    assert!(f.apply("company=beta currency=xyz").is_err());
    assert_eq!(f.company.as_ref().unwrap().as_str(), "acme trading");
}

// ── scenario ──────────────────────────────────────────────────

#[test]
fn test_company_filter_keeps_both_acme_rows() {
    let snap = vec![
        row(1, day(1, 1), "Acme", "a", dec!(2), dec!(5.00), Currency::Usd, Some(PaymentStatus::Unpaid)),
        row(2, day(1, 2), "Acme", "b", dec!(1), dec!(10.00), Currency::Usd, Some(PaymentStatus::Paid)),
    ];
    let f = Filter {
        company: TextMatch::contains("Acme"),
        ..Filter::default()
    };
    let view = filter(&snap, &f);
    assert_eq!(ids(&view), vec![1, 2]);
    let totals = group_totals(view.iter().copied(), GroupBy::Company, Measure::TotalPrice);
    assert_eq!(totals.len(), 1);
    assert_eq!(totals[0].total, dec!(20.00));
    assert_eq!(unpaid_total(view.iter().copied()), dec!(10.00));
}
