use rust_decimal::Decimal;

use crate::models::Currency;

/// Group digits with thousands separators and show 2 decimal places.
/// e.g. `1234567.891` → `"1,234,567.89"`
fn grouped(val: Decimal) -> String {
    let formatted = format!("{:.2}", val.abs());
    let mut parts = formatted.split('.');
    let int_part = parts.next().unwrap_or("0");
    let dec_part = parts.next().unwrap_or("00");

    let with_commas: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    format!("{with_commas}.{dec_part}")
}

/// Amount in a currency: symbol prefix where one exists, ISO code suffix
/// otherwise. `(-42.5, USD)` → `"-$42.50"`, `(1200, IRR)` → `"1,200.00 IRR"`.
pub(crate) fn format_money(val: Decimal, currency: Currency) -> String {
    let sign = if val < Decimal::ZERO { "-" } else { "" };
    let body = grouped(val);
    match currency.symbol() {
        Some(symbol) => format!("{sign}{symbol}{body}"),
        None => format!("{sign}{body} {currency}"),
    }
}

/// Quantities keep every significant digit but drop trailing zeros.
pub(crate) fn format_quantity(val: Decimal) -> String {
    val.normalize().to_string()
}

/// Per-currency totals joined with " + ". Amounts are never converted, so a
/// mixed view shows one figure per currency.
pub(crate) fn format_totals(totals: &[(Currency, Decimal)]) -> String {
    if totals.is_empty() {
        return format_money(Decimal::ZERO, Currency::default());
    }
    totals
        .iter()
        .map(|(currency, total)| format_money(*total, *currency))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
/// The result is guaranteed to be at most `max` characters (counting "…" as one).
/// Safe for multi-byte UTF-8 characters.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let char_count = s.chars().count();
    if char_count <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{truncated}…")
}

/// Move a list cursor down by one, adjusting scroll to keep cursor visible.
pub(crate) fn scroll_down(index: &mut usize, scroll: &mut usize, len: usize, page: usize) {
    if *index + 1 < len {
        *index += 1;
        if *index >= *scroll + page {
            *scroll = index.saturating_sub(page.saturating_sub(1));
        }
    }
}

/// Move a list cursor up by one, adjusting scroll to keep cursor visible.
pub(crate) fn scroll_up(index: &mut usize, scroll: &mut usize) {
    *index = index.saturating_sub(1);
    if *index < *scroll {
        *scroll = *index;
    }
}

pub(crate) fn scroll_to_top(index: &mut usize, scroll: &mut usize) {
    *index = 0;
    *scroll = 0;
}

pub(crate) fn scroll_to_bottom(index: &mut usize, scroll: &mut usize, len: usize, page: usize) {
    if len > 0 {
        *index = len - 1;
        *scroll = index.saturating_sub(page.saturating_sub(1));
    }
}

/// Keep a cursor inside a list that may have shrunk.
pub(crate) fn clamp_cursor(index: &mut usize, scroll: &mut usize, len: usize) {
    if *index >= len {
        *index = len.saturating_sub(1);
    }
    if *scroll > *index {
        *scroll = *index;
    }
}
