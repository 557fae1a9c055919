#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

use crate::models::{Currency, LedgerKind, Schema};
use crate::query::TextMatch;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn expenses() -> RecordStore {
    let mut store = RecordStore::in_memory(Schema::expenses());
    cli_add(&args(&["date=2024-01-05", "company=Acme", "item=Flour", "qty=2", "price=5.00"]), &mut store)
        .unwrap();
    cli_add(
        &args(&["date=2024-01-06", "company=Acme", "item=Sugar", "qty=1", "price=10", "status=paid"]),
        &mut store,
    )
    .unwrap();
    cli_add(
        &args(&["date=2024-02-01", "company=Beta", "Trading", "item=Salt", "qty=3", "price=1.5", "currency=eur"]),
        &mut store,
    )
    .unwrap();
    store
}

fn config_in(dir: &Path, ledger: LedgerKind) -> Config {
    Config {
        data_dir: dir.to_path_buf(),
        export_dir: dir.to_path_buf(),
        ledger,
        in_memory: false,
    }
}

// ── Flags ─────────────────────────────────────────────────────

#[test]
fn test_parse_flags_builds_filter() {
    let flags = parse_flags(&args(&[
        "--from",
        "2024-01-01",
        "--company",
        "acme",
        "--currency",
        "usd,eur",
        "--group",
        "currency",
        "--summary",
    ]))
    .unwrap();
    assert!(flags.filter.date_from.is_some());
    assert!(matches!(flags.filter.company, Some(TextMatch::Contains(_))));
    assert_eq!(flags.filter.currencies, vec![Currency::Usd, Currency::Eur]);
    assert_eq!(flags.group_by, Some(GroupBy::Currency));
    assert!(flags.summary);
}

#[test]
fn test_parse_flags_regex_applies_anywhere() {
    let flags = parse_flags(&args(&["--item", "^s", "--regex"])).unwrap();
    assert!(matches!(flags.filter.item_name, Some(TextMatch::Pattern(_))));
}

#[test]
fn test_parse_flags_errors() {
    assert!(parse_flags(&args(&["--company"])).is_err());
    assert!(parse_flags(&args(&["--status", "overdue"])).is_err());
    assert!(parse_flags(&args(&["--colour", "red"])).is_err());
    assert!(parse_flags(&args(&["acme"])).is_err());
    assert!(parse_flags(&args(&["--item", "(", "--regex"])).is_err());
}

#[test]
fn test_parse_position_is_one_based() {
    let store = expenses();
    assert_eq!(parse_position(Some(&"1".to_string()), &store).unwrap(), 0);
    assert_eq!(parse_position(Some(&"3".to_string()), &store).unwrap(), 2);
    assert!(parse_position(Some(&"0".to_string()), &store).is_err());
    assert!(parse_position(Some(&"4".to_string()), &store).is_err());
    assert!(parse_position(Some(&"x".to_string()), &store).is_err());
    assert!(parse_position(None, &store).is_err());
}

// ── Mutating commands ─────────────────────────────────────────

#[test]
fn test_add_joins_free_text_values() {
    let store = expenses();
    assert_eq!(store.len(), 3);
    assert_eq!(store.all()[2].company, "Beta Trading");
    assert_eq!(store.all()[2].currency, Currency::Eur);
    assert_eq!(store.all()[2].total_price(), dec!(4.5));
}

#[test]
fn test_add_rejects_negative() {
    let mut store = expenses();
    assert!(cli_add(&args(&["company=Acme", "qty=-3"]), &mut store).is_err());
    assert_eq!(store.len(), 3);
}

#[test]
fn test_edit_and_delete_by_position() {
    let mut store = expenses();
    cli_edit(&args(&["2", "price=12.5"]), &mut store).unwrap();
    assert_eq!(store.all()[1].price_per_unit, dec!(12.5));
    assert_eq!(store.all()[1].item_name, "Sugar");

    cli_delete(&args(&["1"]), &mut store).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.all()[0].item_name, "Sugar");
    assert!(cli_delete(&args(&["3"]), &mut store).is_err());
}

#[test]
fn test_pay_with_filter_is_idempotent() {
    let mut store = expenses();
    cli_pay(&args(&["--company", "acme"]), &mut store).unwrap();
    assert_eq!(store.all()[0].status, Some(PaymentStatus::Paid));
    assert_eq!(store.all()[2].status, Some(PaymentStatus::Unpaid));

    let before = store.all().to_vec();
    cli_pay(&args(&["--company", "acme"]), &mut store).unwrap();
    assert_eq!(store.all(), before.as_slice());
}

#[test]
fn test_status_command() {
    let mut store = expenses();
    cli_status(&args(&["2", "unpaid"]), &mut store).unwrap();
    assert_eq!(store.all()[1].status, Some(PaymentStatus::Unpaid));
    assert!(cli_status(&args(&["2", "later"]), &mut store).is_err());
}

#[test]
fn test_status_commands_need_status_column() {
    let mut store = RecordStore::in_memory(Schema::invoices());
    cli_add(&args(&["company=Acme", "qty=1", "price=1"]), &mut store).unwrap();
    assert!(cli_pay(&[], &mut store).is_err());
    assert!(cli_status(&args(&["1", "paid"]), &mut store).is_err());
    assert!(store.all()[0].status.is_none());
}

// ── Files ─────────────────────────────────────────────────────

#[test]
fn test_export_then_import_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), LedgerKind::Expenses);
    let store = expenses();

    cli_export(&args(&["--currency", "usd"]), &config, &store).unwrap();
    let path = dir.path().join(sheet::EXPENSES_EXPORT);
    assert!(path.exists());

    let mut fresh = RecordStore::in_memory(Schema::expenses());
    cli_import(&[path.display().to_string()], &mut fresh).unwrap();
    assert_eq!(fresh.len(), 2);
    assert_eq!(fresh.all()[0].record, store.all()[0].record);
}

#[test]
fn test_export_summary_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), LedgerKind::Expenses);
    let store = expenses();

    cli_export(&args(&["--summary", "--group", "company"]), &config, &store).unwrap();
    let text = std::fs::read_to_string(dir.path().join(sheet::SUMMARY_EXPORT)).unwrap();
    assert_eq!(
        text,
        "Subject,Total Owed,Rows\nAcme,20.00,2\nBeta Trading,4.5,1\n"
    );
}

#[test]
fn test_import_missing_file_fails() {
    let mut store = expenses();
    assert!(cli_import(&args(&["/no/such/upload.csv"]), &mut store).is_err());
    assert!(cli_import(&[], &mut store).is_err());
    assert_eq!(store.len(), 3);
}

#[test]
fn test_as_cli_persists_to_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), LedgerKind::Invoices);
    as_cli(
        &args(&["tallytui", "add", "company=Acme", "id=F-1", "item=Flour", "qty=2", "price=3"]),
        &config,
    )
    .unwrap();

    let reopened = config.open_store(LedgerKind::Invoices).unwrap();
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.all()[0].item_id, "F-1");
    assert!(as_cli(&args(&["tallytui", "frobnicate"]), &config).is_err());
}

#[test]
fn test_format_line() {
    let store = expenses();
    let line = format_line(3, &store.all()[2], true);
    assert!(line.starts_with("   3 2024-02-01 Beta Trading"));
    assert!(line.contains("€4.50"));
    assert!(line.ends_with("  Unpaid"));
}

#[test]
fn test_join_labels_lists_values() {
    assert_eq!(join_labels(PaymentStatus::all()), "Unpaid, Paid");
    assert!(join_labels(&Unit::presets()).starts_with("Carton, Box"));
}
