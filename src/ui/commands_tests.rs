#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;
use std::path::PathBuf;

use crate::config::Config;
use crate::models::PaymentStatus;

fn setup(ledger: LedgerKind, export_dir: PathBuf) -> (App, RecordStore) {
    let config = Config {
        data_dir: export_dir.clone(),
        export_dir,
        ledger,
        in_memory: true,
    };
    let store = config.open_store(ledger).unwrap();
    let mut app = App::new(config);
    app.refresh(&store);
    (app, store)
}

fn expenses() -> (App, RecordStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut store) = setup(LedgerKind::Expenses, dir.path().to_path_buf());
    for line in [
        "add date=2024-01-05 company=Acme item=Flour qty=2 price=5.00",
        "add date=2024-01-06 company=Acme item=Sugar qty=1 price=10.00 status=paid",
        "add date=2024-01-07 company=Beta item=Salt qty=3 price=1.50 currency=EUR",
    ] {
        handle_command(line, &mut app, &mut store);
    }
    (app, store, dir)
}

// ── Registry ──────────────────────────────────────────────────

#[test]
fn test_unknown_command_suggests_closest() {
    let (mut app, mut store, _dir) = expenses();
    handle_command("expor", &mut app, &mut store);
    assert!(app.status_message.contains("Did you mean :export?"));
}

#[test]
fn test_levenshtein() {
    assert_eq!(levenshtein("filter", "filter"), 0);
    assert_eq!(levenshtein("fitler", "filter"), 2);
    assert_eq!(levenshtein("", "pay"), 3);
}

#[test]
fn test_screen_commands() {
    let (mut app, mut store, _dir) = expenses();
    handle_command("records", &mut app, &mut store);
    assert_eq!(app.screen, Screen::Records);
    handle_command("s", &mut app, &mut store);
    assert_eq!(app.screen, Screen::Summary);
    handle_command("q", &mut app, &mut store);
    assert!(!app.running);
}

// ── Add / edit / delete ───────────────────────────────────────

#[test]
fn test_add_appends_and_refreshes() {
    let (app, store, _dir) = expenses();
    assert_eq!(store.len(), 3);
    assert_eq!(app.records.len(), 3);
    assert_eq!(app.records[0].status, Some(PaymentStatus::Unpaid));
    assert_eq!(app.records[1].status, Some(PaymentStatus::Paid));
}

#[test]
fn test_add_rejects_invalid_input_without_mutation() {
    let (mut app, mut store, _dir) = expenses();
    handle_command("add company=Acme qty=-1", &mut app, &mut store);
    assert_eq!(store.len(), 3);
    assert!(app.status_message.starts_with("Error:"));
    assert!(app.running);
}

#[test]
fn test_edit_without_args_prefills_editor() {
    let (mut app, mut store, _dir) = expenses();
    handle_command("edit", &mut app, &mut store);
    assert_eq!(app.input_mode, InputMode::Editing);
    assert_eq!(app.editing, Some(store.all()[0].id));
    assert!(app.command_input.contains("company=Acme"));
    assert!(app.command_input.contains("status=Unpaid"));
}

#[test]
fn test_edit_with_args_updates_selected() {
    let (mut app, mut store, _dir) = expenses();
    app.record_index = 2;
    handle_command("edit price=2.00", &mut app, &mut store);
    assert_eq!(store.all()[2].price_per_unit, dec!(2.00));
    assert_eq!(store.all()[2].total_price(), dec!(6.00));
    assert_eq!(store.all()[2].company, "Beta");
}

#[test]
fn test_delete_asks_for_confirmation() {
    let (mut app, mut store, _dir) = expenses();
    app.record_index = 1;
    handle_command("delete", &mut app, &mut store);
    assert_eq!(app.input_mode, InputMode::Confirm);
    assert!(matches!(
        app.pending_action,
        Some(PendingAction::DeleteRecord { id, .. }) if id == store.all()[1].id
    ));
    assert_eq!(store.len(), 3);
}

// ── Status ────────────────────────────────────────────────────

#[test]
fn test_pay_all_collects_unpaid_in_view() {
    let (mut app, mut store, _dir) = expenses();
    handle_command("filter company=acme", &mut app, &mut store);
    handle_command("pay-all", &mut app, &mut store);
    match &app.pending_action {
        Some(PendingAction::MarkPaid { ids }) => {
            assert_eq!(ids.len(), 1);
            assert!(ids.contains(&store.all()[0].id));
        }
        other => panic!("expected MarkPaid, got {other:?}"),
    }
}

#[test]
fn test_pay_all_on_invoices_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut store) = setup(LedgerKind::Invoices, dir.path().to_path_buf());
    handle_command("add company=Acme qty=1 price=1", &mut app, &mut store);
    handle_command("pay-all", &mut app, &mut store);
    assert!(app.pending_action.is_none());
    assert!(app.status_message.contains("no Status column"));
}

#[test]
fn test_toggle_flips_selected() {
    let (mut app, mut store, _dir) = expenses();
    handle_command("toggle", &mut app, &mut store);
    assert_eq!(store.all()[0].status, Some(PaymentStatus::Paid));
    handle_command("t", &mut app, &mut store);
    assert_eq!(store.all()[0].status, Some(PaymentStatus::Unpaid));
}

// ── Filters ───────────────────────────────────────────────────

#[test]
fn test_filter_and_clear() {
    let (mut app, mut store, _dir) = expenses();
    handle_command("filter currency=eur", &mut app, &mut store);
    assert_eq!(app.records.len(), 1);
    assert_eq!(app.records[0].company, "Beta");

    handle_command("clear", &mut app, &mut store);
    assert!(app.filter.is_empty());
    assert_eq!(app.records.len(), 3);
}

#[test]
fn test_bad_filter_keeps_previous_criteria() {
    let (mut app, mut store, _dir) = expenses();
    handle_command("filter company=acme", &mut app, &mut store);
    handle_command("filter status=overdue", &mut app, &mut store);
    assert!(app.status_message.starts_with("Error:"));
    assert_eq!(app.records.len(), 2);
}

#[test]
fn test_date_bounds() {
    let (mut app, mut store, _dir) = expenses();
    handle_command("from 2024-01-06", &mut app, &mut store);
    handle_command("to 2024-01-06", &mut app, &mut store);
    assert_eq!(app.records.len(), 1);
    assert_eq!(app.records[0].item_name, "Sugar");

    handle_command("from", &mut app, &mut store);
    assert!(app.filter.date_from.is_none());
    assert_eq!(app.records.len(), 2);
}

#[test]
fn test_owed_totals_follow_view() {
    let (app, _store, _dir) = expenses();
    assert_eq!(app.unpaid_count, 2);
    assert!(app
        .owed_totals
        .contains(&(crate::models::Currency::Usd, dec!(10.00))));
}

// ── Group / ledger ────────────────────────────────────────────

#[test]
fn test_group_cycles_and_parses() {
    let (mut app, mut store, _dir) = expenses();
    handle_command("group", &mut app, &mut store);
    assert_eq!(app.group_by, GroupBy::CompanyCurrency);
    assert_eq!(app.screen, Screen::Summary);

    handle_command("group currency", &mut app, &mut store);
    assert_eq!(app.group_by, GroupBy::Currency);
    assert_eq!(app.group_totals.len(), 2);

    handle_command("group weekday", &mut app, &mut store);
    assert_eq!(app.group_by, GroupBy::Currency);
}

#[test]
fn test_ledger_switch_resets_filter() {
    let (mut app, mut store, _dir) = expenses();
    handle_command("filter company=acme", &mut app, &mut store);
    handle_command("ledger invoices", &mut app, &mut store);
    assert_eq!(app.ledger, LedgerKind::Invoices);
    assert!(app.filter.is_empty());
    assert!(store.is_empty());
    assert!(!store.schema().has_status());
}

#[test]
fn test_ledger_switch_keeps_session_records() {
    let (mut app, mut store, _dir) = expenses();
    handle_command("ledger invoices", &mut app, &mut store);
    assert!(store.is_empty());
    handle_command("add company=Acme id=F-1 item=Flour qty=1 price=2", &mut app, &mut store);

    handle_command("ledger", &mut app, &mut store);
    assert_eq!(app.ledger, LedgerKind::Expenses);
    assert_eq!(store.len(), 3);
    assert_eq!(app.records.len(), 3);

    handle_command("ledger expenses", &mut app, &mut store);
    assert_eq!(store.len(), 3);

    handle_command("ledger invoices", &mut app, &mut store);
    assert_eq!(store.len(), 1);
    assert_eq!(store.all()[0].item_id, "F-1");
}

#[test]
fn test_ledger_switch_reopens_file_backed_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        export_dir: dir.path().to_path_buf(),
        ledger: LedgerKind::Expenses,
        in_memory: false,
    };
    let mut store = config.open_store(LedgerKind::Expenses).unwrap();
    let mut app = App::new(config);
    app.refresh(&store);
    handle_command("add company=Acme item=Flour qty=1 price=2", &mut app, &mut store);

    handle_command("ledger invoices", &mut app, &mut store);
    assert!(app.parked.is_none());
    handle_command("ledger expenses", &mut app, &mut store);
    assert_eq!(store.len(), 1);
    assert!(store.path().is_some());
}

// ── Import / export ───────────────────────────────────────────

#[test]
fn test_export_view_and_summary() {
    let (mut app, mut store, dir) = expenses();
    handle_command("filter company=acme", &mut app, &mut store);
    handle_command("export", &mut app, &mut store);
    let text = std::fs::read_to_string(dir.path().join(sheet::EXPENSES_EXPORT)).unwrap();
    assert_eq!(text.lines().count(), 3);
    assert!(!text.contains("Beta"));

    handle_command("export summary", &mut app, &mut store);
    let summary = std::fs::read_to_string(dir.path().join(sheet::SUMMARY_EXPORT)).unwrap();
    assert_eq!(summary, "Subject,Total Owed,Rows\nAcme,20.00,2\n");
}

#[test]
fn test_import_confirms_before_appending() {
    let (mut app, mut store, dir) = expenses();
    handle_command("export", &mut app, &mut store);
    let path = dir.path().join(sheet::EXPENSES_EXPORT);

    handle_command(&format!("import {}", path.display()), &mut app, &mut store);
    assert_eq!(store.len(), 3);
    match &app.pending_action {
        Some(PendingAction::Import { records, .. }) => assert_eq!(records.len(), 3),
        other => panic!("expected Import, got {other:?}"),
    }
}

#[test]
fn test_import_missing_file_reports_error() {
    let (mut app, mut store, _dir) = expenses();
    handle_command("import /definitely/not/here.csv", &mut app, &mut store);
    assert!(app.pending_action.is_none());
    assert!(app.status_message.contains("Could not import"));
}
