use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::Context;

use super::app::{App, InputMode, PendingAction, Screen};
use crate::config::expand_home;
use crate::form::RecordForm;
use crate::models::{LedgerKind, RecordId};
use crate::query::GroupBy;
use crate::sheet;
use crate::store::RecordStore;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut RecordStore) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit TallyTUI", cmd_quit, r);
    register_command!("quit", "Quit TallyTUI", cmd_quit, r);
    register_command!("d", "Go to Dashboard", cmd_dashboard, r);
    register_command!("dashboard", "Go to Dashboard", cmd_dashboard, r);
    register_command!("r", "Go to Records", cmd_records, r);
    register_command!("records", "Go to Records", cmd_records, r);
    register_command!("s", "Go to Summary", cmd_summary, r);
    register_command!("summary", "Go to Summary", cmd_summary, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!(
        "add",
        "Add a record (e.g. :add company=Acme item=Flour qty=2 price=5)",
        cmd_add,
        r
    );
    register_command!("a", "Add a record (e.g. :a company=Acme qty=2)", cmd_add, r);
    register_command!(
        "edit",
        "Edit selected record (e.g. :edit price=4.75)",
        cmd_edit,
        r
    );
    register_command!("e", "Edit selected record", cmd_edit, r);
    register_command!("delete", "Delete selected record", cmd_delete, r);
    register_command!("del", "Delete selected record", cmd_delete, r);
    register_command!(
        "pay-all",
        "Mark every unpaid record in the view as paid",
        cmd_pay_all,
        r
    );
    register_command!("pay", "Mark every unpaid record in the view as paid", cmd_pay_all, r);
    register_command!("toggle", "Flip paid/unpaid on selected record", cmd_toggle, r);
    register_command!("t", "Flip paid/unpaid on selected record", cmd_toggle, r);
    register_command!(
        "filter",
        "Filter the view (e.g. :filter company=acme currency=usd,eur)",
        cmd_filter,
        r
    );
    register_command!("f", "Filter the view (e.g. :f status=unpaid)", cmd_filter, r);
    register_command!("from", "Set start date (e.g. :from 2024-01-01)", cmd_from, r);
    register_command!("to", "Set end date (e.g. :to 2024-03-31)", cmd_to, r);
    register_command!("clear", "Clear every filter", cmd_clear, r);
    register_command!(
        "ledger",
        "Switch ledger (e.g. :ledger expenses)",
        cmd_ledger,
        r
    );
    register_command!("l", "Switch ledger", cmd_ledger, r);
    register_command!(
        "import",
        "Import a spreadsheet (e.g. :import ~/upload.csv)",
        cmd_import,
        r
    );
    register_command!("i", "Import a spreadsheet", cmd_import, r);
    register_command!(
        "export",
        "Export the view, or totals with :export summary",
        cmd_export,
        r
    );
    register_command!("x", "Export the view", cmd_export, r);
    register_command!(
        "group",
        "Group summary by company, company-currency, currency, status or unit",
        cmd_group,
        r
    );
    register_command!("g", "Cycle summary grouping", cmd_group, r);

    r
});

/// Run one command line. Failures land in the status bar and the log; only
/// a broken terminal ends the session.
pub(crate) fn handle_command(input: &str, app: &mut App, store: &mut RecordStore) {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if cmd_name.is_empty() {
        return;
    }

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        if let Err(e) = (cmd.run)(args, app, store) {
            tracing::warn!(command = cmd_name, error = %format!("{e:#}"), "command failed");
            app.set_status(format!("Error: {e:#}"));
        }
    } else {
        // Try fuzzy match
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Validate `args` on top of the stored record and write it back.
pub(crate) fn apply_edit(
    id: RecordId,
    args: &str,
    app: &mut App,
    store: &mut RecordStore,
) -> anyhow::Result<()> {
    let current = store
        .get(id)
        .with_context(|| format!("Record {id} no longer exists"))?;
    let mut form = RecordForm::from_record(current);
    form.apply(args)?;
    let record = form.validate(store.schema())?;
    store.update_by_id(id, record)?;
    app.refresh(store);
    app.set_status(format!("Updated record {id}"));
    Ok(())
}

fn confirm(app: &mut App, message: String, action: PendingAction) {
    app.confirm_message = message;
    app.pending_action = Some(action);
    app.input_mode = InputMode::Confirm;
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _store: &mut RecordStore) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_dashboard(_args: &str, app: &mut App, _store: &mut RecordStore) -> anyhow::Result<()> {
    app.screen = Screen::Dashboard;
    Ok(())
}

fn cmd_records(_args: &str, app: &mut App, _store: &mut RecordStore) -> anyhow::Result<()> {
    app.screen = Screen::Records;
    Ok(())
}

fn cmd_summary(_args: &str, app: &mut App, _store: &mut RecordStore) -> anyhow::Result<()> {
    app.screen = Screen::Summary;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _store: &mut RecordStore) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_add(args: &str, app: &mut App, store: &mut RecordStore) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status(
            "Usage: :add date=YYYY-MM-DD company=<name> item=<name> qty=<n> unit=<u> price=<p> currency=<code>",
        );
        return Ok(());
    }

    let mut form = RecordForm::default();
    form.apply(args)?;
    let record = form.validate(store.schema())?;
    let label = format!("{} / {}", record.company, record.item_name);
    let id = store.append(record)?;
    app.refresh(store);
    app.set_status(format!("Added record {id}: {label}"));
    Ok(())
}

fn cmd_edit(args: &str, app: &mut App, store: &mut RecordStore) -> anyhow::Result<()> {
    let Some(selected) = app.selected_record() else {
        app.set_status("Navigate to Records and select one first");
        return Ok(());
    };
    let id = selected.id;

    if args.is_empty() {
        // Enter editing mode with every field prefilled
        app.command_input = RecordForm::from_record(selected).to_assignments(store.schema());
        app.editing = Some(id);
        app.input_mode = InputMode::Editing;
        app.set_status("Change any field=value, press Enter to save");
        return Ok(());
    }

    apply_edit(id, args, app, store)
}

fn cmd_delete(_args: &str, app: &mut App, _store: &mut RecordStore) -> anyhow::Result<()> {
    let Some(selected) = app.selected_record() else {
        app.set_status("No record selected");
        return Ok(());
    };
    let id = selected.id;
    let label = format!("{} {} / {}", selected.date, selected.company, selected.item_name);
    confirm(
        app,
        format!("Delete '{label}'?"),
        PendingAction::DeleteRecord { id, label },
    );
    Ok(())
}

fn cmd_pay_all(_args: &str, app: &mut App, store: &mut RecordStore) -> anyhow::Result<()> {
    if !store.schema().has_status() {
        anyhow::bail!("The {} ledger has no Status column", app.ledger);
    }

    let ids = app.unpaid_in_view();
    if ids.is_empty() {
        app.set_status("Nothing unpaid in this view");
        return Ok(());
    }

    let count = ids.len();
    confirm(
        app,
        format!("Mark {count} unpaid records as paid?"),
        PendingAction::MarkPaid { ids },
    );
    Ok(())
}

fn cmd_toggle(_args: &str, app: &mut App, store: &mut RecordStore) -> anyhow::Result<()> {
    let Some(selected) = app.selected_record() else {
        app.set_status("No record selected");
        return Ok(());
    };
    let Some(status) = selected.status else {
        anyhow::bail!("The {} ledger has no Status column", app.ledger);
    };

    let id = selected.id;
    let next = status.toggled();
    store.set_status(id, next)?;
    app.refresh(store);
    app.set_status(format!("Record {id} is now {next}"));
    Ok(())
}

fn cmd_filter(args: &str, app: &mut App, store: &mut RecordStore) -> anyhow::Result<()> {
    if args.is_empty() {
        if app.filter.is_empty() {
            app.set_status("No filter. Usage: :filter company=acme status=unpaid");
        } else {
            app.set_status(format!("Filter: {}", app.filter.describe()));
        }
        return Ok(());
    }

    app.filter.apply(args)?;
    app.record_index = 0;
    app.record_scroll = 0;
    app.refresh(store);
    app.set_status(format!(
        "Filter: {} ({} of {} records)",
        app.filter.describe(),
        app.records.len(),
        app.store_len
    ));
    Ok(())
}

fn cmd_from(args: &str, app: &mut App, store: &mut RecordStore) -> anyhow::Result<()> {
    app.filter.set("from", args, false)?;
    app.refresh(store);
    match app.filter.date_from {
        Some(d) => app.set_status(format!("Showing records from {d}")),
        None => app.set_status("Start date cleared"),
    }
    Ok(())
}

fn cmd_to(args: &str, app: &mut App, store: &mut RecordStore) -> anyhow::Result<()> {
    app.filter.set("to", args, false)?;
    app.refresh(store);
    match app.filter.date_to {
        Some(d) => app.set_status(format!("Showing records up to {d}")),
        None => app.set_status("End date cleared"),
    }
    Ok(())
}

fn cmd_clear(_args: &str, app: &mut App, store: &mut RecordStore) -> anyhow::Result<()> {
    app.filter = Default::default();
    app.search = None;
    app.search_input.clear();
    app.refresh(store);
    app.set_status("Filters cleared - showing all records");
    Ok(())
}

fn cmd_ledger(args: &str, app: &mut App, store: &mut RecordStore) -> anyhow::Result<()> {
    let kind = if args.is_empty() {
        // No args → flip to the other ledger
        match app.ledger {
            LedgerKind::Invoices => LedgerKind::Expenses,
            LedgerKind::Expenses => LedgerKind::Invoices,
        }
    } else {
        LedgerKind::parse(args)
            .with_context(|| format!("Unknown ledger '{args}'. Use invoices or expenses"))?
    };

    app.switch_ledger(kind, store)?;
    app.set_status(format!("{} ({} records)", kind.title(), store.len()));
    Ok(())
}

fn cmd_import(args: &str, app: &mut App, store: &mut RecordStore) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :import <path to .csv>");
        return Ok(());
    }

    let source = expand_home(args);
    let records = sheet::import_file(Path::new(&source), store.schema())
        .with_context(|| format!("Could not import {source}"))?;
    if records.is_empty() {
        app.set_status(format!("{source} has no rows to import"));
        return Ok(());
    }

    let count = records.len();
    confirm(
        app,
        format!("Append {count} rows from {source} to {}?", app.ledger),
        PendingAction::Import { source, records },
    );
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, store: &mut RecordStore) -> anyhow::Result<()> {
    if args.eq_ignore_ascii_case("summary") {
        let path = app.config.export_path(sheet::SUMMARY_EXPORT);
        let count = sheet::export_summary(&path, store.schema(), app.group_by, &app.group_totals)
            .with_context(|| format!("Could not write {}", path.display()))?;
        app.set_status(format!(
            "Exported {count} {} totals to {}",
            app.group_by,
            path.display()
        ));
        return Ok(());
    }

    let path = app.config.export_path(sheet::export_file_name(app.ledger));
    let count = sheet::export_records(&path, store.schema(), app.records.iter().map(|r| &r.record))
        .with_context(|| format!("Could not write {}", path.display()))?;
    if count == 0 {
        app.set_status(format!("No records in view; wrote header only to {}", path.display()));
    } else {
        app.set_status(format!("Exported {count} records to {}", path.display()));
    }
    Ok(())
}

fn cmd_group(args: &str, app: &mut App, store: &mut RecordStore) -> anyhow::Result<()> {
    app.group_by = if args.is_empty() {
        let all = GroupBy::all();
        let at = all.iter().position(|g| *g == app.group_by).unwrap_or(0);
        all[(at + 1) % all.len()]
    } else {
        GroupBy::parse(args).with_context(|| {
            format!("Unknown grouping '{args}'. Use company, company-currency, currency, status or unit")
        })?
    };

    app.summary_index = 0;
    app.summary_scroll = 0;
    app.refresh(store);
    app.screen = Screen::Summary;
    app.set_status(format!("Grouped by {}", app.group_by));
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
