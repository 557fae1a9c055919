use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

use crate::config::{expand_home, Config};
use crate::form::RecordForm;
use crate::models::{Column, Currency, PaymentStatus, RecordId, StoredRecord, Unit};
use crate::query::{self, Filter, GroupBy, Measure};
use crate::sheet;
use crate::store::RecordStore;
use crate::ui::util::{format_money, format_quantity, format_totals, truncate};

pub(crate) fn as_cli(args: &[String], config: &Config) -> Result<()> {
    let command = args[1].as_str();
    let rest = &args[2..];
    match command {
        "--help" | "-h" | "help" => {
            print_usage();
            return Ok(());
        }
        "--version" | "-V" | "version" => {
            println!("tallytui {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    let mut store = config.open_store(config.ledger)?;
    match command {
        "add" | "a" => cli_add(rest, &mut store),
        "list" | "ls" => cli_list(rest, &store),
        "summary" | "s" => cli_summary(rest, config, &store),
        "edit" => cli_edit(rest, &mut store),
        "delete" | "rm" => cli_delete(rest, &mut store),
        "pay" => cli_pay(rest, &mut store),
        "status" => cli_status(rest, &mut store),
        "import" => cli_import(rest, &mut store),
        "export" => cli_export(rest, config, &store),
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("TallyTUI - invoice and expense line items in the terminal");
    println!();
    println!("Usage: tallytui [--ledger invoices|expenses] [--memory] [command]");
    println!();
    println!("Commands:");
    println!("  (none)                        Launch interactive TUI");
    println!("  add field=value...            Append a record");
    println!("                                fields: date company id item qty unit price currency status");
    println!("  list [filters]                Print records with their positions");
    println!("  summary [filters]             Print totals");
    println!("    --group <by>                company, company-currency, currency, status, unit");
    println!("  edit <pos> field=value...     Change fields of the record at <pos>");
    println!("  delete <pos>                  Delete the record at <pos>");
    println!("  pay [filters]                 Mark every unpaid matching record as paid");
    println!("  status <pos> paid|unpaid      Set the status of one record");
    println!("  import <file.csv>             Append the rows of a spreadsheet upload");
    println!("  export [filters]              Write matching records to the export directory");
    println!("    --summary                   Write group totals instead (with --group)");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    println!("Filters:");
    println!("  --from <date> --to <date>     Inclusive date range");
    println!("  --company <text> --item <text> --item-id <text>");
    println!("  --currency <a,b> --status <a,b> --unit <a,b>");
    println!("  --regex                       Treat text filters as patterns");
    println!();
    println!("Values:");
    println!("  currency  {}", join_labels(Currency::all()));
    println!("  status    {}", join_labels(PaymentStatus::all()));
    println!("  unit      {} (or any other text)", join_labels(&Unit::presets()));
}

fn join_labels<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Flags shared by the listing commands.
#[derive(Debug, Default)]
struct Flags {
    filter: Filter,
    group_by: Option<GroupBy>,
    summary: bool,
}

const FILTER_FLAGS: [&str; 8] = [
    "--from",
    "--to",
    "--company",
    "--item",
    "--item-id",
    "--currency",
    "--status",
    "--unit",
];

fn parse_flags(args: &[String]) -> Result<Flags> {
    let regex = args.iter().any(|a| a == "--regex");
    let mut flags = Flags::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--regex" => {}
            "--summary" => flags.summary = true,
            "--group" => {
                let value = iter.next().context("--group needs a value")?;
                flags.group_by = Some(
                    GroupBy::parse(value)
                        .with_context(|| format!("Unknown grouping: {value}"))?,
                );
            }
            flag if FILTER_FLAGS.contains(&flag) => {
                let value = iter
                    .next()
                    .with_context(|| format!("{flag} needs a value"))?;
                flags
                    .filter
                    .set(&flag[2..], value, regex)
                    .with_context(|| format!("Invalid {flag}"))?;
            }
            flag if flag.starts_with("--") => anyhow::bail!("Unknown flag: {flag}"),
            other => anyhow::bail!("Unexpected argument: {other}"),
        }
    }
    Ok(flags)
}

/// 1-based position from the command line → store index.
fn parse_position(arg: Option<&String>, store: &RecordStore) -> Result<usize> {
    let raw = arg.context("Missing record position (see `tallytui list`)")?;
    let position: usize = raw
        .parse()
        .with_context(|| format!("'{raw}' is not a position"))?;
    if position == 0 || position > store.len() {
        anyhow::bail!(
            "Position {position} is out of range (ledger has {} records)",
            store.len()
        );
    }
    Ok(position - 1)
}

fn cli_add(args: &[String], store: &mut RecordStore) -> Result<()> {
    if args.is_empty() {
        anyhow::bail!("Usage: tallytui add company=<name> item=<name> qty=<n> price=<p> ...");
    }
    let mut form = RecordForm::default();
    form.apply(&args.join(" "))?;
    let record = form.validate(store.schema())?;
    store.append(record)?;
    println!("Added record at position {}", store.len());
    Ok(())
}

fn cli_list(args: &[String], store: &RecordStore) -> Result<()> {
    let flags = parse_flags(args)?;
    let view = query::filter(store.all(), &flags.filter);
    if view.is_empty() {
        println!("No records");
        return Ok(());
    }

    let schema = store.schema();
    let party = schema.party_label();
    let with_status = schema.has_status();
    println!(
        "{:>4} {:<10} {:<20} {:<20} {:>8} {:<8} {:>14} {:>14}{}",
        "Pos",
        "Date",
        party,
        "Item",
        "Qty",
        "Unit",
        "Price",
        "Total",
        if with_status { "  Status" } else { "" }
    );
    println!("{}", "─".repeat(if with_status { 116 } else { 108 }));
    for row in &view {
        let position = store.position_of(row.id).map_or(0, |p| p + 1);
        println!("{}", format_line(position, row, with_status));
    }
    println!();
    println!(
        "{} of {} records   Total: {}",
        view.len(),
        store.len(),
        format_totals(&query::totals_by_currency(view.iter().copied()))
    );
    Ok(())
}

fn format_line(position: usize, row: &StoredRecord, with_status: bool) -> String {
    let item = if row.item_id.is_empty() {
        row.item_name.clone()
    } else {
        format!("{} ({})", row.item_name, row.item_id)
    };
    let status = match (with_status, row.status) {
        (true, Some(s)) => format!("  {s}"),
        _ => String::new(),
    };
    format!(
        "{:>4} {:<10} {:<20} {:<20} {:>8} {:<8} {:>14} {:>14}{status}",
        position,
        row.date.format("%Y-%m-%d").to_string(),
        truncate(&row.company, 20),
        truncate(&item, 20),
        format_quantity(row.quantity),
        truncate(row.unit.as_str(), 8),
        format_money(row.price_per_unit, row.currency),
        format_money(row.total_price(), row.currency),
    )
}

fn cli_summary(args: &[String], config: &Config, store: &RecordStore) -> Result<()> {
    let flags = parse_flags(args)?;
    let group_by = flags.group_by.unwrap_or(GroupBy::CompanyCurrency);
    let view = query::filter(store.all(), &flags.filter);

    let totals = query::totals_by_currency(view.iter().copied());
    let unpaid: Vec<&StoredRecord> = view.iter().copied().filter(|r| r.is_unpaid()).collect();
    let owed = if store.schema().has_status() {
        query::totals_by_currency(unpaid.iter().copied())
    } else {
        totals.clone()
    };

    println!("TallyTUI - {}", config.ledger.title());
    if !flags.filter.is_empty() {
        println!("  Filter:     {}", flags.filter.describe());
    }
    println!("{}", "─".repeat(40));
    println!("  Records:    {}", view.len());
    println!(
        "  Companies:  {}",
        query::distinct_values(view.iter().copied(), Column::Company).len()
    );
    println!(
        "  Quantity:   {}",
        format_quantity(query::sum(view.iter().copied(), Measure::Quantity))
    );
    println!("  Total:      {}", format_totals(&totals));
    println!("  Total Owed: {}", format_totals(&owed));
    if store.schema().has_status() {
        println!("  Unpaid:     {}", unpaid.len());
    }
    if let Some((first, last)) = query::date_span(view.iter().copied()) {
        println!("  Dates:      {first} .. {last}");
    }

    let groups = query::group_totals(view.iter().copied(), group_by, Measure::TotalPrice);
    if !groups.is_empty() {
        println!();
        println!("By {group_by}:");
        for group in &groups {
            println!(
                "  {:<32} {:>16}  ({} rows)",
                truncate(&group.label(), 32),
                group.total,
                group.count
            );
        }
    }
    Ok(())
}

fn cli_edit(args: &[String], store: &mut RecordStore) -> Result<()> {
    let position = parse_position(args.first(), store)?;
    if args.len() < 2 {
        anyhow::bail!("Usage: tallytui edit <pos> field=value...");
    }
    let mut form = RecordForm::from_record(&store.all()[position]);
    form.apply(&args[1..].join(" "))?;
    let record = form.validate(store.schema())?;
    store.update(position, record)?;
    println!("Updated record at position {}", position + 1);
    Ok(())
}

fn cli_delete(args: &[String], store: &mut RecordStore) -> Result<()> {
    let position = parse_position(args.first(), store)?;
    let removed = store.delete(position)?;
    println!(
        "Deleted {} {} / {}",
        removed.date, removed.company, removed.item_name
    );
    Ok(())
}

fn cli_pay(args: &[String], store: &mut RecordStore) -> Result<()> {
    if !store.schema().has_status() {
        anyhow::bail!("This ledger has no Status column; use --ledger expenses");
    }
    let flags = parse_flags(args)?;
    let view = query::filter(store.all(), &flags.filter);
    let ids: HashSet<RecordId> = view.iter().filter(|r| r.is_unpaid()).map(|r| r.id).collect();
    // Only a single-currency view has a meaningful scalar amount.
    let settled = match query::totals_by_currency(view.iter().copied()).as_slice() {
        [(currency, _)] => Some(format_money(
            query::unpaid_total(view.iter().copied()),
            *currency,
        )),
        _ => None,
    };
    let changed = store.mark_paid(&ids)?;
    match settled {
        Some(amount) if changed > 0 => println!("Marked {changed} records as paid ({amount})"),
        _ => println!("Marked {changed} records as paid"),
    }
    Ok(())
}

fn cli_status(args: &[String], store: &mut RecordStore) -> Result<()> {
    if !store.schema().has_status() {
        anyhow::bail!("This ledger has no Status column; use --ledger expenses");
    }
    let position = parse_position(args.first(), store)?;
    let raw = args
        .get(1)
        .context("Usage: tallytui status <pos> paid|unpaid")?;
    let status = PaymentStatus::parse(raw)
        .with_context(|| format!("Unknown status '{raw}' (use paid or unpaid)"))?;
    let id = store.all()[position].id;
    store.set_status(id, status)?;
    println!("Record at position {} is {status}", position + 1);
    Ok(())
}

fn cli_import(args: &[String], store: &mut RecordStore) -> Result<()> {
    let file = args
        .first()
        .context("Usage: tallytui import <file.csv>")?;
    let path = expand_home(file);
    let records = sheet::import_file(Path::new(&path), store.schema())
        .with_context(|| format!("Could not import {path}"))?;
    let ids = store.extend(records)?;
    println!("Imported {} records ({} total)", ids.len(), store.len());
    Ok(())
}

fn cli_export(args: &[String], config: &Config, store: &RecordStore) -> Result<()> {
    let flags = parse_flags(args)?;
    let view = query::filter(store.all(), &flags.filter);

    if flags.summary {
        let group_by = flags.group_by.unwrap_or(GroupBy::CompanyCurrency);
        let groups = query::group_totals(view.iter().copied(), group_by, Measure::TotalPrice);
        let path = config.export_path(sheet::SUMMARY_EXPORT);
        let count = sheet::export_summary(&path, store.schema(), group_by, &groups)
            .with_context(|| format!("Could not write {}", path.display()))?;
        println!("Exported {count} totals to {}", path.display());
        return Ok(());
    }

    let path = config.export_path(sheet::export_file_name(config.ledger));
    let count = sheet::export_records(&path, store.schema(), view.iter().map(|r| &r.record))
        .with_context(|| format!("Could not write {}", path.display()))?;
    println!("Exported {count} records to {}", path.display());
    Ok(())
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
