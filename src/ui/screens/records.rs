use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use crate::models::{Column, PaymentStatus, StoredRecord};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_money, format_quantity, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let schema = app.ledger.schema();

    if app.records.is_empty() {
        let msg = if !app.filter.is_empty() {
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("No records matching {}", app.filter.describe()),
                    theme::dim_style(),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press Esc to clear the search or :clear to drop every filter",
                    theme::dim_style(),
                )),
            ]
        } else {
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("No {} yet", app.ledger),
                    theme::dim_style(),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Add one with :add company=<name> item=<name> qty=<n> price=<p>",
                    theme::dim_style(),
                )),
            ]
        };
        f.render_widget(
            Paragraph::new(msg)
                .centered()
                .block(theme::panel(format!("{} (0)", app.ledger.title()))),
            area,
        );
        return;
    }

    let mut header_cells = vec![Cell::from("#").style(theme::header_style())];
    header_cells.extend(
        schema
            .columns()
            .iter()
            .map(|c| Cell::from(short_header(*c)).style(theme::header_style())),
    );
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .records
        .iter()
        .enumerate()
        .skip(app.record_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, row)| {
            let style = if i == app.record_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            let mut cells = vec![Cell::from(format!("{}", i + 1))];
            cells.extend(schema.columns().iter().map(|c| cell(*c, row)));
            Row::new(cells).style(style)
        })
        .collect();

    let mut widths = vec![Constraint::Length(5)];
    widths.extend(schema.columns().iter().map(|c| width(*c)));

    let mut title = format!("{} ({}/{})", app.ledger.title(), app.records.len(), app.store_len);
    if !app.filter.is_empty() {
        title.push_str(&format!(" {}", app.filter.describe()));
    }

    let table = Table::new(rows, widths)
        .header(header)
        .block(theme::panel(title));

    f.render_widget(table, area);
}

fn short_header(column: Column) -> &'static str {
    match column {
        Column::PricePerUnit => "Price",
        Column::TotalPrice => "Total",
        Column::Quantity => "Qty",
        Column::Currency => "Cur",
        other => other.header(),
    }
}

fn width(column: Column) -> Constraint {
    match column {
        Column::Date => Constraint::Length(10),
        Column::Company | Column::Subject => Constraint::Min(14),
        Column::ItemId => Constraint::Length(10),
        Column::ItemName => Constraint::Min(14),
        Column::Quantity => Constraint::Length(8),
        Column::Unit => Constraint::Length(8),
        Column::PricePerUnit | Column::TotalPrice => Constraint::Length(16),
        Column::Currency => Constraint::Length(4),
        Column::Status => Constraint::Length(7),
    }
}

fn cell(column: Column, row: &StoredRecord) -> Cell<'static> {
    match column {
        Column::Company | Column::Subject => Cell::from(truncate(&row.company, 30)),
        Column::ItemName => Cell::from(truncate(&row.item_name, 30)),
        Column::Quantity => Cell::from(format_quantity(row.quantity)),
        Column::PricePerUnit => Cell::from(format_money(row.price_per_unit, row.currency)),
        Column::TotalPrice => Cell::from(format_money(row.total_price(), row.currency)),
        Column::Status => match row.status {
            Some(PaymentStatus::Paid) => Cell::from(Span::styled("Paid", theme::paid_style())),
            Some(PaymentStatus::Unpaid) => {
                Cell::from(Span::styled("Unpaid", theme::unpaid_style()))
            }
            None => Cell::from(""),
        },
        other => Cell::from(other.cell(row)),
    }
}
