use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_totals, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let title = format!("Totals by {} ({} groups)", app.group_by, app.group_totals.len());

    if app.group_totals.is_empty() {
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled("Nothing to total", theme::dim_style())),
            Line::from(""),
            Line::from(Span::styled(
                "Change grouping with :group company|company-currency|currency|status|unit",
                theme::dim_style(),
            )),
        ];
        f.render_widget(Paragraph::new(msg).centered().block(theme::panel(title)), area);
        return;
    }

    let mut header_cells: Vec<Cell> = app
        .group_by
        .headers(app.ledger.schema().party_label())
        .into_iter()
        .map(|h| Cell::from(h).style(theme::header_style()))
        .collect();
    header_cells.push(Cell::from("Total Owed").style(theme::header_style()));
    header_cells.push(Cell::from("Rows").style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .group_totals
        .iter()
        .enumerate()
        .skip(app.summary_scroll)
        .take(area.height.saturating_sub(4) as usize)
        .map(|(i, group)| {
            let style = if i == app.summary_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let mut cells: Vec<Cell> = group
                .key
                .iter()
                .map(|k| Cell::from(truncate(k, 32)))
                .collect();
            cells.push(Cell::from(group.total.to_string()));
            cells.push(Cell::from(group.count.to_string()));
            Row::new(cells).style(style)
        })
        .collect();

    let mut widths: Vec<Constraint> = app
        .group_by
        .headers(app.ledger.schema().party_label())
        .iter()
        .map(|_| Constraint::Min(12))
        .collect();
    widths.push(Constraint::Length(18));
    widths.push(Constraint::Length(6));

    let footer = Row::new(vec![Cell::from(Span::styled(
        format!("All: {}", format_totals(&app.view_totals)),
        theme::dim_style(),
    ))]);

    let table = Table::new(rows, widths)
        .header(header)
        .footer(footer)
        .block(theme::panel(title));

    f.render_widget(table, area);
}
