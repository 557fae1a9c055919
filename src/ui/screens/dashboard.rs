use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Paragraph},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_totals, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Metric cards
            Constraint::Min(10),   // Group totals chart
            Constraint::Length(3), // Active filter
        ])
        .split(area);

    render_metric_cards(f, chunks[0], app);
    render_group_chart(f, chunks[1], app);
    render_filter_line(f, chunks[2], app);
}

fn render_metric_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
            Constraint::Percentage(20),
        ])
        .split(area);

    let has_status = app.ledger.schema().has_status();

    render_card(
        f,
        cards[0],
        "Records",
        app.records.len().to_string(),
        theme::ACCENT,
        format!("of {} stored", app.store_len),
    );
    render_card(
        f,
        cards[1],
        "Total",
        format_totals(&app.view_totals),
        theme::TEXT,
        "in view".into(),
    );
    render_card(
        f,
        cards[2],
        "Total Owed",
        format_totals(&app.owed_totals),
        if has_status && app.unpaid_count == 0 {
            theme::GREEN
        } else {
            theme::RED
        },
        if has_status {
            format!("{} unpaid", app.unpaid_count)
        } else {
            "all invoiced".into()
        },
    );
    let (span, days) = match app.date_span {
        Some((first, last)) => (
            format!("{} → {}", first.format("%b %d"), last.format("%b %d %Y")),
            format!("{} days", (last - first).num_days() + 1),
        ),
        None => ("-".into(), String::new()),
    };
    render_card(f, cards[3], "Dates", span, theme::YELLOW, days);
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    title: &str,
    value: String,
    color: Color,
    subtitle: String,
) {
    let width = area.width.saturating_sub(2) as usize;
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            truncate(&value, width),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subtitle, theme::dim_style())),
    ])
    .centered()
    .block(theme::panel(title.to_string()));

    f.render_widget(text, area);
}

fn render_group_chart(f: &mut Frame, area: Rect, app: &App) {
    let title = format!("Totals by {}", app.group_by);

    if app.group_totals.is_empty() {
        let msg = Paragraph::new(Line::from(Span::styled(
            "No records in view. Add one with :add or import a sheet with :import",
            theme::dim_style(),
        )))
        .centered()
        .block(theme::panel(title));
        f.render_widget(msg, area);
        return;
    }

    let bars: Vec<Bar> = app
        .group_totals
        .iter()
        .take(12)
        .map(|group| {
            let val = group.total.to_u64().unwrap_or(0);
            Bar::default()
                .value(val)
                .text_value(group.total.round_dp(0).to_string())
                .label(Line::from(truncate(&group.label(), 12)))
                .style(Style::default().fg(theme::ACCENT))
                .value_style(
                    Style::default()
                        .fg(theme::HEADER_BG)
                        .bg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let chart = BarChart::default()
        .block(theme::panel(title))
        .data(BarGroup::default().bars(&bars))
        .bar_width(12)
        .bar_gap(1)
        .bar_style(Style::default().fg(theme::ACCENT))
        .value_style(Style::default().fg(theme::TEXT));

    f.render_widget(chart, area);
}

fn render_filter_line(f: &mut Frame, area: Rect, app: &App) {
    let mut parts: Vec<String> = Vec::new();
    if !app.filter.is_empty() {
        parts.push(app.filter.describe());
    }
    if let Some(search) = &app.search {
        parts.push(format!("search '{}'", search.as_str()));
    }
    let line = if parts.is_empty() {
        Line::from(Span::styled(
            "none (:filter company=acme status=unpaid, :from 2024-01-01)",
            theme::dim_style(),
        ))
    } else {
        Line::from(Span::styled(parts.join("  "), theme::normal_style()))
    };
    f.render_widget(Paragraph::new(line).block(theme::panel("Filter".into())), area);
}
