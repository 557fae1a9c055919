use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::config::Config;
use crate::store::RecordStore;
use crate::ui::app::{App, InputMode, PendingAction, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

pub(crate) fn as_tui(config: &Config) -> Result<()> {
    let mut store = config
        .open_store(config.ledger)
        .context("Failed to open the record store")?;
    let mut app = App::new(config.clone());
    app.refresh(&store);
    tracing::info!(
        ledger = %config.ledger,
        records = store.len(),
        path = ?store.path(),
        "dashboard started"
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &mut store);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = %format!("{e:#}"), "dashboard exited with error");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    store: &mut RecordStore,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            let content_height = f.area().height.saturating_sub(3) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            handle_key(key, app, store);
        }
    }
    Ok(())
}

fn handle_key(key: event::KeyEvent, app: &mut App, store: &mut RecordStore) {
    if app.show_help {
        app.show_help = false;
        return;
    }
    match app.input_mode {
        InputMode::Normal => handle_normal_input(key, app, store),
        InputMode::Command => handle_command_input(key, app, store),
        InputMode::Search => handle_search_input(key, app, store),
        InputMode::Editing => handle_editing_input(key, app, store),
        InputMode::Confirm => handle_confirm_input(key, app, store),
    }
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, store: &mut RecordStore) {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
            app.search_input.clear();
        }
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half_page = app.visible_rows / 2;
            for _ in 0..half_page {
                handle_move_down(app);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half_page = app.visible_rows / 2;
            for _ in 0..half_page {
                handle_move_up(app);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('1') => switch_screen(app, Screen::Dashboard),
        KeyCode::Char('2') => switch_screen(app, Screen::Records),
        KeyCode::Char('3') => switch_screen(app, Screen::Summary),
        KeyCode::Tab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let next = (idx + 1) % screens.len();
            switch_screen(app, screens[next]);
        }
        KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let prev = if idx == 0 { screens.len() - 1 } else { idx - 1 };
            switch_screen(app, screens[prev]);
        }
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app),
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        KeyCode::Enter if app.screen == Screen::Records => {
            commands::handle_command("edit", app, store);
        }
        KeyCode::Enter if app.screen == Screen::Summary => drill_into_group(app, store),
        KeyCode::Char('x') | KeyCode::Char('D') if app.screen == Screen::Records => {
            commands::handle_command("delete", app, store);
        }
        KeyCode::Char(' ') if app.screen == Screen::Records => {
            commands::handle_command("toggle", app, store);
        }
        KeyCode::Char('p') => commands::handle_command("pay-all", app, store),
        KeyCode::Char('l') => commands::handle_command("ledger", app, store),
        KeyCode::Char('s') => commands::handle_command("group", app, store),
        KeyCode::Esc => handle_escape(app, store),
        _ => {}
    }
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, store: &mut RecordStore) {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, store);
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            delete_word(&mut app.command_input);
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
}

fn handle_search_input(key: event::KeyEvent, app: &mut App, store: &mut RecordStore) {
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            if !app.search_input.is_empty() {
                app.set_status(format!(
                    "{} of {} records match '{}'",
                    app.records.len(),
                    app.store_len,
                    app.search_input
                ));
            }
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.search_input.clear();
            app.apply_search(store);
        }
        KeyCode::Backspace => {
            app.search_input.pop();
            app.screen = Screen::Records;
            app.apply_search(store);
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
            app.screen = Screen::Records;
            app.apply_search(store);
        }
        _ => {}
    }
}

fn handle_editing_input(key: event::KeyEvent, app: &mut App, store: &mut RecordStore) {
    match key.code {
        KeyCode::Enter => {
            let input = std::mem::take(&mut app.command_input);
            app.input_mode = InputMode::Normal;
            if let Some(id) = app.editing.take() {
                if let Err(e) = commands::apply_edit(id, &input, app, store) {
                    tracing::warn!(record = %id, error = %format!("{e:#}"), "edit rejected");
                    app.set_status(format!("Error: {e:#}"));
                }
            }
        }
        KeyCode::Esc => {
            app.command_input.clear();
            app.editing = None;
            app.input_mode = InputMode::Normal;
            app.set_status("Edit cancelled");
        }
        KeyCode::Backspace => {
            app.command_input.pop();
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            delete_word(&mut app.command_input);
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, store: &mut RecordStore) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(action) = app.pending_action.take() {
                match run_pending(action, app, store) {
                    Ok(msg) => app.set_status(msg),
                    Err(e) => {
                        tracing::warn!(error = %format!("{e:#}"), "confirmed action failed");
                        app.set_status(format!("Error: {e:#}"));
                    }
                }
            }
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_action = None;
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            app.set_status("Cancelled");
        }
        _ => {}
    }
}

fn run_pending(action: PendingAction, app: &mut App, store: &mut RecordStore) -> Result<String> {
    let msg = match action {
        PendingAction::DeleteRecord { id, label } => {
            store.delete_by_id(id)?;
            format!("Deleted: {label}")
        }
        PendingAction::MarkPaid { ids } => {
            let changed = store.mark_paid(&ids)?;
            format!(
                "Marked {changed} record{} as paid",
                if changed == 1 { "" } else { "s" }
            )
        }
        PendingAction::Import { source, records } => {
            let ids = store.extend(records)?;
            format!("Imported {} records from {source}", ids.len())
        }
    };
    app.refresh(store);
    Ok(msg)
}

// ── Navigation helpers ───────────────────────────────────────

fn switch_screen(app: &mut App, screen: Screen) {
    app.screen = screen;
    app.set_status(format!("{screen}"));
}

/// Summary row → Records screen filtered to that company.
fn drill_into_group(app: &mut App, store: &RecordStore) {
    if !matches!(
        app.group_by,
        crate::query::GroupBy::Company | crate::query::GroupBy::CompanyCurrency
    ) {
        return;
    }
    let Some(company) = app
        .group_totals
        .get(app.summary_index)
        .and_then(|g| g.key.first())
        .cloned()
    else {
        return;
    };
    app.search_input = company.clone();
    app.apply_search(store);
    app.screen = Screen::Records;
    app.set_status(format!("Records for {company}"));
}

fn handle_escape(app: &mut App, store: &RecordStore) {
    if !app.search_input.is_empty() {
        app.search_input.clear();
        app.apply_search(store);
        app.set_status("Search cleared");
    } else {
        app.status_message.clear();
    }
}

fn handle_move_down(app: &mut App) {
    match app.screen {
        Screen::Records => {
            let page = app.records_page();
            scroll_down(
                &mut app.record_index,
                &mut app.record_scroll,
                app.records.len(),
                page,
            );
        }
        Screen::Summary => {
            let page = app.summary_page();
            scroll_down(
                &mut app.summary_index,
                &mut app.summary_scroll,
                app.group_totals.len(),
                page,
            );
        }
        Screen::Dashboard => {}
    }
}

fn handle_move_up(app: &mut App) {
    match app.screen {
        Screen::Records => scroll_up(&mut app.record_index, &mut app.record_scroll),
        Screen::Summary => scroll_up(&mut app.summary_index, &mut app.summary_scroll),
        Screen::Dashboard => {}
    }
}

fn handle_goto_top(app: &mut App) {
    match app.screen {
        Screen::Records => scroll_to_top(&mut app.record_index, &mut app.record_scroll),
        Screen::Summary => scroll_to_top(&mut app.summary_index, &mut app.summary_scroll),
        Screen::Dashboard => {}
    }
}

fn handle_goto_bottom(app: &mut App) {
    match app.screen {
        Screen::Records => {
            let page = app.records_page();
            scroll_to_bottom(
                &mut app.record_index,
                &mut app.record_scroll,
                app.records.len(),
                page,
            );
        }
        Screen::Summary => {
            let page = app.summary_page();
            scroll_to_bottom(
                &mut app.summary_index,
                &mut app.summary_scroll,
                app.group_totals.len(),
                page,
            );
        }
        Screen::Dashboard => {}
    }
}

fn delete_word(input: &mut String) {
    let trimmed = input.trim_end();
    if let Some(pos) = trimmed.rfind(' ') {
        input.truncate(pos + 1);
    } else {
        input.clear();
    }
}

#[cfg(test)]
#[path = "tui_tests.rs"]
mod tests;
