use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashSet;

use crate::config::Config;
use crate::models::{Currency, LedgerKind, Record, RecordId, StoredRecord};
use crate::query::{self, Filter, GroupBy, GroupTotal, Measure, TextMatch};
use crate::store::RecordStore;
use crate::ui::util::clamp_cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Dashboard,
    Records,
    Summary,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Dashboard, Self::Records, Self::Summary]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "Dashboard"),
            Self::Records => write!(f, "Records"),
            Self::Summary => write!(f, "Summary"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Search,
    Editing,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Search => write!(f, "SEARCH"),
            Self::Editing => write!(f, "EDIT"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone)]
pub(crate) enum PendingAction {
    DeleteRecord { id: RecordId, label: String },
    MarkPaid { ids: HashSet<RecordId> },
    Import { source: String, records: Vec<Record> },
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) search_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) config: Config,

    // View criteria. The live search is kept apart from `filter` so clearing
    // one never drops the other.
    pub(crate) filter: Filter,
    pub(crate) search: Option<TextMatch>,
    pub(crate) group_by: GroupBy,

    // The other ledger of a `--memory` session, kept until switched back
    pub(crate) parked: Option<(LedgerKind, RecordStore)>,

    // Derived from the store on every refresh
    pub(crate) ledger: LedgerKind,
    pub(crate) store_len: usize,
    pub(crate) records: Vec<StoredRecord>,
    pub(crate) view_totals: Vec<(Currency, Decimal)>,
    pub(crate) owed_totals: Vec<(Currency, Decimal)>,
    pub(crate) unpaid_count: usize,
    pub(crate) group_totals: Vec<GroupTotal>,
    pub(crate) date_span: Option<(NaiveDate, NaiveDate)>,

    // Records
    pub(crate) record_index: usize,
    pub(crate) record_scroll: usize,

    // Summary
    pub(crate) summary_index: usize,
    pub(crate) summary_scroll: usize,

    // Inline edit target
    pub(crate) editing: Option<RecordId>,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(config: Config) -> Self {
        Self {
            running: true,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            search_input: String::new(),
            status_message: String::new(),
            show_help: false,
            ledger: config.ledger,
            config,

            filter: Filter::default(),
            search: None,
            group_by: GroupBy::Company,

            parked: None,

            store_len: 0,
            records: Vec::new(),
            view_totals: Vec::new(),
            owed_totals: Vec::new(),
            unpaid_count: 0,
            group_totals: Vec::new(),
            date_span: None,

            record_index: 0,
            record_scroll: 0,

            summary_index: 0,
            summary_scroll: 0,

            editing: None,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    /// Re-derive the filtered view and every aggregate from the store.
    pub(crate) fn refresh(&mut self, store: &RecordStore) {
        let view: Vec<&StoredRecord> = query::filter(store.all(), &self.filter)
            .into_iter()
            .filter(|r| self.search.as_ref().map_or(true, |s| s.is_match(&r.company)))
            .collect();

        self.store_len = store.len();
        self.view_totals = query::totals_by_currency(view.iter().copied());
        self.owed_totals = if store.schema().has_status() {
            query::totals_by_currency(view.iter().copied().filter(|r| r.is_unpaid()))
        } else {
            self.view_totals.clone()
        };
        self.unpaid_count = view.iter().filter(|r| r.is_unpaid()).count();
        self.group_totals =
            query::group_totals(view.iter().copied(), self.group_by, Measure::TotalPrice);
        self.date_span = query::date_span(view.iter().copied());
        self.records = view.into_iter().cloned().collect();

        clamp_cursor(
            &mut self.record_index,
            &mut self.record_scroll,
            self.records.len(),
        );
        clamp_cursor(
            &mut self.summary_index,
            &mut self.summary_scroll,
            self.group_totals.len(),
        );
    }

    /// The live `/` search narrows the filtered view by company.
    pub(crate) fn apply_search(&mut self, store: &RecordStore) {
        self.search = TextMatch::contains(&self.search_input);
        self.record_index = 0;
        self.record_scroll = 0;
        self.refresh(store);
    }

    pub(crate) fn selected_record(&self) -> Option<&StoredRecord> {
        self.records.get(self.record_index)
    }

    /// Ids of the rows in the current view that are still unpaid.
    pub(crate) fn unpaid_in_view(&self) -> HashSet<RecordId> {
        self.records
            .iter()
            .filter(|r| r.is_unpaid())
            .map(|r| r.id)
            .collect()
    }

    /// Swap the active store for `kind`. File-backed ledgers are reopened from
    /// disk; a session-only ledger is parked and handed back on the next switch.
    pub(crate) fn switch_ledger(&mut self, kind: LedgerKind, store: &mut RecordStore) -> Result<()> {
        if kind != self.ledger {
            let next = match self.parked.take() {
                Some((parked_kind, parked)) if parked_kind == kind => parked,
                _ => self.config.open_store(kind)?,
            };
            let previous = std::mem::replace(store, next);
            if self.config.in_memory {
                self.parked = Some((self.ledger, previous));
            }
            self.ledger = kind;
        }
        self.filter = Filter::default();
        self.search = None;
        self.search_input.clear();
        self.record_index = 0;
        self.record_scroll = 0;
        self.refresh(store);
        tracing::info!(ledger = %kind, records = store.len(), "switched ledger");
        Ok(())
    }

    pub(crate) fn records_page(&self) -> usize {
        self.visible_rows.saturating_sub(3).max(1)
    }

    pub(crate) fn summary_page(&self) -> usize {
        self.visible_rows.saturating_sub(3).max(1)
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}
