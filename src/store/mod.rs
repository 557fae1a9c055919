use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};
use crate::models::{PaymentStatus, Record, RecordId, Schema, StoredRecord};
use crate::sheet;

/// Ordered line items for one ledger.
///
/// Every row gets a [`RecordId`] when it enters the store; ids survive edits
/// and deletes of other rows, positions do not. A store opened on a file
/// rewrites that whole file after each successful mutation.
pub(crate) struct RecordStore {
    schema: Schema,
    rows: Vec<StoredRecord>,
    next_id: u64,
    path: Option<PathBuf>,
}

impl RecordStore {
    /// Session-only store with no backing file.
    pub(crate) fn in_memory(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
            next_id: 1,
            path: None,
        }
    }

    /// Load `path` and keep it as the backing file. A missing file gives an
    /// empty store; the file is created on the first mutation.
    pub(crate) fn open(path: &Path, schema: Schema) -> StoreResult<Self> {
        let mut store = Self::load_from(path, schema)?;
        store.path = Some(path.to_path_buf());
        Ok(store)
    }

    /// Whole-file load into a detached store.
    pub(crate) fn load_from(path: &Path, schema: Schema) -> StoreResult<Self> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no store file yet, starting empty");
                return Ok(Self::in_memory(schema));
            }
            Err(e) => return Err(e.into()),
        };
        let store = Self::read_from(BufReader::new(file), schema)?;
        tracing::info!(path = %path.display(), records = store.len(), "loaded store");
        Ok(store)
    }

    /// A reader with no rows at all gives an empty store.
    pub(crate) fn read_from<R: Read>(reader: R, schema: Schema) -> StoreResult<Self> {
        let records = sheet::decode_store(reader, &schema)?;
        let mut store = Self::in_memory(schema);
        for record in records {
            store.push(record);
        }
        Ok(store)
    }

    /// Whole-file overwrite.
    pub(crate) fn persist_to(&self, path: &Path) -> StoreResult<()> {
        write_file(path, &self.schema, &self.rows)
    }

    /// Write `rows` to the backing file, then adopt them. On a failed write
    /// the store keeps its previous rows.
    fn commit(&mut self, rows: Vec<StoredRecord>) -> StoreResult<()> {
        if let Some(path) = &self.path {
            if let Err(e) = write_file(path, &self.schema, &rows) {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "store write failed, change dropped"
                );
                return Err(e);
            }
        }
        self.rows = rows;
        Ok(())
    }

    fn push(&mut self, record: Record) -> RecordId {
        let id = self.allocate_id();
        self.rows.push(StoredRecord { id, record });
        id
    }

    fn allocate_id(&mut self) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        id
    }

    // ── Reads ─────────────────────────────────────────────────

    pub(crate) fn schema(&self) -> &Schema {
        &self.schema
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn all(&self) -> &[StoredRecord] {
        &self.rows
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn get(&self, id: RecordId) -> Option<&StoredRecord> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub(crate) fn position_of(&self, id: RecordId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    fn check_position(&self, position: usize) -> StoreResult<()> {
        if position < self.rows.len() {
            Ok(())
        } else {
            Err(StoreError::OutOfRange {
                position,
                len: self.rows.len(),
            })
        }
    }

    fn require(&self, id: RecordId) -> StoreResult<usize> {
        self.position_of(id).ok_or(StoreError::UnknownRecord(id))
    }

    // ── Mutations ─────────────────────────────────────────────

    pub(crate) fn append(&mut self, record: Record) -> StoreResult<RecordId> {
        let id = self.allocate_id();
        let mut rows = self.rows.clone();
        rows.push(StoredRecord { id, record });
        self.commit(rows)?;
        tracing::info!(%id, records = self.len(), "appended record");
        Ok(id)
    }

    /// Append a batch with a single write of the backing file.
    pub(crate) fn extend(&mut self, records: Vec<Record>) -> StoreResult<Vec<RecordId>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let mut rows = self.rows.clone();
        let ids: Vec<RecordId> = records
            .into_iter()
            .map(|record| {
                let id = self.allocate_id();
                rows.push(StoredRecord { id, record });
                id
            })
            .collect();
        self.commit(rows)?;
        tracing::info!(added = ids.len(), records = self.len(), "appended batch");
        Ok(ids)
    }

    /// Replace the whole row at `position`. The row keeps its id.
    pub(crate) fn update(&mut self, position: usize, record: Record) -> StoreResult<RecordId> {
        self.check_position(position)?;
        let mut rows = self.rows.clone();
        rows[position].record = record;
        let id = rows[position].id;
        self.commit(rows)?;
        tracing::info!(%id, position, "updated record");
        Ok(id)
    }

    pub(crate) fn update_by_id(&mut self, id: RecordId, record: Record) -> StoreResult<()> {
        let position = self.require(id)?;
        self.update(position, record)?;
        Ok(())
    }

    /// Remove the row at `position`; later rows move up by one.
    pub(crate) fn delete(&mut self, position: usize) -> StoreResult<StoredRecord> {
        self.check_position(position)?;
        let mut rows = self.rows.clone();
        let removed = rows.remove(position);
        self.commit(rows)?;
        tracing::info!(id = %removed.id, position, records = self.len(), "deleted record");
        Ok(removed)
    }

    pub(crate) fn delete_by_id(&mut self, id: RecordId) -> StoreResult<StoredRecord> {
        let position = self.require(id)?;
        self.delete(position)
    }

    pub(crate) fn set_status(&mut self, id: RecordId, status: PaymentStatus) -> StoreResult<()> {
        let position = self.require(id)?;
        if self.rows[position].status == Some(status) {
            return Ok(());
        }
        let mut rows = self.rows.clone();
        rows[position].record.status = Some(status);
        self.commit(rows)?;
        tracing::info!(%id, %status, "changed status");
        Ok(())
    }

    /// Flip every listed row that is still unpaid to paid. Rows are matched
    /// by id only. Returns how many rows changed.
    pub(crate) fn mark_paid(&mut self, ids: &HashSet<RecordId>) -> StoreResult<usize> {
        let mut rows = self.rows.clone();
        let mut changed = 0;
        for row in rows.iter_mut().filter(|r| ids.contains(&r.id)) {
            if row.is_unpaid() {
                row.record.status = Some(PaymentStatus::Paid);
                changed += 1;
            }
        }
        if changed > 0 {
            self.commit(rows)?;
        }
        tracing::info!(requested = ids.len(), changed, "marked records paid");
        Ok(changed)
    }
}

/// Write through a sibling temp file and rename it over `path`, so a failed
/// write never leaves a truncated store behind.
fn write_file(path: &Path, schema: &Schema, rows: &[StoredRecord]) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let written = File::create(&tmp).map_err(StoreError::from).and_then(|file| {
        sheet::write_records(BufWriter::new(file), schema, rows.iter().map(|r| &r.record))
    });
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    std::fs::rename(&tmp, path)?;
    tracing::debug!(path = %path.display(), records = rows.len(), "persisted store");
    Ok(())
}
