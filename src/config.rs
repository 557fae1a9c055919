use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::models::LedgerKind;
use crate::store::RecordStore;

pub(crate) const DATA_DIR_ENV: &str = "TALLYTUI_DATA_DIR";
pub(crate) const EXPORT_DIR_ENV: &str = "TALLYTUI_EXPORT_DIR";
pub(crate) const LEDGER_ENV: &str = "TALLYTUI_LEDGER";

const LOG_FILE: &str = "tallytui.log";

/// Settings resolved once at start-up from the environment and global flags.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) data_dir: PathBuf,
    pub(crate) export_dir: PathBuf,
    pub(crate) ledger: LedgerKind,
    pub(crate) in_memory: bool,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    fn resolve(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_blank = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let data_dir = match non_blank(DATA_DIR_ENV) {
            Some(dir) => PathBuf::from(expand_home(&dir)),
            None => directories::ProjectDirs::from("com", "tallytui", "TallyTUI")
                .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?
                .data_dir()
                .to_path_buf(),
        };

        let export_dir = non_blank(EXPORT_DIR_ENV)
            .map(|dir| PathBuf::from(expand_home(&dir)))
            .unwrap_or_else(|| PathBuf::from("."));

        let ledger = match non_blank(LEDGER_ENV) {
            Some(name) => LedgerKind::parse(&name)
                .ok_or_else(|| anyhow::anyhow!("{LEDGER_ENV}: unknown ledger '{name}'"))?,
            None => LedgerKind::Invoices,
        };

        Ok(Self {
            data_dir,
            export_dir,
            ledger,
            in_memory: false,
        })
    }

    /// Consume the global `--ledger <kind>` and `--memory` flags wherever
    /// they appear and return the remaining arguments.
    pub(crate) fn apply_flags(&mut self, args: &[String]) -> Result<Vec<String>> {
        let mut rest = Vec::with_capacity(args.len());
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--memory" => self.in_memory = true,
                "--ledger" => {
                    let name = iter
                        .next()
                        .ok_or_else(|| anyhow::anyhow!("--ledger needs a value (invoices or expenses)"))?;
                    self.ledger = LedgerKind::parse(name)
                        .ok_or_else(|| anyhow::anyhow!("Unknown ledger: {name}"))?;
                }
                _ => rest.push(arg.clone()),
            }
        }
        Ok(rest)
    }

    pub(crate) fn ensure_data_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir).with_context(|| {
            format!(
                "Failed to create data directory: {}",
                self.data_dir.display()
            )
        })
    }

    pub(crate) fn store_path(&self, kind: LedgerKind) -> PathBuf {
        self.data_dir.join(format!("{}.csv", kind.as_str()))
    }

    pub(crate) fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }

    pub(crate) fn export_path(&self, file_name: &str) -> PathBuf {
        self.export_dir.join(file_name)
    }

    pub(crate) fn open_store(&self, kind: LedgerKind) -> Result<RecordStore> {
        if self.in_memory {
            return Ok(RecordStore::in_memory(kind.schema()));
        }
        let path = self.store_path(kind);
        RecordStore::open(&path, kind.schema())
            .with_context(|| format!("Failed to load {}", path.display()))
    }
}

pub(crate) fn expand_home(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
