//! # CSV Connection
//!
//! Owns the data directory layout and the write lock shared by every
//! repository created from it.
//!
//! ```text
//! data/
//! ├── recurring_expense_types.yaml
//! └── users/
//!     └── {user_directory}/
//!         ├── recurring_expenses.yaml
//!         └── transactions.csv
//! ```

use anyhow::Result;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use super::recurring_expense_repository::RecurringExpenseRepository;
use super::recurring_expense_type_repository::RecurringExpenseTypeRepository;
use super::transaction_repository::TransactionRepository;
use crate::backend::storage::traits::Connection;

/// CsvConnection manages file paths and serializes read-modify-write cycles
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Hold this guard across any read-modify-write of the data files
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    /// Map a user ID onto a directory name.
    ///
    /// ASCII alphanumerics, `-` and `_` are kept; every other character is
    /// hex-escaped so that distinct IDs never share a directory.
    pub fn safe_directory_name(user_id: &str) -> String {
        let mut name = String::with_capacity(user_id.len());
        for c in user_id.chars() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                name.push(c);
            } else {
                name.push_str(&format!("~{:x}", c as u32));
            }
        }
        if name.is_empty() {
            name.push('~');
        }
        name
    }

    pub fn user_directory(&self, user_id: &str) -> PathBuf {
        self.base_directory
            .join("users")
            .join(Self::safe_directory_name(user_id))
    }

    pub fn ensure_user_directory(&self, user_id: &str) -> Result<PathBuf> {
        let dir = self.user_directory(user_id);
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            debug!("Created user directory: {}", dir.display());
        }
        Ok(dir)
    }

    pub fn recurring_expenses_file_path(&self, user_id: &str) -> PathBuf {
        self.user_directory(user_id).join("recurring_expenses.yaml")
    }

    pub fn transactions_file_path(&self, user_id: &str) -> PathBuf {
        self.user_directory(user_id).join("transactions.csv")
    }

    pub fn recurring_expense_types_file_path(&self) -> PathBuf {
        self.base_directory.join("recurring_expense_types.yaml")
    }

    /// Write a file atomically: write to a temp file, then rename over the target
    pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, contents)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

impl Connection for CsvConnection {
    type RecurringExpenseRepository = RecurringExpenseRepository;
    type RecurringExpenseTypeRepository = RecurringExpenseTypeRepository;
    type TransactionRepository = TransactionRepository;

    fn create_recurring_expense_repository(&self) -> Self::RecurringExpenseRepository {
        RecurringExpenseRepository::new(self.clone())
    }

    fn create_recurring_expense_type_repository(&self) -> Self::RecurringExpenseTypeRepository {
        RecurringExpenseTypeRepository::new(self.clone())
    }

    fn create_transaction_repository(&self) -> Self::TransactionRepository {
        TransactionRepository::new(self.clone())
    }
}
