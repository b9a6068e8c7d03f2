//! JSON file persistence for [`LedgerSnapshot`].

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    core::LedgerSnapshot,
    errors::{EngineError, Result},
};

/// Writes the snapshot atomically by staging to a sibling temporary file.
pub fn save_snapshot_to_file(snapshot: &LedgerSnapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = staging_path(path);
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    tracing::debug!(path = %path.display(), "snapshot saved");
    Ok(())
}

pub fn load_snapshot_from_file(path: &Path) -> Result<LedgerSnapshot> {
    if !path.exists() {
        return Err(EngineError::NotFound(format!(
            "snapshot file {}",
            path.display()
        )));
    }
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Loads the snapshot at `path`, or an empty one if the file does not exist yet.
pub fn load_or_default(path: &Path) -> Result<LedgerSnapshot> {
    match load_snapshot_from_file(path) {
        Err(EngineError::NotFound(_)) => Ok(LedgerSnapshot::default()),
        other => other,
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{
        BudgetCategoryRecord, CategoryKind, Frequency, RecurringTemplate, TransactionKind,
        TransactionRecord,
    };
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[test]
    fn snapshot_survives_a_round_trip_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.json");
        let start = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let snapshot = LedgerSnapshot::new()
            .with_transactions(vec![TransactionRecord::expense(
                dec!(12.34),
                start,
                CategoryKind::Dining,
            )])
            .with_categories(vec![
                BudgetCategoryRecord::new(CategoryKind::Dining, dec!(150.00)).unwrap(),
            ])
            .with_templates(vec![RecurringTemplate::new(
                "Phone",
                dec!(35),
                TransactionKind::Expense,
                Frequency::Monthly,
                start,
            )
            .unwrap()]);

        save_snapshot_to_file(&snapshot, &path).unwrap();
        assert!(!staging_path(&path).exists());
        let loaded = load_snapshot_from_file(&path).unwrap();
        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.transactions[0].amount, dec!(12.34));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(
            load_snapshot_from_file(&path),
            Err(EngineError::NotFound(_))
        ));
        assert!(load_or_default(&path).unwrap().transactions.is_empty());
    }

    #[test]
    fn corrupt_file_reports_serde_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_snapshot_from_file(&path),
            Err(EngineError::Serde(_))
        ));
    }
}
