//! Persistence of the flat price table as JSON.

use std::io::ErrorKind;
use std::path::Path;

use chrono::NaiveDate;
use tokio::{fs::File, io::AsyncWriteExt};

use crate::{PriceTable, Result};

/// Loads a stored table. A missing file is an empty history.
pub async fn load(path: impl AsRef<Path>) -> Result<PriceTable> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(PriceTable::default()),
        Err(err) => return Err(err.into()),
    };
    Ok(serde_json::from_slice(&bytes)?)
}

pub async fn save(path: impl AsRef<Path>, table: &PriceTable) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(table)?;
    let mut file = File::create(path).await?;
    file.write_all(&bytes).await?;
    file.flush().await?;
    Ok(())
}

/// Appends the run of `date` to the stored history. Every stored row of `date` is dropped
/// first, so re-running a day replaces it even when the new run came back empty.
pub fn merge_history(existing: PriceTable, new: PriceTable, date: NaiveDate) -> PriceTable {
    let mut merged = existing;
    merged.retain(|row| row.date != date);
    merged.extend(new);
    merged
}
