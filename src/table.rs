use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the flat table: the prices of flats with `rooms` rooms in one neighbourhood on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    #[serde(rename = "Neighbourhood")]
    pub neighbourhood: String,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Rooms")]
    pub rooms: u32,
    #[serde(rename = "Min Price")]
    pub min_price: u64,
    #[serde(rename = "Max Price")]
    pub max_price: u64,
    #[serde(rename = "Avg Price")]
    pub avg_price: f64,
}

/// Row oriented price table, the unit that is aggregated across cities and persisted.
/// Rows are indexed by their position, so the index is always contiguous.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTable {
    rows: Vec<PriceRow>,
}

impl PriceTable {
    pub const COLUMNS: [&'static str; 6] = [
        "Neighbourhood",
        "Date",
        "Rooms",
        "Min Price",
        "Max Price",
        "Avg Price",
    ];

    pub fn new(rows: Vec<PriceRow>) -> Self {
        Self { rows }
    }

    /// Concatenates the tables in order into a single one.
    pub fn concat(tables: impl IntoIterator<Item = PriceTable>) -> Self {
        let rows = tables.into_iter().flat_map(|table| table.rows).collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn extend(&mut self, other: PriceTable) {
        self.rows.extend(other.rows);
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&PriceRow) -> bool) {
        self.rows.retain(keep);
    }
}

impl FromIterator<PriceRow> for PriceTable {
    fn from_iter<I: IntoIterator<Item = PriceRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for PriceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [neighb, date, rooms, min, max, avg] = Self::COLUMNS;
        write!(
            f,
            "{:>5}  {:<20} {:<10} {:>5} {:>12} {:>12} {:>12}",
            "", neighb, date, rooms, min, max, avg
        )?;
        for (idx, row) in self.rows.iter().enumerate() {
            write!(
                f,
                "\n{:>5}  {:<20} {:<10} {:>5} {:>12} {:>12} {:>12.1}",
                idx,
                row.neighbourhood,
                row.date.format("%Y-%m-%d"),
                row.rooms,
                row.min_price,
                row.max_price,
                row.avg_price
            )?;
        }
        Ok(())
    }
}
