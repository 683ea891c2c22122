use std::fmt;

use chrono::NaiveDate;

use crate::{PriceRange, PriceRow, PriceTable, RoomPrices};

/// How the `Avg Price` column is derived from a price range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AveragePolicy {
    /// `(min + min) / 2`, i.e. the minimum price. Matches the data stored so far.
    #[default]
    MinOnly,
    /// `(min + max) / 2`.
    Midpoint,
}

impl AveragePolicy {
    pub fn average(&self, range: PriceRange) -> f64 {
        match self {
            AveragePolicy::MinOnly => (range.min() as f64 + range.min() as f64) / 2.0,
            AveragePolicy::Midpoint => (range.min() as f64 + range.max() as f64) / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomPriceEntry {
    pub rooms: u32,
    pub range: PriceRange,
    pub avg_price: f64,
}

/// Prices of one neighbourhood as of one date, ordered by ascending room count.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighbourhoodSnapshot {
    date: NaiveDate,
    name: String,
    entries: Vec<RoomPriceEntry>,
}

impl NeighbourhoodSnapshot {
    /// `prices` is `None` when the page had nothing to parse; the snapshot is then empty.
    pub fn new(
        date: NaiveDate,
        name: impl Into<String>,
        prices: Option<RoomPrices>,
        policy: AveragePolicy,
    ) -> Self {
        // `RoomPrices` is a BTreeMap, so this iterates in ascending room count.
        let entries = prices
            .unwrap_or_default()
            .into_iter()
            .map(|(rooms, range)| RoomPriceEntry {
                rooms,
                range,
                avg_price: policy.average(range),
            })
            .collect();

        Self {
            date,
            name: name.into(),
            entries,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[RoomPriceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One row per room count, stamped with the neighbourhood name and date.
    pub fn to_table(&self) -> PriceTable {
        self.entries
            .iter()
            .map(|entry| PriceRow {
                neighbourhood: self.name.clone(),
                date: self.date,
                rooms: entry.rooms,
                min_price: entry.range.min(),
                max_price: entry.range.max(),
                avg_price: entry.avg_price,
            })
            .collect()
    }
}

impl fmt::Display for NeighbourhoodSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pricing for {} at {}:\n{}\nRooms\tMin\tMax\tAvg",
            self.name,
            self.date.format("%Y-%m-%d"),
            "-".repeat(40)
        )?;
        for entry in &self.entries {
            write!(
                f,
                "\n{}\t{}\t{}\t{}",
                entry.rooms,
                entry.range.min(),
                entry.range.max(),
                entry.avg_price
            )?;
        }
        Ok(())
    }
}
