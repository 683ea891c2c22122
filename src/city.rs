use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};

use crate::parse::parse_page;
use crate::{
    info_time, warn_time, AveragePolicy, Error, NeighbourhoodSnapshot, PageFetcher, PriceTable,
    Result,
};

/// Neighbourhood name -> snapshot, for a single date.
pub type DaySnapshots = BTreeMap<String, NeighbourhoodSnapshot>;

/// Dated price snapshots of every neighbourhood of one city.
#[derive(Debug, Clone)]
pub struct CityPrices {
    city: String,
    neighbourhoods: Vec<String>,
    data: BTreeMap<NaiveDate, DaySnapshots>,
    policy: AveragePolicy,
}

impl CityPrices {
    /// Empty neighbourhood identifiers are dropped here and never fetched.
    pub fn new<S: Into<String>>(
        city: impl Into<String>,
        neighbourhoods: impl IntoIterator<Item = S>,
        policy: AveragePolicy,
    ) -> Self {
        let neighbourhoods = neighbourhoods
            .into_iter()
            .map(Into::into)
            .filter(|n: &String| !n.trim().is_empty())
            .collect();

        Self {
            city: city.into(),
            neighbourhoods,
            data: BTreeMap::new(),
            policy,
        }
    }

    /// Neighbourhoods that will be fetched on the next collection.
    pub fn neighbourhoods(&self) -> &[String] {
        &self.neighbourhoods
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.data.keys().copied()
    }

    pub fn snapshots(&self, date: NaiveDate) -> Option<&DaySnapshots> {
        self.data.get(&date)
    }

    /// Fetches and parses every neighbourhood and stores the snapshots under `date`,
    /// replacing whatever was stored for that date before.
    ///
    /// A neighbourhood whose page is unavailable is removed from the neighbourhood list.
    /// A page without a pricing section is skipped for this run only.
    pub async fn collect<F: PageFetcher + ?Sized>(&mut self, fetcher: &F, date: NaiveDate) -> Result<()> {
        let start_time = Local::now();
        info_time!("Collecting prices for {}", self.city);

        let mut results = DaySnapshots::new();
        let mut unavailable = Vec::new();
        for neighb in &self.neighbourhoods {
            let Some(html) = fetcher.fetch(&self.city, neighb).await else {
                warn_time!(
                    "Removing {} from the list - could not retrieve information from the website for this neighbourhood",
                    neighb
                );
                unavailable.push(neighb.clone());
                continue;
            };

            let prices = match parse_page(Some(html)).await {
                Ok(prices) => prices,
                Err(Error::MissingSection) => {
                    warn_time!("Skipping {} in {}: {}", neighb, self.city, Error::MissingSection);
                    continue;
                }
                Err(err) => return Err(err),
            };

            let snapshot = NeighbourhoodSnapshot::new(date, neighb.as_str(), prices, self.policy);
            info_time!("{}", snapshot);
            results.insert(neighb.clone(), snapshot);
        }

        self.neighbourhoods.retain(|n| !unavailable.contains(n));
        self.upsert(date, results);
        info_time!(start_time, "Finished collecting prices for {}", self.city);
        Ok(())
    }

    /// Stores the snapshots of `date`, replacing an existing entry for the same date.
    pub fn upsert(&mut self, date: NaiveDate, snapshots: DaySnapshots) {
        self.data.insert(date, snapshots);
    }

    /// Flattens every stored date and neighbourhood into one table.
    /// Empty if nothing has been collected yet.
    pub fn to_table(&self) -> PriceTable {
        PriceTable::concat(
            self.data
                .values()
                .flat_map(|day| day.values())
                .map(NeighbourhoodSnapshot::to_table),
        )
    }
}
