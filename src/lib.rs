//! Flat price scraper.
//! Pulls the room-count / price table from every neighbourhood page of a city,
//! stamps it with the run date and flattens all cities into one table.

mod city;
mod error;
mod macros;
mod parse;
pub mod process;
mod request;
mod snapshot;
pub mod store;
mod table;

pub use city::{CityPrices, DaySnapshots};
pub use error::{Error, Result};
pub use parse::{parse_price_table, PriceRange, RoomPrices};
pub use request::{HttpFetcher, PageFetcher};
pub use snapshot::{AveragePolicy, NeighbourhoodSnapshot, RoomPriceEntry};
pub use table::{PriceRow, PriceTable};

const BASE_URL: &str = "https://www.investkomfort.pl";
const STORE_PATH: &str = "price_data.json";
/// Legacy data was stored with the average derived from the minimum price only.
const DEFAULT_AVERAGE: AveragePolicy = AveragePolicy::MinOnly;

/// Cities and the neighbourhoods scraped for each of them.
pub const CITIES: &[(&str, &[&str])] = &[
    ("gdynia", &["portova", "silva", "nowe-orlowo", "nowe-kolibki"]),
    ("sopot", &["okrzei"]),
    ("gdansk", &["botanica", "nadmorski-dwor", "gdanska"]),
];
