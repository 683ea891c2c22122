use chrono::{Local, NaiveDate};

use crate::{
    info_time, store, CityPrices, HttpFetcher, PageFetcher, PriceTable, Result, CITIES,
    DEFAULT_AVERAGE, STORE_PATH,
};

/// Scrapes every configured city for today, prints the table and appends it to the stored history.
pub async fn process_site() -> Result<()> {
    let start_time = Local::now();
    let fetcher = HttpFetcher::new(reqwest::Client::new());

    info_time!("Started scraping");
    let today = Local::now().date_naive();
    let new_data = process_cities(&fetcher, CITIES, today).await?;
    info_time!(start_time, "Collected the data!");
    println!("{new_data}");

    let local_now = Local::now();
    let history = store::load(STORE_PATH).await?;
    let merged = store::merge_history(history, new_data, today);
    store::save(STORE_PATH, &merged).await?;
    info_time!(local_now, "Wrote {} rows to file: {STORE_PATH}", merged.len());

    Ok(())
}

/// Collects every city in order, one after another, and concatenates their tables.
pub async fn process_cities<F: PageFetcher + ?Sized>(
    fetcher: &F,
    cities: &[(&str, &[&str])],
    date: NaiveDate,
) -> Result<PriceTable> {
    let mut tables = Vec::with_capacity(cities.len());
    for (city, neighbourhoods) in cities {
        let mut prices = CityPrices::new(*city, neighbourhoods.iter().copied(), DEFAULT_AVERAGE);
        prices.collect(fetcher, date).await?;
        tables.push(prices.to_table());
    }
    Ok(PriceTable::concat(tables))
}
