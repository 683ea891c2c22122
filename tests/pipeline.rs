use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use komfort_prices::{
    parse_price_table, process::process_cities, store, AveragePolicy, NeighbourhoodSnapshot,
    PageFetcher, PriceRange, PriceTable,
};

struct SitePages(HashMap<(String, String), String>);

impl SitePages {
    fn new(pages: &[(&str, &str, String)]) -> Self {
        Self(
            pages
                .iter()
                .map(|(city, neighb, html)| ((city.to_string(), neighb.to_string()), html.clone()))
                .collect(),
        )
    }
}

#[async_trait]
impl PageFetcher for SitePages {
    async fn fetch(&self, city: &str, neighbourhood: &str) -> Option<String> {
        self.0.get(&(city.to_string(), neighbourhood.to_string())).cloned()
    }
}

fn pricing_page(cells: &[(&str, &str)]) -> String {
    let cells: String = cells
        .iter()
        .map(|(label, price)| format!("<td><span>{label}</span>{price}</td>"))
        .collect();
    format!(
        r#"<!DOCTYPE html><html><head><title>Ceny</title></head><body>
        <nav class="menu"><a href="/">Start</a></nav>
        <section class="pricing"><table>
        <tr><td class="title">Ceny mieszkań</td></tr>
        <tr>{cells}</tr>
        </table></section></body></html>"#
    )
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 30).unwrap()
}

#[test]
fn two_cell_page_end_to_end() {
    let html = pricing_page(&[("2 pok.", "450 000 - 500 000"), ("3 pok.", "600 000")]);

    let prices = parse_price_table(Some(&html)).unwrap().unwrap();
    assert_eq!(prices.len(), 2);
    assert_eq!(prices[&2], PriceRange::new(450_000, 500_000));
    assert_eq!(prices[&3], PriceRange::new(600_000, 600_000));

    let snapshot = NeighbourhoodSnapshot::new(date(), "portova", Some(prices), AveragePolicy::MinOnly);
    let table = snapshot.to_table();
    let rows: Vec<_> = table
        .rows()
        .iter()
        .map(|r| (r.rooms, r.min_price, r.max_price, r.avg_price))
        .collect();
    assert_eq!(
        rows,
        [(2, 450_000, 500_000, 450_000.0), (3, 600_000, 600_000, 600_000.0)]
    );
}

#[tokio::test]
async fn cities_are_aggregated_into_one_table() {
    let two_rooms = pricing_page(&[("2 pok.", "450 000 - 500 000"), ("3 pok.", "600 000")]);
    let one_room = pricing_page(&[("1 pok.", "320 000 - 350 000")]);
    let fetcher = SitePages::new(&[
        ("gdynia", "portova", two_rooms.clone()),
        ("gdynia", "silva", two_rooms.clone()),
        ("sopot", "okrzei", one_room),
        ("gdansk", "botanica", "<html><body>brak cennika</body></html>".to_string()),
        ("gdansk", "gdanska", two_rooms),
    ]);
    let cities: &[(&str, &[&str])] = &[
        ("gdynia", &["portova", "", "silva", "nowe-kolibki"]),
        ("sopot", &["okrzei"]),
        ("gdansk", &["botanica", "nadmorski-dwor", "gdanska"]),
    ];

    let table = process_cities(&fetcher, cities, date()).await.unwrap();

    assert_eq!(table.len(), 2 + 2 + 1 + 2);
    let neighbourhoods: Vec<_> = table.rows().iter().map(|r| r.neighbourhood.as_str()).collect();
    assert_eq!(
        neighbourhoods,
        ["portova", "portova", "silva", "silva", "okrzei", "gdanska", "gdanska"]
    );
    assert!(table.rows().iter().all(|r| r.date == date()));

    let rendered = table.to_string();
    let last = rendered.lines().last().unwrap();
    assert!(last.trim_start().starts_with("6 "));
}

#[tokio::test]
async fn stored_history_survives_a_rerun() {
    let page = pricing_page(&[("2 pok.", "450 000 - 500 000")]);
    let fetcher = SitePages::new(&[("sopot", "okrzei", page)]);
    let cities: &[(&str, &[&str])] = &[("sopot", &["okrzei"])];
    let path = std::env::temp_dir().join(format!("komfort_prices_rerun_{}.json", std::process::id()));

    for _ in 0..2 {
        let new_data = process_cities(&fetcher, cities, date()).await.unwrap();
        let history = store::load(&path).await.unwrap();
        store::save(&path, &store::merge_history(history, new_data, date())).await.unwrap();
    }
    let stored: PriceTable = store::load(&path).await.unwrap();
    tokio::fs::remove_file(&path).await.unwrap();

    assert_eq!(stored.len(), 1);
    assert_eq!(stored.rows()[0].neighbourhood, "okrzei");
}

/// Serves the page on the first request only, then reports it as unavailable.
struct FirstCallOnly {
    page: String,
    calls: AtomicUsize,
}

#[async_trait]
impl PageFetcher for FirstCallOnly {
    async fn fetch(&self, _city: &str, _neighbourhood: &str) -> Option<String> {
        match self.calls.fetch_add(1, Ordering::SeqCst) {
            0 => Some(self.page.clone()),
            _ => None,
        }
    }
}

#[tokio::test]
async fn empty_rerun_replaces_stored_day() {
    let fetcher = FirstCallOnly {
        page: pricing_page(&[("2 pok.", "450 000 - 500 000")]),
        calls: AtomicUsize::new(0),
    };
    let cities: &[(&str, &[&str])] = &[("sopot", &["okrzei"])];
    let path = std::env::temp_dir().join(format!("komfort_prices_empty_rerun_{}.json", std::process::id()));

    let mut run_rows = Vec::new();
    for _ in 0..2 {
        let new_data = process_cities(&fetcher, cities, date()).await.unwrap();
        run_rows.push(new_data.len());
        let history = store::load(&path).await.unwrap();
        store::save(&path, &store::merge_history(history, new_data, date())).await.unwrap();
    }
    let stored = store::load(&path).await.unwrap();
    tokio::fs::remove_file(&path).await.unwrap();

    assert_eq!(run_rows, [1, 0]);
    assert!(stored.rows().iter().all(|r| r.date != date()));
    assert!(stored.is_empty());
}
