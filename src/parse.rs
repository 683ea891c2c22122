use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tokio::task::spawn_blocking;

use crate::{warn_time, Error, Result};

/// Room count -> price range, as found on one neighbourhood page.
pub type RoomPrices = BTreeMap<u32, PriceRange>;

/// Price bracket of the flats with a given room count. `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    min: u64,
    max: u64,
}

impl PriceRange {
    /// Builds a range from two bounds given in any order.
    pub fn new(a: u64, b: u64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn single(price: u64) -> Self {
        Self {
            min: price,
            max: price,
        }
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }
}

lazy_static! {
    static ref ROOMS_REGEX: Regex = Regex::new(r"\d+").unwrap();
    // "450 000 - 500 000", digit groups may be split by any whitespace.
    static ref RANGE_REGEX: Regex =
        Regex::new(r"^\s*(\d[\d\s]*?)\s*[-\x{2013}\x{2212}]\s*(\d[\d\s]*)").unwrap();
    static ref SINGLE_REGEX: Regex = Regex::new(r"^\s*(\d[\d\s]*)").unwrap();
}

const PRICING_SELECTOR: &str = ".pricing";
const CELL_SELECTOR: &str = "td";
const LABEL_SELECTOR: &str = "span";

/// Runs [`parse_price_table`] on the blocking pool so the parsed document never lives across an await.
pub(crate) async fn parse_page(html: Option<String>) -> Result<Option<RoomPrices>> {
    let prices = spawn_blocking(move || parse_price_table(html.as_deref())).await??;
    Ok(prices)
}

/// Extracts the room count -> price range table from a neighbourhood page.
///
/// Returns `Ok(None)` when there is no page at all and [`Error::MissingSection`] when the page
/// has no pricing section. Cells that can't be read are skipped with a warning.
pub fn parse_price_table(html: Option<&str>) -> Result<Option<RoomPrices>> {
    let Some(html) = html else {
        return Ok(None);
    };
    let doc = Html::parse_document(html);

    let pricing_selector = create_selector(PRICING_SELECTOR)?;
    let cell_selector = create_selector(CELL_SELECTOR)?;
    let label_selector = create_selector(LABEL_SELECTOR)?;

    let pricing = doc
        .select(&pricing_selector)
        .next()
        .ok_or(Error::MissingSection)?;

    let mut prices = RoomPrices::new();
    for cell in pricing.select(&cell_selector).filter(is_unclassed) {
        let Some(label) = cell.select(&label_selector).next() else {
            warn_time!("Skipping price cell without a room label: {:?}", own_text(&cell));
            continue;
        };
        let label = label.text().collect::<String>();
        let Some(rooms) = parse_rooms(&label) else {
            warn_time!("Skipping price cell, no room count in label {:?}", label);
            continue;
        };

        match parse_price(&own_text(&cell)) {
            Ok(range) => {
                prices.insert(rooms, range);
            }
            Err(err) => warn_time!("Skipping price cell for {} rooms: {}", rooms, err),
        }
    }
    Ok(Some(prices))
}

/// Price text may be a range `"A - B"` or a single value `"A"`.
/// Whitespace inside the digit groups is a thousands separator.
fn parse_price(text: &str) -> Result<PriceRange> {
    let malformed = || Error::MalformedPriceCell(text.to_string());

    if let Some(caps) = RANGE_REGEX.captures(text) {
        let min = parse_amount(&caps[1]).ok_or_else(malformed)?;
        let max = parse_amount(&caps[2]).ok_or_else(malformed)?;
        return Ok(PriceRange::new(min, max));
    }
    let caps = SINGLE_REGEX.captures(text).ok_or_else(malformed)?;
    let price = parse_amount(&caps[1]).ok_or_else(malformed)?;
    Ok(PriceRange::single(price))
}

#[inline]
fn parse_amount(digits: &str) -> Option<u64> {
    digits
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .parse()
        .ok()
}

/// Leading room count of a label, a flat has at least one room.
#[inline]
fn parse_rooms(label: &str) -> Option<u32> {
    ROOMS_REGEX
        .find(label)?
        .as_str()
        .parse()
        .ok()
        .filter(|rooms| *rooms > 0)
}

/// Pricing cells carry no class, headers and decorations do.
fn is_unclassed(cell: &ElementRef) -> bool {
    cell.value()
        .attr("class")
        .map_or(true, |class| class.trim().is_empty())
}

/// Text sitting directly in the element, skipping its child elements (the label `span`).
fn own_text(cell: &ElementRef) -> String {
    let mut text = String::new();
    for node in cell.children() {
        if let Some(part) = node.value().as_text() {
            text.push_str(part);
        }
    }
    text.trim().to_string()
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::ParseMissingSelector(sel_str.into()))
}
