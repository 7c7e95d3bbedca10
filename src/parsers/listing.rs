use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::clean_text;
use crate::error::{Error, Result};
use crate::models::{ListingEntry, ListingPage};

static PAGE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"a[aria-label="Seite"]"#).expect("Invalid page selector")
});
static CHECKBOX_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"input[type="checkbox"]"#).expect("Invalid checkbox selector")
});
static RECEIPT_LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a.ui-js-toggle-modal").expect("Invalid receipt link selector")
});
static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("Invalid cell selector"));

const SELECT_ALL_VALUE: &str = "all";
const RECEIPT_ID_PARAM: &str = "receiptId";

/// Parse one receipt history page into its page count and entries.
pub fn parse_listing_page(html: &str, base_url: &str) -> Result<ListingPage> {
    let document = Html::parse_document(html);
    let base = Url::parse(base_url)
        .map_err(|e| Error::decode(format!("invalid base url {}: {}", base_url, e)))?;

    let total_pages = document
        .select(&PAGE_SELECTOR)
        .filter_map(|a| a.value().attr("data-value"))
        .filter_map(|value| value.trim().parse::<u32>().ok())
        .max()
        .unwrap_or(1)
        .max(1);

    // Flattened in document order so each checkbox can look forward for its cells.
    let elements: Vec<ElementRef> = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .collect();

    let mut entries: Vec<ListingEntry> = Vec::new();

    for (pos, element) in elements.iter().enumerate() {
        if !CHECKBOX_SELECTOR.matches(element) {
            continue;
        }

        let download_id = element
            .value()
            .attr("value")
            .ok_or_else(|| Error::decode("checkbox without a value attribute"))?;
        if download_id.contains(SELECT_ALL_VALUE) {
            continue;
        }

        let entry = read_entry(&elements, pos, download_id, &base)?;
        match entries.iter_mut().find(|e| e.download_id == entry.download_id) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
    }

    debug!("Listing page: {} entries, {} pages in total", entries.len(), total_pages);

    Ok(ListingPage {
        total_pages,
        entries,
    })
}

fn read_entry(
    elements: &[ElementRef],
    checkbox: usize,
    download_id: &str,
    base: &Url,
) -> Result<ListingEntry> {
    let missing = |what: &str| Error::decode(format!("entry {} has no {}", download_id, what));

    let link_pos = next_matching(elements, checkbox, &RECEIPT_LINK_SELECTOR)
        .ok_or_else(|| missing("receipt link"))?;
    let href = elements[link_pos]
        .value()
        .attr("href")
        .ok_or_else(|| missing("receipt link href"))?;
    let link = base
        .join(href)
        .map_err(|e| Error::decode(format!("entry {} has a bad link {:?}: {}", download_id, href, e)))?;
    let receipt_id = link
        .query_pairs()
        .find(|(key, _)| key == RECEIPT_ID_PARAM)
        .and_then(|(_, value)| value.split('?').next().map(str::to_string))
        .filter(|id| !id.is_empty())
        .ok_or_else(|| missing("receiptId parameter"))?;

    let store_pos = next_matching(elements, link_pos, &CELL_SELECTOR).ok_or_else(|| missing("store cell"))?;
    let cost_pos = next_matching(elements, store_pos, &CELL_SELECTOR).ok_or_else(|| missing("cost cell"))?;
    let points_pos = next_matching(elements, cost_pos, &CELL_SELECTOR).ok_or_else(|| missing("points cell"))?;

    Ok(ListingEntry {
        download_id: download_id.to_string(),
        receipt_id,
        pdf_ref: href.to_string(),
        store_name: cell_text(&elements[store_pos]),
        cost: cell_text(&elements[cost_pos]),
        cumulus_points: cell_text(&elements[points_pos]),
    })
}

fn next_matching(elements: &[ElementRef], from: usize, selector: &Selector) -> Option<usize> {
    elements[from + 1..]
        .iter()
        .position(|el| selector.matches(el))
        .map(|offset| from + 1 + offset)
}

fn cell_text(element: &ElementRef) -> String {
    clean_text(&element.text().collect::<String>())
}
