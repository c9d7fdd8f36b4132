//! Extraction of results and pagination links from one BTDigg page.
//!
//! Pure functions over HTML so they can be exercised offline.

use anirent_core::RawResult;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{BtDiggError, BtDiggResult};

/// Everything the provider needs from one result page.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResultsPage {
    /// Hits in document order.
    pub results: Vec<RawResult>,
    /// Absolute URLs of other result pages linked from this one.
    pub links: Vec<Url>,
}

fn selector(css: &str) -> BtDiggResult<Selector> {
    Selector::parse(css).map_err(|e| BtDiggError::Selector(format!("{css}: {e:?}")))
}

fn child_text(el: &ElementRef<'_>, sel: &Selector) -> Option<String> {
    let text = el
        .select(sel)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    (!text.is_empty()).then_some(text)
}

/// Parse one page fetched from `page_url`.
///
/// Results without a name or magnet link are skipped. Pagination links are
/// `/search` hrefs carrying a `p=` parameter, resolved against `page_url`.
pub fn parse_page(html: &str, page_url: &Url) -> BtDiggResult<ResultsPage> {
    let document = Html::parse_document(html);

    let result_sel = selector("div.one_result")?;
    let name_sel = selector("div.torrent_name")?;
    let magnet_sel = selector("div.torrent_magnet a")?;
    let link_sel = selector("a[href]")?;

    let results = document
        .select(&result_sel)
        .filter_map(|el| {
            let name = child_text(&el, &name_sel)?;
            let magnet = el
                .select(&magnet_sel)
                .next()?
                .value()
                .attr("href")?
                .trim()
                .to_string();
            (!magnet.is_empty()).then(|| RawResult::new(name, magnet))
        })
        .collect();

    let links = document
        .select(&link_sel)
        .filter_map(|el| el.value().attr("href"))
        .filter(|href| href.starts_with("/search") && href.contains("p="))
        .filter_map(|href| page_url.join(href).ok())
        .collect();

    Ok(ResultsPage { results, links })
}
