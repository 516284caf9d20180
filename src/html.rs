//! CSS-selector lookups over HTML fragments.
//!
//! Thin helpers around `scraper` that work on strings, so callers can pass
//! an element's inner HTML around and query it again later.

use scraper::{ElementRef, Html, Selector};

use crate::error::{ParserError, Result};

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ParserError::Selector(format!("{css}: {e:?}")))
}

/// Inner HTML of every element matching `css`.
pub fn select_all(html: &str, css: &str) -> Result<Vec<String>> {
    let doc = Html::parse_fragment(html);
    let sel = selector(css)?;
    Ok(doc.select(&sel).map(|el| el.inner_html()).collect())
}

/// Trimmed text of the first element matching `css`.
pub fn select_text(html: &str, css: &str) -> Result<Option<String>> {
    let doc = Html::parse_fragment(html);
    let sel = selector(css)?;
    Ok(doc.select(&sel).next().map(|el| element_text(&el)))
}

/// Attribute `attr` of the first element matching `css`.
pub fn select_attr(html: &str, css: &str, attr: &str) -> Result<Option<String>> {
    let doc = Html::parse_fragment(html);
    let sel = selector(css)?;
    Ok(doc
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::to_string))
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
