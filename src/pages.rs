//! Page-selection expressions.
//!
//! Parses and formats the page-range strings users type when choosing
//! which pages of a PDF to include:
//! - `"5"` - single page
//! - `"1-5"` - inclusive range
//! - `"1-3, 5, 7-9"` - combination, in any order
//!
//! [`parse`] always returns a sorted, deduplicated selection; [`format`]
//! renders a set of pages back into the shortest equivalent expression.
//! The two are not strict inverses: formatting normalizes to sorted,
//! coalesced form.

use std::collections::BTreeSet;

use crate::error::{MergeError, Result};

/// Parse a page-selection expression against a document of `max_pages`.
///
/// Tokens are comma-separated; each token is a 1-based page number or an
/// inclusive `start-end` range. Whitespace around tokens and around the
/// range dash is ignored. The result is deduplicated and ascending
/// regardless of input order.
///
/// # Errors
///
/// Returns [`MergeError::InvalidPage`] for a singleton outside
/// `[1, max_pages]` or a non-numeric token, and
/// [`MergeError::InvalidRange`] for a malformed range, `start > end`, or
/// a bound outside `[1, max_pages]`.
///
/// # Examples
///
/// ```
/// use docmerge::pages;
///
/// let selection = pages::parse("1-3, 5", 10).unwrap();
/// assert_eq!(selection, vec![1, 2, 3, 5]);
/// ```
pub fn parse(expression: &str, max_pages: u32) -> Result<Vec<u32>> {
    let mut pages = BTreeSet::new();

    for part in expression.split(',') {
        let part = part.trim();

        if let Some((start, end)) = part.split_once('-') {
            let start: u32 = start
                .trim()
                .parse()
                .map_err(|_| MergeError::invalid_range(part, max_pages))?;
            let end: u32 = end
                .trim()
                .parse()
                .map_err(|_| MergeError::invalid_range(part, max_pages))?;

            if start < 1 || end > max_pages || start > end {
                return Err(MergeError::invalid_range(part, max_pages));
            }

            pages.extend(start..=end);
        } else {
            let page: u32 = part
                .parse()
                .map_err(|_| MergeError::invalid_page(part, max_pages))?;

            if page < 1 || page > max_pages {
                return Err(MergeError::invalid_page(part, max_pages));
            }

            pages.insert(page);
        }
    }

    Ok(pages.into_iter().collect())
}

/// Format a set of page numbers as a display expression.
///
/// Sorts ascending, deduplicates, then greedily coalesces maximal runs of
/// consecutive pages into `start-end` tokens. Runs of length one render
/// as a bare number; runs of length two already render as a range
/// (`[5, 6]` becomes `"5-6"`). Tokens are joined with `", "`. An empty
/// input yields the empty string.
///
/// # Examples
///
/// ```
/// use docmerge::pages;
///
/// assert_eq!(pages::format(&[9, 1, 2, 3, 7, 8, 5]), "1-3, 5, 7-9");
/// ```
pub fn format(pages: &[u32]) -> String {
    if pages.is_empty() {
        return String::new();
    }

    let mut sorted = pages.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut tokens = Vec::new();
    let mut start = sorted[0];
    let mut end = sorted[0];

    for &page in &sorted[1..] {
        if page == end + 1 {
            end = page;
        } else {
            tokens.push(run_token(start, end));
            start = page;
            end = page;
        }
    }

    tokens.push(run_token(start, end));
    tokens.join(", ")
}

fn run_token(start: u32, end: u32) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{start}-{end}")
    }
}
