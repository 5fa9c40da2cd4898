//! Mapping of a feed entry's `properties` onto a [`RateSet`].

use rust_decimal::Decimal;
use tracing::debug;

use super::feed::{last_entry, unique_child_with_suffix, Element};
use super::types::{DecimalContext, RateKind, RateSet};
use crate::error::{FeedError, FeedResult};

/// Build a [`RateSet`] from an OData `properties` element.
///
/// Children are matched by tag suffix: `DATE`, `5YEAR`, `10YEAR`, `20YEAR`
/// and `30YEAR`. Everything else (1MONTH, 2YEAR, ...) is ignored. Tenors not
/// present stay `None`. A present tenor with unparseable text is an error.
pub fn extract_rates(
    properties: &Element,
    kind: RateKind,
    ctx: &DecimalContext,
) -> FeedResult<RateSet> {
    let mut rates = RateSet::new(kind);

    for child in &properties.children {
        let tag = child.tag.as_str();
        if tag.ends_with("DATE") {
            rates.date = child.trimmed_text().to_string();
        } else if tag.ends_with("5YEAR") {
            rates.y5 = parse_tenor(child, ctx)?;
        } else if tag.ends_with("10YEAR") {
            rates.y10 = parse_tenor(child, ctx)?;
        } else if tag.ends_with("20YEAR") {
            rates.y20 = parse_tenor(child, ctx)?;
        } else if tag.ends_with("30YEAR") {
            rates.y30 = parse_tenor(child, ctx)?;
        }
    }

    Ok(rates)
}

fn parse_tenor(element: &Element, ctx: &DecimalContext) -> FeedResult<Option<Decimal>> {
    if element.is_null() {
        debug!("{} is null in feed", element.tag);
        return Ok(None);
    }
    let text = element.trimmed_text();
    ctx.parse(text)
        .map(Some)
        .map_err(|_| FeedError::InvalidRate {
            field: element.tag.clone(),
            value: text.to_string(),
        })
}

/// Extract the latest [`RateSet`] from a parsed feed document.
///
/// Walks `entry[last]/content/properties`. Returns `Ok(None)` when the feed
/// has no entries.
pub fn rates_from_document(
    root: &Element,
    kind: RateKind,
    ctx: &DecimalContext,
) -> FeedResult<Option<RateSet>> {
    let Some(entry) = last_entry(root) else {
        return Ok(None);
    };
    let content = unique_child_with_suffix(entry, "content")?;
    let properties = unique_child_with_suffix(content, "properties")?;
    extract_rates(properties, kind, ctx).map(Some)
}
