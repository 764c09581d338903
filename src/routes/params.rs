//! Query-string parameters. Every value arrives as a string and malformed
//! numbers quietly fall back to "no constraint" instead of rejecting the
//! request.

use serde::Deserialize;
use utoipa::IntoParams;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Page number, default 1.
    pub page: Option<String>,
    /// Items per page, default 20.
    pub page_size: Option<String>,
}

impl Pagination {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: Some(page.to_string()),
            page_size: Some(page_size.to_string()),
        }
    }

    /// `(page, per_page, offset)` with defaults applied.
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = parse_number::<i64>(self.page.as_deref()).unwrap_or(1).max(1);
        let per_page = parse_number::<i64>(self.page_size.as_deref())
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOrder {
    Featured,
    Lowest,
    Highest,
    TopRated,
    Newest,
    Default,
}

impl SearchOrder {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("featured") => SearchOrder::Featured,
            Some("lowest") => SearchOrder::Lowest,
            Some("highest") => SearchOrder::Highest,
            Some("toprated") => SearchOrder::TopRated,
            Some("newest") => SearchOrder::Newest,
            _ => SearchOrder::Default,
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
    /// Case-insensitive name substring, `all` for none.
    pub query: Option<String>,
    /// Inclusive price range `min-max`, `all` for none.
    pub price: Option<String>,
    /// Minimum average rating, `all` for none.
    pub rating: Option<String>,
    /// featured | lowest | highest | toprated | newest
    pub order: Option<String>,
}

/// Parsed form of [`SearchQuery`]; every filter is optional and ANDed.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilters {
    pub name: Option<String>,
    pub price: Option<(f64, f64)>,
    pub min_rating: Option<f64>,
    pub order: SearchOrder,
}

impl SearchQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page.clone(),
            page_size: self.page_size.clone(),
        }
    }

    pub fn filters(&self) -> SearchFilters {
        SearchFilters {
            name: active(self.query.as_deref()).map(str::to_string),
            price: active(self.price.as_deref()).and_then(parse_price_range),
            min_rating: parse_number::<f64>(active(self.rating.as_deref()))
                .filter(|r| r.is_finite()),
            order: SearchOrder::parse(self.order.as_deref()),
        }
    }
}

/// Blank and `all` mean "not filtering".
fn active(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty() && *v != "all")
}

fn parse_number<T: std::str::FromStr>(raw: Option<&str>) -> Option<T> {
    raw.and_then(|v| v.trim().parse::<T>().ok())
}

fn parse_price_range(raw: &str) -> Option<(f64, f64)> {
    let (min, max) = raw.split_once('-')?;
    let min = min.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    let max = max.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some((min, max))
}
