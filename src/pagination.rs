//! Page requests from query parameters, result pages, and the `Link` / `X-Total-Count` headers.

use crate::error::AppError;
use axum::http::Uri;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 2000;

pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

/// Sortable Point properties. Anything else in `sort=` is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortProperty {
    Id,
    Title,
    Description,
}

impl SortProperty {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "id" => Some(SortProperty::Id),
            "title" => Some(SortProperty::Title),
            "description" => Some(SortProperty::Description),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortProperty::Id => "id",
            SortProperty::Title => "title",
            SortProperty::Description => "description",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortOrder {
    pub property: SortProperty,
    pub direction: Direction,
}

impl SortOrder {
    pub fn asc(property: SortProperty) -> Self {
        SortOrder {
            property,
            direction: Direction::Asc,
        }
    }

    pub fn desc(property: SortProperty) -> Self {
        SortOrder {
            property,
            direction: Direction::Desc,
        }
    }
}

/// Zero-based page number, page size, and sort orders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Vec<SortOrder>,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: Vec::new(),
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        PageRequest {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
            sort: Vec::new(),
        }
    }

    pub fn with_sort(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    /// Parse `page`, `size` and repeated `sort=property[,property...][,asc|desc]` parameters.
    /// Unparsable page/size fall back to defaults; unknown sort properties are rejected.
    pub fn from_query(params: &[(String, String)]) -> Result<Self, AppError> {
        let mut req = PageRequest::default();
        for (k, v) in params {
            match k.as_str() {
                "page" => {
                    if let Ok(n) = v.trim().parse::<u32>() {
                        req.page = n;
                    }
                }
                "size" => {
                    if let Ok(n) = v.trim().parse::<u32>() {
                        if n > 0 {
                            req.size = n.min(MAX_PAGE_SIZE);
                        }
                    }
                }
                "sort" => req.sort.extend(parse_sort(v)?),
                _ => {}
            }
        }
        Ok(req)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Requested orders followed by `id,asc` unless `id` is already among them, so rows with
    /// equal sort keys keep the same position from one page to the next.
    pub fn sort_or_default(&self) -> Vec<SortOrder> {
        let mut orders = self.sort.clone();
        if !orders.iter().any(|o| o.property == SortProperty::Id) {
            orders.push(SortOrder::asc(SortProperty::Id));
        }
        orders
    }
}

fn parse_sort(value: &str) -> Result<Vec<SortOrder>, AppError> {
    let mut parts: Vec<&str> = value.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
    let direction = match parts.last().map(|s| s.to_ascii_lowercase()) {
        Some(d) if d == "asc" => {
            parts.pop();
            Direction::Asc
        }
        Some(d) if d == "desc" => {
            parts.pop();
            Direction::Desc
        }
        _ => Direction::Asc,
    };
    parts
        .into_iter()
        .map(|p| {
            SortProperty::parse(p)
                .map(|property| SortOrder { property, direction })
                .ok_or_else(|| AppError::BadRequest(format!("cannot sort by '{}'", p)))
        })
        .collect()
}

/// One page of results plus the total across all pages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total: u64) -> Self {
        Page {
            content,
            page: request.page,
            size: request.size,
            total,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 1;
        }
        self.total.div_ceil(u64::from(self.size))
    }
}

/// Build the `Link` header value with next/prev/last/first relations.
/// Other query parameters of `uri` (query, sort) are carried over; page and size are replaced.
pub fn link_header<T>(uri: &Uri, page: &Page<T>) -> String {
    let total_pages = page.total_pages();
    let current = u64::from(page.page);
    let mut links = Vec::with_capacity(4);
    if current + 1 < total_pages {
        links.push(prepare_link(uri, current + 1, page.size, "next"));
    }
    if current > 0 {
        links.push(prepare_link(uri, current - 1, page.size, "prev"));
    }
    let last = total_pages.saturating_sub(1);
    links.push(prepare_link(uri, last, page.size, "last"));
    links.push(prepare_link(uri, 0, page.size, "first"));
    links.join(",")
}

fn prepare_link(uri: &Uri, page: u64, size: u32, rel: &str) -> String {
    let mut query: Vec<&str> = uri
        .query()
        .unwrap_or("")
        .split('&')
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or("");
            !pair.is_empty() && key != "page" && key != "size"
        })
        .collect();
    let page_param = format!("page={}", page);
    let size_param = format!("size={}", size);
    query.push(&page_param);
    query.push(&size_param);
    let target = format!("{}?{}", uri.path(), query.join("&"))
        .replace(',', "%2C")
        .replace(';', "%3B");
    format!("<{}>; rel=\"{}\"", target, rel)
}
