//! Sequential page walking

use crate::error::{Result, RuntimeError};
use serde_json::Value;
use std::future::Future;

/// Items requested per page
pub const DEFAULT_PAGE_SIZE: usize = 5000;

/// One page of results
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Explicit continuation signal, when the endpoint provides one
    pub has_more: Option<bool>,
}

impl<T> Page<T> {
    /// A page with no continuation signal; only its length decides
    pub fn new(items: Vec<T>) -> Self {
        Self { items, has_more: None }
    }

    /// A page that says whether another one follows
    pub fn with_has_more(items: Vec<T>, has_more: bool) -> Self {
        Self {
            items,
            has_more: Some(has_more),
        }
    }
}

impl Page<Value> {
    /// Read a page from a response body
    ///
    /// Accepts either a bare array or an envelope `{"results": [...], "next": ...}`
    /// where a null `next` means this is the last page.
    pub fn from_json(data: Value) -> Result<Self> {
        match data {
            Value::Array(items) => Ok(Page::new(items)),
            Value::Object(mut map) => {
                let items = match map.remove("results") {
                    Some(Value::Array(items)) => items,
                    Some(other) => {
                        return Err(RuntimeError::Decode(format!(
                            "page results must be an array, got {}",
                            type_name(&other)
                        )))
                    }
                    None => return Err(RuntimeError::Decode("page has no results field".to_string())),
                };
                let has_more = map.get("next").map(|next| !next.is_null());
                Ok(Page { items, has_more })
            }
            other => Err(RuntimeError::Decode(format!(
                "page must be an array or an object, got {}",
                type_name(&other)
            ))),
        }
    }
}

/// Fetch pages 1, 2, ... until one comes back empty or is the last, and
/// return every item in page order.
///
/// A page that carries a continuation signal is the last when it says so.
/// Otherwise a page shorter than `page_size` is the last.
///
/// Pages are requested one at a time. The first error aborts the walk and
/// no partial result is returned.
pub async fn fetch_all_pages<T, F, Fut>(page_size: usize, mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut all = Vec::new();
    let mut page_number: u32 = 1;

    loop {
        let page = fetch_page(page_number).await?;
        let count = page.items.len();
        tracing::debug!("Fetched page {} ({} items)", page_number, count);

        all.extend(page.items);

        // An explicit continuation signal wins over the page length
        let more = match page.has_more {
            Some(more) => more,
            None => count >= page_size,
        };
        if count == 0 || !more {
            break;
        }
        page_number += 1;
    }

    Ok(all)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
