//! Response normalization
//!
//! The API answers lists either as a bare array or as `{data, total?, count?}`
//! and single entities either bare or as `{data}`. Every client call goes
//! through the two functions here instead of probing shapes itself.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::models::{Page, PageRequest};
use crate::utils::error::Result;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListEnvelope<T> {
    Bare(Vec<T>),
    Wrapped {
        data: Vec<T>,
        #[serde(default)]
        total: Option<u64>,
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        page: Option<u64>,
        #[serde(default)]
        limit: Option<u64>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EntityEnvelope<T> {
    Wrapped { data: T },
    Bare(T),
}

/// Turn either list shape into a [`Page`]; `total` falls back to `count`, then to the item count
pub fn normalize_list<T: DeserializeOwned>(body: Value, request: PageRequest) -> Result<Page<T>> {
    let page = match serde_json::from_value::<ListEnvelope<T>>(body)? {
        ListEnvelope::Bare(items) => Page {
            total: items.len() as u64,
            items,
            page: request.page,
            limit: request.limit,
        },
        ListEnvelope::Wrapped {
            data,
            total,
            count,
            page,
            limit,
        } => Page {
            total: total.or(count).unwrap_or(data.len() as u64),
            items: data,
            page: page.unwrap_or(request.page),
            limit: limit.unwrap_or(request.limit),
        },
    };
    Ok(page)
}

/// Unwrap `{data: T}` or accept a bare `T`
pub fn normalize_entity<T: DeserializeOwned>(body: Value) -> Result<T> {
    match serde_json::from_value::<EntityEnvelope<T>>(body)? {
        EntityEnvelope::Wrapped { data } | EntityEnvelope::Bare(data) => Ok(data),
    }
}
