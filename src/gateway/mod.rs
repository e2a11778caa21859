//! Remote content gateway.
//!
//! A typed seam over the hosted table service (select/insert/update/delete on
//! named collections) and its object store (upload/public URL/delete). Every
//! call returns a `Result`; nothing above this layer sees transport details.
//!
//! Two implementations:
//!
//! | Type | Use |
//! |------|-----|
//! | [`rest::RestGateway`] | PostgREST tables + storage API over HTTP |
//! | [`memory::MemoryGateway`] | In-process tables for offline builds and tests |

pub mod memory;
pub mod rest;

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// One row as returned by the table service.
pub type Record = serde_json::Map<String, Value>;

/// Publicly reachable URL of an uploaded object.
pub type PublicUrl = String;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("backend not configured")]
    NotConfigured,
    #[error("network error: {0}")]
    Network(String),
    #[error("service error ({status}): {message}")]
    Service {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Short explanation suitable for an admin toast / CLI line.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::NotConfigured => {
                "Backend not configured: set backend.url and backend.anon_key in config.toml."
                    .to_string()
            }
            GatewayError::Network(_) => "Network error: Unable to connect to database. \
                 Please check your internet connection."
                .to_string(),
            GatewayError::Service { code, message, .. } => match code.as_deref() {
                Some("PGRST116") => {
                    "Database error: The requested resource was not found.".to_string()
                }
                Some("PGRST301") => {
                    "Permission error: You do not have access to perform this action.".to_string()
                }
                _ => message.clone(),
            },
            GatewayError::Decode(msg) => format!("Unexpected response from database: {msg}"),
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

/// Named table collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Sermons,
    Announcements,
    Gallery,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Sermons => "sermons",
            Collection::Announcements => "announcements",
            Collection::Gallery => "gallery",
        }
    }

    /// Default listing order: newest first.
    pub fn default_order(&self) -> Order {
        match self {
            Collection::Sermons | Collection::Announcements => Order::desc("date"),
            Collection::Gallery => Order::desc("created_at"),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub field: String,
    pub descending: bool,
}

impl Order {
    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: true,
        }
    }

    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: false,
        }
    }
}

/// Row filter. Values are compared as JSON scalars.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    Neq(String, Value),
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(field.to_string(), value.into())
    }

    pub fn neq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Neq(field.to_string(), value.into())
    }

    pub fn field(&self) -> &str {
        match self {
            Filter::Eq(f, _) | Filter::Neq(f, _) => f,
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        let actual = |field: &str| record.get(field).unwrap_or(&Value::Null);
        match self {
            Filter::Eq(f, v) => scalar_eq(actual(f), v),
            Filter::Neq(f, v) => !scalar_eq(actual(f), v),
        }
    }
}

/// Numbers and strings compare by their textual form, so `id = "7"` matches
/// an integer id of 7 the same way a PostgREST `eq.7` query would.
fn scalar_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::Number(y)) | (Value::Number(y), Value::String(x)) => {
            *x == y.to_string()
        }
        _ => a == b,
    }
}

/// Select options for [`ContentGateway::list`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub order: Option<Order>,
    pub filter: Option<Filter>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Access to the hosted table service and object store.
///
/// Calls run one at a time on the caller's thread; a call returns only when
/// the backend has answered or failed. No call is retried.
pub trait ContentGateway {
    fn list(&self, collection: Collection, query: &Query) -> Result<Vec<Record>, GatewayError>;

    /// Insert one row and return it as stored (with its assigned id).
    fn insert(&self, collection: Collection, fields: Record) -> Result<Record, GatewayError>;

    /// Apply `fields` to every row matching `filter`; returns the updated rows.
    fn update(
        &self,
        collection: Collection,
        filter: &Filter,
        fields: Record,
    ) -> Result<Vec<Record>, GatewayError>;

    fn remove(&self, collection: Collection, id: &str) -> Result<(), GatewayError>;

    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<PublicUrl, GatewayError>;

    fn public_url(&self, bucket: &str, path: &str) -> PublicUrl;

    fn remove_object(&self, bucket: &str, path: &str) -> Result<(), GatewayError>;
}

/// Build a [`Record`] from `(field, value)` pairs.
pub fn record<I, K, V>(pairs: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_orders() {
        assert_eq!(Collection::Sermons.default_order(), Order::desc("date"));
        assert_eq!(Collection::Announcements.default_order(), Order::desc("date"));
        assert_eq!(Collection::Gallery.default_order(), Order::desc("created_at"));
    }

    #[test]
    fn filter_eq_matches_bool() {
        let row = record([("is_active", json!(true))]);
        assert!(Filter::eq("is_active", true).matches(&row));
        assert!(!Filter::eq("is_active", false).matches(&row));
    }

    #[test]
    fn filter_eq_missing_field_is_null() {
        let row = record([("title", json!("T"))]);
        assert!(!Filter::eq("is_active", true).matches(&row));
        assert!(Filter::neq("is_active", true).matches(&row));
    }

    #[test]
    fn filter_compares_numeric_ids_with_text() {
        let row = record([("id", json!(7))]);
        assert!(Filter::eq("id", "7").matches(&row));
    }

    #[test]
    fn user_message_maps_known_codes() {
        let err = GatewayError::Service {
            status: 406,
            code: Some("PGRST116".into()),
            message: "JSON object requested, multiple (or no) rows returned".into(),
        };
        assert!(err.user_message().contains("not found"));

        let err = GatewayError::Network("connection refused".into());
        assert!(err.user_message().starts_with("Network error"));
    }

    #[test]
    fn query_builder() {
        let q = Query::new()
            .order(Order::desc("date"))
            .filter(Filter::eq("is_active", true))
            .limit(1);
        assert_eq!(q.limit, Some(1));
        assert_eq!(q.filter.as_ref().map(Filter::field), Some("is_active"));
    }
}
