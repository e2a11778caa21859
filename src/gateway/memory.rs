//! In-process gateway.
//!
//! Holds tables and objects in memory with the same ordering, filtering and
//! id-assignment behaviour the hosted service exposes. `build --offline` runs
//! against an empty instance so every content type resolves from the
//! fallback store; tests seed rows and inject failures per operation.

use super::{
    Collection, ContentGateway, Filter, GatewayError, PublicUrl, Query, Record,
};
use chrono::DateTime;
use serde_json::Value;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Gateway operations, used for failure injection and call inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Insert,
    Update,
    Remove,
    Upload,
    RemoveObject,
}

#[derive(Debug, Clone, Copy)]
enum Fault {
    Always(Operation),
    /// Fail only the n-th (0-based) call of the operation.
    Nth(Operation, usize),
    Everything,
}

#[derive(Debug, Default)]
struct State {
    tables: BTreeMap<Collection, Vec<Record>>,
    objects: BTreeMap<String, Vec<u8>>,
    next_id: u64,
    faults: Vec<Fault>,
    calls: Vec<Operation>,
}

/// Epoch for assigned `created_at` values; each insert advances one second.
const CLOCK_START: i64 = 1_735_689_600; // 2025-01-01T00:00:00Z

#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: RefCell<State>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose every call fails as if the service were unreachable.
    pub fn unreachable() -> Self {
        let gw = Self::new();
        gw.state.borrow_mut().faults.push(Fault::Everything);
        gw
    }

    /// Seed a collection with rows, as stored (ids are kept if present).
    pub fn with_rows(self, collection: Collection, rows: Vec<Record>) -> Self {
        self.state
            .borrow_mut()
            .tables
            .entry(collection)
            .or_default()
            .extend(rows);
        self
    }

    /// Make every call of `op` fail.
    pub fn fail(&self, op: Operation) {
        self.state.borrow_mut().faults.push(Fault::Always(op));
    }

    /// Make only the n-th (0-based) call of `op`, counted from creation, fail.
    pub fn fail_nth(&self, op: Operation, n: usize) {
        self.state.borrow_mut().faults.push(Fault::Nth(op, n));
    }

    pub fn rows(&self, collection: Collection) -> Vec<Record> {
        self.state
            .borrow()
            .tables
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Stored object keys as `bucket/path`.
    pub fn object_keys(&self) -> Vec<String> {
        self.state.borrow().objects.keys().cloned().collect()
    }

    /// Every call made so far, in order, including failed ones.
    pub fn calls(&self) -> Vec<Operation> {
        self.state.borrow().calls.clone()
    }

    fn enter(&self, op: Operation) -> Result<(), GatewayError> {
        let mut state = self.state.borrow_mut();
        let seen = state.calls.iter().filter(|c| **c == op).count();
        state.calls.push(op);
        let failing = state.faults.iter().any(|fault| match *fault {
            Fault::Everything => true,
            Fault::Always(f) => f == op,
            Fault::Nth(f, n) => f == op && n == seen,
        });
        if failing {
            Err(GatewayError::Network(format!(
                "injected failure on {op:?}"
            )))
        } else {
            Ok(())
        }
    }
}

fn object_key(bucket: &str, path: &str) -> String {
    format!("{bucket}/{path}")
}

/// Order two JSON scalars the way the database would order the column.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        // Missing and null sort as smallest.
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

impl ContentGateway for MemoryGateway {
    fn list(&self, collection: Collection, query: &Query) -> Result<Vec<Record>, GatewayError> {
        self.enter(Operation::List)?;
        let state = self.state.borrow();
        let mut rows: Vec<Record> = state
            .tables
            .get(&collection)
            .map(|rows| {
                rows.iter()
                    .filter(|r| query.filter.as_ref().is_none_or(|f| f.matches(r)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(&order.field), b.get(&order.field));
                if order.descending { ord.reverse() } else { ord }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    fn insert(&self, collection: Collection, mut fields: Record) -> Result<Record, GatewayError> {
        self.enter(Operation::Insert)?;
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let n = state.next_id;
        fields
            .entry("id")
            .or_insert_with(|| Value::String(format!("m{n}")));
        if !fields.contains_key("created_at") {
            let stamp = DateTime::from_timestamp(CLOCK_START + n as i64, 0)
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_default();
            fields.insert("created_at".to_string(), Value::String(stamp));
        }
        state
            .tables
            .entry(collection)
            .or_default()
            .push(fields.clone());
        Ok(fields)
    }

    fn update(
        &self,
        collection: Collection,
        filter: &Filter,
        fields: Record,
    ) -> Result<Vec<Record>, GatewayError> {
        self.enter(Operation::Update)?;
        let mut state = self.state.borrow_mut();
        let mut updated = Vec::new();
        if let Some(rows) = state.tables.get_mut(&collection) {
            for row in rows.iter_mut().filter(|r| filter.matches(r)) {
                for (k, v) in &fields {
                    row.insert(k.clone(), v.clone());
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    fn remove(&self, collection: Collection, id: &str) -> Result<(), GatewayError> {
        self.enter(Operation::Remove)?;
        let matcher = Filter::eq("id", id);
        if let Some(rows) = self.state.borrow_mut().tables.get_mut(&collection) {
            rows.retain(|r| !matcher.matches(r));
        }
        Ok(())
    }

    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<PublicUrl, GatewayError> {
        self.enter(Operation::Upload)?;
        let key = object_key(bucket, path);
        {
            let mut state = self.state.borrow_mut();
            if state.objects.contains_key(&key) {
                return Err(GatewayError::Service {
                    status: 409,
                    code: Some("Duplicate".to_string()),
                    message: "The resource already exists".to_string(),
                });
            }
            state.objects.insert(key, bytes.to_vec());
        }
        Ok(self.public_url(bucket, path))
    }

    fn public_url(&self, bucket: &str, path: &str) -> PublicUrl {
        format!("memory://{}", object_key(bucket, path))
    }

    fn remove_object(&self, bucket: &str, path: &str) -> Result<(), GatewayError> {
        self.enter(Operation::RemoveObject)?;
        self.state
            .borrow_mut()
            .objects
            .remove(&object_key(bucket, path));
        Ok(())
    }
}
