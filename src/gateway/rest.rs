//! HTTP gateway for a hosted PostgREST + storage backend (Supabase layout).
//!
//! ```text
//! {url}/rest/v1/{table}?select=*&order=date.desc&is_active=eq.true&limit=1
//! {url}/storage/v1/object/{bucket}/{path}          upload / delete
//! {url}/storage/v1/object/public/{bucket}/{path}   public URL
//! ```
//!
//! Requests carry the anon key as `apikey` and, once an admin has signed in,
//! the session access token as the bearer; otherwise the anon key doubles as
//! the bearer, which is what the public site uses.

use super::{
    Collection, ContentGateway, Filter, GatewayError, PublicUrl, Query, Record,
};
use crate::config::BackendConfig;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde_json::{Value, json};

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}

pub struct RestGateway {
    client: Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl RestGateway {
    /// An empty `backend.url` yields a gateway whose calls all fail with
    /// [`GatewayError::NotConfigured`].
    pub fn new(backend: &BackendConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: backend.url.trim_end_matches('/').to_string(),
            anon_key: backend.anon_key.clone(),
            access_token: None,
        }
    }

    /// Act on behalf of a signed-in user.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn base(&self) -> Result<&str, GatewayError> {
        if self.base_url.is_empty() {
            Err(GatewayError::NotConfigured)
        } else {
            Ok(&self.base_url)
        }
    }

    fn table_url(&self, collection: Collection) -> Result<String, GatewayError> {
        Ok(format!("{}/rest/v1/{}", self.base()?, collection.as_str()))
    }

    fn object_url(&self, bucket: &str, path: &str) -> Result<String, GatewayError> {
        Ok(format!("{}/storage/v1/object/{bucket}/{path}", self.base()?))
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        request.header("apikey", &self.anon_key).bearer_auth(bearer)
    }
}

/// PostgREST query-string parameters for a select.
pub fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    if let Some(filter) = &query.filter {
        params.push(filter_param(filter));
    }
    if let Some(order) = &query.order {
        let dir = if order.descending { "desc" } else { "asc" };
        params.push(("order".to_string(), format!("{}.{dir}", order.field)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

/// `Filter::Eq("is_active", true)` → `("is_active", "eq.true")`.
pub fn filter_param(filter: &Filter) -> (String, String) {
    match filter {
        Filter::Eq(field, value) => (field.clone(), format!("eq.{}", scalar_text(value))),
        Filter::Neq(field, value) => (field.clone(), format!("neq.{}", scalar_text(value))),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Turn a non-2xx response into a [`GatewayError::Service`], reading the
/// PostgREST (`code`, `message`) or storage (`error`, `message`) body.
fn check(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body: Value = response.json().unwrap_or(Value::Null);
    let message = body
        .get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string());
    let code = body.get("code").and_then(Value::as_str).map(str::to_string);
    Err(GatewayError::Service {
        status: status.as_u16(),
        code,
        message,
    })
}

impl ContentGateway for RestGateway {
    fn list(&self, collection: Collection, query: &Query) -> Result<Vec<Record>, GatewayError> {
        let url = self.table_url(collection)?;
        let response = self
            .authed(self.client.get(url))
            .query(&query_params(query))
            .send()?;
        Ok(check(response)?.json()?)
    }

    fn insert(&self, collection: Collection, fields: Record) -> Result<Record, GatewayError> {
        let url = self.table_url(collection)?;
        let response = self
            .authed(self.client.post(url))
            .header("Prefer", "return=representation")
            .json(&[fields])
            .send()?;
        let rows: Vec<Record> = check(response)?.json()?;
        rows.into_iter()
            .next()
            .ok_or_else(|| GatewayError::Decode("insert returned no rows".to_string()))
    }

    fn update(
        &self,
        collection: Collection,
        filter: &Filter,
        fields: Record,
    ) -> Result<Vec<Record>, GatewayError> {
        let url = self.table_url(collection)?;
        let response = self
            .authed(self.client.patch(url))
            .header("Prefer", "return=representation")
            .query(&[filter_param(filter)])
            .json(&fields)
            .send()?;
        Ok(check(response)?.json()?)
    }

    fn remove(&self, collection: Collection, id: &str) -> Result<(), GatewayError> {
        let url = self.table_url(collection)?;
        let response = self
            .authed(self.client.delete(url))
            .query(&[filter_param(&Filter::eq("id", id))])
            .send()?;
        check(response)?;
        Ok(())
    }

    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<PublicUrl, GatewayError> {
        let url = self.object_url(bucket, path)?;
        let response = self
            .authed(self.client.post(url))
            .header("Content-Type", content_type)
            .header("cache-control", "max-age=3600")
            .header("x-upsert", "false")
            .body(bytes.to_vec())
            .send()?;
        check(response)?;
        Ok(self.public_url(bucket, path))
    }

    fn public_url(&self, bucket: &str, path: &str) -> PublicUrl {
        format!("{}/storage/v1/object/public/{bucket}/{path}", self.base_url)
    }

    fn remove_object(&self, bucket: &str, path: &str) -> Result<(), GatewayError> {
        let url = format!("{}/storage/v1/object/{bucket}", self.base()?);
        let response = self
            .authed(self.client.delete(url))
            .json(&json!({ "prefixes": [path] }))
            .send()?;
        check(response)?;
        Ok(())
    }
}
