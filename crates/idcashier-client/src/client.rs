//! # Supabase Client
//!
//! Thin typed wrapper over the three backend surfaces.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  {url}/auth/v1/...        GoTrue: sign-in, sign-up, user, recover      │
//! │  {url}/rest/v1/{table}    PostgREST: select / insert / update / delete │
//! │  {url}/functions/v1/{fn}  Edge functions for privileged operations     │
//! │                                                                         │
//! │  Every request:  apikey: {anon_key}                                    │
//! │  Token-bound:    Authorization: Bearer {access_token}                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Single-Row Fallback
//! Row-level security sometimes hides or duplicates the one row a
//! `.single()` read expects, and PostgREST answers `406 PGRST116`. The
//! client then repeats the read as a plain list and decides by count:
//! zero is `NotFound`, one proceeds, more is `DataInconsistency`.

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::error::{ClientError, ClientResult, ErrorBody, PGRST_SINGLE_ROW};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

// =============================================================================
// Query Builder
// =============================================================================

/// PostgREST query string parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    /// `select=` with embedded whitespace collapsed.
    pub fn select(mut self, columns: &str) -> Self {
        let compact: String = columns.split_whitespace().collect();
        self.params.push(("select".into(), compact));
        self
    }

    pub fn eq(mut self, column: &str, value: impl AsRef<str>) -> Self {
        self.params.push((column.into(), format!("eq.{}", value.as_ref())));
        self
    }

    pub fn is_in<I, S>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list: Vec<String> = values.into_iter().map(|v| v.as_ref().to_string()).collect();
        self.params.push((column.into(), format!("in.({})", list.join(","))));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let dir = if ascending { "asc" } else { "desc" };
        self.params.push(("order".into(), format!("{column}.{dir}")));
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

// =============================================================================
// Client
// =============================================================================

/// Shared HTTP client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    config: Arc<BackendConfig>,
}

impl SupabaseClient {
    pub fn new(config: BackendConfig) -> ClientResult<Self> {
        config.validate()?;
        Ok(SupabaseClient {
            http: reqwest::Client::new(),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.base_url(), path)
    }

    pub(crate) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.base_url(), table)
    }

    pub(crate) fn functions_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{}", self.config.base_url(), name)
    }

    /// Request carrying only the anon key.
    pub(crate) fn anon(&self, method: Method, url: String) -> RequestBuilder {
        self.http.request(method, url).header("apikey", self.config.anon_key())
    }

    /// Request carrying the anon key and a user token.
    pub(crate) fn authed(&self, method: Method, url: String, token: &str) -> RequestBuilder {
        self.anon(method, url).bearer_auth(token)
    }

    /// Sends a request and returns status and body text.
    pub(crate) async fn send_raw(&self, request: RequestBuilder) -> ClientResult<(StatusCode, String)> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }

    /// Sends a request and decodes a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let (status, body) = self.send_raw(request).await?;
        if !status.is_success() {
            return Err(ClientError::from_response(status, &body));
        }
        decode_body(&body)
    }

    /// Sends a request whose body is ignored.
    pub(crate) async fn send_empty(&self, request: RequestBuilder) -> ClientResult<()> {
        let (status, body) = self.send_raw(request).await?;
        if !status.is_success() {
            return Err(ClientError::from_response(status, &body));
        }
        Ok(())
    }

    // =========================================================================
    // REST Tables
    // =========================================================================

    pub async fn select<T: DeserializeOwned>(&self, token: &str, table: &str, query: &Query) -> ClientResult<Vec<T>> {
        debug!(table, "select");
        let request = self
            .authed(Method::GET, self.rest_url(table), token)
            .query(query.params());
        self.send_json(request).await
    }

    /// Reads exactly one row, falling back to a list read on `PGRST116`.
    pub async fn select_single<T: DeserializeOwned>(
        &self,
        token: &str,
        table: &str,
        query: &Query,
        key: &str,
    ) -> ClientResult<T> {
        match self.select_single_strict(token, table, query).await? {
            SingleRow::Found(row) => Ok(row),
            SingleRow::Ambiguous => {
                warn!(table, key, "Single-row read rejected, retrying as list");
                let mut rows: Vec<T> = self.select(token, table, query).await?;
                match rows.len() {
                    0 => Err(ClientError::not_found(table, key)),
                    1 => Ok(rows.remove(0)),
                    count => Err(ClientError::DataInconsistency {
                        entity: table.to_string(),
                        count,
                    }),
                }
            }
        }
    }

    /// Reads at most one row. `PGRST116` with no rows means `None`.
    pub async fn select_optional<T: DeserializeOwned>(&self, token: &str, table: &str, query: &Query) -> ClientResult<Option<T>> {
        match self.select_single_strict(token, table, query).await? {
            SingleRow::Found(row) => Ok(Some(row)),
            SingleRow::Ambiguous => {
                let mut rows: Vec<T> = self.select(token, table, query).await?;
                match rows.len() {
                    0 => Ok(None),
                    1 => Ok(Some(rows.remove(0))),
                    count => Err(ClientError::DataInconsistency {
                        entity: table.to_string(),
                        count,
                    }),
                }
            }
        }
    }

    async fn select_single_strict<T: DeserializeOwned>(&self, token: &str, table: &str, query: &Query) -> ClientResult<SingleRow<T>> {
        let request = self
            .authed(Method::GET, self.rest_url(table), token)
            .header("Accept", SINGLE_OBJECT)
            .query(query.params());
        let (status, body) = self.send_raw(request).await?;

        if status.is_success() {
            return decode_body(&body).map(SingleRow::Found);
        }

        let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
        if parsed.code.as_deref() == Some(PGRST_SINGLE_ROW) {
            return Ok(SingleRow::Ambiguous);
        }
        Err(ClientError::from_response(status, &body))
    }

    /// Inserts rows and returns them as stored.
    pub async fn insert<B, T>(&self, token: &str, table: &str, rows: &B) -> ClientResult<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(table, "insert");
        let request = self
            .authed(Method::POST, self.rest_url(table), token)
            .header("Prefer", "return=representation")
            .json(rows);
        self.send_json(request).await
    }

    /// Inserts rows without reading them back.
    pub async fn insert_minimal<B: Serialize + ?Sized>(&self, token: &str, table: &str, rows: &B) -> ClientResult<()> {
        debug!(table, "insert (minimal)");
        let request = self
            .authed(Method::POST, self.rest_url(table), token)
            .header("Prefer", "return=minimal")
            .json(rows);
        self.send_empty(request).await
    }

    pub async fn update<B, T>(&self, token: &str, table: &str, query: &Query, patch: &B) -> ClientResult<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(table, "update");
        let request = self
            .authed(Method::PATCH, self.rest_url(table), token)
            .header("Prefer", "return=representation")
            .query(query.params())
            .json(patch);
        self.send_json(request).await
    }

    /// Deletes matching rows and returns what was removed.
    pub async fn delete<T: DeserializeOwned>(&self, token: &str, table: &str, query: &Query) -> ClientResult<Vec<T>> {
        debug!(table, "delete");
        let request = self
            .authed(Method::DELETE, self.rest_url(table), token)
            .header("Prefer", "return=representation")
            .query(query.params());
        self.send_json(request).await
    }

    // =========================================================================
    // Edge Functions
    // =========================================================================

    /// Calls an edge function. A 2xx body carrying `{"error": ...}` is a failure.
    pub async fn invoke<B, T>(&self, token: &str, name: &str, method: Method, body: Option<&B>) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(function = name, "invoke");
        let mut request = self.authed(method, self.functions_url(name), token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let (status, text) = self.send_raw(request).await?;
        if !status.is_success() {
            return Err(ClientError::from_response(status, &text));
        }

        let value: serde_json::Value = decode_body(&text)?;
        if let Some(message) = function_error(&value) {
            return Err(ClientError::from_message(status.as_u16(), message));
        }
        Ok(serde_json::from_value(value)?)
    }
}

enum SingleRow<T> {
    Found(T),
    Ambiguous,
}

fn decode_body<T: DeserializeOwned>(body: &str) -> ClientResult<T> {
    if body.trim().is_empty() {
        return Err(ClientError::ServerNotResponding("empty response body".into()));
    }
    Ok(serde_json::from_str(body)?)
}

fn function_error(value: &serde_json::Value) -> Option<String> {
    match value.get("error")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => other
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .or_else(|| Some(other.to_string())),
    }
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use wiremock::MockServer;

    pub const ANON_KEY: &str = "anon-key";
    pub const TOKEN: &str = "user-token";

    pub fn client_for(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(BackendConfig::new(server.uri(), ANON_KEY)).unwrap()
    }
}
