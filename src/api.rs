//! Client for the hosted records service.
//!
//! Records travel as snake_case rows keyed by an integer `Id`; this module is
//! the only place that knows about that shape. Everything it hands back is a
//! domain [`Task`] or [`Category`].

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::config::RemoteConfig;
use crate::error::StoreError;
use crate::models::{Category, CategoryDraft, CategoryPatch, Priority, Record, Task, TaskDraft, TaskPatch};
use crate::store::EntityStore;

#[derive(Clone)]
pub struct RemoteClient {
    http: Client,
    base_url: String,
    project_id: String,
    api_key: String,
}

impl RemoteClient {
    pub fn new(config: &RemoteConfig) -> Self {
        RemoteClient {
            http: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn records_url(&self, table: &str) -> String {
        format!(
            "{}/api/v1/projects/{}/tables/{}/records",
            self.base_url, self.project_id, table
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Envelope<T>, CallError> {
        let res = self
            .authorized(request)
            .send()
            .await
            .map_err(|err| CallError::Transport(err.to_string()))?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CallError::NotFound);
        }

        let body = res
            .text()
            .await
            .map_err(|err| CallError::Transport(err.to_string()))?;

        let envelope: Envelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(err) if status.is_success() => {
                return Err(CallError::Transport(format!("invalid response: {}", err)))
            }
            Err(_) => return Err(CallError::Transport(format!("HTTP {}: {}", status, body))),
        };

        if !envelope.success {
            return Err(CallError::Rejected(envelope.message.unwrap_or_default()));
        }
        Ok(envelope)
    }
}

#[derive(Debug)]
enum CallError {
    NotFound,
    Transport(String),
    Rejected(String),
}

impl CallError {
    fn into_load(self, kind: &'static str) -> StoreError {
        match self {
            CallError::NotFound => StoreError::load(kind, "endpoint not found"),
            CallError::Transport(reason) => StoreError::load(kind, reason),
            CallError::Rejected(reason) if reason.is_empty() => {
                StoreError::load(kind, format!("failed to fetch {} records", kind))
            }
            CallError::Rejected(reason) => StoreError::load(kind, reason),
        }
    }

    fn into_mutation(self, kind: &'static str, action: &'static str, id: Option<u64>) -> StoreError {
        match (self, id) {
            (CallError::NotFound, Some(id)) => StoreError::NotFound { kind, id },
            (CallError::NotFound, None) => StoreError::mutation(kind, action, "endpoint not found"),
            (CallError::Transport(reason), _) | (CallError::Rejected(reason), _) => {
                StoreError::mutation(kind, action, reason)
            }
        }
    }
}

/// Response wrapper used by every endpoint of the service.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default = "Option::default")]
    data: Option<T>,
    #[serde(default = "Option::default")]
    results: Option<Vec<ResultEntry<T>>>,
}

#[derive(Debug, Deserialize)]
struct ResultEntry<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default = "Option::default")]
    data: Option<T>,
}

impl<T> Envelope<T> {
    /// First record of a batch write, failing if any entry failed.
    fn into_single_result(self, action: &str) -> Result<Option<T>, String> {
        let Some(results) = self.results else {
            return Ok(self.data);
        };
        let failed: Vec<&ResultEntry<T>> = results.iter().filter(|r| !r.success).collect();
        if !failed.is_empty() {
            let detail = failed
                .iter()
                .filter_map(|r| r.message.as_deref())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(format!(
                "{} of {} records failed to {}{}{}",
                failed.len(),
                results.len(),
                action,
                if detail.is_empty() { "" } else { ": " },
                detail
            ));
        }
        Ok(results.into_iter().find_map(|r| r.data))
    }
}

/// Domain records that can be stored in the hosted service.
pub trait RemoteRecord: Record {
    const TABLE: &'static str;
    /// Fields requested when reading.
    const FIELDS: &'static [&'static str];

    type Wire: DeserializeOwned + Send + 'static;

    fn from_wire(wire: Self::Wire) -> Self;
    fn draft_to_wire(draft: &Self::Draft, now: DateTime<Utc>) -> Map<String, Value>;
    fn patch_to_wire(patch: &Self::Patch, now: DateTime<Utc>) -> Map<String, Value>;
}

// Wire row of the `task` table
#[derive(Debug, Deserialize)]
pub struct TaskRow {
    #[serde(rename = "Id")]
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub completed: bool,
    #[serde(default, deserialize_with = "lookup_id")]
    pub category: Option<u64>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(rename = "CreatedOn", default)]
    pub created_on: Option<String>,
    #[serde(rename = "ModifiedOn", default)]
    pub modified_on: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub archived: bool,
}

// Wire row of the `category` table
#[derive(Debug, Deserialize)]
pub struct CategoryRow {
    #[serde(rename = "Id")]
    pub id: u64,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub task_count: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub active_tasks: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub completed_tasks: u32,
}

/// Accepts a number, a numeric string, a lookup object `{"Id": n}` or null.
fn lookup_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_id))
}

fn coerce_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(obj) => obj.get("Id").and_then(coerce_id),
        _ => None,
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_u64().is_some_and(|n| n != 0),
        Some(Value::String(s)) => matches!(s.trim(), "true" | "1"),
        _ => false,
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(coerce_id)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    value
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| parse_date(value).and_then(|d| d.and_hms_opt(0, 0, 0)).map(|dt| dt.and_utc()))
}

fn date_value(date: Option<NaiveDate>) -> Value {
    match date {
        Some(date) => json!(date.format("%Y-%m-%d").to_string()),
        None => Value::Null,
    }
}

impl RemoteRecord for Task {
    const TABLE: &'static str = "task";
    const FIELDS: &'static [&'static str] = &[
        "Name", "Tags", "Owner", "CreatedOn", "CreatedBy", "ModifiedOn", "ModifiedBy", "title",
        "completed", "category", "priority", "due_date", "created_at", "updated_at", "archived",
    ];

    type Wire = TaskRow;

    fn from_wire(row: TaskRow) -> Task {
        let created_at = row
            .created_at
            .as_deref()
            .or(row.created_on.as_deref())
            .and_then(parse_timestamp)
            .unwrap_or_default();
        let updated_at = row
            .updated_at
            .as_deref()
            .or(row.modified_on.as_deref())
            .and_then(parse_timestamp)
            .unwrap_or(created_at);

        Task {
            id: row.id,
            title: row.title.or(row.name).unwrap_or_default(),
            completed: row.completed,
            category: row.category,
            priority: row
                .priority
                .as_deref()
                .and_then(Priority::parse)
                .unwrap_or_default(),
            due_date: row.due_date.as_deref().and_then(parse_date),
            created_at,
            updated_at,
            archived: row.archived,
        }
    }

    fn draft_to_wire(draft: &TaskDraft, now: DateTime<Utc>) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("title".into(), json!(draft.title));
        record.insert("completed".into(), json!(draft.completed));
        record.insert("category".into(), json!(draft.category));
        record.insert("priority".into(), json!(draft.priority.as_str()));
        record.insert("due_date".into(), date_value(draft.due_date));
        record.insert("created_at".into(), json!(now.to_rfc3339()));
        record.insert("updated_at".into(), json!(now.to_rfc3339()));
        record.insert("archived".into(), json!(draft.archived));
        record
    }

    fn patch_to_wire(patch: &TaskPatch, now: DateTime<Utc>) -> Map<String, Value> {
        let mut record = Map::new();
        if let Some(title) = &patch.title {
            record.insert("title".into(), json!(title));
        }
        if let Some(completed) = patch.completed {
            record.insert("completed".into(), json!(completed));
        }
        if let Some(category) = patch.category {
            record.insert("category".into(), json!(category));
        }
        if let Some(priority) = patch.priority {
            record.insert("priority".into(), json!(priority.as_str()));
        }
        if let Some(due_date) = patch.due_date {
            record.insert("due_date".into(), date_value(due_date));
        }
        if let Some(archived) = patch.archived {
            record.insert("archived".into(), json!(archived));
        }
        record.insert("updated_at".into(), json!(now.to_rfc3339()));
        record
    }
}

impl RemoteRecord for Category {
    const TABLE: &'static str = "category";
    const FIELDS: &'static [&'static str] = &[
        "Name", "Tags", "Owner", "CreatedOn", "CreatedBy", "ModifiedOn", "ModifiedBy", "color",
        "task_count", "active_tasks", "completed_tasks",
    ];

    type Wire = CategoryRow;

    fn from_wire(row: CategoryRow) -> Category {
        Category {
            id: row.id,
            name: row.name.unwrap_or_default(),
            color: row.color.unwrap_or_default(),
            task_count: row.task_count,
            active_tasks: row.active_tasks,
            completed_tasks: row.completed_tasks,
        }
    }

    fn draft_to_wire(draft: &CategoryDraft, _now: DateTime<Utc>) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("Name".into(), json!(draft.name));
        record.insert("color".into(), json!(draft.color));
        record.insert("task_count".into(), json!(0));
        record.insert("active_tasks".into(), json!(0));
        record.insert("completed_tasks".into(), json!(0));
        record
    }

    fn patch_to_wire(patch: &CategoryPatch, _now: DateTime<Utc>) -> Map<String, Value> {
        let mut record = Map::new();
        if let Some(name) = &patch.name {
            record.insert("Name".into(), json!(name));
        }
        if let Some(color) = &patch.color {
            record.insert("color".into(), json!(color));
        }
        if let Some(n) = patch.task_count {
            record.insert("task_count".into(), json!(n));
        }
        if let Some(n) = patch.active_tasks {
            record.insert("active_tasks".into(), json!(n));
        }
        if let Some(n) = patch.completed_tasks {
            record.insert("completed_tasks".into(), json!(n));
        }
        record
    }
}

pub struct RemoteStore<R> {
    client: RemoteClient,
    kind: PhantomData<fn() -> R>,
}

impl<R: RemoteRecord> RemoteStore<R> {
    pub fn new(client: RemoteClient) -> Self {
        RemoteStore {
            client,
            kind: PhantomData,
        }
    }

    fn url(&self) -> String {
        self.client.records_url(R::TABLE)
    }
}

#[async_trait]
impl<R: RemoteRecord> EntityStore<R> for RemoteStore<R> {
    async fn get_all(&self) -> Result<Vec<R>, StoreError> {
        let request = self
            .client
            .http
            .post(format!("{}/query", self.url()))
            .json(&json!({ "fields": R::FIELDS }));

        let envelope: Envelope<Vec<R::Wire>> = self.client.call(request).await.map_err(|err| {
            warn!(table = R::TABLE, ?err, "fetch failed");
            err.into_load(R::KIND)
        })?;

        let rows = envelope.data.unwrap_or_default();
        debug!(table = R::TABLE, count = rows.len(), "remote get_all");
        Ok(rows.into_iter().map(R::from_wire).collect())
    }

    async fn get_by_id(&self, id: u64) -> Result<R, StoreError> {
        let request = self.client.http.get(format!("{}/{}", self.url(), id));

        let envelope: Envelope<R::Wire> = match self.client.call(request).await {
            Ok(envelope) => envelope,
            Err(CallError::Transport(reason)) => return Err(StoreError::load(R::KIND, reason)),
            Err(err) => {
                debug!(table = R::TABLE, id, ?err, "record lookup failed");
                return Err(StoreError::NotFound { kind: R::KIND, id });
            }
        };

        envelope
            .data
            .map(R::from_wire)
            .ok_or(StoreError::NotFound { kind: R::KIND, id })
    }

    async fn create(&self, draft: R::Draft) -> Result<R, StoreError> {
        let record = R::draft_to_wire(&draft, Utc::now());
        let request = self
            .client
            .http
            .post(self.url())
            .json(&json!({ "records": [record] }));

        let envelope: Envelope<R::Wire> = self
            .client
            .call(request)
            .await
            .map_err(|err| err.into_mutation(R::KIND, "create", None))?;

        match envelope.into_single_result("create") {
            Ok(Some(row)) => Ok(R::from_wire(row)),
            Ok(None) => Err(StoreError::mutation(R::KIND, "create", "no record returned")),
            Err(reason) => Err(StoreError::mutation(R::KIND, "create", reason)),
        }
    }

    async fn update(&self, id: u64, patch: R::Patch) -> Result<R, StoreError> {
        let mut record = R::patch_to_wire(&patch, Utc::now());
        record.insert("Id".into(), json!(id));
        let request = self
            .client
            .http
            .patch(self.url())
            .json(&json!({ "records": [record] }));

        let envelope: Envelope<R::Wire> = self
            .client
            .call(request)
            .await
            .map_err(|err| err.into_mutation(R::KIND, "update", Some(id)))?;

        match envelope.into_single_result("update") {
            Ok(Some(row)) => Ok(R::from_wire(row)),
            Ok(None) => Err(StoreError::mutation(R::KIND, "update", "no record returned")),
            Err(reason) => Err(StoreError::mutation(R::KIND, "update", reason)),
        }
    }

    async fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let request = self
            .client
            .http
            .delete(self.url())
            .json(&json!({ "RecordIds": [id] }));

        let envelope: Envelope<Value> = self
            .client
            .call(request)
            .await
            .map_err(|err| err.into_mutation(R::KIND, "delete", Some(id)))?;

        envelope
            .into_single_result("delete")
            .map(|_| true)
            .map_err(|reason| StoreError::mutation(R::KIND, "delete", reason))
    }
}
