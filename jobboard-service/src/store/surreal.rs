//! SurrealDB document store
//!
//! Supports runtime protocol selection via URL scheme:
//! - `ws://` / `wss://` - WebSocket connections
//! - `http://` / `https://` - HTTP connections
//!
//! Each collection is a SurrealDB table. Records are keyed by the document id
//! and also carry it in a `doc_id` field, which is what filters and
//! updates match on. Reads rename `doc_id` back to `id`.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Document, DocumentStore, Filter, FindOptions, StoreResult, ID_FIELD};
use crate::{
    config::StoreConfig,
    error::{sanitize_url, DatabaseError, DatabaseOperation},
    ids::DocumentId,
    repository::OrderDirection,
};

/// SurrealDB client type alias using the `Any` engine for runtime protocol selection
pub type SurrealClient = surrealdb::Surreal<surrealdb::engine::any::Any>;

/// Field holding the document id inside a record
const RECORD_ID_FIELD: &str = "doc_id";

static FIELD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("valid field name pattern"));

/// [`DocumentStore`] backed by a SurrealDB connection
///
/// The client handle is released by [`DocumentStore::close`]; once the last
/// handle is gone the connection shuts down. Calls after close fail with a
/// connection error.
#[derive(Clone)]
pub struct SurrealStore {
    client: Arc<RwLock<Option<SurrealClient>>>,
}

impl std::fmt::Debug for SurrealStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealStore").finish_non_exhaustive()
    }
}

impl SurrealStore {
    /// Connect with exponential backoff between attempts
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let mut attempt = 0;
        let base_delay = Duration::from_secs(config.retry_delay_secs);

        loop {
            match try_connect(config).await {
                Ok(client) => {
                    tracing::info!(
                        url = %sanitize_url(&config.url),
                        namespace = %config.namespace,
                        database = %config.database,
                        attempts = attempt + 1,
                        "SurrealDB connected"
                    );
                    return Ok(Self::from_client(client));
                }
                Err(e) => {
                    attempt += 1;

                    if attempt > config.max_retries {
                        tracing::error!(
                            "Failed to connect to SurrealDB after {} attempts: {}",
                            config.max_retries + 1,
                            e
                        );
                        return Err(e);
                    }

                    let delay = base_delay * 2_u32.saturating_pow(attempt - 1);

                    tracing::warn!(
                        "SurrealDB connection attempt {} failed: {}. Retrying in {:?}...",
                        attempt,
                        e,
                        delay
                    );

                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Wrap an already connected client
    pub fn from_client(client: SurrealClient) -> Self {
        Self {
            client: Arc::new(RwLock::new(Some(client))),
        }
    }

    /// Handle to the open client; cheap to clone
    async fn client(&self, operation: DatabaseOperation) -> StoreResult<SurrealClient> {
        self.client.read().await.clone().ok_or_else(|| DatabaseError {
            operation,
            ..DatabaseError::connection_failed("store is closed")
        })
    }
}

/// Single connection attempt: connect, optional root sign-in, select ns/db
async fn try_connect(config: &StoreConfig) -> StoreResult<SurrealClient> {
    let url_safe = sanitize_url(&config.url);
    tracing::debug!("Connecting to SurrealDB: {}", url_safe);

    let client = surrealdb::engine::any::connect(config.url.as_str())
        .await
        .map_err(|e| {
            DatabaseError::connection_failed(format!(
                "{} ({})",
                categorize_surrealdb_error(&e),
                e
            ))
            .add_context(url_safe.clone())
        })?;

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        client
            .signin(surrealdb::opt::auth::Root {
                username: username.as_str(),
                password: password.as_str(),
            })
            .await
            .map_err(|e| {
                DatabaseError::connection_failed(format!(
                    "{} ({})",
                    categorize_surrealdb_error(&e),
                    e
                ))
                .add_context(url_safe.clone())
            })?;
    }

    client
        .use_ns(config.namespace.as_str())
        .use_db(config.database.as_str())
        .await
        .map_err(|e| {
            DatabaseError::configuration(format!(
                "cannot select namespace '{}' / database '{}': {}",
                config.namespace, config.database, e
            ))
            .add_context(url_safe.clone())
        })?;

    Ok(client)
}

/// Categorize SurrealDB error for better operator guidance
fn categorize_surrealdb_error(err: &surrealdb::Error) -> &'static str {
    let err_str = err.to_string().to_lowercase();

    if err_str.contains("auth") || err_str.contains("credentials") || err_str.contains("signin") {
        "Authentication error - check your credentials"
    } else if err_str.contains("connect")
        || err_str.contains("network")
        || err_str.contains("dns")
        || err_str.contains("refused")
    {
        "Network connection error - check connectivity"
    } else if err_str.contains("timeout") {
        "Connection timeout - database may be overloaded"
    } else {
        "Connection error"
    }
}

/// A SurrealQL statement with its parameter bindings
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Statement {
    pub sql: String,
    pub bindings: Vec<(String, Value)>,
}

fn check_field(field: &str) -> StoreResult<&str> {
    if FIELD_NAME.is_match(field) {
        Ok(field)
    } else {
        Err(DatabaseError::query_failed(
            DatabaseOperation::Query,
            format!("unsupported field name {:?}", field),
        ))
    }
}

/// Render a filter as a WHERE expression, pushing parameters onto `bindings`
fn compile_filter(filter: &Filter, bindings: &mut Vec<(String, Value)>) -> StoreResult<String> {
    match filter {
        Filter::And(clauses) if clauses.is_empty() => Ok("true".to_string()),
        Filter::Or(clauses) if clauses.is_empty() => Ok("false".to_string()),
        Filter::And(clauses) => join_clauses(clauses, " AND ", bindings),
        Filter::Or(clauses) => join_clauses(clauses, " OR ", bindings),
        Filter::Contains { field, needle } => {
            let field = check_field(field)?;
            let param = format!("p{}", bindings.len());
            bindings.push((param.clone(), Value::String(needle.to_lowercase())));
            Ok(format!(
                "string::lowercase(({} ?? '')) CONTAINS ${}",
                field, param
            ))
        }
        Filter::Eq { field, value } => {
            let field = check_field(field)?;
            let param = format!("p{}", bindings.len());
            bindings.push((param.clone(), value.clone()));
            Ok(format!("{} = ${}", field, param))
        }
    }
}

fn join_clauses(
    clauses: &[Filter],
    separator: &str,
    bindings: &mut Vec<(String, Value)>,
) -> StoreResult<String> {
    let parts = clauses
        .iter()
        .map(|clause| compile_filter(clause, bindings))
        .collect::<StoreResult<Vec<_>>>()?;
    Ok(format!("({})", parts.join(separator)))
}

pub(crate) fn select_statement(filter: &Filter, options: &FindOptions) -> StoreResult<Statement> {
    let mut bindings = Vec::new();
    let condition = compile_filter(filter, &mut bindings)?;
    let mut sql = format!(
        "SELECT * OMIT id FROM type::table($tb) WHERE {}",
        condition
    );

    if let Some(sort) = &options.sort {
        let direction = match sort.direction {
            OrderDirection::Ascending => "ASC",
            OrderDirection::Descending => "DESC",
        };
        sql.push_str(&format!(" ORDER BY {} {}", check_field(&sort.field)?, direction));
    }
    if let Some(limit) = options.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    if options.skip > 0 {
        sql.push_str(&format!(" START {}", options.skip));
    }

    Ok(Statement { sql, bindings })
}

pub(crate) fn count_statement(filter: &Filter) -> StoreResult<Statement> {
    let mut bindings = Vec::new();
    let condition = compile_filter(filter, &mut bindings)?;
    Ok(Statement {
        sql: format!(
            "SELECT count() AS total FROM type::table($tb) WHERE {} GROUP ALL",
            condition
        ),
        bindings,
    })
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

fn into_document(value: Value, operation: DatabaseOperation) -> StoreResult<Document> {
    match value {
        Value::Object(mut record) => {
            if let Some(id) = record.remove(RECORD_ID_FIELD) {
                record.insert(ID_FIELD.to_string(), id);
            }
            Ok(record)
        }
        other => Err(DatabaseError::type_conversion(
            operation,
            format!("expected an object record, got {}", other),
        )),
    }
}

impl SurrealStore {
    async fn run<T>(
        &self,
        operation: DatabaseOperation,
        collection: &str,
        statement: Statement,
    ) -> StoreResult<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let client = self.client(operation).await?;
        let mut query = client
            .query(statement.sql)
            .bind(("tb", collection.to_string()));
        for binding in statement.bindings {
            query = query.bind(binding);
        }

        let mut response = query.await.map_err(|e| {
            DatabaseError {
                operation,
                ..DatabaseError::from(e)
            }
            .add_context(collection.to_string())
        })?;

        response.take::<Vec<T>>(0).map_err(|e| {
            DatabaseError {
                operation,
                ..DatabaseError::from(e)
            }
            .add_context(collection.to_string())
        })
    }
}

#[async_trait]
impl DocumentStore for SurrealStore {
    fn backend(&self) -> &'static str {
        "surrealdb"
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let statement = select_statement(filter, options)?;
        let rows: Vec<Value> = self
            .run(DatabaseOperation::Query, collection, statement)
            .await?;
        rows.into_iter()
            .map(|row| into_document(row, DatabaseOperation::Query))
            .collect()
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let statement = count_statement(filter)?;
        let rows: Vec<CountRow> = self
            .run(DatabaseOperation::Count, collection, statement)
            .await?;
        Ok(rows.first().map(|row| row.total).unwrap_or(0))
    }

    async fn find_one(&self, collection: &str, id: &DocumentId) -> StoreResult<Option<Document>> {
        let options = FindOptions {
            skip: 0,
            limit: Some(1),
            sort: None,
        };
        let statement = select_statement(&Filter::eq(RECORD_ID_FIELD, id.to_string()), &options)?;
        let rows: Vec<Value> = self
            .run(DatabaseOperation::Query, collection, statement)
            .await?;
        rows.into_iter()
            .next()
            .map(|row| into_document(row, DatabaseOperation::Query))
            .transpose()
    }

    async fn insert(&self, collection: &str, mut document: Document) -> StoreResult<DocumentId> {
        let id = DocumentId::new();
        document.remove(ID_FIELD);
        document.insert(RECORD_ID_FIELD.to_string(), Value::String(id.to_string()));

        let statement = Statement {
            sql: "CREATE type::thing($tb, $key) CONTENT $doc RETURN NONE".to_string(),
            bindings: vec![
                ("key".to_string(), Value::String(id.to_string())),
                ("doc".to_string(), Value::Object(document)),
            ],
        };
        let _: Vec<Value> = self
            .run(DatabaseOperation::Insert, collection, statement)
            .await?;
        Ok(id)
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &DocumentId,
        mut fields: Document,
    ) -> StoreResult<u64> {
        fields.remove(ID_FIELD);
        fields.remove(RECORD_ID_FIELD);

        let statement = Statement {
            sql: format!(
                "UPDATE type::table($tb) MERGE $fields WHERE {} = $id RETURN {}",
                RECORD_ID_FIELD, RECORD_ID_FIELD
            ),
            bindings: vec![
                ("fields".to_string(), Value::Object(fields)),
                ("id".to_string(), Value::String(id.to_string())),
            ],
        };
        let rows: Vec<Value> = self
            .run(DatabaseOperation::Update, collection, statement)
            .await?;
        Ok(rows.len() as u64)
    }

    async fn delete_one(&self, collection: &str, id: &DocumentId) -> StoreResult<u64> {
        let statement = Statement {
            sql: format!(
                "DELETE type::table($tb) WHERE {} = $id RETURN BEFORE",
                RECORD_ID_FIELD
            ),
            bindings: vec![("id".to_string(), Value::String(id.to_string()))],
        };
        let rows: Vec<Value> = self
            .run(DatabaseOperation::Delete, collection, statement)
            .await?;
        Ok(rows.len() as u64)
    }

    async fn ping(&self) -> StoreResult<()> {
        let client = self.client(DatabaseOperation::Ping).await?;
        client.health().await.map_err(|e| DatabaseError {
            operation: DatabaseOperation::Ping,
            ..DatabaseError::from(e)
        })
    }

    async fn close(&self) {
        let Some(client) = self.client.write().await.take() else {
            return;
        };
        if let Err(e) = client.invalidate().await {
            tracing::debug!("SurrealDB session invalidate failed: {}", e);
        }
        drop(client);
        tracing::info!("SurrealDB store closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SortSpec;
    use serde_json::json;

    #[test]
    fn test_match_all_compiles_to_true() {
        let statement = select_statement(&Filter::all(), &FindOptions::default()).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT * OMIT id FROM type::table($tb) WHERE true"
        );
        assert!(statement.bindings.is_empty());
    }

    #[test]
    fn test_filters_are_parameterised() {
        let filter = Filter::And(vec![
            Filter::contains("name", "ACME"),
            Filter::Or(vec![
                Filter::contains("country", "de"),
                Filter::contains("city", "de"),
            ]),
            Filter::eq("company_id", "0192f5c4-8f3e-7cc1-bf7a-0d3e5e1d2a11"),
        ]);
        let options = FindOptions {
            skip: 20,
            limit: Some(10),
            sort: Some(SortSpec {
                field: "created_time".to_string(),
                direction: OrderDirection::Descending,
            }),
        };

        let statement = select_statement(&filter, &options).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT * OMIT id FROM type::table($tb) WHERE \
             (string::lowercase((name ?? '')) CONTAINS $p0 AND \
             (string::lowercase((country ?? '')) CONTAINS $p1 OR \
             string::lowercase((city ?? '')) CONTAINS $p2) AND company_id = $p3) \
             ORDER BY created_time DESC LIMIT 10 START 20"
        );
        assert_eq!(statement.bindings[0], ("p0".to_string(), json!("acme")));
        assert_eq!(statement.bindings.len(), 4);
    }

    #[test]
    fn test_count_statement_groups_all() {
        let statement = count_statement(&Filter::eq("category_id", "x")).unwrap();
        assert!(statement.sql.starts_with("SELECT count() AS total"));
        assert!(statement.sql.ends_with("WHERE category_id = $p0 GROUP ALL"));
    }

    #[test]
    fn test_rejects_unsafe_field_names() {
        let filter = Filter::eq("name; DELETE users", "x");
        assert!(select_statement(&filter, &FindOptions::default()).is_err());
    }

    #[test]
    fn test_into_document_renames_record_id() {
        let record = json!({ "doc_id": "abc", "name": "Rust" });
        let document = into_document(record, DatabaseOperation::Query).unwrap();
        assert_eq!(document["id"], json!("abc"));
        assert!(!document.contains_key("doc_id"));

        assert!(into_document(json!(3), DatabaseOperation::Query).is_err());
    }

    #[tokio::test]
    async fn test_close_releases_client() {
        let store = SurrealStore::from_client(surrealdb::Surreal::init());
        store.close().await;

        let err = store.ping().await.unwrap_err();
        assert_eq!(err.kind, crate::error::DatabaseErrorKind::ConnectionFailed);
        assert_eq!(err.operation, DatabaseOperation::Ping);
        let err = store
            .count("jobs", &Filter::all())
            .await
            .unwrap_err();
        assert_eq!(err.kind, crate::error::DatabaseErrorKind::ConnectionFailed);

        // Closing twice is a no-op
        store.close().await;
    }
}
