//! In-process document store
//!
//! Collections live in a [`DashMap`] keyed by name; each collection keeps its
//! documents in insertion order, which is also the tiebreak when sorting.
//! Substring matching lowercases both sides.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use super::{Document, DocumentStore, Filter, FindOptions, StoreResult, ID_FIELD};
use crate::{ids::DocumentId, repository::OrderDirection};

/// Concurrent in-memory [`DocumentStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<DashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents across every collection
    pub fn len(&self) -> usize {
        self.collections.iter().map(|entry| entry.value().len()).sum()
    }

    /// True when no collection holds a document
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Evaluate a filter against one document
pub fn matches(filter: &Filter, document: &Document) -> bool {
    match filter {
        Filter::And(clauses) => clauses.iter().all(|clause| matches(clause, document)),
        Filter::Or(clauses) => clauses.iter().any(|clause| matches(clause, document)),
        Filter::Contains { field, needle } => document
            .get(field)
            .and_then(Value::as_str)
            .map(|haystack| haystack.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false),
        Filter::Eq { field, value } => document.get(field) == Some(value),
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

/// Total order over JSON values: missing/null < bool < number < string < array < object
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn id_matches(document: &Document, id: &str) -> bool {
    document.get(ID_FIELD).and_then(Value::as_str) == Some(id)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let mut found: Vec<Document> = match self.collections.get(collection) {
            Some(documents) => documents
                .iter()
                .filter(|doc| matches(filter, doc))
                .cloned()
                .collect(),
            None => return Ok(Vec::new()),
        };

        if let Some(sort) = &options.sort {
            // stable: equal keys keep insertion order
            found.sort_by(|a, b| {
                let ordering = compare_values(a.get(&sort.field), b.get(&sort.field));
                match sort.direction {
                    OrderDirection::Ascending => ordering,
                    OrderDirection::Descending => ordering.reverse(),
                }
            });
        }

        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let take = options
            .limit
            .map(|limit| usize::try_from(limit).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        Ok(found.into_iter().skip(skip).take(take).collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let count = self
            .collections
            .get(collection)
            .map(|documents| documents.iter().filter(|doc| matches(filter, doc)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn find_one(&self, collection: &str, id: &DocumentId) -> StoreResult<Option<Document>> {
        let id = id.to_string();
        Ok(self.collections.get(collection).and_then(|documents| {
            documents
                .iter()
                .find(|doc| id_matches(doc, &id))
                .cloned()
        }))
    }

    async fn insert(&self, collection: &str, mut document: Document) -> StoreResult<DocumentId> {
        let id = DocumentId::new();
        document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(id)
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Document,
    ) -> StoreResult<u64> {
        let id = id.to_string();
        let Some(mut documents) = self.collections.get_mut(collection) else {
            return Ok(0);
        };
        let Some(document) = documents.iter_mut().find(|doc| id_matches(doc, &id)) else {
            return Ok(0);
        };
        for (key, value) in fields {
            if key != ID_FIELD {
                document.insert(key, value);
            }
        }
        Ok(1)
    }

    async fn delete_one(&self, collection: &str, id: &DocumentId) -> StoreResult<u64> {
        let id = id.to_string();
        let Some(mut documents) = self.collections.get_mut(collection) else {
            return Ok(0);
        };
        match documents.iter().position(|doc| id_matches(doc, &id)) {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SortSpec;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for (name, country, rank) in [
            ("Acme Widgets", "Germany", 3),
            ("Globex", "France", 1),
            ("acme robotics", "Germany", 2),
            ("Initech", "USA", 2),
        ] {
            store
                .insert(
                    "companies",
                    doc(json!({ "name": name, "country": country, "rank": rank })),
                )
                .await
                .unwrap();
        }
        store
    }

    fn names(documents: &[Document]) -> Vec<&str> {
        documents
            .iter()
            .map(|d| d["name"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let store = MemoryStore::new();
        let id = store
            .insert("skills", doc(json!({ "name": "Rust", "id": "ignored" })))
            .await
            .unwrap();

        let found = store.find_one("skills", &id).await.unwrap().unwrap();
        assert_eq!(found["id"], json!(id.to_string()));
        assert_eq!(found["name"], json!("Rust"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_contains_is_case_insensitive() {
        let store = seeded().await;
        let found = store
            .find_many(
                "companies",
                &Filter::contains("name", "ACME"),
                &FindOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(names(&found), vec!["Acme Widgets", "acme robotics"]);
    }

    #[tokio::test]
    async fn test_or_and_composition() {
        let store = seeded().await;
        let filter = Filter::And(vec![
            Filter::Or(vec![
                Filter::contains("country", "fra"),
                Filter::contains("country", "usa"),
            ]),
            Filter::eq("rank", 2),
        ]);
        assert_eq!(store.count("companies", &filter).await.unwrap(), 1);
        assert_eq!(store.count("companies", &Filter::Or(vec![])).await.unwrap(), 0);
        assert_eq!(store.count("companies", &Filter::all()).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_sort_is_stable_and_directional() {
        let store = seeded().await;
        let ascending = FindOptions {
            sort: Some(SortSpec {
                field: "rank".to_string(),
                direction: OrderDirection::Ascending,
            }),
            ..FindOptions::default()
        };
        let found = store
            .find_many("companies", &Filter::all(), &ascending)
            .await
            .unwrap();
        assert_eq!(
            names(&found),
            vec!["Globex", "acme robotics", "Initech", "Acme Widgets"]
        );

        let descending = FindOptions {
            sort: Some(SortSpec {
                field: "rank".to_string(),
                direction: OrderDirection::Descending,
            }),
            ..FindOptions::default()
        };
        let found = store
            .find_many("companies", &Filter::all(), &descending)
            .await
            .unwrap();
        assert_eq!(
            names(&found),
            vec!["Acme Widgets", "acme robotics", "Initech", "Globex"]
        );
    }

    #[tokio::test]
    async fn test_skip_and_limit() {
        let store = seeded().await;
        let options = FindOptions {
            skip: 1,
            limit: Some(2),
            sort: None,
        };
        let found = store
            .find_many("companies", &Filter::all(), &options)
            .await
            .unwrap();
        assert_eq!(names(&found), vec!["Globex", "acme robotics"]);

        let past_end = FindOptions {
            skip: 10,
            limit: Some(2),
            sort: None,
        };
        assert!(store
            .find_many("companies", &Filter::all(), &past_end)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_report_counts() {
        let store = MemoryStore::new();
        let id = store
            .insert("applications", doc(json!({ "status": "applied" })))
            .await
            .unwrap();

        let matched = store
            .update_fields("applications", &id, doc(json!({ "status": "accepted" })))
            .await
            .unwrap();
        assert_eq!(matched, 1);
        let found = store.find_one("applications", &id).await.unwrap().unwrap();
        assert_eq!(found["status"], json!("accepted"));
        assert_eq!(found["id"], json!(id.to_string()));

        assert_eq!(store.delete_one("applications", &id).await.unwrap(), 1);
        assert_eq!(store.delete_one("applications", &id).await.unwrap(), 0);

        let missing = DocumentId::new();
        assert_eq!(
            store
                .update_fields("applications", &missing, Document::new())
                .await
                .unwrap(),
            0
        );
        assert_eq!(store.delete_one("unknown", &missing).await.unwrap(), 0);
    }

    #[test]
    fn test_compare_values_ranks_types() {
        assert_eq!(
            compare_values(None, Some(&json!("a"))),
            Ordering::Less
        );
        assert_eq!(
            compare_values(Some(&json!(10)), Some(&json!(9.5))),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(Some(&json!(true)), Some(&json!(1))),
            Ordering::Less
        );
    }
}
