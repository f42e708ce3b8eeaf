//! One repository implementation shared by every resource
//!
//! [`ResourceRepository`] turns listing parameters into a store query,
//! stamps audit fields on create, and maps identifiers that do not parse
//! or do not match into [`RepositoryErrorKind::NotFound`].

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use super::{
    error::{RepositoryError, RepositoryErrorKind, RepositoryOperation},
    pagination::{resolve_sort, OrderDirection},
    query::{build_filter, ListParams},
    resource::Resource,
    RepositoryResult,
};
use crate::{
    ids::DocumentId,
    store::{Document, DocumentStore, Filter, FindOptions, SortSpec, StoreResult, ID_FIELD},
};

/// Actor recorded in `created_by` / `updated_by`
pub const SYSTEM_ACTOR: &str = "system";

/// Field refreshed by every write
pub const UPDATED_FIELD: &str = "updated_time";

/// Current time in the stored timestamp format
///
/// Fixed precision with a `Z` suffix, so lexical order equals time order.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Run a store call under a deadline, mapping failures into repository errors
pub async fn bounded<T, F>(
    timeout: Duration,
    operation: RepositoryOperation,
    entity_type: &'static str,
    call: F,
) -> RepositoryResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => {
            tracing::error!(
                operation = %operation,
                kind = %error.kind,
                entity = entity_type,
                error = %error,
                "Store call failed"
            );
            Err(RepositoryError::from(error)
                .with_operation(operation)
                .with_entity_type(entity_type))
        }
        Err(_) => {
            tracing::warn!(
                operation = %operation,
                entity = entity_type,
                timeout_ms = timeout.as_millis() as u64,
                "Store call timed out"
            );
            Err(RepositoryError::timeout(
                operation,
                format!("store call exceeded {}ms", timeout.as_millis()),
            )
            .with_entity_type(entity_type))
        }
    }
}

fn not_found(operation: RepositoryOperation, entity_type: &str, id: &str) -> RepositoryError {
    RepositoryError::not_found(entity_type, id).with_operation(operation)
}

/// Generic CRUD over the collection of `E`
pub struct ResourceRepository<E> {
    store: Arc<dyn DocumentStore>,
    timeout: Duration,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for ResourceRepository<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            timeout: self.timeout,
            _entity: PhantomData,
        }
    }
}

impl<E: Resource> ResourceRepository<E> {
    /// Create a repository over `store`, bounding each call by `timeout`
    pub fn new(store: Arc<dyn DocumentStore>, timeout: Duration) -> Self {
        Self {
            store,
            timeout,
            _entity: PhantomData,
        }
    }

    fn parse_id(operation: RepositoryOperation, id: &str) -> RepositoryResult<DocumentId> {
        DocumentId::parse(id).map_err(|_| not_found(operation, E::CONFIG.type_name, id))
    }

    fn decode(operation: RepositoryOperation, document: Document) -> RepositoryResult<E> {
        serde_json::from_value(Value::Object(document)).map_err(|e| {
            RepositoryError::serialization_error(operation, e.to_string())
                .with_entity_type(E::CONFIG.type_name)
        })
    }

    fn encode(operation: RepositoryOperation, entity: &E) -> RepositoryResult<Document> {
        match serde_json::to_value(entity) {
            Ok(Value::Object(document)) => Ok(document),
            Ok(_) => Err(RepositoryError::serialization_error(
                operation,
                "entity did not serialize to an object",
            )
            .with_entity_type(E::CONFIG.type_name)),
            Err(e) => Err(RepositoryError::serialization_error(operation, e.to_string())
                .with_entity_type(E::CONFIG.type_name)),
        }
    }

    fn decode_all(
        operation: RepositoryOperation,
        documents: Vec<Document>,
    ) -> RepositoryResult<Vec<E>> {
        documents
            .into_iter()
            .map(|document| Self::decode(operation, document))
            .collect()
    }

    /// One page of the filtered collection, with the filtered total
    pub async fn list(&self, params: &ListParams) -> RepositoryResult<(Vec<E>, u64)> {
        let config = E::CONFIG;
        let filter = build_filter(&params.filters, config.filters);

        let total = bounded(
            self.timeout,
            RepositoryOperation::Count,
            config.type_name,
            self.store.count(config.collection, &filter),
        )
        .await?;

        let options = FindOptions {
            skip: params.page.skip(),
            limit: Some(params.page.limit),
            sort: Some(SortSpec {
                field: resolve_sort(&params.sort, config.sortable, config.default_sort)
                    .to_string(),
                direction: OrderDirection::from_order_token(&params.order),
            }),
        };

        let documents = bounded(
            self.timeout,
            RepositoryOperation::FindAll,
            config.type_name,
            self.store.find_many(config.collection, &filter, &options),
        )
        .await?;

        let items = Self::decode_all(RepositoryOperation::FindAll, documents)?;
        Ok((items, total))
    }

    /// The entity with identifier `id`
    pub async fn get_by_id(&self, id: &str) -> RepositoryResult<E> {
        let operation = RepositoryOperation::FindById;
        let parsed = Self::parse_id(operation, id)?;
        let document = bounded(
            self.timeout,
            operation,
            E::CONFIG.type_name,
            self.store.find_one(E::CONFIG.collection, &parsed),
        )
        .await?
        .ok_or_else(|| not_found(operation, E::CONFIG.type_name, id))?;
        Self::decode(operation, document)
    }

    /// Insert `entity`, returning it with its assigned id and audit fields
    pub async fn create(&self, entity: &E) -> RepositoryResult<E> {
        let operation = RepositoryOperation::Create;
        let config = E::CONFIG;

        let mut document = Self::encode(operation, entity)?;
        document.remove(ID_FIELD);

        let now = Value::String(timestamp_now());
        document.insert(config.created_field.to_string(), now.clone());
        document.insert(UPDATED_FIELD.to_string(), now);
        document.insert("created_by".to_string(), Value::from(SYSTEM_ACTOR));
        document.insert("updated_by".to_string(), Value::from(SYSTEM_ACTOR));

        let id = bounded(
            self.timeout,
            operation,
            config.type_name,
            self.store.insert(config.collection, document.clone()),
        )
        .await?;

        tracing::debug!(entity = config.type_name, id = %id, "Created document");

        document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        Self::decode(operation, document)
    }

    /// Set one field, refreshing the update audit fields
    ///
    /// An empty `value` is rejected as not found, as is an id matching nothing.
    pub async fn update_field(&self, id: &str, field: &str, value: &str) -> RepositoryResult<()> {
        let operation = RepositoryOperation::Update;
        if value.is_empty() {
            return Err(RepositoryError::new(
                operation,
                RepositoryErrorKind::NotFound,
                format!("no value given for {}", field),
            )
            .with_entity(E::CONFIG.type_name, id));
        }
        let parsed = Self::parse_id(operation, id)?;

        let mut fields = Document::new();
        fields.insert(field.to_string(), Value::from(value));
        fields.insert(UPDATED_FIELD.to_string(), Value::String(timestamp_now()));
        fields.insert("updated_by".to_string(), Value::from(SYSTEM_ACTOR));

        let matched = bounded(
            self.timeout,
            operation,
            E::CONFIG.type_name,
            self.store.update_fields(E::CONFIG.collection, &parsed, fields),
        )
        .await?;

        if matched == 0 {
            return Err(not_found(operation, E::CONFIG.type_name, id));
        }
        Ok(())
    }

    /// Remove the entity with identifier `id`
    pub async fn delete(&self, id: &str) -> RepositoryResult<()> {
        let operation = RepositoryOperation::Delete;
        let parsed = Self::parse_id(operation, id)?;
        let deleted = bounded(
            self.timeout,
            operation,
            E::CONFIG.type_name,
            self.store.delete_one(E::CONFIG.collection, &parsed),
        )
        .await?;

        if deleted == 0 {
            return Err(not_found(operation, E::CONFIG.type_name, id));
        }
        Ok(())
    }

    /// Every entity whose `field` holds `value`, unpaginated
    pub async fn get_by_foreign_key(&self, field: &str, value: &str) -> RepositoryResult<Vec<E>> {
        let operation = RepositoryOperation::FindByReference;
        let parsed = Self::parse_id(operation, value)?;
        let documents = bounded(
            self.timeout,
            operation,
            E::CONFIG.type_name,
            self.store.find_many(
                E::CONFIG.collection,
                &Filter::eq(field, parsed.to_string()),
                &FindOptions::default(),
            ),
        )
        .await?;
        Self::decode_all(operation, documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{Application, Company},
        repository::PageRequest,
        store::MemoryStore,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;

    fn repository<E: Resource>(store: &Arc<dyn DocumentStore>) -> ResourceRepository<E> {
        ResourceRepository::new(Arc::clone(store), Duration::from_secs(5))
    }

    fn company(name: &str, country: &str, city: &str) -> Company {
        Company {
            name: name.to_string(),
            description: "Makes things people want".to_string(),
            website: "https://example.com".to_string(),
            email: "hello@example.com".to_string(),
            phone: "0123456789".to_string(),
            city: city.to_string(),
            country: country.to_string(),
            ..Company::default()
        }
    }

    async fn seeded() -> (Arc<dyn DocumentStore>, ResourceRepository<Company>) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let companies = repository::<Company>(&store);
        for (name, country, city) in [
            ("Acme", "Germany", "Berlin"),
            ("Globex", "France", "Paris"),
            ("Initech", "USA", "Austin"),
            ("Umbrella", "Germany", "Hamburg"),
            ("Hooli", "USA", "Palo Alto"),
        ] {
            companies.create(&company(name, country, city)).await.unwrap();
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        (store, companies)
    }

    fn list_params(pairs: &[(&str, &str)]) -> ListParams {
        ListParams::from_query(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_create_stamps_audit_fields() {
        let (_, companies) = seeded().await;
        let created = companies
            .create(&company("Stark", "USA", "New York"))
            .await
            .unwrap();

        let id = created.id.expect("id assigned");
        assert!(created.created_time.is_some());
        assert_eq!(created.created_time, created.updated_time);
        assert_eq!(created.created_by, "system");
        assert_eq!(created.updated_by, "system");

        let fetched = companies.get_by_id(&id.to_string()).await.unwrap();
        assert_eq!(fetched.name, "Stark");
        assert_eq!(fetched.id, Some(id));
    }

    #[tokio::test]
    async fn test_list_total_reflects_filter() {
        let (_, companies) = seeded().await;
        let (items, total) = companies
            .list(&list_params(&[("country", "germany"), ("limit", "1")]))
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(items.len(), 1);

        let (_, total) = companies.list(&ListParams::default()).await.unwrap();
        assert_eq!(total, 5);
    }

    #[tokio::test]
    async fn test_list_location_matches_any_field() {
        let (_, companies) = seeded().await;
        let (items, total) = companies
            .list(&list_params(&[("location", "a"), ("sort", "name"), ("order", "asc")]))
            .await
            .unwrap();
        let names: Vec<_> = items.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(total, 5);
        assert_eq!(names, vec!["Acme", "Globex", "Hooli", "Initech", "Umbrella"]);

        let (items, _) = companies
            .list(&list_params(&[("location", "ham")]))
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Umbrella");
    }

    #[tokio::test]
    async fn test_list_sort_defaults_to_newest_first() {
        let (_, companies) = seeded().await;
        let (items, _) = companies
            .list(&list_params(&[("sort", "password")]))
            .await
            .unwrap();
        assert_eq!(items.first().map(|c| c.name.as_str()), Some("Hooli"));
        assert_eq!(items.last().map(|c| c.name.as_str()), Some("Acme"));
    }

    #[tokio::test]
    async fn test_list_pages() {
        let (_, companies) = seeded().await;
        let params = ListParams {
            page: PageRequest::new(Some(3), Some(2)),
            sort: "name".to_string(),
            order: "asc".to_string(),
            filters: HashMap::new(),
        };
        let (items, total) = companies.list(&params).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Umbrella");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let (_, companies) = seeded().await;
        let error = companies.get_by_id("garbage").await.unwrap_err();
        assert!(error.is_not_found());
        let error = companies
            .get_by_id(&DocumentId::new().to_string())
            .await
            .unwrap_err();
        assert!(error.is_not_found());
        assert_eq!(error.entity_type.as_deref(), Some("Company"));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let (_, companies) = seeded().await;
        let created = companies
            .create(&company("Wayne", "USA", "Gotham"))
            .await
            .unwrap();
        let id = created.id.unwrap().to_string();

        companies.delete(&id).await.unwrap();
        let error = companies.delete(&id).await.unwrap_err();
        assert!(error.is_not_found());
        assert_eq!(error.operation, RepositoryOperation::Delete);
        assert!(companies.get_by_id(&id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_field_refreshes_updated_time() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let applications = repository::<Application>(&store);
        let created = applications
            .create(&Application {
                job_id: Some(DocumentId::new()),
                candidate_id: Some(DocumentId::new()),
                status: "applied".to_string(),
                ..Application::default()
            })
            .await
            .unwrap();
        let id = created.id.unwrap().to_string();

        tokio::time::sleep(Duration::from_millis(2)).await;
        applications
            .update_field(&id, "status", "accepted")
            .await
            .unwrap();

        let fetched = applications.get_by_id(&id).await.unwrap();
        assert_eq!(fetched.status, "accepted");
        assert_eq!(fetched.applied_time, created.applied_time);
        assert!(fetched.updated_time > created.updated_time);
    }

    #[tokio::test]
    async fn test_update_field_rejects_empty_and_unknown() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let applications = repository::<Application>(&store);
        let id = DocumentId::new().to_string();

        let error = applications.update_field(&id, "status", "").await.unwrap_err();
        assert!(error.is_not_found());
        let error = applications
            .update_field(&id, "status", "accepted")
            .await
            .unwrap_err();
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn test_get_by_foreign_key() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let applications = repository::<Application>(&store);
        let job = DocumentId::new();
        for candidate in 0..3 {
            let job_id = if candidate == 2 { DocumentId::new() } else { job };
            applications
                .create(&Application {
                    job_id: Some(job_id),
                    candidate_id: Some(DocumentId::new()),
                    status: "applied".to_string(),
                    ..Application::default()
                })
                .await
                .unwrap();
        }

        let found = applications
            .get_by_foreign_key("job_id", &job.to_string())
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|a| a.job_id == Some(job)));

        let error = applications
            .get_by_foreign_key("job_id", "nope")
            .await
            .unwrap_err();
        assert!(error.is_not_found());
    }

    struct StalledStore;

    #[async_trait]
    impl DocumentStore for StalledStore {
        fn backend(&self) -> &'static str {
            "stalled"
        }
        async fn find_many(
            &self,
            _: &str,
            _: &Filter,
            _: &FindOptions,
        ) -> StoreResult<Vec<Document>> {
            std::future::pending().await
        }
        async fn count(&self, _: &str, _: &Filter) -> StoreResult<u64> {
            std::future::pending().await
        }
        async fn find_one(&self, _: &str, _: &DocumentId) -> StoreResult<Option<Document>> {
            std::future::pending().await
        }
        async fn insert(&self, _: &str, _: Document) -> StoreResult<DocumentId> {
            std::future::pending().await
        }
        async fn update_fields(&self, _: &str, _: &DocumentId, _: Document) -> StoreResult<u64> {
            std::future::pending().await
        }
        async fn delete_one(&self, _: &str, _: &DocumentId) -> StoreResult<u64> {
            std::future::pending().await
        }
        async fn ping(&self) -> StoreResult<()> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_store_calls_are_bounded() {
        let companies: ResourceRepository<Company> =
            ResourceRepository::new(Arc::new(StalledStore), Duration::from_millis(20));
        let error = companies.list(&ListParams::default()).await.unwrap_err();
        assert_eq!(error.kind, RepositoryErrorKind::Timeout);
        assert_eq!(error.operation, RepositoryOperation::Count);
    }
}
