//! Resource orchestration
//!
//! [`ResourceService`] is what handlers call. Create runs validation, then
//! the reference checks, then the insert; delete runs the dependency guard
//! first for resources that have dependents. Everything else passes
//! straight through to the repository.

use std::sync::Arc;

use serde_json::Value;

use crate::{
    ids::DocumentId,
    integrity::{check_references, check_unreferenced, IntegrityError, ReferenceResolver},
    repository::{
        ListParams, RepositoryError, RepositoryOperation, RepositoryResult, Resource,
        ResourceRepository,
    },
    validation::{text, FieldErrors},
};

/// Failure of a service operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The payload failed field validation
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),

    /// A foreign key did not resolve
    #[error("{entity} not found")]
    ReferenceNotFound {
        /// Field holding the reference
        field: &'static str,
        /// Entity that was not found
        entity: &'static str,
    },

    /// Delete refused while other documents reference the target
    #[error("{entity} {id} is referenced by {count} {dependent} document(s)")]
    Blocked {
        /// Entity being deleted
        entity: &'static str,
        /// Identifier of the entity being deleted
        id: String,
        /// Entity holding the references
        dependent: &'static str,
        /// How many references were found
        count: u64,
    },

    /// Repository failure, including not found
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Use cases for one resource
pub struct ResourceService<E> {
    repository: ResourceRepository<E>,
    references: Arc<dyn ReferenceResolver>,
}

impl<E> Clone for ResourceService<E> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            references: Arc::clone(&self.references),
        }
    }
}

impl<E: Resource> ResourceService<E> {
    /// Combine a repository with the resolver used for integrity checks
    pub fn new(repository: ResourceRepository<E>, references: Arc<dyn ReferenceResolver>) -> Self {
        Self {
            repository,
            references,
        }
    }

    /// One page and the filtered total
    pub async fn list(&self, params: &ListParams) -> RepositoryResult<(Vec<E>, u64)> {
        self.repository.list(params).await
    }

    /// Entity by identifier
    pub async fn get(&self, id: &str) -> RepositoryResult<E> {
        self.repository.get_by_id(id).await
    }

    /// Every entity whose `field` points at `parent_id`
    pub async fn list_by(&self, field: &str, parent_id: &str) -> RepositoryResult<Vec<E>> {
        self.repository.get_by_foreign_key(field, parent_id).await
    }

    /// Validate, check references, then insert
    ///
    /// Nothing is written unless every check passes.
    pub async fn create(&self, entity: E) -> ServiceResult<E> {
        let errors = entity.validate();
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        let document = match serde_json::to_value(&entity) {
            Ok(Value::Object(document)) => document,
            _ => {
                return Err(RepositoryError::serialization_error(
                    RepositoryOperation::Create,
                    "entity did not serialize to an object",
                )
                .with_entity_type(E::CONFIG.type_name)
                .into())
            }
        };
        check_references(self.references.as_ref(), E::CONFIG.references, &document)
            .await
            .map_err(|error| Self::integrity_failure(None, error))?;

        let created = self.repository.create(&entity).await?;
        tracing::info!(entity = E::CONFIG.type_name, "Created {}", E::CONFIG.entity);
        Ok(created)
    }

    /// Change the resource's single updatable field
    ///
    /// A non-empty value outside the allowed set is a validation failure;
    /// an empty value is passed on and comes back as not found.
    pub async fn update_field(&self, id: &str, value: &str) -> ServiceResult<()> {
        let Some(updatable) = E::CONFIG.updatable else {
            return Err(RepositoryError::new(
                RepositoryOperation::Update,
                crate::repository::RepositoryErrorKind::Other,
                "resource has no updatable field",
            )
            .with_entity_type(E::CONFIG.type_name)
            .into());
        };

        if !value.is_empty() {
            let mut errors = FieldErrors::new();
            errors.check(text(updatable.field, value).one_of(updatable.allowed));
            if !errors.is_empty() {
                return Err(ServiceError::Validation(errors));
            }
        }

        self.repository
            .update_field(id, updatable.field, value)
            .await?;
        tracing::info!(
            entity = E::CONFIG.type_name,
            id,
            field = updatable.field,
            "Updated {}",
            E::CONFIG.entity
        );
        Ok(())
    }

    /// Delete, refusing while dependents reference the entity
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        if !E::CONFIG.dependents.is_empty() {
            let parsed = DocumentId::parse(id).map_err(|_| {
                RepositoryError::not_found(E::CONFIG.type_name, id)
                    .with_operation(RepositoryOperation::Delete)
            })?;
            check_unreferenced(
                self.references.as_ref(),
                E::CONFIG.entity,
                E::CONFIG.dependents,
                &parsed,
            )
            .await
            .map_err(|error| Self::integrity_failure(Some(id), error))?;
        }

        self.repository.delete(id).await?;
        tracing::info!(entity = E::CONFIG.type_name, id, "Deleted {}", E::CONFIG.entity);
        Ok(())
    }

    fn integrity_failure(id: Option<&str>, error: IntegrityError) -> ServiceError {
        match error {
            IntegrityError::ReferenceNotFound { field, entity } => {
                ServiceError::ReferenceNotFound { field, entity }
            }
            IntegrityError::Referenced {
                entity,
                dependent,
                count,
            } => {
                let id = id.unwrap_or_default().to_string();
                tracing::warn!(
                    entity = E::CONFIG.type_name,
                    id = %id,
                    dependent,
                    count,
                    "Delete blocked by existing references"
                );
                ServiceError::Blocked {
                    entity,
                    id,
                    dependent,
                    count,
                }
            }
            IntegrityError::Repository(error) => ServiceError::Repository(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        integrity::{StoreReferences, UncheckedReferences},
        models::{Application, Company, Job, JobCategory, Recruiter},
        store::{DocumentStore, MemoryStore},
    };
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(5);

    struct Fixture {
        store: Arc<dyn DocumentStore>,
        references: Arc<dyn ReferenceResolver>,
    }

    impl Fixture {
        fn checked() -> Self {
            let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
            let references = Arc::new(StoreReferences::new(Arc::clone(&store), TIMEOUT));
            Self { store, references }
        }

        fn unchecked() -> Self {
            Self {
                store: Arc::new(MemoryStore::new()),
                references: Arc::new(UncheckedReferences),
            }
        }

        fn service<E: Resource>(&self) -> ResourceService<E> {
            ResourceService::new(
                ResourceRepository::new(Arc::clone(&self.store), TIMEOUT),
                Arc::clone(&self.references),
            )
        }
    }

    fn company() -> Company {
        Company {
            name: "Acme".to_string(),
            website: "https://acme.test".to_string(),
            email: "jobs@acme.test".to_string(),
            phone: "0301234567".to_string(),
            city: "Berlin".to_string(),
            country: "Germany".to_string(),
            ..Company::default()
        }
    }

    fn category() -> JobCategory {
        JobCategory {
            name: "Engineering".to_string(),
            description: "Software and hardware roles".to_string(),
            ..JobCategory::default()
        }
    }

    fn recruiter(company_id: Option<DocumentId>) -> Recruiter {
        Recruiter {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: "grace@acme.test".to_string(),
            password: "compilers".to_string(),
            phone: "0301234568".to_string(),
            company_id,
            ..Recruiter::default()
        }
    }

    fn job(recruiter: DocumentId, company: DocumentId, category: DocumentId) -> Job {
        Job {
            title: "Backend Engineer".to_string(),
            description: "Own the listing engine end to end".to_string(),
            recruiter_id: Some(recruiter),
            company_id: Some(company),
            category_id: Some(category),
            location: "Berlin".to_string(),
            job_type: "full-time".to_string(),
            salary_min: 60_000,
            salary_max: 90_000,
            status: "active".to_string(),
            ..Job::default()
        }
    }

    async fn seed(fixture: &Fixture) -> (DocumentId, DocumentId, DocumentId) {
        let company = fixture.service::<Company>().create(company()).await.unwrap();
        let company = company.id.unwrap();
        let category = fixture
            .service::<JobCategory>()
            .create(category())
            .await
            .unwrap()
            .id
            .unwrap();
        let recruiter = fixture
            .service::<Recruiter>()
            .create(recruiter(Some(company)))
            .await
            .unwrap()
            .id
            .unwrap();
        (recruiter, company, category)
    }

    #[tokio::test]
    async fn test_create_job_with_valid_references() {
        let fixture = Fixture::checked();
        let (recruiter, company, category) = seed(&fixture).await;
        let created = fixture
            .service::<Job>()
            .create(job(recruiter, company, category))
            .await
            .unwrap();
        assert!(created.id.is_some());
        assert_eq!(created.recruiter_id, Some(recruiter));
    }

    #[tokio::test]
    async fn test_missing_recruiter_blocks_insert() {
        let fixture = Fixture::checked();
        let (_, company, category) = seed(&fixture).await;
        let jobs = fixture.service::<Job>();

        let error = jobs
            .create(job(DocumentId::new(), company, category))
            .await
            .unwrap_err();
        assert_eq!(
            error,
            ServiceError::ReferenceNotFound {
                field: "recruiter_id",
                entity: "recruiter"
            }
        );
        assert_eq!(error.to_string(), "recruiter not found");

        let (_, total) = jobs.list(&ListParams::default()).await.unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_validation_precedes_reference_checks() {
        let fixture = Fixture::checked();
        let mut inverted = job(DocumentId::new(), DocumentId::new(), DocumentId::new());
        inverted.salary_min = 50_000;
        inverted.salary_max = 40_000;

        let error = fixture.service::<Job>().create(inverted).await.unwrap_err();
        match error {
            ServiceError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors.has("salary_max"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_independent_recruiter_needs_no_company() {
        let fixture = Fixture::checked();
        let created = fixture
            .service::<Recruiter>()
            .create(recruiter(None))
            .await
            .unwrap();
        assert_eq!(created.company_id, None);

        let error = fixture
            .service::<Recruiter>()
            .create(recruiter(Some(DocumentId::new())))
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            ServiceError::ReferenceNotFound { entity: "company", .. }
        ));
    }

    #[tokio::test]
    async fn test_unchecked_mode_skips_references() {
        let fixture = Fixture::unchecked();
        let created = fixture
            .service::<Job>()
            .create(job(DocumentId::new(), DocumentId::new(), DocumentId::new()))
            .await
            .unwrap();
        assert!(created.id.is_some());
    }

    #[tokio::test]
    async fn test_category_delete_guard() {
        let fixture = Fixture::checked();
        let (recruiter, company, category) = seed(&fixture).await;
        let jobs = fixture.service::<Job>();
        let categories = fixture.service::<JobCategory>();
        let created = jobs
            .create(job(recruiter, company, category))
            .await
            .unwrap();

        let error = categories.delete(&category.to_string()).await.unwrap_err();
        assert!(matches!(error, ServiceError::Blocked { count: 1, .. }));
        assert!(categories.get(&category.to_string()).await.is_ok());
        assert!(jobs.get(&created.id.unwrap().to_string()).await.is_ok());

        jobs.delete(&created.id.unwrap().to_string()).await.unwrap();
        categories.delete(&category.to_string()).await.unwrap();
        let error = categories.get(&category.to_string()).await.unwrap_err();
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn test_category_delete_with_bad_id_is_not_found() {
        let fixture = Fixture::checked();
        let error = fixture
            .service::<JobCategory>()
            .delete("not-an-id")
            .await
            .unwrap_err();
        assert!(matches!(error, ServiceError::Repository(e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn test_update_status() {
        let fixture = Fixture::unchecked();
        let applications = fixture.service::<Application>();
        let created = applications
            .create(Application {
                job_id: Some(DocumentId::new()),
                candidate_id: Some(DocumentId::new()),
                status: "applied".to_string(),
                ..Application::default()
            })
            .await
            .unwrap();
        let id = created.id.unwrap().to_string();

        applications.update_field(&id, "under_review").await.unwrap();
        assert_eq!(applications.get(&id).await.unwrap().status, "under_review");

        let error = applications.update_field(&id, "hired").await.unwrap_err();
        assert!(matches!(error, ServiceError::Validation(ref e) if e.has("status")));

        let error = applications.update_field(&id, "").await.unwrap_err();
        assert!(matches!(error, ServiceError::Repository(ref e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn test_update_without_updatable_field() {
        let fixture = Fixture::unchecked();
        let error = fixture
            .service::<Company>()
            .update_field(&DocumentId::new().to_string(), "anything")
            .await
            .unwrap_err();
        assert!(matches!(error, ServiceError::Repository(_)));
    }
}
