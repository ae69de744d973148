// ============================================================================
// Phonebook Core - Worker Service
// File: crates/phonebook-core/src/services/worker_service.rs
// ============================================================================
//! Worker entry points: tenant resolution, role checks, validation, then
//! delegation to the store under the request's cancellation scope.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use phonebook_shared::constants::MAX_PHOTO_SIZE_BYTES;
use phonebook_shared::utils::mask_email;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::context::RequestContext;
use crate::domain::{Role, Worker, WorkerProfile};
use crate::error::DomainError;
use crate::repositories::{CompositeWriter, WorkerRepository};
use crate::services::birthday::{BirthdayWindow, MonthDay};
use crate::services::search::{SearchQuery, WorkerFilter};
use crate::tenancy::TenantRouter;

/// Re-reads allowed when a non-admin update races another writer.
const UPDATE_ATTEMPTS: usize = 3;

pub struct WorkerService {
    router: Arc<TenantRouter>,
    workers: Arc<dyn WorkerRepository>,
    writer: Arc<dyn CompositeWriter>,
}

fn check_photo(photo: &[u8]) -> Result<(), DomainError> {
    if photo.is_empty() {
        return Err(DomainError::ValidationError("photo is empty".into()));
    }
    if photo.len() > MAX_PHOTO_SIZE_BYTES {
        return Err(DomainError::PayloadTooLarge(format!(
            "photo is {} bytes, limit is {} bytes",
            photo.len(),
            MAX_PHOTO_SIZE_BYTES
        )));
    }
    Ok(())
}

fn prepare(profile: WorkerProfile) -> Result<WorkerProfile, DomainError> {
    let profile = profile.normalized();
    profile.validate()?;
    if let Some(photo) = &profile.photo {
        check_photo(photo)?;
    }
    Ok(profile)
}

impl WorkerService {
    pub fn new(
        router: Arc<TenantRouter>,
        workers: Arc<dyn WorkerRepository>,
        writer: Arc<dyn CompositeWriter>,
    ) -> Self {
        Self { router, workers, writer }
    }

    pub async fn create_worker(
        &self,
        ctx: &RequestContext,
        institute: &str,
        profile: WorkerProfile,
    ) -> Result<Worker, DomainError> {
        let partition = self.router.resolve(institute)?;
        ctx.role.require(Role::User, "create workers")?;
        let profile = prepare(profile)?;

        let worker = ctx
            .run("workers.create", self.workers.create(&partition, &profile))
            .await?;
        info!(
            request_id = %ctx.request_id,
            tenant = partition.schema(),
            email = %mask_email(&worker.profile.email),
            "worker created"
        );
        Ok(worker)
    }

    pub async fn get_worker(
        &self,
        ctx: &RequestContext,
        institute: &str,
        email: &str,
    ) -> Result<Worker, DomainError> {
        let partition = self.router.resolve(institute)?;
        let email = email.trim().to_lowercase();
        ctx.run("workers.get", self.workers.find_by_email(&partition, &email)).await
    }

    pub async fn list_workers(
        &self,
        ctx: &RequestContext,
        institute: &str,
        department: Option<&str>,
        section: Option<&str>,
    ) -> Result<Vec<Worker>, DomainError> {
        let partition = self.router.resolve(institute)?;
        let filter = WorkerFilter::new(department, section)?;
        ctx.run("workers.list", self.workers.list(&partition, &filter)).await
    }

    /// Replaces the worker keyed by `email` with `profile` (the photo is left
    /// alone). A `User` may only fill fields that are currently empty; the
    /// write is applied only if the record still matches what was checked,
    /// otherwise the check is repeated against the fresh record.
    pub async fn update_worker(
        &self,
        ctx: &RequestContext,
        institute: &str,
        email: &str,
        profile: WorkerProfile,
    ) -> Result<Worker, DomainError> {
        let partition = self.router.resolve(institute)?;
        ctx.role.require(Role::User, "update workers")?;
        let email = email.trim().to_lowercase();
        let mut profile = profile.normalized();
        profile.photo = None;
        profile.validate()?;

        if ctx.role >= Role::Admin {
            return ctx
                .run("workers.update", self.workers.update(&partition, &email, &profile))
                .await;
        }

        ctx.run("workers.update", async {
            for attempt in 1..=UPDATE_ATTEMPTS {
                let current = self.workers.find_by_email(&partition, &email).await?;
                let locked = current.profile.locked_changes(&profile);
                if !locked.is_empty() {
                    warn!(
                        request_id = %ctx.request_id,
                        tenant = partition.schema(),
                        fields = ?locked,
                        "non-admin update touched filled fields"
                    );
                    return Err(DomainError::Forbidden(format!(
                        "only an admin may change filled fields: {}",
                        locked.join(", ")
                    )));
                }

                match self
                    .workers
                    .update_if_unchanged(&partition, &email, &current.profile, &profile)
                    .await?
                {
                    Some(worker) => return Ok(worker),
                    None => debug!(
                        request_id = %ctx.request_id,
                        tenant = partition.schema(),
                        attempt,
                        "worker changed during update, re-checking"
                    ),
                }
            }
            Err(DomainError::Conflict(format!(
                "worker {} kept changing during update",
                mask_email(&email)
            )))
        })
        .await
    }

    pub async fn delete_worker(
        &self,
        ctx: &RequestContext,
        institute: &str,
        email: &str,
    ) -> Result<(), DomainError> {
        let partition = self.router.resolve(institute)?;
        ctx.role.require(Role::Admin, "delete workers")?;
        let email = email.trim().to_lowercase();
        ctx.run("workers.delete", self.workers.delete(&partition, &email)).await?;
        info!(
            request_id = %ctx.request_id,
            tenant = partition.schema(),
            email = %mask_email(&email),
            "worker deleted"
        );
        Ok(())
    }

    /// All-or-nothing bulk insert. Records are validated up front, so a bad
    /// record aborts the batch before any storage call.
    pub async fn import_workers(
        &self,
        ctx: &RequestContext,
        institute: &str,
        profiles: Vec<WorkerProfile>,
    ) -> Result<usize, DomainError> {
        let partition = self.router.resolve(institute)?;
        ctx.role.require(Role::User, "import workers")?;
        if profiles.is_empty() {
            return Err(DomainError::ValidationError("import contains no records".into()));
        }

        let mut prepared = Vec::with_capacity(profiles.len());
        for (index, profile) in profiles.into_iter().enumerate() {
            let email = profile.email.trim().to_lowercase();
            let profile = prepare(profile).map_err(|source| DomainError::ImportAborted {
                position: index + 1,
                email,
                source: Box::new(source),
            })?;
            prepared.push(profile);
        }

        let imported = ctx
            .run("workers.import", self.writer.import_workers(&partition, &prepared))
            .await?;
        info!(
            request_id = %ctx.request_id,
            tenant = partition.schema(),
            imported,
            "bulk import committed"
        );
        Ok(imported)
    }

    /// Conjunctive prefix search. A query with no tokens returns nothing and
    /// never reaches the store.
    pub async fn search(
        &self,
        ctx: &RequestContext,
        institute: &str,
        text: &str,
        department: Option<&str>,
        section: Option<&str>,
    ) -> Result<Vec<Worker>, DomainError> {
        let partition = self.router.resolve(institute)?;
        let filter = WorkerFilter::new(department, section)?;
        let query = SearchQuery::new(text, filter);
        if query.is_empty() {
            debug!(tenant = partition.schema(), "empty search query");
            return Ok(Vec::new());
        }
        ctx.run("workers.search", self.workers.search(&partition, &query)).await
    }

    pub async fn birthdays(
        &self,
        ctx: &RequestContext,
        institute: &str,
        window: BirthdayWindow,
    ) -> Result<Vec<Worker>, DomainError> {
        self.birthdays_on(ctx, institute, window, Local::now().date_naive()).await
    }

    pub async fn birthdays_on(
        &self,
        ctx: &RequestContext,
        institute: &str,
        window: BirthdayWindow,
        today: NaiveDate,
    ) -> Result<Vec<Worker>, DomainError> {
        let partition = self.router.resolve(institute)?;
        let day = MonthDay::for_window(today, window);
        debug!(
            tenant = partition.schema(),
            window = window.as_str(),
            month = day.month,
            day = day.day,
            "birthday lookup"
        );
        ctx.run("workers.birthdays", self.workers.birthdays_on(&partition, day)).await
    }

    /// `Ok(None)` when the worker exists but has no photo.
    pub async fn get_photo(
        &self,
        ctx: &RequestContext,
        institute: &str,
        email: &str,
    ) -> Result<Option<Vec<u8>>, DomainError> {
        let partition = self.router.resolve(institute)?;
        let email = email.trim().to_lowercase();
        ctx.run("workers.photo.get", self.workers.find_photo(&partition, &email)).await
    }

    /// Stores a photo for a worker that has none yet.
    pub async fn upload_photo(
        &self,
        ctx: &RequestContext,
        institute: &str,
        email: &str,
        photo: Vec<u8>,
    ) -> Result<(), DomainError> {
        let partition = self.router.resolve(institute)?;
        ctx.role.require(Role::User, "upload photos")?;
        check_photo(&photo)?;
        let email = email.trim().to_lowercase();

        ctx.run("workers.photo.upload", self.workers.attach_photo(&partition, &email, photo))
            .await
    }

    pub async fn replace_photo(
        &self,
        ctx: &RequestContext,
        institute: &str,
        email: &str,
        photo: Vec<u8>,
    ) -> Result<(), DomainError> {
        let partition = self.router.resolve(institute)?;
        ctx.role.require(Role::Admin, "replace photos")?;
        check_photo(&photo)?;
        let email = email.trim().to_lowercase();
        ctx.run("workers.photo.replace", self.workers.set_photo(&partition, &email, Some(photo)))
            .await
    }

    pub async fn delete_photo(
        &self,
        ctx: &RequestContext,
        institute: &str,
        email: &str,
    ) -> Result<(), DomainError> {
        let partition = self.router.resolve(institute)?;
        ctx.role.require(Role::Admin, "delete photos")?;
        let email = email.trim().to_lowercase();
        ctx.run("workers.photo.delete", self.workers.set_photo(&partition, &email, None)).await
    }
}
