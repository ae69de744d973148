// ============================================================================
// Phonebook Infrastructure - In-Memory Directory
// File: crates/phonebook-infrastructure/src/memory.rs
// ============================================================================
//! Process-local implementation of every storage port.
//!
//! Used by the integration tests and for running the server without a
//! database. Each partition sits behind its own lock, held for the whole
//! call, so calls within one tenant are serialized while other tenants
//! proceed. Composite writes work on a staged copy of the partition and swap
//! it in only after the last step succeeds; if the future is dropped first,
//! the staged copy is discarded with it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use phonebook_core::error::DomainError;
use phonebook_core::repositories::{
    CompositeWriter, DepartmentRepository, ServiceRepository, WorkerRepository,
};
use phonebook_core::services::birthday::MonthDay;
use phonebook_core::services::search::{sort_workers, SearchQuery, WorkerFilter};
use phonebook_core::{
    Department, DepartmentDraft, EmergencyService, Partition, Section, Worker, WorkerProfile,
};

#[derive(Debug, Clone, Default)]
struct PartitionState {
    workers: Vec<Worker>,
    departments: Vec<Department>,
    next_worker_id: i64,
    next_department_id: i64,
    next_section_id: i64,
}

impl PartitionState {
    fn position(&self, email: &str) -> Option<usize> {
        self.workers.iter().position(|w| w.profile.email == email)
    }

    fn insert_worker(&mut self, profile: &WorkerProfile) -> Result<Worker, DomainError> {
        if self.position(&profile.email).is_some() {
            return Err(DomainError::already_exists("worker", profile.email.as_str()));
        }
        self.next_worker_id += 1;
        let worker = Worker { id: self.next_worker_id, profile: profile.clone() };
        self.workers.push(worker.clone());
        Ok(worker)
    }

    fn replace_fields(&mut self, email: &str, profile: &WorkerProfile) -> Result<Worker, DomainError> {
        let index = self
            .position(email)
            .ok_or_else(|| DomainError::not_found("worker", email))?;
        if profile.email != email && self.position(&profile.email).is_some() {
            return Err(DomainError::already_exists("worker", profile.email.as_str()));
        }
        let stored = &mut self.workers[index];
        let photo = stored.profile.photo.take();
        stored.profile = WorkerProfile { photo, ..profile.clone() };
        Ok(stored.clone())
    }

    fn insert_department_row(&mut self, name: &str) -> Result<i64, DomainError> {
        if self.departments.iter().any(|d| d.name == name) {
            return Err(DomainError::already_exists("department", name));
        }
        self.next_department_id += 1;
        let id = self.next_department_id;
        self.departments.push(Department { id, name: name.to_string(), sections: Vec::new() });
        Ok(id)
    }

    fn insert_section_row(&mut self, department_id: i64, name: &str) -> Result<(), DomainError> {
        self.next_section_id += 1;
        let section_id = self.next_section_id;
        let department = self
            .departments
            .iter_mut()
            .find(|d| d.id == department_id)
            .ok_or_else(|| DomainError::not_found("department", department_id.to_string()))?;
        if department.sections.iter().any(|s| s.name == name) {
            return Err(DomainError::already_exists("section", name));
        }
        department.sections.push(Section { id: section_id, name: name.to_string(), department_id });
        Ok(())
    }

    fn department(&self, id: i64) -> Option<Department> {
        self.departments.iter().find(|d| d.id == id).cloned()
    }
}

fn without_photo(mut worker: Worker) -> Worker {
    worker.profile.photo = None;
    worker
}

fn collect_sorted<'a>(workers: impl Iterator<Item = &'a Worker>) -> Vec<Worker> {
    let mut found: Vec<Worker> = workers.cloned().map(without_photo).collect();
    sort_workers(&mut found);
    found
}

type PartitionCell = Arc<Mutex<PartitionState>>;

#[derive(Debug, Default)]
pub struct MemoryDirectory {
    // the outer lock is only held long enough to find or create a cell
    partitions: Mutex<HashMap<String, PartitionCell>>,
    services: Vec<EmergencyService>,
    row_delay: Option<Duration>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the global emergency listing.
    pub fn with_services(mut self, services: Vec<EmergencyService>) -> Self {
        self.services = services;
        self
    }

    /// Pauses between rows of composite writes, so tests can interrupt a
    /// transaction half-way.
    pub fn with_row_delay(mut self, delay: Duration) -> Self {
        self.row_delay = Some(delay);
        self
    }

    async fn between_rows(&self) {
        match self.row_delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
    }

    async fn cell(&self, partition: &Partition) -> PartitionCell {
        let mut cells = self.partitions.lock().await;
        cells.entry(partition.schema().to_string()).or_default().clone()
    }

    async fn read<T>(&self, partition: &Partition, f: impl FnOnce(&PartitionState) -> T) -> T {
        let cell = self.cell(partition).await;
        let state = cell.lock().await;
        f(&*state)
    }

    async fn write<T>(
        &self,
        partition: &Partition,
        f: impl FnOnce(&mut PartitionState) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let cell = self.cell(partition).await;
        let mut state = cell.lock().await;
        f(&mut *state)
    }

    async fn write_department(
        &self,
        partition: &Partition,
        replace: Option<&str>,
        draft: &DepartmentDraft,
    ) -> Result<Department, DomainError> {
        let cell = self.cell(partition).await;
        let mut guard = cell.lock().await;
        let mut staged = PartitionState::clone(&guard);

        if let Some(old_name) = replace {
            let before = staged.departments.len();
            staged.departments.retain(|d| d.name != old_name);
            if staged.departments.len() == before {
                return Err(DomainError::not_found("department", old_name));
            }
            self.between_rows().await;
        }

        let id = staged.insert_department_row(&draft.name)?;
        for section in &draft.sections {
            self.between_rows().await;
            staged.insert_section_row(id, section)?;
        }

        let department = staged
            .department(id)
            .ok_or_else(|| DomainError::not_found("department", draft.name.as_str()))?;
        *guard = staged;
        Ok(department)
    }
}

#[async_trait]
impl WorkerRepository for MemoryDirectory {
    async fn create(&self, partition: &Partition, profile: &WorkerProfile) -> Result<Worker, DomainError> {
        debug!(tenant = partition.schema(), "workers.create");
        self.write(partition, |state| state.insert_worker(profile)).await
    }

    async fn find_by_email(&self, partition: &Partition, email: &str) -> Result<Worker, DomainError> {
        self.read(partition, |state| {
            state
                .workers
                .iter()
                .find(|w| w.profile.email == email)
                .cloned()
                .ok_or_else(|| DomainError::not_found("worker", email))
        })
        .await
    }

    async fn list(&self, partition: &Partition, filter: &WorkerFilter) -> Result<Vec<Worker>, DomainError> {
        Ok(self
            .read(partition, |state| {
                collect_sorted(state.workers.iter().filter(|w| filter.matches(&w.profile)))
            })
            .await)
    }

    async fn update(&self, partition: &Partition, email: &str, profile: &WorkerProfile) -> Result<Worker, DomainError> {
        self.write(partition, |state| state.replace_fields(email, profile)).await
    }

    async fn update_if_unchanged(
        &self,
        partition: &Partition,
        email: &str,
        expected: &WorkerProfile,
        profile: &WorkerProfile,
    ) -> Result<Option<Worker>, DomainError> {
        self.write(partition, |state| {
            let current = state
                .position(email)
                .map(|index| &state.workers[index].profile)
                .ok_or_else(|| DomainError::not_found("worker", email))?;
            if !current.same_fields(expected) {
                debug!(tenant = partition.schema(), "workers.update skipped, record changed");
                return Ok(None);
            }
            state.replace_fields(email, profile).map(Some)
        })
        .await
    }

    async fn delete(&self, partition: &Partition, email: &str) -> Result<(), DomainError> {
        self.write(partition, |state| {
            let index = state
                .position(email)
                .ok_or_else(|| DomainError::not_found("worker", email))?;
            state.workers.remove(index);
            Ok(())
        })
        .await
    }

    async fn search(&self, partition: &Partition, query: &SearchQuery) -> Result<Vec<Worker>, DomainError> {
        Ok(self
            .read(partition, |state| {
                collect_sorted(state.workers.iter().filter(|w| query.matches(&w.profile)))
            })
            .await)
    }

    async fn birthdays_on(&self, partition: &Partition, day: MonthDay) -> Result<Vec<Worker>, DomainError> {
        Ok(self
            .read(partition, |state| {
                collect_sorted(
                    state
                        .workers
                        .iter()
                        .filter(|w| w.profile.birth_date.is_some_and(|d| day.matches(d))),
                )
            })
            .await)
    }

    async fn find_photo(&self, partition: &Partition, email: &str) -> Result<Option<Vec<u8>>, DomainError> {
        self.read(partition, |state| {
            state
                .workers
                .iter()
                .find(|w| w.profile.email == email)
                .map(|w| w.profile.photo.clone())
                .ok_or_else(|| DomainError::not_found("worker", email))
        })
        .await
    }

    async fn attach_photo(&self, partition: &Partition, email: &str, photo: Vec<u8>) -> Result<(), DomainError> {
        self.write(partition, |state| {
            let index = state
                .position(email)
                .ok_or_else(|| DomainError::not_found("worker", email))?;
            let stored = &mut state.workers[index].profile.photo;
            if stored.is_some() {
                return Err(DomainError::already_exists("photo", email));
            }
            *stored = Some(photo);
            Ok(())
        })
        .await
    }

    async fn set_photo(&self, partition: &Partition, email: &str, photo: Option<Vec<u8>>) -> Result<(), DomainError> {
        self.write(partition, |state| {
            let index = state
                .position(email)
                .ok_or_else(|| DomainError::not_found("worker", email))?;
            state.workers[index].profile.photo = photo;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl DepartmentRepository for MemoryDirectory {
    async fn list(&self, partition: &Partition) -> Result<Vec<Department>, DomainError> {
        Ok(self
            .read(partition, |state| {
                let mut departments = state.departments.clone();
                departments.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
                departments
            })
            .await)
    }

    async fn find_by_name(&self, partition: &Partition, name: &str) -> Result<Department, DomainError> {
        self.read(partition, |state| {
            state
                .departments
                .iter()
                .find(|d| d.name == name)
                .cloned()
                .ok_or_else(|| DomainError::not_found("department", name))
        })
        .await
    }

    async fn delete(&self, partition: &Partition, name: &str) -> Result<(), DomainError> {
        self.write(partition, |state| {
            let before = state.departments.len();
            state.departments.retain(|d| d.name != name);
            if state.departments.len() == before {
                return Err(DomainError::not_found("department", name));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl CompositeWriter for MemoryDirectory {
    async fn create_department(&self, partition: &Partition, draft: &DepartmentDraft) -> Result<Department, DomainError> {
        self.write_department(partition, None, draft).await
    }

    async fn replace_department(
        &self,
        partition: &Partition,
        old_name: &str,
        draft: &DepartmentDraft,
    ) -> Result<Department, DomainError> {
        self.write_department(partition, Some(old_name), draft).await
    }

    async fn import_workers(&self, partition: &Partition, workers: &[WorkerProfile]) -> Result<usize, DomainError> {
        let cell = self.cell(partition).await;
        let mut guard = cell.lock().await;
        let mut staged = PartitionState::clone(&guard);

        for (index, profile) in workers.iter().enumerate() {
            if index > 0 {
                self.between_rows().await;
            }
            staged.insert_worker(profile).map_err(|source| DomainError::ImportAborted {
                position: index + 1,
                email: profile.email.clone(),
                source: Box::new(source),
            })?;
        }

        *guard = staged;
        info!(tenant = partition.schema(), count = workers.len(), "import committed");
        Ok(workers.len())
    }
}

#[async_trait]
impl ServiceRepository for MemoryDirectory {
    async fn list(&self) -> Result<Vec<EmergencyService>, DomainError> {
        let mut services = self.services.clone();
        services.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(services)
    }
}
