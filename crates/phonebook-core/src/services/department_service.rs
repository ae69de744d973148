//! Department entry points

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::context::RequestContext;
use crate::domain::{Department, DepartmentDraft, Role, Section};
use crate::error::DomainError;
use crate::repositories::{CompositeWriter, DepartmentRepository};
use crate::tenancy::TenantRouter;

pub struct DepartmentService {
    router: Arc<TenantRouter>,
    departments: Arc<dyn DepartmentRepository>,
    writer: Arc<dyn CompositeWriter>,
}

impl DepartmentService {
    pub fn new(
        router: Arc<TenantRouter>,
        departments: Arc<dyn DepartmentRepository>,
        writer: Arc<dyn CompositeWriter>,
    ) -> Self {
        Self { router, departments, writer }
    }

    pub async fn list_departments(
        &self,
        ctx: &RequestContext,
        institute: &str,
    ) -> Result<Vec<Department>, DomainError> {
        let partition = self.router.resolve(institute)?;
        ctx.run("departments.list", self.departments.list(&partition)).await
    }

    pub async fn list_sections(
        &self,
        ctx: &RequestContext,
        institute: &str,
        department: &str,
    ) -> Result<Vec<Section>, DomainError> {
        let partition = self.router.resolve(institute)?;
        let department = ctx
            .run("departments.sections", self.departments.find_by_name(&partition, department.trim()))
            .await?;
        Ok(department.sections)
    }

    pub async fn create_department(
        &self,
        ctx: &RequestContext,
        institute: &str,
        draft: DepartmentDraft,
    ) -> Result<Department, DomainError> {
        let partition = self.router.resolve(institute)?;
        ctx.role.require(Role::Admin, "create departments")?;
        let draft = draft.normalized();
        draft.validate()?;

        let department = ctx
            .run("departments.create", self.writer.create_department(&partition, &draft))
            .await?;
        info!(
            request_id = %ctx.request_id,
            tenant = partition.schema(),
            department = %department.name,
            sections = department.sections.len(),
            "department created"
        );
        Ok(department)
    }

    /// Replaces `name` and all of its sections with `draft` in one unit.
    pub async fn update_department(
        &self,
        ctx: &RequestContext,
        institute: &str,
        name: &str,
        draft: DepartmentDraft,
    ) -> Result<Department, DomainError> {
        let partition = self.router.resolve(institute)?;
        ctx.role.require(Role::Admin, "update departments")?;
        let draft = draft.normalized();
        draft.validate()?;
        let name = name.trim();

        let department = ctx
            .run("departments.replace", self.writer.replace_department(&partition, name, &draft))
            .await?;
        info!(
            request_id = %ctx.request_id,
            tenant = partition.schema(),
            from = name,
            to = %department.name,
            "department replaced"
        );
        Ok(department)
    }

    pub async fn delete_department(
        &self,
        ctx: &RequestContext,
        institute: &str,
        name: &str,
    ) -> Result<(), DomainError> {
        let partition = self.router.resolve(institute)?;
        ctx.role.require(Role::Admin, "delete departments")?;
        let name = name.trim();
        ctx.run("departments.delete", self.departments.delete(&partition, name)).await?;
        info!(request_id = %ctx.request_id, tenant = partition.schema(), department = name, "department deleted");
        Ok(())
    }
}
