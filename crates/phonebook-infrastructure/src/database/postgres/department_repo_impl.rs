// ============================================================================
// Phonebook Infrastructure - PostgreSQL Department Repository
// File: crates/phonebook-infrastructure/src/database/postgres/department_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use phonebook_core::error::DomainError;
use phonebook_core::repositories::DepartmentRepository;
use phonebook_core::{Department, Partition, Section};

use super::errors::storage_error;

pub struct PgDepartmentRepository {
    pool: PgPool,
}

impl PgDepartmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// One department joined with at most one of its sections.
#[derive(Debug, FromRow)]
struct DepartmentSectionRow {
    id: i64,
    name: String,
    section_id: Option<i64>,
    section_name: Option<String>,
}

/// Folds joined rows (ordered by department) into departments with their
/// sections in insertion order.
fn group_rows(rows: Vec<DepartmentSectionRow>) -> Vec<Department> {
    let mut departments: Vec<Department> = Vec::new();
    for row in rows {
        let needs_new = departments.last().map_or(true, |d| d.id != row.id);
        if needs_new {
            departments.push(Department { id: row.id, name: row.name, sections: Vec::new() });
        }
        if let (Some(section_id), Some(section_name), Some(department)) =
            (row.section_id, row.section_name, departments.last_mut())
        {
            department.sections.push(Section {
                id: section_id,
                name: section_name,
                department_id: department.id,
            });
        }
    }
    departments
}

fn select_joined(partition: &Partition, condition: &str) -> String {
    format!(
        r#"
        SELECT d.id, d.name, s.id AS section_id, s.name AS section_name
        FROM {} d
        LEFT JOIN {} s ON s.department_id = d.id
        {}
        ORDER BY d.name COLLATE "C", d.id, s.id
        "#,
        partition.qualify("departments"),
        partition.qualify("sections"),
        condition
    )
}

#[async_trait]
impl DepartmentRepository for PgDepartmentRepository {
    async fn list(&self, partition: &Partition) -> Result<Vec<Department>, DomainError> {
        let sql = select_joined(partition, "");
        let rows: Vec<DepartmentSectionRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("departments.list", partition.schema(), e))?;

        Ok(group_rows(rows))
    }

    async fn find_by_name(&self, partition: &Partition, name: &str) -> Result<Department, DomainError> {
        let sql = select_joined(partition, "WHERE d.name = $1");
        let rows: Vec<DepartmentSectionRow> = sqlx::query_as(&sql)
            .bind(name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("departments.find_by_name", partition.schema(), e))?;

        group_rows(rows)
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::not_found("department", name))
    }

    async fn delete(&self, partition: &Partition, name: &str) -> Result<(), DomainError> {
        // sections go with it (ON DELETE CASCADE)
        let sql = format!("DELETE FROM {} WHERE name = $1", partition.qualify("departments"));
        let result = sqlx::query(&sql)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("departments.delete", partition.schema(), e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("department", name));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, name: &str, section: Option<(i64, &str)>) -> DepartmentSectionRow {
        DepartmentSectionRow {
            id,
            name: name.into(),
            section_id: section.map(|(sid, _)| sid),
            section_name: section.map(|(_, s)| s.to_string()),
        }
    }

    #[test]
    fn test_group_rows() {
        let grouped = group_rows(vec![
            row(2, "Accounting", None),
            row(1, "Laboratory", Some((10, "Analytics"))),
            row(1, "Laboratory", Some((11, "Metrology"))),
        ]);
        assert_eq!(grouped.len(), 2);
        assert!(grouped[0].sections.is_empty());
        assert_eq!(grouped[1].section_names(), vec!["Analytics", "Metrology"]);
        assert_eq!(grouped[1].sections[0].department_id, 1);
    }
}
