// ============================================================================
// Phonebook Core - Tenant Router
// File: crates/phonebook-core/src/tenancy.rs
// Description: Institute name -> isolated storage partition
// ============================================================================
//! Maps human-supplied institute names to partitions.
//!
//! Partitions are only ever built from the configured allow-list, so the
//! schema name embedded in statements is never caller-supplied text.

use std::collections::HashMap;

use phonebook_shared::config::TenantSettings;
use regex::Regex;
use tracing::debug;

use crate::error::DomainError;

/// Opaque handle to one tenant's storage namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition {
    schema: String,
}

impl Partition {
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Schema-qualified, quoted identifier for a table in this partition,
    /// e.g. `"grafit"."workers"`.
    pub fn qualify(&self, table: &str) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(table))
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub struct TenantRouter {
    routes: HashMap<String, Partition>,
}

impl TenantRouter {
    pub fn new(tenants: &[TenantSettings]) -> Result<Self, DomainError> {
        let schema_pattern = Regex::new(r"^[a-z_][a-z0-9_]{0,62}$")
            .map_err(|e| DomainError::ValidationError(e.to_string()))?;

        let mut routes = HashMap::new();
        for tenant in tenants {
            if !schema_pattern.is_match(&tenant.schema) {
                return Err(DomainError::ValidationError(format!(
                    "invalid tenant schema name: {}",
                    tenant.schema
                )));
            }
            let partition = Partition { schema: tenant.schema.clone() };

            let names = std::iter::once(&tenant.schema).chain(tenant.aliases.iter());
            for name in names {
                let key = normalize(name);
                if key.is_empty() {
                    continue;
                }
                if let Some(existing) = routes.get(&key) {
                    if existing != &partition {
                        return Err(DomainError::ValidationError(format!(
                            "tenant alias {} maps to both {} and {}",
                            name,
                            Partition::schema(existing),
                            tenant.schema
                        )));
                    }
                }
                routes.insert(key, partition.clone());
            }
        }

        Ok(Self { routes })
    }

    /// Resolves an institute name, failing closed on anything unknown.
    pub fn resolve(&self, institute: &str) -> Result<Partition, DomainError> {
        match self.routes.get(&normalize(institute)) {
            Some(partition) => {
                debug!(institute, schema = partition.schema(), "tenant resolved");
                Ok(partition.clone())
            }
            None => Err(DomainError::UnknownTenant(institute.to_string())),
        }
    }

    /// Every distinct partition, sorted by schema name.
    pub fn partitions(&self) -> Vec<Partition> {
        let mut all: Vec<Partition> = self.routes.values().cloned().collect();
        all.sort_by(|a, b| a.schema.cmp(&b.schema));
        all.dedup();
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phonebook_shared::config::default_tenants;

    fn router() -> TenantRouter {
        TenantRouter::new(&default_tenants()).unwrap()
    }

    #[test]
    fn test_case_and_script_variants_share_partition() {
        let router = router();
        let expected = router.resolve("grafit").unwrap();
        for name in ["Grafit", "GRAFIT", "графит", "Графит", "  ГРАФИТ "] {
            assert_eq!(router.resolve(name).unwrap(), expected, "{}", name);
        }
        assert_eq!(expected.schema(), "grafit");
        assert_eq!(router.resolve("Гиредмет").unwrap().schema(), "giredmet");
    }

    #[test]
    fn test_unknown_tenant_fails_closed() {
        let router = router();
        for name in ["", "public", "grafit; DROP TABLE workers", "grafit2"] {
            assert!(matches!(router.resolve(name), Err(DomainError::UnknownTenant(_))));
        }
    }

    #[test]
    fn test_qualify_quotes_identifiers() {
        let partition = router().resolve("giredmet").unwrap();
        assert_eq!(partition.qualify("workers"), "\"giredmet\".\"workers\"");
    }

    #[test]
    fn test_invalid_schema_rejected() {
        let tenants = vec![TenantSettings { schema: "Bad-Schema".into(), aliases: vec![] }];
        assert!(TenantRouter::new(&tenants).is_err());
    }

    #[test]
    fn test_conflicting_alias_rejected() {
        let tenants = vec![
            TenantSettings { schema: "alpha".into(), aliases: vec!["shared".into()] },
            TenantSettings { schema: "beta".into(), aliases: vec!["Shared".into()] },
        ];
        assert!(TenantRouter::new(&tenants).is_err());
    }

    #[test]
    fn test_partitions_listed_once() {
        let schemas: Vec<String> = router()
            .partitions()
            .iter()
            .map(|p| p.schema().to_string())
            .collect();
        assert_eq!(schemas, vec!["giredmet", "grafit"]);
    }
}
