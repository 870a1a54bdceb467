//! Professional and glosa type catalogs
//!
//! Movements and glosas reference professionals by free-text name, not by
//! id. [`Catalog::professionals_named`] is the single place that resolves a
//! name against the catalog, so moving to enforced references stays local.
//!
//! Both lists are served through a [`TtlCache`]; every write invalidates
//! the cached list.

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tracing::info;

use aih_common::cache::TtlCache;
use aih_common::config::{DEFAULT_GLOSA_TYPES_TTL_SECS, DEFAULT_PROFESSIONALS_TTL_SECS};
use aih_common::db::{GlosaType, Professional};
use aih_common::validation::require_text;
use aih_common::{Error, Result, Specialty};

#[derive(Clone)]
pub struct Catalog {
    db: SqlitePool,
    professionals: TtlCache<(), Arc<Vec<Professional>>>,
    glosa_types: TtlCache<(), Arc<Vec<GlosaType>>>,
}

impl Catalog {
    pub fn new(db: SqlitePool, professionals_ttl: Duration, glosa_types_ttl: Duration) -> Self {
        Catalog {
            db,
            professionals: TtlCache::new(professionals_ttl),
            glosa_types: TtlCache::new(glosa_types_ttl),
        }
    }

    pub fn with_default_ttls(db: SqlitePool) -> Self {
        Self::new(
            db,
            Duration::from_secs(DEFAULT_PROFESSIONALS_TTL_SECS),
            Duration::from_secs(DEFAULT_GLOSA_TYPES_TTL_SECS),
        )
    }

    /// All professionals ordered by name
    pub async fn professionals(&self) -> Result<Arc<Vec<Professional>>> {
        let db = self.db.clone();
        self.professionals
            .get_or_load((), || async move {
                let rows = sqlx::query("SELECT id, name, specialty FROM professionals ORDER BY name, id")
                    .fetch_all(&db)
                    .await?;
                let list = rows
                    .iter()
                    .map(Professional::from_row)
                    .collect::<Result<Vec<_>>>()?;
                Ok::<_, Error>(Arc::new(list))
            })
            .await
    }

    /// Every catalog entry carrying this name (case-insensitive)
    ///
    /// Zero matches and several matches (same name, different specialties)
    /// are both normal.
    pub async fn professionals_named(&self, name: &str) -> Result<Vec<Professional>> {
        let name = name.trim();
        Ok(self
            .professionals()
            .await?
            .iter()
            .filter(|p| p.name.eq_ignore_ascii_case(name))
            .cloned()
            .collect())
    }

    pub async fn add_professional(&self, name: &str, specialty: Specialty) -> Result<Professional> {
        let name = require_text("Professional name", name)?;
        let result = sqlx::query("INSERT INTO professionals (name, specialty) VALUES (?, ?)")
            .bind(&name)
            .bind(specialty.as_str())
            .execute(&self.db)
            .await?;

        self.professionals.invalidate(&()).await;
        info!("Added professional {} ({})", name, specialty);
        Ok(Professional {
            id: result.last_insert_rowid(),
            name,
            specialty,
        })
    }

    pub async fn remove_professional(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM professionals WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Professional {}", id)));
        }

        self.professionals.invalidate(&()).await;
        info!("Removed professional {}", id);
        Ok(())
    }

    /// All glosa types ordered by description
    pub async fn glosa_types(&self) -> Result<Arc<Vec<GlosaType>>> {
        let db = self.db.clone();
        self.glosa_types
            .get_or_load((), || async move {
                let list: Vec<GlosaType> = sqlx::query_as::<_, (i64, String)>(
                    "SELECT id, description FROM glosa_types ORDER BY description",
                )
                .fetch_all(&db)
                .await?
                .into_iter()
                .map(|(id, description)| GlosaType { id, description })
                .collect();
                Ok::<_, Error>(Arc::new(list))
            })
            .await
    }

    pub async fn is_known_glosa_type(&self, description: &str) -> Result<bool> {
        let description = description.trim();
        Ok(self
            .glosa_types()
            .await?
            .iter()
            .any(|t| t.description == description))
    }

    pub async fn add_glosa_type(&self, description: &str) -> Result<GlosaType> {
        let description = require_text("Glosa type", description)?;
        let result = sqlx::query("INSERT INTO glosa_types (description) VALUES (?)")
            .bind(&description)
            .execute(&self.db)
            .await
            .map_err(Error::from)
            .map_err(|e| {
                if e.is_unique_violation() {
                    Error::Validation(format!("Glosa type already exists: {}", description))
                } else {
                    e
                }
            })?;

        self.glosa_types.invalidate(&()).await;
        info!("Added glosa type {}", description);
        Ok(GlosaType {
            id: result.last_insert_rowid(),
            description,
        })
    }

    pub async fn remove_glosa_type(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM glosa_types WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Glosa type {}", id)));
        }

        self.glosa_types.invalidate(&()).await;
        info!("Removed glosa type {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aih_common::db::init_memory_database;

    async fn catalog() -> Catalog {
        Catalog::with_default_ttls(init_memory_database().await.unwrap())
    }

    #[tokio::test]
    async fn test_professionals_sorted_and_cached() {
        let catalog = catalog().await;
        catalog.add_professional("Zeca", Specialty::Nursing).await.unwrap();
        catalog.add_professional("Ana", Specialty::Medicine).await.unwrap();

        let list = catalog.professionals().await.unwrap();
        let names: Vec<_> = list.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Zeca"]);

        // A write that bypasses the catalog is invisible until the TTL runs out
        sqlx::query("INSERT INTO professionals (name, specialty) VALUES ('Bia', 'nursing')")
            .execute(&catalog.db)
            .await
            .unwrap();
        assert_eq!(catalog.professionals().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_writes_invalidate_cache() {
        let catalog = catalog().await;
        assert!(catalog.professionals().await.unwrap().is_empty());

        let added = catalog.add_professional("Ana", Specialty::Medicine).await.unwrap();
        assert_eq!(catalog.professionals().await.unwrap().len(), 1);

        catalog.remove_professional(added.id).await.unwrap();
        assert!(catalog.professionals().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_short_ttl_reloads() {
        let db = init_memory_database().await.unwrap();
        let catalog = Catalog::new(db, Duration::from_millis(50), Duration::from_millis(50));
        assert!(catalog.glosa_types().await.unwrap().is_empty());

        sqlx::query("INSERT INTO glosa_types (description) VALUES ('Missing signature')")
            .execute(&catalog.db)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(catalog.glosa_types().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_professionals_named_tolerates_duplicates() {
        let catalog = catalog().await;
        catalog.add_professional("Ana", Specialty::Medicine).await.unwrap();
        catalog.add_professional("Ana", Specialty::Nursing).await.unwrap();

        let matches = catalog.professionals_named("ana").await.unwrap();
        assert_eq!(matches.len(), 2);
        assert!(catalog.professionals_named("Nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_unknown_is_not_found() {
        let catalog = catalog().await;
        assert!(matches!(
            catalog.remove_professional(42).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            catalog.remove_glosa_type(42).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_glosa_types() {
        let catalog = catalog().await;
        catalog.add_glosa_type("Missing signature").await.unwrap();
        catalog.add_glosa_type("Duplicate charge").await.unwrap();

        let descriptions: Vec<_> = catalog
            .glosa_types()
            .await
            .unwrap()
            .iter()
            .map(|t| t.description.clone())
            .collect();
        assert_eq!(descriptions, vec!["Duplicate charge", "Missing signature"]);

        assert!(catalog.is_known_glosa_type("Duplicate charge").await.unwrap());
        assert!(!catalog.is_known_glosa_type("Other").await.unwrap());

        assert!(matches!(
            catalog.add_glosa_type("Duplicate charge").await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(catalog.add_glosa_type("  ").await, Err(Error::Validation(_))));
    }
}
