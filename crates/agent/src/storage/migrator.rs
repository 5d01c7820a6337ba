use sqlx::PgPool;

/// One embedded schema step, applied at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub name: &'static str,
    pub sql: &'static str,
}

const TRACKING: &str = include_str!("../../../../migrations/000_migration_tracking.sql");

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "001_create_baselines.sql",
        sql: include_str!("../../../../migrations/001_create_baselines.sql"),
    },
    Migration {
        name: "002_create_reports.sql",
        sql: include_str!("../../../../migrations/002_create_reports.sql"),
    },
];

/// Migrations not yet recorded in `applied`, in declaration order.
pub fn plan<'a>(applied: &[String]) -> Vec<&'a Migration> {
    MIGRATIONS
        .iter()
        .filter(|m| !applied.iter().any(|name| name == m.name))
        .collect()
}

async fn applied_names(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::raw_sql(TRACKING).execute(pool).await?;
    sqlx::query_scalar("SELECT filename FROM _migrations ORDER BY filename")
        .fetch_all(pool)
        .await
}

/// Applies every pending migration, each in its own transaction.
pub async fn run_migrations(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    let applied = applied_names(pool).await?;
    let mut ran = Vec::new();

    for migration in plan(&applied) {
        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.sql).execute(&mut *tx).await?;
        sqlx::query("INSERT INTO _migrations (filename) VALUES ($1)")
            .bind(migration.name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::info!(migration = migration.name, "schema migration applied");
        ran.push(migration.name.to_string());
    }
    Ok(ran)
}

pub async fn pending_migrations(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    let applied = applied_names(pool).await?;
    Ok(plan(&applied).into_iter().map(|m| m.name.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_in_order() {
        let names: Vec<_> = MIGRATIONS.iter().map(|m| m.name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(MIGRATIONS.iter().all(|m| !m.sql.trim().is_empty()));
        assert!(TRACKING.contains("_migrations"));
    }

    #[test]
    fn plan_skips_applied() {
        assert_eq!(plan(&[]).len(), 2);
        let rest = plan(&["001_create_baselines.sql".to_string()]);
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].name, "002_create_reports.sql");
        let all: Vec<String> = MIGRATIONS.iter().map(|m| m.name.to_string()).collect();
        assert!(plan(&all).is_empty());
    }

    #[test]
    fn tables_match_stores() {
        assert!(MIGRATIONS[0].sql.contains("heartbeat_baselines"));
        assert!(MIGRATIONS[1].sql.contains("heartbeat_reports"));
    }
}
