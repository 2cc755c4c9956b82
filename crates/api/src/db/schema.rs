//! DDL for the `users` table.

use core::fmt;

use sqlx::PgPool;
use tracing::instrument;

/// Name of the only table.
pub const USERS_TABLE: &str = "users";

/// Advisory lock key held while creating the table ("USERFORM" in ASCII).
///
/// `CREATE TABLE IF NOT EXISTS` alone can fail with a duplicate `pg_type`
/// entry when two sessions race on a fresh database; serializing on this lock
/// makes the losing session observe the existing table instead.
pub const SCHEMA_LOCK_KEY: i64 = 0x5553_4552_464F_524D;

/// Idempotent table definition.
pub const CREATE_USERS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        mobile VARCHAR(10) NOT NULL,
        email VARCHAR(255) NOT NULL UNIQUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
";

/// Columns the table is expected to have, in declaration order, with their
/// `information_schema.columns.data_type`.
pub const EXPECTED_COLUMNS: [(&str, &str); 5] = [
    ("id", "integer"),
    ("name", "character varying"),
    ("mobile", "character varying"),
    ("email", "character varying"),
    ("created_at", "timestamp with time zone"),
];

/// `created_at` type in tables made by earlier releases, which used a bare
/// `TIMESTAMP DEFAULT CURRENT_TIMESTAMP` column.
pub const LEGACY_CREATED_AT_TYPE: &str = "timestamp without time zone";

/// Convert a legacy `created_at` in place. Stored values are read as UTC and
/// null timestamps are backfilled before the column becomes `NOT NULL`.
const UPGRADE_CREATED_AT: &str = r"
    ALTER TABLE users
        ALTER COLUMN created_at DROP DEFAULT,
        ALTER COLUMN created_at TYPE TIMESTAMPTZ
            USING COALESCE(created_at AT TIME ZONE 'UTC', CURRENT_TIMESTAMP),
        ALTER COLUMN created_at SET DEFAULT CURRENT_TIMESTAMP,
        ALTER COLUMN created_at SET NOT NULL
";

/// A column of the `users` table as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TableColumn {
    pub name: String,
    pub data_type: String,
}

impl TableColumn {
    /// Whether this column has the given name and type.
    #[must_use]
    pub fn is(&self, name: &str, data_type: &str) -> bool {
        self.name == name && self.data_type == data_type
    }
}

impl fmt::Display for TableColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)
    }
}

/// Create the `users` table if it does not already exist, and upgrade a
/// legacy `created_at TIMESTAMP` column to `TIMESTAMPTZ`.
///
/// Both steps run under the advisory lock, so concurrent callers see either
/// no table or the finished one.
///
/// # Errors
///
/// Returns `sqlx::Error` if the lock, the DDL, or the commit fails.
#[instrument(skip(pool))]
pub async fn create_users_table(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    sqlx::query(CREATE_USERS_TABLE).execute(&mut *tx).await?;

    let created_at_type: Option<String> = sqlx::query_scalar(
        r"
        SELECT data_type::text
        FROM information_schema.columns
        WHERE table_schema = current_schema() AND table_name = $1 AND column_name = 'created_at'
        ",
    )
    .bind(USERS_TABLE)
    .fetch_optional(&mut *tx)
    .await?;

    if created_at_type.as_deref() == Some(LEGACY_CREATED_AT_TYPE) {
        tracing::warn!(table = USERS_TABLE, "Upgrading created_at to TIMESTAMPTZ");
        sqlx::query(UPGRADE_CREATED_AT).execute(&mut *tx).await?;
    }

    tx.commit().await?;

    tracing::info!(table = USERS_TABLE, "Database table initialized");
    Ok(())
}

/// Columns of the `users` table in the current schema, in ordinal order.
///
/// Empty if the table does not exist.
///
/// # Errors
///
/// Returns `sqlx::Error` if the catalog query fails.
pub async fn users_table_columns(pool: &PgPool) -> Result<Vec<TableColumn>, sqlx::Error> {
    sqlx::query_as(
        r"
        SELECT column_name::text AS name, data_type::text AS data_type
        FROM information_schema.columns
        WHERE table_schema = current_schema() AND table_name = $1
        ORDER BY ordinal_position
        ",
    )
    .bind(USERS_TABLE)
    .fetch_all(pool)
    .await
}

/// Whether `columns` is exactly [`EXPECTED_COLUMNS`], in any order.
#[must_use]
pub fn columns_match(columns: &[TableColumn]) -> bool {
    columns.len() == EXPECTED_COLUMNS.len()
        && EXPECTED_COLUMNS.iter().all(|(name, data_type)| {
            columns.iter().any(|column| column.is(name, data_type))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(pairs: &[(&str, &str)]) -> Vec<TableColumn> {
        pairs
            .iter()
            .map(|(name, data_type)| TableColumn {
                name: (*name).to_string(),
                data_type: (*data_type).to_string(),
            })
            .collect()
    }

    #[test]
    fn test_columns_match_ignores_order() {
        let mut reversed = EXPECTED_COLUMNS;
        reversed.reverse();
        assert!(columns_match(&columns(&reversed)));
    }

    #[test]
    fn test_columns_match_rejects_extra_or_missing() {
        assert!(!columns_match(&columns(&EXPECTED_COLUMNS[..4])));

        let mut extra = EXPECTED_COLUMNS.to_vec();
        extra.push(("age", "integer"));
        assert!(!columns_match(&columns(&extra)));
    }

    #[test]
    fn test_columns_match_rejects_legacy_timestamp() {
        let mut legacy = EXPECTED_COLUMNS;
        legacy[4] = ("created_at", LEGACY_CREATED_AT_TYPE);
        assert!(!columns_match(&columns(&legacy)));
    }

    #[test]
    fn test_column_display() {
        let column = &columns(&EXPECTED_COLUMNS[4..])[0];
        assert_eq!(column.to_string(), "created_at timestamp with time zone");
    }
}
