//! 数据库迁移
//!
//! 迁移按版本号顺序执行，已应用的版本记录在 `schema_migrations` 表中。
//! 每个迁移与其版本记录在同一事务内提交。

use rusqlite::{params, Connection};

use crate::storage::{StorageError, StorageResult};

/// 单个迁移
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i32,
    pub name: &'static str,
    pub sql: &'static str,
}

/// 全部迁移，按版本号升序
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "键值表",
    sql: "CREATE TABLE IF NOT EXISTS key_value (
              key TEXT PRIMARY KEY NOT NULL,
              value TEXT NOT NULL,
              updated_at TEXT NOT NULL DEFAULT (datetime('now'))
          );",
}];

/// 当前代码期望的 schema 版本
pub fn latest_version() -> i32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// 已应用的迁移
#[derive(Debug, Clone)]
pub struct MigrationRecord {
    pub version: i32,
    pub name: String,
    pub applied_at: i64,
}

fn ensure_migrations_table(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
             version INTEGER PRIMARY KEY,
             name TEXT NOT NULL,
             applied_at INTEGER NOT NULL
         );",
    )
    .map_err(|e| StorageError::Migration(format!("创建迁移表失败: {e}")))
}

/// 运行尚未应用的迁移，返回迁移后的版本号
pub fn run_migrations(conn: &Connection) -> StorageResult<i32> {
    let applied = get_migration_history(conn)?;
    let mut version = applied.iter().map(|r| r.version).max().unwrap_or(0);

    tracing::debug!(current = version, target = latest_version(), "checking schema version");

    for migration in MIGRATIONS {
        if applied.iter().any(|r| r.version == migration.version) {
            continue;
        }

        tracing::info!(version = migration.version, name = migration.name, "running migration");
        apply(conn, migration).map_err(|e| {
            tracing::error!(version = migration.version, error = %e, "migration failed");
            StorageError::Migration(format!("迁移 v{} 执行失败: {e}", migration.version))
        })?;
        version = version.max(migration.version);
    }

    Ok(version)
}

/// 事务在 drop 时自动回滚，只有 commit 成功才算应用
fn apply(conn: &Connection, migration: &Migration) -> rusqlite::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
        params![migration.version, migration.name, chrono::Utc::now().timestamp()],
    )?;
    tx.commit()
}

/// 获取迁移历史
pub fn get_migration_history(conn: &Connection) -> StorageResult<Vec<MigrationRecord>> {
    ensure_migrations_table(conn)?;

    let mut stmt = conn.prepare("SELECT version, name, applied_at FROM schema_migrations ORDER BY version")?;
    let records = stmt
        .query_map([], |row| {
            Ok(MigrationRecord {
                version: row.get(0)?,
                name: row.get(1)?,
                applied_at: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_ascending() {
        assert!(MIGRATIONS.windows(2).all(|w| w[0].version < w[1].version));
        assert_eq!(latest_version(), 1);
    }

    #[test]
    fn test_fresh_database_migrates() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(get_migration_history(&conn).unwrap().is_empty());

        assert_eq!(run_migrations(&conn).unwrap(), latest_version());

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'key_value'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_rerun_is_noop() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(run_migrations(&conn).unwrap(), latest_version());

        let history = get_migration_history(&conn).unwrap();
        assert_eq!(history.len(), MIGRATIONS.len());
        assert_eq!(history[0].name, "键值表");
        assert!(history[0].applied_at > 0);
    }

    #[test]
    fn test_failed_migration_rolls_back() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_migrations_table(&conn).unwrap();

        let broken = Migration {
            version: 99,
            name: "broken",
            sql: "CREATE TABLE t (a INTEGER); NOT VALID SQL;",
        };
        assert!(apply(&conn, &broken).is_err());

        assert!(get_migration_history(&conn).unwrap().is_empty());
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM sqlite_master WHERE name = 't'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
