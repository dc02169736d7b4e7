//! 音乐商店 SQLite 数据库
//!
//! 一个连接承载三类数据：音乐目录与客户/发票（业务只读）、画像 KV 表、检查点表。
//! 所有查询使用参数绑定，不把外部输入拼进 SQL。

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, OptionalExtension, Params};
use serde_json::{Map, Value};

use crate::core::StoreError;

const SCHEMA_SQL: &str = include_str!("schema.sql");
const SEED_SQL: &str = include_str!("seed.sql");

/// 查询结果的一行：列名 -> JSON 值
pub type Row = Map<String, Value>;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// 打开（或创建）数据库文件；path 为 None 时使用内存库
    pub fn open(path: Option<&Path>, seed_demo_data: bool) -> Result<Self, StoreError> {
        let conn = match path {
            Some(p) => {
                if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        StoreError::Unavailable(format!("create {}: {}", parent.display(), e))
                    })?;
                }
                Connection::open(p)?
            }
            None => Connection::open_in_memory()?,
        };
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA_SQL)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        if seed_demo_data && db.is_catalog_empty()? {
            db.lock()?.execute_batch(SEED_SQL)?;
            tracing::info!("Seeded demo music store data");
        }
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::open(None, true)
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn is_catalog_empty(&self) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM Customer", [], |r| r.get(0))?;
        Ok(count == 0)
    }

    /// 执行只读查询，按列名转为 JSON 行
    pub fn query_rows<P: Params>(&self, sql: &str, params: P) -> Result<Vec<Row>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let rows = stmt.query_map(params, |row| {
            let mut out = Map::new();
            for (i, name) in columns.iter().enumerate() {
                let value = match row.get_ref(i)? {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(n) => Value::from(n),
                    ValueRef::Real(f) => Value::from(f),
                    ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
                    ValueRef::Blob(b) => Value::String(format!("<{} bytes>", b.len())),
                };
                out.insert(name.clone(), value);
            }
            Ok(out)
        })?;
        let out = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(out)
    }

    /// 在阻塞线程池上执行 query_rows，调用方 await 期间不占用运行时线程，
    /// 外层 tokio 超时可以如期返回（已开始的查询仍会在后台跑完）
    pub async fn query_rows_blocking(
        self: &Arc<Self>,
        sql: &'static str,
        params: Vec<SqlValue>,
    ) -> Result<Vec<Row>, StoreError> {
        let db = Arc::clone(self);
        tokio::task::spawn_blocking(move || db.query_rows(sql, params_from_iter(params)))
            .await
            .map_err(|e| StoreError::Unavailable(format!("query task: {e}")))?
    }

    /// 单列整数查询（客户查找用），无行时返回 None
    pub fn query_id<P: Params>(&self, sql: &str, params: P) -> Result<Option<i64>, StoreError> {
        let conn = self.lock()?;
        Ok(conn.query_row(sql, params, |r| r.get(0)).optional()?)
    }

    // ---- KV（画像存储） ----

    pub fn kv_get(&self, namespace: &str, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.lock()?;
        Ok(conn
            .query_row(
                "SELECT value FROM kv_store WHERE namespace = ?1 AND key = ?2",
                rusqlite::params![namespace, key],
                |r| r.get(0),
            )
            .optional()?)
    }

    pub fn kv_put(&self, namespace: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv_store (namespace, key, value, updated_at)
             VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(namespace, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            rusqlite::params![namespace, key, value],
        )?;
        Ok(())
    }

    // ---- 检查点 ----

    pub fn checkpoint_get(&self, thread_id: &str) -> Result<Option<String>, StoreError> {
        let conn = self.lock()?;
        Ok(conn
            .query_row(
                "SELECT checkpoint FROM checkpoints WHERE thread_id = ?1",
                rusqlite::params![thread_id],
                |r| r.get(0),
            )
            .optional()?)
    }

    pub fn checkpoint_put(&self, thread_id: &str, checkpoint: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO checkpoints (thread_id, checkpoint, updated_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(thread_id) DO UPDATE SET
                checkpoint = excluded.checkpoint,
                updated_at = excluded.updated_at",
            rusqlite::params![thread_id, checkpoint],
        )?;
        Ok(())
    }

    pub fn checkpoint_delete(&self, thread_id: &str) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let n = conn.execute(
            "DELETE FROM checkpoints WHERE thread_id = ?1",
            rusqlite::params![thread_id],
        )?;
        Ok(n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_catalog_is_queryable() {
        let db = Database::open_in_memory().unwrap();
        let rows = db
            .query_rows(
                "SELECT Title FROM Album WHERE ArtistId = ?1 ORDER BY AlbumId",
                rusqlite::params![1],
            )
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Title"], "For Those About To Rock We Salute You");
    }

    #[tokio::test]
    async fn test_blocking_query_does_not_stall_timeouts() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let rows = db
            .query_rows_blocking("SELECT Name FROM Artist WHERE ArtistId = ?1", vec![1i64.into()])
            .await
            .unwrap();
        assert_eq!(rows[0]["Name"], "AC/DC");

        // 另一线程长时间持有连接，模拟慢查询
        let (locked_tx, locked_rx) = std::sync::mpsc::channel();
        let holder = Arc::clone(&db);
        let busy = std::thread::spawn(move || {
            let _conn = holder.lock().unwrap();
            locked_tx.send(()).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(1500));
        });
        locked_rx.recv().unwrap();

        let started = std::time::Instant::now();
        let result = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            db.query_rows_blocking("SELECT COUNT(*) AS n FROM Track", Vec::new()),
        )
        .await;
        assert!(result.is_err());
        assert!(started.elapsed() < std::time::Duration::from_millis(1000));
        busy.join().unwrap();
    }

    #[test]
    fn test_kv_put_overwrites() {
        let db = Database::open(None, false).unwrap();
        assert_eq!(db.kv_get("ns", "k").unwrap(), None);
        db.kv_put("ns", "k", "v1").unwrap();
        db.kv_put("ns", "k", "v2").unwrap();
        assert_eq!(db.kv_get("ns", "k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn test_file_database_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.db");
        {
            let db = Database::open(Some(&path), true).unwrap();
            db.checkpoint_put("thread-1", "{}").unwrap();
        }
        let db = Database::open(Some(&path), true).unwrap();
        assert_eq!(db.checkpoint_get("thread-1").unwrap().as_deref(), Some("{}"));
        // 再次打开不会重复写入演示数据
        let customers = db.query_rows("SELECT CustomerId FROM Customer", []).unwrap();
        assert_eq!(customers.len(), 7);
        assert!(db.checkpoint_delete("thread-1").unwrap());
    }
}
