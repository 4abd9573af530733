//! 持久化层
//!
//! 单个 SQLite 连接挂在异步互斥锁后面；所有多步写入都通过 `with_tx`
//! 在一个事务内完成，失败即整体回滚。查询函数按实体拆分子模块，
//! 以编码/ID 为键做单向查找，不维护对象关系图。

pub mod designs;
pub mod exams;
pub mod masters;
pub mod papers;
pub mod questions;
pub mod schema;
pub mod sequence;
pub mod taxonomy;

use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

use crate::error::AppResult;

/// 数据库句柄（可廉价克隆，内部共享同一连接）
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// 打开（或创建）数据库文件并执行迁移
    pub fn open(path: &str) -> AppResult<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// 打开内存数据库（测试用）
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> AppResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 在连接上执行只读/单步操作
    pub async fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> AppResult<T>,
    ) -> AppResult<T> {
        let conn = self.conn.lock().await;
        f(&conn)
    }

    /// 在一个事务内执行多步操作；闭包返回 Err 时整个事务回滚
    pub async fn with_tx<T>(&self, f: impl FnOnce(&Connection) -> AppResult<T>) -> AppResult<T> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }
}

/// 当前时间戳（审计列用）
pub(crate) fn now_ts() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// JSON 列解码，错误映射回 rusqlite 的列转换失败
pub(crate) fn json_col<T: serde::de::DeserializeOwned>(
    raw: String,
    idx: usize,
) -> rusqlite::Result<T> {
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// 枚举列解码失败时的统一错误
pub(crate) fn bad_enum(idx: usize, what: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("非法的{}取值: {}", what, value),
        )),
    )
}
