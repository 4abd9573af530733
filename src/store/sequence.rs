//! 题目序号分配器
//!
//! 单行计数器 + 原子自增；每次取号都会与题目表的最大 id 对齐，
//! 容忍旁路插入造成的计数漂移。必须在事务内调用。

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::AppResult;
use crate::store::questions;

/// 取下一个题目 id（严格大于一切已发放值与已落库的题目 id）
pub fn next_question_id(conn: &Connection) -> AppResult<i64> {
    let max_existing = questions::max_id(conn)?;

    // 单行 UPDATE .. RETURNING：SQLite 写锁保证同一时刻只有一个写者
    let updated: Option<i64> = conn
        .query_row(
            "UPDATE question_sequence \
             SET last_question_id = MAX(last_question_id + 1, ?1 + 1) \
             WHERE id = (SELECT id FROM question_sequence ORDER BY id LIMIT 1) \
             RETURNING last_question_id",
            params![max_existing],
            |r| r.get(0),
        )
        .optional()?;

    match updated {
        Some(id) => Ok(id),
        None => {
            // 计数器行还不存在，补一行
            conn.execute(
                "INSERT INTO question_sequence (last_question_id) VALUES (?1 + 1)",
                params![max_existing],
            )?;
            Ok(max_existing + 1)
        }
    }
}
