//! 考试容器表的查询与写入

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::AppResult;
use crate::models::context::Scope;
use crate::models::exam::{ExamRecord, ExamStatus};
use crate::store::{bad_enum, now_ts};

const COLUMNS: &str = "id, exam_code, exam_name, total_time, exam_mode, status, created_by, is_active";

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<ExamRecord> {
    let status_raw: String = row.get(5)?;
    let status = ExamStatus::from_str(&status_raw)
        .ok_or_else(|| bad_enum(5, "考试状态", &status_raw))?;
    Ok(ExamRecord {
        id: row.get(0)?,
        exam_code: row.get(1)?,
        exam_name: row.get(2)?,
        total_time: row.get(3)?,
        exam_mode: row.get(4)?,
        status,
        created_by: row.get(6)?,
        is_active: row.get(7)?,
    })
}

pub fn insert(conn: &Connection, record: &ExamRecord) -> AppResult<i64> {
    let ts = now_ts();
    conn.execute(
        "INSERT INTO exams (exam_code, exam_name, total_time, exam_mode, status, \
         created_by, created_at, updated_at, is_active) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            record.exam_code,
            record.exam_name,
            record.total_time,
            record.exam_mode,
            record.status.as_str(),
            record.created_by,
            ts,
            ts,
            record.is_active,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(conn: &Connection, record: &ExamRecord) -> AppResult<()> {
    conn.execute(
        "UPDATE exams SET exam_name = ?1, total_time = ?2, exam_mode = ?3, \
         status = ?4, updated_at = ?5 WHERE id = ?6",
        params![
            record.exam_name,
            record.total_time,
            record.exam_mode,
            record.status.as_str(),
            now_ts(),
            record.id,
        ],
    )?;
    Ok(())
}

/// 按编码查找活跃考试，套用调用方的可见范围过滤
pub fn find_by_code_scoped(
    conn: &Connection,
    code: &str,
    scope: Scope,
) -> AppResult<Option<ExamRecord>> {
    let mut sql = format!(
        "SELECT {} FROM exams WHERE exam_code = ?1 AND is_active = 1",
        COLUMNS
    );
    let row = match scope {
        Scope::All => conn.query_row(&sql, params![code], row_to_record).optional()?,
        Scope::OwnedBy(user_id) => {
            sql.push_str(" AND created_by = ?2");
            conn.query_row(&sql, params![code, user_id], row_to_record)
                .optional()?
        }
    };
    Ok(row)
}

pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Option<ExamRecord>> {
    let sql = format!("SELECT {} FROM exams WHERE id = ?1", COLUMNS);
    let row = conn.query_row(&sql, params![id], row_to_record).optional()?;
    Ok(row)
}

/// 当前最大的考试编码（EXAM 前缀）
pub fn last_code(conn: &Connection) -> AppResult<Option<String>> {
    let code = conn
        .query_row(
            "SELECT exam_code FROM exams WHERE exam_code LIKE 'EXAM%' \
             ORDER BY exam_code DESC LIMIT 1",
            [],
            |r| r.get(0),
        )
        .optional()?;
    Ok(code)
}

pub fn code_exists(conn: &Connection, code: &str) -> AppResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM exams WHERE exam_code = ?1",
            params![code],
            |r| r.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn delete_by_id(conn: &Connection, id: i64) -> AppResult<()> {
    conn.execute("DELETE FROM exams WHERE id = ?1", params![id])?;
    Ok(())
}
