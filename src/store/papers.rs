//! 试卷表的查询与写入

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::AppResult;
use crate::models::design::PaperRecord;
use crate::store::{json_col, now_ts};

const COLUMNS: &str =
    "id, paper_code, design_id, q_codes, total_questions, total_time, created_by";

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<PaperRecord> {
    let codes_raw: String = row.get(3)?;
    Ok(PaperRecord {
        id: row.get(0)?,
        paper_code: row.get(1)?,
        design_id: row.get(2)?,
        q_codes: json_col(codes_raw, 3)?,
        total_questions: row.get(4)?,
        total_time: row.get(5)?,
        created_by: row.get(6)?,
    })
}

pub fn insert(conn: &Connection, record: &PaperRecord) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO question_papers (paper_code, design_id, q_codes, \
         total_questions, total_time, created_by, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.paper_code,
            record.design_id,
            serde_json::to_string(&record.q_codes)?,
            record.total_questions,
            record.total_time,
            record.created_by,
            now_ts(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_by_code(conn: &Connection, code: &str) -> AppResult<Option<PaperRecord>> {
    let sql = format!(
        "SELECT {} FROM question_papers WHERE paper_code = ?1",
        COLUMNS
    );
    let row = conn.query_row(&sql, params![code], row_to_record).optional()?;
    Ok(row)
}

pub fn list_by_design(conn: &Connection, design_id: i64) -> AppResult<Vec<PaperRecord>> {
    let sql = format!(
        "SELECT {} FROM question_papers WHERE design_id = ?1 ORDER BY paper_code",
        COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![design_id], row_to_record)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// 移题后刷新试卷的编码序列与计数
pub fn update_codes(
    conn: &Connection,
    id: i64,
    q_codes: &[String],
    total_questions: u32,
) -> AppResult<()> {
    conn.execute(
        "UPDATE question_papers SET q_codes = ?1, total_questions = ?2 WHERE id = ?3",
        params![serde_json::to_string(q_codes)?, total_questions, id],
    )?;
    Ok(())
}

/// 删除一个设计名下的全部试卷（重新定稿/删除设计时）
pub fn delete_by_design(conn: &Connection, design_id: i64) -> AppResult<usize> {
    let deleted = conn.execute(
        "DELETE FROM question_papers WHERE design_id = ?1",
        params![design_id],
    )?;
    Ok(deleted)
}

pub fn delete_by_id(conn: &Connection, id: i64) -> AppResult<()> {
    conn.execute("DELETE FROM question_papers WHERE id = ?1", params![id])?;
    Ok(())
}
