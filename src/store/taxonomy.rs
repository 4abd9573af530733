//! 知识分类节点的查找与创建

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::AppResult;
use crate::models::taxonomy::TaxonomyRecord;

const COLUMNS: &str = "id, taxonomy_code, subject_id, medium_id, standard, \
     chapter_code, chapter_name, topic_code, topic_name, \
     subtopic_code, subtopic_name, board_id, state_id";

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<TaxonomyRecord> {
    Ok(TaxonomyRecord {
        id: row.get(0)?,
        taxonomy_code: row.get(1)?,
        subject_id: row.get(2)?,
        medium_id: row.get(3)?,
        standard: row.get(4)?,
        chapter_code: row.get(5)?,
        chapter_name: row.get(6)?,
        topic_code: row.get(7)?,
        topic_name: row.get(8)?,
        subtopic_code: row.get(9)?,
        subtopic_name: row.get(10)?,
        board_id: row.get(11)?,
        state_id: row.get(12)?,
    })
}

/// 按复合编码查找节点
pub fn find_by_code(conn: &Connection, taxonomy_code: &str) -> AppResult<Option<TaxonomyRecord>> {
    let sql = format!(
        "SELECT {} FROM taxonomy WHERE taxonomy_code = ?1",
        COLUMNS
    );
    let row = conn
        .query_row(&sql, params![taxonomy_code], row_to_record)
        .optional()?;
    Ok(row)
}

/// 插入新节点，返回 id
pub fn insert(conn: &Connection, record: &TaxonomyRecord) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO taxonomy (taxonomy_code, subject_id, medium_id, standard, \
         chapter_code, chapter_name, topic_code, topic_name, \
         subtopic_code, subtopic_name, board_id, state_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            record.taxonomy_code,
            record.subject_id,
            record.medium_id,
            record.standard,
            record.chapter_code,
            record.chapter_name,
            record.topic_code,
            record.topic_name,
            record.subtopic_code,
            record.subtopic_name,
            record.board_id,
            record.state_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

// ========== 按归一化名称反查编码（编码复用） ==========

pub fn chapter_code_by_name(conn: &Connection, normalized: &str) -> AppResult<Option<String>> {
    let code = conn
        .query_row(
            "SELECT DISTINCT chapter_code FROM taxonomy \
             WHERE lower(trim(chapter_name)) = ?1 LIMIT 1",
            params![normalized],
            |r| r.get(0),
        )
        .optional()?;
    Ok(code)
}

pub fn topic_code_by_name(
    conn: &Connection,
    chapter_code: &str,
    normalized: &str,
) -> AppResult<Option<String>> {
    let code = conn
        .query_row(
            "SELECT DISTINCT topic_code FROM taxonomy \
             WHERE chapter_code = ?1 AND lower(trim(topic_name)) = ?2 LIMIT 1",
            params![chapter_code, normalized],
            |r| r.get(0),
        )
        .optional()?;
    Ok(code)
}

pub fn subtopic_code_by_name(
    conn: &Connection,
    topic_code: &str,
    normalized: &str,
) -> AppResult<Option<String>> {
    let code = conn
        .query_row(
            "SELECT DISTINCT subtopic_code FROM taxonomy \
             WHERE topic_code = ?1 AND lower(trim(subtopic_name)) = ?2 LIMIT 1",
            params![topic_code, normalized],
            |r| r.get(0),
        )
        .optional()?;
    Ok(code)
}

// ========== 已占用编码全集（用于会话内计算下一个序号） ==========

pub fn distinct_chapter_codes(conn: &Connection) -> AppResult<Vec<String>> {
    collect_codes(conn, "SELECT DISTINCT chapter_code FROM taxonomy WHERE chapter_code != ''")
}

pub fn distinct_topic_codes(conn: &Connection) -> AppResult<Vec<String>> {
    collect_codes(conn, "SELECT DISTINCT topic_code FROM taxonomy WHERE topic_code != ''")
}

pub fn distinct_subtopic_codes(conn: &Connection) -> AppResult<Vec<String>> {
    collect_codes(conn, "SELECT DISTINCT subtopic_code FROM taxonomy WHERE subtopic_code != ''")
}

fn collect_codes(conn: &Connection, sql: &str) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
    let mut codes = Vec::new();
    for row in rows {
        codes.push(row?);
    }
    Ok(codes)
}

// ========== 按编码反查名称（响应拼装） ==========

pub fn chapter_name_by_code(conn: &Connection, chapter_code: &str) -> AppResult<Option<String>> {
    let name = conn
        .query_row(
            "SELECT DISTINCT chapter_name FROM taxonomy WHERE chapter_code = ?1 LIMIT 1",
            params![chapter_code],
            |r| r.get(0),
        )
        .optional()?;
    Ok(name)
}

/// 返回 (知识点名称, 章节编码, 章节名称)
pub fn topic_details_by_code(
    conn: &Connection,
    topic_code: &str,
) -> AppResult<Option<(String, String, String)>> {
    let row = conn
        .query_row(
            "SELECT DISTINCT topic_name, chapter_code, chapter_name \
             FROM taxonomy WHERE topic_code = ?1 LIMIT 1",
            params![topic_code],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?;
    Ok(row)
}

pub fn subtopic_name_by_code(conn: &Connection, subtopic_code: &str) -> AppResult<Option<String>> {
    let name = conn
        .query_row(
            "SELECT DISTINCT subtopic_name FROM taxonomy WHERE subtopic_code = ?1 LIMIT 1",
            params![subtopic_code],
            |r| r.get(0),
        )
        .optional()?;
    Ok(name)
}
