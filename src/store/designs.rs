//! 设计表的查询与写入

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::AppResult;
use crate::models::context::Scope;
use crate::models::design::{DesignRecord, DesignStatus};
use crate::store::{bad_enum, json_col, now_ts};

const COLUMNS: &str = "id, design_code, design_name, exam_id, subject_id, medium_id, \
     board_id, state_id, standard, exam_mode, total_time, total_questions, \
     no_of_sets, no_of_versions, status, chapter_topics, questions_to_exclude, \
     total_question_codes, created_by, is_active";

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<DesignRecord> {
    let status_raw: String = row.get(14)?;
    let status = DesignStatus::from_str(&status_raw)
        .ok_or_else(|| bad_enum(14, "设计状态", &status_raw))?;
    let chapter_topics_raw: String = row.get(15)?;
    let exclude_raw: String = row.get(16)?;
    let codes_raw: String = row.get(17)?;
    Ok(DesignRecord {
        id: row.get(0)?,
        design_code: row.get(1)?,
        design_name: row.get(2)?,
        exam_id: row.get(3)?,
        subject_id: row.get(4)?,
        medium_id: row.get(5)?,
        board_id: row.get(6)?,
        state_id: row.get(7)?,
        standard: row.get(8)?,
        exam_mode: row.get(9)?,
        total_time: row.get(10)?,
        total_questions: row.get(11)?,
        no_of_sets: row.get(12)?,
        no_of_versions: row.get(13)?,
        status,
        chapter_topics: json_col(chapter_topics_raw, 15)?,
        questions_to_exclude: json_col(exclude_raw, 16)?,
        total_question_codes: json_col(codes_raw, 17)?,
        created_by: row.get(18)?,
        is_active: row.get(19)?,
    })
}

/// 插入设计记录，返回 id
pub fn insert(conn: &Connection, record: &DesignRecord) -> AppResult<i64> {
    let ts = now_ts();
    conn.execute(
        "INSERT INTO designs (design_code, design_name, exam_id, subject_id, medium_id, \
         board_id, state_id, standard, exam_mode, total_time, total_questions, \
         no_of_sets, no_of_versions, status, chapter_topics, questions_to_exclude, \
         total_question_codes, created_by, created_at, updated_at, is_active) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
        params![
            record.design_code,
            record.design_name,
            record.exam_id,
            record.subject_id,
            record.medium_id,
            record.board_id,
            record.state_id,
            record.standard,
            record.exam_mode,
            record.total_time,
            record.total_questions,
            record.no_of_sets,
            record.no_of_versions,
            record.status.as_str(),
            serde_json::to_string(&record.chapter_topics)?,
            serde_json::to_string(&record.questions_to_exclude)?,
            serde_json::to_string(&record.total_question_codes)?,
            record.created_by,
            ts,
            ts,
            record.is_active,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// 按 id 全量更新可变字段
pub fn update(conn: &Connection, record: &DesignRecord) -> AppResult<()> {
    conn.execute(
        "UPDATE designs SET design_name = ?1, subject_id = ?2, medium_id = ?3, \
         board_id = ?4, state_id = ?5, standard = ?6, exam_mode = ?7, \
         total_time = ?8, total_questions = ?9, no_of_sets = ?10, no_of_versions = ?11, \
         status = ?12, chapter_topics = ?13, questions_to_exclude = ?14, \
         total_question_codes = ?15, updated_at = ?16 \
         WHERE id = ?17",
        params![
            record.design_name,
            record.subject_id,
            record.medium_id,
            record.board_id,
            record.state_id,
            record.standard,
            record.exam_mode,
            record.total_time,
            record.total_questions,
            record.no_of_sets,
            record.no_of_versions,
            record.status.as_str(),
            serde_json::to_string(&record.chapter_topics)?,
            serde_json::to_string(&record.questions_to_exclude)?,
            serde_json::to_string(&record.total_question_codes)?,
            now_ts(),
            record.id,
        ],
    )?;
    Ok(())
}

/// 只更新题目编码全集与计数（移题路径）
pub fn update_total_codes(
    conn: &Connection,
    id: i64,
    codes: &[String],
    total_questions: u32,
) -> AppResult<()> {
    conn.execute(
        "UPDATE designs SET total_question_codes = ?1, total_questions = ?2, updated_at = ?3 \
         WHERE id = ?4",
        params![serde_json::to_string(codes)?, total_questions, now_ts(), id],
    )?;
    Ok(())
}

/// 按编码查找活跃设计，套用调用方的可见范围过滤
pub fn find_by_code_scoped(
    conn: &Connection,
    code: &str,
    scope: Scope,
) -> AppResult<Option<DesignRecord>> {
    let mut sql = format!(
        "SELECT {} FROM designs WHERE design_code = ?1 AND is_active = 1",
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

pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Option<DesignRecord>> {
    let sql = format!("SELECT {} FROM designs WHERE id = ?1", COLUMNS);
    let row = conn.query_row(&sql, params![id], row_to_record).optional()?;
    Ok(row)
}

/// 设计名是否已被占用（exam_id 给定时只查该考试内部）
pub fn name_exists(
    conn: &Connection,
    name: &str,
    exam_id: Option<i64>,
    exclude_design_id: Option<i64>,
) -> AppResult<bool> {
    let mut sql = String::from(
        "SELECT id FROM designs WHERE design_name = ?1 AND is_active = 1",
    );
    let mut values: Vec<rusqlite::types::Value> =
        vec![rusqlite::types::Value::Text(name.to_string())];
    if let Some(exam_id) = exam_id {
        sql.push_str(" AND exam_id = ?");
        values.push(rusqlite::types::Value::Integer(exam_id));
    }
    if let Some(id) = exclude_design_id {
        sql.push_str(" AND id != ?");
        values.push(rusqlite::types::Value::Integer(id));
    }
    sql.push_str(" LIMIT 1");

    let mut stmt = conn.prepare(&sql)?;
    let found: Option<i64> = stmt
        .query_row(rusqlite::params_from_iter(values), |r| r.get(0))
        .optional()?;
    Ok(found.is_some())
}

/// 当前最大的设计编码（EXM 前缀，字典序即数值序）
pub fn last_code(conn: &Connection) -> AppResult<Option<String>> {
    let code = conn
        .query_row(
            "SELECT design_code FROM designs WHERE design_code LIKE 'EXM%' \
             ORDER BY design_code DESC LIMIT 1",
            [],
            |r| r.get(0),
        )
        .optional()?;
    Ok(code)
}

pub fn code_exists(conn: &Connection, code: &str) -> AppResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM designs WHERE design_code = ?1",
            params![code],
            |r| r.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn delete_by_id(conn: &Connection, id: i64) -> AppResult<()> {
    conn.execute("DELETE FROM designs WHERE id = ?1", params![id])?;
    Ok(())
}

pub fn list_by_exam(conn: &Connection, exam_id: i64) -> AppResult<Vec<DesignRecord>> {
    let sql = format!(
        "SELECT {} FROM designs WHERE exam_id = ?1 AND is_active = 1 ORDER BY id",
        COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![exam_id], row_to_record)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// 父级考试开始时，把所有子设计强制定稿
pub fn close_all_for_exam(conn: &Connection, exam_id: i64) -> AppResult<usize> {
    let changed = conn.execute(
        "UPDATE designs SET status = 'closed', updated_at = ?1 \
         WHERE exam_id = ?2 AND is_active = 1",
        params![now_ts(), exam_id],
    )?;
    Ok(changed)
}
