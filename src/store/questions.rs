//! 题库表的查询与写入

use std::collections::HashMap;

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::error::AppResult;
use crate::models::design::GroupKind;
use crate::models::question::{QuestionRecord, QuestionStatus};
use crate::store::{bad_enum, json_col, now_ts};

/// 选题过滤上下文：科目/授课语言必填，考试局/邦州可选
#[derive(Debug, Clone)]
pub struct QuestionFilter {
    pub subject_code: String,
    pub medium_code: String,
    pub board_id: Option<i64>,
    pub state_id: Option<i64>,
}

const COLUMNS: &str = "id, question_code, question_text, option1, option2, option3, option4, \
     correct_answer, taxonomy_id, taxonomy_code, is_active, status, \
     subject_id, medium_id, board_id, state_id, media_urls";

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<QuestionRecord> {
    let status_raw: String = row.get(11)?;
    let status = QuestionStatus::from_str(&status_raw)
        .ok_or_else(|| bad_enum(11, "题目状态", &status_raw))?;
    let media_raw: String = row.get(16)?;
    Ok(QuestionRecord {
        id: row.get(0)?,
        question_code: row.get(1)?,
        question_text: row.get(2)?,
        option1: row.get(3)?,
        option2: row.get(4)?,
        option3: row.get(5)?,
        option4: row.get(6)?,
        correct_answer: row.get(7)?,
        taxonomy_id: row.get(8)?,
        taxonomy_code: row.get(9)?,
        is_active: row.get(10)?,
        status,
        subject_id: row.get(12)?,
        medium_id: row.get(13)?,
        board_id: row.get(14)?,
        state_id: row.get(15)?,
        media_urls: json_col(media_raw, 16)?,
    })
}

/// 以显式 id（来自序号分配器）插入一条题目
pub fn insert(conn: &Connection, record: &QuestionRecord) -> AppResult<()> {
    conn.execute(
        "INSERT INTO questions (id, question_code, question_text, \
         option1, option2, option3, option4, correct_answer, \
         taxonomy_id, taxonomy_code, is_active, status, \
         subject_id, medium_id, board_id, state_id, media_urls, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            record.id,
            record.question_code,
            record.question_text,
            record.option1,
            record.option2,
            record.option3,
            record.option4,
            record.correct_answer,
            record.taxonomy_id,
            record.taxonomy_code,
            record.is_active,
            record.status.as_str(),
            record.subject_id,
            record.medium_id,
            record.board_id,
            record.state_id,
            serde_json::to_string(&record.media_urls)?,
            now_ts(),
        ],
    )?;
    Ok(())
}

pub fn find_by_code(conn: &Connection, code: &str) -> AppResult<Option<QuestionRecord>> {
    let sql = format!("SELECT {} FROM questions WHERE question_code = ?1", COLUMNS);
    let row = conn.query_row(&sql, params![code], row_to_record).optional()?;
    Ok(row)
}

pub fn delete_by_id(conn: &Connection, id: i64) -> AppResult<()> {
    conn.execute("DELETE FROM questions WHERE id = ?1", params![id])?;
    Ok(())
}

/// 当前题目表的最大 id（序号分配器自愈用）
pub fn max_id(conn: &Connection) -> AppResult<i64> {
    let max: i64 = conn.query_row("SELECT COALESCE(MAX(id), 0) FROM questions", [], |r| {
        r.get(0)
    })?;
    Ok(max)
}

/// 按分组类型（章节/知识点）+ 编码集合查询命中的活跃题目编码
///
/// 返回顺序按题目 id 稳定，便于可重现的抽样。
pub fn codes_matching(
    conn: &Connection,
    filter: &QuestionFilter,
    kind: GroupKind,
    codes: &[String],
) -> AppResult<Vec<String>> {
    if codes.is_empty() {
        return Ok(Vec::new());
    }

    let taxonomy_column = match kind {
        GroupKind::Chapter => "t.chapter_code",
        GroupKind::Topic => "t.topic_code",
    };
    let placeholders = vec!["?"; codes.len()].join(", ");

    let mut sql = format!(
        "SELECT q.question_code FROM questions q \
         JOIN taxonomy t ON q.taxonomy_id = t.id \
         JOIN subjects s ON q.subject_id = s.id \
         JOIN mediums m ON q.medium_id = m.id \
         WHERE {} IN ({}) \
           AND s.subject_code = ? \
           AND m.medium_code = ? \
           AND q.is_active = 1",
        taxonomy_column, placeholders
    );

    let mut values: Vec<Value> = codes
        .iter()
        .map(|c| Value::Text(c.clone()))
        .collect();
    values.push(Value::Text(filter.subject_code.clone()));
    values.push(Value::Text(filter.medium_code.clone()));

    if let Some(board_id) = filter.board_id {
        sql.push_str(" AND q.board_id = ?");
        values.push(Value::Integer(board_id));
    }
    if let Some(state_id) = filter.state_id {
        sql.push_str(" AND q.state_id = ?");
        values.push(Value::Integer(state_id));
    }
    sql.push_str(" ORDER BY q.id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), |r| r.get::<_, String>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// 批量按编码取题（响应拼装用），返回 编码 → 记录
pub fn find_many_by_codes(
    conn: &Connection,
    codes: &[String],
) -> AppResult<HashMap<String, QuestionRecord>> {
    if codes.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders = vec!["?"; codes.len()].join(", ");
    let sql = format!(
        "SELECT {} FROM questions WHERE question_code IN ({})",
        COLUMNS, placeholders
    );
    let values: Vec<Value> = codes.iter().map(|c| Value::Text(c.clone())).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), row_to_record)?;
    let mut map = HashMap::new();
    for row in rows {
        let record = row?;
        map.insert(record.question_code.clone(), record);
    }
    Ok(map)
}
