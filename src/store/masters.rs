//! 主数据（考试局 / 邦州 / 授课语言 / 科目）的按码查找与首见创建

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::AppResult;

pub fn get_or_create_board(conn: &Connection, name: &str) -> AppResult<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM boards WHERE board_name = ?1",
            params![name],
            |r| r.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute("INSERT INTO boards (board_name) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

pub fn get_or_create_state(conn: &Connection, name: &str) -> AppResult<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM states WHERE state_name = ?1",
            params![name],
            |r| r.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute("INSERT INTO states (state_name) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

pub fn get_or_create_medium(conn: &Connection, code: &str, name: &str) -> AppResult<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM mediums WHERE medium_code = ?1",
            params![code],
            |r| r.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute(
        "INSERT INTO mediums (medium_code, medium_name) VALUES (?1, ?2)",
        params![code, name],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_or_create_subject(
    conn: &Connection,
    code: &str,
    name: &str,
    standard: &str,
) -> AppResult<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM subjects WHERE subject_code = ?1",
            params![code],
            |r| r.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute(
        "INSERT INTO subjects (subject_code, subject_name, standard) VALUES (?1, ?2, ?3)",
        params![code, name, standard],
    )?;
    Ok(conn.last_insert_rowid())
}

/// 返回 (id, 名称, 年级)
pub fn find_subject_by_code(
    conn: &Connection,
    code: &str,
) -> AppResult<Option<(i64, String, String)>> {
    let row = conn
        .query_row(
            "SELECT id, subject_name, standard FROM subjects WHERE subject_code = ?1",
            params![code],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?;
    Ok(row)
}

/// 返回 (id, 名称)
pub fn find_medium_by_code(conn: &Connection, code: &str) -> AppResult<Option<(i64, String)>> {
    let row = conn
        .query_row(
            "SELECT id, medium_name FROM mediums WHERE medium_code = ?1",
            params![code],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;
    Ok(row)
}

pub fn subject_name_by_id(conn: &Connection, id: i64) -> AppResult<Option<String>> {
    let name = conn
        .query_row(
            "SELECT subject_name FROM subjects WHERE id = ?1",
            params![id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(name)
}

pub fn medium_name_by_id(conn: &Connection, id: i64) -> AppResult<Option<String>> {
    let name = conn
        .query_row(
            "SELECT medium_name FROM mediums WHERE id = ?1",
            params![id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(name)
}

pub fn board_exists(conn: &Connection, id: i64) -> AppResult<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT id FROM boards WHERE id = ?1", params![id], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

pub fn state_exists(conn: &Connection, id: i64) -> AppResult<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT id FROM states WHERE id = ?1", params![id], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}
