//! 知识分类解析服务
//!
//! 复合编码 + 上下文做「先查后建」：同一八元组永远解析到同一个节点。

use rusqlite::Connection;
use tracing::info;

use crate::error::{AppError, AppResult, NotFoundError};
use crate::models::taxonomy::{TaxonomyContext, TaxonomyInput, TaxonomyRecord};
use crate::store::{masters, taxonomy};

/// 拼接复合分类编码
///
/// 格式: TAX{chapter}{topic}{subtopic}-B{board}-S{state}-M{medium}-STD{standard}-S{subject}
/// 知识点/子知识点为空时直接省略对应段。
pub fn build_taxonomy_code(
    chapter_code: &str,
    topic_code: &str,
    subtopic_code: &str,
    board_id: i64,
    state_id: i64,
    medium_id: i64,
    standard: &str,
    subject_id: i64,
) -> String {
    let mut base = format!("TAX{}", chapter_code);
    if !topic_code.is_empty() {
        base.push_str(topic_code);
    }
    if !subtopic_code.is_empty() {
        base.push_str(subtopic_code);
    }
    format!(
        "{}-B{}-S{}-M{}-STD{}-S{}",
        base, board_id, state_id, medium_id, standard, subject_id
    )
}

/// 解析（或懒创建）一个分类节点
///
/// 选题过滤完全依赖 board/state，上下文缺失时立刻报错而不是静默降级。
pub fn resolve(
    conn: &Connection,
    input: &TaxonomyInput,
    ctx: &TaxonomyContext,
) -> AppResult<TaxonomyRecord> {
    if !masters::board_exists(conn, ctx.board_id)? {
        return Err(AppError::NotFound(NotFoundError::Board { id: ctx.board_id }));
    }
    if !masters::state_exists(conn, ctx.state_id)? {
        return Err(AppError::NotFound(NotFoundError::State { id: ctx.state_id }));
    }

    let taxonomy_code = build_taxonomy_code(
        &input.chapter_code,
        &input.topic_code,
        &input.subtopic_code,
        ctx.board_id,
        ctx.state_id,
        ctx.medium_id,
        &input.standard,
        ctx.subject_id,
    );

    if let Some(existing) = taxonomy::find_by_code(conn, &taxonomy_code)? {
        return Ok(existing);
    }

    // 名称继承：输入为空时反查复用编码的既有名称，全新编码给占位名
    let chapter_name = inherit_name(
        &input.chapter_name,
        taxonomy::chapter_name_by_code(conn, &input.chapter_code)?,
        || format!("章节 {}", input.chapter_code),
    );
    let topic_name = if input.topic_code.is_empty() {
        String::new()
    } else {
        inherit_name(
            &input.topic_name,
            taxonomy::topic_details_by_code(conn, &input.topic_code)?.map(|(name, _, _)| name),
            || format!("知识点 {}", input.topic_code),
        )
    };
    let subtopic_name = if input.subtopic_code.is_empty() {
        String::new()
    } else {
        inherit_name(
            &input.subtopic_name,
            taxonomy::subtopic_name_by_code(conn, &input.subtopic_code)?,
            || format!("子知识点 {}", input.subtopic_code),
        )
    };

    let mut record = TaxonomyRecord {
        id: 0,
        taxonomy_code: taxonomy_code.clone(),
        subject_id: ctx.subject_id,
        medium_id: ctx.medium_id,
        standard: input.standard.clone(),
        chapter_code: input.chapter_code.clone(),
        chapter_name,
        topic_code: input.topic_code.clone(),
        topic_name,
        subtopic_code: input.subtopic_code.clone(),
        subtopic_name,
        board_id: ctx.board_id,
        state_id: ctx.state_id,
    };
    record.id = taxonomy::insert(conn, &record)?;

    info!("创建分类节点: {}", taxonomy_code);
    Ok(record)
}

fn inherit_name(
    provided: &str,
    existing: Option<String>,
    placeholder: impl FnOnce() -> String,
) -> String {
    let trimmed = provided.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    existing.unwrap_or_else(placeholder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_code_skips_empty_segments() {
        let code = build_taxonomy_code("C001", "", "", 7, 9, 3, "10", 11);
        assert_eq!(code, "TAXC001-B7-S9-M3-STD10-S11");
    }

    #[test]
    fn taxonomy_code_full_hierarchy() {
        let code = build_taxonomy_code("C000", "T000", "S001", 7, 9, 3, "10", 11);
        assert_eq!(code, "TAXC000T000S001-B7-S9-M3-STD10-S11");
    }
}
