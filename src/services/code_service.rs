//! 编码生成服务
//!
//! 章节/知识点/子知识点编码按「归一化名称 → 既有编码复用，否则顺延分配」
//! 的规则生成；一次批量导入共用一个会话对象，会话内的缓存保证同名条目
//! 在落库前也能解析到同一个编码，且每类编码的起始序号只全表扫描一次。

use std::collections::HashMap;

use rusqlite::Connection;
use tracing::info;

use crate::error::AppResult;
use crate::store::taxonomy;

/// 题目编码格式：Q{序号}
pub fn question_code(question_id: i64) -> String {
    format!("Q{}", question_id)
}

/// 一次导入会话的编码生成器
///
/// 由调用方创建并在会话结束后丢弃，不做全局单例。
#[derive(Debug, Default)]
pub struct CodeGenerationSession {
    chapter_codes: HashMap<String, String>,
    topic_codes: HashMap<String, String>,
    subtopic_codes: HashMap<String, String>,
    next_chapter_number: Option<u32>,
    next_topic_number: Option<u32>,
    next_subtopic_number: Option<u32>,
}

impl CodeGenerationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取或创建章节编码（C{3位序号}）
    pub fn get_or_create_chapter_code(
        &mut self,
        conn: &Connection,
        chapter_name: &str,
    ) -> AppResult<String> {
        let normalized = normalize(chapter_name);

        if let Some(code) = self.chapter_codes.get(&normalized) {
            return Ok(code.clone());
        }

        if let Some(existing) = taxonomy::chapter_code_by_name(conn, &normalized)? {
            self.chapter_codes.insert(normalized, existing.clone());
            return Ok(existing);
        }

        let next = match self.next_chapter_number {
            Some(n) => n,
            None => {
                let n = next_number(&taxonomy::distinct_chapter_codes(conn)?, 'C');
                self.next_chapter_number = Some(n);
                n
            }
        };
        let new_code = format!("C{:03}", next);
        self.next_chapter_number = Some(next + 1);
        self.chapter_codes.insert(normalized, new_code.clone());

        info!("生成新章节编码: {} ({})", new_code, chapter_name);
        Ok(new_code)
    }

    /// 获取或创建知识点编码（T{3位序号}，按章节归属查重）
    ///
    /// 空名称直接映射为空编码（表示"无知识点"）。
    pub fn get_or_create_topic_code(
        &mut self,
        conn: &Connection,
        topic_name: &str,
        chapter_code: &str,
    ) -> AppResult<String> {
        if topic_name.trim().is_empty() {
            return Ok(String::new());
        }
        let normalized = normalize(topic_name);
        let cache_key = format!("{}:{}", chapter_code, normalized);

        if let Some(code) = self.topic_codes.get(&cache_key) {
            return Ok(code.clone());
        }

        if let Some(existing) = taxonomy::topic_code_by_name(conn, chapter_code, &normalized)? {
            self.topic_codes.insert(cache_key, existing.clone());
            return Ok(existing);
        }

        let next = match self.next_topic_number {
            Some(n) => n,
            None => {
                let n = next_number(&taxonomy::distinct_topic_codes(conn)?, 'T');
                self.next_topic_number = Some(n);
                n
            }
        };
        let new_code = format!("T{:03}", next);
        self.next_topic_number = Some(next + 1);
        self.topic_codes.insert(cache_key, new_code.clone());

        info!(
            "生成新知识点编码: {} ({}, 章节 {})",
            new_code, topic_name, chapter_code
        );
        Ok(new_code)
    }

    /// 获取或创建子知识点编码（S{3位序号}，按知识点归属查重）
    ///
    /// 空名称直接映射为空编码。
    pub fn get_or_create_subtopic_code(
        &mut self,
        conn: &Connection,
        subtopic_name: &str,
        topic_code: &str,
    ) -> AppResult<String> {
        if subtopic_name.trim().is_empty() {
            return Ok(String::new());
        }
        let normalized = normalize(subtopic_name);
        let cache_key = format!("{}:{}", topic_code, normalized);

        if let Some(code) = self.subtopic_codes.get(&cache_key) {
            return Ok(code.clone());
        }

        if let Some(existing) = taxonomy::subtopic_code_by_name(conn, topic_code, &normalized)? {
            self.subtopic_codes.insert(cache_key, existing.clone());
            return Ok(existing);
        }

        let next = match self.next_subtopic_number {
            Some(n) => n,
            None => {
                let n = next_number(&taxonomy::distinct_subtopic_codes(conn)?, 'S');
                self.next_subtopic_number = Some(n);
                n
            }
        };
        let new_code = format!("S{:03}", next);
        self.next_subtopic_number = Some(next + 1);
        self.subtopic_codes.insert(cache_key, new_code.clone());

        info!(
            "生成新子知识点编码: {} ({}, 知识点 {})",
            new_code, subtopic_name, topic_code
        );
        Ok(new_code)
    }
}

/// 查重用的名称归一化：去首尾空白 + 小写
fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// 下一个可用序号 = 已占用编码的最大数字后缀 + 1（无占用时从 0 开始）
fn next_number(codes: &[String], prefix: char) -> u32 {
    codes
        .iter()
        .filter_map(|c| c.strip_prefix(prefix))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .map(|max| max + 1)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_number_starts_at_zero() {
        assert_eq!(next_number(&[], 'C'), 0);
    }

    #[test]
    fn next_number_skips_malformed_suffixes() {
        let codes = vec![
            "C004".to_string(),
            "C010".to_string(),
            "CX".to_string(),
            "T002".to_string(),
        ];
        assert_eq!(next_number(&codes, 'C'), 11);
    }
}
