//! 题库导入服务
//!
//! 一个题库文件 = 一次导入会话：主数据首见创建、编码会话内复用、
//! 分类节点懒创建、题目序号原子分配。整个文件在一个事务内落库，
//! 中途失败全部回滚。

use tracing::{info, warn};

use crate::error::AppResult;
use crate::models::question::{BankFile, BankQuestion, QuestionRecord};
use crate::models::taxonomy::{TaxonomyContext, TaxonomyInput};
use crate::services::code_service::{question_code, CodeGenerationSession};
use crate::services::taxonomy_service;
use crate::store::{masters, questions, sequence, Store};

/// 单个文件的导入统计
#[derive(Debug, Default)]
pub struct ImportStats {
    pub imported: usize,
    pub skipped: usize,
}

/// 题库导入服务
pub struct QuestionService {
    store: Store,
}

impl QuestionService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// 导入一个题库文件
    pub async fn import_bank_file(&self, bank: &BankFile) -> AppResult<ImportStats> {
        let stats = self
            .store
            .with_tx(|conn| {
                let subject_id = masters::get_or_create_subject(
                    conn,
                    &bank.subject_code,
                    &bank.subject_name,
                    &bank.standard,
                )?;
                let medium_id =
                    masters::get_or_create_medium(conn, &bank.medium_code, &bank.medium_name)?;
                let board_id = masters::get_or_create_board(conn, &bank.board_name)?;
                let state_id = masters::get_or_create_state(conn, &bank.state_name)?;
                let ctx = TaxonomyContext {
                    subject_id,
                    medium_id,
                    board_id,
                    state_id,
                };

                let mut session = CodeGenerationSession::new();
                let mut stats = ImportStats::default();

                for (index, question) in bank.questions.iter().enumerate() {
                    if let Some(reason) = validate_bank_question(question) {
                        warn!("[{}] 第 {} 道题目被跳过: {}", bank.name, index + 1, reason);
                        stats.skipped += 1;
                        continue;
                    }

                    let chapter_code =
                        session.get_or_create_chapter_code(conn, &question.chapter)?;
                    let topic_code =
                        session.get_or_create_topic_code(conn, &question.topic, &chapter_code)?;
                    let subtopic_code = session.get_or_create_subtopic_code(
                        conn,
                        &question.subtopic,
                        &topic_code,
                    )?;

                    let input = TaxonomyInput {
                        chapter_code,
                        chapter_name: question.chapter.clone(),
                        topic_code,
                        topic_name: question.topic.clone(),
                        subtopic_code,
                        subtopic_name: question.subtopic.clone(),
                        standard: bank.standard.clone(),
                    };
                    let taxonomy = taxonomy_service::resolve(conn, &input, &ctx)?;

                    let question_id = sequence::next_question_id(conn)?;
                    let record = QuestionRecord {
                        id: question_id,
                        question_code: question_code(question_id),
                        question_text: question.text.clone(),
                        option1: question.options[0].clone(),
                        option2: question.options[1].clone(),
                        option3: question.options[2].clone(),
                        option4: question.options[3].clone(),
                        correct_answer: question.correct_answer.clone(),
                        taxonomy_id: taxonomy.id,
                        taxonomy_code: taxonomy.taxonomy_code.clone(),
                        is_active: true,
                        status: question.status,
                        subject_id,
                        medium_id,
                        board_id,
                        state_id,
                        media_urls: question.media_urls.clone(),
                    };
                    questions::insert(conn, &record)?;
                    stats.imported += 1;
                }

                Ok(stats)
            })
            .await?;

        // 会话对象随事务结束丢弃，下个文件重新建
        info!(
            "[{}] ✓ 导入完成: 成功 {}, 跳过 {}",
            bank.name, stats.imported, stats.skipped
        );
        Ok(stats)
    }
}

/// 导入前的逐行校验，返回不合格原因
fn validate_bank_question(question: &BankQuestion) -> Option<String> {
    if question.text.trim().is_empty() {
        return Some("题面为空".to_string());
    }
    if question.options.len() != 4 {
        return Some(format!("选项数量必须为 4，实际 {}", question.options.len()));
    }
    if question.correct_answer.trim().is_empty() {
        return Some("缺少正确答案".to_string());
    }
    if question.chapter.trim().is_empty() {
        return Some("缺少章节名称".to_string());
    }
    None
}
