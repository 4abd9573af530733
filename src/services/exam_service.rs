//! 考试容器服务
//!
//! 考试容器有自己独立的生命周期（draft/saved/started/completed）；
//! 转入 started 时把名下所有设计强制定稿 —— 这是策略传导，
//! 不受设计自身状态意愿影响。

use rusqlite::Connection;
use tracing::info;

use crate::error::{AppError, AppResult, ConflictError, ValidationError};
use crate::models::context::UserContext;
use crate::models::exam::{ExamRecord, ExamStatus, ExamUpdate, ExamView};
use crate::store::{designs, exams, papers, Store};

/// 考试编码前缀与位数：EXAM00001
const EXAM_CODE_PREFIX: &str = "EXAM";

/// 考试容器服务
pub struct ExamService {
    store: Store,
}

impl ExamService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// 创建考试容器（初始为 draft，无子设计）
    pub async fn create_exam(
        &self,
        exam_name: &str,
        total_time: Option<u32>,
        exam_mode: Option<String>,
        ctx: &UserContext,
    ) -> AppResult<ExamView> {
        let ctx = *ctx;
        self.store
            .with_tx(|conn| {
                let exam_code = generate_unique_exam_code(conn)?;
                let record = ExamRecord {
                    id: 0,
                    exam_code: exam_code.clone(),
                    exam_name: exam_name.to_string(),
                    total_time,
                    exam_mode,
                    status: ExamStatus::Draft,
                    created_by: ctx.user_id,
                    is_active: true,
                };
                exams::insert(conn, &record)?;
                info!("[考试 {}] ✓ 已创建: {}", exam_code, exam_name);
                Ok(view_of(&record, 0))
            })
            .await
    }

    /// 更新考试容器
    ///
    /// status 更新为 started 时，名下所有设计强制转为 closed。
    pub async fn update_exam(
        &self,
        exam_code: &str,
        update: &ExamUpdate,
        ctx: &UserContext,
    ) -> AppResult<ExamView> {
        let ctx = *ctx;
        self.store
            .with_tx(|conn| {
                let mut exam = exams::find_by_code_scoped(conn, exam_code, ctx.scope)?
                    .ok_or_else(|| AppError::exam_not_found(exam_code))?;

                if let Some(name) = &update.exam_name {
                    exam.exam_name = name.clone();
                }
                if let Some(total_time) = update.total_time {
                    exam.total_time = Some(total_time);
                }
                if let Some(mode) = &update.exam_mode {
                    exam.exam_mode = Some(mode.clone());
                }

                if let Some(status_raw) = &update.status {
                    let status = ExamStatus::from_str(status_raw).ok_or_else(|| {
                        AppError::Validation(ValidationError::InvalidExamStatus {
                            status: status_raw.clone(),
                        })
                    })?;
                    exam.status = status;

                    if status == ExamStatus::Started {
                        let closed = designs::close_all_for_exam(conn, exam.id)?;
                        info!(
                            "[考试 {}] 已开始，强制定稿名下 {} 个设计",
                            exam_code, closed
                        );
                    }
                }

                exams::update(conn, &exam)?;

                let total_questions = sum_design_questions(conn, exam.id)?;
                Ok(view_of(&exam, total_questions))
            })
            .await
    }

    /// 删除考试容器，级联删除名下设计与试卷
    pub async fn delete_exam(&self, exam_code: &str, ctx: &UserContext) -> AppResult<()> {
        let ctx = *ctx;
        self.store
            .with_tx(|conn| {
                let exam = exams::find_by_code_scoped(conn, exam_code, ctx.scope)?
                    .ok_or_else(|| AppError::exam_not_found(exam_code))?;

                let child_designs = designs::list_by_exam(conn, exam.id)?;
                for design in &child_designs {
                    papers::delete_by_design(conn, design.id)?;
                    designs::delete_by_id(conn, design.id)?;
                }
                exams::delete_by_id(conn, exam.id)?;

                info!(
                    "[考试 {}] 🗑️ 已删除（级联 {} 个设计）",
                    exam_code,
                    child_designs.len()
                );
                Ok(())
            })
            .await
    }

    /// 按编码读回考试视图
    pub async fn get_exam(&self, exam_code: &str, ctx: &UserContext) -> AppResult<ExamView> {
        let ctx = *ctx;
        self.store
            .with_conn(|conn| {
                let exam = exams::find_by_code_scoped(conn, exam_code, ctx.scope)?
                    .ok_or_else(|| AppError::exam_not_found(exam_code))?;
                let total_questions = sum_design_questions(conn, exam.id)?;
                Ok(view_of(&exam, total_questions))
            })
            .await
    }
}

// ========== 模块内辅助函数 ==========

fn view_of(record: &ExamRecord, total_questions: u32) -> ExamView {
    ExamView {
        exam_code: record.exam_code.clone(),
        exam_name: record.exam_name.clone(),
        total_time: record.total_time,
        total_questions,
        exam_mode: record.exam_mode.clone(),
        status: record.status,
    }
}

fn sum_design_questions(conn: &Connection, exam_id: i64) -> AppResult<u32> {
    let children = designs::list_by_exam(conn, exam_id)?;
    Ok(children.iter().map(|d| d.total_questions).sum())
}

/// 生成唯一考试编码（EXAM + 5 位序号），碰撞顺延重试一次
fn generate_unique_exam_code(conn: &Connection) -> AppResult<String> {
    let mut number = exams::last_code(conn)?
        .and_then(|code| {
            code.strip_prefix(EXAM_CODE_PREFIX)
                .and_then(|suffix| suffix.parse::<u32>().ok())
        })
        .map(|n| n + 1)
        .unwrap_or(1);

    let mut candidate = format!("{}{:05}", EXAM_CODE_PREFIX, number);
    for _ in 0..2 {
        if !exams::code_exists(conn, &candidate)? {
            return Ok(candidate);
        }
        number += 1;
        candidate = format!("{}{:05}", EXAM_CODE_PREFIX, number);
    }
    Err(AppError::Conflict(ConflictError::CodeCollision {
        code: candidate,
    }))
}
