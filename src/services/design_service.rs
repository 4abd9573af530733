//! 设计生命周期服务
//!
//! 状态机：draft（可编辑/可删除）→ closed（定稿，不可逆）。
//! 定稿 = 选题 + 组装试卷 + 落库，三步在同一个事务内完成；
//! 任何一步失败整体回滚，绝不出现"已定稿却没有试卷"的设计。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{
    AppError, AppResult, ConflictError, ImmutableError, NotFoundError, ValidationError,
};
use crate::models::context::{Scope, UserContext};
use crate::models::design::{
    ChapterDetails, CurriculumGroup, DesignRecord, DesignRequest, DesignResult, DesignStatus,
    GroupKind, PaperRecord, RemovalResult, ResolvedCode, ResolvedGroup,
};
use crate::models::question::QuestionStatus;
use crate::services::{paper_service, selection_service};
use crate::services::selection_service::SelectionRequest;
use crate::store::questions::QuestionFilter;
use crate::store::{designs, exams, masters, papers, questions, taxonomy, Store};

/// 设计编码前缀与位数：EXM00001
const DESIGN_CODE_PREFIX: &str = "EXM";

/// 设计生命周期服务
pub struct DesignService {
    store: Store,
    /// 可注入种子的随机数发生器（测试可复现抽样结果）
    rng: Mutex<StdRng>,
}

impl DesignService {
    pub fn new(store: Store, config: &Config) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            store,
            rng: Mutex::new(rng),
        }
    }

    /// 创建设计并生成试卷
    ///
    /// status=1 存为草稿，status=2 直接定稿；两种情况都会完整跑一遍
    /// 选题 + 组装流水线。exam_code 给定时设计挂在该考试容器之下。
    pub async fn create_design(
        &self,
        request: &DesignRequest,
        ctx: &UserContext,
        exam_code: Option<&str>,
    ) -> AppResult<DesignResult> {
        let status = requested_status(request.status)?;
        if request.chapters_topics.is_empty() {
            return Err(AppError::Validation(ValidationError::MissingChapterTopics));
        }

        let ctx = *ctx;
        let mut rng = self.rng.lock().await;
        let rng = &mut *rng;

        self.store
            .with_tx(|conn| {
                // 父级考试容器（可选）；已开始/已结束的考试不允许再挂新设计
                let exam_id = match exam_code {
                    Some(code) => {
                        let exam = exams::find_by_code_scoped(conn, code, ctx.scope)?
                            .ok_or_else(|| AppError::exam_not_found(code))?;
                        if exam.status.locks_designs() {
                            return Err(AppError::Immutable(ImmutableError::ParentExamLocked {
                                exam_code: exam.exam_code,
                                status: exam.status.to_string(),
                            }));
                        }
                        Some(exam.id)
                    }
                    None => None,
                };

                let (subject_id, subject_name, subject_standard) =
                    masters::find_subject_by_code(conn, &request.subject_code)?.ok_or_else(
                        || {
                            AppError::NotFound(NotFoundError::Subject {
                                code: request.subject_code.clone(),
                            })
                        },
                    )?;
                let (medium_id, medium_name) =
                    masters::find_medium_by_code(conn, &request.medium_code)?.ok_or_else(|| {
                        AppError::NotFound(NotFoundError::Medium {
                            code: request.medium_code.clone(),
                        })
                    })?;

                // 重名检查：挂在考试下时只查该考试内部
                if designs::name_exists(conn, &request.exam_name, exam_id, None)? {
                    return Err(AppError::Conflict(ConflictError::DuplicateDesignName {
                        name: request.exam_name.clone(),
                        in_exam: exam_id.is_some(),
                    }));
                }

                let design_code = generate_unique_design_code(conn)?;

                let outcome = selection_service::select_questions(
                    conn,
                    &selection_request(request),
                    rng,
                )?;
                let selected = outcome.selected_question_codes.clone();

                let record = DesignRecord {
                    id: 0,
                    design_code: design_code.clone(),
                    design_name: request.exam_name.clone(),
                    exam_id,
                    subject_id,
                    medium_id,
                    board_id: request.board_id,
                    state_id: request.state_id,
                    standard: request.standard.clone().or(Some(subject_standard)),
                    exam_mode: request.exam_mode.clone(),
                    total_time: request.total_time,
                    total_questions: request.total_questions,
                    no_of_sets: request.no_of_sets,
                    no_of_versions: request.no_of_versions,
                    status,
                    chapter_topics: request.chapters_topics.clone(),
                    questions_to_exclude: request.qtn_codes_to_exclude.clone(),
                    total_question_codes: selected.clone(),
                    created_by: ctx.user_id,
                    is_active: true,
                };
                let design_id = designs::insert(conn, &record)?;

                generate_papers(conn, design_id, &record, &selected, ctx.user_id, rng)?;

                let question_papers =
                    paper_service::build_papers_response(conn, design_id, ctx.include_answers)?;
                let chapters_topics = resolve_chapter_topics(conn, &record.chapter_topics)?;

                Ok(DesignResult {
                    exam_name: record.design_name,
                    exam_code: design_code,
                    status,
                    number_of_sets: record.no_of_sets,
                    number_of_versions: record.no_of_versions,
                    no_of_qns: record.total_questions,
                    subject: subject_name,
                    medium: medium_name,
                    board_id: record.board_id,
                    state_id: record.state_id,
                    standard: record.standard,
                    exam_mode: record.exam_mode,
                    chapters_topics,
                    questions_to_exclude: record.questions_to_exclude,
                    shortfall_info: outcome.shortfall,
                    question_papers,
                })
            })
            .await
    }

    /// 更新设计
    ///
    /// 只有草稿可以改；status=2 时重新选题并整套重建试卷。
    pub async fn update_design(
        &self,
        design_code: &str,
        request: &DesignRequest,
        ctx: &UserContext,
    ) -> AppResult<DesignResult> {
        let status = requested_status(request.status)?;
        if status == DesignStatus::Closed && request.chapters_topics.is_empty() {
            return Err(AppError::Validation(ValidationError::MissingChapterTopics));
        }

        let ctx = *ctx;
        let mut rng = self.rng.lock().await;
        let rng = &mut *rng;

        self.store
            .with_tx(|conn| {
                let mut design = designs::find_by_code_scoped(conn, design_code, ctx.scope)?
                    .ok_or_else(|| AppError::design_not_found(design_code))?;

                ensure_mutable(conn, &design)?;

                if request.exam_name != design.design_name
                    && designs::name_exists(
                        conn,
                        &request.exam_name,
                        design.exam_id,
                        Some(design.id),
                    )?
                {
                    return Err(AppError::Conflict(ConflictError::DuplicateDesignName {
                        name: request.exam_name.clone(),
                        in_exam: design.exam_id.is_some(),
                    }));
                }

                let (subject_id, subject_name, subject_standard) =
                    masters::find_subject_by_code(conn, &request.subject_code)?.ok_or_else(
                        || {
                            AppError::NotFound(NotFoundError::Subject {
                                code: request.subject_code.clone(),
                            })
                        },
                    )?;
                let (medium_id, medium_name) =
                    masters::find_medium_by_code(conn, &request.medium_code)?.ok_or_else(|| {
                        AppError::NotFound(NotFoundError::Medium {
                            code: request.medium_code.clone(),
                        })
                    })?;

                design.design_name = request.exam_name.clone();
                design.subject_id = subject_id;
                design.medium_id = medium_id;
                design.board_id = request.board_id;
                design.state_id = request.state_id;
                design.standard = request.standard.clone().or(Some(subject_standard));
                design.exam_mode = request.exam_mode.clone();
                design.total_time = request.total_time;
                design.total_questions = request.total_questions;
                design.no_of_sets = request.no_of_sets;
                design.no_of_versions = request.no_of_versions;
                design.chapter_topics = request.chapters_topics.clone();
                design.questions_to_exclude = request.qtn_codes_to_exclude.clone();
                design.status = status;

                let shortfall = if status == DesignStatus::Closed {
                    let outcome = selection_service::select_questions(
                        conn,
                        &selection_request(request),
                        rng,
                    )?;
                    design.total_question_codes = outcome.selected_question_codes.clone();
                    designs::update(conn, &design)?;

                    // 重新定稿：旧试卷整套废弃后重建
                    papers::delete_by_design(conn, design.id)?;
                    generate_papers(
                        conn,
                        design.id,
                        &design,
                        &outcome.selected_question_codes,
                        ctx.user_id,
                        rng,
                    )?;
                    outcome.shortfall
                } else {
                    designs::update(conn, &design)?;
                    Default::default()
                };

                let question_papers =
                    paper_service::build_papers_response(conn, design.id, ctx.include_answers)?;
                let chapters_topics = resolve_chapter_topics(conn, &design.chapter_topics)?;

                Ok(DesignResult {
                    exam_name: design.design_name,
                    exam_code: design.design_code,
                    status,
                    number_of_sets: design.no_of_sets,
                    number_of_versions: design.no_of_versions,
                    no_of_qns: design.total_questions,
                    subject: subject_name,
                    medium: medium_name,
                    board_id: design.board_id,
                    state_id: design.state_id,
                    standard: design.standard,
                    exam_mode: design.exam_mode,
                    chapters_topics,
                    questions_to_exclude: design.questions_to_exclude,
                    shortfall_info: shortfall,
                    question_papers,
                })
            })
            .await
    }

    /// 删除设计（仅限草稿）；名下试卷一并删除
    pub async fn delete_design(&self, design_code: &str, ctx: &UserContext) -> AppResult<()> {
        let ctx = *ctx;
        self.store
            .with_tx(|conn| {
                let design = designs::find_by_code_scoped(conn, design_code, ctx.scope)?
                    .ok_or_else(|| AppError::design_not_found(design_code))?;

                ensure_mutable(conn, &design)?;

                let removed = papers::delete_by_design(conn, design.id)?;
                designs::delete_by_id(conn, design.id)?;
                info!(
                    "[设计 {}] 🗑️ 已删除（连同 {} 份试卷）",
                    design_code, removed
                );
                Ok(())
            })
            .await
    }

    /// 从指定试卷中移除一道题目
    ///
    /// 定稿后仍然允许的窄幅修改：只动试卷编码序列与设计编码全集，
    /// 同步重算两侧计数。题目若处于 review 状态则连题库记录一并硬删除。
    pub async fn remove_question_from_paper(
        &self,
        design_code: &str,
        paper_code: &str,
        question_code: &str,
        ctx: &UserContext,
    ) -> AppResult<RemovalResult> {
        let ctx = *ctx;
        self.store
            .with_tx(|conn| {
                let design = designs::find_by_code_scoped(conn, design_code, ctx.scope)?
                    .ok_or_else(|| AppError::design_not_found(design_code))?;
                let paper = papers::find_by_code(conn, paper_code)?
                    .ok_or_else(|| AppError::paper_not_found(paper_code))?;

                if paper.design_id != design.id {
                    return Err(AppError::Validation(ValidationError::PaperNotInDesign {
                        paper_code: paper_code.to_string(),
                        design_code: design_code.to_string(),
                    }));
                }

                // 重复补齐可能造成同一编码多次出现，只移除第一处
                let position = paper
                    .q_codes
                    .iter()
                    .position(|c| c == question_code)
                    .ok_or_else(|| {
                        AppError::NotFound(NotFoundError::QuestionInPaper {
                            question_code: question_code.to_string(),
                            paper_code: paper_code.to_string(),
                        })
                    })?;

                let mut paper_codes = paper.q_codes.clone();
                paper_codes.remove(position);
                let paper_total = paper_codes.len() as u32;
                papers::update_codes(conn, paper.id, &paper_codes, paper_total)?;

                let mut design_codes = design.total_question_codes.clone();
                let design_total = match design_codes.iter().position(|c| c == question_code) {
                    Some(pos) => {
                        design_codes.remove(pos);
                        let total = design_codes.len() as u32;
                        designs::update_total_codes(conn, design.id, &design_codes, total)?;
                        total
                    }
                    None => design.total_questions,
                };

                // review 状态的题目随移除一并硬删除；其余状态只解除挂接
                let mut question_deleted = false;
                if let Some(question) = questions::find_by_code(conn, question_code)? {
                    if question.status == QuestionStatus::Review {
                        if !question.media_urls.is_empty() {
                            // 外部对象存储的清理由存储协作方完成
                            warn!(
                                "题目 {} 挂接的 {} 个媒体文件待外部存储清理",
                                question_code,
                                question.media_urls.len()
                            );
                        }
                        questions::delete_by_id(conn, question.id)?;
                        question_deleted = true;
                    }
                }

                info!(
                    "[设计 {}] 已从试卷 {} 移除题目 {} (硬删除: {})",
                    design_code, paper_code, question_code, question_deleted
                );

                Ok(RemovalResult {
                    question_code: question_code.to_string(),
                    paper_code: paper_code.to_string(),
                    design_code: design_code.to_string(),
                    total_questions_in_paper: paper_total,
                    total_questions_in_design: design_total,
                    question_deleted,
                })
            })
            .await
    }

    /// 按编码读回设计详情（含试卷视图与解析出名称的课程配置）
    pub async fn get_design(
        &self,
        design_code: &str,
        ctx: &UserContext,
    ) -> AppResult<DesignResult> {
        let ctx = *ctx;
        self.store
            .with_conn(|conn| {
                let design = designs::find_by_code_scoped(conn, design_code, ctx.scope)?
                    .ok_or_else(|| AppError::design_not_found(design_code))?;

                let subject = masters::subject_name_by_id(conn, design.subject_id)?
                    .unwrap_or_else(|| "Unknown".to_string());
                let medium = masters::medium_name_by_id(conn, design.medium_id)?
                    .unwrap_or_else(|| "Unknown".to_string());
                let question_papers =
                    paper_service::build_papers_response(conn, design.id, ctx.include_answers)?;
                let chapters_topics = resolve_chapter_topics(conn, &design.chapter_topics)?;

                Ok(DesignResult {
                    exam_name: design.design_name,
                    exam_code: design.design_code,
                    status: design.status,
                    number_of_sets: design.no_of_sets,
                    number_of_versions: design.no_of_versions,
                    no_of_qns: design.total_questions,
                    subject,
                    medium,
                    board_id: design.board_id,
                    state_id: design.state_id,
                    standard: design.standard,
                    exam_mode: design.exam_mode,
                    chapters_topics,
                    questions_to_exclude: design.questions_to_exclude,
                    shortfall_info: Default::default(),
                    question_papers,
                })
            })
            .await
    }

    /// 删除单份试卷
    pub async fn delete_question_paper(
        &self,
        paper_code: &str,
        ctx: &UserContext,
    ) -> AppResult<()> {
        let ctx = *ctx;
        self.store
            .with_tx(|conn| {
                let paper = papers::find_by_code(conn, paper_code)?
                    .ok_or_else(|| AppError::paper_not_found(paper_code))?;
                if let Scope::OwnedBy(user_id) = ctx.scope {
                    if paper.created_by != user_id {
                        return Err(AppError::paper_not_found(paper_code));
                    }
                }
                papers::delete_by_id(conn, paper.id)?;
                info!("试卷 {} 已删除", paper_code);
                Ok(())
            })
            .await
    }
}

// ========== 模块内辅助函数 ==========

/// 接口状态整数 → 生命周期状态
fn requested_status(status: u8) -> AppResult<DesignStatus> {
    match status {
        1 => Ok(DesignStatus::Draft),
        2 => Ok(DesignStatus::Closed),
        other => Err(AppError::Validation(ValidationError::InvalidDesignStatus {
            status: other,
        })),
    }
}

/// 定稿/删除前的可变性检查：自身已定稿或父级考试已锁定都要拒绝
fn ensure_mutable(conn: &Connection, design: &DesignRecord) -> AppResult<()> {
    if design.status == DesignStatus::Closed {
        return Err(AppError::design_closed(design.design_code.as_str()));
    }
    if let Some(exam_id) = design.exam_id {
        if let Some(exam) = exams::find_by_id(conn, exam_id)? {
            if exam.status.locks_designs() {
                return Err(AppError::Immutable(ImmutableError::ParentExamLocked {
                    exam_code: exam.exam_code,
                    status: exam.status.to_string(),
                }));
            }
        }
    }
    Ok(())
}

fn selection_request(request: &DesignRequest) -> SelectionRequest<'_> {
    SelectionRequest {
        groups: &request.chapters_topics,
        is_ai_selected: request.is_ai_selected,
        filter: QuestionFilter {
            subject_code: request.subject_code.clone(),
            medium_code: request.medium_code.clone(),
            board_id: request.board_id,
            state_id: request.state_id,
        },
        no_of_sets: request.no_of_sets as usize,
        questions_per_paper: request.total_questions as usize,
        exclude: &request.qtn_codes_to_exclude,
    }
}

/// 组装试卷并逐份落库
fn generate_papers<R: Rng>(
    conn: &Connection,
    design_id: i64,
    design: &DesignRecord,
    selected: &[String],
    created_by: i64,
    rng: &mut R,
) -> AppResult<()> {
    let assembled = paper_service::assemble(
        design_id,
        selected,
        design.no_of_sets as usize,
        design.no_of_versions as usize,
        design.total_questions as usize,
        rng,
    )?;
    for paper in &assembled {
        papers::insert(
            conn,
            &PaperRecord {
                id: 0,
                paper_code: paper.paper_code.clone(),
                design_id,
                q_codes: paper.q_codes.clone(),
                total_questions: design.total_questions,
                total_time: design.total_time,
                created_by,
            },
        )?;
    }
    info!(
        "[设计 {}] ✓ 已生成 {} 份试卷 ({} 套 × {} 版本)",
        design.design_code,
        assembled.len(),
        design.no_of_sets,
        design.no_of_versions
    );
    Ok(())
}

/// 生成唯一设计编码（EXM + 5 位序号）
///
/// 取号后复查一次存在性；并发竞争导致碰撞时顺延重试一次，
/// 仍冲突才作为冲突错误上抛。
fn generate_unique_design_code(conn: &Connection) -> AppResult<String> {
    let mut number = designs::last_code(conn)?
        .and_then(|code| {
            code.strip_prefix(DESIGN_CODE_PREFIX)
                .and_then(|suffix| suffix.parse::<u32>().ok())
        })
        .map(|n| n + 1)
        .unwrap_or(1);

    let mut candidate = format!("{}{:05}", DESIGN_CODE_PREFIX, number);
    for _ in 0..2 {
        if !designs::code_exists(conn, &candidate)? {
            return Ok(candidate);
        }
        warn!("设计编码 {} 已被占用，顺延重试", candidate);
        number += 1;
        candidate = format!("{}{:05}", DESIGN_CODE_PREFIX, number);
    }
    Err(AppError::Conflict(ConflictError::CodeCollision {
        code: candidate,
    }))
}

/// 把课程配置里的编码解析成带名称的视图（查不到的记为 Unknown）
fn resolve_chapter_topics(
    conn: &Connection,
    groups: &[CurriculumGroup],
) -> AppResult<Vec<ResolvedGroup>> {
    let mut resolved = Vec::with_capacity(groups.len());
    for group in groups {
        let mut codes = Vec::with_capacity(group.codes.len());
        for entry in &group.codes {
            let (name, chapter_details) = match group.kind {
                GroupKind::Chapter => (
                    taxonomy::chapter_name_by_code(conn, &entry.code)?
                        .unwrap_or_else(|| "Unknown".to_string()),
                    None,
                ),
                GroupKind::Topic => match taxonomy::topic_details_by_code(conn, &entry.code)? {
                    Some((topic_name, chapter_code, chapter_name)) => (
                        topic_name,
                        Some(ChapterDetails {
                            code: chapter_code,
                            name: chapter_name,
                        }),
                    ),
                    None => ("Unknown".to_string(), None),
                },
            };
            codes.push(ResolvedCode {
                code: entry.code.clone(),
                qn_count: entry.qn_count,
                name,
                chapter_details,
            });
        }
        resolved.push(ResolvedGroup {
            kind: group.kind,
            codes,
        });
    }
    Ok(resolved)
}
