//! 选题服务 —— 流水线的核心算法
//!
//! 两种互斥的选题策略：
//! - AI 模式：忽略每条目配额，把所有命中分组的题目并成一个去重池，
//!   扣除排除名单后随机抽取 套数×每卷题数 道（不足即硬性失败）。
//! - 手动模式：每条目配额之和必须恰好等于每卷题数；各条目独立抽取
//!   配额×套数 道，唯一题目不足时用重复题目补齐并记入缺口台账。
//!
//! 缺口台账只覆盖"降级但仍可出卷"的情形；连一份试卷都凑不齐时
//! 整个操作失败，绝不静默截断。

use std::collections::{BTreeMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, ValidationError};
use crate::models::design::{CurriculumGroup, SelectionOutcome, ShortfallInfo};
use crate::store::questions::{self, QuestionFilter};

/// 一次选题调用的完整输入
#[derive(Debug)]
pub struct SelectionRequest<'a> {
    pub groups: &'a [CurriculumGroup],
    pub is_ai_selected: bool,
    pub filter: QuestionFilter,
    pub no_of_sets: usize,
    pub questions_per_paper: usize,
    pub exclude: &'a [String],
}

/// 执行选题
pub fn select_questions<R: Rng>(
    conn: &Connection,
    request: &SelectionRequest<'_>,
    rng: &mut R,
) -> AppResult<SelectionOutcome> {
    let target_total = request.no_of_sets * request.questions_per_paper;
    info!(
        "选题开始 | AI 模式: {}, 目标总数 (套数×每卷): {}",
        request.is_ai_selected, target_total
    );

    let outcome = if request.is_ai_selected {
        select_ai(conn, request, target_total, rng)?
    } else {
        select_manual(conn, request, rng)?
    };

    // 两种模式共同的兜底检查：去重后凑不齐一份试卷即失败
    let distinct = outcome
        .selected_question_codes
        .iter()
        .collect::<HashSet<_>>()
        .len();
    if distinct < request.questions_per_paper {
        return Err(AppError::Insufficient {
            required: request.questions_per_paper,
            available: distinct,
        });
    }

    info!(
        "选题完成: 入选 {} 道 | 缺口分组 {}",
        outcome.selected_question_codes.len(),
        outcome.shortfall.len()
    );
    Ok(outcome)
}

/// AI 模式：全池去重 + 无放回均匀抽样
fn select_ai<R: Rng>(
    conn: &Connection,
    request: &SelectionRequest<'_>,
    target_total: usize,
    rng: &mut R,
) -> AppResult<SelectionOutcome> {
    debug!("AI 选题模式（忽略 qn_count）");

    // AI 模式下任何条目都不允许携带配额
    for group in request.groups {
        for entry in &group.codes {
            if entry.qn_count.is_some() {
                return Err(AppError::Validation(ValidationError::QnCountNotAllowed {
                    code: entry.code.clone(),
                }));
            }
        }
    }

    let mut pool: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for group in request.groups {
        let codes: Vec<String> = group.codes.iter().map(|c| c.code.clone()).collect();
        let matched = questions::codes_matching(conn, &request.filter, group.kind, &codes)?;
        for code in matched {
            if seen.insert(code.clone()) {
                pool.push(code);
            }
        }
    }

    let excluded: HashSet<&String> = request.exclude.iter().collect();
    pool.retain(|code| !excluded.contains(code));

    if pool.len() < target_total {
        return Err(AppError::Insufficient {
            required: target_total,
            available: pool.len(),
        });
    }

    let selected: Vec<String> = pool
        .choose_multiple(rng, target_total)
        .cloned()
        .collect();

    Ok(SelectionOutcome {
        selected_question_codes: selected,
        shortfall: BTreeMap::new(),
        distribution: BTreeMap::new(),
    })
}

/// 手动模式：逐条目配额抽取 + 不足时重复补齐
fn select_manual<R: Rng>(
    conn: &Connection,
    request: &SelectionRequest<'_>,
    rng: &mut R,
) -> AppResult<SelectionOutcome> {
    debug!("手动选题模式（qn_count 生效）");

    // 每个条目都必须带配额
    for group in request.groups {
        for entry in &group.codes {
            if entry.qn_count.is_none() {
                return Err(AppError::Validation(ValidationError::QnCountRequired {
                    code: entry.code.clone(),
                }));
            }
        }
    }

    // 配额之和必须恰好等于每卷题数（这是单卷配额，不是多套总数）
    let quota_sum: u32 = request
        .groups
        .iter()
        .flat_map(|g| g.codes.iter())
        .map(|c| c.qn_count.unwrap_or(0))
        .sum();
    if quota_sum as usize != request.questions_per_paper {
        return Err(AppError::Validation(ValidationError::QuotaSumMismatch {
            sum: quota_sum,
            expected: request.questions_per_paper as u32,
        }));
    }

    let mut selected_pool: Vec<String> = Vec::new();
    let mut shortfall: BTreeMap<String, ShortfallInfo> = BTreeMap::new();
    let mut distribution: BTreeMap<String, usize> = BTreeMap::new();

    for group in request.groups {
        for entry in &group.codes {
            let required = entry.qn_count.unwrap_or(0) as usize * request.no_of_sets;
            let available = questions::codes_matching(
                conn,
                &request.filter,
                group.kind,
                std::slice::from_ref(&entry.code),
            )?;
            let available_count = available.len();

            info!(
                "[手动] 条目 {}: 需要 {}, 可用 {}",
                entry.code, required, available_count
            );

            let mut selected: Vec<String> = if available_count >= required {
                available.choose_multiple(rng, required).cloned().collect()
            } else {
                let mut picked = available.clone();
                if !available.is_empty() {
                    // 重复补齐：有放回抽样直到配额满足，保证下游分卷不缺题
                    while picked.len() < required {
                        if let Some(repeat) = available.choose(rng) {
                            picked.push(repeat.clone());
                        }
                    }
                }
                shortfall.insert(
                    entry.code.clone(),
                    ShortfallInfo {
                        required,
                        available: available_count,
                        note: "题库唯一题目不足，已用重复题目补足配额。".to_string(),
                    },
                );
                picked
            };

            distribution.insert(entry.code.clone(), selected.len());
            selected_pool.append(&mut selected);
        }
    }

    // 排除名单在最后统一扣除
    let excluded: HashSet<&String> = request.exclude.iter().collect();
    selected_pool.retain(|code| !excluded.contains(code));

    info!(
        "最终入选: {} 道 | 缺口: {:?}",
        selected_pool.len(),
        shortfall.keys().collect::<Vec<_>>()
    );

    Ok(SelectionOutcome {
        selected_question_codes: selected_pool,
        shortfall,
        distribution,
    })
}
