use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 设计生命周期状态
///
/// draft 可自由编辑/删除，closed 一经定稿不可逆转。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesignStatus {
    Draft,
    Closed,
}

impl DesignStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DesignStatus::Draft => "draft",
            DesignStatus::Closed => "closed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(DesignStatus::Draft),
            "closed" => Some(DesignStatus::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for DesignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 课程分组类型：按章节选题或按知识点选题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Chapter,
    Topic,
}

/// 课程分组中的单个条目
///
/// AI 模式下 qn_count 必须为空，手动模式下必须给出。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSelection {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qn_count: Option<u32>,
}

/// 课程分组：一组章节编码或知识点编码
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumGroup {
    #[serde(rename = "type")]
    pub kind: GroupKind,
    pub codes: Vec<CodeSelection>,
}

/// 设计创建/更新请求
///
/// status 沿用接口约定的整数：1 = 存为草稿，2 = 定稿并生成试卷。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignRequest {
    pub exam_name: String,
    pub status: u8,
    pub is_ai_selected: bool,
    pub subject_code: String,
    pub medium_code: String,
    #[serde(default)]
    pub board_id: Option<i64>,
    #[serde(default)]
    pub state_id: Option<i64>,
    #[serde(default)]
    pub exam_mode: Option<String>,
    #[serde(default)]
    pub standard: Option<String>,
    pub total_time: u32,
    pub total_questions: u32,
    pub no_of_sets: u32,
    pub no_of_versions: u32,
    #[serde(default)]
    pub qtn_codes_to_exclude: Vec<String>,
    #[serde(default)]
    pub chapters_topics: Vec<CurriculumGroup>,
}

/// 持久化的设计记录
#[derive(Debug, Clone)]
pub struct DesignRecord {
    pub id: i64,
    pub design_code: String,
    pub design_name: String,
    pub exam_id: Option<i64>,
    pub subject_id: i64,
    pub medium_id: i64,
    pub board_id: Option<i64>,
    pub state_id: Option<i64>,
    pub standard: Option<String>,
    pub exam_mode: Option<String>,
    pub total_time: u32,
    pub total_questions: u32,
    pub no_of_sets: u32,
    pub no_of_versions: u32,
    pub status: DesignStatus,
    pub chapter_topics: Vec<CurriculumGroup>,
    pub questions_to_exclude: Vec<String>,
    pub total_question_codes: Vec<String>,
    pub created_by: i64,
    pub is_active: bool,
}

/// 某分组配额未满足时的缺口记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortfallInfo {
    pub required: usize,
    pub available: usize,
    pub note: String,
}

/// 选题结果：入选编码池 + 缺口台账 + 各分组实际分布
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    /// 入选题目编码；手动模式补齐时可能包含重复编码
    pub selected_question_codes: Vec<String>,
    pub shortfall: BTreeMap<String, ShortfallInfo>,
    pub distribution: BTreeMap<String, usize>,
}

/// 持久化的试卷记录：一份 (设计, 套卷, 版本) 的物理试卷
#[derive(Debug, Clone)]
pub struct PaperRecord {
    pub id: i64,
    pub paper_code: String,
    pub design_id: i64,
    /// 洗牌后的题目编码序列
    pub q_codes: Vec<String>,
    pub total_questions: u32,
    pub total_time: u32,
    pub created_by: i64,
}

// ========== 响应视图 ==========

/// 单个选项视图（A/B/C/D）
#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    pub id: &'static str,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

/// 试卷中的单道题目视图
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub text: String,
    pub options: Vec<OptionView>,
}

/// 单份试卷视图
#[derive(Debug, Clone, Serialize)]
pub struct PaperView {
    pub id: String,
    pub qns: Vec<QuestionView>,
}

/// 解析出名称后的课程条目
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedCode {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qn_count: Option<u32>,
    pub name: String,
    /// 知识点条目附带所属章节信息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_details: Option<ChapterDetails>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChapterDetails {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedGroup {
    #[serde(rename = "type")]
    pub kind: GroupKind,
    pub codes: Vec<ResolvedCode>,
}

/// 设计创建/定稿/查询的统一响应
#[derive(Debug, Clone, Serialize)]
pub struct DesignResult {
    pub exam_name: String,
    pub exam_code: String,
    pub status: DesignStatus,
    pub number_of_sets: u32,
    pub number_of_versions: u32,
    pub no_of_qns: u32,
    pub subject: String,
    pub medium: String,
    pub board_id: Option<i64>,
    pub state_id: Option<i64>,
    pub standard: Option<String>,
    pub exam_mode: Option<String>,
    pub chapters_topics: Vec<ResolvedGroup>,
    pub questions_to_exclude: Vec<String>,
    pub shortfall_info: BTreeMap<String, ShortfallInfo>,
    pub question_papers: Vec<PaperView>,
}

/// 从试卷中移除一道题目的结果
#[derive(Debug, Clone, Serialize)]
pub struct RemovalResult {
    pub question_code: String,
    pub paper_code: String,
    pub design_code: String,
    pub total_questions_in_paper: u32,
    pub total_questions_in_design: u32,
    /// 题目处于 review 状态时会被硬删除
    pub question_deleted: bool,
}
