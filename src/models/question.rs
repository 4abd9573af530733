use std::fmt;

use serde::{Deserialize, Serialize};

/// 题目在题库中的审核状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    Approved,
    Review,
    Deleted,
}

impl QuestionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionStatus::Approved => "approved",
            QuestionStatus::Review => "review",
            QuestionStatus::Deleted => "deleted",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "approved" => Some(QuestionStatus::Approved),
            "review" => Some(QuestionStatus::Review),
            "deleted" => Some(QuestionStatus::Deleted),
            _ => None,
        }
    }
}

impl Default for QuestionStatus {
    fn default() -> Self {
        QuestionStatus::Approved
    }
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 持久化的题库记录
///
/// 固定 4 个选项 + 一个正确答案，挂接唯一的知识分类节点；
/// subject/medium/board/state 为冗余外键，用于加速选题过滤。
#[derive(Debug, Clone)]
pub struct QuestionRecord {
    pub id: i64,
    pub question_code: String,
    pub question_text: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,
    pub correct_answer: String,
    pub taxonomy_id: i64,
    pub taxonomy_code: String,
    pub is_active: bool,
    pub status: QuestionStatus,
    pub subject_id: i64,
    pub medium_id: i64,
    pub board_id: i64,
    pub state_id: i64,
    /// 题面/选项挂接的外部媒体地址（随 review 题目的硬删除一并清理）
    pub media_urls: Vec<String>,
}

impl QuestionRecord {
    pub fn options(&self) -> [&str; 4] {
        [&self.option1, &self.option2, &self.option3, &self.option4]
    }
}

/// 题库导入文件（TOML）
///
/// 一个文件 = 一次导入会话：文件头声明上下文，条目只写章节/知识点名称，
/// 编码统一由导入会话生成或复用。
#[derive(Debug, Clone, Deserialize)]
pub struct BankFile {
    pub name: String,
    pub subject_code: String,
    pub subject_name: String,
    pub medium_code: String,
    pub medium_name: String,
    pub board_name: String,
    pub state_name: String,
    pub standard: String,
    #[serde(default)]
    pub questions: Vec<BankQuestion>,
}

/// 题库导入文件中的单道题目
#[derive(Debug, Clone, Deserialize)]
pub struct BankQuestion {
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub chapter: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub subtopic: String,
    #[serde(default)]
    pub status: QuestionStatus,
    #[serde(default)]
    pub media_urls: Vec<String>,
}
