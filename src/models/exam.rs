use std::fmt;

use serde::{Deserialize, Serialize};

/// 考试容器状态
///
/// 独立于子设计的生命周期；转入 started 时会把所有子设计强制定稿。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamStatus {
    Draft,
    Saved,
    Started,
    Completed,
}

impl ExamStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExamStatus::Draft => "draft",
            ExamStatus::Saved => "saved",
            ExamStatus::Started => "started",
            ExamStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ExamStatus::Draft),
            "saved" => Some(ExamStatus::Saved),
            "started" => Some(ExamStatus::Started),
            "completed" => Some(ExamStatus::Completed),
            _ => None,
        }
    }

    /// 该状态下子设计是否被锁定
    pub fn locks_designs(self) -> bool {
        matches!(self, ExamStatus::Started | ExamStatus::Completed)
    }
}

impl fmt::Display for ExamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 持久化的考试容器记录
#[derive(Debug, Clone)]
pub struct ExamRecord {
    pub id: i64,
    pub exam_code: String,
    pub exam_name: String,
    pub total_time: Option<u32>,
    pub exam_mode: Option<String>,
    pub status: ExamStatus,
    pub created_by: i64,
    pub is_active: bool,
}

/// 考试容器更新请求（全部字段可选，缺省表示不变）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExamUpdate {
    pub exam_name: Option<String>,
    pub total_time: Option<u32>,
    pub exam_mode: Option<String>,
    pub status: Option<String>,
}

/// 考试容器视图
#[derive(Debug, Clone, Serialize)]
pub struct ExamView {
    pub exam_code: String,
    pub exam_name: String,
    pub total_time: Option<u32>,
    /// 所有子设计每卷题数之和
    pub total_questions: u32,
    pub exam_mode: Option<String>,
    pub status: ExamStatus,
}
