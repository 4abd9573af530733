use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 请求校验错误（调用方可修正）
    Validation(ValidationError),
    /// 题库存量不足（硬性失败，不降级）
    Insufficient { required: usize, available: usize },
    /// 不可变状态被修改
    Immutable(ImmutableError),
    /// 冲突错误（重名、编码碰撞）
    Conflict(ConflictError),
    /// 资源不存在（含越权访问，对调用方不可区分）
    NotFound(NotFoundError),
    /// 持久化错误
    Storage(StorageError),
    /// 其他错误（内部不变量被破坏等）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "校验错误: {}", e),
            AppError::Insufficient {
                required,
                available,
            } => write!(
                f,
                "题目数量不足: 需要 {} 道，过滤后仅剩 {} 道",
                required, available
            ),
            AppError::Immutable(e) => write!(f, "不可变错误: {}", e),
            AppError::Conflict(e) => write!(f, "冲突错误: {}", e),
            AppError::NotFound(e) => write!(f, "未找到: {}", e),
            AppError::Storage(e) => write!(f, "存储错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

/// 请求校验错误
#[derive(Debug)]
pub enum ValidationError {
    /// 手动模式下 qn_count 之和与每卷题数不一致
    QuotaSumMismatch { sum: u32, expected: u32 },
    /// AI 模式下不允许携带 qn_count
    QnCountNotAllowed { code: String },
    /// 手动模式下每个条目必须携带 qn_count
    QnCountRequired { code: String },
    /// 缺少章节/知识点课程配置
    MissingChapterTopics,
    /// 必填字段缺失
    MissingField { field: &'static str },
    /// 试卷不属于该设计
    PaperNotInDesign {
        paper_code: String,
        design_code: String,
    },
    /// 设计状态取值非法（只接受 1=draft / 2=closed）
    InvalidDesignStatus { status: u8 },
    /// 考试容器状态取值非法
    InvalidExamStatus { status: String },
    /// 题目选项数量必须为 4
    BadOptionCount { found: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::QuotaSumMismatch { sum, expected } => {
                write!(
                    f,
                    "手动模式下 qn_count 之和 ({}) 必须等于每卷题数 ({})",
                    sum, expected
                )
            }
            ValidationError::QnCountNotAllowed { code } => {
                write!(f, "AI 模式下条目 {} 不允许携带 qn_count", code)
            }
            ValidationError::QnCountRequired { code } => {
                write!(f, "手动模式下条目 {} 缺少 qn_count", code)
            }
            ValidationError::MissingChapterTopics => {
                write!(f, "chapters_topics 不能为空")
            }
            ValidationError::MissingField { field } => {
                write!(f, "缺少必填字段: {}", field)
            }
            ValidationError::PaperNotInDesign {
                paper_code,
                design_code,
            } => {
                write!(f, "试卷 {} 不属于设计 {}", paper_code, design_code)
            }
            ValidationError::InvalidDesignStatus { status } => {
                write!(f, "设计状态取值非法: {} (只接受 1 或 2)", status)
            }
            ValidationError::InvalidExamStatus { status } => {
                write!(
                    f,
                    "考试状态取值非法: {} (只接受 draft/saved/started/completed)",
                    status
                )
            }
            ValidationError::BadOptionCount { found } => {
                write!(f, "题目必须恰好有 4 个选项，实际 {} 个", found)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// 不可变状态错误
#[derive(Debug)]
pub enum ImmutableError {
    /// 设计已定稿，禁止编辑/删除/重新定稿
    DesignClosed { design_code: String },
    /// 父级考试已开始或已结束，子设计被锁定
    ParentExamLocked { exam_code: String, status: String },
}

impl fmt::Display for ImmutableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImmutableError::DesignClosed { design_code } => {
                write!(f, "设计 {} 已定稿，只有草稿状态可以修改或删除", design_code)
            }
            ImmutableError::ParentExamLocked { exam_code, status } => {
                write!(
                    f,
                    "考试 {} 处于 '{}' 状态，其下的设计不允许修改或删除",
                    exam_code, status
                )
            }
        }
    }
}

impl std::error::Error for ImmutableError {}

/// 冲突错误
#[derive(Debug)]
pub enum ConflictError {
    /// 设计名称重复（同一考试内或全局）
    DuplicateDesignName { name: String, in_exam: bool },
    /// 编码生成碰撞（重试一次后仍冲突）
    CodeCollision { code: String },
}

impl fmt::Display for ConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictError::DuplicateDesignName { name, in_exam } => {
                if *in_exam {
                    write!(f, "该考试内已存在名为 '{}' 的设计", name)
                } else {
                    write!(f, "已存在名为 '{}' 的设计", name)
                }
            }
            ConflictError::CodeCollision { code } => {
                write!(f, "生成的编码 {} 已存在，请重试", code)
            }
        }
    }
}

impl std::error::Error for ConflictError {}

/// 资源不存在错误
///
/// 越权访问与真实不存在返回同一种错误，避免泄露资源是否存在。
#[derive(Debug)]
pub enum NotFoundError {
    Design { code: String },
    Paper { code: String },
    Exam { code: String },
    Question { code: String },
    QuestionInPaper {
        question_code: String,
        paper_code: String,
    },
    Subject { code: String },
    Medium { code: String },
    Board { id: i64 },
    State { id: i64 },
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundError::Design { code } => {
                write!(f, "设计 '{}' 不存在或无权访问", code)
            }
            NotFoundError::Paper { code } => {
                write!(f, "试卷 '{}' 不存在或无权访问", code)
            }
            NotFoundError::Exam { code } => {
                write!(f, "考试 '{}' 不存在或无权访问", code)
            }
            NotFoundError::Question { code } => {
                write!(f, "题目 '{}' 不存在", code)
            }
            NotFoundError::QuestionInPaper {
                question_code,
                paper_code,
            } => {
                write!(f, "试卷 '{}' 中不包含题目 '{}'", paper_code, question_code)
            }
            NotFoundError::Subject { code } => {
                write!(f, "科目编码 '{}' 不存在", code)
            }
            NotFoundError::Medium { code } => {
                write!(f, "授课语言编码 '{}' 不存在", code)
            }
            NotFoundError::Board { id } => write!(f, "考试局 {} 不存在", id),
            NotFoundError::State { id } => write!(f, "邦/州 {} 不存在", id),
        }
    }
}

impl std::error::Error for NotFoundError {}

/// 持久化错误
#[derive(Debug)]
pub enum StorageError {
    /// SQL 执行失败
    Query { source: rusqlite::Error },
    /// JSON 列编解码失败
    Json { source: serde_json::Error },
    /// 文件 IO 失败
    Io { source: std::io::Error },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Query { source } => write!(f, "SQL执行失败: {}", source),
            StorageError::Json { source } => write!(f, "JSON编解码失败: {}", source),
            StorageError::Io { source } => write!(f, "IO失败: {}", source),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Query { source } => Some(source),
            StorageError::Json { source } => Some(source),
            StorageError::Io { source } => Some(source),
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Storage(StorageError::Query { source: err })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(StorageError::Json { source: err })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(StorageError::Io { source: err })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    pub fn design_not_found(code: impl Into<String>) -> Self {
        AppError::NotFound(NotFoundError::Design { code: code.into() })
    }

    pub fn paper_not_found(code: impl Into<String>) -> Self {
        AppError::NotFound(NotFoundError::Paper { code: code.into() })
    }

    pub fn exam_not_found(code: impl Into<String>) -> Self {
        AppError::NotFound(NotFoundError::Exam { code: code.into() })
    }

    pub fn design_closed(design_code: impl Into<String>) -> Self {
        AppError::Immutable(ImmutableError::DesignClosed {
            design_code: design_code.into(),
        })
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        AppError::Other(msg.into())
    }

    /// 是否属于调用方可修正的错误（4xx 语义）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::Insufficient { .. }
                | AppError::Immutable(_)
                | AppError::Conflict(_)
                | AppError::NotFound(_)
        )
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
