//! # Exam Paper Gen
//!
//! 一个把考试"设计"编译成可交付试卷的 Rust 服务核心
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 持久化层（Store）
//! - `store/` - 持有唯一的 SQLite 连接，暴露事务与按实体拆分的查询
//! - 序号分配 / 编码分配点由存储事务保证跨请求原子性
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务只管一件事
//! - `CodeGenerationSession` - 章节/知识点/子知识点编码会话
//! - `selection_service` - AI / 手动两种选题策略与缺口台账
//! - `paper_service` - 切套、洗牌、拼装试卷视图
//!
//! ### ③ 生命周期层（Design / Exam）
//! - `DesignService` - draft → closed 状态机，定稿即单事务生成全部试卷
//! - `ExamService` - 考试容器生命周期，started 时向下强制定稿
//!
//! ### ④ 编排层（App）
//! - `app` - 批量导入题库、批量处理设计请求、全局统计
//!
//! ## 模块结构

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::context::{Scope, UserContext};
pub use models::design::{DesignRequest, DesignResult, DesignStatus};
pub use services::{DesignService, ExamService, QuestionService};
pub use store::Store;
