//! 批处理编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责题库导入与设计请求的批量处理。
//!
//! ## 核心流程
//!
//! 1. **应用初始化**：打开数据库、执行迁移、创建各业务服务
//! 2. **题库导入**：扫描题库目录，逐文件导入（一个文件一个编码会话）
//! 3. **设计处理**：扫描设计请求目录，逐请求走 选题 → 组装 → 落库 流水线
//! 4. **全局统计**：汇总导入与组卷结果
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有 Store 的模块，服务共享同一句柄
//! - **请求即任务**：每个设计请求在一个事务内跑完，失败互不影响
//! - **向下委托**：不关心选题/组装细节，委托 services 完成

use anyhow::Result;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::context::UserContext;
use crate::models::design::DesignRequest;
use crate::models::loaders::{load_all_bank_files, load_all_design_requests};
use crate::services::{DesignService, QuestionService};
use crate::store::Store;
use crate::utils::logging::{init_log_file, log_startup, print_final_stats};

/// 应用主结构
pub struct App {
    config: Config,
    question_service: QuestionService,
    design_service: DesignService,
}

/// 处理统计
#[derive(Debug, Default)]
struct RunStats {
    imported_questions: usize,
    success: usize,
    failed: usize,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config);

        // 打开数据库并迁移
        let store = Store::open(&config.db_path)?;

        let question_service = QuestionService::new(store.clone());
        let design_service = DesignService::new(store, &config);

        Ok(Self {
            config,
            question_service,
            design_service,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let mut stats = RunStats::default();

        // 先导入题库，再处理设计请求
        stats.imported_questions = self.import_banks().await;
        self.process_designs(&mut stats).await;

        print_final_stats(
            stats.imported_questions,
            stats.success,
            stats.failed,
            &self.config.output_log_file,
        );

        Ok(())
    }

    /// 导入题库目录下的所有文件
    async fn import_banks(&self) -> usize {
        info!("\n📁 正在扫描题库文件...");
        let banks = match load_all_bank_files(&self.config.bank_folder).await {
            Ok(banks) => banks,
            Err(e) => {
                warn!("⚠️ 题库目录不可用: {}", e);
                return 0;
            }
        };

        let mut imported = 0;
        for bank in &banks {
            match self.question_service.import_bank_file(bank).await {
                Ok(stats) => imported += stats.imported,
                Err(e) => error!("[{}] ❌ 导入失败: {}", bank.name, e),
            }
        }
        imported
    }

    /// 处理设计请求目录下的所有请求
    async fn process_designs(&self, stats: &mut RunStats) {
        info!("\n📁 正在扫描设计请求...");
        let requests = match load_all_design_requests(&self.config.design_folder).await {
            Ok(requests) => requests,
            Err(e) => {
                warn!("⚠️ 设计请求目录不可用: {}", e);
                return;
            }
        };

        if requests.is_empty() {
            warn!("⚠️ 没有找到待处理的设计请求");
            return;
        }
        info!("✓ 找到 {} 个设计请求\n", requests.len());

        let ctx = UserContext::admin(self.config.operator_user_id);
        for (index, request) in requests.iter().enumerate() {
            if self.process_one_design(index + 1, request, &ctx).await {
                stats.success += 1;
            } else {
                stats.failed += 1;
            }
        }
    }

    /// 处理单个设计请求，返回是否成功
    async fn process_one_design(
        &self,
        index: usize,
        request: &DesignRequest,
        ctx: &UserContext,
    ) -> bool {
        info!("\n[设计请求 {}] {}", index, "─".repeat(30));
        info!("[设计请求 {}] 开始处理: {}", index, request.exam_name);

        match self.design_service.create_design(request, ctx, None).await {
            Ok(result) => {
                info!(
                    "[设计请求 {}] ✓ {} 已生成 {} 份试卷",
                    index,
                    result.exam_code,
                    result.question_papers.len()
                );
                for (code, shortfall) in &result.shortfall_info {
                    warn!(
                        "[设计请求 {}] ⚠️ 条目 {} 缺口: 需要 {}, 可用 {}",
                        index, code, shortfall.required, shortfall.available
                    );
                }
                true
            }
            Err(e) => {
                error!("[设计请求 {}] ❌ 处理失败: {}", index, e);
                false
            }
        }
    }
}
