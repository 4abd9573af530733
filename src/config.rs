/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// SQLite 数据库文件路径
    pub db_path: String,
    /// 题库 TOML 文件存放目录
    pub bank_folder: String,
    /// 设计请求 TOML 文件存放目录
    pub design_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 随机数种子（不设置则使用系统熵，测试时可固定）
    pub rng_seed: Option<u64>,
    /// 批处理时使用的操作员用户 ID（鉴权在上游完成）
    pub operator_user_id: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "exam_paper.db".to_string(),
            bank_folder: "bank_toml".to_string(),
            design_folder: "design_toml".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            rng_seed: None,
            operator_user_id: 1,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            db_path: std::env::var("DB_PATH").unwrap_or(default.db_path),
            bank_folder: std::env::var("BANK_FOLDER").unwrap_or(default.bank_folder),
            design_folder: std::env::var("DESIGN_FOLDER").unwrap_or(default.design_folder),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            rng_seed: std::env::var("RNG_SEED").ok().and_then(|v| v.parse().ok()),
            operator_user_id: std::env::var("OPERATOR_USER_ID").ok().and_then(|v| v.parse().ok()).unwrap_or(default.operator_user_id),
        }
    }
}
