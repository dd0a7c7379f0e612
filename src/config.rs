/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// HTTP 服务监听地址
    pub bind_addr: String,
    /// 题目仓库地址
    pub repo_url: String,
    /// GitHub 访问令牌（为空时使用本机 git 凭据）
    pub github_token: String,
    /// 本地仓库克隆目录
    pub repos_dir: String,
    /// 提交作者（两项都设置时才生效）
    pub git_user_name: Option<String>,
    pub git_user_email: Option<String>,
    /// 生成历史文件
    pub history_file: String,
    /// 定时提交任务文件
    pub scheduled_jobs_file: String,
    /// CSV 跟踪表
    pub tracking_sheet_file: String,
    /// 自定义课程大纲（TOML），为空时使用内置大纲
    pub syllabus_file: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 生成配置 ---
    /// 单次请求最多生成的题目数量
    pub max_problems_per_request: usize,
    /// 每道题寻找不重复标题的尝试次数
    pub generation_attempts: usize,
    /// 定时任务检查间隔（秒）
    pub scheduler_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            repo_url: "https://github.com/prasanna192005/DSA-Auto.git".to_string(),
            github_token: String::new(),
            repos_dir: "repositories".to_string(),
            git_user_name: None,
            git_user_email: None,
            history_file: "generation_history.json".to_string(),
            scheduled_jobs_file: "scheduled_jobs.json".to_string(),
            tracking_sheet_file: "tracking_sheet.csv".to_string(),
            syllabus_file: None,
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-1.5-flash-latest".to_string(),
            max_problems_per_request: 5,
            generation_attempts: 3,
            scheduler_interval_secs: 60,
        }
    }
}

impl Config {
    /// 从环境变量（及 `.env` 文件）加载配置，缺省项使用默认值
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        Self {
            bind_addr: var("BIND_ADDR").unwrap_or(default.bind_addr),
            repo_url: var("REPO_URL").unwrap_or(default.repo_url),
            github_token: var("GITHUB_TOKEN").unwrap_or(default.github_token),
            repos_dir: var("REPOS_DIR").unwrap_or(default.repos_dir),
            git_user_name: var("GIT_USER_NAME").filter(|v| !v.trim().is_empty()),
            git_user_email: var("GIT_USER_EMAIL").filter(|v| !v.trim().is_empty()),
            history_file: var("HISTORY_FILE").unwrap_or(default.history_file),
            scheduled_jobs_file: var("SCHEDULED_JOBS_FILE").unwrap_or(default.scheduled_jobs_file),
            tracking_sheet_file: var("TRACKING_SHEET_FILE").unwrap_or(default.tracking_sheet_file),
            syllabus_file: var("SYLLABUS_FILE").filter(|v| !v.trim().is_empty()),
            verbose_logging: parse_var(&var, "VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
            llm_api_key: var("LLM_API_KEY")
                .or_else(|| var("GEMINI_API_KEY"))
                .unwrap_or(default.llm_api_key),
            llm_api_base_url: var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            max_problems_per_request: parse_var(&var, "MAX_PROBLEMS_PER_REQUEST")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(default.max_problems_per_request),
            generation_attempts: parse_var(&var, "GENERATION_ATTEMPTS")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(default.generation_attempts),
            scheduler_interval_secs: parse_var(&var, "SCHEDULER_INTERVAL_SECS")
                .filter(|n: &u64| *n > 0)
                .unwrap_or(default.scheduler_interval_secs),
        }
    }
}

fn parse_var<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    var(key).and_then(|v| v.trim().parse().ok())
}
