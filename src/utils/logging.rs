/// 日志工具模块
///
/// 启动时输出运行配置的横幅
use tracing::{info, warn};

use crate::config::Config;
use crate::utils::redact_token;

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 运行配置
/// - `belts`: 课程大纲中的段位名
pub fn log_startup(config: &Config, belts: &[String]) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - DSA 出题工作台");
    info!("🌐 监听地址: {}", config.bind_addr);
    info!("📦 题目仓库: {}", redact_token(&config.repo_url, &config.github_token));
    info!("🤖 模型: {}", config.llm_model_name);
    info!("🥋 段位: {}", belts.join(", "));
    info!(
        "📊 单次最多 {} 道题，每道题最多尝试 {} 次",
        config.max_problems_per_request, config.generation_attempts
    );
    info!("{}", "=".repeat(60));

    if config.llm_api_key.is_empty() {
        warn!("⚠️ 未设置 LLM_API_KEY / GEMINI_API_KEY，出题请求将会失败");
    }
    if config.github_token.is_empty() {
        warn!("⚠️ 未设置 GITHUB_TOKEN，推送将使用本机 git 凭据");
    }
}

/// 记录程序退出信息
pub fn log_shutdown() {
    info!("\n{}", "=".repeat(60));
    info!(
        "👋 服务已停止 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}
