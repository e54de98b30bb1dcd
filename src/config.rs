use serde::Deserialize;
use std::path::Path;
use tracing::warn;

use crate::error::ConfigError;

/// 程序配置
///
/// 加载顺序：内置默认值 → `config.toml`（如果存在）→ 环境变量覆盖。
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite 数据库路径
    pub db_path: String,
    /// 视频文件夹（启动时扫描新文件）
    pub video_folder: String,
    /// 支持的视频扩展名
    pub supported_formats: Vec<String>,
    /// 批量发布时条目之间的等待秒数（避免触发平台频率限制）
    pub pacing_interval_secs: u64,
    /// 使用模拟发布器代替真实抖音发布器
    pub simulate_publish: bool,
    /// 演示模式：使用内存存储并预置演示数据
    pub demo_mode: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- 抖音发布器配置 ---
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 抖音账号 cookie 文件路径
    pub account_file: String,
    /// 创作者中心上传页面
    pub upload_url: String,
    /// 描述中没有 `#标签` 时使用的默认标签
    pub default_tags: Vec<String>,
    // --- AI 配置 (Ollama) ---
    /// 是否启用 AI 生成名称/描述
    pub ai_enabled: bool,
    /// Ollama 服务地址（用于可用性探测）
    pub ollama_url: String,
    /// OpenAI 兼容接口地址（Ollama 的 /v1 端点）
    pub ai_api_base_url: String,
    pub ai_api_key: String,
    pub ai_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "videos.db".to_string(),
            video_folder: "videos".to_string(),
            supported_formats: ["mp4", "avi", "mov", "mkv", "wmv", "flv"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            pacing_interval_secs: 5,
            simulate_publish: false,
            demo_mode: false,
            verbose_logging: false,
            output_log_file: "publish_log.txt".to_string(),
            browser_debug_port: 9222,
            account_file: "accounts/douyin_account.json".to_string(),
            upload_url: "https://creator.douyin.com/creator-micro/content/upload".to_string(),
            default_tags: ["电吉他伴奏", "吉他即兴伴奏", "伴奏"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ai_enabled: false,
            ollama_url: "http://localhost:11434".to_string(),
            ai_api_base_url: "http://localhost:11434/v1".to_string(),
            ai_api_key: "ollama".to_string(),
            ai_model_name: "qwen3:8b".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：`config.toml`（可选）+ 环境变量覆盖
    pub fn load() -> Self {
        let base = match Self::from_file("config.toml") {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(e) => {
                warn!("⚠️ 配置文件加载失败，使用默认配置: {}", e);
                Self::default()
            }
        };
        base.apply_env()
    }

    /// 从 TOML 文件加载配置，文件不存在时返回 `Ok(None)`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::ParseFailed {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Some(config))
    }

    /// 应用环境变量覆盖
    pub fn apply_env(self) -> Self {
        Self {
            db_path: std::env::var("DB_PATH").unwrap_or(self.db_path),
            video_folder: std::env::var("VIDEO_FOLDER").unwrap_or(self.video_folder),
            pacing_interval_secs: env_parse("PACING_INTERVAL_SECS", self.pacing_interval_secs),
            simulate_publish: env_parse("SIMULATE_PUBLISH", self.simulate_publish),
            demo_mode: env_parse("DEMO_MODE", self.demo_mode),
            verbose_logging: env_parse("VERBOSE_LOGGING", self.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            browser_debug_port: env_parse("BROWSER_DEBUG_PORT", self.browser_debug_port),
            account_file: std::env::var("ACCOUNT_FILE").unwrap_or(self.account_file),
            upload_url: std::env::var("UPLOAD_URL").unwrap_or(self.upload_url),
            ai_enabled: env_parse("AI_ENABLED", self.ai_enabled),
            ollama_url: std::env::var("OLLAMA_URL").unwrap_or(self.ollama_url),
            ai_api_base_url: std::env::var("AI_API_BASE_URL").unwrap_or(self.ai_api_base_url),
            ai_api_key: std::env::var("AI_API_KEY").unwrap_or(self.ai_api_key),
            ai_model_name: std::env::var("AI_MODEL_NAME").unwrap_or(self.ai_model_name),
            supported_formats: self.supported_formats,
            default_tags: self.default_tags,
        }
    }

    /// 判断扩展名是否为支持的视频格式（不区分大小写）
    pub fn is_supported_format(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.supported_formats.iter().any(|f| f == &ext)
            })
            .unwrap_or(false)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
