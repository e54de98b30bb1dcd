use std::fmt;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 批次级错误（整批拒绝执行）
    Batch(BatchError),
    /// 发布后端错误
    Publish(PublishError),
    /// 目录存储错误
    Store(StoreError),
    /// 文件操作错误
    File(FileError),
    /// 配置错误
    Config(ConfigError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Batch(e) => write!(f, "批次错误: {}", e),
            AppError::Publish(e) => write!(f, "发布错误: {}", e),
            AppError::Store(e) => write!(f, "存储错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Batch(e) => Some(e),
            AppError::Publish(e) => Some(e),
            AppError::Store(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Config(e) => Some(e),
        }
    }
}

/// 批次级错误
///
/// 只有这些错误会在任何条目被处理之前拒绝整个批次。
/// 单个条目的失败不会中止批次（见 `BatchPublisher`）。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// 已有批次正在执行，本次调用被立即拒绝（不排队）
    #[error("已有批次正在发布中，请等待当前批次完成")]
    AlreadyRunning,
    /// 发布器尚未初始化（或初始化失败后未重试）
    #[error("发布器尚未初始化，无法开始批量发布")]
    NotInitialized,
    /// 批次条目列表为空
    #[error("批次条目列表不能为空")]
    EmptyBatch,
}

/// 发布后端错误种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishErrorKind {
    /// 账号/cookie 失效
    Auth,
    /// 网络错误
    Network,
    /// 平台拒绝（审核、频率限制等）
    Platform,
    /// 媒体文件被平台拒绝
    MediaRejected,
    /// 浏览器自动化失败
    Browser,
}

impl fmt::Display for PublishErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublishErrorKind::Auth => "账号认证",
            PublishErrorKind::Network => "网络",
            PublishErrorKind::Platform => "平台拒绝",
            PublishErrorKind::MediaRejected => "媒体被拒",
            PublishErrorKind::Browser => "浏览器",
        };
        write!(f, "{}", name)
    }
}

/// 发布后端错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("发布失败 ({kind}): {message}")]
pub struct PublishError {
    pub kind: PublishErrorKind,
    pub message: String,
}

impl PublishError {
    pub fn new(kind: PublishErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(PublishErrorKind::Auth, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PublishErrorKind::Network, message)
    }

    pub fn platform(message: impl Into<String>) -> Self {
        Self::new(PublishErrorKind::Platform, message)
    }

    pub fn media_rejected(message: impl Into<String>) -> Self {
        Self::new(PublishErrorKind::MediaRejected, message)
    }

    pub fn browser(message: impl Into<String>) -> Self {
        Self::new(PublishErrorKind::Browser, message)
    }
}

/// 目录存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 记录不存在
    #[error("视频记录不存在 (id: {id})")]
    NotFound { id: i64 },
    /// 数据库操作失败
    #[error("数据库操作失败: {0}")]
    Database(#[from] sqlx::Error),
    /// 状态字符串无法解析
    #[error("无法解析视频状态: {value}")]
    InvalidStatus { value: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },
    #[error("配置文件解析失败 ({path}): {source}")]
    ParseFailed {
        path: String,
        source: toml::de::Error,
    },
    #[error("账号 cookie 文件不存在: {path}")]
    AccountFileMissing { path: String },
}

// ========== 从常见错误类型转换 ==========

impl From<BatchError> for AppError {
    fn from(err: BatchError) -> Self {
        AppError::Batch(err)
    }
}

impl From<PublishError> for AppError {
    fn from(err: PublishError) -> Self {
        AppError::Publish(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<FileError> for AppError {
    fn from(err: FileError) -> Self {
        AppError::File(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: err,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_error_helpers_set_the_kind() {
        assert_eq!(PublishError::auth("x").kind, PublishErrorKind::Auth);
        assert_eq!(PublishError::network("x").kind, PublishErrorKind::Network);
        assert_eq!(PublishError::platform("x").kind, PublishErrorKind::Platform);
        assert_eq!(
            PublishError::media_rejected("x").kind,
            PublishErrorKind::MediaRejected
        );
        assert_eq!(PublishError::browser("x").kind, PublishErrorKind::Browser);
    }

    #[test]
    fn publish_error_display_names_the_kind() {
        let err = PublishError::media_rejected("视频文件未被页面接收");
        assert_eq!(err.to_string(), "发布失败 (媒体被拒): 视频文件未被页面接收");
    }
}
