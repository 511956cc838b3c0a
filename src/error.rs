//! 统一错误类型模块
//!
//! 提供 hashrs 库中所有操作的错误类型定义。
//!
//! 密码错误不是 error：对于任何格式合法的哈希字符串，`verify` 在密码
//! 不匹配时返回 `Ok(false)`，只有配置、格式和熵源问题才会产生 `Err`。

use std::fmt;

/// hashrs 库的统一结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// Manager 构造阶段的配置错误
///
/// 这些错误在进程启动时一次性暴露，属于致命的配置问题。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 没有配置任何 provider
    NoProviders,

    /// provider 无效（标识符为空）
    InvalidProvider,

    /// 两个 provider 的标识符（小写化后）重复
    DuplicateProviderId(String),

    /// 默认 provider 未在注册表中
    UnknownDefaultProvider(String),

    /// 无效的参数值
    InvalidValue {
        /// 参数名，如 `bcrypt.cost`
        key: String,
        /// 失败原因
        message: String,
    },
}

/// hashrs 库的错误类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// 配置错误（构造 Manager 或 provider 时）
    Config(ConfigError),

    /// 请求了未注册的 provider
    UnknownProvider(String),

    /// 候选池过滤后为空
    EmptyCandidatePool,

    /// 哈希字符串无法归属到任何已注册的 provider
    UnknownFormat(String),

    /// 哈希字符串匹配了某个 provider 的标签，但结构或编码损坏
    MalformedEncoding(String),

    /// 安全随机源失败
    EntropyFailure(String),

    /// 哈希派生失败
    HashFailed(String),

    /// 内部错误
    Internal(String),
}

impl Error {
    /// 创建一个参数值配置错误
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config(ConfigError::InvalidValue {
            key: key.into(),
            message: message.into(),
        })
    }

    /// 创建一个内部错误
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}

// ============================================================================
// Display 实现
// ============================================================================

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoProviders => write!(f, "at least one provider is required"),
            ConfigError::InvalidProvider => write!(f, "invalid provider"),
            ConfigError::DuplicateProviderId(id) => {
                write!(f, "duplicate provider id {:?}", id)
            }
            ConfigError::UnknownDefaultProvider(id) => {
                write!(f, "default provider {:?} not registered", id)
            }
            ConfigError::InvalidValue { key, message } => {
                write!(f, "invalid value for '{}': {}", key, message)
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config error: {}", e),
            Error::UnknownProvider(id) => write!(f, "provider {:?} not registered", id),
            Error::EmptyCandidatePool => write!(f, "no valid providers to choose from"),
            Error::UnknownFormat(tag) => write!(f, "unknown hash format (tag={:?})", tag),
            Error::MalformedEncoding(msg) => write!(f, "malformed hash encoding: {}", msg),
            Error::EntropyFailure(msg) => write!(f, "secure random source failed: {}", msg),
            Error::HashFailed(msg) => write!(f, "hash derivation failed: {}", msg),
            Error::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

// ============================================================================
// std::error::Error 实现
// ============================================================================

impl std::error::Error for ConfigError {}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => Some(e),
            _ => None,
        }
    }
}

// ============================================================================
// From 实现 - 方便错误转换
// ============================================================================

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = Error::Config(ConfigError::DuplicateProviderId("argon2id".to_string()));
        assert_eq!(
            err.to_string(),
            "config error: duplicate provider id \"argon2id\""
        );
    }

    #[test]
    fn test_unknown_format_display() {
        let err = Error::UnknownFormat("md5".to_string());
        assert_eq!(err.to_string(), "unknown hash format (tag=\"md5\")");
    }

    #[test]
    fn test_error_from_config() {
        let cfg_err = ConfigError::NoProviders;
        let err: Error = cfg_err.into();
        assert!(matches!(err, Error::Config(ConfigError::NoProviders)));
    }

    #[test]
    fn test_error_source() {
        use std::error::Error as _;

        let err = Error::Config(ConfigError::InvalidProvider);
        assert!(err.source().is_some());

        let err = Error::EmptyCandidatePool;
        assert!(err.source().is_none());
    }
}
