//! bcrypt provider
//!
//! bcrypt 使用算法自身的原生自描述格式（`$2a$` / `$2b$` / `$2y$` 前缀），
//! 本模块将其作为不透明字符串整体处理，编码、验证和 cost 提取都委托给
//! 底层 bcrypt 实现，不做字段级拆解。

use bcrypt::{DEFAULT_COST, hash as bcrypt_hash, verify as bcrypt_verify};

use crate::error::{Error, Result};
use crate::provider::is_bcrypt_native;

/// bcrypt provider
///
/// 唯一的参数是 cost 因子（4-31，默认 12）。
///
/// # Example
///
/// ```rust
/// use hashrs::Bcrypt;
///
/// // 使用低 cost 加快示例运行
/// let provider = Bcrypt::new(4).unwrap();
///
/// let encoded = provider.hash(b"my_password").unwrap();
/// assert!(encoded.starts_with("$2"));
///
/// assert!(provider.verify(b"my_password", &encoded).unwrap());
/// assert!(!provider.verify(b"wrong_password", &encoded).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Bcrypt {
    cost: u32,
}

impl Default for Bcrypt {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl Bcrypt {
    /// 创建使用指定 cost 的 provider
    ///
    /// # Errors
    ///
    /// cost 不在 4-31 范围内时返回
    /// [`ConfigError::InvalidValue`](crate::ConfigError::InvalidValue)。
    pub fn new(cost: u32) -> Result<Self> {
        if !(4..=31).contains(&cost) {
            return Err(Error::invalid_value(
                "bcrypt.cost",
                "must be between 4 and 31",
            ));
        }
        Ok(Self { cost })
    }

    /// 返回算法标识符
    pub fn id(&self) -> &'static str {
        "bcrypt"
    }

    /// 返回配置的 cost 因子
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// 哈希密码
    pub fn hash(&self, password: &[u8]) -> Result<String> {
        bcrypt_hash(password, self.cost).map_err(|e| Error::HashFailed(format!("bcrypt: {}", e)))
    }

    /// 验证密码
    ///
    /// 密码不匹配返回 `Ok(false)`；不是 bcrypt 原生格式、或原生格式
    /// 内部损坏时返回
    /// [`Error::MalformedEncoding`](crate::Error::MalformedEncoding)。
    pub fn verify(&self, password: &[u8], encoded: &str) -> Result<bool> {
        if !is_bcrypt_native(encoded) {
            return Err(Error::MalformedEncoding(
                "bcrypt: not a bcrypt string".to_string(),
            ));
        }
        bcrypt_verify(password, encoded)
            .map_err(|e| Error::MalformedEncoding(format!("bcrypt: {}", e)))
    }

    /// 检查哈希是否需要重新生成
    ///
    /// 嵌入的 cost 与当前配置不一致、或字符串不是合法 bcrypt 格式时
    /// 返回 `true`。
    pub fn needs_rehash(&self, encoded: &str) -> bool {
        if !is_bcrypt_native(encoded) {
            return true;
        }
        // cost 位于原生格式的固定偏移，如 `$2b$12$...`
        if let Some(cost_str) = encoded.get(4..6)
            && let Ok(cost) = cost_str.parse::<u32>()
        {
            return cost != self.cost;
        }
        true
    }
}
