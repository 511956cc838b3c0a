//! 哈希算法 provider 模块
//!
//! 每个算法家族一个 provider，各自持有不可变的参数集和自己文本编码的
//! 编解码逻辑，新算法的接入不需要改动 Manager 的分发逻辑。
//!
//! ## 支持的算法
//!
//! - **Argon2id** (推荐): 内存硬哈希算法，PHC 格式编码（需启用 `argon2` feature）
//! - **bcrypt**: 经典算法，使用自身的原生自描述格式（需启用 `bcrypt` feature）
//! - **scrypt**: 内存硬哈希算法，适用于受限计算资源（需启用 `scrypt` feature）
//!
//! 所有算法默认启用；provider 集合在编译期封闭，运行期不可增删。

#[cfg(feature = "argon2")]
mod argon2id;
#[cfg(feature = "bcrypt")]
mod bcrypt;
#[cfg(feature = "scrypt")]
mod scrypt;

#[cfg(feature = "argon2")]
pub use self::argon2id::{Argon2id, Argon2idParams};
#[cfg(feature = "bcrypt")]
pub use self::bcrypt::Bcrypt;
#[cfg(feature = "scrypt")]
pub use self::scrypt::{Scrypt, ScryptParams};

use crate::error::Result;

// 编译时检查：至少需要启用一个密码哈希算法
#[cfg(not(any(feature = "argon2", feature = "bcrypt", feature = "scrypt")))]
compile_error!(
    "At least one password hashing algorithm (argon2, bcrypt, or scrypt) must be enabled. Enable one of the password hashing features."
);

/// 已启用的哈希算法 provider
///
/// 一个封闭的算法集合：每个变体包装对应算法的类型，持有该算法的
/// 不可变参数集。构造后不再变化，可在线程间安全共享。
///
/// # Example
///
/// ```rust
/// use hashrs::{Bcrypt, Provider};
///
/// // 使用低 cost 加快示例运行
/// let provider: Provider = Bcrypt::new(4).unwrap().into();
/// assert_eq!(provider.id(), "bcrypt");
///
/// let encoded = provider.hash(b"my_password").unwrap();
/// assert!(provider.verify(b"my_password", &encoded).unwrap());
/// assert!(!provider.verify(b"wrong_password", &encoded).unwrap());
/// ```
#[derive(Debug, Clone)]
pub enum Provider {
    /// Argon2id - 推荐的默认算法
    #[cfg(feature = "argon2")]
    Argon2id(Argon2id),

    /// bcrypt - 经典算法，原生格式
    #[cfg(feature = "bcrypt")]
    Bcrypt(Bcrypt),

    /// scrypt - 内存硬算法
    #[cfg(feature = "scrypt")]
    Scrypt(Scrypt),
}

impl Provider {
    /// 返回算法的规范标识符（小写、稳定、唯一）
    pub fn id(&self) -> &'static str {
        match self {
            #[cfg(feature = "argon2")]
            Provider::Argon2id(p) => p.id(),
            #[cfg(feature = "bcrypt")]
            Provider::Bcrypt(p) => p.id(),
            #[cfg(feature = "scrypt")]
            Provider::Scrypt(p) => p.id(),
        }
    }

    /// 哈希密码
    ///
    /// 生成新的随机盐值，在 provider 的固定参数下派生摘要，并渲染为
    /// 自描述的编码字符串。只有熵源耗尽或派生失败才会返回错误。
    pub fn hash(&self, password: &[u8]) -> Result<String> {
        match self {
            #[cfg(feature = "argon2")]
            Provider::Argon2id(p) => p.hash(password),
            #[cfg(feature = "bcrypt")]
            Provider::Bcrypt(p) => p.hash(password),
            #[cfg(feature = "scrypt")]
            Provider::Scrypt(p) => p.hash(password),
        }
    }

    /// 验证密码
    ///
    /// 用本 provider 的编解码器解析 `encoded`，按其中存储的参数（而非
    /// provider 当前参数）重新派生摘要，并做常量时间比较。
    ///
    /// 密码不匹配返回 `Ok(false)`；字符串不符合本 provider 的完整格式
    /// 返回 [`Error::MalformedEncoding`](crate::Error::MalformedEncoding)。
    pub fn verify(&self, password: &[u8], encoded: &str) -> Result<bool> {
        match self {
            #[cfg(feature = "argon2")]
            Provider::Argon2id(p) => p.verify(password, encoded),
            #[cfg(feature = "bcrypt")]
            Provider::Bcrypt(p) => p.verify(password, encoded),
            #[cfg(feature = "scrypt")]
            Provider::Scrypt(p) => p.verify(password, encoded),
        }
    }

    /// 检查哈希是否需要按当前参数重新生成
    ///
    /// 编码中嵌入的参数与 provider 当前配置不一致、或字符串完全无法
    /// 解析时返回 `true`。
    pub fn needs_rehash(&self, encoded: &str) -> bool {
        match self {
            #[cfg(feature = "argon2")]
            Provider::Argon2id(p) => p.needs_rehash(encoded),
            #[cfg(feature = "bcrypt")]
            Provider::Bcrypt(p) => p.needs_rehash(encoded),
            #[cfg(feature = "scrypt")]
            Provider::Scrypt(p) => p.needs_rehash(encoded),
        }
    }
}

// ============================================================================
// From 实现 - 方便构造
// ============================================================================

#[cfg(feature = "argon2")]
impl From<Argon2id> for Provider {
    fn from(p: Argon2id) -> Self {
        Provider::Argon2id(p)
    }
}

#[cfg(feature = "bcrypt")]
impl From<Bcrypt> for Provider {
    fn from(p: Bcrypt) -> Self {
        Provider::Bcrypt(p)
    }
}

#[cfg(feature = "scrypt")]
impl From<Scrypt> for Provider {
    fn from(p: Scrypt) -> Self {
        Provider::Scrypt(p)
    }
}

/// 判断字符串是否为 bcrypt 原生格式（`$2a$` / `$2b$` / `$2y$` 前缀）
pub(crate) fn is_bcrypt_native(s: &str) -> bool {
    s.starts_with("$2a$") || s.starts_with("$2b$") || s.starts_with("$2y$")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(feature = "argon2")]
    fn test_provider_id_argon2id() {
        let provider: Provider = Argon2id::default().into();
        assert_eq!(provider.id(), "argon2id");
    }

    #[test]
    #[cfg(feature = "bcrypt")]
    fn test_provider_id_bcrypt() {
        let provider: Provider = Bcrypt::default().into();
        assert_eq!(provider.id(), "bcrypt");
    }

    #[test]
    #[cfg(feature = "scrypt")]
    fn test_provider_id_scrypt() {
        let provider: Provider = Scrypt::default().into();
        assert_eq!(provider.id(), "scrypt");
    }

    #[test]
    fn test_is_bcrypt_native() {
        assert!(is_bcrypt_native("$2a$12$abcdefghijklmnopqrstuv"));
        assert!(is_bcrypt_native("$2b$12$abcdefghijklmnopqrstuv"));
        assert!(is_bcrypt_native("$2y$12$abcdefghijklmnopqrstuv"));
        assert!(!is_bcrypt_native("$2x$12$abcdefghijklmnopqrstuv"));
        assert!(!is_bcrypt_native("$argon2id$v=19$m=1024,t=1,p=1$a$b"));
        assert!(!is_bcrypt_native("plain"));
    }
}
