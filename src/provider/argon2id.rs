//! Argon2id provider
//!
//! 以 PHC 格式编码哈希：
//!
//! ```text
//! $argon2id$v=19$m=<memory_kib>,t=<iterations>,p=<parallelism>$<salt>$<digest>
//! ```
//!
//! 盐值和摘要使用无填充的 URL 安全 Base64，版本号固定为 19。
//! 编码是自描述的：验证只依赖字符串中嵌入的参数，与 provider 当前
//! 配置无关。

use argon2::{Algorithm, Argon2, Params, Version};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

use crate::error::{Error, Result};
use crate::random::{constant_time_compare, generate_random_bytes};

/// Argon2id 参数集
///
/// 构造 [`Argon2id`] 后不可变。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2idParams {
    /// 内存开销（KiB）
    pub memory_kib: u32,
    /// 迭代次数（时间开销）
    pub iterations: u32,
    /// 并行度
    pub parallelism: u32,
    /// 盐值长度（字节）
    pub salt_len: usize,
    /// 摘要长度（字节）
    pub key_len: usize,
}

impl Default for Argon2idParams {
    /// 交互式登录场景的安全基线参数
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024, // 64 MiB
            iterations: 3,
            parallelism: 2,
            salt_len: 16,
            key_len: 32,
        }
    }
}

/// Argon2id provider
///
/// # Example
///
/// ```rust
/// use hashrs::{Argon2id, Argon2idParams};
///
/// // 使用较小的参数加快示例运行
/// let provider = Argon2id::new(Argon2idParams {
///     memory_kib: 1024,
///     iterations: 1,
///     parallelism: 1,
///     ..Argon2idParams::default()
/// })
/// .unwrap();
///
/// let encoded = provider.hash(b"my_password").unwrap();
/// assert!(encoded.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
///
/// assert!(provider.verify(b"my_password", &encoded).unwrap());
/// assert!(!provider.verify(b"wrong_password", &encoded).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Argon2id {
    params: Argon2idParams,
}

impl Default for Argon2id {
    fn default() -> Self {
        Self {
            params: Argon2idParams::default(),
        }
    }
}

impl Argon2id {
    /// 创建使用指定参数的 provider
    ///
    /// # Errors
    ///
    /// 参数超出算法允许的范围时返回
    /// [`ConfigError::InvalidValue`](crate::ConfigError::InvalidValue)。
    pub fn new(params: Argon2idParams) -> Result<Self> {
        Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            Some(params.key_len),
        )
        .map_err(|e| Error::invalid_value("argon2id.params", e.to_string()))?;
        if !(8..=64).contains(&params.salt_len) {
            return Err(Error::invalid_value(
                "argon2id.salt_len",
                "must be between 8 and 64 bytes",
            ));
        }
        Ok(Self { params })
    }

    /// 返回算法标识符
    pub fn id(&self) -> &'static str {
        "argon2id"
    }

    /// 返回配置的参数集
    pub fn params(&self) -> &Argon2idParams {
        &self.params
    }

    /// 哈希密码
    ///
    /// 生成新的随机盐值，在配置参数下派生摘要并渲染为 PHC 字符串。
    pub fn hash(&self, password: &[u8]) -> Result<String> {
        let salt = generate_random_bytes(self.params.salt_len)?;
        let digest = derive(
            password,
            &salt,
            self.params.memory_kib,
            self.params.iterations,
            self.params.parallelism,
            self.params.key_len,
        )
        .map_err(|e| Error::HashFailed(format!("argon2id: {}", e)))?;

        Ok(format!(
            "$argon2id$v=19$m={},t={},p={}${}${}",
            self.params.memory_kib,
            self.params.iterations,
            self.params.parallelism,
            URL_SAFE_NO_PAD.encode(&salt),
            URL_SAFE_NO_PAD.encode(&digest),
        ))
    }

    /// 验证密码
    ///
    /// 按字符串中存储的参数重新派生摘要，与存储的摘要做常量时间比较。
    /// 密码不匹配返回 `Ok(false)`，不是错误。
    pub fn verify(&self, password: &[u8], encoded: &str) -> Result<bool> {
        let decoded = parse_encoded(encoded)?;
        let calc = derive(
            password,
            &decoded.salt,
            decoded.memory_kib,
            decoded.iterations,
            decoded.parallelism,
            decoded.digest.len(),
        )
        .map_err(|e| Error::MalformedEncoding(format!("argon2id: {}", e)))?;
        Ok(constant_time_compare(&calc, &decoded.digest))
    }

    /// 检查哈希是否需要重新生成
    ///
    /// 嵌入的 m/t/p 与当前配置不一致、或字符串无法解析时返回 `true`。
    pub fn needs_rehash(&self, encoded: &str) -> bool {
        match parse_encoded(encoded) {
            Ok(decoded) => {
                decoded.memory_kib != self.params.memory_kib
                    || decoded.iterations != self.params.iterations
                    || decoded.parallelism != self.params.parallelism
            }
            Err(_) => true,
        }
    }
}

/// 在给定参数下派生摘要
fn derive(
    password: &[u8],
    salt: &[u8],
    memory_kib: u32,
    iterations: u32,
    parallelism: u32,
    key_len: usize,
) -> std::result::Result<Vec<u8>, argon2::Error> {
    let params = Params::new(memory_kib, iterations, parallelism, Some(key_len))?;
    let ctx = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let mut out = vec![0u8; key_len];
    ctx.hash_password_into(password, salt, &mut out)?;
    Ok(out)
}

/// 解析后的 PHC 字段
struct Decoded {
    memory_kib: u32,
    iterations: u32,
    parallelism: u32,
    salt: Vec<u8>,
    digest: Vec<u8>,
}

/// 解析 `$argon2id$v=19$m=..,t=..,p=..$salt$digest`
///
/// 按固定分隔符拆分并校验字段数量、数字格式和 Base64 编码；任何
/// 偏离都返回 [`Error::MalformedEncoding`]。
fn parse_encoded(encoded: &str) -> Result<Decoded> {
    let fields: Vec<&str> = encoded.split('$').collect();
    if fields.len() != 6 || !fields[0].is_empty() {
        return Err(malformed("not a valid PHC string"));
    }
    if fields[1] != "argon2id" {
        return Err(malformed("wrong algorithm tag"));
    }
    if fields[2] != "v=19" {
        return Err(malformed("unsupported version"));
    }

    let params: Vec<&str> = fields[3].split(',').collect();
    if params.len() != 3 {
        return Err(malformed("invalid parameter section"));
    }
    let memory_kib = parse_param(params[0], "m=")?;
    let iterations = parse_param(params[1], "t=")?;
    let parallelism = parse_param(params[2], "p=")?;

    let salt = decode_field(fields[4], "salt")?;
    let digest = decode_field(fields[5], "digest")?;

    Ok(Decoded {
        memory_kib,
        iterations,
        parallelism,
        salt,
        digest,
    })
}

/// 解析 `m=65536` 形式的十进制参数
fn parse_param(field: &str, prefix: &str) -> Result<u32> {
    field
        .strip_prefix(prefix)
        .filter(|v| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| malformed("invalid parameter section"))
}

fn decode_field(field: &str, name: &str) -> Result<Vec<u8>> {
    if field.is_empty() {
        return Err(malformed(&format!("empty {} field", name)));
    }
    URL_SAFE_NO_PAD
        .decode(field)
        .map_err(|_| malformed(&format!("invalid {} encoding", name)))
}

fn malformed(msg: &str) -> Error {
    Error::MalformedEncoding(format!("argon2id: {}", msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 测试用的小参数，加快派生速度
    fn small() -> Argon2id {
        Argon2id::new(Argon2idParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
            ..Argon2idParams::default()
        })
        .unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let provider = small();
        let encoded = provider.hash(b"test_password_123").unwrap();

        assert!(encoded.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
        assert!(provider.verify(b"test_password_123", &encoded).unwrap());
        assert!(!provider.verify(b"wrong_password", &encoded).unwrap());
    }

    #[test]
    fn test_verify_uses_stored_params() {
        // 摘要按存储参数重新派生，与 provider 当前配置无关
        let old = small();
        let encoded = old.hash(b"secret").unwrap();

        let current = Argon2id::new(Argon2idParams {
            memory_kib: 2048,
            iterations: 2,
            parallelism: 1,
            ..Argon2idParams::default()
        })
        .unwrap();
        assert!(current.verify(b"secret", &encoded).unwrap());
    }

    #[test]
    fn test_different_hashes_same_password() {
        let provider = small();
        let hash1 = provider.hash(b"same_password").unwrap();
        let hash2 = provider.hash(b"same_password").unwrap();

        // 盐值不同，同一密码的两次哈希不应相同
        assert_ne!(hash1, hash2);
        assert!(provider.verify(b"same_password", &hash1).unwrap());
        assert!(provider.verify(b"same_password", &hash2).unwrap());
    }

    #[test]
    fn test_malformed_encodings_rejected() {
        let provider = small();
        let cases = [
            "",
            "not-a-real-hash",
            "$argon2id$v=19$m=1024,t=1,p=1$only-four-fields",
            "$argon2id$v=18$m=1024,t=1,p=1$c2FsdHNhbHQ$ZGlnZXN0",
            "$argon2i$v=19$m=1024,t=1,p=1$c2FsdHNhbHQ$ZGlnZXN0",
            "$argon2id$v=19$m=abc,t=1,p=1$c2FsdHNhbHQ$ZGlnZXN0",
            "$argon2id$v=19$m=1024,t=1$c2FsdHNhbHQ$ZGlnZXN0",
            "$argon2id$v=19$m=1024,t=1,p=1$$ZGlnZXN0",
            "$argon2id$v=19$m=1024,t=1,p=1$!!!$ZGlnZXN0",
        ];
        for case in cases {
            let result = provider.verify(b"whatever", case);
            assert!(
                matches!(result, Err(Error::MalformedEncoding(_))),
                "case {:?} should be rejected, got {:?}",
                case,
                result
            );
        }
    }

    #[test]
    fn test_needs_rehash_on_param_change() {
        // 64 MiB 配置下，32 MiB 的存量哈希需要迁移
        let current = Argon2id::default();
        let legacy =
            "$argon2id$v=19$m=32768,t=3,p=2$c2FsdHNhbHRzYWx0c2FsdA$ZGlnZXN0ZGlnZXN0ZGlnZXN0ZGlnZXN0ZGlnZXN0ZGk";
        assert!(current.needs_rehash(legacy));

        let matching =
            "$argon2id$v=19$m=65536,t=3,p=2$c2FsdHNhbHRzYWx0c2FsdA$ZGlnZXN0ZGlnZXN0ZGlnZXN0ZGlnZXN0ZGlnZXN0ZGk";
        assert!(!current.needs_rehash(matching));
    }

    #[test]
    fn test_needs_rehash_roundtrip() {
        let provider = small();
        let encoded = provider.hash(b"test").unwrap();
        assert!(!provider.needs_rehash(&encoded));

        // 无法解析的哈希一律视为需要迁移
        assert!(provider.needs_rehash("$2b$12$abcdefghijklmnopqrstuv"));
        assert!(provider.needs_rehash("garbage"));
    }

    #[test]
    fn test_empty_and_unicode_passwords() {
        let provider = small();

        let empty = provider.hash(b"").unwrap();
        assert!(provider.verify(b"", &empty).unwrap());
        assert!(!provider.verify(b"not_empty", &empty).unwrap());

        let password = "密码测试🔐émoji".as_bytes();
        let encoded = provider.hash(password).unwrap();
        assert!(provider.verify(password, &encoded).unwrap());
    }

    #[test]
    fn test_invalid_params_rejected() {
        // 并行度为 0 超出算法允许范围
        let result = Argon2id::new(Argon2idParams {
            parallelism: 0,
            ..Argon2idParams::default()
        });
        assert!(result.is_err());

        let result = Argon2id::new(Argon2idParams {
            salt_len: 4,
            ..Argon2idParams::default()
        });
        assert!(result.is_err());
    }
}
