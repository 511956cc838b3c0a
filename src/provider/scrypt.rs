//! scrypt provider
//!
//! 以 PHC 风格格式编码哈希：
//!
//! ```text
//! $scrypt$N=<cost>,r=<block_size>,p=<parallelism>$<salt>$<digest>
//! ```
//!
//! 盐值和摘要使用无填充的标准 Base64。工作因子 N 以实际值（2 的幂）
//! 记录在编码中，派生时换算为底层实现需要的 log2 形式。

use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD};
use scrypt::Params as KdfParams;

use crate::error::{Error, Result};
use crate::random::{constant_time_compare, generate_random_bytes};

/// scrypt 参数集
///
/// 构造 [`Scrypt`] 后不可变。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScryptParams {
    /// 工作因子 N，必须是 2 的幂且不小于 2
    pub n: u32,
    /// 块大小 r
    pub r: u32,
    /// 并行度 p
    pub p: u32,
    /// 盐值长度（字节）
    pub salt_len: usize,
    /// 摘要长度（字节）
    pub key_len: usize,
}

impl Default for ScryptParams {
    fn default() -> Self {
        Self {
            n: 1 << 15, // 32768
            r: 8,
            p: 1,
            salt_len: 16,
            key_len: 32,
        }
    }
}

/// scrypt provider
///
/// # Example
///
/// ```rust
/// use hashrs::{Scrypt, ScryptParams};
///
/// // 使用较小的工作因子加快示例运行
/// let provider = Scrypt::new(ScryptParams {
///     n: 1024,
///     ..ScryptParams::default()
/// })
/// .unwrap();
///
/// let encoded = provider.hash(b"my_password").unwrap();
/// assert!(encoded.starts_with("$scrypt$N=1024,r=8,p=1$"));
///
/// assert!(provider.verify(b"my_password", &encoded).unwrap());
/// assert!(!provider.verify(b"wrong_password", &encoded).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Scrypt {
    params: ScryptParams,
}

impl Default for Scrypt {
    fn default() -> Self {
        Self {
            params: ScryptParams::default(),
        }
    }
}

impl Scrypt {
    /// 创建使用指定参数的 provider
    ///
    /// # Errors
    ///
    /// N 不是 2 的幂或参数超出算法允许的范围时返回
    /// [`ConfigError::InvalidValue`](crate::ConfigError::InvalidValue)。
    pub fn new(params: ScryptParams) -> Result<Self> {
        let log_n = log2_exact(params.n)
            .ok_or_else(|| Error::invalid_value("scrypt.n", "must be a power of two >= 2"))?;
        KdfParams::new(log_n, params.r, params.p, params.key_len)
            .map_err(|_| Error::invalid_value("scrypt.params", "invalid scrypt parameters"))?;
        if !(8..=64).contains(&params.salt_len) {
            return Err(Error::invalid_value(
                "scrypt.salt_len",
                "must be between 8 and 64 bytes",
            ));
        }
        Ok(Self { params })
    }

    /// 返回算法标识符
    pub fn id(&self) -> &'static str {
        "scrypt"
    }

    /// 返回配置的参数集
    pub fn params(&self) -> &ScryptParams {
        &self.params
    }

    /// 哈希密码
    pub fn hash(&self, password: &[u8]) -> Result<String> {
        let salt = generate_random_bytes(self.params.salt_len)?;
        let digest = derive(
            password,
            &salt,
            self.params.n,
            self.params.r,
            self.params.p,
            self.params.key_len,
        )
        .map_err(|msg| Error::HashFailed(format!("scrypt: {}", msg)))?;

        Ok(format!(
            "$scrypt$N={},r={},p={}${}${}",
            self.params.n,
            self.params.r,
            self.params.p,
            STANDARD_NO_PAD.encode(&salt),
            STANDARD_NO_PAD.encode(&digest),
        ))
    }

    /// 验证密码
    ///
    /// 按字符串中存储的参数重新派生摘要并做常量时间比较。
    /// 密码不匹配返回 `Ok(false)`，不是错误。
    pub fn verify(&self, password: &[u8], encoded: &str) -> Result<bool> {
        let decoded = parse_encoded(encoded)?;
        let calc = derive(
            password,
            &decoded.salt,
            decoded.n,
            decoded.r,
            decoded.p,
            decoded.digest.len(),
        )
        .map_err(|msg| malformed(msg))?;
        Ok(constant_time_compare(&calc, &decoded.digest))
    }

    /// 检查哈希是否需要重新生成
    ///
    /// N/r/p 或盐值、摘要长度与当前配置不一致、或字符串无法解析时
    /// 返回 `true`。
    pub fn needs_rehash(&self, encoded: &str) -> bool {
        match parse_encoded(encoded) {
            Ok(decoded) => {
                decoded.n != self.params.n
                    || decoded.r != self.params.r
                    || decoded.p != self.params.p
                    || decoded.salt.len() != self.params.salt_len
                    || decoded.digest.len() != self.params.key_len
            }
            Err(_) => true,
        }
    }
}

/// 返回 n 的精确 log2，n 不是 2 的幂（或小于 2）时返回 None
fn log2_exact(n: u32) -> Option<u8> {
    if n >= 2 && n.is_power_of_two() {
        Some(n.trailing_zeros() as u8)
    } else {
        None
    }
}

/// 在给定参数下派生摘要
fn derive(
    password: &[u8],
    salt: &[u8],
    n: u32,
    r: u32,
    p: u32,
    key_len: usize,
) -> std::result::Result<Vec<u8>, &'static str> {
    let log_n = log2_exact(n).ok_or("work factor must be a power of two")?;
    let params = KdfParams::new(log_n, r, p, key_len).map_err(|_| "invalid parameters")?;
    let mut out = vec![0u8; key_len];
    scrypt::scrypt(password, salt, &params, &mut out).map_err(|_| "invalid output length")?;
    Ok(out)
}

/// 解析后的字段
struct Decoded {
    n: u32,
    r: u32,
    p: u32,
    salt: Vec<u8>,
    digest: Vec<u8>,
}

/// 解析 `$scrypt$N=..,r=..,p=..$salt$digest`
fn parse_encoded(encoded: &str) -> Result<Decoded> {
    let fields: Vec<&str> = encoded.split('$').collect();
    if fields.len() != 6 || !fields[0].is_empty() {
        return Err(malformed("not a valid scrypt string"));
    }
    if fields[1] != "scrypt" {
        return Err(malformed("wrong algorithm tag"));
    }

    let params: Vec<&str> = fields[2].split(',').collect();
    if params.len() != 3 {
        return Err(malformed("invalid parameter section"));
    }
    let n = parse_param(params[0], "N=")?;
    let r = parse_param(params[1], "r=")?;
    let p = parse_param(params[2], "p=")?;

    let salt = decode_field(fields[3], "salt")?;
    let digest = decode_field(fields[4], "digest")?;

    Ok(Decoded {
        n,
        r,
        p,
        salt,
        digest,
    })
}

/// 解析 `N=32768` 形式的十进制参数
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
    STANDARD_NO_PAD
        .decode(field)
        .map_err(|_| malformed(&format!("invalid {} encoding", name)))
}

fn malformed(msg: &str) -> Error {
    Error::MalformedEncoding(format!("scrypt: {}", msg))
}
