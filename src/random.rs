//! 安全随机数模块
//!
//! 提供密码学安全的随机字节生成与无偏的有界随机抽取，用于盐值生成和
//! provider 的随机/加权选择。所有随机数都来自操作系统 CSPRNG；随机源
//! 失败会作为 [`Error::EntropyFailure`] 直接向调用方传播，绝不降级重试。

use rand::{TryRngCore, rngs::OsRng};

use crate::error::{Error, Result};

/// 生成指定长度的随机字节数组
///
/// 使用操作系统提供的密码学安全随机数生成器 (CSPRNG)。
///
/// # Arguments
///
/// * `length` - 要生成的字节数
///
/// # Example
///
/// ```rust
/// use hashrs::random::generate_random_bytes;
///
/// let bytes = generate_random_bytes(16).unwrap();
/// assert_eq!(bytes.len(), 16);
/// ```
pub fn generate_random_bytes(length: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::EntropyFailure(format!("{:?}", e)))?;
    Ok(bytes)
}

/// 在 `[0, n)` 范围内生成均匀分布的随机数
///
/// 使用拒绝采样，避免直接取模引入的偏差。
///
/// # Arguments
///
/// * `n` - 上界（不包含），必须大于 0
///
/// # Example
///
/// ```rust
/// use hashrs::random::random_u64_below;
///
/// let v = random_u64_below(100).unwrap();
/// assert!(v < 100);
/// ```
pub fn random_u64_below(n: u64) -> Result<u64> {
    if n == 0 {
        return Err(Error::Internal(
            "random_u64_below: n must be positive".to_string(),
        ));
    }

    // zone 是 n 的最大整数倍，落在 zone 之外的抽样被丢弃
    let zone = (u64::MAX / n) * n;
    loop {
        let mut buf = [0u8; 8];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| Error::EntropyFailure(format!("{:?}", e)))?;
        let v = u64::from_le_bytes(buf);
        if v < zone {
            return Ok(v % n);
        }
    }
}

/// 在 `[0, len)` 范围内生成均匀分布的随机下标
pub fn random_index(len: usize) -> Result<usize> {
    random_u64_below(len as u64).map(|v| v as usize)
}

/// 常量时间比较两个字节切片
///
/// 用于摘要比较，防止时序攻击。比较耗时不随首个差异字节的位置变化。
///
/// # Example
///
/// ```rust
/// use hashrs::random::constant_time_compare;
///
/// assert!(constant_time_compare(b"digest", b"digest"));
/// assert!(!constant_time_compare(b"digest", b"other!"));
/// ```
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;
    a.ct_eq(b).into()
}
