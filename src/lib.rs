//! # hashrs
//!
//! 可插拔的密码哈希库。
//!
//! ## 功能特性
//!
//! - **多算法 provider**: Argon2id、bcrypt、scrypt，每个算法持有自己的
//!   不可变参数集和文本编码的编解码逻辑
//! - **自描述编码**: 哈希字符串内嵌算法标签和全部派生参数，验证不依赖
//!   外部元数据
//! - **格式自动识别**: Manager 通过前缀识别存量哈希的来源算法并分发验证
//! - **随机 / 加权算法选择**: 用于新参数或新算法的灰度发布
//! - **透明迁移**: 登录验证成功后按需用默认算法重新哈希，无需用户重置密码
//! - **常量时间比较**: 摘要比较不泄露时序信息
//!
//! ## Features
//!
//! 本库使用 Cargo features 来允许用户选择性地启用算法：
//!
//! - `argon2` - 启用 Argon2id 支持（默认启用）
//! - `bcrypt` - 启用 bcrypt 支持（默认启用）
//! - `scrypt` - 启用 scrypt 支持（默认启用）
//! - `full` - 启用所有算法
//!
//! ## 基本用法
//!
//! ```rust
//! use hashrs::{Argon2id, Argon2idParams, Bcrypt, Manager};
//!
//! // 示例使用较小的参数以便快速运行；生产环境使用
//! // `Argon2idParams::default()` 的基线参数
//! let argon2 = Argon2id::new(Argon2idParams {
//!     memory_kib: 1024,
//!     iterations: 1,
//!     parallelism: 1,
//!     ..Argon2idParams::default()
//! })
//! .unwrap();
//!
//! let manager = Manager::new(
//!     "argon2id",
//!     vec![argon2.into(), Bcrypt::new(4).unwrap().into()],
//! )
//! .unwrap();
//!
//! // 哈希新密码（使用默认 provider）
//! let encoded = manager.hash(b"my_secure_password").unwrap();
//!
//! // 验证：格式自动识别
//! assert!(manager.verify(b"my_secure_password", &encoded).unwrap());
//! assert!(!manager.verify(b"wrong_password", &encoded).unwrap());
//! ```
//!
//! ## 凭据迁移
//!
//! 存量的 bcrypt 凭据在登录成功时静默迁移到默认算法：
//!
//! ```rust
//! use hashrs::{Argon2id, Argon2idParams, Bcrypt, Manager};
//!
//! let argon2 = Argon2id::new(Argon2idParams {
//!     memory_kib: 1024,
//!     iterations: 1,
//!     parallelism: 1,
//!     ..Argon2idParams::default()
//! })
//! .unwrap();
//! let bcrypt = Bcrypt::new(4).unwrap();
//! let manager = Manager::new("argon2id", vec![argon2.into(), bcrypt.clone().into()]).unwrap();
//!
//! let legacy = bcrypt.hash(b"password").unwrap();
//! let (upgraded, new_encoded) = manager.verify_and_upgrade(b"password", &legacy).unwrap();
//! assert!(upgraded);
//! assert!(new_encoded.unwrap().starts_with("$argon2id$"));
//! ```

pub mod error;
pub mod manager;
pub mod provider;
pub mod random;

pub use error::{ConfigError, Error, Result};

// ============================================================================
// Manager 相关导出
// ============================================================================

pub use manager::{Manager, WeightedChoice};

// ============================================================================
// Provider 相关导出
// ============================================================================

pub use provider::Provider;

#[cfg(feature = "argon2")]
pub use provider::{Argon2id, Argon2idParams};

#[cfg(feature = "bcrypt")]
pub use provider::Bcrypt;

#[cfg(feature = "scrypt")]
pub use provider::{Scrypt, ScryptParams};
