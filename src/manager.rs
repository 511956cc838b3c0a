//! Provider 注册表与 Manager
//!
//! Manager 持有「规范小写标识符 → provider」的不可变映射和一个默认
//! 标识符，负责：
//!
//! - 新哈希的算法选择：确定（默认 provider）、指定、均匀随机、加权随机
//! - 存量哈希的格式识别（`$tag$` 前缀 + bcrypt 原生前缀回退）与验证
//! - 验证成功后的透明参数迁移（verify-then-rehash）
//!
//! 随机与加权选择用于新参数或新算法的灰度发布：一部分新凭据落在新
//! provider 上，其余保持现状，配合 [`Manager::verify_and_upgrade`]
//! 在登录时逐步完成迁移。
//!
//! 所有操作都是同步的 CPU 密集调用（哈希派生刻意昂贵），会阻塞调用
//! 线程；Manager 构造后不可变，多线程共享无需加锁。

use std::collections::HashMap;

use crate::error::{ConfigError, Error, Result};
use crate::provider::{Provider, is_bcrypt_native};
use crate::random::{random_index, random_u64_below};

/// 加权选择条目
///
/// 仅在单次 [`Manager::hash_weighted`] 调用中使用。权重为 0 或标识符
/// 未注册的条目会被静默排除，不构成错误——除非排除后候选池为空。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedChoice {
    /// 算法标识符（大小写不敏感）
    pub id: String,
    /// 正权重；单个条目被选中的概率收敛于 weight / total_weight
    pub weight: u32,
}

impl WeightedChoice {
    /// 创建一个加权选择条目
    pub fn new(id: impl Into<String>, weight: u32) -> Self {
        Self {
            id: id.into(),
            weight,
        }
    }
}

/// 密码哈希 Manager
///
/// 在进程启动时构造一次，进程生命周期内存活；构造后注册表和所有
/// provider 参数都不可变。
///
/// # Example
///
/// ```rust
/// use hashrs::{Argon2id, Argon2idParams, Bcrypt, Manager};
///
/// // 使用较小的参数加快示例运行
/// let argon2 = Argon2id::new(Argon2idParams {
///     memory_kib: 1024,
///     iterations: 1,
///     parallelism: 1,
///     ..Argon2idParams::default()
/// })
/// .unwrap();
/// let bcrypt = Bcrypt::new(4).unwrap();
///
/// let manager = Manager::new("argon2id", vec![argon2.into(), bcrypt.into()]).unwrap();
///
/// let encoded = manager.hash(b"correct horse battery staple").unwrap();
/// assert!(encoded.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
///
/// assert!(manager.verify(b"correct horse battery staple", &encoded).unwrap());
/// assert!(!manager.verify(b"wrong", &encoded).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Manager {
    providers: HashMap<String, Provider>,
    default_id: String,
}

impl Manager {
    /// 创建 Manager
    ///
    /// 标识符在注册时小写化；后续所有查找同样以小写进行。
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NoProviders`] - provider 列表为空
    /// - [`ConfigError::InvalidProvider`] - 某个 provider 的标识符为空
    /// - [`ConfigError::DuplicateProviderId`] - 小写化后的标识符重复
    /// - [`ConfigError::UnknownDefaultProvider`] - 默认标识符未注册
    pub fn new(default_id: &str, providers: Vec<Provider>) -> Result<Self> {
        if providers.is_empty() {
            return Err(ConfigError::NoProviders.into());
        }

        let mut map = HashMap::with_capacity(providers.len());
        for provider in providers {
            if provider.id().is_empty() {
                return Err(ConfigError::InvalidProvider.into());
            }
            let id = provider.id().to_lowercase();
            if map.contains_key(&id) {
                return Err(ConfigError::DuplicateProviderId(id).into());
            }
            map.insert(id, provider);
        }

        let default_id = default_id.to_lowercase();
        if !map.contains_key(&default_id) {
            return Err(ConfigError::UnknownDefaultProvider(default_id).into());
        }

        Ok(Self {
            providers: map,
            default_id,
        })
    }

    /// 创建默认的 provider 组合：Argon2id（默认）+ bcrypt
    #[cfg(all(feature = "argon2", feature = "bcrypt"))]
    pub fn with_default_providers() -> Result<Self> {
        use crate::provider::{Argon2id, Bcrypt};

        Self::new(
            "argon2id",
            vec![Argon2id::default().into(), Bcrypt::default().into()],
        )
    }

    /// 创建扩展的 provider 组合：Argon2id（默认）+ bcrypt + scrypt
    #[cfg(all(feature = "argon2", feature = "bcrypt", feature = "scrypt"))]
    pub fn with_extended_providers() -> Result<Self> {
        use crate::provider::{Argon2id, Bcrypt, Scrypt};

        Self::new(
            "argon2id",
            vec![
                Argon2id::default().into(),
                Bcrypt::default().into(),
                Scrypt::default().into(),
            ],
        )
    }

    /// 返回配置的默认 provider 标识符
    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    /// 使用默认 provider 哈希密码
    pub fn hash(&self, password: &[u8]) -> Result<String> {
        self.provider(&self.default_id)?.hash(password)
    }

    /// 使用指定 provider 哈希密码
    ///
    /// # Errors
    ///
    /// provider 未注册时返回 [`Error::UnknownProvider`]。
    pub fn hash_with(&self, id: &str, password: &[u8]) -> Result<String> {
        self.provider(&id.to_lowercase())?.hash(password)
    }

    /// 从候选 provider 中均匀随机选择一个并哈希密码
    ///
    /// 候选池是 `ids` 中已注册的标识符；`ids` 为空时使用全部已注册的
    /// provider。选择使用密码学安全随机源——算法选择影响安全态势，
    /// 不使用普通伪随机数。
    ///
    /// # Returns
    ///
    /// 返回 `(选中的标识符, 编码后的哈希)`。
    ///
    /// # Errors
    ///
    /// 过滤后候选池为空时返回 [`Error::EmptyCandidatePool`]。
    pub fn hash_random(&self, password: &[u8], ids: &[&str]) -> Result<(String, String)> {
        let picked = self.pick_random(ids)?.to_string();
        let encoded = self.provider(&picked)?.hash(password)?;
        Ok((picked, encoded))
    }

    /// 按权重随机选择一个 provider 并哈希密码
    ///
    /// 候选池是权重为正且已注册的条目。从 `[0, total_weight)` 均匀抽取
    /// 随机数 r，沿候选列表累加权重，选中第一个累计权重超过 r 的条目
    /// （标准的反 CDF 加权抽样）。列表顺序只影响平局结构，单个条目的
    /// 选中概率收敛于 weight / total_weight。
    ///
    /// 用于灰度发布，例如 90% 流量继续使用现有算法、10% 切到新算法：
    ///
    /// ```rust
    /// use hashrs::{Argon2id, Argon2idParams, Bcrypt, Manager, WeightedChoice};
    ///
    /// let argon2 = Argon2id::new(Argon2idParams {
    ///     memory_kib: 1024,
    ///     iterations: 1,
    ///     parallelism: 1,
    ///     ..Argon2idParams::default()
    /// })
    /// .unwrap();
    /// let manager = Manager::new(
    ///     "argon2id",
    ///     vec![argon2.into(), Bcrypt::new(4).unwrap().into()],
    /// )
    /// .unwrap();
    ///
    /// let choices = [
    ///     WeightedChoice::new("bcrypt", 90),
    ///     WeightedChoice::new("argon2id", 10),
    /// ];
    /// let (picked, encoded) = manager.hash_weighted(b"my_password", &choices).unwrap();
    /// assert!(picked == "argon2id" || picked == "bcrypt");
    /// assert!(manager.verify(b"my_password", &encoded).unwrap());
    /// ```
    ///
    /// # Errors
    ///
    /// 过滤后候选池为空时返回 [`Error::EmptyCandidatePool`]。
    pub fn hash_weighted(
        &self,
        password: &[u8],
        choices: &[WeightedChoice],
    ) -> Result<(String, String)> {
        let picked = self.pick_weighted(choices)?.to_string();
        let encoded = self.provider(&picked)?.hash(password)?;
        Ok((picked, encoded))
    }

    /// 验证密码
    ///
    /// 通过编码字符串的前缀识别产生它的 provider 并委托验证。密码不
    /// 匹配返回 `Ok(false)`，不是错误。
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownFormat`] - 字符串无法归属到任何已注册 provider
    /// - [`Error::MalformedEncoding`] - 标签匹配但结构损坏
    pub fn verify(&self, password: &[u8], encoded: &str) -> Result<bool> {
        match self.detect(encoded) {
            (Some(provider), _) => provider.verify(password, encoded),
            (None, id) => Err(Error::UnknownFormat(id)),
        }
    }

    /// 检查存量哈希是否应该迁移
    ///
    /// 以下任一情况返回 `true`：
    ///
    /// - 字符串无法归属到任何已注册 provider
    /// - 识别出的 provider 不是配置的默认 provider
    /// - provider 报告嵌入参数与当前配置不一致
    pub fn needs_rehash(&self, encoded: &str) -> bool {
        match self.detect(encoded) {
            (Some(provider), _) => {
                provider.id() != self.default_id || provider.needs_rehash(encoded)
            }
            (None, _) => true,
        }
    }

    /// 验证密码，成功后按需用默认 provider 重新哈希
    ///
    /// 先调用 [`verify`](Self::verify)；验证失败或出错时立即返回
    /// `upgraded = false`。验证成功且 [`needs_rehash`](Self::needs_rehash)
    /// 判定需要迁移时，用默认 provider 重新哈希并返回
    /// `(true, Some(新编码))`。
    ///
    /// 该路径支持在登录成功时静默完成凭据参数迁移，无需强制用户重置
    /// 密码。注意密码错误与「验证成功但无需迁移」都返回
    /// `Ok((false, None))`——需要区分时先单独调用 `verify`。
    ///
    /// # Example
    ///
    /// ```rust
    /// use hashrs::{Argon2id, Argon2idParams, Bcrypt, Manager};
    ///
    /// let argon2 = Argon2id::new(Argon2idParams {
    ///     memory_kib: 1024,
    ///     iterations: 1,
    ///     parallelism: 1,
    ///     ..Argon2idParams::default()
    /// })
    /// .unwrap();
    /// let bcrypt = Bcrypt::new(4).unwrap();
    /// let manager = Manager::new("argon2id", vec![argon2.into(), bcrypt.clone().into()]).unwrap();
    ///
    /// // 存量凭据还是 bcrypt 哈希
    /// let legacy = bcrypt.hash(b"my_password").unwrap();
    ///
    /// // 登录成功后透明迁移到默认的 Argon2id
    /// let (upgraded, new_encoded) = manager
    ///     .verify_and_upgrade(b"my_password", &legacy)
    ///     .unwrap();
    /// assert!(upgraded);
    /// let new_encoded = new_encoded.unwrap();
    /// assert!(new_encoded.starts_with("$argon2id$"));
    /// assert!(manager.verify(b"my_password", &new_encoded).unwrap());
    /// ```
    pub fn verify_and_upgrade(
        &self,
        password: &[u8],
        encoded: &str,
    ) -> Result<(bool, Option<String>)> {
        if !self.verify(password, encoded)? {
            return Ok((false, None));
        }
        if self.needs_rehash(encoded) {
            let new_encoded = self.hash(password)?;
            return Ok((true, Some(new_encoded)));
        }
        Ok((false, None))
    }

    // ========================================================================
    // 内部实现
    // ========================================================================

    fn provider(&self, id: &str) -> Result<&Provider> {
        self.providers
            .get(id)
            .ok_or_else(|| Error::UnknownProvider(id.to_string()))
    }

    /// 识别产生编码字符串的 provider
    ///
    /// 提取前导 `$tag$` 标签并小写化后查注册表；查不到时回退检查
    /// bcrypt 原生前缀。返回 provider（可能不存在）和用于错误信息的
    /// 标识符。
    fn detect(&self, encoded: &str) -> (Option<&Provider>, String) {
        let mut id = extract_tag(encoded)
            .map(|tag| tag.to_lowercase())
            .unwrap_or_default();
        if !self.providers.contains_key(&id) && is_bcrypt_native(encoded) {
            id = "bcrypt".to_string();
        }
        (self.providers.get(&id), id)
    }

    fn pick_random(&self, ids: &[&str]) -> Result<&str> {
        let pool: Vec<&str> = if ids.is_empty() {
            self.providers.keys().map(String::as_str).collect()
        } else {
            let mut filtered = Vec::with_capacity(ids.len());
            for id in ids {
                let key = id.to_lowercase();
                if let Some((registered, _)) = self.providers.get_key_value(&key) {
                    filtered.push(registered.as_str());
                }
            }
            filtered
        };
        if pool.is_empty() {
            return Err(Error::EmptyCandidatePool);
        }
        Ok(pool[random_index(pool.len())?])
    }

    fn pick_weighted(&self, choices: &[WeightedChoice]) -> Result<&str> {
        let mut pool: Vec<(&str, u32)> = Vec::with_capacity(choices.len());
        let mut total: u64 = 0;
        for choice in choices {
            if choice.weight == 0 {
                continue;
            }
            let key = choice.id.to_lowercase();
            let Some((registered, _)) = self.providers.get_key_value(&key) else {
                continue;
            };
            pool.push((registered.as_str(), choice.weight));
            total += u64::from(choice.weight);
        }
        if pool.is_empty() {
            return Err(Error::EmptyCandidatePool);
        }

        // 反 CDF 抽样：r 落在哪个累计权重区间就选哪个候选
        let r = random_u64_below(total)?;
        let mut acc: u64 = 0;
        for (id, weight) in &pool {
            acc += u64::from(*weight);
            if r < acc {
                return Ok(id);
            }
        }
        // r 严格小于权重总和，循环必定命中
        Err(Error::internal("weighted selection failed"))
    }
}

/// 从 `$tag$...` 形式的编码中提取前导标签
fn extract_tag(encoded: &str) -> Option<&str> {
    let rest = encoded.strip_prefix('$')?;
    let (tag, _) = rest.split_once('$')?;
    if tag.is_empty() || !tag.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    Some(tag)
}
