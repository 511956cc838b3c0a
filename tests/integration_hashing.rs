//! 集成测试：多算法哈希与格式识别
//!
//! 覆盖从构造 Manager 到哈希、识别、验证的完整路径。
//! 测试统一使用较小的派生参数以加快运行。

#![cfg(all(feature = "argon2", feature = "bcrypt", feature = "scrypt"))]

use hashrs::{
    Argon2id, Argon2idParams, Bcrypt, ConfigError, Error, Manager, Scrypt, ScryptParams,
};

/// 测试参数：结构与生产基线一致，派生代价低
fn small_argon2id() -> Argon2id {
    Argon2id::new(Argon2idParams {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
        ..Argon2idParams::default()
    })
    .unwrap()
}

fn small_scrypt() -> Scrypt {
    Scrypt::new(ScryptParams {
        n: 1024,
        ..ScryptParams::default()
    })
    .unwrap()
}

fn manager() -> Manager {
    Manager::new(
        "argon2id",
        vec![
            small_argon2id().into(),
            Bcrypt::new(4).unwrap().into(),
            small_scrypt().into(),
        ],
    )
    .unwrap()
}

/// URL 安全 Base64 字母表（无填充）
fn is_b64url(field: &str) -> bool {
    !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// 端到端：哈希的编码形态与验证行为
#[test]
fn test_end_to_end_encoded_shape() {
    let manager = manager();
    let password = b"correct horse battery staple";

    // 1. 默认 provider 产出 PHC 格式的 Argon2id 哈希
    let encoded = manager.hash(password).unwrap();
    assert!(encoded.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));

    // 2. 字段结构：$argon2id$v=19$m=..,t=..,p=..$salt$digest
    let fields: Vec<&str> = encoded.split('$').collect();
    assert_eq!(fields.len(), 6);
    assert!(is_b64url(fields[4]), "salt field: {:?}", fields[4]);
    assert!(is_b64url(fields[5]), "digest field: {:?}", fields[5]);

    // 3. 验证通过，错误密码失败且无错误
    assert!(manager.verify(password, &encoded).unwrap());
    assert!(!manager.verify(b"wrong", &encoded).unwrap());
}

/// 所有 provider 的往返与互不匹配
#[test]
fn test_round_trip_all_providers() {
    let manager = manager();

    for id in ["argon2id", "bcrypt", "scrypt"] {
        let encoded = manager.hash_with(id, b"round_trip_password").unwrap();
        assert!(
            manager.verify(b"round_trip_password", &encoded).unwrap(),
            "round trip failed for {}",
            id
        );
        assert!(
            !manager.verify(b"different_password", &encoded).unwrap(),
            "negative verify failed for {}",
            id
        );
    }
}

/// 格式识别：各算法的哈希都能被自动归属
#[test]
fn test_format_autodetection() {
    let manager = manager();

    let argon2_hash = manager.hash_with("argon2id", b"pw").unwrap();
    let bcrypt_hash = manager.hash_with("bcrypt", b"pw").unwrap();
    let scrypt_hash = manager.hash_with("scrypt", b"pw").unwrap();

    assert!(argon2_hash.starts_with("$argon2id$"));
    assert!(bcrypt_hash.starts_with("$2"));
    assert!(scrypt_hash.starts_with("$scrypt$"));

    // bcrypt 的原生格式没有注册表标签，依赖前缀回退识别
    assert!(manager.verify(b"pw", &bcrypt_hash).unwrap());
    assert!(manager.verify(b"pw", &argon2_hash).unwrap());
    assert!(manager.verify(b"pw", &scrypt_hash).unwrap());
}

/// 无法识别或损坏的字符串：报错而不是 panic
#[test]
fn test_invalid_strings_surface_errors() {
    let manager = manager();

    // 完全无法归属
    for case in ["", "not-a-real-hash", "plain$text", "$md5$abc"] {
        assert!(
            matches!(manager.verify(b"pw", case), Err(Error::UnknownFormat(_))),
            "case {:?}",
            case
        );
    }

    // 标签匹配但结构损坏
    for case in [
        "$argon2id$v=19$m=oops,t=1,p=1$a$b",
        "$scrypt$N=1024$c2FsdA$ZGlnZXN0",
        "$2b$xx$tooshort",
    ] {
        assert!(
            matches!(
                manager.verify(b"pw", case),
                Err(Error::MalformedEncoding(_))
            ),
            "case {:?}",
            case
        );
    }
}

/// Manager 构造约束
#[test]
fn test_manager_construction_rules() {
    // 重复标识符
    let result = Manager::new(
        "bcrypt",
        vec![
            Bcrypt::new(4).unwrap().into(),
            Bcrypt::new(10).unwrap().into(),
        ],
    );
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::DuplicateProviderId(_)))
    ));

    // 空列表
    assert!(matches!(
        Manager::new("argon2id", vec![]),
        Err(Error::Config(ConfigError::NoProviders))
    ));

    // 默认 provider 未注册
    assert!(matches!(
        Manager::new("scrypt", vec![Bcrypt::new(4).unwrap().into()]),
        Err(Error::Config(ConfigError::UnknownDefaultProvider(_)))
    ));
}

/// 特殊密码输入
#[test]
fn test_special_password_inputs() {
    let manager = manager();

    // 空密码
    let encoded = manager.hash(b"").unwrap();
    assert!(manager.verify(b"", &encoded).unwrap());
    assert!(!manager.verify(b"not_empty", &encoded).unwrap());

    // Unicode 密码
    let password = "密码测试🔐émoji".as_bytes();
    let encoded = manager.hash(password).unwrap();
    assert!(manager.verify(password, &encoded).unwrap());

    // 超长密码（argon2id 不截断）
    let long = vec![b'a'; 1000];
    let encoded = manager.hash(&long).unwrap();
    assert!(manager.verify(&long, &encoded).unwrap());
    let mut other = long.clone();
    other[999] = b'b';
    assert!(!manager.verify(&other, &encoded).unwrap());
}

/// 同一密码的两次哈希因盐值不同而不同
#[test]
fn test_fresh_salt_per_hash() {
    let manager = manager();

    let hash1 = manager.hash(b"same_password").unwrap();
    let hash2 = manager.hash(b"same_password").unwrap();
    assert_ne!(hash1, hash2);

    assert!(manager.verify(b"same_password", &hash1).unwrap());
    assert!(manager.verify(b"same_password", &hash2).unwrap());
}
