//! 凭据迁移示例
//!
//! 展示如何用 Manager 完成存量 bcrypt 凭据到 Argon2id 的透明迁移。
//!
//! 运行: cargo run --example credential_migration

use hashrs::{Argon2id, Argon2idParams, Bcrypt, Manager};
use std::collections::HashMap;

/// 简单的用户存储（实际应用中应使用数据库）
struct UserStore {
    users: HashMap<String, User>,
}

struct User {
    username: String,
    password_hash: String,
}

impl UserStore {
    fn new() -> Self {
        Self {
            users: HashMap::new(),
        }
    }

    fn insert(&mut self, username: &str, password_hash: String) {
        self.users.insert(
            username.to_string(),
            User {
                username: username.to_string(),
                password_hash,
            },
        );
    }

    fn find(&mut self, username: &str) -> Option<&mut User> {
        self.users.get_mut(username)
    }
}

fn main() {
    // 示例使用较小的参数以便快速运行；生产环境使用默认参数
    let argon2 = Argon2id::new(Argon2idParams {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
        ..Argon2idParams::default()
    })
    .expect("valid argon2id params");
    let bcrypt = Bcrypt::new(6).expect("valid bcrypt cost");

    let manager = Manager::new("argon2id", vec![argon2.into(), bcrypt.clone().into()])
        .expect("valid manager config");

    let mut store = UserStore::new();

    // 1. 模拟历史系统：用户注册时用 bcrypt 存储凭据
    let password = "S3cure!passphrase";
    let legacy_hash = bcrypt.hash(password.as_bytes()).expect("bcrypt hash");
    store.insert("alice", legacy_hash);

    let user = store.find("alice").expect("user exists");
    println!("用户: {}", user.username);
    println!("存量哈希: {}...", &user.password_hash[..20]);
    println!(
        "需要迁移: {}",
        manager.needs_rehash(&user.password_hash)
    );

    // 2. 错误密码登录：验证失败，凭据保持不变
    let (upgraded, _) = manager
        .verify_and_upgrade(b"wrong-password", &user.password_hash)
        .expect("verify");
    println!("\n错误密码登录 -> 迁移: {}", upgraded);

    // 3. 正确密码登录：验证成功并静默迁移到默认的 Argon2id
    let (upgraded, new_hash) = manager
        .verify_and_upgrade(password.as_bytes(), &user.password_hash)
        .expect("verify");
    println!("正确密码登录 -> 迁移: {}", upgraded);

    if let Some(new_hash) = new_hash {
        println!("新哈希: {}...", &new_hash[..30]);
        user.password_hash = new_hash;
    }

    // 4. 之后的登录直接命中新哈希，不再迁移
    let (upgraded, _) = manager
        .verify_and_upgrade(password.as_bytes(), &user.password_hash)
        .expect("verify");
    println!("再次登录 -> 迁移: {}", upgraded);
}
