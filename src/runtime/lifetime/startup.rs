use crate::cache::{
    ObjectCache,
    register::{get_object_cache_plugin, register_builtin_plugins},
};
use crate::config::AppConfig;
use crate::errors::{Result, SchoolSystemError};
use crate::models::users::entities::UserRole;
use crate::models::users::requests::CreateUserRequest;
use crate::storage::Storage;
use crate::utils::password::{generate_initial_password, hash_password};
use std::sync::Arc;
use tracing::{debug, info, warn};

const DEFAULT_CACHE: &str = "moka";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 创建缓存实例，配置的后端不可用时回退到内存缓存
async fn create_cache() -> Result<Arc<dyn ObjectCache>> {
    let cache_type = AppConfig::get().cache.cache_type.as_str();

    let mut candidates = vec![cache_type];
    if cache_type != DEFAULT_CACHE {
        candidates.push(DEFAULT_CACHE);
    }

    for name in candidates {
        let Some(constructor) = get_object_cache_plugin(name) else {
            warn!("Cache backend '{}' not found in registry", name);
            continue;
        };
        match constructor().await {
            Ok(cache) => {
                warn!("Using {} cache backend", name);
                return Ok(Arc::from(cache));
            }
            Err(e) => warn!("Failed to create {} cache: {}", name, e),
        }
    }

    Err(SchoolSystemError::cache_plugin_not_found(format!(
        "No cache backend available (tried: {cache_type})"
    )))
}

/// 数据库中没有任何用户时创建默认管理员
async fn seed_admin(storage: &Arc<dyn Storage>) {
    match storage.count_users().await {
        Ok(count) if count > 0 => {
            debug!(
                "Database already has {} user(s), skipping admin seed",
                count
            );
            return;
        }
        Ok(_) => {
            info!("No users found in database, creating default admin account...");
        }
        Err(e) => {
            warn!("Failed to count users: {}, skipping admin seed", e);
            return;
        }
    }

    // 优先使用环境变量，否则生成一次性密码
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        let pwd = generate_initial_password();
        warn!("==========================================================");
        warn!("  ADMIN PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated admin password: {}", pwd);
        warn!("  Please save this password or set ADMIN_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash admin password: {}, skipping admin seed", e);
            return;
        }
    };

    let admin_request = CreateUserRequest {
        username: "admin".to_string(),
        email: "admin@localhost".to_string(),
        password: password_hash,
        role: UserRole::Admin,
        display_name: Some("Administrator".to_string()),
    };

    match storage.create_user(admin_request).await {
        Ok(user) => info!(
            "Default admin account created (ID: {}, username: {})",
            user.id, user.username
        ),
        Err(e) => warn!("Failed to create admin account: {}", e),
    }
}

/// 准备服务器启动的上下文
pub async fn prepare_server_startup() -> Result<StartupContext> {
    // 重复安装时返回 Err，可以忽略
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = AppConfig::get();
    if config.jwt.secret.is_empty() {
        if config.is_production() {
            return Err(SchoolSystemError::configuration(
                "jwt.secret must be set in production",
            ));
        }
        warn!("jwt.secret is empty, tokens are not secure outside development");
    }

    register_builtin_plugins();
    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
    }

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    seed_admin(&storage).await;

    let cache = create_cache().await?;

    Ok(StartupContext { storage, cache })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support::memory_storage;

    #[tokio::test]
    async fn test_seed_admin_only_once() {
        let storage: Arc<dyn Storage> = Arc::new(memory_storage().await);

        seed_admin(&storage).await;
        seed_admin(&storage).await;

        assert_eq!(storage.count_users().await.unwrap(), 1);
        let admin = storage.get_user_by_username("admin").await.unwrap().unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        assert!(admin.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_cache_falls_back_to_moka() {
        register_builtin_plugins();
        assert!(create_cache().await.is_ok());
    }
}
