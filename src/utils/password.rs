use crate::config::AppConfig;
use crate::errors::SchoolSystemError;
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHasher, Version};

/// 哈希密码
pub fn hash_password(password: &str) -> Result<String, SchoolSystemError> {
    let config = AppConfig::get();
    let params = Params::new(
        config.argon2.memory_cost,
        config.argon2.time_cost,
        config.argon2.parallelism,
        None,
    )
    .map_err(|e| SchoolSystemError::validation(format!("Argon2 参数错误: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| SchoolSystemError::validation(format!("密码哈希失败: {e}")))?;
    Ok(hash.to_string())
}

/// 生成随机初始密码，满足密码策略
pub fn generate_initial_password() -> String {
    use rand::Rng;
    use rand::distr::Alphanumeric;

    let mut rng = rand::rng();
    loop {
        let candidate: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();
        if crate::utils::validate::validate_password(&candidate).is_ok() {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_salted_argon2id() {
        let first = hash_password("Correct7Horse").unwrap();
        let second = hash_password("Correct7Horse").unwrap();
        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_initial_password_meets_policy() {
        let password = generate_initial_password();
        assert_eq!(password.len(), 16);
        assert!(crate::utils::validate::validate_password(&password).is_ok());
    }
}
