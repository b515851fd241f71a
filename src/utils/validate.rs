use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}$").expect("Invalid email regex")
});

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    // 用户名长度校验：5 <= x <= 16
    if username.len() < 5 || username.len() > 16 {
        return Err("Username length must be between 5 and 16 characters");
    }
    // 用户名格式校验：只能包含字母、数字、下划线或连字符
    if !USERNAME_RE.is_match(username) {
        return Err("Username must contain only letters, numbers, underscores or hyphens");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    // 邮箱格式校验：必须包含 @ 和 .
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

const WEAK_PASSWORDS: &[&str] = &[
    "password",
    "12345678",
    "123456789",
    "qwerty123",
    "admin123",
    "password1",
    "abcd1234",
];

/// 密码策略：至少 8 个字符，大小写字母与数字各至少一个，且不在常见弱密码表中。
/// 所有不满足的规则会一起返回，以 `; ` 连接。
pub fn validate_password(password: &str) -> Result<(), String> {
    let rules: [(bool, &str); 4] = [
        (
            password.chars().count() >= 8,
            "Password must be at least 8 characters long",
        ),
        (
            password.chars().any(|c| c.is_ascii_uppercase()),
            "Password must contain at least one uppercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_lowercase()),
            "Password must contain at least one lowercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_digit()),
            "Password must contain at least one digit",
        ),
    ];

    let mut errors: Vec<&str> = rules
        .iter()
        .filter(|(ok, _)| !ok)
        .map(|(_, msg)| *msg)
        .collect();

    if WEAK_PASSWORDS
        .iter()
        .any(|weak| password.eq_ignore_ascii_case(weak))
    {
        errors.push("Password is too common, please choose a stronger password");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}

/// 解析课时日期，格式必须为 `YYYY-MM-DD`
pub fn validate_lesson_date(date: &str) -> Result<chrono::NaiveDate, &'static str> {
    if date.len() != 10 {
        return Err("Date must be in YYYY-MM-DD format");
    }
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| "Date must be in YYYY-MM-DD format")
}

pub fn validate_course(course: i32) -> Result<(), &'static str> {
    if course < 1 {
        return Err("Course must be at least 1");
    }
    Ok(())
}

/// 名称类字段：去除首尾空白后不能为空，且不超过 255 字符
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name must not be empty");
    }
    if trimmed.chars().count() > 255 {
        return Err("Name must not exceed 255 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_policy() {
        assert!(validate_password("SecurePass123").is_ok());
        assert!(validate_password("Zhurnal2025").is_ok());

        let err = validate_password("abc").unwrap_err();
        assert!(err.contains("at least 8 characters"));
        assert!(err.contains("uppercase"));
        assert!(err.contains("digit"));
        assert!(!err.contains("lowercase"));
    }

    #[test]
    fn test_common_password_rejected() {
        let err = validate_password("Password1").unwrap_err();
        assert_eq!(
            err,
            "Password is too common, please choose a stronger password"
        );
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("teacher_01").is_ok());
        assert!(validate_username("abc").is_err());
        assert!(validate_username("bad name!").is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("t.ivanova@school.example").is_ok());
        assert!(validate_email("no-at-sign").is_err());
    }

    #[test]
    fn test_lesson_date() {
        assert_eq!(
            validate_lesson_date("2025-03-14"),
            Ok(chrono::NaiveDate::from_ymd_opt(2025, 3, 14).unwrap())
        );
        assert!(validate_lesson_date("2025-3-14").is_err());
        assert!(validate_lesson_date("2025-02-30").is_err());
        assert!(validate_lesson_date("14.03.2025").is_err());
    }

    #[test]
    fn test_course_and_name() {
        assert!(validate_course(1).is_ok());
        assert!(validate_course(0).is_err());
        assert!(validate_name("  Algebra 7B ").is_ok());
        assert!(validate_name("   ").is_err());
    }
}
