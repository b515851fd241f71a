//! 配置管理
//!
//! 配置来源（优先级从低到高）：内置默认值、`config.toml`、`config.{APP_ENV}.toml`、
//! `SCHOOL_*` 环境变量以及若干常用环境变量。

#[path = "impl.rs"]
mod loader;
mod structs;

pub use structs::*;
