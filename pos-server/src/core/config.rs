use std::path::PathBuf;

use chrono_tz::Tz;
use rust_decimal::Decimal;

use crate::auth::JwtConfig;

const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Manila;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./work_dir | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 关闭超时(毫秒) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false (development) | JSON 日志 |
/// | TIMEZONE | Asia/Manila | 业务时区 |
/// | TAX_RATE_PERCENT | 12 | 增值税率 (价格含税) |
/// | RECEIPT_CORRECTION_WINDOW_MINUTES | 30 | 小票可更正时长 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/pos HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
    pub log_level: String,
    pub log_json: bool,
    /// 业务时区 (报表按此时区分日)
    pub timezone: Tz,
    /// 税率 (小数形式, 0.12 = 12%)
    pub tax_rate: Decimal,
    /// 小票生成后允许更正的分钟数
    pub receipt_correction_window_minutes: i64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_dev = environment == "development";

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into()),
            http_port: env_parse("HTTP_PORT", 3000),
            jwt: JwtConfig::default(),
            environment,
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS", 30000),
            shutdown_timeout_ms: env_parse("SHUTDOWN_TIMEOUT_MS", 10000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_parse("LOG_JSON", !is_dev),
            timezone: parse_timezone(std::env::var("TIMEZONE").ok().as_deref()),
            tax_rate: parse_tax_rate(std::env::var("TAX_RATE_PERCENT").ok().as_deref()),
            receipt_correction_window_minutes: env_parse("RECEIPT_CORRECTION_WINDOW_MINUTES", 30),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// work_dir/database/pos.redb
    pub fn database_path(&self) -> PathBuf {
        self.database_dir().join("pos.redb")
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_timezone(value: Option<&str>) -> Tz {
    match value {
        Some(name) => name.parse().unwrap_or_else(|_| {
            tracing::warn!(timezone = %name, "Unknown TIMEZONE, falling back to Asia/Manila");
            DEFAULT_TIMEZONE
        }),
        None => DEFAULT_TIMEZONE,
    }
}

/// "12" → 0.12; 负数或无法解析时回退到 12%
fn parse_tax_rate(value: Option<&str>) -> Decimal {
    let default = Decimal::new(12, 2);
    match value {
        Some(raw) => match raw.trim().parse::<Decimal>() {
            Ok(percent) if percent >= Decimal::ZERO => percent / Decimal::ONE_HUNDRED,
            _ => {
                tracing::warn!(value = %raw, "Invalid TAX_RATE_PERCENT, falling back to 12");
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tax_rate() {
        assert_eq!(parse_tax_rate(None), Decimal::new(12, 2));
        assert_eq!(parse_tax_rate(Some("5")), Decimal::new(5, 2));
        assert_eq!(parse_tax_rate(Some("7.5")), Decimal::new(75, 3));
        assert_eq!(parse_tax_rate(Some("-1")), Decimal::new(12, 2));
        assert_eq!(parse_tax_rate(Some("abc")), Decimal::new(12, 2));
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone(None), chrono_tz::Asia::Manila);
        assert_eq!(parse_timezone(Some("Europe/Madrid")), chrono_tz::Europe::Madrid);
        assert_eq!(parse_timezone(Some("Mars/Olympus")), chrono_tz::Asia::Manila);
    }

    #[test]
    fn test_paths_under_work_dir() {
        let mut config = Config::from_env();
        config.work_dir = "/tmp/pos".into();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/pos/database/pos.redb"));
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/pos/logs"));
    }
}
