//! POS Server - 餐厅桌台与订单管理服务
//!
//! # 架构概述
//!
//! 多个前台终端共享同一个桌台/订单池，本服务是唯一的状态机执行者：
//!
//! - **存储** (`store`): redb 嵌入式存储，每个命令一个写事务
//! - **桌台** (`tables`): 开台/清台/预订，拼桌与拆桌
//! - **订单** (`orders`): 订单状态机与支付状态机，现金找零
//! - **小票** (`receipts`): 支付后生成不可变小票，含税额拆分
//! - **报表** (`reports`): 只读销售汇总与看板
//! - **认证** (`auth`): JWT + 权限
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! pos-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、权限
//! ├── store/         # redb 存储与命令上下文
//! ├── tables/        # 桌台状态与拼桌
//! ├── orders/        # 订单生命周期
//! ├── receipts/      # 小票生成与更正
//! ├── reports/       # 销售报表
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志、时间工具
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod orders;
pub mod receipts;
pub mod reports;
pub mod store;
pub mod tables;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use orders::OrderManager;
pub use receipts::ReceiptGenerator;
pub use reports::ReportService;
pub use store::{CommandContext, CommandMetadata, PosStorage};
pub use tables::TableManager;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// Audit log - 记录每一次状态变更及操作人
///
/// 写入 `audit` target，由日志层单独落盘，永不清理。
///
/// ```ignore
/// audit_log!(metadata, "table.join", group.group_id, group.combined_name);
/// ```
#[macro_export]
macro_rules! audit_log {
    ($meta:expr, $action:expr, $resource:expr) => {
        tracing::info!(
            target: "audit",
            operator_id = %$meta.operator_id,
            operator_name = %$meta.operator_name,
            action = $action,
            resource = %$resource,
            "AUDIT"
        );
    };
    ($meta:expr, $action:expr, $resource:expr, $details:expr) => {
        tracing::info!(
            target: "audit",
            operator_id = %$meta.operator_id,
            operator_name = %$meta.operator_name,
            action = $action,
            resource = %$resource,
            details = %$details,
            "AUDIT"
        );
    };
}

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境
///
/// 1. 加载 `.env` (可选)
/// 2. 创建工作目录
/// 3. 初始化日志 (控制台 + work_dir/logs)
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_dir = config.log_dir();
    init_logger_with_file(
        &config.log_level,
        config.log_json,
        Some(&log_dir.to_string_lossy()),
    )?;

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    ____  ____  _____
   / __ \/ __ \/ ___/
  / /_/ / / / /\__ \
 / ____/ /_/ /___/ /
/_/    \____//____/
    "#
    );
}
