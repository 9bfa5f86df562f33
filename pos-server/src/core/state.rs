use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::{Config, Result};
use crate::orders::OrderManager;
use crate::receipts::ReceiptGenerator;
use crate::reports::ReportService;
use crate::store::PosStorage;
use crate::tables::TableManager;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有服务共用同一个 [`PosStorage`] (Arc<Database>)，克隆成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | storage | PosStorage | redb 存储 |
/// | tables | TableManager | 桌台与拼桌 |
/// | orders | OrderManager | 订单状态机 |
/// | receipts | ReceiptGenerator | 小票 |
/// | reports | ReportService | 报表 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    pub storage: PosStorage,
    pub tables: TableManager,
    pub orders: OrderManager,
    pub receipts: ReceiptGenerator,
    pub reports: ReportService,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// 基于已打开的存储组装所有服务
    pub fn with_storage(config: Config, storage: PosStorage) -> Self {
        let receipts = ReceiptGenerator::new(
            storage.clone(),
            config.tax_rate,
            config.timezone,
            config.receipt_correction_window_minutes,
        );
        let tables = TableManager::new(storage.clone());
        let orders = OrderManager::new(storage.clone(), receipts.clone());
        let reports = ReportService::new(storage.clone(), config.timezone);
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self {
            config,
            storage,
            tables,
            orders,
            receipts,
            reports,
            jwt_service,
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/pos.redb)
    /// 3. 各服务
    pub fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;

        let db_path = config.database_path();
        let storage = PosStorage::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Database opened");

        Ok(Self::with_storage(config.clone(), storage))
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
