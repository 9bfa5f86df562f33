//! 订单管理
//!
//! # 命令处理流程
//!
//! ```text
//! create_order / transition_status / update_payment
//!     ├─ 1. 校验输入 (事务外)
//!     ├─ 2. 开始写事务
//!     ├─ 3. 幂等检查 (idempotency_key)
//!     ├─ 4. 事务内重新读取实体并检查前置条件
//!     ├─ 5. 状态机转换 (lifecycle)
//!     ├─ 6. 支付时同事务生成小票
//!     └─ 7. 提交，写审计日志
//! ```
//!
//! - [`lifecycle`] - 订单状态机与支付状态机
//! - [`money`] - 金额计算 (rust_decimal)

pub mod error;
pub mod lifecycle;
pub mod money;

pub use error::{OrderError, OrderResult};

use crate::audit_log;
use crate::receipts::ReceiptGenerator;
use crate::store::{CommandContext, CommandMetadata, PosStorage, check_version};
use crate::tables::status;
use lifecycle::PaymentInput;
use rust_decimal::Decimal;
use shared::models::{
    GroupStatus, Order, OrderCreate, OrderQuery, OrderStatus, OrderStatusUpdate, PaymentStatus,
    PaymentUpdate, TableRef, TableStatus,
};

/// Order commands
#[derive(Clone)]
pub struct OrderManager {
    storage: PosStorage,
    receipts: ReceiptGenerator,
}

impl std::fmt::Debug for OrderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderManager")
            .field("receipts", &self.receipts)
            .finish_non_exhaustive()
    }
}

fn creation_key(key: &str) -> String {
    format!("order:{key}")
}

fn payment_key(key: &str) -> String {
    format!("payment:{key}")
}

/// 预付字段必须自洽：没有 payment_method 就不能带任何支付字段
fn validate_prepayment(payload: &OrderCreate) -> OrderResult<()> {
    match (payload.payment_status, payload.payment_method) {
        (Some(PaymentStatus::Refunded), _) => {
            return Err(OrderError::Validation(
                "paymentStatus must be paid or unpaid on creation".to_string(),
            ));
        }
        (Some(PaymentStatus::Paid), None) => return Err(OrderError::MissingPaymentMethod),
        (Some(PaymentStatus::Unpaid), Some(_)) => {
            return Err(OrderError::Validation(
                "paymentMethod requires paymentStatus paid".to_string(),
            ));
        }
        _ => {}
    }
    if payload.payment_method.is_none() {
        let stray = [
            ("amount", payload.amount.is_some()),
            ("cashGiven", payload.cash_given.is_some()),
            ("changeAmount", payload.change_amount.is_some()),
        ];
        if let Some((field, _)) = stray.iter().find(|(_, present)| *present) {
            return Err(OrderError::Validation(format!(
                "{field} requires paymentMethod"
            )));
        }
    }
    Ok(())
}

impl OrderManager {
    pub fn new(storage: PosStorage, receipts: ReceiptGenerator) -> Self {
        Self { storage, receipts }
    }

    /// Create an order at a table or group
    ///
    /// Seats an available table/group implicitly. With `payment_method` the
    /// order is paid (and its receipt generated) in the same transaction.
    /// A repeated `idempotency_key` returns the order created the first time.
    pub fn create_order(&self, payload: &OrderCreate, meta: &CommandMetadata) -> OrderResult<Order> {
        if payload.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        for item in &payload.items {
            money::validate_line_item(item)?;
        }
        validate_prepayment(payload)?;
        let total_amount = money::order_total(&payload.items);

        let (order, created) = self.storage.transact(|ctx| -> OrderResult<_> {
            if let Some(key) = &payload.idempotency_key
                && let Some(order_id) = ctx.processed_command(&creation_key(key))?
            {
                let existing = ctx
                    .get_order(&order_id)?
                    .ok_or_else(|| OrderError::NotFound(order_id.clone()))?;
                return Ok((existing, false));
            }

            let (table_ref, table_label) = self.seat_for_order(ctx, payload, meta)?;
            let mut order = Order {
                order_id: shared::util::new_id(),
                table_ref,
                table_label,
                items: payload.items.clone(),
                status: OrderStatus::Pending,
                payment_status: PaymentStatus::Unpaid,
                payment_method: None,
                amount_paid: None,
                discount_amount: Decimal::ZERO,
                cash_given: None,
                change_amount: None,
                payment_time: None,
                refunded_at: None,
                receipt_id: None,
                notes: payload.notes.clone(),
                is_customer_order: payload.is_customer_order,
                total_amount,
                created_by: meta.operator_name.clone(),
                created_at: meta.timestamp,
                updated_at: meta.timestamp,
                version: 0,
                status_history: vec![],
            };

            // 预付
            if payload.payment_method.is_some() {
                let input = PaymentInput {
                    method: payload.payment_method,
                    discount: None,
                    cash_given: payload.cash_given,
                    change_amount: payload.change_amount,
                };
                self.pay_in(ctx, &mut order, &input, payload.amount, meta)?;
            }

            ctx.put_order(&order)?;
            if let Some(key) = &payload.idempotency_key {
                ctx.mark_command_processed(&creation_key(key), &order.order_id)?;
            }
            Ok((order, true))
        })?;

        if created {
            tracing::info!(
                order_id = %order.order_id,
                table = %order.table_label,
                total = %order.total_amount,
                items = order.items.len(),
                "Order created"
            );
            audit_log!(meta, "order.create", order.order_id, order.table_label);
        } else {
            tracing::warn!(order_id = %order.order_id, "Duplicate order submission");
        }
        Ok(order)
    }

    /// Resolve the order's table reference, seating it if it is available
    fn seat_for_order(
        &self,
        ctx: &CommandContext<'_>,
        payload: &OrderCreate,
        meta: &CommandMetadata,
    ) -> OrderResult<(TableRef, String)> {
        let guest_count = payload.guest_count.unwrap_or(1);

        match (payload.table_number, &payload.group_id) {
            (Some(number), None) => {
                let mut table = ctx.get_table_by_number(number)?.ok_or_else(|| {
                    OrderError::InvalidTableReference(format!("Table {number} does not exist"))
                })?;
                if let Some(group_id) = &table.group_id {
                    return Err(OrderError::InvalidTableReference(format!(
                        "Table {number} belongs to group {group_id}, order against the group"
                    )));
                }
                match table.status {
                    TableStatus::Available => {
                        status::seat(&mut table, guest_count, meta.timestamp)?;
                        ctx.put_table(&table)?;
                        tracing::debug!(table_id = table.id, "Table seated by new order");
                    }
                    TableStatus::Occupied => {}
                    TableStatus::Reserved => {
                        return Err(OrderError::InvalidTableReference(format!(
                            "Table {number} is reserved, seat the guests first"
                        )));
                    }
                }
                Ok((TableRef::Table { id: table.id }, table.label()))
            }
            (None, Some(group_id)) => {
                let mut group = ctx.get_group(group_id)?.ok_or_else(|| {
                    OrderError::InvalidTableReference(format!("Group {group_id} does not exist"))
                })?;
                if group.status == GroupStatus::Available {
                    status::seat_group(&mut group, guest_count, meta.timestamp)?;
                    ctx.put_group(&group)?;
                    tracing::debug!(group_id = %group.group_id, "Group seated by new order");
                }
                Ok((
                    TableRef::Group {
                        id: group.group_id.clone(),
                    },
                    group.combined_name,
                ))
            }
            _ => Err(OrderError::InvalidTableReference(
                "Exactly one of tableNumber or groupId is required".to_string(),
            )),
        }
    }

    /// Apply a payment and generate its receipt within the caller's transaction
    fn pay_in(
        &self,
        ctx: &CommandContext<'_>,
        order: &mut Order,
        input: &PaymentInput,
        expected: Option<Decimal>,
        meta: &CommandMetadata,
    ) -> OrderResult<()> {
        lifecycle::pay(order, input, meta.timestamp)?;
        let receipt =
            self.receipts
                .generate_in(ctx, order, order.discount_amount, expected, meta)?;
        order.receipt_id = Some(receipt.receipt_id);
        Ok(())
    }

    /// Advance the order status along the lifecycle graph
    pub fn transition_status(
        &self,
        payload: &OrderStatusUpdate,
        meta: &CommandMetadata,
    ) -> OrderResult<Order> {
        let (order, from) = self.storage.transact(|ctx| -> OrderResult<_> {
            let mut order = ctx
                .get_order(&payload.order_id)?
                .ok_or_else(|| OrderError::NotFound(payload.order_id.clone()))?;
            check_version(payload.expected_version, order.version)?;
            let from = order.status;
            lifecycle::transition(&mut order, payload.status, meta)?;
            ctx.put_order(&order)?;
            Ok((order, from))
        })?;

        tracing::info!(
            order_id = %order.order_id,
            from = %from,
            to = %order.status,
            "Order status changed"
        );
        audit_log!(meta, "order.status", order.order_id, format!("{} -> {}", from, order.status));
        Ok(order)
    }

    /// `paid` records a payment, `refunded` refunds it
    pub fn update_payment(&self, payload: &PaymentUpdate, meta: &CommandMetadata) -> OrderResult<Order> {
        match payload.payment_status {
            PaymentStatus::Paid => self.record_payment(payload, meta),
            PaymentStatus::Refunded => {
                self.refund_payment(&payload.order_id, payload.expected_version, meta)
            }
            PaymentStatus::Unpaid => Err(OrderError::Validation(
                "paymentStatus must be paid or refunded".to_string(),
            )),
        }
    }

    /// unpaid → paid, generating the receipt atomically
    pub fn record_payment(&self, payload: &PaymentUpdate, meta: &CommandMetadata) -> OrderResult<Order> {
        let (order, applied) = self.storage.transact(|ctx| -> OrderResult<_> {
            if let Some(key) = &payload.idempotency_key
                && let Some(order_id) = ctx.processed_command(&payment_key(key))?
            {
                // key 绑定首次支付的订单
                if order_id != payload.order_id {
                    return Err(OrderError::IdempotencyKeyReused {
                        key: key.clone(),
                        order_id,
                    });
                }
                let order = ctx
                    .get_order(&payload.order_id)?
                    .ok_or_else(|| OrderError::NotFound(payload.order_id.clone()))?;
                return Ok((order, false));
            }

            let mut order = ctx
                .get_order(&payload.order_id)?
                .ok_or_else(|| OrderError::NotFound(payload.order_id.clone()))?;
            check_version(payload.expected_version, order.version)?;

            let input = PaymentInput {
                method: payload.payment_method,
                discount: payload.discount_amount,
                cash_given: payload.cash_given,
                change_amount: payload.change_amount,
            };
            self.pay_in(ctx, &mut order, &input, payload.amount, meta)?;
            ctx.put_order(&order)?;

            if let Some(key) = &payload.idempotency_key {
                ctx.mark_command_processed(&payment_key(key), &order.order_id)?;
            }
            Ok((order, true))
        })?;

        if applied {
            tracing::info!(
                order_id = %order.order_id,
                method = ?order.payment_method,
                amount = ?order.amount_paid,
                change = ?order.change_amount,
                "Payment recorded"
            );
            audit_log!(
                meta,
                "order.payment",
                order.order_id,
                format!("{:?} {:?}", order.payment_method, order.amount_paid)
            );
        } else {
            tracing::warn!(order_id = %order.order_id, "Duplicate payment submission");
        }
        Ok(order)
    }

    /// paid → refunded
    pub fn refund_payment(
        &self,
        order_id: &str,
        expected_version: Option<u64>,
        meta: &CommandMetadata,
    ) -> OrderResult<Order> {
        let order = self.storage.transact(|ctx| -> OrderResult<_> {
            let mut order = ctx
                .get_order(order_id)?
                .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;
            check_version(expected_version, order.version)?;
            lifecycle::refund(&mut order, meta.timestamp)?;
            ctx.put_order(&order)?;
            Ok(order)
        })?;

        tracing::info!(order_id = %order_id, amount = ?order.amount_paid, "Payment refunded");
        audit_log!(meta, "order.refund", order_id, format!("{:?}", order.amount_paid));
        Ok(order)
    }

    pub fn get_order(&self, order_id: &str) -> OrderResult<Order> {
        self.storage
            .get_order(order_id)?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))
    }

    /// Orders, oldest first, optionally filtered
    pub fn list_orders(&self, query: &OrderQuery) -> OrderResult<Vec<Order>> {
        let orders = self.storage.list_orders()?;
        Ok(orders
            .into_iter()
            .filter(|o| query.status.is_none_or(|s| o.status == s))
            .filter(|o| query.payment_status.is_none_or(|s| o.payment_status == s))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::TableManager;
    use shared::models::{
        JoinTablesRequest, LineItem, PaymentMethod, ReserveRequest, TableCreate,
    };

    struct Fixture {
        storage: PosStorage,
        tables: TableManager,
        orders: OrderManager,
    }

    fn create_test_metadata() -> CommandMetadata {
        CommandMetadata::new("user-1", "Test Operator")
    }

    fn setup() -> Fixture {
        let storage = PosStorage::open_in_memory().unwrap();
        let receipts = ReceiptGenerator::new(
            storage.clone(),
            Decimal::new(12, 2),
            chrono_tz::Asia::Manila,
            30,
        );
        let tables = TableManager::new(storage.clone());
        let orders = OrderManager::new(storage.clone(), receipts);
        let meta = create_test_metadata();
        for number in 1..=4 {
            tables
                .create_table(&TableCreate { number, capacity: 4 }, &meta)
                .unwrap();
        }
        Fixture {
            storage,
            tables,
            orders,
        }
    }

    fn item(id: &str, price: Decimal, quantity: i32) -> LineItem {
        LineItem {
            item_id: id.to_string(),
            name: format!("Item {id}"),
            unit_price: price,
            quantity,
            notes: None,
            category: None,
        }
    }

    fn scenario_items() -> Vec<LineItem> {
        vec![
            item("a", Decimal::new(12050, 2), 2),
            item("b", Decimal::new(4500, 2), 1),
        ]
    }

    fn order_at(table_number: u32) -> OrderCreate {
        OrderCreate {
            table_number: Some(table_number),
            items: scenario_items(),
            ..Default::default()
        }
    }

    fn cash_payment(order_id: &str, cash: i64) -> PaymentUpdate {
        PaymentUpdate {
            order_id: order_id.to_string(),
            payment_status: PaymentStatus::Paid,
            payment_method: Some(PaymentMethod::Cash),
            cash_given: Some(Decimal::from(cash)),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_order_seats_table_and_totals() {
        let f = setup();
        let meta = create_test_metadata();

        let order = f.orders.create_order(&order_at(1), &meta).unwrap();
        assert_eq!(order.total_amount, Decimal::new(28600, 2));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
        assert_eq!(order.table_label, "Table 1");

        let table = f.tables.get_table(1).unwrap();
        assert_eq!(table.status, TableStatus::Occupied);
        assert_eq!(table.guest_count, Some(1));

        // 已占用的桌台可以继续下单
        f.orders.create_order(&order_at(1), &meta).unwrap();
        assert_eq!(f.orders.list_orders(&OrderQuery::default()).unwrap().len(), 2);
    }

    #[test]
    fn test_create_order_validation() {
        let f = setup();
        let meta = create_test_metadata();

        let empty = OrderCreate {
            table_number: Some(1),
            ..Default::default()
        };
        assert!(matches!(f.orders.create_order(&empty, &meta), Err(OrderError::EmptyOrder)));

        let bad_qty = OrderCreate {
            items: vec![item("a", Decimal::ONE, 0)],
            ..order_at(1)
        };
        assert!(matches!(
            f.orders.create_order(&bad_qty, &meta),
            Err(OrderError::InvalidLineItem(_))
        ));

        assert!(matches!(
            f.orders.create_order(&order_at(99), &meta),
            Err(OrderError::InvalidTableReference(_))
        ));
        let both = OrderCreate {
            group_id: Some("g".into()),
            ..order_at(1)
        };
        assert!(matches!(
            f.orders.create_order(&both, &meta),
            Err(OrderError::InvalidTableReference(_))
        ));

        f.tables
            .reserve_table(
                2,
                &ReserveRequest {
                    date: "2024-03-01".into(),
                    time: "19:00".into(),
                    expected_version: None,
                },
                &meta,
            )
            .unwrap();
        assert!(matches!(
            f.orders.create_order(&order_at(2), &meta),
            Err(OrderError::InvalidTableReference(_))
        ));

        // 失败的命令不占桌
        assert_eq!(f.tables.get_table(1).unwrap().status, TableStatus::Available);
        assert!(f.storage.list_orders().unwrap().is_empty());
    }

    #[test]
    fn test_order_against_group() {
        let f = setup();
        let meta = create_test_metadata();
        let joined = f
            .tables
            .join_tables(&JoinTablesRequest { table_ids: vec![1, 2] }, &meta)
            .unwrap();

        // 拼桌成员不能单独下单
        assert!(matches!(
            f.orders.create_order(&order_at(1), &meta),
            Err(OrderError::InvalidTableReference(_))
        ));

        let payload = OrderCreate {
            table_number: None,
            group_id: Some(joined.group_id.clone()),
            guest_count: Some(6),
            ..order_at(1)
        };
        let order = f.orders.create_order(&payload, &meta).unwrap();
        assert_eq!(order.table_label, "Tables 1 + 2");

        let group = f.tables.get_group(&joined.group_id).unwrap();
        assert_eq!(group.status, GroupStatus::Occupied);
        assert_eq!(group.guest_count, Some(6));
    }

    #[test]
    fn test_idempotent_creation() {
        let f = setup();
        let meta = create_test_metadata();
        let payload = OrderCreate {
            idempotency_key: Some("tab-7-submit".into()),
            ..order_at(1)
        };

        let first = f.orders.create_order(&payload, &meta).unwrap();
        let second = f.orders.create_order(&payload, &meta).unwrap();
        assert_eq!(first.order_id, second.order_id);
        assert_eq!(f.storage.list_orders().unwrap().len(), 1);
    }

    #[test]
    fn test_status_transitions() {
        let f = setup();
        let meta = create_test_metadata();
        let order = f.orders.create_order(&order_at(1), &meta).unwrap();

        let to = |status, expected_version| OrderStatusUpdate {
            order_id: order.order_id.clone(),
            status,
            expected_version,
        };
        assert!(matches!(
            f.orders.transition_status(&to(OrderStatus::Served, None), &meta),
            Err(OrderError::InvalidTransition { .. })
        ));
        assert!(matches!(
            f.orders.transition_status(&to(OrderStatus::InProgress, Some(5)), &meta),
            Err(OrderError::Stale(_))
        ));

        f.orders.transition_status(&to(OrderStatus::InProgress, Some(0)), &meta).unwrap();
        f.orders.transition_status(&to(OrderStatus::Ready, None), &meta).unwrap();
        let done = f.orders.transition_status(&to(OrderStatus::Served, None), &meta).unwrap();
        assert_eq!(done.status_history.len(), 3);

        let open = OrderQuery {
            status: Some(OrderStatus::Pending),
            payment_status: None,
        };
        assert!(f.orders.list_orders(&open).unwrap().is_empty());
    }

    #[test]
    fn test_cash_payment_scenario() {
        let f = setup();
        let meta = create_test_metadata();
        let order = f.orders.create_order(&order_at(1), &meta).unwrap();

        assert!(matches!(
            f.orders.update_payment(&cash_payment(&order.order_id, 280), &meta),
            Err(OrderError::InsufficientCash { .. })
        ));
        assert!(f.storage.list_receipts().unwrap().is_empty());

        let paid = f
            .orders
            .update_payment(&cash_payment(&order.order_id, 300), &meta)
            .unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
        assert_eq!(paid.change_amount, Some(Decimal::new(1400, 2)));

        let receipt = f.storage.get_receipt_by_order(&order.order_id).unwrap().unwrap();
        assert_eq!(paid.receipt_id.as_deref(), Some(receipt.receipt_id.as_str()));
        assert_eq!(receipt.total_amount, order.total_amount);
        assert_eq!(receipt.cash_given, Some(Decimal::from(300)));

        assert!(matches!(
            f.orders.update_payment(&cash_payment(&order.order_id, 300), &meta),
            Err(OrderError::AlreadyPaid(_))
        ));
    }

    #[test]
    fn test_payment_amount_must_reconcile() {
        let f = setup();
        let meta = create_test_metadata();
        let order = f.orders.create_order(&order_at(1), &meta).unwrap();

        let payload = PaymentUpdate {
            amount: Some(Decimal::from(250)),
            ..cash_payment(&order.order_id, 300)
        };
        let err = f.orders.update_payment(&payload, &meta).unwrap_err();
        assert!(matches!(
            err,
            OrderError::Receipt(crate::receipts::ReceiptError::Reconciliation { .. })
        ));
        // 全有或全无
        let order = f.orders.get_order(&order.order_id).unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    }

    #[test]
    fn test_idempotent_payment() {
        let f = setup();
        let meta = create_test_metadata();
        let order = f.orders.create_order(&order_at(1), &meta).unwrap();
        let payload = PaymentUpdate {
            idempotency_key: Some("pay-1".into()),
            ..cash_payment(&order.order_id, 300)
        };

        let first = f.orders.update_payment(&payload, &meta).unwrap();
        let second = f.orders.update_payment(&payload, &meta).unwrap();
        assert_eq!(first, second);
        assert_eq!(f.storage.list_receipts().unwrap().len(), 1);
    }

    #[test]
    fn test_payment_key_is_bound_to_its_order() {
        let f = setup();
        let meta = create_test_metadata();
        let first = f.orders.create_order(&order_at(1), &meta).unwrap();
        let second = f.orders.create_order(&order_at(2), &meta).unwrap();

        let pay = |order_id: &str| PaymentUpdate {
            idempotency_key: Some("pay-1".into()),
            ..cash_payment(order_id, 300)
        };
        f.orders.update_payment(&pay(&first.order_id), &meta).unwrap();

        let err = f.orders.update_payment(&pay(&second.order_id), &meta).unwrap_err();
        assert!(matches!(
            err,
            OrderError::IdempotencyKeyReused { ref order_id, .. } if *order_id == first.order_id
        ));
        let second = f.orders.get_order(&second.order_id).unwrap();
        assert_eq!(second.payment_status, PaymentStatus::Unpaid);
        assert_eq!(f.storage.list_receipts().unwrap().len(), 1);
    }

    #[test]
    fn test_prepaid_order() {
        let f = setup();
        let meta = create_test_metadata();
        let payload = OrderCreate {
            payment_method: Some(PaymentMethod::Card),
            amount: Some(Decimal::new(28600, 2)),
            is_customer_order: true,
            ..order_at(3)
        };

        let order = f.orders.create_order(&payload, &meta).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert!(order.receipt_id.is_some());
        assert!(order.cash_given.is_none());
    }

    #[test]
    fn test_prepayment_fields_must_be_consistent() {
        let f = setup();
        let meta = create_test_metadata();

        let cash_without_method = OrderCreate {
            cash_given: Some(Decimal::from(300)),
            ..order_at(1)
        };
        assert!(matches!(
            f.orders.create_order(&cash_without_method, &meta),
            Err(OrderError::Validation(_))
        ));

        let change_without_method = OrderCreate {
            change_amount: Some(Decimal::new(1400, 2)),
            ..order_at(1)
        };
        assert!(matches!(
            f.orders.create_order(&change_without_method, &meta),
            Err(OrderError::Validation(_))
        ));

        let paid_without_method = OrderCreate {
            payment_status: Some(PaymentStatus::Paid),
            ..order_at(1)
        };
        assert!(matches!(
            f.orders.create_order(&paid_without_method, &meta),
            Err(OrderError::MissingPaymentMethod)
        ));

        let unpaid_with_method = OrderCreate {
            payment_status: Some(PaymentStatus::Unpaid),
            payment_method: Some(PaymentMethod::Card),
            ..order_at(1)
        };
        assert!(matches!(
            f.orders.create_order(&unpaid_with_method, &meta),
            Err(OrderError::Validation(_))
        ));

        let refunded = OrderCreate {
            payment_status: Some(PaymentStatus::Refunded),
            ..order_at(1)
        };
        assert!(matches!(
            f.orders.create_order(&refunded, &meta),
            Err(OrderError::Validation(_))
        ));

        let wrong_change = OrderCreate {
            payment_status: Some(PaymentStatus::Paid),
            payment_method: Some(PaymentMethod::Cash),
            cash_given: Some(Decimal::from(300)),
            change_amount: Some(Decimal::from(20)),
            ..order_at(1)
        };
        assert!(matches!(
            f.orders.create_order(&wrong_change, &meta),
            Err(OrderError::Validation(_))
        ));

        // 失败的命令不落任何数据
        assert!(f.storage.list_orders().unwrap().is_empty());
        assert!(f.storage.list_receipts().unwrap().is_empty());
        assert_eq!(f.tables.get_table(1).unwrap().status, TableStatus::Available);

        let cash_prepaid = OrderCreate {
            payment_status: Some(PaymentStatus::Paid),
            payment_method: Some(PaymentMethod::Cash),
            cash_given: Some(Decimal::from(300)),
            change_amount: Some(Decimal::new(1400, 2)),
            ..order_at(1)
        };
        let order = f.orders.create_order(&cash_prepaid, &meta).unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.change_amount, Some(Decimal::new(1400, 2)));
    }

    #[test]
    fn test_customer_order_completes_from_ready() {
        let f = setup();
        let meta = create_test_metadata();
        let customer = OrderCreate {
            is_customer_order: true,
            ..order_at(1)
        };

        let advance = |order_id: &str, status| {
            f.orders.transition_status(
                &OrderStatusUpdate {
                    order_id: order_id.to_string(),
                    status,
                    expected_version: None,
                },
                &meta,
            )
        };

        let order = f.orders.create_order(&customer, &meta).unwrap();
        assert!(order.is_customer_order);
        advance(&order.order_id, OrderStatus::InProgress).unwrap();
        advance(&order.order_id, OrderStatus::Ready).unwrap();
        let done = advance(&order.order_id, OrderStatus::Completed).unwrap();
        assert_eq!(done.status, OrderStatus::Completed);
        assert!(matches!(
            advance(&order.order_id, OrderStatus::Served),
            Err(OrderError::InvalidTransition { .. })
        ));

        // ready → served 同样允许
        let other = f.orders.create_order(&customer, &meta).unwrap();
        advance(&other.order_id, OrderStatus::InProgress).unwrap();
        advance(&other.order_id, OrderStatus::Ready).unwrap();
        let served = advance(&other.order_id, OrderStatus::Served).unwrap();
        assert_eq!(served.status, OrderStatus::Served);
        assert!(served.is_customer_order);
    }

    #[test]
    fn test_refund() {
        let f = setup();
        let meta = create_test_metadata();
        let order = f.orders.create_order(&order_at(1), &meta).unwrap();

        let refund = PaymentUpdate {
            order_id: order.order_id.clone(),
            payment_status: PaymentStatus::Refunded,
            ..Default::default()
        };
        assert!(matches!(
            f.orders.update_payment(&refund, &meta),
            Err(OrderError::NotPaid(_))
        ));

        f.orders
            .update_payment(&cash_payment(&order.order_id, 300), &meta)
            .unwrap();
        let refunded = f.orders.update_payment(&refund, &meta).unwrap();
        assert_eq!(refunded.payment_status, PaymentStatus::Refunded);
        assert!(matches!(
            f.orders.update_payment(&refund, &meta),
            Err(OrderError::AlreadyRefunded(_))
        ));
    }

    #[test]
    fn test_open_orders_block_freeing_table() {
        let f = setup();
        let meta = create_test_metadata();
        let order = f.orders.create_order(&order_at(1), &meta).unwrap();

        assert!(f
            .tables
            .free_table(1, &Default::default(), &meta)
            .is_err());

        let cancel = OrderStatusUpdate {
            order_id: order.order_id,
            status: OrderStatus::Cancelled,
            expected_version: None,
        };
        f.orders.transition_status(&cancel, &meta).unwrap();
        f.tables.free_table(1, &Default::default(), &meta).unwrap();
    }
}
