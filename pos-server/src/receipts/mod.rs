//! 小票
//!
//! 订单支付成功时在同一事务内生成小票；每个订单最多一张
//! (`receipts_by_order` 唯一索引)。小票生成后不可变，只允许在更正窗口内
//! 修改现金与备注。

pub mod error;
pub mod totals;

pub use error::{ReceiptError, ReceiptResult};

use crate::audit_log;
use crate::orders::money::round_money;
use crate::store::{CommandContext, CommandMetadata, PosStorage};
use crate::utils::time::compact_date;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use shared::models::{Order, PaymentMethod, PaymentStatus, Receipt, ReceiptCorrection, ReceiptCreate};

/// First receipt of a day is `RCP{yyyymmdd}10001`
const RECEIPT_NUMBER_BASE: u64 = 10000;

/// Receipt generation, correction and lookup
#[derive(Clone)]
pub struct ReceiptGenerator {
    storage: PosStorage,
    /// Fraction, e.g. 0.12
    tax_rate: Decimal,
    tz: Tz,
    correction_window_minutes: i64,
}

impl std::fmt::Debug for ReceiptGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiptGenerator")
            .field("tax_rate", &self.tax_rate)
            .field("tz", &self.tz)
            .field("correction_window_minutes", &self.correction_window_minutes)
            .finish()
    }
}

impl ReceiptGenerator {
    pub fn new(storage: PosStorage, tax_rate: Decimal, tz: Tz, correction_window_minutes: i64) -> Self {
        Self {
            storage,
            tax_rate,
            tz,
            correction_window_minutes,
        }
    }

    /// Generate the receipt for a paid order inside the caller's transaction
    ///
    /// `expected` is the total the caller saw. The caller links
    /// `order.receipt_id` and persists the order.
    pub fn generate_in(
        &self,
        ctx: &CommandContext<'_>,
        order: &Order,
        discount: Decimal,
        expected: Option<Decimal>,
        meta: &CommandMetadata,
    ) -> ReceiptResult<Receipt> {
        if order.payment_status != PaymentStatus::Paid {
            return Err(ReceiptError::OrderNotPaid(order.order_id.clone()));
        }
        if ctx.receipt_id_for_order(&order.order_id)?.is_some() {
            return Err(ReceiptError::AlreadyExists(order.order_id.clone()));
        }
        let payment_method = order
            .payment_method
            .ok_or_else(|| ReceiptError::MissingPaymentMethod(order.order_id.clone()))?;

        let totals = totals::compute(order.total_amount, self.tax_rate, discount, expected)?;

        let day = compact_date(meta.timestamp, self.tz);
        let n = ctx.next_counter(&format!("receipt:{day}"))?;
        let receipt = Receipt {
            receipt_id: shared::util::new_id(),
            receipt_number: format!("RCP{}{}", day, RECEIPT_NUMBER_BASE + n),
            order_id: order.order_id.clone(),
            items: order.items.clone(),
            subtotal: totals.subtotal,
            tax_rate: self.tax_rate,
            tax_amount: totals.tax_amount,
            discount_amount: totals.discount_amount,
            total_amount: totals.total_amount,
            payment_method,
            cash_given: order.cash_given,
            change_amount: order.change_amount,
            table_label: order.table_label.clone(),
            notes: order.notes.clone(),
            created_by: meta.operator_name.clone(),
            created_at: meta.timestamp,
            corrected_at: None,
        };
        ctx.put_receipt(&receipt)?;

        tracing::info!(
            receipt_number = %receipt.receipt_number,
            order_id = %order.order_id,
            total = %receipt.total_amount,
            "Receipt generated"
        );
        Ok(receipt)
    }

    /// Explicit generation for an already paid order
    pub fn generate(&self, payload: &ReceiptCreate, meta: &CommandMetadata) -> ReceiptResult<Receipt> {
        let receipt = self.storage.transact(|ctx| -> ReceiptResult<_> {
            let mut order = ctx
                .get_order(&payload.order_id)?
                .ok_or_else(|| ReceiptError::OrderNotFound(payload.order_id.clone()))?;
            let discount = payload.discount_amount.unwrap_or(order.discount_amount);

            let receipt = self.generate_in(ctx, &order, discount, payload.total_amount, meta)?;
            order.receipt_id = Some(receipt.receipt_id.clone());
            order.touch(meta.timestamp);
            ctx.put_order(&order)?;
            Ok(receipt)
        })?;

        audit_log!(meta, "receipt.generate", receipt.receipt_number, receipt.order_id);
        Ok(receipt)
    }

    /// Correct cash given and notes within the correction window
    pub fn correct(
        &self,
        receipt_id: &str,
        payload: &ReceiptCorrection,
        meta: &CommandMetadata,
    ) -> ReceiptResult<Receipt> {
        if payload.cash_given.is_none() && payload.notes.is_none() {
            return Err(ReceiptError::InvalidCorrection(
                "nothing to correct, supply cashGiven or notes".to_string(),
            ));
        }
        let window_ms = self.correction_window_minutes.saturating_mul(60_000);

        let receipt = self.storage.transact(|ctx| -> ReceiptResult<_> {
            let mut receipt = ctx
                .get_receipt(receipt_id)?
                .ok_or_else(|| ReceiptError::NotFound(receipt_id.to_string()))?;
            if meta.timestamp - receipt.created_at > window_ms {
                return Err(ReceiptError::CorrectionWindowClosed(receipt.receipt_number.clone()));
            }

            if let Some(cash_given) = payload.cash_given {
                if receipt.payment_method != PaymentMethod::Cash {
                    return Err(ReceiptError::InvalidCorrection(format!(
                        "cashGiven only applies to cash receipts, this one is {}",
                        receipt.payment_method
                    )));
                }
                if cash_given < receipt.total_amount {
                    return Err(ReceiptError::InvalidCorrection(format!(
                        "cashGiven {} is less than total {}",
                        cash_given, receipt.total_amount
                    )));
                }
                let change = round_money(cash_given - receipt.total_amount);
                receipt.cash_given = Some(cash_given);
                receipt.change_amount = Some(change);

                // 订单上的现金记录与小票保持一致
                if let Some(mut order) = ctx.get_order(&receipt.order_id)? {
                    order.cash_given = Some(cash_given);
                    order.change_amount = Some(change);
                    order.touch(meta.timestamp);
                    ctx.put_order(&order)?;
                }
            }
            if let Some(notes) = &payload.notes {
                receipt.notes = Some(notes.clone());
            }
            receipt.corrected_at = Some(meta.timestamp);
            ctx.put_receipt(&receipt)?;
            Ok(receipt)
        })?;

        tracing::info!(receipt_number = %receipt.receipt_number, "Receipt corrected");
        audit_log!(
            meta,
            "receipt.correct",
            receipt.receipt_number,
            format!("cash_given={:?}", receipt.cash_given)
        );
        Ok(receipt)
    }

    pub fn get(&self, receipt_id: &str) -> ReceiptResult<Receipt> {
        self.storage
            .get_receipt(receipt_id)?
            .ok_or_else(|| ReceiptError::NotFound(receipt_id.to_string()))
    }

    pub fn get_by_order(&self, order_id: &str) -> ReceiptResult<Receipt> {
        self.storage
            .get_receipt_by_order(order_id)?
            .ok_or_else(|| ReceiptError::NotFound(format!("order {order_id}")))
    }

    pub fn list(&self) -> ReceiptResult<Vec<Receipt>> {
        Ok(self.storage.list_receipts()?)
    }
}
