use chrono::{DateTime, Utc};

use rust_decimal::Decimal;

use serde::Serialize;

use uuid::Uuid;

use crate::domain::{FeeStatus, PaymentMethod};

/// Stored storage fee of a package
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PackageFee {
    pub fee_id: Uuid,
    pub mail_item_id: Uuid,
    pub fee_amount: Decimal,
    pub days_charged: i32,
    pub fee_status: FeeStatus,
    pub payment_method: Option<PaymentMethod>,
    pub collected_by: Option<String>,
    pub paid_date: Option<DateTime<Utc>>,
    pub waive_reason: Option<String>,
    pub waived_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PackageFee {
    /// Amount still owed; settled fees owe nothing
    pub fn outstanding(&self) -> Decimal {
        match self.fee_status {
            FeeStatus::Pending => self.fee_amount,
            FeeStatus::Paid | FeeStatus::Waived => Decimal::ZERO,
        }
    }
}

/// Fee collection details
#[derive(Debug)]
pub struct FeePayment {
    pub payment_method: PaymentMethod,
    pub collected_by: String,
    /// Overrides the assessed amount, e.g. for a discount
    pub amount: Option<Decimal>,
}
