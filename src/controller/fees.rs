use actix_web::dev::HttpServiceFactory;
use actix_web::{get, post, web, HttpResponse, Responder};

use chrono::Utc;

use rust_decimal::Decimal;

use serde::{Deserialize, Serialize};

use sqlx::PgPool;

use uuid::Uuid;

use crate::auth::StaffUser;
use crate::domain::{FeeSchedule, FeeStatus, ItemType, PaymentMethod};
use crate::error::{RestError, RestResult};
use crate::model::{FeePayment, MailItemFilter, NewAction, PackageFee};
use crate::repo::{FeesRepo, MailItemsRepo};

use super::{non_blank, record_actions};

const MIN_WAIVE_REASON_LEN: usize = 5;
/// Largest amount a `numeric(10, 2)` column holds
const MAX_FEE_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

#[derive(Debug, Serialize)]
struct UnpaidFees {
    fees: Vec<PackageFee>,
    total: Decimal,
}

#[derive(Debug, Default, Deserialize)]
pub struct AssessBody {
    contact_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
struct Assessed {
    assessed: usize,
    fees: Vec<PackageFee>,
}

#[derive(Debug, Deserialize)]
pub struct PayBody {
    payment_method: Option<String>,
    collected_by: Option<String>,
    amount: Option<Decimal>,
}

impl TryFrom<PayBody> for FeePayment {
    type Error = String;

    fn try_from(body: PayBody) -> Result<Self, Self::Error> {
        let payment_method: PaymentMethod = non_blank(body.payment_method)
            .ok_or("payment_method is required")?
            .parse()?;
        let collected_by = non_blank(body.collected_by).ok_or("collected_by is required")?;
        let amount = body.amount.map(|amount| amount.round_dp(2));
        if let Some(amount) = amount {
            if amount < Decimal::ZERO {
                return Err("Amount cannot be negative".into());
            }
            if amount > MAX_FEE_AMOUNT {
                return Err(format!("Amount cannot exceed {}", MAX_FEE_AMOUNT));
            }
        }

        Ok(Self {
            payment_method,
            collected_by,
            amount,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct WaiveBody {
    reason: Option<String>,
}

fn validate_waive_reason(reason: Option<String>) -> Result<String, String> {
    match non_blank(reason) {
        Some(reason) if reason.chars().count() >= MIN_WAIVE_REASON_LEN => Ok(reason),
        _ => Err(format!(
            "A waive reason of at least {} characters is required",
            MIN_WAIVE_REASON_LEN
        )),
    }
}

#[tracing::instrument(name = "List unpaid fees", skip(_staff, pool))]
#[get("/unpaid/{contact_id}")]
async fn unpaid(
    _staff: StaffUser,
    path: web::Path<(Uuid,)>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let (contact_id,) = path.into_inner();

    let fees = FeesRepo::fetch_unpaid_for_contact(pool.get_ref(), contact_id).await?;
    let total = fees.iter().map(PackageFee::outstanding).sum();

    Ok(HttpResponse::Ok().json(UnpaidFees { fees, total }))
}

/// Create or refresh the pending fee of every package still on the shelf
#[tracing::instrument(name = "Assess package fees", skip(_staff, body, pool, schedule))]
#[post("/assess")]
async fn assess(
    _staff: StaffUser,
    body: Option<web::Json<AssessBody>>,
    pool: web::Data<PgPool>,
    schedule: web::Data<FeeSchedule>,
) -> RestResult<impl Responder> {
    let pool = pool.get_ref();
    let body = body.map(web::Json::into_inner).unwrap_or_default();
    let now = Utc::now();

    let filter = MailItemFilter {
        contact_id: body.contact_id,
        status: None,
    };
    let packages = MailItemsRepo::list(pool, &filter)
        .await?
        .into_iter()
        .filter(|item| item.item_type == ItemType::Package && item.status.awaits_pickup());

    let mut fees = Vec::new();
    for package in packages {
        let assessment = schedule.assess(package.received_date, now);
        // Paid and waived fees come back as None and stay as they are
        if let Some(fee) = FeesRepo::upsert_pending(pool, package.mail_item_id, &assessment).await? {
            fees.push(fee);
        }
    }

    Ok(HttpResponse::Ok().json(Assessed {
        assessed: fees.len(),
        fees,
    }))
}

#[tracing::instrument(name = "Pay a fee", skip(staff, pool))]
#[post("/{fee_id}/pay")]
async fn pay(
    staff: StaffUser,
    path: web::Path<(Uuid,)>,
    body: web::Json<PayBody>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let pool = pool.get_ref();
    let (fee_id,) = path.into_inner();
    let payment: FeePayment = body.into_inner().try_into().map_err(RestError::Validation)?;

    let fee = match FeesRepo::mark_paid(pool, fee_id, &payment).await? {
        Some(fee) => fee,
        None => return Err(not_pending(pool, fee_id, "paid").await),
    };

    record_actions(
        pool,
        &[NewAction {
            mail_item_id: fee.mail_item_id,
            action_type: "fee_paid".into(),
            action_description: format!(
                "Fee of ${} paid by {}",
                fee.fee_amount,
                payment.payment_method
            ),
            previous_value: Some(FeeStatus::Pending.to_string()),
            new_value: Some(fee.fee_status.to_string()),
            performed_by: staff.email,
            notes: None,
        }],
    )
    .await;

    Ok(HttpResponse::Ok().json(fee))
}

#[tracing::instrument(name = "Waive a fee", skip(staff, pool))]
#[post("/{fee_id}/waive")]
async fn waive(
    staff: StaffUser,
    path: web::Path<(Uuid,)>,
    body: web::Json<WaiveBody>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let pool = pool.get_ref();
    let (fee_id,) = path.into_inner();
    let reason = validate_waive_reason(body.into_inner().reason).map_err(RestError::Validation)?;

    let fee = match FeesRepo::mark_waived(pool, fee_id, &reason).await? {
        Some(fee) => fee,
        None => return Err(not_pending(pool, fee_id, "waived").await),
    };

    record_actions(
        pool,
        &[NewAction {
            mail_item_id: fee.mail_item_id,
            action_type: "fee_waived".into(),
            action_description: format!("Fee of ${} waived", fee.fee_amount),
            previous_value: Some(FeeStatus::Pending.to_string()),
            new_value: Some(fee.fee_status.to_string()),
            performed_by: staff.email,
            notes: Some(reason),
        }],
    )
    .await;

    Ok(HttpResponse::Ok().json(fee))
}

/// Tell a missing fee apart from one that is already settled
async fn not_pending(pool: &PgPool, fee_id: Uuid, verb: &str) -> RestError {
    match FeesRepo::fetch_by_id(pool, fee_id).await {
        Ok(Some(_)) => RestError::Validation(format!("Only pending fees can be {}", verb)),
        Ok(None) => RestError::not_found("Fee not found"),
        Err(e) => e.into(),
    }
}

/// Package fee API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/fees")
        .service(unpaid)
        .service(assess)
        .service(pay)
        .service(waive)
}
