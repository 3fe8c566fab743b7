use sqlx::PgExecutor;

use uuid::Uuid;

use crate::domain::{FeeAssessment, FeeStatus};
use crate::model::{FeePayment, PackageFee};

/// Repository for package storage fees
pub struct FeesRepo;

impl FeesRepo {
    #[tracing::instrument(name = "Fetch fee by id", skip(executor))]
    pub async fn fetch_by_id<'con>(
        executor: impl PgExecutor<'con>,
        fee_id: Uuid,
    ) -> sqlx::Result<Option<PackageFee>> {
        sqlx::query_as("select * from package_fees where fee_id = $1")
            .bind(fee_id)
            .fetch_optional(executor)
            .await
    }

    /// Pending fees on a contact's packages that are still in the system
    #[tracing::instrument(name = "Fetch unpaid fees of contact", skip(executor))]
    pub async fn fetch_unpaid_for_contact<'con>(
        executor: impl PgExecutor<'con>,
        contact_id: Uuid,
    ) -> sqlx::Result<Vec<PackageFee>> {
        sqlx::query_as(
            "select f.* from package_fees f \
             join mail_items m on m.mail_item_id = f.mail_item_id \
             where m.contact_id = $1 and m.archived_at is null and f.fee_status = $2 \
             order by m.received_date",
        )
        .bind(contact_id)
        .bind(FeeStatus::Pending)
        .fetch_all(executor)
        .await
    }

    /// Create the fee of a package or refresh it while it is still pending.
    ///
    /// Returns `None` when the fee has already been paid or waived.
    #[tracing::instrument(name = "Upsert pending fee", skip(executor))]
    pub async fn upsert_pending<'con>(
        executor: impl PgExecutor<'con>,
        mail_item_id: Uuid,
        assessment: &FeeAssessment,
    ) -> sqlx::Result<Option<PackageFee>> {
        sqlx::query_as(
            "insert into package_fees(mail_item_id, fee_amount, days_charged, fee_status) \
             values ($1, $2, $3, $4) \
             on conflict (mail_item_id) do update set \
             fee_amount = excluded.fee_amount, days_charged = excluded.days_charged, \
             updated_at = now() \
             where package_fees.fee_status = $4 \
             returning *",
        )
        .bind(mail_item_id)
        .bind(assessment.amount)
        .bind(assessment.days_charged)
        .bind(FeeStatus::Pending)
        .fetch_optional(executor)
        .await
    }

    /// Settle a pending fee. Returns `None` if the fee is not pending.
    #[tracing::instrument(name = "Mark fee paid", skip(executor))]
    pub async fn mark_paid<'con>(
        executor: impl PgExecutor<'con>,
        fee_id: Uuid,
        payment: &FeePayment,
    ) -> sqlx::Result<Option<PackageFee>> {
        sqlx::query_as(
            "update package_fees set fee_status = $2, payment_method = $3, collected_by = $4, \
             fee_amount = coalesce($5, fee_amount), paid_date = now(), updated_at = now() \
             where fee_id = $1 and fee_status = $6 returning *",
        )
        .bind(fee_id)
        .bind(FeeStatus::Paid)
        .bind(payment.payment_method)
        .bind(&payment.collected_by)
        .bind(payment.amount)
        .bind(FeeStatus::Pending)
        .fetch_optional(executor)
        .await
    }

    /// Forgive a pending fee. Returns `None` if the fee is not pending.
    #[tracing::instrument(name = "Waive fee", skip(executor))]
    pub async fn mark_waived<'con>(
        executor: impl PgExecutor<'con>,
        fee_id: Uuid,
        reason: &str,
    ) -> sqlx::Result<Option<PackageFee>> {
        sqlx::query_as(
            "update package_fees set fee_status = $2, waive_reason = $3, waived_date = now(), \
             updated_at = now() \
             where fee_id = $1 and fee_status = $4 returning *",
        )
        .bind(fee_id)
        .bind(FeeStatus::Waived)
        .bind(reason)
        .bind(FeeStatus::Pending)
        .fetch_optional(executor)
        .await
    }
}
