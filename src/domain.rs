/// Store a string-backed enum in a Postgres `text` column.
/// The type must implement `AsRef<str>` and `FromStr<Err = String>`.
macro_rules! impl_text_column {
    ($ty:ty) => {
        impl sqlx::Type<sqlx::Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <&str as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let value = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(value.parse::<$ty>()?)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_ref(), buf)
            }
        }
    };
}

mod business_time;
mod contact_name;
mod contact_profile;
mod email_address;
mod fee;
mod mail_status;
mod mailbox_number;

pub use business_time::*;
pub use contact_name::ContactName;
pub use contact_profile::{display_name, ContactStatus, DisplayNamePreference, PreferredLanguage};
pub use email_address::EmailAddress;
pub use fee::{FeeAssessment, FeeSchedule, FeeStatus, PaymentMethod};
pub use mail_status::{ItemType, MailStatus};
pub use mailbox_number::MailboxNumber;
