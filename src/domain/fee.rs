use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use rust_decimal::Decimal;

use serde::{Deserialize, Serialize};

use super::business_time::days_since;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeStatus {
    #[default]
    Pending,
    Paid,
    Waived,
}

impl AsRef<str> for FeeStatus {
    fn as_ref(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Waived => "waived",
        }
    }
}

impl FromStr for FeeStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "waived" => Ok(Self::Waived),
            other => Err(format!("{} is not a valid fee status", other)),
        }
    }
}

impl fmt::Display for FeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl_text_column!(FeeStatus);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Venmo,
    Zelle,
    Paypal,
    Check,
    Other,
}

impl AsRef<str> for PaymentMethod {
    fn as_ref(&self) -> &str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Venmo => "venmo",
            Self::Zelle => "zelle",
            Self::Paypal => "paypal",
            Self::Check => "check",
            Self::Other => "other",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            "venmo" => Ok(Self::Venmo),
            "zelle" => Ok(Self::Zelle),
            "paypal" => Ok(Self::Paypal),
            "check" => Ok(Self::Check),
            "other" => Ok(Self::Other),
            other => Err(format!("{} is not a valid payment method", other)),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl_text_column!(PaymentMethod);

/// Storage fee charged per business day once the free grace period is over
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeSchedule {
    pub daily_rate: Decimal,
    pub grace_days: i64,
}

/// Computed storage fee for one package
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeAssessment {
    pub days_charged: i32,
    pub amount: Decimal,
}

impl FeeSchedule {
    /// Assess the fee of a package received at `received_date`, as of `now`
    pub fn assess(&self, received_date: DateTime<Utc>, now: DateTime<Utc>) -> FeeAssessment {
        let chargeable = (days_since(received_date, now) - self.grace_days).max(0);
        let days_charged = i32::try_from(chargeable).unwrap_or(i32::MAX);
        let amount = (Decimal::from(days_charged) * self.daily_rate).round_dp(2);

        FeeAssessment {
            days_charged,
            amount,
        }
    }
}
