//! Donations (giving). Payment processing is external; only the record lives here.

use super::common::{Document, StringUuid};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationType {
    Tithe,
    Offering,
    Special,
    Mission,
    Building,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    BankTransfer,
    Cash,
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
}

impl DonationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DonationStatus::Pending => "pending",
            DonationStatus::Processing => "processing",
            DonationStatus::Completed => "completed",
            DonationStatus::Failed => "failed",
            DonationStatus::Refunded => "refunded",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub user_id: StringUuid,
    pub amount: f64,
    pub currency: String,
    #[serde(rename = "type")]
    pub donation_type: DonationType,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub status: DonationStatus,
    pub reference: String,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurring_frequency: Option<String>,
    pub notes: Option<String>,
}

impl Document for Donation {
    const COLLECTION: &'static str = "donations";
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationInput {
    #[validate(range(min = 0.01))]
    pub amount: f64,
    #[serde(rename = "type")]
    pub donation_type: DonationType,
    pub payment_method: PaymentMethod,
    pub is_anonymous: Option<bool>,
    pub is_recurring: Option<bool>,
    #[validate(length(max = 50))]
    pub recurring_frequency: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDonationStatusInput {
    pub status: DonationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DonationStats {
    pub total_amount: f64,
    pub total_donations: i64,
    pub average_donation: f64,
}

impl DonationStats {
    pub fn from_amounts(amounts: &[f64]) -> Self {
        let total_amount: f64 = amounts.iter().sum();
        let total_donations = amounts.len() as i64;
        let average_donation = if total_donations > 0 {
            total_amount / total_donations as f64
        } else {
            0.0
        };
        Self {
            total_amount,
            total_donations,
            average_donation,
        }
    }
}
