use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

use crate::model;

/// Structured failure kinds for the rental lifecycle core. Guard failures
/// carry the unmet requirement(s) verbatim so the console can show the staff
/// member exactly what is still missing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FleetdeskError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },
    #[error("precondition failed: {}", .0.join("; "))]
    PreconditionFailed(Vec<String>),
    #[error("{0}")]
    InvalidState(String),
    #[error("The code does not match the active challenge. ")]
    OtpInvalid,
    #[error("The code has expired. Please request a new one. ")]
    OtpExpired,
    #[error("The code has already been used. ")]
    OtpAlreadyUsed,
    #[error("This signature slot has already been signed. ")]
    AlreadySigned,
    #[error("The paid amount must equal the outstanding balance of {expected}. ")]
    AmountMismatch { expected: Decimal },
    #[error("A settlement has already been applied to this invoice. ")]
    RefundAlreadyIssued,
    #[error("{0}")]
    PermissionDenied(String),
}

impl FleetdeskError {
    pub fn kind(&self) -> &'static str {
        match self {
            FleetdeskError::NotFound { .. } => "NotFound",
            FleetdeskError::PreconditionFailed(_) => "PreconditionFailed",
            FleetdeskError::InvalidState(_) => "InvalidState",
            FleetdeskError::OtpInvalid => "OtpInvalid",
            FleetdeskError::OtpExpired => "OtpExpired",
            FleetdeskError::OtpAlreadyUsed => "OtpAlreadyUsed",
            FleetdeskError::AlreadySigned => "AlreadySigned",
            FleetdeskError::AmountMismatch { .. } => "AmountMismatch",
            FleetdeskError::RefundAlreadyIssued => "RefundAlreadyIssued",
            FleetdeskError::PermissionDenied(_) => "PermissionDenied",
        }
    }

    /// The unmet requirements of a guard failure, if any.
    pub fn missing(&self) -> Option<Vec<String>> {
        match self {
            FleetdeskError::PreconditionFailed(unmet) => Some(unmet.clone()),
            _ => None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ErrorResponse {
    pub error: String,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<String>>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Admin,
    Staff,
    Renter,
}

/// Authenticated caller identity, as supplied by the external identity
/// provider through trusted headers. The core only enforces role guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i32,
    pub role: ActorRole,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NewBookingRequest {
    pub renter_id: i32,
    pub vehicle_id: i32,
    pub rsvp_pickup_time: DateTime<Utc>,
    pub rsvp_drop_off_time: DateTime<Utc>,
    pub hourly_rate: Decimal,
    pub daily_rate: Decimal,
    pub total_price: Decimal,
    pub deposit_amount: Decimal,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BookingActionRequest {
    pub booking_id: i32,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DepositNoticeRequest {
    pub booking_id: i32,
    pub deposit_status: model::DepositStatus,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NewTermRequest {
    pub title: String,
    pub content: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NewContractRequest {
    pub booking_id: i32,
    pub terms: Vec<NewTermRequest>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ContractActionRequest {
    pub contract_id: i32,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ContractOtpRequest {
    pub contract_id: i32,
    pub role: model::SignerRole,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct VerifySignRequest {
    pub contract_id: i32,
    pub role: model::SignerRole,
    pub code: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct UploadImageRequest {
    pub booking_id: i32,
    pub image_type: model::ImageType,
    pub vehicle_component: String,
    pub description: String,
    pub file_path: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DeleteImageRequest {
    pub booking_id: i32,
    pub image_id: i32,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct ChecklistQuery {
    pub booking_id: i32,
    pub phase: model::ImageType,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct BookingQuery {
    pub booking_id: i32,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OpenFinalInvoiceRequest {
    pub booking_id: i32,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AddLineItemRequest {
    pub invoice_id: i32,
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RemoveLineItemRequest {
    pub invoice_id: i32,
    pub detail_id: i32,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CashPaymentRequest {
    pub invoice_id: i32,
    pub amount: Decimal,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RefundRequest {
    pub invoice_id: i32,
    pub method: model::PaymentMethodKind,
    pub reason: String,
}

/// Everything the console needs to render one booking screen in a single
/// round trip.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BookingBundle {
    pub booking: model::Booking,
    pub contract: Option<model::Contract>,
    pub images: Vec<model::BookingImage>,
    pub invoices: Vec<model::Invoice>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OtpIssueReply {
    pub contract: model::Contract,
    pub role: model::SignerRole,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch_warning: Option<String>,
}
