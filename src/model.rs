use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Reserved,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepositStatus {
    Pending,
    Paid,
    Refunded,
    Failed,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    PendingAdminSignature,
    AdminSigned,
    FullySigned,
    Cancelled,
}

impl ContractStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ContractStatus::FullySigned | ContractStatus::Cancelled)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignerRole {
    Admin,
    Renter,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageType {
    BeforeRental,
    AfterRental,
    Damage,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceType {
    Deposit,
    Final,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
    Cancelled,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethodKind {
    Cash,
    Card,
    BankTransfer,
}

/// One rental agreement instance. Created on reservation, advanced only by
/// the lifecycle methods, never deleted. Terminal states keep the record as
/// an audit trail.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: i32,
    pub renter_id: i32,
    pub vehicle_id: i32,
    pub staff_id: Option<i32>,
    pub rsvp_pickup_time: DateTime<Utc>,
    pub rsvp_drop_off_time: DateTime<Utc>,
    pub actual_return_time: Option<DateTime<Utc>>,
    pub hourly_rate: Decimal,
    pub daily_rate: Decimal,
    pub total_price: Decimal,
    pub deposit_amount: Decimal,
    pub status: BookingStatus,
    pub deposit_status: DepositStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub renter_id: i32,
    pub vehicle_id: i32,
    pub rsvp_pickup_time: DateTime<Utc>,
    pub rsvp_drop_off_time: DateTime<Utc>,
    pub hourly_rate: Decimal,
    pub daily_rate: Decimal,
    pub total_price: Decimal,
    pub deposit_amount: Decimal,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ContractTerm {
    pub number: i32,
    pub title: String,
    pub content: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Contract {
    pub id: i32,
    pub booking_id: i32,
    pub terms: Vec<ContractTerm>,
    pub status: ContractStatus,
    pub admin_signed_at: Option<DateTime<Utc>>,
    pub renter_signed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Ephemeral single-use signing challenge, one per (contract, signer role).
/// A fresh request overwrites the previous challenge for the same slot;
/// expiry is evaluated lazily at verification time.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    pub contract_id: i32,
    pub role: SignerRole,
    pub code: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BookingImage {
    pub id: i32,
    pub booking_id: i32,
    pub image_type: ImageType,
    pub vehicle_component: String,
    pub description: String,
    pub image_link: String,
    pub captured_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct InvoiceDetail {
    pub id: i32,
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: i32,
    pub booking_id: i32,
    pub invoice_type: InvoiceType,
    pub details: Vec<InvoiceDetail>,
    pub deposit_amount: Decimal,
    pub total_amount: Decimal,
    pub refund_amount: Decimal,
    pub status: InvoiceStatus,
    pub payment_method: Option<PaymentMethodKind>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Invoice {
    /// Re-derives the stored totals from the line items so they never drift
    /// from the detail rows.
    pub fn recompute_totals(&mut self) {
        self.total_amount = self
            .details
            .iter()
            .map(|detail| detail.line_total)
            .sum::<Decimal>();
        self.refund_amount = (self.deposit_amount - self.total_amount).max(Decimal::ZERO);
    }

    pub fn outstanding(&self) -> Decimal {
        (self.total_amount - self.deposit_amount).max(Decimal::ZERO)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.status, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
    }
}
