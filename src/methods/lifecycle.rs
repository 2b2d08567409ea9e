use chrono::Utc;

use crate::helper_model::{Actor, ActorRole, FleetdeskError};
use crate::methods::checklist;
use crate::model;
use crate::store::Store;

/// The booking state machine. Every transition locks the booking's store
/// entry for the whole read-guard-evaluate-write sequence, so two concurrent
/// calls against the same booking cannot both pass a guard.

pub fn approve_booking(store: &Store, booking_id: i32) -> Result<model::Booking, FleetdeskError> {
    let mut booking = store
        .booking_entry(booking_id)
        .ok_or(FleetdeskError::NotFound {
            entity: "booking",
            id: booking_id,
        })?;

    if booking.status != model::BookingStatus::Reserved {
        return Err(FleetdeskError::InvalidState(format!(
            "Booking {} is {:?}; only a RESERVED booking can be approved. ",
            booking_id, booking.status
        )));
    }
    if booking.deposit_status != model::DepositStatus::Paid {
        return Err(FleetdeskError::PreconditionFailed(vec![format!(
            "the deposit is {:?}; it must be PAID before the booking can be confirmed",
            booking.deposit_status
        )]));
    }

    booking.status = model::BookingStatus::Confirmed;
    booking.updated_at = Utc::now();
    tracing::info!(booking_id, "booking confirmed");
    Ok(booking.clone())
}

/// Cancels a booking before hand-over. While RESERVED anyone involved may
/// withdraw; once CONFIRMED the deposit has moved, so cancellation is an
/// admin decision.
pub fn reject_booking(
    store: &Store,
    actor: &Actor,
    booking_id: i32,
) -> Result<model::Booking, FleetdeskError> {
    let mut booking = store
        .booking_entry(booking_id)
        .ok_or(FleetdeskError::NotFound {
            entity: "booking",
            id: booking_id,
        })?;

    match booking.status {
        model::BookingStatus::Reserved => {}
        model::BookingStatus::Confirmed => {
            if actor.role != ActorRole::Admin {
                return Err(FleetdeskError::PermissionDenied(String::from(
                    "Only an admin may cancel a confirmed booking. ",
                )));
            }
        }
        model::BookingStatus::InProgress => {
            // A vehicle already handed over cannot be un-rented.
            return Err(FleetdeskError::InvalidState(String::from(
                "A booking in progress cannot be cancelled. ",
            )));
        }
        status => {
            return Err(FleetdeskError::InvalidState(format!(
                "Booking {} is already {:?}. ",
                booking_id, status
            )));
        }
    }

    booking.status = model::BookingStatus::Cancelled;
    booking.updated_at = Utc::now();
    tracing::info!(booking_id, "booking cancelled");
    Ok(booking.clone())
}

/// Staff confirms the hand-over. Gated on complete BEFORE_RENTAL
/// documentation and, when a contract exists, a fully signed contract.
pub fn confirm_check_in(
    store: &Store,
    actor: &Actor,
    booking_id: i32,
) -> Result<model::Booking, FleetdeskError> {
    let mut booking = store
        .booking_entry(booking_id)
        .ok_or(FleetdeskError::NotFound {
            entity: "booking",
            id: booking_id,
        })?;

    match booking.status {
        model::BookingStatus::Confirmed => {}
        model::BookingStatus::Reserved => {
            return Err(FleetdeskError::PreconditionFailed(vec![String::from(
                "the booking has not been approved yet (RESERVED -> IN_PROGRESS is not a legal transition)",
            )]));
        }
        status => {
            return Err(FleetdeskError::InvalidState(format!(
                "Booking {} is {:?}; check-in is not applicable. ",
                booking_id, status
            )));
        }
    }

    let mut unmet: Vec<String> = Vec::new();
    let report = checklist_report(store, booking_id, model::ImageType::BeforeRental);
    if !report.is_complete {
        unmet.push(format!(
            "missing components: {}",
            report.missing.join(", ")
        ));
    }
    if let Some(contract) = store.active_contract_for_booking(booking_id) {
        if contract.status != model::ContractStatus::FullySigned {
            unmet.push(format!(
                "contract {} is {:?}; it must be FULLY_SIGNED",
                contract.id, contract.status
            ));
        }
    }
    if !unmet.is_empty() {
        return Err(FleetdeskError::PreconditionFailed(unmet));
    }

    booking.status = model::BookingStatus::InProgress;
    booking.staff_id = Some(actor.id);
    booking.updated_at = Utc::now();
    tracing::info!(booking_id, staff_id = actor.id, "check-in confirmed");
    Ok(booking.clone())
}

/// Staff confirms the return. Gated on complete AFTER_RENTAL documentation
/// and a settled final invoice.
pub fn confirm_check_out(
    store: &Store,
    booking_id: i32,
) -> Result<model::Booking, FleetdeskError> {
    let mut booking = store
        .booking_entry(booking_id)
        .ok_or(FleetdeskError::NotFound {
            entity: "booking",
            id: booking_id,
        })?;

    match booking.status {
        model::BookingStatus::InProgress => {}
        model::BookingStatus::Reserved | model::BookingStatus::Confirmed => {
            return Err(FleetdeskError::PreconditionFailed(vec![format!(
                "the booking is {:?}; the vehicle has not been handed over yet",
                booking.status
            )]));
        }
        status => {
            return Err(FleetdeskError::InvalidState(format!(
                "Booking {} is {:?}; check-out is not applicable. ",
                booking_id, status
            )));
        }
    }

    let mut unmet: Vec<String> = Vec::new();
    let report = checklist_report(store, booking_id, model::ImageType::AfterRental);
    if !report.is_complete {
        unmet.push(format!(
            "missing components: {}",
            report.missing.join(", ")
        ));
    }
    match store.final_invoice_for_booking(booking_id) {
        None => unmet.push(String::from("no final invoice has been opened")),
        Some(invoice) => {
            if invoice.status != model::InvoiceStatus::Paid {
                unmet.push(format!(
                    "final invoice {} is {:?}; settlement must be closed",
                    invoice.id, invoice.status
                ));
            }
        }
    }
    if !unmet.is_empty() {
        return Err(FleetdeskError::PreconditionFailed(unmet));
    }

    booking.status = model::BookingStatus::Completed;
    booking.actual_return_time = Some(Utc::now());
    booking.updated_at = Utc::now();
    tracing::info!(booking_id, "check-out confirmed");
    Ok(booking.clone())
}

/// Deposit state notice from the payment provider. Only meaningful while the
/// booking is still RESERVED; later deposit movement happens through
/// settlement.
pub fn record_deposit_status(
    store: &Store,
    booking_id: i32,
    deposit_status: model::DepositStatus,
) -> Result<model::Booking, FleetdeskError> {
    let mut booking = store
        .booking_entry(booking_id)
        .ok_or(FleetdeskError::NotFound {
            entity: "booking",
            id: booking_id,
        })?;

    if booking.status != model::BookingStatus::Reserved {
        return Err(FleetdeskError::InvalidState(format!(
            "Booking {} is {:?}; the deposit can no longer be updated directly. ",
            booking_id, booking.status
        )));
    }
    if deposit_status == model::DepositStatus::Refunded {
        return Err(FleetdeskError::InvalidState(String::from(
            "Deposit refunds are issued through settlement. ",
        )));
    }

    booking.deposit_status = deposit_status;
    booking.updated_at = Utc::now();
    Ok(booking.clone())
}

fn checklist_report(
    store: &Store,
    booking_id: i32,
    phase: model::ImageType,
) -> checklist::ChecklistReport {
    // The caller holds the booking's store entry, so the booking exists and
    // the evaluation cannot race a transition.
    checklist::report(store, booking_id, phase)
}
