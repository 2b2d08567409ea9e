use chrono::Utc;
use rand::Rng;

use crate::helper_model::{FleetdeskError, NewTermRequest, OtpIssueReply};
use crate::integration::notifier::OtpNotifier;
use crate::model;
use crate::store::Store;

/// Staff draws up the contract. Terms are numbered here and never mutated
/// afterwards; the only later changes to a contract are signatures and
/// cancellation.
pub fn create_contract(
    store: &Store,
    booking_id: i32,
    terms: Vec<NewTermRequest>,
) -> Result<model::Contract, FleetdeskError> {
    let booking = store
        .booking_entry(booking_id)
        .ok_or(FleetdeskError::NotFound {
            entity: "booking",
            id: booking_id,
        })?;

    if !matches!(
        booking.status,
        model::BookingStatus::Reserved | model::BookingStatus::Confirmed
    ) {
        return Err(FleetdeskError::InvalidState(format!(
            "A contract can only be drawn up before hand-over; booking {} is {:?}. ",
            booking_id, booking.status
        )));
    }
    if store.active_contract_for_booking(booking_id).is_some() {
        return Err(FleetdeskError::InvalidState(format!(
            "A non-cancelled contract already exists for booking {}. ",
            booking_id
        )));
    }

    let contract = model::Contract {
        id: store.allocate_id(),
        booking_id,
        terms: terms
            .into_iter()
            .enumerate()
            .map(|(index, term)| model::ContractTerm {
                number: index as i32 + 1,
                title: term.title,
                content: term.content,
            })
            .collect(),
        status: model::ContractStatus::PendingAdminSignature,
        admin_signed_at: None,
        renter_signed_at: None,
        created_at: Utc::now(),
    };
    store.insert_contract(contract.clone());
    tracing::info!(contract_id = contract.id, booking_id, "contract created");
    Ok(contract)
}

pub fn cancel_contract(
    store: &Store,
    contract_id: i32,
) -> Result<model::Contract, FleetdeskError> {
    let mut contract = store
        .contract_entry(contract_id)
        .ok_or(FleetdeskError::NotFound {
            entity: "contract",
            id: contract_id,
        })?;

    if contract.status.is_terminal() {
        return Err(FleetdeskError::InvalidState(format!(
            "Contract {} is already {:?}. ",
            contract_id, contract.status
        )));
    }
    contract.status = model::ContractStatus::Cancelled;
    tracing::info!(contract_id, "contract cancelled");
    Ok(contract.clone())
}

fn generate_code() -> String {
    rand::rng().random_range(100000..=999999).to_string()
}

/// Issues a fresh challenge for the (contract, role) slot, invalidating any
/// prior unconsumed one. Delivery is fire-and-forget: a dispatch failure is
/// logged and surfaced as a warning, it never rolls back the challenge.
pub fn request_otp(
    store: &Store,
    notifier: &dyn OtpNotifier,
    contract_id: i32,
    role: model::SignerRole,
) -> Result<OtpIssueReply, FleetdeskError> {
    let contract = store
        .contract_entry(contract_id)
        .ok_or(FleetdeskError::NotFound {
            entity: "contract",
            id: contract_id,
        })?;

    if contract.status.is_terminal() {
        return Err(FleetdeskError::InvalidState(format!(
            "Contract {} is {:?}; nothing is left to sign. ",
            contract_id, contract.status
        )));
    }
    let slot_signed = match role {
        model::SignerRole::Admin => contract.admin_signed_at.is_some(),
        model::SignerRole::Renter => contract.renter_signed_at.is_some(),
    };
    if slot_signed {
        return Err(FleetdeskError::AlreadySigned);
    }

    let now = Utc::now();
    let challenge = model::OtpChallenge {
        contract_id,
        role,
        code: generate_code(),
        issued_at: now,
        expires_at: now + store.config.otp_ttl,
        consumed: false,
    };
    // Overwrites the previous challenge for the same slot.
    store
        .challenges
        .insert((contract_id, role), challenge.clone());

    let dispatch_warning = match notifier.send_otp(contract_id, role, &challenge.code) {
        Ok(()) => None,
        Err(error) => {
            tracing::warn!(contract_id, ?role, %error, "otp dispatch failed");
            Some(String::from(
                "The signing code was issued but could not be delivered; request a new one if it does not arrive. ",
            ))
        }
    };

    Ok(OtpIssueReply {
        contract: contract.clone(),
        role,
        expires_at: challenge.expires_at,
        dispatch_warning,
    })
}

/// Verifies the challenge and records the signature. Admin signs first,
/// moving the contract to ADMIN_SIGNED; the renter counter-signs after that,
/// moving it to FULLY_SIGNED.
pub fn verify_and_sign(
    store: &Store,
    contract_id: i32,
    role: model::SignerRole,
    code: &str,
) -> Result<model::Contract, FleetdeskError> {
    let mut contract = store
        .contract_entry(contract_id)
        .ok_or(FleetdeskError::NotFound {
            entity: "contract",
            id: contract_id,
        })?;

    let Some(mut challenge) = store.challenges.get_mut(&(contract_id, role)) else {
        // No challenge was ever issued for this slot.
        if contract.status == model::ContractStatus::Cancelled {
            return Err(FleetdeskError::InvalidState(format!(
                "Contract {} has been cancelled. ",
                contract_id
            )));
        }
        return Err(FleetdeskError::AlreadySigned);
    };

    if challenge.consumed {
        return Err(FleetdeskError::OtpAlreadyUsed);
    }
    if challenge.expires_at < Utc::now() {
        return Err(FleetdeskError::OtpExpired);
    }
    if challenge.code != code {
        return Err(FleetdeskError::OtpInvalid);
    }

    if contract.status == model::ContractStatus::Cancelled {
        return Err(FleetdeskError::InvalidState(format!(
            "Contract {} has been cancelled. ",
            contract_id
        )));
    }

    let now = Utc::now();
    match role {
        model::SignerRole::Admin => {
            if contract.admin_signed_at.is_some() {
                return Err(FleetdeskError::AlreadySigned);
            }
            challenge.consumed = true;
            contract.admin_signed_at = Some(now);
            contract.status = model::ContractStatus::AdminSigned;
        }
        model::SignerRole::Renter => {
            if contract.renter_signed_at.is_some() {
                return Err(FleetdeskError::AlreadySigned);
            }
            if contract.status != model::ContractStatus::AdminSigned {
                return Err(FleetdeskError::PreconditionFailed(vec![String::from(
                    "the contract must be signed by the admin before the renter can sign",
                )]));
            }
            challenge.consumed = true;
            contract.renter_signed_at = Some(now);
            contract.status = model::ContractStatus::FullySigned;
        }
    }
    tracing::info!(contract_id, ?role, status = ?contract.status, "contract signed");
    Ok(contract.clone())
}
