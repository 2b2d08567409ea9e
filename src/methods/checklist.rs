use std::collections::BTreeSet;

use chrono::Utc;
use serde_derive::{Deserialize, Serialize};

use crate::helper_model::FleetdeskError;
use crate::model;
use crate::store::Store;

/// Completion state of one documentation phase. Pure read, consumed as a
/// guard by the lifecycle transitions and exposed as-is to the console.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ChecklistReport {
    pub booking_id: i32,
    pub phase: model::ImageType,
    pub required: Vec<String>,
    pub captured: Vec<String>,
    pub missing: Vec<String>,
    pub completion_percentage: f64,
    pub is_complete: bool,
}

pub fn evaluate(
    store: &Store,
    booking_id: i32,
    phase: model::ImageType,
) -> Result<ChecklistReport, FleetdeskError> {
    if store.booking(booking_id).is_none() {
        return Err(FleetdeskError::NotFound {
            entity: "booking",
            id: booking_id,
        });
    }
    Ok(report(store, booking_id, phase))
}

/// The evaluation itself, without the existence check. Used by the lifecycle
/// guards, which already hold the booking's store entry and must not touch
/// the bookings map again.
pub(crate) fn report(store: &Store, booking_id: i32, phase: model::ImageType) -> ChecklistReport {
    let required: BTreeSet<String> = store
        .config
        .required_for(phase)
        .iter()
        .cloned()
        .collect();
    let captured: BTreeSet<String> = store
        .images_for_phase(booking_id, phase)
        .into_iter()
        .map(|image| image.vehicle_component)
        .collect();

    let missing: Vec<String> = required.difference(&captured).cloned().collect();
    // Extra documentation outside the required set is tolerated and does not
    // count towards (or against) completion.
    let captured_required = required.intersection(&captured).count();

    let completion_percentage = if required.is_empty() {
        // Vacuously complete.
        100.0
    } else {
        captured_required as f64 / required.len() as f64 * 100.0
    };

    ChecklistReport {
        booking_id,
        phase,
        required: required.into_iter().collect(),
        captured: captured.into_iter().collect(),
        is_complete: missing.is_empty(),
        missing,
        completion_percentage,
    }
}

/// Whether the phase is still open for documentation changes given the
/// booking's position in the lifecycle. Once a transition has consumed a
/// phase its photo set is frozen.
fn phase_is_open(phase: model::ImageType, status: model::BookingStatus) -> bool {
    match phase {
        model::ImageType::BeforeRental => matches!(
            status,
            model::BookingStatus::Reserved | model::BookingStatus::Confirmed
        ),
        model::ImageType::AfterRental => status == model::BookingStatus::InProgress,
        model::ImageType::Damage => matches!(
            status,
            model::BookingStatus::InProgress | model::BookingStatus::Completed
        ),
    }
}

pub fn capture_image(
    store: &Store,
    booking_id: i32,
    image_type: model::ImageType,
    vehicle_component: String,
    description: String,
    image_link: String,
) -> Result<model::BookingImage, FleetdeskError> {
    let booking = store
        .booking_entry(booking_id)
        .ok_or(FleetdeskError::NotFound {
            entity: "booking",
            id: booking_id,
        })?;

    if !phase_is_open(image_type, booking.status) {
        return Err(FleetdeskError::InvalidState(format!(
            "The {:?} documentation of booking {} is closed in status {:?}. ",
            image_type, booking_id, booking.status
        )));
    }

    let image = model::BookingImage {
        id: store.allocate_id(),
        booking_id,
        image_type,
        vehicle_component,
        description,
        image_link,
        captured_at: Utc::now(),
    };

    let mut images = store.images.entry(booking_id).or_default();
    if image_type != model::ImageType::Damage {
        // Re-capture replaces the slot, it never duplicates it.
        images.retain(|existing| {
            existing.image_type != image_type
                || existing.vehicle_component != image.vehicle_component
        });
    }
    images.push(image.clone());
    Ok(image)
}

pub fn delete_image(
    store: &Store,
    booking_id: i32,
    image_id: i32,
) -> Result<model::BookingImage, FleetdeskError> {
    let booking = store
        .booking_entry(booking_id)
        .ok_or(FleetdeskError::NotFound {
            entity: "booking",
            id: booking_id,
        })?;

    let mut images = store
        .images
        .get_mut(&booking_id)
        .ok_or(FleetdeskError::NotFound {
            entity: "booking image",
            id: image_id,
        })?;
    let position = images
        .iter()
        .position(|image| image.id == image_id)
        .ok_or(FleetdeskError::NotFound {
            entity: "booking image",
            id: image_id,
        })?;

    if !phase_is_open(images[position].image_type, booking.status) {
        return Err(FleetdeskError::InvalidState(format!(
            "The {:?} documentation of booking {} is closed in status {:?}. ",
            images[position].image_type, booking_id, booking.status
        )));
    }

    Ok(images.remove(position))
}
