use crate::helper_model::{Actor, ActorRole, FleetdeskError};
use crate::model;

fn parse_role(role: &str) -> Option<ActorRole> {
    match role {
        "admin" => Some(ActorRole::Admin),
        "staff" => Some(ActorRole::Staff),
        "renter" => Some(ActorRole::Renter),
        _ => None,
    }
}

/// Builds the caller identity from the trusted identity-provider headers and
/// enforces the operation's role guard. The core never verifies credentials
/// itself; the session layer in front of it already has.
pub fn authenticate(
    actor_id: i32,
    role: &str,
    allowed: &[ActorRole],
) -> Result<Actor, FleetdeskError> {
    let role = parse_role(role).ok_or_else(|| {
        FleetdeskError::PermissionDenied(String::from("Unknown actor role. "))
    })?;
    if actor_id <= 0 {
        return Err(FleetdeskError::PermissionDenied(String::from(
            "Invalid actor id. ",
        )));
    }
    if !allowed.contains(&role) {
        return Err(FleetdeskError::PermissionDenied(String::from(
            "You do not have permission to perform this action. ",
        )));
    }
    Ok(Actor { id: actor_id, role })
}

/// Admin-role challenges may only be touched by an admin; renter-role
/// challenges may be triggered by anyone authenticated (the staff member
/// hands the counter device to the renter).
pub fn check_signer_access(
    actor: &Actor,
    signer_role: model::SignerRole,
) -> Result<(), FleetdeskError> {
    if signer_role == model::SignerRole::Admin && actor.role != ActorRole::Admin {
        return Err(FleetdeskError::PermissionDenied(String::from(
            "Only an admin may handle the admin signature. ",
        )));
    }
    Ok(())
}
