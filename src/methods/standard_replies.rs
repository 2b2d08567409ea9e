use warp::http::StatusCode;
use warp::{Rejection, Reply};

use crate::helper_model::{ErrorResponse, FleetdeskError};

pub fn bad_request(err_msg: &str) -> Result<(warp::reply::Response,), Rejection> {
    let msg = ErrorResponse {
        error: String::from("BadRequest"),
        title: String::from("Bad Request"),
        message: err_msg.to_string(),
        missing: None,
    };
    Ok::<_, Rejection>((warp::reply::with_status(
        warp::reply::json(&msg),
        StatusCode::BAD_REQUEST,
    )
    .into_response(),))
}

pub fn internal_server_error_response(msg: String) -> Result<(warp::reply::Response,), Rejection> {
    tracing::error!(%msg, "internal server error");
    let msg = ErrorResponse {
        error: String::from("Internal"),
        title: String::from("Internal Server Error"),
        message: String::from("Please try again later. "),
        missing: None,
    };
    Ok::<_, Rejection>((warp::reply::with_status(
        warp::reply::json(&msg),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
    .into_response(),))
}

pub fn response_with_obj<T>(
    obj: T,
    status_code: StatusCode,
) -> Result<(warp::reply::Response,), Rejection>
where
    T: serde::Serialize,
{
    Ok((warp::reply::with_status(warp::reply::json(&obj), status_code).into_response(),))
}

fn status_for(error: &FleetdeskError) -> StatusCode {
    match error {
        FleetdeskError::NotFound { .. } => StatusCode::NOT_FOUND,
        FleetdeskError::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
        FleetdeskError::InvalidState(_)
        | FleetdeskError::AlreadySigned
        | FleetdeskError::AmountMismatch { .. }
        | FleetdeskError::RefundAlreadyIssued => StatusCode::CONFLICT,
        FleetdeskError::OtpInvalid
        | FleetdeskError::OtpExpired
        | FleetdeskError::OtpAlreadyUsed => StatusCode::NOT_ACCEPTABLE,
        FleetdeskError::PermissionDenied(_) => StatusCode::FORBIDDEN,
    }
}

fn title_for(error: &FleetdeskError) -> &'static str {
    match error {
        FleetdeskError::NotFound { .. } => "Not Found",
        FleetdeskError::PreconditionFailed(_) => "Precondition Failed",
        FleetdeskError::InvalidState(_) => "Invalid State",
        FleetdeskError::OtpInvalid
        | FleetdeskError::OtpExpired
        | FleetdeskError::OtpAlreadyUsed => "Verification Failed",
        FleetdeskError::AlreadySigned => "Signature Not Allowed",
        FleetdeskError::AmountMismatch { .. } => "Amount Mismatch",
        FleetdeskError::RefundAlreadyIssued => "Refund Not Allowed",
        FleetdeskError::PermissionDenied(_) => "Permission Denied",
    }
}

/// Every rejected operation reports its structured kind plus the specific
/// unmet requirements, so the console can show an actionable message.
pub fn error_reply(error: FleetdeskError) -> Result<(warp::reply::Response,), Rejection> {
    let msg = ErrorResponse {
        error: String::from(error.kind()),
        title: String::from(title_for(&error)),
        message: error.to_string(),
        missing: error.missing(),
    };
    Ok((warp::reply::with_status(warp::reply::json(&msg), status_for(&error)).into_response(),))
}
