use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::{STORE, helper_model, methods};

/// Deposit status notice from the payment provider. Authenticated upstream
/// at the ingress (signature check), like the rest of the webhook surface.
pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("deposit")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and_then(async move |body: helper_model::DepositNoticeRequest| {
            if body.booking_id <= 0 {
                return methods::standard_replies::bad_request("Bad request: wrong parameters. ");
            }
            match methods::lifecycle::record_deposit_status(
                &STORE,
                body.booking_id,
                body.deposit_status,
            ) {
                Ok(booking) => {
                    methods::standard_replies::response_with_obj(booking, StatusCode::OK)
                }
                Err(error) => methods::standard_replies::error_reply(error),
            }
        })
}
