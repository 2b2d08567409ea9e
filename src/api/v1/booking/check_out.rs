use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::helper_model::ActorRole;
use crate::{STORE, helper_model, methods};

pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("check-out")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(warp::header::<i32>("x-actor-id"))
        .and(warp::header::<String>("x-actor-role"))
        .and_then(
            async move |body: helper_model::BookingActionRequest, actor_id: i32, actor_role: String| {
                if let Err(error) = methods::actors::authenticate(
                    actor_id,
                    &actor_role,
                    &[ActorRole::Admin, ActorRole::Staff],
                ) {
                    return methods::standard_replies::error_reply(error);
                }
                if body.booking_id <= 0 {
                    return methods::standard_replies::bad_request("Bad request: wrong parameters. ");
                }
                match methods::lifecycle::confirm_check_out(&STORE, body.booking_id) {
                    Ok(booking) => {
                        methods::standard_replies::response_with_obj(booking, StatusCode::OK)
                    }
                    Err(error) => methods::standard_replies::error_reply(error),
                }
            },
        )
}
