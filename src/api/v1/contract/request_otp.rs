use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::helper_model::ActorRole;
use crate::{NOTIFIER, STORE, helper_model, methods};

pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("request-otp")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(warp::header::<i32>("x-actor-id"))
        .and(warp::header::<String>("x-actor-role"))
        .and_then(
            async move |body: helper_model::ContractOtpRequest, actor_id: i32, actor_role: String| {
                let actor = match methods::actors::authenticate(
                    actor_id,
                    &actor_role,
                    &[ActorRole::Admin, ActorRole::Staff, ActorRole::Renter],
                ) {
                    Ok(actor) => actor,
                    Err(error) => return methods::standard_replies::error_reply(error),
                };
                if let Err(error) = methods::actors::check_signer_access(&actor, body.role) {
                    return methods::standard_replies::error_reply(error);
                }
                if body.contract_id <= 0 {
                    return methods::standard_replies::bad_request("Bad request: wrong parameters. ");
                }
                match methods::signing::request_otp(
                    &STORE,
                    NOTIFIER.as_ref(),
                    body.contract_id,
                    body.role,
                ) {
                    Ok(reply) => methods::standard_replies::response_with_obj(reply, StatusCode::OK),
                    Err(error) => methods::standard_replies::error_reply(error),
                }
            },
        )
}
