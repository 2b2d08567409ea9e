use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::helper_model::ActorRole;
use crate::{STORE, helper_model, methods};

pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("verify-sign")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(warp::header::<i32>("x-actor-id"))
        .and(warp::header::<String>("x-actor-role"))
        .and_then(
            async move |body: helper_model::VerifySignRequest, actor_id: i32, actor_role: String| {
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
                if body.contract_id <= 0 || body.code.trim().is_empty() {
                    return methods::standard_replies::bad_request("Bad request: wrong parameters. ");
                }
                match methods::signing::verify_and_sign(
                    &STORE,
                    body.contract_id,
                    body.role,
                    body.code.trim(),
                ) {
                    Ok(contract) => {
                        methods::standard_replies::response_with_obj(contract, StatusCode::OK)
                    }
                    Err(error) => methods::standard_replies::error_reply(error),
                }
            },
        )
}
