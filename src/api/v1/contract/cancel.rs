use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::helper_model::ActorRole;
use crate::{STORE, helper_model, methods};

pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("cancel")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(warp::header::<i32>("x-actor-id"))
        .and(warp::header::<String>("x-actor-role"))
        .and_then(
            async move |body: helper_model::ContractActionRequest, actor_id: i32, actor_role: String| {
                if let Err(error) =
                    methods::actors::authenticate(actor_id, &actor_role, &[ActorRole::Admin])
                {
                    return methods::standard_replies::error_reply(error);
                }
                if body.contract_id <= 0 {
                    return methods::standard_replies::bad_request("Bad request: wrong parameters. ");
                }
                match methods::signing::cancel_contract(&STORE, body.contract_id) {
                    Ok(contract) => {
                        methods::standard_replies::response_with_obj(contract, StatusCode::OK)
                    }
                    Err(error) => methods::standard_replies::error_reply(error),
                }
            },
        )
}
