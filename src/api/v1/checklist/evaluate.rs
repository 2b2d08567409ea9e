use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::helper_model::ActorRole;
use crate::{STORE, helper_model, methods};

pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("evaluate")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<helper_model::ChecklistQuery>())
        .and(warp::header::<i32>("x-actor-id"))
        .and(warp::header::<String>("x-actor-role"))
        .and_then(
            async move |query: helper_model::ChecklistQuery, actor_id: i32, actor_role: String| {
                if let Err(error) = methods::actors::authenticate(
                    actor_id,
                    &actor_role,
                    &[ActorRole::Admin, ActorRole::Staff, ActorRole::Renter],
                ) {
                    return methods::standard_replies::error_reply(error);
                }
                match methods::checklist::evaluate(&STORE, query.booking_id, query.phase) {
                    Ok(report) => {
                        methods::standard_replies::response_with_obj(report, StatusCode::OK)
                    }
                    Err(error) => methods::standard_replies::error_reply(error),
                }
            },
        )
}
