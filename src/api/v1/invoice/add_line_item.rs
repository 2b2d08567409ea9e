use rust_decimal::Decimal;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::helper_model::ActorRole;
use crate::{STORE, helper_model, methods};

pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("add-line-item")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(warp::header::<i32>("x-actor-id"))
        .and(warp::header::<String>("x-actor-role"))
        .and_then(
            async move |body: helper_model::AddLineItemRequest, actor_id: i32, actor_role: String| {
                if let Err(error) = methods::actors::authenticate(
                    actor_id,
                    &actor_role,
                    &[ActorRole::Admin, ActorRole::Staff],
                ) {
                    return methods::standard_replies::error_reply(error);
                }
                if body.invoice_id <= 0
                    || body.item_name.trim().is_empty()
                    || body.unit_price < Decimal::ZERO
                {
                    return methods::standard_replies::bad_request("Bad request: wrong parameters. ");
                }
                match methods::settlement::add_line_item(
                    &STORE,
                    body.invoice_id,
                    body.item_name.trim().to_string(),
                    body.quantity,
                    body.unit_price,
                ) {
                    Ok(invoice) => {
                        methods::standard_replies::response_with_obj(invoice, StatusCode::OK)
                    }
                    Err(error) => methods::standard_replies::error_reply(error),
                }
            },
        )
}
