use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::helper_model::ActorRole;
use crate::{STORE, helper_model, methods};

/// One round trip for the whole booking screen: the booking, its active
/// contract, every captured image and every invoice.
pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("get")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<helper_model::BookingQuery>())
        .and(warp::header::<i32>("x-actor-id"))
        .and(warp::header::<String>("x-actor-role"))
        .and_then(
            async move |query: helper_model::BookingQuery, actor_id: i32, actor_role: String| {
                if let Err(error) = methods::actors::authenticate(
                    actor_id,
                    &actor_role,
                    &[ActorRole::Admin, ActorRole::Staff, ActorRole::Renter],
                ) {
                    return methods::standard_replies::error_reply(error);
                }
                let Some(booking) = STORE.booking(query.booking_id) else {
                    return methods::standard_replies::error_reply(
                        crate::helper_model::FleetdeskError::NotFound {
                            entity: "booking",
                            id: query.booking_id,
                        },
                    );
                };
                let bundle = helper_model::BookingBundle {
                    contract: STORE.active_contract_for_booking(booking.id),
                    images: STORE.images_for_booking(booking.id),
                    invoices: STORE.invoices_for_booking(booking.id),
                    booking,
                };
                methods::standard_replies::response_with_obj(bundle, StatusCode::OK)
            },
        )
}
