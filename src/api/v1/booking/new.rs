use rust_decimal::Decimal;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::helper_model::ActorRole;
use crate::{STORE, helper_model, methods, model};

pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("new")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(warp::header::<i32>("x-actor-id"))
        .and(warp::header::<String>("x-actor-role"))
        .and_then(
            async move |body: helper_model::NewBookingRequest, actor_id: i32, actor_role: String| {
                if let Err(error) = methods::actors::authenticate(
                    actor_id,
                    &actor_role,
                    &[ActorRole::Admin, ActorRole::Staff, ActorRole::Renter],
                ) {
                    return methods::standard_replies::error_reply(error);
                }
                if body.renter_id <= 0
                    || body.vehicle_id <= 0
                    || body.rsvp_drop_off_time <= body.rsvp_pickup_time
                    || body.total_price < Decimal::ZERO
                    || body.deposit_amount < Decimal::ZERO
                {
                    return methods::standard_replies::bad_request("Bad request: wrong parameters. ");
                }
                let booking = STORE.insert_booking(model::NewBooking {
                    renter_id: body.renter_id,
                    vehicle_id: body.vehicle_id,
                    rsvp_pickup_time: body.rsvp_pickup_time,
                    rsvp_drop_off_time: body.rsvp_drop_off_time,
                    hourly_rate: body.hourly_rate,
                    daily_rate: body.daily_rate,
                    total_price: body.total_price,
                    deposit_amount: body.deposit_amount,
                });
                tracing::info!(booking_id = booking.id, renter_id = booking.renter_id, "booking reserved");
                methods::standard_replies::response_with_obj(booking, StatusCode::CREATED)
            },
        )
}
