mod booking;
mod checklist;
mod contract;
mod invoice;

use warp::Filter;

pub fn api_v1() -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("v1")
        .and(
            booking::api_v1_booking()
                .or(contract::api_v1_contract())
                .or(checklist::api_v1_checklist())
                .or(invoice::api_v1_invoice()),
        )
        .and(warp::path::end())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use serde_json::json;

    use crate::{helper_model, model};

    fn new_booking_body() -> serde_json::Value {
        json!({
            "renter_id": 12,
            "vehicle_id": 3,
            "rsvp_pickup_time": Utc::now(),
            "rsvp_drop_off_time": Utc::now() + Duration::hours(24),
            "hourly_rate": "25000",
            "daily_rate": "400000",
            "total_price": "300000",
            "deposit_amount": "2000000",
        })
    }

    async fn reserve_booking() -> model::Booking {
        let reply = warp::test::request()
            .method("POST")
            .path("/api/v1/booking/new")
            .header("x-actor-id", "12")
            .header("x-actor-role", "renter")
            .json(&new_booking_body())
            .reply(&crate::api::api())
            .await;
        assert_eq!(reply.status(), 201);
        serde_json::from_slice(reply.body()).unwrap()
    }

    #[tokio::test]
    async fn booking_is_created_and_read_back_as_a_bundle() {
        let booking = reserve_booking().await;
        assert_eq!(booking.status, model::BookingStatus::Reserved);
        assert_eq!(booking.deposit_status, model::DepositStatus::Pending);

        let reply = warp::test::request()
            .method("GET")
            .path(&format!("/api/v1/booking/get?booking_id={}", booking.id))
            .header("x-actor-id", "12")
            .header("x-actor-role", "renter")
            .reply(&crate::api::api())
            .await;
        assert_eq!(reply.status(), 200);
        let bundle: helper_model::BookingBundle = serde_json::from_slice(reply.body()).unwrap();
        assert_eq!(bundle.booking.id, booking.id);
        assert!(bundle.contract.is_none());
        assert!(bundle.images.is_empty());
        assert!(bundle.invoices.is_empty());
    }

    #[tokio::test]
    async fn approval_is_admin_only_and_deposit_gated() {
        let booking = reserve_booking().await;
        let body = json!({ "booking_id": booking.id });

        let reply = warp::test::request()
            .method("POST")
            .path("/api/v1/booking/approve")
            .header("x-actor-id", "7")
            .header("x-actor-role", "staff")
            .json(&body)
            .reply(&crate::api::api())
            .await;
        assert_eq!(reply.status(), 403);

        // Unpaid deposit blocks even the admin.
        let reply = warp::test::request()
            .method("POST")
            .path("/api/v1/booking/approve")
            .header("x-actor-id", "1")
            .header("x-actor-role", "admin")
            .json(&body)
            .reply(&crate::api::api())
            .await;
        assert_eq!(reply.status(), 412);
        let error: helper_model::ErrorResponse = serde_json::from_slice(reply.body()).unwrap();
        assert_eq!(error.error, "PreconditionFailed");
        assert!(error.missing.is_some());

        let reply = warp::test::request()
            .method("POST")
            .path("/webhook/deposit")
            .json(&json!({ "booking_id": booking.id, "deposit_status": "PAID" }))
            .reply(&crate::api::api())
            .await;
        assert_eq!(reply.status(), 200);

        let reply = warp::test::request()
            .method("POST")
            .path("/api/v1/booking/approve")
            .header("x-actor-id", "1")
            .header("x-actor-role", "admin")
            .json(&body)
            .reply(&crate::api::api())
            .await;
        assert_eq!(reply.status(), 200);
        let confirmed: model::Booking = serde_json::from_slice(reply.body()).unwrap();
        assert_eq!(confirmed.status, model::BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn checklist_evaluation_reads_through_the_query_string() {
        let booking = reserve_booking().await;
        let reply = warp::test::request()
            .method("GET")
            .path(&format!(
                "/api/v1/checklist/evaluate?booking_id={}&phase=BEFORE_RENTAL",
                booking.id
            ))
            .header("x-actor-id", "7")
            .header("x-actor-role", "staff")
            .reply(&crate::api::api())
            .await;
        assert_eq!(reply.status(), 200);
        let report: crate::methods::checklist::ChecklistReport =
            serde_json::from_slice(reply.body()).unwrap();
        assert_eq!(report.required.len(), 7);
        assert!(!report.is_complete);
    }

    #[tokio::test]
    async fn renter_can_withdraw_their_reservation_over_http() {
        let booking = reserve_booking().await;
        let reply = warp::test::request()
            .method("POST")
            .path("/api/v1/booking/reject")
            .header("x-actor-id", "12")
            .header("x-actor-role", "renter")
            .json(&json!({ "booking_id": booking.id }))
            .reply(&crate::api::api())
            .await;
        assert_eq!(reply.status(), 200);
        let cancelled: model::Booking = serde_json::from_slice(reply.body()).unwrap();
        assert_eq!(cancelled.status, model::BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn unknown_booking_maps_to_not_found() {
        let reply = warp::test::request()
            .method("POST")
            .path("/api/v1/booking/approve")
            .header("x-actor-id", "1")
            .header("x-actor-role", "admin")
            .json(&json!({ "booking_id": 999_999 }))
            .reply(&crate::api::api())
            .await;
        assert_eq!(reply.status(), 404);
    }

    #[tokio::test]
    async fn admin_otp_request_is_denied_for_staff() {
        let booking = reserve_booking().await;
        let reply = warp::test::request()
            .method("POST")
            .path("/api/v1/contract/new")
            .header("x-actor-id", "7")
            .header("x-actor-role", "staff")
            .json(&json!({
                "booking_id": booking.id,
                "terms": [{ "title": "Fuel policy", "content": "Return full." }],
            }))
            .reply(&crate::api::api())
            .await;
        assert_eq!(reply.status(), 201);
        let contract: model::Contract = serde_json::from_slice(reply.body()).unwrap();

        let reply = warp::test::request()
            .method("POST")
            .path("/api/v1/contract/request-otp")
            .header("x-actor-id", "7")
            .header("x-actor-role", "staff")
            .json(&json!({ "contract_id": contract.id, "role": "ADMIN" }))
            .reply(&crate::api::api())
            .await;
        assert_eq!(reply.status(), 403);

        // The renter slot is fair game for the same staff member.
        let reply = warp::test::request()
            .method("POST")
            .path("/api/v1/contract/request-otp")
            .header("x-actor-id", "7")
            .header("x-actor-role", "staff")
            .json(&json!({ "contract_id": contract.id, "role": "RENTER" }))
            .reply(&crate::api::api())
            .await;
        assert_eq!(reply.status(), 200);
    }

    #[tokio::test]
    async fn settlement_rejects_a_mismatched_cash_amount() {
        let booking = reserve_booking().await;
        crate::methods::lifecycle::record_deposit_status(
            &crate::STORE,
            booking.id,
            model::DepositStatus::Paid,
        )
        .unwrap();
        crate::methods::lifecycle::approve_booking(&crate::STORE, booking.id).unwrap();
        for component in crate::STORE
            .config
            .required_for(model::ImageType::BeforeRental)
            .to_vec()
        {
            crate::methods::checklist::capture_image(
                &crate::STORE,
                booking.id,
                model::ImageType::BeforeRental,
                component.clone(),
                String::from("walkaround shot"),
                format!("https://cdn.test/{component}.jpg"),
            )
            .unwrap();
        }
        let staff = helper_model::Actor {
            id: 7,
            role: helper_model::ActorRole::Staff,
        };
        crate::methods::lifecycle::confirm_check_in(&crate::STORE, &staff, booking.id).unwrap();

        let reply = warp::test::request()
            .method("POST")
            .path("/api/v1/invoice/open-final")
            .header("x-actor-id", "7")
            .header("x-actor-role", "staff")
            .json(&json!({ "booking_id": booking.id }))
            .reply(&crate::api::api())
            .await;
        assert_eq!(reply.status(), 201);
        let invoice: model::Invoice = serde_json::from_slice(reply.body()).unwrap();
        assert_eq!(invoice.total_amount, Decimal::from(300_000));

        // Deposit covers the total, so there is no outstanding amount to pay.
        let reply = warp::test::request()
            .method("POST")
            .path("/api/v1/invoice/cash-payment")
            .header("x-actor-id", "7")
            .header("x-actor-role", "staff")
            .json(&json!({ "invoice_id": invoice.id, "amount": "300000" }))
            .reply(&crate::api::api())
            .await;
        assert_eq!(reply.status(), 409);
        let error: helper_model::ErrorResponse = serde_json::from_slice(reply.body()).unwrap();
        assert_eq!(error.error, "AmountMismatch");
    }
}
