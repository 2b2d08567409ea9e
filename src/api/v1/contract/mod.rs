mod cancel;
mod new;
mod request_otp;
mod verify_sign;

use warp::Filter;

pub fn api_v1_contract()
-> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("contract")
        .and(
            new::main()
                .or(cancel::main())
                .or(request_otp::main())
                .or(verify_sign::main()),
        )
        .and(warp::path::end())
}
