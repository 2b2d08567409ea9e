mod approve;
mod check_in;
mod check_out;
mod get;
mod new;
mod reject;

use warp::Filter;

pub fn api_v1_booking()
-> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("booking")
        .and(
            new::main()
                .or(approve::main())
                .or(reject::main())
                .or(check_in::main())
                .or(check_out::main())
                .or(get::main()),
        )
        .and(warp::path::end())
}
