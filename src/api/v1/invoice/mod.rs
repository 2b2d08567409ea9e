mod add_line_item;
mod cash_payment;
mod open_final;
mod refund;
mod remove_line_item;

use warp::Filter;

pub fn api_v1_invoice()
-> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("invoice")
        .and(
            open_final::main()
                .or(add_line_item::main())
                .or(remove_line_item::main())
                .or(cash_payment::main())
                .or(refund::main()),
        )
        .and(warp::path::end())
}
