mod deposit;

use warp::Filter;

pub fn webhook() -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("webhook").and(deposit::main()).and(warp::path::end())
}
