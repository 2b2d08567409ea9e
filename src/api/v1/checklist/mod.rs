mod delete_image;
mod evaluate;
mod upload_image;

use warp::Filter;

pub fn api_v1_checklist()
-> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("checklist")
        .and(
            upload_image::main()
                .or(delete_image::main())
                .or(evaluate::main()),
        )
        .and(warp::path::end())
}
