use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::helper_model::ActorRole;
use crate::{BLOB_STORE, STORE, helper_model, methods};

pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("upload-image")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(warp::header::<i32>("x-actor-id"))
        .and(warp::header::<String>("x-actor-role"))
        .and_then(
            async move |body: helper_model::UploadImageRequest, actor_id: i32, actor_role: String| {
                if let Err(error) = methods::actors::authenticate(
                    actor_id,
                    &actor_role,
                    &[ActorRole::Admin, ActorRole::Staff],
                ) {
                    return methods::standard_replies::error_reply(error);
                }
                if body.booking_id <= 0
                    || body.vehicle_component.trim().is_empty()
                    || body.file_path.trim().is_empty()
                {
                    return methods::standard_replies::bad_request("Bad request: wrong parameters. ");
                }
                let image_link = match BLOB_STORE.put(&body.file_path) {
                    Ok(link) => link,
                    Err(error) => {
                        return methods::standard_replies::internal_server_error_response(
                            error.to_string(),
                        );
                    }
                };
                match methods::checklist::capture_image(
                    &STORE,
                    body.booking_id,
                    body.image_type,
                    body.vehicle_component.trim().to_uppercase(),
                    body.description,
                    image_link,
                ) {
                    Ok(image) => {
                        methods::standard_replies::response_with_obj(image, StatusCode::CREATED)
                    }
                    Err(error) => methods::standard_replies::error_reply(error),
                }
            },
        )
}
