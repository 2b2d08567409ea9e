mod api;
mod helper_model;
mod integration;
mod methods;
mod model;
mod store;

use once_cell::sync::Lazy;
use warp::Filter;

use crate::integration::blob_store::{BlobStore, StaticBlobStore};
use crate::integration::notifier::{LogNotifier, OtpNotifier};

pub static STORE: Lazy<store::Store> = Lazy::new(store::Store::from_env);

pub static NOTIFIER: Lazy<Box<dyn OtpNotifier>> = Lazy::new(|| Box::new(LogNotifier));

pub static BLOB_STORE: Lazy<Box<dyn BlobStore>> =
    Lazy::new(|| Box::new(StaticBlobStore::new(STORE.config.image_base_url.clone())));

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|port| port.parse::<u16>().ok())
        .unwrap_or(3030);

    // routing for the server
    let httpd = api::api().and(warp::path::end());
    tracing::info!(port, "fleetdesk-httpd listening");
    warp::serve(httpd).run(([127, 0, 0, 1], port)).await;
}
