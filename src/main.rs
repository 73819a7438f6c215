#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate prometheus;
#[macro_use]
extern crate rocket;

use absaar_cloud_rs::state::Publisher;
use absaar_cloud_rs::{api, poller, settings};
use rocket::http::ContentType;
use rocket::State;
use std::sync::Arc;

mod metrics;

const API_URL: &str = "https://mini-ems.com:8081";

/// Structure containing state for API handlers.
pub struct StateData {
    publisher: Arc<Publisher<metrics::ExportedStore>>,
}

#[get("/metrics")]
fn metrics_route() -> Result<String, api::Error> {
    metrics::read()
}

#[get("/states")]
fn states_route(state: &State<StateData>) -> Result<(ContentType, String), api::Error> {
    let snapshot = state.publisher.store().snapshot()?;

    serde_json::to_string_pretty(&snapshot)
        .map(|json| (ContentType::JSON, json))
        .or(Err(api::Error::FormatError))
}

#[rocket::main]
async fn main() -> Result<(), rocket::Error> {
    env_logger::init();

    let publisher = Arc::new(Publisher::new(metrics::ExportedStore::default()));

    /* Without credentials the poller stays idle for the lifetime of the process */
    let poller = settings::read_settings()
        .and_then(|settings| {
            poller::start(
                API_URL.to_string(),
                &settings,
                publisher.clone(),
                poller::SCAN_INTERVAL,
            )
        })
        .map_err(|e| log::error!("Polling disabled: {}", e))
        .ok();

    let _rocket = rocket::build()
        .manage(StateData { publisher })
        .mount("/", routes![metrics_route, states_route])
        .launch()
        .await?;

    if let Some(poller) = poller {
        poller.stop().await;
    }

    Ok(())
}
