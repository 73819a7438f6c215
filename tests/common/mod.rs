#![allow(dead_code)]

use absaar_cloud_rs::api;
use absaar_cloud_rs::model::Api;
use absaar_cloud_rs::state::{MemoryStore, StateValue};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "user";
pub const PASSWORD: &str = "secret";

pub fn api_for(server: &MockServer) -> Api {
    api::api(server.uri(), USERNAME.to_string(), PASSWORD.to_string()).unwrap()
}

pub async fn mount_login(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/dn/userLogin"))
        .and(body_json(json!({"username": USERNAME, "password": PASSWORD})))
        .respond_with(response)
        .mount(server)
        .await;
}

pub async fn mount_valid_login(server: &MockServer) {
    mount_login(
        server,
        ResponseTemplate::new(200).set_body_json(json!({"token": "T1", "userId": "U1"})),
    )
    .await;
}

pub async fn mount_stations(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/dn/power/station/listApp"))
        .and(header("Authorization", "T1"))
        .and(body_json(json!({"userId": "U1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_roof_station(server: &MockServer) {
    mount_stations(
        server,
        json!({"rows": [{
            "powerId": "P1",
            "powerName": "Roof",
            "dailyPowerGeneration": 12.3,
            "totalPowerGeneration": 500.1
        }]}),
    )
    .await;
}

pub async fn mount_collectors(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/dn/power/collector/listByApp"))
        .and(header("Authorization", "T1"))
        .and(body_json(json!({"powerId": "P1"})))
        .respond_with(response)
        .mount(server)
        .await;
}

pub async fn mount_inverter_data(server: &MockServer, inverter_id: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/dn/power/inverterData/inverterDatalist"))
        .and(header("Authorization", "T1"))
        .and(body_json(json!({"powerId": "P1", "inverterId": inverter_id})))
        .respond_with(response)
        .mount(server)
        .await;
}

pub fn value(store: &MemoryStore, key: &str) -> Option<StateValue> {
    store.state(key).unwrap().map(|state| state.val)
}

pub fn inv_keys(store: &MemoryStore) -> Vec<String> {
    store
        .keys()
        .unwrap()
        .into_iter()
        .filter(|key| key.starts_with("inv."))
        .collect()
}
