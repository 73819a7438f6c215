mod common;

use absaar_cloud_rs::poller;
use absaar_cloud_rs::settings::Settings;
use absaar_cloud_rs::state::{MemoryStore, Publisher, StateValue};
use absaar_cloud_rs::Error;
use common::*;
use std::sync::Arc;
use std::time::Duration;
use serde_json::json;
use wiremock::{MockServer, ResponseTemplate};

fn settings() -> Settings {
    Settings {
        username: Some(USERNAME.to_string()),
        password: Some(PASSWORD.to_string()),
        station_index: 0,
    }
}

async fn login_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == "/dn/userLogin")
        .count()
}

#[tokio::test]
async fn missing_credentials_keep_poller_idle() {
    let server = MockServer::start().await;
    let publisher = Arc::new(Publisher::new(MemoryStore::new()));

    let without_password = Settings {
        password: None,
        ..settings()
    };
    let result = poller::start(
        server.uri(),
        &without_password,
        publisher.clone(),
        Duration::from_millis(10),
    );
    assert!(matches!(result, Err(Error::ConfigError(_))));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(0, login_count(&server).await);
    assert!(publisher.store().keys().unwrap().is_empty());
}

#[tokio::test]
async fn first_cycle_runs_immediately() {
    let server = MockServer::start().await;
    mount_valid_login(&server).await;
    mount_roof_station(&server).await;

    let publisher = Arc::new(Publisher::new(MemoryStore::new()));
    let handle = poller::start(
        server.uri(),
        &settings(),
        publisher.clone(),
        Duration::from_secs(3600),
    )
    .unwrap();

    let mut published = None;
    for _ in 0..100 {
        published = value(publisher.store(), "station.P1.totalPower");
        if published.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    handle.stop().await;

    assert_eq!(Some(StateValue::Number(500.1)), published);
    assert_eq!(1, login_count(&server).await);
}

#[tokio::test]
async fn stop_cancels_recurring_cycles() {
    let server = MockServer::start().await;
    mount_valid_login(&server).await;
    mount_roof_station(&server).await;

    let publisher = Arc::new(Publisher::new(MemoryStore::new()));
    let handle = poller::start(
        server.uri(),
        &settings(),
        publisher.clone(),
        Duration::from_millis(50),
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;
    handle.stop().await;

    /* let in-flight cycles settle before taking the reference count */
    tokio::time::sleep(Duration::from_millis(200)).await;
    let after_stop = login_count(&server).await;
    assert!(after_stop >= 2, "expected recurring cycles, got {}", after_stop);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(after_stop, login_count(&server).await);
}

#[tokio::test]
async fn stop_waits_for_running_cycle() {
    let server = MockServer::start().await;
    mount_login(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!({"token": "T1", "userId": "U1"}))
            .set_delay(Duration::from_millis(300)),
    )
    .await;
    mount_roof_station(&server).await;

    let publisher = Arc::new(Publisher::new(MemoryStore::new()));
    let handle = poller::start(
        server.uri(),
        &settings(),
        publisher.clone(),
        Duration::from_secs(3600),
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(value(publisher.store(), "station.P1.totalPower").is_none());
    handle.stop().await;

    assert_eq!(
        Some(StateValue::Number(500.1)),
        value(publisher.store(), "station.P1.totalPower")
    );
}
