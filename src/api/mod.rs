pub mod endpoint;
pub mod error;
pub mod response;

use crate::model;
pub use error::Error;
use http::header::AUTHORIZATION;
use response::collector_list::CollectorListByApp;
use response::inverter_data_list::InverterDatalist;
use response::station_list::StationListApp;
use response::user_login::UserLogin;
use serde_json::Value;

use std::collections::HashMap;

const USER_AGENT: &str = "okhttp-okgo/jeasonlzy";

/// Build the API handle together with the HTTP client reused for all requests.
///
/// The vendor endpoint serves a certificate that does not chain to a trusted root, so
/// certificate validation is switched off for this client. No other client is affected.
pub fn api(api_url: String, username: String, password: String) -> Result<model::Api, Error> {
    let client = reqwest::ClientBuilder::new()
        .danger_accept_invalid_certs(true)
        .user_agent(USER_AGENT)
        .build()
        .or(Err(Error::InternalError))?;

    Ok(model::Api {
        api_url,
        username,
        password,
        client,
    })
}

/// Map Non-200 API response to Error
fn map_api_err(error: reqwest::Error) -> Error {
    match error.status() {
        Some(http::StatusCode::TOO_MANY_REQUESTS) => Error::RateExceeded(error.to_string()),
        Some(http::StatusCode::UNAUTHORIZED) => Error::LoginError(error.to_string()),
        _ => Error::ApiError(error.to_string()),
    }
}

/// Process value of valid HTTP response (2xx) to identify API-level errors reported in the
/// `code` field, sent either as a number or as a numeric string. Bodies without `code` are
/// treated as successful.
fn map_response_status(value: Value) -> Result<Value, Error> {
    let code = value.get("code").and_then(|code| match code {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    });

    match code {
        None | Some(200) => Ok(value),
        Some(401) => Err(Error::LoginError(value.to_string())),
        Some(429) => Err(Error::RateExceeded(value.to_string())),
        Some(_) => Err(Error::ApiError(value.to_string())),
    }
}

/// Exchange credentials for a session. Succeeds only on HTTP 200 with a non-empty token and
/// account id; never retried here.
pub async fn login(api: &model::Api) -> Result<model::LoggedInApi, Error> {
    let url = format!("{}{}", api.api_url, endpoint::LOGIN);

    let request_body = HashMap::from([
        ("username", api.username.to_owned()),
        ("password", api.password.to_owned()),
    ]);

    let response = api
        .client
        .post(url)
        .json(&request_body)
        .send()
        .await
        .map_err(|e| Error::LoginError(e.to_string()))?;

    let status = response.status();
    let response_text = response
        .text()
        .await
        .map_err(|e| Error::LoginError(format!("Error reading login response: {}", e)))?;

    log::trace!(
        "endpoint: {}, status: {}, response_text: {}",
        endpoint::LOGIN,
        status,
        response_text
    );

    if status != http::StatusCode::OK {
        return Err(Error::LoginError(format!(
            "Server responded {}: {}",
            status, response_text
        )));
    }

    let login = serde_json::from_str::<UserLogin>(&response_text)
        .map_err(|e| Error::LoginError(format!("{}: {}", e, response_text)))?;

    match (
        login.token.filter(|token| !token.is_empty()),
        login.user_id.filter(|id| !id.is_empty()),
    ) {
        (Some(token), Some(account_id)) => Ok(model::LoggedInApi {
            api_url: api.api_url.to_owned(),
            session: model::Session { token, account_id },
            client: api.client.clone(),
        }),
        _ => Err(Error::LoginError(format!(
            "No token received: {}",
            response_text
        ))),
    }
}

async fn post(
    api: &model::LoggedInApi,
    endpoint: &endpoint::Endpoint,
    data: &HashMap<&str, String>,
) -> Result<Value, Error> {
    let url = format!("{}{}", api.api_url, endpoint);

    let response_text = api
        .client
        .post(url)
        .header(AUTHORIZATION, api.session.token.to_owned())
        .json(data)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(map_api_err)?
        .text()
        .await
        .map_err(|e| Error::ApiError(format!("Error reading API response: {}", e)))?;

    log::trace!(
        "endpoint: {}, data: {:?}, response_text: {}",
        endpoint,
        data,
        response_text
    );

    serde_json::from_str::<Value>(&response_text)
        .map_err(|e| Error::InvalidResponse(response_text, e.to_string()))
        .and_then(map_response_status)
}

/// List the stations of the logged in account. An empty list means "no data", not failure.
pub async fn stations(api: &model::LoggedInApi) -> Result<Vec<model::Station>, Error> {
    let request_body = HashMap::from([("userId", api.session.account_id.to_owned())]);

    post(api, endpoint::STATIONS, &request_body)
        .await
        .map(serde_json::from_value::<StationListApp>)?
        .or(Err(Error::UnexpectedApiResponse))
        .map(|response| {
            response
                .rows
                .unwrap_or_default()
                .into_iter()
                .map(|resp| {
                    let power_id = resp.power_id;
                    model::Station {
                        name: resp.power_name.unwrap_or_else(|| power_id.clone()),
                        power_id,
                        daily_energy: resp.daily_power_generation,
                        total_energy: resp.total_power_generation,
                    }
                })
                .collect()
        })
}

/// List data collectors attached to `station`.
pub async fn collectors(
    api: &model::LoggedInApi,
    station: &model::Station,
) -> Result<Vec<model::Collector>, Error> {
    let request_body = HashMap::from([("powerId", station.power_id.to_owned())]);

    post(api, endpoint::COLLECTORS, &request_body)
        .await
        .map(serde_json::from_value::<CollectorListByApp>)?
        .or(Err(Error::UnexpectedApiResponse))
        .map(|response| {
            response
                .rows
                .unwrap_or_default()
                .into_iter()
                .filter_map(|resp| match resp.inverter_id.filter(|id| !id.is_empty()) {
                    Some(inverter_id) => Some(model::Collector {
                        name: resp.collector_name.unwrap_or_else(|| inverter_id.clone()),
                        inverter_id,
                    }),
                    None => {
                        log::warn!(
                            "Skipping collector {} of station {}: no inverterId",
                            resp.collector_name.as_deref().unwrap_or("(unnamed)"),
                            station.power_id
                        );
                        None
                    }
                })
                .collect()
        })
}

/// Read inverter data behind `collector`. The first row is the most recent reading.
pub async fn inverter_readings(
    api: &model::LoggedInApi,
    station: &model::Station,
    collector: &model::Collector,
) -> Result<Vec<model::InverterReading>, Error> {
    let request_body = HashMap::from([
        ("powerId", station.power_id.to_owned()),
        ("inverterId", collector.inverter_id.to_owned()),
    ]);

    post(api, endpoint::INVERTER_DATA, &request_body)
        .await
        .map(serde_json::from_value::<InverterDatalist>)?
        .or(Err(Error::UnexpectedApiResponse))
        .map(|response| {
            response
                .rows
                .unwrap_or_default()
                .iter()
                .map(|row| model::InverterReading {
                    power_id: station.power_id.to_owned(),
                    inverter_id: collector.inverter_id.to_owned(),
                    fields: model::Metric::ALL
                        .iter()
                        .filter_map(|metric| {
                            row.get(metric.name())
                                .map(|value| (*metric, response::as_number(value)))
                        })
                        .collect(),
                })
                .collect()
        })
}
