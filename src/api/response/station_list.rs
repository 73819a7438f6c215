use super::{lenient_id, lenient_number, lenient_opt_string};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Data {
    #[serde(deserialize_with = "lenient_id")]
    pub power_id: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub power_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub daily_power_generation: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_power_generation: f64,
}

#[derive(Deserialize)]
pub struct StationListApp {
    #[serde(default)]
    pub rows: Option<Vec<Data>>,
}
