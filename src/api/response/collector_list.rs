use super::lenient_opt_string;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Data {
    /* Rows without an id are skipped by the caller, not rejected here */
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub inverter_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub collector_name: Option<String>,
}

#[derive(Deserialize)]
pub struct CollectorListByApp {
    #[serde(default)]
    pub rows: Option<Vec<Data>>,
}
