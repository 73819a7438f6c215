use serde::Deserialize;
use serde_json::{Map, Value};

/* Rows are kept as raw objects; metrics are picked out by name when mapped to the model */
#[derive(Deserialize)]
pub struct InverterDatalist {
    #[serde(default)]
    pub rows: Option<Vec<Map<String, Value>>>,
}
