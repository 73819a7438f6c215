use super::lenient_opt_string;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLogin {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub token: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub user_id: Option<String>,
}
