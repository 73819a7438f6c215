use crate::api::Error;
use config::Config;

const CONFIG_FILE: &str = "absaar";
const ENV_PREFIX: &str = "ABSAAR";

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub station_index: usize,
}

impl Settings {
    /// Username and password, both required to be present and non-empty.
    pub fn credentials(&self) -> Result<(&str, &str), Error> {
        match (present(&self.username), present(&self.password)) {
            (Some(username), Some(password)) => Ok((username, password)),
            (None, _) => Err(Error::ConfigError("username is not set".to_string())),
            (_, None) => Err(Error::ConfigError("password is not set".to_string())),
        }
    }
}

/// Read settings from an optional `absaar.{toml,json,yaml}` file overridden by `ABSAAR_*`
/// environment variables.
pub fn read_settings() -> Result<Settings, Error> {
    let mut settings = Config::default();
    settings
        .merge(config::File::with_name(CONFIG_FILE).required(false))
        .and_then(|s| s.merge(config::Environment::with_prefix(ENV_PREFIX)))
        .and_then(|s| s.set_default("station_index", 0i64))
        .map_err(|e| Error::ConfigError(e.to_string()))?;

    settings
        .try_into()
        .map_err(|e| Error::ConfigError(e.to_string()))
}

#[cfg(test)]
mod test {
    use super::{read_settings, Settings};
    use crate::api::Error;

    fn settings(username: Option<&str>, password: Option<&str>) -> Settings {
        Settings {
            username: username.map(String::from),
            password: password.map(String::from),
            station_index: 0,
        }
    }

    #[test]
    fn credentials_present() {
        let settings = settings(Some("user"), Some("secret"));
        assert_eq!(("user", "secret"), settings.credentials().unwrap());
    }

    #[test]
    fn missing_credentials_are_config_errors() {
        assert!(matches!(
            settings(None, Some("secret")).credentials(),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(
            settings(Some("user"), None).credentials(),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(
            settings(Some(""), Some("secret")).credentials(),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn reads_environment() {
        std::env::set_var("ABSAAR_USERNAME", "env-user");
        std::env::set_var("ABSAAR_PASSWORD", "env-secret");
        std::env::set_var("ABSAAR_STATION_INDEX", "2");

        let settings = read_settings().unwrap();
        assert_eq!(Some("env-user".to_string()), settings.username);
        assert_eq!(Some("env-secret".to_string()), settings.password);
        assert_eq!(2, settings.station_index);
    }
}
