//! Environment → app config.
//!
//! | variable        | key            | default            |
//! |-----------------|----------------|--------------------|
//! | `APP_ENV`       | `app.env`      | `development`      |
//! | `HTTP_HOST`     | `http.host`    | `127.0.0.1`        |
//! | `DATABASE_URL`  | `database.url` | `sqlite://dogs.db` |
//!
//! `DOGS__`-prefixed variables are layered on top (`DOGS__DATABASE__URL`
//! sets `database.url`). `http.port` is always derived from `app.env`.

use kennel_core::KennelApp;
use serde_json::Value;

use crate::services::DogsParams;

pub const ENV_PREFIX: &str = "DOGS__";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://dogs.db";

const DEFAULTS: [(&str, &str); 3] = [
    ("app.env", "development"),
    ("http.host", "127.0.0.1"),
    ("database.url", DEFAULT_DATABASE_URL),
];

const PLAIN_VARS: [(&str, &str); 3] = [
    ("APP_ENV", "app.env"),
    ("HTTP_HOST", "http.host"),
    ("DATABASE_URL", "database.url"),
];

/// `3001` in the `test` environment, `3000` everywhere else.
pub fn port_for(env: &str) -> u16 {
    if env == "test" {
        3001
    } else {
        3000
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub database_url: String,
}

impl Settings {
    pub fn from_app(app: &KennelApp<Value, DogsParams>) -> Self {
        let cfg = app.config_snapshot();
        let value = |key: &str, default: &str| {
            cfg.get_string(key).unwrap_or_else(|| default.to_string())
        };

        let env = value("app.env", "development");
        Self {
            port: cfg.get_u16("http.port").unwrap_or_else(|| port_for(&env)),
            host: value("http.host", "127.0.0.1"),
            database_url: value("database.url", DEFAULT_DATABASE_URL),
            env,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Fill the app config from `vars` (usually `std::env::vars()`).
pub fn load<I>(app: &KennelApp<Value, DogsParams>, vars: I) -> Settings
where
    I: IntoIterator<Item = (String, String)>,
{
    let vars: Vec<(String, String)> = vars.into_iter().collect();

    for (key, value) in DEFAULTS {
        app.set(key, value);
    }
    for (name, value) in &vars {
        if let Some((_, key)) = PLAIN_VARS.iter().find(|(var, _)| var == name) {
            app.set(*key, value.as_str());
        }
    }
    app.load_vars(ENV_PREFIX, vars);

    let env = app.get("app.env").unwrap_or_default();
    app.set("http.port", port_for(&env).to_string());

    let settings = Settings::from_app(app);
    tracing::debug!(?settings, "configuration loaded");
    settings
}
