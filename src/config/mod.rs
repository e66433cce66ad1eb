use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub paging: PagingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Server root, e.g. `http://localhost:5001`
    pub url: String,
    /// Path under the server root that every admin endpoint shares
    pub base_path: String,
    pub request_timeout_secs: u64,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingConfig {
    pub page_size: usize,
    pub logs_limit: usize,
    pub logs_step: usize,
    pub analytics_days: u32,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    /// Config pointing at an explicit server, development defaults otherwise
    pub fn for_url(url: impl Into<String>) -> Self {
        let mut config = Self::development();
        config.api.url = url.into();
        config
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("OPTIMA_API_URL") {
            self.api.url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("OPTIMA_API_BASE_PATH") {
            self.api.base_path = v;
        }
        if let Ok(v) = env::var("OPTIMA_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().unwrap_or(self.api.request_timeout_secs);
        }
        if let Ok(v) = env::var("OPTIMA_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        if let Ok(v) = env::var("OPTIMA_PAGE_SIZE") {
            self.paging.page_size = v.parse().unwrap_or(self.paging.page_size);
        }
        if let Ok(v) = env::var("OPTIMA_LOGS_LIMIT") {
            self.paging.logs_limit = v.parse().unwrap_or(self.paging.logs_limit);
        }
        if let Ok(v) = env::var("OPTIMA_LOGS_STEP") {
            self.paging.logs_step = v.parse().unwrap_or(self.paging.logs_step);
        }
        if let Ok(v) = env::var("OPTIMA_ANALYTICS_DAYS") {
            self.paging.analytics_days = v.parse().unwrap_or(self.paging.analytics_days);
        }

        self
    }

    /// Root every endpoint path is joined onto
    pub fn base_url(&self) -> String {
        format!(
            "{}/{}",
            self.api.url.trim_end_matches('/'),
            self.api.base_path.trim_matches('/')
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                url: "http://localhost:5001".to_string(),
                base_path: "api/admin".to_string(),
                request_timeout_secs: 30,
                enable_request_logging: true,
            },
            paging: PagingConfig {
                page_size: 20,
                logs_limit: 100,
                logs_step: 50,
                analytics_days: 30,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                url: "https://staging-api.optima.app".to_string(),
                base_path: "api/admin".to_string(),
                request_timeout_secs: 15,
                enable_request_logging: true,
            },
            paging: PagingConfig {
                page_size: 20,
                logs_limit: 100,
                logs_step: 50,
                analytics_days: 30,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                url: "https://api.optima.app".to_string(),
                base_path: "api/admin".to_string(),
                request_timeout_secs: 10,
                enable_request_logging: false,
            },
            paging: PagingConfig {
                page_size: 20,
                logs_limit: 100,
                logs_step: 50,
                analytics_days: 30,
            },
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::development()
    }
}
