//! Application configuration. API credentials, size ceilings, timeouts.

use serde::Deserialize;

/// Default per-call timeout for the analysis service, in seconds.
pub const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 120;

/// Default per-call timeout for the fact-check service, in seconds.
pub const DEFAULT_VERA_TIMEOUT_SECS: u64 = 60;

/// Which auth header the Vera deployment expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    #[default]
    Bearer,
    /// `X-API-Key: <key>`
    ApiKey,
}

/// Which spelling of the user field the Vera deployment expects in the
/// request body. Both have been observed in the wild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserField {
    /// `user_id`
    #[default]
    Snake,
    /// `userId`
    Camel,
}

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Gemini API key. Read from VERABOT_GEMINI_API_KEY.
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    /// Gemini model name. Read from VERABOT_GEMINI_MODEL.
    #[serde(default)]
    pub gemini_model: Option<String>,

    /// Vera fact-check endpoint URL. Read from VERABOT_VERA_API_URL.
    #[serde(default)]
    pub vera_api_url: Option<String>,

    /// Vera API key. Read from VERABOT_VERA_API_KEY.
    #[serde(default)]
    pub vera_api_key: Option<String>,

    /// Auth header scheme for Vera ("bearer" or "api-key"). Deployment-specific.
    #[serde(default)]
    pub vera_auth_scheme: Option<AuthScheme>,

    /// User field spelling in the Vera body ("snake" or "camel").
    #[serde(default)]
    pub vera_user_field: Option<UserField>,

    /// Generic file size ceiling in MB. Read from VERABOT_MAX_FILE_SIZE_MB.
    #[serde(default)]
    pub max_file_size_mb: Option<u64>,

    /// Image size ceiling in MB.
    #[serde(default)]
    pub max_image_size_mb: Option<u64>,

    /// Video size ceiling in MB.
    #[serde(default)]
    pub max_video_size_mb: Option<u64>,

    /// Audio size ceiling in MB.
    #[serde(default)]
    pub max_audio_size_mb: Option<u64>,

    /// Directory for transport-downloaded temp files.
    #[serde(default)]
    pub temp_download_path: Option<String>,

    /// Analysis call timeout in seconds.
    #[serde(default)]
    pub gemini_timeout_secs: Option<u64>,

    /// Fact-check call timeout in seconds.
    #[serde(default)]
    pub vera_timeout_secs: Option<u64>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("VERABOT"));
        if let Ok(path) = std::env::var("VERABOT_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Returns the Gemini API key if configured.
    pub fn gemini_api_key(&self) -> Option<String> {
        self.gemini_api_key
            .clone()
            .or_else(|| std::env::var("VERABOT_GEMINI_API_KEY").ok())
    }

    /// Returns true if the real analysis adapter can be used (API key present).
    pub fn is_gemini_configured(&self) -> bool {
        self.gemini_api_key().is_some()
    }

    /// Returns the Gemini model name. Defaults to "gemini-1.5-pro-latest".
    pub fn gemini_model_or_default(&self) -> String {
        self.gemini_model
            .clone()
            .unwrap_or_else(|| "gemini-1.5-pro-latest".to_string())
    }

    /// Returns the Vera endpoint URL if configured.
    pub fn vera_api_url(&self) -> Option<String> {
        self.vera_api_url
            .clone()
            .or_else(|| std::env::var("VERABOT_VERA_API_URL").ok())
    }

    /// Returns the Vera API key, empty when unset (local deployments).
    pub fn vera_api_key_or_default(&self) -> String {
        self.vera_api_key
            .clone()
            .or_else(|| std::env::var("VERABOT_VERA_API_KEY").ok())
            .unwrap_or_default()
    }

    pub fn vera_auth_scheme_or_default(&self) -> AuthScheme {
        self.vera_auth_scheme.unwrap_or_default()
    }

    pub fn vera_user_field_or_default(&self) -> UserField {
        self.vera_user_field.unwrap_or_default()
    }

    /// Generic ceiling: 20 MB.
    pub fn max_file_size_mb_or_default(&self) -> u64 {
        self.max_file_size_mb.unwrap_or(20)
    }

    /// Images: 10 MB.
    pub fn max_image_size_mb_or_default(&self) -> u64 {
        self.max_image_size_mb.unwrap_or(10)
    }

    /// Videos: 50 MB.
    pub fn max_video_size_mb_or_default(&self) -> u64 {
        self.max_video_size_mb.unwrap_or(50)
    }

    /// Audio: 10 MB.
    pub fn max_audio_size_mb_or_default(&self) -> u64 {
        self.max_audio_size_mb.unwrap_or(10)
    }

    pub fn temp_download_path_or_default(&self) -> String {
        self.temp_download_path
            .clone()
            .unwrap_or_else(|| "./temp_downloads".to_string())
    }

    pub fn gemini_timeout_secs_or_default(&self) -> u64 {
        self.gemini_timeout_secs
            .unwrap_or(DEFAULT_GEMINI_TIMEOUT_SECS)
    }

    pub fn vera_timeout_secs_or_default(&self) -> u64 {
        self.vera_timeout_secs.unwrap_or(DEFAULT_VERA_TIMEOUT_SECS)
    }
}
