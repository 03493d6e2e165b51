use crate::app_config::AppConfig;
use crate::ConfigError;

pub const DEFAULT_PRODUCT_URL: &str = "https://shop.countdown.co.nz/Shop/ProductDetails";
pub const DEFAULT_USER_AGENT: &str = "countdowner/0.1 (price-watch)";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a
/// `HashMap` lookup instead of `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    // Empty strings count as unset so a blank line in `.env` does not
    // half-configure the mailer.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let log_level = or_default("COUNTDOWNER_LOG_LEVEL", DEFAULT_LOG_LEVEL);
    let product_url = or_default("COUNTDOWNER_PRODUCT_URL", DEFAULT_PRODUCT_URL);
    let request_timeout_secs = parse_u64("COUNTDOWNER_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("COUNTDOWNER_USER_AGENT", DEFAULT_USER_AGENT);

    let max_concurrent_requests = parse_usize("COUNTDOWNER_MAX_CONCURRENT_REQUESTS", "10")?;
    if max_concurrent_requests == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "COUNTDOWNER_MAX_CONCURRENT_REQUESTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let mailgun_domain = optional("COUNTDOWNER_MAILGUN_DOMAIN");
    let mailgun_api_key = optional("COUNTDOWNER_MAILGUN_API_KEY");

    Ok(AppConfig {
        log_level,
        product_url,
        request_timeout_secs,
        user_agent,
        max_concurrent_requests,
        mailgun_domain,
        mailgun_api_key,
    })
}
