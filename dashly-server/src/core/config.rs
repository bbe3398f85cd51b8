use rust_decimal::Decimal;

/// Server configuration - every knob of the analyzer node
///
/// # Environment variables
///
/// All settings can be overridden through environment variables:
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | HTTP_PORT | 4000 | HTTP service port |
/// | ENVIRONMENT | development | Runtime environment |
/// | DEFAULT_COMMISSION | 0.15 | Commission rate used when the upload carries none |
/// | MAX_UPLOAD_BYTES | 10485760 | Upload size cap (10MB) |
/// | LOG_LEVEL | info | tracing level filter |
/// | LOG_DIR | (unset) | Directory for daily-rolling log files |
///
/// # Example
///
/// ```ignore
/// HTTP_PORT=8080 DEFAULT_COMMISSION=0.12 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API service port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Commission rate applied to rows without a commission_pct value.
    /// Threaded into every analysis call; never a module-wide constant,
    /// so tests can vary it per call.
    pub default_commission: Decimal,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,
    /// tracing level filter
    pub log_level: String,
    /// Directory for rolling log files (stdout only when unset)
    pub log_dir: Option<String>,
}

/// Fallback commission rate (15%)
const DEFAULT_COMMISSION: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to the defaults above
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(4000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            default_commission: std::env::var("DEFAULT_COMMISSION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_COMMISSION),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10 * 1024 * 1024),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// Override selected values
    ///
    /// Commonly used in tests
    pub fn with_overrides(http_port: u16, default_commission: Decimal) -> Self {
        let mut config = Self::from_env();
        config.http_port = http_port;
        config.default_commission = default_commission;
        config
    }

    /// Whether this is a production deployment
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Whether this is a development deployment
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
