/// Service name reported by the health endpoint and used in log file names
pub const SERVICE_NAME: &str = "webhook_sink";

// Bind address defaults (all interfaces)
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

/// Largest request body accepted before axum answers 413
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Number of characters of a text payload echoed into the log line
pub const DEFAULT_PREVIEW_CHARS: usize = 100;

/// Optional config file looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Directory for the rolling JSON log file
pub const LOG_DIR: &str = "logs";

// Environment overrides (loaded after .env)
pub const ENV_HOST: &str = "WEBHOOK_SINK_HOST";
pub const ENV_PORT: &str = "WEBHOOK_SINK_PORT";
pub const ENV_POLICY: &str = "WEBHOOK_SINK_POLICY";

// Ingest routes. Both the root and the /webhook form are served.
pub const INGEST_ROUTE: &str = "/";
pub const WEBHOOK_ROUTE: &str = "/webhook";

// Query routes. /test is the legacy name of /data.
pub const TEST_ROUTE: &str = "/test";
pub const DATA_ROUTE: &str = "/data";
pub const RECORD_ROUTE: &str = "/data/:id";

pub const HEALTH_ROUTE: &str = "/health";
pub const METRICS_ROUTE: &str = "/metrics";

/// Placeholder used when the transport does not expose a peer address
pub const UNKNOWN_SOURCE: &str = "unknown";
