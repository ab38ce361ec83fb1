/// Constants module to avoid magic numbers in the codebase

// Storage
pub const RECORD_FILE_NAME: &str = ".ai_agent_config.json";
pub const RECORD_SCHEMA_VERSION: u32 = 1;
pub const CONFIG_DIR_NAME: &str = "neurolink";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const ENV_PREFIX: &str = "NEUROLINK_";

// Authentication
pub const MAX_UNLOCK_ATTEMPTS: usize = 3;

// Timeouts
pub const GENERATION_TIMEOUT_SECS: u64 = 20;
pub const CLASSIFIER_TIMEOUT_SECS: u64 = 20;
pub const PROBE_TIMEOUT_SECS: u64 = 5;

// Provider endpoints
pub const GOOGLE_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const GROQ_BASE_URL: &str = "https://api.groq.com";

// Routing
pub const FALLBACK_MARKER: &str = "FALLBACK: ";

// Display
pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const DEFAULT_PREVIEW_CHARS: usize = 200;
pub const RULE_WIDTH: usize = 60;

// Reserved console inputs
pub const CMD_MENU: &str = "menu";
pub const CMD_STATUS: &str = "//mds";
pub const CMD_EXIT: &[&str] = &["exit", "quit"];
