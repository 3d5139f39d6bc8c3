//! Default values shared by the config sections.

pub const DEFAULT_DB_PATH: &str = "verdict.db";
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

pub const DEFAULT_HIGH_RISK_THRESHOLD: f64 = 70.0;
/// Risk profile in schema order: diff, category, severity, history.
pub const DEFAULT_RISK_PROFILE: [f64; 4] = [0.15, 0.35, 0.35, 0.15];
pub const HIGH_RISK_KEYWORD_FLOOR: f64 = 0.8;

pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

pub const DEFAULT_STATS_WINDOW: usize = 10;
pub const DEFAULT_MAX_PRIOR_SHIFT: f64 = 0.1;
pub const DEFAULT_ABUNDANT_SAMPLES: usize = 20;

pub const DEFAULT_REPOSITORY_ID: &str = "local";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Base risk per category label.
pub const CATEGORY_RISKS: &[(&str, f64)] = &[
    ("security", 0.9),
    ("dependency", 0.6),
    ("bug fix", 0.6),
    ("performance", 0.5),
    ("feature", 0.5),
    ("refactor", 0.4),
    ("config", 0.4),
    ("test update", 0.2),
    ("style", 0.15),
    ("documentation", 0.1),
];

/// Score per AI severity tag.
pub const SEVERITY_TAGS: &[(&str, f64)] = &[
    ("critical", 1.0),
    ("high", 0.8),
    ("medium", 0.5),
    ("low", 0.25),
    ("info", 0.1),
];

/// Terms in severity tags that floor severity at [`HIGH_RISK_KEYWORD_FLOOR`].
pub const HIGH_RISK_KEYWORDS: &[&str] = &[
    "security",
    "vulnerability",
    "injection",
    "auth",
    "password",
    "data loss",
    "crash",
    "race",
    "corrupt",
];
