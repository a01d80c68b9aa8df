use std::time::Duration;

pub const ARCH: &str = std::env::consts::ARCH;
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(not(windows))]
pub const EXEC_NAME: &str = "appdeck";
#[cfg(windows)]
pub const EXEC_NAME: &str = "appdeck.exe";

pub const STORE_DIR: &str = ".appdeck";
pub const AUTH_STORE_FILE: &str = "auth.json";
pub const CONTEXT_STORE_FILE: &str = "context.json";
pub const PREFERENCES_STORE_FILE: &str = "preferences.json";

pub const URL_ENV: &str = "APPDECK_URL";
pub const ANON_KEY_ENV: &str = "APPDECK_ANON_KEY";
pub const TOKEN_ENV: &str = "APPDECK_TOKEN";

/// How long the stub generator "thinks" before answering.
pub const GENERATION_DELAY: Duration = Duration::from_secs(2);

pub const TOP_PROJECTS_LIMIT: usize = 5;

/// Upper bound on cached queries, the least recently used are evicted past it.
pub const QUERY_CACHE_CAPACITY: u64 = 1_000;
