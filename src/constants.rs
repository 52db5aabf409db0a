// Storage
pub const STORAGE_KEY: &str = "achievements";
pub const DATA_DIR_NAME: &str = ".portfolio";
// Written in place of the record list when a reset qualifies for Sand Mandala.
// Any value that can never be a JSON array works; this one is a commit hash.
pub const SECRET_RESET_SENTINEL: &str = "e1eda57b";

// Cascade timing
pub const SPEED_RUN_WINDOW_SECONDS: u64 = 67;

// Sand Mandala needs (total definitions - offset) unlocks at reset time
pub const RESET_CASCADE_OFFSET: usize = 6;

// Console
pub const MASTER_PASSWORD: &str = "password123";

// Environment overrides
pub const ENV_DATA_DIR: &str = "TROPHIES_DATA_DIR";
pub const ENV_SPEED_RUN_SECONDS: &str = "TROPHIES_SPEED_RUN_SECS";
pub const ENV_MASTER_PASSWORD: &str = "TROPHIES_MASTER_PASSWORD";
