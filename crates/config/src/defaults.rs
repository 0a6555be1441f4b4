pub const DEFAULT_LOG_FORMAT: &str = "pretty";

pub const LOG_FORMATS: [&str; 3] = ["pretty", "json", "compact"];

pub const MAX_DECIMALS: u8 = 18;

pub fn default_decimals() -> u8 {
    6
}
