pub mod bot_guard;
pub mod rate_limit;
pub mod security;
pub mod security_headers;
pub mod shield;
