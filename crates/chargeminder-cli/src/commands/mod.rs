pub mod battery;
pub mod config;
pub mod history;
pub mod notify;
pub mod remind;
pub mod settings;
pub mod status;
pub mod watch;
