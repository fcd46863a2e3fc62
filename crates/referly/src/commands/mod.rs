//! Command handlers, one module per subcommand group.

pub mod codes;
pub mod config_cmd;
pub mod login;
pub mod series;
pub mod stats_cmd;
