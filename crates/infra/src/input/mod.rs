//! Action ingress from the console

pub mod command;
pub mod line_source;

pub use command::{parse_command, Command, CommandError};
pub use line_source::LineSource;
