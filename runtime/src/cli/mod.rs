//! CLI implementation for the `ntub-attendance` binary.

pub mod attendance_cmd;
pub mod output;
pub mod prompt;
