//! Protocol module: the switch command and the switch-off report.

pub mod command;
pub mod report;

pub use command::{build_switch_command, SwitchCommand};
pub use report::{is_switch_off_report, switch_off_pattern, LONG_REPORT_LEN, SHORT_REPORT_LEN};
