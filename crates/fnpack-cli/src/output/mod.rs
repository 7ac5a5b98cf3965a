//! Output formatting module.

mod formatter;
mod human;
mod json;

pub use formatter::OutputFormatter;
pub use formatter::UploadSummary;

use human::HumanFormatter;
use json::JsonFormatter;

/// Creates an output formatter based on CLI flags.
///
/// With `stdout_reserved` the formatter writes to stderr instead.
pub fn create_formatter(
    json: bool,
    verbose: bool,
    quiet: bool,
    stdout_reserved: bool,
) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter::new(stdout_reserved))
    } else {
        Box::new(HumanFormatter::new(verbose, quiet, stdout_reserved))
    }
}
