mod driver;
mod parse;
mod prompt;

pub use driver::{Investigation, Investigator, SYSTEM_PROMPT};
pub use parse::{extract_json_object, parse_report, FALLBACK_ROOT_CAUSE};
pub use prompt::{build_prompt, format_window};
