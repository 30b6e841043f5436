pub mod date_format;
pub mod logging;
pub mod prompt;

pub use date_format::LookupDate;
pub use prompt::{is_yes, prompt_line};
