pub mod aggregator;
pub mod code_filter;
pub mod code_summary;
pub mod court_names;
pub mod interceptor;
pub mod output;
pub mod progress;
pub mod run_log;

pub use aggregator::Aggregator;
pub use code_filter::CodeFilter;
pub use code_summary::{print_code_summary, summarize_code_sections};
pub use court_names::add_court_names;
pub use interceptor::{CaptureTarget, ResponseInterceptor};
pub use output::save_json;
pub use progress::{Progress, ProgressReporter};
pub use run_log::RunLog;
