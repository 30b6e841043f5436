pub mod json_loader;

pub use json_loader::{load_court_lookup, load_court_picker, load_json_list};
