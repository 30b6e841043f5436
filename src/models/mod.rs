pub mod case;
pub mod court;
pub mod loaders;
pub mod work_item;

pub use case::{CaptureRecord, CaseSummary, DetailRecord};
pub use court::{CourtDetail, CourtLookup, CourtPick};
pub use loaders::{load_court_lookup, load_court_picker};
pub use work_item::{ScrapeMode, WorkItem};
