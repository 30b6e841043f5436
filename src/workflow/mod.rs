pub mod item_ctx;
pub mod pagination;
pub mod search_flow;
pub mod selectors;

pub use item_ctx::ItemCtx;
pub use pagination::{PaginationDriver, PaginationReport};
pub use search_flow::{classify_body, FlowOutcome, SearchFlow, TerminalState};
