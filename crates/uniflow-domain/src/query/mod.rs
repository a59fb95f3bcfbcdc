//! Task query engine
//!
//! - [`FilterSpec`]: what to fetch
//! - [`QueryPlan`]: the shared predicate and ordering rules
//! - [`Page`] / [`PageInfo`]: what comes back

mod engine;
mod filter;
mod page;

pub use engine::{execute, paginate, QueryPlan};
pub use filter::{FilterSpec, Pagination, SortField, SortOrder, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use page::{Page, PageInfo};
