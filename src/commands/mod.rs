pub mod parse;
pub mod stats;
pub mod tail;
pub mod output;

pub use parse::run_parse;
pub use stats::run_stats;
pub use tail::run_tail;
