//! Per-tick data path: read the table, then rank what was read.

pub mod ranker;
pub mod reader;

pub use ranker::rank;
pub use reader::read;
