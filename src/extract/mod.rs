//! Pure extractors: text/markup in, structured values out. Fetching and
//! artifact writing live elsewhere.

pub mod articles;
pub mod dates;
pub mod events;
pub mod stats;
