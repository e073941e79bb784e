//! State module for tracking collection progress
//!
//! # Components
//!
//! - `CollectionState`: the phases a single `collect` call moves through
//!   (discovering, planning, the per-candidate fetch/extract/gate cycle,
//!   and the terminal outcomes)

mod collection_state;

pub use collection_state::CollectionState;
