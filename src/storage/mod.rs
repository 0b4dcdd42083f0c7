//! In-memory storage for measurements and hiccups
//!
//! Nothing here is persisted, all data is lost on restart. Both containers are
//! plain data structures without interior mutability; synchronisation is the
//! job of [`SharedState`](crate::state::SharedState).

pub mod hiccups;
pub mod history;

pub use hiccups::HiccupLog;
pub use history::HistoryBuffer;
