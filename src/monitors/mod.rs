pub mod error;
pub mod evaluation;
pub mod ping;

pub use error::ProbeError;
pub use evaluation::{Evaluation, evaluate};
pub use ping::{ProbeOutcome, Prober, SystemPing};
