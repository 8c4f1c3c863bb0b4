//! Q&A site friction (Stack Exchange answer exports).
//!
//! Response time to a question plays the role of think time, question
//! complexity the role of position complexity, and a non-positive,
//! unaccepted answer the role of a blunder.

pub mod career;
pub mod friction;

pub use career::{career_trajectory, tag_firmware, CareerTrajectory, TagFirmwareMap, TagStat, UserAnswer};
pub use friction::{analyze, Answer, QaReport};
