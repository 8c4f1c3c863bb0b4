//! Streaming reader for clock-annotated PGN archives.
//!
//! `reader` splits a byte stream into raw games, `lexer` tokenizes one
//! game's movetext, `parser` replays it on a board and applies the
//! acceptance filters.

pub mod clock;
pub mod filters;
pub mod lexer;
pub mod parser;
pub mod reader;

pub use filters::{FilterCriteria, RejectionReason};
pub use parser::{GameStream, ParseStats, PgnParser};
pub use reader::{open_archive, GameChunks, RawGame};
