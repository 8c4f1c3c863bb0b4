//! Archive opening and game splitting.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use friction_core::errors::ParseError;

/// One game as it appears in the archive: tag pairs plus raw movetext.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGame {
    /// 0-based position of the game in the archive.
    pub index: usize,
    pub tags: Vec<(String, String)>,
    pub movetext: String,
}

impl RawGame {
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.movetext.trim().is_empty()
    }
}

/// Open an archive for streaming. `.zst` and `.gz` are decompressed on
/// the fly; anything else is read as plain text.
pub fn open_archive(path: &Path) -> Result<Box<dyn BufRead>, ParseError> {
    let archive_err = |e: std::io::Error| ParseError::Archive {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let file = File::open(path).map_err(archive_err)?;
    let reader: Box<dyn BufRead> = match path.extension().and_then(|e| e.to_str()) {
        Some("zst") => Box::new(BufReader::new(
            zstd::stream::read::Decoder::new(file).map_err(archive_err)?,
        )),
        Some("gz") => Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(file))),
        _ => Box::new(BufReader::new(file)),
    };
    Ok(reader)
}

/// Splits a PGN byte stream into `RawGame`s without interpreting moves.
///
/// A tag line that follows movetext starts a new game. Lines inside an
/// open `{` comment are always movetext. Invalid UTF-8 is replaced.
pub struct GameChunks<R> {
    reader: R,
    line: Vec<u8>,
    current: RawGame,
    seen_movetext: bool,
    comment_depth: usize,
    next_index: usize,
    done: bool,
}

impl<R: BufRead> GameChunks<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            current: RawGame::default(),
            seen_movetext: false,
            comment_depth: 0,
            next_index: 0,
            done: false,
        }
    }

    fn take_current(&mut self) -> RawGame {
        let index = self.next_index;
        self.next_index += 1;
        self.seen_movetext = false;
        self.comment_depth = 0;
        let mut game = std::mem::take(&mut self.current);
        game.index = index;
        game
    }
}

impl<R: BufRead> Iterator for GameChunks<R> {
    type Item = Result<RawGame, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            self.line.clear();
            let read = match self.reader.read_until(b'\n', &mut self.line) {
                Ok(n) => n,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            };
            if read == 0 {
                self.done = true;
                if self.current.is_empty() {
                    return None;
                }
                return Some(Ok(self.take_current()));
            }

            let text = String::from_utf8_lossy(&self.line).into_owned();
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }

            if self.comment_depth == 0 {
                if let Some(tag) = parse_tag_line(trimmed) {
                    if self.seen_movetext {
                        let finished = self.take_current();
                        self.current.tags.push(tag);
                        return Some(Ok(finished));
                    }
                    self.current.tags.push(tag);
                    continue;
                }
            }

            for b in trimmed.bytes() {
                match b {
                    b'{' => self.comment_depth += 1,
                    b'}' => self.comment_depth = self.comment_depth.saturating_sub(1),
                    _ => {}
                }
            }
            self.seen_movetext = true;
            self.current.movetext.push_str(trimmed);
            self.current.movetext.push('\n');
        }
    }
}

/// Parse `[Name "value"]`, honouring `\"` and `\\` escapes.
pub fn parse_tag_line(line: &str) -> Option<(String, String)> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    let (name, rest) = inner.split_once(char::is_whitespace)?;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    let body = rest.trim().strip_prefix('"')?;

    let mut value = String::new();
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => value.push(chars.next()?),
            '"' => return Some((name.to_string(), value)),
            other => value.push(other),
        }
    }
    None
}
