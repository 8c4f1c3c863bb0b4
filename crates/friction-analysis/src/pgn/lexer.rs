//! Movetext tokenizer.
//!
//! Variations are skipped entirely, including any comments inside them,
//! so only the main line reaches the parser.

/// A main-line movetext element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    MoveNumber(u32),
    San(&'a str),
    Comment(&'a str),
    Nag(u16),
    Result(&'a str),
}

fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'{' | b'}' | b'(' | b')' | b';' | b'$')
}

/// Tokenize one game's movetext. Fails on unterminated comments and
/// unbalanced variations.
pub fn tokenize(text: &str) -> Result<Vec<Token<'_>>, String> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b if b.is_ascii_whitespace() => i += 1,
            b'{' => {
                let close = text[i + 1..]
                    .find('}')
                    .ok_or_else(|| "unterminated comment".to_string())?;
                let end = i + 1 + close;
                if depth == 0 {
                    tokens.push(Token::Comment(text[i + 1..end].trim()));
                }
                i = end + 1;
            }
            b'}' => return Err(format!("stray '}}' at byte {i}")),
            b';' => {
                let end = text[i..].find('\n').map_or(bytes.len(), |n| i + n);
                if depth == 0 {
                    tokens.push(Token::Comment(text[i + 1..end].trim()));
                }
                i = end;
            }
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                if depth == 0 {
                    return Err(format!("unbalanced ')' at byte {i}"));
                }
                depth -= 1;
                i += 1;
            }
            b'$' => {
                let start = i + 1;
                i = start;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                if depth == 0 {
                    let nag = text[start..i]
                        .parse()
                        .map_err(|_| format!("bad NAG at byte {start}"))?;
                    tokens.push(Token::Nag(nag));
                }
            }
            _ => {
                let start = i;
                while i < bytes.len() && !is_delimiter(bytes[i]) {
                    i += 1;
                }
                if depth == 0 {
                    classify_word(&text[start..i], &mut tokens);
                }
            }
        }
    }

    if depth > 0 {
        return Err("unterminated variation".to_string());
    }
    Ok(tokens)
}

fn classify_word<'a>(word: &'a str, tokens: &mut Vec<Token<'a>>) {
    match word {
        "1-0" | "0-1" | "1/2-1/2" | "*" => {
            tokens.push(Token::Result(word));
            return;
        }
        w if w.starts_with("0-0") || w.starts_with("O-O") => {
            tokens.push(Token::San(w));
            return;
        }
        _ => {}
    }

    // Move numbers: `12.`, `12...`, `12`, or glued to the move as `1.e4`.
    let digits = word.bytes().take_while(u8::is_ascii_digit).count();
    let rest = if digits > 0 {
        let after_digits = &word[digits..];
        let san = after_digits.trim_start_matches('.');
        if !after_digits.is_empty() && san.len() == after_digits.len() {
            // Digits not followed by a dot are not a move number.
            tokens.push(Token::San(word));
            return;
        }
        if let Ok(n) = word[..digits].parse() {
            tokens.push(Token::MoveNumber(n));
        }
        san
    } else {
        word
    };

    // Bare annotation glyphs separated from their move.
    if rest.is_empty() || rest.bytes().all(|b| matches!(b, b'!' | b'?')) {
        return;
    }
    tokens.push(Token::San(rest));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_moves_comments_result() {
        let tokens = tokenize("1. e4 { [%clk 0:10:00] } 1... e5 $1 2.Nf3 1-0").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::MoveNumber(1),
                Token::San("e4"),
                Token::Comment("[%clk 0:10:00]"),
                Token::MoveNumber(1),
                Token::San("e5"),
                Token::Nag(1),
                Token::MoveNumber(2),
                Token::San("Nf3"),
                Token::Result("1-0"),
            ]
        );
    }

    #[test]
    fn variations_are_skipped_with_their_comments() {
        let tokens = tokenize("1. e4 (1. d4 { side } d5 (1... Nf6)) e5 *").unwrap();
        let sans: Vec<_> = tokens
            .iter()
            .filter_map(|t| match t {
                Token::San(s) => Some(*s),
                _ => None,
            })
            .collect();
        assert_eq!(sans, vec!["e4", "e5"]);
        assert!(!tokens.iter().any(|t| matches!(t, Token::Comment(_))));
    }

    #[test]
    fn castling_with_zeros_is_a_move() {
        let tokens = tokenize("5. 0-0 0-0-0 0-1").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::MoveNumber(5),
                Token::San("0-0"),
                Token::San("0-0-0"),
                Token::Result("0-1"),
            ]
        );
    }

    #[test]
    fn semicolon_comment_runs_to_end_of_line() {
        let tokens = tokenize("1. e4 ; good move\ne5 *").unwrap();
        assert_eq!(tokens[2], Token::Comment("good move"));
        assert_eq!(tokens[3], Token::San("e5"));
    }

    #[test]
    fn detached_glyphs_are_dropped() {
        let tokens = tokenize("1. e4 !? e5 *").unwrap();
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn malformed_movetext() {
        assert!(tokenize("1. e4 { never closed").is_err());
        assert!(tokenize("1. e4 (1. d4").is_err());
        assert!(tokenize("1. e4 ) e5").is_err());
    }
}
