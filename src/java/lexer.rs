//! Byte-level scanner for Java source that tracks whether each byte is code,
//! comment, or literal text.
//!
//! Every structural search in the crate (brace matching, class boundaries,
//! method lookup) goes through this module so that braces and keywords inside
//! `// ...`, `/* ... */`, `"..."` and `'...'` are never mistaken for code.

/// Lexical state a byte belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Code,
    LineComment,
    BlockComment,
    StringLiteral,
    CharLiteral,
}

impl ScanState {
    pub fn is_code(self) -> bool {
        self == ScanState::Code
    }

    pub fn is_comment(self) -> bool {
        matches!(self, ScanState::LineComment | ScanState::BlockComment)
    }
}

/// Classify every byte of `source`, assuming the text starts in code.
pub fn classify(source: &str) -> Vec<ScanState> {
    classify_from(source.as_bytes(), 0)
}

/// Classify `bytes[start..]`; the returned vector is indexed from `start`.
fn classify_from(bytes: &[u8], start: usize) -> Vec<ScanState> {
    use ScanState::*;

    let len = bytes.len();
    let mut states = Vec::with_capacity(len.saturating_sub(start));
    let mut state = Code;
    let mut i = start;

    while i < len {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();

        match state {
            Code => match (b, next) {
                (b'/', Some(b'/')) => {
                    states.extend([LineComment, LineComment]);
                    state = LineComment;
                    i += 2;
                    continue;
                }
                (b'/', Some(b'*')) => {
                    states.extend([BlockComment, BlockComment]);
                    state = BlockComment;
                    i += 2;
                    continue;
                }
                (b'"', _) => {
                    states.push(StringLiteral);
                    state = StringLiteral;
                }
                (b'\'', _) => {
                    states.push(CharLiteral);
                    state = CharLiteral;
                }
                _ => states.push(Code),
            },
            LineComment => {
                if b == b'\n' {
                    states.push(Code);
                    state = Code;
                } else {
                    states.push(LineComment);
                }
            }
            BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    states.extend([BlockComment, BlockComment]);
                    state = Code;
                    i += 2;
                    continue;
                }
                states.push(BlockComment);
            }
            StringLiteral | CharLiteral => {
                if b == b'\\' {
                    states.push(state);
                    if next.is_some() {
                        states.push(state);
                    }
                    i += 2;
                    continue;
                }
                let quote = if state == StringLiteral { b'"' } else { b'\'' };
                if b == b'\n' {
                    // Literals never span lines; recover instead of swallowing the file.
                    states.push(Code);
                    state = Code;
                } else {
                    states.push(state);
                    if b == quote {
                        state = Code;
                    }
                }
            }
        }
        i += 1;
    }

    states
}

fn mask_where(source: &str, hide: impl Fn(ScanState) -> bool) -> String {
    let states = classify(source);
    let masked: Vec<u8> = source
        .bytes()
        .zip(states)
        .map(|(b, state)| if b != b'\n' && hide(state) { b' ' } else { b })
        .collect();
    // Every non-newline byte that changed became ASCII space, so partial
    // multi-byte sequences cannot survive: hidden runs are whole characters.
    String::from_utf8(masked).unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}

/// Replace comment text with spaces, preserving byte offsets and newlines.
pub fn mask_comments(source: &str) -> String {
    mask_where(source, ScanState::is_comment)
}

/// Replace comments and string/char literals with spaces, preserving byte
/// offsets and newlines. Regexes run over the result only ever see code.
pub fn mask_non_code(source: &str) -> String {
    mask_where(source, |state| !state.is_code())
}

/// Offset of the delimiter closing the one at `open_pos`, counting only
/// delimiters that sit in code.
pub fn find_matching(source: &str, open_pos: usize, open: u8, close: u8) -> Option<usize> {
    let bytes = source.as_bytes();
    if bytes.get(open_pos) != Some(&open) {
        return None;
    }

    let states = classify_from(bytes, open_pos);
    let mut depth = 0usize;
    for (offset, state) in states.into_iter().enumerate() {
        if !state.is_code() {
            continue;
        }
        let pos = open_pos + offset;
        if bytes[pos] == open {
            depth += 1;
        } else if bytes[pos] == close {
            depth -= 1;
            if depth == 0 {
                return Some(pos);
            }
        }
    }
    None
}

/// Offset of the `}` matching the `{` at `open_pos`.
pub fn find_matching_brace(source: &str, open_pos: usize) -> Option<usize> {
    find_matching(source, open_pos, b'{', b'}')
}

/// Offset of the `)` matching the `(` at `open_pos`.
pub fn find_matching_paren(source: &str, open_pos: usize) -> Option<usize> {
    find_matching(source, open_pos, b'(', b')')
}

/// Net brace depth of the code in `source[from..to]`.
pub fn brace_depth(source: &str, from: usize, to: usize) -> i32 {
    let bytes = source.as_bytes();
    let to = to.min(bytes.len());
    if from >= to {
        return 0;
    }
    classify_from(&bytes[..to], from)
        .into_iter()
        .enumerate()
        .filter(|(_, state)| state.is_code())
        .fold(0, |depth, (offset, _)| match bytes[from + offset] {
            b'{' => depth + 1,
            b'}' => depth - 1,
            _ => depth,
        })
}

const DECLARATION_MODIFIERS: &[&str] = &[
    "public", "private", "protected", "static", "final", "abstract", "strictfp",
];
const TYPE_KEYWORDS: &[&str] = &["class", "interface", "enum"];

/// Find the closing brace of the outer class whose body opens at `open_pos`.
///
/// The count continues from the opening brace. When it first returns to zero
/// and the next code token starts a type declaration whose own body is
/// followed by a stray `}`, the first close belonged to that nested type and
/// the stray brace is the real end of the outer class.
pub fn find_outer_class_end(source: &str, open_pos: usize) -> Option<usize> {
    let masked = mask_non_code(source);
    let mut end = find_matching_brace(source, open_pos)?;

    loop {
        let Some(decl_open) = type_declaration_after(&masked, end + 1) else {
            break;
        };
        let Some(decl_close) = find_matching_brace(source, decl_open) else {
            break;
        };
        match next_code_byte(&masked, decl_close + 1) {
            Some((stray, b'}')) => end = stray,
            _ => break,
        }
    }

    Some(end)
}

fn next_code_byte(masked: &str, from: usize) -> Option<(usize, u8)> {
    masked
        .bytes()
        .enumerate()
        .skip(from)
        .find(|(_, b)| !b.is_ascii_whitespace())
}

/// If the code after `from` is a type declaration header, return the offset
/// of its opening brace.
fn type_declaration_after(masked: &str, from: usize) -> Option<usize> {
    let rest = masked.get(from..)?;
    let mut cursor = 0;

    loop {
        let trimmed = &rest[cursor..];
        let skipped = trimmed.len() - trimmed.trim_start().len();
        cursor += skipped;
        let word: String = rest[cursor..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        if word.is_empty() {
            return None;
        }
        cursor += word.len();
        if TYPE_KEYWORDS.contains(&word.as_str()) {
            break;
        }
        if !DECLARATION_MODIFIERS.contains(&word.as_str()) {
            return None;
        }
    }

    let header = &rest[cursor..];
    let brace = header.find('{')?;
    if header[..brace].contains(';') || header[..brace].contains('}') {
        return None;
    }
    Some(from + cursor + brace)
}
