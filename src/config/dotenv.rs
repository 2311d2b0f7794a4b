//! Dot-env file support
//!
//! The format is deliberately strict:
//! - empty lines and lines starting with `#` are ignored
//! - every other line must look like `export NAME=value`, where `NAME` is made of
//!   upper-case letters, digits and underscores
//! - a value written as quoted string literals (`"a\nb"`, `'x'`, `r"raw"`, `u"x"`) is
//!   unescaped and adjacent literals are joined; anything else is kept verbatim
//! - escapes cover `\n`-style letters, octal `\ooo`, `\xhh`, `\uhhhh` and
//!   `\Uhhhhhhhh`; `\N{...}` names and byte literals (`b"..."`) are not decoded and
//!   leave the value raw or the escape as written
//!
//! Environment values are always strings, so `export N=5` yields `"5"`.

use regex::Regex;
use std::path::Path;
use std::str::CharIndices;
use std::sync::OnceLock;
use thiserror::Error;

static LINE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn line_pattern() -> &'static Regex {
    LINE_PATTERN.get_or_init(|| {
        Regex::new(r"^export ([A-Z0-9_]+)=(.+)$").expect("dot-env line pattern is valid")
    })
}

#[derive(Debug, Error)]
pub enum DotEnvError {
    #[error("Invalid line in dot env file {line}: {content}")]
    InvalidLine { line: usize, content: String },

    #[error("Failed to read dot env file: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse dot-env content into `(name, value)` pairs, in file order.
///
/// Line numbers in errors are 1-based.
pub fn parse(content: &str) -> Result<Vec<(String, String)>, DotEnvError> {
    let mut pairs = Vec::new();
    for (index, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(caps) = line_pattern().captures(line) else {
            return Err(DotEnvError::InvalidLine {
                line: index + 1,
                content: line.to_string(),
            });
        };
        let raw_value = &caps[2];
        let value = unquote(raw_value).unwrap_or_else(|| raw_value.to_string());
        pairs.push((caps[1].to_string(), value));
    }
    Ok(pairs)
}

/// Read and parse a dot-env file, then export every pair into the process environment.
///
/// Returns the number of exported variables.
pub fn load(path: &Path) -> Result<usize, DotEnvError> {
    let content = std::fs::read_to_string(path)?;
    let pairs = parse(&content)?;
    for (name, value) in &pairs {
        std::env::set_var(name, value);
    }
    Ok(pairs.len())
}

/// Decode a value written as string literals.
///
/// Adjacent literals are joined, so `"a" 'b'` yields `ab`. Returns `None` when `raw`
/// is not made of well-formed literals only, in which case the caller keeps the raw
/// text.
fn unquote(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    loop {
        let (value, after) = string_literal(rest)?;
        out.push_str(&value);
        rest = after.trim_start();
        if rest.is_empty() {
            return Some(out);
        }
    }
}

/// Parse the literal at the start of `input`, returning its value and what follows it
fn string_literal(input: &str) -> Option<(String, &str)> {
    let (is_raw, rest) = match input.as_bytes().first()? {
        b'r' | b'R' => (true, &input[1..]),
        b'u' | b'U' => (false, &input[1..]),
        _ => (false, input),
    };
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }

    let body = &rest[1..];
    let mut out = String::new();
    let mut chars = body.char_indices();
    while let Some((index, c)) = chars.next() {
        if c == quote {
            return Some((out, &body[index + 1..]));
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        let (_, escaped) = chars.next()?;
        if is_raw {
            // raw literals keep the backslash, it only shields the next character
            out.push('\\');
            out.push(escaped);
            continue;
        }
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'v' => out.push('\u{0B}'),
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            '\n' => {}
            '0'..='7' => out.push(octal_char(escaped, &mut chars)?),
            'x' => out.push(hex_char(&mut chars, 2)?),
            'u' => out.push(hex_char(&mut chars, 4)?),
            'U' => out.push(hex_char(&mut chars, 8)?),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    // unterminated
    None
}

/// Up to three octal digits, the first already consumed
fn octal_char(first: char, chars: &mut CharIndices<'_>) -> Option<char> {
    let mut value = first.to_digit(8)?;
    for _ in 0..2 {
        let mut ahead = chars.clone();
        match ahead.next().and_then(|(_, c)| c.to_digit(8)) {
            Some(digit) => {
                value = value * 8 + digit;
                *chars = ahead;
            }
            None => break,
        }
    }
    char::from_u32(value)
}

fn hex_char(chars: &mut CharIndices<'_>, digits: usize) -> Option<char> {
    let hex: String = chars.by_ref().take(digits).map(|(_, c)| c).collect();
    if hex.len() != digits {
        return None;
    }
    u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
}
