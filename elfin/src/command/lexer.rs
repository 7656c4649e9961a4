//! Tokenization of shell input lines.

use std::{error, fmt};

/// One token of a shell command.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Token {
    /// A bare word: a command or target keyword.
    Word(String),
    /// A number. A leading `0` marks the number as hexadecimal, so `010`
    /// is sixteen; anything else is decimal.
    Number(u64),
}

/// Splits `line` into [`Token`]s.
///
/// Words start with a letter and continue with letters and digits;
/// numbers start with a digit. Tokens are separated by whitespace.
///
/// # Errors
///
/// Returns [`LexError`] for characters outside the command grammar or for
/// numbers that do not parse.
pub fn tokenize(line: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();

    for word in line.split_whitespace() {
        let first = word
            .chars()
            .next()
            .unwrap_or_else(|| unreachable!("split_whitespace yields no empty words"));

        if first.is_ascii_alphabetic() {
            if let Some(bad) = word.chars().find(|c| !c.is_ascii_alphanumeric()) {
                return Err(LexError::IllegalCharacter(bad));
            }
            tokens.push(Token::Word(word.to_owned()));
        } else if first.is_ascii_digit() {
            tokens.push(Token::Number(parse_number(word)?));
        } else {
            return Err(LexError::IllegalCharacter(first));
        }
    }

    Ok(tokens)
}

/// Parses a number token: hexadecimal when it starts with `0`, decimal
/// otherwise.
fn parse_number(word: &str) -> Result<u64, LexError> {
    let (digits, radix) = match word.strip_prefix('0') {
        Some(rest) if !rest.is_empty() => (rest, 16),
        _ => (word, 10),
    };

    u64::from_str_radix(digits, radix).map_err(|_| LexError::BadNumber(word.to_owned()))
}

/// The reason a line could not be tokenized.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum LexError {
    /// The line contains a character outside the command grammar.
    IllegalCharacter(char),
    /// A number token does not parse in its radix.
    BadNumber(String),
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IllegalCharacter(c) => write!(f, "illegal character {c:?}"),
            Self::BadNumber(word) => write!(f, "bad number \"{word}\""),
        }
    }
}

impl error::Error for LexError {}
