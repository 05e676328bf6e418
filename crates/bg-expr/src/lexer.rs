//! Expression tokenizer.
//!
//! A single left-to-right scan over the input bytes. Anything outside
//! printable ASCII, and whitespace, is skipped between tokens. Numeric
//! literal values go into a side table, one entry per [`Token::Number`],
//! in emission order.

use alloc::vec::Vec;

use crate::error::{spelling, LexError};
use crate::token::{Arity, Token};

/// Tokenizer output.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    pub literals: Vec<f64>,
}

impl TokenStream {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanState {
    TokenStart,
    /// A `-` that may still turn into a negative literal.
    AmbiguousMinus,
    Number,
    Word,
    Symbols,
}

fn starts_number(c: u8) -> bool {
    c.is_ascii_digit() || c == b'.'
}

// `x` is accepted into the literal text but only decimal parsing runs, so
// any literal containing it is rejected when parsed.
fn continues_number(c: u8) -> bool {
    starts_number(c) || c == b'x'
}

/// Scan `text` into tokens and literal values.
pub fn tokenize(text: &str) -> Result<TokenStream, LexError> {
    let bytes = text.as_bytes();
    let mut out = TokenStream::default();
    let mut state = ScanState::TokenStart;
    let mut start = 0;
    let mut pos = 0;

    loop {
        let current = bytes.get(pos).copied();

        match state {
            ScanState::TokenStart => {
                let Some(c) = current else { break };
                start = pos;
                pos += 1;
                state = if c == b'-' {
                    ScanState::AmbiguousMinus
                } else if starts_number(c) {
                    ScanState::Number
                } else if c.is_ascii_alphabetic() {
                    ScanState::Word
                } else if c.is_ascii_graphic() {
                    ScanState::Symbols
                } else {
                    ScanState::TokenStart
                };
            }

            ScanState::AmbiguousMinus => {
                if current.is_some_and(starts_number) {
                    pos += 1;
                    state = ScanState::Number;
                } else {
                    out.tokens.push(Token::Subtract);
                    state = ScanState::TokenStart;
                }
            }

            ScanState::Number => {
                if current.is_some_and(continues_number) {
                    pos += 1;
                    continue;
                }
                let literal = &text[start..pos];
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| LexError::MalformedNumber {
                        text: spelling(literal),
                        offset: start,
                    })?;
                out.literals.push(value);
                out.tokens.push(Token::Number);
                state = ScanState::TokenStart;
            }

            ScanState::Word => {
                if current.is_some_and(|c| c.is_ascii_alphanumeric()) {
                    pos += 1;
                    continue;
                }
                let word = &text[start..pos];
                let token = Token::lookup(word);
                if token == Token::Invalid {
                    return Err(LexError::UnknownWord {
                        text: spelling(word),
                        offset: start,
                    });
                }
                if token.arity() == Arity::Unary && current == Some(b'(') {
                    return Err(LexError::CallSyntax {
                        text: spelling(word),
                        offset: start,
                    });
                }
                out.tokens.push(token);
                state = ScanState::TokenStart;
            }

            ScanState::Symbols => {
                // Greedy: try the two-character operator first.
                if current.is_some_and(|c| c.is_ascii_graphic()) {
                    let token = Token::lookup(&text[start..pos + 1]);
                    if token != Token::Invalid {
                        out.tokens.push(token);
                        pos += 1;
                        state = ScanState::TokenStart;
                        continue;
                    }
                }
                let symbol = &text[start..pos];
                let token = Token::lookup(symbol);
                if token == Token::Invalid {
                    return Err(LexError::UnknownSymbol {
                        text: spelling(symbol),
                        offset: start,
                    });
                }
                out.tokens.push(token);
                state = ScanState::TokenStart;
            }
        }
    }

    Ok(out)
}
