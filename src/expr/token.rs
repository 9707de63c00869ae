use crate::error::EvalError;

/// Lexical tokens of the rule expression grammar.
///
/// Word and symbolic spellings of the logical operators (`and`/`&&`,
/// `or`/`||`, `not`/`!`) are normalized here, so the parser only ever sees
/// one form.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Gt,
    Ge,
    Lt,
    Le,
    EqEq,
    Ne,
    And,
    Or,
    Not,
    LParen,
    RParen,
    Comma,
}

/// Splits an expression into `(byte_position, token)` pairs.
pub(super) fn tokenize(text: &str) -> Result<Vec<(usize, Token)>, EvalError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' | '\r' | '\n' => i += 1,
            '+' => {
                tokens.push((i, Token::Plus));
                i += 1;
            }
            '-' => {
                tokens.push((i, Token::Minus));
                i += 1;
            }
            '*' => {
                tokens.push((i, Token::Star));
                i += 1;
            }
            '/' => {
                tokens.push((i, Token::Slash));
                i += 1;
            }
            '(' => {
                tokens.push((i, Token::LParen));
                i += 1;
            }
            ')' => {
                tokens.push((i, Token::RParen));
                i += 1;
            }
            ',' => {
                tokens.push((i, Token::Comma));
                i += 1;
            }
            '>' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    tokens.push((i, Token::Ge));
                    i += 2;
                } else {
                    tokens.push((i, Token::Gt));
                    i += 1;
                }
            }
            '<' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    tokens.push((i, Token::Le));
                    i += 2;
                } else {
                    tokens.push((i, Token::Lt));
                    i += 1;
                }
            }
            '=' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    tokens.push((i, Token::EqEq));
                    i += 2;
                } else {
                    return Err(syntax(i, "expected '==', found a single '='"));
                }
            }
            '!' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    tokens.push((i, Token::Ne));
                    i += 2;
                } else {
                    tokens.push((i, Token::Not));
                    i += 1;
                }
            }
            '&' => {
                if bytes.get(i + 1) == Some(&b'&') {
                    tokens.push((i, Token::And));
                    i += 2;
                } else {
                    return Err(syntax(i, "expected '&&', found a single '&'"));
                }
            }
            '|' => {
                if bytes.get(i + 1) == Some(&b'|') {
                    tokens.push((i, Token::Or));
                    i += 2;
                } else {
                    return Err(syntax(i, "expected '||', found a single '|'"));
                }
            }
            _ if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < bytes.len() && ((bytes[i] as char).is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                let literal = &text[start..i];
                let number = literal.parse::<f64>().map_err(|_| {
                    syntax(start, &format!("invalid numeric literal '{}'", literal))
                })?;
                tokens.push((start, Token::Number(number)));
            }
            _ if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < bytes.len() {
                    let c = bytes[i] as char;
                    if c.is_ascii_alphanumeric() || c == '_' {
                        i += 1;
                    } else {
                        break;
                    }
                }
                let word = &text[start..i];
                let token = match word {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    _ => Token::Ident(word.to_string()),
                };
                tokens.push((start, token));
            }
            _ => return Err(syntax(i, &format!("unexpected character '{}'", c))),
        }
    }

    Ok(tokens)
}

fn syntax(position: usize, message: &str) -> EvalError {
    EvalError::SyntaxError {
        position,
        message: message.to_string(),
    }
}
