//! Lexer for the cut expression language.

use crate::error::{CutflowError, Result};

/// A lexical token of the expression language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    /// A column reference.
    Ident(String),
    /// A bound scalar parameter, written `@name`.
    Param(String),
    Plus,
    Minus,
    Star,
    Slash,
    /// `**`, exponentiation.
    Power,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    Ne,
    /// `&`, element-wise AND.
    And,
    /// `|`, element-wise OR.
    Or,
    /// `~`, element-wise NOT.
    Not,
    LParen,
    RParen,
}

fn invalid(source: &str, message: impl Into<String>) -> CutflowError {
    CutflowError::InvalidExpression {
        expression: source.to_string(),
        message: message.into(),
    }
}

/// Split an expression string into tokens.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' | '\\' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::Power);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '&' => {
                tokens.push(Token::And);
                i += 1;
            }
            '|' => {
                tokens.push(Token::Or);
                i += 1;
            }
            '~' => {
                tokens.push(Token::Not);
                i += 1;
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Le);
                    i += 2;
                } else {
                    tokens.push(Token::Lt);
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ge);
                    i += 2;
                } else {
                    tokens.push(Token::Gt);
                    i += 1;
                }
            }
            '=' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::EqEq);
                    i += 2;
                } else {
                    return Err(invalid(source, "single '=' is not an operator; use '=='"));
                }
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ne);
                    i += 2;
                } else {
                    return Err(invalid(source, "unexpected '!'"));
                }
            }
            '@' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && is_ident_char(chars[end]) {
                    end += 1;
                }
                if end == start {
                    return Err(invalid(source, "'@' must be followed by a parameter name"));
                }
                tokens.push(Token::Param(chars[start..end].iter().collect()));
                i = end;
            }
            _ if c.is_ascii_digit() || c == '.' => {
                let (token, next) = lex_number(source, &chars, i)?;
                tokens.push(token);
                i = next;
            }
            _ if is_ident_start(c) => {
                let start = i;
                let mut end = i;
                while end < chars.len() && is_ident_char(chars[end]) {
                    end += 1;
                }
                tokens.push(Token::Ident(chars[start..end].iter().collect()));
                i = end;
            }
            _ => return Err(invalid(source, format!("unexpected character '{c}'"))),
        }
    }

    if tokens.is_empty() {
        return Err(invalid(source, "empty expression"));
    }
    Ok(tokens)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn lex_number(source: &str, chars: &[char], start: usize) -> Result<(Token, usize)> {
    let mut end = start;
    while end < chars.len() && (chars[end].is_ascii_digit() || chars[end] == '.') {
        end += 1;
    }
    // Scientific notation: 5.91e-4, 2e10
    if end < chars.len() && (chars[end] == 'e' || chars[end] == 'E') {
        let mut exp_end = end + 1;
        if exp_end < chars.len() && (chars[exp_end] == '+' || chars[exp_end] == '-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < chars.len() && chars[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    let text: String = chars[start..end].iter().collect();
    let value = text
        .parse::<f64>()
        .map_err(|_| invalid(source, format!("malformed number '{text}'")))?;
    Ok((Token::Number(value), end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_operators_and_idents() {
        let tokens = tokenize("0 < cs1").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Number(0.0), Token::Lt, Token::Ident("cs1".into())]
        );
    }

    #[test]
    fn lexes_power_and_scientific() {
        let tokens = tokenize("s1**0.5 + 5.91e-4").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("s1".into()),
                Token::Power,
                Token::Number(0.5),
                Token::Plus,
                Token::Number(5.91e-4),
            ]
        );
    }

    #[test]
    fn lexes_parameters() {
        let tokens = tokenize("r_3d_nn**2 / @vr2").unwrap();
        assert!(tokens.contains(&Token::Param("vr2".into())));
    }

    #[test]
    fn line_continuations_are_whitespace() {
        assert!(tokenize("(1 < x) & \\\n (x < 2)").is_ok());
    }

    #[test]
    fn rejects_stray_equals() {
        assert!(tokenize("x = 1").is_err());
        assert!(tokenize("").is_err());
        assert!(tokenize("x # y").is_err());
    }
}
