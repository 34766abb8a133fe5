//! nom-based tokenizer for the operation language

use super::error::{ParseError, ParseResult};
use super::span::{Span, Spanned, consumed, offset};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take, take_while, take_while1},
    character::complete::{char, multispace0, one_of},
    combinator::{all_consuming, map, opt, recognize},
    multi::many0,
    sequence::{preceded, terminated},
};
use std::fmt;

/// Operation-language token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Integer literal
    Integer(i64),
    /// Floating point literal
    Float(f64),
    /// String literal, escapes resolved
    String(String),
    /// Identifier
    Identifier(String),
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// `this`
    This,
    /// `all`
    All,
    /// `none`
    None,
    /// `not`
    Not,
    /// `is`
    Is,
    /// `in`
    In,
    /// `==`
    Equal,
    /// `=`
    Assign,
    /// `!=`
    NotEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `&` or `&&`
    Ampersand,
    /// `|` or `||`
    Pipe,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `,`
    Comma,
    /// `.`
    Dot,
}

impl Token {
    /// Get keyword from string
    pub fn from_keyword(s: &str) -> Option<Token> {
        match s {
            "true" => Some(Token::True),
            "false" => Some(Token::False),
            "null" => Some(Token::Null),
            "this" => Some(Token::This),
            "all" => Some(Token::All),
            "none" => Some(Token::None),
            "not" => Some(Token::Not),
            "is" => Some(Token::Is),
            "in" => Some(Token::In),
            _ => None,
        }
    }

    /// Identifier text, if this is an identifier
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Token::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Text usable as a member name: an identifier or any keyword
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Token::Identifier(name) => Some(name),
            Token::True => Some("true"),
            Token::False => Some("false"),
            Token::Null => Some("null"),
            Token::This => Some("this"),
            Token::All => Some("all"),
            Token::None => Some("none"),
            Token::Not => Some("not"),
            Token::Is => Some("is"),
            Token::In => Some("in"),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Integer(i) => write!(f, "{i}"),
            Token::Float(v) => write!(f, "{v}"),
            Token::String(s) => write!(f, "\"{s}\""),
            Token::Identifier(name) => f.write_str(name),
            Token::True => f.write_str("true"),
            Token::False => f.write_str("false"),
            Token::Null => f.write_str("null"),
            Token::This => f.write_str("this"),
            Token::All => f.write_str("all"),
            Token::None => f.write_str("none"),
            Token::Not => f.write_str("not"),
            Token::Is => f.write_str("is"),
            Token::In => f.write_str("in"),
            Token::Equal => f.write_str("=="),
            Token::Assign => f.write_str("="),
            Token::NotEqual => f.write_str("!="),
            Token::Greater => f.write_str(">"),
            Token::GreaterEqual => f.write_str(">="),
            Token::Less => f.write_str("<"),
            Token::LessEqual => f.write_str("<="),
            Token::Ampersand => f.write_str("&"),
            Token::Pipe => f.write_str("|"),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
            Token::LeftBrace => f.write_str("{"),
            Token::RightBrace => f.write_str("}"),
            Token::Comma => f.write_str(","),
            Token::Dot => f.write_str("."),
        }
    }
}

/// Tokenize operation-language source
pub fn tokenize(input: &str) -> ParseResult<Vec<Spanned<Token>>> {
    let span = Span::new(input);
    let (_, tokens) = tokenize_all(span).map_err(|e| match e {
        nom::Err::Error(e) | nom::Err::Failure(e) => e,
        nom::Err::Incomplete(_) => ParseError::UnexpectedEndOfInput {
            expected: "a token".to_string(),
            position: input.len(),
        },
    })?;
    Ok(tokens)
}

fn tokenize_all(input: Span) -> IResult<Span, Vec<Spanned<Token>>, ParseError> {
    all_consuming(terminated(many0(preceded(multispace0, token)), multispace0)).parse(input)
}

fn token(input: Span) -> IResult<Span, Spanned<Token>, ParseError> {
    alt((
        token_number,
        token_string,
        token_identifier_or_keyword,
        token_multi_char_op,
        token_single_char,
    ))
    .parse(input)
}

fn token_number(input: Span) -> IResult<Span, Spanned<Token>, ParseError> {
    let start = input;
    let (input, number) = recognize((
        opt(char('-')),
        take_while1(|c: char| c.is_ascii_digit()),
        opt((char('.'), take_while1(|c: char| c.is_ascii_digit()))),
        opt((
            one_of("eE"),
            opt(one_of("+-")),
            take_while1(|c: char| c.is_ascii_digit()),
        )),
    ))
    .parse(input)?;

    let text = *number.fragment();
    let invalid = |literal_type: &str| {
        nom::Err::Failure(ParseError::InvalidLiteral {
            literal_type: literal_type.to_string(),
            value: text.to_string(),
            position: offset(&start),
        })
    };

    let token = if text.contains(['.', 'e', 'E']) {
        match text.parse::<f64>() {
            Ok(v) if v.is_finite() => Token::Float(v),
            _ => return Err(invalid("float")),
        }
    } else {
        match text.parse::<i64>() {
            Ok(i) => Token::Integer(i),
            Err(_) => return Err(invalid("integer")),
        }
    };

    Ok((input, consumed(&start, &input, token)))
}

fn token_string(input: Span) -> IResult<Span, Spanned<Token>, ParseError> {
    let start = input;
    let (input, quote) = one_of("\"'").parse(input)?;

    let mut value = String::new();
    let mut consumed = 0;
    let mut chars = input.fragment().chars();
    loop {
        let Some(c) = chars.next() else {
            return Err(nom::Err::Failure(ParseError::UnclosedString {
                position: offset(&start),
            }));
        };
        consumed += 1;
        if c == quote {
            break;
        }
        if c != '\\' {
            value.push(c);
            continue;
        }
        let escaped = chars.next();
        consumed += 1;
        match escaped {
            Some('"') => value.push('"'),
            Some('\'') => value.push('\''),
            Some('\\') => value.push('\\'),
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some(other) => {
                let backslash = offset(&input)
                    + input
                        .fragment()
                        .chars()
                        .take(consumed - 2)
                        .map(|c| c.len_utf8())
                        .sum::<usize>();
                return Err(nom::Err::Failure(ParseError::InvalidEscape {
                    sequence: format!("\\{other}"),
                    position: backslash,
                }));
            }
            None => {
                return Err(nom::Err::Failure(ParseError::UnclosedString {
                    position: offset(&start),
                }));
            }
        }
    }

    let (input, _) = take(consumed).parse(input)?;
    Ok((input, super::span::consumed(&start, &input, Token::String(value))))
}

fn token_identifier_or_keyword(input: Span) -> IResult<Span, Spanned<Token>, ParseError> {
    let start = input;
    let (input, ident) = recognize((
        take_while1(|c: char| unicode_xid::UnicodeXID::is_xid_start(c) || c == '_'),
        take_while(|c: char| unicode_xid::UnicodeXID::is_xid_continue(c)),
    ))
    .parse(input)?;

    let text = *ident.fragment();
    let token = Token::from_keyword(text).unwrap_or_else(|| Token::Identifier(text.to_string()));

    Ok((input, consumed(&start, &input, token)))
}

fn token_multi_char_op(input: Span) -> IResult<Span, Spanned<Token>, ParseError> {
    let start = input;
    let (input, token) = alt((
        map(tag("=="), |_| Token::Equal),
        map(tag("!="), |_| Token::NotEqual),
        map(tag(">="), |_| Token::GreaterEqual),
        map(tag("<="), |_| Token::LessEqual),
        map(tag("&&"), |_| Token::Ampersand),
        map(tag("||"), |_| Token::Pipe),
    ))
    .parse(input)?;

    Ok((input, consumed(&start, &input, token)))
}

fn token_single_char(input: Span) -> IResult<Span, Spanned<Token>, ParseError> {
    let start = input;
    let (input, token) = alt((
        map(char('='), |_| Token::Assign),
        map(char('>'), |_| Token::Greater),
        map(char('<'), |_| Token::Less),
        map(char('&'), |_| Token::Ampersand),
        map(char('|'), |_| Token::Pipe),
        map(char('('), |_| Token::LeftParen),
        map(char(')'), |_| Token::RightParen),
        map(char('{'), |_| Token::LeftBrace),
        map(char('}'), |_| Token::RightBrace),
        map(char(','), |_| Token::Comma),
        map(char('.'), |_| Token::Dot),
    ))
    .parse(input)?;

    Ok((input, consumed(&start, &input, token)))
}
