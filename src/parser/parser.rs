//! Recursive-descent parser for the operation language

use super::error::{ParseError, ParseResult};
use super::span::Spanned;
use super::tokenizer::{Token, tokenize};
use crate::ast::{AttributeExpr, CompositeOperation, ExistenceOperator, PathExpr, PathRoot};
use crate::operation::ComparisonOperator;
use crate::registry::Literal;

/// Parse a compilation unit
pub fn parse_operation(input: &str, max_depth: usize) -> ParseResult<Spanned<CompositeOperation>> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens, input.len(), max_depth);
    parser.parse_compilation_unit()
}

/// Parser over a token stream
pub struct Parser {
    tokens: Vec<Spanned<Token>>,
    position: usize,
    input_len: usize,
    max_depth: usize,
    depth: usize,
}

impl Parser {
    /// Create a parser over tokenized input
    pub fn new(tokens: Vec<Spanned<Token>>, input_len: usize, max_depth: usize) -> Self {
        Self {
            tokens,
            position: 0,
            input_len,
            max_depth,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&Spanned<Token>> {
        self.tokens.get(self.position)
    }

    fn peek_ahead(&self, n: usize) -> Option<&Spanned<Token>> {
        self.tokens.get(self.position + n)
    }

    fn peek_is(&self, token: &Token) -> bool {
        self.peek().is_some_and(|t| &t.value == token)
    }

    fn peek_identifier(&self, name: &str) -> bool {
        self.peek()
            .and_then(|t| t.value.as_identifier())
            .is_some_and(|ident| ident == name)
    }

    fn advance(&mut self) -> Option<Spanned<Token>> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// End offset of the last consumed token
    fn last_end(&self) -> usize {
        self.position
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(0, |t| t.end)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::UnexpectedToken {
                token: token.value.to_string(),
                expected: expected.to_string(),
                position: token.start,
                width: token.width(),
            },
            None => ParseError::UnexpectedEndOfInput {
                expected: expected.to_string(),
                position: self.input_len,
            },
        }
    }

    fn expect(&mut self, token: Token, expected: &str) -> ParseResult<Spanned<Token>> {
        if self.peek_is(&token) {
            self.advance().ok_or_else(|| self.unexpected(expected))
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn enter(&mut self, position: usize) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::NestingTooDeep {
                max_depth: self.max_depth,
                position,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// `compilation_unit := composite EOF`
    pub fn parse_compilation_unit(&mut self) -> ParseResult<Spanned<CompositeOperation>> {
        let operation = self.parse_composite()?;
        if self.peek().is_some() {
            return Err(self.unexpected("'&', '|' or end of input"));
        }
        Ok(operation)
    }

    fn parse_composite(&mut self) -> ParseResult<Spanned<CompositeOperation>> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> ParseResult<Spanned<CompositeOperation>> {
        let first = self.parse_and()?;
        if !self.peek_is(&Token::Pipe) {
            return Ok(first);
        }
        let start = first.start;
        let mut children = vec![first];
        while self.peek_is(&Token::Pipe) {
            self.advance();
            children.push(self.parse_and()?);
        }
        Ok(Spanned::new(
            CompositeOperation::Or(children),
            start,
            self.last_end(),
        ))
    }

    fn parse_and(&mut self) -> ParseResult<Spanned<CompositeOperation>> {
        let first = self.parse_primary()?;
        if !self.peek_is(&Token::Ampersand) {
            return Ok(first);
        }
        let start = first.start;
        let mut children = vec![first];
        while self.peek_is(&Token::Ampersand) {
            self.advance();
            children.push(self.parse_primary()?);
        }
        Ok(Spanned::new(
            CompositeOperation::And(children),
            start,
            self.last_end(),
        ))
    }

    fn parse_primary(&mut self) -> ParseResult<Spanned<CompositeOperation>> {
        let Some(token) = self.peek() else {
            return Err(self.unexpected("an operation"));
        };
        let (start, end) = (token.start, token.end);

        match token.value {
            Token::All => {
                self.advance();
                Ok(Spanned::new(CompositeOperation::All, start, end))
            }
            Token::None => {
                self.advance();
                Ok(Spanned::new(CompositeOperation::None, start, end))
            }
            Token::LeftParen => {
                self.advance();
                self.enter(start)?;
                let inner = self.parse_composite()?;
                self.expect(Token::RightParen, "')'")?;
                self.leave();
                Ok(Spanned::new(
                    CompositeOperation::Group(Box::new(inner)),
                    start,
                    self.last_end(),
                ))
            }
            Token::This | Token::Identifier(_) => self.parse_leaf(),
            _ => Err(self.unexpected("an operation")),
        }
    }

    fn parse_leaf(&mut self) -> ParseResult<Spanned<CompositeOperation>> {
        let start = self.peek().map_or(self.input_len, |t| t.start);

        let is_function = matches!(self.peek().map(|t| &t.value), Some(Token::Identifier(_)))
            && matches!(self.peek_ahead(1).map(|t| &t.value), Some(Token::LeftParen));
        if is_function {
            let attribute = self.parse_attribute()?;
            return self.parse_comparison(start, attribute);
        }

        let mut path = self.parse_path()?;

        // navigation.exists(...) is scanned as a path ending in the method name
        if self.peek_is(&Token::LeftParen) {
            let method = path
                .value
                .terminal()
                .and_then(|segment| ExistenceOperator::from_method(&segment.value));
            if let Some(operator) = method {
                let method_start = path.value.segments.last().map_or(start, |s| s.start);
                path.value.segments.pop();
                if path.value.segments.is_empty() {
                    return Err(ParseError::UnexpectedToken {
                        token: operator_name(operator).to_string(),
                        expected: "a relationship".to_string(),
                        position: method_start,
                        width: operator_name(operator).len(),
                    });
                }
                path.end = path.value.segments.last().map_or(path.end, |s| s.end);
                self.advance();
                self.enter(method_start)?;
                let filter = if self.peek_is(&Token::RightParen) {
                    None
                } else {
                    Some(Box::new(self.parse_composite()?))
                };
                self.expect(Token::RightParen, "')'")?;
                self.leave();
                return Ok(Spanned::new(
                    CompositeOperation::Existence {
                        navigation: path,
                        operator,
                        filter,
                    },
                    start,
                    self.last_end(),
                ));
            }
        }

        if self.peek_identifier("exists") {
            self.advance();
            return Ok(Spanned::new(
                CompositeOperation::Existence {
                    navigation: path,
                    operator: ExistenceOperator::Exists,
                    filter: None,
                },
                start,
                self.last_end(),
            ));
        }

        let not_exists = self.peek_is(&Token::Not)
            && self
                .peek_ahead(1)
                .and_then(|t| t.value.as_identifier())
                .is_some_and(|ident| ident == "exists");
        if not_exists {
            self.advance();
            self.advance();
            let filter = if self.peek_is(&Token::LeftBrace) {
                let brace = self.last_end();
                self.advance();
                self.enter(brace)?;
                let filter = self.parse_composite()?;
                self.expect(Token::RightBrace, "'}'")?;
                self.leave();
                Some(Box::new(filter))
            } else {
                None
            };
            return Ok(Spanned::new(
                CompositeOperation::Existence {
                    navigation: path,
                    operator: ExistenceOperator::NotExists,
                    filter,
                },
                start,
                self.last_end(),
            ));
        }

        let attribute = path.map(AttributeExpr::Path);
        self.parse_comparison(start, attribute)
    }

    fn parse_comparison(
        &mut self,
        start: usize,
        attribute: Spanned<AttributeExpr>,
    ) -> ParseResult<Spanned<CompositeOperation>> {
        if let Some(operator) = self.parse_unary_operator()? {
            return Ok(Spanned::new(
                CompositeOperation::Unary {
                    attribute,
                    operator,
                },
                start,
                self.last_end(),
            ));
        }

        let operator = self.parse_binary_operator()?;
        let parameter = self.parse_parameter()?;
        Ok(Spanned::new(
            CompositeOperation::Binary {
                attribute,
                operator,
                parameter,
            },
            start,
            self.last_end(),
        ))
    }

    fn parse_unary_operator(&mut self) -> ParseResult<Option<ComparisonOperator>> {
        if self.peek_is(&Token::Is) {
            self.advance();
            let operator = if self.peek_is(&Token::Not) {
                self.advance();
                ComparisonOperator::IsNotNull
            } else {
                ComparisonOperator::IsNull
            };
            self.expect(Token::Null, "'null'")?;
            return Ok(Some(operator));
        }
        if self.peek_identifier("equalsEdgePoint") {
            self.advance();
            return Ok(Some(ComparisonOperator::EqualsEdgePoint));
        }
        Ok(None)
    }

    fn parse_binary_operator(&mut self) -> ParseResult<ComparisonOperator> {
        const EXPECTED: &str = "an operator";
        let Some(token) = self.peek() else {
            return Err(self.unexpected(EXPECTED));
        };

        let operator = match &token.value {
            Token::Equal | Token::Assign => ComparisonOperator::Eq,
            Token::NotEqual => ComparisonOperator::NotEq,
            Token::Greater => ComparisonOperator::GreaterThan,
            Token::GreaterEqual => ComparisonOperator::GreaterThanEquals,
            Token::Less => ComparisonOperator::LessThan,
            Token::LessEqual => ComparisonOperator::LessThanEquals,
            Token::In => ComparisonOperator::In,
            Token::Identifier(name) => match name.as_str() {
                "startsWith" => ComparisonOperator::StartsWith,
                "endsWith" => ComparisonOperator::EndsWith,
                "contains" => ComparisonOperator::Contains,
                "wildCardEquals" => ComparisonOperator::WildCardEquals,
                "wildCardIn" => ComparisonOperator::WildCardIn,
                _ => return Err(self.unexpected(EXPECTED)),
            },
            Token::Not => {
                let negated = match self.peek_ahead(1).map(|t| &t.value) {
                    Some(Token::In) => ComparisonOperator::NotIn,
                    Some(Token::Identifier(name)) => match name.as_str() {
                        "startsWith" => ComparisonOperator::NotStartsWith,
                        "endsWith" => ComparisonOperator::NotEndsWith,
                        "contains" => ComparisonOperator::NotContains,
                        "wildCardEquals" => ComparisonOperator::WildCardNotEquals,
                        _ => {
                            self.advance();
                            return Err(self.unexpected(EXPECTED));
                        }
                    },
                    _ => {
                        self.advance();
                        return Err(self.unexpected(EXPECTED));
                    }
                };
                self.advance();
                negated
            }
            _ => return Err(self.unexpected(EXPECTED)),
        };
        self.advance();
        Ok(operator)
    }

    fn parse_parameter(&mut self) -> ParseResult<Spanned<Literal>> {
        let start = self.peek().map_or(self.input_len, |t| t.start);
        if !self.peek_is(&Token::LeftParen) {
            return self.parse_literal();
        }

        self.advance();
        let mut items = vec![self.parse_literal()?.value];
        while self.peek_is(&Token::Comma) {
            self.advance();
            items.push(self.parse_literal()?.value);
        }
        self.expect(Token::RightParen, "',' or ')'")?;
        Ok(Spanned::new(Literal::List(items), start, self.last_end()))
    }

    fn parse_literal(&mut self) -> ParseResult<Spanned<Literal>> {
        let Some(token) = self.peek() else {
            return Err(self.unexpected("a literal"));
        };
        let literal = match &token.value {
            Token::String(s) => Literal::String(s.clone()),
            Token::Integer(i) => Literal::Integer(*i),
            Token::Float(v) => Literal::Float(*v),
            Token::True => Literal::Boolean(true),
            Token::False => Literal::Boolean(false),
            Token::Null => Literal::Null,
            _ => return Err(self.unexpected("a literal")),
        };
        let (start, end) = (token.start, token.end);
        self.advance();
        Ok(Spanned::new(literal, start, end))
    }

    fn parse_attribute(&mut self) -> ParseResult<Spanned<AttributeExpr>> {
        let is_function = matches!(self.peek().map(|t| &t.value), Some(Token::Identifier(_)))
            && matches!(self.peek_ahead(1).map(|t| &t.value), Some(Token::LeftParen));
        if !is_function {
            return Ok(self.parse_path()?.map(AttributeExpr::Path));
        }

        let Some(name_token) = self.advance() else {
            return Err(self.unexpected("a function name"));
        };
        let start = name_token.start;
        let name = name_token.map(|t| t.to_string());
        self.advance();
        self.enter(start)?;

        let argument = self.parse_attribute()?;
        let mut args = Vec::new();
        while self.peek_is(&Token::Comma) {
            self.advance();
            match self.peek() {
                Some(Spanned {
                    value: Token::Integer(i),
                    start,
                    end,
                }) => {
                    args.push(Spanned::new(*i, *start, *end));
                    self.advance();
                }
                _ => return Err(self.unexpected("an integer")),
            }
        }
        self.expect(Token::RightParen, "',' or ')'")?;
        self.leave();

        Ok(Spanned::new(
            AttributeExpr::Function {
                name,
                argument: Box::new(argument),
                args,
            },
            start,
            self.last_end(),
        ))
    }

    /// `path := ('this' | ClassName) ('.' Name)+`
    ///
    /// Keywords are plain names after a `.`, so `this.in` names a member `in`.
    fn parse_path(&mut self) -> ParseResult<Spanned<PathExpr>> {
        let root = match self.peek() {
            Some(Spanned {
                value: Token::This,
                start,
                end,
            }) => Spanned::new(PathRoot::This, *start, *end),
            Some(Spanned {
                value: Token::Identifier(name),
                start,
                end,
            }) => Spanned::new(PathRoot::Class(name.clone()), *start, *end),
            _ => return Err(self.unexpected("'this' or a type name")),
        };
        self.advance();

        let mut segments = Vec::new();
        while self.peek_is(&Token::Dot) {
            self.advance();
            let segment = self.peek().and_then(|token| {
                let name = token.value.as_name()?;
                Some(Spanned::new(name.to_string(), token.start, token.end))
            });
            match segment {
                Some(segment) => {
                    segments.push(segment);
                    self.advance();
                }
                None => return Err(self.unexpected("an attribute or relationship name")),
            }
        }
        if segments.is_empty() {
            return Err(self.unexpected("'.'"));
        }

        let start = root.start;
        Ok(Spanned::new(
            PathExpr { root, segments },
            start,
            self.last_end(),
        ))
    }
}

fn operator_name(operator: ExistenceOperator) -> &'static str {
    match operator {
        ExistenceOperator::Exists => "exists",
        ExistenceOperator::NotExists => "notExists",
        ExistenceOperator::RecursiveNotExists => "recursiveNotExists",
    }
}
