use simplex_solver::{Equation, VariableRegistry};
use thiserror::Error;

use crate::ast::*;
use crate::lexer::{Lexer, Span, Token, TokenKind};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Your equation is incomplete: {text}")]
    Incomplete { offset: usize, text: String },
    #[error("Invalid character <{found}> at index {offset} in equation: {text}")]
    InvalidCharacter {
        found: char,
        offset: usize,
        text: String,
    },
    #[error("Undeclared variable {name} at index {}", .span.start)]
    UndeclaredVariable { name: String, span: Span },
    #[error("Coefficient {digits} is too large")]
    CoefficientOverflow { digits: String, span: Span },
}

impl ParseError {
    /// Byte offset of the offending character or token
    pub fn offset(&self) -> usize {
        match self {
            ParseError::Incomplete { offset, .. } | ParseError::InvalidCharacter { offset, .. } => *offset,
            ParseError::UndeclaredVariable { span, .. } | ParseError::CoefficientOverflow { span, .. } => span.start,
        }
    }

    /// The undeclared variable's name, if that is what went wrong
    pub fn variable(&self) -> Option<&str> {
        match self {
            ParseError::UndeclaredVariable { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Syntax pass over `[sign] [digits]NAME ((+|-) [digits]NAME)*`.
///
/// Reports the first offset at which the text stops being a valid prefix,
/// or `Incomplete` when the text is a valid prefix that ends too early.
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Lexer::tokenize(source),
            pos: 0,
        }
    }

    pub fn parse(source: &str) -> Result<EquationAst, ParseError> {
        Parser::new(source).parse_equation()
    }

    fn current(&self) -> &Token {
        // The token list always ends with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        self.pos += 1;
        token
    }

    fn invalid_at(&self, offset: usize) -> ParseError {
        match self.source[offset..].chars().next() {
            Some(found) => ParseError::InvalidCharacter {
                found,
                offset,
                text: self.source.to_string(),
            },
            None => ParseError::Incomplete {
                offset,
                text: self.source.to_string(),
            },
        }
    }

    fn unexpected(&self) -> ParseError {
        self.invalid_at(self.current().span.start)
    }

    fn parse_sign(&mut self) -> Option<(Sign, Span)> {
        match self.peek_kind() {
            TokenKind::Plus => Some((Sign::Plus, self.advance().span)),
            TokenKind::Minus => Some((Sign::Minus, self.advance().span)),
            _ => None,
        }
    }

    fn parse_equation(&mut self) -> Result<EquationAst, ParseError> {
        let mut sign = self.parse_sign();
        let mut terms = Vec::new();

        loop {
            terms.push(self.parse_term(sign)?);
            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Plus | TokenKind::Minus => sign = self.parse_sign(),
                _ => return Err(self.unexpected()),
            }
        }

        Ok(EquationAst { terms })
    }

    fn parse_term(&mut self, sign: Option<(Sign, Span)>) -> Result<Term, ParseError> {
        let coefficient = if self.peek_kind() == TokenKind::Number {
            let number = self.advance();
            let next = self.current();
            if next.kind == TokenKind::Ident && next.span.start != number.span.end {
                // Whitespace between coefficient and name
                return Err(self.invalid_at(number.span.end));
            }
            Some(Coefficient {
                span: number.span,
                digits: number.text,
            })
        } else {
            None
        };

        if self.peek_kind() != TokenKind::Ident {
            return Err(self.unexpected());
        }
        let name = self.advance();

        let start = sign
            .map(|(_, span)| span)
            .or(coefficient.as_ref().map(|c| c.span))
            .unwrap_or(name.span);

        Ok(Term {
            span: start.merge(name.span),
            sign: sign.map_or(Sign::Plus, |(s, _)| s),
            coefficient,
            name: name.text,
            name_span: name.span,
        })
    }
}

/// Parse an equation against a registry.
///
/// The result has an entry for every registry variable, zero for the ones
/// the text does not mention. Repeated variables accumulate.
pub fn parse_equation(source: &str, registry: &VariableRegistry) -> Result<Equation, ParseError> {
    let ast = Parser::parse(source)?;
    resolve(&ast, registry)
}

/// Semantic pass: look every term's variable up and sum the coefficients
pub fn resolve(ast: &EquationAst, registry: &VariableRegistry) -> Result<Equation, ParseError> {
    let mut equation = Equation::zeros(registry);
    for term in &ast.terms {
        let mut matches = registry.matching(&term.name);
        let Some(variable) = matches.next() else {
            return Err(ParseError::UndeclaredVariable {
                name: term.name.clone(),
                span: term.name_span,
            });
        };
        assert!(
            matches.next().is_none(),
            "registry holds more than one variable named {}",
            term.name
        );

        let magnitude = match &term.coefficient {
            Some(c) => coefficient_value(c)?,
            None => 1.0,
        };
        equation.add(variable, term.sign.apply(magnitude));
    }
    Ok(equation)
}

fn coefficient_value(coefficient: &Coefficient) -> Result<f64, ParseError> {
    coefficient
        .digits
        .bytes()
        .try_fold(0u64, |acc, b| acc.checked_mul(10)?.checked_add(u64::from(b - b'0')))
        .map(|value| value as f64)
        .ok_or_else(|| ParseError::CoefficientOverflow {
            digits: coefficient.digits.clone(),
            span: coefficient.span,
        })
}
