use std::str::CharIndices;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Run of decimal digits
    Number,
    /// Letters optionally followed by digits (`X1`, `XY12`)
    Ident,
    Plus,
    Minus,
    Eof,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

/// Splits an equation such as `13X0 + X2 - 4X3` into tokens.
///
/// Whitespace separates tokens and is otherwise dropped; offsets in spans
/// are byte offsets into the source text.
pub struct Lexer<'a> {
    source: &'a str,
    chars: CharIndices<'a>,
    current: Option<(usize, char)>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.char_indices();
        let current = chars.next();
        Self {
            source,
            chars,
            current,
        }
    }

    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn pos(&self) -> usize {
        self.current.map_or(self.source.len(), |(i, _)| i)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current.map(|(_, c)| c);
        self.current = self.chars.next();
        c
    }

    fn peek(&self) -> Option<char> {
        self.current.map(|(_, c)| c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
    }

    fn read_number(&mut self) -> Token {
        let start = self.pos();
        self.eat_while(|c| c.is_ascii_digit());
        let end = self.pos();
        Token::new(TokenKind::Number, Span::new(start, end), &self.source[start..end])
    }

    fn read_ident(&mut self) -> Token {
        let start = self.pos();
        self.eat_while(|c| c.is_ascii_alphabetic());
        self.eat_while(|c| c.is_ascii_digit());
        let end = self.pos();
        Token::new(TokenKind::Ident, Span::new(start, end), &self.source[start..end])
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.pos();
        self.advance();
        let end = self.pos();
        Token::new(kind, Span::new(start, end), &self.source[start..end])
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos();
        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, Span::new(start, start), "");
        };

        match c {
            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_ascii_alphabetic() => self.read_ident(),
            _ => self.single(TokenKind::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_terms() {
        let tokens = Lexer::tokenize("13X0 + x2 - 4X3");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["13", "X0", "+", "x2", "-", "4", "X3", ""]);
        assert_eq!(
            kinds("13X0 + x2 - 4X3"),
            vec![
                TokenKind::Number,
                TokenKind::Ident,
                TokenKind::Plus,
                TokenKind::Ident,
                TokenKind::Minus,
                TokenKind::Number,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_ident_stops_after_digits() {
        let tokens = Lexer::tokenize("X1X2");
        assert_eq!(tokens[0].text, "X1");
        assert_eq!(tokens[1].text, "X2");
        assert_eq!(tokens[1].span, Span::new(2, 4));
    }

    #[test]
    fn test_spans_skip_whitespace() {
        let tokens = Lexer::tokenize("  3 X1\t+X2 ");
        assert_eq!(tokens[0].span, Span::new(2, 3));
        assert_eq!(tokens[1].span, Span::new(4, 6));
        assert_eq!(tokens[2].span, Span::new(7, 8));
        assert_eq!(tokens[4].span, Span::new(11, 11));
    }

    #[test]
    fn test_unknown_character() {
        let tokens = Lexer::tokenize("X1 +*");
        assert_eq!(tokens[2].kind, TokenKind::Error);
        assert_eq!(tokens[2].text, "*");
        assert_eq!(tokens[2].span.start, 4);
    }
}
