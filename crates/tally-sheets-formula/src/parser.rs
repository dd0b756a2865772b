//! Formula parser
//!
//! A hand-rolled scanner and recursive descent parser for the arithmetic
//! formula language. The parser does not build nodes itself; it drives a
//! [`TreeBuilder`] with post-order construction events, which is where
//! parenthesis simplification and reference-slot sharing happen.

use crate::ast::{BinaryOp, TreeBuilder, UnaryOp};
use crate::formula::Formula;
use tally_sheets_core::error::Error;
use tally_sheets_core::Result;

/// Parse a formula expression (without the leading `=`) into a [`Formula`].
///
/// # Example
/// ```rust
/// use tally_sheets_formula::parse_formula;
///
/// let formula = parse_formula("A1+2*B3").unwrap();
/// assert_eq!(formula.expression(), "A1+2*B3");
/// ```
pub fn parse_formula(expr: &str) -> Result<Formula> {
    let mut parser = Parser::new(expr)?;
    parser.parse_expr()?;

    if parser.current != Token::Eof {
        return Err(Error::FormulaParse(format!(
            "unexpected trailing input: {:?}",
            parser.current
        )));
    }

    let (root, refs) = parser.builder.build();
    Ok(Formula::new(root, refs))
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(String),
    Cell(String),
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
    Eof,
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    current: Token,
    builder: TreeBuilder,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self> {
        let mut parser = Self {
            input,
            pos: 0,
            current: Token::Eof,
            builder: TreeBuilder::new(),
        };
        parser.advance()?;
        Ok(parser)
    }

    // === Token scanning ===

    fn advance(&mut self) -> Result<()> {
        self.current = self.scan_token()?;
        Ok(())
    }

    fn scan_token(&mut self) -> Result<Token> {
        self.skip_whitespace();

        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        match c {
            '+' => {
                self.advance_char();
                Ok(Token::Plus)
            }
            '-' => {
                self.advance_char();
                Ok(Token::Minus)
            }
            '*' => {
                self.advance_char();
                Ok(Token::Star)
            }
            '/' => {
                self.advance_char();
                Ok(Token::Slash)
            }
            '(' => {
                self.advance_char();
                Ok(Token::LeftParen)
            }
            ')' => {
                self.advance_char();
                Ok(Token::RightParen)
            }
            '0'..='9' => Ok(self.scan_number()),
            'A'..='Z' => self.scan_cell(),
            _ => Err(Error::FormulaParse(format!(
                "unexpected character '{}'",
                c
            ))),
        }
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;

        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance_char();
        }

        // Fractional part only when digits follow the dot
        if self.peek_char() == Some('.')
            && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit())
        {
            self.advance_char();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance_char();
            }
        }

        // Exponent part, with optional sign
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            let after_sign = match self.peek_char_at(1) {
                Some('+') | Some('-') => 2,
                _ => 1,
            };
            if self
                .peek_char_at(after_sign)
                .map_or(false, |c| c.is_ascii_digit())
            {
                for _ in 0..after_sign {
                    self.advance_char();
                }
                while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                    self.advance_char();
                }
            }
        }

        Token::Number(self.input[start..self.pos].to_string())
    }

    fn scan_cell(&mut self) -> Result<Token> {
        let start = self.pos;

        while self.peek_char().map_or(false, |c| c.is_ascii_uppercase()) {
            self.advance_char();
        }

        if !self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            return Err(Error::FormulaParse(format!(
                "bad cell reference '{}'",
                &self.input[start..self.pos]
            )));
        }

        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance_char();
        }

        Ok(Token::Cell(self.input[start..self.pos].to_string()))
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance_char(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance_char();
        }
    }

    // === Expression parsing ===
    // Precedence (lowest to highest):
    // 1. Addition/Subtraction: +, - (left-associative)
    // 2. Multiplication/Division: *, / (left-associative)
    // 3. Unary sign: +, -
    // 4. Atoms: literals, cell references, parentheses

    fn parse_expr(&mut self) -> Result<()> {
        self.parse_term()?;

        loop {
            let op = match self.current {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };

            self.advance()?;
            self.parse_term()?;
            self.builder.add_binary(op);
        }

        Ok(())
    }

    fn parse_term(&mut self) -> Result<()> {
        self.parse_unary()?;

        loop {
            let op = match self.current {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                _ => break,
            };

            self.advance()?;
            self.parse_unary()?;
            self.builder.add_binary(op);
        }

        Ok(())
    }

    fn parse_unary(&mut self) -> Result<()> {
        let sign = match self.current {
            Token::Plus => Some(UnaryOp::Plus),
            Token::Minus => Some(UnaryOp::Minus),
            _ => None,
        };

        if sign.is_some() {
            self.advance()?;
        }

        self.parse_atom()?;

        if let Some(op) = sign {
            self.builder.add_unary(op);
        }

        Ok(())
    }

    fn parse_atom(&mut self) -> Result<()> {
        match self.current.clone() {
            Token::Number(text) => {
                self.advance()?;
                self.builder.add_literal(text);
                Ok(())
            }

            Token::Cell(name) => {
                self.advance()?;
                self.builder.add_cell(&name)
            }

            Token::LeftParen => {
                self.advance()?;
                self.parse_expr()?;
                if self.current != Token::RightParen {
                    return Err(Error::FormulaParse(format!(
                        "expected ')', got {:?}",
                        self.current
                    )));
                }
                self.advance()?;
                self.builder.add_parens();
                Ok(())
            }

            other => Err(Error::FormulaParse(format!(
                "unexpected token: {:?}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_sheets_core::Position;

    fn expression(input: &str) -> String {
        parse_formula(input).unwrap().expression()
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(expression("42"), "42");
        assert_eq!(expression("3.14"), "3.14");
        assert_eq!(expression("1e10"), "1e10");
        assert_eq!(expression("2.5E-3"), "2.5E-3");
        // Maximal munch: 2E3 is a literal, not 2 followed by cell E3
        assert_eq!(expression("2E3"), "2E3");
    }

    #[test]
    fn test_parse_cells() {
        let formula = parse_formula("A1+ZZ100").unwrap();
        assert_eq!(
            formula.referenced_cells(),
            vec![
                Position::parse("A1").unwrap(),
                Position::parse("ZZ100").unwrap()
            ]
        );
    }

    #[test]
    fn test_whitespace_insignificant() {
        assert_eq!(expression(" 1 +  2 * A1 "), "1+2*A1");
    }

    #[test]
    fn test_left_associativity() {
        // (1-2)-3, not 1-(2-3)
        let formula = parse_formula("1-2-3").unwrap();
        assert_eq!(formula.evaluate(&NoCells).unwrap(), -4.0);

        let formula = parse_formula("8/4/2").unwrap();
        assert_eq!(formula.evaluate(&NoCells).unwrap(), 1.0);
    }

    #[test]
    fn test_precedence() {
        let formula = parse_formula("1+2*3").unwrap();
        assert_eq!(formula.evaluate(&NoCells).unwrap(), 7.0);

        let formula = parse_formula("(1+2)*3").unwrap();
        assert_eq!(formula.evaluate(&NoCells).unwrap(), 9.0);
    }

    #[test]
    fn test_unary_sign() {
        assert_eq!(expression("-5"), "-5");
        assert_eq!(expression("+5"), "+5");
        assert_eq!(expression("-(1+2)"), "-(1+2)");
        assert_eq!(expression("-(1*2)"), "-1*2");
        assert_eq!(expression("2--3"), "2--3");

        let formula = parse_formula("2--3").unwrap();
        assert_eq!(formula.evaluate(&NoCells).unwrap(), 5.0);
    }

    #[test]
    fn test_parens_canonicalization() {
        assert_eq!(expression("(1+2)*3"), "(1+2)*3");
        assert_eq!(expression("(1*2)+3"), "1*2+3");
        assert_eq!(expression("1-(2+3)"), "1-(2+3)");
        assert_eq!(expression("(1+2)-3"), "1+2-3");
        assert_eq!(expression("1/(2*3)"), "1/(2*3)");
        assert_eq!(expression("(2*3)/4"), "2*3/4");
        assert_eq!(expression("(1-2)/3"), "(1-2)/3");
        assert_eq!(expression("((A1))"), "A1");
        assert_eq!(expression("(((1+2)))"), "(1+2)");
    }

    #[test]
    fn test_rebuild_reparses_to_same_form() {
        for input in ["(1+2)*3", "-(A1+B2)/4", "1-(2-3)", "+A1*(B2+1)"] {
            let canonical = expression(input);
            assert_eq!(expression(&canonical), canonical);
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_formula("").is_err());
        assert!(parse_formula("1+").is_err());
        assert!(parse_formula("(1+2").is_err());
        assert!(parse_formula("1+2)").is_err());
        assert!(parse_formula("1 2").is_err());
        assert!(parse_formula("a1").is_err());
        assert!(parse_formula("A").is_err());
        assert!(parse_formula("A0").is_err());
        assert!(parse_formula("AAAA1").is_err());
        assert!(parse_formula("ZZZ1").is_err());
        assert!(parse_formula("A16385").is_err());
        assert!(parse_formula("1..2").is_err());
        assert!(parse_formula("1&2").is_err());
    }

    struct NoCells;

    impl crate::ast::CellSource for NoCells {
        fn cell_value(
            &self,
            _pos: Position,
        ) -> Option<tally_sheets_core::CellValue> {
            None
        }
    }
}
