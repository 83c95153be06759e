use std::collections::HashMap;

use crate::ast::{ASTNode, Expression, Function, Prototype};
use crate::lexer::{Lexer, Token};

#[derive(Debug, PartialEq, Clone, thiserror::Error)]
pub enum ParserError {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: &'static str, found: Token },
    #[error("unknown token {0} when expecting an expression")]
    UnknownPrimary(Token),
    #[error("expected ')' or ',' in argument list, found {0}")]
    BadArgumentList(Token),
    #[error("malformed number '{0}'")]
    BadNumber(String),
    #[error("expression nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

pub type PartialParseResult = Result<Expression, ParserError>;

#[derive(Debug, Clone)]
pub struct ParserSettings {
    /// binary operators and how tightly they bind, higher is tighter
    pub operator_precedence: HashMap<char, u32>,
    /// how many expressions may be nested inside one another
    pub max_depth: usize,
}

impl std::default::Default for ParserSettings {
    fn default() -> Self {
        let mut operator_precedence = HashMap::new();
        operator_precedence.insert('<', 10);
        operator_precedence.insert('+', 20);
        operator_precedence.insert('-', 30);
        operator_precedence.insert('*', 40);
        Self {
            operator_precedence,
            max_depth: 256,
        }
    }
}

impl ParserSettings {
    /// install `op` as a binary operator, a precedence of 0 removes it
    pub fn set_precedence(&mut self, op: char, precedence: u32) {
        if precedence == 0 {
            self.operator_precedence.remove(&op);
        } else {
            self.operator_precedence.insert(op, precedence);
        }
    }

    pub fn parser<I: Iterator<Item = char>>(&self, source: I) -> Parser<I> {
        Parser::new(source, self.clone())
    }

    /// parse every top-level item in `input`, giving up at the first error
    pub fn parse_str(&self, input: &str) -> Result<Vec<ASTNode>, ParserError> {
        let mut parser = self.parser(input.chars());
        let mut ast = Vec::new();
        while let Some(node) = parser.parse_item() {
            ast.push(node?);
        }
        Ok(ast)
    }
}

pub struct Parser<I: Iterator<Item = char>> {
    lexer: Lexer<I>,
    current: Token,
    settings: ParserSettings,
    depth: usize,
}

impl<I: Iterator<Item = char>> Parser<I> {
    /// reads the first token right away, so this blocks on an interactive source
    pub fn new(source: I, settings: ParserSettings) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            settings,
            depth: 0,
        }
    }

    pub fn current(&self) -> &Token {
        &self.current
    }

    /// consume the current token, returning it
    fn advance(&mut self) -> Token {
        std::mem::replace(&mut self.current, self.lexer.next_token())
    }

    fn expect_char(&mut self, c: char, expected: &'static str) -> Result<(), ParserError> {
        if self.current == Token::Char(c) {
            self.advance();
            Ok(())
        } else {
            Err(ParserError::UnexpectedToken {
                expected,
                found: self.current.clone(),
            })
        }
    }

    fn current_precedence(&self) -> Option<u32> {
        match self.current {
            Token::Char(op) => self
                .settings
                .operator_precedence
                .get(&op)
                .copied()
                .filter(|&pr| pr > 0),
            _ => None,
        }
    }

    fn parse_number(&mut self) -> PartialParseResult {
        if let Token::Number(num) = self.advance() {
            Ok(Expression::Number(num))
        } else {
            unreachable!()
        }
    }

    fn parse_identifier(&mut self) -> PartialParseResult {
        let ident = match self.advance() {
            Token::Ident(ident) => ident,
            _ => unreachable!(),
        };

        if self.current != Token::Char('(') {
            return Ok(Expression::Variable(ident));
        }
        self.advance();

        let mut args = Vec::new();
        if self.current != Token::Char(')') {
            loop {
                args.push(self.parse_expression()?);

                match self.current {
                    Token::Char(')') => break,
                    Token::Char(',') => {
                        self.advance();
                    }
                    ref tok => return Err(ParserError::BadArgumentList(tok.clone())),
                }
            }
        }
        self.advance();

        Ok(Expression::Call(ident, args))
    }

    fn parse_nested(&mut self) -> PartialParseResult {
        self.expect_char('(', "'('")?;
        let res = self.parse_expression()?;
        self.expect_char(')', "')'")?;
        Ok(res)
    }

    fn parse_primary(&mut self) -> PartialParseResult {
        match self.current {
            Token::Number(_) => self.parse_number(),
            Token::BadNumber(ref text) => Err(ParserError::BadNumber(text.clone())),
            Token::Ident(_) => self.parse_identifier(),
            Token::Char('(') => self.parse_nested(),
            ref tok => Err(ParserError::UnknownPrimary(tok.clone())),
        }
    }

    fn parse_rhs(&mut self, expr_precedence: u32, lhs: Expression) -> PartialParseResult {
        let mut result = lhs;

        loop {
            let precedence = match self.current_precedence() {
                Some(pr) if pr >= expr_precedence => pr,
                _ => return Ok(result),
            };
            let operator = match self.advance() {
                Token::Char(op) => op,
                _ => unreachable!(),
            };

            let mut rhs = self.parse_primary()?;

            // a tighter operator after rhs takes rhs as its own lhs
            if self
                .current_precedence()
                .map_or(false, |next_precedence| precedence < next_precedence)
            {
                rhs = self.parse_rhs(precedence + 1, rhs)?;
            }

            result = Expression::Binary(operator, Box::new(result), Box::new(rhs));
        }
    }

    pub fn parse_expression(&mut self) -> PartialParseResult {
        if self.depth >= self.settings.max_depth {
            return Err(ParserError::NestingTooDeep(self.settings.max_depth));
        }

        self.depth += 1;
        let res = self
            .parse_primary()
            .and_then(|lhs| self.parse_rhs(0, lhs));
        self.depth -= 1;
        res
    }

    pub fn parse_prototype(&mut self) -> Result<Prototype, ParserError> {
        let name = match self.current {
            Token::Ident(ref name) => name.clone(),
            ref tok => {
                return Err(ParserError::UnexpectedToken {
                    expected: "function name in prototype",
                    found: tok.clone(),
                })
            }
        };
        self.advance();

        self.expect_char('(', "'(' in prototype")?;
        let mut args = Vec::new();
        while let Token::Ident(ref arg) = self.current {
            args.push(arg.clone());
            self.advance();
        }
        self.expect_char(')', "')' in prototype")?;

        Ok(Prototype { name, args })
    }

    pub fn parse_definition(&mut self) -> Result<Function, ParserError> {
        self.advance();
        let prototype = self.parse_prototype()?;
        let body = self.parse_expression()?;
        Ok(Function { prototype, body })
    }

    pub fn parse_extern(&mut self) -> Result<Prototype, ParserError> {
        self.advance();
        self.parse_prototype()
    }

    pub fn parse_top_level_expr(&mut self) -> Result<Function, ParserError> {
        let body = self.parse_expression()?;
        Ok(Function {
            prototype: Prototype::anonymous(),
            body,
        })
    }

    /// consume one `;` separator, if that's the current token
    pub fn skip_separator(&mut self) -> bool {
        if self.current == Token::Char(';') {
            self.advance();
            true
        } else {
            false
        }
    }

    /// parse the next top-level item, `None` once the input runs out.
    ///
    /// after an error the offending token is skipped so the next call makes progress
    pub fn parse_item(&mut self) -> Option<Result<ASTNode, ParserError>> {
        loop {
            let node = match self.current {
                Token::Eof => return None,
                Token::Char(';') => {
                    self.skip_separator();
                    continue;
                }
                Token::Def => self.parse_definition().map(ASTNode::Function),
                Token::Extern => self.parse_extern().map(ASTNode::Extern),
                _ => self.parse_top_level_expr().map(ASTNode::Function),
            };

            if node.is_err() {
                self.advance();
            }
            return Some(node);
        }
    }
}

impl<I: Iterator<Item = char>> Iterator for Parser<I> {
    type Item = Result<ASTNode, ParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parse_item()
    }
}
