use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Eof,
    Def,
    Extern,
    Ident(String),
    Number(f64),
    /// numeral text that isn't a valid float, e.g. `1.2.3`
    BadNumber(String),
    /// any other single character: punctuation and operators
    Char(char),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Eof => write!(f, "end of input"),
            Token::Def => write!(f, "'def'"),
            Token::Extern => write!(f, "'extern'"),
            Token::Ident(ident) => write!(f, "identifier '{}'", ident),
            Token::Number(num) => write!(f, "number {}", num),
            Token::BadNumber(text) => write!(f, "malformed number '{}'", text),
            Token::Char(c) => write!(f, "'{}'", c),
        }
    }
}

/// pulls characters from `source` one at a time and hands out tokens on demand
pub struct Lexer<I: Iterator<Item = char>> {
    source: I,
    // None once the source is exhausted
    last_char: Option<char>,
}

impl<I: Iterator<Item = char>> Lexer<I> {
    pub fn new(source: I) -> Self {
        Self {
            source,
            last_char: Some(' '),
        }
    }

    fn bump(&mut self) {
        if self.last_char.is_some() {
            self.last_char = self.source.next();
        }
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(c) = self.last_char.filter(|&c| pred(c)) {
            text.push(c);
            self.bump();
        }
        text
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.last_char {
            if c == '\n' || c == '\r' {
                break;
            }
            self.bump();
        }
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            while self.last_char.map_or(false, char::is_whitespace) {
                self.bump();
            }

            let c = match self.last_char {
                Some(c) => c,
                None => return Token::Eof,
            };

            if c.is_alphabetic() {
                let ident = self.eat_while(char::is_alphanumeric);
                return match ident.as_str() {
                    "def" => Token::Def,
                    "extern" => Token::Extern,
                    _ => Token::Ident(ident),
                };
            }

            if c.is_ascii_digit() || c == '.' {
                let text = self.eat_while(|c| c.is_ascii_digit() || c == '.');
                return match text.parse() {
                    Ok(num) => Token::Number(num),
                    Err(_) => Token::BadNumber(text),
                };
            }

            if c == '#' {
                self.skip_comment();
                continue;
            }

            self.bump();
            return Token::Char(c);
        }
    }
}

impl<I: Iterator<Item = char>> Iterator for Lexer<I> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        match self.next_token() {
            Token::Eof => None,
            tok => Some(tok),
        }
    }
}

/// lex the whole input string, without the trailing `Eof`
pub fn lex(input: &str) -> Vec<Token> {
    Lexer::new(input.chars()).collect()
}
