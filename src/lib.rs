pub mod ast;
pub mod config;
pub mod lexer;
pub mod parser;
