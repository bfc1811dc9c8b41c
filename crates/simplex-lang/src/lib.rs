pub mod ast;
pub mod compiler;
pub mod lexer;
pub mod parser;

pub use ast::*;
pub use compiler::{solve, solve_with, Compiler, CompileError, ConstraintInput, Error, Location, ProblemInput};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{parse_equation, resolve, ParseError, Parser};
