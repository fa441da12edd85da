pub mod lexer;
pub mod parser;
pub mod report;

pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{ParseError, Parser, parse_problem};
pub use report::{Assignment, Report, WriterTrace};
