use thiserror::Error;
use twophase_solver::{ConstraintOp, Direction, GeneralProblem, ProblemError};

use crate::lexer::{Lexer, Span, Token, TokenKind};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Empty problem: expected an objective line starting with min or max")]
    Empty,
    #[error("Invalid number '{text}' at {span}")]
    InvalidNumber { text: String, span: Span },
    #[error("Invalid variable '{text}' at {span}")]
    InvalidVariable { text: String, span: Span },
    #[error("Only a zero lower bound is supported in var lines, found {text} at {span}")]
    UnsupportedBound { text: String, span: Span },
    #[error("Invalid problem: {0}")]
    Problem(#[from] ProblemError),
}

/// Parser for the line-oriented problem format:
///
/// ```text
/// max 3 2
/// 2 1 <= 18
/// 2 3 <= 42
/// 3 1 <= 24
/// var 1 2 >= 0
/// ```
///
/// The first line is the objective. Every other line is either a constraint
/// (`coefficients relation constant`) or a `var` line listing 1-based
/// non-negative variables, as `2` or `x2`. Variables not listed are free.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(source: &str) -> Result<GeneralProblem, ParseError> {
        let tokens = Lexer::tokenize(source);
        let mut parser = Parser::new(tokens);
        parser.parse_problem()
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn skip_blank_lines(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Comment) {
            self.advance();
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(t) => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: describe(t),
                span: t.span,
            },
            None => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: "end of file".to_string(),
                span: Span::new(0, 0),
            },
        }
    }

    /// Consume the rest of the line, allowing a trailing comment.
    fn expect_line_end(&mut self) -> Result<(), ParseError> {
        if self.peek_kind() == TokenKind::Comment {
            self.advance();
        }
        match self.peek_kind() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("end of line")),
        }
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        if self.peek_kind() != TokenKind::Number {
            return Err(self.unexpected("number"));
        }
        let token = self.advance().ok_or(ParseError::Empty)?;
        match token.text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ParseError::InvalidNumber {
                text: token.text,
                span: token.span,
            }),
        }
    }

    fn parse_numbers(&mut self) -> Result<Vec<f64>, ParseError> {
        let mut numbers = Vec::new();
        while self.peek_kind() == TokenKind::Number {
            numbers.push(self.parse_number()?);
        }
        Ok(numbers)
    }

    fn parse_problem(&mut self) -> Result<GeneralProblem, ParseError> {
        self.skip_blank_lines();
        let direction = match self.peek_kind() {
            TokenKind::Min => Direction::Min,
            TokenKind::Max => Direction::Max,
            TokenKind::Eof => return Err(ParseError::Empty),
            _ => return Err(self.unexpected("min or max")),
        };
        self.advance();

        let objective = self.parse_numbers()?;
        if objective.is_empty() {
            return Err(self.unexpected("objective coefficient"));
        }
        self.expect_line_end()?;

        let mut problem = GeneralProblem::new(direction, objective);

        loop {
            self.skip_blank_lines();
            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Var => self.parse_var_line(&mut problem)?,
                TokenKind::Number => self.parse_constraint(&mut problem)?,
                _ => return Err(self.unexpected("constraint or var line")),
            }
        }

        problem.validate()?;
        Ok(problem)
    }

    fn parse_constraint(&mut self, problem: &mut GeneralProblem) -> Result<(), ParseError> {
        let coefficients = self.parse_numbers()?;
        let op = match self.peek_kind() {
            TokenKind::Le => ConstraintOp::Le,
            TokenKind::Ge => ConstraintOp::Ge,
            TokenKind::Eq => ConstraintOp::Eq,
            _ => return Err(self.unexpected("<=, >= or =")),
        };
        self.advance();
        let rhs = self.parse_number()?;
        self.expect_line_end()?;

        problem.add_constraint(coefficients, op, rhs);
        Ok(())
    }

    /// `var 1 x2 3 >= 0`; repeated var lines accumulate.
    fn parse_var_line(&mut self, problem: &mut GeneralProblem) -> Result<(), ParseError> {
        self.advance();

        let mut indices = Vec::new();
        while matches!(self.peek_kind(), TokenKind::Number | TokenKind::Ident) {
            let token = self.advance().ok_or(ParseError::Empty)?;
            indices.push(variable_index(&token)?);
        }
        if indices.is_empty() {
            return Err(self.unexpected("variable"));
        }

        if self.peek_kind() != TokenKind::Ge {
            return Err(self.unexpected(">="));
        }
        self.advance();

        if self.peek_kind() == TokenKind::Number {
            let span = self.current().map(|t| t.span).unwrap_or(Span::new(0, 0));
            let bound = self.parse_number()?;
            if bound != 0.0 {
                return Err(ParseError::UnsupportedBound {
                    text: bound.to_string(),
                    span,
                });
            }
        }
        self.expect_line_end()?;

        problem.non_negative.extend(indices);
        Ok(())
    }
}

/// Zero-based index of a `3` or `x3` reference.
fn variable_index(token: &Token) -> Result<usize, ParseError> {
    let digits = match token.kind {
        TokenKind::Ident => token
            .text
            .strip_prefix('x')
            .or_else(|| token.text.strip_prefix('X'))
            .unwrap_or(""),
        _ => token.text.as_str(),
    };
    match digits.parse::<usize>() {
        Ok(n) if n >= 1 && digits.bytes().all(|b| b.is_ascii_digit()) => Ok(n - 1),
        _ => Err(ParseError::InvalidVariable {
            text: token.text.clone(),
            span: token.span,
        }),
    }
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Newline => "end of line".to_string(),
        TokenKind::Eof => "end of file".to_string(),
        _ => format!("'{}'", token.text),
    }
}

/// Parse a problem from source text.
pub fn parse_problem(source: &str) -> Result<GeneralProblem, ParseError> {
    Parser::parse(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classic() {
        let source = "max 3 2\n2 1 <= 18\n2 3 <= 42\n3 1 <= 24\nvar 1 2 >= 0\n";
        let problem = parse_problem(source).unwrap();

        assert_eq!(problem.direction, Direction::Max);
        assert_eq!(problem.objective, vec![3.0, 2.0]);
        assert_eq!(problem.num_constraints(), 3);
        assert_eq!(problem.constraints[1].coefficients, vec![2.0, 3.0]);
        assert_eq!(problem.constraints[2].op, ConstraintOp::Le);
        assert_eq!(problem.constraints[2].rhs, 24.0);
        assert!(problem.is_non_negative(0));
        assert!(problem.is_non_negative(1));
    }

    #[test]
    fn test_parse_relations_comments_and_names() {
        let source = "# demo\n\nMIN 1 -1.5\n1 1 >= -3  # lower\n1 -1 = 1\n\nvar x2 >= 0\n";
        let problem = parse_problem(source).unwrap();

        assert_eq!(problem.direction, Direction::Min);
        assert_eq!(problem.objective, vec![1.0, -1.5]);
        assert_eq!(problem.constraints[0].op, ConstraintOp::Ge);
        assert_eq!(problem.constraints[0].rhs, -3.0);
        assert_eq!(problem.constraints[1].op, ConstraintOp::Eq);
        assert!(!problem.is_non_negative(0));
        assert!(problem.is_non_negative(1));
    }

    #[test]
    fn test_without_var_line_everything_is_free() {
        let problem = parse_problem("min 1 1\n1 1 >= 2").unwrap();
        assert!(problem.non_negative.is_empty());
    }

    #[test]
    fn test_var_lines_accumulate() {
        let problem = parse_problem("min 1 1 1\nvar 1 >= 0\nvar 3 >=\n").unwrap();
        assert_eq!(problem.non_negative.iter().copied().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(parse_problem("\n# nothing\n"), Err(ParseError::Empty));
    }

    #[test]
    fn test_bad_objective() {
        let err = parse_problem("maximize 1 2\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
        let err = parse_problem("max\n1 <= 2\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_missing_relation() {
        let err = parse_problem("max 1 2\n1 2 18\n").unwrap_err();
        match err {
            ParseError::UnexpectedToken { expected, span, .. } => {
                assert_eq!(expected, "<=, >= or =");
                assert_eq!(span.line, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_variable_reference() {
        let err = parse_problem("max 1 2\nvar 0 >= 0\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidVariable { .. }));
        let err = parse_problem("max 1 2\nvar y1 >= 0\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidVariable { .. }));
    }

    #[test]
    fn test_nonzero_bound() {
        let err = parse_problem("max 1\nvar 1 >= 2\n").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedBound { .. }));
    }

    #[test]
    fn test_invalid_number() {
        let err = parse_problem("max 1 -.\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                text: "-.".to_string(),
                span: Span::new(1, 7)
            }
        );
        let err = parse_problem("max 1 -\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_out_of_range_number() {
        let err = parse_problem("max 1\n1 <= 1e999\nvar 1 >= 0\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                text: "1e999".to_string(),
                span: Span::new(2, 6)
            }
        );
    }

    #[test]
    fn test_validation_errors_surface() {
        let err = parse_problem("max 1 2\n1 <= 4\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::Problem(ProblemError::CoefficientCount {
                constraint: 1,
                expected: 2,
                actual: 1
            })
        );
        let err = parse_problem("max 1 2\nvar 3 >= 0\n").unwrap_err();
        assert_eq!(err, ParseError::Problem(ProblemError::VariableIndex { index: 2, count: 2 }));
    }
}
