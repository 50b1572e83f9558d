//! Recursive descent parser for interaction predicates
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expression  : and_expr ( OR and_expr )*
//! and_expr    : unary ( AND unary )*
//! unary       : NOT unary | primary
//! primary     : '(' expression ')'
//!             | ANY '(' cc_list ')'
//!             | COUNT '(' ( '*' | cc_list ) ')' comparison NUMBER
//!             | AGE comparison NUMBER
//!             | HCC<n>
//!             | flag identifier
//! ```

use super::ast::{Comparison, CountScope, Expr, Flag};
use super::lexer::Lexer;
use super::token::{Token, TokenType};

/// Parser over a single predicate expression.
pub struct Parser {
    lexer: Lexer,
    current: Token,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, String> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Parser { lexer, current })
    }

    /// Parse the entire expression, requiring all input to be consumed.
    pub fn parse(mut self) -> Result<Expr, String> {
        let expr = self.parse_expression()?;
        if self.current.token_type != TokenType::Eof {
            return Err(format!(
                "unexpected trailing input '{}' at position {}",
                self.current.value, self.current.position
            ));
        }
        Ok(expr)
    }

    fn advance(&mut self) -> Result<(), String> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, token_type: TokenType, what: &str) -> Result<(), String> {
        if self.current.token_type != token_type {
            return Err(format!(
                "expected {what}, got '{}' at position {}",
                self.current.value, self.current.position
            ));
        }
        self.advance()
    }

    fn parse_expression(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_and_expression()?;
        while self.current.token_type == TokenType::Or {
            self.advance()?;
            let right = self.parse_and_expression()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and_expression(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_unary()?;
        while self.current.token_type == TokenType::And {
            self.advance()?;
            let right = self.parse_unary()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, String> {
        if self.current.token_type == TokenType::Not {
            self.advance()?;
            let inner = self.parse_unary()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        match self.current.token_type {
            TokenType::OpenParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(TokenType::CloseParen, "')'")?;
                Ok(expr)
            }
            TokenType::Any => {
                self.advance()?;
                self.expect(TokenType::OpenParen, "'(' after ANY")?;
                let list = self.parse_cc_list()?;
                self.expect(TokenType::CloseParen, "')'")?;
                Ok(Expr::Any(list))
            }
            TokenType::Count => {
                self.advance()?;
                self.expect(TokenType::OpenParen, "'(' after COUNT")?;
                let scope = if self.current.token_type == TokenType::Star {
                    self.advance()?;
                    CountScope::All
                } else {
                    CountScope::List(self.parse_cc_list()?)
                };
                self.expect(TokenType::CloseParen, "')'")?;
                let op = self.parse_comparison()?;
                let value = self.parse_number()?;
                Ok(Expr::Count { scope, op, value })
            }
            TokenType::Age => {
                self.advance()?;
                let op = self.parse_comparison()?;
                let value = self.parse_number()?;
                Ok(Expr::Age { op, value })
            }
            TokenType::Identifier => {
                let name = self.current.value.clone();
                let position = self.current.position;
                self.advance()?;
                if let Some(cc) = parse_cc_name(&name) {
                    return Ok(Expr::Cc(cc));
                }
                match Flag::from_name(&name) {
                    Some(flag) => Ok(Expr::Flag(flag)),
                    None => Err(format!(
                        "unknown identifier '{name}' at position {position}"
                    )),
                }
            }
            _ => Err(format!(
                "expected a predicate term, got '{}' at position {}",
                self.current.value, self.current.position
            )),
        }
    }

    /// Comma-separated CC list; entries are bare numbers or `HCC<n>` names.
    fn parse_cc_list(&mut self) -> Result<Vec<u32>, String> {
        let mut list = Vec::new();
        loop {
            match self.current.token_type {
                TokenType::Number => {
                    let cc = self.current.value.parse::<u32>().map_err(|_| {
                        format!(
                            "'{}' is not a condition category number",
                            self.current.value
                        )
                    })?;
                    list.push(cc);
                    self.advance()?;
                }
                TokenType::Identifier => {
                    let Some(cc) = parse_cc_name(&self.current.value) else {
                        return Err(format!(
                            "'{}' is not a condition category",
                            self.current.value
                        ));
                    };
                    list.push(cc);
                    self.advance()?;
                }
                _ => {
                    return Err(format!(
                        "expected a condition category, got '{}' at position {}",
                        self.current.value, self.current.position
                    ))
                }
            }
            if self.current.token_type == TokenType::Comma {
                self.advance()?;
            } else {
                break;
            }
        }
        Ok(list)
    }

    fn parse_comparison(&mut self) -> Result<Comparison, String> {
        let op = match self.current.token_type {
            TokenType::Equal => Comparison::Eq,
            TokenType::NotEqual => Comparison::Ne,
            TokenType::GreaterEqual => Comparison::Ge,
            TokenType::Greater => Comparison::Gt,
            TokenType::LessEqual => Comparison::Le,
            TokenType::Less => Comparison::Lt,
            _ => {
                return Err(format!(
                    "expected a comparison operator, got '{}' at position {}",
                    self.current.value, self.current.position
                ))
            }
        };
        self.advance()?;
        Ok(op)
    }

    fn parse_number(&mut self) -> Result<u64, String> {
        if self.current.token_type != TokenType::Number {
            return Err(format!(
                "expected a number, got '{}' at position {}",
                self.current.value, self.current.position
            ));
        }
        let value = self
            .current
            .value
            .parse::<u64>()
            .map_err(|_| format!("'{}' is not a number", self.current.value))?;
        self.advance()?;
        Ok(value)
    }
}

/// `HCC<n>` identifiers denote CC membership.
fn parse_cc_name(name: &str) -> Option<u32> {
    name.strip_prefix("HCC")?.parse::<u32>().ok()
}
