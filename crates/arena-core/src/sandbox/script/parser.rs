//! Recursive-descent parser for the agent language.

use super::ast::{AssignTarget, BinOp, Expr, FnDecl, Program, Stmt, UnOp};
use super::error::ParseError;
use super::token::{lex, Token, TokenKind};

/// Hard bound on expression nesting, so hostile source cannot overflow the
/// parser's own stack.
const MAX_EXPR_DEPTH: usize = 64;

/// Parse a full program: a sequence of `fn` declarations.
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    let tokens = lex(source)?;
    let mut parser = Parser { tokens, pos: 0 };

    let mut functions = Vec::new();
    while parser.peek() != &TokenKind::Eof {
        functions.push(parser.parse_fn()?);
    }
    Ok(Program { functions })
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn line(&self) -> u32 {
        self.tokens[self.pos].line
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.tokens[self.pos].kind.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.peek() == &kind {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!(
                "expected {}, found {}",
                kind.describe(),
                self.peek().describe()
            )))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(self.err(format!("expected identifier, found {}", other.describe()))),
        }
    }

    fn err(&self, message: String) -> ParseError {
        ParseError {
            line: self.line(),
            message,
        }
    }

    fn parse_fn(&mut self) -> Result<FnDecl, ParseError> {
        let line = self.line();
        self.expect(TokenKind::Fn)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;

        let mut params = Vec::new();
        if self.peek() != &TokenKind::RParen {
            loop {
                params.push(self.expect_ident()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        let body = self.parse_block()?;
        Ok(FnDecl {
            name,
            params,
            body,
            line,
        })
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while self.peek() != &TokenKind::RBrace {
            if self.peek() == &TokenKind::Eof {
                return Err(self.err("unterminated block, expected `}`".to_string()));
            }
            stmts.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek() {
            TokenKind::Let => {
                self.advance();
                let name = self.expect_ident()?;
                self.expect(TokenKind::Assign)?;
                let value = self.parse_expr(0)?;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Let { name, value })
            }
            TokenKind::If => self.parse_if(),
            TokenKind::While => {
                self.advance();
                let cond = self.parse_expr(0)?;
                let body = self.parse_block()?;
                Ok(Stmt::While { cond, body })
            }
            TokenKind::For => {
                self.advance();
                let var = self.expect_ident()?;
                self.expect(TokenKind::In)?;
                let iterable = self.parse_expr(0)?;
                let body = self.parse_block()?;
                Ok(Stmt::For {
                    var,
                    iterable,
                    body,
                })
            }
            TokenKind::Return => {
                self.advance();
                let value = if self.peek() == &TokenKind::Semi {
                    None
                } else {
                    Some(self.parse_expr(0)?)
                };
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Return { value })
            }
            _ => {
                let expr = self.parse_expr(0)?;
                if self.eat(&TokenKind::Assign) {
                    let target = match expr {
                        Expr::Var(name) => AssignTarget::Name(name),
                        Expr::Index { target, index } => match *target {
                            Expr::Var(name) => AssignTarget::Index {
                                name,
                                index: *index,
                            },
                            _ => {
                                return Err(self.err(
                                    "only variables and their elements can be assigned"
                                        .to_string(),
                                ))
                            }
                        },
                        _ => {
                            return Err(
                                self.err("invalid assignment target".to_string())
                            )
                        }
                    };
                    let value = self.parse_expr(0)?;
                    self.expect(TokenKind::Semi)?;
                    Ok(Stmt::Assign { target, value })
                } else {
                    self.expect(TokenKind::Semi)?;
                    Ok(Stmt::Expr(expr))
                }
            }
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::If)?;
        let cond = self.parse_expr(0)?;
        let then_block = self.parse_block()?;
        let else_block = if self.eat(&TokenKind::Else) {
            if self.peek() == &TokenKind::If {
                // `else if …` desugars to an else block holding one `if`.
                Some(vec![self.parse_if()?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_block,
            else_block,
        })
    }

    fn parse_expr(&mut self, depth: usize) -> Result<Expr, ParseError> {
        if depth > MAX_EXPR_DEPTH {
            return Err(self.err("expression nesting too deep".to_string()));
        }
        self.parse_or(depth)
    }

    fn parse_or(&mut self, depth: usize) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_and(depth)?;
        while self.eat(&TokenKind::OrOr) {
            let rhs = self.parse_and(depth)?;
            lhs = Expr::Binary {
                op: BinOp::Or,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_and(&mut self, depth: usize) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_cmp(depth)?;
        while self.eat(&TokenKind::AndAnd) {
            let rhs = self.parse_cmp(depth)?;
            lhs = Expr::Binary {
                op: BinOp::And,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_cmp(&mut self, depth: usize) -> Result<Expr, ParseError> {
        let lhs = self.parse_add(depth)?;
        let op = match self.peek() {
            TokenKind::EqEq => BinOp::Eq,
            TokenKind::NotEq => BinOp::Ne,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Le => BinOp::Le,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::Ge => BinOp::Ge,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.parse_add(depth)?;
        Ok(Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn parse_add(&mut self, depth: usize) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_mul(depth)?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_mul(depth)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_mul(&mut self, depth: usize) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary(depth)?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Rem,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary(depth)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self, depth: usize) -> Result<Expr, ParseError> {
        let op = match self.peek() {
            TokenKind::Minus => Some(UnOp::Neg),
            TokenKind::Bang => Some(UnOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            if depth > MAX_EXPR_DEPTH {
                return Err(self.err("expression nesting too deep".to_string()));
            }
            self.advance();
            // Operand parses at unary level: `-a + b` is `(-a) + b`.
            let expr = self.parse_unary(depth + 1)?;
            return Ok(Expr::Unary {
                op,
                expr: Box::new(expr),
            });
        }
        self.parse_postfix(depth)
    }

    fn parse_postfix(&mut self, depth: usize) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary(depth)?;
        loop {
            match self.peek() {
                TokenKind::LParen => {
                    self.advance();
                    let name = match expr {
                        Expr::Var(name) => name,
                        _ => {
                            return Err(
                                self.err("only named functions can be called".to_string())
                            )
                        }
                    };
                    let mut args = Vec::new();
                    if self.peek() != &TokenKind::RParen {
                        loop {
                            args.push(self.parse_expr(depth + 1)?);
                            if !self.eat(&TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen)?;
                    expr = Expr::Call { name, args };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr(depth + 1)?;
                    self.expect(TokenKind::RBracket)?;
                    expr = Expr::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_ident()?;
                    expr = Expr::Field {
                        target: Box::new(expr),
                        name,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self, depth: usize) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            TokenKind::Int(v) => {
                self.advance();
                Ok(Expr::Int(v))
            }
            TokenKind::Float(v) => {
                self.advance();
                Ok(Expr::Float(v))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::Var(name))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr(depth + 1)?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                if self.peek() != &TokenKind::RBracket {
                    loop {
                        items.push(self.parse_expr(depth + 1)?);
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RBracket)?;
                Ok(Expr::List(items))
            }
            other => Err(self.err(format!("expected expression, found {}", other.describe()))),
        }
    }
}
