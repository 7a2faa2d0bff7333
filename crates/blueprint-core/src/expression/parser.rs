//! Precedence-climbing parser producing an [`Expr`] tree.

use super::lexer::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Match,
    NotMatch,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    fn from_token(token: &Token) -> Option<Self> {
        Some(match token {
            Token::OrOr => Self::Or,
            Token::AndAnd => Self::And,
            Token::EqEq => Self::Eq,
            Token::NotEq => Self::NotEq,
            Token::RegexMatch => Self::Match,
            Token::RegexNotMatch => Self::NotMatch,
            Token::Lt => Self::Lt,
            Token::Le => Self::Le,
            Token::Gt => Self::Gt,
            Token::Ge => Self::Ge,
            Token::In => Self::In,
            Token::Plus => Self::Add,
            Token::Minus => Self::Sub,
            Token::Star => Self::Mul,
            Token::Slash => Self::Div,
            Token::Percent => Self::Rem,
            _ => return None,
        })
    }

    /// Binding power; higher binds tighter. Ternary sits below all of these.
    const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::NotEq => 3,
            Self::Match | Self::NotMatch => 4,
            Self::Lt | Self::Le | Self::Gt | Self::Ge | Self::In => 5,
            Self::Add | Self::Sub => 6,
            Self::Mul | Self::Div | Self::Rem => 7,
        }
    }

    pub(crate) const fn symbol(self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Match => "=~",
            Self::NotMatch => "!~",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::In => "in",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Number(f64),
    Str(String),
    Bool(bool),
    Ident(String),
    List(Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

pub(crate) fn parse(tokens: Vec<Token>) -> Result<Expr, String> {
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.ternary()?;
    match parser.peek() {
        None => Ok(expr),
        Some(t) => Err(format!("unexpected token {t:?} after end of expression")),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), String> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(format!("expected {expected:?}, found {:?}", self.peek()))
        }
    }

    fn ternary(&mut self) -> Result<Expr, String> {
        let cond = self.binary(1)?;
        if !self.eat(&Token::Question) {
            return Ok(cond);
        }
        let then = self.ternary()?;
        self.expect(&Token::Colon)?;
        let otherwise = self.ternary()?;
        Ok(Expr::Ternary(
            Box::new(cond),
            Box::new(then),
            Box::new(otherwise),
        ))
    }

    fn binary(&mut self, min_precedence: u8) -> Result<Expr, String> {
        let mut lhs = self.unary()?;
        while let Some(op) = self.peek().and_then(BinaryOp::from_token) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.pos += 1;
            let rhs = self.binary(precedence + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, String> {
        if self.eat(&Token::Bang) {
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(self.unary()?)));
        }
        if self.eat(&Token::Minus) {
            return Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, String> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Str(s)) => Ok(Expr::Str(s)),
            Some(Token::True) => Ok(Expr::Bool(true)),
            Some(Token::False) => Ok(Expr::Bool(false)),
            Some(Token::Ident(name)) => {
                if self.eat(&Token::LParen) {
                    let args = self.arguments()?;
                    Ok(Expr::Call(name, args))
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            Some(Token::LParen) => {
                let first = self.ternary()?;
                if self.eat(&Token::RParen) {
                    return Ok(first);
                }
                let mut items = vec![first];
                while self.eat(&Token::Comma) {
                    items.push(self.ternary()?);
                }
                self.expect(&Token::RParen)?;
                Ok(Expr::List(items))
            }
            Some(other) => Err(format!("unexpected token {other:?}")),
            None => Err("unexpected end of expression".into()),
        }
    }

    /// Arguments after an already consumed `(`.
    fn arguments(&mut self) -> Result<Vec<Expr>, String> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.ternary()?);
            if self.eat(&Token::RParen) {
                return Ok(args);
            }
            self.expect(&Token::Comma)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::lexer::tokenize;

    fn ast(src: &str) -> Expr {
        parse(tokenize(src).unwrap()).unwrap()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expected = Expr::Binary(
            BinaryOp::Add,
            Box::new(Expr::Number(1.0)),
            Box::new(Expr::Binary(
                BinaryOp::Mul,
                Box::new(Expr::Number(2.0)),
                Box::new(Expr::Number(3.0)),
            )),
        );
        assert_eq!(ast("1 + 2 * 3"), expected);
    }

    #[test]
    fn subtraction_is_left_associative() {
        let expected = Expr::Binary(
            BinaryOp::Sub,
            Box::new(Expr::Binary(
                BinaryOp::Sub,
                Box::new(Expr::Number(10.0)),
                Box::new(Expr::Number(3.0)),
            )),
            Box::new(Expr::Number(2.0)),
        );
        assert_eq!(ast("10 - 3 - 2"), expected);
    }

    #[test]
    fn ternary_is_lowest() {
        assert!(matches!(ast("A > 1 && B ? 'x' : 'y'"), Expr::Ternary(..)));
    }

    #[test]
    fn parenthesised_list() {
        assert_eq!(
            ast("('a', 'b')"),
            Expr::List(vec![Expr::Str("a".into()), Expr::Str("b".into())])
        );
    }

    #[test]
    fn calls_with_arguments() {
        assert_eq!(
            ast("max(1, A)"),
            Expr::Call(
                "max".into(),
                vec![Expr::Number(1.0), Expr::Ident("A".into())]
            )
        );
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        assert!(parse(tokenize("1 2").unwrap()).is_err());
        assert!(parse(tokenize("(1").unwrap()).is_err());
    }
}
