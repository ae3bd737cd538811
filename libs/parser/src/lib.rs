#[cfg(test)]
mod test;

pub mod tree_node;

use quick_error::quick_error;
use tokenizer::{
    self, Tokenizer, TokenizerBuffer,
    token::{Keyword, Symbol, Token, TokenType},
};
use tree_node::*;

#[macro_export]
/// A macro to create a boxed value.
macro_rules! boxed {
    ($e:expr) => {
        Box::new($e)
    };
}

quick_error! {
    #[derive(Debug)]
    pub enum Error {
        TokenizerError(err: tokenizer::Error) {
            from()
            display("Tokenizer Error: {}", err)
            source(err)
        }
        UnexpectedToken(token: Token) {
            display("Unexpected token `{}` at line {}, column {}", token.token_type, token.line, token.column)
        }
        InvalidSyntax(token: Token, reason: String) {
            display("Invalid syntax near `{}` at line {}, column {}: {}", token.token_type, token.line, token.column, reason)
        }
        UnexpectedEOF {
            display("Unexpected EOF")
        }
    }
}

macro_rules! token_from_option {
    ($token:expr) => {
        match $token {
            Some(ref token) => token.clone(),
            None => return Err(Error::UnexpectedEOF),
        }
    };
}

macro_rules! extract_token_data {
    ($token:expr, $pattern:pat, $extraction:expr) => {
        match $token.token_type {
            $pattern => $extraction,
            _ => {
                return Err(Error::UnexpectedToken($token.clone()));
            }
        }
    };
}

macro_rules! self_matches_current {
    ($self:ident, $pattern:pat) => {
        matches!($self.current_token, Some(Token { token_type: $pattern, .. }))
    };
    ($self:ident, $pattern:pat if $cond:expr) => {
        matches!($self.current_token, Some(Token { token_type: $pattern, .. }) if $cond)
    };
}

macro_rules! token_matches {
    ($token:expr, $pattern:pat) => {
        matches!($token.token_type, $pattern)
    };
    ($token:expr, $pattern:pat if $cond:expr) => {
        matches!($token.token_type, $pattern if $cond)
    };
}

/// Recursive descent parser. `current_token` always holds the next token that has
/// not been claimed by a grammar rule yet
pub struct Parser {
    tokenizer: TokenizerBuffer,
    current_token: Option<Token>,
}

impl Parser {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Parser {
            tokenizer: TokenizerBuffer::new(tokenizer),
            current_token: None,
        }
    }

    /// Parses all the input from the tokenizer buffer and returns the root node
    pub fn parse_all(&mut self) -> Result<Node, Error> {
        let mut statements = Vec::<Node>::new();

        self.assign_next()?;

        loop {
            let current_token = token_from_option!(self.current_token);
            match current_token.token_type {
                TokenType::EOF => break,
                TokenType::Newline => self.assign_next()?,
                _ => statements.push(self.statement()?),
            }
        }

        Ok(Node::Root(statements))
    }

    /// Assigns the next token in the tokenizer buffer to the current token
    fn assign_next(&mut self) -> Result<(), Error> {
        self.current_token = self.tokenizer.next_token()?;
        Ok(())
    }

    /// Returns the current token and moves on to the next one
    fn advance(&mut self) -> Result<Token, Error> {
        let token = token_from_option!(self.current_token);
        self.assign_next()?;
        Ok(token)
    }

    fn expect_symbol(&mut self, symbol: Symbol) -> Result<Token, Error> {
        let token = token_from_option!(self.current_token);
        if !token_matches!(token, TokenType::Symbol(s) if s == symbol) {
            return Err(Error::UnexpectedToken(token));
        }
        self.advance()
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<Token, Error> {
        let token = token_from_option!(self.current_token);
        if !token_matches!(token, TokenType::Keyword(k) if k == keyword) {
            return Err(Error::UnexpectedToken(token));
        }
        self.advance()
    }

    fn statement(&mut self) -> Result<Node, Error> {
        let current_token = token_from_option!(self.current_token);

        match current_token.token_type {
            TokenType::Keyword(Keyword::If) => self.if_statement().map(Node::If),
            TokenType::Keyword(Keyword::While) => self.while_statement().map(Node::While),
            TokenType::Keyword(Keyword::Elif) | TokenType::Keyword(Keyword::Else) => {
                Err(Error::InvalidSyntax(
                    current_token,
                    String::from("branch without a matching `if`"),
                ))
            }
            _ => self.simple_statement(),
        }
    }

    /// Yield, assignment or expression statement, terminated by the end of the line
    fn simple_statement(&mut self) -> Result<Node, Error> {
        let statement = if self_matches_current!(self, TokenType::Keyword(Keyword::Yield)) {
            self.assign_next()?;
            Node::Yield
        } else {
            let expression = self.test()?;

            if self_matches_current!(self, TokenType::Symbol(s) if s.is_assignment()) {
                Node::Assignment(self.assignment(expression)?)
            } else {
                expression
            }
        };

        let current_token = token_from_option!(self.current_token);
        match current_token.token_type {
            TokenType::Newline => self.assign_next()?,
            TokenType::EOF | TokenType::Dedent => {}
            _ => return Err(Error::UnexpectedToken(current_token)),
        }

        Ok(statement)
    }

    fn assignment(&mut self, target: Node) -> Result<AssignmentStatement, Error> {
        let operator_token = self.advance()?;
        let operator = extract_token_data!(
            operator_token,
            TokenType::Symbol(s),
            AssignmentOperator::from_symbol(s)
        )
        .ok_or_else(|| Error::UnexpectedToken(operator_token.clone()))?;

        if !matches!(
            target,
            Node::Variable(_) | Node::DotAccess(_) | Node::SlotAccess(_)
        ) {
            return Err(Error::InvalidSyntax(
                operator_token,
                format!("cannot assign to `{}`", target),
            ));
        }

        let value = self.test()?;

        Ok(AssignmentStatement {
            target: boxed!(target),
            operator,
            value: boxed!(value),
        })
    }

    fn if_statement(&mut self) -> Result<IfStatement, Error> {
        self.expect_keyword(Keyword::If)?;

        let mut arms = vec![self.conditional_arm()?];

        while self_matches_current!(self, TokenType::Keyword(Keyword::Elif)) {
            self.assign_next()?;
            arms.push(self.conditional_arm()?);
        }

        let else_body = if self_matches_current!(self, TokenType::Keyword(Keyword::Else)) {
            self.assign_next()?;
            self.expect_symbol(Symbol::Colon)?;
            Some(boxed!(self.suite()?))
        } else {
            None
        };

        Ok(IfStatement { arms, else_body })
    }

    /// `test ':' suite`, shared by `if`, `elif` and `while`
    fn conditional_arm(&mut self) -> Result<ConditionalArm, Error> {
        let test = self.test()?;
        self.expect_symbol(Symbol::Colon)?;
        let body = self.suite()?;

        Ok(ConditionalArm { test, body })
    }

    fn while_statement(&mut self) -> Result<WhileStatement, Error> {
        self.expect_keyword(Keyword::While)?;
        let ConditionalArm { test, body } = self.conditional_arm()?;

        Ok(WhileStatement {
            test: boxed!(test),
            body: boxed!(body),
        })
    }

    /// Either an indented block or a single statement on the same line
    fn suite(&mut self) -> Result<Node, Error> {
        if !self_matches_current!(self, TokenType::Newline) {
            return Ok(Node::Suite(vec![self.simple_statement()?]));
        }

        self.assign_next()?;
        let current_token = token_from_option!(self.current_token);
        if !token_matches!(current_token, TokenType::Indent) {
            return Err(Error::InvalidSyntax(
                current_token,
                String::from("expected an indented block"),
            ));
        }
        self.assign_next()?;

        let mut statements = Vec::<Node>::new();
        loop {
            let current_token = token_from_option!(self.current_token);
            match current_token.token_type {
                TokenType::Dedent => {
                    self.assign_next()?;
                    break;
                }
                TokenType::EOF => break,
                TokenType::Newline => self.assign_next()?,
                _ => statements.push(self.statement()?),
            }
        }

        Ok(Node::Suite(statements))
    }

    /// `or_test ['if' or_test 'else' test]`
    fn test(&mut self) -> Result<Node, Error> {
        let value = self.or_test()?;

        if !self_matches_current!(self, TokenType::Keyword(Keyword::If)) {
            return Ok(value);
        }
        self.assign_next()?;

        let test = self.or_test()?;
        self.expect_keyword(Keyword::Else)?;
        let otherwise = self.test()?;

        Ok(Node::Test(TernaryExpression {
            value: boxed!(value),
            test: boxed!(test),
            otherwise: boxed!(otherwise),
        }))
    }

    fn or_test(&mut self) -> Result<Node, Error> {
        let mut operands = vec![self.and_test()?];

        while self_matches_current!(self, TokenType::Keyword(Keyword::Or)) {
            self.assign_next()?;
            operands.push(self.and_test()?);
        }

        Ok(if operands.len() == 1 {
            operands.remove(0)
        } else {
            Node::Or(operands)
        })
    }

    fn and_test(&mut self) -> Result<Node, Error> {
        let mut operands = vec![self.not_test()?];

        while self_matches_current!(self, TokenType::Keyword(Keyword::And)) {
            self.assign_next()?;
            operands.push(self.not_test()?);
        }

        Ok(if operands.len() == 1 {
            operands.remove(0)
        } else {
            Node::And(operands)
        })
    }

    fn not_test(&mut self) -> Result<Node, Error> {
        if self_matches_current!(self, TokenType::Keyword(Keyword::Not)) {
            self.assign_next()?;
            return Ok(Node::Not(boxed!(self.not_test()?)));
        }

        self.comparison()
    }

    /// Collects `operand (operator operand)*` for the operators accepted by `accepts`
    fn chain(
        &mut self,
        operand: fn(&mut Self) -> Result<Node, Error>,
        accepts: fn(&Symbol) -> bool,
        kind: fn(OperatorChain) -> Node,
    ) -> Result<Node, Error> {
        let first = operand(self)?;
        let mut rest = Vec::new();

        while self_matches_current!(self, TokenType::Symbol(ref s) if accepts(s)) {
            let token = self.advance()?;
            let operator = extract_token_data!(
                token,
                TokenType::Symbol(s),
                BinaryOperator::from_symbol(s)
            )
            .ok_or_else(|| Error::UnexpectedToken(token.clone()))?;

            rest.push((operator, operand(self)?));
        }

        if rest.is_empty() {
            return Ok(first);
        }

        Ok(kind(OperatorChain {
            first: boxed!(first),
            rest,
        }))
    }

    fn comparison(&mut self) -> Result<Node, Error> {
        self.chain(Self::arithmetic, Symbol::is_comparison, Node::Comparison)
    }

    fn arithmetic(&mut self) -> Result<Node, Error> {
        self.chain(
            Self::term,
            |s| matches!(s, Symbol::Plus | Symbol::Minus),
            Node::Arithmetic,
        )
    }

    fn term(&mut self) -> Result<Node, Error> {
        self.chain(
            Self::factor,
            |s| matches!(s, Symbol::Asterisk | Symbol::Slash | Symbol::Percent),
            Node::Term,
        )
    }

    fn factor(&mut self) -> Result<Node, Error> {
        if self_matches_current!(self, TokenType::Symbol(Symbol::Minus)) {
            self.assign_next()?;
            return Ok(Node::Negation(boxed!(self.factor()?)));
        }
        if self_matches_current!(self, TokenType::Symbol(Symbol::Plus)) {
            self.assign_next()?;
            return self.factor();
        }

        self.atom_expression()
    }

    /// An atom followed by any number of call, property and slot trailers
    fn atom_expression(&mut self) -> Result<Node, Error> {
        let mut node = self.atom()?;

        loop {
            let current_token = token_from_option!(self.current_token);

            node = match current_token.token_type {
                TokenType::Symbol(Symbol::LParen) => match node {
                    Node::Variable(name) => Node::Call(CallExpression {
                        name,
                        arguments: self.arguments()?,
                    }),
                    other => {
                        return Err(Error::InvalidSyntax(
                            current_token,
                            format!("`{}` is not callable", other),
                        ));
                    }
                },
                TokenType::Symbol(Symbol::Dot) => {
                    self.assign_next()?;
                    let property_token = self.advance()?;
                    let property = extract_token_data!(
                        property_token,
                        TokenType::Identifier(ref id),
                        id.clone()
                    );
                    Node::DotAccess(DotAccessExpression {
                        target: boxed!(node),
                        property,
                    })
                }
                TokenType::Symbol(Symbol::LBracket) => match node {
                    Node::DotAccess(access) => {
                        self.assign_next()?;
                        let index = self.test()?;
                        self.expect_symbol(Symbol::RBracket)?;
                        Node::SlotAccess(SlotAccessExpression {
                            access,
                            index: boxed!(index),
                        })
                    }
                    _ => {
                        return Err(Error::InvalidSyntax(
                            current_token,
                            String::from("only device properties can be indexed"),
                        ));
                    }
                },
                _ => break,
            };
        }

        Ok(node)
    }

    fn arguments(&mut self) -> Result<Vec<Node>, Error> {
        self.expect_symbol(Symbol::LParen)?;

        let mut arguments = Vec::<Node>::new();
        if self_matches_current!(self, TokenType::Symbol(Symbol::RParen)) {
            self.assign_next()?;
            return Ok(arguments);
        }

        loop {
            arguments.push(self.test()?);

            let current_token = self.advance()?;
            match current_token.token_type {
                TokenType::Symbol(Symbol::Comma) => continue,
                TokenType::Symbol(Symbol::RParen) => break,
                _ => return Err(Error::UnexpectedToken(current_token)),
            }
        }

        Ok(arguments)
    }

    fn atom(&mut self) -> Result<Node, Error> {
        let current_token = self.advance()?;

        let node = match current_token.token_type {
            TokenType::Identifier(ref name) => Node::name(name.clone()),
            TokenType::Number(number) => Node::Number(number),
            TokenType::String(ref s) => Node::String(s.clone()),
            TokenType::Boolean(b) => Node::Boolean(b),
            TokenType::Symbol(Symbol::LParen) => {
                let inner = self.test()?;
                self.expect_symbol(Symbol::RParen)?;
                inner
            }
            TokenType::EOF => return Err(Error::UnexpectedEOF),
            _ => return Err(Error::UnexpectedToken(current_token)),
        };

        Ok(node)
    }
}
