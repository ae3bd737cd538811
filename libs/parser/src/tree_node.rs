use tokenizer::token::{Number, Symbol};

/// Binary operators that appear inside operator chains, plus the `and` / `or`
/// combinators which are lowered through the same path
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
    And,
    Or,
}

impl BinaryOperator {
    pub fn from_symbol(symbol: Symbol) -> Option<Self> {
        let operator = match symbol {
            Symbol::Plus => Self::Add,
            Symbol::Minus => Self::Subtract,
            Symbol::Asterisk => Self::Multiply,
            Symbol::Slash => Self::Divide,
            Symbol::Percent => Self::Modulo,
            Symbol::LessThan => Self::LessThan,
            Symbol::GreaterThan => Self::GreaterThan,
            Symbol::LessThanOrEqual => Self::LessThanOrEqual,
            Symbol::GreaterThanOrEqual => Self::GreaterThanOrEqual,
            Symbol::Equal => Self::Equal,
            Symbol::NotEqual => Self::NotEqual,
            _ => return None,
        };
        Some(operator)
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, Self::Equal | Self::NotEqual)
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operator = match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThanOrEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::And => "and",
            Self::Or => "or",
        };
        write!(f, "{}", operator)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AssignmentOperator {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl AssignmentOperator {
    pub fn from_symbol(symbol: Symbol) -> Option<Self> {
        let operator = match symbol {
            Symbol::Assign => Self::Assign,
            Symbol::PlusAssign => Self::Add,
            Symbol::MinusAssign => Self::Subtract,
            Symbol::AsteriskAssign => Self::Multiply,
            Symbol::SlashAssign => Self::Divide,
            Symbol::PercentAssign => Self::Modulo,
            _ => return None,
        };
        Some(operator)
    }

    /// The operator an augmented assignment (`x op= y`) applies, `None` for plain `=`
    pub fn binary_operator(&self) -> Option<BinaryOperator> {
        match self {
            Self::Assign => None,
            Self::Add => Some(BinaryOperator::Add),
            Self::Subtract => Some(BinaryOperator::Subtract),
            Self::Multiply => Some(BinaryOperator::Multiply),
            Self::Divide => Some(BinaryOperator::Divide),
            Self::Modulo => Some(BinaryOperator::Modulo),
        }
    }
}

impl std::fmt::Display for AssignmentOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.binary_operator() {
            Some(operator) => write!(f, "{}=", operator),
            None => write!(f, "="),
        }
    }
}

/// A left-associative chain `operand (operator operand)*`
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct OperatorChain {
    pub first: Box<Node>,
    pub rest: Vec<(BinaryOperator, Node)>,
}

impl OperatorChain {
    pub fn first_operator(&self) -> Option<BinaryOperator> {
        self.rest.first().map(|(operator, _)| *operator)
    }
}

impl std::fmt::Display for OperatorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}", self.first)?;
        for (operator, operand) in &self.rest {
            write!(f, " {} {}", operator, operand)?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct AssignmentStatement {
    pub target: Box<Node>,
    pub operator: AssignmentOperator,
    pub value: Box<Node>,
}

impl std::fmt::Display for AssignmentStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.target, self.operator, self.value)
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ConditionalArm {
    pub test: Node,
    pub body: Node,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct IfStatement {
    /// The `if` arm followed by every `elif` arm, in source order
    pub arms: Vec<ConditionalArm>,
    pub else_body: Option<Box<Node>>,
}

impl std::fmt::Display for IfStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, arm) in self.arms.iter().enumerate() {
            let keyword = if i == 0 { "(if" } else { " elif" };
            write!(f, "{} {} {}", keyword, arm.test, arm.body)?;
        }
        if let Some(else_body) = &self.else_body {
            write!(f, " else {}", else_body)?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct WhileStatement {
    pub test: Box<Node>,
    pub body: Box<Node>,
}

impl std::fmt::Display for WhileStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(while {} {})", self.test, self.body)
    }
}

/// `value if test else otherwise`
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TernaryExpression {
    pub value: Box<Node>,
    pub test: Box<Node>,
    pub otherwise: Box<Node>,
}

impl std::fmt::Display for TernaryExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} if {} else {})", self.value, self.test, self.otherwise)
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CallExpression {
    pub name: String,
    pub arguments: Vec<Node>,
}

impl std::fmt::Display for CallExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({})",
            self.name,
            self.arguments
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}

/// `device.Property`
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DotAccessExpression {
    pub target: Box<Node>,
    pub property: String,
}

impl std::fmt::Display for DotAccessExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.target, self.property)
    }
}

/// `device.Property[slot]`
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SlotAccessExpression {
    pub access: DotAccessExpression,
    pub index: Box<Node>,
}

impl std::fmt::Display for SlotAccessExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.access, self.index)
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Node {
    Root(Vec<Node>),
    Suite(Vec<Node>),
    Assignment(AssignmentStatement),
    If(IfStatement),
    While(WhileStatement),
    Yield,
    Test(TernaryExpression),
    Or(Vec<Node>),
    And(Vec<Node>),
    Not(Box<Node>),
    Comparison(OperatorChain),
    Arithmetic(OperatorChain),
    Term(OperatorChain),
    Negation(Box<Node>),
    Call(CallExpression),
    DotAccess(DotAccessExpression),
    SlotAccess(SlotAccessExpression),
    Variable(String),
    /// A raw hardware location such as `d0` or `r3`
    Location(String),
    Number(Number),
    String(String),
    Boolean(bool),
}

impl Node {
    /// Names that address hardware directly: device ports `d0`..`d5` and registers `r0`..`r15`
    pub fn is_location(name: &str) -> bool {
        let mut chars = name.chars();
        let Some(prefix) = chars.next() else {
            return false;
        };
        let digits = chars.as_str();
        if digits.is_empty()
            || !digits.bytes().all(|b| b.is_ascii_digit())
            || (digits.len() > 1 && digits.starts_with('0'))
        {
            return false;
        }

        match (prefix, digits.parse::<u8>()) {
            ('d', Ok(index)) => index <= 5,
            ('r', Ok(index)) => index <= 15,
            _ => false,
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        let name = name.into();
        if Self::is_location(&name) {
            Node::Location(name)
        } else {
            Node::Variable(name)
        }
    }
}

fn join_statements(statements: &[Node]) -> String {
    statements
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<String>>()
        .join("; ")
}

fn join_operands(operands: &[Node], operator: &str) -> String {
    operands
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<String>>()
        .join(&format!(" {} ", operator))
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Root(statements) => write!(f, "{}", join_statements(statements)),
            Node::Suite(statements) => write!(f, "{{ {} }}", join_statements(statements)),
            Node::Assignment(e) => write!(f, "{}", e),
            Node::If(e) => write!(f, "{}", e),
            Node::While(e) => write!(f, "{}", e),
            Node::Yield => write!(f, "yield"),
            Node::Test(e) => write!(f, "{}", e),
            Node::Or(operands) => write!(f, "({})", join_operands(operands, "or")),
            Node::And(operands) => write!(f, "({})", join_operands(operands, "and")),
            Node::Not(e) => write!(f, "(not {})", e),
            Node::Comparison(e) | Node::Arithmetic(e) | Node::Term(e) => write!(f, "{}", e),
            Node::Negation(e) => write!(f, "(-{})", e),
            Node::Call(e) => write!(f, "{}", e),
            Node::DotAccess(e) => write!(f, "{}", e),
            Node::SlotAccess(e) => write!(f, "{}", e),
            Node::Variable(name) | Node::Location(name) => write!(f, "{}", name),
            Node::Number(n) => write!(f, "{}", n),
            Node::String(s) => write!(f, "\"{}\"", s),
            Node::Boolean(true) => write!(f, "True"),
            Node::Boolean(false) => write!(f, "False"),
        }
    }
}
