use rust_decimal::Decimal;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    /// The type of the token
    pub token_type: TokenType,
    /// The line where the token was found
    pub line: usize,
    /// The column where the token was found
    pub column: usize,
}

impl Token {
    pub fn new(token_type: TokenType, line: usize, column: usize) -> Self {
        Self {
            token_type,
            line,
            column,
        }
    }
}

#[derive(Debug, PartialEq, Hash, Eq, Clone)]
pub enum TokenType {
    /// Represents a string token
    String(String),
    /// Represents a number token
    Number(Number),
    /// Represents a boolean token (`True` / `False`)
    Boolean(bool),
    /// Represents a keyword token
    Keyword(Keyword),
    /// Represents an identifier token
    Identifier(String),
    /// Represents a symbol token
    Symbol(Symbol),
    /// End of a logical line
    Newline,
    /// The indentation level increased
    Indent,
    /// The indentation level decreased
    Dedent,
    /// Represents an end of file token
    EOF,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::String(s) => write!(f, "\"{}\"", s),
            TokenType::Number(n) => write!(f, "{}", n),
            TokenType::Boolean(true) => write!(f, "True"),
            TokenType::Boolean(false) => write!(f, "False"),
            TokenType::Keyword(k) => write!(f, "{}", k),
            TokenType::Identifier(i) => write!(f, "{}", i),
            TokenType::Symbol(s) => write!(f, "{}", s),
            TokenType::Newline => write!(f, "NEWLINE"),
            TokenType::Indent => write!(f, "INDENT"),
            TokenType::Dedent => write!(f, "DEDENT"),
            TokenType::EOF => write!(f, "EOF"),
        }
    }
}

#[derive(Debug, PartialEq, Hash, Eq, Clone, Copy)]
pub enum Number {
    /// Represents an integer number
    Integer(u128),
    /// Represents a decimal type number with a precision of 64 bits
    Decimal(Decimal),
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Decimal(d) => write!(f, "{}", d),
        }
    }
}

#[derive(Debug, PartialEq, Hash, Eq, Clone, Copy)]
pub enum Symbol {
    // Single Character Symbols
    /// Represents the `(` symbol
    LParen,
    /// Represents the `)` symbol
    RParen,
    /// Represents the `[` symbol
    LBracket,
    /// Represents the `]` symbol
    RBracket,
    /// Represents the `:` symbol
    Colon,
    /// Represents the `,` symbol
    Comma,
    /// Represents the `+` symbol
    Plus,
    /// Represents the `-` symbol
    Minus,
    /// Represents the `*` symbol
    Asterisk,
    /// Represents the `/` symbol
    Slash,
    /// Represents the `%` symbol
    Percent,
    /// Represents the `<` symbol
    LessThan,
    /// Represents the `>` symbol
    GreaterThan,
    /// Represents the `=` symbol
    Assign,
    /// Represents the `.` symbol
    Dot,

    // Double Character Symbols
    /// Represents the `==` symbol
    Equal,
    /// Represents the `!=` symbol
    NotEqual,
    /// Represents the `<=` symbol
    LessThanOrEqual,
    /// Represents the `>=` symbol
    GreaterThanOrEqual,
    /// Represents the `+=` symbol
    PlusAssign,
    /// Represents the `-=` symbol
    MinusAssign,
    /// Represents the `*=` symbol
    AsteriskAssign,
    /// Represents the `/=` symbol
    SlashAssign,
    /// Represents the `%=` symbol
    PercentAssign,
}

impl Symbol {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Symbol::LessThan
                | Symbol::GreaterThan
                | Symbol::Equal
                | Symbol::NotEqual
                | Symbol::LessThanOrEqual
                | Symbol::GreaterThanOrEqual
        )
    }

    /// `=` and the augmented `op=` forms
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            Symbol::Assign
                | Symbol::PlusAssign
                | Symbol::MinusAssign
                | Symbol::AsteriskAssign
                | Symbol::SlashAssign
                | Symbol::PercentAssign
        )
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Symbol::LParen => "(",
            Symbol::RParen => ")",
            Symbol::LBracket => "[",
            Symbol::RBracket => "]",
            Symbol::Colon => ":",
            Symbol::Comma => ",",
            Symbol::Plus => "+",
            Symbol::Minus => "-",
            Symbol::Asterisk => "*",
            Symbol::Slash => "/",
            Symbol::Percent => "%",
            Symbol::LessThan => "<",
            Symbol::GreaterThan => ">",
            Symbol::Assign => "=",
            Symbol::Dot => ".",
            Symbol::Equal => "==",
            Symbol::NotEqual => "!=",
            Symbol::LessThanOrEqual => "<=",
            Symbol::GreaterThanOrEqual => ">=",
            Symbol::PlusAssign => "+=",
            Symbol::MinusAssign => "-=",
            Symbol::AsteriskAssign => "*=",
            Symbol::SlashAssign => "/=",
            Symbol::PercentAssign => "%=",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Debug, PartialEq, Hash, Eq, Clone, Copy)]
pub enum Keyword {
    /// Represents the `if` keyword
    If,
    /// Represents the `elif` keyword
    Elif,
    /// Represents the `else` keyword
    Else,
    /// Represents the `while` keyword
    While,
    /// Represents the `not` keyword
    Not,
    /// Represents the `and` keyword
    And,
    /// Represents the `or` keyword
    Or,
    /// Represents the `yield` keyword. Hands control back to the game for one tick
    Yield,
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keyword = match self {
            Keyword::If => "if",
            Keyword::Elif => "elif",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::Not => "not",
            Keyword::And => "and",
            Keyword::Or => "or",
            Keyword::Yield => "yield",
        };
        write!(f, "{}", keyword)
    }
}
