pub mod token;

use quick_error::quick_error;
use rust_decimal::Decimal;
use std::{
    cmp::Ordering,
    collections::VecDeque,
    io::{BufReader, Cursor, Read, Seek, SeekFrom},
    path::PathBuf,
};
use token::{Keyword, Number, Symbol, Token, TokenType};

quick_error! {
    #[derive(Debug)]
    pub enum Error {
        IOError(err: std::io::Error) {
            from()
            display("IO Error: {}", err)
            source(err)
        }
        NumberParseError(err: std::num::ParseIntError, line: usize, column: usize) {
            display("Number Parse Error: {}\nLine: {}, Column: {}", err, line, column)
            source(err)
        }
        DecimalParseError(err: rust_decimal::Error, line: usize, column: usize) {
            display("Decimal Parse Error: {}\nLine: {}, Column: {}", err, line, column)
            source(err)
        }
        UnknownSymbolError(char: char, line: usize, column: usize) {
            display("Unknown Symbol: {}\nLine: {}, Column: {}", char, line, column)
        }
        UnterminatedStringError(line: usize, column: usize) {
            display("Unterminated String\nLine: {}, Column: {}", line, column)
        }
        IndentationError(line: usize, column: usize) {
            display("Unindent does not match any outer indentation level\nLine: {}, Column: {}", line, column)
        }
    }
}

pub trait Tokenize: Read + Seek {}

impl<T> Tokenize for T where T: Read + Seek {}

pub struct Tokenizer {
    reader: BufReader<Box<dyn Tokenize>>,
    char_buffer: [u8; 1],
    line: usize,
    column: usize,
    returned_eof: bool,
    /// Widths of the currently open indentation levels. Always starts with `0`
    indent_stack: Vec<usize>,
    /// Structural tokens (dedents, trailing newline) waiting to be handed out
    pending: VecDeque<Token>,
    at_line_start: bool,
    line_has_tokens: bool,
    bracket_depth: usize,
}

impl Tokenizer {
    fn new(reader: BufReader<Box<dyn Tokenize>>) -> Self {
        Self {
            reader,
            line: 1,
            column: 1,
            char_buffer: [0],
            returned_eof: false,
            indent_stack: vec![0],
            pending: VecDeque::new(),
            at_line_start: true,
            line_has_tokens: false,
            bracket_depth: 0,
        }
    }

    pub fn from_path(input_file: impl Into<PathBuf>) -> Result<Self, Error> {
        let file = std::fs::File::open(input_file.into())?;
        let reader = BufReader::new(Box::new(file) as Box<dyn Tokenize>);

        Ok(Self::new(reader))
    }
}

impl From<String> for Tokenizer {
    fn from(input: String) -> Self {
        let reader = BufReader::new(Box::new(Cursor::new(input)) as Box<dyn Tokenize>);

        Self::new(reader)
    }
}

impl From<&str> for Tokenizer {
    fn from(input: &str) -> Self {
        Self::from(input.to_owned())
    }
}

impl Tokenizer {
    /// Consumes the next character in the stream.
    /// If there are no more characters in the stream, this function returns None
    /// If there is an error reading the stream, this function returns an error
    ///
    /// # Important
    /// This function will increment the line and column counters
    fn next_char(&mut self) -> Result<Option<char>, Error> {
        let bytes_read = self.reader.read(&mut self.char_buffer)?;

        if bytes_read == 0 {
            return Ok(None);
        }

        let c = self.char_buffer[0] as char;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Ok(Some(c))
    }

    /// Peeks the next character in the stream without consuming it
    ///
    /// # Important
    /// This does not increment the line or column counters
    fn peek_next_char(&mut self) -> Result<Option<char>, Error> {
        let current_pos = self.reader.stream_position()?;

        let to_return = if self.reader.read(&mut self.char_buffer)? == 0 {
            None
        } else {
            self.reader.seek(SeekFrom::Start(current_pos))?;
            Some(self.char_buffer[0] as char)
        };

        Ok(to_return)
    }

    /// Skips the current line in the stream, including the line break.
    /// Useful for skipping comment-only or empty lines
    fn skip_line(&mut self) -> Result<(), Error> {
        while let Some(next_char) = self.next_char()? {
            if next_char == '\n' {
                break;
            }
        }
        Ok(())
    }

    /// Skips a trailing comment, leaving the line break in the stream
    fn skip_comment(&mut self) -> Result<(), Error> {
        while let Some(next_char) = self.peek_next_char()? {
            if next_char == '\n' {
                break;
            }
            self.next_char()?;
        }
        Ok(())
    }

    /// Returns the next token in the stream.
    /// Once the `EOF` token has been handed out, this function returns None
    pub fn next_token(&mut self) -> Result<Option<Token>, Error> {
        if let Some(token) = self.pending.pop_front() {
            return Ok(Some(token));
        }

        if self.at_line_start && self.bracket_depth == 0 {
            if let Some(token) = self.tokenize_indentation()? {
                return Ok(Some(token));
            }
        }

        loop {
            let (line, column) = (self.line, self.column);
            let Some(next_char) = self.next_char()? else {
                break;
            };

            if next_char == '\n' {
                if self.bracket_depth > 0 || !self.line_has_tokens {
                    continue;
                }
                self.at_line_start = true;
                self.line_has_tokens = false;
                return Ok(Some(Token::new(TokenType::Newline, line, column)));
            }
            if next_char.is_whitespace() {
                continue;
            }
            if next_char == '#' {
                self.skip_comment()?;
                continue;
            }

            self.line_has_tokens = true;

            let token = match next_char {
                '0'..='9' => self.tokenize_number(next_char)?,
                '"' | '\'' => self.tokenize_string(next_char)?,
                char if char.is_alphabetic() || char == '_' => {
                    self.tokenize_keyword_or_identifier(next_char)?
                }
                _ => self.tokenize_symbol(next_char)?,
            };
            return Ok(Some(token));
        }

        self.finish()
    }

    /// Measures the indentation of the next non-blank line and turns changes in
    /// width into `Indent` / `Dedent` tokens
    fn tokenize_indentation(&mut self) -> Result<Option<Token>, Error> {
        loop {
            let mut width = 0;
            while let Some(next_char) = self.peek_next_char()? {
                match next_char {
                    ' ' => width += 1,
                    '\t' => width += 4,
                    '\r' => {}
                    _ => break,
                }
                self.next_char()?;
            }

            match self.peek_next_char()? {
                None => return Ok(None),
                Some('\n') | Some('#') => self.skip_line()?,
                Some(_) => {
                    self.at_line_start = false;
                    return self.indentation_change(width);
                }
            }
        }
    }

    fn indentation_change(&mut self, width: usize) -> Result<Option<Token>, Error> {
        let current = self.indent_stack.last().copied().unwrap_or_default();

        match width.cmp(&current) {
            Ordering::Equal => Ok(None),
            Ordering::Greater => {
                self.indent_stack.push(width);
                Ok(Some(Token::new(TokenType::Indent, self.line, self.column)))
            }
            Ordering::Less => {
                while self.indent_stack.last().is_some_and(|level| *level > width) {
                    self.indent_stack.pop();
                    self.pending
                        .push_back(Token::new(TokenType::Dedent, self.line, self.column));
                }

                if self.indent_stack.last().copied().unwrap_or_default() != width {
                    return Err(Error::IndentationError(self.line, self.column));
                }

                Ok(self.pending.pop_front())
            }
        }
    }

    /// Closes the last logical line and every open block, then hands out `EOF` once
    fn finish(&mut self) -> Result<Option<Token>, Error> {
        if self.returned_eof {
            return Ok(None);
        }

        if self.line_has_tokens {
            self.line_has_tokens = false;
            self.pending
                .push_back(Token::new(TokenType::Newline, self.line, self.column));
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.pending
                .push_back(Token::new(TokenType::Dedent, self.line, self.column));
        }

        self.returned_eof = true;
        self.pending
            .push_back(Token::new(TokenType::EOF, self.line, self.column));

        Ok(self.pending.pop_front())
    }

    /// Tokenizes a symbol
    fn tokenize_symbol(&mut self, first_symbol: char) -> Result<Token, Error> {
        /// Helper macro to create a symbol token
        macro_rules! symbol {
            ($symbol:ident) => {
                Ok(Token::new(
                    TokenType::Symbol(Symbol::$symbol),
                    self.line,
                    self.column,
                ))
            };
        }

        /// Matches a symbol that may be followed by `=`
        macro_rules! with_assign {
            ($single:ident, $double:ident) => {
                if self.peek_next_char()? == Some('=') {
                    self.next_char()?;
                    symbol!($double)
                } else {
                    symbol!($single)
                }
            };
        }

        match first_symbol {
            '(' | '[' => {
                self.bracket_depth += 1;
                if first_symbol == '(' {
                    symbol!(LParen)
                } else {
                    symbol!(LBracket)
                }
            }
            ')' | ']' => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                if first_symbol == ')' {
                    symbol!(RParen)
                } else {
                    symbol!(RBracket)
                }
            }
            ':' => symbol!(Colon),
            ',' => symbol!(Comma),
            '.' => symbol!(Dot),

            '+' => with_assign!(Plus, PlusAssign),
            '-' => with_assign!(Minus, MinusAssign),
            '*' => with_assign!(Asterisk, AsteriskAssign),
            '/' => with_assign!(Slash, SlashAssign),
            '%' => with_assign!(Percent, PercentAssign),
            '<' => with_assign!(LessThan, LessThanOrEqual),
            '>' => with_assign!(GreaterThan, GreaterThanOrEqual),
            '=' => with_assign!(Assign, Equal),

            '!' if self.peek_next_char()? == Some('=') => {
                self.next_char()?;
                symbol!(NotEqual)
            }

            _ => Err(Error::UnknownSymbolError(
                first_symbol,
                self.line,
                self.column,
            )),
        }
    }

    /// Tokenizes a number literal
    fn tokenize_number(&mut self, first_char: char) -> Result<Token, Error> {
        let mut primary = String::with_capacity(16);
        let mut decimal: Option<String> = None;
        let mut reading_decimal = false;

        let column = self.column;
        let line = self.line;

        primary.push(first_char);

        while let Some(next_char) = self.peek_next_char()? {
            if next_char == '.' && !reading_decimal {
                reading_decimal = true;
                self.next_char()?;
                continue;
            }

            // support underscores in numbers for readability
            if next_char == '_' {
                self.next_char()?;
                continue;
            }

            if !next_char.is_ascii_digit() {
                break;
            }

            if reading_decimal {
                decimal.get_or_insert_with(String::new).push(next_char);
            } else {
                primary.push(next_char);
            }
            self.next_char()?;
        }

        let number: Number = if let Some(decimal) = decimal {
            let decimal_scale = decimal.len() as u32;
            let number = format!("{}{}", primary, decimal)
                .parse::<i128>()
                .map_err(|e| Error::NumberParseError(e, line, column))?;
            Number::Decimal(
                Decimal::try_from_i128_with_scale(number, decimal_scale)
                    .map_err(|e| Error::DecimalParseError(e, line, column))?,
            )
        } else {
            Number::Integer(
                primary
                    .parse()
                    .map_err(|e| Error::NumberParseError(e, line, column))?,
            )
        };

        Ok(Token::new(TokenType::Number(number), line, column))
    }

    /// Tokenizes a string literal
    fn tokenize_string(&mut self, beginning_quote: char) -> Result<Token, Error> {
        let mut buffer = String::with_capacity(16);

        let column = self.column;
        let line = self.line;

        while let Some(next_char) = self.next_char()? {
            if next_char == beginning_quote {
                return Ok(Token::new(TokenType::String(buffer), line, column));
            }
            if next_char == '\n' {
                break;
            }

            buffer.push(next_char);
        }

        Err(Error::UnterminatedStringError(line, column))
    }

    /// Tokenizes a keyword or an identifier. Also handles boolean literals
    fn tokenize_keyword_or_identifier(&mut self, first_char: char) -> Result<Token, Error> {
        macro_rules! keyword {
            ($keyword:ident) => {
                TokenType::Keyword(Keyword::$keyword)
            };
        }

        let mut buffer = String::with_capacity(16);
        let line = self.line;
        let column = self.column;

        buffer.push(first_char);

        while let Some(next_char) = self.peek_next_char()? {
            if !next_char.is_alphanumeric() && next_char != '_' {
                break;
            }
            buffer.push(next_char);
            self.next_char()?;
        }

        let token_type = match buffer.as_str() {
            "if" => keyword!(If),
            "elif" => keyword!(Elif),
            "else" => keyword!(Else),
            "while" => keyword!(While),
            "not" => keyword!(Not),
            "and" => keyword!(And),
            "or" => keyword!(Or),
            "yield" => keyword!(Yield),

            // boolean literals
            "True" => TokenType::Boolean(true),
            "False" => TokenType::Boolean(false),

            _ => TokenType::Identifier(buffer),
        };

        Ok(Token::new(token_type, line, column))
    }
}

pub struct TokenizerBuffer {
    tokenizer: Tokenizer,
    buffer: VecDeque<Token>,
    history: VecDeque<Token>,
}

impl TokenizerBuffer {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            buffer: VecDeque::new(),
            history: VecDeque::with_capacity(128),
        }
    }

    /// Reads the next token from the tokenizer, pushing the value to the back of the history
    /// and returning the token
    pub fn next_token(&mut self) -> Result<Option<Token>, Error> {
        let token = match self.buffer.pop_front() {
            Some(token) => Some(token),
            None => self.tokenizer.next_token()?,
        };

        if let Some(ref token) = token {
            self.history.push_back(token.clone());
        }
        Ok(token)
    }

    /// Peeks the next token in the stream without adding to the history stack
    pub fn peek(&mut self) -> Result<Option<Token>, Error> {
        if self.buffer.is_empty() {
            if let Some(token) = self.tokenizer.next_token()? {
                self.buffer.push_back(token);
            }
        }

        Ok(self.buffer.front().cloned())
    }

    /// The most recently consumed token
    pub fn previous(&self) -> Option<&Token> {
        self.history.back()
    }
}
