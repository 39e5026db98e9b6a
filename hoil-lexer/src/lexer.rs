use crate::token::{Token, TokenKind};

/// Exact-match table of declaration and reserved keywords.
const KEYWORDS: &[(&str, TokenKind)] = &[
    ("MODULE", TokenKind::Module),
    ("TARGET", TokenKind::TargetKw),
    ("TYPE", TokenKind::TypeKw),
    ("CONSTANT", TokenKind::ConstantKw),
    ("GLOBAL", TokenKind::GlobalKw),
    ("EXTERN", TokenKind::Extern),
    ("FUNCTION", TokenKind::FunctionKw),
    ("ENTRY", TokenKind::Entry),
    ("void", TokenKind::Void),
    ("bool", TokenKind::BoolKw),
    ("ptr", TokenKind::PtrKw),
    ("vec", TokenKind::VecKw),
    ("array", TokenKind::ArrayKw),
];

/// Exact-match table of instruction mnemonics (arithmetic, bitwise, memory, control, function,
/// system) plus the two statement-introducing words `BR` and `RET`, which the lexer recognizes
/// as mnemonics and the parser dispatches on by text.
const MNEMONICS: &[&str] = &[
    "ADD", "SUB", "MUL", "DIV", "MOD", "NEG", "AND", "OR", "XOR", "NOT", "SHL", "SHR", "JMP",
    "JEQ", "JNE", "JLT", "JLE", "JGT", "JGE", "CALL", "RET", "PUSH", "POP", "SYSCALL", "EXIT",
    "ALLOC_IMM", "ALLOC_MEM", "MOVE", "LOAD", "STORE", "LOAD_IMM", "BR",
];

fn is_int_type_name(s: &str) -> bool {
    matches!(s, "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "u64")
}

fn is_float_type_name(s: &str) -> bool {
    matches!(s, "f16" | "f32" | "f64")
}

/// A lexer over a byte buffer, producing one token at a time with a single token of lookahead.
pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
    lookahead: Option<Token<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, bytes: source.as_bytes(), pos: 0, line: 1, column: 1, lookahead: None }
    }

    /// Consume and return the next token.
    pub fn next(&mut self) -> Token<'a> {
        if let Some(tok) = self.lookahead.take() {
            return tok;
        }
        self.scan()
    }

    /// Return the next token without consuming it.
    pub fn peek(&mut self) -> &Token<'a> {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.scan());
        }
        self.lookahead.as_ref().expect("just filled")
    }

    fn current(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.current()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.current() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.advance();
                }
                Some(b'/') if self.peek_byte_at(1) == Some(b'/') => {
                    while let Some(b) = self.current() {
                        if b == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some(b'/') if self.peek_byte_at(1) == Some(b'*') => {
                    self.advance();
                    self.advance();
                    loop {
                        match self.current() {
                            None => break,
                            Some(b'*') if self.peek_byte_at(1) == Some(b'/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(_) => {
                                self.advance();
                            }
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn scan(&mut self) -> Token<'a> {
        self.skip_trivia();
        let (line, column) = (self.line, self.column);
        let start = self.pos;

        let Some(b) = self.current() else {
            return Token::new(TokenKind::Eof, "", line, column);
        };

        let kind = match b {
            b'(' => {
                self.advance();
                TokenKind::LParen
            }
            b')' => {
                self.advance();
                TokenKind::RParen
            }
            b'{' => {
                self.advance();
                TokenKind::LBrace
            }
            b'}' => {
                self.advance();
                TokenKind::RBrace
            }
            b'[' => {
                self.advance();
                TokenKind::LBracket
            }
            b']' => {
                self.advance();
                TokenKind::RBracket
            }
            b',' => {
                self.advance();
                TokenKind::Comma
            }
            b'.' => {
                self.advance();
                TokenKind::Dot
            }
            b';' => {
                self.advance();
                TokenKind::Semicolon
            }
            b':' => {
                self.advance();
                TokenKind::Colon
            }
            b'=' => {
                self.advance();
                TokenKind::Equals
            }
            b'<' => {
                self.advance();
                TokenKind::Lt
            }
            b'>' => {
                self.advance();
                TokenKind::Gt
            }
            b'-' => {
                if self.peek_byte_at(1) == Some(b'>') {
                    self.advance();
                    self.advance();
                    TokenKind::Arrow
                } else if self.peek_byte_at(1).is_some_and(|n| n.is_ascii_digit()) {
                    return self.scan_number(line, column);
                } else {
                    self.advance();
                    TokenKind::Error
                }
            }
            b'"' => return self.scan_string(line, column),
            b'0'..=b'9' => return self.scan_number(line, column),
            b if b.is_ascii_alphabetic() || b == b'_' => return self.scan_identifier(line, column),
            _ => {
                self.advance();
                TokenKind::Error
            }
        };

        let text = &self.source[start..self.pos];
        Token::new(kind, text, line, column)
    }

    fn scan_identifier(&mut self, line: u32, column: u32) -> Token<'a> {
        let start = self.pos;
        while let Some(b) = self.current() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.source[start..self.pos];

        if let Some((_, kind)) = KEYWORDS.iter().find(|(name, _)| *name == text) {
            return Token::new(*kind, text, line, column);
        }
        if MNEMONICS.contains(&text) {
            return Token::new(TokenKind::Mnemonic, text, line, column);
        }
        if is_int_type_name(text) {
            return Token::new(TokenKind::IntType, text, line, column);
        }
        if is_float_type_name(text) {
            return Token::new(TokenKind::FloatType, text, line, column);
        }
        Token::new(TokenKind::Identifier, text, line, column)
    }

    fn scan_number(&mut self, line: u32, column: u32) -> Token<'a> {
        let start = self.pos;
        if self.current() == Some(b'-') {
            self.advance();
        }
        while self.current().is_some_and(|b| b.is_ascii_digit()) {
            self.advance();
        }

        let mut is_float = false;
        if self.current() == Some(b'.') && self.peek_byte_at(1).is_some_and(|b| b.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while self.current().is_some_and(|b| b.is_ascii_digit()) {
                self.advance();
            }
            if matches!(self.current(), Some(b'e') | Some(b'E')) {
                let mut lookahead = 1;
                if matches!(self.peek_byte_at(lookahead), Some(b'+') | Some(b'-')) {
                    lookahead += 1;
                }
                if self.peek_byte_at(lookahead).is_some_and(|b| b.is_ascii_digit()) {
                    for _ in 0..=lookahead {
                        self.advance();
                    }
                    while self.current().is_some_and(|b| b.is_ascii_digit()) {
                        self.advance();
                    }
                }
            }
        }

        let text = &self.source[start..self.pos];
        if is_float {
            let mut tok = Token::new(TokenKind::Float, text, line, column);
            tok.float_value = text.parse::<f64>().ok();
            if tok.float_value.is_none() {
                tok.kind = TokenKind::Error;
            }
            tok
        } else {
            let mut tok = Token::new(TokenKind::Integer, text, line, column);
            tok.int_value = text.parse::<i64>().ok();
            if tok.int_value.is_none() {
                tok.kind = TokenKind::Error;
            }
            tok
        }
    }

    fn scan_string(&mut self, line: u32, column: u32) -> Token<'a> {
        let start = self.pos;
        self.advance(); // opening quote
        let mut value = String::new();
        let mut terminated = false;
        while let Some(b) = self.current() {
            match b {
                b'"' => {
                    self.advance();
                    terminated = true;
                    break;
                }
                b'\\' => {
                    self.advance();
                    match self.advance() {
                        Some(b'n') => value.push('\n'),
                        Some(b't') => value.push('\t'),
                        Some(b'r') => value.push('\r'),
                        Some(b'0') => value.push('\0'),
                        Some(b'"') => value.push('"'),
                        Some(b'\\') => value.push('\\'),
                        Some(other) => value.push(other as char),
                        None => break,
                    }
                }
                _ => {
                    value.push(b as char);
                    self.advance();
                }
            }
        }
        let text = &self.source[start..self.pos];
        if !terminated {
            return Token::new(TokenKind::Error, text, line, column);
        }
        let mut tok = Token::new(TokenKind::StringLit, text, line, column);
        tok.string_value = Some(value);
        tok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next();
            let done = tok.kind == TokenKind::Eof;
            out.push(tok.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn keywords_never_lex_as_identifier() {
        assert_eq!(kinds("MODULE"), vec![TokenKind::Module, TokenKind::Eof]);
        assert_eq!(kinds("FUNCTION"), vec![TokenKind::FunctionKw, TokenKind::Eof]);
    }

    #[test]
    fn mnemonics_never_lex_as_identifier() {
        assert_eq!(kinds("ADD"), vec![TokenKind::Mnemonic, TokenKind::Eof]);
        assert_eq!(kinds("SYSCALL"), vec![TokenKind::Mnemonic, TokenKind::Eof]);
    }

    #[test]
    fn integer_and_float_literals() {
        let mut lexer = Lexer::new("42 -7 3.5 1.0e10");
        let a = lexer.next();
        assert_eq!(a.kind, TokenKind::Integer);
        assert_eq!(a.int_value, Some(42));
        let b = lexer.next();
        assert_eq!(b.kind, TokenKind::Integer);
        assert_eq!(b.int_value, Some(-7));
        let c = lexer.next();
        assert_eq!(c.kind, TokenKind::Float);
        assert_eq!(c.float_value, Some(3.5));
        let d = lexer.next();
        assert_eq!(d.kind, TokenKind::Float);
        assert_eq!(d.float_value, Some(1.0e10));
    }

    #[test]
    fn arrow_vs_negative_number() {
        let mut lexer = Lexer::new("->-5");
        assert_eq!(lexer.next().kind, TokenKind::Arrow);
        let n = lexer.next();
        assert_eq!(n.kind, TokenKind::Integer);
        assert_eq!(n.int_value, Some(-5));
    }

    #[test]
    fn unterminated_string_is_error() {
        assert_eq!(kinds("\"abc"), vec![TokenKind::Error, TokenKind::Eof]);
    }

    #[test]
    fn string_escapes_are_decoded() {
        let mut lexer = Lexer::new(r#""a\nb""#);
        let tok = lexer.next();
        assert_eq!(tok.kind, TokenKind::StringLit);
        assert_eq!(tok.string_value.as_deref(), Some("a\nb"));
    }

    #[test]
    fn line_comment_is_skipped() {
        assert_eq!(kinds("// comment\nMODULE"), vec![TokenKind::Module, TokenKind::Eof]);
    }

    #[test]
    fn unterminated_block_comment_is_silently_allowed() {
        assert_eq!(kinds("/* never closed"), vec![TokenKind::Eof]);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut lexer = Lexer::new("MODULE GLOBAL");
        assert_eq!(lexer.peek().kind, TokenKind::Module);
        assert_eq!(lexer.peek().kind, TokenKind::Module);
        assert_eq!(lexer.next().kind, TokenKind::Module);
        assert_eq!(lexer.next().kind, TokenKind::GlobalKw);
    }

    #[test]
    fn newline_resets_column() {
        let mut lexer = Lexer::new("a\nb");
        let t1 = lexer.next();
        assert_eq!((t1.line, t1.column), (1, 1));
        let t2 = lexer.next();
        assert_eq!((t2.line, t2.column), (2, 1));
    }

    #[test]
    fn token_slices_cover_non_trivia_source() {
        let src = "MODULE \"e\"; // comment\nFUNCTION";
        let mut lexer = Lexer::new(src);
        let mut joined = String::new();
        loop {
            let tok = lexer.next();
            if tok.kind == TokenKind::Eof {
                break;
            }
            joined.push_str(tok.text);
        }
        assert_eq!(joined, "MODULE\"e\";FUNCTION");
    }
}
