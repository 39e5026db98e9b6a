//! Recursive-descent parser: turns a [`hoil_lexer::Lexer`]'s token stream into a [`hoil_ast`]
//! tree, with one token of lookahead (mirroring the lexer's own lookahead contract).
//!
//! On the first error the parser reports into the shared [`Diagnostics`] sink, drops whatever
//! partial tree it built so far (Rust does this for free once `parse_module` returns `None`),
//! and stops — matching spec §4.4's "reports the first error... destroys partial subtrees, and
//! returns null".

use std::rc::Rc;

use hoil_ast::{
    Block, Constant, Decl, Expr, ExternFunction, Field, Function, Global, Instr, Location,
    Module, Parameter, Stmt, Target, Type, TypeDef,
};
use hoil_diag::{DiagnosticCode, Diagnostics};
use hoil_lexer::{Lexer, Token, TokenKind};

/// Parse a complete module. Returns `None` if any syntax error was encountered; the first error
/// is already recorded in `diag`.
pub fn parse_module(source: &str, filename: &str, diag: &mut Diagnostics) -> Option<Module> {
    let mut parser = Parser::new(source, filename, diag);
    parser.parse_module().ok()
}

/// Marker error: the real diagnostic has already been written to the sink.
struct Bail;

type PResult<T> = Result<T, Bail>;

struct Parser<'a> {
    lexer: Lexer<'a>,
    diag: &'a mut Diagnostics,
    filename: Rc<str>,
    /// Grammar disambiguation (telling a block label `IDENT ':'` apart from an assignment
    /// statement `IDENT '=' ...`) needs two tokens of lookahead. `hoil_lexer::Lexer` only
    /// promises one, so the parser buffers a small queue on top of it rather than widening the
    /// lexer's own contract.
    buf: std::collections::VecDeque<Token<'a>>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, filename: &str, diag: &'a mut Diagnostics) -> Self {
        Self {
            lexer: Lexer::new(source),
            diag,
            filename: Rc::from(filename),
            buf: std::collections::VecDeque::with_capacity(2),
        }
    }

    fn loc(&self, tok: &Token<'_>) -> Location {
        Location::new(tok.line, tok.column, Rc::clone(&self.filename))
    }

    fn fail(&mut self, tok: &Token<'_>, message: impl Into<String>) -> Bail {
        let location = hoil_diag::Location::new(tok.line, tok.column, &self.filename);
        self.diag.report(DiagnosticCode::Syntax, message, location);
        tracing::debug!(line = tok.line, column = tok.column, "parse error");
        Bail
    }

    fn fill(&mut self, n: usize) {
        while self.buf.len() <= n {
            let tok = self.lexer.next();
            let eof = tok.kind == TokenKind::Eof;
            self.buf.push_back(tok);
            if eof {
                break;
            }
        }
    }

    fn peek_at(&mut self, n: usize) -> &Token<'a> {
        self.fill(n);
        self.buf.get(n).unwrap_or_else(|| self.buf.back().expect("buffer always has EOF"))
    }

    fn peek_kind(&mut self) -> TokenKind {
        self.peek_at(0).kind
    }

    fn peek_kind_at(&mut self, n: usize) -> TokenKind {
        self.peek_at(n).kind
    }

    fn bump(&mut self) -> Token<'a> {
        self.fill(0);
        self.buf.pop_front().unwrap_or_else(|| self.lexer.next())
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token<'a>> {
        if self.peek_kind() == kind {
            Ok(self.bump())
        } else {
            let tok = self.bump();
            Err(self.fail(&tok, format!("expected {what}, found '{}'", tok.text)))
        }
    }

    fn expect_identifier(&mut self) -> PResult<Token<'a>> {
        self.expect(TokenKind::Identifier, "an identifier")
    }

    fn at(&mut self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    // module := MODULE STRING ';' decl*
    fn parse_module(&mut self) -> PResult<Module> {
        let module_tok = self.expect(TokenKind::Module, "'MODULE'")?;
        let location = self.loc(&module_tok);
        let name_tok = self.expect(TokenKind::StringLit, "a module name string")?;
        let name = name_tok.string_value.clone().unwrap_or_default();
        self.expect(TokenKind::Semicolon, "';'")?;

        let mut decls = Vec::new();
        while !self.at(TokenKind::Eof) {
            decls.push(self.parse_decl()?);
        }

        Ok(Module { name, decls, location })
    }

    fn parse_decl(&mut self) -> PResult<Decl> {
        match self.peek_kind() {
            TokenKind::TypeKw => self.parse_typedef().map(Decl::TypeDef),
            TokenKind::ConstantKw => self.parse_constant().map(Decl::Constant),
            TokenKind::GlobalKw => self.parse_global().map(Decl::Global),
            TokenKind::Extern => self.parse_extern_fn().map(Decl::ExternFunction),
            TokenKind::FunctionKw => self.parse_function().map(Decl::Function),
            _ => {
                let tok = self.bump();
                Err(self.fail(&tok, format!("expected a declaration, found '{}'", tok.text)))
            }
        }
    }

    // typedef := TYPE IDENT '{' (field (',' field)*)? '}'
    fn parse_typedef(&mut self) -> PResult<TypeDef> {
        let kw = self.expect(TokenKind::TypeKw, "'TYPE'")?;
        let location = self.loc(&kw);
        let name = self.expect_identifier()?.text.to_string();
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut fields = Vec::new();
        if !self.at(TokenKind::RBrace) {
            fields.push(self.parse_field()?);
            while self.at(TokenKind::Comma) {
                self.bump();
                fields.push(self.parse_field()?);
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(TypeDef { name, fields, location })
    }

    fn parse_field(&mut self) -> PResult<Field> {
        let name_tok = self.expect_identifier()?;
        let location = self.loc(&name_tok);
        self.expect(TokenKind::Colon, "':'")?;
        let ty = self.parse_type()?;
        Ok(Field { name: name_tok.text.to_string(), ty, location })
    }

    // constant := CONSTANT IDENT ':' type '=' expr ';'
    fn parse_constant(&mut self) -> PResult<Constant> {
        let kw = self.expect(TokenKind::ConstantKw, "'CONSTANT'")?;
        let location = self.loc(&kw);
        let name = self.expect_identifier()?.text.to_string();
        self.expect(TokenKind::Colon, "':'")?;
        let ty = self.parse_type()?;
        self.expect(TokenKind::Equals, "'='")?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Constant { name, ty, value, location })
    }

    // global := GLOBAL IDENT ':' type ('=' expr)? ';'
    fn parse_global(&mut self) -> PResult<Global> {
        let kw = self.expect(TokenKind::GlobalKw, "'GLOBAL'")?;
        let location = self.loc(&kw);
        let name = self.expect_identifier()?.text.to_string();
        self.expect(TokenKind::Colon, "':'")?;
        let ty = self.parse_type()?;
        let init = if self.at(TokenKind::Equals) {
            self.bump();
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Global { name, ty, init, location })
    }

    // extern_fn := EXTERN FUNCTION IDENT '(' params? ')' '->' type ';'
    fn parse_extern_fn(&mut self) -> PResult<ExternFunction> {
        let kw = self.expect(TokenKind::Extern, "'EXTERN'")?;
        let location = self.loc(&kw);
        self.expect(TokenKind::FunctionKw, "'FUNCTION'")?;
        let name = self.expect_identifier()?.text.to_string();
        self.expect(TokenKind::LParen, "'('")?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Arrow, "'->'")?;
        let ret = self.parse_type()?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(ExternFunction { name, params, ret, location })
    }

    // function := FUNCTION IDENT '(' params? ')' '->' type target? '{' block+ '}'
    fn parse_function(&mut self) -> PResult<Function> {
        let kw = self.expect(TokenKind::FunctionKw, "'FUNCTION'")?;
        let location = self.loc(&kw);
        let name = self.expect_identifier()?.text.to_string();
        self.expect(TokenKind::LParen, "'('")?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Arrow, "'->'")?;
        let ret = self.parse_type()?;

        let target = if self.at(TokenKind::TargetKw) {
            Some(self.parse_target()?)
        } else {
            None
        };

        self.expect(TokenKind::LBrace, "'{'")?;
        let mut blocks = Vec::new();
        blocks.push(self.parse_block()?);
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            blocks.push(self.parse_block()?);
        }
        self.expect(TokenKind::RBrace, "'}'")?;

        Ok(Function { name, params, ret, target, blocks, location })
    }

    // a single reserved keyword followed by a string/identifier (spec §4.4: "body-free").
    fn parse_target(&mut self) -> PResult<Target> {
        let kw = self.expect(TokenKind::TargetKw, "'TARGET'")?;
        let location = self.loc(&kw);
        let value_tok = self.bump();
        let value = match value_tok.kind {
            TokenKind::StringLit => value_tok.string_value.clone().unwrap_or_default(),
            TokenKind::Identifier => value_tok.text.to_string(),
            _ => return Err(self.fail(&value_tok, "expected a target string or identifier")),
        };
        Ok(Target { keyword: "TARGET".to_string(), value, location })
    }

    fn parse_params(&mut self) -> PResult<Vec<Parameter>> {
        let mut params = Vec::new();
        if self.at(TokenKind::RParen) {
            return Ok(params);
        }
        params.push(self.parse_param()?);
        while self.at(TokenKind::Comma) {
            self.bump();
            params.push(self.parse_param()?);
        }
        Ok(params)
    }

    fn parse_param(&mut self) -> PResult<Parameter> {
        let name_tok = self.expect_identifier()?;
        let location = self.loc(&name_tok);
        self.expect(TokenKind::Colon, "':'")?;
        let ty = self.parse_type()?;
        Ok(Parameter { name: name_tok.text.to_string(), ty, location })
    }

    // block := IDENT ':' stmt*
    fn parse_block(&mut self) -> PResult<Block> {
        let label_tok = self.expect_identifier()?;
        let location = self.loc(&label_tok);
        self.expect(TokenKind::Colon, "':'")?;
        let mut stmts = Vec::new();
        while !matches!(
            self.peek_kind(),
            TokenKind::RBrace | TokenKind::Eof
        ) && !self.at_next_block_label()
        {
            stmts.push(self.parse_stmt()?);
        }
        Ok(Block { label: label_tok.text.to_string(), stmts, location })
    }

    /// A new block starts wherever `IDENT ':'` appears at statement-start position; the only
    /// other statement form beginning with an identifier is `IDENT '=' instr`.
    fn at_next_block_label(&mut self) -> bool {
        self.peek_kind() == TokenKind::Identifier && self.peek_kind_at(1) == TokenKind::Colon
    }

    // stmt := IDENT '=' instr | instr | branch | return
    fn parse_stmt(&mut self) -> PResult<Stmt> {
        match self.peek_kind() {
            TokenKind::Mnemonic => {
                let text = self.lexer.peek().text;
                if text == "BR" {
                    self.parse_branch()
                } else if text == "RET" {
                    self.parse_return()
                } else {
                    self.parse_instr().map(Stmt::Instruction)
                }
            }
            TokenKind::Identifier => {
                let target_tok = self.bump();
                let location = self.loc(&target_tok);
                self.expect(TokenKind::Equals, "'='")?;
                let instr = self.parse_instr()?;
                Ok(Stmt::Assign { target: target_tok.text.to_string(), instr, location })
            }
            _ => {
                let tok = self.bump();
                Err(self.fail(&tok, format!("expected a statement, found '{}'", tok.text)))
            }
        }
    }

    // instr := MNEMONIC (expr (',' expr)*)? ';'
    fn parse_instr(&mut self) -> PResult<Instr> {
        let op_tok = self.expect(TokenKind::Mnemonic, "an instruction mnemonic")?;
        let location = self.loc(&op_tok);
        let mut operands = Vec::new();
        if !self.at(TokenKind::Semicolon) {
            operands.push(self.parse_expr()?);
            while self.at(TokenKind::Comma) {
                self.bump();
                operands.push(self.parse_expr()?);
            }
        }
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Instr { opcode: op_tok.text.to_string(), operands, location })
    }

    // branch := BR (expr ',')? IDENT (',' IDENT)? ';'
    fn parse_branch(&mut self) -> PResult<Stmt> {
        let kw = self.expect(TokenKind::Mnemonic, "'BR'")?;
        let location = self.loc(&kw);

        // Disambiguate `BR IDENT;` (unconditional) from `BR expr, IDENT, IDENT?;`
        // (conditional) by trying to parse an expression and checking what follows it.
        let (cond, true_label) = if self.at(TokenKind::Identifier) && self.following_is_branch_terminator() {
            let label = self.bump().text.to_string();
            (None, label)
        } else {
            let cond_expr = self.parse_expr()?;
            self.expect(TokenKind::Comma, "','")?;
            let label = self.expect_identifier()?.text.to_string();
            (Some(cond_expr), label)
        };

        let false_label = if self.at(TokenKind::Comma) {
            self.bump();
            Some(self.expect_identifier()?.text.to_string())
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, "';'")?;

        Ok(Stmt::Branch { cond, true_label, false_label, location })
    }

    /// True for the unconditional form `BR IDENT;` — recognized by the `IDENT` being
    /// immediately followed by `;`. Every other form (`BR expr, IDENT;` / `BR expr, IDENT,
    /// IDENT;`) always has at least one `,` before the terminating `;`, including when the
    /// condition expression is itself a bare identifier.
    fn following_is_branch_terminator(&mut self) -> bool {
        self.peek_kind_at(1) == TokenKind::Semicolon
    }

    // return := RET expr? ';'
    fn parse_return(&mut self) -> PResult<Stmt> {
        let kw = self.expect(TokenKind::Mnemonic, "'RET'")?;
        let location = self.loc(&kw);
        let value = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Stmt::Return { value, location })
    }

    // expr := literal | IDENT ('.' IDENT | '[' expr ']')* ('(' arglist? ')')?
    fn parse_expr(&mut self) -> PResult<Expr> {
        let tok = self.bump();
        let location = self.loc(&tok);
        let mut expr = match tok.kind {
            TokenKind::Integer => Expr::Integer { value: tok.int_value.unwrap_or(0), location },
            TokenKind::Float => Expr::Float { value: tok.float_value.unwrap_or(0.0), location },
            TokenKind::StringLit => Expr::String { value: tok.string_value.clone().unwrap_or_default(), location },
            TokenKind::Identifier => Expr::Identifier { name: tok.text.to_string(), location },
            _ => return Err(self.fail(&tok, format!("expected an expression, found '{}'", tok.text))),
        };

        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    let dot = self.bump();
                    let field_tok = self.expect_identifier()?;
                    expr = Expr::FieldAccess {
                        base: Box::new(expr),
                        field: field_tok.text.to_string(),
                        location: self.loc(&dot),
                    };
                }
                TokenKind::LBracket => {
                    let bracket = self.bump();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    expr = Expr::Index { base: Box::new(expr), index: Box::new(index), location: self.loc(&bracket) };
                }
                TokenKind::LParen => {
                    let paren = self.bump();
                    let mut args = Vec::new();
                    if !self.at(TokenKind::RParen) {
                        args.push(self.parse_expr()?);
                        while self.at(TokenKind::Comma) {
                            self.bump();
                            args.push(self.parse_expr()?);
                        }
                    }
                    self.expect(TokenKind::RParen, "')'")?;
                    expr = Expr::Call { callee: Box::new(expr), args, location: self.loc(&paren) };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    // type := 'void' | 'bool' | iN | uN | fN
    //       | 'ptr' '<' type (',' IDENT)? '>'
    //       | 'vec' '<' type ',' INTEGER '>'
    //       | 'array' '<' type (',' INTEGER)? '>'
    //       | IDENT
    //       | FUNCTION '(' typelist? ')' '->' type
    fn parse_type(&mut self) -> PResult<Type> {
        let tok = self.bump();
        match tok.kind {
            TokenKind::Void => Ok(Type::Void),
            TokenKind::BoolKw => Ok(Type::Bool),
            TokenKind::IntType => parse_int_type(tok.text).ok_or_else(|| self.fail(&tok, "malformed integer type")),
            TokenKind::FloatType => parse_float_type(tok.text).ok_or_else(|| self.fail(&tok, "malformed float type")),
            TokenKind::PtrKw => {
                self.expect(TokenKind::Lt, "'<'")?;
                let elem = self.parse_type()?;
                let space = if self.at(TokenKind::Comma) {
                    self.bump();
                    Some(self.expect_identifier()?.text.to_string())
                } else {
                    None
                };
                self.expect(TokenKind::Gt, "'>'")?;
                Ok(Type::Ptr { elem: Box::new(elem), space })
            }
            TokenKind::VecKw => {
                self.expect(TokenKind::Lt, "'<'")?;
                let elem = self.parse_type()?;
                self.expect(TokenKind::Comma, "','")?;
                let size_tok = self.expect(TokenKind::Integer, "an integer size")?;
                self.expect(TokenKind::Gt, "'>'")?;
                Ok(Type::Vec { elem: Box::new(elem), size: size_tok.int_value.unwrap_or(0) as u64 })
            }
            TokenKind::ArrayKw => {
                self.expect(TokenKind::Lt, "'<'")?;
                let elem = self.parse_type()?;
                let size = if self.at(TokenKind::Comma) {
                    self.bump();
                    let size_tok = self.expect(TokenKind::Integer, "an integer size")?;
                    Some(size_tok.int_value.unwrap_or(0) as u64)
                } else {
                    None
                };
                self.expect(TokenKind::Gt, "'>'")?;
                Ok(Type::Array { elem: Box::new(elem), size })
            }
            TokenKind::Identifier => Ok(Type::Named(tok.text.to_string())),
            TokenKind::FunctionKw => {
                self.expect(TokenKind::LParen, "'('")?;
                let mut params = Vec::new();
                if !self.at(TokenKind::RParen) {
                    params.push(self.parse_type()?);
                    while self.at(TokenKind::Comma) {
                        self.bump();
                        params.push(self.parse_type()?);
                    }
                }
                self.expect(TokenKind::RParen, "')'")?;
                self.expect(TokenKind::Arrow, "'->'")?;
                let ret = self.parse_type()?;
                Ok(Type::Function { params, ret: Box::new(ret) })
            }
            _ => Err(self.fail(&tok, format!("expected a type, found '{}'", tok.text))),
        }
    }
}

fn parse_int_type(text: &str) -> Option<Type> {
    let (signed, digits) = match text.as_bytes().first()? {
        b'i' => (true, &text[1..]),
        b'u' => (false, &text[1..]),
        _ => return None,
    };
    let bits: u8 = digits.parse().ok()?;
    matches!(bits, 8 | 16 | 32 | 64).then_some(Type::Int { bits, signed })
}

fn parse_float_type(text: &str) -> Option<Type> {
    let bits: u8 = text.strip_prefix('f')?.parse().ok()?;
    matches!(bits, 16 | 32 | 64).then_some(Type::Float { bits })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> (Option<Module>, Diagnostics) {
        let mut diag = Diagnostics::new();
        let module = parse_module(src, "t.hoil", &mut diag);
        (module, diag)
    }

    #[test]
    fn minimal_module_parses_without_error() {
        let (module, diag) = parse(
            r#"MODULE "e"; FUNCTION main() -> i32 { ENTRY: RET 0; }"#,
        );
        assert!(!diag.has_error());
        let module = module.unwrap();
        assert_eq!(module.decls.len(), 1);
    }

    #[test]
    fn missing_leading_module_fails() {
        let (module, diag) = parse("FUNCTION main() -> i32 { ENTRY: RET 0; }");
        assert!(module.is_none());
        assert!(diag.has_error());
    }

    #[test]
    fn missing_arrow_before_return_type_fails() {
        let (module, diag) = parse("MODULE \"e\"; FUNCTION main() i32 { ENTRY: RET 0; }");
        assert!(module.is_none());
        assert!(diag.has_error());
    }

    #[test]
    fn add_function_parses_with_assign_statement() {
        let (module, diag) = parse(
            "MODULE \"e\"; FUNCTION add(a: i32, b: i32) -> i32 { ENTRY: r = ADD a, b; RET r; }",
        );
        assert!(!diag.has_error());
        let module = module.unwrap();
        let Decl::Function(f) = &module.decls[0] else { panic!("expected function") };
        assert_eq!(f.blocks[0].stmts.len(), 2);
        assert!(matches!(f.blocks[0].stmts[0], Stmt::Assign { .. }));
    }

    #[test]
    fn node_locations_are_valid() {
        let (module, _diag) = parse("MODULE \"e\"; CONSTANT c : i32 = 1;");
        let module = module.unwrap();
        assert_eq!(module.location.line, 1);
        assert_eq!(module.decls[0].location().line, 1);
    }

    #[test]
    fn struct_typedef_and_field_types() {
        let (module, diag) = parse("MODULE \"e\"; TYPE P { x: f32, y: f32 }");
        assert!(!diag.has_error());
        let module = module.unwrap();
        let Decl::TypeDef(t) = &module.decls[0] else { panic!("expected typedef") };
        assert_eq!(t.fields.len(), 2);
        assert_eq!(t.fields[0].ty, Type::Float { bits: 32 });
    }

    #[test]
    fn pointer_vec_and_array_types_parse() {
        let (module, diag) = parse(
            "MODULE \"e\"; GLOBAL p : ptr<i8>; GLOBAL v : vec<f32,4>; GLOBAL a : array<i8,16>;",
        );
        assert!(!diag.has_error());
        let module = module.unwrap();
        assert_eq!(module.decls.len(), 3);
    }

    #[test]
    fn conditional_branch_parses() {
        let (module, diag) = parse(
            "MODULE \"e\"; FUNCTION f() -> void { ENTRY: BR c, a, b; a: RET; b: RET; }",
        );
        assert!(!diag.has_error(), "{:?}", diag.message());
        let module = module.unwrap();
        let Decl::Function(f) = &module.decls[0] else { panic!() };
        assert_eq!(f.blocks.len(), 3);
        assert!(matches!(f.blocks[0].stmts[0], Stmt::Branch { cond: Some(_), .. }));
    }
}
