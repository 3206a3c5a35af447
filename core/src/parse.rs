//! Parsing: a nom-based lexer producing spanned tokens (digraphs and
//! trigraphs are folded to their canonical punctuators here), and a
//! recursive-descent parser over those tokens that recognizes both grammars
//! (the English command language and C/C++ declarations). Declarators are
//! assembled through the [builder] combinators, placeholders and all.

use crate::{
    ast::{
        Alignment, ArraySize, AstKind, AstNode, KindSet, MsCall, NodeId,
        ScopeKind, ScopedName, SyntaxTree,
    },
    builder,
    consts::{KEYWORDS, MAX_NESTING_DEPTH},
    error::DeclError,
    gibberish::CastKind,
    lang::Lang,
    lookup,
    typedefs::Typedef,
    types::{self, TypeId},
    util::Span,
    Session,
};
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::{digit1, hex_digit1, multispace0},
    combinator::{map, map_res, verify},
    error::{ErrorKind, ParseError, VerboseError},
    sequence::preceded,
    IResult, Offset, Slice,
};
use nom_locate::{position, LocatedSpan};
use std::rc::Rc;

type RawSpan<'a> = LocatedSpan<&'a str>;
type LexResult<'a, T> = IResult<RawSpan<'a>, T, VerboseError<RawSpan<'a>>>;

pub(crate) type ParseFailure = (DeclError, Span);
type PResult<T> = Result<T, ParseFailure>;

// ===== Tokens =====

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Number(u64),
    /// Canonical punctuator; digraph/trigraph spellings are already folded
    Punct(&'static str),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// A trait for lexing one grammar element. `parse_node` additionally wraps
/// the result with its source span.
trait Parse<'a>: Sized {
    fn parse(input: RawSpan<'a>) -> LexResult<'a, Self>;

    fn parse_node(input: RawSpan<'a>) -> LexResult<'a, (Self, Span)> {
        let (i, value) = Self::parse(input)?;
        let index = input.offset(&i);
        let raw_span = input.slice(..index);
        let (i, end_position) = position(i)?;

        let span = Span {
            offset: raw_span.location_offset(),
            length: raw_span.fragment().len(),
            start_line: raw_span.location_line() as usize,
            start_col: raw_span.get_column(),
            end_line: end_position.location_line() as usize,
            end_col: end_position.get_column(),
        };
        Ok((i, (value, span)))
    }
}

/// Punctuator spellings, longest first so the greedy scan is unambiguous.
/// The second element is the canonical spelling; digraphs and trigraphs
/// normalize on input, per dialect rules the *output* side re-applies.
const PUNCTS: &[(&str, &'static str)] = &[
    ("...", "..."),
    ("??(", "["),
    ("??)", "]"),
    ("??<", "{"),
    ("??>", "}"),
    ("??=", "#"),
    ("::", "::"),
    ("->", "->"),
    ("<<", "<<"),
    (">>", ">>"),
    ("<=", "<="),
    (">=", ">="),
    ("==", "=="),
    ("!=", "!="),
    ("&&", "&&"),
    ("||", "||"),
    ("++", "++"),
    ("--", "--"),
    ("+=", "+="),
    ("-=", "-="),
    ("*=", "*="),
    ("/=", "/="),
    ("%=", "%="),
    ("&=", "&="),
    ("|=", "|="),
    ("^=", "^="),
    ("\"\"", "\"\""),
    ("<:", "["),
    (":>", "]"),
    ("<%", "{"),
    ("%>", "}"),
    ("%:", "#"),
    ("(", "("),
    (")", ")"),
    ("[", "["),
    ("]", "]"),
    ("{", "{"),
    ("}", "}"),
    (",", ","),
    (";", ";"),
    (":", ":"),
    ("*", "*"),
    ("&", "&"),
    ("^", "^"),
    ("~", "~"),
    ("=", "="),
    ("<", "<"),
    (">", ">"),
    ("+", "+"),
    ("-", "-"),
    ("/", "/"),
    ("%", "%"),
    ("!", "!"),
    ("|", "|"),
    ("?", "?"),
    (".", "."),
];

fn punct(input: RawSpan<'_>) -> LexResult<'_, TokenKind> {
    for (spelling, canonical) in PUNCTS {
        if input.fragment().starts_with(spelling) {
            let (i, _) = tag(*spelling)(input)?;
            return Ok((i, TokenKind::Punct(*canonical)));
        }
    }
    Err(nom::Err::Error(VerboseError::from_error_kind(
        input,
        ErrorKind::Tag,
    )))
}

fn number(input: RawSpan<'_>) -> LexResult<'_, TokenKind> {
    alt((
        map_res(
            preceded(tag_no_case("0x"), hex_digit1),
            |s: RawSpan| {
                u64::from_str_radix(s.fragment(), 16).map(TokenKind::Number)
            },
        ),
        map_res(digit1, |s: RawSpan| {
            s.fragment().parse::<u64>().map(TokenKind::Number)
        }),
    ))(input)
}

fn ident(input: RawSpan<'_>) -> LexResult<'_, TokenKind> {
    map(
        verify(
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
            |s: &RawSpan| {
                s.fragment()
                    .chars()
                    .next()
                    .map(|c| !c.is_numeric())
                    .unwrap_or(false)
            },
        ),
        |s: RawSpan| TokenKind::Ident((*s.fragment()).to_string()),
    )(input)
}

impl<'a> Parse<'a> for TokenKind {
    fn parse(input: RawSpan<'a>) -> LexResult<'a, Self> {
        alt((number, ident, punct))(input)
    }
}

/// Lex a whole command into tokens. Fails on the first character no token
/// can start with.
pub(crate) fn lex(src: &str) -> Result<Vec<Token>, ParseFailure> {
    let mut tokens = vec![];
    let mut input = RawSpan::new(src);
    loop {
        let (i, _) = multispace0::<_, VerboseError<_>>(input)
            .expect("multispace0 cannot fail");
        input = i;
        if input.fragment().is_empty() {
            break;
        }
        match TokenKind::parse_node(input) {
            Ok((i, (kind, span))) => {
                tokens.push(Token { kind, span });
                input = i;
            }
            Err(_) => {
                let span = Span {
                    offset: input.location_offset(),
                    length: 0,
                    start_line: input.location_line() as usize,
                    start_col: input.get_column(),
                    end_line: input.location_line() as usize,
                    end_col: input.get_column(),
                };
                let bad = input.fragment().chars().next().unwrap_or(' ');
                return Err((
                    DeclError::Parse(format!("unexpected character `{}`", bad)),
                    span,
                ));
            }
        }
    }
    Ok(tokens)
}

// ===== Parsed commands =====

/// One parsed declaration: a tree, its root, and where in the source it
/// came from. The declared name (if any) sits on the root node.
#[derive(Debug)]
pub(crate) struct Declaration {
    pub tree: SyntaxTree,
    pub root: NodeId,
    pub span: Span,
    /// English "member"/"non-member" marker, when the user said so
    pub member: Option<bool>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum DefineFlavor {
    Define,
    Typedef,
    Using,
}

#[derive(Debug)]
pub(crate) enum ShowWhat {
    All,
    Predefined,
    User,
    Name(ScopedName, Span),
}

#[derive(Debug)]
pub(crate) enum Command {
    Declare(Vec<Declaration>),
    Cast {
        kind: CastKind,
        kind_span: Span,
        expr: String,
        decl: Declaration,
    },
    Define {
        decls: Vec<Declaration>,
        flavor: DefineFlavor,
    },
    Explain(Vec<Declaration>),
    Show {
        what: ShowWhat,
        flavor: Option<DefineFlavor>,
    },
    Set(Vec<String>),
    Help,
    Quit,
    Empty,
}

/// Parse one command line. `set`, `help` and `quit` have word-level
/// grammars and skip tokenization entirely.
pub(crate) fn parse_command(
    src: &str,
    session: &Session,
) -> Result<Command, ParseFailure> {
    let trimmed = src.trim();
    if trimmed.is_empty() {
        return Ok(Command::Empty);
    }
    let first = trimmed.split_whitespace().next().unwrap_or("");
    match first {
        "help" | "?" => return Ok(Command::Help),
        "exit" | "quit" | "q" => return Ok(Command::Quit),
        "set" => {
            let args = trimmed
                .split_whitespace()
                .skip(1)
                .map(String::from)
                .collect();
            return Ok(Command::Set(args));
        }
        _ => {}
    }

    let tokens = lex(src)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        session,
        src_len: src.len(),
        pending_conv: None,
        pending_flavor: None,
    };
    parser.command()
}

/// How the next parameter-list suffix should be interpreted, decided by the
/// direct-declarator that preceded it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum FnFlavor {
    Operator,
    Literal,
    Constructor,
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    session: &'a Session,
    src_len: usize,
    pending_conv: Option<MsCall>,
    pending_flavor: Option<FnFlavor>,
}

impl<'a> Parser<'a> {
    fn lang(&self) -> Lang {
        self.session.options.lang
    }

    // --- token cursor helpers ---

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn peek_punct(&self, p: &str) -> bool {
        matches!(self.peek(), Some(Token { kind: TokenKind::Punct(q), .. }) if *q == p)
    }

    fn peek_punct_at(&self, offset: usize, p: &str) -> bool {
        matches!(self.peek_at(offset), Some(Token { kind: TokenKind::Punct(q), .. }) if *q == p)
    }

    fn peek_ident(&self) -> Option<&str> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Ident(s),
                ..
            }) => Some(s),
            _ => None,
        }
    }

    fn peek_ident_at(&self, offset: usize) -> Option<&str> {
        match self.peek_at(offset) {
            Some(Token {
                kind: TokenKind::Ident(s),
                ..
            }) => Some(s),
            _ => None,
        }
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if self.peek_punct(p) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self, word: &str) -> bool {
        if self.peek_ident() == Some(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Span of the current token, or a zero-width span at end of input.
    fn cur_span(&self) -> Span {
        if let Some(tok) = self.peek() {
            return tok.span;
        }
        match self.tokens.last() {
            Some(t) => Span {
                offset: t.span.offset + t.span.length,
                length: 0,
                start_line: t.span.end_line,
                start_col: t.span.end_col,
                end_line: t.span.end_line,
                end_col: t.span.end_col,
            },
            None => Span {
                offset: self.src_len,
                length: 0,
                start_line: 1,
                start_col: 1,
                end_line: 1,
                end_col: 1,
            },
        }
    }

    fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::default()
        }
    }

    fn syntax_err<T>(&self, msg: impl Into<String>) -> PResult<T> {
        let mut span = self.cur_span();
        span.length = 0; // syntax errors print without a span suffix
        Err((DeclError::Parse(msg.into()), span))
    }

    fn expect_punct(&mut self, p: &str) -> PResult<Span> {
        if self.peek_punct(p) {
            let span = self.cur_span();
            self.pos += 1;
            Ok(span)
        } else {
            self.syntax_err(format!("expected `{}`", p))
        }
    }

    fn expect_ident(&mut self) -> PResult<(String, Span)> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Ident(s),
                span,
            }) => {
                let out = (s.clone(), *span);
                self.pos += 1;
                Ok(out)
            }
            _ => self.syntax_err("expected a name"),
        }
    }

    fn expect_keyword(&mut self, word: &str) -> PResult<Span> {
        if self.peek_ident() == Some(word) {
            let span = self.cur_span();
            self.pos += 1;
            Ok(span)
        } else {
            self.syntax_err(format!("expected \"{}\"", word))
        }
    }

    fn expect_number(&mut self) -> PResult<(u64, Span)> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Number(n),
                span,
            }) => {
                let out = (*n, *span);
                self.pos += 1;
                Ok(out)
            }
            _ => self.syntax_err("expected a number"),
        }
    }

    /// Commands may end with an optional `;`; anything else left over is a
    /// syntax error.
    fn expect_end(&mut self) -> PResult<()> {
        self.eat_punct(";");
        match self.peek() {
            None => Ok(()),
            Some(tok) => {
                let what = match &tok.kind {
                    TokenKind::Ident(s) => s.clone(),
                    TokenKind::Number(n) => n.to_string(),
                    TokenKind::Punct(p) => (*p).to_string(),
                };
                self.syntax_err(format!("unexpected `{}`", what))
            }
        }
    }

    /// Consume an identifier, joining contiguous `ident-ident` runs into a
    /// single hyphenated word (`user-defined`, `non-member`).
    fn word(&mut self) -> Option<(String, Span)> {
        let (mut text, mut span) = match self.peek() {
            Some(Token {
                kind: TokenKind::Ident(s),
                span,
            }) => (s.clone(), *span),
            _ => return None,
        };
        self.pos += 1;
        loop {
            let dash_joins = match (self.peek(), self.peek_at(1)) {
                (Some(dash), Some(next)) => {
                    dash.kind == TokenKind::Punct("-")
                        && dash.span.offset == span.offset + span.length
                        && matches!(next.kind, TokenKind::Ident(_))
                        && next.span.offset == dash.span.offset + 1
                }
                _ => false,
            };
            if !dash_joins {
                break;
            }
            if let Some(Token {
                kind: TokenKind::Ident(next),
                span: next_span,
            }) = self.peek_at(1).cloned()
            {
                text.push('-');
                text.push_str(&next);
                span = span.merge(&next_span);
                self.pos += 2;
            }
        }
        Some((text, span))
    }

    fn peek_word(&mut self) -> Option<String> {
        let save = self.pos;
        let out = self.word().map(|(text, _)| text);
        self.pos = save;
        out
    }

    fn unknown_name(&self, word: &str, span: Span) -> ParseFailure {
        let typedef_names: Vec<String> =
            self.session.typedefs.names().collect();
        let mut candidates: Vec<&str> = KEYWORDS.to_vec();
        candidates.extend(typedef_names.iter().map(String::as_str));
        (
            DeclError::UnknownName {
                suggestions: lookup::suggestions(word, candidates),
            },
            span,
        )
    }

    // --- command dispatch ---

    fn command(&mut self) -> PResult<Command> {
        let (word, span) = match self.word() {
            Some(w) => w,
            None => return self.syntax_err("expected a command"),
        };
        let cmd = match word.as_str() {
            "declare" => self.declare_command()?,
            "cast" => self.cast_command()?,
            "define" => self.define_command()?,
            "explain" => Command::Explain(self.gibberish_declarations()?),
            "typedef" => {
                // the keyword is part of the gibberish; rewind
                self.pos -= 1;
                Command::Define {
                    decls: self.gibberish_declarations()?,
                    flavor: DefineFlavor::Typedef,
                }
            }
            "using" => self.using_command()?,
            "show" => self.show_command()?,
            _ => {
                let commands = [
                    "declare", "cast", "define", "explain", "typedef",
                    "using", "show", "set", "help", "exit", "quit",
                ];
                return Err((
                    DeclError::UnknownName {
                        suggestions: lookup::suggestions(
                            &word,
                            commands.iter().copied(),
                        ),
                    },
                    span,
                ));
            }
        };
        self.expect_end()?;
        Ok(cmd)
    }

    // --- English-side commands ---

    /// `declare x, y as <english>`
    fn declare_command(&mut self) -> PResult<Command> {
        let mut names = vec![];
        loop {
            names.push(self.declared_name()?);
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_keyword("as")?;
        let mut proto = SyntaxTree::new();
        let mut member = None;
        let proto_root = self.english(&mut proto, &mut member, 0)?;

        let mut decls = vec![];
        for (name, span) in names {
            let mut tree = SyntaxTree::new();
            let root = tree.copy_subtree(&proto, proto_root);
            tree.get_mut(root).name = Some(name);
            decls.push(Declaration {
                tree,
                root,
                span: span.merge(&self.prev_span()),
                member,
            });
        }
        Ok(Command::Declare(decls))
    }

    /// A name being declared: a (possibly scoped) identifier, or an
    /// operator symbol like `+` or `[]`.
    fn declared_name(&mut self) -> PResult<(ScopedName, Span)> {
        if let Some(Token {
            kind: TokenKind::Punct(_),
            ..
        }) = self.peek()
        {
            // operator symbol: join contiguous punctuators
            let mut sym = String::new();
            let mut span = self.cur_span();
            loop {
                let (p, pspan) = match self.peek() {
                    Some(Token {
                        kind: TokenKind::Punct(p),
                        span,
                    }) => (*p, *span),
                    _ => break,
                };
                if p == "," {
                    break;
                }
                if !sym.is_empty()
                    && pspan.offset != span.offset + span.length
                {
                    break;
                }
                sym.push_str(p);
                span = span.merge(&pspan);
                self.pos += 1;
            }
            if sym.is_empty() {
                return self.syntax_err("expected a name");
            }
            return Ok((ScopedName::simple(sym), span));
        }
        self.scoped_name()
    }

    fn scoped_name(&mut self) -> PResult<(ScopedName, Span)> {
        let (first, mut span) = self.expect_ident()?;
        let mut name = ScopedName::simple(first);
        while self.eat_punct("::") {
            let (seg, seg_span) = self.expect_ident()?;
            name.push(ScopeKind::Plain, seg);
            span = span.merge(&seg_span);
        }
        Ok((name, span))
    }

    /// `cast [const|dynamic|reinterpret|static] <name> into <english>`
    fn cast_command(&mut self) -> PResult<Command> {
        let mut kind = CastKind::Plain;
        let mut kind_span = self.cur_span();
        if let Some(word) = self.peek_ident() {
            let as_kind = match word {
                "const" => Some(CastKind::Const),
                "dynamic" => Some(CastKind::Dynamic),
                "reinterpret" => Some(CastKind::Reinterpret),
                "static" => Some(CastKind::Static),
                _ => None,
            };
            // only a cast kind if a name and "into" follow
            if let Some(k) = as_kind {
                if self.peek_ident_at(1).is_some()
                    && self.peek_ident_at(2) == Some("into")
                {
                    kind = k;
                    kind_span = self.cur_span();
                    self.pos += 1;
                }
            }
        }
        let (name, name_span) = self.scoped_name()?;
        self.expect_keyword("into")?;
        let mut tree = SyntaxTree::new();
        let mut member = None;
        let root = self.english(&mut tree, &mut member, 0)?;
        Ok(Command::Cast {
            kind,
            kind_span,
            expr: name.to_string(),
            decl: Declaration {
                tree,
                root,
                span: name_span.merge(&self.prev_span()),
                member: None,
            },
        })
    }

    /// `define <name> as <english>`
    fn define_command(&mut self) -> PResult<Command> {
        let (name, span) = self.scoped_name()?;
        self.expect_keyword("as")?;
        let mut tree = SyntaxTree::new();
        let mut member = None;
        let root = self.english(&mut tree, &mut member, 0)?;
        tree.get_mut(root).name = Some(name);
        Ok(Command::Define {
            decls: vec![Declaration {
                tree,
                root,
                span: span.merge(&self.prev_span()),
                member: None,
            }],
            flavor: DefineFlavor::Define,
        })
    }

    /// `using <name> = <gibberish type>`
    fn using_command(&mut self) -> PResult<Command> {
        let (name, span) = self.scoped_name()?;
        self.expect_punct("=")?;
        let mut tree = SyntaxTree::new();
        let root = self.type_name(&mut tree, 0)?;
        tree.get_mut(root).name = Some(name);
        Ok(Command::Define {
            decls: vec![Declaration {
                tree,
                root,
                span: span.merge(&self.prev_span()),
                member: None,
            }],
            flavor: DefineFlavor::Using,
        })
    }

    /// `show <name>|all|predefined|user [typedef|using]`
    fn show_command(&mut self) -> PResult<Command> {
        let what = match self.peek_ident() {
            Some("all") => {
                self.pos += 1;
                ShowWhat::All
            }
            Some("predefined") => {
                self.pos += 1;
                ShowWhat::Predefined
            }
            Some("user") => {
                self.pos += 1;
                ShowWhat::User
            }
            _ => {
                let (name, span) = self.scoped_name()?;
                ShowWhat::Name(name, span)
            }
        };
        let flavor = match self.peek_ident() {
            Some("typedef") => {
                self.pos += 1;
                Some(DefineFlavor::Typedef)
            }
            Some("using") => {
                self.pos += 1;
                Some(DefineFlavor::Using)
            }
            _ => None,
        };
        Ok(Command::Show { what, flavor })
    }

    // --- the English type grammar ---

    /// Parse one English type phrase into `tree`, returning its root.
    fn english(
        &mut self,
        tree: &mut SyntaxTree,
        member: &mut Option<bool>,
        depth: usize,
    ) -> PResult<NodeId> {
        if depth > MAX_NESTING_DEPTH {
            return self.syntax_err("type is nested too deeply");
        }
        let start_span = self.cur_span();
        let mut tid = TypeId::empty();
        let mut align = Alignment::None;

        // modifier words: storage, qualifiers, attributes, base-type tokens
        loop {
            let word = match self.peek_word() {
                Some(w) => w,
                None => break,
            };
            match word.as_str() {
                "member" => {
                    self.word();
                    *member = Some(true);
                }
                "non-member" => {
                    self.word();
                    *member = Some(false);
                }
                "aligned" => {
                    self.word();
                    self.eat_ident("as");
                    let (n, _) = self.expect_number()?;
                    self.eat_ident("bytes");
                    self.eat_ident("byte");
                    align = Alignment::Bytes(n);
                }
                "pure" => {
                    self.word();
                    self.eat_ident("virtual");
                    tid.insert(TypeId::PURE_VIRTUAL | TypeId::VIRTUAL);
                }
                _ => match english_keyword(&word, self.lang()) {
                    Some(bits) => {
                        let (_, span) = self.word().unwrap();
                        types::add(&mut tid, bits)
                            .map_err(|e| (e, span))?;
                    }
                    None => break,
                },
            }
        }

        // the kind phrase
        let node = match self.peek_word().as_deref() {
            Some("array") => {
                self.word();
                let mut quals = TypeId::empty();
                loop {
                    match self.peek_ident() {
                        Some("const") => quals.insert(TypeId::CONST),
                        Some("volatile") => quals.insert(TypeId::VOLATILE),
                        Some("restrict") => quals.insert(TypeId::RESTRICT),
                        Some("static") => quals.insert(TypeId::STATIC),
                        _ => break,
                    }
                    self.pos += 1;
                }
                let size = match self.peek() {
                    Some(Token {
                        kind: TokenKind::Number(n),
                        ..
                    }) => {
                        let n = *n;
                        self.pos += 1;
                        ArraySize::Fixed(n)
                    }
                    Some(Token {
                        kind: TokenKind::Punct("*"),
                        ..
                    }) => {
                        self.pos += 1;
                        ArraySize::Variable
                    }
                    _ => ArraySize::Unspecified,
                };
                self.expect_keyword("of")?;
                let of = self.english(tree, member, depth + 1)?;
                tree.add(AstNode::new(
                    AstKind::Array { size, quals, of },
                    start_span,
                ))
            }
            Some("variable") => {
                self.word();
                self.eat_ident("length");
                self.expect_keyword("array")?;
                self.expect_keyword("of")?;
                let of = self.english(tree, member, depth + 1)?;
                tree.add(AstNode::new(
                    AstKind::Array {
                        size: ArraySize::Variable,
                        quals: TypeId::empty(),
                        of,
                    },
                    start_span,
                ))
            }
            Some("pointer") => {
                self.word();
                self.expect_keyword("to")?;
                if self.peek_ident() == Some("member") {
                    self.pos += 1;
                    self.expect_keyword("of")?;
                    if !(self.eat_ident("class") || self.eat_ident("struct"))
                    {
                        return self.syntax_err("expected \"class\"");
                    }
                    let (class, _) = self.scoped_name()?;
                    self.expect_keyword("of")?;
                    let to = self.english(tree, member, depth + 1)?;
                    tree.add(AstNode::new(
                        AstKind::PointerToMember { class, to },
                        start_span,
                    ))
                } else {
                    let to = self.english(tree, member, depth + 1)?;
                    tree.add(AstNode::new(
                        AstKind::Pointer { to },
                        start_span,
                    ))
                }
            }
            Some("reference") => {
                self.word();
                self.expect_keyword("to")?;
                let to = self.english(tree, member, depth + 1)?;
                tree.add(AstNode::new(AstKind::Reference { to }, start_span))
            }
            Some("rvalue") => {
                self.word();
                self.expect_keyword("reference")?;
                self.expect_keyword("to")?;
                let to = self.english(tree, member, depth + 1)?;
                tree.add(AstNode::new(
                    AstKind::RvalueReference { to },
                    start_span,
                ))
            }
            Some("function") => {
                self.word();
                let params = self.english_params(tree, depth)?;
                let ret = self.english_return(tree, member, depth)?;
                tree.add(AstNode::new(
                    AstKind::Function {
                        params,
                        ret,
                        conv: None,
                    },
                    start_span,
                ))
            }
            Some("block") => {
                self.word();
                let params = self.english_params(tree, depth)?;
                let ret = self.english_return(tree, member, depth)?;
                tree.add(AstNode::new(
                    AstKind::AppleBlock { params, ret },
                    start_span,
                ))
            }
            Some("operator") => {
                self.word();
                let params = self.english_params(tree, depth)?;
                let ret = self.english_return(tree, member, depth)?;
                tree.add(AstNode::new(
                    AstKind::Operator { params, ret },
                    start_span,
                ))
            }
            Some("lambda") => {
                self.word();
                let params = self.english_params(tree, depth)?;
                let ret = self.english_return(tree, member, depth)?;
                tree.add(AstNode::new(
                    AstKind::Lambda { params, ret },
                    start_span,
                ))
            }
            Some("constructor") => {
                self.word();
                let params = self.english_params(tree, depth)?;
                tree.add(AstNode::new(
                    AstKind::Constructor { params },
                    start_span,
                ))
            }
            Some("destructor") => {
                self.word();
                tree.add(AstNode::new(AstKind::Destructor, start_span))
            }
            Some("user-defined") => {
                self.word();
                match self.peek_ident() {
                    Some("conversion") => {
                        self.pos += 1;
                        self.eat_ident("operator");
                        let ret =
                            self.english_return(tree, member, depth)?;
                        tree.add(AstNode::new(
                            AstKind::Conversion { ret },
                            start_span,
                        ))
                    }
                    Some("literal") => {
                        self.pos += 1;
                        let params = self.english_params(tree, depth)?;
                        let ret =
                            self.english_return(tree, member, depth)?;
                        tree.add(AstNode::new(
                            AstKind::UserDefLiteral { params, ret },
                            start_span,
                        ))
                    }
                    _ => {
                        return self.syntax_err(
                            "expected \"conversion\" or \"literal\"",
                        )
                    }
                }
            }
            Some(w) if is_ecsu_word(w) => {
                let node = self.english_ecsu(tree, member, depth)?;
                node
            }
            _ => {
                // builtin, typedef name, or nothing at all
                if !tid.base().is_empty() || self.peek().is_none() {
                    self.builtin_node(tree, tid, start_span)?
                } else if let Some(w) = self.peek_word() {
                    let save = self.pos;
                    let (name, span) = self.scoped_name()?;
                    match self
                        .session
                        .typedefs
                        .lookup_in(&name, self.lang())
                    {
                        Some(def) => tree.add(
                            AstNode::new(
                                AstKind::Typedef { def, bit_width: 0 },
                                span,
                            )
                            .with_type(TypeId::TYPEDEF_TYPE),
                        ),
                        None => {
                            self.pos = save;
                            return Err(self.unknown_name(&w, span));
                        }
                    }
                } else {
                    self.builtin_node(tree, tid, start_span)?
                }
            }
        };

        // modifiers collected up front belong to this node
        let node_tid = tree.get(node).type_id;
        tree.get_mut(node).type_id = node_tid | (tid - tid.base());
        if align != Alignment::None {
            tree.get_mut(node).align = align;
        }
        self.bit_width_suffix(tree, node)?;
        Ok(node)
    }

    /// A builtin-type node from the already-merged base bits.
    fn builtin_node(
        &mut self,
        tree: &mut SyntaxTree,
        tid: TypeId,
        span: Span,
    ) -> PResult<NodeId> {
        if tid.is_empty() && self.peek().is_some() {
            // there's a word here, it just isn't a type
            if let Some((w, wspan)) = self.word() {
                return Err(self.unknown_name(&w, wspan));
            }
        }
        Ok(tree.add(
            AstNode::new(AstKind::Builtin { bit_width: 0 }, span)
                .with_type(tid.base()),
        ))
    }

    /// `width N [bits]`, legal after a bit-field-capable kind.
    fn bit_width_suffix(
        &mut self,
        tree: &mut SyntaxTree,
        node: NodeId,
    ) -> PResult<()> {
        if self.peek_ident() != Some("width") {
            return Ok(());
        }
        let width_span = self.cur_span();
        self.pos += 1;
        let (n, nspan) = self.expect_number()?;
        self.eat_ident("bits");
        if n == 0 {
            return Err((DeclError::BitFieldWidth, nspan));
        }
        if !tree.get_mut(node).set_bit_width(n as u32) {
            return Err((DeclError::BitFieldKind, width_span));
        }
        Ok(())
    }

    /// `enum E`, `enum class E of type int`, `struct S`, ...
    fn english_ecsu(
        &mut self,
        tree: &mut SyntaxTree,
        member: &mut Option<bool>,
        depth: usize,
    ) -> PResult<NodeId> {
        let (word, span) = self.word().expect("caller peeked an ECSU word");
        let mut bits = match word.as_str() {
            "enum" => TypeId::ENUM,
            "struct" => TypeId::STRUCT,
            "union" => TypeId::UNION,
            _ => TypeId::CLASS,
        };
        if bits == TypeId::ENUM
            && (self.peek_ident() == Some("class")
                || self.peek_ident() == Some("struct"))
        {
            self.pos += 1;
            bits |= TypeId::CLASS;
        }
        let (tag, _) = self.scoped_name()?;
        let mut of = None;
        if bits.contains(TypeId::ENUM)
            && self.peek_ident() == Some("of")
            && self.peek_ident_at(1) == Some("type")
        {
            self.pos += 2;
            of = Some(self.english(tree, member, depth + 1)?);
        }
        Ok(tree.add(
            AstNode::new(
                AstKind::Ecsu {
                    tag,
                    of,
                    bit_width: 0,
                },
                span,
            )
            .with_type(bits),
        ))
    }

    /// `returning <english>`; defaults to an uninferred base type the
    /// checker will resolve (or reject) as implicit int.
    fn english_return(
        &mut self,
        tree: &mut SyntaxTree,
        member: &mut Option<bool>,
        depth: usize,
    ) -> PResult<NodeId> {
        if self.eat_ident("returning") {
            self.english(tree, member, depth + 1)
        } else {
            Ok(tree.add(AstNode::new(
                AstKind::Builtin { bit_width: 0 },
                self.cur_span(),
            )))
        }
    }

    /// `( x as int, y, ... )` or nothing.
    fn english_params(
        &mut self,
        tree: &mut SyntaxTree,
        depth: usize,
    ) -> PResult<Vec<NodeId>> {
        if !self.eat_punct("(") {
            return Ok(vec![]);
        }
        if self.eat_punct(")") {
            return Ok(vec![]);
        }
        let mut params = vec![];
        loop {
            params.push(self.english_param(tree, depth)?);
            if self.eat_punct(",") {
                continue;
            }
            self.expect_punct(")")?;
            break;
        }
        Ok(params)
    }

    fn english_param(
        &mut self,
        tree: &mut SyntaxTree,
        depth: usize,
    ) -> PResult<NodeId> {
        if self.peek_punct("...") {
            let span = self.cur_span();
            self.pos += 1;
            return Ok(tree.add(AstNode::new(AstKind::Variadic, span)));
        }
        // "<name> as <english>"
        if let (Some(_), Some("as")) =
            (self.peek_ident(), self.peek_ident_at(1))
        {
            let (name, _) = self.expect_ident()?;
            self.pos += 1; // "as"
            let mut member = None;
            let node = self.english(tree, &mut member, depth + 1)?;
            tree.get_mut(node).name = Some(ScopedName::simple(name));
            return Ok(node);
        }
        // a bare name (K&R untyped parameter)
        if let Some(word) = self.peek_ident() {
            let is_plain_name = english_keyword(word, self.lang()).is_none()
                && !is_ecsu_word(word)
                && !is_english_kind_word(word)
                && self
                    .session
                    .typedefs
                    .lookup_in(
                        &ScopedName::simple(word),
                        self.lang(),
                    )
                    .is_none()
                && (self.peek_punct_at(1, ",")
                    || self.peek_punct_at(1, ")"));
            if is_plain_name {
                let (name, span) = self.expect_ident()?;
                return Ok(tree.add(
                    AstNode::new(AstKind::Name, span)
                        .with_name(ScopedName::simple(name)),
                ));
            }
        }
        let mut member = None;
        self.english(tree, &mut member, depth + 1)
    }

    // --- the gibberish (C/C++ declaration) grammar ---

    /// A full declaration: one specifier sequence, then one or more
    /// comma-separated declarators, each producing its own [Declaration].
    fn gibberish_declarations(&mut self) -> PResult<Vec<Declaration>> {
        let mut spec_tree = SyntaxTree::new();
        let spec = self.specifier_seq(&mut spec_tree, 0)?;
        let mut decls = vec![];
        loop {
            decls.push(self.one_declarator(&spec_tree, &spec)?);
            if !self.eat_punct(",") {
                break;
            }
        }
        Ok(decls)
    }

    fn one_declarator(
        &mut self,
        spec_tree: &SyntaxTree,
        spec: &Spec,
    ) -> PResult<Declaration> {
        let mut tree = SyntaxTree::new();
        let ty = tree.copy_subtree(spec_tree, spec.root);
        self.pending_conv = spec.conv;
        self.pending_flavor = None;
        let decl_root = self.declarator(&mut tree, true, 0)?;
        let root =
            self.finish_declarator(&mut tree, ty, spec.align, decl_root)?;

        // bit-field suffix
        if self.eat_punct(":") {
            let (n, nspan) = self.expect_number()?;
            if n == 0 {
                return Err((DeclError::BitFieldWidth, nspan));
            }
            if !tree.get_mut(root).set_bit_width(n as u32) {
                return Err((DeclError::BitFieldKind, nspan));
            }
        }

        Ok(Declaration {
            tree,
            root,
            span: spec.span.merge(&self.prev_span()),
            member: None,
        })
    }

    /// Patch the declarator with its type, and migrate the storage-ish
    /// sectors (and alignment) from the type leaf to the declaration root,
    /// which is where they print from.
    fn finish_declarator(
        &mut self,
        tree: &mut SyntaxTree,
        ty: NodeId,
        align: Alignment,
        decl_root: NodeId,
    ) -> PResult<NodeId> {
        let root = if tree.has_placeholder(decl_root) {
            builder::patch(tree, ty, decl_root)
        } else {
            // trailing-return filled the slot, or the declarator was a
            // constructor/destructor/conversion: the specifier must have
            // been empty or a bare `auto`
            let leftover = tree.get(ty).type_id.base() - TypeId::AUTO_TYPE;
            if !leftover.is_empty() {
                return self.syntax_err(format!(
                    "unexpected type \"{}\"",
                    leftover.name()
                ));
            }
            decl_root
        };
        if root != ty {
            let movable = TypeId::STORAGE_MASK
                | TypeId::STORAGE_LIKE_MASK
                | TypeId::ATTR_MASK;
            let moved = tree.get(ty).type_id & movable;
            if !moved.is_empty() {
                let ty_tid = tree.get(ty).type_id;
                tree.get_mut(ty).type_id = ty_tid - moved;
                let root_tid = tree.get(root).type_id;
                tree.get_mut(root).type_id = root_tid | moved;
            }
        }
        if align != Alignment::None {
            tree.get_mut(root).align = align;
        }
        Ok(root)
    }

    /// The declaration-specifier sequence: type keywords, qualifiers,
    /// storage classes, attributes, alignment, an ECSU tag or a typedef
    /// name. Produces the leaf type node.
    fn specifier_seq(
        &mut self,
        tree: &mut SyntaxTree,
        depth: usize,
    ) -> PResult<Spec> {
        if depth > MAX_NESTING_DEPTH {
            return self.syntax_err("type is nested too deeply");
        }
        let start_span = self.cur_span();
        let mut tid = TypeId::empty();
        let mut align = Alignment::None;
        let mut conv = None;
        let mut ecsu: Option<(TypeId, ScopedName, Option<NodeId>)> = None;
        let mut tdef: Option<Rc<Typedef>> = None;

        loop {
            if self.peek_punct("[") && self.peek_punct_at(1, "[") {
                self.attributes(&mut tid)?;
                continue;
            }
            let word = match self.peek_ident() {
                Some(w) => w.to_string(),
                None => break,
            };
            if word == "alignas" || word == "_Alignas" {
                self.pos += 1;
                align = self.alignment(tree, depth)?;
                continue;
            }
            if let Some(ms) = MsCall::from_token(&word) {
                self.pos += 1;
                conv = Some(ms);
                continue;
            }
            if is_ecsu_word(&word) && ecsu.is_none() && tdef.is_none() {
                ecsu = Some(self.gibberish_ecsu(tree)?);
                continue;
            }
            if let Some(bits) = gibberish_keyword(&word, self.lang()) {
                let span = self.cur_span();
                self.pos += 1;
                types::add(&mut tid, bits).map_err(|e| (e, span))?;
                continue;
            }
            // an identifier: a typedef name if we have no type yet,
            // otherwise the declarator
            if tid.base().is_empty() && ecsu.is_none() && tdef.is_none() {
                let save = self.pos;
                let (name, span) = self.scoped_name()?;
                if let Some(def) =
                    self.session.typedefs.lookup_in(&name, self.lang())
                {
                    tid.insert(TypeId::TYPEDEF_TYPE);
                    tdef = Some(def);
                    continue;
                }
                self.pos = save;
                // two identifiers in a row means the first was meant as a
                // type; a lone one is the declarator (K&R implicit int)
                if self.peek_ident_at(1).is_some() {
                    return Err(self.unknown_name(&name.to_string(), span));
                }
            }
            break;
        }

        let root = match (ecsu, tdef) {
            (Some((bits, tag, of)), _) => {
                let merged = tid | bits;
                tree.add(
                    AstNode::new(
                        AstKind::Ecsu {
                            tag,
                            of,
                            bit_width: 0,
                        },
                        start_span,
                    )
                    .with_type(merged),
                )
            }
            (None, Some(def)) => tree.add(
                AstNode::new(
                    AstKind::Typedef { def, bit_width: 0 },
                    start_span,
                )
                .with_type(tid),
            ),
            (None, None) => tree.add(
                AstNode::new(AstKind::Builtin { bit_width: 0 }, start_span)
                    .with_type(tid),
            ),
        };
        Ok(Spec {
            root,
            align,
            conv,
            span: start_span.merge(&self.prev_span()),
        })
    }

    /// `enum [class|struct] Tag [: underlying]`, `struct Tag`, ...
    fn gibberish_ecsu(
        &mut self,
        tree: &mut SyntaxTree,
    ) -> PResult<(TypeId, ScopedName, Option<NodeId>)> {
        let (word, _) = self.word().expect("caller peeked an ECSU word");
        let mut bits = match word.as_str() {
            "enum" => TypeId::ENUM,
            "struct" => TypeId::STRUCT,
            "union" => TypeId::UNION,
            "namespace" => TypeId::NAMESPACE,
            _ => TypeId::CLASS,
        };
        if bits == TypeId::ENUM
            && (self.peek_ident() == Some("class")
                || self.peek_ident() == Some("struct"))
        {
            self.pos += 1;
            bits |= TypeId::CLASS;
        }
        let (tag, _) = self.scoped_name()?;
        let mut of = None;
        if bits.contains(TypeId::ENUM) && self.eat_punct(":") {
            // fixed underlying type: base keywords only
            let mut utid = TypeId::empty();
            let uspan = self.cur_span();
            loop {
                let word = match self.peek_ident() {
                    Some(w) => w.to_string(),
                    None => break,
                };
                match gibberish_keyword(&word, self.lang()) {
                    Some(ubits) if !ubits.base().is_empty() => {
                        let span = self.cur_span();
                        self.pos += 1;
                        types::add(&mut utid, ubits)
                            .map_err(|e| (e, span))?;
                    }
                    _ => break,
                }
            }
            if utid.is_empty() {
                return self.syntax_err("expected an integer type");
            }
            of = Some(tree.add(
                AstNode::new(AstKind::Builtin { bit_width: 0 }, uspan)
                    .with_type(utid),
            ));
        }
        Ok((bits, tag, of))
    }

    /// `[[attr, attr]]`
    fn attributes(&mut self, tid: &mut TypeId) -> PResult<()> {
        self.expect_punct("[")?;
        self.expect_punct("[")?;
        loop {
            let (word, span) = self.expect_ident()?;
            let bits = match word.as_str() {
                "carries_dependency" => TypeId::CARRIES_DEPENDENCY,
                "deprecated" => TypeId::DEPRECATED,
                "maybe_unused" => TypeId::MAYBE_UNUSED,
                "nodiscard" => TypeId::NODISCARD,
                "noreturn" | "_Noreturn" => TypeId::NORETURN,
                _ => {
                    let attrs = [
                        "carries_dependency",
                        "deprecated",
                        "maybe_unused",
                        "nodiscard",
                        "noreturn",
                    ];
                    return Err((
                        DeclError::UnknownName {
                            suggestions: lookup::suggestions(
                                &word,
                                attrs.iter().copied(),
                            ),
                        },
                        span,
                    ));
                }
            };
            types::add(tid, bits).map_err(|e| (e, span))?;
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct("]")?;
        self.expect_punct("]")?;
        Ok(())
    }

    /// `alignas(8)` or `alignas(type)`
    fn alignment(
        &mut self,
        tree: &mut SyntaxTree,
        depth: usize,
    ) -> PResult<Alignment> {
        self.expect_punct("(")?;
        let align = match self.peek() {
            Some(Token {
                kind: TokenKind::Number(n),
                ..
            }) => {
                let n = *n;
                self.pos += 1;
                Alignment::Bytes(n)
            }
            _ => Alignment::OfType(self.type_name(tree, depth + 1)?),
        };
        self.expect_punct(")")?;
        Ok(align)
    }

    /// A type-name: specifier sequence plus abstract declarator, fully
    /// patched. Used for trailing returns, `using` aliases, `alignas` and
    /// conversion targets.
    fn type_name(
        &mut self,
        tree: &mut SyntaxTree,
        depth: usize,
    ) -> PResult<NodeId> {
        let spec = self.specifier_seq_into(tree, depth)?;
        let decl_root = self.declarator(tree, true, depth + 1)?;
        self.finish_declarator(tree, spec.root, spec.align, decl_root)
    }

    /// Like [specifier_seq], but building straight into the given tree
    /// (used where there is exactly one declarator and no copying).
    fn specifier_seq_into(
        &mut self,
        tree: &mut SyntaxTree,
        depth: usize,
    ) -> PResult<Spec> {
        self.specifier_seq(tree, depth)
    }

    /// One declarator; returns a partial AST whose innermost placeholder
    /// awaits the type, or (for constructors, destructors and conversions)
    /// a complete AST with no placeholder.
    fn declarator(
        &mut self,
        tree: &mut SyntaxTree,
        allow_abstract: bool,
        depth: usize,
    ) -> PResult<NodeId> {
        if depth > MAX_NESTING_DEPTH {
            return self.syntax_err("declarator is nested too deeply");
        }

        // pointer operators, outermost first
        enum PtrOp {
            Pointer(TypeId),
            Reference,
            RvalueReference,
            Block,
            Member(ScopedName, TypeId),
        }
        let mut ops: Vec<(PtrOp, Span)> = vec![];
        loop {
            let span = self.cur_span();
            if self.eat_punct("*") {
                ops.push((PtrOp::Pointer(self.cv_qualifiers()), span));
            } else if self.eat_punct("&")
                || (self.lang().is_cpp() && self.eat_ident("bitand"))
            {
                ops.push((PtrOp::Reference, span));
            } else if self.eat_punct("&&")
                || (self.lang().is_cpp() && self.eat_ident("and"))
            {
                ops.push((PtrOp::RvalueReference, span));
            } else if self.eat_punct("^") {
                ops.push((PtrOp::Block, span));
            } else if let Some(word) = self.peek_ident() {
                if let Some(ms) = MsCall::from_token(word) {
                    self.pos += 1;
                    self.pending_conv = Some(ms);
                    continue;
                }
                match self.try_member_pointer()? {
                    Some((class, quals)) => {
                        ops.push((PtrOp::Member(class, quals), span))
                    }
                    None => break,
                }
            } else {
                break;
            }
        }

        // direct declarator
        let mut ast = if self.peek_punct("(") && self.nested_declarator() {
            self.pos += 1;
            let inner = self.declarator(tree, allow_abstract, depth + 1)?;
            self.expect_punct(")")?;
            inner
        } else if self.peek_ident() == Some("operator")
            && self.lang().is_cpp()
        {
            self.operator_declarator(tree, depth)?
        } else if self.peek_punct("~") {
            self.destructor_declarator(tree, None)?
        } else if self.peek_ident().is_some() {
            self.named_declarator(tree)?
        } else if allow_abstract {
            tree.add(AstNode::new(AstKind::Placeholder, self.cur_span()))
        } else {
            return self.syntax_err("expected a declarator");
        };

        // suffixes bind tighter than the pointer operators
        ast = self.declarator_suffixes(tree, ast, depth)?;

        // pointer operators graft innermost-position, last written first
        for (op, span) in ops.into_iter().rev() {
            if !tree.has_placeholder(ast) {
                // constructors and friends leave nothing to point at
                return self.syntax_err("unexpected declarator");
            }
            ast = match op {
                PtrOp::Pointer(quals) => builder::add_child_node(
                    tree,
                    ast,
                    span,
                    quals,
                    |to| AstKind::Pointer { to },
                ),
                PtrOp::Reference => builder::add_child_node(
                    tree,
                    ast,
                    span,
                    TypeId::empty(),
                    |to| AstKind::Reference { to },
                ),
                PtrOp::RvalueReference => builder::add_child_node(
                    tree,
                    ast,
                    span,
                    TypeId::empty(),
                    |to| AstKind::RvalueReference { to },
                ),
                PtrOp::Block => builder::add_child_node(
                    tree,
                    ast,
                    span,
                    TypeId::empty(),
                    |ret| AstKind::AppleBlock {
                        params: vec![],
                        ret,
                    },
                ),
                PtrOp::Member(class, quals) => builder::add_child_node(
                    tree,
                    ast,
                    span,
                    quals,
                    |to| AstKind::PointerToMember { class, to },
                ),
            };
        }
        Ok(ast)
    }

    /// `C::*` (or `a::b::*`), tried non-destructively.
    fn try_member_pointer(
        &mut self,
    ) -> PResult<Option<(ScopedName, TypeId)>> {
        let save = self.pos;
        let mut name = ScopedName::default();
        loop {
            match self.peek_ident() {
                Some(word) => {
                    name.push(ScopeKind::Class, word.to_string());
                    self.pos += 1;
                }
                None => {
                    self.pos = save;
                    return Ok(None);
                }
            }
            if !self.eat_punct("::") {
                self.pos = save;
                return Ok(None);
            }
            if self.eat_punct("*") {
                return Ok(Some((name, self.cv_qualifiers())));
            }
        }
    }

    /// A (possibly scoped) declarator name; recognizes `C::C` constructors
    /// and `C::~C` destructors.
    fn named_declarator(&mut self, tree: &mut SyntaxTree) -> PResult<NodeId> {
        let (first, mut span) = self.expect_ident()?;
        let mut name = ScopedName::simple(first);
        while self.eat_punct("::") {
            if self.peek_punct("~") {
                self.pos += 1;
                return self.destructor_declarator(tree, Some(name));
            }
            let (seg, seg_span) = self.expect_ident()?;
            name.push(ScopeKind::Plain, seg);
            span = span.merge(&seg_span);
        }
        let segments = name.segments();
        if segments.len() >= 2
            && segments[segments.len() - 1].name
                == segments[segments.len() - 2].name
        {
            self.pending_flavor = Some(FnFlavor::Constructor);
        }
        Ok(tree.add(
            AstNode::new(AstKind::Placeholder, span).with_name(name),
        ))
    }

    /// `~C()` (the `~` is already peeked; `scope`, when given, is the part
    /// before `::~`). Consumes the parameter parens and tail itself since
    /// destructors take no parameters and have no return slot.
    fn destructor_declarator(
        &mut self,
        tree: &mut SyntaxTree,
        scope: Option<ScopedName>,
    ) -> PResult<NodeId> {
        self.eat_punct("~");
        let (class, span) = self.expect_ident()?;
        let name = match scope {
            Some(mut scoped) => {
                scoped.push(ScopeKind::Class, class);
                scoped
            }
            None => ScopedName::simple(class),
        };
        let node = tree.add(
            AstNode::new(AstKind::Destructor, span).with_name(name),
        );
        self.expect_punct("(")?;
        self.expect_punct(")")?;
        self.function_tail(tree, node)?;
        Ok(node)
    }

    /// `operator+`, `operator[]`, `operator"" _x`, or a conversion
    /// `operator T`. The first two leave a named placeholder for the
    /// parameter suffix; the conversion consumes its `()` itself.
    fn operator_declarator(
        &mut self,
        tree: &mut SyntaxTree,
        depth: usize,
    ) -> PResult<NodeId> {
        let (_, op_span) = self.word().expect("caller peeked \"operator\"");

        // user-defined literal
        if self.eat_punct("\"\"") {
            let (name, span) = self.expect_ident()?;
            self.pending_flavor = Some(FnFlavor::Literal);
            return Ok(tree.add(
                AstNode::new(AstKind::Placeholder, span)
                    .with_name(ScopedName::simple(name)),
            ));
        }

        // a symbol operator: join the punctuators up to the parameter list
        if matches!(self.peek(), Some(Token { kind: TokenKind::Punct(_), .. }))
        {
            let mut sym = String::new();
            let mut span = op_span;
            if self.peek_punct("(") && self.peek_punct_at(1, ")") {
                sym.push_str("()");
                span = span.merge(&self.peek_at(1).unwrap().span);
                self.pos += 2;
            } else {
                loop {
                    let (p, pspan) = match self.peek() {
                        Some(Token {
                            kind: TokenKind::Punct(p),
                            span,
                        }) => (*p, *span),
                        _ => break,
                    };
                    if p == "(" {
                        break;
                    }
                    sym.push_str(p);
                    span = span.merge(&pspan);
                    self.pos += 1;
                }
            }
            if sym.is_empty() {
                return self.syntax_err("expected an operator symbol");
            }
            self.pending_flavor = Some(FnFlavor::Operator);
            return Ok(tree.add(
                AstNode::new(AstKind::Placeholder, span)
                    .with_name(ScopedName::simple(sym)),
            ));
        }

        // conversion: `operator T* () tail`
        let spec = self.specifier_seq_into(tree, depth + 1)?;
        let mut target = spec.root;
        let mut ptr_ops: Vec<(AstKindCtor, TypeId, Span)> = vec![];
        loop {
            let span = self.cur_span();
            if self.eat_punct("*") {
                ptr_ops.push((
                    AstKindCtor::Pointer,
                    self.cv_qualifiers(),
                    span,
                ));
            } else if self.eat_punct("&") {
                ptr_ops.push((AstKindCtor::Reference, TypeId::empty(), span));
            } else if self.eat_punct("&&") {
                ptr_ops.push((
                    AstKindCtor::RvalueReference,
                    TypeId::empty(),
                    span,
                ));
            } else {
                break;
            }
        }
        for (ctor, quals, span) in ptr_ops {
            let kind = match ctor {
                AstKindCtor::Pointer => AstKind::Pointer { to: target },
                AstKindCtor::Reference => AstKind::Reference { to: target },
                AstKindCtor::RvalueReference => {
                    AstKind::RvalueReference { to: target }
                }
            };
            target = tree.add(AstNode::new(kind, span).with_type(quals));
        }
        let node = tree
            .add(AstNode::new(AstKind::Conversion { ret: target }, op_span));
        self.expect_punct("(")?;
        self.expect_punct(")")?;
        self.function_tail(tree, node)?;
        Ok(node)
    }

    /// `[size]` and `(params)` suffixes, left to right.
    fn declarator_suffixes(
        &mut self,
        tree: &mut SyntaxTree,
        mut ast: NodeId,
        depth: usize,
    ) -> PResult<NodeId> {
        loop {
            let span = self.cur_span();
            if self.peek_punct("[") && !self.peek_punct_at(1, "[") {
                self.pos += 1;
                let quals = self.array_qualifiers();
                let size = match self.peek() {
                    Some(Token {
                        kind: TokenKind::Number(n),
                        ..
                    }) => {
                        let n = *n;
                        self.pos += 1;
                        ArraySize::Fixed(n)
                    }
                    Some(Token {
                        kind: TokenKind::Punct("*"),
                        ..
                    }) => {
                        self.pos += 1;
                        ArraySize::Variable
                    }
                    _ => ArraySize::Unspecified,
                };
                self.expect_punct("]")?;
                if !tree.has_placeholder(ast) {
                    return self.syntax_err("unexpected `[`");
                }
                ast = builder::add_array(tree, ast, size, quals, span);
            } else if self.peek_punct("(") {
                self.pos += 1;
                let params = self.parameter_list(tree, depth)?;
                self.expect_punct(")")?;
                if !tree.has_placeholder(ast) {
                    return self.syntax_err("unexpected `(`");
                }
                ast = match self.pending_flavor.take() {
                    Some(FnFlavor::Operator) => {
                        builder::add_operator(tree, ast, params, span)
                    }
                    Some(FnFlavor::Literal) => {
                        builder::add_literal(tree, ast, params, span)
                    }
                    Some(FnFlavor::Constructor) => {
                        builder::add_constructor(tree, ast, params, span)
                    }
                    None => builder::add_function(
                        tree,
                        ast,
                        params,
                        self.pending_conv.take(),
                        span,
                    ),
                };
                // the new function-like node is the placeholder's parent
                // (or the lone function-like node, for constructors)
                let func = match tree.find_kind(ast, KindSet::PLACEHOLDER) {
                    Some(ph) => tree.get(ph).parent.unwrap_or(ast),
                    None => tree
                        .find_kind(ast, KindSet::FUNCTION_LIKE)
                        .unwrap_or(ast),
                };
                self.function_tail(tree, func)?;
                if self.eat_punct("->") {
                    // trailing return type fills the slot right now
                    let ret = self.type_name(tree, depth + 1)?;
                    if !tree.has_placeholder(ast) {
                        return self.syntax_err("unexpected `->`");
                    }
                    ast = builder::patch(tree, ret, ast);
                }
            } else {
                break;
            }
        }
        Ok(ast)
    }

    /// Everything after a function's closing paren: cv-qualifiers,
    /// ref-qualifiers, `noexcept`, `throw()`, `override`, `final`, `= 0`,
    /// `= default`, `= delete`.
    fn function_tail(
        &mut self,
        tree: &mut SyntaxTree,
        func: NodeId,
    ) -> PResult<()> {
        let mut bits = TypeId::empty();
        loop {
            if self.eat_ident("const") {
                bits.insert(TypeId::CONST);
            } else if self.eat_ident("volatile") {
                bits.insert(TypeId::VOLATILE);
            } else if self.eat_ident("noexcept") {
                bits.insert(TypeId::NOEXCEPT);
            } else if self.peek_ident() == Some("throw") {
                self.pos += 1;
                self.expect_punct("(")?;
                self.expect_punct(")")?;
                bits.insert(TypeId::THROW);
            } else if self.eat_ident("override") {
                bits.insert(TypeId::OVERRIDE);
            } else if self.eat_ident("final") {
                bits.insert(TypeId::FINAL);
            } else if self.peek_punct("&") && !self.peek_punct_at(1, "&") {
                self.pos += 1;
                bits.insert(TypeId::REF);
            } else if self.eat_punct("&&") {
                bits.insert(TypeId::RVALUE_REF);
            } else if self.peek_punct("=") {
                self.pos += 1;
                if self.eat_ident("default") {
                    bits.insert(TypeId::DEFAULT);
                } else if self.eat_ident("delete") {
                    bits.insert(TypeId::DELETE);
                } else {
                    match self.peek() {
                        Some(Token {
                            kind: TokenKind::Number(0),
                            ..
                        }) => {
                            self.pos += 1;
                            bits.insert(TypeId::PURE_VIRTUAL);
                        }
                        _ => {
                            return self.syntax_err(
                                "expected `0`, \"default\" or \"delete\"",
                            );
                        }
                    }
                }
            } else {
                break;
            }
        }
        if !bits.is_empty() {
            let tid = tree.get(func).type_id;
            tree.get_mut(func).type_id = tid | bits;
        }
        Ok(())
    }

    /// `(` has been consumed; parse parameters up to (not including) `)`.
    fn parameter_list(
        &mut self,
        tree: &mut SyntaxTree,
        depth: usize,
    ) -> PResult<Vec<NodeId>> {
        if self.peek_punct(")") {
            return Ok(vec![]);
        }
        // f(void) means no parameters
        if self.peek_ident() == Some("void") && self.peek_punct_at(1, ")") {
            self.pos += 1;
            return Ok(vec![]);
        }
        let mut params = vec![];
        loop {
            params.push(self.parameter(tree, depth)?);
            if !self.eat_punct(",") {
                break;
            }
        }
        Ok(params)
    }

    fn parameter(
        &mut self,
        tree: &mut SyntaxTree,
        depth: usize,
    ) -> PResult<NodeId> {
        if self.peek_punct("...") {
            let span = self.cur_span();
            self.pos += 1;
            return Ok(tree.add(AstNode::new(AstKind::Variadic, span)));
        }
        // a bare, untyped K&R parameter name
        if let Some(word) = self.peek_ident() {
            if !self.is_type_start(word)
                && (self.peek_punct_at(1, ",") || self.peek_punct_at(1, ")"))
            {
                let (name, span) = self.expect_ident()?;
                return Ok(tree.add(
                    AstNode::new(AstKind::Name, span)
                        .with_name(ScopedName::simple(name)),
                ));
            }
        }
        self.type_name(tree, depth + 1)
    }

    fn cv_qualifiers(&mut self) -> TypeId {
        let mut quals = TypeId::empty();
        loop {
            match self.peek_ident() {
                Some("const") => quals.insert(TypeId::CONST),
                Some("volatile") => quals.insert(TypeId::VOLATILE),
                Some("restrict") | Some("__restrict")
                | Some("__restrict__") => quals.insert(TypeId::RESTRICT),
                Some("_Atomic") => quals.insert(TypeId::ATOMIC),
                _ => return quals,
            }
            self.pos += 1;
        }
    }

    /// Qualifiers legal inside array brackets (C99 parameter arrays).
    fn array_qualifiers(&mut self) -> TypeId {
        let mut quals = TypeId::empty();
        loop {
            match self.peek_ident() {
                Some("const") => quals.insert(TypeId::CONST),
                Some("volatile") => quals.insert(TypeId::VOLATILE),
                Some("restrict") => quals.insert(TypeId::RESTRICT),
                Some("static") => quals.insert(TypeId::STATIC),
                _ => return quals,
            }
            self.pos += 1;
        }
    }

    /// Could this word begin a type? Decides declarator-vs-parameter and
    /// K&R-name questions.
    fn is_type_start(&self, word: &str) -> bool {
        gibberish_keyword(word, self.lang()).is_some()
            || is_ecsu_word(word)
            || word == "alignas"
            || word == "_Alignas"
            || MsCall::from_token(word).is_some()
            || (word == "operator" && self.lang().is_cpp())
            || self
                .session
                .typedefs
                .lookup_in(&ScopedName::simple(word), self.lang())
                .is_some()
    }

    /// After a `(` with no name seen yet: nested declarator, or a
    /// parameter list?
    fn nested_declarator(&self) -> bool {
        match self.peek_at(1) {
            Some(Token {
                kind: TokenKind::Punct(p),
                ..
            }) => matches!(*p, "*" | "&" | "&&" | "^" | "("),
            Some(Token {
                kind: TokenKind::Ident(word),
                ..
            }) => !self.is_type_start(word),
            _ => false,
        }
    }
}

enum AstKindCtor {
    Pointer,
    Reference,
    RvalueReference,
}

struct Spec {
    root: NodeId,
    align: Alignment,
    conv: Option<MsCall>,
    span: Span,
}

// ===== keyword tables =====

fn is_ecsu_word(word: &str) -> bool {
    matches!(word, "enum" | "struct" | "union" | "class" | "namespace")
}

fn is_english_kind_word(word: &str) -> bool {
    matches!(
        word,
        "array"
            | "pointer"
            | "reference"
            | "rvalue"
            | "function"
            | "block"
            | "operator"
            | "lambda"
            | "constructor"
            | "destructor"
            | "user-defined"
            | "variable"
            | "member"
            | "non-member"
            | "aligned"
            | "pure"
            | "width"
    )
}

/// The keywords of the gibberish grammar that merge straight into a type
/// identifier. `auto` reads as the C++11 type placeholder from C++11 on,
/// and as the old storage class everywhere else.
fn gibberish_keyword(word: &str, lang: Lang) -> Option<TypeId> {
    Some(match word {
        "void" => TypeId::VOID,
        "bool" | "_Bool" => TypeId::BOOL,
        "char" => TypeId::CHAR,
        "char8_t" => TypeId::CHAR8_T,
        "char16_t" => TypeId::CHAR16_T,
        "char32_t" => TypeId::CHAR32_T,
        "wchar_t" => TypeId::WCHAR_T,
        "short" => TypeId::SHORT,
        "int" => TypeId::INT,
        "long" => TypeId::LONG,
        "signed" => TypeId::SIGNED,
        "unsigned" => TypeId::UNSIGNED,
        "float" => TypeId::FLOAT,
        "double" => TypeId::DOUBLE,
        "_Complex" => TypeId::COMPLEX,
        "_Imaginary" => TypeId::IMAGINARY,
        "auto" => {
            if Lang::cpp_min(Lang::CPP_11).contains(lang) {
                TypeId::AUTO_TYPE
            } else {
                TypeId::AUTO_STORAGE
            }
        }
        "__block" => TypeId::APPLE_BLOCK,
        "extern" => TypeId::EXTERN,
        "mutable" => TypeId::MUTABLE,
        "register" => TypeId::REGISTER,
        "static" => TypeId::STATIC,
        "thread_local" | "_Thread_local" => TypeId::THREAD_LOCAL,
        "typedef" => TypeId::TYPEDEF,
        "consteval" => TypeId::CONSTEVAL,
        "constexpr" => TypeId::CONSTEXPR,
        "explicit" => TypeId::EXPLICIT,
        "friend" => TypeId::FRIEND,
        "inline" => TypeId::INLINE,
        "virtual" => TypeId::VIRTUAL,
        "_Noreturn" => TypeId::NORETURN,
        "const" => TypeId::CONST,
        "volatile" => TypeId::VOLATILE,
        "restrict" | "__restrict" | "__restrict__" => TypeId::RESTRICT,
        "_Atomic" => TypeId::ATOMIC,
        _ => return None,
    })
}

/// English modifier words: everything the gibberish grammar knows, plus
/// the English-side aliases.
fn english_keyword(word: &str, lang: Lang) -> Option<TypeId> {
    if let Some(bits) = gibberish_keyword(word, lang) {
        return Some(bits);
    }
    Some(match word {
        "constant" => TypeId::CONST,
        "atomic" => TypeId::ATOMIC,
        "restricted" => TypeId::RESTRICT,
        "non-returning" | "noreturn" => TypeId::NORETURN,
        "non-throwing" | "noexcept" => TypeId::NOEXCEPT,
        "override" | "overridden" => TypeId::OVERRIDE,
        "final" => TypeId::FINAL,
        "defaulted" | "default" => TypeId::DEFAULT,
        "deleted" | "delete" => TypeId::DELETE,
        "deprecated" => TypeId::DEPRECATED,
        "maybe-unused" | "maybe_unused" => TypeId::MAYBE_UNUSED,
        "non-discardable" | "nodiscard" => TypeId::NODISCARD,
        "carries-dependency" | "carries_dependency" => {
            TypeId::CARRIES_DEPENDENCY
        }
        "throwing" => TypeId::THROW,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new()
    }

    fn lex_kinds(src: &str) -> Vec<TokenKind> {
        lex(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lex_basic() {
        assert_eq!(
            lex_kinds("int (*x)[10]"),
            vec![
                TokenKind::Ident("int".into()),
                TokenKind::Punct("("),
                TokenKind::Punct("*"),
                TokenKind::Ident("x".into()),
                TokenKind::Punct(")"),
                TokenKind::Punct("["),
                TokenKind::Number(10),
                TokenKind::Punct("]"),
            ]
        );
    }

    #[test]
    fn test_lex_folds_digraphs_and_trigraphs() {
        assert_eq!(lex_kinds("<: :>"), lex_kinds("[ ]"));
        assert_eq!(lex_kinds("??( ??)"), lex_kinds("[ ]"));
        assert_eq!(lex_kinds("<% %>"), lex_kinds("{ }"));
    }

    #[test]
    fn test_lex_spans() {
        let tokens = lex("int x").unwrap();
        assert_eq!(tokens[0].span.offset, 0);
        assert_eq!(tokens[0].span.length, 3);
        assert_eq!(tokens[0].span.start_col, 1);
        assert_eq!(tokens[1].span.offset, 4);
        assert_eq!(tokens[1].span.start_col, 5);
    }

    #[test]
    fn test_lex_numbers() {
        assert_eq!(
            lex_kinds("10 0x1f"),
            vec![TokenKind::Number(10), TokenKind::Number(31)]
        );
    }

    #[test]
    fn test_parse_declare() {
        let session = session();
        let cmd = parse_command(
            "declare x as pointer to array 10 of const int",
            &session,
        )
        .unwrap();
        match cmd {
            Command::Declare(decls) => {
                assert_eq!(decls.len(), 1);
                let decl = &decls[0];
                let root = decl.tree.get(decl.root);
                assert_eq!(root.name.as_ref().unwrap().last(), "x");
                let array = match root.kind {
                    AstKind::Pointer { to } => decl.tree.get(to),
                    _ => panic!("expected pointer at root"),
                };
                match &array.kind {
                    AstKind::Array {
                        size: ArraySize::Fixed(10),
                        of,
                        ..
                    } => {
                        let leaf = decl.tree.get(*of);
                        assert_eq!(
                            leaf.type_id,
                            TypeId::INT | TypeId::CONST
                        );
                    }
                    other => panic!("expected array, got {:?}", other),
                }
            }
            other => panic!("expected declare, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_explain_matches_english() {
        // the two grammars must produce structurally equal trees
        let session = session();
        let explained =
            parse_command("explain int (*x)[10]", &session).unwrap();
        let declared = parse_command(
            "declare x as pointer to array 10 of int",
            &session,
        )
        .unwrap();
        let (e, d) = match (explained, declared) {
            (Command::Explain(mut e), Command::Declare(mut d)) => {
                (e.remove(0), d.remove(0))
            }
            other => panic!("wrong commands: {:?}", other),
        };
        assert!(e.tree.structurally_eq(e.root, &d.tree, d.root));
    }

    #[test]
    fn test_placeholder_eradication() {
        let session = session();
        for src in [
            "explain int (*a[3])(char)",
            "explain char *f(int x, int y)",
            "explain unsigned long *p, q[4]",
            "declare f as function (x as int) returning pointer to char",
        ]
        .iter()
        {
            let cmd = parse_command(src, &session).unwrap();
            let decls = match cmd {
                Command::Explain(d) | Command::Declare(d) => d,
                other => panic!("unexpected command {:?}", other),
            };
            for decl in decls {
                assert!(
                    !decl.tree.has_placeholder(decl.root),
                    "placeholder survived {}",
                    src
                );
            }
        }
    }

    #[test]
    fn test_parse_function_pointer_array() {
        let session = session();
        let cmd =
            parse_command("explain int (*a[3])(char)", &session).unwrap();
        let decl = match cmd {
            Command::Explain(mut decls) => decls.remove(0),
            other => panic!("expected explain, got {:?}", other),
        };
        let tree = &decl.tree;
        let root = tree.get(decl.root);
        assert_eq!(root.name.as_ref().unwrap().last(), "a");
        let ptr = match &root.kind {
            AstKind::Array {
                size: ArraySize::Fixed(3),
                of,
                ..
            } => *of,
            other => panic!("expected array, got {:?}", other),
        };
        let func = match &tree.get(ptr).kind {
            AstKind::Pointer { to } => *to,
            other => panic!("expected pointer, got {:?}", other),
        };
        match &tree.get(func).kind {
            AstKind::Function { params, ret, .. } => {
                assert_eq!(params.len(), 1);
                assert_eq!(tree.get(params[0]).type_id, TypeId::CHAR);
                assert_eq!(tree.get(*ret).type_id, TypeId::INT);
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_member_pointer() {
        let mut session = session();
        session.options.lang = Lang::CPP_17;
        let cmd =
            parse_command("explain void (C::*p)(int)", &session).unwrap();
        let decl = match cmd {
            Command::Explain(mut decls) => decls.remove(0),
            other => panic!("expected explain, got {:?}", other),
        };
        match &decl.tree.get(decl.root).kind {
            AstKind::PointerToMember { class, to } => {
                assert_eq!(class.to_string(), "C");
                assert!(matches!(
                    decl.tree.get(*to).kind,
                    AstKind::Function { .. }
                ));
            }
            other => panic!("expected pointer-to-member, got {:?}", other),
        }
    }

    #[test]
    fn test_type_conflict_points_at_second_token() {
        let session = session();
        let err =
            parse_command("explain short long x", &session).unwrap_err();
        match err.0 {
            DeclError::TypeConflict { prev } => assert_eq!(prev, "short"),
            other => panic!("wrong error {:?}", other),
        }
        // the span points at "long"
        assert_eq!(err.1.offset, 14);
        assert_eq!(err.1.length, 4);
    }

    #[test]
    fn test_unknown_type_suggests() {
        let session = session();
        let err = parse_command("explain itn x", &session).unwrap_err();
        match err.0 {
            DeclError::UnknownName { suggestions } => {
                assert!(suggestions.contains(&"int".to_string()));
            }
            other => panic!("wrong error {:?}", other),
        }
    }

    #[test]
    fn test_typedef_name_recognized() {
        let session = session();
        let cmd = parse_command("explain size_t n", &session).unwrap();
        let decl = match cmd {
            Command::Explain(mut decls) => decls.remove(0),
            other => panic!("expected explain, got {:?}", other),
        };
        match &decl.tree.get(decl.root).kind {
            AstKind::Typedef { def, .. } => {
                assert_eq!(def.name.to_string(), "size_t")
            }
            other => panic!("expected typedef ref, got {:?}", other),
        }
    }

    #[test]
    fn test_knr_parameter_name() {
        let session = session();
        let cmd = parse_command("explain int f(x, y)", &session).unwrap();
        let decl = match cmd {
            Command::Explain(mut decls) => decls.remove(0),
            other => panic!("expected explain, got {:?}", other),
        };
        match &decl.tree.get(decl.root).kind {
            AstKind::Function { params, .. } => {
                assert_eq!(params.len(), 2);
                for p in params {
                    assert!(matches!(
                        decl.tree.get(*p).kind,
                        AstKind::Name
                    ));
                }
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_set_is_word_level() {
        let session = session();
        match parse_command("set east-const c++17", &session).unwrap() {
            Command::Set(args) => {
                assert_eq!(args, vec!["east-const", "c++17"])
            }
            other => panic!("expected set, got {:?}", other),
        }
    }
}
