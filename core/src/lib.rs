//! Core implementation of the declaration composer/explainer. The main
//! usage of this crate is to run commands against a [Session]: English
//! requests (`declare x as pointer to array 10 of const int`) come back as
//! C/C++ declarations, and C/C++ declarations (`explain int (*x)[10]`)
//! come back as English.
//!
//! ```
//! use cdecl::{translate, Session};
//!
//! let mut session = Session::new();
//! let response = translate(
//!     &mut session,
//!     "declare x as pointer to array 10 of const int",
//! )
//! .unwrap();
//! assert_eq!(response.output.unwrap(), "int const (*x)[10];");
//!
//! let response =
//!     translate(&mut session, "explain int (*x)[10]").unwrap();
//! assert_eq!(
//!     response.output.unwrap(),
//!     "declare x as pointer to array 10 of int"
//! );
//! ```

#![deny(unused_must_use)]

pub mod ast;
pub mod builder;
mod check;
mod consts;
mod english;
mod error;
mod gibberish;
mod lang;
mod lookup;
mod options;
mod parse;
mod typedefs;
mod types;
mod util;

pub use consts::MAX_NESTING_DEPTH;
pub use error::*;
pub use gibberish::CastKind;
pub use lang::Lang;
pub use options::{Graphs, Options};
pub use typedefs::{ShowFilter, Typedef, TypedefRegistry};
pub use types::TypeId;
pub use util::Span;

use ast::ScopedName;
use parse::{Command, DefineFlavor, Declaration, ShowWhat};
use std::fmt::Debug;
use util::Span as SrcSpan;

/// Everything one translation session carries: the option flags and the
/// typedef registry. The core algorithms take the session explicitly, so a
/// host can run several sessions side by side.
#[derive(Debug)]
pub struct Session {
    pub options: Options,
    pub typedefs: TypedefRegistry,
}

impl Session {
    /// A session with default options and the predefined typedefs loaded.
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        let mut session = Session {
            options,
            typedefs: TypedefRegistry::new(),
        };
        session.seed_predefined();
        session
    }

    /// Replay the built-in typedef table through the ordinary pipeline.
    /// The table is trusted, so any failure here is a bug.
    fn seed_predefined(&mut self) {
        for (src, langs) in typedefs::predefined() {
            let cmd = parse::parse_command(src, self)
                .unwrap_or_else(|e| {
                    panic!("bad predefined typedef `{}`: {:?}", src, e)
                });
            let decls = match cmd {
                Command::Define { decls, .. } => decls,
                other => panic!(
                    "predefined typedef `{}` parsed as {:?}",
                    src, other
                ),
            };
            for mut decl in decls {
                let root_tid = decl.tree.get(decl.root).type_id;
                decl.tree.get_mut(decl.root).type_id =
                    root_tid - TypeId::TYPEDEF;
                let name = decl
                    .tree
                    .get_mut(decl.root)
                    .name
                    .take()
                    .unwrap_or_else(|| {
                        panic!("predefined typedef `{}` has no name", src)
                    });
                self.typedefs
                    .define(Typedef {
                        name,
                        tree: decl.tree,
                        root: decl.root,
                        langs,
                        predefined: true,
                    })
                    .expect("conflicting predefined typedefs");
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// The result of one successful command.
#[derive(Debug)]
pub struct Response {
    /// Text for the output stream, without a trailing newline. `None` for
    /// commands with nothing to print (`set`, definitions).
    pub output: Option<String>,
    /// Warnings to show on the error stream; they never suppress output.
    pub warnings: Option<WithSource<DeclError>>,
    /// The user asked to quit.
    pub quit: bool,
}

/// Run one command against the session: parse, check it in the active
/// dialect, then render or execute it. Any errors come back together, with
/// their source locations.
pub fn translate(
    session: &mut Session,
    source: &str,
) -> Result<Response, WithSource<DeclError>> {
    Translator::new(source)
        .debug()
        .parse(session)?
        .debug()
        .check(session)?
        .render(session)
}

/// Struct to contain all pipeline steps. `T` is the current state of the
/// translation and controls which stage can run next, so the type system
/// enforces the parse -> check -> render order.
#[derive(Debug)]
struct Translator<T: Debug> {
    source: String,
    state: T,
}

impl<T: Debug> Translator<T> {
    /// Prints out the current state of this translator, if debug mode is
    /// enabled. Returns self so it chains.
    fn debug(self) -> Self {
        debug!(println!("{:?}", &self));
        self
    }
}

impl Translator<()> {
    fn new(source: &str) -> Self {
        Translator {
            source: source.into(),
            state: (),
        }
    }

    fn parse(
        self,
        session: &Session,
    ) -> Result<Translator<Command>, WithSource<DeclError>> {
        match parse::parse_command(&self.source, session) {
            Ok(command) => Ok(Translator {
                source: self.source,
                state: command,
            }),
            Err((error, span)) => Err(WithSource::new(
                vec![SourceErrorWrapper::new(error, span, &self.source)],
                self.source,
            )),
        }
    }
}

/// A checked command plus the warnings the checker produced.
#[derive(Debug)]
struct Checked {
    command: Command,
    warnings: Vec<SourceErrorWrapper<DeclError>>,
}

impl Translator<Command> {
    fn check(
        mut self,
        session: &Session,
    ) -> Result<Translator<Checked>, WithSource<DeclError>> {
        let mut diags: Vec<(DeclError, SrcSpan)> = vec![];
        match &mut self.state {
            Command::Declare(decls)
            | Command::Explain(decls)
            | Command::Define { decls, .. } => {
                for decl in decls.iter_mut() {
                    diags.extend(check::check(decl, &session.options));
                }
            }
            Command::Cast {
                kind,
                kind_span,
                decl,
                ..
            } => {
                diags.extend(check::check(decl, &session.options));
                if let Some(keyword) = kind.keyword() {
                    if !session.options.lang.is_cpp() {
                        diags.push((
                            DeclError::NotSupported {
                                what: keyword.into(),
                                lang: session.options.lang.to_string(),
                                hint: Lang::requirement_hint(
                                    Lang::CPP_ALL,
                                    session.options.lang,
                                ),
                            },
                            *kind_span,
                        ));
                    }
                }
            }
            _ => {}
        }
        if let Command::Define {
            decls,
            flavor: DefineFlavor::Using,
        } = &self.state
        {
            let allowed = Lang::cpp_min(Lang::CPP_11);
            if !allowed.contains(session.options.lang) {
                let span = decls
                    .first()
                    .map(|d| d.span)
                    .unwrap_or_default();
                diags.push((
                    DeclError::NotSupported {
                        what: "using declaration".into(),
                        lang: session.options.lang.to_string(),
                        hint: Lang::requirement_hint(
                            allowed,
                            session.options.lang,
                        ),
                    },
                    span,
                ));
            }
        }

        let wrapped: Vec<SourceErrorWrapper<DeclError>> = diags
            .into_iter()
            .map(|(error, span)| {
                SourceErrorWrapper::new(error, span, &self.source)
            })
            .collect();
        if wrapped.iter().any(|d| d.severity() == Severity::Error) {
            return Err(WithSource::new(wrapped, self.source));
        }
        Ok(Translator {
            source: self.source,
            state: Checked {
                command: self.state,
                warnings: wrapped,
            },
        })
    }
}

impl Translator<Checked> {
    fn render(
        self,
        session: &mut Session,
    ) -> Result<Response, WithSource<DeclError>> {
        let Checked { command, warnings } = self.state;
        let source = self.source;
        let fail = |error: DeclError, span: SrcSpan, source: String| {
            Err(WithSource::new(
                vec![SourceErrorWrapper::new(error, span, &source)],
                source,
            ))
        };

        let mut quit = false;
        let output = match command {
            Command::Empty => None,
            Command::Help => Some(help_text()),
            Command::Quit => {
                quit = true;
                None
            }
            Command::Set(args) => {
                if args.is_empty() || args[..] == ["options".to_string()] {
                    Some(session.options.summary())
                } else {
                    for arg in &args {
                        if arg == "options" {
                            continue;
                        }
                        if let Err(error) = session.options.set(arg) {
                            let span = word_span(&source, arg);
                            return fail(error, span, source);
                        }
                    }
                    None
                }
            }
            Command::Declare(decls) => {
                let lines: Vec<String> = decls
                    .iter()
                    .map(|decl| {
                        let mut line = gibberish::declaration(
                            &decl.tree,
                            decl.root,
                            &session.options,
                        );
                        if session.options.semicolon {
                            line.push(';');
                        }
                        line
                    })
                    .collect();
                Some(lines.join("\n"))
            }
            Command::Explain(decls) => {
                let lines: Vec<String> = decls
                    .into_iter()
                    .map(|mut decl| explain_line(&mut decl))
                    .collect();
                Some(lines.join("\n"))
            }
            Command::Cast {
                kind, expr, decl, ..
            } => Some(gibberish::cast(
                &decl.tree,
                decl.root,
                kind,
                &expr,
                &session.options,
            )),
            Command::Define { decls, .. } => {
                for mut decl in decls {
                    let span = decl.span;
                    let root_tid = decl.tree.get(decl.root).type_id;
                    decl.tree.get_mut(decl.root).type_id =
                        root_tid - TypeId::TYPEDEF;
                    let name =
                        match decl.tree.get_mut(decl.root).name.take() {
                            Some(name) => name,
                            None => {
                                return fail(
                                    DeclError::Parse(
                                        "a type definition needs a name"
                                            .into(),
                                    ),
                                    span,
                                    source,
                                )
                            }
                        };
                    let result = session.typedefs.define(Typedef {
                        name,
                        tree: decl.tree,
                        root: decl.root,
                        langs: Lang::all(),
                        predefined: false,
                    });
                    if let Err(error) = result {
                        return fail(error, span, source);
                    }
                }
                None
            }
            Command::Show { what, flavor } => {
                let mut opts = session.options.clone();
                match flavor {
                    Some(DefineFlavor::Using) => opts.using = true,
                    Some(_) => opts.using = false,
                    None => {}
                }
                let entries = match what {
                    ShowWhat::All => session
                        .typedefs
                        .iter_filtered(ShowFilter::All, opts.lang),
                    ShowWhat::Predefined => session
                        .typedefs
                        .iter_filtered(ShowFilter::Predefined, opts.lang),
                    ShowWhat::User => session
                        .typedefs
                        .iter_filtered(ShowFilter::User, opts.lang),
                    ShowWhat::Name(name, span) => {
                        match session
                            .typedefs
                            .lookup_in(&name, opts.lang)
                        {
                            Some(def) => vec![def],
                            None => {
                                let error =
                                    unknown_typedef(&name, session);
                                return fail(error, span, source);
                            }
                        }
                    }
                };
                if entries.is_empty() {
                    None
                } else {
                    let lines: Vec<String> = entries
                        .iter()
                        .map(|def| gibberish::typedef_decl(def, &opts))
                        .collect();
                    Some(lines.join("\n"))
                }
            }
        };

        let warnings = if warnings.is_empty() {
            None
        } else {
            Some(WithSource::new(warnings, source))
        };
        Ok(Response {
            output,
            warnings,
            quit,
        })
    }
}

/// One line of `explain` output: `declare <name> as <english>`, or
/// `define <name> as <english>` when the declaration was a typedef.
fn explain_line(decl: &mut Declaration) -> String {
    let root_tid = decl.tree.get(decl.root).type_id;
    let is_typedef = root_tid.contains(TypeId::TYPEDEF);
    if is_typedef {
        decl.tree.get_mut(decl.root).type_id = root_tid - TypeId::TYPEDEF;
    }
    let phrase = english::english(&decl.tree, decl.root);
    let verb = if is_typedef { "define" } else { "declare" };
    match &decl.tree.get(decl.root).name {
        Some(name) => format!("{} {} as {}", verb, name, phrase),
        None => phrase,
    }
}

fn unknown_typedef(name: &ScopedName, session: &Session) -> DeclError {
    let known: Vec<String> = session.typedefs.names().collect();
    DeclError::UnknownName {
        suggestions: lookup::suggestions(
            &name.to_string(),
            known.iter().map(String::as_str),
        ),
    }
}

/// Locate a word of the source, for spans of `set` arguments.
fn word_span(source: &str, word: &str) -> SrcSpan {
    match source.find(word) {
        Some(offset) => SrcSpan {
            offset,
            length: word.len(),
            start_line: 1,
            start_col: offset + 1,
            end_line: 1,
            end_col: offset + 1 + word.len(),
        },
        None => SrcSpan::default(),
    }
}

fn help_text() -> String {
    [
        "commands:",
        "  declare <name> as <english>      compose a declaration",
        "  cast [<kind>] <name> into <english>",
        "  explain <gibberish>              translate a declaration",
        "  define <name> as <english>       define a type",
        "  typedef <gibberish>              define a type, C style",
        "  using <name> = <gibberish>       define a type, C++11 style",
        "  show <name>|all|predefined|user [typedef|using]",
        "  set [<option>|<language>]...     show or change options",
        "  help, ?                          this text",
        "  exit, quit",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(session: &mut Session, src: &str) -> String {
        translate(session, src)
            .unwrap_or_else(|e| panic!("`{}` failed: {}", src, e))
            .output
            .unwrap_or_default()
    }

    #[test]
    fn test_declare_pipeline() {
        let mut session = Session::new();
        assert_eq!(
            run(&mut session, "declare x as pointer to int"),
            "int *x;"
        );
    }

    #[test]
    fn test_explain_pipeline() {
        let mut session = Session::new();
        assert_eq!(
            run(&mut session, "explain int *x"),
            "declare x as pointer to int"
        );
    }

    #[test]
    fn test_set_then_declare() {
        let mut session = Session::new();
        assert_eq!(run(&mut session, "set noeast-const nosemicolon"), "");
        assert_eq!(
            run(&mut session, "declare p as pointer to const char"),
            "const char *p"
        );
    }

    #[test]
    fn test_define_and_show() {
        let mut session = Session::new();
        run(&mut session, "define word as unsigned int");
        assert_eq!(
            run(&mut session, "show word"),
            "typedef unsigned int word;"
        );
        // identical redefinition is fine, conflicting is not
        run(&mut session, "define word as unsigned int");
        let err = translate(&mut session, "define word as long")
            .unwrap_err();
        assert!(err.to_string().contains("already defined"));
    }

    #[test]
    fn test_errors_suppress_output() {
        let mut session = Session::new();
        session.options.lang = Lang::CPP_17;
        let err =
            translate(&mut session, "declare r as register int")
                .unwrap_err();
        assert!(err
            .to_string()
            .contains("\"register\" is not supported in C++17"));
    }

    #[test]
    fn test_warnings_do_not_suppress_output() {
        let mut session = Session::new();
        session.options.lang = Lang::C_89;
        let response =
            translate(&mut session, "explain register x").unwrap();
        assert_eq!(
            response.output.unwrap(),
            "declare x as register int"
        );
        let warnings = response.warnings.unwrap();
        assert!(warnings.to_string().contains("\"int\" is assumed"));
    }

    #[test]
    fn test_quit() {
        let mut session = Session::new();
        assert!(translate(&mut session, "quit").unwrap().quit);
        assert!(!translate(&mut session, "help").unwrap().quit);
    }

    #[test]
    fn test_predefined_typedefs_are_lang_gated() {
        let mut session = Session::new();
        // uint8_t exists in C99
        session.options.lang = Lang::C_99;
        assert_eq!(
            run(&mut session, "explain uint8_t x"),
            "declare x as uint8_t"
        );
        // but not in C89
        session.options.lang = Lang::C_89;
        let err = translate(&mut session, "explain uint8_t x");
        assert!(err.is_err());
    }
}
