//! All error-related types. Every user-visible problem with a declaration is
//! a [DeclError]; the taxonomy distinguishes syntax, type-combination,
//! positional, language-version and semantic errors, plus warnings that do
//! not suppress output.

use crate::util::Span;
use failure::Fail;
use serde::Serialize;
use std::fmt::{self, Debug, Display, Formatter};

/// How bad a diagnostic is. Errors suppress the output of the declaration
/// that produced them; warnings do not.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

/// A trait for any error that originates in source code. [SourceError]s rely
/// on having source code present in order to display themselves.
pub trait SourceError: 'static + Send + Sync + Debug + Serialize {
    /// Format this error into a simple message. `spanned_src` is the slice of
    /// the source code that corresponds to this error's [Span]. This needs to
    /// be provided by the caller in order to create a proper error message.
    fn fmt_msg(&self, f: &mut Formatter<'_>, spanned_src: &str) -> fmt::Result;

    /// Whether this diagnostic is an error or just a warning.
    fn severity(&self) -> Severity {
        Severity::Error
    }
}

/// A problem with a declaration. These are user errors, _not_ internal
/// errors; bugs in the translator itself always cause a panic.
#[derive(Clone, Debug, Serialize)]
pub enum DeclError {
    /// Failed to parse the command at all
    Parse(String),
    /// An identifier appeared where a type or keyword was expected
    UnknownName { suggestions: Vec<String> },
    /// Two type tokens cannot appear in the same declaration
    TypeConflict { prev: String },
    /// The construct exists, but not in the current dialect
    NotSupported { what: String, lang: String, hint: Option<String> },
    /// Legal only on a member function
    MemberOnly { what: String },
    /// Legal only inside a class definition
    NonMemberOnly { what: String },
    /// Legal in general, but not on this kind of declaration
    IllegalForKind { what: String, kind: String },
    PointerToReference,
    ReferenceToReference,
    ArrayOfReference,
    ArrayOfFunction,
    FunctionReturningArray,
    FunctionReturningFunction,
    /// "..." somewhere other than the end of a parameter list
    VariadicNotLast,
    /// "..." as the only parameter
    VariadicAlone,
    BitFieldWidth,
    BitFieldKind,
    BitFieldStatic,
    /// Redefinition of a typedef with a different type
    TypedefRedefinition { name: String },
    /// Warning: C89-C17 accept a missing base type as int
    ImplicitInt,
    /// Warning: the construct still parses but the dialect deprecates it
    DeprecatedIn { what: String, lang: String },
    /// Warning: a calling convention in a position where it cannot apply
    IgnoredCallingConvention,
}

impl SourceError for DeclError {
    fn fmt_msg(&self, f: &mut Formatter<'_>, spanned_src: &str) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "syntax error: {}", msg),
            Self::UnknownName { suggestions } => {
                write!(f, "\"{}\" is unknown", spanned_src)?;
                if !suggestions.is_empty() {
                    write!(f, "; did you mean {}?", suggestions.join(", "))?;
                }
                Ok(())
            }
            Self::TypeConflict { prev } => write!(
                f,
                "\"{}\" and \"{}\" cannot be combined",
                prev, spanned_src
            ),
            Self::NotSupported { what, lang, hint } => {
                write!(f, "\"{}\" is not supported in {}", what, lang)?;
                if let Some(hint) = hint {
                    write!(f, " ({})", hint)?;
                }
                Ok(())
            }
            Self::MemberOnly { what } => write!(
                f,
                "\"{}\" is only legal for member functions",
                what
            ),
            Self::NonMemberOnly { what } => write!(
                f,
                "\"{}\" is only legal in a class definition",
                what
            ),
            Self::IllegalForKind { what, kind } => {
                write!(f, "\"{}\" is illegal for {}", what, kind)
            }
            Self::PointerToReference => {
                write!(f, "pointer to reference is illegal")
            }
            Self::ReferenceToReference => {
                write!(f, "reference to reference is illegal")
            }
            Self::ArrayOfReference => {
                write!(f, "array of reference is illegal")
            }
            Self::ArrayOfFunction => write!(
                f,
                "array of function is illegal; use array of pointer to \
                function"
            ),
            Self::FunctionReturningArray => write!(
                f,
                "function returning array is illegal; use function returning \
                pointer"
            ),
            Self::FunctionReturningFunction => write!(
                f,
                "function returning function is illegal; use function \
                returning pointer to function"
            ),
            Self::VariadicNotLast => {
                write!(f, "\"...\" must be the last parameter")
            }
            Self::VariadicAlone => {
                write!(f, "\"...\" cannot be the only parameter")
            }
            Self::BitFieldWidth => {
                write!(f, "bit-field width must be positive")
            }
            Self::BitFieldKind => {
                write!(f, "only integral types can be bit-fields")
            }
            Self::BitFieldStatic => {
                write!(f, "a static member cannot be a bit-field")
            }
            Self::TypedefRedefinition { name } => write!(
                f,
                "\"{}\" is already defined with a different type",
                name
            ),
            Self::ImplicitInt => {
                write!(f, "no type given; \"int\" is assumed")
            }
            Self::DeprecatedIn { what, lang } => {
                write!(f, "\"{}\" is deprecated in {}", what, lang)
            }
            Self::IgnoredCallingConvention => {
                write!(f, "\"{}\" has no effect here; ignored", spanned_src)
            }
        }
    }

    fn severity(&self) -> Severity {
        match self {
            Self::ImplicitInt
            | Self::DeprecatedIn { .. }
            | Self::IgnoredCallingConvention => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// A wrapper around a [SourceError], that holds some extra data:
/// - The [Span] of the source code that caused the error
/// - The offending chunk of source code itself
///
/// This type on its own can be formatted, without any external data.
#[derive(Debug, Fail, Serialize)]
pub struct SourceErrorWrapper<E: SourceError> {
    error: E,
    span: Span,
    spanned_source: String,
}

impl<E: SourceError> SourceErrorWrapper<E> {
    pub fn new(error: E, span: Span, src: &str) -> Self {
        Self {
            error,
            span,
            spanned_source: span.get_source_slice(src).into(),
        }
    }

    pub fn error(&self) -> &E {
        &self.error
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn severity(&self) -> Severity {
        self.error.severity()
    }
}

impl<E: SourceError> Display for SourceErrorWrapper<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.error.severity() == Severity::Warning {
            write!(f, "warning: ")?;
        }
        self.error.fmt_msg(f, &self.spanned_source)?;
        // Parse errors carry a zero-length span; everything else points at
        // its token
        if self.span.length > 0 {
            write!(
                f,
                " @ {}:{} to {}:{}",
                self.span.start_line,
                self.span.start_col,
                self.span.end_line,
                self.span.end_col,
            )?;
        }
        Ok(())
    }
}

/// A wrapper around a collection of errors. This holds the errors as well as
/// the source code, and can be used to render associated source code with
/// each error.
#[derive(Debug, Fail, Serialize)]
pub struct WithSource<E: SourceError> {
    errors: Vec<SourceErrorWrapper<E>>,
    #[serde(skip)]
    source: String,
}

impl<E: SourceError> WithSource<E> {
    /// Wrap a collection of errors with its source code.
    pub(crate) fn new(
        errors: impl IntoIterator<Item = SourceErrorWrapper<E>>,
        source: String,
    ) -> Self {
        Self {
            errors: errors.into_iter().collect(),
            source,
        }
    }

    /// Get a reference to the errors wrapped by this type.
    pub fn errors(&self) -> &[SourceErrorWrapper<E>] {
        &self.errors
    }

    /// Does this collection contain at least one hard error (as opposed to
    /// only warnings)?
    pub fn has_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.severity() == Severity::Error)
    }

    /// The source code that produced these errors.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl<E: SourceError> Display for WithSource<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // Write each error, separated by a newline
        for (i, error) in self.errors.iter().enumerate() {
            // Prefix with a newline for all errors but the first
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapper_display() {
        let span = Span {
            offset: 19,
            length: 4,
            start_line: 1,
            start_col: 20,
            end_line: 1,
            end_col: 24,
        };
        let src = "explain int short long x";
        let wrapped = SourceErrorWrapper::new(
            DeclError::TypeConflict {
                prev: "short".into(),
            },
            span,
            src,
        );
        assert_eq!(
            wrapped.to_string(),
            "\"short\" and \"long\" cannot be combined @ 1:20 to 1:24"
        );
    }

    #[test]
    fn test_warning_prefix() {
        let wrapped = SourceErrorWrapper::new(
            DeclError::ImplicitInt,
            Span::default(),
            "declare x as register",
        );
        assert_eq!(
            wrapped.to_string(),
            "warning: no type given; \"int\" is assumed"
        );
        assert_eq!(wrapped.severity(), Severity::Warning);
    }

    #[test]
    fn test_with_source_severity() {
        let src = "int f()()";
        let all_warnings = WithSource::new(
            vec![SourceErrorWrapper::new(
                DeclError::ImplicitInt,
                Span::default(),
                src,
            )],
            src.into(),
        );
        assert!(!all_warnings.has_errors());

        let mixed = WithSource::new(
            vec![
                SourceErrorWrapper::new(
                    DeclError::ImplicitInt,
                    Span::default(),
                    src,
                ),
                SourceErrorWrapper::new(
                    DeclError::FunctionReturningFunction,
                    Span::default(),
                    src,
                ),
            ],
            src.into(),
        );
        assert!(mixed.has_errors());
    }
}
