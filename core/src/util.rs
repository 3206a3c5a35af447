//! Small shared utilities: source spans and the debug tracing macro.

use serde::Serialize;

/// A region of one source command. Spans are attached to every AST node and
/// every diagnostic, so errors can point back at the exact token that caused
/// them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct Span {
    /// Byte offset of the start of the region
    pub offset: usize,
    /// Length of the region, in bytes
    pub length: usize,
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl Span {
    /// Slice out the piece of the source that this span covers. Returns an
    /// empty string for zero-length or out-of-range spans.
    pub fn get_source_slice<'a>(&self, src: &'a str) -> &'a str {
        let start = self.offset.min(src.len());
        let end = (self.offset + self.length).min(src.len());
        &src[start..end]
    }

    /// The smallest span that covers both `self` and `other`.
    pub fn merge(&self, other: &Span) -> Span {
        let (first, last) = if self.offset <= other.offset {
            (self, other)
        } else {
            (other, self)
        };
        Span {
            offset: first.offset,
            length: (last.offset + last.length).saturating_sub(first.offset),
            start_line: first.start_line,
            start_col: first.start_col,
            end_line: last.end_line,
            end_col: last.end_col,
        }
    }
}

/// Macro that can wrap any body, and only executes the body if we are running
/// in debug mode. Debug mode is enabled by setting the environment variable
/// DEBUG=true. This compiles away to nothing when --release is used.
///
/// Example:
/// ```
/// use cdecl::debug;
/// debug!(println!("Hello!"));
/// ```
#[macro_export]
macro_rules! debug {
    ($arg:expr) => {
        #[cfg(debug_assertions)]
        {
            if let Ok(debug_val) = std::env::var("DEBUG") {
                if debug_val.to_lowercase().as_str() == "true" {
                    $arg
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_slice() {
        let span = Span {
            offset: 4,
            length: 3,
            ..Span::default()
        };
        assert_eq!(span.get_source_slice("int foo bar"), "foo");
        // out-of-range spans degrade to empty instead of panicking
        let span = Span {
            offset: 100,
            length: 3,
            ..Span::default()
        };
        assert_eq!(span.get_source_slice("int"), "");
    }

    #[test]
    fn test_merge() {
        let a = Span {
            offset: 0,
            length: 3,
            start_line: 1,
            start_col: 1,
            end_line: 1,
            end_col: 4,
        };
        let b = Span {
            offset: 8,
            length: 2,
            start_line: 1,
            start_col: 9,
            end_line: 1,
            end_col: 11,
        };
        let merged = a.merge(&b);
        assert_eq!(merged.offset, 0);
        assert_eq!(merged.length, 10);
        assert_eq!(merged.end_col, 11);
        // merge is symmetric
        assert_eq!(b.merge(&a), merged);
    }
}
