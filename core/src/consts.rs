/// How deeply declarators and English phrases may nest. Parsing recurses
/// once per level, so this bounds stack use; real declarations never get
/// anywhere near it.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Every keyword either grammar recognizes, for "did you mean" suggestions
/// against unknown identifiers.
pub(crate) const KEYWORDS: &[&str] = &[
    // gibberish
    "alignas",
    "auto",
    "bool",
    "char",
    "char8_t",
    "char16_t",
    "char32_t",
    "class",
    "const",
    "consteval",
    "constexpr",
    "default",
    "delete",
    "double",
    "enum",
    "explicit",
    "extern",
    "final",
    "float",
    "friend",
    "inline",
    "int",
    "long",
    "mutable",
    "namespace",
    "noexcept",
    "operator",
    "override",
    "register",
    "restrict",
    "short",
    "signed",
    "static",
    "struct",
    "thread_local",
    "throw",
    "typedef",
    "union",
    "unsigned",
    "virtual",
    "void",
    "volatile",
    "wchar_t",
    "_Alignas",
    "_Atomic",
    "_Bool",
    "_Complex",
    "_Imaginary",
    "_Noreturn",
    "_Thread_local",
    // attributes
    "carries_dependency",
    "deprecated",
    "maybe_unused",
    "nodiscard",
    "noreturn",
    // english
    "array",
    "as",
    "bits",
    "block",
    "cast",
    "constant",
    "constructor",
    "conversion",
    "declare",
    "define",
    "destructor",
    "explain",
    "function",
    "into",
    "lambda",
    "length",
    "literal",
    "member",
    "non-member",
    "non-throwing",
    "of",
    "pointer",
    "pure",
    "reference",
    "returning",
    "rvalue",
    "show",
    "to",
    "type",
    "user-defined",
    "variable",
    "width",
];
