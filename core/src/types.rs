//! The type algebra: a declaration's non-structural properties packed into a
//! 64-bit bitset. The bitset is partitioned into disjoint *sectors* (base
//! type, storage class, storage-class-like, attributes, qualifiers,
//! ref-qualifiers) so that a sector mask extracts exactly one kind of
//! information. Merging two partial types is a bitwise OR plus a handful of
//! legality rules ("long long" promotion, one storage class, and so on).

use crate::{error::DeclError, lang::Lang};
use bitflags::bitflags;

bitflags! {
    /// One 64-bit type identifier. Single bits are tokens; the `*_MASK`
    /// values carve the word into sectors.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct TypeId: u64 {
        // Base types (bits 0-27)
        const VOID = 1 << 0;
        /// The C++11 type placeholder, not the C storage class
        const AUTO_TYPE = 1 << 1;
        const BOOL = 1 << 2;
        const CHAR = 1 << 3;
        const CHAR8_T = 1 << 4;
        const CHAR16_T = 1 << 5;
        const CHAR32_T = 1 << 6;
        const WCHAR_T = 1 << 7;
        const SHORT = 1 << 8;
        const INT = 1 << 9;
        const LONG = 1 << 10;
        const LONG_LONG = 1 << 11;
        const SIGNED = 1 << 12;
        const UNSIGNED = 1 << 13;
        const FLOAT = 1 << 14;
        const DOUBLE = 1 << 15;
        const COMPLEX = 1 << 16;
        const IMAGINARY = 1 << 17;
        const ENUM = 1 << 18;
        const STRUCT = 1 << 19;
        const UNION = 1 << 20;
        const CLASS = 1 << 21;
        const NAMESPACE = 1 << 22;
        /// Scope-resolution placeholder for partially-known scoped names
        const SCOPE = 1 << 23;
        /// This type is a reference to a registered typedef
        const TYPEDEF_TYPE = 1 << 24;

        // Storage classes (bits 28-35)
        /// The C storage class, not the C++11 placeholder
        const AUTO_STORAGE = 1 << 28;
        /// Apple's `__block` storage
        const APPLE_BLOCK = 1 << 29;
        const EXTERN = 1 << 30;
        const MUTABLE = 1 << 31;
        const REGISTER = 1 << 32;
        const STATIC = 1 << 33;
        const THREAD_LOCAL = 1 << 34;
        const TYPEDEF = 1 << 35;

        // Storage-class-like (bits 36-48)
        const CONSTEVAL = 1 << 36;
        const CONSTEXPR = 1 << 37;
        const DEFAULT = 1 << 38;
        const DELETE = 1 << 39;
        const EXPLICIT = 1 << 40;
        const FINAL = 1 << 41;
        const FRIEND = 1 << 42;
        const INLINE = 1 << 43;
        const NOEXCEPT = 1 << 44;
        const OVERRIDE = 1 << 45;
        const PURE_VIRTUAL = 1 << 46;
        const THROW = 1 << 47;
        const VIRTUAL = 1 << 48;

        // Attributes (bits 49-53)
        const CARRIES_DEPENDENCY = 1 << 49;
        const DEPRECATED = 1 << 50;
        const MAYBE_UNUSED = 1 << 51;
        const NODISCARD = 1 << 52;
        const NORETURN = 1 << 53;

        // Qualifiers (bits 56-59)
        const ATOMIC = 1 << 56;
        const CONST = 1 << 57;
        const RESTRICT = 1 << 58;
        const VOLATILE = 1 << 59;

        // Ref-qualifiers (bits 60-63)
        const REF = 1 << 60;
        const RVALUE_REF = 1 << 61;

        // Sector masks
        const BASE_MASK = 0x0fff_ffff;
        const STORAGE_MASK = 0xff << 28;
        const STORAGE_LIKE_MASK = 0x1fff << 36;
        const ATTR_MASK = 0x1f << 49;
        const QUAL_MASK = 0xf << 56;
        const REF_MASK = 0xf << 60;

        // Useful unions
        const ECSU_MASK = Self::ENUM.bits()
            | Self::STRUCT.bits()
            | Self::UNION.bits()
            | Self::CLASS.bits();
        const INTEGRAL_MASK = Self::BOOL.bits()
            | Self::CHAR.bits()
            | Self::CHAR8_T.bits()
            | Self::CHAR16_T.bits()
            | Self::CHAR32_T.bits()
            | Self::WCHAR_T.bits()
            | Self::SHORT.bits()
            | Self::INT.bits()
            | Self::LONG.bits()
            | Self::LONG_LONG.bits()
            | Self::SIGNED.bits()
            | Self::UNSIGNED.bits();
    }
}

impl Default for TypeId {
    fn default() -> Self {
        TypeId::empty()
    }
}

/// Every single-bit flag with its gibberish token and English alias, in
/// canonical print order: storage, storage-like, attributes, qualifiers,
/// base, then the function-tail bits that never lead a declaration.
const TOKENS: &[(TypeId, &str, &str)] = &[
    (TypeId::AUTO_STORAGE, "auto", "auto"),
    (TypeId::APPLE_BLOCK, "__block", "__block"),
    (TypeId::EXTERN, "extern", "extern"),
    (TypeId::MUTABLE, "mutable", "mutable"),
    (TypeId::REGISTER, "register", "register"),
    (TypeId::STATIC, "static", "static"),
    (TypeId::THREAD_LOCAL, "thread_local", "thread_local"),
    (TypeId::TYPEDEF, "typedef", "typedef"),
    (TypeId::CONSTEVAL, "consteval", "consteval"),
    (TypeId::CONSTEXPR, "constexpr", "constexpr"),
    (TypeId::EXPLICIT, "explicit", "explicit"),
    (TypeId::FRIEND, "friend", "friend"),
    (TypeId::INLINE, "inline", "inline"),
    (TypeId::VIRTUAL, "virtual", "virtual"),
    (
        TypeId::CARRIES_DEPENDENCY,
        "carries_dependency",
        "carries-dependency",
    ),
    (TypeId::DEPRECATED, "deprecated", "deprecated"),
    (TypeId::MAYBE_UNUSED, "maybe_unused", "maybe-unused"),
    (TypeId::NODISCARD, "nodiscard", "non-discardable"),
    (TypeId::NORETURN, "noreturn", "non-returning"),
    (TypeId::ATOMIC, "_Atomic", "atomic"),
    (TypeId::CONST, "const", "const"),
    (TypeId::RESTRICT, "restrict", "restrict"),
    (TypeId::VOLATILE, "volatile", "volatile"),
    (TypeId::UNSIGNED, "unsigned", "unsigned"),
    (TypeId::SIGNED, "signed", "signed"),
    (TypeId::SHORT, "short", "short"),
    (TypeId::LONG, "long", "long"),
    (TypeId::LONG_LONG, "long long", "long long"),
    (TypeId::VOID, "void", "void"),
    (TypeId::AUTO_TYPE, "auto", "auto"),
    (TypeId::BOOL, "bool", "bool"),
    (TypeId::CHAR, "char", "char"),
    (TypeId::CHAR8_T, "char8_t", "char8_t"),
    (TypeId::CHAR16_T, "char16_t", "char16_t"),
    (TypeId::CHAR32_T, "char32_t", "char32_t"),
    (TypeId::WCHAR_T, "wchar_t", "wchar_t"),
    (TypeId::INT, "int", "int"),
    (TypeId::FLOAT, "float", "float"),
    (TypeId::DOUBLE, "double", "double"),
    (TypeId::COMPLEX, "_Complex", "complex"),
    (TypeId::IMAGINARY, "_Imaginary", "imaginary"),
    (TypeId::ENUM, "enum", "enum"),
    (TypeId::STRUCT, "struct", "struct"),
    (TypeId::UNION, "union", "union"),
    (TypeId::CLASS, "class", "class"),
    (TypeId::NAMESPACE, "namespace", "namespace"),
    (TypeId::SCOPE, "::", "::"),
    (TypeId::TYPEDEF_TYPE, "typedef-type", "typedef-type"),
    (TypeId::NOEXCEPT, "noexcept", "non-throwing"),
    (TypeId::THROW, "throw()", "non-throwing (dynamic)"),
    (TypeId::OVERRIDE, "override", "override"),
    (TypeId::FINAL, "final", "final"),
    (TypeId::PURE_VIRTUAL, "= 0", "pure virtual"),
    (TypeId::DEFAULT, "= default", "defaulted"),
    (TypeId::DELETE, "= delete", "deleted"),
    (TypeId::REF, "&", "reference"),
    (TypeId::RVALUE_REF, "&&", "rvalue reference"),
];

impl TypeId {
    /// The gibberish token for a single-bit flag.
    pub fn token(self) -> &'static str {
        TOKENS
            .iter()
            .find(|(bit, _, _)| *bit == self)
            .map(|(_, token, _)| *token)
            .unwrap_or("?")
    }

    /// The English alias for a single-bit flag, used when an error message
    /// crosses the gibberish/English boundary.
    pub fn token_for_error(self) -> &'static str {
        TOKENS
            .iter()
            .find(|(bit, _, _)| *bit == self)
            .map(|(_, _, english)| *english)
            .unwrap_or("?")
    }

    /// Decompose into single-bit flags, in canonical print order.
    pub fn split(self) -> impl Iterator<Item = TypeId> {
        TOKENS
            .iter()
            .map(|(bit, _, _)| *bit)
            .filter(move |bit| self.contains(*bit))
    }

    pub fn base(self) -> TypeId {
        self & Self::BASE_MASK
    }

    pub fn storage(self) -> TypeId {
        self & Self::STORAGE_MASK
    }

    pub fn storage_like(self) -> TypeId {
        self & Self::STORAGE_LIKE_MASK
    }

    pub fn attrs(self) -> TypeId {
        self & Self::ATTR_MASK
    }

    pub fn quals(self) -> TypeId {
        self & Self::QUAL_MASK
    }

    pub fn ref_quals(self) -> TypeId {
        self & Self::REF_MASK
    }

    /// Is the base sector a (non-empty) integral type?
    pub fn is_integral(self) -> bool {
        let base = self.base();
        !base.is_empty() && Self::INTEGRAL_MASK.contains(base)
    }

    /// The set of dialects in which every bit of this type is legal.
    pub fn langs(self) -> Lang {
        self.split()
            .fold(Lang::all(), |acc, bit| acc & bit_langs(bit))
    }

    /// Canonical listing of the tokens in this type, print order.
    pub fn name(self) -> String {
        let tokens: Vec<&str> = self.split().map(TypeId::token).collect();
        tokens.join(" ")
    }

    /// Like [name], but substituting English aliases.
    pub fn name_for_error(self) -> String {
        let tokens: Vec<&str> =
            self.split().map(TypeId::token_for_error).collect();
        tokens.join(" ")
    }
}

/// Which other base-type bits a given base-type bit may legally share a
/// declaration with. Checked in both directions by [add].
fn base_compat(bit: TypeId) -> TypeId {
    let signs = TypeId::SIGNED | TypeId::UNSIGNED;
    let sizes = TypeId::SHORT | TypeId::LONG | TypeId::LONG_LONG;
    if bit == TypeId::CHAR {
        signs
    } else if bit == TypeId::SHORT {
        TypeId::INT | signs
    } else if bit == TypeId::INT {
        sizes | signs
    } else if bit == TypeId::LONG {
        TypeId::INT
            | signs
            | TypeId::DOUBLE
            | TypeId::COMPLEX
            | TypeId::IMAGINARY
    } else if bit == TypeId::LONG_LONG {
        TypeId::INT | signs
    } else if bit == TypeId::SIGNED || bit == TypeId::UNSIGNED {
        TypeId::CHAR | TypeId::INT | sizes
    } else if bit == TypeId::FLOAT {
        TypeId::COMPLEX | TypeId::IMAGINARY
    } else if bit == TypeId::DOUBLE {
        TypeId::LONG | TypeId::COMPLEX | TypeId::IMAGINARY
    } else if bit == TypeId::COMPLEX || bit == TypeId::IMAGINARY {
        TypeId::FLOAT | TypeId::DOUBLE | TypeId::LONG
    } else {
        TypeId::empty()
    }
}

/// Merge `new` (typically a single token's worth of bits) into `dest`.
/// Applies the promotion and conflict rules of the algebra; on conflict the
/// returned error names the *previous* token, and the caller supplies the
/// span of the new one.
pub fn add(dest: &mut TypeId, new: TypeId) -> Result<(), DeclError> {
    let conflict = |prev: TypeId| {
        Err(DeclError::TypeConflict {
            prev: prev.token().into(),
        })
    };

    let new_base = new.base();
    if !new_base.is_empty() {
        if new_base == TypeId::LONG && dest.contains(TypeId::LONG) {
            // "long long"; a third "long" will find LONG_LONG and conflict
            dest.remove(TypeId::LONG);
            dest.insert(TypeId::LONG_LONG);
        } else {
            if dest.contains(new_base) {
                return conflict(new_base);
            }
            let allowed = base_compat(new_base);
            for prev in dest.base().split() {
                if !allowed.contains(prev) {
                    return conflict(prev);
                }
            }
            dest.insert(new_base);
        }
    }

    let new_storage = new.storage();
    if !new_storage.is_empty() {
        let prev_storage = dest.storage();
        if !prev_storage.is_empty() && prev_storage != new_storage {
            return conflict(prev_storage);
        }
        dest.insert(new_storage);
    }

    // The remaining sectors combine freely; position legality is the
    // checker's job
    dest.insert(
        new.storage_like() | new.attrs() | new.quals() | new.ref_quals(),
    );
    Ok(())
}

/// The set of dialects that accept one single-bit flag.
pub fn bit_langs(bit: TypeId) -> Lang {
    let c89 = Lang::c_min(Lang::C_89);
    let cpp11 = Lang::cpp_min(Lang::CPP_11);
    if bit == TypeId::VOID
        || bit == TypeId::SIGNED
        || bit == TypeId::ENUM
        || bit == TypeId::CONST
        || bit == TypeId::VOLATILE
    {
        c89 | Lang::CPP_ALL
    } else if bit == TypeId::AUTO_TYPE || bit == TypeId::CONSTEXPR {
        cpp11 | Lang::c_min(Lang::C_23)
    } else if bit == TypeId::BOOL || bit == TypeId::INLINE {
        Lang::c_min(Lang::C_99) | Lang::CPP_ALL
    } else if bit == TypeId::CHAR8_T {
        Lang::cpp_min(Lang::CPP_20) | Lang::c_min(Lang::C_23)
    } else if bit == TypeId::CHAR16_T
        || bit == TypeId::CHAR32_T
        || bit == TypeId::THREAD_LOCAL
        || bit == TypeId::NORETURN
    {
        Lang::c_min(Lang::C_11) | cpp11
    } else if bit == TypeId::WCHAR_T {
        Lang::c_min(Lang::C_95) | Lang::CPP_ALL
    } else if bit == TypeId::LONG_LONG {
        Lang::c_min(Lang::C_99) | cpp11
    } else if bit == TypeId::COMPLEX || bit == TypeId::IMAGINARY {
        Lang::c_min(Lang::C_99)
    } else if bit == TypeId::CLASS
        || bit == TypeId::NAMESPACE
        || bit == TypeId::SCOPE
        || bit == TypeId::MUTABLE
        || bit == TypeId::EXPLICIT
        || bit == TypeId::FRIEND
        || bit == TypeId::PURE_VIRTUAL
        || bit == TypeId::VIRTUAL
        || bit == TypeId::REF
    {
        Lang::CPP_ALL
    } else if bit == TypeId::AUTO_STORAGE {
        Lang::C_ALL | Lang::CPP_98 | Lang::CPP_03
    } else if bit == TypeId::REGISTER {
        Lang::C_ALL | (Lang::CPP_ALL & !Lang::cpp_min(Lang::CPP_17))
    } else if bit == TypeId::CONSTEVAL {
        Lang::cpp_min(Lang::CPP_20)
    } else if bit == TypeId::DEFAULT
        || bit == TypeId::DELETE
        || bit == TypeId::FINAL
        || bit == TypeId::OVERRIDE
        || bit == TypeId::NOEXCEPT
        || bit == TypeId::RVALUE_REF
        || bit == TypeId::CARRIES_DEPENDENCY
    {
        cpp11
    } else if bit == TypeId::THROW {
        Lang::CPP_ALL & !Lang::cpp_min(Lang::CPP_20)
    } else if bit == TypeId::DEPRECATED {
        Lang::cpp_min(Lang::CPP_14) | Lang::c_min(Lang::C_23)
    } else if bit == TypeId::MAYBE_UNUSED || bit == TypeId::NODISCARD {
        Lang::cpp_min(Lang::CPP_17) | Lang::c_min(Lang::C_23)
    } else if bit == TypeId::ATOMIC {
        Lang::c_min(Lang::C_11)
    } else if bit == TypeId::RESTRICT {
        Lang::c_min(Lang::C_99)
    } else {
        // char, int, struct, static, extern, typedef, ...
        Lang::all()
    }
}

/// Dialects in which a flag still parses but is deprecated.
pub fn bit_deprecated_in(bit: TypeId) -> Lang {
    if bit == TypeId::THROW {
        Lang::CPP_11 | Lang::CPP_14 | Lang::CPP_17
    } else if bit == TypeId::REGISTER {
        Lang::CPP_11 | Lang::CPP_14
    } else {
        Lang::empty()
    }
}
