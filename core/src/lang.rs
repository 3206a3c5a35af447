//! Language dialects. Every dialect is one bit, so a `Lang` value doubles as
//! a *set* of dialects: the active dialect is a single-bit value, while
//! per-feature legality is a mask of every dialect that accepts the feature.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

bitflags! {
    /// A set of C/C++ dialects. The C family occupies the low byte and the
    /// C++ family the high byte, each in chronological order, which is what
    /// makes the "this version or later" masks cheap to compute.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Lang: u16 {
        const C_KNR = 1 << 0;
        const C_89 = 1 << 1;
        const C_95 = 1 << 2;
        const C_99 = 1 << 3;
        const C_11 = 1 << 4;
        const C_17 = 1 << 5;
        const C_23 = 1 << 6;
        const CPP_98 = 1 << 8;
        const CPP_03 = 1 << 9;
        const CPP_11 = 1 << 10;
        const CPP_14 = 1 << 11;
        const CPP_17 = 1 << 12;
        const CPP_20 = 1 << 13;
        const CPP_23 = 1 << 14;

        const C_ALL = 0x007f;
        const CPP_ALL = 0x7f00;
    }
}

/// Display names, lowest bit first.
const NAMES: &[(Lang, &str)] = &[
    (Lang::C_KNR, "K&R C"),
    (Lang::C_89, "C89"),
    (Lang::C_95, "C95"),
    (Lang::C_99, "C99"),
    (Lang::C_11, "C11"),
    (Lang::C_17, "C17"),
    (Lang::C_23, "C23"),
    (Lang::CPP_98, "C++98"),
    (Lang::CPP_03, "C++03"),
    (Lang::CPP_11, "C++11"),
    (Lang::CPP_14, "C++14"),
    (Lang::CPP_17, "C++17"),
    (Lang::CPP_20, "C++20"),
    (Lang::CPP_23, "C++23"),
];

impl Lang {
    /// The dialect a fresh session starts in.
    pub const DEFAULT: Lang = Lang::C_23;

    /// Is this (single-bit) dialect in the C family?
    pub fn is_c(self) -> bool {
        Lang::C_ALL.contains(self)
    }

    /// Is this (single-bit) dialect in the C++ family?
    pub fn is_cpp(self) -> bool {
        Lang::CPP_ALL.contains(self)
    }

    /// All dialects of the same family at or after this (single-bit) one.
    pub fn and_later(self) -> Lang {
        let family = if self.is_cpp() {
            Lang::CPP_ALL
        } else {
            Lang::C_ALL
        };
        Lang::from_bits_truncate(!(self.bits() - 1)) & family
    }

    /// C dialects from `v` on. `v` must be a single C bit.
    pub fn c_min(v: Lang) -> Lang {
        v.and_later()
    }

    /// C++ dialects from `v` on. `v` must be a single C++ bit.
    pub fn cpp_min(v: Lang) -> Lang {
        v.and_later()
    }

    /// The earliest dialect in this set, if any.
    pub fn lowest(self) -> Option<Lang> {
        if self.is_empty() {
            None
        } else {
            Some(Lang::from_bits_truncate(
                1u16 << self.bits().trailing_zeros(),
            ))
        }
    }

    /// Look up a dialect by the name a user would type at `set`. Accepts the
    /// common aliases (`c90`, `c18`, `c2x`, `k&r`, bare `c`/`c++`).
    pub fn from_alias(name: &str) -> Option<Lang> {
        let lower = name.to_lowercase();
        Some(match lower.as_str() {
            "knr" | "k&r" | "k&rc" | "knrc" => Lang::C_KNR,
            "c89" | "c90" => Lang::C_89,
            "c95" => Lang::C_95,
            "c99" => Lang::C_99,
            "c11" => Lang::C_11,
            "c17" | "c18" => Lang::C_17,
            "c23" | "c2x" => Lang::C_23,
            "c" => Lang::C_23,
            "c++98" | "cpp98" => Lang::CPP_98,
            "c++03" | "cpp03" => Lang::CPP_03,
            "c++11" | "cpp11" => Lang::CPP_11,
            "c++14" | "cpp14" => Lang::CPP_14,
            "c++17" | "cpp17" => Lang::CPP_17,
            "c++20" | "cpp20" => Lang::CPP_20,
            "c++23" | "cpp23" => Lang::CPP_23,
            "c++" | "cpp" => Lang::CPP_23,
            _ => return None,
        })
    }

    /// Every name `from_alias` accepts, for did-you-mean suggestions.
    pub fn all_names() -> impl Iterator<Item = &'static str> {
        const SET_NAMES: &[&str] = &[
            "knr", "c89", "c90", "c95", "c99", "c11", "c17", "c23", "c++98",
            "c++03", "c++11", "c++14", "c++17", "c++20", "c++23",
        ];
        SET_NAMES.iter().copied()
    }

    /// A hint explaining how to get a feature that `current` lacks, given the
    /// set of dialects that allow it. Returns `None` when the feature simply
    /// no longer exists in `current`'s family (e.g. `register` in C++17).
    pub fn requirement_hint(allowed: Lang, current: Lang) -> Option<String> {
        let same_family = if current.is_cpp() {
            allowed & Lang::CPP_ALL
        } else {
            allowed & Lang::C_ALL
        };
        let later = same_family & current.and_later();
        if let Some(first) = later.lowest() {
            return Some(format!("requires {} or later", first));
        }
        if !same_family.is_empty() {
            // The feature existed earlier in this family and was removed
            return None;
        }
        let other_family = allowed & !same_family;
        other_family
            .lowest()
            .map(|first| format!("requires {} or later", first))
    }
}

impl Default for Lang {
    fn default() -> Self {
        Lang::DEFAULT
    }
}

impl Display for Lang {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (bit, name) in NAMES {
            if *self == *bit {
                return write!(f, "{}", name);
            }
        }
        // A multi-bit set; list the members
        let mut first = true;
        for (bit, name) in NAMES {
            if self.contains(*bit) {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_families_are_disjoint() {
        assert_eq!(Lang::C_ALL & Lang::CPP_ALL, Lang::empty());
        assert_eq!(Lang::C_ALL | Lang::CPP_ALL, Lang::all());
    }

    #[test]
    fn test_and_later() {
        assert_eq!(
            Lang::c_min(Lang::C_99),
            Lang::C_99 | Lang::C_11 | Lang::C_17 | Lang::C_23
        );
        assert_eq!(
            Lang::cpp_min(Lang::CPP_20),
            Lang::CPP_20 | Lang::CPP_23
        );
        // and_later never leaks into the other family
        assert_eq!(Lang::c_min(Lang::C_KNR), Lang::C_ALL);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Lang::from_alias("C90"), Some(Lang::C_89));
        assert_eq!(Lang::from_alias("c++17"), Some(Lang::CPP_17));
        assert_eq!(Lang::from_alias("c2x"), Some(Lang::C_23));
        assert_eq!(Lang::from_alias("fortran"), None);
    }

    #[test]
    fn test_requirement_hint() {
        // bool-style feature: later in the same family
        let allowed = Lang::c_min(Lang::C_99) | Lang::CPP_ALL;
        assert_eq!(
            Lang::requirement_hint(allowed, Lang::C_89).as_deref(),
            Some("requires C99 or later")
        );
        // register in C++17: removed, no hint
        let allowed = Lang::C_ALL | Lang::cpp_min(Lang::CPP_98)
            & !Lang::cpp_min(Lang::CPP_17);
        assert_eq!(Lang::requirement_hint(allowed, Lang::CPP_17), None);
        // C-only feature seen from C++
        assert_eq!(
            Lang::requirement_hint(Lang::c_min(Lang::C_99), Lang::CPP_14)
                .as_deref(),
            Some("requires C99 or later")
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Lang::C_KNR.to_string(), "K&R C");
        assert_eq!(Lang::CPP_11.to_string(), "C++11");
        assert_eq!(
            (Lang::C_99 | Lang::C_11).to_string(),
            "C99, C11"
        );
    }
}
