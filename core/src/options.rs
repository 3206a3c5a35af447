//! Session options: the flags the printers and checker consult, and the
//! `set` command that flips them. Options deserialize from a plain JSON
//! object so a host can load a saved configuration.

use crate::{error::DeclError, lang::Lang, lookup};
use serde::{Deserialize, Serialize};

/// Digraph/trigraph output mode.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Graphs {
    None,
    Di,
    Tri,
}

impl Default for Graphs {
    fn default() -> Self {
        Graphs::None
    }
}

/// Every option a session carries. The printers and checker read these;
/// only the `set` command (or a host loading a config) writes them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// The active dialect; always a single bit
    pub lang: Lang,
    /// Substitute ISO 646 alternative tokens (`bitand` for `&`) on output
    pub alt_tokens: bool,
    pub graphs: Graphs,
    /// Print qualifiers after the base type: `int const` not `const int`
    pub east_const: bool,
    /// Print `int` even where it is implied: `unsigned int` not `unsigned`
    pub explicit_int: bool,
    /// Print `struct`/`class`/... keywords even where C++ lets them go
    pub explicit_ecsu: bool,
    /// Terminate printed declarations with `;`
    pub semicolon: bool,
    /// Print typedefs in C++11 `using` form where the dialect allows
    pub using: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            lang: Lang::DEFAULT,
            alt_tokens: false,
            graphs: Graphs::None,
            // qualifiers print after the base type unless turned off
            east_const: true,
            explicit_int: false,
            explicit_ecsu: false,
            semicolon: true,
            using: true,
        }
    }
}

/// Boolean option names, shared by `set` and its suggestions.
const BOOL_OPTIONS: &[&str] = &[
    "alt-tokens",
    "east-const",
    "explicit-int",
    "explicit-ecsu",
    "semicolon",
    "using",
];

const OTHER_OPTIONS: &[&str] =
    &["digraphs", "trigraphs", "graphs", "options", "lang", "language"];

impl Options {
    /// Apply one `set` argument: an option name, possibly with a `no`
    /// prefix or an `=value` suffix, or a dialect name as shorthand for
    /// `lang=<dialect>`.
    pub fn set(&mut self, arg: &str) -> Result<(), DeclError> {
        let (name, value) = match arg.find('=') {
            Some(i) => (&arg[..i], Some(&arg[i + 1..])),
            None => (arg, None),
        };

        if name == "lang" || name == "language" {
            let value = value.unwrap_or("");
            return match Lang::from_alias(value) {
                Some(lang) => {
                    self.lang = lang;
                    Ok(())
                }
                None => Err(self.unknown(value)),
            };
        }

        // A bare dialect name works too: `set c++17`
        if let Some(lang) = Lang::from_alias(name) {
            self.lang = lang;
            return Ok(());
        }

        let (name, on) = match name.strip_prefix("no") {
            // "nographs" is its own option, not a negation of "graphs"
            Some(rest) if rest != "graphs" => (rest, false),
            _ => (name, true),
        };
        match name {
            "alt-tokens" => self.alt_tokens = on,
            "east-const" => self.east_const = on,
            "explicit-int" => self.explicit_int = on,
            "explicit-ecsu" => self.explicit_ecsu = on,
            "semicolon" => self.semicolon = on,
            "using" => self.using = on,
            "digraphs" => {
                self.graphs = if on { Graphs::Di } else { Graphs::None }
            }
            "trigraphs" => {
                self.graphs = if on { Graphs::Tri } else { Graphs::None }
            }
            "nographs" => self.graphs = Graphs::None,
            _ => return Err(self.unknown(name)),
        }
        Ok(())
    }

    fn unknown(&self, name: &str) -> DeclError {
        let candidates = BOOL_OPTIONS
            .iter()
            .chain(OTHER_OPTIONS)
            .copied()
            .chain(Lang::all_names());
        DeclError::UnknownName {
            suggestions: lookup::suggestions(name, candidates),
        }
    }

    /// Render the current settings, one per line, the way `set` with no
    /// arguments reports them.
    pub fn summary(&self) -> String {
        let flag = |on: bool, name: &str| {
            if on {
                format!("  {}", name)
            } else {
                format!("  no{}", name)
            }
        };
        let mut lines = vec![
            format!("  lang={}", self.lang),
            flag(self.alt_tokens, "alt-tokens"),
            match self.graphs {
                Graphs::None => "  nographs".into(),
                Graphs::Di => "  digraphs".into(),
                Graphs::Tri => "  trigraphs".into(),
            },
            flag(self.east_const, "east-const"),
            flag(self.explicit_int, "explicit-int"),
            flag(self.explicit_ecsu, "explicit-ecsu"),
            flag(self.semicolon, "semicolon"),
            flag(self.using, "using"),
        ];
        lines.push(String::new());
        lines.join("\n")
    }
}
