//! The typedef registry: a session-wide mapping from scoped name to a
//! defined type. Seeded with the standard library's well-known names at
//! session startup, extended by the user's `typedef`/`using`/`define`
//! commands, dropped with the session. Entries are immutable once inserted.

use crate::{
    ast::{NodeId, ScopedName, SyntaxTree},
    error::DeclError,
    lang::Lang,
};
use std::collections::HashMap;
use std::rc::Rc;

/// One registered typedef. The entry owns its own [SyntaxTree]; AST nodes in
/// other trees refer to it through an `Rc`.
#[derive(Clone, Debug, PartialEq)]
pub struct Typedef {
    pub name: ScopedName,
    pub tree: SyntaxTree,
    pub root: NodeId,
    /// The dialects in which this name is defined at all
    pub langs: Lang,
    /// Came from the built-in table rather than a user command
    pub predefined: bool,
}

/// Which entries a [TypedefRegistry] iteration should yield.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ShowFilter {
    All,
    Predefined,
    User,
}

#[derive(Debug, Default)]
pub struct TypedefRegistry {
    map: HashMap<ScopedName, Rc<Typedef>>,
}

impl TypedefRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typedef. Redefinition with a structurally identical type
    /// is a no-op; redefinition with a different type is an error.
    pub fn define(&mut self, def: Typedef) -> Result<(), DeclError> {
        if let Some(existing) = self.map.get(&def.name) {
            return if existing
                .tree
                .structurally_eq(existing.root, &def.tree, def.root)
            {
                Ok(())
            } else {
                Err(DeclError::TypedefRedefinition {
                    name: def.name.to_string(),
                })
            };
        }
        self.map.insert(def.name.clone(), Rc::new(def));
        Ok(())
    }

    pub fn lookup(&self, name: &ScopedName) -> Option<Rc<Typedef>> {
        self.map.get(name).cloned()
    }

    /// Look up a name, but only if it is defined in `lang`.
    pub fn lookup_in(
        &self,
        name: &ScopedName,
        lang: Lang,
    ) -> Option<Rc<Typedef>> {
        self.lookup(name).filter(|def| def.langs.contains(lang))
    }

    /// All entries passing `filter` that exist in `lang`, sorted by name so
    /// `show` output is deterministic.
    pub fn iter_filtered(
        &self,
        filter: ShowFilter,
        lang: Lang,
    ) -> Vec<Rc<Typedef>> {
        let mut entries: Vec<Rc<Typedef>> = self
            .map
            .values()
            .filter(|def| match filter {
                ShowFilter::All => true,
                ShowFilter::Predefined => def.predefined,
                ShowFilter::User => !def.predefined,
            })
            .filter(|def| def.langs.contains(lang))
            .cloned()
            .collect();
        entries.sort_by_key(|def| def.name.to_string());
        entries
    }

    /// Every registered name, for did-you-mean suggestions.
    pub fn names(&self) -> impl Iterator<Item = String> + '_ {
        self.map.keys().map(ScopedName::to_string)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// The built-in typedef table: ordinary `typedef` commands replayed through
/// the parser when a session starts, plus the dialect set that defines each
/// name. Keeping these as source text means the predefined names exercise
/// exactly the same path as user definitions.
pub(crate) fn predefined() -> Vec<(&'static str, Lang)> {
    let c89 = Lang::c_min(Lang::C_89) | Lang::CPP_ALL;
    let c95 = Lang::c_min(Lang::C_95) | Lang::CPP_ALL;
    let c99 = Lang::c_min(Lang::C_99) | Lang::cpp_min(Lang::CPP_11);
    let c11 = Lang::c_min(Lang::C_11) | Lang::cpp_min(Lang::CPP_11);
    let cpp = Lang::CPP_ALL;
    let posix = Lang::all();

    vec![
        ("typedef unsigned long size_t", c89),
        ("typedef long ptrdiff_t", c89),
        ("typedef long time_t", c89),
        ("typedef long clock_t", c89),
        ("typedef int sig_atomic_t", c89),
        ("typedef struct FILE FILE", c89),
        ("typedef struct __va_list va_list", c89),
        ("typedef unsigned int wint_t", c95),
        ("typedef unsigned long wctype_t", c95),
        ("typedef signed char int8_t", c99),
        ("typedef short int16_t", c99),
        ("typedef int int32_t", c99),
        ("typedef long long int64_t", c99),
        ("typedef unsigned char uint8_t", c99),
        ("typedef unsigned short uint16_t", c99),
        ("typedef unsigned int uint32_t", c99),
        ("typedef unsigned long long uint64_t", c99),
        ("typedef long intptr_t", c99),
        ("typedef unsigned long uintptr_t", c99),
        ("typedef long long intmax_t", c99),
        ("typedef unsigned long long uintmax_t", c99),
        ("typedef long double max_align_t", c11),
        ("typedef long ssize_t", posix),
        ("typedef unsigned long std::size_t", cpp),
        ("typedef long std::ptrdiff_t", cpp),
        ("typedef class std::basic_string std::string", cpp),
    ]
}
