//! The declaration checker: context-sensitive legality rules applied to a
//! completed AST under the active dialect. Every rule produces a diagnostic
//! rather than stopping, so one command can report all of its problems at
//! once; the caller decides whether errors suppress output.

use crate::{
    ast::{
        Alignment, ArraySize, AstKind, KindSet, NodeId, SyntaxTree,
    },
    builder::{untypedef, TypeRef},
    error::DeclError,
    lang::Lang,
    options::Options,
    parse::Declaration,
    types::{self, TypeId},
    util::Span,
};

/// Check one declaration. Implicit `int` is assigned where the dialect
/// permits it (mutating the tree), then every rule runs over the result.
/// Diagnostics come back in pre-order traversal order.
pub(crate) fn check(
    decl: &mut Declaration,
    opts: &Options,
) -> Vec<(DeclError, Span)> {
    let mut diags = vec![];
    assign_implicit_int(decl, opts, &mut diags);

    let member = match decl.member {
        Some(m) => m,
        None => {
            let root = decl.tree.get(decl.root);
            let scoped = root
                .name
                .as_ref()
                .map(|n| n.is_scoped())
                .unwrap_or(false);
            scoped
                || matches!(
                    root.kind,
                    AstKind::Constructor { .. }
                        | AstKind::Destructor
                        | AstKind::Conversion { .. }
                )
        }
    };

    let mut checker = Checker {
        tree: &decl.tree,
        opts,
        diags,
    };
    checker.node(
        decl.root,
        Ctx {
            member,
            decl_root: true,
        },
    );
    checker.diags
}

/// A missing base type means `int` in K&R C, an `int` with a warning
/// through C17, and an error from C23 / in C++. Untyped (K&R-style)
/// parameter names follow the same scheme.
fn assign_implicit_int(
    decl: &mut Declaration,
    opts: &Options,
    diags: &mut Vec<(DeclError, Span)>,
) {
    let mut empties = vec![];
    let mut untyped_names = vec![];
    collect_implicit(
        &decl.tree,
        decl.root,
        false,
        &mut empties,
        &mut untyped_names,
    );

    let lang = opts.lang;
    let warns = (Lang::c_min(Lang::C_89) & !Lang::c_min(Lang::C_23))
        .contains(lang);
    for id in empties {
        let span = decl.tree.get(id).span;
        if lang == Lang::C_KNR || warns {
            let tid = decl.tree.get(id).type_id;
            decl.tree.get_mut(id).type_id = tid | TypeId::INT;
            if warns {
                diags.push((DeclError::ImplicitInt, span));
            }
        } else {
            diags.push((
                DeclError::NotSupported {
                    what: "implicit int".into(),
                    lang: lang.to_string(),
                    hint: None,
                },
                span,
            ));
        }
    }
    for id in untyped_names {
        let span = decl.tree.get(id).span;
        if lang == Lang::C_KNR {
            continue;
        }
        if warns {
            diags.push((DeclError::ImplicitInt, span));
        } else {
            diags.push((
                DeclError::NotSupported {
                    what: "untyped parameter".into(),
                    lang: lang.to_string(),
                    hint: None,
                },
                span,
            ));
        }
    }
}

fn collect_implicit(
    tree: &SyntaxTree,
    id: NodeId,
    is_lambda_ret: bool,
    empties: &mut Vec<NodeId>,
    untyped_names: &mut Vec<NodeId>,
) {
    let node = tree.get(id);
    match &node.kind {
        AstKind::Builtin { .. } => {
            // a lambda with no "returning" clause legitimately has none
            if node.type_id.base().is_empty() && !is_lambda_ret {
                empties.push(id);
            }
        }
        AstKind::Name => untyped_names.push(id),
        _ => {}
    }
    let lambda_ret = match &node.kind {
        AstKind::Lambda { ret, .. } => Some(*ret),
        _ => None,
    };
    for child in tree.children(id) {
        collect_implicit(
            tree,
            child,
            lambda_ret == Some(child),
            empties,
            untyped_names,
        );
    }
}

#[derive(Copy, Clone)]
struct Ctx {
    /// This subtree declares (part of) a class member
    member: bool,
    /// Storage classes are legal here: the declaration root, or the root
    /// of a parameter
    decl_root: bool,
}

struct Checker<'a> {
    tree: &'a SyntaxTree,
    opts: &'a Options,
    diags: Vec<(DeclError, Span)>,
}

/// Dialects in which a node kind exists at all.
fn kind_langs(kind: KindSet) -> Lang {
    if KindSet::REFERENCE
        .union(KindSet::POINTER_TO_MEMBER)
        .union(KindSet::CONVERSION)
        .union(KindSet::OPERATOR)
        .union(KindSet::CONSTRUCTOR)
        .union(KindSet::DESTRUCTOR)
        .contains(kind)
    {
        Lang::CPP_ALL
    } else if KindSet::RVALUE_REFERENCE
        .union(KindSet::LAMBDA)
        .union(KindSet::USER_DEF_LITERAL)
        .contains(kind)
    {
        Lang::cpp_min(Lang::CPP_11)
    } else {
        Lang::all()
    }
}

impl<'a> Checker<'a> {
    fn lang(&self) -> Lang {
        self.opts.lang
    }

    fn report(&mut self, error: DeclError, span: Span) {
        self.diags.push((error, span));
    }

    fn not_supported(&mut self, what: impl Into<String>, allowed: Lang, span: Span) {
        let lang = self.lang();
        self.report(
            DeclError::NotSupported {
                what: what.into(),
                lang: lang.to_string(),
                hint: Lang::requirement_hint(allowed, lang),
            },
            span,
        );
    }

    /// The concrete kind of a child, looking through typedefs.
    fn concrete_kind(&self, id: NodeId) -> KindSet {
        untypedef(TypeRef::new(self.tree, id)).kind_set()
    }

    fn node(&mut self, id: NodeId, ctx: Ctx) {
        let node = self.tree.get(id);
        let kind = node.kind.kind_set();
        let tid = node.type_id;
        let span = node.span;

        // positional: storage classes only at declaration roots
        if !ctx.decl_root && !tid.storage().is_empty() {
            for bit in tid.storage().split() {
                self.report(
                    DeclError::IllegalForKind {
                        what: bit.token().into(),
                        kind: "nested types".into(),
                    },
                    span,
                );
            }
        }

        // positional: base-type bits belong on base-type kinds
        if !KindSet::BIT_FIELD.contains(kind)
            && kind != KindSet::PLACEHOLDER
            && !tid.base().is_empty()
        {
            self.report(
                DeclError::IllegalForKind {
                    what: tid.base().name(),
                    kind: plural_kind(&node.kind),
                },
                span,
            );
        }

        self.member_rules(id, ctx);
        self.special_function_rules(id);
        self.shape_rules(id);
        self.variadic_rules(id);
        self.bit_field_rules(id);

        // language gating, last within a node
        let node_langs = kind_langs(kind);
        if !node_langs.contains(self.lang()) {
            self.not_supported(node.kind.kind_name(), node_langs, span);
        }
        for bit in tid.split() {
            let allowed = types::bit_langs(bit);
            if !allowed.contains(self.lang()) {
                self.not_supported(bit.token_for_error(), allowed, span);
            } else if types::bit_deprecated_in(bit).contains(self.lang()) {
                self.report(
                    DeclError::DeprecatedIn {
                        what: bit.token_for_error().into(),
                        lang: self.lang().to_string(),
                    },
                    span,
                );
            }
        }
        if tid.base().contains(TypeId::ENUM | TypeId::CLASS) {
            let allowed =
                Lang::cpp_min(Lang::CPP_11) | Lang::c_min(Lang::C_23);
            if !allowed.contains(self.lang()) {
                self.not_supported("enum class", allowed, span);
            }
        }
        if let AstKind::Ecsu { of: Some(_), .. } = &node.kind {
            let allowed =
                Lang::cpp_min(Lang::CPP_11) | Lang::c_min(Lang::C_23);
            if !allowed.contains(self.lang()) {
                self.not_supported("fixed underlying type", allowed, span);
            }
        }
        if let AstKind::Array { size, quals, .. } = &node.kind {
            let c99 = Lang::c_min(Lang::C_99);
            if *size == ArraySize::Variable && !c99.contains(self.lang()) {
                self.not_supported("variable length array", c99, span);
            }
            if !quals.is_empty() && !c99.contains(self.lang()) {
                self.not_supported("qualified array parameter", c99, span);
            }
        }
        if node.align != Alignment::None {
            let allowed =
                Lang::c_min(Lang::C_11) | Lang::cpp_min(Lang::CPP_11);
            if !allowed.contains(self.lang()) {
                self.not_supported("alignas", allowed, span);
            }
        }
        if let AstKind::Function {
            conv: Some(_), ..
        } = &node.kind
        {
            // calling conventions only mean something on a function that
            // is pointed at; elsewhere they are ignored with a warning
            let pointed_at = node
                .parent
                .map(|p| {
                    KindSet::POINTER_LIKE
                        .contains(self.tree.get(p).kind.kind_set())
                })
                .unwrap_or(true);
            if !pointed_at {
                self.report(DeclError::IgnoredCallingConvention, span);
            }
        }

        // recurse, in payload order
        let child_ctx = Ctx {
            member: ctx.member
                || kind == KindSet::POINTER_TO_MEMBER,
            decl_root: false,
        };
        let params: &[NodeId] = match &node.kind {
            AstKind::AppleBlock { params, .. }
            | AstKind::Function { params, .. }
            | AstKind::Operator { params, .. }
            | AstKind::Lambda { params, .. }
            | AstKind::UserDefLiteral { params, .. }
            | AstKind::Constructor { params } => params,
            _ => &[],
        };
        for child in self.tree.children(id) {
            let ctx = if params.contains(&child) {
                // a parameter is its own little declaration
                Ctx {
                    member: false,
                    decl_root: true,
                }
            } else {
                child_ctx
            };
            self.node(child, ctx);
        }
    }

    /// Bits that require a member function (or any function at all).
    fn member_rules(&mut self, id: NodeId, ctx: Ctx) {
        let node = self.tree.get(id);
        let kind = node.kind.kind_set();
        let tid = node.type_id;
        let member_bits = TypeId::OVERRIDE
            | TypeId::FINAL
            | TypeId::VIRTUAL
            | TypeId::PURE_VIRTUAL
            | TypeId::DEFAULT
            | TypeId::DELETE
            | TypeId::EXPLICIT;

        if KindSet::FUNCTION_LIKE.contains(kind) {
            if !ctx.member {
                let offending = (tid & member_bits)
                    | tid.quals()
                    | tid.ref_quals();
                for bit in offending.split() {
                    self.report(
                        DeclError::MemberOnly {
                            what: bit.token_for_error().into(),
                        },
                        node.span,
                    );
                }
            }
        } else {
            // these bits (plus exception specs and friend) only make
            // sense on functions
            let function_only = member_bits
                | TypeId::NOEXCEPT
                | TypeId::THROW
                | TypeId::FRIEND;
            for bit in (tid & function_only).split() {
                self.report(
                    DeclError::IllegalForKind {
                        what: bit.token_for_error().into(),
                        kind: plural_kind(&node.kind),
                    },
                    node.span,
                );
            }
        }
    }

    /// Constructors, destructors and conversion operators accept only a
    /// restricted subset of the storage-class-like bits.
    fn special_function_rules(&mut self, id: NodeId) {
        let node = self.tree.get(id);
        let (allowed, what) = match &node.kind {
            AstKind::Constructor { .. } => (
                TypeId::EXPLICIT
                    | TypeId::CONSTEXPR
                    | TypeId::CONSTEVAL
                    | TypeId::DEFAULT
                    | TypeId::DELETE
                    | TypeId::INLINE
                    | TypeId::NOEXCEPT
                    | TypeId::THROW
                    | TypeId::FRIEND,
                "constructors",
            ),
            AstKind::Destructor => (
                TypeId::VIRTUAL
                    | TypeId::FINAL
                    | TypeId::OVERRIDE
                    | TypeId::PURE_VIRTUAL
                    | TypeId::DEFAULT
                    | TypeId::DELETE
                    | TypeId::INLINE
                    | TypeId::NOEXCEPT
                    | TypeId::THROW
                    | TypeId::CONSTEXPR,
                "destructors",
            ),
            AstKind::Conversion { .. } => (
                TypeId::EXPLICIT
                    | TypeId::CONSTEXPR
                    | TypeId::CONSTEVAL
                    | TypeId::VIRTUAL
                    | TypeId::PURE_VIRTUAL
                    | TypeId::OVERRIDE
                    | TypeId::FINAL
                    | TypeId::INLINE
                    | TypeId::NOEXCEPT
                    | TypeId::THROW,
                "conversion operators",
            ),
            _ => return,
        };
        let illegal = (node.type_id.storage_like() - allowed)
            | node.type_id.storage();
        for bit in illegal.split() {
            self.report(
                DeclError::IllegalForKind {
                    what: bit.token_for_error().into(),
                    kind: what.into(),
                },
                node.span,
            );
        }
    }

    /// The classic shape errors: pointers/arrays of references, arrays of
    /// functions, functions returning arrays or functions.
    fn shape_rules(&mut self, id: NodeId) {
        let node = self.tree.get(id);
        let span = node.span;
        match &node.kind {
            AstKind::Pointer { to }
            | AstKind::PointerToMember { to, .. } => {
                if KindSet::REFERENCE_LIKE
                    .contains(self.concrete_kind(*to))
                {
                    self.report(DeclError::PointerToReference, span);
                }
            }
            AstKind::Reference { to }
            | AstKind::RvalueReference { to } => {
                if KindSet::REFERENCE_LIKE
                    .contains(self.concrete_kind(*to))
                {
                    self.report(DeclError::ReferenceToReference, span);
                }
            }
            AstKind::Array { of, .. } => {
                let child = self.concrete_kind(*of);
                if KindSet::REFERENCE_LIKE.contains(child) {
                    self.report(DeclError::ArrayOfReference, span);
                } else if KindSet::FUNCTION_LIKE.contains(child) {
                    self.report(DeclError::ArrayOfFunction, span);
                }
            }
            AstKind::AppleBlock { ret, .. }
            | AstKind::Function { ret, .. }
            | AstKind::Operator { ret, .. }
            | AstKind::Lambda { ret, .. }
            | AstKind::UserDefLiteral { ret, .. } => {
                let child = self.concrete_kind(*ret);
                if child == KindSet::ARRAY {
                    self.report(DeclError::FunctionReturningArray, span);
                } else if KindSet::FUNCTION_LIKE.contains(child) {
                    self.report(
                        DeclError::FunctionReturningFunction,
                        span,
                    );
                }
            }
            _ => {}
        }
    }

    fn variadic_rules(&mut self, id: NodeId) {
        let node = self.tree.get(id);
        let params: &[NodeId] = match &node.kind {
            AstKind::AppleBlock { params, .. }
            | AstKind::Function { params, .. }
            | AstKind::Operator { params, .. }
            | AstKind::Lambda { params, .. }
            | AstKind::UserDefLiteral { params, .. }
            | AstKind::Constructor { params } => params,
            _ => return,
        };
        for (i, param) in params.iter().enumerate() {
            if !matches!(self.tree.get(*param).kind, AstKind::Variadic) {
                continue;
            }
            let span = self.tree.get(*param).span;
            if i + 1 != params.len() {
                self.report(DeclError::VariadicNotLast, span);
            } else if params.len() == 1 {
                self.report(DeclError::VariadicAlone, span);
            }
        }
    }

    fn bit_field_rules(&mut self, id: NodeId) {
        let node = self.tree.get(id);
        if node.bit_width() == 0 {
            return;
        }
        let span = node.span;
        let integral = match &node.kind {
            AstKind::Builtin { .. } => node.type_id.is_integral(),
            AstKind::Ecsu { .. } => {
                node.type_id.base().contains(TypeId::ENUM)
            }
            AstKind::Typedef { .. } => {
                let concrete = untypedef(TypeRef::new(self.tree, id));
                match &concrete.node().kind {
                    AstKind::Builtin { .. } => {
                        concrete.node().type_id.is_integral()
                    }
                    AstKind::Ecsu { .. } => concrete
                        .node()
                        .type_id
                        .base()
                        .contains(TypeId::ENUM),
                    _ => false,
                }
            }
            _ => false,
        };
        if !integral {
            self.report(DeclError::BitFieldKind, span);
        }
        if node.type_id.storage().contains(TypeId::STATIC) {
            self.report(DeclError::BitFieldStatic, span);
        }
    }
}

/// "arrays", "pointers", ... for IllegalForKind messages.
fn plural_kind(kind: &AstKind) -> String {
    match kind {
        AstKind::Array { .. } => "arrays".into(),
        AstKind::Pointer { .. } => "pointers".into(),
        AstKind::Reference { .. } | AstKind::RvalueReference { .. } => {
            "references".into()
        }
        other => format!("{}s", other.kind_name()),
    }
}
