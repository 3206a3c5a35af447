//! The gibberish printer: turns an AST back into C/C++ declaration syntax.
//!
//! Rendering is the inverse of declarator parsing: walking from the root
//! (the operator that binds the name tightest) toward the leaf base type,
//! each node wraps the declarator string built so far. A postfix operator
//! (array brackets, parameter list) directly following a prefix operator
//! (`*`, `&`, `::*`) forces parentheses, which is exactly the
//! `(*x)[10]` reshuffle C declarators need.

use crate::{
    ast::{Alignment, AstKind, AstNode, NodeId, SyntaxTree},
    lang::Lang,
    options::{Graphs, Options},
    typedefs::Typedef,
    types::TypeId,
};

/// The kind of cast to emit; the C++ named casts require a C++ dialect.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CastKind {
    Plain,
    Const,
    Dynamic,
    Reinterpret,
    Static,
}

impl CastKind {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Self::Plain => None,
            Self::Const => Some("const_cast"),
            Self::Dynamic => Some("dynamic_cast"),
            Self::Reinterpret => Some("reinterpret_cast"),
            Self::Static => Some("static_cast"),
        }
    }
}

/// Render a declaration, using the name on the root node.
pub(crate) fn declaration(
    tree: &SyntaxTree,
    root: NodeId,
    opts: &Options,
) -> String {
    let name = declared_name(tree.get(root));
    substitute_graphs(render(tree, root, opts, name), opts)
}

/// Render a type with no declarator name (casts, trailing returns).
pub(crate) fn abstract_declaration(
    tree: &SyntaxTree,
    root: NodeId,
    opts: &Options,
) -> String {
    substitute_graphs(render(tree, root, opts, String::new()), opts)
}

/// Render a cast of `expr`.
pub(crate) fn cast(
    tree: &SyntaxTree,
    root: NodeId,
    kind: CastKind,
    expr: &str,
    opts: &Options,
) -> String {
    let ty = render(tree, root, opts, String::new());
    let out = match kind.keyword() {
        None => format!("({}){}", ty, expr),
        Some(keyword) => format!("{}<{}>({})", keyword, ty, expr),
    };
    substitute_graphs(out, opts)
}

/// Render a registered typedef, in `typedef` or C++11 `using` form, with
/// scoped names wrapped in their namespaces. Includes the terminating
/// semicolon (when enabled) because namespace braces close after it.
pub(crate) fn typedef_decl(def: &Typedef, opts: &Options) -> String {
    let using_form = opts.using
        && Lang::cpp_min(Lang::CPP_11).contains(opts.lang);
    let semi = if opts.semicolon { ";" } else { "" };

    let scope: Vec<&str> = if opts.lang.is_cpp() {
        def.name
            .scope()
            .iter()
            .map(|seg| seg.name.as_str())
            .collect()
    } else {
        vec![]
    };

    let inner = if using_form {
        format!(
            "using {} = {}{}",
            def.name.last(),
            render(&def.tree, def.root, opts, String::new()),
            semi,
        )
    } else {
        let name = if scope.is_empty() {
            def.name.to_string()
        } else {
            def.name.last().to_string()
        };
        format!(
            "typedef {}{}",
            render(&def.tree, def.root, opts, name),
            semi,
        )
    };

    let out = if scope.is_empty() {
        inner
    } else if Lang::cpp_min(Lang::CPP_17).contains(opts.lang) {
        format!("namespace {} {{ {} }}", scope.join("::"), inner)
    } else {
        let mut out = String::new();
        for seg in &scope {
            out.push_str("namespace ");
            out.push_str(seg);
            out.push_str(" { ");
        }
        out.push_str(&inner);
        for _ in &scope {
            out.push_str(" }");
        }
        out
    };
    substitute_graphs(out, opts)
}

/// The declarator name, with the kind-specific decoration operators,
/// literals, constructors and destructors need.
fn declared_name(root: &AstNode) -> String {
    let name = match &root.name {
        Some(name) => name,
        None => return String::new(),
    };
    match &root.kind {
        AstKind::Operator { .. } => format!("operator{}", name.last()),
        AstKind::UserDefLiteral { .. } => {
            format!("operator\"\" {}", name.last())
        }
        AstKind::Destructor => {
            let scope = name.scope();
            if scope.is_empty() {
                format!("~{}", name.last())
            } else {
                let path: Vec<&str> =
                    scope.iter().map(|s| s.name.as_str()).collect();
                format!("{}::~{}", path.join("::"), name.last())
            }
        }
        _ => name.to_string(),
    }
}

fn render(
    tree: &SyntaxTree,
    root: NodeId,
    opts: &Options,
    name: String,
) -> String {
    let root_node = tree.get(root);

    // lambdas and conversions have their own top-level shapes
    if let AstKind::Lambda { params, ret } = &root_node.kind {
        let mut out = format!("[]({})", params_str(tree, params, opts));
        out.push_str(&tail_str(root_node.type_id, opts));
        let ret_str = render(tree, *ret, opts, String::new());
        if !ret_str.is_empty() {
            out.push_str(" -> ");
            out.push_str(&ret_str);
        }
        return out;
    }

    let mut prefix = String::new();
    let attrs = root_node.type_id.attrs();
    if !attrs.is_empty() {
        let names: Vec<&str> =
            attrs.split().map(TypeId::token).collect();
        prefix.push_str(&format!("[[{}]] ", names.join(", ")));
    }
    match root_node.align {
        Alignment::None => {}
        Alignment::Bytes(n) => {
            prefix.push_str(&format!("{}({}) ", align_keyword(opts), n))
        }
        Alignment::OfType(ty) => prefix.push_str(&format!(
            "{}({}) ",
            align_keyword(opts),
            render(tree, ty, opts, String::new()),
        )),
    }
    let prefix_like = TypeId::CONSTEVAL
        | TypeId::CONSTEXPR
        | TypeId::EXPLICIT
        | TypeId::FRIEND
        | TypeId::INLINE
        | TypeId::VIRTUAL;
    let words = root_node.type_id.storage()
        | (root_node.type_id.storage_like() & prefix_like);
    for bit in words.split() {
        prefix.push_str(bit.token());
        prefix.push(' ');
    }

    let (declarator, leaf) = declarator_str(tree, root, opts, name);
    let base = match leaf {
        Some(leaf) => base_str(tree, leaf, opts),
        None => String::new(),
    };

    let mut out = prefix;
    out.push_str(&base);
    if !base.is_empty() && !declarator.is_empty() {
        out.push(' ');
    }
    out.push_str(&declarator);
    if root_node.bit_width() > 0 {
        out.push_str(&format!(" : {}", root_node.bit_width()));
    }
    out
}

/// Walk root-to-leaf wrapping the declarator. Returns the declarator text
/// and the leaf node the base type prints from (None for constructors,
/// destructors and conversions, which have no base).
fn declarator_str(
    tree: &SyntaxTree,
    root: NodeId,
    opts: &Options,
    name: String,
) -> (String, Option<NodeId>) {
    let mut d = name;
    let mut prev_was_prefix = false;
    let mut cur = root;
    loop {
        let node = tree.get(cur);
        match &node.kind {
            AstKind::Pointer { to } => {
                d = format!("*{}{}", quals_mid(node.type_id), d);
                prev_was_prefix = true;
                cur = *to;
            }
            AstKind::Reference { to } => {
                d = format!("{}{}", amp(opts), d);
                prev_was_prefix = true;
                cur = *to;
            }
            AstKind::RvalueReference { to } => {
                d = format!("{}{}", amp_amp(opts), d);
                prev_was_prefix = true;
                cur = *to;
            }
            AstKind::PointerToMember { class, to } => {
                d = format!(
                    "{}::*{}{}",
                    class,
                    quals_mid(node.type_id),
                    d
                );
                prev_was_prefix = true;
                cur = *to;
            }
            AstKind::Array { size, quals, of } => {
                if prev_was_prefix {
                    d = format!("({})", d);
                }
                let mut inner = String::new();
                for bit in quals.split() {
                    inner.push_str(bit.token());
                    inner.push(' ');
                }
                let size = size.to_string();
                if size.is_empty() && inner.ends_with(' ') {
                    inner.pop();
                }
                d.push_str(&format!("[{}{}]", inner, size));
                prev_was_prefix = false;
                cur = *of;
            }
            AstKind::AppleBlock { params, ret } => {
                d = format!(
                    "(^{}{})({})",
                    quals_mid(node.type_id),
                    d,
                    params_str(tree, params, opts)
                );
                prev_was_prefix = false;
                cur = *ret;
            }
            AstKind::Function { params, ret, conv } => {
                let conv_str = conv.map(|c| c.token()).unwrap_or("");
                if prev_was_prefix {
                    if conv_str.is_empty() {
                        d = format!("({})", d);
                    } else {
                        d = format!("({} {})", conv_str, d);
                    }
                } else if !conv_str.is_empty() {
                    d = format!("{} {}", conv_str, d);
                }
                d.push_str(&format!(
                    "({})",
                    params_str(tree, params, opts)
                ));
                d.push_str(&tail_str(node.type_id, opts));
                prev_was_prefix = false;
                cur = *ret;
            }
            AstKind::Operator { params, ret }
            | AstKind::UserDefLiteral { params, ret } => {
                if prev_was_prefix {
                    d = format!("({})", d);
                }
                d.push_str(&format!(
                    "({})",
                    params_str(tree, params, opts)
                ));
                d.push_str(&tail_str(node.type_id, opts));
                prev_was_prefix = false;
                cur = *ret;
            }
            AstKind::Constructor { params } => {
                d.push_str(&format!(
                    "({})",
                    params_str(tree, params, opts)
                ));
                d.push_str(&tail_str(node.type_id, opts));
                return (d, None);
            }
            AstKind::Destructor => {
                d.push_str("()");
                d.push_str(&tail_str(node.type_id, opts));
                return (d, None);
            }
            AstKind::Conversion { ret } => {
                if !d.is_empty() {
                    d.push_str("::");
                }
                d.push_str("operator ");
                d.push_str(&render(tree, *ret, opts, String::new()));
                d.push_str("()");
                d.push_str(&tail_str(node.type_id, opts));
                return (d, None);
            }
            AstKind::Name => {
                if d.is_empty() {
                    if let Some(name) = &node.name {
                        d = name.to_string();
                    }
                }
                return (d, None);
            }
            AstKind::Variadic => {
                d.push_str("...");
                return (d, None);
            }
            // Builtin, Ecsu, Typedef, Placeholder
            _ => return (d, Some(cur)),
        }
    }
}

/// The base type at the leaf: builtin tokens, an ECSU tag, or a typedef
/// name, with its qualifiers placed per the east-const setting.
fn base_str(tree: &SyntaxTree, leaf: NodeId, opts: &Options) -> String {
    let node = tree.get(leaf);
    let core = match &node.kind {
        AstKind::Builtin { .. } => {
            let mut base = node.type_id.base();
            if opts.explicit_int && !base.contains(TypeId::INT) {
                let sizes = TypeId::SHORT
                    | TypeId::LONG
                    | TypeId::LONG_LONG
                    | TypeId::SIGNED
                    | TypeId::UNSIGNED;
                let others = base - sizes;
                if !base.is_empty() && others.is_empty() {
                    base.insert(TypeId::INT);
                }
            }
            let tokens: Vec<&str> =
                base.split().map(TypeId::token).collect();
            tokens.join(" ")
        }
        AstKind::Ecsu { tag, of, .. } => {
            let bits = node.type_id.base();
            let keyword = if bits.contains(TypeId::ENUM | TypeId::CLASS) {
                "enum class"
            } else if bits.contains(TypeId::ENUM) {
                "enum"
            } else if bits.contains(TypeId::STRUCT) {
                "struct"
            } else if bits.contains(TypeId::UNION) {
                "union"
            } else {
                "class"
            };
            // C requires the keyword; C++ can drop it unless asked to keep
            let scoped_enum = bits.contains(TypeId::ENUM | TypeId::CLASS);
            let mut out = if opts.lang.is_c()
                || opts.explicit_ecsu
                || scoped_enum
            {
                format!("{} {}", keyword, tag)
            } else {
                tag.to_string()
            };
            if let Some(of) = of {
                out.push_str(" : ");
                out.push_str(&base_str(tree, *of, opts));
            }
            out
        }
        AstKind::Typedef { def, .. } => def.name.to_string(),
        // a placeholder never survives to printing; an empty base prints
        // as nothing (K&R implicit int)
        _ => String::new(),
    };

    let quals = node.type_id.quals();
    if quals.is_empty() || core.is_empty() {
        // qualifiers with no base still print (west) so `const x` in K&R
        // renders something sensible
        if core.is_empty() && !quals.is_empty() {
            let tokens: Vec<&str> =
                quals.split().map(TypeId::token).collect();
            return tokens.join(" ");
        }
        return core;
    }
    let tokens: Vec<&str> = quals.split().map(TypeId::token).collect();
    if opts.east_const {
        format!("{} {}", core, tokens.join(" "))
    } else {
        format!("{} {}", tokens.join(" "), core)
    }
}

fn params_str(
    tree: &SyntaxTree,
    params: &[NodeId],
    opts: &Options,
) -> String {
    let rendered: Vec<String> = params
        .iter()
        .map(|p| {
            let name = declared_name(tree.get(*p));
            render(tree, *p, opts, name)
        })
        .collect();
    rendered.join(", ")
}

/// Function-tail bits, in the order the grammar requires them.
fn tail_str(tid: TypeId, opts: &Options) -> String {
    let mut out = String::new();
    if tid.contains(TypeId::CONST) {
        out.push_str(" const");
    }
    if tid.contains(TypeId::VOLATILE) {
        out.push_str(" volatile");
    }
    if tid.contains(TypeId::REF) {
        out.push(' ');
        out.push_str(amp(opts).trim_end());
    }
    if tid.contains(TypeId::RVALUE_REF) {
        out.push(' ');
        out.push_str(amp_amp(opts).trim_end());
    }
    if tid.contains(TypeId::NOEXCEPT) {
        out.push_str(" noexcept");
    }
    if tid.contains(TypeId::THROW) {
        out.push_str(" throw()");
    }
    if tid.contains(TypeId::OVERRIDE) {
        out.push_str(" override");
    }
    if tid.contains(TypeId::FINAL) {
        out.push_str(" final");
    }
    if tid.contains(TypeId::PURE_VIRTUAL) {
        out.push_str(" = 0");
    }
    if tid.contains(TypeId::DEFAULT) {
        out.push_str(" = default");
    }
    if tid.contains(TypeId::DELETE) {
        out.push_str(" = delete");
    }
    out
}

fn quals_mid(tid: TypeId) -> String {
    let quals = tid.quals();
    if quals.is_empty() {
        return String::new();
    }
    let tokens: Vec<&str> = quals.split().map(TypeId::token).collect();
    let mut out = tokens.join(" ");
    out.push(' ');
    out
}

fn align_keyword(opts: &Options) -> &'static str {
    if opts.lang.is_cpp() || Lang::c_min(Lang::C_23).contains(opts.lang) {
        "alignas"
    } else {
        "_Alignas"
    }
}

/// `&` or its ISO 646 alternative spelling, with trailing space when the
/// alternative needs separation.
fn amp(opts: &Options) -> &'static str {
    if opts.alt_tokens && alt_tokens_ok(opts.lang) {
        "bitand "
    } else {
        "&"
    }
}

fn amp_amp(opts: &Options) -> &'static str {
    if opts.alt_tokens && alt_tokens_ok(opts.lang) {
        "and "
    } else {
        "&&"
    }
}

fn alt_tokens_ok(lang: Lang) -> bool {
    lang.is_cpp() || Lang::c_min(Lang::C_95).contains(lang)
}

fn digraphs_ok(lang: Lang) -> bool {
    lang.is_cpp() || Lang::c_min(Lang::C_95).contains(lang)
}

fn trigraphs_ok(lang: Lang) -> bool {
    let c = Lang::c_min(Lang::C_89) & !Lang::c_min(Lang::C_23);
    let cpp = Lang::CPP_ALL & !Lang::cpp_min(Lang::CPP_17);
    (c | cpp).contains(lang)
}

/// Substitute bracket/brace tokens character-by-character on emit, when a
/// graph mode is on and the dialect still has the graphs.
fn substitute_graphs(s: String, opts: &Options) -> String {
    let map: &[(char, &str)] = match opts.graphs {
        Graphs::None => return s,
        Graphs::Di if digraphs_ok(opts.lang) => &[
            ('[', "<:"),
            (']', ":>"),
            ('{', "<%"),
            ('}', "%>"),
            ('#', "%:"),
        ],
        Graphs::Tri if trigraphs_ok(opts.lang) => &[
            ('[', "??("),
            (']', "??)"),
            ('{', "??<"),
            ('}', "??>"),
            ('#', "??="),
        ],
        _ => return s,
    };
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match map.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => out.push_str(to),
            None => out.push(c),
        }
    }
    out
}
