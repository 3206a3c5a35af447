//! The English printer: one pre-order walk over the AST, emitting the
//! controlled pseudo-English phrase for each node. The host prepends
//! "declare <name> as " to make a full sentence.

use crate::{
    ast::{ArraySize, AstKind, NodeId, SyntaxTree},
    types::TypeId,
};

/// Render the English phrase for a type (no declared name, no trailing
/// punctuation).
pub(crate) fn english(tree: &SyntaxTree, root: NodeId) -> String {
    let mut out = String::new();
    phrase(tree, root, &mut out);
    out
}

fn phrase(tree: &SyntaxTree, id: NodeId, out: &mut String) {
    let node = tree.get(id);

    // modifier words first: storage, storage-class-like, attributes,
    // qualifiers, all under their English aliases
    let modifiers = node.type_id.storage()
        | node.type_id.storage_like()
        | node.type_id.attrs()
        | node.type_id.quals();
    for bit in modifiers.split() {
        out.push_str(bit.token_for_error());
        out.push(' ');
    }

    match &node.kind {
        AstKind::Placeholder => out.push_str("<placeholder>"),
        AstKind::Name => {
            if let Some(name) = &node.name {
                out.push_str(&name.to_string());
            }
        }
        AstKind::Builtin { bit_width } => {
            let base = node.type_id.base();
            if base.is_empty() {
                // K&R implicit int; later dialects have it assigned or
                // rejected by the checker before printing
                out.push_str("int");
            } else {
                let tokens: Vec<&str> =
                    base.split().map(TypeId::token).collect();
                out.push_str(&tokens.join(" "));
            }
            push_width(*bit_width, out);
        }
        AstKind::Ecsu {
            tag,
            of,
            bit_width,
        } => {
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
            out.push_str(keyword);
            out.push(' ');
            out.push_str(&tag.to_string());
            if let Some(of) = of {
                out.push_str(" of type ");
                phrase(tree, *of, out);
            }
            push_width(*bit_width, out);
        }
        AstKind::Typedef { def, bit_width } => {
            out.push_str(&def.name.to_string());
            push_width(*bit_width, out);
        }
        AstKind::Variadic => out.push_str("..."),
        AstKind::Array { size, quals, of } => {
            out.push_str("array ");
            for bit in quals.split() {
                out.push_str(bit.token());
                out.push(' ');
            }
            match size {
                ArraySize::Unspecified => {}
                ArraySize::Fixed(n) => out.push_str(&format!("{} ", n)),
                ArraySize::Variable => out.push_str("* "),
            }
            out.push_str("of ");
            phrase(tree, *of, out);
        }
        AstKind::Pointer { to } => {
            out.push_str("pointer to ");
            phrase(tree, *to, out);
        }
        AstKind::Reference { to } => {
            out.push_str("reference to ");
            phrase(tree, *to, out);
        }
        AstKind::RvalueReference { to } => {
            out.push_str("rvalue reference to ");
            phrase(tree, *to, out);
        }
        AstKind::PointerToMember { class, to } => {
            out.push_str(&format!(
                "pointer to member of class {} of ",
                class
            ));
            phrase(tree, *to, out);
        }
        AstKind::AppleBlock { params, ret } => {
            function_phrase(tree, "block", params, Some(*ret), out);
        }
        AstKind::Function { params, ret, .. } => {
            function_phrase(tree, "function", params, Some(*ret), out);
        }
        AstKind::Operator { params, ret } => {
            function_phrase(tree, "operator", params, Some(*ret), out);
        }
        AstKind::Lambda { params, ret } => {
            function_phrase(tree, "lambda", params, Some(*ret), out);
        }
        AstKind::Conversion { ret } => {
            out.push_str("user-defined conversion operator returning ");
            phrase(tree, *ret, out);
        }
        AstKind::UserDefLiteral { params, ret } => {
            function_phrase(
                tree,
                "user-defined literal",
                params,
                Some(*ret),
                out,
            );
        }
        AstKind::Constructor { params } => {
            function_phrase(tree, "constructor", params, None, out);
        }
        AstKind::Destructor => out.push_str("destructor"),
    }
}

fn function_phrase(
    tree: &SyntaxTree,
    keyword: &str,
    params: &[NodeId],
    ret: Option<NodeId>,
    out: &mut String,
) {
    out.push_str(keyword);
    if !params.is_empty() {
        out.push_str(" (");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            argument(tree, *param, out);
        }
        out.push(')');
    }
    if let Some(ret) = ret {
        out.push_str(" returning ");
        phrase(tree, ret, out);
    }
}

/// One parameter: `<name> as <english>` when a typed parameter carries a
/// name, the bare name for K&R parameters, just the phrase otherwise.
fn argument(tree: &SyntaxTree, id: NodeId, out: &mut String) {
    let node = tree.get(id);
    match (&node.kind, &node.name) {
        (AstKind::Name, Some(name)) => out.push_str(&name.to_string()),
        (AstKind::Variadic, _) => out.push_str("..."),
        (_, Some(name)) => {
            out.push_str(&name.to_string());
            out.push_str(" as ");
            phrase(tree, id, out);
        }
        (_, None) => phrase(tree, id, out),
    }
}

fn push_width(width: u32, out: &mut String) {
    if width > 0 {
        out.push_str(&format!(" width {} bits", width));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstNode, ScopedName};
    use crate::util::Span;

    fn int_leaf(tree: &mut SyntaxTree, quals: TypeId) -> NodeId {
        tree.add(
            AstNode::new(AstKind::Builtin { bit_width: 0 }, Span::default())
                .with_type(TypeId::INT | quals),
        )
    }

    #[test]
    fn test_pointer_to_array() {
        let mut tree = SyntaxTree::new();
        let int = int_leaf(&mut tree, TypeId::empty());
        let arr = tree.add(AstNode::new(
            AstKind::Array {
                size: ArraySize::Fixed(10),
                quals: TypeId::empty(),
                of: int,
            },
            Span::default(),
        ));
        let ptr = tree
            .add(AstNode::new(AstKind::Pointer { to: arr }, Span::default()));
        assert_eq!(english(&tree, ptr), "pointer to array 10 of int");
    }

    #[test]
    fn test_qualifiers_lead_their_node() {
        let mut tree = SyntaxTree::new();
        let int = int_leaf(&mut tree, TypeId::CONST);
        let ptr = tree
            .add(AstNode::new(AstKind::Pointer { to: int }, Span::default()));
        assert_eq!(english(&tree, ptr), "pointer to const int");
    }

    #[test]
    fn test_function_with_named_params() {
        let mut tree = SyntaxTree::new();
        let ret = int_leaf(&mut tree, TypeId::empty());
        let x = tree.add(
            AstNode::new(AstKind::Builtin { bit_width: 0 }, Span::default())
                .with_type(TypeId::INT)
                .with_name(ScopedName::simple("x")),
        );
        let func = tree.add(AstNode::new(
            AstKind::Function {
                params: vec![x],
                ret,
                conv: None,
            },
            Span::default(),
        ));
        assert_eq!(
            english(&tree, func),
            "function (x as int) returning int"
        );
    }

    #[test]
    fn test_function_without_params_omits_parens() {
        let mut tree = SyntaxTree::new();
        let ret = int_leaf(&mut tree, TypeId::empty());
        let func = tree.add(AstNode::new(
            AstKind::Function {
                params: vec![],
                ret,
                conv: None,
            },
            Span::default(),
        ));
        assert_eq!(english(&tree, func), "function returning int");
    }

    #[test]
    fn test_knr_param_prints_bare_name() {
        let mut tree = SyntaxTree::new();
        let ret = int_leaf(&mut tree, TypeId::empty());
        let x = tree.add(
            AstNode::new(AstKind::Name, Span::default())
                .with_name(ScopedName::simple("x")),
        );
        let func = tree.add(AstNode::new(
            AstKind::Function {
                params: vec![x],
                ret,
                conv: None,
            },
            Span::default(),
        ));
        assert_eq!(english(&tree, func), "function (x) returning int");
    }

    #[test]
    fn test_storage_words_first() {
        let mut tree = SyntaxTree::new();
        let int = int_leaf(&mut tree, TypeId::empty());
        let ptr = tree.add(
            AstNode::new(AstKind::Pointer { to: int }, Span::default())
                .with_type(TypeId::STATIC),
        );
        assert_eq!(english(&tree, ptr), "static pointer to int");
    }

    #[test]
    fn test_bit_field_width() {
        let mut tree = SyntaxTree::new();
        let leaf = tree.add(
            AstNode::new(AstKind::Builtin { bit_width: 4 }, Span::default())
                .with_type(TypeId::UNSIGNED),
        );
        assert_eq!(english(&tree, leaf), "unsigned width 4 bits");
    }
}
