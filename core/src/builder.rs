//! Combinators that assemble partial ASTs while a declaration is parsed.
//!
//! C declarator syntax is inside-out: in `int (*a[3])(char)` the tokens
//! nearest the name bind tightest, and the base type arrives last. The
//! parser therefore builds the declarator around a [Placeholder] node and
//! grafts each new construct at the innermost placeholder position; once the
//! type-specifier is known, [patch] replaces the remaining placeholder(s)
//! with the real type.
//!
//! [Placeholder]: AstKind::Placeholder

use crate::{
    ast::{
        ArraySize, AstKind, AstNode, KindSet, MsCall, NodeId, ScopedName,
        SyntaxTree,
    },
    types::TypeId,
    util::Span,
};

/// Replace the innermost placeholder of `ast` with `node`, preserving the
/// rest of the declarator chain. Any name sitting on the displaced
/// placeholder moves onto `node`. Returns the root the caller should treat
/// as the new partial AST.
pub fn graft(tree: &mut SyntaxTree, ast: NodeId, node: NodeId) -> NodeId {
    let ph = tree
        .find_kind(ast, KindSet::PLACEHOLDER)
        .expect("graft: partial AST has no placeholder");
    if let Some(name) = tree.get_mut(ph).name.take() {
        tree.get_mut(node).name = Some(name);
    }
    match tree.get(ph).parent {
        Some(parent) => {
            tree.get_mut(parent).kind.replace_child(ph, node);
            tree.get_mut(node).parent = Some(parent);
            ast
        }
        None => {
            debug_assert_eq!(ph, ast);
            node
        }
    }
}

/// Graft an array at the innermost placeholder of `ast`. The array's "of"
/// child starts out as a fresh placeholder, which becomes the next graft
/// target.
pub fn add_array(
    tree: &mut SyntaxTree,
    ast: NodeId,
    size: ArraySize,
    quals: TypeId,
    span: Span,
) -> NodeId {
    let of = tree.add(AstNode::new(AstKind::Placeholder, span));
    let array = tree.add(AstNode::new(
        AstKind::Array { size, quals, of },
        span,
    ));
    graft(tree, ast, array)
}

/// Graft a function at the innermost placeholder of `ast`, with its return
/// type as the next placeholder. If the placeholder's parent is an Apple
/// block that has not yet received its parameters (the `(^b)` declarator was
/// parsed before the parameter list), the parameters land on the block
/// instead and no new node is created.
pub fn add_function(
    tree: &mut SyntaxTree,
    ast: NodeId,
    params: Vec<NodeId>,
    conv: Option<MsCall>,
    span: Span,
) -> NodeId {
    if let Some(ph) = tree.find_kind(ast, KindSet::PLACEHOLDER) {
        if let Some(parent) = tree.get(ph).parent {
            let empty_block = matches!(
                &tree.get(parent).kind,
                AstKind::AppleBlock { params, .. } if params.is_empty()
            );
            if empty_block {
                for param in &params {
                    tree.get_mut(*param).parent = Some(parent);
                }
                if let AstKind::AppleBlock {
                    params: block_params,
                    ..
                } = &mut tree.get_mut(parent).kind
                {
                    *block_params = params;
                }
                return ast;
            }
        }
    }
    let ret = tree.add(AstNode::new(AstKind::Placeholder, span));
    let func = tree.add(AstNode::new(
        AstKind::Function { params, ret, conv },
        span,
    ));
    graft(tree, ast, func)
}

/// Graft an overloaded operator; the declared name is the operator symbol.
pub fn add_operator(
    tree: &mut SyntaxTree,
    ast: NodeId,
    params: Vec<NodeId>,
    span: Span,
) -> NodeId {
    let ret = tree.add(AstNode::new(AstKind::Placeholder, span));
    let node =
        tree.add(AstNode::new(AstKind::Operator { params, ret }, span));
    graft(tree, ast, node)
}

/// Graft a user-defined literal operator.
pub fn add_literal(
    tree: &mut SyntaxTree,
    ast: NodeId,
    params: Vec<NodeId>,
    span: Span,
) -> NodeId {
    let ret = tree.add(AstNode::new(AstKind::Placeholder, span));
    let node = tree
        .add(AstNode::new(AstKind::UserDefLiteral { params, ret }, span));
    graft(tree, ast, node)
}

/// Graft a constructor. Constructors have no return slot, so this leaves no
/// placeholder behind.
pub fn add_constructor(
    tree: &mut SyntaxTree,
    ast: NodeId,
    params: Vec<NodeId>,
    span: Span,
) -> NodeId {
    let node =
        tree.add(AstNode::new(AstKind::Constructor { params }, span));
    graft(tree, ast, node)
}

/// Graft a pointer (or reference, rvalue reference, pointer-to-member,
/// block) at the innermost placeholder. `make_kind` receives the fresh
/// placeholder that becomes the node's child.
pub fn add_child_node(
    tree: &mut SyntaxTree,
    ast: NodeId,
    span: Span,
    quals: TypeId,
    make_kind: impl FnOnce(NodeId) -> AstKind,
) -> NodeId {
    let child = tree.add(AstNode::new(AstKind::Placeholder, span));
    let node = tree
        .add(AstNode::new(make_kind(child), span).with_type(quals));
    graft(tree, ast, node)
}

/// Replace every placeholder left in `decl` with `type_ast` (the first gets
/// the unique subtree, later ones get copies). Preconditions: `type_ast` has
/// no parent, and `decl` still contains a placeholder. Returns the root of
/// the patched AST.
pub fn patch(
    tree: &mut SyntaxTree,
    type_ast: NodeId,
    decl: NodeId,
) -> NodeId {
    debug_assert!(
        tree.get(type_ast).parent.is_none(),
        "patch: type AST already has a parent"
    );
    debug_assert!(
        tree.has_placeholder(decl),
        "patch: declarator has no placeholder left"
    );

    let mut root = decl;
    let mut replacement = Some(type_ast);
    while let Some(ph) = tree.find_kind(root, KindSet::PLACEHOLDER) {
        let node = match replacement.take() {
            Some(first) => first,
            None => tree.duplicate(type_ast),
        };
        if let Some(name) = tree.get_mut(ph).name.take() {
            tree.get_mut(node).name = Some(name);
        }
        match tree.get(ph).parent {
            Some(parent) => {
                tree.get_mut(parent).kind.replace_child(ph, node);
                tree.get_mut(node).parent = Some(parent);
            }
            None => {
                debug_assert_eq!(ph, root);
                root = node;
            }
        }
    }
    root
}

/// Transfer the first declared name out of the subtree to the caller.
pub fn take_name(tree: &mut SyntaxTree, root: NodeId) -> Option<ScopedName> {
    let id = tree.find_name(root)?;
    tree.get_mut(id).name.take()
}

/// A borrowed position in some tree. [untypedef] can hop from a referring
/// tree into a typedef's own tree, so the pair travels together.
#[derive(Copy, Clone)]
pub struct TypeRef<'a> {
    pub tree: &'a SyntaxTree,
    pub id: NodeId,
}

impl<'a> TypeRef<'a> {
    pub fn new(tree: &'a SyntaxTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn node(&self) -> &'a AstNode {
        self.tree.get(self.id)
    }

    pub fn kind_set(&self) -> KindSet {
        self.node().kind.kind_set()
    }
}

/// Follow typedef references down to the first concrete node.
pub fn untypedef(r: TypeRef<'_>) -> TypeRef<'_> {
    let mut cur = r;
    loop {
        match &cur.node().kind {
            AstKind::Typedef { def, .. } => {
                cur = TypeRef::new(&def.tree, def.root);
            }
            _ => return cur,
        }
    }
}

/// Strip one pointer level, looking through typedefs. `None` if the node is
/// not pointer-like.
pub fn unpointer(r: TypeRef<'_>) -> Option<TypeRef<'_>> {
    let r = untypedef(r);
    match &r.node().kind {
        AstKind::Pointer { to } | AstKind::PointerToMember { to, .. } => {
            Some(TypeRef::new(r.tree, *to))
        }
        _ => None,
    }
}

/// Strip one lvalue-reference level, looking through typedefs. Rvalue
/// references are deliberately not stripped.
pub fn unreference(r: TypeRef<'_>) -> Option<TypeRef<'_>> {
    let r = untypedef(r);
    match &r.node().kind {
        AstKind::Reference { to } => Some(TypeRef::new(r.tree, *to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholder(tree: &mut SyntaxTree) -> NodeId {
        tree.add(AstNode::new(AstKind::Placeholder, Span::default()))
    }

    fn int_node(tree: &mut SyntaxTree) -> NodeId {
        tree.add(
            AstNode::new(AstKind::Builtin { bit_width: 0 }, Span::default())
                .with_type(TypeId::INT),
        )
    }

    /// Build `int (*a[3])(char)`: a is array 3 of pointer to function
    /// (char) returning int.
    #[test]
    fn test_declarator_chain() {
        let mut tree = SyntaxTree::new();
        let core = placeholder(&mut tree);
        tree.get_mut(core).name = Some(ScopedName::simple("a"));

        // a[3]
        let root = add_array(
            &mut tree,
            core,
            ArraySize::Fixed(3),
            TypeId::empty(),
            Span::default(),
        );
        // (*a[3])
        let root = add_child_node(
            &mut tree,
            root,
            Span::default(),
            TypeId::empty(),
            |to| AstKind::Pointer { to },
        );
        // (*a[3])(char)
        let char_param = tree.add(
            AstNode::new(AstKind::Builtin { bit_width: 0 }, Span::default())
                .with_type(TypeId::CHAR),
        );
        let root =
            add_function(&mut tree, root, vec![char_param], None, Span::default());
        // int ...
        let int = int_node(&mut tree);
        let root = patch(&mut tree, int, root);

        // placeholder eradication
        assert!(!tree.has_placeholder(root));
        // shape: Array -> Pointer -> Function -> int
        let arr = tree.get(root);
        assert!(matches!(
            arr.kind,
            AstKind::Array {
                size: ArraySize::Fixed(3),
                ..
            }
        ));
        let ptr = match &arr.kind {
            AstKind::Array { of, .. } => *of,
            _ => unreachable!(),
        };
        let func = match &tree.get(ptr).kind {
            AstKind::Pointer { to } => *to,
            other => panic!("expected pointer, got {:?}", other),
        };
        match &tree.get(func).kind {
            AstKind::Function { params, ret, .. } => {
                assert_eq!(params.len(), 1);
                assert_eq!(tree.get(*ret).type_id, TypeId::INT);
            }
            other => panic!("expected function, got {:?}", other),
        }
        // the name bubbled through the grafts
        assert_eq!(take_name(&mut tree, root).unwrap().last(), "a");
    }

    #[test]
    fn test_patch_bare_placeholder() {
        let mut tree = SyntaxTree::new();
        let core = placeholder(&mut tree);
        tree.get_mut(core).name = Some(ScopedName::simple("x"));
        let int = int_node(&mut tree);
        let root = patch(&mut tree, int, core);
        assert_eq!(root, int);
        assert_eq!(tree.get(root).name.as_ref().unwrap().last(), "x");
        assert!(!tree.has_placeholder(root));
    }

    #[test]
    fn test_block_takes_params() {
        let mut tree = SyntaxTree::new();
        let core = placeholder(&mut tree);
        // (^b)
        let root = add_child_node(
            &mut tree,
            core,
            Span::default(),
            TypeId::empty(),
            |ret| AstKind::AppleBlock {
                params: vec![],
                ret,
            },
        );
        // (^b)(int)
        let param = int_node(&mut tree);
        let root =
            add_function(&mut tree, root, vec![param], None, Span::default());
        match &tree.get(root).kind {
            AstKind::AppleBlock { params, .. } => assert_eq!(params.len(), 1),
            other => panic!("expected block, got {:?}", other),
        }
        // the return slot is still awaiting the type-specifier
        assert!(tree.has_placeholder(root));
    }

    #[test]
    fn test_unpointer_through_typedef() {
        use crate::typedefs::Typedef;
        use crate::lang::Lang;
        use std::rc::Rc;

        // build a typedef: P = pointer to int
        let mut def_tree = SyntaxTree::new();
        let int = int_node(&mut def_tree);
        let ptr = def_tree
            .add(AstNode::new(AstKind::Pointer { to: int }, Span::default()));
        let def = Rc::new(Typedef {
            name: ScopedName::simple("P"),
            tree: def_tree,
            root: ptr,
            langs: Lang::all(),
            predefined: false,
        });

        let mut tree = SyntaxTree::new();
        let node = tree.add(AstNode::new(
            AstKind::Typedef { def, bit_width: 0 },
            Span::default(),
        ));
        let stripped = unpointer(TypeRef::new(&tree, node)).unwrap();
        assert_eq!(stripped.node().type_id, TypeId::INT);
        // unreference refuses a pointer
        assert!(unreference(TypeRef::new(&tree, node)).is_none());
    }
}
