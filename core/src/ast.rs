//! The declaration Abstract Syntax Tree. Nodes live in an arena owned by one
//! [SyntaxTree]; references between nodes are 32-bit indices, and every
//! non-root node carries a parent back-pointer. A parse owns one tree and
//! drops the whole arena at once, which keeps ownership trivial even though
//! the graph has back edges.

use crate::{typedefs::Typedef, types::TypeId, util::Span};
use bitflags::bitflags;
use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

/// Index of a node within its [SyntaxTree]. Only meaningful for the tree
/// that produced it.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of scope a [ScopedName] segment was declared in.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum ScopeKind {
    /// Unknown or top-level
    Plain,
    Namespace,
    Class,
    Struct,
    Union,
}

/// One segment of a scoped name.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Segment {
    pub kind: ScopeKind,
    pub name: String,
}

/// An ordered sequence of scope segments, e.g. `std::chrono::duration`.
/// Equality and hashing ignore the scope *kinds*; `std::string` names the
/// same entity whether `std` was tagged as a namespace or left plain.
#[derive(Clone, Debug, Default)]
pub struct ScopedName {
    segments: Vec<Segment>,
}

impl ScopedName {
    /// A one-segment, unscoped name.
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment {
                kind: ScopeKind::Plain,
                name: name.into(),
            }],
        }
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn push(&mut self, kind: ScopeKind, name: impl Into<String>) {
        self.segments.push(Segment {
            kind,
            name: name.into(),
        });
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Does the name have more than one segment?
    pub fn is_scoped(&self) -> bool {
        self.segments.len() > 1
    }

    /// The final (unqualified) segment.
    pub fn last(&self) -> &str {
        self.segments
            .last()
            .map(|s| s.name.as_str())
            .unwrap_or("")
    }

    /// The scope segments, i.e. everything but the last.
    pub fn scope(&self) -> &[Segment] {
        let len = self.segments.len();
        &self.segments[..len.saturating_sub(1)]
    }

    /// Does any scope segment look like a class scope? Used to decide
    /// whether a declaration is a class member.
    pub fn has_class_scope(&self) -> bool {
        self.scope().iter().any(|s| {
            matches!(
                s.kind,
                ScopeKind::Class | ScopeKind::Struct | ScopeKind::Union
            )
        })
    }
}

impl PartialEq for ScopedName {
    fn eq(&self, other: &Self) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.name == b.name)
    }
}

impl Eq for ScopedName {}

impl std::hash::Hash for ScopedName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        for seg in &self.segments {
            seg.name.hash(state);
        }
    }
}

impl Display for ScopedName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "::")?;
            }
            write!(f, "{}", seg.name)?;
        }
        Ok(())
    }
}

/// An array's declared size.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ArraySize {
    /// `[]`
    Unspecified,
    /// `[n]`
    Fixed(u64),
    /// `[*]`, a variable-length array of unspecified size
    Variable,
}

impl Display for ArraySize {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unspecified => Ok(()),
            Self::Fixed(n) => write!(f, "{}", n),
            Self::Variable => write!(f, "*"),
        }
    }
}

/// An alignment directive on a declaration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Alignment {
    None,
    /// `alignas(n)`
    Bytes(u64),
    /// `alignas(type)`; the type is a node in the same tree
    OfType(NodeId),
}

/// Microsoft calling conventions. Parsed anywhere, printable only on
/// pointer-to-function declarators.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MsCall {
    Cdecl,
    Clrcall,
    Fastcall,
    Stdcall,
    Thiscall,
    Vectorcall,
}

impl MsCall {
    pub fn token(self) -> &'static str {
        match self {
            Self::Cdecl => "__cdecl",
            Self::Clrcall => "__clrcall",
            Self::Fastcall => "__fastcall",
            Self::Stdcall => "__stdcall",
            Self::Thiscall => "__thiscall",
            Self::Vectorcall => "__vectorcall",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "__cdecl" => Self::Cdecl,
            "__clrcall" => Self::Clrcall,
            "__fastcall" => Self::Fastcall,
            "__stdcall" => Self::Stdcall,
            "__thiscall" => Self::Thiscall,
            "__vectorcall" => Self::Vectorcall,
            _ => return None,
        })
    }
}

/// The kind of an AST node, together with its kind-specific payload.
#[derive(Clone, Debug, PartialEq)]
pub enum AstKind {
    /// Temporary stand-in for a type that is not known yet mid-parse. Must
    /// never survive into a completed AST.
    Placeholder,
    /// A bare identifier: a K&R untyped parameter
    Name,
    /// A builtin type; the payload is a bit-field width (0 = none)
    Builtin { bit_width: u32 },
    /// enum/class/struct/union; `of` is the fixed underlying type of a
    /// scoped enum
    Ecsu {
        tag: ScopedName,
        of: Option<NodeId>,
        bit_width: u32,
    },
    /// A reference to a registered typedef
    Typedef {
        def: Rc<Typedef>,
        bit_width: u32,
    },
    /// `...`
    Variadic,
    Array {
        size: ArraySize,
        /// C99 parameter-array qualifiers: `[static const 10]`
        quals: TypeId,
        of: NodeId,
    },
    Pointer { to: NodeId },
    Reference { to: NodeId },
    RvalueReference { to: NodeId },
    PointerToMember {
        class: ScopedName,
        to: NodeId,
    },
    /// An Apple block: `ret (^name)(params)`
    AppleBlock {
        params: Vec<NodeId>,
        ret: NodeId,
    },
    Function {
        params: Vec<NodeId>,
        ret: NodeId,
        conv: Option<MsCall>,
    },
    /// An overloaded operator; the declared name is the operator symbol
    Operator {
        params: Vec<NodeId>,
        ret: NodeId,
    },
    Lambda {
        params: Vec<NodeId>,
        ret: NodeId,
    },
    /// A user-defined conversion; only a target ("return") type
    Conversion { ret: NodeId },
    /// A user-defined literal operator
    UserDefLiteral {
        params: Vec<NodeId>,
        ret: NodeId,
    },
    Constructor { params: Vec<NodeId> },
    Destructor,
}

bitflags! {
    /// Bitmask over node kinds, for the logical groupings the checker and
    /// printers test against.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct KindSet: u32 {
        const PLACEHOLDER = 1 << 0;
        const NAME = 1 << 1;
        const BUILTIN = 1 << 2;
        const ECSU = 1 << 3;
        const TYPEDEF = 1 << 4;
        const VARIADIC = 1 << 5;
        const ARRAY = 1 << 6;
        const POINTER = 1 << 7;
        const REFERENCE = 1 << 8;
        const RVALUE_REFERENCE = 1 << 9;
        const POINTER_TO_MEMBER = 1 << 10;
        const APPLE_BLOCK = 1 << 11;
        const FUNCTION = 1 << 12;
        const OPERATOR = 1 << 13;
        const LAMBDA = 1 << 14;
        const CONVERSION = 1 << 15;
        const USER_DEF_LITERAL = 1 << 16;
        const CONSTRUCTOR = 1 << 17;
        const DESTRUCTOR = 1 << 18;

        const OBJECT_LIKE = Self::NAME.bits()
            | Self::BUILTIN.bits()
            | Self::ECSU.bits()
            | Self::TYPEDEF.bits()
            | Self::VARIADIC.bits();
        const POINTER_LIKE =
            Self::POINTER.bits() | Self::POINTER_TO_MEMBER.bits();
        const REFERENCE_LIKE =
            Self::REFERENCE.bits() | Self::RVALUE_REFERENCE.bits();
        const FUNCTION_LIKE = Self::APPLE_BLOCK.bits()
            | Self::FUNCTION.bits()
            | Self::OPERATOR.bits()
            | Self::LAMBDA.bits()
            | Self::CONVERSION.bits()
            | Self::USER_DEF_LITERAL.bits()
            | Self::CONSTRUCTOR.bits()
            | Self::DESTRUCTOR.bits();
        const FUNCTION_LIKE_WITH_RETURN = Self::APPLE_BLOCK.bits()
            | Self::FUNCTION.bits()
            | Self::OPERATOR.bits()
            | Self::LAMBDA.bits()
            | Self::CONVERSION.bits()
            | Self::USER_DEF_LITERAL.bits();
        const TRAILING_RETURN = Self::FUNCTION.bits()
            | Self::OPERATOR.bits()
            | Self::LAMBDA.bits();
        const BIT_FIELD =
            Self::BUILTIN.bits() | Self::ECSU.bits() | Self::TYPEDEF.bits();
        const PARENT = Self::ARRAY.bits()
            | Self::POINTER_LIKE.bits()
            | Self::REFERENCE_LIKE.bits()
            | Self::FUNCTION_LIKE.bits();
        const REFERRER = Self::PARENT.bits() | Self::TYPEDEF.bits();
    }
}

impl AstKind {
    /// The single-bit [KindSet] for this kind.
    pub fn kind_set(&self) -> KindSet {
        match self {
            Self::Placeholder => KindSet::PLACEHOLDER,
            Self::Name => KindSet::NAME,
            Self::Builtin { .. } => KindSet::BUILTIN,
            Self::Ecsu { .. } => KindSet::ECSU,
            Self::Typedef { .. } => KindSet::TYPEDEF,
            Self::Variadic => KindSet::VARIADIC,
            Self::Array { .. } => KindSet::ARRAY,
            Self::Pointer { .. } => KindSet::POINTER,
            Self::Reference { .. } => KindSet::REFERENCE,
            Self::RvalueReference { .. } => KindSet::RVALUE_REFERENCE,
            Self::PointerToMember { .. } => KindSet::POINTER_TO_MEMBER,
            Self::AppleBlock { .. } => KindSet::APPLE_BLOCK,
            Self::Function { .. } => KindSet::FUNCTION,
            Self::Operator { .. } => KindSet::OPERATOR,
            Self::Lambda { .. } => KindSet::LAMBDA,
            Self::Conversion { .. } => KindSet::CONVERSION,
            Self::UserDefLiteral { .. } => KindSet::USER_DEF_LITERAL,
            Self::Constructor { .. } => KindSet::CONSTRUCTOR,
            Self::Destructor => KindSet::DESTRUCTOR,
        }
    }

    /// A human-readable name for this kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Placeholder => "placeholder",
            Self::Name => "name",
            Self::Builtin { .. } => "builtin type",
            Self::Ecsu { .. } => "enum/class/struct/union",
            Self::Typedef { .. } => "typedef",
            Self::Variadic => "\"...\"",
            Self::Array { .. } => "array",
            Self::Pointer { .. } => "pointer",
            Self::Reference { .. } => "reference",
            Self::RvalueReference { .. } => "rvalue reference",
            Self::PointerToMember { .. } => "pointer to member",
            Self::AppleBlock { .. } => "block",
            Self::Function { .. } => "function",
            Self::Operator { .. } => "operator",
            Self::Lambda { .. } => "lambda",
            Self::Conversion { .. } => "user-defined conversion",
            Self::UserDefLiteral { .. } => "user-defined literal",
            Self::Constructor { .. } => "constructor",
            Self::Destructor => "destructor",
        }
    }

    /// The child node ids, in payload order (parameters before return).
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Self::Placeholder
            | Self::Name
            | Self::Builtin { .. }
            | Self::Typedef { .. }
            | Self::Variadic
            | Self::Destructor => vec![],
            Self::Ecsu { of, .. } => of.iter().copied().collect(),
            Self::Array { of, .. } => vec![*of],
            Self::Pointer { to }
            | Self::Reference { to }
            | Self::RvalueReference { to }
            | Self::PointerToMember { to, .. } => vec![*to],
            Self::AppleBlock { params, ret }
            | Self::Function { params, ret, .. }
            | Self::Operator { params, ret }
            | Self::Lambda { params, ret }
            | Self::UserDefLiteral { params, ret } => {
                let mut ids = params.clone();
                ids.push(*ret);
                ids
            }
            Self::Conversion { ret } => vec![*ret],
            Self::Constructor { params } => params.clone(),
        }
    }

    /// Replace the child id `old` with `new`, wherever it occurs in the
    /// payload. Panics if `old` is not a child; that is always an internal
    /// error.
    pub(crate) fn replace_child(&mut self, old: NodeId, new: NodeId) {
        let slot = match self {
            Self::Ecsu { of: Some(of), .. } => of,
            Self::Array { of, .. } => of,
            Self::Pointer { to }
            | Self::Reference { to }
            | Self::RvalueReference { to }
            | Self::PointerToMember { to, .. } => to,
            Self::AppleBlock { params, ret }
            | Self::Function { params, ret, .. }
            | Self::Operator { params, ret }
            | Self::Lambda { params, ret }
            | Self::UserDefLiteral { params, ret } => {
                if let Some(p) = params.iter_mut().find(|p| **p == old) {
                    p
                } else {
                    ret
                }
            }
            Self::Conversion { ret } => ret,
            Self::Constructor { params } => params
                .iter_mut()
                .find(|p| **p == old)
                .expect("replace_child: no such child"),
            _ => panic!("replace_child: {} has no children", self.kind_name()),
        };
        assert_eq!(*slot, old, "replace_child: no such child");
        *slot = new;
    }
}

/// One node of the AST.
#[derive(Clone, Debug, PartialEq)]
pub struct AstNode {
    pub kind: AstKind,
    /// The sectored type bits that apply to this node
    pub type_id: TypeId,
    /// The declared name, if this node carries one
    pub name: Option<ScopedName>,
    /// Back-pointer; `None` for the root
    pub parent: Option<NodeId>,
    pub align: Alignment,
    pub span: Span,
}

impl AstNode {
    pub fn new(kind: AstKind, span: Span) -> Self {
        Self {
            kind,
            type_id: TypeId::empty(),
            name: None,
            parent: None,
            align: Alignment::None,
            span,
        }
    }

    pub fn with_type(mut self, type_id: TypeId) -> Self {
        self.type_id = type_id;
        self
    }

    pub fn with_name(mut self, name: ScopedName) -> Self {
        self.name = Some(name);
        self
    }

    /// The bit-field width of this node; 0 means no bit-field. Only the
    /// kinds in [KindSet::BIT_FIELD] can carry one.
    pub fn bit_width(&self) -> u32 {
        match &self.kind {
            AstKind::Builtin { bit_width }
            | AstKind::Ecsu { bit_width, .. }
            | AstKind::Typedef { bit_width, .. } => *bit_width,
            _ => 0,
        }
    }

    /// Set the bit-field width, if this kind can carry one.
    pub(crate) fn set_bit_width(&mut self, width: u32) -> bool {
        match &mut self.kind {
            AstKind::Builtin { bit_width }
            | AstKind::Ecsu { bit_width, .. }
            | AstKind::Typedef { bit_width, .. } => {
                *bit_width = width;
                true
            }
            _ => false,
        }
    }
}

/// Traversal direction for [SyntaxTree::visit].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    /// Pre-order: the node first, then its children in payload order
    Down,
    /// From the node back to the root, following parent pointers
    Up,
}

/// Arena that owns every node of one parse. Nodes are never removed;
/// detached nodes simply become unreachable and die with the tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyntaxTree {
    nodes: Vec<AstNode>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node to the arena. Parent links of its children are *not*
    /// established; use [attach] or build bottom-up with it.
    pub fn add(&mut self, node: AstNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        // Wire up children that already exist
        for child in node.kind.children() {
            self.nodes[child.index()].parent = Some(id);
        }
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut AstNode {
        &mut self.nodes[id.index()]
    }

    /// The children of a node, in payload order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id).kind.children()
    }

    /// Walk from `start` in the given direction, calling `visitor` on every
    /// node (including `start`). The visitor returns `true` to stop; the
    /// node that stopped the walk is returned.
    pub fn visit(
        &self,
        start: NodeId,
        direction: Direction,
        visitor: &mut dyn FnMut(NodeId, &AstNode) -> bool,
    ) -> Option<NodeId> {
        match direction {
            Direction::Down => self.visit_down(start, visitor),
            Direction::Up => {
                let mut cur = Some(start);
                while let Some(id) = cur {
                    if visitor(id, self.get(id)) {
                        return Some(id);
                    }
                    cur = self.get(id).parent;
                }
                None
            }
        }
    }

    fn visit_down(
        &self,
        id: NodeId,
        visitor: &mut dyn FnMut(NodeId, &AstNode) -> bool,
    ) -> Option<NodeId> {
        if visitor(id, self.get(id)) {
            return Some(id);
        }
        for child in self.children(id) {
            if let Some(found) = self.visit_down(child, visitor) {
                return Some(found);
            }
        }
        None
    }

    /// Find the first node (pre-order from `start`) whose kind is in `set`.
    pub fn find_kind(&self, start: NodeId, set: KindSet) -> Option<NodeId> {
        self.visit(start, Direction::Down, &mut |_, node| {
            set.contains(node.kind.kind_set())
        })
    }

    /// Find the first node (pre-order from `start`) that carries a name.
    pub fn find_name(&self, start: NodeId) -> Option<NodeId> {
        self.visit(start, Direction::Down, &mut |_, node| node.name.is_some())
    }

    /// Number of edges between a node and its root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cur = self.get(id).parent;
        while let Some(p) = cur {
            depth += 1;
            cur = self.get(p).parent;
        }
        depth
    }

    /// Follow parent pointers to the root.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while let Some(p) = self.get(cur).parent {
            cur = p;
        }
        cur
    }

    /// Deep-copy the subtree rooted at `root` (which may belong to
    /// `other == self` or to a different tree) into this tree. The copy's
    /// root has no parent.
    pub fn copy_subtree(&mut self, other: &SyntaxTree, root: NodeId) -> NodeId {
        let mut node = other.get(root).clone();
        let mut kind = node.kind.clone();
        for child in node.kind.children() {
            let copied = self.copy_subtree(other, child);
            kind.replace_child(child, copied);
        }
        node.kind = kind;
        node.parent = None;
        self.add(node)
    }

    /// Deep-copy the subtree rooted at `root` within this tree. The copy's
    /// root has no parent.
    pub fn duplicate(&mut self, root: NodeId) -> NodeId {
        let node = self.get(root).clone();
        let mut kind = node.kind.clone();
        for child in node.kind.children() {
            let copied = self.duplicate(child);
            kind.replace_child(child, copied);
        }
        let mut node = node;
        node.kind = kind;
        node.parent = None;
        self.add(node)
    }

    /// Structural equality of two subtrees, ignoring spans, node ids and
    /// parent pointers. Used for typedef redefinition and round-trip
    /// checks.
    pub fn structurally_eq(
        &self,
        a: NodeId,
        other: &SyntaxTree,
        b: NodeId,
    ) -> bool {
        let na = self.get(a);
        let nb = other.get(b);
        if na.type_id != nb.type_id || na.name != nb.name {
            return false;
        }
        match (&na.kind, &nb.kind) {
            (AstKind::Placeholder, AstKind::Placeholder)
            | (AstKind::Name, AstKind::Name)
            | (AstKind::Variadic, AstKind::Variadic)
            | (AstKind::Destructor, AstKind::Destructor) => true,
            (
                AstKind::Builtin { bit_width: wa },
                AstKind::Builtin { bit_width: wb },
            ) => wa == wb,
            (
                AstKind::Ecsu {
                    tag: ta,
                    of: oa,
                    bit_width: wa,
                },
                AstKind::Ecsu {
                    tag: tb,
                    of: ob,
                    bit_width: wb,
                },
            ) => {
                ta == tb
                    && wa == wb
                    && match (oa, ob) {
                        (None, None) => true,
                        (Some(oa), Some(ob)) => {
                            self.structurally_eq(*oa, other, *ob)
                        }
                        _ => false,
                    }
            }
            (
                AstKind::Typedef {
                    def: da,
                    bit_width: wa,
                },
                AstKind::Typedef {
                    def: db,
                    bit_width: wb,
                },
            ) => da.name == db.name && wa == wb,
            (
                AstKind::Array {
                    size: sa,
                    quals: qa,
                    of: oa,
                },
                AstKind::Array {
                    size: sb,
                    quals: qb,
                    of: ob,
                },
            ) => sa == sb && qa == qb && self.structurally_eq(*oa, other, *ob),
            (AstKind::Pointer { to: ta }, AstKind::Pointer { to: tb })
            | (AstKind::Reference { to: ta }, AstKind::Reference { to: tb })
            | (
                AstKind::RvalueReference { to: ta },
                AstKind::RvalueReference { to: tb },
            ) => self.structurally_eq(*ta, other, *tb),
            (
                AstKind::PointerToMember { class: ca, to: ta },
                AstKind::PointerToMember { class: cb, to: tb },
            ) => ca == cb && self.structurally_eq(*ta, other, *tb),
            (
                AstKind::Function {
                    params: pa,
                    ret: ra,
                    conv: va,
                },
                AstKind::Function {
                    params: pb,
                    ret: rb,
                    conv: vb,
                },
            ) => {
                va == vb
                    && self.params_eq(pa, other, pb)
                    && self.structurally_eq(*ra, other, *rb)
            }
            (
                AstKind::AppleBlock { params: pa, ret: ra },
                AstKind::AppleBlock { params: pb, ret: rb },
            )
            | (
                AstKind::Operator { params: pa, ret: ra },
                AstKind::Operator { params: pb, ret: rb },
            )
            | (
                AstKind::Lambda { params: pa, ret: ra },
                AstKind::Lambda { params: pb, ret: rb },
            )
            | (
                AstKind::UserDefLiteral { params: pa, ret: ra },
                AstKind::UserDefLiteral { params: pb, ret: rb },
            ) => {
                self.params_eq(pa, other, pb)
                    && self.structurally_eq(*ra, other, *rb)
            }
            (AstKind::Conversion { ret: ra }, AstKind::Conversion { ret: rb }) => {
                self.structurally_eq(*ra, other, *rb)
            }
            (
                AstKind::Constructor { params: pa },
                AstKind::Constructor { params: pb },
            ) => self.params_eq(pa, other, pb),
            _ => false,
        }
    }

    fn params_eq(
        &self,
        a: &[NodeId],
        other: &SyntaxTree,
        b: &[NodeId],
    ) -> bool {
        a.len() == b.len()
            && a.iter()
                .zip(b)
                .all(|(pa, pb)| self.structurally_eq(*pa, other, *pb))
    }

    /// Does the subtree still contain a [AstKind::Placeholder]?
    pub fn has_placeholder(&self, root: NodeId) -> bool {
        self.find_kind(root, KindSet::PLACEHOLDER).is_some()
    }
}
