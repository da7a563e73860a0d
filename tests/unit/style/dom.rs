/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A small arena DOM implementing the style DOM traits.

use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use style::Atom;
use style::data::{InvalidationState, StyleChange};
use style::dom::{TDocument, TElement, TNode};

pub type NodeId = usize;

#[derive(Debug)]
enum NodeKind {
    Document,
    Element {
        local_name: Atom,
        id: Option<Atom>,
        classes: RefCell<Vec<Atom>>,
        shadow_pseudo_id: Option<Atom>,
        shadow_roots: Vec<NodeId>,
    },
    ShadowRoot,
    Text,
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
    invalidation_state: Cell<InvalidationState>,
    style_change: Cell<StyleChange>,
}

#[derive(Debug)]
pub struct TestDom {
    nodes: Vec<NodeData>,
}

impl TestDom {
    pub fn new() -> Self {
        let mut dom = TestDom { nodes: vec![] };
        dom.push(NodeKind::Document, None);
        dom
    }

    pub const DOCUMENT: NodeId = 0;

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(NodeData {
            kind,
            parent,
            first_child: None,
            last_child: None,
            next_sibling: None,
            invalidation_state: Cell::new(InvalidationState::Clean),
            style_change: Cell::new(StyleChange::NoStyleChange),
        });
        id
    }

    fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.push(kind, Some(parent));
        match self.nodes[parent].last_child {
            Some(last) => self.nodes[last].next_sibling = Some(id),
            None => self.nodes[parent].first_child = Some(id),
        }
        self.nodes[parent].last_child = Some(id);
        id
    }

    /// Appends `<local_name id=.. class=..>` to `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        local_name: &str,
        id: Option<&str>,
        classes: &[&str],
    ) -> NodeId {
        self.append(
            parent,
            NodeKind::Element {
                local_name: Atom::from(local_name),
                id: id.map(Atom::from),
                classes: RefCell::new(classes.iter().map(|c| Atom::from(*c)).collect()),
                shadow_pseudo_id: None,
                shadow_roots: vec![],
            },
        )
    }

    /// Unlinks `child` from its parent. The node keeps its subtree and its
    /// per-node state.
    pub fn remove_child(&mut self, child: NodeId) {
        let Some(parent) = self.nodes[child].parent.take() else {
            return;
        };
        let next = self.nodes[child].next_sibling.take();
        let mut previous = None;
        let mut current = self.nodes[parent].first_child;
        while let Some(id) = current {
            if id == child {
                break;
            }
            previous = Some(id);
            current = self.nodes[id].next_sibling;
        }
        match previous {
            Some(previous) => self.nodes[previous].next_sibling = next,
            None => self.nodes[parent].first_child = next,
        }
        if self.nodes[parent].last_child == Some(child) {
            self.nodes[parent].last_child = previous;
        }
    }

    /// Appends the detached node `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        assert!(self.nodes[child].parent.is_none(), "{} is still attached", child);
        self.nodes[child].parent = Some(parent);
        match self.nodes[parent].last_child {
            Some(last) => self.nodes[last].next_sibling = Some(child),
            None => self.nodes[parent].first_child = Some(child),
        }
        self.nodes[parent].last_child = Some(child);
    }

    pub fn append_text(&mut self, parent: NodeId) -> NodeId {
        self.append(parent, NodeKind::Text)
    }

    /// Attaches a new, youngest shadow root to `host`.
    pub fn attach_shadow_root(&mut self, host: NodeId) -> NodeId {
        let root = self.push(NodeKind::ShadowRoot, Some(host));
        match self.nodes[host].kind {
            NodeKind::Element {
                ref mut shadow_roots,
                ..
            } => shadow_roots.push(root),
            _ => panic!("{} is not an element", host),
        }
        root
    }

    pub fn set_shadow_pseudo_id(&mut self, element: NodeId, name: &str) {
        match self.nodes[element].kind {
            NodeKind::Element {
                ref mut shadow_pseudo_id,
                ..
            } => *shadow_pseudo_id = Some(Atom::from(name)),
            _ => panic!("{} is not an element", element),
        }
    }

    pub fn set_classes(&self, element: NodeId, classes: &[&str]) {
        match self.nodes[element].kind {
            NodeKind::Element {
                classes: ref old, ..
            } => *old.borrow_mut() = classes.iter().map(|c| Atom::from(*c)).collect(),
            _ => panic!("{} is not an element", element),
        }
    }

    pub fn document(&self) -> TestDocument<'_> {
        TestDocument(self.node(Self::DOCUMENT))
    }

    pub fn node(&self, id: NodeId) -> TestNode<'_> {
        TestNode { dom: self, id }
    }

    pub fn element(&self, id: NodeId) -> TestElement<'_> {
        self.node(id).as_element().expect("not an element")
    }

    pub fn style_change(&self, id: NodeId) -> StyleChange {
        self.nodes[id].style_change.get()
    }

    pub fn invalidation_state(&self, id: NodeId) -> InvalidationState {
        self.nodes[id].invalidation_state.get()
    }

    /// Every node is clean, as after a complete invalidation pass.
    pub fn all_clean(&self) -> bool {
        self.nodes
            .iter()
            .all(|node| node.invalidation_state.get() == InvalidationState::Clean)
    }
}

#[derive(Clone, Copy)]
pub struct TestNode<'a> {
    dom: &'a TestDom,
    id: NodeId,
}

impl<'a> TestNode<'a> {
    fn data(&self) -> &'a NodeData {
        &self.dom.nodes[self.id]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl<'a> PartialEq for TestNode<'a> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.dom, other.dom) && self.id == other.id
    }
}

impl<'a> fmt::Debug for TestNode<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<node {}>", self.id)
    }
}

impl<'a> TNode for TestNode<'a> {
    type ConcreteElement = TestElement<'a>;

    fn parent_or_shadow_host_node(&self) -> Option<Self> {
        self.data().parent.map(|id| self.dom.node(id))
    }

    fn first_child(&self) -> Option<Self> {
        self.data().first_child.map(|id| self.dom.node(id))
    }

    fn next_sibling(&self) -> Option<Self> {
        self.data().next_sibling.map(|id| self.dom.node(id))
    }

    fn as_element(&self) -> Option<TestElement<'a>> {
        match self.data().kind {
            NodeKind::Element { .. } => Some(TestElement(*self)),
            _ => None,
        }
    }

    fn invalidation_state(&self) -> InvalidationState {
        self.data().invalidation_state.get()
    }

    fn set_invalidation_state(&self, state: InvalidationState) {
        self.data().invalidation_state.set(state)
    }
}

#[derive(Clone, Copy, PartialEq)]
pub struct TestElement<'a>(TestNode<'a>);

impl<'a> Eq for TestElement<'a> {}

impl<'a> Hash for TestElement<'a> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state)
    }
}

impl<'a> TestElement<'a> {
    fn element_data(
        &self,
    ) -> (
        &'a Atom,
        &'a Option<Atom>,
        &'a RefCell<Vec<Atom>>,
        &'a Option<Atom>,
        &'a [NodeId],
    ) {
        match self.0.data().kind {
            NodeKind::Element {
                ref local_name,
                ref id,
                ref classes,
                ref shadow_pseudo_id,
                ref shadow_roots,
            } => (local_name, id, classes, shadow_pseudo_id, &shadow_roots[..]),
            _ => unreachable!(),
        }
    }
}

impl<'a> fmt::Debug for TestElement<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (local_name, id, classes, ..) = self.element_data();
        write!(f, "<{} #{}", local_name, self.0.id)?;
        if let Some(id) = id {
            write!(f, " id={}", id)?;
        }
        for class in classes.borrow().iter() {
            write!(f, " .{}", class)?;
        }
        write!(f, ">")
    }
}

impl<'a> TElement for TestElement<'a> {
    type ConcreteNode = TestNode<'a>;

    fn as_node(&self) -> TestNode<'a> {
        self.0
    }

    fn local_name(&self) -> &Atom {
        self.element_data().0
    }

    fn id(&self) -> Option<&Atom> {
        self.element_data().1.as_ref()
    }

    fn each_class<F>(&self, mut callback: F)
    where
        F: FnMut(&Atom),
    {
        for class in self.element_data().2.borrow().iter() {
            callback(class)
        }
    }

    fn shadow_pseudo_id(&self) -> Option<&Atom> {
        self.element_data().3.as_ref()
    }

    fn shadow_roots(&self) -> SmallVec<[TestNode<'a>; 1]> {
        self.element_data()
            .4
            .iter()
            .map(|&id| self.0.dom.node(id))
            .collect()
    }

    fn style_change(&self) -> StyleChange {
        self.0.data().style_change.get()
    }

    fn set_needs_style_recalc(&self, change: StyleChange) {
        let cell = &self.0.data().style_change;
        if change > cell.get() {
            cell.set(change);
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TestDocument<'a>(TestNode<'a>);

impl<'a> TDocument for TestDocument<'a> {
    type ConcreteNode = TestNode<'a>;

    fn as_node(&self) -> TestNode<'a> {
        self.0
    }
}

#[test]
fn children_and_siblings() {
    let mut dom = TestDom::new();
    let html = dom.append_element(TestDom::DOCUMENT, "html", None, &[]);
    let a = dom.append_element(html, "a", None, &[]);
    dom.append_text(html);
    let b = dom.append_element(html, "b", None, &["x"]);

    let children: Vec<NodeId> = dom.node(html).dom_children().map(|n| n.id()).collect();
    assert_eq!(children.len(), 3);
    assert_eq!(children[0], a);
    assert_eq!(children[2], b);
    assert_eq!(dom.document().document_element(), Some(dom.element(html)));
    assert!(dom.element(b).has_class(&Atom::from("x")));
    assert!(!dom.element(a).has_class(&Atom::from("x")));
}

#[test]
fn marking_propagates_through_shadow_hosts() {
    let mut dom = TestDom::new();
    let html = dom.append_element(TestDom::DOCUMENT, "html", None, &[]);
    let host = dom.append_element(html, "div", None, &[]);
    let root = dom.attach_shadow_root(host);
    let inner = dom.append_element(root, "span", None, &[]);

    dom.node(inner).set_needs_style_invalidation();
    assert_eq!(dom.invalidation_state(inner), InvalidationState::SelfDirty);
    for id in [root, host, html, TestDom::DOCUMENT] {
        assert_eq!(dom.invalidation_state(id), InvalidationState::DescendantDirty);
    }

    dom.node(host).set_needs_style_invalidation();
    assert_eq!(
        dom.invalidation_state(host),
        InvalidationState::SelfAndDescendantDirty
    );
}

#[test]
fn remove_and_reinsert() {
    let mut dom = TestDom::new();
    let html = dom.append_element(TestDom::DOCUMENT, "html", None, &[]);
    let a = dom.append_element(html, "a", None, &[]);
    let b = dom.append_element(html, "b", None, &[]);
    let c = dom.append_element(html, "c", None, &[]);

    dom.remove_child(b);
    let children: Vec<NodeId> = dom.node(html).dom_children().map(|n| n.id()).collect();
    assert_eq!(children, [a, c]);
    assert!(dom.node(b).parent_or_shadow_host_node().is_none());

    dom.remove_child(c);
    dom.append_child(html, b);
    let children: Vec<NodeId> = dom.node(html).dom_children().map(|n| n.id()).collect();
    assert_eq!(children, [a, b]);
    assert_eq!(dom.node(b).parent_or_shadow_host_node(), Some(dom.node(html)));
}
