// Copyright 2026 The Matrix.org Foundation C.I.C.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A minimal arena DOM fed by html5ever's fragment parser. Only the
//! shapes the markup converter needs survive: elements with their
//! attributes, text runs, and an `Ignored` placeholder for node kinds
//! pasted markup can legally contain but we never render (comments,
//! processing instructions).

use std::cell::{Ref, RefCell};

use html5ever::interface::NextParserState;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{
    namespace_url, ns, parse_fragment, Attribute, LocalName, QualName,
};

/// Index into the arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NodeHandle(pub(crate) usize);

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ParsedNode {
    Document {
        children: Vec<NodeHandle>,
    },
    Element {
        name: QualName,
        attrs: Vec<(String, String)>,
        children: Vec<NodeHandle>,
    },
    Text {
        content: String,
    },
    /// Parsed but never rendered (comments, PIs, doctypes).
    Ignored,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ParsedDom {
    nodes: Vec<ParsedNode>,
    document: NodeHandle,
}

impl ParsedDom {
    fn new() -> Self {
        Self {
            nodes: vec![ParsedNode::Document {
                children: Vec::new(),
            }],
            document: NodeHandle(0),
        }
    }

    pub(crate) fn document(&self) -> &NodeHandle {
        &self.document
    }

    pub(crate) fn get(&self, handle: &NodeHandle) -> &ParsedNode {
        &self.nodes[handle.0]
    }

    fn get_mut(&mut self, handle: &NodeHandle) -> &mut ParsedNode {
        &mut self.nodes[handle.0]
    }

    fn add(&mut self, node: ParsedNode) -> NodeHandle {
        self.nodes.push(node);
        NodeHandle(self.nodes.len() - 1)
    }

    fn name(&self, handle: &NodeHandle) -> &QualName {
        match self.get(handle) {
            ParsedNode::Element { name, .. } => name,
            _ => &EMPTY_NAME,
        }
    }

    fn children_mut(
        &mut self,
        handle: &NodeHandle,
    ) -> Option<&mut Vec<NodeHandle>> {
        match self.get_mut(handle) {
            ParsedNode::Document { children }
            | ParsedNode::Element { children, .. } => Some(children),
            _ => None,
        }
    }
}

static EMPTY_NAME: once_cell::sync::Lazy<QualName> =
    once_cell::sync::Lazy::new(|| qual_name(""));

pub(crate) fn qual_name(name: &str) -> QualName {
    QualName::new(None, ns!(html), LocalName::from(name))
}

/// Markup the tree builder could not express in the arena; the caller
/// falls back to plain text.
#[derive(Clone, Debug)]
pub(crate) struct MarkupRejected {
    pub(crate) reasons: Vec<String>,
}

struct SinkState {
    dom: ParsedDom,
    rejections: Vec<String>,
}

/// Builds a [`ParsedDom`] while html5ever drives the tree construction.
/// Tree operations pasted chat markup never triggers (templates,
/// foster-parented tables, forms) record a rejection instead of building
/// a wrong tree.
struct DomBuilder {
    state: RefCell<SinkState>,
}

impl DomBuilder {
    fn new() -> Self {
        Self {
            state: RefCell::new(SinkState {
                dom: ParsedDom::new(),
                rejections: Vec::new(),
            }),
        }
    }

    fn reject(&self, reason: &str) {
        self.state.borrow_mut().rejections.push(reason.to_owned());
    }

    /// A throwaway handle for node kinds we never render.
    fn ignored_node(&self) -> NodeHandle {
        self.state.borrow_mut().dom.add(ParsedNode::Ignored)
    }
}

pub(crate) fn parse(html: &str) -> Result<ParsedDom, MarkupRejected> {
    parse_fragment(DomBuilder::new(), Default::default(), qual_name(""), vec![])
        .from_utf8()
        .one(html.as_bytes())
}

impl TreeSink for DomBuilder {
    type Handle = NodeHandle;
    type Output = Result<ParsedDom, MarkupRejected>;
    type ElemName<'a> = Ref<'a, QualName>;

    fn finish(self) -> Self::Output {
        let state = self.state.into_inner();
        if state.rejections.is_empty() {
            Ok(state.dom)
        } else {
            Err(MarkupRejected {
                reasons: state.rejections,
            })
        }
    }

    fn parse_error(&self, msg: std::borrow::Cow<'static, str>) {
        // Recoverable per the HTML spec; the builder's tree is still
        // usable, so these never force the plain-text fallback.
        tracing::debug!(%msg, "recoverable markup error in pasted content");
    }

    fn get_document(&self) -> Self::Handle {
        self.state.borrow().dom.document().clone()
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        Ref::map(self.state.borrow(), |state| state.dom.name(target))
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let attrs = attrs
            .iter()
            .map(|attr| {
                (
                    attr.name.local.as_ref().to_owned(),
                    attr.value.as_ref().to_owned(),
                )
            })
            .collect();
        self.state.borrow_mut().dom.add(ParsedNode::Element {
            name,
            attrs,
            children: Vec::new(),
        })
    }

    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        self.ignored_node()
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        self.ignored_node()
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let state = &mut *self.state.borrow_mut();
        let dom = &mut state.dom;
        match child {
            NodeOrText::AppendNode(child) => {
                match dom.children_mut(parent) {
                    Some(children) => children.push(child),
                    None => state
                        .rejections
                        .push("append to a non-container node".to_owned()),
                }
            }
            NodeOrText::AppendText(tendril) => {
                // Merge with a trailing text sibling so split tendrils
                // come out as one run.
                let merge_into = match dom.get(parent) {
                    ParsedNode::Text { .. } => Some(parent.clone()),
                    ParsedNode::Document { children }
                    | ParsedNode::Element { children, .. } => children
                        .last()
                        .filter(|last| {
                            matches!(dom.get(last), ParsedNode::Text { .. })
                        })
                        .cloned(),
                    ParsedNode::Ignored => None,
                };
                if let Some(handle) = merge_into {
                    if let ParsedNode::Text { content } = dom.get_mut(&handle) {
                        content.push_str(tendril.as_ref());
                    }
                } else {
                    let text = dom.add(ParsedNode::Text {
                        content: tendril.as_ref().to_owned(),
                    });
                    match dom.children_mut(parent) {
                        Some(children) => children.push(text),
                        None => state
                            .rejections
                            .push("text under a non-container node".to_owned()),
                    }
                }
            }
        }
    }

    fn append_based_on_parent_node(
        &self,
        _element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        // Foster parenting only fires for misplaced table content; the
        // template-less fallback target is good enough here.
        self.append(prev_element, child);
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        // Doctypes in a pasted fragment carry no content.
    }

    fn mark_script_already_started(&self, _node: &Self::Handle) {}

    fn pop(&self, _node: &Self::Handle) {}

    fn get_template_contents(&self, _target: &Self::Handle) -> Self::Handle {
        self.reject("template contents");
        self.ignored_node()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(
        &self,
        _sibling: &Self::Handle,
        _new_node: NodeOrText<Self::Handle>,
    ) {
        self.reject("sibling insertion");
    }

    fn add_attrs_if_missing(
        &self,
        target: &Self::Handle,
        attrs: Vec<Attribute>,
    ) {
        let state = &mut *self.state.borrow_mut();
        if let ParsedNode::Element {
            attrs: existing, ..
        } = state.dom.get_mut(target)
        {
            for attr in attrs {
                let name = attr.name.local.as_ref();
                if !existing.iter().any(|(n, _)| n == name) {
                    existing.push((
                        name.to_owned(),
                        attr.value.as_ref().to_owned(),
                    ));
                }
            }
        }
    }

    fn associate_with_form(
        &self,
        _target: &Self::Handle,
        _form: &Self::Handle,
        _nodes: (&Self::Handle, Option<&Self::Handle>),
    ) {
    }

    fn remove_from_parent(&self, _target: &Self::Handle) {
        self.reject("node removal");
    }

    fn reparent_children(
        &self,
        _node: &Self::Handle,
        _new_parent: &Self::Handle,
    ) {
        self.reject("reparenting");
    }

    fn is_mathml_annotation_xml_integration_point(
        &self,
        _handle: &Self::Handle,
    ) -> bool {
        false
    }

    fn set_current_line(&self, _line_number: u64) {}

    fn complete_script(&self, _node: &Self::Handle) -> NextParserState {
        NextParserState::Continue
    }

    fn allow_declarative_shadow_roots(
        &self,
        _intended_parent: &Self::Handle,
    ) -> bool {
        false
    }

    fn attach_declarative_shadow(
        &self,
        _location: &Self::Handle,
        _template: &Self::Handle,
        _attrs: Vec<Attribute>,
    ) -> Result<(), String> {
        self.reject("declarative shadow root");
        Err("declarative shadow roots are not supported".to_owned())
    }
}
