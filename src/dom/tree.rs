use crate::dom::label::derive_label;
use crate::dom::snapshot::HtmlSnapshot;
use crate::error::{Result, SeiError};
use serde::{Deserialize, Serialize};

/// A clickable anchor of a record's navigation tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationNode {
    /// Derived visible label
    pub label: String,

    /// `id` attribute of the anchor
    pub locator_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

/// Flat, render-ordered list of the nodes of one tree snapshot
///
/// The portal mutates the tree between renders, so a `NavigationTree` is rebuilt
/// from a fresh snapshot on every lookup and never cached across navigations.
#[derive(Debug, Clone, Default)]
pub struct NavigationTree {
    nodes: Vec<NavigationNode>,
}

impl NavigationTree {
    /// Collect every `a[id]` that has a label
    pub fn from_snapshot(snapshot: &HtmlSnapshot) -> Self {
        let nodes = snapshot
            .anchors_with_id()
            .filter_map(|anchor| {
                let element = anchor.value();
                let locator_id = element.attr("id").filter(|id| !id.is_empty())?;
                Some(NavigationNode {
                    label: derive_label(anchor)?,
                    locator_id: locator_id.to_string(),
                    href: element.attr("href").map(str::to_string),
                })
            })
            .collect();
        Self { nodes }
    }

    pub fn from_html(source: &str) -> Self {
        Self::from_snapshot(&HtmlSnapshot::parse(source))
    }

    pub fn nodes(&self) -> &[NavigationNode] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<NavigationNode> {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node, in render order, whose label contains `label`
    ///
    /// Best effort: when several labels contain `label` ("Processo 1" and
    /// "Processo 10" for "Processo 1") the earliest one is returned without
    /// reporting the ambiguity. Use [`NavigationTree::resolve_unique`] to detect it.
    pub fn resolve(&self, label: &str) -> Result<&NavigationNode> {
        self.nodes
            .iter()
            .find(|node| node.label.contains(label))
            .ok_or_else(|| SeiError::NotFound(format!("tree node '{}'", label)))
    }

    /// Node whose label contains `label`, failing when the match is ambiguous
    ///
    /// A node whose label equals `label` exactly wins over substring matches; two or
    /// more exact matches, or two or more substring matches without an exact one,
    /// fail with `AmbiguousMatch`.
    pub fn resolve_unique(&self, label: &str) -> Result<&NavigationNode> {
        let exact: Vec<_> = self.nodes.iter().filter(|node| node.label == label).collect();
        let candidates = if exact.is_empty() {
            self.nodes.iter().filter(|node| node.label.contains(label)).collect()
        } else {
            exact
        };

        match candidates.as_slice() {
            [] => Err(SeiError::NotFound(format!("tree node '{}'", label))),
            [node] => Ok(*node),
            many => Err(SeiError::AmbiguousMatch { label: label.to_string(), count: many.len() }),
        }
    }

    /// Node whose label equals `label`
    pub fn get(&self, label: &str) -> Option<&NavigationNode> {
        self.nodes.iter().find(|node| node.label == label)
    }
}
