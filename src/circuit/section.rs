//! Circuit tree: sections of named signals containing components and
//! further sections.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::Pose;

/// Child-local signal (or pin) name to parent-local signal name.
pub type SignalMap = BTreeMap<String, String>;

/// A placed footprint.
///
/// `pins` lists the pad names in pad order (pad `n` is `pins[n - 1]`); a
/// name may repeat, in which case every pad with that name joins the net.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    /// Footprint id (`library:name`)
    pub footprint: String,
    /// Reference designator prefix (`R`, `C`, `U`, ...)
    pub reference_prefix: String,
    /// Component value
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    /// Placement
    pub pose: Pose,
    /// Pad names in pad order
    pub pins: Vec<String>,
    /// Whether the reference is shown on the silkscreen
    pub reference_visible: bool,
    /// Whether the value is shown on the silkscreen
    pub value_visible: bool,
}

impl Component {
    /// Whether the component has a pad called `name`.
    #[must_use]
    pub fn has_pin(&self, name: &str) -> bool {
        self.pins.iter().any(|p| p == name)
    }
}

/// Either a terminal component or a nested section.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Terminal footprint
    Component(Component),
    /// Nested section
    Section(Section),
}

impl Node {
    /// Name used in error messages: the section id or the footprint.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Component(c) => &c.footprint,
            Self::Section(s) => &s.id,
        }
    }
}

impl From<Component> for Node {
    fn from(value: Component) -> Self {
        Self::Component(value)
    }
}

impl From<Section> for Node {
    fn from(value: Section) -> Self {
        Self::Section(value)
    }
}

/// A reusable block of circuitry.
///
/// Public signals may be bound by the parent; unbound public signals and
/// all private signals get fresh nets named after the section path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Section {
    /// Identifier, unique among siblings
    pub id: String,
    /// Signals the parent may connect
    pub public_signals: BTreeSet<String>,
    /// Signals local to this section
    pub private_signals: BTreeSet<String>,
    /// Children in insertion order with their signal mapping
    pub children: Vec<(Node, SignalMap)>,
}

fn signal_map<K, V>(mapping: impl IntoIterator<Item = (K, V)>) -> SignalMap
where
    K: Into<String>,
    V: Into<String>,
{
    mapping
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

impl Section {
    /// Creates an empty section.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Declares public signals.
    pub fn with_public<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.public_signals.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declares private signals.
    pub fn with_private<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.private_signals.extend(names.into_iter().map(Into::into));
        self
    }

    /// Appends a child, mapping child-local names to names of this section.
    pub fn add<K, V>(
        mut self,
        child: impl Into<Node>,
        mapping: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.push(child, mapping);
        self
    }

    /// Appends a child in place.
    pub fn push<K, V>(&mut self, child: impl Into<Node>, mapping: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.children.push((child.into(), signal_map(mapping)));
    }

    /// Number of components in the whole subtree.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.children
            .iter()
            .map(|(node, _)| match node {
                Node::Component(_) => 1,
                Node::Section(s) => s.component_count(),
            })
            .sum()
    }
}
