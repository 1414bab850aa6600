//! Net resolution over a section tree.
//!
//! Resolution walks the tree top-down in pre-order. Every section gets a
//! scope mapping its local signal names to nets; components record which
//! net each of their pads joins. Nets live in an arena addressed by
//! [`NetId`] with a name table guaranteeing unique names.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use super::section::{Component, Node, Section};
use crate::error::{KbError, Result};
use crate::models::Pose;

/// Stable index of a net in a [`Netlist`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NetId(pub u32);

/// A named electrical net.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Net {
    /// Arena index
    pub id: NetId,
    /// Unique name
    pub name: String,
}

/// Signal bindings of one resolved section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scope {
    /// Slash-joined section-id path
    pub path: String,
    /// Local signal name to net
    pub signals: BTreeMap<String, NetId>,
}

/// A pad connected to a net.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PadBinding {
    /// One-based pad number
    pub pad: usize,
    /// Pad name
    pub name: String,
    /// Connected net
    pub net: NetId,
}

/// A component after resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedComponent {
    /// Reference designator, e.g. `R3`
    pub reference: String,
    /// Path of the enclosing section
    pub path: String,
    /// Footprint id
    pub footprint: String,
    /// Component value
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    /// Placement
    pub pose: Pose,
    /// Connected pads in pad order; unconnected pads are omitted
    pub pads: Vec<PadBinding>,
}

/// Resolved circuit: nets, scopes and components.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Netlist {
    nets: Vec<Net>,
    #[serde(skip)]
    names: HashMap<String, NetId>,
    scopes: Vec<Scope>,
    components: Vec<PlacedComponent>,
    #[serde(skip)]
    reference_counters: HashMap<String, usize>,
}

impl Netlist {
    /// Creates an empty netlist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `root` into a fresh netlist, binding its public signals to
    /// nets created from `external` names.
    ///
    /// Every `(signal, net name)` pair in `external` creates a net first,
    /// so the caller controls the names of top-level nets such as ground.
    pub fn build(root: &Section, external: &[(&str, &str)]) -> Result<Self> {
        let mut netlist = Self::new();
        let mut bound = BTreeMap::new();
        for &(signal, name) in external {
            let id = netlist.create_net(name)?;
            bound.insert(signal.to_string(), id);
        }
        netlist.resolve(root, &bound)?;
        Ok(netlist)
    }

    /// Adds a net; names must be unique.
    pub fn create_net(&mut self, name: impl Into<String>) -> Result<NetId> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(KbError::DuplicateNet(name));
        }
        let id = NetId(u32::try_from(self.nets.len()).map_err(|_| {
            KbError::InvalidConfig("too many nets".to_string())
        })?);
        self.names.insert(name.clone(), id);
        self.nets.push(Net { id, name });
        Ok(id)
    }

    /// Resolves a section tree, with `external` binding public signals of
    /// `root` to existing nets.
    pub fn resolve(&mut self, root: &Section, external: &BTreeMap<String, NetId>) -> Result<()> {
        let mut path = Vec::new();
        self.resolve_section(root, external, &mut path)
    }

    fn resolve_section(
        &mut self,
        section: &Section,
        external: &BTreeMap<String, NetId>,
        path: &mut Vec<String>,
    ) -> Result<()> {
        path.push(section.id.clone());
        let here = path.join("/");

        for name in external.keys() {
            if !section.public_signals.contains(name) {
                warn!(path = %here, signal = %name, "binding for undeclared signal ignored");
            }
        }

        let mut local = BTreeMap::new();
        for name in &section.public_signals {
            let net = match external.get(name) {
                Some(&net) => net,
                None => {
                    debug!(path = %here, signal = %name, "synthesised net for unbound signal");
                    self.create_net(format!("{here}/{name}"))?
                }
            };
            local.insert(name.clone(), net);
        }
        for name in &section.private_signals {
            let net = self.create_net(format!("{here}/{name}"))?;
            local.insert(name.clone(), net);
        }

        self.scopes.push(Scope {
            path: here.clone(),
            signals: local.clone(),
        });

        for (child, mapping) in &section.children {
            let mut bound = BTreeMap::new();
            for (inner, outer) in mapping {
                let net = local.get(outer).copied().ok_or_else(|| KbError::UnresolvedSignal {
                    path: here.clone(),
                    signal: outer.clone(),
                    child: child.name().to_string(),
                })?;
                bound.insert(inner.clone(), net);
            }
            match child {
                Node::Component(component) => self.place(component, &bound, &here)?,
                Node::Section(nested) => self.resolve_section(nested, &bound, path)?,
            }
        }

        path.pop();
        Ok(())
    }

    fn place(
        &mut self,
        component: &Component,
        bound: &BTreeMap<String, NetId>,
        path: &str,
    ) -> Result<()> {
        if let Some(pin) = bound.keys().find(|pin| !component.has_pin(pin)) {
            return Err(KbError::UnknownPin {
                path: path.to_string(),
                component: component.footprint.clone(),
                pin: pin.clone(),
            });
        }

        let counter = self
            .reference_counters
            .entry(component.reference_prefix.clone())
            .or_insert(0);
        *counter += 1;
        let reference = format!("{}{}", component.reference_prefix, counter);

        let pads = component
            .pins
            .iter()
            .enumerate()
            .filter_map(|(i, name)| {
                bound.get(name).map(|&net| PadBinding {
                    pad: i + 1,
                    name: name.clone(),
                    net,
                })
            })
            .collect();

        self.components.push(PlacedComponent {
            reference,
            path: path.to_string(),
            footprint: component.footprint.clone(),
            value: component.value.clone(),
            pose: component.pose,
            pads,
        });
        Ok(())
    }

    /// All nets in creation order.
    #[must_use]
    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    /// Net by id.
    #[must_use]
    pub fn net(&self, id: NetId) -> Option<&Net> {
        self.nets.get(id.0 as usize)
    }

    /// Net id by name.
    #[must_use]
    pub fn find_net(&self, name: &str) -> Option<NetId> {
        self.names.get(name).copied()
    }

    /// Section scopes in pre-order.
    #[must_use]
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Scope of the section at `path`.
    #[must_use]
    pub fn scope(&self, path: &str) -> Option<&Scope> {
        self.scopes.iter().find(|s| s.path == path)
    }

    /// Components in pre-order.
    #[must_use]
    pub fn components(&self) -> &[PlacedComponent] {
        &self.components
    }

    /// Component by reference designator.
    #[must_use]
    pub fn component(&self, reference: &str) -> Option<&PlacedComponent> {
        self.components.iter().find(|c| c.reference == reference)
    }

    /// Every `(reference, pad)` connected to `net`.
    #[must_use]
    pub fn connections(&self, net: NetId) -> Vec<(&str, usize)> {
        self.components
            .iter()
            .flat_map(|c| {
                c.pads
                    .iter()
                    .filter(move |p| p.net == net)
                    .map(move |p| (c.reference.as_str(), p.pad))
            })
            .collect()
    }
}
