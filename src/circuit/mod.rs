//! Hierarchical circuit composition.
//!
//! A keyboard's electronics are described as a tree of [`Section`]s, each
//! declaring public and private signals and containing components or
//! nested sections. [`Netlist`] resolves the tree into named nets.

pub mod board;
pub mod library;
pub mod netlist;
pub mod section;
pub mod subcircuits;

pub use board::{keyboard_circuit, KeyboardCircuit, PcbTransform};
pub use library::Part;
pub use netlist::{Net, NetId, Netlist, PlacedComponent};
pub use section::{Component, Node, Section};
pub use subcircuits::SubCircuit;
