//! Data models for keyboards, keys and poses.

pub mod key;
pub mod keyboard;
pub mod pose;

pub use key::{Bounds, Key, Stabilizer};
pub use keyboard::{
    Controller, Keyboard, OutlineKind, OutlineSettings, OutlineSpec, QmkSettings, Switch,
};
pub use pose::{Pose, Position};
