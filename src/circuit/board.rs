//! Whole-keyboard circuit assembly.
//!
//! Converts a keyboard description into the root `keyboard` section plus
//! the board-level geometry an external PCB writer needs, all in PCB
//! coordinates (+y down, origin [`PCB_MARGIN`] beyond the outline).

use tracing::{debug, info};

use super::netlist::Netlist;
use super::section::Section;
use super::subcircuits::{matrix_signal, SubCircuit};
use crate::constants::PCB_MARGIN;
use crate::error::{KbError, Result};
use crate::models::{Controller, Keyboard, Pose, Position, Switch};

/// Maps keyboard coordinates (+y up) to PCB coordinates (+y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PcbTransform {
    x_offset: f64,
    y_offset: f64,
}

impl PcbTransform {
    /// Places the outline's minimum corner [`PCB_MARGIN`] from the origin.
    pub fn from_outline(outline: &[Position]) -> Result<Self> {
        if outline.is_empty() {
            return Err(KbError::EmptyLayout);
        }
        let min_x = outline.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = outline.iter().map(|p| -p.y).fold(f64::INFINITY, f64::min);
        Ok(Self {
            x_offset: PCB_MARGIN - min_x,
            y_offset: PCB_MARGIN - min_y,
        })
    }

    /// Converts a point.
    #[must_use]
    pub fn point(&self, p: Position) -> Position {
        Position::new(p.x + self.x_offset, -p.y + self.y_offset)
    }

    /// Converts a pose; mirroring the y axis negates the rotation.
    #[must_use]
    pub fn pose(&self, pose: Pose, flip: bool) -> Pose {
        let p = self.point(pose.position());
        let (sin, cos) = pose.r.to_radians().sin_cos();
        Pose::new(p.x, p.y, (-sin).atan2(cos).to_degrees()).with_flip(flip)
    }
}

/// Silkscreen text on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoText {
    /// Placement, PCB frame
    pub pose: Pose,
    /// Text
    pub text: String,
}

/// A keyboard's circuit and board geometry in PCB coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardCircuit {
    /// Root section `keyboard`
    pub root: Section,
    /// Board edge
    pub outline: Vec<Position>,
    /// Mounting hole centres
    pub holes: Vec<Position>,
    /// Mounting hole diameter in millimetres
    pub hole_diameter: f64,
    /// Optional silkscreen text
    pub info: Option<InfoText>,
}

impl KeyboardCircuit {
    /// Resolves the circuit, naming the root ground net `ground`.
    pub fn netlist(&self) -> Result<Netlist> {
        Netlist::build(&self.root, &[("ground", "ground")])
    }
}

const USB_MAPPING: [(&str, &str); 4] = [
    ("ground", "ground"),
    ("usb_vbus", "usb_vbus"),
    ("usb_dp", "usb_dp"),
    ("usb_dn", "usb_dn"),
];

/// Builds the circuit of `keyboard` with `outline` as board edge
/// (keyboard frame).
///
/// Every key must carry matrix pins within the controller's IO lines.
pub fn keyboard_circuit(keyboard: &Keyboard, outline: &[Position]) -> Result<KeyboardCircuit> {
    let io = keyboard.controller.io_lines();
    for (index, key) in keyboard.keys.iter().enumerate() {
        let (low, high) = key.pins().ok_or(KbError::UnassignedKey { index })?;
        if low.max(high) >= io {
            return Err(KbError::InvalidConfig(format!(
                "key {index} uses matrix line {} but {} has {io} IO lines",
                low.max(high),
                keyboard.controller
            )));
        }
    }

    let transform = PcbTransform::from_outline(outline)?;
    let matrix: Vec<String> = keyboard
        .used_matrix_lines()
        .into_iter()
        .map(matrix_signal)
        .collect();

    let mut root = Section::new("keyboard")
        .with_public(USB_MAPPING.iter().map(|&(name, _)| name))
        .with_public(matrix.iter().cloned());

    let controller_pose = transform.pose(keyboard.controller_pose, true);
    let connector_pose = transform.pose(keyboard.connector_pose, true);
    let matrix_mapping = || matrix.iter().map(|s| (s.clone(), s.clone()));
    let usb_and_matrix = || {
        USB_MAPPING
            .iter()
            .map(|&(a, b)| (a.to_string(), b.to_string()))
            .chain(matrix_mapping())
    };

    match keyboard.controller {
        Controller::ProMicro => {
            let controller = SubCircuit::ProMicro {
                pose: controller_pose,
            };
            root.push(
                controller.build("controller")?,
                std::iter::once(("ground".to_string(), "ground".to_string()))
                    .chain(matrix_mapping()),
            );
        }
        Controller::Stm32f072 | Controller::Atmega32u4 => {
            let usb = SubCircuit::UsbcLegacy {
                pose: connector_pose,
            };
            root.push(usb.build("usb")?, USB_MAPPING);
            let controller = if keyboard.controller == Controller::Stm32f072 {
                SubCircuit::Stm32f072 {
                    pose: controller_pose,
                }
            } else {
                SubCircuit::Atmega32u4 {
                    pose: controller_pose,
                }
            };
            root.push(controller.build("controller")?, usb_and_matrix());
        }
        Controller::Atmega32u4Hub2 => {
            let hub = SubCircuit::UsbcLegacyHub {
                pose: connector_pose,
                downstream: keyboard
                    .usb_downstream_poses
                    .iter()
                    .map(|p| transform.pose(*p, true))
                    .collect(),
            };
            root.push(
                hub.build("usb")?,
                [
                    ("ground", "ground"),
                    ("mcu_dp", "usb_dp"),
                    ("mcu_dn", "usb_dn"),
                    ("u_vbus", "usb_vbus"),
                ],
            );
            let controller = SubCircuit::Atmega32u4 {
                pose: controller_pose,
            };
            root.push(controller.build("controller")?, usb_and_matrix());
        }
    }

    match keyboard.switch {
        Switch::CherryMx => {
            for (i, key) in keyboard.keys.iter().enumerate() {
                let (low, high) = key.pins().ok_or(KbError::UnassignedKey { index: i })?;
                let set = SubCircuit::MxSwitchSet {
                    pose: transform.pose(key.pose, false),
                    switch_r: key.switch_r,
                    stabilizer: key.stabilizer,
                };
                root.push(
                    set.build(&format!("switch-{i}"))?,
                    [("a", matrix_signal(low)), ("b", matrix_signal(high))],
                );
            }
        }
    }

    debug!(
        controller = %keyboard.controller,
        matrix_lines = matrix.len(),
        components = root.component_count(),
        "assembled keyboard circuit"
    );
    info!(name = %keyboard.name, keys = keyboard.key_count(), "built keyboard circuit");

    Ok(KeyboardCircuit {
        root,
        outline: outline.iter().map(|p| transform.point(*p)).collect(),
        holes: keyboard
            .hole_positions
            .iter()
            .map(|p| transform.point(*p))
            .collect(),
        hole_diameter: keyboard.hole_diameter,
        info: Some(&keyboard.info_text)
            .filter(|text| !text.is_empty())
            .map(|text| InfoText {
                pose: transform.pose(keyboard.info_pose, true),
                text: text.clone(),
            }),
    })
}
