//! Reusable sub-circuits: controllers, USB ports and switch sets.
//!
//! Offsets are millimetres in the PCB frame (+y down) relative to the
//! sub-circuit pose.

use super::library::Part;
use super::section::Section;
use crate::error::{KbError, Result};
use crate::models::{Controller, Pose, Stabilizer};

/// Name of the root signal carrying matrix line `line`.
#[must_use]
pub fn matrix_signal(line: usize) -> String {
    format!("matrix-{line}")
}

const USB_SIGNALS: [&str; 4] = ["ground", "usb_vbus", "usb_dp", "usb_dn"];

/// Upper bound on ports behind the hub.
pub const MAX_DOWNSTREAM_PORTS: usize = 2;

/// The closed set of sub-circuits a keyboard is assembled from.
#[derive(Debug, Clone, PartialEq)]
pub enum SubCircuit {
    /// Pro Micro daughterboard on the matrix lines.
    ProMicro {
        /// Placement
        pose: Pose,
    },
    /// STM32F072 with regulator, decoupling and SWD pads.
    Stm32f072 {
        /// Placement
        pose: Pose,
    },
    /// ATmega32U4 with crystal, decoupling and ISP pads.
    Atmega32u4 {
        /// Placement
        pose: Pose,
    },
    /// USB-C receptacle wired as a legacy device port.
    UsbcLegacy {
        /// Placement
        pose: Pose,
    },
    /// USB-C upstream port feeding an SL2.1A hub with the MCU on port 1
    /// and up to two USB-C downstream ports.
    UsbcLegacyHub {
        /// Upstream receptacle placement
        pose: Pose,
        /// Downstream receptacle placements
        downstream: Vec<Pose>,
    },
    /// Switch with its matrix diode and optional stabilizer.
    MxSwitchSet {
        /// Key centre
        pose: Pose,
        /// Switch rotation relative to the key, keyboard frame
        switch_r: f64,
        /// Stabilizer, if any
        stabilizer: Option<Stabilizer>,
    },
}

fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|&(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

/// Pairs each matrix-capable MCU pad with its `matrix-<n>` signal.
fn matrix_pads(controller: Controller, pad_prefix: &str) -> Vec<(String, String)> {
    controller
        .matrix_pin_names()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            (
                format!("{pad_prefix}{}", name.to_ascii_lowercase()),
                matrix_signal(i),
            )
        })
        .collect()
}

fn matrix_signals(controller: Controller) -> impl Iterator<Item = String> {
    (0..controller.io_lines()).map(matrix_signal)
}

impl SubCircuit {
    /// Public signals the parent may connect.
    #[must_use]
    pub fn public_signals(&self) -> Vec<String> {
        let fixed: &[&str] = match self {
            Self::ProMicro { .. } => &["ground"],
            Self::Stm32f072 { .. } | Self::Atmega32u4 { .. } | Self::UsbcLegacy { .. } => {
                &USB_SIGNALS
            }
            Self::UsbcLegacyHub { .. } => &["ground", "u_vbus", "mcu_dp", "mcu_dn"],
            Self::MxSwitchSet { .. } => &["a", "b"],
        };
        let mut signals: Vec<String> = fixed.iter().map(|s| (*s).to_string()).collect();
        match self {
            Self::ProMicro { .. } => signals.extend(matrix_signals(Controller::ProMicro)),
            Self::Stm32f072 { .. } => signals.extend(matrix_signals(Controller::Stm32f072)),
            Self::Atmega32u4 { .. } => signals.extend(matrix_signals(Controller::Atmega32u4)),
            _ => {}
        }
        signals
    }

    /// Builds the section with identifier `id`.
    pub fn build(&self, id: &str) -> Result<Section> {
        let section = Section::new(id).with_public(self.public_signals());
        match self {
            Self::ProMicro { pose } => Ok(pro_micro(section, *pose)),
            Self::Stm32f072 { pose } => Ok(stm32f072(section, *pose)),
            Self::Atmega32u4 { pose } => Ok(atmega32u4(section, *pose)),
            Self::UsbcLegacy { pose } => Ok(usbc_legacy(section, *pose)),
            Self::UsbcLegacyHub { pose, downstream } => {
                usbc_legacy_hub(section, *pose, downstream)
            }
            Self::MxSwitchSet {
                pose,
                switch_r,
                stabilizer,
            } => mx_switch_set(section, *pose, *switch_r, *stabilizer),
        }
    }
}

fn pro_micro(section: Section, pose: Pose) -> Section {
    let mut mapping = owned(&[("ground", "ground")]);
    mapping.extend(matrix_pads(Controller::ProMicro, ""));
    section.add(
        Part::ProMicro.at(pose.offset(0.0, 17.78 - 9.525, 90.0, false)),
        mapping,
    )
}

fn stm32f072(section: Section, pose: Pose) -> Section {
    let mut mcu = owned(&[
        ("ground", "ground"),
        ("reset", "reset"),
        ("vcc", "mcu_vcc"),
        ("a11", "usb_dn"),
        ("a12", "usb_dp"),
        ("a13", "swdio"),
        ("a14", "swdclk"),
    ]);
    mcu.extend(matrix_pads(Controller::Stm32f072, ""));

    let decoupling = |dx: f64, dy: f64, r: f64, a: &'static str, b: &'static str| {
        (
            Part::Capacitor0603.with_value("0.1 µF", pose.offset(dx, dy, r, false)),
            [("a", a), ("b", b)],
        )
    };

    let mut section = section
        .with_private(["swdio", "swdclk", "reset", "mcu_vcc"])
        .add(Part::Stm32f072.at(pose.offset(0.0, 0.0, 225.0, false)), mcu)
        .add(
            Part::TagConnect2030.at(pose.offset(0.0, 19.0, -90.0, false)),
            [
                ("1", "mcu_vcc"),
                ("2", "swdio"),
                ("3", "reset"),
                ("4", "swdclk"),
                ("5", "ground"),
            ],
        );
    for (cap, mapping) in [
        decoupling(7.0, 0.0, 90.0, "mcu_vcc", "ground"),
        decoupling(-7.0, 0.0, 90.0, "ground", "mcu_vcc"),
        decoupling(0.0, -7.0, 0.0, "mcu_vcc", "ground"),
        decoupling(0.0, 7.0, 0.0, "ground", "mcu_vcc"),
    ] {
        section.push(cap, mapping);
    }
    section.add(
        Part::RegulatorSot23.at(pose.offset(0.0, -10.0, 0.0, false)),
        [("ground", "ground"), ("vin", "usb_vbus"), ("vout", "mcu_vcc")],
    )
}

fn atmega32u4(section: Section, pose: Pose) -> Section {
    // Passives sit on a 45° diagonal around the package.
    const STEP: f64 = 2.12;
    let diagonal = |n: f64, right: bool, up: bool, r: f64| {
        let dx = if right { 11.0 - STEP * n } else { -11.0 + STEP * n };
        let dy = if up { -STEP * n } else { STEP * n };
        pose.offset(dx, dy, r, false)
    };

    let mut mcu = owned(&[
        ("ground", "ground"),
        ("reset", "reset"),
        ("vcc", "usb_vbus"),
        ("dp", "usb_dp"),
        ("dn", "usb_dn"),
        ("icsp_sck", "icsp_sck"),
        ("icsp_mosi", "icsp_mosi"),
        ("icsp_miso", "icsp_miso"),
        ("ucap", "ucap"),
        ("xtal1", "xtal1"),
        ("xtal2", "xtal2"),
    ]);
    mcu.extend(matrix_pads(Controller::Atmega32u4, "p"));

    let crystal = pose.offset(0.0, 13.0, 90.0, false);
    let mut section = section
        .with_private([
            "reset",
            "icsp_sck",
            "icsp_mosi",
            "icsp_miso",
            "ucap",
            "xtal1",
            "xtal2",
        ])
        .add(
            Part::Capacitor0603.with_value("10 µF", diagonal(4.5, true, true, 45.0)),
            [("a", "ground"), ("b", "usb_vbus")],
        )
        .add(Part::Atmega32u4.at(pose.offset(0.0, 0.0, 135.0, false)), mcu)
        .add(
            Part::Crystal3225.with_value("16 MHz", crystal),
            [("ground", "ground"), ("in", "xtal1"), ("out", "xtal2")],
        )
        .add(
            Part::Capacitor0603.with_value("22 pF", crystal.offset(0.0, -2.45, 0.0, false)),
            [("a", "xtal1"), ("b", "ground")],
        )
        .add(
            Part::Capacitor0603.with_value("22 pF", crystal.offset(0.0, 2.45, 0.0, false)),
            [("a", "xtal2"), ("b", "ground")],
        )
        .add(
            Part::TagConnect2030.at(pose.offset(0.0, 19.0, -90.0, false)),
            [
                ("1", "icsp_miso"),
                ("2", "usb_vbus"),
                ("3", "icsp_sck"),
                ("4", "icsp_mosi"),
                ("5", "reset"),
                ("6", "ground"),
            ],
        )
        .add(
            Part::Capacitor0603.with_value("1 µF", diagonal(2.5, true, true, 45.0)),
            [("a", "ground"), ("b", "ucap")],
        )
        .add(
            Part::Resistor0603.with_value("10 kΩ", diagonal(1.0, true, false, -45.0)),
            [("a", "usb_vbus"), ("b", "reset")],
        );

    for (at, a, b) in [
        (diagonal(2.0, true, false, -45.0), "ground", "usb_vbus"),
        (diagonal(4.0, false, false, 45.0), "usb_vbus", "ground"),
        (diagonal(4.0, false, true, -45.0), "ground", "usb_vbus"),
        (diagonal(1.0, false, true, -45.0), "usb_vbus", "ground"),
    ] {
        section.push(
            Part::Capacitor0603.with_value("0.1 µF", at),
            [("a", a), ("b", b)],
        );
    }
    section
}

/// USB-C receptacle in legacy device mode: 5.1 kΩ pull-downs on both CC
/// pins and ESD protection on the data pair.
fn upstream_port(
    section: Section,
    pose: Pose,
    [vbus, dp, dn, cc1, cc2]: [&str; 5],
) -> Section {
    section
        .add(
            Part::UsbC.at(pose),
            [
                ("ground", "ground"),
                ("vbus", vbus),
                ("dp", dp),
                ("dn", dn),
                ("cc1", cc1),
                ("cc2", cc2),
            ],
        )
        .add(
            Part::Resistor0603.with_value("5.1 kΩ", pose.offset(-2.3, 10.5, 90.0, false)),
            [("a", "ground"), ("b", cc1)],
        )
        .add(
            Part::Resistor0603.with_value("5.1 kΩ", pose.offset(2.3, 10.5, 90.0, false)),
            [("b", "ground"), ("a", cc2)],
        )
        .add(
            Part::UsbEsd.at(pose.offset(0.0, 9.6, 270.0, false)),
            [("ground", "ground"), ("dp", dp), ("dn", dn)],
        )
}

fn usbc_legacy(section: Section, pose: Pose) -> Section {
    upstream_port(
        section.with_private(["cc1", "cc2"]),
        pose,
        ["usb_vbus", "usb_dp", "usb_dn", "cc1", "cc2"],
    )
}

fn usbc_legacy_hub(section: Section, pose: Pose, downstream: &[Pose]) -> Result<Section> {
    if downstream.len() > MAX_DOWNSTREAM_PORTS {
        return Err(KbError::InvalidConfig(format!(
            "the USB hub supports at most {MAX_DOWNSTREAM_PORTS} downstream ports, got {}",
            downstream.len()
        )));
    }

    let mut section = upstream_port(
        section.with_private([
            "u_dp",
            "u_dn",
            "u_cc1",
            "u_cc2",
            "d1_dp",
            "d1_dn",
            "d2_dp",
            "d2_dn",
            "d1_cc1",
            "d1_cc2",
            "d2_cc1",
            "d2_cc2",
            "vdd18_cap",
            "vdd33_cap",
            "xtal1",
            "xtal2",
        ]),
        pose,
        ["u_vbus", "u_dp", "u_dn", "u_cc1", "u_cc2"],
    );

    // Downstream-facing ports advertise default USB power with 56 kΩ
    // pull-ups to VBUS.
    for (port, at) in downstream.iter().enumerate() {
        let net = |suffix: &str| format!("d{}_{suffix}", port + 1);
        let (dp, dn, cc1, cc2) = (net("dp"), net("dn"), net("cc1"), net("cc2"));
        section.push(
            Part::UsbC.at(*at),
            [
                ("ground", "ground"),
                ("vbus", "u_vbus"),
                ("dp", dp.as_str()),
                ("dn", dn.as_str()),
                ("cc1", cc1.as_str()),
                ("cc2", cc2.as_str()),
            ],
        );
        section.push(
            Part::Resistor0603.with_value("56 kΩ", at.offset(-2.3, 10.5, 90.0, false)),
            [("a", "u_vbus"), ("b", cc1.as_str())],
        );
        section.push(
            Part::Resistor0603.with_value("56 kΩ", at.offset(2.3, 10.5, 90.0, false)),
            [("b", "u_vbus"), ("a", cc2.as_str())],
        );
    }

    let hub = pose.offset(10.0, 0.0, 0.0, false);
    Ok(section
        .add(
            Part::Sl21a.at(hub),
            [
                ("gnd", "ground"),
                ("vdd5", "u_vbus"),
                ("dp", "u_dp"),
                ("dn", "u_dn"),
                ("dp1", "mcu_dp"),
                ("dn1", "mcu_dn"),
                ("dp2", "d1_dp"),
                ("dn2", "d1_dn"),
                ("dp3", "d2_dp"),
                ("dn3", "d2_dn"),
                ("vdd18", "vdd18_cap"),
                ("vdd33", "vdd33_cap"),
                ("xout", "xtal1"),
                ("xin", "xtal2"),
            ],
        )
        .add(
            Part::Crystal3225.with_value("12 MHz", hub.offset(5.0, 0.0, 0.0, false)),
            [("ground", "ground"), ("in", "xtal1"), ("out", "xtal2")],
        )
        .add(
            Part::Capacitor0603.with_value("10 µF", pose.offset(15.0, 0.0, 0.0, false)),
            [("a", "vdd18_cap"), ("b", "ground")],
        )
        .add(
            Part::Capacitor0603.with_value("10 µF", pose.offset(20.0, 0.0, 0.0, false)),
            [("a", "vdd33_cap"), ("b", "ground")],
        )
        .add(
            Part::Capacitor0603.with_value("10 µF", pose.offset(25.0, 0.0, 0.0, false)),
            [("a", "u_vbus"), ("b", "ground")],
        ))
}

/// Rotations are negated because the PCB frame has +y down.
fn mx_switch_set(
    section: Section,
    pose: Pose,
    switch_r: f64,
    stabilizer: Option<Stabilizer>,
) -> Result<Section> {
    let mut section = section
        .with_private(["switch-to-diode"])
        .add(
            Part::MxSwitch.at(pose.offset(0.0, 0.0, -switch_r, false)),
            [("a", "a"), ("b", "switch-to-diode")],
        )
        .add(
            Part::DiodeSod323.with_value("4148", pose.offset(-5.0, -5.5, 180.0, true)),
            [("b", "b"), ("a", "switch-to-diode")],
        );
    if let Some(stab) = stabilizer {
        section.push(
            Part::mx_stabilizer(stab.size)?.at(pose.offset(0.0, 0.0, -stab.r, false)),
            Vec::<(&str, &str)>::new(),
        );
    }
    Ok(section)
}
