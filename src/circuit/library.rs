//! Footprint library.
//!
//! Each [`Part`] knows its footprint id, reference prefix and pad names
//! in pad order. Pads sharing a name (ground, power) are connected
//! together when that name is mapped.

use super::section::Component;
use crate::error::{KbError, Result};
use crate::models::Pose;

/// Parts the sub-circuits are assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    /// 0603 resistor
    Resistor0603,
    /// 0603 capacitor
    Capacitor0603,
    /// SOD-323 diode
    DiodeSod323,
    /// 3.2 x 2.5 mm four-pad crystal
    Crystal3225,
    /// Tag-Connect TC2030 six-pin programming pads
    TagConnect2030,
    /// SparkFun Pro Micro
    ProMicro,
    /// HRO TYPE-C-31-M-12 receptacle
    UsbC,
    /// TPD4E05U06 four-channel ESD array
    UsbEsd,
    /// MCP1700 3.3 V regulator
    RegulatorSot23,
    /// ATmega32U4 in TQFP-44
    Atmega32u4,
    /// STM32F072 in LQFP-48
    Stm32f072,
    /// SL2.1A USB 2.0 hub
    Sl21a,
    /// Cherry MX PCB-mount switch
    MxSwitch,
    /// Cherry MX 2u stabilizer
    MxStabilizer2u,
    /// Cherry MX 6.25u stabilizer
    MxStabilizer625u,
}

impl Part {
    /// Stabilizer footprint for a stabilizer size in units.
    pub fn mx_stabilizer(size: f64) -> Result<Self> {
        if (size - 2.0).abs() < 1e-9 {
            Ok(Self::MxStabilizer2u)
        } else if (size - 6.25).abs() < 1e-9 {
            Ok(Self::MxStabilizer625u)
        } else {
            Err(KbError::InvalidConfig(format!(
                "no Cherry MX stabilizer of size {size}u"
            )))
        }
    }

    /// Footprint id as `library:name`.
    #[must_use]
    pub const fn footprint(self) -> &'static str {
        match self {
            Self::Resistor0603 => "Resistor_SMD:R_0603_1608Metric",
            Self::Capacitor0603 => "Capacitor_SMD:C_0603_1608Metric",
            Self::DiodeSod323 => "Diode_SMD:D_SOD-323",
            Self::Crystal3225 => "Crystal:Crystal_SMD_3225-4Pin_3.2x2.5mm",
            Self::TagConnect2030 => "Connector:Tag-Connect_TC2030-IDC-NL_2x03_P1.27mm_Vertical",
            Self::ProMicro => "keebio:ArduinoProMicro",
            Self::UsbC => "Connector_USB:HRO-TYPE-C-31-M-12",
            Self::UsbEsd => "Package_SON:USON-10_2.5x1.0mm_P0.5mm",
            Self::RegulatorSot23 => "Package_TO_SOT_SMD:SOT-23",
            Self::Atmega32u4 => "Package_QFP:TQFP-44_10x10mm_P0.8mm",
            Self::Stm32f072 => "Package_QFP:LQFP-48_7x7mm_P0.5mm",
            Self::Sl21a => "Package_SO:SOP-16_3.9x9.9mm_P1.27mm",
            Self::MxSwitch => "kbforge:SW_Cherry_MX_PCB",
            Self::MxStabilizer2u => "kbforge:Stab_Cherry_MX_2.00u_PCB",
            Self::MxStabilizer625u => "kbforge:Stab_Cherry_MX_6.25u_PCB",
        }
    }

    /// Reference designator prefix.
    #[must_use]
    pub const fn reference_prefix(self) -> &'static str {
        match self {
            Self::Resistor0603 => "R",
            Self::Capacitor0603 => "C",
            Self::DiodeSod323 => "D",
            Self::Crystal3225 => "Y",
            Self::TagConnect2030 | Self::UsbC => "J",
            Self::ProMicro
            | Self::UsbEsd
            | Self::RegulatorSot23
            | Self::Atmega32u4
            | Self::Stm32f072
            | Self::Sl21a => "U",
            Self::MxSwitch => "SW",
            Self::MxStabilizer2u | Self::MxStabilizer625u => "ST",
        }
    }

    /// Pad names; pad `n` is element `n - 1`.
    #[must_use]
    pub const fn pins(self) -> &'static [&'static str] {
        match self {
            Self::Resistor0603 | Self::Capacitor0603 | Self::DiodeSod323 | Self::MxSwitch => {
                &["a", "b"]
            }
            Self::Crystal3225 => &["in", "ground", "out", "ground"],
            Self::TagConnect2030 => &["1", "2", "3", "4", "5", "6"],
            Self::ProMicro => &[
                "d3", "d2", "ground", "ground", "d1", "d0", "d4", "c6", "d7", "e6", "b4", "b5",
                "b6", "b2", "b3", "b1", "f7", "f6", "f5", "f4", "vcc", "reset", "ground", "raw",
            ],
            Self::UsbC => &[
                "ground", "vbus", "sbu2", "cc1", "dn", "dp", "dn", "dp", "sbu1", "cc2", "vbus",
                "ground", "shield",
            ],
            Self::UsbEsd => &["dp", "dn", "ground", "dp", "dn", "dn", "dp", "ground", "dn", "dp"],
            Self::RegulatorSot23 => &["ground", "vout", "vin"],
            Self::Atmega32u4 => &[
                "pe6", "vcc", "dn", "dp", "ground", "ucap", "vcc", "pb0", "icsp_sck",
                "icsp_mosi", "icsp_miso", "pb7", "reset", "vcc", "ground", "xtal2", "xtal1",
                "pd0", "pd1", "pd2", "pd3", "pd5", "ground", "vcc", "pd4", "pd6", "pd7", "pb4",
                "pb5", "pb6", "pc6", "pc7", "ground", "vcc", "ground", "pf7", "pf6", "pf5",
                "pf4", "pf1", "pf0", "aref", "ground", "vcc",
            ],
            Self::Stm32f072 => &[
                "vcc", "c13", "c14", "c15", "f0", "f1", "reset", "ground", "vcc", "a0", "a1",
                "a2", "a3", "a4", "a5", "a6", "a7", "b0", "b1", "b2", "b10", "b11", "ground",
                "vcc", "b12", "b13", "b14", "b15", "a8", "a9", "a10", "a11", "a12", "a13",
                "ground", "vcc", "a14", "a15", "b3", "b4", "b5", "b6", "b7", "ground", "b8",
                "b9", "ground", "vcc",
            ],
            Self::Sl21a => &[
                "dn4", "dp4", "dn3", "dp3", "dn2", "dp2", "dn1", "dp1", "dn", "dp", "vdd5", "gnd",
                "vdd33", "vdd18", "xout", "xin",
            ],
            Self::MxStabilizer2u | Self::MxStabilizer625u => &[],
        }
    }

    /// Value printed when the caller does not choose one.
    #[must_use]
    pub const fn default_value(self) -> &'static str {
        match self {
            Self::UsbEsd => "TPD4E05U06DQAR",
            Self::RegulatorSot23 => "MCP1700T-3302E/TT",
            Self::Atmega32u4 => "ATMEGA32U4-AU",
            Self::Stm32f072 => "STM32F072C8T6",
            Self::Sl21a => "SL2.1A",
            _ => "",
        }
    }

    const fn labels_visible(self) -> bool {
        !matches!(
            self,
            Self::TagConnect2030
                | Self::UsbC
                | Self::UsbEsd
                | Self::MxSwitch
                | Self::MxStabilizer2u
                | Self::MxStabilizer625u
        )
    }

    /// Places the part with its default value.
    #[must_use]
    pub fn at(self, pose: Pose) -> Component {
        self.with_value(self.default_value(), pose)
    }

    /// Places the part with an explicit value.
    #[must_use]
    pub fn with_value(self, value: &str, pose: Pose) -> Component {
        Component {
            footprint: self.footprint().to_string(),
            reference_prefix: self.reference_prefix().to_string(),
            value: value.to_string(),
            pose,
            pins: self.pins().iter().map(|p| (*p).to_string()).collect(),
            reference_visible: self.labels_visible(),
            value_visible: self.labels_visible(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_counts_match_packages() {
        assert_eq!(Part::Atmega32u4.pins().len(), 44);
        assert_eq!(Part::Stm32f072.pins().len(), 48);
        assert_eq!(Part::Sl21a.pins().len(), 16);
        assert_eq!(Part::ProMicro.pins().len(), 24);
        assert_eq!(Part::UsbEsd.pins().len(), 10);
    }

    #[test]
    fn test_stabilizer_lookup() {
        assert_eq!(Part::mx_stabilizer(2.0).unwrap(), Part::MxStabilizer2u);
        assert_eq!(Part::mx_stabilizer(6.25).unwrap(), Part::MxStabilizer625u);
        assert!(matches!(
            Part::mx_stabilizer(3.0),
            Err(KbError::InvalidConfig(_))
        ));
        assert!(Part::MxStabilizer2u.pins().is_empty());
    }

    #[test]
    fn test_component_from_part() {
        let c = Part::Resistor0603.with_value("5.1 kΩ", Pose::new(1.0, 2.0, 90.0));
        assert_eq!(c.reference_prefix, "R");
        assert_eq!(c.value, "5.1 kΩ");
        assert_eq!(c.pins, vec!["a", "b"]);
        assert!(c.reference_visible);

        let usb = Part::UsbC.at(Pose::default());
        assert!(!usb.value_visible);
        assert!(usb.value.is_empty());
    }
}
