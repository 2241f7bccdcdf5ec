//! Model profiles and the equipment-confirmation status table.
//!
//! Three physical unit variants are emulated. Their differences are entirely
//! data: which vanes exist per axis, how many steps each axis supports, and a
//! handful of feature-flag constants reported to `(class, number)` queries.

use std::collections::HashMap;

use serde::Serialize;
use strum_macros::{Display, EnumString};

use super::registers::RegisterBank;

/// Status value reported for any unsupported `(class, number)` pair or vane.
pub const UNSUPPORTED: u16 = 0xffff;

/// Emulated physical unit variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
pub enum Model {
    Office,
    Horizontal,
    #[strum(serialize = "VRF")]
    Vrf,
}

impl Model {
    /// Model ids as persisted and exposed to external callers (1-3).
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Model::Office),
            2 => Some(Model::Horizontal),
            3 => Some(Model::Vrf),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Model::Office => 1,
            Model::Horizontal => 2,
            Model::Vrf => 3,
        }
    }

    pub const fn profile(self) -> &'static ModelProfile {
        match self {
            Model::Office => &OFFICE,
            Model::Horizontal => &HORIZONTAL,
            Model::Vrf => &VRF,
        }
    }
}

/// Airflow-louver axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VaneAxis {
    Vertical,
    Horizontal,
}

/// Static capability constants for one model.
pub struct ModelProfile {
    /// Object `0x0001`: `0x0000` for single/office units, `0x0004` for VRF.
    pub system_type: u16,
    pub vertical_steps: u16,
    pub vertical_swing: bool,
    pub vertical_vanes: [bool; 4],
    pub horizontal_steps: u16,
    pub horizontal_swing: bool,
    pub horizontal_vanes: [bool; 4],
}

const OFFICE: ModelProfile = ModelProfile {
    system_type: 0x0000,
    vertical_steps: 0x0004,
    vertical_swing: true,
    vertical_vanes: [true, false, false, false],
    horizontal_steps: 0x0000,
    horizontal_swing: false,
    horizontal_vanes: [false; 4],
};

const HORIZONTAL: ModelProfile = ModelProfile {
    system_type: 0x0000,
    vertical_steps: 0x0004,
    vertical_swing: true,
    vertical_vanes: [true, false, false, false],
    // extended horizontal positions
    horizontal_steps: 0x0015,
    horizontal_swing: true,
    horizontal_vanes: [true, false, false, false],
};

const VRF: ModelProfile = ModelProfile {
    system_type: 0x0004,
    vertical_steps: 0x0004,
    vertical_swing: true,
    vertical_vanes: [true; 4],
    // horizontal vanes are accepted and stored but not operational on VRF
    horizontal_steps: 0x0000,
    horizontal_swing: false,
    horizontal_vanes: [false; 4],
};

/// Writability and clamp bound for one vane, per model and axis.
#[derive(Clone, Copy, Debug)]
pub struct VaneSupport {
    pub writable: bool,
    pub max_steps: u16,
}

/// Per-vane support predicate. Indexes past 3 are never writable.
pub fn vane_support(model: Model, axis: VaneAxis, index: usize) -> VaneSupport {
    let profile = model.profile();

    let (vanes, max_steps) = match axis {
        VaneAxis::Vertical => (&profile.vertical_vanes, profile.vertical_steps),
        VaneAxis::Horizontal => (&profile.horizontal_vanes, profile.horizontal_steps),
    };

    VaneSupport {
        writable: index < 4 && vanes[index.min(3)],
        max_steps,
    }
}

/// Reset the per-vane register arrays and reassign the static capability
/// fields from the given model's profile. Supported vanes start at position 1.
pub fn apply_profile(bank: &mut RegisterBank, model: Model) {
    let profile = model.profile();

    bank.system_type = profile.system_type;
    bank.vertical_steps = profile.vertical_steps;
    bank.vertical_swing_supported = profile.vertical_swing;
    bank.horizontal_steps = profile.horizontal_steps;
    bank.horizontal_swing_supported = profile.horizontal_swing;

    bank.vertical_vane_dir = [0; 4];
    bank.vertical_vane_wind_swing = [0; 4];
    bank.vertical_vane_swing = [false; 4];
    bank.horizontal_vane_swing = [false; 4];
    for i in 0..4 {
        bank.vertical_vane_pos[i] = u16::from(profile.vertical_vanes[i]);
        bank.horizontal_vane_pos[i] = u16::from(profile.horizontal_vanes[i]);
    }
}

/// Model-indexed `(class, number)` → status lookup for equipment-confirmation
/// queries (command `0x03`, class/number sub-mode).
///
/// Class `0x01` constants are built into a table once per model switch; class
/// `0x10` (register readback) and `0x11` (economy) consult the live register
/// bank at query time, as do the VRF per-vane horizontal entries.
pub struct CapabilityTable {
    model: Model,
    statics: HashMap<(u8, u8), u16>,
}

impl CapabilityTable {
    pub fn for_model(model: Model) -> Self {
        let profile = model.profile();
        let office = model == Model::Office;
        let vrf = model == Model::Vrf;

        let mut statics = HashMap::new();
        let mut put = |num: u8, status: u16| {
            statics.insert((0x01, num), status);
        };

        // system type
        put(0x01, profile.system_type);

        // operation-mode support flags
        for num in [0x10, 0x11, 0x14, 0x15, 0x17, 0x1a, 0x1d, 0x20] {
            put(num, 0x0001);
        }
        put(0x12, if vrf { 0x0000 } else { 0x0001 });
        put(0x13, if model == Model::Horizontal { 0x0000 } else { 0x0001 });

        // vertical axis
        put(0x30, profile.vertical_steps);
        put(0x31, u16::from(profile.vertical_swing));
        for i in 0..4u8 {
            let (pos, swing) = if vrf {
                (0x0004, 0x0001)
            } else {
                (UNSUPPORTED, UNSUPPORTED)
            };
            put(0x32 + i, pos);
            put(0x3a + i, swing);
        }

        // horizontal axis; the VRF per-vane entries read live registers instead
        put(0x42, profile.horizontal_steps);
        put(0x43, u16::from(profile.horizontal_swing));
        if !vrf {
            for i in 0..4u8 {
                put(0x44 + i, UNSUPPORTED);
                put(0x48 + i, UNSUPPORTED);
            }
        }

        // feature flags, several Office-only
        put(0x50, 0x0001); // economy
        put(0x51, u16::from(office)); // min heat
        put(0x52, u16::from(office)); // human detection
        put(0x53, if vrf { 0x0000 } else { 0x0001 }); // energy-saving fan control
        put(0x54, if office { 0x0002 } else { 0x0000 }); // auto save setting time
        put(0x55, 0x0000); // auto off setting time
        put(0x70, u16::from(office)); // powerful
        put(0x71, u16::from(office)); // indoor unit low noise
        put(0x93, 0x0000); // coil dry

        Self { model, statics }
    }

    /// Status for a `(class, number)` query against the current registers.
    pub fn status(&self, bank: &RegisterBank, class: u8, number: u8) -> u16 {
        match class {
            // protocol/version info
            0x00 => {
                if number == 0x01 {
                    0x0000 // communication version 0
                } else {
                    0x0002
                }
            }

            0x01 => match number {
                0x44..=0x47 if self.model == Model::Vrf => {
                    bank.horizontal_vane_pos[usize::from(number - 0x44)]
                }
                0x48..=0x4b if self.model == Model::Vrf => {
                    u16::from(bank.horizontal_vane_swing[usize::from(number - 0x48)])
                }
                _ => self
                    .statics
                    .get(&(class, number))
                    .copied()
                    .unwrap_or(UNSUPPORTED),
            },

            // live register readback
            0x10 => register_status(bank, number),

            0x11 if number == 0x00 => bank.economy,

            _ => UNSUPPORTED,
        }
    }
}

fn register_status(bank: &RegisterBank, number: u8) -> u16 {
    match number {
        0x00 => bank.start_stop,
        0x01 => bank.mode,
        0x02 => bank.temp_setpoint,
        0x03 => bank.fan,
        0x10 => bank.vertical_dir,
        0x11 => bank.vertical_swing,
        0x12 | 0x14 | 0x16 | 0x18 => bank.vertical_vane_dir[usize::from(number - 0x12) / 2],
        0x13 | 0x15 | 0x17 | 0x19 => bank.vertical_vane_wind_swing[usize::from(number - 0x13) / 2],
        0x22 => bank.horizontal_dir,
        0x23 => bank.horizontal_swing,
        // reserved
        0x30 | 0x31 => 0x0000,
        0x33 => bank.room_temp,
        _ => UNSUPPORTED,
    }
}

/// Feature-support summary for the active model, as consumed by external
/// callers (remote-control relay, UI binding).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityInfo {
    pub model: u8,
    pub model_name: String,
    pub system_type: u16,
    pub vertical_steps: u16,
    pub vertical_swing: bool,
    pub vertical_vane_count: usize,
    pub vertical_vane_supported: [bool; 4],
    pub horizontal_steps: u16,
    pub horizontal_swing: bool,
    pub horizontal_vane_count: usize,
    pub horizontal_vane_supported: [bool; 4],
}

impl CapabilityInfo {
    pub fn for_model(model: Model) -> Self {
        let profile = model.profile();

        Self {
            model: model.id(),
            model_name: model.to_string(),
            system_type: profile.system_type,
            vertical_steps: profile.vertical_steps,
            vertical_swing: profile.vertical_swing,
            vertical_vane_count: profile.vertical_vanes.iter().filter(|&&v| v).count(),
            vertical_vane_supported: profile.vertical_vanes,
            horizontal_steps: profile.horizontal_steps,
            horizontal_swing: profile.horizontal_swing,
            horizontal_vane_count: profile.horizontal_vanes.iter().filter(|&&v| v).count(),
            horizontal_vane_supported: profile.horizontal_vanes,
        }
    }
}
