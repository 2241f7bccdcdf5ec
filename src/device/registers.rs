//! Raw protocol register bank.

/// Sentinel value for an unset room-temperature register.
pub const ROOM_TEMP_UNSET: u16 = 0xffff;

/// Protocol-native device state: one 16-bit value per protocol object, plus
/// the static per-model capability fields reported by equipment-confirmation
/// queries. The capability fields are reassigned whenever the emulated model
/// changes; the dynamic registers live for the whole process.
#[derive(Clone, Debug)]
pub struct RegisterBank {
    pub start_stop: u16,
    pub mode: u16,
    pub fan: u16,
    pub temp_setpoint: u16,

    pub vertical_dir: u16,
    pub vertical_swing: u16,
    /// Direction of vertical vanes 1-4 (objects `0x1012`/`0x1014`/`0x1016`/`0x1018`).
    pub vertical_vane_dir: [u16; 4],
    /// Wind swing of vertical vanes 1-4 (objects `0x1013`/`0x1015`/`0x1017`/`0x1019`).
    pub vertical_vane_wind_swing: [u16; 4],

    pub horizontal_dir: u16,
    pub horizontal_swing: u16,

    pub economy: u16,
    pub error_code_major: u16,
    pub error_code_minor: u16,

    /// Object `0x1033`, units of 0.01°C offset by -50°C; `0xffff` when unset.
    pub room_temp: u16,

    // Static capability fields, reassigned on model switch.
    pub system_type: u16,
    pub vertical_steps: u16,
    pub vertical_swing_supported: bool,
    /// Positions of the extended vertical vane objects `0x0132`-`0x0135`.
    pub vertical_vane_pos: [u16; 4],
    /// Swing state of the extended vertical vane objects `0x103a`-`0x103d`.
    pub vertical_vane_swing: [bool; 4],
    pub horizontal_steps: u16,
    pub horizontal_swing_supported: bool,
    /// Positions of the extended horizontal vane objects `0x0144`-`0x0147`.
    pub horizontal_vane_pos: [u16; 4],
    /// Swing state of the extended horizontal vane objects `0x0148`-`0x014b`.
    pub horizontal_vane_swing: [bool; 4],
}

impl Default for RegisterBank {
    fn default() -> Self {
        Self {
            start_stop: 0,
            mode: 0,
            fan: 0,
            // 18.0°C, in 0.1°C units
            temp_setpoint: 0x00b4,

            vertical_dir: 0,
            vertical_swing: 0,
            vertical_vane_dir: [0; 4],
            vertical_vane_wind_swing: [0; 4],

            horizontal_dir: 0,
            horizontal_swing: 0,

            economy: 0,
            error_code_major: 0,
            error_code_minor: 0,

            // 18.00°C (6800 hundredths above -50°C)
            room_temp: 0x1a90,

            system_type: 0,
            vertical_steps: 0,
            vertical_swing_supported: false,
            vertical_vane_pos: [0; 4],
            vertical_vane_swing: [false; 4],
            horizontal_steps: 0,
            horizontal_swing_supported: false,
            horizontal_vane_pos: [0; 4],
            horizontal_vane_swing: [false; 4],
        }
    }
}

/// Encode a temperature in °C as the room-temperature register value,
/// `(t + 50) * 100`. Values below the encodable floor map to `0x0000` and
/// values above the ceiling map to `0xfffe`.
pub fn encode_room_temp(celsius: f64) -> u16 {
    if celsius < -50.0 {
        0x0000
    } else if celsius > 605.34 {
        0xfffe
    } else {
        ((celsius + 50.0) * 100.0).round() as u16
    }
}

/// Decode the room-temperature register into °C. Register `0` means exactly
/// -50.0°C; the `0xffff` sentinel is "unset" and has no decoding.
pub fn decode_room_temp(value: u16) -> Option<f64> {
    match value {
        0x0000 => Some(-50.0),
        ROOM_TEMP_UNSET => None,
        v => Some((f64::from(v) - 5000.0) / 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_temp_codec() {
        assert_eq!(encode_room_temp(18.0), 0x1a90);
        assert_eq!(decode_room_temp(0x1a90), Some(18.0));

        assert_eq!(decode_room_temp(0x0000), Some(-50.0));
        assert_eq!(decode_room_temp(ROOM_TEMP_UNSET), None);

        // out-of-range encodings clamp to the protocol's sentinel extremes
        assert_eq!(encode_room_temp(-60.0), 0x0000);
        assert_eq!(encode_room_temp(700.0), 0xfffe);
        assert_eq!(decode_room_temp(0xfffe), Some(605.34));
    }
}
