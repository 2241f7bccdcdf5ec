//! Protocol object addresses.
//!
//! Each object is a 16-bit address holding one 16-bit piece of device state.
//! Write commands (`0x02`) and status queries (`0x03`) both refer to these.

pub const START_STOP: u16 = 0x1000;
pub const MODE: u16 = 0x1001;

/// Temperature setpoint, in units of 0.1°C (Cooling: 18-30°C, Heating: 16-30°C).
pub const TEMP_SETPOINT: u16 = 0x1002;
pub const FAN_SPEED: u16 = 0x1003;

pub const VERTICAL_DIRECTION: u16 = 0x1010;
pub const VERTICAL_SWING: u16 = 0x1011;

/// Per-vane vertical direction for vanes 1-4 at `0x1012`, `0x1014`, `0x1016`,
/// `0x1018`, interleaved with the matching wind-swing objects `0x1013` ... `0x1019`.
pub const VERTICAL_VANE_FIRST: u16 = 0x1012;
pub const VERTICAL_VANE_LAST: u16 = 0x1019;

pub const HORIZONTAL_DIRECTION: u16 = 0x1022;
pub const HORIZONTAL_SWING: u16 = 0x1023;

/// Error code (large/small/detail classification).
pub const ERROR_CODE_MAJOR: u16 = 0x1030;
pub const ERROR_CODE_MINOR: u16 = 0x1031;

/// Room temperature sensor reading, in units of 0.01°C offset by -50°C.
pub const ROOM_TEMPERATURE: u16 = 0x1033;

pub const ECONOMY: u16 = 0x1100;

// Extended capability objects.

pub const VERT_VANE_POS_FIRST: u16 = 0x0132;
pub const VERT_VANE_POS_LAST: u16 = 0x0135;

pub const VERT_VANE_SWING_FIRST: u16 = 0x103a;
pub const VERT_VANE_SWING_LAST: u16 = 0x103d;

pub const HORIZ_VANE_POS_FIRST: u16 = 0x0144;
pub const HORIZ_VANE_POS_LAST: u16 = 0x0147;

pub const HORIZ_VANE_SWING_FIRST: u16 = 0x0148;
pub const HORIZ_VANE_SWING_LAST: u16 = 0x014b;
