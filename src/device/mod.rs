//! Emulated indoor-unit state.
//!
//! State is kept twice: a [`RegisterBank`] of raw 16-bit protocol values, and
//! a [`DeviceSnapshot`] of decoded human-level settings. Every mutation, from
//! the wire or from a local setter, goes through the registers first and the
//! snapshot is then re-derived, so the two can never drift apart.

pub mod capabilities;
pub mod registers;

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use strum_macros::{Display, EnumString};
use tracing::{debug, warn};

use crate::protocol::codec::Frame;
use crate::protocol::dispatch;
use crate::protocol::objects;

pub use capabilities::{CapabilityInfo, CapabilityTable, Model, VaneAxis};
pub use registers::{decode_room_temp, encode_room_temp, RegisterBank, ROOM_TEMP_UNSET};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Display, EnumString)]
pub enum Mode {
    Auto,
    Cool,
    Dry,
    Fan,
    Heat,
}

impl Mode {
    pub fn register_value(self) -> u16 {
        match self {
            Mode::Auto => 0,
            Mode::Cool => 1,
            Mode::Dry => 2,
            Mode::Fan => 3,
            Mode::Heat => 4,
        }
    }

    pub fn from_register(value: u16) -> Option<Self> {
        match value {
            0 => Some(Mode::Auto),
            1 => Some(Mode::Cool),
            2 => Some(Mode::Dry),
            3 => Some(Mode::Fan),
            4 => Some(Mode::Heat),
            _ => None,
        }
    }

    /// Lowest accepted setpoint for this mode, in °C.
    fn min_setpoint(self) -> f64 {
        match self {
            Mode::Cool => 18.0,
            _ => 16.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Display, EnumString)]
pub enum FanSpeed {
    Auto,
    Quiet,
    Low,
    Medium,
    High,
}

impl FanSpeed {
    pub fn register_value(self) -> u16 {
        match self {
            FanSpeed::Auto => 0,
            FanSpeed::Quiet => 2,
            FanSpeed::Low => 5,
            FanSpeed::Medium => 8,
            FanSpeed::High => 11,
        }
    }

    pub fn from_register(value: u16) -> Option<Self> {
        match value {
            0 => Some(FanSpeed::Auto),
            2 => Some(FanSpeed::Quiet),
            5 => Some(FanSpeed::Low),
            8 => Some(FanSpeed::Medium),
            11 => Some(FanSpeed::High),
            _ => None,
        }
    }
}

/// Decoded human-level view of the device, derived from the register bank.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSnapshot {
    pub model: Model,
    pub power: bool,
    pub mode: Mode,
    /// Setpoint in °C.
    pub temperature: f64,
    pub fan_speed: FanSpeed,
    pub swing: bool,
    /// Last reported room temperature in °C, if set.
    pub current_temp: Option<f64>,
}

/// The full emulator state: model, registers, derived snapshot, and the
/// capability table for the active model.
pub struct DeviceState {
    model: Model,
    registers: RegisterBank,
    snapshot: DeviceSnapshot,
    capabilities: CapabilityTable,
}

impl DeviceState {
    pub fn new(model: Model) -> Self {
        let mut registers = RegisterBank::default();
        capabilities::apply_profile(&mut registers, model);

        Self {
            model,
            registers,
            snapshot: DeviceSnapshot {
                model,
                power: false,
                mode: Mode::Auto,
                temperature: 22.0,
                fan_speed: FanSpeed::Auto,
                swing: false,
                current_temp: Some(18.0),
            },
            capabilities: CapabilityTable::for_model(model),
        }
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn snapshot(&self) -> &DeviceSnapshot {
        &self.snapshot
    }

    pub fn registers(&self) -> &RegisterBank {
        &self.registers
    }

    pub fn capability_info(&self) -> CapabilityInfo {
        CapabilityInfo::for_model(self.model)
    }

    /// Switch the emulated model. Dynamic registers are retained; capability
    /// registers and vane arrays are reset to the new model's profile.
    pub fn set_model(&mut self, model: Model) {
        if model == self.model {
            return;
        }
        debug!(from = %self.model, to = %model, "switching model");

        self.model = model;
        capabilities::apply_profile(&mut self.registers, model);
        self.capabilities = CapabilityTable::for_model(model);
        self.sync_snapshot();
    }

    /// Re-derive the human-level snapshot from the registers.
    ///
    /// Unknown mode/fan register values keep the previous decoded setting;
    /// out-of-range setpoint registers leave the decoded setpoint untouched.
    fn sync_snapshot(&mut self) {
        let regs = &self.registers;
        let snap = &mut self.snapshot;

        snap.model = self.model;
        snap.power = regs.start_stop != 0;

        if let Some(mode) = Mode::from_register(regs.mode) {
            snap.mode = mode;
        }
        if let Some(fan) = FanSpeed::from_register(regs.fan) {
            snap.fan_speed = fan;
        }

        if (160..=300).contains(&regs.temp_setpoint) {
            snap.temperature = f64::from(regs.temp_setpoint) / 10.0;
        }

        snap.swing = regs.vertical_swing != 0
            || regs.horizontal_swing != 0
            || regs.vertical_vane_swing.iter().any(|&s| s)
            || regs.horizontal_vane_swing.iter().any(|&s| s);

        snap.current_temp = decode_room_temp(regs.room_temp)
            .filter(|&t| t > -50.0 && t < 80.0)
            .or(snap.current_temp);
    }

    /// Apply one object write from the wire. Returns `false` for unknown
    /// objects; known writes always succeed and resync the snapshot.
    pub fn apply_object_write(&mut self, object: u16, value: u16) -> bool {
        let regs = &mut self.registers;

        match object {
            objects::START_STOP => regs.start_stop = value,
            objects::MODE => regs.mode = value,
            objects::TEMP_SETPOINT => regs.temp_setpoint = value,
            objects::FAN_SPEED => regs.fan = value,

            objects::VERTICAL_DIRECTION => regs.vertical_dir = value,
            objects::VERTICAL_SWING => regs.vertical_swing = value,

            objects::VERTICAL_VANE_FIRST..=objects::VERTICAL_VANE_LAST => {
                let offset = usize::from(object - objects::VERTICAL_VANE_FIRST);
                if offset % 2 == 0 {
                    regs.vertical_vane_dir[offset / 2] = value;
                } else {
                    regs.vertical_vane_wind_swing[offset / 2] = value;
                }
            }

            objects::HORIZONTAL_DIRECTION => regs.horizontal_dir = value,
            objects::HORIZONTAL_SWING => regs.horizontal_swing = value,

            objects::ERROR_CODE_MAJOR => regs.error_code_major = value,
            objects::ERROR_CODE_MINOR => regs.error_code_minor = value,
            objects::ROOM_TEMPERATURE => regs.room_temp = value,
            objects::ECONOMY => regs.economy = value,

            objects::VERT_VANE_POS_FIRST..=objects::VERT_VANE_POS_LAST => {
                let index = usize::from(object - objects::VERT_VANE_POS_FIRST);
                self.write_vane_position(VaneAxis::Vertical, index, value);
            }
            objects::VERT_VANE_SWING_FIRST..=objects::VERT_VANE_SWING_LAST => {
                let index = usize::from(object - objects::VERT_VANE_SWING_FIRST);
                self.write_vane_swing(VaneAxis::Vertical, index, value != 0);
            }
            objects::HORIZ_VANE_POS_FIRST..=objects::HORIZ_VANE_POS_LAST => {
                let index = usize::from(object - objects::HORIZ_VANE_POS_FIRST);
                self.write_vane_position(VaneAxis::Horizontal, index, value);
            }
            objects::HORIZ_VANE_SWING_FIRST..=objects::HORIZ_VANE_SWING_LAST => {
                let index = usize::from(object - objects::HORIZ_VANE_SWING_FIRST);
                self.write_vane_swing(VaneAxis::Horizontal, index, value != 0);
            }

            _ => return false,
        }

        self.sync_snapshot();
        true
    }

    /// Current value of one object, for object-id status queries. Unknown
    /// objects report `0`.
    pub fn object_status(&self, object: u16) -> u16 {
        let regs = &self.registers;

        match object {
            objects::START_STOP => regs.start_stop,
            objects::MODE => regs.mode,
            objects::TEMP_SETPOINT => regs.temp_setpoint,
            objects::FAN_SPEED => regs.fan,

            objects::VERTICAL_DIRECTION => regs.vertical_dir,
            objects::VERTICAL_SWING => regs.vertical_swing,
            objects::VERTICAL_VANE_FIRST..=objects::VERTICAL_VANE_LAST => {
                let offset = usize::from(object - objects::VERTICAL_VANE_FIRST);
                if offset % 2 == 0 {
                    regs.vertical_vane_dir[offset / 2]
                } else {
                    regs.vertical_vane_wind_swing[offset / 2]
                }
            }

            objects::HORIZONTAL_DIRECTION => regs.horizontal_dir,
            objects::HORIZONTAL_SWING => regs.horizontal_swing,

            objects::ERROR_CODE_MAJOR => regs.error_code_major,
            objects::ERROR_CODE_MINOR => regs.error_code_minor,
            objects::ROOM_TEMPERATURE => regs.room_temp,
            objects::ECONOMY => regs.economy,

            objects::VERT_VANE_POS_FIRST..=objects::VERT_VANE_POS_LAST => {
                regs.vertical_vane_pos[usize::from(object - objects::VERT_VANE_POS_FIRST)]
            }
            objects::VERT_VANE_SWING_FIRST..=objects::VERT_VANE_SWING_LAST => u16::from(
                regs.vertical_vane_swing[usize::from(object - objects::VERT_VANE_SWING_FIRST)],
            ),
            objects::HORIZ_VANE_POS_FIRST..=objects::HORIZ_VANE_POS_LAST => {
                regs.horizontal_vane_pos[usize::from(object - objects::HORIZ_VANE_POS_FIRST)]
            }
            objects::HORIZ_VANE_SWING_FIRST..=objects::HORIZ_VANE_SWING_LAST => u16::from(
                regs.horizontal_vane_swing[usize::from(object - objects::HORIZ_VANE_SWING_FIRST)],
            ),

            _ => 0,
        }
    }

    /// Equipment-confirmation status for a `(class, number)` query.
    pub fn confirmation_status(&self, class: u8, number: u8) -> u16 {
        self.capabilities.status(&self.registers, class, number)
    }

    // Local setters, as driven by the control surface rather than the wire.

    pub fn set_power(&mut self, on: bool) {
        self.registers.start_stop = u16::from(on);
        self.sync_snapshot();
    }

    pub fn set_mode(&mut self, mode: &str) -> bool {
        match Mode::from_str(mode) {
            Ok(mode) => {
                self.registers.mode = mode.register_value();
                self.sync_snapshot();
                true
            }
            Err(_) => {
                warn!(mode, "rejecting unknown mode");
                false
            }
        }
    }

    /// Set the target temperature. The accepted range depends on the active
    /// mode: 18-30°C when cooling, 16-30°C otherwise.
    pub fn set_temperature(&mut self, celsius: f64) -> bool {
        let min = self.snapshot.mode.min_setpoint();
        if !(min..=30.0).contains(&celsius) {
            warn!(celsius, min, "rejecting out-of-range setpoint");
            return false;
        }

        self.registers.temp_setpoint = (celsius * 10.0).round() as u16;
        self.sync_snapshot();
        true
    }

    pub fn set_fan_speed(&mut self, speed: &str) -> bool {
        match FanSpeed::from_str(speed) {
            Ok(speed) => {
                self.registers.fan = speed.register_value();
                self.sync_snapshot();
                true
            }
            Err(_) => {
                warn!(speed, "rejecting unknown fan speed");
                false
            }
        }
    }

    /// Set the global swing flags on every axis the model supports.
    pub fn set_swing(&mut self, on: bool) {
        let value = u16::from(on);

        if self.registers.vertical_swing_supported {
            self.registers.vertical_swing = value;
        }
        if self.registers.horizontal_swing_supported {
            self.registers.horizontal_swing = value;
        }

        self.sync_snapshot();
    }

    pub fn set_room_temperature(&mut self, celsius: f64) -> bool {
        // open interval, matching the snapshot plausibility filter
        if !(celsius > -50.0 && celsius < 80.0) {
            warn!(celsius, "rejecting out-of-range room temperature");
            return false;
        }

        self.registers.room_temp = encode_room_temp(celsius);
        self.sync_snapshot();
        true
    }

    /// Move one vane. Position `0` and positions past the axis step count are
    /// clamped into `1..=steps`. Returns `false` if the model has no such vane.
    pub fn set_vane_position(&mut self, axis: VaneAxis, index: usize, position: u16) -> bool {
        if !self.write_vane_position(axis, index, position) {
            return false;
        }
        self.sync_snapshot();
        true
    }

    /// Enable or disable swing on one vane. On single-vane models, vane 0
    /// also drives the axis-global swing flag.
    pub fn set_vane_swing(&mut self, axis: VaneAxis, index: usize, on: bool) -> bool {
        if !self.write_vane_swing(axis, index, on) {
            return false;
        }
        self.sync_snapshot();
        true
    }

    fn write_vane_position(&mut self, axis: VaneAxis, index: usize, position: u16) -> bool {
        // VRF records horizontal vane positions without operating them; the
        // stored value is reported back verbatim, unclamped
        if self.model == Model::Vrf && axis == VaneAxis::Horizontal {
            if index >= 4 {
                warn!(?axis, index, "rejecting write to nonexistent vane");
                return false;
            }
            self.registers.horizontal_vane_pos[index] = position;
            return true;
        }

        let support = capabilities::vane_support(self.model, axis, index);
        if !support.writable {
            warn!(?axis, index, "rejecting write to unsupported vane");
            return false;
        }

        let clamped = position.clamp(1, support.max_steps.max(1));

        match axis {
            VaneAxis::Vertical => self.registers.vertical_vane_pos[index] = clamped,
            VaneAxis::Horizontal => self.registers.horizontal_vane_pos[index] = clamped,
        }
        true
    }

    fn write_vane_swing(&mut self, axis: VaneAxis, index: usize, on: bool) -> bool {
        // recorded but non-operational, as with VRF horizontal positions
        if self.model == Model::Vrf && axis == VaneAxis::Horizontal {
            if index >= 4 {
                warn!(?axis, index, "rejecting swing write to nonexistent vane");
                return false;
            }
            self.registers.horizontal_vane_swing[index] = on;
            return true;
        }

        let support = capabilities::vane_support(self.model, axis, index);
        if !support.writable {
            warn!(?axis, index, "rejecting swing write to unsupported vane");
            return false;
        }

        // single-vane models express swing through the axis-global flag too
        let single_vane = self.model != Model::Vrf;

        match axis {
            VaneAxis::Vertical => {
                self.registers.vertical_vane_swing[index] = on;
                if single_vane && index == 0 {
                    self.registers.vertical_swing = u16::from(on);
                }
            }
            VaneAxis::Horizontal => {
                self.registers.horizontal_vane_swing[index] = on;
                if single_vane && index == 0 {
                    self.registers.horizontal_swing = u16::from(on);
                }
            }
        }
        true
    }
}

/// Cloneable handle over shared [`DeviceState`], with a broadcast channel of
/// snapshot updates for interested observers.
#[derive(Clone)]
pub struct Device {
    state: Arc<Mutex<DeviceState>>,
    snapshot_tx: async_broadcast::Sender<DeviceSnapshot>,
    // keeps the channel open while no observer is subscribed
    _snapshot_keepalive: async_broadcast::InactiveReceiver<DeviceSnapshot>,
}

impl Device {
    pub fn new(model: Model) -> Self {
        let (mut tx, rx) = async_broadcast::broadcast(16);
        tx.set_overflow(true);

        Self {
            state: Arc::new(Mutex::new(DeviceState::new(model))),
            snapshot_tx: tx,
            _snapshot_keepalive: rx.deactivate(),
        }
    }

    pub fn subscribe(&self) -> async_broadcast::Receiver<DeviceSnapshot> {
        self.snapshot_tx.new_receiver()
    }

    pub fn snapshot(&self) -> DeviceSnapshot {
        self.lock().snapshot().clone()
    }

    pub fn model(&self) -> Model {
        self.lock().model()
    }

    pub fn capability_info(&self) -> CapabilityInfo {
        self.lock().capability_info()
    }

    /// Run a mutation under the state lock, broadcasting the snapshot if it
    /// changed.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut DeviceState) -> R) -> R {
        let (result, changed) = {
            let mut state = self.lock();
            let before = state.snapshot().clone();
            let result = f(&mut state);
            let after = state.snapshot().clone();
            (result, (before != after).then_some(after))
        };

        if let Some(snapshot) = changed {
            // overflow mode: slow observers lose old snapshots, never block us
            let _ = self.snapshot_tx.try_broadcast(snapshot);
        }

        result
    }

    /// Dispatch one received frame against the device, atomically.
    pub fn handle_frame(&self, frame: &Frame) -> Frame {
        self.mutate(|state| dispatch::dispatch(state, frame))
    }

    // Control-surface mutators. Each returns the resulting snapshot; a
    // rejected request returns the unchanged one.

    pub fn set_power(&self, on: bool) -> DeviceSnapshot {
        self.mutate(|state| {
            state.set_power(on);
            state.snapshot().clone()
        })
    }

    pub fn set_mode(&self, mode: &str) -> DeviceSnapshot {
        self.mutate(|state| {
            state.set_mode(mode);
            state.snapshot().clone()
        })
    }

    pub fn set_temperature(&self, celsius: f64) -> DeviceSnapshot {
        self.mutate(|state| {
            state.set_temperature(celsius);
            state.snapshot().clone()
        })
    }

    pub fn set_fan_speed(&self, speed: &str) -> DeviceSnapshot {
        self.mutate(|state| {
            state.set_fan_speed(speed);
            state.snapshot().clone()
        })
    }

    pub fn set_swing(&self, on: bool) -> DeviceSnapshot {
        self.mutate(|state| {
            state.set_swing(on);
            state.snapshot().clone()
        })
    }

    pub fn set_room_temperature(&self, celsius: f64) -> DeviceSnapshot {
        self.mutate(|state| {
            state.set_room_temperature(celsius);
            state.snapshot().clone()
        })
    }

    pub fn set_model(&self, model: Model) -> DeviceSnapshot {
        self.mutate(|state| {
            state.set_model(model);
            state.snapshot().clone()
        })
    }

    pub fn set_vane_position(&self, axis: VaneAxis, index: usize, position: u16) -> DeviceSnapshot {
        self.mutate(|state| {
            state.set_vane_position(axis, index, position);
            state.snapshot().clone()
        })
    }

    pub fn set_vane_swing(&self, axis: VaneAxis, index: usize, on: bool) -> DeviceSnapshot {
        self.mutate(|state| {
            state.set_vane_swing(axis, index, on);
            state.snapshot().clone()
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DeviceState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_snapshot_defaults() {
        let state = DeviceState::new(Model::Office);
        let snap = state.snapshot();

        assert!(!snap.power);
        assert_eq!(snap.mode, Mode::Auto);
        assert_eq!(snap.temperature, 22.0);
        assert_eq!(snap.fan_speed, FanSpeed::Auto);
        assert!(!snap.swing);
        assert_eq!(snap.current_temp, Some(18.0));

        // the register bank boots at 18.0°C regardless of the decoded default
        assert_eq!(state.registers().temp_setpoint, 0x00b4);
    }

    #[test]
    fn wire_write_resyncs_snapshot() {
        let mut state = DeviceState::new(Model::Office);

        assert!(state.apply_object_write(objects::START_STOP, 1));
        assert!(state.apply_object_write(objects::MODE, 4));
        assert!(state.apply_object_write(objects::TEMP_SETPOINT, 0x00a0));
        assert!(state.apply_object_write(objects::FAN_SPEED, 11));

        let snap = state.snapshot();
        assert!(snap.power);
        assert_eq!(snap.mode, Mode::Heat);
        assert_eq!(snap.temperature, 16.0);
        assert_eq!(snap.fan_speed, FanSpeed::High);
    }

    #[test]
    fn unknown_mode_and_fan_registers_keep_previous_decoding() {
        let mut state = DeviceState::new(Model::Office);
        assert!(state.apply_object_write(objects::MODE, 1));
        assert!(state.apply_object_write(objects::FAN_SPEED, 5));

        assert!(state.apply_object_write(objects::MODE, 9));
        assert!(state.apply_object_write(objects::FAN_SPEED, 7));

        let snap = state.snapshot();
        assert_eq!(snap.mode, Mode::Cool);
        assert_eq!(snap.fan_speed, FanSpeed::Low);
        // the raw registers still hold the written values
        assert_eq!(state.registers().mode, 9);
        assert_eq!(state.registers().fan, 7);
        assert_eq!(state.object_status(objects::MODE), 9);
    }

    #[test]
    fn out_of_range_setpoint_register_does_not_decode() {
        let mut state = DeviceState::new(Model::Office);
        assert!(state.apply_object_write(objects::TEMP_SETPOINT, 0x00c8)); // 20.0
        assert_eq!(state.snapshot().temperature, 20.0);

        assert!(state.apply_object_write(objects::TEMP_SETPOINT, 0x0400));
        assert_eq!(state.snapshot().temperature, 20.0);
        assert_eq!(state.registers().temp_setpoint, 0x0400);
    }

    #[test]
    fn unknown_object_write_is_refused() {
        let mut state = DeviceState::new(Model::Office);
        assert!(!state.apply_object_write(0x2fff, 1));
        assert_eq!(state.object_status(0x2fff), 0);
    }

    #[test]
    fn setpoint_range_depends_on_mode() {
        let mut state = DeviceState::new(Model::Office);

        assert!(state.set_mode("Cool"));
        assert!(!state.set_temperature(17.5));
        assert!(state.set_temperature(18.0));
        assert_eq!(state.registers().temp_setpoint, 180);

        assert!(state.set_mode("Heat"));
        assert!(state.set_temperature(16.0));
        assert_eq!(state.snapshot().temperature, 16.0);

        assert!(!state.set_temperature(30.5));
    }

    #[test]
    fn unknown_mode_and_fan_names_are_refused() {
        let mut state = DeviceState::new(Model::Office);
        assert!(!state.set_mode("Turbo"));
        assert!(!state.set_fan_speed("Hurricane"));
        assert_eq!(state.snapshot().mode, Mode::Auto);
        assert_eq!(state.snapshot().fan_speed, FanSpeed::Auto);
    }

    #[test]
    fn vane_position_clamps_to_axis_steps() {
        let mut state = DeviceState::new(Model::Vrf);

        assert!(state.set_vane_position(VaneAxis::Vertical, 2, 5));
        assert_eq!(state.registers().vertical_vane_pos[2], 4);

        assert!(state.set_vane_position(VaneAxis::Vertical, 2, 0));
        assert_eq!(state.registers().vertical_vane_pos[2], 1);
    }

    #[test]
    fn vrf_horizontal_vanes_store_without_operating() {
        let mut state = DeviceState::new(Model::Vrf);

        // setter-side store, verbatim and unclamped
        assert!(state.set_vane_position(VaneAxis::Horizontal, 1, 2));
        assert_eq!(state.registers().horizontal_vane_pos[1], 2);
        assert!(state.set_vane_position(VaneAxis::Horizontal, 3, 9));
        assert_eq!(state.registers().horizontal_vane_pos[3], 9);

        // wire-side store reads back through the confirmation table
        assert!(state.apply_object_write(objects::HORIZ_VANE_POS_FIRST + 2, 0x0003));
        assert_eq!(state.confirmation_status(0x01, 0x46), 0x0003);

        assert!(state.apply_object_write(objects::HORIZ_VANE_SWING_FIRST + 1, 0x0001));
        assert_eq!(state.confirmation_status(0x01, 0x49), 0x0001);
        assert!(state.registers().horizontal_vane_swing[1]);

        // stored only: the global horizontal flag never moves
        assert_eq!(state.registers().horizontal_swing, 0);

        // vanes past the fourth still don't exist
        assert!(!state.set_vane_position(VaneAxis::Horizontal, 4, 1));
    }

    #[test]
    fn single_vane_swing_drives_global_flag() {
        let mut state = DeviceState::new(Model::Horizontal);

        assert!(state.set_vane_swing(VaneAxis::Vertical, 0, true));
        assert_eq!(state.registers().vertical_swing, 1);
        assert!(state.snapshot().swing);

        assert!(state.set_vane_swing(VaneAxis::Vertical, 0, false));
        assert_eq!(state.registers().vertical_swing, 0);

        assert!(state.set_vane_swing(VaneAxis::Horizontal, 0, true));
        assert_eq!(state.registers().horizontal_swing, 1);
        assert!(state.snapshot().swing);

        // vanes past the first don't exist on this model
        assert!(!state.set_vane_swing(VaneAxis::Vertical, 1, true));
    }

    #[test]
    fn wire_vane_swing_write_drives_global_flag_on_single_vane_models() {
        let mut state = DeviceState::new(Model::Office);

        assert!(state.apply_object_write(objects::VERT_VANE_SWING_FIRST, 1));
        assert_eq!(state.registers().vertical_swing, 1);
        assert!(state.snapshot().swing);

        assert!(state.apply_object_write(objects::VERT_VANE_SWING_FIRST, 0));
        assert_eq!(state.registers().vertical_swing, 0);
        assert!(!state.snapshot().swing);
    }

    #[test]
    fn vrf_vane_swing_does_not_touch_global_flag() {
        let mut state = DeviceState::new(Model::Vrf);

        assert!(state.set_vane_swing(VaneAxis::Vertical, 3, true));
        assert_eq!(state.registers().vertical_swing, 0);
        // the snapshot swing flag still reflects the per-vane state
        assert!(state.snapshot().swing);
    }

    #[test]
    fn room_temperature_bounds() {
        let mut state = DeviceState::new(Model::Office);

        assert!(state.set_room_temperature(25.5));
        assert_eq!(state.snapshot().current_temp, Some(25.5));

        assert!(!state.set_room_temperature(90.0));
        assert!(!state.set_room_temperature(-51.0));
        assert_eq!(state.snapshot().current_temp, Some(25.5));

        // the bounds themselves are excluded: a nominally successful write
        // must never leave the snapshot behind the register
        assert!(!state.set_room_temperature(-50.0));
        assert!(!state.set_room_temperature(80.0));
        assert_eq!(state.snapshot().current_temp, Some(25.5));
        assert_eq!(state.registers().room_temp, encode_room_temp(25.5));
    }

    #[test]
    fn wire_room_temp_outside_bounds_keeps_previous_reading() {
        let mut state = DeviceState::new(Model::Office);
        assert!(state.apply_object_write(
            objects::ROOM_TEMPERATURE,
            encode_room_temp(23.0)
        ));
        assert_eq!(state.snapshot().current_temp, Some(23.0));

        // 85°C decodes but is outside the plausible room range
        assert!(state.apply_object_write(
            objects::ROOM_TEMPERATURE,
            encode_room_temp(85.0)
        ));
        assert_eq!(state.snapshot().current_temp, Some(23.0));
    }

    #[test]
    fn model_switch_reseeds_vanes_and_keeps_settings() {
        let mut state = DeviceState::new(Model::Office);
        assert!(state.set_mode("Cool"));
        assert!(state.set_temperature(24.0));

        state.set_model(Model::Vrf);

        assert_eq!(state.snapshot().model, Model::Vrf);
        assert_eq!(state.snapshot().mode, Mode::Cool);
        assert_eq!(state.snapshot().temperature, 24.0);
        // all four vertical vanes now exist, seeded at position 1
        assert_eq!(state.registers().vertical_vane_pos, [1, 1, 1, 1]);
        assert_eq!(state.confirmation_status(0x01, 0x01), 0x0004);
    }

    #[test]
    fn swing_setter_respects_axis_support() {
        let mut office = DeviceState::new(Model::Office);
        office.set_swing(true);
        assert_eq!(office.registers().vertical_swing, 1);
        assert_eq!(office.registers().horizontal_swing, 0);

        let mut horizontal = DeviceState::new(Model::Horizontal);
        horizontal.set_swing(true);
        assert_eq!(horizontal.registers().vertical_swing, 1);
        assert_eq!(horizontal.registers().horizontal_swing, 1);
    }

    #[tokio::test]
    async fn handle_broadcasts_snapshot_changes() {
        let device = Device::new(Model::Office);
        let mut updates = device.subscribe();

        let snap = device.set_power(true);
        assert!(snap.power);
        assert!(updates.recv().await.unwrap().power);

        // a no-op mutation broadcasts nothing
        device.set_power(true);
        assert!(updates.try_recv().is_err());
    }

    #[tokio::test]
    async fn rejected_mutator_returns_unchanged_snapshot() {
        let device = Device::new(Model::Office);
        let mut updates = device.subscribe();

        let before = device.snapshot();
        let after = device.set_mode("Turbo");
        assert_eq!(before, after);
        assert!(updates.try_recv().is_err());
    }
}
