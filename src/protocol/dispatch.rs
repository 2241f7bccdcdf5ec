//! Command dispatch: one valid inbound frame in, one response frame out.

use tracing::{debug, warn};

use crate::device::DeviceState;

use super::codec::Frame;

/// Bus start / link establishment.
pub const CMD_START: u8 = 0x00;
/// Equipment information exchange.
pub const CMD_EQUIPMENT_INFO: u8 = 0x01;
/// Object write: `(object, value)` pairs.
pub const CMD_OBJECT_WRITE: u8 = 0x02;
/// Status query, by object id or by `(class, number)` pair.
pub const CMD_STATUS_QUERY: u8 = 0x03;

/// Leading acknowledge byte of every response body.
pub const ACK: u8 = 0x01;

/// Handle one frame against the device, producing the response frame. The
/// response echoes the request's command and address.
pub fn dispatch(state: &mut DeviceState, frame: &Frame) -> Frame {
    let body = match frame.command {
        CMD_START => start(frame),
        CMD_EQUIPMENT_INFO => equipment_info(frame),
        CMD_OBJECT_WRITE => object_write(state, frame),
        CMD_STATUS_QUERY => status_query(state, frame),
        // the decoder never yields other command codes
        other => {
            warn!(command = other, "dropping frame with undefined command");
            vec![ACK]
        }
    };

    Frame::new(frame.command, frame.address, body)
}

fn start(frame: &Frame) -> Vec<u8> {
    if frame.payload.first() == Some(&0x01) {
        vec![0x00, 0x01, 0x01, 0x00]
    } else {
        vec![ACK]
    }
}

fn equipment_info(frame: &Frame) -> Vec<u8> {
    if frame.payload.first() == Some(&0x01) {
        vec![0x01, 0x01, 0x00, 0x00]
    } else {
        vec![ACK]
    }
}

/// Apply each `(object, value)` pair in turn. Unknown objects are skipped;
/// the command is acknowledged regardless.
fn object_write(state: &mut DeviceState, frame: &Frame) -> Vec<u8> {
    for pair in frame.payload.chunks_exact(4) {
        let object = u16::from_be_bytes([pair[0], pair[1]]);
        let value = u16::from_be_bytes([pair[2], pair[3]]);

        if state.apply_object_write(object, value) {
            debug!(object = format_args!("{object:#06x}"), value, "object written");
        } else {
            warn!(
                object = format_args!("{object:#06x}"),
                value, "ignoring write to unknown object"
            );
        }
    }

    vec![ACK]
}

/// Two query sub-modes share command `0x03`, distinguished by payload shape:
/// a multiple-of-4 payload is a list of 16-bit object ids padded to 4 bytes
/// each; anything else is a list of `(class, number)` byte pairs.
fn status_query(state: &mut DeviceState, frame: &Frame) -> Vec<u8> {
    let payload = &frame.payload;
    let mut body = vec![ACK];

    if payload.len() % 4 == 0 && payload.len() >= 4 {
        for entry in payload.chunks_exact(4) {
            let object = u16::from_be_bytes([entry[0], entry[1]]);
            let status = state.object_status(object);

            body.extend_from_slice(&object.to_be_bytes());
            body.extend_from_slice(&status.to_be_bytes());
        }
    } else {
        for pair in payload.chunks_exact(2) {
            let (class, number) = (pair[0], pair[1]);
            let status = state.confirmation_status(class, number);

            body.push(class);
            body.push(number);
            body.extend_from_slice(&status.to_be_bytes());
        }
    }

    body
}
