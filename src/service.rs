//! The emulator service loop: read frames off the link, dispatch them against
//! the device, write the responses back.

use std::time::Duration;

use anyhow::Result;
use futures::{SinkExt, TryStreamExt};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PortStream;
use crate::device::Device;

/// Reads are bounded so the loop stays responsive to cancellation even on a
/// silent bus.
const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Run until the link closes or the token is cancelled. Read errors
/// propagate; write failures are logged and the loop carries on, since the
/// controller will simply re-poll.
pub async fn run(
    mut port: Box<dyn PortStream>,
    device: Device,
    cancel: CancellationToken,
) -> Result<()> {
    info!("emulator service started");

    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => {
                info!("emulator service cancelled");
                return Ok(());
            }
            result = timeout(READ_TIMEOUT, port.try_next()) => match result {
                Err(_) => continue, // idle bus
                Ok(Ok(Some(frame))) => frame,
                Ok(Ok(None)) => {
                    info!("link closed");
                    return Ok(());
                }
                Ok(Err(err)) => return Err(err.into()),
            },
        };

        debug!(
            command = frame.command,
            address = format_args!("{:#08x}", frame.address),
            payload_len = frame.payload.len(),
            "frame received"
        );

        let response = device.handle_frame(&frame);

        if let Err(err) = port.send(response).await {
            warn!(%err, "failed to send response frame");
        }
    }
}
