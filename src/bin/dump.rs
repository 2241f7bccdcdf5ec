//! Passive bus monitor: print every valid frame seen on the link, coloured by
//! command, with timing deltas.

use std::time::SystemTime;

use anyhow::Result;
use clap::Parser;
use colored::{ColoredString, Colorize};
use futures::StreamExt;
use url::Url;

use fgasim::config::Port;
use fgasim::protocol::dispatch::{CMD_EQUIPMENT_INFO, CMD_OBJECT_WRITE, CMD_START, CMD_STATUS_QUERY};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL of the port to connect to
    ///
    /// either serial:///device/path or tcp+raw://host:port URLs supported
    port: Url,
}

fn delta_ms(since: Option<SystemTime>) -> u128 {
    since
        .and_then(|t| t.elapsed().ok())
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

fn cmd_desc(command: u8) -> &'static str {
    match command {
        CMD_START => "Start",
        CMD_EQUIPMENT_INFO => "Equipment Info",
        CMD_OBJECT_WRITE => "Object Write",
        CMD_STATUS_QUERY => "Status Query",
        _ => "Unknown",
    }
}

fn coloured(command: u8, line: String) -> ColoredString {
    match command {
        CMD_START => line.on_cyan().bright_white(),
        CMD_EQUIPMENT_INFO => line.on_purple().bright_white(),
        CMD_OBJECT_WRITE => line.on_green().bright_white(),
        CMD_STATUS_QUERY => line.on_blue().bright_white(),
        _ => line.on_black(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut framed = Port::open(&args.port).await?.framed();

    let start_time = SystemTime::now();
    let mut last_frame_time: Option<SystemTime> = None;

    while let Some(frame) = framed.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(err) => {
                println!("read error: {err}");
                continue;
            }
        };

        let start_delta_ms = delta_ms(Some(start_time));
        let last_frame_delta_ms = delta_ms(last_frame_time);

        let cmd = frame.command;
        let addr = frame.address;
        let desc = cmd_desc(cmd);
        let data = &frame.payload;

        let line = format!(
            "[{start_delta_ms:8}, {last_frame_delta_ms:8}] {addr:06x} {cmd:02x}: {desc: <16} {data:02x?}"
        );

        println!("{}", coloured(cmd, line));

        last_frame_time = Some(SystemTime::now());
    }

    Ok(())
}
