//! One-shot controller-side tool: send a single write, status query, or
//! equipment-confirmation frame and print the response.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::{SinkExt, TryStreamExt};
use tokio::time::timeout;
use url::Url;

use fgasim::config::Port;
use fgasim::protocol::codec::Frame;
use fgasim::protocol::dispatch::{CMD_OBJECT_WRITE, CMD_STATUS_QUERY};

const RESPONSE_TIMEOUT: Duration = Duration::from_secs(2);

fn parse_hex_u16(s: &str) -> Result<u16, std::num::ParseIntError> {
    u16::from_str_radix(s.trim_start_matches("0x"), 16)
}

fn parse_hex_u8(s: &str) -> Result<u8, std::num::ParseIntError> {
    u8::from_str_radix(s.trim_start_matches("0x"), 16)
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL of the port to connect to
    ///
    /// either serial:///device/path or tcp+raw://host:port URLs supported
    port: Url,

    /// Unit address, hex
    #[arg(long, value_parser = parse_hex_u16, default_value = "0")]
    address: u16,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write one object value
    Write {
        #[arg(value_parser = parse_hex_u16)]
        object: u16,
        #[arg(value_parser = parse_hex_u16)]
        value: u16,
    },
    /// Query the status of one or more objects
    Query {
        #[arg(value_parser = parse_hex_u16, required = true)]
        objects: Vec<u16>,
    },
    /// Query one equipment-confirmation (class, number) pair
    Confirm {
        #[arg(value_parser = parse_hex_u8)]
        class: u8,
        #[arg(value_parser = parse_hex_u8)]
        number: u8,
    },
}

impl Command {
    fn frame(&self, address: u32) -> Frame {
        match self {
            Command::Write { object, value } => {
                let mut payload = object.to_be_bytes().to_vec();
                payload.extend_from_slice(&value.to_be_bytes());
                Frame::new(CMD_OBJECT_WRITE, address, payload)
            }
            Command::Query { objects } => {
                let mut payload = Vec::with_capacity(objects.len() * 4);
                for object in objects {
                    payload.extend_from_slice(&object.to_be_bytes());
                    payload.extend_from_slice(&[0x00, 0x00]);
                }
                Frame::new(CMD_STATUS_QUERY, address, payload)
            }
            Command::Confirm { class, number } => {
                Frame::new(CMD_STATUS_QUERY, address, vec![*class, *number])
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut framed = Port::open(&args.port).await?.framed();

    let request = args.command.frame(u32::from(args.address));
    println!("-> {:02x?}", request.encode());

    framed.send(request).await?;

    let response = timeout(RESPONSE_TIMEOUT, framed.try_next())
        .await
        .context("timed out waiting for a response")??
        .context("link closed without a response")?;

    println!("<- {:02x?}", response.encode());
    println!(
        "   cmd={:02x} addr={:06x} payload={:02x?}",
        response.command, response.address, response.payload
    );

    Ok(())
}
