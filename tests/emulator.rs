//! End-to-end exercise of the service loop over an in-memory link.

use std::time::Duration;

use futures::{SinkExt, TryStreamExt};
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;

use fgasim::device::{Device, Model};
use fgasim::protocol::codec::{FgaProtocolCodec, Frame};
use fgasim::protocol::dispatch::{ACK, CMD_OBJECT_WRITE, CMD_START, CMD_STATUS_QUERY};
use fgasim::protocol::objects;
use fgasim::service;

type Client = Framed<tokio::io::DuplexStream, FgaProtocolCodec>;

fn start_emulator(model: Model) -> (Client, Device, CancellationToken, tokio::task::JoinHandle<()>) {
    let (near, far) = tokio::io::duplex(1024);

    let device = Device::new(model);
    let cancel = CancellationToken::new();

    let server = {
        let device = device.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let port = Box::new(Framed::new(far, FgaProtocolCodec::new()));
            service::run(port, device, cancel).await.unwrap();
        })
    };

    (Framed::new(near, FgaProtocolCodec::new()), device, cancel, server)
}

async fn exchange(client: &mut Client, request: Frame) -> Frame {
    client.send(request).await.unwrap();

    timeout(Duration::from_secs(5), client.try_next())
        .await
        .expect("timed out waiting for response")
        .unwrap()
        .expect("link closed without a response")
}

#[tokio::test]
async fn write_then_query_over_the_wire() {
    let (mut client, device, cancel, server) = start_emulator(Model::Office);

    // link establishment
    let resp = exchange(&mut client, Frame::new(CMD_START, 0, vec![0x01])).await;
    assert_eq!(resp.command, CMD_START);
    assert_eq!(resp.payload, vec![0x00, 0x01, 0x01, 0x00]);

    // set the target temperature to 16.0°C
    let resp = exchange(
        &mut client,
        Frame::new(CMD_OBJECT_WRITE, 0, vec![0x10, 0x02, 0x00, 0xa0]),
    )
    .await;
    assert_eq!(resp.payload, vec![ACK]);
    assert_eq!(device.snapshot().temperature, 16.0);

    // local power-on shows up in a subsequent wire query
    device.mutate(|state| state.set_power(true));

    let resp = exchange(
        &mut client,
        Frame::new(CMD_STATUS_QUERY, 0, vec![0x10, 0x00, 0x00, 0x00]),
    )
    .await;
    assert_eq!(resp.payload, vec![ACK, 0x10, 0x00, 0x00, 0x01]);

    cancel.cancel();
    timeout(Duration::from_secs(5), server).await.unwrap().unwrap();
}

#[tokio::test]
async fn capability_query_reflects_model() {
    let (mut client, _device, cancel, server) = start_emulator(Model::Vrf);

    let resp = exchange(&mut client, Frame::new(CMD_STATUS_QUERY, 0, vec![0x01, 0x01])).await;
    assert_eq!(resp.payload, vec![ACK, 0x01, 0x01, 0x00, 0x04]);

    cancel.cancel();
    timeout(Duration::from_secs(5), server).await.unwrap().unwrap();
}

#[tokio::test]
async fn wire_writes_broadcast_snapshots() {
    let (mut client, device, cancel, server) = start_emulator(Model::Office);
    let mut updates = device.subscribe();

    let resp = exchange(
        &mut client,
        Frame::new(
            CMD_OBJECT_WRITE,
            0,
            vec![0x10, 0x00, 0x00, 0x01, 0x10, 0x01, 0x00, 0x04],
        ),
    )
    .await;
    assert_eq!(resp.payload, vec![ACK]);

    let snapshot = timeout(Duration::from_secs(5), updates.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(snapshot.power);
    assert_eq!(snapshot.mode.to_string(), "Heat");

    cancel.cancel();
    timeout(Duration::from_secs(5), server).await.unwrap().unwrap();
}

#[tokio::test]
async fn service_survives_noise_on_the_link() {
    let (mut client, _device, cancel, server) = start_emulator(Model::Office);

    // raw garbage, then a valid query
    client
        .get_mut()
        .write_all(&[0xde, 0xad, 0xbe, 0xef])
        .await
        .unwrap();

    let query = objects::MODE.to_be_bytes();
    let resp = exchange(
        &mut client,
        Frame::new(CMD_STATUS_QUERY, 0, vec![query[0], query[1], 0x00, 0x00]),
    )
    .await;
    assert_eq!(resp.payload, vec![ACK, 0x10, 0x01, 0x00, 0x00]);

    cancel.cancel();
    timeout(Duration::from_secs(5), server).await.unwrap().unwrap();
}
