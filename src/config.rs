//! Link configuration: the emulator talks over a real serial port or a raw
//! TCP connection (for bench setups behind a serial-to-ethernet converter),
//! selected by URL scheme.

use anyhow::{bail, Context, Result};
use futures::{Sink, Stream};
use tokio::net::TcpStream;
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tokio_util::codec::Framed;
use url::Url;

use crate::protocol::codec::{FgaProtocolCodec, Frame};

pub enum Port {
    Serial(SerialStream),
    TcpRaw(TcpStream),
}

pub trait PortStream:
    Stream<Item = std::io::Result<Frame>> + Sink<Frame, Error = std::io::Error> + Send + Unpin
{
}

impl<T> PortStream for T where
    T: Stream<Item = std::io::Result<Frame>> + Sink<Frame, Error = std::io::Error> + Send + Unpin
{
}

impl Port {
    pub async fn open(url: &Url) -> Result<Self> {
        match url.scheme() {
            "serial" => {
                let path = url.path();

                let port = tokio_serial::new(path, 9600)
                    .data_bits(tokio_serial::DataBits::Eight)
                    .stop_bits(tokio_serial::StopBits::One)
                    .parity(tokio_serial::Parity::None)
                    .open_native_async()
                    .with_context(|| format!("failed to open serial port {path}"))?;

                Ok(Self::Serial(port))
            }
            "tcp+raw" => {
                let host = url
                    .host_str()
                    .with_context(|| format!("tcp+raw requires a host in the url: {url}"))?;

                let port = url
                    .port()
                    .with_context(|| format!("tcp+raw requires a port number in the url: {url}"))?;

                let stream = TcpStream::connect((host, port))
                    .await
                    .with_context(|| format!("failed to open tcp+raw connection to: {url}"))?;

                stream.set_nodelay(true)?;

                Ok(Self::TcpRaw(stream))
            }
            other => {
                bail!("url scheme {other} not supported");
            }
        }
    }

    pub fn framed(self) -> Box<dyn PortStream> {
        match self {
            Port::Serial(port) => Box::new(Framed::new(port, FgaProtocolCodec::new())),
            Port::TcpRaw(stream) => Box::new(Framed::new(stream, FgaProtocolCodec::new())),
        }
    }
}
