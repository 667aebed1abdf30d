//! TCP transport: the listener, the per-connection pump, and the [NFSTcp]
//! trait embedding applications drive the server through.
//!
//! Each accepted connection gets its own [rpc::Context] and its own task.
//! Raw socket bytes flow into a [rpc::SocketMessageHandler]; finished
//! replies come back on a channel and leave the socket as record-marked
//! fragments. The shared transaction tracker spans connections so a
//! retransmission on a fresh socket is still recognized.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::protocol::{rpc, xdr};
use crate::vfs::NFSFileSystem;

/// How long a completed transaction stays on record for duplicate
/// detection.
const TRANSACTION_RETENTION: Duration = Duration::from_secs(60);

/// TCP listener serving one file system to any number of clients.
pub struct NFSTcpListener<T: NFSFileSystem + Send + Sync + 'static> {
    listener: TcpListener,
    local_addr: SocketAddr,
    arcfs: Arc<T>,
    mount_signal: Option<mpsc::Sender<bool>>,
    export_name: Arc<String>,
    transaction_tracker: Arc<rpc::TransactionTracker>,
}

/// Loopback address for host number `hostnum`, inside the 127.88.0.0/16
/// block automatic binding probes.
pub fn generate_host_ip(hostnum: u16) -> String {
    format!("127.88.{}.{}", (hostnum >> 8) & 0xFF, hostnum & 0xFF)
}

/// Runs one client connection to completion. A reader task feeds socket
/// bytes to the message handler; this task pumps the socket and forwards
/// finished replies back out as record-marked fragments. Returns when the
/// peer disconnects or the stream turns fatal.
async fn process_socket(
    mut socket: tokio::net::TcpStream,
    context: rpc::Context,
) -> Result<(), anyhow::Error> {
    let (mut message_handler, mut socksend, mut msgrecvchan) =
        rpc::SocketMessageHandler::new(&context);
    let _ = socket.set_nodelay(true);

    tokio::spawn(async move {
        loop {
            if let Err(e) = message_handler.read().await {
                debug!("Message loop terminated: {:?}", e);
                break;
            }
        }
    });
    loop {
        tokio::select! {
            _ = socket.readable() => {
                let mut buf = [0; 128_000];

                match socket.try_read(&mut buf) {
                    Ok(0) => {
                        return Ok(());
                    }
                    Ok(n) => {
                        let _ = socksend.write_all(&buf[..n]).await;
                    }
                    Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                        // readable() raced another waker; try again.
                    }
                    Err(e) => {
                        debug!("Connection read failed: {:?}", e);
                        return Err(e.into());
                    }
                }
            },
            reply = msgrecvchan.recv() => {
                match reply {
                    Some(Ok(msg)) => {
                        if let Err(e) = rpc::write_fragments(&mut socket, &msg).await {
                            error!("Write error {:?}", e);
                        }
                    }
                    Some(Err(e)) => {
                        debug!("Connection processing failed: {:?}", e);
                        return Err(e);
                    }
                    None => {
                        return Err(anyhow::anyhow!("reply channel closed unexpectedly"));
                    }
                }
            }
        }
    }
}

/// What an embedding application sees of a running server.
#[async_trait]
pub trait NFSTcp: Send + Sync {
    /// The bound port. Useful after binding port 0, where the OS picks.
    fn get_listen_port(&self) -> u16;

    /// The bound address, which `auto:` binding chooses at runtime.
    fn get_listen_ip(&self) -> IpAddr;

    /// Registers a channel that receives `true` when a client mounts and
    /// `false` when one unmounts.
    fn set_mount_listener(&mut self, signal: mpsc::Sender<bool>);

    /// Accepts and serves connections until the listener itself fails.
    async fn handle_forever(&self) -> io::Result<()>;
}

impl<T: NFSFileSystem + Send + Sync + 'static> NFSTcpListener<T> {
    /// Binds to `"ip:port"` and prepares to serve `fs`. The special form
    /// `"auto:port"` probes addresses from [generate_host_ip] until one
    /// binds, giving each local server instance its own loopback address.
    pub async fn bind(ipstr: &str, fs: T) -> io::Result<NFSTcpListener<T>> {
        let (ip, port) = ipstr.split_once(':').ok_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "IP Address must be of form ip:port")
        })?;
        let port = port.parse::<u16>().map_err(|_| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "Port not in range 0..=65535")
        })?;
        let arcfs: Arc<T> = Arc::new(fs);

        if ip != "auto" {
            return NFSTcpListener::bind_internal(ip, port, arcfs).await;
        }

        const NUM_TRIES: u16 = 32;
        for try_ip in 1..=NUM_TRIES {
            let ip = generate_host_ip(try_ip);
            let result = NFSTcpListener::bind_internal(&ip, port, arcfs.clone()).await;

            if result.is_ok() {
                return result;
            }
        }

        Err(io::Error::other("Can't bind automatically"))
    }

    async fn bind_internal(ip: &str, port: u16, arcfs: Arc<T>) -> io::Result<NFSTcpListener<T>> {
        let ipstr = format!("{ip}:{port}");
        let listener = TcpListener::bind(&ipstr).await?;
        let local_addr = listener.local_addr()?;
        info!("Listening on {}", local_addr);

        Ok(NFSTcpListener {
            listener,
            local_addr,
            arcfs,
            mount_signal: None,
            export_name: Arc::new("/".to_string()),
            transaction_tracker: Arc::new(rpc::TransactionTracker::new(TRANSACTION_RETENTION)),
        })
    }

    /// Sets the export path clients must name when mounting. The name is
    /// normalized to exactly one leading and no trailing slash.
    pub fn with_export_name<S: AsRef<str>>(&mut self, export_name: S) {
        self.export_name = Arc::new(format!(
            "/{}",
            export_name.as_ref().trim_end_matches('/').trim_start_matches('/')
        ));
    }
}

#[async_trait]
impl<T: NFSFileSystem + Send + Sync + 'static> NFSTcp for NFSTcpListener<T> {
    fn get_listen_port(&self) -> u16 {
        self.local_addr.port()
    }

    fn get_listen_ip(&self) -> IpAddr {
        self.local_addr.ip()
    }

    fn set_mount_listener(&mut self, signal: mpsc::Sender<bool>) {
        self.mount_signal = Some(signal);
    }

    async fn handle_forever(&self) -> io::Result<()> {
        loop {
            let (socket, _) = self.listener.accept().await?;
            let context = rpc::Context {
                local_port: self.local_addr.port(),
                client_addr: socket.peer_addr()?.to_string(),
                auth: xdr::rpc::auth_unix::default(),
                vfs: self.arcfs.clone(),
                mount_signal: self.mount_signal.clone(),
                export_name: self.export_name.clone(),
                transaction_tracker: self.transaction_tracker.clone(),
            };
            info!("Accepting connection from {}", context.client_addr);
            tokio::spawn(async move {
                let _ = process_socket(socket, context).await;
            });
        }
    }
}
