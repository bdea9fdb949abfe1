//! Server core
//!
//! Binds the listener, accepts clients, and runs the per-session command
//! loop. Upload and download data phases are framed here; everything else
//! is dispatched through the protocol handlers.

use log::{error, info, warn};
use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

use crate::config::ServerConfig;
use crate::error::{ProtocolError, ServerError};
use crate::protocol::responses::{
    DATA_OPEN, INVALID_REQUEST, READY, SYNTAX_ERROR, TOO_MANY_CONNECTIONS, TRANSFER_COMPLETE,
    format_response,
};
use crate::protocol::{
    Command, CommandStatus, handle_command, handle_download, handle_upload, parse_command,
};
use crate::storage::FileStore;

pub struct Server {
    listener: TcpListener,
    store: Arc<FileStore>,
    config: Arc<ServerConfig>,
    active_clients: Arc<AtomicUsize>,
}

impl Server {
    /// Build the store, ensure the storage root exists, and bind the
    /// listener.
    pub async fn new(config: ServerConfig) -> Result<Server, ServerError> {
        let store = FileStore::new(&config.storage_root)?;
        store.init()?;

        let listener = TcpListener::bind(config.control_socket()).await?;
        info!("Server bound to {}", config.control_socket());

        Ok(Server {
            listener,
            store: Arc::new(store),
            config: Arc::new(config),
            active_clients: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub async fn start(&self) {
        info!(
            "Starting filevault server on {} (root {}, max {} clients)",
            self.config.control_socket(),
            self.store.root().display(),
            self.config.max_clients
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let active = Arc::clone(&self.active_clients);

                    if active.fetch_add(1, Ordering::SeqCst) >= self.config.max_clients {
                        active.fetch_sub(1, Ordering::SeqCst);
                        warn!("Rejecting {}: connection limit reached", addr);
                        tokio::spawn(async move {
                            let mut stream = stream;
                            let _ = stream
                                .write_all(
                                    format_response(
                                        TOO_MANY_CONNECTIONS,
                                        "Too many connections. Try again later.",
                                    )
                                    .as_bytes(),
                                )
                                .await;
                        });
                        continue;
                    }

                    let store = Arc::clone(&self.store);
                    let config = Arc::clone(&self.config);

                    // Spawn a task per client so the accept loop doesn't block
                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, addr, store, config).await {
                            warn!("Session for {} ended with error: {}", addr, e);
                        }
                        active.fetch_sub(1, Ordering::SeqCst);
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Handles a client session: greets, then serves commands until QUIT or
/// disconnect.
async fn handle_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    store: Arc<FileStore>,
    config: Arc<ServerConfig>,
) -> Result<(), std::io::Error> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();

    write_half
        .write_all(format_response(READY, "Filevault storage service ready").as_bytes())
        .await?;
    write_half.flush().await?;
    info!("Client connected: {}", client_addr);

    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            info!("Connection closed by client {}", client_addr);
            break;
        }

        if line.len() > config.max_command_length {
            let err = ProtocolError::CommandTooLong(line.len());
            warn!("{}: {}", client_addr, err);
            write_half
                .write_all(format_response(SYNTAX_ERROR, "Command too long").as_bytes())
                .await?;
            continue;
        }

        let command = parse_command(line.trim_end_matches("\r\n"));
        info!("Received from {}: {:?}", client_addr, command);

        match command {
            Command::Stor { path, name, size } => {
                handle_stor(
                    &mut reader,
                    &mut write_half,
                    &store,
                    &config,
                    &path,
                    &name,
                    size,
                )
                .await?;
            }
            Command::Retr(path) => {
                handle_retr(&mut write_half, &store, &config, &path).await?;
            }
            other => {
                let result = handle_command(&store, &other);
                if let Some(msg) = result.message {
                    write_half.write_all(msg.as_bytes()).await?;
                }
                if let CommandStatus::CloseConnection = result.status {
                    info!("Client {} requested to quit", client_addr);
                    break;
                }
            }
        }
    }

    info!("Client {} disconnected", client_addr);
    Ok(())
}

/// Frames a STOR data phase: acknowledge, read exactly `size` bytes from
/// the connection, then hand the payload to the store.
async fn handle_stor(
    reader: &mut BufReader<OwnedReadHalf>,
    writer: &mut OwnedWriteHalf,
    store: &FileStore,
    config: &ServerConfig,
    path: &str,
    name: &str,
    size: u64,
) -> Result<(), std::io::Error> {
    if size > config.max_upload_bytes() {
        let err = ProtocolError::PayloadTooLarge(size);
        warn!("{}", err);
        writer
            .write_all(
                format_response(INVALID_REQUEST, "Upload exceeds the size limit").as_bytes(),
            )
            .await?;
        return Ok(());
    }

    writer
        .write_all(format_response(DATA_OPEN, &format!("Ready for {} bytes", size)).as_bytes())
        .await?;
    writer.flush().await?;

    let mut content = vec![0u8; size as usize];
    reader.read_exact(&mut content).await?;

    let result = handle_upload(store, path, name, &content);
    if let Some(msg) = result.message {
        writer.write_all(msg.as_bytes()).await?;
    }

    Ok(())
}

/// Frames a RETR data phase: open the resource, announce its length, and
/// stream it out in buffer-size chunks.
async fn handle_retr(
    writer: &mut OwnedWriteHalf,
    store: &FileStore,
    config: &ServerConfig,
    path: &str,
) -> Result<(), std::io::Error> {
    let mut resource = match handle_download(store, path) {
        Ok(resource) => resource,
        Err(result) => {
            if let Some(msg) = result.message {
                writer.write_all(msg.as_bytes()).await?;
            }
            return Ok(());
        }
    };

    writer
        .write_all(
            format_response(
                DATA_OPEN,
                &format!("Opening data transfer ({} bytes)", resource.len()),
            )
            .as_bytes(),
        )
        .await?;

    // Resource reads are synchronous; only the socket writes await.
    let mut buffer = vec![0u8; config.buffer_size];
    loop {
        let n = match resource.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                error!(
                    "Read failure while sending {}: {}",
                    resource.path().display(),
                    e
                );
                return Err(e);
            }
        };
        writer.write_all(&buffer[..n]).await?;
    }

    writer
        .write_all(format_response(TRANSFER_COMPLETE, "Transfer complete").as_bytes())
        .await?;

    Ok(())
}
