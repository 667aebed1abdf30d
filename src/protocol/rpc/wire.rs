//! Connection-level RPC machinery: message ingestion, call dispatch and
//! reply sequencing.
//!
//! Bytes from the socket flow into a [RecordParser]; every reassembled
//! message becomes a queued command; the worker decodes its [rpc_msg] and
//! routes the call to the NFS, MOUNT or PORTMAP handlers. Anything that
//! can be answered inside the protocol (unknown program, wrong version,
//! rejected credential) is answered here. Only a structurally broken
//! stream surfaces as an error, and that costs the client its connection.

use std::io::{Cursor, Read, Write};

use anyhow::{anyhow, bail};
use futures::future::BoxFuture;
use tokio::io::{AsyncReadExt, DuplexStream};
use tokio::sync::mpsc;
use tracing::{debug, error, trace, warn};

use crate::protocol::nfs;
use crate::protocol::rpc::command_queue::{CommandQueue, CommandResult, ResponseBuffer};
use crate::protocol::rpc::{Context, RecordParser};
use crate::protocol::xdr::{self, deserialize, mount, nfs3, nfs4, portmap, Serialize};

/// Sideband programs Linux clients probe on the NFS port. Refused with
/// PROG_UNAVAIL so the client falls back instead of stalling, and logged
/// quietly because every mount attempt produces a few of them.
const NFS_ACL_PROGRAM: u32 = 100_227;
const NFS_ID_MAP_PROGRAM: u32 = 100_270;
const NFS_METADATA_PROGRAM: u32 = 200_024;
/// <https://docs.kernel.org/filesystems/nfs/localio.html>
const NFS_LOCALIO_PROGRAM: u32 = 400_122;

/// Initial size of the reusable reply buffer. Most replies are a few
/// hundred bytes; READ responses grow it on demand.
const DEFAULT_RESPONSE_BUFFER_CAPACITY: usize = 8192;

/// Decodes one RPC message and runs it to completion, leaving any reply in
/// `output`.
///
/// Refusals the protocol can express become replies: an RPC version other
/// than 2 is denied with RPC_MISMATCH, an undecodable AUTH_UNIX credential
/// with AUTH_ERROR, calls for programs or versions not served here are
/// accepted with the matching PROG_UNAVAIL or PROG_MISMATCH body, and
/// argument bodies that do not decode come back as GARBAGE_ARGS.
///
/// Returns `Ok(true)` when `output` holds a reply to send, `Ok(false)` when
/// the message was deliberately dropped (a retransmission). An error means
/// the stream itself is unusable.
pub async fn handle_rpc(
    input: &mut impl Read,
    output: &mut impl Write,
    mut context: Context,
) -> Result<bool, anyhow::Error> {
    let recv = deserialize::<xdr::rpc::rpc_msg>(input)?;
    let xid = recv.xid;
    let call = match recv.body {
        xdr::rpc::rpc_body::CALL(call) => call,
        xdr::rpc::rpc_body::REPLY(_) => {
            error!("Received a Reply where only Calls are expected, xid:{}", xid);
            return Err(anyhow!("unexpected reply message from client"));
        }
    };

    if call.rpcvers != xdr::rpc::RPC_VERSION_2 {
        warn!("Unsupported RPC version {} xid:{}", call.rpcvers, xid);
        xdr::rpc::rpc_vers_mismatch_reply_message(xid).serialize(output)?;
        return Ok(true);
    }

    if let xdr::rpc::auth_flavor::AUTH_UNIX = call.cred.flavor {
        match deserialize::<xdr::rpc::auth_unix>(&mut Cursor::new(&call.cred.body)) {
            Ok(auth) => context.auth = auth,
            Err(e) => {
                warn!("Rejecting malformed AUTH_UNIX credential xid:{} error:{}", xid, e);
                xdr::rpc::auth_error_reply_message(xid, xdr::rpc::auth_stat::AUTH_BADCRED)
                    .serialize(output)?;
                return Ok(true);
            }
        }
    }

    if context.transaction_tracker.is_retransmission(xid, &context.client_addr) {
        debug!("Retransmission detected, xid:{} client_addr:{}", xid, context.client_addr);
        return Ok(false);
    }

    let res = match call.prog {
        nfs3::PROGRAM => match call.vers {
            nfs3::VERSION => nfs::v3::handle_nfs(xid, call, input, output, &context).await,
            nfs4::VERSION => nfs::v4::handle_nfs(xid, call, input, output, &context).await,
            vers => {
                warn!(
                    "Unsupported NFS version {} (serving {}..={})",
                    vers,
                    nfs3::VERSION,
                    nfs4::VERSION
                );
                xdr::rpc::prog_mismatch_reply_message(xid, nfs3::VERSION, nfs4::VERSION)
                    .serialize(output)?;
                Ok(())
            }
        },
        mount::PROGRAM => nfs::mount::handle_mount(xid, call, input, output, &context).await,
        portmap::PROGRAM => nfs::portmap::handle_portmap(xid, call, input, output, &context),
        NFS_ACL_PROGRAM | NFS_ID_MAP_PROGRAM | NFS_METADATA_PROGRAM | NFS_LOCALIO_PROGRAM => {
            trace!("Refusing auxiliary program {} xid:{}", call.prog, xid);
            xdr::rpc::prog_unavail_reply_message(xid).serialize(output)?;
            Ok(())
        }
        unknown_program => {
            warn!("Unknown RPC program {} xid:{}", unknown_program, xid);
            xdr::rpc::prog_unavail_reply_message(xid).serialize(output)?;
            Ok(())
        }
    };
    context.transaction_tracker.mark_processed(xid, &context.client_addr);
    if let Err(e) = res {
        // Handlers decode their whole argument body before writing reply
        // bytes, so a decode failure leaves the reply buffer clean and the
        // connection usable.
        let arguments_unreadable = e.downcast_ref::<std::io::Error>().is_some_and(|io_err| {
            matches!(
                io_err.kind(),
                std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof
            )
        });
        if !arguments_unreadable {
            return Err(e);
        }
        warn!("Undecodable call arguments xid:{} error:{:#}", xid, e);
        xdr::rpc::garbage_args_reply_message(xid).serialize(output)?;
    }

    Ok(true)
}

/// Adapter between [CommandQueue]'s processor slot and [handle_rpc]. The
/// message bytes are borrowed for the whole run, no copy is made.
pub fn process_rpc_command<'a>(
    data: &'a [u8],
    output: &'a mut ResponseBuffer,
    context: Context,
) -> BoxFuture<'a, anyhow::Result<bool>> {
    Box::pin(async move {
        let mut input = Cursor::new(data);
        handle_rpc(&mut input, output.get_mut_buffer(), context).await
    })
}

/// Reply bytes ready for the socket, or the error that ends the connection.
pub type SocketMessageType = Result<Vec<u8>, anyhow::Error>;

/// Receiving side of one client connection.
///
/// The socket task pumps raw bytes into the duplex handle returned by
/// [SocketMessageHandler::new]; [SocketMessageHandler::read] runs them
/// through the record parser and queues every completed message. Finished
/// replies come back on the returned channel, in call order, ready for
/// [write_fragments].
///
/// [write_fragments]: super::write_fragments
#[derive(Debug)]
pub struct SocketMessageHandler {
    parser: RecordParser,
    socket_receive_channel: DuplexStream,
    context: Context,
    command_queue: CommandQueue,
}

impl SocketMessageHandler {
    /// Builds the handler for one connection. Returns the handler, the
    /// write end the socket task forwards received bytes into, and the
    /// channel delivering reply messages.
    pub fn new(
        context: &Context,
    ) -> (Self, DuplexStream, mpsc::UnboundedReceiver<SocketMessageType>) {
        let (socksend, sockrecv) = tokio::io::duplex(256_000);
        let (msgsend, msgrecv) = mpsc::unbounded_channel();
        let (result_sender, mut result_receiver) = mpsc::unbounded_channel::<CommandResult>();

        let command_queue =
            CommandQueue::new(process_rpc_command, result_sender, DEFAULT_RESPONSE_BUFFER_CAPACITY);

        // Forward finished replies to the socket task, skipping commands
        // that produced nothing to send.
        tokio::spawn(async move {
            while let Some(result) = result_receiver.recv().await {
                match result {
                    Ok(Some(response)) if response.has_content() => {
                        let _ = msgsend.send(Ok(response.into_inner()));
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!("RPC processing failed: {:?}", e);
                        let _ = msgsend.send(Err(e));
                    }
                }
            }
            debug!("Command result forwarder finished");
        });

        (
            Self {
                parser: RecordParser::new(),
                socket_receive_channel: sockrecv,
                context: context.clone(),
                command_queue,
            },
            socksend,
            msgrecv,
        )
    }

    /// Reads whatever bytes are available, advances the record parser and
    /// queues every message it completed. Should be called in a loop; any
    /// error is fatal to the connection, including the peer closing its
    /// end.
    pub async fn read(&mut self) -> Result<(), anyhow::Error> {
        let mut chunk = [0_u8; 4096];
        let n = self.socket_receive_channel.read(&mut chunk).await?;
        if n == 0 {
            bail!("connection closed by peer");
        }
        self.parser.feed(&chunk[..n]);
        while self.parser.has_next_message()? {
            if let Some(message) = self.parser.take_message() {
                trace!("Queueing rpc message of {} bytes", message.len());
                self.command_queue.submit_command(message, self.context.clone())?;
            }
        }
        self.parser.release();

        Ok(())
    }
}
