//! In-order execution of decoded RPC messages.
//!
//! Handlers are async but replies must leave in call order, so each
//! connection owns a queue feeding a single worker task that runs one
//! command to completion before touching the next. Submission never
//! blocks; results come back on a separate channel in the same order.

use anyhow::anyhow;
use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tracing::{debug, error, trace};

use super::Context;

/// Reply bytes under construction.
///
/// The worker reuses one of these across commands to keep allocations
/// down, handing it off (and replacing it) only when a reply actually
/// needs to be sent.
pub struct ResponseBuffer {
    buffer: Vec<u8>,
    has_content: bool,
}

impl ResponseBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buffer: Vec::with_capacity(capacity), has_content: false }
    }

    /// The underlying buffer, for handlers to serialize into.
    pub fn get_mut_buffer(&mut self) -> &mut Vec<u8> {
        &mut self.buffer
    }

    /// Marks the buffer as holding a reply that should be sent.
    pub fn mark_has_content(&mut self) {
        self.has_content = true;
    }

    pub fn has_content(&self) -> bool {
        self.has_content
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.has_content = false;
    }
}

/// One complete RPC message plus the connection state it executes under.
#[derive(Debug)]
pub struct RpcCommand {
    pub data: Vec<u8>,
    pub context: Context,
}

/// Per-command outcome: reply bytes to send, nothing to send (dropped
/// retransmission), or an error fatal to the connection.
pub type CommandResult = Result<Option<ResponseBuffer>, anyhow::Error>;

/// Handler the worker invokes for each message. The returned flag says
/// whether the bytes written to `output` form a reply worth sending.
pub type AsyncCommandProcessor = for<'a> fn(
    data: &'a [u8],
    output: &'a mut ResponseBuffer,
    context: Context,
) -> BoxFuture<'a, anyhow::Result<bool>>;

/// Submission handle for a connection's command worker.
///
/// Commands run strictly in submission order. The handle is cheap to clone
/// and detached from the worker; dropping every handle ends the worker
/// once the queue drains.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    command_sender: mpsc::UnboundedSender<RpcCommand>,
}

impl CommandQueue {
    /// Spawns the worker task and returns its submission handle. Results
    /// are pushed to `result_sender` in command order; `buffer_capacity`
    /// sizes the reusable reply buffer.
    pub fn new(
        processor: AsyncCommandProcessor,
        result_sender: mpsc::UnboundedSender<CommandResult>,
        buffer_capacity: usize,
    ) -> Self {
        let (command_sender, mut command_receiver) = mpsc::unbounded_channel::<RpcCommand>();

        tokio::spawn(async move {
            let mut output_buffer = ResponseBuffer::with_capacity(buffer_capacity);

            while let Some(command) = command_receiver.recv().await {
                trace!("processing queued rpc command");
                output_buffer.clear();

                let RpcCommand { data, context } = command;
                let result = match processor(&data, &mut output_buffer, context).await {
                    Ok(true) => {
                        output_buffer.mark_has_content();
                        let finished = std::mem::replace(
                            &mut output_buffer,
                            ResponseBuffer::with_capacity(buffer_capacity),
                        );
                        Ok(Some(finished))
                    }
                    Ok(false) => Ok(None),
                    Err(e) => Err(e),
                };

                if result_sender.send(result).is_err() {
                    error!("result channel closed, stopping command worker");
                    break;
                }
            }
            debug!("command worker finished");
        });

        Self { command_sender }
    }

    /// Queues a message for processing. Returns immediately; the reply
    /// appears on the result channel once the worker reaches it.
    pub fn submit_command(&self, data: Vec<u8>, context: Context) -> Result<(), anyhow::Error> {
        self.command_sender
            .send(RpcCommand { data, context })
            .map_err(|e| anyhow!("command queue closed: {}", e))
    }
}
