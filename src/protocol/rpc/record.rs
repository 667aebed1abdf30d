//! Record marking over TCP (RFC 5531 section 11).
//!
//! A stream transport has no message boundaries of its own, so RPC frames
//! every record: a 4-byte big-endian header whose high bit flags the final
//! fragment and whose low 31 bits carry the fragment length, followed by
//! that many payload bytes. A logical message is the concatenation of
//! fragment payloads up to and including the flagged one.
//!
//! [RecordParser] is the receiving half, an explicit state machine fed by
//! whatever byte chunks the socket produces. It is deliberately free of any
//! I/O so the suspend-and-resume behavior can be exercised with plain byte
//! slices. [write_fragments] is the sending half.

use std::cmp::min;

use anyhow::anyhow;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::protocol::xdr::MAX_XDR_SIZE;

const FRAME_HEADER_SIZE: usize = 4;
const LAST_FRAGMENT_FLAG: u32 = 1 << 31;

/// Where the parser stands between byte deliveries.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
enum ParserState {
    /// Expecting a fragment header.
    #[default]
    Idle,
    /// Copying fragment payload; more payload or more fragments owed.
    Accumulating,
    /// A full message is ready to be taken.
    Complete,
}

/// Reassembles record-marked messages from a byte stream.
///
/// Bytes arrive through [feed] in arbitrary chunks; [has_next_message]
/// advances the state machine and answers whether a complete message is
/// resident; [take_message] hands the message over. One chunk can carry
/// part of a message or several messages back to back, so the parser keeps
/// its own read cursor into the accumulation buffer and [release] is called
/// once a drain cycle ends to drop consumed bytes.
///
/// A message may spread over any number of fragments but never over more
/// than [MAX_XDR_SIZE] bytes in total, the bound is checked against each
/// header before payload is copied, so a message of exactly [MAX_XDR_SIZE]
/// bytes is accepted and the first declared byte beyond it is fatal to the
/// connection.
///
/// [feed]: RecordParser::feed
/// [has_next_message]: RecordParser::has_next_message
/// [take_message]: RecordParser::take_message
/// [release]: RecordParser::release
#[derive(Debug, Default)]
pub struct RecordParser {
    state: ParserState,
    /// Raw network bytes not yet consumed by the state machine.
    buffer: Vec<u8>,
    /// Read cursor into `buffer`; everything before it has been consumed.
    next_message_start: usize,
    /// Payload accumulated for the in-progress message.
    message: Vec<u8>,
    /// Bytes still owed to the current fragment.
    fragment_remaining: usize,
    /// The current fragment is the message's last.
    last_fragment: bool,
}

impl RecordParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends freshly received bytes. No parsing happens here.
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Drives the state machine over the unread bytes. `Ok(true)` means a
    /// complete message is ready for [RecordParser::take_message];
    /// `Ok(false)` means more bytes are needed and the caller should come
    /// back after the next read. An error means the connection is beyond
    /// recovery and must be dropped.
    pub fn has_next_message(&mut self) -> Result<bool, anyhow::Error> {
        loop {
            match self.state {
                ParserState::Complete => return Ok(true),
                ParserState::Idle => {
                    if self.unread() < FRAME_HEADER_SIZE {
                        return Ok(false);
                    }
                    let header = self.read_header();
                    self.last_fragment = header & LAST_FRAGMENT_FLAG != 0;
                    let length = (header & !LAST_FRAGMENT_FLAG) as usize;
                    trace!("fragment header length:{} last:{}", length, self.last_fragment);
                    if self.message.len().saturating_add(length) > MAX_XDR_SIZE {
                        return Err(anyhow!(
                            "message grows past {} bytes, closing connection",
                            MAX_XDR_SIZE
                        ));
                    }
                    self.fragment_remaining = length;
                    self.state = ParserState::Accumulating;
                }
                ParserState::Accumulating => {
                    let take = min(self.unread(), self.fragment_remaining);
                    let start = self.next_message_start;
                    self.message.extend_from_slice(&self.buffer[start..start + take]);
                    self.next_message_start += take;
                    self.fragment_remaining -= take;
                    if self.fragment_remaining > 0 {
                        // Mid-fragment with the buffer drained; suspend until
                        // the next feed.
                        return Ok(false);
                    }
                    self.state = if self.last_fragment {
                        ParserState::Complete
                    } else {
                        ParserState::Idle
                    };
                }
            }
        }
    }

    /// Hands over the completed message and arms the parser for the next
    /// one. The read cursor is left alone; a second message already sitting
    /// in the buffer stays reachable.
    pub fn take_message(&mut self) -> Option<Vec<u8>> {
        if self.state != ParserState::Complete {
            return None;
        }
        self.state = ParserState::Idle;
        self.last_fragment = false;
        self.fragment_remaining = 0;

        Some(std::mem::take(&mut self.message))
    }

    /// Ends a drain cycle. Once every resident byte has been consumed the
    /// accumulation buffer is cleared; otherwise it is kept as-is because
    /// another message (or part of one) is already waiting in it.
    pub fn release(&mut self) {
        if self.next_message_start >= self.buffer.len() {
            self.buffer.clear();
            self.next_message_start = 0;
        }
    }

    fn unread(&self) -> usize {
        self.buffer.len() - self.next_message_start
    }

    fn read_header(&mut self) -> u32 {
        let start = self.next_message_start;
        let mut raw = [0_u8; FRAME_HEADER_SIZE];
        raw.copy_from_slice(&self.buffer[start..start + FRAME_HEADER_SIZE]);
        self.next_message_start += FRAME_HEADER_SIZE;

        u32::from_be_bytes(raw)
    }
}

/// Writes one logical message as record-marked fragments. Fragments are
/// capped by the 31-bit length field; only the final one carries the
/// last-fragment flag.
pub async fn write_fragments(
    socket: &mut (impl AsyncWrite + Unpin),
    buf: &[u8],
) -> Result<(), anyhow::Error> {
    const MAX_FRAGMENT_SIZE: usize = (LAST_FRAGMENT_FLAG - 1) as usize;

    let mut offset = 0;
    loop {
        let remaining = buf.len() - offset;
        let fragment_size = min(remaining, MAX_FRAGMENT_SIZE);
        let is_last = offset + fragment_size == buf.len();

        let mut header = fragment_size as u32;
        if is_last {
            header |= LAST_FRAGMENT_FLAG;
        }

        trace!("writing fragment length:{} last:{}", fragment_size, is_last);
        socket.write_all(&u32::to_be_bytes(header)).await?;
        socket.write_all(&buf[offset..offset + fragment_size]).await?;

        offset += fragment_size;
        if is_last {
            return Ok(());
        }
    }
}
