//! The EXPORT procedure (procedure 5), RFC 1813 section 5.2.5.
//!
//! Reports the export list: one entry, the configured export name, with no
//! group restrictions. The reply is a hand-rolled linked list as the RFC
//! frames it, a boolean before each entry and before each group.

use std::io::Write;

use tracing::debug;

use crate::protocol::rpc;
use crate::protocol::xdr::{self, Serialize};

pub fn mountproc3_export(
    xid: u32,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    debug!("mountproc3_export({})", xid);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    // One export entry follows.
    true.serialize(output)?;
    context.export_name.as_bytes().serialize(output)?;
    // No groups for it, and no further entries.
    false.serialize(output)?;
    false.serialize(output)?;
    Ok(())
}
