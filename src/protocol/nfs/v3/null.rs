//! The NULL procedure (procedure 0), RFC 1813 section 3.3.0.
//!
//! Does no work. Clients use it to probe that the server answers and to
//! measure round-trip time.

use std::io::Write;

use tracing::debug;

use crate::protocol::xdr::{self, Serialize};

/// Answers NULL with an empty success reply.
pub fn nfsproc3_null(xid: u32, output: &mut impl Write) -> Result<(), anyhow::Error> {
    debug!("nfsproc3_null({})", xid);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    Ok(())
}
