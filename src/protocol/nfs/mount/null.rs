//! The NULL procedure (procedure 0), RFC 1813 section 5.2.0.

use std::io::Write;

use tracing::debug;

use crate::protocol::xdr::{self, Serialize};

pub fn mountproc3_null(xid: u32, output: &mut impl Write) -> Result<(), anyhow::Error> {
    debug!("mountproc3_null({})", xid);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    Ok(())
}
