//! The GETPORT procedure (procedure 3), RFC 1057 section A.2.
//!
//! Every program a client could ask about is served on this same socket,
//! so the answer is always the listener's own port. The requested program,
//! version and transport are decoded and logged but not consulted.

use std::io::{Read, Write};

use tracing::debug;

use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, portmap, Serialize};

pub fn pmapproc_getport(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let mapping = deserialize::<portmap::mapping>(input)?;
    let port = context.local_port as u32;
    debug!("pmapproc_getport({},{:?}) --> {}", xid, mapping, port);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    port.serialize(output)?;
    Ok(())
}
