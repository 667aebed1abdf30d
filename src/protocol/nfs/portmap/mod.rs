//! PORTMAP version 2 procedure handlers (RFC 1057 Appendix A).
//!
//! Just enough of the port mapper for clients that insist on asking where
//! NFS lives before connecting: NULL and GETPORT, which always answers
//! with this server's own listening port. Registration and dump belong to
//! a real system portmapper and answer `PROC_UNAVAIL` here.

use std::io::{Read, Write};

use num_traits::cast::FromPrimitive;
use tracing::warn;

use crate::protocol::rpc;
use crate::protocol::xdr::{self, portmap, Serialize};

mod get_port;
mod null;

use get_port::pmapproc_getport;
use null::pmapproc_null;

/// Routes a PORTMAP call to its procedure handler.
pub fn handle_portmap(
    xid: u32,
    call: xdr::rpc::call_body,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    if call.vers != portmap::VERSION {
        warn!("Unsupported PORTMAP version {} xid:{}", call.vers, xid);
        xdr::rpc::prog_mismatch_reply_message(xid, portmap::VERSION, portmap::VERSION)
            .serialize(output)?;
        return Ok(());
    }
    let prog =
        portmap::PortmapProgram::from_u32(call.proc).unwrap_or(portmap::PortmapProgram::INVALID);

    match prog {
        portmap::PortmapProgram::PMAPPROC_NULL => pmapproc_null(xid, output)?,
        portmap::PortmapProgram::PMAPPROC_GETPORT => pmapproc_getport(xid, input, output, context)?,
        _ => {
            warn!("Unimplemented procedure {:?} xid:{}", prog, xid);
            xdr::rpc::proc_unavail_reply_message(xid).serialize(output)?;
        }
    }
    Ok(())
}
