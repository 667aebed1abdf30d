//! The COMPOUND procedure (procedure 1), RFC 7530 section 15.2.
//!
//! A compound is an ordered batch of operations sharing one evaluation
//! state, the [CompoundContext]. The engine here does three things and
//! nothing else: refuse frames it must not evaluate (wrong minor version,
//! too many operations), run the decoded operations in order until one
//! fails, and encode what ran. All filehandle bookkeeping happens inside
//! the operation handlers; the engine never touches the context.
//!
//! Execution stops at the first result whose status is not `NFS_OK`, and
//! the overall status of the reply is the status of the last result. An
//! operation handler fails by returning [NfsError]; the status inside
//! travels to the client as the error-shaped result for that opcode while
//! the message stays in the server log.

use std::io::{Read, Write};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::protocol::nfs::NfsError;
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::ops::{nfs_argop4, nfs_resop4};
use crate::protocol::xdr::nfsstat::nfsstat;
use crate::protocol::xdr::{self, deserialize, nfs4, Serialize};
use crate::vfs;

use super::{access, getattr, getfh, lookup, putfh, putrootfh, read, readlink, restorefh, savefh};

/// Evaluation state of one compound: the filehandle slots and the backend
/// they resolve against. Created per request, dropped with the reply.
pub struct CompoundContext {
    pub vfs: Arc<dyn vfs::NFSFileSystem + Send + Sync>,
    /// The filehandle operations act on, as a decoded inode number.
    /// PUTFH, PUTROOTFH and LOOKUP replace it.
    pub current_fh: Option<vfs::InodeId>,
    /// The slot SAVEFH copies into and RESTOREFH copies back.
    pub saved_fh: Option<vfs::InodeId>,
    pub client_addr: String,
}

impl CompoundContext {
    pub fn new(
        vfs: Arc<dyn vfs::NFSFileSystem + Send + Sync>,
        client_addr: impl Into<String>,
    ) -> CompoundContext {
        CompoundContext {
            vfs,
            current_fh: None,
            saved_fh: None,
            client_addr: client_addr.into(),
        }
    }

    /// The current filehandle, or the error every operation that needs one
    /// reports when the compound has not set it yet.
    pub fn current(&self) -> Result<vfs::InodeId, NfsError> {
        self.current_fh
            .ok_or_else(|| NfsError::new(nfsstat::NFSERR_NOFILEHANDLE, "no current filehandle"))
    }
}

/// Handles COMPOUND: decodes the frame, refuses what must not run,
/// executes the rest, and writes the reply.
pub async fn nfsproc4_compound(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs4::COMPOUND4args>(input)?;
    debug!("nfsproc4_compound({},tag:{:?},ops:{})", xid, args.tag, args.opcount);

    if args.minorversion != 0 {
        warn!("Unsupported minor version {} xid:{}", args.minorversion, xid);
        let res = nfs4::COMPOUND4res {
            status: nfsstat::NFSERR_MINOR_VERS_MISMATCH,
            tag: args.tag,
            resarray: Vec::new(),
        };
        xdr::rpc::make_success_reply(xid).serialize(output)?;
        res.serialize(output)?;
        return Ok(());
    }

    if args.opcount as usize > nfs4::MAX_OPS_PER_COMPOUND {
        warn!("Refusing compound announcing {} operations xid:{}", args.opcount, xid);
        let res = nfs4::COMPOUND4res {
            status: nfsstat::NFSERR_RESOURCE,
            tag: args.tag,
            resarray: Vec::new(),
        };
        xdr::rpc::make_success_reply(xid).serialize(output)?;
        res.serialize(output)?;
        return Ok(());
    }

    let mut ctx = CompoundContext::new(context.vfs.clone(), context.client_addr.clone());
    let res = process_compound(&args, &mut ctx).await;
    debug!(" {} --> {:?} with {} results", xid, res.status, res.resarray.len());
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    res.serialize(output)?;
    Ok(())
}

/// Runs the operations of a decoded compound in order, stopping after the
/// first non-OK result. Exposed separately from the RPC framing so the
/// engine can be driven directly against a backend.
pub async fn process_compound(
    args: &nfs4::COMPOUND4args,
    ctx: &mut CompoundContext,
) -> nfs4::COMPOUND4res {
    let mut status = nfsstat::NFS_OK;
    let mut resarray = Vec::with_capacity(args.argarray.len());

    for op in &args.argarray {
        let result = match execute_operation(ctx, op).await {
            Ok(result) => result,
            Err(err) => {
                debug!("operation {:?} failed: {}", op.opnum(), err);
                nfs_resop4::error(op.opnum(), err.status)
            }
        };
        status = result.status();
        resarray.push(result);
        if !status.is_success() {
            break;
        }
    }

    nfs4::COMPOUND4res { status, tag: args.tag.clone(), resarray }
}

async fn execute_operation(
    ctx: &mut CompoundContext,
    op: &nfs_argop4,
) -> Result<nfs_resop4, NfsError> {
    match op {
        nfs_argop4::ACCESS(args) => access::execute(ctx, args).await,
        nfs_argop4::GETATTR(args) => getattr::execute(ctx, args).await,
        nfs_argop4::GETFH => getfh::execute(ctx).await,
        nfs_argop4::LOOKUP(args) => lookup::execute(ctx, args).await,
        nfs_argop4::PUTFH(args) => putfh::execute(ctx, args).await,
        nfs_argop4::PUTROOTFH => putrootfh::execute(ctx).await,
        nfs_argop4::READ(args) => read::execute(ctx, args).await,
        nfs_argop4::READLINK => readlink::execute(ctx).await,
        nfs_argop4::RESTOREFH => restorefh::execute(ctx).await,
        nfs_argop4::SAVEFH => savefh::execute(ctx).await,
        nfs_argop4::ILLEGAL => {
            Err(NfsError::new(nfsstat::NFSERR_OP_ILLEGAL, "opcode outside the protocol"))
        }
        nfs_argop4::UNSUPPORTED(opnum) => Err(NfsError::new(
            nfsstat::NFSERR_NOTSUPP,
            format!("operation {:?} is not served", opnum),
        )),
    }
}
