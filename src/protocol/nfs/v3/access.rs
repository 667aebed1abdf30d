//! The ACCESS procedure (procedure 4), RFC 1813 section 3.3.4.
//!
//! Reports which of the requested access bits the caller holds on an
//! object, so clients can cache permissions instead of probing with
//! operations that may fail. The answer is driven by the object kind and
//! whether the backend accepts mutation at all; per-user permission
//! checking is the backend's business and not modeled here.

use std::io::{Read, Write};

use tracing::debug;

use crate::protocol::rpc;
use crate::protocol::xdr::nfsstat::nfsstat;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};
use crate::vfs;

use super::post_op_attr_from;

/// Handles ACCESS. Write-class bits are granted only when the backend
/// reports itself writable; symlinks and special files answer read-only
/// regardless.
pub async fn nfsproc3_access(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let handle = deserialize::<nfs3::nfs_fh3>(input)?;
    let access = deserialize::<u32>(input)?;
    debug!("nfsproc3_access({},{:?},{:#x})", xid, handle, access);

    let id = match context.vfs.fh_to_id(&handle.data) {
        Ok(id) => id,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            nfs3::post_op_attr::Void.serialize(output)?;
            return Ok(());
        }
    };

    let attr = match context.vfs.getattr(id).await {
        Ok(attr) => attr,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            nfs3::post_op_attr::Void.serialize(output)?;
            return Ok(());
        }
    };

    let writable = matches!(context.vfs.capabilities(), vfs::Capabilities::ReadWrite);
    let write_bits = nfs3::ACCESS3_MODIFY | nfs3::ACCESS3_EXTEND | nfs3::ACCESS3_DELETE;

    let mut granted_access = 0;
    match attr.kind {
        vfs::FileKind::Directory => {
            granted_access |=
                access & (nfs3::ACCESS3_READ | nfs3::ACCESS3_LOOKUP | nfs3::ACCESS3_EXECUTE);
            if writable {
                granted_access |= access & write_bits;
            }
        }
        vfs::FileKind::Regular => {
            granted_access |= access & (nfs3::ACCESS3_READ | nfs3::ACCESS3_EXECUTE);
            if writable {
                granted_access |= access & (nfs3::ACCESS3_MODIFY | nfs3::ACCESS3_EXTEND);
            }
        }
        _ => {
            // Symlinks and special files are only ever read.
            granted_access |= access & nfs3::ACCESS3_READ;
        }
    }

    debug!(" {} --> {:#x}", xid, granted_access);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    nfsstat::NFS_OK.serialize(output)?;
    post_op_attr_from(Some(attr)).serialize(output)?;
    granted_access.serialize(output)?;
    Ok(())
}
