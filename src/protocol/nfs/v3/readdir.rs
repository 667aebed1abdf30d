//! The READDIR procedure (procedure 16), RFC 1813 section 3.3.16.
//!
//! Lists a directory in pages. The client passes a cookie naming where to
//! resume (0 for the start), a verifier guarding against the directory
//! changing under the cookie, and a byte ceiling for the whole reply. The
//! reply is streamed entry by entry against that ceiling, so the handler
//! serializes each entry to a scratch buffer first and commits it only
//! when it still fits.
//!
//! Cookies are the file id of the last entry delivered; the verifier is
//! derived from the directory's modification time.

use std::io::{Cursor, Read, Write};

use tracing::{debug, error, trace};

use crate::protocol::rpc;
use crate::protocol::xdr::nfsstat::nfsstat;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};
use crate::write_counter::WriteCounter;

use super::post_op_attr_from;

/// Room kept for the tail of the reply (the final list marker and the eof
/// flag) plus slack for the fixed head, so the byte budget check can stay
/// simple.
const RESERVED_REPLY_BYTES: usize = 128;

/// Handles READDIR. The eof flag goes out true only when every remaining
/// entry fit in this reply.
pub async fn nfsproc3_readdir(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::dir::READDIR3args>(input)?;
    debug!("nfsproc3_readdir({},{:?})", xid, args);

    let dirid = match context.vfs.fh_to_id(&args.dir.data) {
        Ok(id) => id,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            nfs3::post_op_attr::Void.serialize(output)?;
            return Ok(());
        }
    };

    let dir_attr = context.vfs.getattr(dirid).await.ok();
    let dirversion = match &dir_attr {
        Some(attr) => {
            let cvf_version = ((attr.mtime.seconds as u64) << 32) | (attr.mtime.nseconds as u64);
            cvf_version.to_be_bytes()
        }
        None => nfs3::cookieverf3::default(),
    };
    let dir_attr = post_op_attr_from(dir_attr);
    let has_version = args.cookieverf != nfs3::cookieverf3::default();

    let max_bytes_allowed = (args.dircount as usize).saturating_sub(RESERVED_REPLY_BYTES);
    // The budget is in bytes, not entries. An entry is at least a fileid,
    // a cookie and a name, so dividing by 16 overshoots safely.
    let estimated_max_results = (args.dircount / 16) as usize;

    match context.vfs.readdir(dirid, args.cookie, estimated_max_results).await {
        Ok(result) => {
            let mut entry_count = 0;
            let mut all_entries_written = true;

            let mut counting_output = WriteCounter::new(output);
            xdr::rpc::make_success_reply(xid).serialize(&mut counting_output)?;
            nfsstat::NFS_OK.serialize(&mut counting_output)?;
            dir_attr.serialize(&mut counting_output)?;
            dirversion.serialize(&mut counting_output)?;

            for entry in result.entries {
                let entry = nfs3::dir::entry3 {
                    fileid: entry.fileid,
                    name: entry.name.into(),
                    cookie: entry.fileid,
                };
                let mut write_buf: Vec<u8> = Vec::new();
                let mut write_cursor = Cursor::new(&mut write_buf);
                // The list marker announcing one more entry follows.
                true.serialize(&mut write_cursor)?;
                entry.serialize(&mut write_cursor)?;
                write_cursor.flush()?;

                if write_buf.len() + counting_output.bytes_written() < max_bytes_allowed {
                    trace!("  -- dirent {:?}", entry);
                    entry_count += 1;
                    counting_output.write_all(&write_buf)?;
                } else {
                    trace!("  -- insufficient space, truncating");
                    all_entries_written = false;
                    break;
                }
            }

            // Terminates the entry list.
            false.serialize(&mut counting_output)?;
            // The eof flag means "nothing left", which a truncated reply
            // cannot claim.
            let eof = all_entries_written && result.end;
            eof.serialize(&mut counting_output)?;
            debug!(
                "readdir {}, has_version {}, start at {}, flushing {} entries, complete {}",
                dirid, has_version, args.cookie, entry_count, all_entries_written
            );
        }
        Err(stat) => {
            error!("nfsproc3_readdir error {} --> {:?}", xid, stat);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            dir_attr.serialize(output)?;
        }
    }
    Ok(())
}
