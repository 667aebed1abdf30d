//! The status code domain shared by every NFS reply this server produces.
//!
//! Version 3 (RFC 1813) and version 4 (RFC 7530) carve their status values
//! out of the same numeric space: the errno-derived codes below 100 plus the
//! 10000-range protocol codes. Keeping one enum for both versions means a
//! handler's failure can flow into either reply encoding without a mapping
//! table; values that only one version may legally emit are a server-side
//! concern, not a wire one.

#![allow(non_camel_case_types)]

use num_derive::{FromPrimitive, ToPrimitive};

use super::{DeserializeEnum, SerializeEnum};

/// NFS operation status. `NFS_OK` is the only success value; everything else
/// names a failure the client is expected to understand.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum nfsstat {
    /// The call completed successfully.
    #[default]
    NFS_OK = 0,
    /// Caller is neither privileged nor the owner of the target.
    NFSERR_PERM = 1,
    /// No such file or directory.
    NFSERR_NOENT = 2,
    /// Hard I/O error while processing the operation.
    NFSERR_IO = 5,
    /// No such device or address.
    NFSERR_NXIO = 6,
    /// Caller lacks permission for the operation.
    NFSERR_ACCESS = 13,
    /// The object already exists.
    NFSERR_EXIST = 17,
    /// Attempted hard link across file systems.
    NFSERR_XDEV = 18,
    /// No such device.
    NFSERR_NODEV = 19,
    /// Non-directory given where a directory was required.
    NFSERR_NOTDIR = 20,
    /// Directory given where a non-directory was required.
    NFSERR_ISDIR = 21,
    /// Invalid or unsupported argument, such as reading the link text of an
    /// object that is not a symbolic link.
    NFSERR_INVAL = 22,
    /// Operation would grow the file past the server's limit.
    NFSERR_FBIG = 27,
    /// No space left on device.
    NFSERR_NOSPC = 28,
    /// Modifying operation on a read-only file system.
    NFSERR_ROFS = 30,
    /// Too many hard links.
    NFSERR_MLINK = 31,
    /// Name too long.
    NFSERR_NAMETOOLONG = 63,
    /// Directory not empty.
    NFSERR_NOTEMPTY = 66,
    /// Quota hard limit exceeded.
    NFSERR_DQUOT = 69,
    /// The file referred to by the handle no longer exists.
    NFSERR_STALE = 70,
    /// Too many levels of remote in path.
    NFSERR_REMOTE = 71,
    /// File handle failed internal consistency checks.
    NFSERR_BADHANDLE = 10001,
    /// Update synchronization mismatch during SETATTR.
    NFSERR_NOT_SYNC = 10002,
    /// Stale directory cookie.
    NFSERR_BAD_COOKIE = 10003,
    /// Operation not supported.
    NFSERR_NOTSUPP = 10004,
    /// Response would not fit in the buffer the client offered.
    NFSERR_TOOSMALL = 10005,
    /// Server error with no protocol-level equivalent.
    NFSERR_SERVERFAULT = 10006,
    /// Object type not supported by the server.
    NFSERR_BADTYPE = 10007,
    /// Try again later; the server cannot complete the request in a timely
    /// fashion.
    NFSERR_DELAY = 10008,
    /// Verify/nverify attribute comparison matched when it must not.
    NFSERR_SAME = 10009,
    /// Lock request denied.
    NFSERR_DENIED = 10010,
    /// Lease has expired.
    NFSERR_EXPIRED = 10011,
    /// I/O conflicts with an existing lock.
    NFSERR_LOCKED = 10012,
    /// Server is in its grace period.
    NFSERR_GRACE = 10013,
    /// File handle has expired.
    NFSERR_FHEXPIRED = 10014,
    /// Conflicting share reservation.
    NFSERR_SHARE_DENIED = 10015,
    /// Security flavor not accepted for this operation.
    NFSERR_WRONGSEC = 10016,
    /// Client id is in use by another client.
    NFSERR_CLID_INUSE = 10017,
    /// Server resource exhaustion while processing a compound.
    NFSERR_RESOURCE = 10018,
    /// File system has moved.
    NFSERR_MOVED = 10019,
    /// Operation requires a current file handle and none is set.
    NFSERR_NOFILEHANDLE = 10020,
    /// Minor version not supported.
    NFSERR_MINOR_VERS_MISMATCH = 10021,
    /// Client id is stale.
    NFSERR_STALE_CLIENTID = 10022,
    /// State id refers to state that no longer exists.
    NFSERR_STALE_STATEID = 10023,
    /// State id is from an older state generation.
    NFSERR_OLD_STATEID = 10024,
    /// State id is malformed or never existed.
    NFSERR_BAD_STATEID = 10025,
    /// Sequence id is out of order.
    NFSERR_BAD_SEQID = 10026,
    /// Verify attribute comparison failed.
    NFSERR_NOT_SAME = 10027,
    /// Lock range is not supported.
    NFSERR_LOCK_RANGE = 10028,
    /// Current file handle is a symbolic link where one is not allowed.
    NFSERR_SYMLINK = 10029,
    /// RESTOREFH without a saved file handle.
    NFSERR_RESTOREFH = 10030,
    /// Lease moved to another server.
    NFSERR_LEASE_MOVED = 10031,
    /// Attribute not supported.
    NFSERR_ATTRNOTSUPP = 10032,
    /// Reclaim attempted outside the grace period.
    NFSERR_NO_GRACE = 10033,
    /// Reclaim of state that was not previously held.
    NFSERR_RECLAIM_BAD = 10034,
    /// Reclaim conflicts with existing state.
    NFSERR_RECLAIM_CONFLICT = 10035,
    /// Request arguments could not be decoded.
    NFSERR_BADXDR = 10036,
    /// Locks still held by the client.
    NFSERR_LOCKS_HELD = 10037,
    /// I/O not permitted by the open mode.
    NFSERR_OPENMODE = 10038,
    /// Owner or group attribute cannot be translated.
    NFSERR_BADOWNER = 10039,
    /// Name contains a character the server cannot store.
    NFSERR_BADCHAR = 10040,
    /// Name is not valid on the server.
    NFSERR_BADNAME = 10041,
    /// Lock range crosses an internal server boundary.
    NFSERR_BAD_RANGE = 10042,
    /// Lock type not supported.
    NFSERR_LOCK_NOTSUPP = 10043,
    /// Operation number is outside the protocol.
    NFSERR_OP_ILLEGAL = 10044,
    /// Granting the lock would cause a deadlock.
    NFSERR_DEADLOCK = 10045,
    /// File is open and the operation requires it closed.
    NFSERR_FILE_OPEN = 10046,
    /// State has been revoked by the administrator.
    NFSERR_ADMIN_REVOKED = 10047,
    /// Callback path to the client is down.
    NFSERR_CB_PATH_DOWN = 10048,
}
impl SerializeEnum for nfsstat {}
impl DeserializeEnum for nfsstat {}

impl nfsstat {
    pub fn is_success(&self) -> bool {
        matches!(self, nfsstat::NFS_OK)
    }
}
