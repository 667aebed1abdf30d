//! Argument and result bodies of the registered version 4 operations, plus
//! the two tagged unions, [nfs_argop4] and [nfs_resop4], that carry them
//! through a compound.
//!
//! The unions are closed: adding an operation means adding a variant here,
//! its decode arm, and its dispatch arm, and the compiler walks the rest of
//! the crate for the places that must learn about it.

#![allow(dead_code)]
#![allow(non_camel_case_types)]

use std::io::{Read, Write};

use num_traits::cast::FromPrimitive;

use super::*;

/// Implements [Serialize] for a result body whose payload rides behind the
/// status: the status always goes out, the payload only when one is present.
/// Constructors keep the pairing honest, payload if and only if `NFS_OK`.
macro_rules! SerializeStatusUnion {
    ($t:ident) => {
        impl Serialize for $t {
            fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
                self.status.serialize(dest)?;
                if let Some(ref resok) = self.resok {
                    resok.serialize(dest)?;
                }
                Ok(())
            }
        }
    };
}

/// Implements [Deserialize] for a status-fronted result body; the payload is
/// read exactly when the status is `NFS_OK`.
macro_rules! DeserializeStatusUnion {
    ($t:ident, $ok:ident) => {
        impl Deserialize for $t {
            fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
                self.status.deserialize(src)?;
                self.resok = if self.status.is_success() {
                    Some(deserialize::<$ok>(src)?)
                } else {
                    None
                };
                Ok(())
            }
        }
    };
}

/// Arguments of ACCESS: the access bits the caller wants checked.
#[derive(Copy, Clone, Debug, Default)]
pub struct ACCESS4args {
    pub access: u32,
}
DeserializeStruct!(ACCESS4args, access);
SerializeStruct!(ACCESS4args, access);

/// Success body of ACCESS. `supported` reports which of the requested bits
/// the server can even evaluate for this object, `access` the subset the
/// caller holds.
#[derive(Copy, Clone, Debug, Default)]
pub struct ACCESS4resok {
    pub supported: u32,
    pub access: u32,
}
DeserializeStruct!(ACCESS4resok, supported, access);
SerializeStruct!(ACCESS4resok, supported, access);

#[derive(Copy, Clone, Debug, Default)]
pub struct ACCESS4res {
    pub status: nfsstat,
    pub resok: Option<ACCESS4resok>,
}
SerializeStatusUnion!(ACCESS4res);
DeserializeStatusUnion!(ACCESS4res, ACCESS4resok);

impl ACCESS4res {
    pub fn ok(resok: ACCESS4resok) -> Self {
        Self { status: nfsstat::NFS_OK, resok: Some(resok) }
    }

    pub fn error(status: nfsstat) -> Self {
        Self { status, resok: None }
    }
}

/// Arguments of GETATTR: the attributes the caller asks for.
#[derive(Clone, Debug, Default)]
pub struct GETATTR4args {
    pub attr_request: bitmap4,
}
DeserializeStruct!(GETATTR4args, attr_request);
SerializeStruct!(GETATTR4args, attr_request);

/// Success body of GETATTR: the subset of requested attributes the server
/// supports, with their packed values.
#[derive(Clone, Debug, Default)]
pub struct GETATTR4resok {
    pub obj_attributes: fattr4,
}
DeserializeStruct!(GETATTR4resok, obj_attributes);
SerializeStruct!(GETATTR4resok, obj_attributes);

#[derive(Clone, Debug, Default)]
pub struct GETATTR4res {
    pub status: nfsstat,
    pub resok: Option<GETATTR4resok>,
}
SerializeStatusUnion!(GETATTR4res);
DeserializeStatusUnion!(GETATTR4res, GETATTR4resok);

impl GETATTR4res {
    pub fn ok(resok: GETATTR4resok) -> Self {
        Self { status: nfsstat::NFS_OK, resok: Some(resok) }
    }

    pub fn error(status: nfsstat) -> Self {
        Self { status, resok: None }
    }
}

/// Success body of GETFH: the current filehandle, made visible to the
/// client.
#[derive(Clone, Debug, Default)]
pub struct GETFH4resok {
    pub object: nfs_fh4,
}
DeserializeStruct!(GETFH4resok, object);
SerializeStruct!(GETFH4resok, object);

#[derive(Clone, Debug, Default)]
pub struct GETFH4res {
    pub status: nfsstat,
    pub resok: Option<GETFH4resok>,
}
SerializeStatusUnion!(GETFH4res);
DeserializeStatusUnion!(GETFH4res, GETFH4resok);

impl GETFH4res {
    pub fn ok(resok: GETFH4resok) -> Self {
        Self { status: nfsstat::NFS_OK, resok: Some(resok) }
    }

    pub fn error(status: nfsstat) -> Self {
        Self { status, resok: None }
    }
}

/// Arguments of LOOKUP: one name, resolved against the current filehandle.
#[derive(Clone, Debug, Default)]
pub struct LOOKUP4args {
    pub objname: component4,
}
DeserializeStruct!(LOOKUP4args, objname);
SerializeStruct!(LOOKUP4args, objname);

/// LOOKUP carries no payload; a successful lookup announces itself through
/// the replaced current filehandle, fetched with a following GETFH.
#[derive(Copy, Clone, Debug, Default)]
pub struct LOOKUP4res {
    pub status: nfsstat,
}
DeserializeStruct!(LOOKUP4res, status);
SerializeStruct!(LOOKUP4res, status);

/// Arguments of PUTFH: the handle that becomes the current filehandle.
#[derive(Clone, Debug, Default)]
pub struct PUTFH4args {
    pub object: nfs_fh4,
}
DeserializeStruct!(PUTFH4args, object);
SerializeStruct!(PUTFH4args, object);

#[derive(Copy, Clone, Debug, Default)]
pub struct PUTFH4res {
    pub status: nfsstat,
}
DeserializeStruct!(PUTFH4res, status);
SerializeStruct!(PUTFH4res, status);

#[derive(Copy, Clone, Debug, Default)]
pub struct PUTROOTFH4res {
    pub status: nfsstat,
}
DeserializeStruct!(PUTROOTFH4res, status);
SerializeStruct!(PUTROOTFH4res, status);

/// Arguments of READ. The stateid is decoded for wire correctness and then
/// ignored; this server hands out no state.
#[derive(Copy, Clone, Debug, Default)]
pub struct READ4args {
    pub stateid: stateid4,
    pub offset: u64,
    pub count: u32,
}
DeserializeStruct!(READ4args, stateid, offset, count);
SerializeStruct!(READ4args, stateid, offset, count);

/// Success body of READ.
#[derive(Clone, Debug, Default)]
pub struct READ4resok {
    pub eof: bool,
    pub data: Vec<u8>,
}
DeserializeStruct!(READ4resok, eof, data);
SerializeStruct!(READ4resok, eof, data);

#[derive(Clone, Debug, Default)]
pub struct READ4res {
    pub status: nfsstat,
    pub resok: Option<READ4resok>,
}
SerializeStatusUnion!(READ4res);
DeserializeStatusUnion!(READ4res, READ4resok);

impl READ4res {
    pub fn ok(resok: READ4resok) -> Self {
        Self { status: nfsstat::NFS_OK, resok: Some(resok) }
    }

    pub fn error(status: nfsstat) -> Self {
        Self { status, resok: None }
    }
}

/// Success body of READLINK: the link target, UTF-8 on this wire.
#[derive(Clone, Debug, Default)]
pub struct READLINK4resok {
    pub link: linktext4,
}
DeserializeStruct!(READLINK4resok, link);
SerializeStruct!(READLINK4resok, link);

#[derive(Clone, Debug, Default)]
pub struct READLINK4res {
    pub status: nfsstat,
    pub resok: Option<READLINK4resok>,
}
SerializeStatusUnion!(READLINK4res);
DeserializeStatusUnion!(READLINK4res, READLINK4resok);

impl READLINK4res {
    pub fn ok(resok: READLINK4resok) -> Self {
        Self { status: nfsstat::NFS_OK, resok: Some(resok) }
    }

    pub fn error(status: nfsstat) -> Self {
        Self { status, resok: None }
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct RESTOREFH4res {
    pub status: nfsstat,
}
DeserializeStruct!(RESTOREFH4res, status);
SerializeStruct!(RESTOREFH4res, status);

#[derive(Copy, Clone, Debug, Default)]
pub struct SAVEFH4res {
    pub status: nfsstat,
}
DeserializeStruct!(SAVEFH4res, status);
SerializeStruct!(SAVEFH4res, status);

#[derive(Copy, Clone, Debug, Default)]
pub struct ILLEGAL4res {
    pub status: nfsstat,
}
DeserializeStruct!(ILLEGAL4res, status);
SerializeStruct!(ILLEGAL4res, status);

/// One operation of a compound request.
///
/// Two variants never come from a well-behaved client: [UNSUPPORTED] marks a
/// recognized opcode this server has no handler for, and [ILLEGAL] marks an
/// opcode outside the protocol (or a literal OP_ILLEGAL). Either way the
/// argument bytes that may follow the opcode are unreadable, so the compound
/// decoder stops consuming operations once it has produced such a marker.
///
/// [UNSUPPORTED]: nfs_argop4::UNSUPPORTED
/// [ILLEGAL]: nfs_argop4::ILLEGAL
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Debug, Default)]
pub enum nfs_argop4 {
    ACCESS(ACCESS4args),
    GETATTR(GETATTR4args),
    GETFH,
    LOOKUP(LOOKUP4args),
    PUTFH(PUTFH4args),
    PUTROOTFH,
    READ(READ4args),
    READLINK,
    RESTOREFH,
    SAVEFH,
    #[default]
    ILLEGAL,
    UNSUPPORTED(nfs_opnum4),
}

impl nfs_argop4 {
    pub fn opnum(&self) -> nfs_opnum4 {
        match self {
            nfs_argop4::ACCESS(_) => nfs_opnum4::OP_ACCESS,
            nfs_argop4::GETATTR(_) => nfs_opnum4::OP_GETATTR,
            nfs_argop4::GETFH => nfs_opnum4::OP_GETFH,
            nfs_argop4::LOOKUP(_) => nfs_opnum4::OP_LOOKUP,
            nfs_argop4::PUTFH(_) => nfs_opnum4::OP_PUTFH,
            nfs_argop4::PUTROOTFH => nfs_opnum4::OP_PUTROOTFH,
            nfs_argop4::READ(_) => nfs_opnum4::OP_READ,
            nfs_argop4::READLINK => nfs_opnum4::OP_READLINK,
            nfs_argop4::RESTOREFH => nfs_opnum4::OP_RESTOREFH,
            nfs_argop4::SAVEFH => nfs_opnum4::OP_SAVEFH,
            nfs_argop4::ILLEGAL => nfs_opnum4::OP_ILLEGAL,
            nfs_argop4::UNSUPPORTED(op) => *op,
        }
    }

    /// True when no operation after this one can be decoded.
    pub fn stops_decoding(&self) -> bool {
        matches!(self, nfs_argop4::ILLEGAL | nfs_argop4::UNSUPPORTED(_))
    }
}

impl Serialize for nfs_argop4 {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.opnum().serialize(dest)?;
        match self {
            nfs_argop4::ACCESS(args) => args.serialize(dest),
            nfs_argop4::GETATTR(args) => args.serialize(dest),
            nfs_argop4::LOOKUP(args) => args.serialize(dest),
            nfs_argop4::PUTFH(args) => args.serialize(dest),
            nfs_argop4::READ(args) => args.serialize(dest),
            _ => Ok(()),
        }
    }
}

impl Deserialize for nfs_argop4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        let opcode = deserialize::<u32>(src)?;
        *self = match nfs_opnum4::from_u32(opcode) {
            Some(nfs_opnum4::OP_ACCESS) => nfs_argop4::ACCESS(deserialize(src)?),
            Some(nfs_opnum4::OP_GETATTR) => nfs_argop4::GETATTR(deserialize(src)?),
            Some(nfs_opnum4::OP_GETFH) => nfs_argop4::GETFH,
            Some(nfs_opnum4::OP_LOOKUP) => nfs_argop4::LOOKUP(deserialize(src)?),
            Some(nfs_opnum4::OP_PUTFH) => nfs_argop4::PUTFH(deserialize(src)?),
            Some(nfs_opnum4::OP_PUTROOTFH) => nfs_argop4::PUTROOTFH,
            Some(nfs_opnum4::OP_READ) => nfs_argop4::READ(deserialize(src)?),
            Some(nfs_opnum4::OP_READLINK) => nfs_argop4::READLINK,
            Some(nfs_opnum4::OP_RESTOREFH) => nfs_argop4::RESTOREFH,
            Some(nfs_opnum4::OP_SAVEFH) => nfs_argop4::SAVEFH,
            Some(nfs_opnum4::OP_ILLEGAL) | None => nfs_argop4::ILLEGAL,
            Some(op) => nfs_argop4::UNSUPPORTED(op),
        };

        Ok(())
    }
}

/// One result of a compound reply. [UNSUPPORTED] encodes as opcode plus
/// status, which matches the wire shape of nearly every refused operation:
/// their non-OK result arms are void. SETATTR is the one exception, its
/// result carries the `attrsset` bitmap in every arm (RFC 7530 section
/// 16.32), so a refused SETATTR gets an empty bitmap appended.
///
/// [UNSUPPORTED]: nfs_resop4::UNSUPPORTED
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Debug)]
pub enum nfs_resop4 {
    ACCESS(ACCESS4res),
    GETATTR(GETATTR4res),
    GETFH(GETFH4res),
    LOOKUP(LOOKUP4res),
    PUTFH(PUTFH4res),
    PUTROOTFH(PUTROOTFH4res),
    READ(READ4res),
    READLINK(READLINK4res),
    RESTOREFH(RESTOREFH4res),
    SAVEFH(SAVEFH4res),
    ILLEGAL(ILLEGAL4res),
    UNSUPPORTED(nfs_opnum4, nfsstat),
}

impl Default for nfs_resop4 {
    fn default() -> nfs_resop4 {
        nfs_resop4::ILLEGAL(ILLEGAL4res::default())
    }
}

impl nfs_resop4 {
    pub fn opnum(&self) -> nfs_opnum4 {
        match self {
            nfs_resop4::ACCESS(_) => nfs_opnum4::OP_ACCESS,
            nfs_resop4::GETATTR(_) => nfs_opnum4::OP_GETATTR,
            nfs_resop4::GETFH(_) => nfs_opnum4::OP_GETFH,
            nfs_resop4::LOOKUP(_) => nfs_opnum4::OP_LOOKUP,
            nfs_resop4::PUTFH(_) => nfs_opnum4::OP_PUTFH,
            nfs_resop4::PUTROOTFH(_) => nfs_opnum4::OP_PUTROOTFH,
            nfs_resop4::READ(_) => nfs_opnum4::OP_READ,
            nfs_resop4::READLINK(_) => nfs_opnum4::OP_READLINK,
            nfs_resop4::RESTOREFH(_) => nfs_opnum4::OP_RESTOREFH,
            nfs_resop4::SAVEFH(_) => nfs_opnum4::OP_SAVEFH,
            nfs_resop4::ILLEGAL(_) => nfs_opnum4::OP_ILLEGAL,
            nfs_resop4::UNSUPPORTED(op, _) => *op,
        }
    }

    pub fn status(&self) -> nfsstat {
        match self {
            nfs_resop4::ACCESS(res) => res.status,
            nfs_resop4::GETATTR(res) => res.status,
            nfs_resop4::GETFH(res) => res.status,
            nfs_resop4::LOOKUP(res) => res.status,
            nfs_resop4::PUTFH(res) => res.status,
            nfs_resop4::PUTROOTFH(res) => res.status,
            nfs_resop4::READ(res) => res.status,
            nfs_resop4::READLINK(res) => res.status,
            nfs_resop4::RESTOREFH(res) => res.status,
            nfs_resop4::SAVEFH(res) => res.status,
            nfs_resop4::ILLEGAL(res) => res.status,
            nfs_resop4::UNSUPPORTED(_, status) => *status,
        }
    }

    /// Builds the payload-free result that reports `status` for the given
    /// operation.
    pub fn error(op: nfs_opnum4, status: nfsstat) -> nfs_resop4 {
        match op {
            nfs_opnum4::OP_ACCESS => nfs_resop4::ACCESS(ACCESS4res::error(status)),
            nfs_opnum4::OP_GETATTR => nfs_resop4::GETATTR(GETATTR4res::error(status)),
            nfs_opnum4::OP_GETFH => nfs_resop4::GETFH(GETFH4res::error(status)),
            nfs_opnum4::OP_LOOKUP => nfs_resop4::LOOKUP(LOOKUP4res { status }),
            nfs_opnum4::OP_PUTFH => nfs_resop4::PUTFH(PUTFH4res { status }),
            nfs_opnum4::OP_PUTROOTFH => nfs_resop4::PUTROOTFH(PUTROOTFH4res { status }),
            nfs_opnum4::OP_READ => nfs_resop4::READ(READ4res::error(status)),
            nfs_opnum4::OP_READLINK => nfs_resop4::READLINK(READLINK4res::error(status)),
            nfs_opnum4::OP_RESTOREFH => nfs_resop4::RESTOREFH(RESTOREFH4res { status }),
            nfs_opnum4::OP_SAVEFH => nfs_resop4::SAVEFH(SAVEFH4res { status }),
            nfs_opnum4::OP_ILLEGAL => nfs_resop4::ILLEGAL(ILLEGAL4res { status }),
            op => nfs_resop4::UNSUPPORTED(op, status),
        }
    }
}

impl Serialize for nfs_resop4 {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.opnum().serialize(dest)?;
        match self {
            nfs_resop4::ACCESS(res) => res.serialize(dest),
            nfs_resop4::GETATTR(res) => res.serialize(dest),
            nfs_resop4::GETFH(res) => res.serialize(dest),
            nfs_resop4::LOOKUP(res) => res.serialize(dest),
            nfs_resop4::PUTFH(res) => res.serialize(dest),
            nfs_resop4::PUTROOTFH(res) => res.serialize(dest),
            nfs_resop4::READ(res) => res.serialize(dest),
            nfs_resop4::READLINK(res) => res.serialize(dest),
            nfs_resop4::RESTOREFH(res) => res.serialize(dest),
            nfs_resop4::SAVEFH(res) => res.serialize(dest),
            nfs_resop4::ILLEGAL(res) => res.serialize(dest),
            nfs_resop4::UNSUPPORTED(op, status) => {
                status.serialize(dest)?;
                if *op == nfs_opnum4::OP_SETATTR {
                    // SETATTR4res carries attrsset in its error arm too.
                    let attrsset: &[u32] = &[];
                    attrsset.serialize(dest)?;
                }
                Ok(())
            }
        }
    }
}

impl Deserialize for nfs_resop4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        let opcode = deserialize::<u32>(src)?;
        *self = match nfs_opnum4::from_u32(opcode) {
            Some(nfs_opnum4::OP_ACCESS) => nfs_resop4::ACCESS(deserialize(src)?),
            Some(nfs_opnum4::OP_GETATTR) => nfs_resop4::GETATTR(deserialize(src)?),
            Some(nfs_opnum4::OP_GETFH) => nfs_resop4::GETFH(deserialize(src)?),
            Some(nfs_opnum4::OP_LOOKUP) => nfs_resop4::LOOKUP(deserialize(src)?),
            Some(nfs_opnum4::OP_PUTFH) => nfs_resop4::PUTFH(deserialize(src)?),
            Some(nfs_opnum4::OP_PUTROOTFH) => nfs_resop4::PUTROOTFH(deserialize(src)?),
            Some(nfs_opnum4::OP_READ) => nfs_resop4::READ(deserialize(src)?),
            Some(nfs_opnum4::OP_READLINK) => nfs_resop4::READLINK(deserialize(src)?),
            Some(nfs_opnum4::OP_RESTOREFH) => nfs_resop4::RESTOREFH(deserialize(src)?),
            Some(nfs_opnum4::OP_SAVEFH) => nfs_resop4::SAVEFH(deserialize(src)?),
            Some(nfs_opnum4::OP_ILLEGAL) => nfs_resop4::ILLEGAL(deserialize(src)?),
            Some(op) => {
                let status = deserialize(src)?;
                if op == nfs_opnum4::OP_SETATTR {
                    // Consume the attrsset bitmap SETATTR4res carries in
                    // every arm.
                    let _attrsset = deserialize::<bitmap4>(src)?;
                }
                nfs_resop4::UNSUPPORTED(op, status)
            }
            None => {
                return Err(super::super::utils::invalid_data(
                    "unknown opcode in result stream",
                ))
            }
        };

        Ok(())
    }
}
