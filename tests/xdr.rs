use std::fmt::Debug;
use std::io::{Cursor, ErrorKind, Read, Write};

use nfs_boreal::xdr::nfs3;
use nfs_boreal::xdr::nfs4;
use nfs_boreal::xdr::nfsstat::nfsstat;
use nfs_boreal::xdr::{deserialize, Deserialize, Serialize, MAX_XDR_SIZE};

/// A value must decode back to itself, land on a four byte boundary, and
/// leave nothing unread, no matter what the buffer held beforehand.
fn check<T>(value: T)
where
    T: Serialize + Deserialize + Default + Eq + Debug,
{
    for prefill in 0..8 {
        let mut buf = vec![0xa5_u8; prefill];
        value.serialize(&mut buf).expect("serialize");
        assert_eq!((buf.len() - prefill) % 4, 0, "{:?} not aligned to four bytes", value);

        let mut cursor = Cursor::new(buf);
        cursor.set_position(prefill as u64);
        let decoded: T = deserialize(&mut cursor).expect("deserialize");
        assert_eq!(decoded, value);
        assert_eq!(
            cursor.position() as usize,
            cursor.get_ref().len(),
            "trailing bytes after {:?}",
            value
        );
    }
}

fn image<T: Serialize + ?Sized>(value: &T) -> Vec<u8> {
    let mut buf = Vec::new();
    value.serialize(&mut buf).expect("serialize");
    buf
}

// Vec<u8>, Vec<T> and String only serialize through their unsized views,
// so round trips go through thin wrappers.

#[derive(Debug, Default, Eq, PartialEq)]
struct OpaqueBytes(Vec<u8>);

impl Serialize for OpaqueBytes {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.0.as_slice().serialize(dest)
    }
}

impl Deserialize for OpaqueBytes {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.0.deserialize(src)
    }
}

#[derive(Debug, Default, Eq, PartialEq)]
struct XdrString(String);

impl Serialize for XdrString {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.0.as_str().serialize(dest)
    }
}

impl Deserialize for XdrString {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.0.deserialize(src)
    }
}

#[derive(Debug, Default, Eq, PartialEq)]
struct CountedArray(Vec<u32>);

impl Serialize for CountedArray {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.0.as_slice().serialize(dest)
    }
}

impl Deserialize for CountedArray {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.0.deserialize(src)
    }
}

#[test]
fn integers_round_trip() {
    check(0_u32);
    check(1_u32);
    check(0x7fff_ffff_u32);
    check(u32::MAX);

    check(0_i32);
    check(-1_i32);
    check(i32::MIN);
    check(i32::MAX);

    check(0_u64);
    check(1_u64 << 33);
    check(u64::MAX);

    check(-1_i64);
    check(i64::MIN);
    check(i64::MAX);
}

#[test]
fn integers_are_big_endian_on_the_wire() {
    assert_eq!(image(&0x0102_0304_u32), [1, 2, 3, 4]);
    assert_eq!(image(&(-1_i32)), [0xff, 0xff, 0xff, 0xff]);
    assert_eq!(image(&0x0102_0304_0506_0708_u64), [1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn bool_accepts_exactly_zero_and_one() {
    check(false);
    check(true);
    assert_eq!(image(&true), [0, 0, 0, 1]);

    let err = deserialize::<bool>(&mut Cursor::new(vec![0, 0, 0, 2])).expect_err("bool from 2");
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[test]
fn enums_round_trip() {
    check(nfsstat::NFS_OK);
    check(nfsstat::NFSERR_NOENT);
    check(nfsstat::NFSERR_STALE);
    check(nfsstat::NFSERR_OP_ILLEGAL);
    check(nfs3::ftype3::NF3REG);
    check(nfs3::ftype3::NF3LNK);

    // Discriminants ride as signed 32-bit integers.
    assert_eq!(image(&nfsstat::NFSERR_NOENT), [0, 0, 0, 2]);
    assert_eq!(image(&nfs3::ftype3::NF3DIR), [0, 0, 0, 2]);
}

#[test]
fn enums_reject_unknown_discriminants() {
    let err = deserialize::<nfs3::ftype3>(&mut Cursor::new(vec![0, 0, 0, 99]))
        .expect_err("ftype3 from 99");
    assert_eq!(err.kind(), ErrorKind::InvalidData);

    let err = deserialize::<nfsstat>(&mut Cursor::new(vec![0, 0, 0xff, 0xff]))
        .expect_err("nfsstat from 65535");
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[test]
fn fixed_opaques_round_trip() {
    check([0_u8; 8]);
    check([1_u8, 2, 3, 4, 5, 6, 7, 8]);
    check([0xff_u8; 12]);
}

#[test]
fn fixed_opaques_pad_to_alignment() {
    // A six byte array occupies eight bytes on the wire.
    assert_eq!(image(&[9_u8, 8, 7, 6, 5, 4]), [9, 8, 7, 6, 5, 4, 0, 0]);
    let decoded: [u8; 6] = deserialize(&mut Cursor::new(vec![9, 8, 7, 6, 5, 4, 0, 0]))
        .expect("deserialize padded array");
    assert_eq!(decoded, [9, 8, 7, 6, 5, 4]);
}

#[test]
fn opaques_round_trip() {
    check(OpaqueBytes(Vec::new()));
    check(OpaqueBytes(b"a".to_vec()));
    check(OpaqueBytes(b"abcd".to_vec()));
    check(OpaqueBytes((0..=255).collect()));
}

#[test]
fn opaques_carry_length_then_padding() {
    assert_eq!(image(b"abc".as_slice()), [0, 0, 0, 3, b'a', b'b', b'c', 0]);
    assert_eq!(image(b"abcd".as_slice()), [0, 0, 0, 4, b'a', b'b', b'c', b'd']);
    assert_eq!(image(b"".as_slice()), [0, 0, 0, 0]);
}

#[test]
fn strings_round_trip() {
    check(XdrString(String::new()));
    check(XdrString("hello".to_string()));
    check(XdrString("päron π".to_string()));
}

#[test]
fn strings_must_be_utf8() {
    let err = deserialize::<String>(&mut Cursor::new(vec![0, 0, 0, 2, 0xff, 0xfe, 0, 0]))
        .expect_err("string from invalid utf-8");
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[test]
fn counted_arrays_round_trip() {
    check(CountedArray(Vec::new()));
    check(CountedArray(vec![7]));
    check(CountedArray((0..100).collect()));

    assert_eq!(image([0x0102_0304_u32, 5].as_slice()), [0, 0, 0, 2, 1, 2, 3, 4, 0, 0, 0, 5]);
}

#[test]
fn options_are_bool_discriminated() {
    check(None::<u32>);
    check(Some(7_u32));

    assert_eq!(image(&Some(7_u32)), [0, 0, 0, 1, 0, 0, 0, 7]);
    assert_eq!(image(&None::<u32>), [0, 0, 0, 0]);
}

#[test]
fn structs_round_trip() {
    check(nfs3::nfstime3 { seconds: 5, nseconds: 999_999_999 });
    check(nfs4::fsid4 { major: 1, minor: 2 });
    check(nfs4::nfstime4 { seconds: -14, nseconds: 3 });
    check(nfs4::stateid4 { seqid: 9, other: [7; 12] });
}

#[test]
fn rejects_truncated_input() {
    let err = deserialize::<u32>(&mut Cursor::new(vec![0, 1])).expect_err("u32 from two bytes");
    assert_eq!(err.kind(), ErrorKind::UnexpectedEof);

    // Opaque declaring more payload than the stream holds.
    let err = deserialize::<Vec<u8>>(&mut Cursor::new(vec![0, 0, 0, 8, 1, 2]))
        .expect_err("opaque from short stream");
    assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
}

#[test]
fn rejects_hostile_lengths_before_allocating() {
    let mut buf = Vec::new();
    ((MAX_XDR_SIZE + 1) as u32).serialize(&mut buf).expect("serialize length");
    let err = deserialize::<Vec<u8>>(&mut Cursor::new(buf)).expect_err("oversized opaque");
    assert_eq!(err.kind(), ErrorKind::InvalidData);

    let mut buf = Vec::new();
    ((MAX_XDR_SIZE / 4 + 1) as u32).serialize(&mut buf).expect("serialize count");
    let err = deserialize::<Vec<u32>>(&mut Cursor::new(buf)).expect_err("oversized array");
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[test]
fn accepts_opaque_at_the_size_limit() {
    let payload = vec![0x5c_u8; MAX_XDR_SIZE];
    let mut buf = Vec::new();
    payload.as_slice().serialize(&mut buf).expect("serialize");
    let decoded: Vec<u8> = deserialize(&mut Cursor::new(buf)).expect("deserialize");
    assert_eq!(decoded, payload);
}
