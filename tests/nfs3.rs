use std::io::Cursor;

mod support;

use nfs_boreal::protocol::nfs::v3::handle_nfs;
use nfs_boreal::protocol::rpc::Context;
use nfs_boreal::vfs::NFSFileSystem;
use nfs_boreal::xdr::nfsstat::nfsstat;
use nfs_boreal::xdr::{self, deserialize, nfs3, Serialize};

use support::{
    test_context, TestFs, DEEP_FILE_ID, FILE_CONTENT, FILE_ID, GENERATION, LINK_ID, LINK_TARGET,
    MTIME_SECONDS, ROOT_ID, SUB_DIR_ID,
};

const XID: u32 = 7771;

/// Runs one version 3 call and hands back the accept body plus the output
/// stream positioned at the procedure results.
async fn v3_call(
    context: &Context,
    proc: u32,
    args: Vec<u8>,
) -> (xdr::rpc::accept_body, Cursor<Vec<u8>>) {
    let call = xdr::rpc::call_body {
        rpcvers: 2,
        prog: nfs3::PROGRAM,
        vers: nfs3::VERSION,
        proc,
        cred: xdr::rpc::opaque_auth::default(),
        verf: xdr::rpc::opaque_auth::default(),
    };
    let mut input = Cursor::new(args);
    let mut output = Cursor::new(Vec::new());
    handle_nfs(XID, call, &mut input, &mut output, context).await.expect("handle_nfs");

    output.set_position(0);
    let reply: xdr::rpc::rpc_msg = deserialize(&mut output).expect("deserialize reply header");
    assert_eq!(reply.xid, XID);
    match reply.body {
        xdr::rpc::rpc_body::REPLY(xdr::rpc::reply_body::MSG_ACCEPTED(accepted)) => {
            (accepted.reply_data, output)
        }
        other => panic!("expected an accepted reply, got {:?}", other),
    }
}

/// Like [v3_call] for procedures that were dispatched, returning the
/// leading status.
async fn v3_status(context: &Context, proc: u32, args: Vec<u8>) -> (nfsstat, Cursor<Vec<u8>>) {
    let (body, mut output) = v3_call(context, proc, args).await;
    assert!(matches!(body, xdr::rpc::accept_body::SUCCESS), "expected SUCCESS, got {:?}", body);
    let status: nfsstat = deserialize(&mut output).expect("deserialize status");
    (status, output)
}

fn serialized<T: Serialize + ?Sized>(value: &T) -> Vec<u8> {
    let mut buf = Vec::new();
    value.serialize(&mut buf).expect("serialize arguments");
    buf
}

fn fh(id: u64) -> nfs3::nfs_fh3 {
    nfs3::nfs_fh3 { data: TestFs.id_to_fh(id) }
}

fn forged_fh(generation: u64, id: u64) -> nfs3::nfs_fh3 {
    let mut data = generation.to_le_bytes().to_vec();
    data.extend_from_slice(&id.to_le_bytes());
    nfs3::nfs_fh3 { data }
}

fn read_post_op_attr(output: &mut Cursor<Vec<u8>>) -> Option<nfs3::fattr3> {
    match deserialize::<nfs3::post_op_attr>(output).expect("deserialize post_op_attr") {
        nfs3::post_op_attr::attributes(attr) => Some(attr),
        nfs3::post_op_attr::Void => None,
    }
}

fn assert_drained(output: &Cursor<Vec<u8>>) {
    assert_eq!(output.position() as usize, output.get_ref().len(), "trailing reply bytes");
}

#[tokio::test]
async fn null_returns_an_empty_reply() {
    let context = test_context();
    let (body, output) =
        v3_call(&context, nfs3::NFSProgram::NFSPROC3_NULL as u32, Vec::new()).await;
    assert!(matches!(body, xdr::rpc::accept_body::SUCCESS), "got {:?}", body);
    assert_drained(&output);
}

#[tokio::test]
async fn getattr_reports_file_attributes() {
    let context = test_context();
    let proc = nfs3::NFSProgram::NFSPROC3_GETATTR as u32;
    let (status, mut output) = v3_status(&context, proc, serialized(&fh(FILE_ID))).await;
    assert_eq!(status, nfsstat::NFS_OK);

    let attr: nfs3::fattr3 = deserialize(&mut output).expect("deserialize fattr3");
    assert_eq!(attr.ftype, nfs3::ftype3::NF3REG);
    assert_eq!(attr.mode, 0o444);
    assert_eq!(attr.nlink, 1);
    assert_eq!(attr.uid, 1000);
    assert_eq!(attr.gid, 1000);
    assert_eq!(attr.size, FILE_CONTENT.len() as u64);
    assert_eq!(attr.used, FILE_CONTENT.len() as u64);
    assert_eq!(attr.fsid, 1);
    assert_eq!(attr.fileid, FILE_ID);
    assert_eq!(attr.mtime, nfs3::nfstime3 { seconds: MTIME_SECONDS as u32, nseconds: 0 });
    assert_drained(&output);
}

#[tokio::test]
async fn getattr_distinguishes_stale_and_malformed_handles() {
    let context = test_context();
    let proc = nfs3::NFSProgram::NFSPROC3_GETATTR as u32;

    // A handle from an earlier server instance.
    let (status, output) =
        v3_status(&context, proc, serialized(&forged_fh(GENERATION - 1, FILE_ID))).await;
    assert_eq!(status, nfsstat::NFSERR_STALE);
    assert_drained(&output);

    // A handle claiming a future instance cannot be merely stale.
    let (status, _) =
        v3_status(&context, proc, serialized(&forged_fh(GENERATION + 1, FILE_ID))).await;
    assert_eq!(status, nfsstat::NFSERR_BADHANDLE);

    // A handle of the wrong length.
    let (status, _) =
        v3_status(&context, proc, serialized(&nfs3::nfs_fh3 { data: vec![1, 2, 3] })).await;
    assert_eq!(status, nfsstat::NFSERR_BADHANDLE);
}

#[tokio::test]
async fn lookup_resolves_names() {
    let context = test_context();
    let args = nfs3::diropargs3 { dir: fh(ROOT_ID), name: b"hello.txt".as_slice().into() };
    let proc = nfs3::NFSProgram::NFSPROC3_LOOKUP as u32;
    let (status, mut output) = v3_status(&context, proc, serialized(&args)).await;
    assert_eq!(status, nfsstat::NFS_OK);

    let object: nfs3::nfs_fh3 = deserialize(&mut output).expect("deserialize handle");
    assert_eq!(TestFs.fh_to_id(&object.data).expect("decode handle"), FILE_ID);

    let obj_attr = read_post_op_attr(&mut output).expect("object attributes");
    assert_eq!(obj_attr.fileid, FILE_ID);
    let dir_attr = read_post_op_attr(&mut output).expect("directory attributes");
    assert_eq!(dir_attr.fileid, ROOT_ID);
    assert_drained(&output);
}

#[tokio::test]
async fn lookup_miss_reports_directory_attributes() {
    let context = test_context();
    let args = nfs3::diropargs3 { dir: fh(ROOT_ID), name: b"missing".as_slice().into() };
    let proc = nfs3::NFSProgram::NFSPROC3_LOOKUP as u32;
    let (status, mut output) = v3_status(&context, proc, serialized(&args)).await;
    assert_eq!(status, nfsstat::NFSERR_NOENT);

    let dir_attr = read_post_op_attr(&mut output).expect("directory attributes");
    assert_eq!(dir_attr.fileid, ROOT_ID);
    assert_drained(&output);
}

#[tokio::test]
async fn lookup_inside_a_file_is_notdir() {
    let context = test_context();
    let args = nfs3::diropargs3 { dir: fh(FILE_ID), name: b"anything".as_slice().into() };
    let proc = nfs3::NFSProgram::NFSPROC3_LOOKUP as u32;
    let (status, mut output) = v3_status(&context, proc, serialized(&args)).await;
    assert_eq!(status, nfsstat::NFSERR_NOTDIR);

    let dir_attr = read_post_op_attr(&mut output).expect("file attributes");
    assert_eq!(dir_attr.fileid, FILE_ID);
    assert_drained(&output);
}

#[tokio::test]
async fn read_returns_data_and_eof() {
    let context = test_context();
    let proc = nfs3::NFSProgram::NFSPROC3_READ as u32;

    // The whole file in one call.
    let args = nfs3::file::READ3args { file: fh(FILE_ID), offset: 0, count: 4096 };
    let (status, mut output) = v3_status(&context, proc, serialized(&args)).await;
    assert_eq!(status, nfsstat::NFS_OK);
    let res: nfs3::file::READ3resok = deserialize(&mut output).expect("deserialize READ3resok");
    assert_eq!(res.count as usize, FILE_CONTENT.len());
    assert!(res.eof);
    assert_eq!(res.data, FILE_CONTENT);
    assert_drained(&output);

    // A slice out of the middle.
    let args = nfs3::file::READ3args { file: fh(FILE_ID), offset: 6, count: 4 };
    let (status, mut output) = v3_status(&context, proc, serialized(&args)).await;
    assert_eq!(status, nfsstat::NFS_OK);
    let res: nfs3::file::READ3resok = deserialize(&mut output).expect("deserialize READ3resok");
    assert_eq!(res.data, &FILE_CONTENT[6..10]);
    assert_eq!(res.count, 4);
    assert!(!res.eof);

    // Reading past the end is empty data with eof, not an error.
    let args = nfs3::file::READ3args { file: fh(FILE_ID), offset: 10_000, count: 16 };
    let (status, mut output) = v3_status(&context, proc, serialized(&args)).await;
    assert_eq!(status, nfsstat::NFS_OK);
    let res: nfs3::file::READ3resok = deserialize(&mut output).expect("deserialize READ3resok");
    assert_eq!(res.count, 0);
    assert!(res.data.is_empty());
    assert!(res.eof);
}

#[tokio::test]
async fn read_of_a_directory_fails() {
    let context = test_context();
    let args = nfs3::file::READ3args { file: fh(ROOT_ID), offset: 0, count: 16 };
    let proc = nfs3::NFSProgram::NFSPROC3_READ as u32;
    let (status, mut output) = v3_status(&context, proc, serialized(&args)).await;
    assert_eq!(status, nfsstat::NFSERR_ISDIR);

    read_post_op_attr(&mut output).expect("directory attributes");
    assert_drained(&output);
}

#[tokio::test]
async fn readlink_returns_the_target() {
    let context = test_context();
    let proc = nfs3::NFSProgram::NFSPROC3_READLINK as u32;
    let (status, mut output) = v3_status(&context, proc, serialized(&fh(LINK_ID))).await;
    assert_eq!(status, nfsstat::NFS_OK);

    let attr = read_post_op_attr(&mut output).expect("link attributes");
    assert_eq!(attr.ftype, nfs3::ftype3::NF3LNK);
    let path: Vec<u8> = deserialize(&mut output).expect("deserialize path");
    assert_eq!(path, LINK_TARGET);
    assert_drained(&output);
}

#[tokio::test]
async fn readlink_of_a_regular_file_is_inval() {
    let context = test_context();
    let proc = nfs3::NFSProgram::NFSPROC3_READLINK as u32;
    let (status, mut output) = v3_status(&context, proc, serialized(&fh(FILE_ID))).await;
    assert_eq!(status, nfsstat::NFSERR_INVAL);

    let attr = read_post_op_attr(&mut output).expect("file attributes");
    assert_eq!(attr.fileid, FILE_ID);
    assert_drained(&output);
}

fn read_dir_entries(output: &mut Cursor<Vec<u8>>) -> (Vec<nfs3::dir::entry3>, bool) {
    let mut entries = Vec::new();
    while deserialize::<bool>(output).expect("list marker") {
        entries.push(deserialize(output).expect("deserialize entry"));
    }
    let eof = deserialize::<bool>(output).expect("eof flag");
    (entries, eof)
}

#[tokio::test]
async fn readdir_lists_the_whole_directory() {
    let context = test_context();
    let args = nfs3::dir::READDIR3args {
        dir: fh(ROOT_ID),
        cookie: 0,
        cookieverf: nfs3::cookieverf3::default(),
        dircount: 4096,
    };
    let proc = nfs3::NFSProgram::NFSPROC3_READDIR as u32;
    let (status, mut output) = v3_status(&context, proc, serialized(&args)).await;
    assert_eq!(status, nfsstat::NFS_OK);

    let dir_attr = read_post_op_attr(&mut output).expect("directory attributes");
    assert_eq!(dir_attr.fileid, ROOT_ID);
    let verf: nfs3::cookieverf3 = deserialize(&mut output).expect("cookie verifier");
    assert_eq!(verf, ((MTIME_SECONDS as u64) << 32).to_be_bytes());

    let (entries, eof) = read_dir_entries(&mut output);
    let listed: Vec<(u64, Vec<u8>, u64)> =
        entries.iter().map(|e| (e.fileid, e.name.0.clone(), e.cookie)).collect();
    assert_eq!(
        listed,
        vec![
            (FILE_ID, b"hello.txt".to_vec(), FILE_ID),
            (SUB_DIR_ID, b"sub".to_vec(), SUB_DIR_ID),
            (LINK_ID, b"passwd".to_vec(), LINK_ID),
        ]
    );
    assert!(eof);
    assert_drained(&output);
}

#[tokio::test]
async fn readdir_truncates_to_the_byte_budget_and_resumes() {
    let context = test_context();
    let proc = nfs3::NFSProgram::NFSPROC3_READDIR as u32;

    // A budget with room for exactly one entry after the reply head.
    let args = nfs3::dir::READDIR3args {
        dir: fh(ROOT_ID),
        cookie: 0,
        cookieverf: nfs3::cookieverf3::default(),
        dircount: 300,
    };
    let (status, mut output) = v3_status(&context, proc, serialized(&args)).await;
    assert_eq!(status, nfsstat::NFS_OK);
    read_post_op_attr(&mut output).expect("directory attributes");
    let verf: nfs3::cookieverf3 = deserialize(&mut output).expect("cookie verifier");

    let (entries, eof) = read_dir_entries(&mut output);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].fileid, FILE_ID);
    assert!(!eof, "a truncated page must not claim the end of the directory");

    // Resuming from the returned cookie yields the rest.
    let args = nfs3::dir::READDIR3args {
        dir: fh(ROOT_ID),
        cookie: entries[0].cookie,
        cookieverf: verf,
        dircount: 4096,
    };
    let (status, mut output) = v3_status(&context, proc, serialized(&args)).await;
    assert_eq!(status, nfsstat::NFS_OK);
    read_post_op_attr(&mut output).expect("directory attributes");
    let _: nfs3::cookieverf3 = deserialize(&mut output).expect("cookie verifier");

    let (entries, eof) = read_dir_entries(&mut output);
    let listed: Vec<u64> = entries.iter().map(|e| e.fileid).collect();
    assert_eq!(listed, vec![SUB_DIR_ID, LINK_ID]);
    assert!(eof);
}

#[tokio::test]
async fn readdir_rejects_unknown_cookies() {
    let context = test_context();
    let args = nfs3::dir::READDIR3args {
        dir: fh(ROOT_ID),
        cookie: 77,
        cookieverf: nfs3::cookieverf3::default(),
        dircount: 4096,
    };
    let proc = nfs3::NFSProgram::NFSPROC3_READDIR as u32;
    let (status, mut output) = v3_status(&context, proc, serialized(&args)).await;
    assert_eq!(status, nfsstat::NFSERR_BAD_COOKIE);

    read_post_op_attr(&mut output).expect("directory attributes");
    assert_drained(&output);
}

#[tokio::test]
async fn fsinfo_reports_transfer_limits() {
    let context = test_context();
    let proc = nfs3::NFSProgram::NFSPROC3_FSINFO as u32;
    let (status, mut output) = v3_status(&context, proc, serialized(&fh(ROOT_ID))).await;
    assert_eq!(status, nfsstat::NFS_OK);

    let res: nfs3::fs::fsinfo3 = deserialize(&mut output).expect("deserialize fsinfo3");
    assert!(matches!(res.obj_attributes, nfs3::post_op_attr::attributes(_)));
    assert_eq!(res.rtmax, 1024 * 1024);
    assert_eq!(res.rtpref, 1024 * 1024);
    assert_eq!(res.rtmult, 1);
    assert_eq!(res.wtmax, 1024 * 1024);
    assert_eq!(res.wtpref, 1024 * 1024);
    assert_eq!(res.wtmult, 1);
    assert_eq!(res.dtpref, 1024 * 1024);
    assert_eq!(res.maxfilesize, 128 * 1024 * 1024 * 1024);
    assert_eq!(res.time_delta, nfs3::nfstime3 { seconds: 0, nseconds: 1 });
    assert_eq!(
        res.properties,
        nfs3::fs::FSF_SYMLINK | nfs3::fs::FSF_HOMOGENEOUS | nfs3::fs::FSF_CANSETTIME
    );
    assert_drained(&output);
}

#[tokio::test]
async fn pathconf_reports_name_rules() {
    let context = test_context();
    let proc = nfs3::NFSProgram::NFSPROC3_PATHCONF as u32;
    let (status, mut output) = v3_status(&context, proc, serialized(&fh(ROOT_ID))).await;
    assert_eq!(status, nfsstat::NFS_OK);

    let res: nfs3::fs::PATHCONF3resok = deserialize(&mut output).expect("deserialize resok");
    assert_eq!(res.linkmax, 0);
    assert_eq!(res.name_max, 32768);
    assert!(res.no_trunc);
    assert!(res.chown_restricted);
    assert!(!res.case_insensitive);
    assert!(res.case_preserving);
    assert_drained(&output);
}

#[tokio::test]
async fn fsstat_reports_synthetic_totals() {
    let context = test_context();
    let proc = nfs3::NFSProgram::NFSPROC3_FSSTAT as u32;
    let (status, mut output) = v3_status(&context, proc, serialized(&fh(ROOT_ID))).await;
    assert_eq!(status, nfsstat::NFS_OK);

    let res: nfs3::fs::FSSTAT3resok = deserialize(&mut output).expect("deserialize resok");
    assert_eq!(res.tbytes, 1 << 40);
    assert_eq!(res.fbytes, 1 << 40);
    assert_eq!(res.abytes, 1 << 40);
    assert_eq!(res.tfiles, 1 << 30);
    assert_eq!(res.ffiles, 1 << 30);
    assert_eq!(res.afiles, 1 << 30);
    assert_eq!(res.invarsec, u32::MAX);
    assert_drained(&output);
}

#[tokio::test]
async fn access_masks_requested_bits_by_object_kind() {
    let context = test_context();
    let proc = nfs3::NFSProgram::NFSPROC3_ACCESS as u32;
    let all_bits = 0x3f_u32;

    // (object, granted on a read-only backend)
    let expectations = [
        (FILE_ID, nfs3::ACCESS3_READ | nfs3::ACCESS3_EXECUTE),
        (ROOT_ID, nfs3::ACCESS3_READ | nfs3::ACCESS3_LOOKUP | nfs3::ACCESS3_EXECUTE),
        (LINK_ID, nfs3::ACCESS3_READ),
    ];
    for (id, expected) in expectations {
        let mut args = serialized(&fh(id));
        all_bits.serialize(&mut args).expect("serialize mask");

        let (status, mut output) = v3_status(&context, proc, args).await;
        assert_eq!(status, nfsstat::NFS_OK);
        read_post_op_attr(&mut output).expect("object attributes");
        let granted: u32 = deserialize(&mut output).expect("deserialize access");
        assert_eq!(granted, expected, "object {}", id);
        assert_drained(&output);
    }
}

#[tokio::test]
async fn the_write_path_is_refused_before_decoding() {
    let context = test_context();

    let procs = [
        nfs3::NFSProgram::NFSPROC3_SETATTR,
        nfs3::NFSProgram::NFSPROC3_WRITE,
        nfs3::NFSProgram::NFSPROC3_CREATE,
        nfs3::NFSProgram::NFSPROC3_MKDIR,
        nfs3::NFSProgram::NFSPROC3_SYMLINK,
        nfs3::NFSProgram::NFSPROC3_MKNOD,
        nfs3::NFSProgram::NFSPROC3_REMOVE,
        nfs3::NFSProgram::NFSPROC3_RMDIR,
        nfs3::NFSProgram::NFSPROC3_RENAME,
        nfs3::NFSProgram::NFSPROC3_LINK,
        nfs3::NFSProgram::NFSPROC3_READDIRPLUS,
        nfs3::NFSProgram::NFSPROC3_COMMIT,
    ];
    for proc in procs {
        let (body, output) = v3_call(&context, proc as u32, Vec::new()).await;
        assert!(
            matches!(body, xdr::rpc::accept_body::PROC_UNAVAIL),
            "procedure {:?}: {:?}",
            proc,
            body
        );
        assert_drained(&output);
    }
}

#[tokio::test]
async fn deep_lookup_reaches_nested_files() {
    let context = test_context();
    let proc = nfs3::NFSProgram::NFSPROC3_LOOKUP as u32;

    let args = nfs3::diropargs3 { dir: fh(ROOT_ID), name: b"sub".as_slice().into() };
    let (status, mut output) = v3_status(&context, proc, serialized(&args)).await;
    assert_eq!(status, nfsstat::NFS_OK);
    let sub: nfs3::nfs_fh3 = deserialize(&mut output).expect("deserialize handle");
    assert_eq!(TestFs.fh_to_id(&sub.data).expect("decode handle"), SUB_DIR_ID);

    let args = nfs3::diropargs3 { dir: sub, name: b"deep.txt".as_slice().into() };
    let (status, mut output) = v3_status(&context, proc, serialized(&args)).await;
    assert_eq!(status, nfsstat::NFS_OK);
    let deep: nfs3::nfs_fh3 = deserialize(&mut output).expect("deserialize handle");
    assert_eq!(TestFs.fh_to_id(&deep.data).expect("decode handle"), DEEP_FILE_ID);
}
