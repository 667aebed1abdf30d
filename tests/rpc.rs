use std::io::Cursor;
use std::time::Duration;

mod support;

use tokio::io::{AsyncWriteExt, DuplexStream};
use tokio::sync::mpsc;
use tokio::time::timeout;

use nfs_boreal::protocol::rpc::{SocketMessageHandler, SocketMessageType};
use nfs_boreal::xdr::{self, deserialize, nfs3, nfs4, Serialize, MAX_XDR_SIZE};

use support::test_context;

/// One client connection driven byte by byte: frames go in through the
/// socket side, finished replies come back on the message channel.
struct Connection {
    handler: SocketMessageHandler,
    socksend: DuplexStream,
    replies: mpsc::UnboundedReceiver<SocketMessageType>,
}

impl Connection {
    fn open() -> Connection {
        let (handler, socksend, replies) = SocketMessageHandler::new(&test_context());
        Connection { handler, socksend, replies }
    }

    async fn send_raw(&mut self, bytes: &[u8]) {
        self.socksend.write_all(bytes).await.expect("write to socket");
        self.handler.read().await.expect("handler read");
    }

    async fn send_record(&mut self, message: &[u8]) {
        self.send_raw(&framed(message)).await;
    }

    async fn recv_reply(&mut self) -> Vec<u8> {
        timeout(Duration::from_secs(1), self.replies.recv())
            .await
            .expect("reply timeout")
            .expect("reply channel closed")
            .expect("reply error")
    }

    async fn expect_silence(&mut self) {
        let outcome = timeout(Duration::from_millis(200), self.replies.recv()).await;
        assert!(outcome.is_err(), "expected the call to be dropped without a reply");
    }
}

fn framed(message: &[u8]) -> Vec<u8> {
    let header = (1_u32 << 31) | message.len() as u32;
    let mut bytes = header.to_be_bytes().to_vec();
    bytes.extend_from_slice(message);
    bytes
}

fn nfs_call(vers: u32, proc: u32) -> xdr::rpc::call_body {
    xdr::rpc::call_body {
        rpcvers: 2,
        prog: nfs3::PROGRAM,
        vers,
        proc,
        cred: xdr::rpc::opaque_auth::default(),
        verf: xdr::rpc::opaque_auth::default(),
    }
}

fn encode_call(xid: u32, body: xdr::rpc::call_body, args: &[u8]) -> Vec<u8> {
    let msg = xdr::rpc::rpc_msg { xid, body: xdr::rpc::rpc_body::CALL(body) };
    let mut bytes = Vec::new();
    msg.serialize(&mut bytes).expect("serialize call");
    bytes.extend_from_slice(args);
    bytes
}

fn decode_reply(bytes: &[u8], xid: u32) -> xdr::rpc::reply_body {
    let msg: xdr::rpc::rpc_msg =
        deserialize(&mut Cursor::new(bytes)).expect("deserialize reply header");
    assert_eq!(msg.xid, xid);
    match msg.body {
        xdr::rpc::rpc_body::REPLY(reply) => reply,
        other => panic!("expected a reply message, got {:?}", other),
    }
}

fn accept_data(reply: xdr::rpc::reply_body) -> xdr::rpc::accept_body {
    match reply {
        xdr::rpc::reply_body::MSG_ACCEPTED(accepted) => accepted.reply_data,
        other => panic!("expected an accepted reply, got {:?}", other),
    }
}

#[tokio::test]
async fn answers_null_for_both_served_versions() {
    let mut conn = Connection::open();

    for (xid, vers) in [(10, nfs3::VERSION), (11, nfs4::VERSION)] {
        conn.send_record(&encode_call(xid, nfs_call(vers, 0), &[])).await;
        let reply = conn.recv_reply().await;
        let body = accept_data(decode_reply(&reply, xid));
        assert!(matches!(body, xdr::rpc::accept_body::SUCCESS), "got {:?}", body);
        // NULL carries no results after the accepted header.
        assert_eq!(reply.len(), 24);
    }
}

#[tokio::test]
async fn denies_unsupported_rpc_versions() {
    let mut conn = Connection::open();

    let mut body = nfs_call(nfs3::VERSION, 0);
    body.rpcvers = 1;
    conn.send_record(&encode_call(20, body, &[])).await;

    match decode_reply(&conn.recv_reply().await, 20) {
        xdr::rpc::reply_body::MSG_DENIED(xdr::rpc::rejected_reply::RPC_MISMATCH(info)) => {
            assert_eq!(info.low, 2);
            assert_eq!(info.high, 2);
        }
        other => panic!("expected RPC_MISMATCH, got {:?}", other),
    }
}

#[tokio::test]
async fn reports_the_served_nfs_version_range() {
    let mut conn = Connection::open();

    for (xid, vers) in [(30, 2), (31, 5)] {
        conn.send_record(&encode_call(xid, nfs_call(vers, 0), &[])).await;
        match accept_data(decode_reply(&conn.recv_reply().await, xid)) {
            xdr::rpc::accept_body::PROG_MISMATCH(info) => {
                assert_eq!(info.low, 3);
                assert_eq!(info.high, 4);
            }
            other => panic!("expected PROG_MISMATCH, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn refuses_unknown_programs() {
    let mut conn = Connection::open();

    let mut body = nfs_call(nfs3::VERSION, 0);
    body.prog = 100_099;
    conn.send_record(&encode_call(40, body, &[])).await;

    let body = accept_data(decode_reply(&conn.recv_reply().await, 40));
    assert!(matches!(body, xdr::rpc::accept_body::PROG_UNAVAIL), "got {:?}", body);
}

#[tokio::test]
async fn refuses_sideband_programs_clients_probe() {
    let mut conn = Connection::open();

    // ACL, ID mapping, metadata and LOCALIO probes all get PROG_UNAVAIL so
    // the client falls back cleanly.
    for (xid, prog) in [(50, 100_227), (51, 100_270), (52, 200_024), (53, 400_122)] {
        let mut body = nfs_call(nfs3::VERSION, 0);
        body.prog = prog;
        conn.send_record(&encode_call(xid, body, &[])).await;

        let body = accept_data(decode_reply(&conn.recv_reply().await, xid));
        assert!(matches!(body, xdr::rpc::accept_body::PROG_UNAVAIL), "prog {}: {:?}", prog, body);
    }
}

#[tokio::test]
async fn refuses_unknown_procedures() {
    let mut conn = Connection::open();

    conn.send_record(&encode_call(60, nfs_call(nfs3::VERSION, 22), &[])).await;

    let body = accept_data(decode_reply(&conn.recv_reply().await, 60));
    assert!(matches!(body, xdr::rpc::accept_body::PROC_UNAVAIL), "got {:?}", body);
}

#[tokio::test]
async fn garbage_arguments_do_not_cost_the_connection() {
    let mut conn = Connection::open();

    // GETATTR with an empty argument body.
    conn.send_record(&encode_call(70, nfs_call(nfs3::VERSION, 1), &[])).await;
    let body = accept_data(decode_reply(&conn.recv_reply().await, 70));
    assert!(matches!(body, xdr::rpc::accept_body::GARBAGE_ARGS), "got {:?}", body);

    // The same connection still answers the next call.
    conn.send_record(&encode_call(71, nfs_call(nfs3::VERSION, 0), &[])).await;
    let body = accept_data(decode_reply(&conn.recv_reply().await, 71));
    assert!(matches!(body, xdr::rpc::accept_body::SUCCESS), "got {:?}", body);
}

#[tokio::test]
async fn rejects_malformed_unix_credentials() {
    let mut conn = Connection::open();

    let mut body = nfs_call(nfs3::VERSION, 0);
    // Flavor says AUTH_UNIX but the body ends after the stamp.
    body.cred = xdr::rpc::opaque_auth {
        flavor: xdr::rpc::auth_flavor::AUTH_UNIX,
        body: vec![0, 0, 0, 9],
    };
    conn.send_record(&encode_call(80, body, &[])).await;

    match decode_reply(&conn.recv_reply().await, 80) {
        xdr::rpc::reply_body::MSG_DENIED(xdr::rpc::rejected_reply::AUTH_ERROR(
            xdr::rpc::auth_stat::AUTH_BADCRED,
        )) => {}
        other => panic!("expected AUTH_BADCRED, got {:?}", other),
    }
}

#[tokio::test]
async fn accepts_wellformed_unix_credentials() {
    let mut conn = Connection::open();

    let auth = xdr::rpc::auth_unix {
        stamp: 1000,
        machinename: b"client".to_vec(),
        uid: 500,
        gid: 500,
        gids: vec![500, 1000],
    };
    let mut cred_body = Vec::new();
    auth.serialize(&mut cred_body).expect("serialize credential");

    let mut body = nfs_call(nfs3::VERSION, 0);
    body.cred =
        xdr::rpc::opaque_auth { flavor: xdr::rpc::auth_flavor::AUTH_UNIX, body: cred_body };
    conn.send_record(&encode_call(81, body, &[])).await;

    let body = accept_data(decode_reply(&conn.recv_reply().await, 81));
    assert!(matches!(body, xdr::rpc::accept_body::SUCCESS), "got {:?}", body);
}

#[tokio::test]
async fn drops_retransmitted_calls() {
    let mut conn = Connection::open();

    let bytes = encode_call(90, nfs_call(nfs3::VERSION, 0), &[]);
    conn.send_record(&bytes).await;
    decode_reply(&conn.recv_reply().await, 90);

    // Same xid from the same client again: already answered, dropped.
    conn.send_record(&bytes).await;
    conn.expect_silence().await;

    // A fresh xid goes through.
    conn.send_record(&encode_call(91, nfs_call(nfs3::VERSION, 0), &[])).await;
    decode_reply(&conn.recv_reply().await, 91);
}

#[tokio::test]
async fn closes_the_connection_on_oversized_records() {
    let mut conn = Connection::open();

    let header = ((1_u32 << 31) | (MAX_XDR_SIZE as u32 + 1)).to_be_bytes();
    conn.socksend.write_all(&header).await.expect("write header");

    let err = conn.handler.read().await.expect_err("oversized record");
    assert!(err.to_string().contains("grows past"), "unexpected error: {}", err);
}

#[tokio::test]
async fn reassembles_calls_split_across_fragments() {
    let mut conn = Connection::open();

    let message = encode_call(110, nfs_call(nfs3::VERSION, 0), &[]);
    let (head, tail) = message.split_at(10);

    let mut wire = (head.len() as u32).to_be_bytes().to_vec();
    wire.extend_from_slice(head);
    wire.extend_from_slice(&((1_u32 << 31) | tail.len() as u32).to_be_bytes());
    wire.extend_from_slice(tail);
    conn.send_raw(&wire).await;

    let body = accept_data(decode_reply(&conn.recv_reply().await, 110));
    assert!(matches!(body, xdr::rpc::accept_body::SUCCESS), "got {:?}", body);
}

#[tokio::test]
async fn replies_follow_call_order() {
    let mut conn = Connection::open();

    let mut wire = framed(&encode_call(120, nfs_call(nfs3::VERSION, 0), &[]));
    wire.extend_from_slice(&framed(&encode_call(121, nfs_call(nfs4::VERSION, 0), &[])));
    conn.send_raw(&wire).await;

    decode_reply(&conn.recv_reply().await, 120);
    decode_reply(&conn.recv_reply().await, 121);
}
