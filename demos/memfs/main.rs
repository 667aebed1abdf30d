use nfs_boreal::tcp::{NFSTcp, NFSTcpListener};

mod fs;

const HOSTPORT: u32 = 11111;

/// Serves the read-only in-memory tree from [fs::MemFs] to real NFS
/// clients, versions 3 and 4.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    println!("Serving an in-memory tree on 0.0.0.0:{HOSTPORT}");
    println!("Mount it with:");
    println!("  sudo mount -t nfs -o proto=tcp,port={HOSTPORT},mountport={HOSTPORT},nolock 127.0.0.1:/ /mnt/demo");
    println!("or as version 4:");
    println!("  sudo mount -t nfs4 -o proto=tcp,port={HOSTPORT} 127.0.0.1:/ /mnt/demo");

    let listener = NFSTcpListener::bind(&format!("0.0.0.0:{HOSTPORT}"), fs::MemFs::default())
        .await
        .unwrap();
    listener.handle_forever().await.unwrap();
}
