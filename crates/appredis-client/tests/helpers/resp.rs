//! In-process RESP server answering a fixed set of commands.
//!
//! `PING` → `PONG`, `GET` → `"value"`, `INCR` → a type error, `CLIENT` and
//! `SELECT` → `OK`, anything else → `ERR unknown command`.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// Fake Redis server bound to an ephemeral local port.
pub struct FakeRedis {
    url: String,
    accepted: Arc<AtomicUsize>,
}

impl FakeRedis {
    /// Start a server that keeps every socket open.
    pub async fn start() -> Self {
        Self::spawn(None).await
    }

    /// Start a server that closes each socket after answering `limit`
    /// commands. Connection handshake commands are not counted.
    pub async fn closing_after(limit: usize) -> Self {
        Self::spawn(Some(limit)).await
    }

    async fn spawn(limit: Option<usize>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let accepted = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&accepted);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(serve(socket, limit));
            }
        });

        Self {
            url: format!("redis://{addr}/0"),
            accepted,
        }
    }

    /// Connection URL for the server.
    pub fn url(&self) -> String {
        self.url.clone()
    }

    /// Number of sockets accepted so far.
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

async fn serve(socket: TcpStream, limit: Option<usize>) -> io::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let mut answered = 0;

    while let Some(args) = read_command(&mut reader).await? {
        writer.write_all(reply(&args)).await?;
        if is_handshake(&args) {
            continue;
        }
        answered += 1;
        if limit.is_some_and(|limit| answered >= limit) {
            break;
        }
    }
    Ok(())
}

/// Read one command sent as an array of bulk strings. `None` at EOF.
async fn read_command<R>(reader: &mut R) -> io::Result<Option<Vec<String>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    let count = header(&line, '*')?;

    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        line.clear();
        reader.read_line(&mut line).await?;
        let len = header(&line, '$')?;
        let mut buf = vec![0; len + 2];
        reader.read_exact(&mut buf).await?;
        buf.truncate(len);
        args.push(String::from_utf8_lossy(&buf).into_owned());
    }
    Ok(Some(args))
}

fn header(line: &str, marker: char) -> io::Result<usize> {
    line.trim_end()
        .strip_prefix(marker)
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, format!("bad header {line:?}")))
}

fn command_name(args: &[String]) -> String {
    args.first().map(|c| c.to_ascii_uppercase()).unwrap_or_default()
}

fn is_handshake(args: &[String]) -> bool {
    matches!(command_name(args).as_str(), "CLIENT" | "SELECT")
}

fn reply(args: &[String]) -> &'static [u8] {
    match command_name(args).as_str() {
        "PING" => b"+PONG\r\n",
        "GET" => b"$5\r\nvalue\r\n",
        "INCR" => b"-ERR value is not an integer or out of range\r\n",
        "CLIENT" | "SELECT" => b"+OK\r\n",
        _ => b"-ERR unknown command\r\n",
    }
}
