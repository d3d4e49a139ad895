use {
    serde_json::{Value, json},
    tokio::{
        io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
        net::{TcpListener, TcpStream, tcp::OwnedWriteHalf},
    },
};

pub const EXTRANONCE1: &str = "01020304";
pub const EXTRANONCE2_SIZE: usize = 4;

pub struct FakePool {
    listener: TcpListener,
    pub address: String,
}

impl FakePool {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        Self { listener, address }
    }

    pub async fn accept(&self) -> Connection {
        let (stream, _) = self.listener.accept().await.unwrap();
        Connection::new(stream)
    }
}

pub struct Connection {
    reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Connection {
    fn new(stream: TcpStream) -> Self {
        let (reader, writer) = stream.into_split();
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }

    pub async fn read_request(&mut self) -> (u64, String, Value) {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        let message: Value = serde_json::from_str(line.trim()).unwrap();
        (
            message["id"].as_u64().expect("request id"),
            message["method"].as_str().expect("request method").into(),
            message["params"].clone(),
        )
    }

    pub async fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
    }

    pub async fn reply_result(&mut self, id: u64, result: Value) {
        let reply = json!({ "id": id, "result": result, "error": Value::Null });
        self.send(&reply.to_string()).await;
    }

    pub async fn reply_error(&mut self, id: u64, code: i64, message: &str) {
        let reply = json!({
            "id": id,
            "result": Value::Null,
            "error": [code, message, Value::Null],
        });
        self.send(&reply.to_string()).await;
    }

    /// Answers mining.subscribe and mining.authorize with the canned
    /// happy-path replies, returning the ids it saw.
    pub async fn handshake(&mut self) {
        let (id, method, _) = self.read_request().await;
        assert_eq!(method, "mining.subscribe");
        self.reply_result(
            id,
            json!([
                [
                    ["mining.set_difficulty", "deadbeef"],
                    ["mining.notify", "cafebabe"]
                ],
                EXTRANONCE1,
                EXTRANONCE2_SIZE,
            ]),
        )
        .await;

        let (id, method, _) = self.read_request().await;
        assert_eq!(method, "mining.authorize");
        self.reply_result(id, json!(true)).await;
    }

    pub async fn send_set_difficulty(&mut self, difficulty: f64) {
        let notification = json!({
            "id": Value::Null,
            "method": "mining.set_difficulty",
            "params": [difficulty],
        });
        self.send(&notification.to_string()).await;
    }

    pub async fn send_notify(&mut self, job_id: &str, clean_jobs: bool) {
        let notification = json!({
            "id": Value::Null,
            "method": "mining.notify",
            "params": [
                job_id,
                "aa".repeat(32),
                "0200000001",
                "ffffffff",
                [],
                "20000000",
                "1d00ffff",
                "5f5e1000",
                clean_jobs,
            ],
        });
        self.send(&notification.to_string()).await;
    }

    /// Waits for the next mining.submit, ignoring anything else.
    pub async fn read_submit(&mut self) -> (u64, Value) {
        loop {
            let (id, method, params) = self.read_request().await;
            if method == "mining.submit" {
                return (id, params);
            }
        }
    }
}
