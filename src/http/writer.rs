use std::io::{Seek, SeekFrom};

use chrono::Utc;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::body::BodyData;
use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.0";

/// Serializes responses onto a stream.
///
/// The status line is always `HTTP/1.0`. `Date` is stamped on every
/// response that lacks one, `Content-Length` on every response with a
/// non-empty body. File bodies are streamed in `chunk`-sized slices
/// rather than loaded whole.
pub struct ResponseWriter {
    chunk: usize,
}

impl ResponseWriter {
    pub fn new(chunk: usize) -> Self {
        Self { chunk }
    }

    pub async fn send<W>(&self, stream: &mut W, mut response: Response) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        if !response.headers.contains_key("Date") {
            let stamp = Utc::now().format("%a, %-d %b %Y %H:%M:%S GMT").to_string();
            response.headers.set("Date", stamp);
        }

        let body_len = response.body.len();
        if !response.headers.contains_key("Content-Length") && body_len > 0 {
            response.headers.set("Content-Length", body_len.to_string());
        }

        let mut head = Vec::new();
        let status_line = format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            response.status.as_u16(),
            response.status.reason_phrase()
        );
        head.extend_from_slice(status_line.as_bytes());
        response.headers.write_wire(&mut head);
        head.extend_from_slice(b"\r\n");

        stream.write_all(&head).await?;

        // Keep the temp guard alive until the body is fully on the wire.
        let (data, _temp) = response.body.into_data();
        match data {
            BodyData::Memory(bytes) => {
                if !bytes.is_empty() {
                    stream.write_all(&bytes).await?;
                }
            }
            BodyData::File { mut file, len } => {
                file.seek(SeekFrom::Start(0))?;
                let mut reader = tokio::fs::File::from_std(file);
                let mut buf = vec![0u8; self.chunk];
                let mut sent: u64 = 0;

                while sent < len {
                    let want = self.chunk.min((len - sent) as usize);
                    let read = reader.read(&mut buf[..want]).await?;
                    if read == 0 {
                        break;
                    }
                    stream.write_all(&buf[..read]).await?;
                    sent += read as u64;
                }
            }
        }

        stream.flush().await?;
        Ok(())
    }
}
