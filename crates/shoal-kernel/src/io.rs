//! Byte-stream abstractions shared by the core and the builtins.
//!
//! Every capability reads from an [`InputStream`] and writes to an
//! [`OutputStream`]; the executor decides what sits behind them (the
//! caller's stdio, an opened redirection file, or a pipe bridge).

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// A readable byte stream handed to a capability.
pub type InputStream = Box<dyn AsyncRead + Send + Unpin>;

/// A writable byte stream handed to a capability.
pub type OutputStream = Box<dyn AsyncWrite + Send + Unpin>;

/// An input stream that is immediately at end-of-file.
///
/// Used for command substitutions, which must not consume the caller's
/// stdin.
pub fn null_input() -> InputStream {
    Box::new(tokio::io::empty())
}

/// Drain a stream to a UTF-8 string.
pub async fn read_to_string(stream: &mut (dyn AsyncRead + Send + Unpin)) -> io::Result<String> {
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    String::from_utf8(buf).map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "invalid UTF-8"))
}

/// Drain a stream and split it into lines (`\n` or `\r\n` terminated; a
/// trailing terminator does not produce an empty final line).
pub async fn read_lines(stream: &mut (dyn AsyncRead + Send + Unpin)) -> io::Result<Vec<String>> {
    let text = read_to_string(stream).await?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Write a string followed by a newline.
pub async fn write_line(
    stream: &mut (dyn AsyncWrite + Send + Unpin),
    line: &str,
) -> io::Result<()> {
    stream.write_all(line.as_bytes()).await?;
    stream.write_all(b"\n").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_input_is_eof() {
        let mut stream = null_input();
        assert_eq!(read_to_string(&mut stream).await.unwrap(), "");
    }

    #[tokio::test]
    async fn read_lines_drops_trailing_terminator() {
        let mut stream: InputStream = Box::new(std::io::Cursor::new(b"a\nb\r\nc\n".to_vec()));
        assert_eq!(read_lines(&mut stream).await.unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn write_line_appends_newline() {
        let mut buf: Vec<u8> = Vec::new();
        write_line(&mut buf, "hello").await.unwrap();
        assert_eq!(buf, b"hello\n");
    }
}
