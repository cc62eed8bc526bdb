//! Line input for the terminal frontend
//!
//! Stdin is read on its own OS thread. A blocked read there never keeps the
//! process alive once `main` returns, so Ctrl-C exits right away.

use std::io::{self, BufRead};
use std::thread;
use tokio::sync::mpsc;

/// Decode one raw line. Invalid UTF-8 is replaced rather than rejected and
/// the line terminator (`\n` or `\r\n`) is stripped.
#[must_use]
pub fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

/// Forward every line of `reader` into `tx` until end of input, a read
/// error, or the receiver going away.
pub fn forward_lines<R: BufRead>(mut reader: R, tx: &mpsc::UnboundedSender<String>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                if tx.send(decode_line(&buf)).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read input, treating as end of input");
                break;
            }
        }
    }
}

/// Start the detached stdin reader thread. The channel closes on end of
/// input.
pub fn spawn_stdin_reader() -> io::Result<mpsc::UnboundedReceiver<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || forward_lines(io::stdin().lock(), &tx))?;
    Ok(rx)
}
