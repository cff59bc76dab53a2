use std::io::{self, BufRead};
use std::thread;

use tokio::sync::mpsc;

/// Reads stdin line by line on a dedicated thread.
///
/// A blocking read never holds up the runtime, so the program can exit
/// while a read is still pending.
pub struct InputReader {
    rx: mpsc::UnboundedReceiver<io::Result<String>>,
}

impl InputReader {
    pub fn spawn() -> io::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        thread::Builder::new()
            .name("stdin-reader".to_owned())
            .spawn(move || {
                let mut stdin = io::stdin().lock();
                loop {
                    let mut line = String::new();
                    match stdin.read_line(&mut line) {
                        Ok(0) => break,
                        Ok(_) => {
                            if tx.send(Ok(line)).is_err() {
                                break;
                            }
                        }
                        Err(err) => {
                            tx.send(Err(err)).ok();
                            break;
                        }
                    }
                }
            })?;
        Ok(Self { rx })
    }

    /// Returns the next line, or `None` at the end of input.
    pub async fn next_line(&mut self) -> Option<io::Result<String>> {
        self.rx.recv().await
    }
}
