//! Log output for the terminal client. The crates log through the `log`
//! facade; records reach a `tracing_subscriber` formatter on stderr.

use crate::config::{DEFAULT_LOG_FILTER, ENV_LOG};
use std::io::{self, Write};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

/// Turns `\n` into `\r\n`; raw mode leaves the cursor in its column otherwise
pub struct CrLf<W: Write>(pub W);

impl<W: Write> Write for CrLf<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut start = 0;
        for (i, byte) in buf.iter().enumerate() {
            if *byte == b'\n' && (i == 0 || buf[i - 1] != b'\r') {
                self.0.write_all(&buf[start..i])?;
                self.0.write_all(b"\r\n")?;
                start = i + 1;
            }
        }
        self.0.write_all(&buf[start..])?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

fn stderr() -> CrLf<io::Stderr> {
    CrLf(io::stderr())
}

/// Filter from `directives`, or the default filter and the parse error
fn filter_from(directives: &str) -> (EnvFilter, Option<String>) {
    match EnvFilter::try_new(directives) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(DEFAULT_LOG_FILTER), Some(e.to_string())),
    }
}

/// Install the global subscriber; a second call leaves the first in place
pub fn install(directives: &str) {
    let (filter, rejected) = filter_from(directives);
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::new("%H:%M:%S%.3f".to_string()))
        .with_writer(stderr)
        .try_init();
    if let Err(e) = installed {
        eprintln!("Logging not installed: {}", e);
        return;
    }
    if let Some(e) = rejected {
        log::warn!("Ignoring {}={:?}: {}", ENV_LOG, directives, e);
    }
}
