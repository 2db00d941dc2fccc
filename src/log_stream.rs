use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The process-wide request log that test harnesses read.
///
/// Every write takes the lock once and emits complete lines, so concurrent requests never
/// interleave within a line (or within a multi-line block such as an envelope dump).
/// [`LogStream::flush`] is called by the server after every request.
#[derive(Clone)]
pub struct LogStream {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

/// Read side of an in-memory [`LogStream`].
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogStream {
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// A stream backed by memory, plus the handle to read back what was written.
    pub fn in_memory() -> (Self, LogBuffer) {
        let buffer = LogBuffer::default();
        (Self::from_writer(buffer.clone()), buffer)
    }

    pub fn line(&self, line: impl fmt::Display) {
        self.block(|sink| writeln!(sink, "{}", line));
    }

    /// Write several lines while holding the lock for the whole block.
    pub fn block<F>(&self, write: F)
    where
        F: FnOnce(&mut dyn Write) -> io::Result<()>,
    {
        let mut sink = self.lock();
        if let Err(e) = write(&mut **sink) {
            log::debug!("Failed to write to the request log: {}", e);
        }
    }

    pub fn flush(&self) {
        if let Err(e) = self.lock().flush() {
            log::debug!("Failed to flush the request log: {}", e);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        // A panic while holding the lock leaves at worst a torn line behind; keep logging.
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for LogStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogStream").finish_non_exhaustive()
    }
}

impl Default for LogStream {
    fn default() -> Self {
        Self::stdout()
    }
}

impl LogBuffer {
    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn lines_are_terminated() {
        let (log, buffer) = LogStream::in_memory();
        log.line("GET /api/0 HTTP/1.1");
        log.line(format_args!("     upload-dif: {}", "a.dylib"));

        assert_eq!(
            buffer.contents(),
            "GET /api/0 HTTP/1.1\n     upload-dif: a.dylib\n"
        );
    }

    #[test]
    fn concurrent_writers_never_split_a_block() {
        let (log, buffer) = LogStream::in_memory();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let log = log.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        log.block(|sink| {
                            writeln!(sink, "start {}", i)?;
                            writeln!(sink, "end {}", i)
                        });
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let lines = buffer.lines();
        assert_eq!(lines.len(), 8 * 50 * 2);
        for pair in lines.chunks(2) {
            let start = pair[0].strip_prefix("start ").unwrap();
            let end = pair[1].strip_prefix("end ").unwrap();
            assert_eq!(start, end);
        }
    }
}
