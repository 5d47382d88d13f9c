/// Longest line kept, newline excluded. A full report is well under this.
pub const LINE_CAPACITY: usize = 128;

/// Splits a byte stream into lines without allocating until a line is done.
///
/// Lines longer than [`LINE_CAPACITY`] are dropped whole. Bytes that are not
/// UTF-8 are replaced rather than dropping the line, so odd marker ids still
/// reach the parser.
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: heapless::Vec<u8, LINE_CAPACITY>,
    overflowed: bool,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one byte, returns a line when `byte` completes one.
    pub fn push(&mut self, byte: u8) -> Option<String> {
        if byte == b'\n' {
            return self.take();
        }
        if self.overflowed {
            return None;
        }
        if self.buf.push(byte).is_err() {
            log::warn!("dropping link line longer than {} bytes", LINE_CAPACITY);
            self.overflowed = true;
            self.buf.clear();
        }
        None
    }

    /// Flushes a final line that had no newline.
    pub fn finish(&mut self) -> Option<String> {
        self.take()
    }

    fn take(&mut self) -> Option<String> {
        let overflowed = std::mem::take(&mut self.overflowed);
        let mut bytes = self.buf.as_slice();
        if let Some(stripped) = bytes.strip_suffix(b"\r") {
            bytes = stripped;
        }
        let line = if overflowed || bytes.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(bytes).into_owned())
        };
        self.buf.clear();
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(framer: &mut LineFramer, bytes: &[u8]) -> Vec<String> {
        bytes.iter().filter_map(|&b| framer.push(b)).collect()
    }

    #[test]
    fn splits_on_newline_and_strips_cr() {
        let mut framer = LineFramer::new();
        let lines = feed(&mut framer, b"QR:FRONT,1,2,60,60\r\nRESET\n");
        assert_eq!(lines, vec!["QR:FRONT,1,2,60,60", "RESET"]);
    }

    #[test]
    fn keeps_partial_line_until_finished() {
        let mut framer = LineFramer::new();
        assert!(feed(&mut framer, b"QR:BACK,1,2,60").is_empty());
        assert!(feed(&mut framer, b",60").is_empty());
        assert_eq!(framer.finish().as_deref(), Some("QR:BACK,1,2,60,60"));
        assert_eq!(framer.finish(), None);
    }

    #[test]
    fn skips_blank_lines() {
        let mut framer = LineFramer::new();
        assert_eq!(feed(&mut framer, b"\n\r\n\nA\n"), vec!["A"]);
    }

    #[test]
    fn drops_overlong_line_and_recovers() {
        let mut framer = LineFramer::new();
        let mut input = vec![b'x'; LINE_CAPACITY + 10];
        input.extend_from_slice(b"\nQR:OK\n");
        assert_eq!(feed(&mut framer, &input), vec!["QR:OK"]);
    }

    #[test]
    fn exactly_full_line_is_kept() {
        let mut framer = LineFramer::new();
        let mut input = vec![b'y'; LINE_CAPACITY];
        input.push(b'\n');
        let lines = feed(&mut framer, &input);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), LINE_CAPACITY);
    }

    #[test]
    fn replaces_invalid_utf8() {
        let mut framer = LineFramer::new();
        assert_eq!(
            feed(&mut framer, b"QR:\xffA,1,2,60,60\nok\n"),
            vec!["QR:\u{FFFD}A,1,2,60,60", "ok"]
        );
    }
}
