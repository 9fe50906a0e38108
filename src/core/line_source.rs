// gametail - core/line_source.rs
//
// Incremental line reader over a file that another process keeps appending to.
//
// The cursor starts at the end of the file as it was when opened, so a fresh
// session never replays history, and only ever moves forward.
//
// Encoding: bytes are decoded as lossy UTF-8 after the line terminator is
// stripped. Lines end in '\n'; a '\r' immediately before it is stripped too,
// covering logs written with CRLF on Windows.
//
// Incomplete lines: bytes after the last '\n' are held in a fragment buffer
// until the rest of the line arrives. The buffer is capped at
// MAX_PARTIAL_LINE_BYTES; an oversize line is discarded whole, up to and
// including its newline. The same applies to a line the producer was halfway
// through writing when the file was opened.
//
// Truncation: if the file shrinks below the cursor the source stalls and
// yields no further lines for this handle. No recovery is attempted.

use crate::util::constants::{LINE_READER_CAPACITY, MAX_PARTIAL_LINE_BYTES};
use crate::util::error::{GameTailError, Result, SourceError};
use std::fs::File;
use std::io::{self, BufRead, BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Capability to produce the next available line of a followed log.
///
/// `None` means "nothing new yet", not end of stream: the caller is expected
/// to wait and ask again.
pub trait LogFollower {
    fn next_line(&mut self) -> Option<String>;
}

/// Follows one open log file from its end-of-file at open time.
#[derive(Debug)]
pub struct LineSource {
    path: PathBuf,
    reader: BufReader<File>,
    /// Byte position just past the last byte consumed from the file.
    offset: u64,
    /// Bytes of an in-progress line (no terminating newline yet).
    partial: Vec<u8>,
    /// Skipping the remainder of a line that will not be delivered.
    discarding: bool,
    /// Set once the file is observed shorter than `offset`.
    stalled: bool,
}

impl LineSource {
    /// Open `path` and position the cursor at its current end.
    ///
    /// If the file does not end in a newline, the producer is mid-line; the
    /// rest of that line is skipped once it arrives.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::with_capacity(LINE_READER_CAPACITY, file);
        let offset = reader
            .seek(SeekFrom::End(0))
            .map_err(|source| SourceError::Seek {
                path: path.to_path_buf(),
                source,
            })?;

        let mid_line = if offset > 0 {
            last_byte_is_not_newline(&mut reader, offset).map_err(|source| GameTailError::Io {
                path: path.to_path_buf(),
                operation: "inspect end of file",
                source,
            })?
        } else {
            false
        };

        tracing::debug!(
            file = %path.display(),
            offset,
            mid_line,
            "Line source opened at end of file"
        );

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            offset,
            partial: Vec::new(),
            discarding: mid_line,
            stalled: false,
        })
    }

    /// Path of the followed file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte offset of the read cursor.
    pub fn position(&self) -> u64 {
        self.offset
    }

    /// True once truncation or rotation was detected.
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// Stall the source if the file is now shorter than what was consumed.
    fn check_truncation(&mut self) {
        let len = match self.reader.get_ref().metadata() {
            Ok(m) => m.len(),
            Err(e) => {
                tracing::debug!(file = %self.path.display(), error = %e, "Cannot stat tailed file");
                return;
            }
        };
        if len < self.offset {
            tracing::warn!(
                file = %self.path.display(),
                offset = self.offset,
                new_size = len,
                "Log file truncated or rotated; no further lines will be read from this handle"
            );
            self.stalled = true;
            self.partial.clear();
        }
    }

    /// Consume buffered bytes up to and including the next '\n'.
    ///
    /// Returns the number of bytes consumed and whether the newline was seen.
    fn skip_to_newline(&mut self) -> io::Result<(usize, bool)> {
        let buf = self.reader.fill_buf()?;
        let (used, found) = match buf.iter().position(|&b| b == b'\n') {
            Some(i) => (i + 1, true),
            None => (buf.len(), false),
        };
        self.reader.consume(used);
        Ok((used, found))
    }
}

/// Read the byte just before `end`, leaving the cursor at `end`.
fn last_byte_is_not_newline(reader: &mut BufReader<File>, end: u64) -> io::Result<bool> {
    reader.seek(SeekFrom::Start(end - 1))?;
    let mut last = [0u8; 1];
    reader.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl LogFollower for LineSource {
    fn next_line(&mut self) -> Option<String> {
        if self.stalled {
            return None;
        }

        loop {
            if self.discarding {
                match self.skip_to_newline() {
                    Ok((0, _)) => {
                        self.check_truncation();
                        return None;
                    }
                    Ok((n, found)) => {
                        self.offset += n as u64;
                        self.discarding = !found;
                        continue;
                    }
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        tracing::warn!(
                            file = %self.path.display(),
                            error = %e,
                            "Read error on tailed file"
                        );
                        return None;
                    }
                }
            }

            // One byte over the cap is enough to know the line is oversize.
            let budget = (MAX_PARTIAL_LINE_BYTES + 1).saturating_sub(self.partial.len()) as u64;
            match (&mut self.reader)
                .take(budget)
                .read_until(b'\n', &mut self.partial)
            {
                Ok(0) => {
                    self.check_truncation();
                    return None;
                }
                Ok(n) => {
                    self.offset += n as u64;
                    if self.partial.last() == Some(&b'\n') {
                        let raw = std::mem::take(&mut self.partial);
                        return Some(decode_line(&raw));
                    }
                    if self.partial.len() > MAX_PARTIAL_LINE_BYTES {
                        tracing::warn!(
                            file = %self.path.display(),
                            bytes = self.partial.len(),
                            "Discarding oversize line"
                        );
                        self.partial.clear();
                        self.discarding = true;
                        continue;
                    }
                    // EOF in the middle of a line: keep the fragment for later.
                    return None;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(
                        file = %self.path.display(),
                        error = %e,
                        "Read error on tailed file"
                    );
                    return None;
                }
            }
        }
    }
}

/// Strip the line terminator and decode as lossy UTF-8.
pub fn decode_line(raw: &[u8]) -> String {
    let mut end = raw.len();
    if end > 0 && raw[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && raw[end - 1] == b'\r' {
        end -= 1;
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, OpenOptions};
    use std::io::Write;
    use tempfile::TempDir;

    fn append(path: &Path, bytes: &[u8]) {
        let mut f = OpenOptions::new()
            .append(true)
            .open(path)
            .expect("open for append");
        f.write_all(bytes).expect("append");
        f.flush().expect("flush");
    }

    #[test]
    fn starts_at_end_of_existing_content() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("Game.log");
        fs::write(&path, b"old 1\nold 2\n").expect("write");

        let mut src = LineSource::open(&path).expect("open");
        assert_eq!(src.position(), 12);
        assert_eq!(src.next_line(), None);

        append(&path, b"new\n");
        assert_eq!(src.next_line().as_deref(), Some("new"));
        assert_eq!(src.next_line(), None);
    }

    #[test]
    fn open_missing_file_is_open_error() {
        let dir = TempDir::new().expect("tmpdir");
        let result = LineSource::open(&dir.path().join("nope.log"));
        assert!(matches!(
            result,
            Err(GameTailError::Source(SourceError::Open { .. }))
        ));
    }

    #[test]
    fn partial_line_is_held_until_newline() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("Game.log");
        fs::write(&path, b"").expect("write");
        let mut src = LineSource::open(&path).expect("open");

        append(&path, b"<2024-01-01> Player");
        assert_eq!(src.next_line(), None);

        append(&path, b" joined\nnext");
        assert_eq!(src.next_line().as_deref(), Some("<2024-01-01> Player joined"));
        assert_eq!(src.next_line(), None);

        append(&path, b"\n");
        assert_eq!(src.next_line().as_deref(), Some("next"));
    }

    #[test]
    fn oversize_line_is_dropped_whole() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("Game.log");
        fs::write(&path, b"").expect("write");
        let mut src = LineSource::open(&path).expect("open");

        append(&path, &vec![b'x'; MAX_PARTIAL_LINE_BYTES + 10]);
        assert_eq!(src.next_line(), None);

        append(&path, b"end of the long line\nnext\n");
        assert_eq!(src.next_line().as_deref(), Some("next"));
        assert_eq!(src.next_line(), None);
        assert_eq!(src.position(), (MAX_PARTIAL_LINE_BYTES + 10 + 26) as u64);
    }

    #[test]
    fn oversize_line_in_one_write_is_dropped_whole() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("Game.log");
        fs::write(&path, b"").expect("write");
        let mut src = LineSource::open(&path).expect("open");

        let mut bytes = vec![b'y'; MAX_PARTIAL_LINE_BYTES * 2];
        bytes.extend_from_slice(b"\nkept\n");
        append(&path, &bytes);
        assert_eq!(src.next_line().as_deref(), Some("kept"));
        assert_eq!(src.next_line(), None);
    }

    #[test]
    fn line_cut_at_open_is_skipped() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("Game.log");
        fs::write(&path, b"old\nhalf-writ").expect("write");
        let mut src = LineSource::open(&path).expect("open");
        assert_eq!(src.position(), 13);

        append(&path, b"ten line\nnew\n");
        assert_eq!(src.next_line().as_deref(), Some("new"));
        assert_eq!(src.next_line(), None);
    }

    #[test]
    fn crlf_and_empty_lines() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("Game.log");
        fs::write(&path, b"").expect("write");
        let mut src = LineSource::open(&path).expect("open");

        append(&path, b"a\r\n\r\nb\n");
        assert_eq!(src.next_line().as_deref(), Some("a"));
        assert_eq!(src.next_line().as_deref(), Some(""));
        assert_eq!(src.next_line().as_deref(), Some("b"));
        assert_eq!(src.next_line(), None);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_dropped() {
        assert_eq!(decode_line(b"ok \xFF\n"), "ok \u{FFFD}");
        assert_eq!(decode_line(b"no newline"), "no newline");
        assert_eq!(decode_line(b"\n"), "");
    }

    #[test]
    fn truncation_stalls_the_source() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("Game.log");
        fs::write(&path, b"some history that is long\n").expect("write");
        let mut src = LineSource::open(&path).expect("open");

        // Producer restarts and rewrites a shorter file.
        fs::write(&path, b"x\n").expect("truncate");
        assert_eq!(src.next_line(), None);
        assert!(src.is_stalled());

        append(&path, b"after\n");
        assert_eq!(src.next_line(), None, "stalled source must stay silent");
    }
}
