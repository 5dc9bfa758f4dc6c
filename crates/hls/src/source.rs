//! Line sources feeding the parsers.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{trace, warn};

use crate::error::ManifestError;

/// A forward-only sequence of manifest lines backed by some resource.
///
/// `next_line` returns `None` at end of input. A line that cannot be read is
/// returned as an error; the source then decides whether more lines follow.
/// `close` releases the backing resource; the parsers call it exactly once
/// per parse.
pub trait LineSource {
    fn next_line(&mut self) -> Option<Result<String, ManifestError>>;

    fn close(&mut self);
}

impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn next_line(&mut self) -> Option<Result<String, ManifestError>> {
        (**self).next_line()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Split the next line off `rest`, returning it without its terminator and
/// the number of bytes consumed.
fn split_line(rest: &[u8]) -> (&[u8], usize) {
    let (line, consumed) = match rest.iter().position(|&b| b == b'\n') {
        Some(end) => (&rest[..end], end + 1),
        None => (rest, rest.len()),
    };
    (line.strip_suffix(b"\r").unwrap_or(line), consumed)
}

/// Lines must be UTF-8 whatever the backing resource.
fn decode_line(bytes: Vec<u8>, location: &str) -> Result<String, ManifestError> {
    String::from_utf8(bytes).map_err(|_| ManifestError::NotUtf8 {
        location: location.to_string(),
    })
}

/// Lines of an in-memory manifest.
#[derive(Debug, Clone)]
pub struct StringSource {
    text: String,
    pos: usize,
}

impl StringSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pos: 0,
        }
    }
}

impl LineSource for StringSource {
    fn next_line(&mut self) -> Option<Result<String, ManifestError>> {
        if self.pos >= self.text.len() {
            return None;
        }
        let rest = &self.text[self.pos..];
        let (line, consumed) = match rest.find('\n') {
            Some(end) => (&rest[..end], end + 1),
            None => (rest, rest.len()),
        };
        self.pos += consumed;
        Some(Ok(line.strip_suffix('\r').unwrap_or(line).to_string()))
    }

    fn close(&mut self) {
        self.pos = self.text.len();
    }
}

/// Lines of a fetched manifest body, decoded one line at a time.
#[derive(Debug, Clone)]
pub struct BytesSource {
    location: String,
    body: Vec<u8>,
    pos: usize,
}

impl BytesSource {
    pub fn new(location: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            location: location.into(),
            body: body.into(),
            pos: 0,
        }
    }
}

impl LineSource for BytesSource {
    fn next_line(&mut self) -> Option<Result<String, ManifestError>> {
        if self.pos >= self.body.len() {
            return None;
        }
        let (line, consumed) = split_line(&self.body[self.pos..]);
        let line = line.to_vec();
        self.pos += consumed;
        Some(decode_line(line, &self.location))
    }

    fn close(&mut self) {
        self.pos = self.body.len();
    }
}

/// Lines read lazily from a local file.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    reader: Option<BufReader<File>>,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ManifestError::io(path, e))?;
        Ok(Self::from_file(path, file))
    }

    pub fn from_file(path: impl Into<PathBuf>, file: File) -> Self {
        Self {
            path: path.into(),
            reader: Some(BufReader::new(file)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineSource for FileSource {
    fn next_line(&mut self) -> Option<Result<String, ManifestError>> {
        let reader = self.reader.as_mut()?;
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => {
                let (line, _) = split_line(&buf);
                let line = line.to_vec();
                Some(decode_line(line, &self.path.display().to_string()))
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Read failed, no further lines");
                self.reader = None;
                Some(Err(ManifestError::io(&self.path, e)))
            }
        }
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            trace!(path = %self.path.display(), "Closed manifest file");
        }
    }
}

/// Iterates a borrowed source and closes it when dropped, on every exit path.
pub(crate) struct ScopedSource<'a, S: LineSource + ?Sized> {
    source: &'a mut S,
}

impl<'a, S: LineSource + ?Sized> ScopedSource<'a, S> {
    pub(crate) fn new(source: &'a mut S) -> Self {
        Self { source }
    }
}

impl<S: LineSource + ?Sized> Iterator for ScopedSource<'_, S> {
    type Item = Result<String, ManifestError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.source.next_line()
    }
}

impl<S: LineSource + ?Sized> Drop for ScopedSource<'_, S> {
    fn drop(&mut self) {
        self.source.close();
    }
}
