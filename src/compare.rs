//! Byte-for-byte file comparison for duplicate detection
//!
//! Two files are duplicates only if their contents are identical. A length
//! mismatch settles the question without reading either file.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::trace;

/// Size of each comparison chunk (256KB)
const CHUNK_SIZE: usize = 256 * 1024;

/// Check whether `a` and `b` hold exactly the same bytes
pub fn files_identical(a: &Path, b: &Path) -> io::Result<bool> {
    let len_a = fs::metadata(a)?.len();
    let len_b = fs::metadata(b)?.len();
    if len_a != len_b {
        trace!(?a, ?b, len_a, len_b, "Length differs");
        return Ok(false);
    }

    let mut reader_a = BufReader::with_capacity(CHUNK_SIZE, File::open(a)?);
    let mut reader_b = BufReader::with_capacity(CHUNK_SIZE, File::open(b)?);
    let mut buf_a = vec![0u8; CHUNK_SIZE];
    let mut buf_b = vec![0u8; CHUNK_SIZE];

    loop {
        let read_a = read_chunk(&mut reader_a, &mut buf_a)?;
        let read_b = read_chunk(&mut reader_b, &mut buf_b)?;
        if read_a != read_b || buf_a[..read_a] != buf_b[..read_b] {
            return Ok(false);
        }
        if read_a == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as possible; a short count means end of file
fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
