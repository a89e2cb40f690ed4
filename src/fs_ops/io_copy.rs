//! Streaming byte copy used by the cross-device move.
//!
//! - Destination is created with `create_new` (never clobbers).
//! - 1 MiB buffered reader/writer.
//! - Returns only after the writer is flushed and the file is `sync_all`ed,
//!   so a returned byte count means the destination is complete on disk.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

pub(super) const BUF_SIZE: usize = 1024 * 1024;

pub(super) fn copy_streaming(src: &Path, dst: &Path) -> io::Result<u64> {
    let src_f = File::open(src)?;
    let dst_f = OpenOptions::new().write(true).create_new(true).open(dst)?;

    let mut reader = BufReader::with_capacity(BUF_SIZE, src_f);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, dst_f);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(bytes)
}
