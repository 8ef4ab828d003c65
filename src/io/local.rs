use super::ReadAt;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs::File;
use std::io;
use std::path::Path;

/// Positional reads from a file on disk.
///
/// Reads never move a shared cursor, so the reader is usable through `&self`.
pub struct LocalFileReader {
    file: File,
    size: u64,
}

impl LocalFileReader {
    pub fn new(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        let size = file
            .metadata()
            .with_context(|| format!("cannot stat {}", path.display()))?
            .len();
        Ok(Self { file, size })
    }
}

#[cfg(unix)]
fn pread(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(windows)]
fn pread(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}

#[cfg(not(any(unix, windows)))]
fn pread(mut file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::io::{Read, Seek, SeekFrom};
    file.seek(SeekFrom::Start(offset))?;
    file.read(buf)
}

#[async_trait]
impl ReadAt for LocalFileReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if offset >= self.size {
            return Ok(0);
        }
        pread(&self.file, buf, offset).with_context(|| format!("read at offset {}", offset))
    }

    fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::read_prefix;

    #[tokio::test]
    async fn reads_whole_file_and_prefix() {
        let path = std::env::temp_dir().join(format!("binpeek-local-{}.bin", std::process::id()));
        std::fs::write(&path, b"PK\x03\x04rest").unwrap();

        let reader = LocalFileReader::new(&path).unwrap();
        assert_eq!(reader.size(), 8);
        assert_eq!(read_prefix(&reader, None).await.unwrap(), b"PK\x03\x04rest");
        assert_eq!(read_prefix(&reader, Some(2)).await.unwrap(), b"PK");

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn reads_past_end_return_nothing() {
        let path = std::env::temp_dir().join(format!("binpeek-eof-{}.bin", std::process::id()));
        std::fs::write(&path, b"ID3").unwrap();

        let reader = LocalFileReader::new(&path).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(reader.read_at(3, &mut buf).await.unwrap(), 0);
        assert_eq!(reader.read_at(1, &mut buf).await.unwrap(), 2);
        assert_eq!(&buf[..2], b"D3");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_names_path() {
        let err = LocalFileReader::new(Path::new("/nonexistent/binpeek.zip"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("/nonexistent/binpeek.zip"));
    }
}
