use super::Device;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::time::Duration;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Passive sink that appends every line to a file.
pub struct FileDevice {
    file: Option<File>,
}

impl FileDevice {
    /// Open `path` for appending, creating it if absent.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .await?;
        Ok(Self { file: Some(file) })
    }

    fn file(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "file device is closed").into()
        })
    }
}

#[async_trait(?Send)]
impl Device for FileDevice {
    async fn write_line(&mut self, line: &[u8]) -> Result<()> {
        let mut frame = Vec::with_capacity(line.len() + 1);
        frame.extend_from_slice(line);
        frame.push(b'\n');

        let file = self.file()?;
        file.write_all(&frame).await?;
        file.flush().await?;
        Ok(())
    }

    async fn read_timeout(&mut self, _timeout: Duration) -> Result<Vec<u8>> {
        Err(Error::UnsupportedOperation("read"))
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush().await?;
            file.sync_all().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_line_appends_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let mut dev = FileDevice::open(&path).await.unwrap();
        dev.write_line(b"  hostname r1 ").await.unwrap();
        dev.close().await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"  hostname r1 \n");
    }

    #[tokio::test]
    async fn test_reopen_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, b"existing\n").unwrap();

        for _ in 0..2 {
            let mut dev = FileDevice::open(&path).await.unwrap();
            dev.write_line(b"ABC").await.unwrap();
            dev.close().await.unwrap();
        }

        assert_eq!(std::fs::read(&path).unwrap(), b"existing\nABC\nABC\n");
    }

    #[tokio::test]
    async fn test_read_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let mut dev = FileDevice::open(dir.path().join("out.txt")).await.unwrap();

        for timeout in [Duration::ZERO, Duration::from_millis(200)] {
            let err = dev.read_timeout(timeout).await.unwrap_err();
            assert!(matches!(err, Error::UnsupportedOperation(_)));
        }
    }

    #[tokio::test]
    async fn test_write_after_close_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut dev = FileDevice::open(dir.path().join("out.txt")).await.unwrap();
        dev.close().await.unwrap();

        match dev.write_line(b"late").await.unwrap_err() {
            Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::NotConnected),
            other => panic!("unexpected error: {other}"),
        }
    }
}
