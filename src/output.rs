use anyhow::anyhow;
use formatx::formatx;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

pub trait Output: Debug {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write>;
    /// Whether this output can be considered a no-op and therefore that any code that only writes to the output can be skipped.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Writes each location key to its own file in a directory. The file template is
/// filled with the location key and then the file extension.
#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_template: String,
}

impl FileOutput {
    pub fn new(directory_path: PathBuf, file_template: String) -> Self {
        Self {
            directory_path,
            file_template,
        }
    }
}

impl Output for FileOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        let file_name = formatx!(&self.file_template, location_key, file_extension)
            .map_err(|e| anyhow!("Could not build output file name: {e:?}"))?;
        Ok(BufWriter::new(File::create(
            self.directory_path.join(file_name),
        )?))
    }
}

impl Output for &FileOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        <FileOutput as Output>::writer_for_location_key(self, location_key, file_extension)
    }
}

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(
        &self,
        _location_key: &str,
        _file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}

/// Keeps everything written in memory, keyed by "{location_key}.{file_extension}".
#[derive(Clone, Debug, Default)]
pub struct MemoryOutput(Arc<Mutex<BTreeMap<String, Vec<u8>>>>);

impl MemoryOutput {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn contents(&self, location_key: &str, file_extension: &str) -> Option<String> {
        self.0
            .lock()
            .get(&format!("{location_key}.{file_extension}"))
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl Output for MemoryOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        let key = format!("{location_key}.{file_extension}");
        self.0.lock().insert(key.clone(), vec![]);
        Ok(MemoryWriter {
            files: self.0.clone(),
            key,
        })
    }
}

impl Output for &MemoryOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        <MemoryOutput as Output>::writer_for_location_key(self, location_key, file_extension)
    }
}

struct MemoryWriter {
    files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
    key: String,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.files
            .lock()
            .entry(self.key.clone())
            .or_default()
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
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_memory_output_keeps_written_contents() {
        let output = MemoryOutput::new();
        {
            let mut writer = output.writer_for_location_key("results", "csv").unwrap();
            writer.write_all(b"Operating point\n").unwrap();
            writer.write_all(b"0\n").unwrap();
        }

        assert_eq!(
            output.contents("results", "csv"),
            Some("Operating point\n0\n".to_string())
        );
        assert_eq!(output.contents("summary", "csv"), None);
    }

    #[rstest]
    fn test_sink_output_is_noop() {
        assert!(SinkOutput.is_noop());
        assert!(!MemoryOutput::new().is_noop());
    }
}
