//! Capture file emission.
//!
//! One text file per channel per capture. The rejected-sample count is only
//! known once the body has been scanned, so the header carries a fixed-width
//! placeholder that is patched in place after the body is written.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt, BufWriter};

use common::{AcquireError, DecodedRecord};

const HEADER_LABEL: &str = "start time, end time\n";
const COUNT_LABEL: &str = "incorrect sample count\n";
const COLUMN_LABEL: &str = "raw data in hex, acceleration in dec, acceleration in g\n";

/// Width of the patched count field; wide enough for any u64 a capture can
/// produce within the supported durations.
const COUNT_FIELD_WIDTH: usize = 10;

/// Writes decoded capture records to the shared output directory.
///
/// Workers each write a distinct file name derived from the channel name
/// and the capture start timestamp, so no write contention exists.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Writes one channel's capture file and returns its path.
    ///
    /// Layout: a two-line timestamp header, the rejected-count label and its
    /// placeholder line, a column header, then one line per record in
    /// stream order. The placeholder is patched with the final count before
    /// the file is synced; the count line keeps the fixed field width, so it
    /// carries the field's trailing spaces.
    pub async fn write_capture(
        &self,
        name: &str,
        started: DateTime<Local>,
        ended: DateTime<Local>,
        records: &[DecodedRecord],
        rejected: u64,
    ) -> Result<PathBuf, AcquireError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let filename = format!("{}_{}.txt", name, started.format("%d%m%Y_%H%M%S"));
        let path = self.dir.join(filename);
        log::info!("Writing {} to disk", path.display());

        let file = File::create(&path).await?;
        let mut writer = BufWriter::new(file);

        writer.write_all(HEADER_LABEL.as_bytes()).await?;
        let stamps = format!(
            "{}, {}\n",
            started.format("%H:%M:%S%.6f"),
            ended.format("%H:%M:%S%.6f")
        );
        writer.write_all(stamps.as_bytes()).await?;
        writer.write_all(COUNT_LABEL.as_bytes()).await?;

        // Remember where the placeholder starts so it can be patched.
        let count_field_at = (HEADER_LABEL.len() + stamps.len() + COUNT_LABEL.len()) as u64;
        let placeholder = format!("{:<width$}\n", "None", width = COUNT_FIELD_WIDTH);
        writer.write_all(placeholder.as_bytes()).await?;
        writer.write_all(COLUMN_LABEL.as_bytes()).await?;

        for record in records {
            writer.write_all(record.to_string().as_bytes()).await?;
            writer.write_all(b"\n").await?;
        }
        writer.flush().await?;

        let mut file = writer.into_inner();
        file.seek(SeekFrom::Start(count_field_at)).await?;
        let count_field = format!("{:<width$}", rejected, width = COUNT_FIELD_WIDTH);
        file.write_all(count_field.as_bytes()).await?;
        file.sync_all().await?;

        log::info!("File write complete: {}", path.display());
        Ok(path)
    }
}
