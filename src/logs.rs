//! Append-only CSV logs kept under the output directory.

pub mod archive;
pub mod inverters;
pub mod overview;
pub mod summary;

use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::prelude::*;

#[must_use]
#[derive(Clone, Debug)]
pub struct LogPaths {
    pub overview: PathBuf,
    pub inverters: PathBuf,
    pub summary: PathBuf,
    pub archive: PathBuf,
}

impl LogPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            overview: dir.join("PVS6_output_overview.csv"),
            inverters: dir.join("PVS6_output_inverters.csv"),
            summary: dir.join("daily_summary.csv"),
            archive: dir.join("raw_JSON_output_files"),
        }
    }
}

/// Append the records to the log, writing the header only if the file is new or empty.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn append<R: Serialize>(path: &Path, records: impl IntoIterator<Item = R>) -> Result<usize> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create `{}`", parent.display()))?;
    }
    let is_new = !fs::metadata(path).is_ok_and(|metadata| metadata.len() != 0);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open `{}` for appending", path.display()))?;
    let mut writer = csv::WriterBuilder::new().has_headers(is_new).from_writer(file);
    let mut n_records = 0;
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("failed to write a record to `{}`", path.display()))?;
        n_records += 1;
    }
    writer.flush().with_context(|| format!("failed to flush `{}`", path.display()))?;
    debug!(n_records, is_new, "appended");
    Ok(n_records)
}

/// Open the log for reading, or `None` when it does not exist yet.
pub fn open(path: &Path) -> Result<Option<csv::Reader<File>>> {
    if !path.is_file() {
        return Ok(None);
    }
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open `{}`", path.display()))?;
    Ok(Some(reader))
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;

    use serde::Deserialize;
    use tempfile::TempDir;

    use super::*;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Row {
        #[serde(rename = "Name")]
        name: String,

        #[serde(rename = "Value")]
        value: u32,
    }

    #[test]
    fn header_is_written_once() -> Result {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("log.csv");
        append(&path, [Row { name: "a".into(), value: 1 }])?;
        append(&path, [Row { name: "b".into(), value: 2 }, Row { name: "c".into(), value: 3 }])?;
        assert_eq!(read_to_string(&path)?, "Name,Value\na,1\nb,2\nc,3\n");
        Ok(())
    }

    #[test]
    fn missing_log_opens_as_none() -> Result {
        let dir = TempDir::new()?;
        assert!(open(&dir.path().join("absent.csv"))?.is_none());
        Ok(())
    }

    #[test]
    fn reads_back_appended_rows() -> Result {
        let dir = TempDir::new()?;
        let path = dir.path().join("log.csv");
        append(&path, [Row { name: "a".into(), value: 1 }])?;
        let rows = open(&path)?
            .context("the log should exist")?
            .deserialize::<Row>()
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(rows, [Row { name: "a".into(), value: 1 }]);
        Ok(())
    }
}
