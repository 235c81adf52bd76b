use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{prelude::*, timestamp::Timestamp};

/// Save the raw gateway response as a pretty-printed JSON file named after the sample time.
#[instrument(skip_all, fields(dir = %dir.display(), %timestamp))]
pub fn save<T: Serialize>(dir: &Path, timestamp: Timestamp, response: &T) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create `{}`", dir.display()))?;
    let path = dir.join(format!("PVS6_output_{}.json", timestamp.0.format("%Y%m%d_%H%M%S")));
    let file =
        File::create(&path).with_context(|| format!("failed to create `{}`", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, response)
        .with_context(|| format!("failed to write `{}`", path.display()))?;
    writer.flush().with_context(|| format!("failed to flush `{}`", path.display()))?;
    info!(path = %path.display(), "archived");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn archive_is_named_after_the_timestamp() -> Result {
        let dir = TempDir::new()?;
        let response = json!({ "/sys/livedata/pv_p": "1.25" });
        let path = save(dir.path(), "2025-09-30 11:58:22".parse()?, &response)?;
        assert_eq!(
            path.file_name().and_then(|name| name.to_str()),
            Some("PVS6_output_20250930_115822.json"),
        );
        let saved: Value = serde_json::from_slice(&fs::read(&path)?)?;
        assert_eq!(saved, response);
        Ok(())
    }
}
