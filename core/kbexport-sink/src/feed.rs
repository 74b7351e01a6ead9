//! Line-delimited JSON feeds.

use crate::{ensure_parent, SinkResult};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Writes one compact JSON record per line, in input order.
///
/// Returns the number of records written.
pub fn write_feed<'a, I>(rows: I, path: &Path) -> SinkResult<usize>
where
    I: IntoIterator<Item = &'a Value>,
{
    ensure_parent(path)?;
    let mut writer = BufWriter::new(File::create(path)?);

    let mut written = 0;
    for row in rows {
        serde_json::to_writer(&mut writer, row)?;
        writer.write_all(b"\n")?;
        written += 1;
    }
    writer.flush()?;

    debug!(path = %path.display(), records = written, "wrote feed");
    Ok(written)
}

/// Writes a single JSON document (compact, newline-terminated).
pub fn write_json(value: &Value, path: &Path) -> SinkResult<()> {
    ensure_parent(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// A feed line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based line number.
    pub line: usize,
    pub error: String,
}

/// Parsed contents of a feed file.
#[derive(Debug, Default)]
pub struct FeedContents {
    pub records: Vec<Value>,
    pub malformed: Vec<MalformedLine>,
}

/// Reads a feed back. Blank lines are ignored; unparsable lines are collected
/// in [`FeedContents::malformed`] instead of failing the read.
pub fn read_feed(path: &Path) -> SinkResult<FeedContents> {
    let reader = BufReader::new(File::open(path)?);
    let mut contents = FeedContents::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(record) => contents.records.push(record),
            Err(e) => contents.malformed.push(MalformedLine {
                line: index + 1,
                error: e.to_string(),
            }),
        }
    }

    Ok(contents)
}
