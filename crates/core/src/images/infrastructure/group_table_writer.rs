use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::grouping::domain::group_assigner::GroupId;
use crate::images::domain::group_sink::GroupSink;

/// Appends `"<reference>  <group>"` lines to a file and echoes each line.
///
/// Every record is flushed before `record` returns, so a run that aborts
/// part-way leaves all earlier lines on disk.
pub struct GroupTableWriter {
    file: File,
    echo: Option<Box<dyn Write + Send>>,
}

impl GroupTableWriter {
    /// Opens `path` for appending (creating it if needed), echoing to stdout.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file,
            echo: Some(Box::new(io::stdout())),
        })
    }

    pub fn with_echo(mut self, echo: Option<Box<dyn Write + Send>>) -> Self {
        self.echo = echo;
        self
    }
}

pub fn format_line(reference: &str, group: GroupId) -> String {
    format!("{reference}  {group}")
}

impl GroupSink for GroupTableWriter {
    fn record(&mut self, reference: &str, group: GroupId) -> io::Result<()> {
        let line = format_line(reference, group);
        writeln!(self.file, "{line}")?;
        self.file.flush()?;
        if let Some(echo) = self.echo.as_mut() {
            writeln!(echo, "{line}")?;
            echo.flush()?;
        }
        Ok(())
    }
}
