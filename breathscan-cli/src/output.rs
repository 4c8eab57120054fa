//! Tabular report writer.
//!
//! Column order and header text are a compatibility contract with the
//! downstream screening spreadsheet; change neither. Fields never contain
//! commas (numeric values and bare file names), so no quoting is applied.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;

use breathscan_core::BreathingPause;

const HEADER: &str = "File Path,Pause #,start [secs],end [secs],duration [secs],type";

pub fn write_report(path: &Path, pauses: &[BreathingPause]) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("cannot create report {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{HEADER}")?;
    for pause in pauses {
        writeln!(
            writer,
            "{},{},{},{},{},{}",
            pause.source,
            pause.index,
            pause.start_secs,
            pause.end_secs,
            pause.duration_secs(),
            pause.severity
        )?;
    }
    writer
        .flush()
        .with_context(|| format!("cannot flush report {}", path.display()))?;
    Ok(())
}
