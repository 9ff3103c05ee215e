use std::io::{BufWriter, Write};

use anyhow::{Context, Result};

/// Writes the lines produced by a codec to `output`, each ending in `\n`.
pub fn serialise<W: Write>(lines: &[String], output: W) -> Result<()> {
    let mut writer = BufWriter::new(output);
    write_lines(&mut writer, lines).context("Failed to write to output file.")?;
    writer.flush().context("Failed to write to output file.")?;
    Ok(())
}

fn write_lines<W: Write>(buf: &mut W, lines: &[String]) -> Result<()> {
    for line in lines {
        writeln!(buf, "{}", line)?;
    }
    Ok(())
}
