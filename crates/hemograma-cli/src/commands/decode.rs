use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};

use crate::cli::OutputFormat;
use crate::output::{print_json, print_record_table};

fn read_payload(file: Option<&str>) -> Result<Vec<u8>> {
    match file {
        Some(path) if path != "-" => {
            fs::read(path).with_context(|| format!("Failed to read file: {path}"))
        }
        _ => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

pub fn decode(file: Option<&str>, format: OutputFormat) -> Result<()> {
    let payload = read_payload(file)?;
    let records = hemograma_decoder::decode(&payload)?;
    match format {
        OutputFormat::Json => print_json(&serde_json::to_value(&records)?),
        OutputFormat::Table => print_record_table(&records),
    }
    Ok(())
}
