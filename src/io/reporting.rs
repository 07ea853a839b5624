// src/io/reporting.rs

use crate::simulation::engine::HistoryRecord;
use std::error::Error;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Writes the simulation history to a CSV file.
///
/// # Arguments
/// * `file_path` - The path to save the file (e.g., "results/run_1.csv").
/// * `data` - The history records collected by the chain.
pub fn write_simulation_log<P: AsRef<Path>>(
    file_path: P,
    data: &[HistoryRecord],
) -> Result<(), Box<dyn Error>> {
    let path = file_path.as_ref();
    let wtr = csv::Writer::from_path(path)?;
    write_records(wtr, data)?;

    info!(rows = data.len(), path = %path.display(), "exported simulation log");
    Ok(())
}

/// Same as [`write_simulation_log`] but into any writer.
pub fn write_history<W: Write>(writer: W, data: &[HistoryRecord]) -> Result<(), Box<dyn Error>> {
    write_records(csv::Writer::from_writer(writer), data)
}

fn write_records<W: Write>(mut wtr: csv::Writer<W>, data: &[HistoryRecord]) -> Result<(), Box<dyn Error>> {
    for record in data {
        wtr.serialize(record)?;
    }
    // Flush the buffer to ensure all data is written
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::engine::Chain;

    #[test]
    fn history_is_written_with_a_header_row() {
        let mut chain = Chain::new(12);
        for _ in 0..3 {
            chain.step(Some(1)).unwrap();
        }

        let mut buffer = Vec::new();
        write_history(&mut buffer, &chain.history).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 1 + 12);
        assert!(lines[0].starts_with("time,agent_num,role,demand,inventory"));
        assert!(lines[1].starts_with("1,0,Retailer,"));
    }

    #[test]
    fn log_lands_on_disk() {
        let mut chain = Chain::new(12);
        chain.step(Some(1)).unwrap();

        let path = std::env::temp_dir().join(format!("beer-game-log-{}.csv", std::process::id()));
        write_simulation_log(&path, &chain.history).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(text.lines().count(), 5);
    }
}
