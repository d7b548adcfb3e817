use std::io::Write;

use crate::errors::RosterResult;
use crate::model::ParticipantRow;

/// Widest post coverage across the roster; exports pad narrower rows.
pub fn column_width(rows: &[ParticipantRow], catalog_len: usize) -> usize {
    rows.iter()
        .map(|row| row.posts.len())
        .max()
        .unwrap_or(0)
        .max(catalog_len)
}

/// Writes the roster as CSV with flat `p{n}_` columns.
pub fn write_csv<W: Write>(rows: &[ParticipantRow], post_count: usize, writer: W) -> RosterResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(ParticipantRow::flat_columns(post_count))?;
    for row in rows {
        csv_writer.write_record(row.flat_values(post_count))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn roster_to_csv(rows: &[ParticipantRow], post_count: usize) -> RosterResult<String> {
    let mut buffer = Vec::new();
    write_csv(rows, post_count, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Structured export: one flat JSON object per row.
pub fn roster_to_json(rows: &[ParticipantRow]) -> RosterResult<String> {
    let flat: Vec<serde_json::Value> = rows.iter().map(ParticipantRow::to_flat_json).collect();
    Ok(serde_json::to_string_pretty(&flat)?)
}
