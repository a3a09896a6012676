use std::{fs, io::Read, path::Path};

use route_planner_core::{Error, RecordId, Result, SelectableRecord};

const FIELD_SEPARATOR: char = '\t';
const COMMENT_PREFIX: char = '#';

/// Reads address records from `path`, or from stdin when no path is given.
pub fn read_records(path: Option<&Path>) -> Result<Vec<SelectableRecord>> {
    let raw = match path {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            raw
        }
    };
    parse_records(&raw)
}

/// One record per line: `id<TAB>address`, or a bare address that gets the
/// line number as its id. Blank lines and `#` comments are skipped.
fn parse_records(input: &str) -> Result<Vec<SelectableRecord>> {
    let mut records: Vec<SelectableRecord> = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.trim_start().starts_with(COMMENT_PREFIX) {
            continue;
        }

        let record = match line.split_once(FIELD_SEPARATOR) {
            Some((id, address)) => {
                let id = id.trim();
                if id.is_empty() {
                    return Err(Error::invalid_input(format!(
                        "Line {}: empty record id before tab",
                        idx + 1
                    )));
                }
                SelectableRecord::new(id, address.trim())
            }
            None => SelectableRecord::new(RecordId::new((idx + 1).to_string()), line.trim()),
        };

        if records.iter().any(|r| r.record_id == record.record_id) {
            return Err(Error::invalid_input(format!(
                "Line {}: duplicate record id {}",
                idx + 1,
                record.record_id
            )));
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(Error::invalid_input("No addresses provided."));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::parse_records;

    #[test]
    fn parse_records_reads_ids_and_bare_addresses() {
        let records = parse_records(
            "# depot first\nhq\t1 Main St, Springfield\n\n742 Evergreen Terrace\r\n",
        )
        .expect("parse records");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record_id.as_str(), "hq");
        assert_eq!(records[0].address, "1 Main St, Springfield");
        assert_eq!(records[1].record_id.as_str(), "4");
        assert_eq!(records[1].address, "742 Evergreen Terrace");
    }

    #[test]
    fn parse_records_keeps_blank_addresses_for_the_planner_to_filter() {
        let records = parse_records("a\t \nb\tHigh St").expect("parse records");
        assert_eq!(records[0].address, "");
    }

    #[test]
    fn parse_records_rejects_duplicate_ids() {
        let err = parse_records("a\tOne St\na\tTwo St").expect_err("duplicate id");
        assert!(err.to_string().contains("duplicate record id a"));
    }

    #[test]
    fn parse_records_rejects_empty_input() {
        let err = parse_records(" \n# nothing\n").expect_err("empty input should fail");
        assert!(err.to_string().contains("No addresses provided."));
    }
}
