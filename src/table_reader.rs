use crate::types::ContingencyTable;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// One input line: the table, or why it could not be read.
#[derive(Debug)]
pub struct InputRow {
    pub line: u64, // 1-based line number in the input
    pub table: Result<ContingencyTable>,
}

/// Read tables from a file, or standard input when `path` is `-`.
pub fn read_tables_path(path: &Path) -> Result<Vec<InputRow>> {
    if path == Path::new("-") {
        return read_tables(io::stdin().lock());
    }
    let file = File::open(path)
        .with_context(|| format!("Unable to open input file: {}", path.display()))?;
    read_tables(file)
}

/// Read one table per line, six counts separated by `;`.
///
/// Blank lines and lines starting with `#` are skipped. A malformed line,
/// including one that is not valid UTF-8, is returned as an error row so the
/// caller can report it and carry on. Only an I/O failure fails the whole read.
pub fn read_tables<R: Read>(mut reader: R) -> Result<Vec<InputRow>> {
    let mut input = Vec::new();
    reader
        .read_to_end(&mut input)
        .context("Failed to read input tables")?;

    let builder = {
        let mut b = csv::ReaderBuilder::new();
        b.delimiter(b';')
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .buffer_capacity(256);
        b
    };

    let mut rows = Vec::new();
    for (i, raw) in input.split(|&b| b == b'\n').enumerate() {
        let line = i as u64 + 1;
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        if raw.iter().all(u8::is_ascii_whitespace) || raw.first() == Some(&b'#') {
            continue;
        }
        rows.push(InputRow {
            line,
            table: parse_line(&builder, raw).with_context(|| format!("line {}", line)),
        });
    }
    Ok(rows)
}

fn parse_line(builder: &csv::ReaderBuilder, raw: &[u8]) -> Result<ContingencyTable> {
    let mut record = csv::ByteRecord::new();
    builder
        .from_reader(raw)
        .read_byte_record(&mut record)
        .context("malformed row")?;
    parse_record(&record)
}

fn parse_record(record: &csv::ByteRecord) -> Result<ContingencyTable> {
    if record.len() != 6 {
        anyhow::bail!("expected 6 counts separated by ';', found {} field(s)", record.len());
    }
    let mut counts = [0u32; 6];
    for (slot, field) in counts.iter_mut().zip(record.iter()) {
        let field = std::str::from_utf8(field).context("count is not valid UTF-8")?;
        *slot = field
            .parse()
            .with_context(|| format!("invalid count '{}'", field))?;
    }
    Ok(ContingencyTable::from_counts(counts))
}

/// Parse six command-line counts.
pub fn parse_counts(args: &[String]) -> Result<ContingencyTable> {
    if args.len() != 6 {
        anyhow::bail!("expected 6 counts (d0 d1 d2 h0 h1 h2), found {}", args.len());
    }
    let mut counts = [0u32; 6];
    for (slot, arg) in counts.iter_mut().zip(args) {
        *slot = arg
            .trim()
            .parse()
            .with_context(|| format!("invalid count '{}'", arg))?;
    }
    Ok(ContingencyTable::from_counts(counts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_tables() {
        let input = "226;57;5;249;63;4\n1;109;191;0;110;221\n\n7; 110 ;174;6;132;191\n";
        let rows = read_tables(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0].table.as_ref().unwrap().counts(),
            [226, 57, 5, 249, 63, 4]
        );
        assert_eq!(
            rows[2].table.as_ref().unwrap().counts(),
            [7, 110, 174, 6, 132, 191]
        );
        assert_eq!(rows[2].line, 4);
    }

    #[test]
    fn test_bad_rows_are_kept() {
        let input = "# header comment\n1;2;3\n1;2;x;4;5;6\n1;2;3;4;5;6\n";
        let rows = read_tables(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].table.is_err());
        assert!(rows[1].table.is_err());
        let msg = format!("{:#}", rows[1].table.as_ref().unwrap_err());
        assert!(msg.contains("line 3"), "{}", msg);
        assert!(rows[2].table.is_ok());
    }

    #[test]
    fn test_undecodable_row_does_not_stop_reading() {
        let input: &[u8] = b"1;2;3;4;5;6\n\xff;1;1;1;1;1\n7;110;174;6;132;191\n";
        let rows = read_tables(input).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].table.as_ref().unwrap().counts(), [1, 2, 3, 4, 5, 6]);
        let msg = format!("{:#}", rows[1].table.as_ref().unwrap_err());
        assert!(msg.contains("line 2"), "{}", msg);
        assert_eq!(
            rows[2].table.as_ref().unwrap().counts(),
            [7, 110, 174, 6, 132, 191]
        );
    }

    #[test]
    fn test_line_numbers_count_skipped_lines() {
        let input = "# comment\n\n226;57;5;249;63;4\r\n\n# another\n1;2\n";
        let rows = read_tables(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 3);
        assert!(rows[0].table.is_ok());
        assert_eq!(rows[1].line, 6);
        let msg = format!("{:#}", rows[1].table.as_ref().unwrap_err());
        assert!(msg.contains("line 6"), "{}", msg);
    }

    #[test]
    fn test_negative_count_rejected() {
        let rows = read_tables("1;-2;3;4;5;6\n".as_bytes()).unwrap();
        assert!(rows[0].table.is_err());
    }

    #[test]
    fn test_parse_counts() {
        let args: Vec<String> = ["226", "57", "5", "249", "63", "4"].iter().map(|s| s.to_string()).collect();
        assert_eq!(parse_counts(&args).unwrap(), ContingencyTable::new(226, 57, 5, 249, 63, 4));
        assert!(parse_counts(&args[..5]).is_err());
    }
}
