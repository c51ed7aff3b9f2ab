use sha2::{Digest, Sha256};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};

/// Read the lines stored in `[start, end)` of `source`.
///
/// Reading stops at `end` even if the file has grown since its size was
/// sampled, so the bytes past `end` are left for the next harvest. Line
/// terminators (`\n` or `\r\n`) are stripped and lines that are empty or
/// whitespace-only are dropped. Invalid UTF-8 is replaced rather than
/// failing the read.
pub fn read_lines_between<R: Read + Seek>(
    source: R,
    start: u64,
    end: u64,
) -> io::Result<Vec<String>> {
    let mut reader = BufReader::new(source);
    reader.seek(SeekFrom::Start(start))?;

    let mut bounded = reader.take(end.saturating_sub(start));
    let mut lines = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let bytes_read = bounded.read_until(b'\n', &mut buf)?;
        if bytes_read == 0 {
            break;
        }

        let text = String::from_utf8_lossy(&buf);
        let line = text.trim_end_matches(&['\n', '\r'][..]);
        if !line.trim().is_empty() {
            lines.push(line.to_string());
        }
    }

    Ok(lines)
}

/// Hex SHA-256 over the concatenation of `lines`.
pub fn batch_checksum(lines: &[String]) -> String {
    let mut hasher = Sha256::new();
    for line in lines {
        hasher.update(line.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_whole_range() {
        let data = b"first\nsecond\nthird\n";
        let lines = read_lines_between(Cursor::new(&data[..]), 0, data.len() as u64).unwrap();
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_starts_at_offset() {
        let data = b"first\nsecond\n";
        let lines = read_lines_between(Cursor::new(&data[..]), 6, data.len() as u64).unwrap();
        assert_eq!(lines, vec!["second"]);
    }

    #[test]
    fn test_stops_at_end_bound() {
        let data = b"first\nsecond\nthird\n";
        let lines = read_lines_between(Cursor::new(&data[..]), 0, 13).unwrap();
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[test]
    fn test_drops_blank_and_whitespace_lines() {
        let data = b"a\n\n   \n\t\r\nb\n";
        let lines = read_lines_between(Cursor::new(&data[..]), 0, data.len() as u64).unwrap();
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn test_keeps_interior_and_leading_whitespace() {
        let data = b"  indented line  \r\n";
        let lines = read_lines_between(Cursor::new(&data[..]), 0, data.len() as u64).unwrap();
        assert_eq!(lines, vec!["  indented line  "]);
    }

    #[test]
    fn test_final_line_without_newline() {
        let data = b"one\ntwo";
        let lines = read_lines_between(Cursor::new(&data[..]), 0, data.len() as u64).unwrap();
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let data = b"ok\n\xff\xfe bad\n";
        let lines = read_lines_between(Cursor::new(&data[..]), 0, data.len() as u64).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with(" bad"));
    }

    #[test]
    fn test_empty_range() {
        let data = b"abc\n";
        let lines = read_lines_between(Cursor::new(&data[..]), 4, 4).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_checksum_matches_concatenation() {
        let split = batch_checksum(&["ab".to_string(), "cd".to_string()]);
        let joined = batch_checksum(&["abcd".to_string()]);
        assert_eq!(split, joined);
        assert_eq!(
            batch_checksum(&[]),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
