use client_logging::client_debug;

use crate::types::BatchRecord;

/// Incremental decoder for a newline-delimited JSON byte stream.
///
/// Chunk boundaries are not aligned with record boundaries, so the tail of
/// every chunk (which may end mid-record, even mid-way through a multi-byte
/// character) is carried over in `pending` until the next separator
/// arrives. The buffer is only ever cleared on separator boundaries.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    pending: Vec<u8>,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns every newly completed line, in order.
    /// The trailing partial segment stays buffered for the next call.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for byte in chunk {
            if *byte == b'\n' {
                let line = std::mem::take(&mut self.pending);
                lines.push(decode_line(line));
            } else {
                self.pending.push(*byte);
            }
        }
        lines
    }

    /// Flushes a non-empty residual once the stream has ended, covering a
    /// producer that closes without a trailing separator.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        Some(decode_line(std::mem::take(&mut self.pending)))
    }
}

fn decode_line(mut raw: Vec<u8>) -> String {
    if raw.last() == Some(&b'\r') {
        raw.pop();
    }
    match String::from_utf8(raw) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

/// Parses one candidate line into a record. Blank lines, unparsable JSON,
/// and unrecognized `type` tags are all dropped: one corrupted diagnostic
/// line must not abort an otherwise-successful batch.
pub fn parse_record(line: &str) -> Option<BatchRecord> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str(trimmed) {
        Ok(record) => Some(record),
        Err(err) => {
            client_debug!(
                "batch {}: dropping undecodable stream line: {}",
                client_logging::get_batch_seq(),
                err
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_record, NdjsonDecoder};
    use crate::types::BatchRecord;

    fn progress_line(current: u64, address: &str) -> String {
        format!(
            "{{\"type\":\"progress\",\"current\":{current},\"total\":2,\"address\":\"{address}\",\"success\":true}}\n"
        )
    }

    #[test]
    fn whole_buffer_and_chunked_feeds_agree() {
        let stream = format!("{}{}", progress_line(1, "A"), progress_line(2, "B"));

        let mut whole = NdjsonDecoder::new();
        let whole_lines = whole.feed(stream.as_bytes());
        assert_eq!(whole.finish(), None);

        for split in 1..stream.len() {
            let mut chunked = NdjsonDecoder::new();
            let mut lines = chunked.feed(&stream.as_bytes()[..split]);
            lines.extend(chunked.feed(&stream.as_bytes()[split..]));
            assert_eq!(chunked.finish(), None);
            assert_eq!(lines, whole_lines, "split at byte {split}");
        }
    }

    #[test]
    fn split_inside_multibyte_character_is_preserved() {
        let line = "{\"type\":\"progress\",\"current\":1,\"total\":1,\"address\":\"Škofja Loka\",\"success\":true}\n";
        // Split inside the two-byte 'Š'.
        let split = line.find('Š').unwrap() + 1;

        let mut decoder = NdjsonDecoder::new();
        assert!(decoder.feed(&line.as_bytes()[..split]).is_empty());
        let lines = decoder.feed(&line.as_bytes()[split..]);
        assert_eq!(lines.len(), 1);

        let record = parse_record(&lines[0]).expect("valid record");
        match record {
            BatchRecord::Progress { address, .. } => assert_eq!(address, "Škofja Loka"),
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn partial_tail_waits_for_separator() {
        let mut decoder = NdjsonDecoder::new();
        assert!(decoder.feed(b"{\"type\":\"complete\",\"successful\":1").is_empty());
        let lines = decoder.feed(b",\"total\":1}\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(
            parse_record(&lines[0]),
            Some(BatchRecord::Complete {
                successful: 1,
                total: 1
            })
        );
    }

    #[test]
    fn finish_flushes_stream_without_trailing_separator() {
        let mut decoder = NdjsonDecoder::new();
        assert!(decoder.feed(b"{\"type\":\"error\",\"error\":\"boom\"}").is_empty());
        let residual = decoder.finish().expect("residual line");
        assert_eq!(
            parse_record(&residual),
            Some(BatchRecord::Error {
                error: "boom".to_string()
            })
        );
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn crlf_separators_are_tolerated() {
        let mut decoder = NdjsonDecoder::new();
        let lines = decoder.feed(b"{\"type\":\"error\",\"error\":\"x\"}\r\n");
        assert_eq!(lines, vec!["{\"type\":\"error\",\"error\":\"x\"}".to_string()]);
    }

    #[test]
    fn malformed_lines_between_valid_records_are_dropped() {
        let mut decoder = NdjsonDecoder::new();
        let stream = format!("{}garbage not json\n{}", progress_line(1, "A"), progress_line(2, "B"));
        let records: Vec<_> = decoder
            .feed(stream.as_bytes())
            .iter()
            .filter_map(|line| parse_record(line))
            .collect();
        assert_eq!(records.len(), 2);
        assert!(matches!(&records[0], BatchRecord::Progress { address, .. } if address == "A"));
        assert!(matches!(&records[1], BatchRecord::Progress { address, .. } if address == "B"));
    }

    #[test]
    fn unknown_record_type_is_dropped() {
        assert_eq!(parse_record("{\"type\":\"heartbeat\",\"at\":3}"), None);
        assert_eq!(parse_record(""), None);
        assert_eq!(parse_record("   "), None);
    }

    #[test]
    fn extra_wire_fields_are_ignored() {
        let record = parse_record(
            "{\"type\":\"progress\",\"progress\":50,\"current\":1,\"total\":2,\"address\":\"A\",\"success\":false,\"error\":\"Could not geocode address\"}",
        );
        assert_eq!(
            record,
            Some(BatchRecord::Progress {
                current: 1,
                total: 2,
                address: "A".to_string(),
                success: false,
                error: Some("Could not geocode address".to_string()),
            })
        );
    }
}
