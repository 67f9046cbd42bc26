//! Reading sequences from FASTA/FASTQ, delimited tables or plain text

use anyhow::{bail, Context};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use tracing::info;

/// Parse FASTA/FASTQ file and return sequences
fn parse_fastx_file(path: &str) -> anyhow::Result<Vec<String>> {
    use needletail::parse_fastx_file;

    let mut sequences = Vec::new();
    let mut reader = parse_fastx_file(path)?;

    while let Some(record) = reader.next() {
        let record = record?;
        let seq_bytes = record.seq();
        let seq = std::str::from_utf8(&seq_bytes)?;
        sequences.push(seq.to_string());
    }

    Ok(sequences)
}

/// Parse plain text file with one sequence per line
fn parse_plain_text_sequences(path: &str) -> anyhow::Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("failed to open {path}"))?;
    let reader = BufReader::new(file);
    let mut sequences = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let seq = line.trim();
        if !seq.is_empty() {
            sequences.push(seq.to_string());
        }
    }

    Ok(sequences)
}

/// Magic numbers of the compressed formats needletail decodes
const COMPRESSED_MAGIC: [&[u8]; 4] = [
    &[0x1f, 0x8b],                         // gzip
    b"BZh",                                // bzip2
    &[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00], // xz
    &[0x28, 0xb5, 0x2f, 0xfd],             // zstd
];

/// Whether the file should be read as FASTA/FASTQ
///
/// True for compressed input and for text whose first non-blank byte is a
/// record start (`>` or `@`). An empty file is plain text.
fn looks_like_fastx(path: &str) -> anyhow::Result<bool> {
    let mut file = File::open(path).with_context(|| format!("failed to open {path}"))?;
    let mut head = [0u8; 512];
    let n = file.read(&mut head).with_context(|| format!("failed to read {path}"))?;
    let head = &head[..n];

    if COMPRESSED_MAGIC.iter().any(|magic| head.starts_with(magic)) {
        return Ok(true);
    }
    Ok(matches!(
        head.iter().find(|b| !b.is_ascii_whitespace()),
        Some(b'>') | Some(b'@')
    ))
}

/// Split one table row, honouring `"..."` quoting and doubled `""` inside it
fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            c if c == delimiter && !in_quotes => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Tab if the header holds one, comma otherwise
fn detect_delimiter(header: &str) -> char {
    if header.contains('\t') {
        '\t'
    } else {
        ','
    }
}

/// Parse a delimited table (TSV or CSV with a header row) and return one column
///
/// Rows too short to hold the column, or with an empty cell, are skipped.
fn parse_table_column(path: &str, column: &str) -> anyhow::Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("failed to open {path}"))?;
    let mut lines = BufReader::new(file).lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => bail!("{path} is empty, expected a header row"),
    };
    let delimiter = detect_delimiter(&header);
    let index = split_fields(&header, delimiter)
        .iter()
        .position(|name| name.trim() == column)
        .with_context(|| format!("column '{column}' not found in header of {path}"))?;

    let mut sequences = Vec::new();
    let mut short_rows = 0usize;
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match split_fields(&line, delimiter).get(index) {
            Some(cell) => {
                let seq = cell.trim();
                if !seq.is_empty() {
                    sequences.push(seq.to_string());
                }
            }
            None => short_rows += 1,
        }
    }
    if short_rows > 0 {
        info!("  Skipped {} rows without a '{}' field", short_rows, column);
    }

    Ok(sequences)
}

/// Parse sequences file
///
/// With a column name the file is read as a delimited table; otherwise the
/// format is auto-detected as FASTA/FASTQ or plain text. Errors inside a
/// file recognised as FASTA/FASTQ are reported, never re-read as text.
pub fn parse_sequences_file(path: &str, column: Option<&str>) -> anyhow::Result<Vec<String>> {
    if let Some(column) = column {
        return parse_table_column(path, column);
    }
    if looks_like_fastx(path)? {
        parse_fastx_file(path).with_context(|| format!("malformed FASTA/FASTQ in {path}"))
    } else {
        info!("  File is not FASTA/FASTQ, reading plain text format...");
        parse_plain_text_sequences(path)
    }
}
