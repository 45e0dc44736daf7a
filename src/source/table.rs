//! Tab-separated table parsing with the `csv` reader.

use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use super::SourceError;
use super::record::{BodyFormat, ContentRecord, parse_status, parse_tags};

/// Columns in the node table.
const NODE_COLUMNS: usize = 10;

/// Row of the alias or redirect table, whatever its column order on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRow {
    /// Legacy URL path (or, for broken redirects, an absolute URL).
    pub path: String,
    /// Canonical reference, `node/<id>` for content.
    pub reference: String,
}

/// Row of the attachment table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRow {
    pub id: String,
    pub path: String,
    pub name: String,
}

/// Column layout of a two-column link table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkColumns {
    /// `(reference, path)`: the alias table.
    ReferenceFirst,
    /// `(path, reference)`: the redirect table.
    PathFirst,
}

/// Read the alias table: `(node/<id>, alias)` per line, no header.
pub fn read_alias_table(path: &Path) -> Result<Vec<LinkRow>, SourceError> {
    read_link_table(path, LinkColumns::ReferenceFirst)
}

/// Read the redirect table: `(source path, node/<id>)` per line, no header.
pub fn read_redirect_table(path: &Path) -> Result<Vec<LinkRow>, SourceError> {
    read_link_table(path, LinkColumns::PathFirst)
}

fn read_link_table(path: &Path, columns: LinkColumns) -> Result<Vec<LinkRow>, SourceError> {
    Ok(link_rows(read_plain(path, 2)?, columns))
}

fn link_rows(records: Vec<StringRecord>, columns: LinkColumns) -> Vec<LinkRow> {
    let (path, reference) = match columns {
        LinkColumns::ReferenceFirst => (1, 0),
        LinkColumns::PathFirst => (0, 1),
    };
    records
        .into_iter()
        .map(|record| LinkRow {
            path: record[path].to_string(),
            reference: record[reference].to_string(),
        })
        .collect()
}

/// Read the attachment table: `(id, file path, display name)` per line, no header.
pub fn read_attachments(path: &Path) -> Result<Vec<AttachmentRow>, SourceError> {
    read_plain(path, 3)?
        .into_iter()
        .map(|record| {
            Ok(AttachmentRow {
                id: record[0].to_string(),
                path: record[1].to_string(),
                name: record[2].to_string(),
            })
        })
        .collect()
}

/// Read the node table. The header row is skipped.
///
/// Carriage returns are dropped before parsing; Windows line endings inside
/// quoted bodies otherwise confuse the reader.
pub fn read_nodes(path: &Path) -> Result<Vec<ContentRecord>, SourceError> {
    let content =
        fs::read_to_string(path).map_err(|err| SourceError::Io(path.to_path_buf(), err))?;
    parse_nodes(&content.replace('\r', ""), path)
}

fn parse_nodes(content: &str, path: &Path) -> Result<Vec<ContentRecord>, SourceError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut nodes = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|err| SourceError::Csv(path.to_path_buf(), err))?;
        check_columns(&record, NODE_COLUMNS, path)?;
        nodes.push(node_from_record(&record)?);
    }
    Ok(nodes)
}

/// Columns: id, type, title, status, created, changed, body, format, tags, author.
fn node_from_record(record: &StringRecord) -> Result<ContentRecord, SourceError> {
    let id = record[0].to_string();
    let created = record[4]
        .trim()
        .parse()
        .map_err(|_| SourceError::InvalidTimestamp {
            id: id.clone(),
            value: record[4].to_string(),
        })?;

    Ok(ContentRecord {
        id,
        kind: record[1].to_string(),
        title: record[2].to_string(),
        published: parse_status(&record[3]),
        created,
        body: record[6].to_string(),
        format: BodyFormat::from_code(&record[7]),
        tags: parse_tags(&record[8]),
        author: record[9].to_string(),
    })
}

/// Unquoted table with a fixed column count.
fn read_plain(path: &Path, columns: usize) -> Result<Vec<StringRecord>, SourceError> {
    let content =
        fs::read_to_string(path).map_err(|err| SourceError::Io(path.to_path_buf(), err))?;
    parse_plain(&content, columns, path)
}

fn parse_plain(
    content: &str,
    columns: usize,
    path: &Path,
) -> Result<Vec<StringRecord>, SourceError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|err| SourceError::Csv(path.to_path_buf(), err))?;
        check_columns(&record, columns, path)?;
        rows.push(record);
    }
    Ok(rows)
}

fn check_columns(record: &StringRecord, expected: usize, path: &Path) -> Result<(), SourceError> {
    if record.len() == expected {
        return Ok(());
    }
    Err(SourceError::ColumnCount {
        path: path.to_path_buf(),
        line: record.position().map_or(0, csv::Position::line),
        expected,
        found: record.len(),
    })
}
