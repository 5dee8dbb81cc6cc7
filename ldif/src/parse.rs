//! LDIF parser.
//!
//! A single pass over the logical lines produced by `LineReader`. Every
//! record starts with `dn:`; the optional `changetype:` line right after it
//! selects between a content entry and an add, delete or modify record.

use std::io::Read;

use crate::data::{
    AddRecord, Attributes, DeleteRecord, Dn, Document, Entry, ModOp, Modification,
    ModifyRecord, Record,
};
use crate::error::{LdifError, Result};
use crate::lines::{Line, LineReader};
use crate::resolve::{FileResolver, UrlResolver};
use crate::value;

static FILE_RESOLVER: FileResolver = FileResolver;

/// Parser configuration: which resolver handles `type:< url` values.
#[derive(Clone, Copy)]
pub struct Parser<'r> {
    resolver: &'r dyn UrlResolver,
}

impl Default for Parser<'static> {
    fn default() -> Self {
        Parser::new()
    }
}

impl Parser<'static> {
    /// A parser that reads `file://` values from the local filesystem.
    pub fn new() -> Self {
        Parser {
            resolver: &FILE_RESOLVER,
        }
    }
}

impl<'r> Parser<'r> {
    pub fn with_resolver(resolver: &'r dyn UrlResolver) -> Self {
        Parser { resolver }
    }

    pub fn parse(&self, input: &str) -> Result<Document> {
        self.parse_bytes(input.as_bytes())
    }

    #[tracing::instrument(skip_all, fields(input_len = input.len()))]
    pub fn parse_bytes(&self, input: &[u8]) -> Result<Document> {
        tracing::debug!("parsing LDIF document");
        let reader = LdifReader {
            lines: LineReader::new(input),
            resolver: self.resolver,
            started: false,
        };
        let doc = reader
            .read_document()
            .inspect_err(|e| tracing::warn!(error = %e, "rejected LDIF input"))?;
        tracing::debug!(records = doc.records.len(), "LDIF document parsed");
        Ok(doc)
    }

    /// Read `reader` to the end and parse it.
    pub fn parse_reader<R: Read>(&self, mut reader: R) -> Result<Document> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.parse_bytes(&buf)
    }
}

/// A decoded `type: value` line.
struct AttrLine {
    number: usize,
    name: String,
    value: Vec<u8>,
}

/// What the next logical line turned out to be.
enum Next {
    Attr(AttrLine),
    /// The leading `version:` line of the document.
    Version { number: usize, value: Vec<u8> },
    /// A line consisting of `-`.
    Dash(usize),
    Blank,
    Eof,
}

struct LdifReader<'a, 'r> {
    lines: LineReader<'a>,
    resolver: &'r dyn UrlResolver,
    started: bool,
}

impl LdifReader<'_, '_> {
    fn read_line(&mut self) -> Result<Next> {
        let (number, text) = match self.lines.next() {
            None => return Ok(Next::Eof),
            Some(Line::Blank) => return Ok(Next::Blank),
            Some(Line::Content { number, text }) => (number, text),
        };
        let first = !self.started;
        self.started = true;

        if text == b"-" {
            return Ok(Next::Dash(number));
        }
        let (name, raw) =
            value::split_line(&text).ok_or(LdifError::MalformedLine { line: number })?;
        if name == "version" {
            if !first {
                return Err(LdifError::MisplacedVersion { line: number });
            }
            let value = value::decode(raw, number, self.resolver)?;
            return Ok(Next::Version { number, value });
        }
        let name = name.to_string();
        let value = value::decode(raw, number, self.resolver)?;
        tracing::trace!(line = number, attr = %name, len = value.len(), "attribute line");
        Ok(Next::Attr(AttrLine {
            number,
            name,
            value,
        }))
    }

    fn read_document(mut self) -> Result<Document> {
        let mut doc = Document::default();
        loop {
            match self.read_line()? {
                Next::Eof => break,
                Next::Blank => continue,
                Next::Version { number, value } => {
                    if value != b"1" {
                        return Err(LdifError::UnsupportedVersion {
                            line: number,
                            version: String::from_utf8_lossy(&value).into_owned(),
                        });
                    }
                    doc.version = true;
                }
                Next::Dash(number) => return Err(LdifError::MissingDn { line: number }),
                Next::Attr(line) => {
                    if line.name != "dn" {
                        return Err(LdifError::MissingDn { line: line.number });
                    }
                    let dn = dn_value(line)?;
                    let record = self.read_record(dn)?;
                    tracing::debug!(
                        dn = %record.dn(),
                        changetype = record.changetype().unwrap_or("content"),
                        "record parsed"
                    );
                    doc.records.push(record);
                }
            }
        }
        Ok(doc)
    }

    /// Everything after the `dn:` line up to the end of the record.
    fn read_record(&mut self, dn: Dn) -> Result<Record> {
        match self.read_line()? {
            Next::Eof | Next::Blank => Ok(Record::Content(Entry::new(dn))),
            Next::Dash(number) => Err(LdifError::MalformedLine { line: number }),
            Next::Version { number, .. } => Err(LdifError::MisplacedVersion { line: number }),
            Next::Attr(line) if line.name == "changetype" => self.read_change(dn, line),
            Next::Attr(line) if line.name == "control" => {
                Err(LdifError::UnsupportedControl { line: line.number })
            }
            Next::Attr(line) => {
                let attributes = self.read_attributes(Some(line))?;
                Ok(Record::Content(Entry { dn, attributes }))
            }
        }
    }

    fn read_change(&mut self, dn: Dn, line: AttrLine) -> Result<Record> {
        match line.value.as_slice() {
            b"add" => {
                let attributes = self.read_attributes(None)?;
                Ok(Record::Add(AddRecord { dn, attributes }))
            }
            b"delete" => {
                self.read_nothing()?;
                Ok(Record::Delete(DeleteRecord { dn }))
            }
            b"modify" => {
                let mods = self.read_modify_body()?;
                Ok(Record::Modify(ModifyRecord { dn, mods }))
            }
            other => Err(LdifError::UnsupportedChangeType {
                line: line.number,
                changetype: String::from_utf8_lossy(other).into_owned(),
            }),
        }
    }

    /// Attribute lines until the end of the record.
    fn read_attributes(&mut self, first: Option<AttrLine>) -> Result<Attributes> {
        let mut attrs = Attributes::new();
        let mut pending = first;
        loop {
            let line = match pending.take() {
                Some(line) => line,
                None => match self.read_line()? {
                    Next::Eof | Next::Blank => break,
                    Next::Dash(number) => return Err(LdifError::MalformedLine { line: number }),
                    Next::Version { number, .. } => {
                        return Err(LdifError::MisplacedVersion { line: number })
                    }
                    Next::Attr(line) => line,
                },
            };
            if line.value.is_empty() {
                // An empty value only passes if the attribute already has one.
                let has_value = attrs
                    .get(&line.name)
                    .is_some_and(|a| a.values.iter().any(|v| !v.is_empty()));
                if !has_value {
                    return Err(LdifError::EmptyAttributeValue {
                        line: line.number,
                        attr: line.name,
                    });
                }
                continue;
            }
            attrs.push_value(&line.name, line.value);
        }
        Ok(attrs)
    }

    /// The body of a delete record must be empty.
    fn read_nothing(&mut self) -> Result<()> {
        match self.read_line()? {
            Next::Eof | Next::Blank => Ok(()),
            Next::Attr(AttrLine { number, .. })
            | Next::Version { number, .. }
            | Next::Dash(number) => Err(LdifError::UnexpectedLineInDelete { line: number }),
        }
    }

    /// `add:`/`delete:`/`replace:` blocks, each terminated by `-`.
    fn read_modify_body(&mut self) -> Result<Vec<Modification>> {
        let mut mods = Vec::new();
        loop {
            let line = match self.read_line()? {
                Next::Eof | Next::Blank => break,
                Next::Dash(number) => return Err(LdifError::MalformedLine { line: number }),
                Next::Version { number, .. } => {
                    return Err(LdifError::MisplacedVersion { line: number })
                }
                Next::Attr(line) => line,
            };
            let op = ModOp::from_keyword(&line.name).ok_or_else(|| LdifError::InvalidModifyOp {
                line: line.number,
                op: line.name.clone(),
            })?;
            let attr = String::from_utf8(line.value)
                .ok()
                .filter(|a| !a.is_empty() && !a.contains(' '))
                .ok_or(LdifError::MalformedLine { line: line.number })?;

            let mut values = Vec::new();
            loop {
                match self.read_line()? {
                    Next::Dash(_) => break,
                    Next::Attr(v) if v.name == attr => values.push(v.value),
                    Next::Attr(v) if ModOp::from_keyword(&v.name).is_none() => {
                        return Err(LdifError::ModifyAttributeMismatch {
                            line: v.number,
                            expected: attr,
                            found: v.name,
                        });
                    }
                    Next::Version { number, .. } => {
                        return Err(LdifError::MisplacedVersion { line: number })
                    }
                    Next::Attr(_) | Next::Eof | Next::Blank => {
                        return Err(LdifError::UnterminatedModifyOp {
                            line: line.number,
                            attr,
                        });
                    }
                }
            }
            mods.push(Modification { op, attr, values });
        }
        Ok(mods)
    }
}

fn dn_value(line: AttrLine) -> Result<Dn> {
    if line.value.is_empty() {
        return Err(LdifError::MissingDn { line: line.number });
    }
    Ok(Dn::from(line.value))
}

impl std::str::FromStr for Document {
    type Err = LdifError;

    fn from_str(s: &str) -> Result<Document> {
        Parser::new().parse(s)
    }
}
