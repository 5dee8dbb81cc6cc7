//! LDIF output.
//!
//! Writes a `Document` as folded LDIF text. Content entries and change
//! records cannot be mixed in one document.

use std::io::{self, BufWriter, Write};

use crate::data::{Attributes, Dn, Document, Entry, ModOp, ModifyRecord, Record};
use crate::error::{LdifError, Result};
use crate::fold::fold_line;
use crate::value::attr_line;

struct Printer<W: Write> {
    w: W,
    width: i32,
}

impl<W: Write> Printer<W> {
    /// Write one folded logical line.
    fn line(&mut self, line: &str) -> io::Result<()> {
        self.w.write_all(fold_line(line, self.width).as_bytes())?;
        self.w.write_all(b"\n")
    }

    /// Write an attribute line: `ad: value` or `ad:: base64`.
    fn attr(&mut self, ad: &str, data: &[u8]) -> io::Result<()> {
        self.line(&attr_line(ad, data))
    }

    fn dn(&mut self, dn: &Dn) -> io::Result<()> {
        self.attr("dn", dn.as_bytes())
    }

    fn entry(&mut self, entry: &Entry) -> Result<()> {
        self.dn(&entry.dn)?;
        let mut first = true;
        for attr in &entry.attributes {
            if attr.values.is_empty() {
                continue;
            }
            check_name(&entry.dn, &attr.name, first)?;
            first = false;
            for value in &attr.values {
                self.attr(&attr.name, value)?;
            }
        }
        Ok(())
    }

    fn add(&mut self, dn: &Dn, attributes: &Attributes) -> Result<()> {
        self.dn(dn)?;
        self.line("changetype: add")?;
        for attr in attributes {
            if attr.values.is_empty() {
                return Err(empty_value_list(dn, &attr.name));
            }
            check_name(dn, &attr.name, false)?;
            for value in &attr.values {
                self.attr(&attr.name, value)?;
            }
        }
        Ok(())
    }

    fn delete(&mut self, dn: &Dn) -> io::Result<()> {
        self.dn(dn)?;
        self.line("changetype: delete")
    }

    fn modify(&mut self, record: &ModifyRecord) -> Result<()> {
        self.dn(&record.dn)?;
        self.line("changetype: modify")?;
        for m in &record.mods {
            if m.values.is_empty() && m.op != ModOp::Delete {
                return Err(empty_value_list(&record.dn, &m.attr));
            }
            check_name(&record.dn, &m.attr, false)?;
            self.line(&format!("{}: {}", m.op.as_str(), m.attr))?;
            for value in &m.values {
                self.attr(&m.attr, value)?;
            }
            self.line("-")?;
        }
        Ok(())
    }

    fn record(&mut self, record: &Record) -> Result<()> {
        match record {
            Record::Content(e) => self.entry(e)?,
            Record::Add(a) => self.add(&a.dn, &a.attributes)?,
            Record::Delete(d) => self.delete(&d.dn)?,
            Record::Modify(m) => self.modify(m)?,
        }
        self.w.write_all(b"\n")?;
        Ok(())
    }
}

/// Reject attribute names that would read back as something else.
///
/// `first` marks the first attribute line of a content entry, where
/// `changetype:` and `control:` are taken as record headers.
fn check_name(dn: &Dn, name: &str, first: bool) -> Result<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.chars().any(|c| c == ':' || c.is_whitespace() || c.is_control()) {
        "name contains a colon, whitespace or a control character"
    } else if name.starts_with('#') || name.starts_with('-') {
        "name starts with '#' or '-'"
    } else if name == "version" {
        "name is reserved for the version line"
    } else if first && (name == "changetype" || name == "control") {
        "name would be read as a record header"
    } else {
        return Ok(());
    };
    tracing::warn!(dn = %dn, attr = name, reason, "attribute name cannot be written");
    Err(LdifError::UnsupportedRecordShape(format!(
        "{}: attribute {:?}: {}",
        dn, name, reason
    )))
}

fn empty_value_list(dn: &Dn, attr: &str) -> LdifError {
    LdifError::EmptyValueList {
        dn: dn.to_string(),
        attr: attr.to_string(),
    }
}

/// Write `doc` to `w`.
///
/// On error some output may already have been written; callers must
/// discard it.
#[tracing::instrument(skip_all, fields(records = doc.records.len(), fold_width = doc.fold_width))]
pub fn marshal_to<W: Write>(doc: &Document, w: W) -> Result<()> {
    let mut printer = Printer {
        w: BufWriter::new(w),
        width: doc.fold_width,
    };
    if doc.version {
        printer.w.write_all(b"version: 1\n")?;
    }

    let mut has_entry = false;
    let mut has_change = false;
    for (index, record) in doc.records.iter().enumerate() {
        if record.is_change() {
            has_change = true;
        } else {
            has_entry = true;
        }
        if has_entry && has_change {
            tracing::warn!(index, dn = %record.dn(), "content and change records mixed");
            return Err(LdifError::MixedRecordKinds);
        }
        if record.dn().is_empty() {
            return Err(LdifError::UnsupportedRecordShape(format!(
                "record {} has an empty dn",
                index
            )));
        }
        tracing::trace!(index, dn = %record.dn(), "writing record");
        printer.record(record)?;
    }
    printer.w.flush()?;
    Ok(())
}

/// Render `doc` as a string.
pub fn marshal(doc: &Document) -> Result<String> {
    let mut buf = Vec::new();
    marshal_to(doc, &mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| LdifError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Write `records` as one document with the given fold width.
pub fn dump<W, I, R>(w: W, fold_width: i32, records: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = R>,
    R: Into<Record>,
{
    let doc = Document::from_records(records).with_fold_width(fold_width);
    marshal_to(&doc, w)
}
