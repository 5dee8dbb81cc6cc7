use std::fmt;

/// A parsed or hand-assembled LDIF document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Whether the document carries (or should be written with) `version: 1`.
    pub version: bool,
    /// Column at which output lines are folded: 0 means the default of 76,
    /// a negative value disables folding.
    pub fold_width: i32,
    pub records: Vec<Record>,
}

/// A distinguished name, kept as the bytes it was read from.
///
/// LDIF input may be Latin-1, so a DN is not required to be UTF-8. `Display`
/// renders it lossily.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dn(Vec<u8>);

/// One LDIF record: either a content entry or a change record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Content(Entry),
    Add(AddRecord),
    Delete(DeleteRecord),
    Modify(ModifyRecord),
}

/// An attribute: a name with an ordered list of binary-safe values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub values: Vec<Vec<u8>>,
}

/// Attributes in first-seen order.
///
/// Adding a value to a name that is already present appends to that
/// attribute; a new name is appended at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<Attribute>);

/// A content entry: a DN with its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub dn: Dn,
    pub attributes: Attributes,
}

/// A `changetype: add` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRecord {
    pub dn: Dn,
    pub attributes: Attributes,
}

/// A `changetype: delete` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRecord {
    pub dn: Dn,
}

/// A `changetype: modify` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyRecord {
    pub dn: Dn,
    pub mods: Vec<Modification>,
}

/// LDAP modification operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModOp {
    Add,
    Delete,
    Replace,
}

/// One add/delete/replace block of a modify record.
///
/// A `Delete` without values removes the whole attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modification {
    pub op: ModOp,
    pub attr: String,
    pub values: Vec<Vec<u8>>,
}

impl Document {
    pub fn new(records: Vec<Record>) -> Document {
        Document {
            records,
            ..Document::default()
        }
    }

    /// Collect records (or anything convertible into one) into a document.
    pub fn from_records<I, R>(records: I) -> Document
    where
        I: IntoIterator<Item = R>,
        R: Into<Record>,
    {
        Document::new(records.into_iter().map(Into::into).collect())
    }

    pub fn with_version(mut self, version: bool) -> Document {
        self.version = version;
        self
    }

    pub fn with_fold_width(mut self, fold_width: i32) -> Document {
        self.fold_width = fold_width;
        self
    }

    /// All content entries, in document order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.records.iter().filter_map(|r| match r {
            Record::Content(e) => Some(e),
            Record::Add(_) | Record::Delete(_) | Record::Modify(_) => None,
        })
    }
}

impl Dn {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The DN as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Dn {
    fn from(bytes: Vec<u8>) -> Dn {
        Dn(bytes)
    }
}

impl From<&[u8]> for Dn {
    fn from(bytes: &[u8]) -> Dn {
        Dn(bytes.to_vec())
    }
}

impl From<String> for Dn {
    fn from(s: String) -> Dn {
        Dn(s.into_bytes())
    }
}

impl From<&str> for Dn {
    fn from(s: &str) -> Dn {
        Dn(s.as_bytes().to_vec())
    }
}

impl PartialEq<str> for Dn {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for Dn {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dn({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl Record {
    pub fn dn(&self) -> &Dn {
        match self {
            Record::Content(e) => &e.dn,
            Record::Add(a) => &a.dn,
            Record::Delete(d) => &d.dn,
            Record::Modify(m) => &m.dn,
        }
    }

    /// True for add, delete and modify records.
    pub fn is_change(&self) -> bool {
        self.changetype().is_some()
    }

    /// The `changetype:` keyword of a change record.
    pub fn changetype(&self) -> Option<&'static str> {
        match self {
            Record::Content(_) => None,
            Record::Add(_) => Some("add"),
            Record::Delete(_) => Some("delete"),
            Record::Modify(_) => Some("modify"),
        }
    }
}

impl From<Entry> for Record {
    fn from(entry: Entry) -> Record {
        Record::Content(entry)
    }
}

impl From<AddRecord> for Record {
    fn from(add: AddRecord) -> Record {
        Record::Add(add)
    }
}

impl From<DeleteRecord> for Record {
    fn from(del: DeleteRecord) -> Record {
        Record::Delete(del)
    }
}

impl From<ModifyRecord> for Record {
    fn from(modify: ModifyRecord) -> Record {
        Record::Modify(modify)
    }
}

impl Attribute {
    pub fn new(name: String) -> Attribute {
        Attribute {
            name,
            values: Vec::new(),
        }
    }

    /// Value at `index` as text, if it is valid UTF-8.
    pub fn value_str(&self, index: usize) -> Option<&str> {
        self.values
            .get(index)
            .and_then(|v| std::str::from_utf8(v).ok())
    }
}

impl Attributes {
    pub fn new() -> Attributes {
        Attributes(Vec::new())
    }

    /// Append `value` to attribute `name`, creating the attribute at the end
    /// if it does not exist yet.
    pub fn push_value(&mut self, name: &str, value: Vec<u8>) {
        self.slot(name).values.push(value);
    }

    /// Append several values to attribute `name` (see `push_value`).
    pub fn extend_values<I, V>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Vec<u8>>,
    {
        let slot = self.slot(name);
        slot.values.extend(values.into_iter().map(Into::into));
    }

    /// Find an attribute, creating it if needed.
    fn slot(&mut self, name: &str) -> &mut Attribute {
        let pos = match self.0.iter().position(|a| a.name == name) {
            Some(i) => i,
            None => {
                self.0.push(Attribute::new(name.to_string()));
                self.0.len() - 1
            }
        };
        &mut self.0[pos]
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.0.iter().find(|a| a.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Attribute] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Attributes {
    type Item = Attribute;
    type IntoIter = std::vec::IntoIter<Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<Attribute> for Attributes {
    /// Attributes sharing a name are merged into the first one.
    fn from_iter<T: IntoIterator<Item = Attribute>>(iter: T) -> Self {
        let mut attrs = Attributes::new();
        for a in iter {
            attrs.extend_values(&a.name, a.values);
        }
        attrs
    }
}

impl Entry {
    pub fn new(dn: impl Into<Dn>) -> Entry {
        Entry {
            dn: dn.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute<I, V>(mut self, name: &str, values: I) -> Entry
    where
        I: IntoIterator<Item = V>,
        V: Into<Vec<u8>>,
    {
        self.attributes.extend_values(name, values);
        self
    }

    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// All values of `name`, empty if the attribute is absent.
    pub fn values(&self, name: &str) -> &[Vec<u8>] {
        self.attributes
            .get(name)
            .map(|a| a.values.as_slice())
            .unwrap_or_default()
    }

    /// First value of `name` as text, if present and valid UTF-8.
    pub fn first_value(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(|a| a.value_str(0))
    }
}

impl AddRecord {
    pub fn new(dn: impl Into<Dn>) -> AddRecord {
        AddRecord {
            dn: dn.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute<I, V>(mut self, name: &str, values: I) -> AddRecord
    where
        I: IntoIterator<Item = V>,
        V: Into<Vec<u8>>,
    {
        self.attributes.extend_values(name, values);
        self
    }
}

impl DeleteRecord {
    pub fn new(dn: impl Into<Dn>) -> DeleteRecord {
        DeleteRecord { dn: dn.into() }
    }
}

impl ModifyRecord {
    pub fn new(dn: impl Into<Dn>) -> ModifyRecord {
        ModifyRecord {
            dn: dn.into(),
            mods: Vec::new(),
        }
    }

    fn push<I, V>(mut self, op: ModOp, attr: &str, values: I) -> ModifyRecord
    where
        I: IntoIterator<Item = V>,
        V: Into<Vec<u8>>,
    {
        self.mods.push(Modification {
            op,
            attr: attr.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn add<I, V>(self, attr: &str, values: I) -> ModifyRecord
    where
        I: IntoIterator<Item = V>,
        V: Into<Vec<u8>>,
    {
        self.push(ModOp::Add, attr, values)
    }

    /// Delete `values` from `attr`; no values deletes the whole attribute.
    pub fn delete<I, V>(self, attr: &str, values: I) -> ModifyRecord
    where
        I: IntoIterator<Item = V>,
        V: Into<Vec<u8>>,
    {
        self.push(ModOp::Delete, attr, values)
    }

    pub fn replace<I, V>(self, attr: &str, values: I) -> ModifyRecord
    where
        I: IntoIterator<Item = V>,
        V: Into<Vec<u8>>,
    {
        self.push(ModOp::Replace, attr, values)
    }
}

impl ModOp {
    /// The keyword used for this operation in LDIF.
    pub fn as_str(self) -> &'static str {
        match self {
            ModOp::Add => "add",
            ModOp::Delete => "delete",
            ModOp::Replace => "replace",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<ModOp> {
        match keyword {
            "add" => Some(ModOp::Add),
            "delete" => Some(ModOp::Delete),
            "replace" => Some(ModOp::Replace),
            _ => None,
        }
    }
}
