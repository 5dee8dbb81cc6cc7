//! Reading and writing LDIF (RFC 2849).
//!
//! ```
//! let doc = ldif::parse("dn: cn=Some One,dc=example,dc=org\ncn: Some One\n").unwrap();
//! assert_eq!(doc.records.len(), 1);
//! let text = ldif::marshal(&doc).unwrap();
//! assert_eq!(text, "dn: cn=Some One,dc=example,dc=org\ncn: Some One\n\n");
//! ```
//!
//! Values are kept as raw bytes. On output a value is written in base64
//! exactly when it contains a byte outside printable ASCII.

pub mod data;
pub mod error;
pub mod fold;
#[cfg(feature = "ldap3")]
pub mod ldap;
pub mod lines;
pub mod parse;
pub mod print;
pub mod resolve;
pub mod value;

use std::io::Read;

pub use data::{
    AddRecord, Attribute, Attributes, DeleteRecord, Dn, Document, Entry, ModOp, Modification,
    ModifyRecord, Record,
};
pub use error::{LdifError, Result};
pub use fold::{fold_line, unfold};
pub use parse::Parser;
pub use print::{dump, marshal, marshal_to};
pub use resolve::{FileResolver, NoResolver, UrlResolver};

/// Parse an LDIF document, resolving `file://` values from disk.
pub fn parse(input: &str) -> Result<Document> {
    Parser::new().parse(input)
}

/// Like [`parse`], for input that is not known to be UTF-8.
pub fn parse_bytes(input: &[u8]) -> Result<Document> {
    Parser::new().parse_bytes(input)
}

/// Read `reader` to the end and parse it as LDIF.
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    Parser::new().parse_reader(reader)
}
