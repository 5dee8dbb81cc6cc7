use std::io::Write;

use ldif::{
    marshal, parse, AddRecord, Document, Entry, LdifError, ModOp, ModifyRecord, Record,
};
use proptest::prelude::*;

const RFC2849_EXAMPLE1: &str = "version: 1
dn: cn=Barbara Jensen, ou=Product Development, dc=airius, dc=com
objectclass: top
objectclass: person
objectclass: organizationalPerson
cn: Barbara Jensen
cn: Barbara J Jensen
cn: Babs Jensen
sn: Jensen
uid: bjensen
telephonenumber: +1 408 555 1212
description: A big sailing fan.

dn: cn=Bjorn Jensen, ou=Accounting, dc=airius, dc=com
objectclass: top
objectclass: person
objectclass: organizationalPerson
cn: Bjorn Jensen
sn: Jensen
telephonenumber: +1 408 555 1212
";

const RFC2849_EXAMPLE6: &str = "version: 1
# Add a new entry
dn: cn=Fiona Jensen, ou=Marketing, dc=airius, dc=com
changetype: add
objectclass: top
objectclass: person
objectclass: organizationalPerson
cn: Fiona Jensen
sn: Jensen
uid: fiona
telephonenumber: +1 408 555 1212
# jpegphoto:< file:///usr/local/directory/photos/fiona.jpg

# Delete an existing entry
dn: cn=Robert Jensen, ou=Marketing, dc=airius, dc=com
changetype: delete

# Modify an entry's relative distinguished name
#dn: cn=Paul Jensen, ou=Product Development, dc=airius, dc=com
#changetype: modrdn
#newrdn: cn=Paula Jensen
#deleteoldrdn: 1

# Modify an entry: add an additional value to the postaladdress
# attribute, completely delete the description attribute, replace
# the telephonenumber attribute with two values, and delete a specific
# value from the facsimiletelephonenumber attribute
dn: cn=Paula Jensen, ou=Product Development, dc=airius, dc=com
changetype: modify
add: postaladdress
postaladdress: 123 Anystreet $ Sunnyvale, CA $ 94086
-
# a comment between two operations
delete: description
-
replace: telephonenumber
telephonenumber: +1 408 555 1234
telephonenumber: +1 408 555 5678
-
delete: facsimiletelephonenumber
facsimiletelephonenumber: +1 408 555 9876
-

# Modify an entry: replace the postaladdress attribute with an empty
# set of values, and delete the entire description attribute.
dn: cn=Ingrid Jensen, ou=Product Support, dc=airius, dc=com
changetype: modify
replace: postaladdress
-
delete: description
-
";

fn entry(doc: &Document, i: usize) -> &Entry {
    match &doc.records[i] {
        Record::Content(e) => e,
        other => panic!("record {i} is not a content entry: {other:?}"),
    }
}

fn modify(doc: &Document, i: usize) -> &ModifyRecord {
    match &doc.records[i] {
        Record::Modify(m) => m,
        other => panic!("record {i} is not a modify record: {other:?}"),
    }
}

// ── Group 1: RFC 2849 examples ──────────────────────────────

#[test_log::test]
fn example1_content_entries() {
    let doc = parse(RFC2849_EXAMPLE1).unwrap();
    assert!(doc.version);
    assert_eq!(doc.records.len(), 2);
    assert_eq!(entry(&doc, 1).first_value("sn"), Some("Jensen"));
    assert_eq!(
        entry(&doc, 0).values("cn"),
        [
            b"Barbara Jensen".to_vec(),
            b"Barbara J Jensen".to_vec(),
            b"Babs Jensen".to_vec()
        ]
    );
    assert_eq!(doc.entries().count(), 2);
}

#[test_log::test]
fn example6_change_records() {
    let doc = parse(RFC2849_EXAMPLE6).unwrap();
    assert_eq!(doc.records.len(), 4);
    assert!(matches!(doc.records[0], Record::Add(_)));
    assert!(matches!(doc.records[1], Record::Delete(_)));

    let paula = modify(&doc, 2);
    assert_eq!(paula.mods.len(), 4);
    assert_eq!(paula.mods[1].op, ModOp::Delete);
    assert_eq!(paula.mods[1].attr, "description");
    assert!(paula.mods[1].values.is_empty());
    assert_eq!(paula.mods[2].op, ModOp::Replace);
    assert_eq!(paula.mods[2].attr, "telephonenumber");
    assert_eq!(
        paula.mods[2].values,
        [b"+1 408 555 1234".to_vec(), b"+1 408 555 5678".to_vec()]
    );

    let ingrid = modify(&doc, 3);
    assert_eq!(ingrid.mods[0].op, ModOp::Replace);
    assert!(ingrid.mods[0].values.is_empty());
    assert_eq!(ingrid.mods[1].op, ModOp::Delete);
    assert_eq!(ingrid.mods[1].attr, "description");
}

#[test]
fn version_on_second_record() {
    let input = RFC2849_EXAMPLE1.replacen("version: 1\n", "", 1).replacen(
        "\ndn: cn=Bjorn",
        "\nversion: 1\ndn: cn=Bjorn",
        1,
    );
    assert!(matches!(
        parse(&input),
        Err(LdifError::MisplacedVersion { .. })
    ));
}

// ── Group 2: line structure ─────────────────────────────────

#[test]
fn multiple_blank_lines_between_records() {
    let input = "# Organization Units
dn: ou=users,dc=example,dc=com
objectClass: organizationalUnit
objectClass: top
ou: users


# a comment after two blank lines
dn: ou=groups,dc=example,dc=com
objectClass: organizationalUnit
objectClass: top
ou: groups
";
    let doc = parse(input).unwrap();
    assert_eq!(doc.records.len(), 2);
    assert_eq!(entry(&doc, 1).first_value("ou"), Some("groups"));
}

#[test]
fn leading_and_trailing_blank_lines() {
    let input = "\n\n# Organization Units\ndn: ou=users,dc=example,dc=com\nou: users\n\n\n";
    let doc = parse(input).unwrap();
    assert_eq!(doc.records.len(), 1);
    assert_eq!(entry(&doc, 0).first_value("ou"), Some("users"));
}

#[test]
fn continued_comment() {
    let input = "dn: uid=someone,dc=example,dc=org\n# a comment\n continued comment\nsn: someone\n";
    let doc = parse(input).unwrap();
    assert_eq!(entry(&doc, 0).first_value("sn"), Some("someone"));
}

#[test]
fn continuation_keeps_inner_space() {
    let input = "dn: uid=someone,dc=example,dc=org\nsn: Some\n  One\ncn: Someone\n";
    let doc = parse(input).unwrap();
    assert_eq!(entry(&doc, 0).first_value("sn"), Some("Some One"));
}

#[test]
fn crlf_line_endings() {
    let input = "dn: uid=someone,dc=example,dc=org\r\nsn:: U29tZSBPbmU=\r\n\r\n";
    let doc = parse(input).unwrap();
    assert_eq!(entry(&doc, 0).first_value("sn"), Some("Some One"));
}

// ── Group 3: values ─────────────────────────────────────────

#[test]
fn broken_base64() {
    let input = "dn: uid=someone,dc=example,dc=org\nsn:: XXX-U29tZSBPbmU=\n";
    let err = parse(input).unwrap_err();
    assert!(matches!(err, LdifError::MalformedValue { line: 2, .. }));
}

#[test]
fn empty_value_before_real_value() {
    let input = "dn: uid=someone,dc=example,dc=org\ncn:\ncn: Some User\n";
    assert!(matches!(
        parse(input),
        Err(LdifError::EmptyAttributeValue { .. })
    ));
}

#[test]
fn missing_dn() {
    let input = "objectclass: top\ncn: Some User\n";
    assert!(matches!(parse(input), Err(LdifError::MissingDn { line: 1 })));
}

#[test_log::test]
fn file_url_value_read_verbatim() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(b"TEST\n").unwrap();
    f.flush().unwrap();
    let url = url::Url::from_file_path(f.path()).unwrap();

    let input = format!("dn: uid=someone,dc=example,dc=org\ndescription:< {}\n", url);
    let doc = parse(&input).unwrap();
    assert_eq!(entry(&doc, 0).values("description"), [b"TEST\n".to_vec()]);
}

#[test]
fn missing_url_file() {
    let dir = tempfile::tempdir().unwrap();
    let url = url::Url::from_file_path(dir.path().join("absent.jpg")).unwrap();
    let input = format!("dn: cn=x\njpegphoto:< {}\n", url);
    match parse(&input) {
        Err(LdifError::ExternalValueUnavailable { line, source, .. }) => {
            assert_eq!(line, 2);
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

// ── Group 4: writing ────────────────────────────────────────

#[test]
fn non_ascii_value_written_as_base64() {
    let doc = Document::from_records([Entry::new("ou=people,dc=example,dc=org")
        .with_attribute("description", ["The Peöple Örganization"])]);
    let out = marshal(&doc).unwrap();
    assert!(out.contains("description:: VGhlIFBlw7ZwbGUgw5ZyZ2FuaXphdGlvbg==\n"));
    assert_eq!(parse(&out).unwrap(), doc);
}

#[test]
fn content_and_change_records_do_not_mix() {
    let doc = Document::from_records([
        Record::from(Entry::new("cn=a").with_attribute("cn", ["a"])),
        Record::from(AddRecord::new("cn=b").with_attribute("cn", ["b"])),
    ]);
    assert!(matches!(marshal(&doc), Err(LdifError::MixedRecordKinds)));
}

#[test]
fn add_and_modify_records_together() {
    let doc = Document::from_records([
        Record::from(AddRecord::new("cn=b").with_attribute("cn", ["b"])),
        Record::from(ModifyRecord::new("cn=b").replace("sn", ["B"])),
    ])
    .with_version(true);
    let out = marshal(&doc).unwrap();
    assert!(out.starts_with("version: 1\ndn: cn=b\nchangetype: add\n"));
    assert_eq!(parse(&out).unwrap(), doc);
}

#[test]
fn example6_survives_a_round_trip() {
    // The Ingrid record replaces with no values, which cannot be written.
    let mut doc = parse(RFC2849_EXAMPLE6).unwrap();
    doc.records.pop();
    let again = parse(&marshal(&doc).unwrap()).unwrap();
    assert_eq!(again, doc);
}

// ── Group 5: round trip ─────────────────────────────────────

fn arb_entry() -> impl Strategy<Value = Entry> {
    let attr = (
        "x[a-z0-9]{0,6}",
        proptest::collection::vec(proptest::collection::vec(any::<u8>(), 1..40), 1..4),
    );
    ("[a-z]{1,4}=[A-Za-z0-9 ]{0,12}", proptest::collection::vec(attr, 0..5)).prop_map(
        |(dn, attrs)| {
            let mut e = Entry::new(dn);
            for (name, values) in attrs {
                e.attributes.extend_values(&name, values);
            }
            e
        },
    )
}

proptest! {
    #[test]
    fn content_documents_round_trip(
        entries in proptest::collection::vec(arb_entry(), 0..4),
        version in any::<bool>(),
        fold_width in prop_oneof![Just(0i32), Just(-1), 2i32..120],
    ) {
        let doc = Document::from_records(entries).with_version(version);
        let text = marshal(&doc.clone().with_fold_width(fold_width)).unwrap();
        let parsed = parse(&text).unwrap();
        prop_assert_eq!(parsed, doc);
    }
}
