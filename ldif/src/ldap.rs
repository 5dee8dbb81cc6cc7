//! Conversions between LDIF records and `ldap3` request shapes.
//!
//! `ldap3` hands out attributes in hash maps and sets, so values coming from
//! it are sorted to keep the generated LDIF deterministic.

use std::collections::HashSet;
use std::hash::Hash;

use ldap3::{Mod, SearchEntry};

use crate::data::{
    AddRecord, Attribute, Attributes, Dn, Entry, ModOp, Modification, ModifyRecord, Record,
};
use crate::error::{LdifError, Result};

impl From<SearchEntry> for Entry {
    fn from(se: SearchEntry) -> Entry {
        let mut attributes: Vec<Attribute> = se
            .attrs
            .into_iter()
            .map(|(name, values)| Attribute {
                name,
                values: values.into_iter().map(String::into_bytes).collect(),
            })
            .collect();
        attributes.extend(
            se.bin_attrs
                .into_iter()
                .map(|(name, values)| Attribute { name, values }),
        );
        attributes.sort_by(|a, b| a.name.cmp(&b.name));

        Entry {
            dn: se.dn.into(),
            attributes: attributes.into_iter().collect(),
        }
    }
}

impl From<SearchEntry> for Record {
    fn from(se: SearchEntry) -> Record {
        Record::Content(se.into())
    }
}

fn attr_name<S: AsRef<[u8]>>(name: &S) -> Result<String> {
    String::from_utf8(name.as_ref().to_vec()).map_err(|_| {
        LdifError::UnsupportedRecordShape("attribute name is not valid UTF-8".to_string())
    })
}

fn sorted_values<S: AsRef<[u8]>>(set: HashSet<S>) -> Vec<Vec<u8>> {
    let mut values: Vec<Vec<u8>> = set.into_iter().map(|v| v.as_ref().to_vec()).collect();
    values.sort();
    values
}

fn value_set(values: &[Vec<u8>]) -> HashSet<Vec<u8>> {
    values.iter().cloned().collect()
}

impl AddRecord {
    /// Build an add record from the argument shape of `Ldap::add`.
    pub fn from_ldap_attrs<S>(
        dn: impl Into<Dn>,
        attrs: Vec<(S, HashSet<S>)>,
    ) -> Result<AddRecord>
    where
        S: AsRef<[u8]> + Eq + Hash,
    {
        let mut attributes = Attributes::new();
        for (name, values) in attrs {
            attributes.extend_values(&attr_name(&name)?, sorted_values(values));
        }
        Ok(AddRecord {
            dn: dn.into(),
            attributes,
        })
    }

    /// Attributes in the argument shape of `Ldap::add`.
    pub fn to_ldap_attrs(&self) -> Result<Vec<(Vec<u8>, HashSet<Vec<u8>>)>> {
        self.attributes
            .iter()
            .map(|a| {
                if a.values.is_empty() {
                    return Err(LdifError::EmptyValueList {
                        dn: self.dn.to_string(),
                        attr: a.name.clone(),
                    });
                }
                Ok((a.name.clone().into_bytes(), value_set(&a.values)))
            })
            .collect()
    }
}

impl ModifyRecord {
    /// Build a modify record from `ldap3` modifications.
    ///
    /// `Mod::Increment` has no counterpart here and is rejected.
    pub fn from_ldap_mods<S>(dn: impl Into<Dn>, mods: Vec<Mod<S>>) -> Result<ModifyRecord>
    where
        S: AsRef<[u8]> + Eq + Hash,
    {
        let dn: Dn = dn.into();
        let mut out = Vec::with_capacity(mods.len());
        for m in mods {
            let (op, attr, values) = match m {
                Mod::Add(attr, values) => (ModOp::Add, attr, values),
                Mod::Delete(attr, values) => (ModOp::Delete, attr, values),
                Mod::Replace(attr, values) => (ModOp::Replace, attr, values),
                Mod::Increment(attr, _) => {
                    return Err(LdifError::UnsupportedRecordShape(format!(
                        "{}: increment of {:?} cannot be expressed",
                        dn,
                        String::from_utf8_lossy(attr.as_ref())
                    )));
                }
            };
            out.push(Modification {
                op,
                attr: attr_name(&attr)?,
                values: sorted_values(values),
            });
        }
        Ok(ModifyRecord { dn, mods: out })
    }

    /// Modifications in the argument shape of `Ldap::modify`.
    pub fn to_ldap_mods(&self) -> Vec<Mod<Vec<u8>>> {
        self.mods
            .iter()
            .map(|m| {
                let attr = m.attr.clone().into_bytes();
                let values = value_set(&m.values);
                match m.op {
                    ModOp::Add => Mod::Add(attr, values),
                    ModOp::Delete => Mod::Delete(attr, values),
                    ModOp::Replace => Mod::Replace(attr, values),
                }
            })
            .collect()
    }
}
