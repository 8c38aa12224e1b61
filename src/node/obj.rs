use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::TypeNode;
use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructType {
    pub name: String,
    /// Set for structs declared outside the generated output (seeded types).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<String>,
    /// Keyed by original key, in declaration order.
    pub fields: IndexMap<String, Field>,
    /// Name segment appended to the parent's name when this struct was
    /// found under a key. Stripped again on map promotion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(rename = "type")]
    pub ty: TypeNode,
    pub key: String,
}

impl StructType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            import: None,
            fields: IndexMap::new(),
            discriminator: None,
        }
    }

    #[must_use]
    pub fn with_discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.discriminator = Some(discriminator.into());
        self
    }

    #[must_use]
    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.import = Some(import.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, ty: TypeNode) {
        let key = key.into();
        self.fields.insert(key.clone(), Field { ty, key });
    }

    pub fn field(&self, key: &str) -> Option<&TypeNode> {
        self.fields.get(key).map(|f| &f.ty)
    }

    pub(super) fn same_fields(&self, other: &Self) -> bool {
        if self.fields.len() != other.fields.len() {
            return false;
        }
        self.fields.iter().all(|(k, f)| {
            other.fields.get(k).is_some_and(|o| f.ty.same_type(&o.ty))
        })
    }

    pub(super) fn unify(&self, other: &Self) -> Option<Self> {
        let mut out = self.clone();
        for (k, fb) in &other.fields {
            match out.fields.get_mut(k) {
                Some(fa) => fa.ty = fa.ty.unify(&fb.ty)?,
                None => { out.fields.insert(k.clone(), fb.clone()); }
            }
        }
        out.adopt_name(&other.name, other.import.as_deref(), other.discriminator.as_deref());
        Some(out)
    }

    pub(super) fn merge(&mut self, other: Self) -> Result<()> {
        let StructType { name, import, fields, discriminator } = other;
        // add keys only in other, merge shared ones
        for (k, fb) in fields {
            match self.fields.get_mut(&k) {
                Some(fa) => fa.ty.merge(fb.ty)?,
                None => { self.fields.insert(k, fb); }
            }
        }
        self.adopt_name(&name, import.as_deref(), discriminator.as_deref());
        Ok(())
    }

    /// Naming after a merge with `other`:
    /// - a generated name beats an imported one,
    /// - an imported right operand always wins,
    /// - between two generated names the lexicographically smallest wins.
    fn adopt_name(&mut self, name: &str, import: Option<&str>, discriminator: Option<&str>) {
        let take = match (self.import.is_some(), import.is_some()) {
            (_, true) => true,
            (true, false) => true,
            (false, false) => name < self.name.as_str(),
        };
        if take {
            self.name = name.to_string();
            self.import = import.map(str::to_string);
            self.discriminator = discriminator.map(str::to_string);
        }
    }

    pub(super) fn rename_prefix(&mut self, from: &[String], to: &str) {
        if self.import.is_some() {
            return;
        }
        let renamed = from
            .iter()
            .filter_map(|p| self.name.strip_prefix(p.as_str()).map(|rest| (p.len(), rest)))
            .max_by_key(|(len, _)| *len)
            .map(|(_, rest)| format!("{to}{rest}"));
        if let Some(renamed) = renamed.filter(|n| !n.is_empty()) {
            self.name = renamed;
        }
        for f in self.fields.values_mut() {
            f.ty.rename_prefix(from, to);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::Scalar;

    #[test]
    fn generated_name_beats_imported() {
        let mut seeded = StructType::new("Remote").with_import("models");
        seeded.insert("a", Scalar::string().into());
        let mut local = StructType::new("Zed");
        local.insert("a", Scalar::string().into());

        seeded.merge(local).unwrap();
        assert_eq!(seeded.name, "Zed");
        assert!(seeded.import.is_none());
    }

    #[test]
    fn imported_right_operand_wins() {
        let mut local = StructType::new("Alpha");
        let seeded = StructType::new("Remote").with_import("models");
        local.merge(seeded).unwrap();
        assert_eq!(local.name, "Remote");
        assert_eq!(local.import.as_deref(), Some("models"));
    }

    #[test]
    fn smallest_name_carries_its_discriminator() {
        let mut a = StructType::new("Items2").with_discriminator("2");
        let b = StructType::new("Items1").with_discriminator("1");
        a.merge(b).unwrap();
        assert_eq!(a.name, "Items1");
        assert_eq!(a.discriminator.as_deref(), Some("1"));
    }

    #[test]
    fn rename_prefix_reaches_nested_structs_but_not_imports() {
        let mut inner = StructType::new("Items1Value");
        inner.insert("x", Scalar::string().into());
        let remote = StructType::new("Items1Remote").with_import("ext");
        let mut outer = StructType::new("Items1");
        outer.insert("value", TypeNode::array_of(inner.into()));
        outer.insert("remote", remote.into());

        let mut node = TypeNode::Struct(outer);
        node.rename_prefix(&["Items1".to_string()], "Items");
        let s = node.as_struct().unwrap();
        assert_eq!(s.name, "Items");
        assert_eq!(s.fields["value"].ty.underlying_struct().unwrap().name, "ItemsValue");
        assert_eq!(s.fields["remote"].ty.as_struct().unwrap().name, "Items1Remote");
    }

    #[test]
    fn longest_sibling_prefix_wins() {
        let mut inner = StructType::new("Root10V");
        inner.insert("a", Scalar::string().into());
        let mut node = TypeNode::Struct(inner);
        node.rename_prefix(&["Root1".to_string(), "Root10".to_string()], "Root");
        assert_eq!(node.display_name(), "RootV");
    }
}
