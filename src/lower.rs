use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::ir::{Declaration, FieldDecl, Schema, TypeRef};
use crate::node::{StructType, TypeNode};
use crate::uniqueness::unique_fields;

/// Flatten a finished type graph into declarations for an emitter.
///
/// `records` are the raw elements of a top-level array; when the root is an
/// array of generated structs they feed the uniqueness analysis.
pub fn lower_to_ir(root: &TypeNode, records: Option<&[Value]>) -> Schema {
    let mut lw = Lowerer::default();
    let root_ref = lw.lower(root);

    if let (Some(records), TypeNode::Array(arr)) = (records, root) {
        if let (TypeNode::Struct(s), TypeRef::Array { element }) = (&*arr.element, &root_ref) {
            if let TypeRef::Named { name } = &**element {
                let found = unique_fields(s, records);
                if let Some(decl) = lw.declarations.iter_mut().find(|d| &d.name == name) {
                    decl.unique_fields = found;
                }
            }
        }
    }

    Schema {
        root: root_ref,
        declarations: lw.declarations,
        imports: root.imports(),
    }
}

#[derive(Default)]
struct Lowerer {
    declarations: Vec<Declaration>,
    declared: HashMap<String, Vec<(StructType, String)>>, // wanted name → (shape, final name)
    taken: HashSet<String>,
}

impl Lowerer {
    fn lower(&mut self, node: &TypeNode) -> TypeRef {
        match node {
            TypeNode::Scalar(s) => TypeRef::Scalar { token: s.token, import: s.import.clone() },
            TypeNode::Array(a) => TypeRef::Array { element: Box::new(self.lower(&a.element)) },
            TypeNode::Map(m) => TypeRef::Map { value: Box::new(self.lower(&m.value)) },
            TypeNode::Struct(s) if s.import.is_some() => TypeRef::Named { name: s.name.clone() },
            TypeNode::Struct(s) => TypeRef::Named { name: self.declare(s) },
        }
    }

    /// Identical structs under one name share a declaration; different
    /// structs under one name get numeric suffixes.
    fn declare(&mut self, s: &StructType) -> String {
        if let Some((_, name)) = self
            .declared
            .get(&s.name)
            .and_then(|seen| seen.iter().find(|(shape, _)| shape == s))
        {
            return name.clone();
        }

        let name = self.fresh_name(&s.name);
        self.declared.entry(s.name.clone()).or_default().push((s.clone(), name.clone()));

        // parent before children
        let slot = self.declarations.len();
        self.declarations.push(Declaration {
            name: name.clone(),
            fields: Vec::new(),
            unique_fields: Vec::new(),
        });
        let fields = s
            .fields
            .values()
            .map(|f| FieldDecl { key: f.key.clone(), ty: self.lower(&f.ty) })
            .collect();
        self.declarations[slot].fields = fields;
        name
    }

    fn fresh_name(&mut self, wanted: &str) -> String {
        let mut name = wanted.to_string();
        let mut n = 2;
        while self.taken.contains(&name) {
            name = format!("{wanted}{n}");
            n += 1;
        }
        self.taken.insert(name.clone());
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::{Scalar, ScalarToken};
    use serde_json::json;

    fn strukt(name: &str, fields: &[(&str, TypeNode)]) -> StructType {
        let mut s = StructType::new(name);
        for (k, t) in fields {
            s.insert(*k, t.clone());
        }
        s
    }

    #[test]
    fn declarations_parent_first_in_field_order() {
        let inner = strukt("RootMeta", &[("tag", Scalar::string().into())]);
        let root = strukt("Root", &[("z", Scalar::bool().into()), ("meta", inner.into())]);
        let schema = lower_to_ir(&root.into(), None);

        assert_eq!(schema.root, TypeRef::Named { name: "Root".into() });
        let names: Vec<_> = schema.declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Root", "RootMeta"]);
        let keys: Vec<_> = schema.declarations[0].fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["z", "meta"]);
    }

    #[test]
    fn shared_and_conflicting_names() {
        let a = strukt("Addr", &[("street", Scalar::string().into())]);
        let b = strukt("Addr", &[("zip", Scalar::float64().into())]);
        let root = strukt("Root", &[
            ("home", a.clone().into()),
            ("work", a.into()),
            ("other", b.into()),
        ]);
        let schema = lower_to_ir(&root.into(), None);
        let names: Vec<_> = schema.declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Root", "Addr", "Addr2"]);
        let other = &schema.declaration("Root").unwrap().fields[2].ty;
        assert_eq!(other, &TypeRef::Named { name: "Addr2".into() });
    }

    #[test]
    fn imported_structs_are_referenced_not_declared() {
        let remote = strukt("Address", &[("street", Scalar::string().into())]).with_import("models");
        let ts: TypeNode = Scalar::imported(ScalarToken::Timestamp, "time").into();
        let root = strukt("Root", &[("ship_to", remote.into()), ("at", ts)]);
        let schema = lower_to_ir(&root.into(), None);
        assert_eq!(schema.declarations.len(), 1);
        assert_eq!(schema.imports.iter().collect::<Vec<_>>(), vec!["models", "time"]);
    }

    #[test]
    fn unique_fields_attach_to_root_records() {
        let row = strukt("RootItem", &[("id", Scalar::string().into()), ("group", Scalar::string().into())]);
        let records = json!([{"id": "a", "group": "g"}, {"id": "b", "group": "g"}]);
        let schema = lower_to_ir(&TypeNode::array_of(row.into()), records.as_array().map(Vec::as_slice));
        let decl = schema.declaration("RootItem").unwrap();
        assert_eq!(decl.unique_fields.len(), 1);
        assert_eq!(decl.unique_fields[0].key, "id");
    }

    #[test]
    fn maps_lower_to_map_refs() {
        let node = TypeNode::map_of(strukt("Item", &[("x", Scalar::string().into())]).into());
        let schema = lower_to_ir(&node, None);
        assert_eq!(schema.root, TypeRef::Map { value: Box::new(TypeRef::Named { name: "Item".into() }) });
    }
}
