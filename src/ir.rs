// Emitter-facing view of a finished type graph. No TypeNode or serde_json::Value here.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::scalar::ScalarToken;
use crate::uniqueness::UniqueField;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    Scalar {
        token: ScalarToken,
        #[serde(skip_serializing_if = "Option::is_none")]
        import: Option<String>,
    },
    Named { name: String },          // a struct in `declarations`, or an imported one
    Array { element: Box<TypeRef> },
    Map { value: Box<TypeRef> },     // key is always a string
}

#[derive(Debug, Clone, Serialize)]
pub struct Declaration {
    pub name: String,                // unique within a Schema
    pub fields: Vec<FieldDecl>,      // declaration order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unique_fields: Vec<UniqueField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldDecl {
    pub key: String,                 // original key, verbatim
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    pub root: TypeRef,
    pub declarations: Vec<Declaration>,
    pub imports: BTreeSet<String>,
}

impl Schema {
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name == name)
    }
}
