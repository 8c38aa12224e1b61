//! Cleanup pass: post-order rewrite that promotes uniform structs to maps.
//!
//! A struct whose fields all unify into one representative type, and whose
//! keys look like ids (or whose values are all composite), is really a
//! dictionary: `{"1": {...}, "2": {...}}` becomes `Map<...>`.
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::naming;
use crate::node::{StructType, TypeNode};

// ------------------------------- Policy ---------------------------------- //

pub trait PromotionPolicy: Send + Sync {
    /// Whether a struct key looks like an identifier rather than a name.
    fn is_valid_id(&self, key: &str) -> bool {
        key.parse::<i64>().is_ok()
    }

    fn should_promote_to_map(
        &self,
        s: &StructType,
        all_complex: bool,
        all_ids: bool,
        representative: Option<&TypeNode>,
    ) -> bool {
        let Some(representative) = representative else { return false };
        if representative.is_any() {
            return false;
        }
        if !all_complex && !all_ids {
            return false;
        }
        // a single scalar-valued id key is not enough evidence
        s.fields.len() >= 2 || all_complex
    }
}

/// Integer-literal keys, composite-or-id threshold.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultPromotionPolicy;

impl PromotionPolicy for DefaultPromotionPolicy {}

/// Never promotes.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPromotion;

impl PromotionPolicy for NoPromotion {
    fn should_promote_to_map(&self, _: &StructType, _: bool, _: bool, _: Option<&TypeNode>) -> bool {
        false
    }
}

// ------------------------------- Cleaner --------------------------------- //

#[derive(Clone)]
pub struct Cleaner {
    policy: Arc<dyn PromotionPolicy>,
}

impl fmt::Debug for Cleaner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cleaner").finish_non_exhaustive()
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new(Arc::new(DefaultPromotionPolicy))
    }
}

impl Cleaner {
    pub fn new(policy: Arc<dyn PromotionPolicy>) -> Self {
        Self { policy }
    }

    /// Clean children first, then consider promoting `node` itself.
    /// A top-level map is derived output and fails fast.
    pub fn cleanup(&self, node: TypeNode) -> Result<TypeNode> {
        match node {
            TypeNode::Map(_) => Err(Error::CleanupNotSupportedOnDerivedType),
            node => self.clean(node),
        }
    }

    /// Nested maps and imported structs come from seeded types and are
    /// already final.
    fn clean(&self, node: TypeNode) -> Result<TypeNode> {
        match node {
            TypeNode::Scalar(_) | TypeNode::Map(_) => Ok(node),
            TypeNode::Struct(s) if s.import.is_some() => Ok(TypeNode::Struct(s)),
            TypeNode::Array(mut arr) => {
                let element = std::mem::replace(&mut *arr.element, TypeNode::any());
                *arr.element = self.clean(element)?;
                Ok(TypeNode::Array(arr))
            }
            TypeNode::Struct(s) => self.cleanup_struct(s),
        }
    }

    fn cleanup_struct(&self, mut s: StructType) -> Result<TypeNode> {
        for field in s.fields.values_mut() {
            let ty = std::mem::replace(&mut field.ty, TypeNode::any());
            field.ty = self.clean(ty)?;
        }

        if s.fields.is_empty() {
            return Ok(TypeNode::Struct(s));
        }

        let all_complex = s.fields.values().all(|f| f.ty.is_composite());
        let all_ids = s.fields.values().all(|f| self.policy.is_valid_id(&f.key));
        let representative = representative(&s);

        if !self.policy.should_promote_to_map(&s, all_complex, all_ids, representative.as_ref()) {
            return Ok(TypeNode::Struct(s));
        }
        let Some(mut value) = representative else {
            return Ok(TypeNode::Struct(s));
        };

        // the representative may carry names from any sibling key
        let prefixes: Vec<String> = s
            .fields
            .keys()
            .map(|key| naming::child_name(&s.name, key).0)
            .collect();
        value.rename_prefix(&prefixes, &s.name);
        if let Some(v) = value.as_struct_mut() {
            v.discriminator = None;
        }

        tracing::debug!(
            container = %s.name,
            fields = s.fields.len(),
            value = %value.display_name(),
            "promoted struct to map"
        );
        Ok(TypeNode::map_of(value))
    }
}

/// Forgiving union of every field type, or `None` if two fields disagree.
fn representative(s: &StructType) -> Option<TypeNode> {
    let mut fields = s.fields.values();
    let mut tracker = fields.next()?.ty.clone();
    for f in fields {
        if !tracker.same_type_forgiving(&f.ty) {
            return None;
        }
    }
    Some(tracker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::Scalar;

    fn row(name: &str, disc: &str) -> TypeNode {
        let mut s = StructType::new(name).with_discriminator(disc);
        s.insert("x", Scalar::string().into());
        s.into()
    }

    #[test]
    fn id_keyed_identical_structs_become_map() {
        let mut s = StructType::new("Catalog");
        s.insert("1", row("Catalog1", "1"));
        s.insert("2", row("Catalog2", "2"));

        let out = Cleaner::default().cleanup(s.into()).unwrap();
        let TypeNode::Map(m) = out else { panic!("expected map, got {out:?}") };
        let value = m.value.as_struct().unwrap();
        assert_eq!(value.name, "Catalog");
        assert_eq!(value.fields.len(), 1);
        assert!(value.fields.contains_key("x"));
    }

    #[test]
    fn mixed_scalar_fields_stay_struct() {
        let mut s = StructType::new("Pair");
        s.insert("a", Scalar::string().into());
        s.insert("b", Scalar::float64().into());
        let before = TypeNode::Struct(s.clone());
        let out = Cleaner::default().cleanup(s.into()).unwrap();
        assert_eq!(out, before);
    }

    #[test]
    fn uniform_named_scalars_stay_struct() {
        let mut s = StructType::new("Person");
        s.insert("first", Scalar::string().into());
        s.insert("last", Scalar::string().into());
        let out = Cleaner::default().cleanup(s.into()).unwrap();
        assert!(matches!(out, TypeNode::Struct(_)));
    }

    #[test]
    fn id_keyed_scalars_need_two_fields() {
        let mut one = StructType::new("One");
        one.insert("7", Scalar::string().into());
        assert!(matches!(Cleaner::default().cleanup(one.into()).unwrap(), TypeNode::Struct(_)));

        let mut two = StructType::new("Two");
        two.insert("7", Scalar::string().into());
        two.insert("8", Scalar::string().into());
        let out = Cleaner::default().cleanup(two.into()).unwrap();
        assert_eq!(out, TypeNode::map_of(Scalar::string().into()));
    }

    #[test]
    fn single_complex_field_promotes() {
        let mut s = StructType::new("Box");
        s.insert("anything", row("BoxAnything", "Anything"));
        let out = Cleaner::default().cleanup(s.into()).unwrap();
        let TypeNode::Map(m) = out else { panic!("expected map") };
        assert_eq!(m.value.display_name(), "Box");
    }

    #[test]
    fn any_representative_blocks_promotion() {
        let mut s = StructType::new("Nulls");
        s.insert("1", TypeNode::any());
        s.insert("2", TypeNode::any());
        assert!(matches!(Cleaner::default().cleanup(s.into()).unwrap(), TypeNode::Struct(_)));
    }

    #[test]
    fn promotion_widens_representative() {
        let mut a = StructType::new("Users1").with_discriminator("1");
        a.insert("name", Scalar::string().into());
        let mut b = StructType::new("Users2").with_discriminator("2");
        b.insert("email", Scalar::string().into());
        let mut s = StructType::new("Users");
        s.insert("1", a.into());
        s.insert("2", b.into());

        let TypeNode::Map(m) = Cleaner::default().cleanup(s.into()).unwrap() else { panic!() };
        let v = m.value.as_struct().unwrap();
        assert_eq!(v.fields.len(), 2);
        assert_eq!(v.name, "Users");
    }

    #[test]
    fn children_are_cleaned_first() {
        let mut inner = StructType::new("OuterById");
        inner.insert("10", row("OuterById10", "10"));
        inner.insert("11", row("OuterById11", "11"));
        let mut outer = StructType::new("Outer");
        outer.insert("by_id", inner.into());
        outer.insert("label", Scalar::string().into());

        let out = Cleaner::default().cleanup(TypeNode::array_of(outer.into())).unwrap();
        let s = out.underlying_struct().unwrap();
        assert!(matches!(s.fields["by_id"].ty, TypeNode::Map(_)));
        assert_eq!(s.fields["by_id"].ty.underlying_struct().unwrap().name, "OuterById");
    }

    #[test]
    fn cleanup_is_idempotent_on_unpromotable_structs() {
        let mut s = StructType::new("Person");
        s.insert("name", Scalar::string().into());
        s.insert("age", Scalar::float64().into());
        let cleaner = Cleaner::default();
        let once = cleaner.cleanup(s.into()).unwrap();
        let twice = cleaner.cleanup(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn maps_are_rejected() {
        let err = Cleaner::default().cleanup(TypeNode::map_of(Scalar::string().into())).unwrap_err();
        assert!(matches!(err, Error::CleanupNotSupportedOnDerivedType));
    }

    #[test]
    fn nested_maps_and_imported_structs_pass_through() {
        let mut owner = StructType::new("ShopOwner");
        owner.insert("by_id", TypeNode::map_of(row("ShopOwnerById", "ById")));
        owner.insert("label", Scalar::string().into());
        let mut remote = StructType::new("Remote").with_import("models");
        remote.insert("1", row("Remote1", "1"));
        remote.insert("2", row("Remote2", "2"));
        let mut shop = StructType::new("Shop");
        shop.insert("owner", owner.clone().into());
        shop.insert("remote", remote.clone().into());
        shop.insert("n", Scalar::float64().into());

        let out = Cleaner::default().cleanup(shop.into()).unwrap();
        let s = out.as_struct().unwrap();
        assert_eq!(s.field("owner"), Some(&TypeNode::from(owner)));
        assert_eq!(s.field("remote"), Some(&TypeNode::from(remote)));
    }

    #[test]
    fn renaming_strips_every_sibling_prefix() {
        // "Root10V" wins the name tie-break over "Root1V"
        let mut v1 = StructType::new("Root1V").with_discriminator("V");
        v1.insert("a", Scalar::string().into());
        let mut v10 = StructType::new("Root10V").with_discriminator("V");
        v10.insert("a", Scalar::string().into());
        v10.insert("b", Scalar::string().into());

        let mut one = StructType::new("Root1").with_discriminator("1");
        one.insert("v", v1.into());
        one.insert("k", Scalar::string().into());
        let mut ten = StructType::new("Root10").with_discriminator("10");
        ten.insert("v", v10.into());
        ten.insert("k", Scalar::string().into());
        let mut root = StructType::new("Root");
        root.insert("1", one.into());
        root.insert("10", ten.into());

        let TypeNode::Map(m) = Cleaner::default().cleanup(root.into()).unwrap() else { panic!() };
        let value = m.value.as_struct().unwrap();
        assert_eq!(value.name, "Root");
        assert_eq!(value.field("v").unwrap().display_name(), "RootV");
    }

    #[test]
    fn custom_policy_hooks() {
        struct Letters;
        impl PromotionPolicy for Letters {
            fn is_valid_id(&self, key: &str) -> bool {
                key.len() == 1
            }
        }
        let mut s = StructType::new("Grades");
        s.insert("a", Scalar::float64().into());
        s.insert("b", Scalar::float64().into());
        let out = Cleaner::new(Arc::new(Letters)).cleanup(s.clone().into()).unwrap();
        assert!(matches!(out, TypeNode::Map(_)));

        let out = Cleaner::new(Arc::new(NoPromotion)).cleanup(s.into()).unwrap();
        assert!(matches!(out, TypeNode::Struct(_)));
    }
}
