//! Read-only views for walking a live schema tree.
//!
//! Reconciliation does not care about most of what a schema says. At each
//! field it needs three things: the field's [`FieldKind`], its `max_items`
//! bound, and the element beneath it, which is either a nested resource
//! (a set of named fields) or another field. These views expose exactly
//! that over [`crate::schema`] types without copying them.

use std::collections::BTreeMap;

use crate::schema::{Attribute, AttributeType, Block, BlockNestingMode, NestedBlock, Schema};

/// Coarse classification of a field's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A single value, including single nested blocks and objects.
    Scalar,
    /// An ordered collection.
    List,
    /// An unordered collection.
    Set,
    /// A string-keyed collection.
    Map,
}

impl FieldKind {
    /// Lists and sets are the only shapes that can be collapsed to a scalar.
    pub fn is_collection(self) -> bool {
        matches!(self, FieldKind::List | FieldKind::Set)
    }
}

/// A single field in the schema tree.
#[derive(Debug, Clone, Copy)]
pub enum FieldSchema<'a> {
    /// A top-level or block attribute.
    Attribute(&'a Attribute),
    /// A bare type, as found inside collections and objects.
    Type(&'a AttributeType),
    /// A nested block.
    Block(&'a NestedBlock),
}

/// A set of named fields: a resource, a block or an object type.
#[derive(Debug, Clone, Copy)]
pub enum ResourceSchema<'a> {
    /// A block with attributes and nested blocks.
    Block(&'a Block),
    /// The attributes of an object type.
    Object(&'a BTreeMap<String, AttributeType>),
}

/// What sits underneath a field.
#[derive(Debug, Clone, Copy)]
pub enum ElemSchema<'a> {
    /// A nested resource, walked field by field.
    Resource(ResourceSchema<'a>),
    /// A nested field, walked as a field.
    Field(FieldSchema<'a>),
}

impl<'a> FieldSchema<'a> {
    /// The shape of this field.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldSchema::Attribute(attr) => type_kind(&attr.attr_type),
            FieldSchema::Type(ty) => type_kind(ty),
            FieldSchema::Block(block) => match block.nesting_mode {
                BlockNestingMode::Single => FieldKind::Scalar,
                BlockNestingMode::List => FieldKind::List,
                BlockNestingMode::Set => FieldKind::Set,
                BlockNestingMode::Map => FieldKind::Map,
            },
        }
    }

    /// The declared element bound; 0 means unlimited.
    pub fn max_items(&self) -> u32 {
        match self {
            FieldSchema::Attribute(attr) => attr.max_items,
            FieldSchema::Type(_) => 0,
            FieldSchema::Block(block) => block.max_items,
        }
    }

    /// The element beneath this field, if any.
    pub fn elem(&self) -> Option<ElemSchema<'a>> {
        match *self {
            FieldSchema::Attribute(attr) => type_elem(&attr.attr_type),
            FieldSchema::Type(ty) => type_elem(ty),
            FieldSchema::Block(block) => Some(ElemSchema::Resource(ResourceSchema::Block(&block.block))),
        }
    }
}

impl<'a> ResourceSchema<'a> {
    /// All fields, sorted by name.
    pub fn fields(&self) -> Vec<(&'a str, FieldSchema<'a>)> {
        let mut fields: Vec<(&'a str, FieldSchema<'a>)> = match *self {
            ResourceSchema::Block(block) => block
                .attributes
                .iter()
                .map(|(name, attr)| (name.as_str(), FieldSchema::Attribute(attr)))
                .chain(
                    block
                        .blocks
                        .iter()
                        .map(|(name, nested)| (name.as_str(), FieldSchema::Block(nested))),
                )
                .collect(),
            ResourceSchema::Object(attrs) => attrs
                .iter()
                .map(|(name, ty)| (name.as_str(), FieldSchema::Type(ty)))
                .collect(),
        };
        fields.sort_by(|a, b| a.0.cmp(b.0));
        fields
    }
}

impl<'a> From<&'a Schema> for ResourceSchema<'a> {
    fn from(schema: &'a Schema) -> Self {
        ResourceSchema::Block(&schema.block)
    }
}

fn type_kind(ty: &AttributeType) -> FieldKind {
    match ty {
        AttributeType::List(_) => FieldKind::List,
        AttributeType::Set(_) => FieldKind::Set,
        AttributeType::Map(_) => FieldKind::Map,
        _ => FieldKind::Scalar,
    }
}

fn type_elem(ty: &AttributeType) -> Option<ElemSchema<'_>> {
    match ty {
        AttributeType::List(elem) | AttributeType::Set(elem) | AttributeType::Map(elem) => {
            Some(match elem.as_ref() {
                AttributeType::Object(attrs) => ElemSchema::Resource(ResourceSchema::Object(attrs)),
                other => ElemSchema::Field(FieldSchema::Type(other)),
            })
        },
        AttributeType::Object(attrs) => Some(ElemSchema::Resource(ResourceSchema::Object(attrs))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Attribute;

    #[test]
    fn test_attribute_kinds() {
        let list = Attribute::optional_list(AttributeType::String).with_max_items(1);
        let field = FieldSchema::Attribute(&list);
        assert_eq!(field.kind(), FieldKind::List);
        assert_eq!(field.max_items(), 1);
        assert!(matches!(field.elem(), Some(ElemSchema::Field(FieldSchema::Type(AttributeType::String)))));

        let scalar = Attribute::required_string();
        let field = FieldSchema::Attribute(&scalar);
        assert_eq!(field.kind(), FieldKind::Scalar);
        assert!(field.elem().is_none());
    }

    #[test]
    fn test_collection_of_objects_is_resource_elem() {
        let ty = AttributeType::set(AttributeType::object([("inner", AttributeType::Bool)]));
        let field = FieldSchema::Type(&ty);
        assert_eq!(field.kind(), FieldKind::Set);
        match field.elem() {
            Some(ElemSchema::Resource(res)) => {
                let names: Vec<_> = res.fields().into_iter().map(|(n, _)| n).collect();
                assert_eq!(names, vec!["inner"]);
            },
            other => panic!("expected resource elem, got {:?}", other),
        }
    }

    #[test]
    fn test_block_kinds() {
        let single = NestedBlock::single(Block::new());
        assert_eq!(FieldSchema::Block(&single).kind(), FieldKind::Scalar);
        assert!(matches!(
            FieldSchema::Block(&single).elem(),
            Some(ElemSchema::Resource(ResourceSchema::Block(_)))
        ));

        let list = NestedBlock::list(Block::new()).with_max_items(1);
        assert_eq!(FieldSchema::Block(&list).kind(), FieldKind::List);
        assert_eq!(FieldSchema::Block(&list).max_items(), 1);
    }

    #[test]
    fn test_fields_are_sorted_across_attributes_and_blocks() {
        let schema = Schema::v0()
            .with_attribute("zone", Attribute::optional_string())
            .with_block("alpha", NestedBlock::list(Block::new()))
            .with_attribute("beta", Attribute::optional_string());

        let names: Vec<_> = ResourceSchema::from(&schema)
            .fields()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["alpha", "beta", "zone"]);
    }

    #[test]
    fn test_is_collection() {
        assert!(FieldKind::List.is_collection());
        assert!(FieldKind::Set.is_collection());
        assert!(!FieldKind::Map.is_collection());
        assert!(!FieldKind::Scalar.is_collection());
    }
}
