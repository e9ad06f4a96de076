use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::{
    attribute::{AttributeSchema, FieldMap},
    error::{EncodeError, MalformedGssToken},
    tlv::{Element, WireTag},
};

/// Validates the elements of a negotiation token body against `schemas` and decodes them by field name.
///
/// Elements must carry known tags, appear at most once and in strictly ascending tag order, and every required
/// schema must be matched.
pub fn decode(elements: &[Element<'_>], schemas: &[AttributeSchema]) -> Result<FieldMap, MalformedGssToken> {
    let by_tag: BTreeMap<WireTag, &AttributeSchema> = schemas.iter().map(|schema| (schema.tag, schema)).collect();
    let mut fields = FieldMap::new();
    let mut observed = BTreeSet::new();
    let mut previous: Option<WireTag> = None;
    for element in elements {
        let tag = element.tag;
        let Some(schema) = by_tag.get(&tag) else {
            return Err(MalformedGssToken::InvalidAttributeTag(tag));
        };
        if observed.contains(&tag) {
            return Err(MalformedGssToken::DuplicateAttribute(tag));
        }
        if previous.is_some_and(|previous| tag <= previous) {
            return Err(MalformedGssToken::OutOfOrderAttribute(tag));
        }
        let value = (schema.decode)(element.value)
            .map_err(|source| MalformedGssToken::AttributeDecodeError { tag, source })?;
        trace!(%tag, name = schema.name, "decoded attribute");
        fields.insert(schema.name, value);
        observed.insert(tag);
        previous = Some(tag);
    }
    let required = required_tags(schemas);
    if !required.is_subset(&observed) {
        return Err(MalformedGssToken::MissingRequiredAttributes { observed, required });
    }
    Ok(fields)
}

/// Encodes the fields present in `values` in ascending tag order. Absent optional fields are skipped.
pub fn encode(values: &FieldMap, schemas: &[AttributeSchema]) -> Result<Vec<(WireTag, Vec<u8>)>, EncodeError> {
    let mut ordered: Vec<&AttributeSchema> = schemas.iter().collect();
    ordered.sort_by_key(|schema| schema.tag);

    let present: BTreeSet<WireTag> = ordered
        .iter()
        .filter(|schema| values.contains_key(schema.name))
        .map(|schema| schema.tag)
        .collect();
    let required = required_tags(schemas);
    if !required.is_subset(&present) {
        return Err(EncodeError::MissingRequiredAttributes { present, required });
    }

    ordered
        .into_iter()
        .filter_map(|schema| values.get(schema.name).map(|value| (schema, value)))
        .map(|(schema, value)| {
            (schema.encode)(value)
                .map(|bytes| (schema.tag, bytes))
                .map_err(|source| EncodeError::Attribute { tag: schema.tag, source })
        })
        .collect()
}

fn required_tags(schemas: &[AttributeSchema]) -> BTreeSet<WireTag> {
    schemas
        .iter()
        .filter(|schema| schema.required)
        .map(|schema| schema.tag)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        attribute::{FieldValue, decode_octets, encode_octets},
        error::ValueError,
    };

    const SCHEMAS: [AttributeSchema; 3] = [
        AttributeSchema {
            tag: WireTag::context(0),
            name: "first",
            required: true,
            decode: decode_octets,
            encode: encode_octets,
        },
        AttributeSchema {
            tag: WireTag::context(1),
            name: "second",
            required: false,
            decode: decode_octets,
            encode: encode_octets,
        },
        AttributeSchema {
            tag: WireTag::context(2),
            name: "third",
            required: false,
            decode: decode_octets,
            encode: encode_octets,
        },
    ];
    const OCTETS: &[u8] = &[0x04, 0x01, 0x2A];

    fn element(tag: WireTag, value: &[u8]) -> Element<'_> {
        Element { tag, value, raw: value }
    }

    #[test]
    fn decodes_fields_by_name() {
        let elements = [element(WireTag::context(0), OCTETS), element(WireTag::context(2), OCTETS)];
        let fields = decode(&elements, &SCHEMAS).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["first"], FieldValue::Bytes(vec![0x2A]));
        assert_eq!(fields["third"], FieldValue::Bytes(vec![0x2A]));
    }

    #[test]
    fn unknown_tag() {
        let elements = [element(WireTag::context(0), OCTETS), element(WireTag::context(7), OCTETS)];
        assert_eq!(
            decode(&elements, &SCHEMAS),
            Err(MalformedGssToken::InvalidAttributeTag(WireTag::context(7)))
        );
    }

    #[test]
    fn repeated_tag_is_a_duplicate_not_out_of_order() {
        let elements = [
            element(WireTag::context(0), OCTETS),
            element(WireTag::context(1), OCTETS),
            element(WireTag::context(0), OCTETS),
        ];
        assert_eq!(
            decode(&elements, &SCHEMAS),
            Err(MalformedGssToken::DuplicateAttribute(WireTag::context(0)))
        );
    }

    #[test]
    fn descending_tags() {
        let elements = [
            element(WireTag::context(0), OCTETS),
            element(WireTag::context(2), OCTETS),
            element(WireTag::context(1), OCTETS),
        ];
        assert_eq!(
            decode(&elements, &SCHEMAS),
            Err(MalformedGssToken::OutOfOrderAttribute(WireTag::context(1)))
        );
    }

    #[test]
    fn missing_required_reports_both_sets() {
        let elements = [element(WireTag::context(1), OCTETS)];
        let Err(MalformedGssToken::MissingRequiredAttributes { observed, required }) = decode(&elements, &SCHEMAS)
        else {
            panic!("expected missing attributes");
        };
        assert_eq!(observed, BTreeSet::from([WireTag::context(1)]));
        assert_eq!(required, BTreeSet::from([WireTag::context(0)]));
    }

    #[test]
    fn value_errors_carry_the_tag() {
        let elements = [element(WireTag::context(0), &[0x05, 0x00])];
        let Err(MalformedGssToken::AttributeDecodeError { tag, source }) = decode(&elements, &SCHEMAS) else {
            panic!("expected a decode error");
        };
        assert_eq!(tag, WireTag::context(0));
        assert!(matches!(source, ValueError::Der(_)));
    }

    #[test]
    fn encodes_in_tag_order_and_skips_absent() {
        let values = FieldMap::from([
            ("third", FieldValue::Bytes(vec![3])),
            ("first", FieldValue::Bytes(vec![1])),
        ]);
        let encoded = encode(&values, &SCHEMAS).unwrap();
        assert_eq!(
            encoded,
            vec![
                (WireTag::context(0), vec![0x04, 0x01, 0x01]),
                (WireTag::context(2), vec![0x04, 0x01, 0x03]),
            ]
        );
    }

    #[test]
    fn encode_requires_required_fields() {
        let values = FieldMap::from([("second", FieldValue::Bytes(vec![2]))]);
        assert!(matches!(
            encode(&values, &SCHEMAS),
            Err(EncodeError::MissingRequiredAttributes { .. })
        ));
    }

    #[test]
    fn encode_rejects_wrong_kind() {
        let values = FieldMap::from([("first", FieldValue::Mech(crate::oid::KRB5))]);
        assert_eq!(
            encode(&values, &SCHEMAS),
            Err(EncodeError::Attribute {
                tag: WireTag::context(0),
                source: ValueError::WrongFieldKind("octet string"),
            })
        );
    }
}
