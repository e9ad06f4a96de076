//! The RFC 2743 framing of an initial context token:
//! `[APPLICATION 0] IMPLICIT SEQUENCE { thisMech MechType, innerContextToken ANY }`.
use der::asn1::ObjectIdentifier;

use crate::{
    attribute::FieldMap,
    error::{EncodeError, MalformedGssToken},
    oid,
    tlv::{self, Element, WireTag},
    token::Variant,
};

/// An unwrapped GSS-API token whose mechanism has already been checked
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GssToken<'a> {
    pub mechanism: ObjectIdentifier,
    pub inner_tag: WireTag,
    pub inner_value: &'a [u8],
}

pub fn wrap(mechanism: &ObjectIdentifier, inner_tag: WireTag, inner_body: &[u8]) -> der::Result<Vec<u8>> {
    let mechanism = tlv::encode_oid(mechanism)?;
    let inner = tlv::encode(inner_tag, inner_body)?;
    tlv::encode_constructed(WireTag::GSS_TOKEN, [mechanism, inner])
}

pub fn unwrap<'a>(bytes: &'a [u8], expected: &ObjectIdentifier) -> Result<GssToken<'a>, MalformedGssToken> {
    let (outer, rest) = tlv::read_element(bytes)?;
    if !rest.is_empty() {
        return Err(MalformedGssToken::TrailingData(rest.len()));
    }
    if outer.tag != WireTag::GSS_TOKEN {
        return Err(MalformedGssToken::UnexpectedOuterTag(outer.tag));
    }
    let elements = tlv::split_elements(outer.value)?;
    let [mechanism, inner] = elements.as_slice() else {
        return Err(MalformedGssToken::InvalidElementCount(elements.len()));
    };
    if mechanism.tag != WireTag::OBJECT_IDENTIFIER {
        return Err(MalformedGssToken::InvalidGssTokenTag(mechanism.tag));
    }
    let mechanism = tlv::decode_oid(mechanism.raw)?;
    if mechanism != *expected {
        return Err(MalformedGssToken::MechanismOidMismatch(mechanism));
    }
    Ok(GssToken {
        mechanism,
        inner_tag: inner.tag,
        inner_value: inner.value,
    })
}

/// Splits the `SEQUENCE` a negotiation token alternative consists of.
pub(crate) fn body_elements(inner_value: &[u8]) -> Result<Vec<Element<'_>>, MalformedGssToken> {
    let (sequence, rest) = tlv::read_element(inner_value)?;
    if !rest.is_empty() {
        return Err(MalformedGssToken::TrailingData(rest.len()));
    }
    if sequence.tag != WireTag::SEQUENCE {
        return Err(MalformedGssToken::InvalidSequenceTag(sequence.tag));
    }
    Ok(tlv::split_elements(sequence.value)?)
}

pub(crate) fn encode_spnego(variant: &Variant, fields: &FieldMap) -> Result<Vec<u8>, EncodeError> {
    let body = variant.encode_sequence(fields)?;
    Ok(wrap(&oid::SPNEGO, variant.tag, &body)?)
}
