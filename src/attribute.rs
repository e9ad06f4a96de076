use std::collections::BTreeMap;

use bitflags::bitflags;
use der::{Decode, Encode, Enumerated, ErrorKind, asn1::ObjectIdentifier};

use crate::{
    error::ValueError,
    tlv::{self, Element, WireTag},
};

pub mod set;

bitflags! {
    /// `ContextFlags` of a `NegTokenInit`, bit 0 being the most significant bit of the first octet
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ReqFlags: u8 {
        const DELEG = 0x80;
        const MUTUAL = 0x40;
        const REPLAY = 0x20;
        const SEQUENCE = 0x10;
        const ANON = 0x08;
        const CONF = 0x04;
        const INTEG = 0x02;
    }
}

/// `negState` of a `NegTokenResp`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enumerated)]
#[repr(u32)]
pub enum NegState {
    AcceptCompleted = 0,
    AcceptIncomplete = 1,
    Reject = 2,
    RequestMic = 3,
}

/// A decoded attribute value, before it is moved into its token struct
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    MechTypes(Vec<ObjectIdentifier>),
    Mech(ObjectIdentifier),
    ReqFlags(ReqFlags),
    NegState(NegState),
    Bytes(Vec<u8>),
}
impl FieldValue {
    pub fn into_mech_types(self) -> Option<Vec<ObjectIdentifier>> {
        match self {
            Self::MechTypes(mechs) => Some(mechs),
            _ => None,
        }
    }
    pub fn into_mech(self) -> Option<ObjectIdentifier> {
        match self {
            Self::Mech(mech) => Some(mech),
            _ => None,
        }
    }
    pub fn into_req_flags(self) -> Option<ReqFlags> {
        match self {
            Self::ReqFlags(flags) => Some(flags),
            _ => None,
        }
    }
    pub fn into_neg_state(self) -> Option<NegState> {
        match self {
            Self::NegState(state) => Some(state),
            _ => None,
        }
    }
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// Attribute values keyed by [`AttributeSchema::name`]
pub type FieldMap = BTreeMap<&'static str, FieldValue>;

pub type DecodeFn = fn(&[u8]) -> Result<FieldValue, ValueError>;
pub type EncodeFn = fn(&FieldValue) -> Result<Vec<u8>, ValueError>;

/// One explicitly tagged member of a negotiation token `SEQUENCE`.
///
/// `decode` receives the content octets of the context tag, which hold exactly one complete TLV of the
/// attribute's own type. `encode` produces that TLV.
#[derive(Clone, Copy)]
pub struct AttributeSchema {
    pub tag: WireTag,
    pub name: &'static str,
    pub required: bool,
    pub decode: DecodeFn,
    pub encode: EncodeFn,
}

impl std::fmt::Debug for AttributeSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeSchema")
            .field("tag", &self.tag)
            .field("name", &self.name)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

/// Whether the tags are strictly ascending, which also makes them unique
pub const fn schemas_ascending(schemas: &[AttributeSchema]) -> bool {
    let mut i = 1;
    while i < schemas.len() {
        if schemas[i - 1].tag.0 >= schemas[i].tag.0 {
            return false;
        }
        i += 1;
    }
    true
}

fn single_element(bytes: &[u8], expected: WireTag) -> Result<Element<'_>, ValueError> {
    let (element, rest) = tlv::read_element(bytes)?;
    if !rest.is_empty() {
        return Err(ValueError::TrailingData(rest.len()));
    }
    if element.tag != expected {
        return Err(ValueError::UnexpectedTag {
            expected,
            found: element.tag,
        });
    }
    Ok(element)
}

pub fn decode_mech_types(bytes: &[u8]) -> Result<FieldValue, ValueError> {
    let sequence = single_element(bytes, WireTag::SEQUENCE)?;
    let mechs = tlv::split_elements(sequence.value)?
        .into_iter()
        .map(|element| tlv::decode_oid(element.raw))
        .collect::<der::Result<Vec<_>>>()?;
    Ok(FieldValue::MechTypes(mechs))
}
pub fn encode_mech_types(value: &FieldValue) -> Result<Vec<u8>, ValueError> {
    let FieldValue::MechTypes(mechs) = value else {
        return Err(ValueError::WrongFieldKind("mech_types"));
    };
    let encoded = mechs.iter().map(tlv::encode_oid).collect::<der::Result<Vec<_>>>()?;
    Ok(tlv::encode_constructed(WireTag::SEQUENCE, encoded)?)
}

pub fn decode_mech(bytes: &[u8]) -> Result<FieldValue, ValueError> {
    Ok(FieldValue::Mech(tlv::decode_oid(bytes)?))
}
pub fn encode_mech(value: &FieldValue) -> Result<Vec<u8>, ValueError> {
    let FieldValue::Mech(mech) = value else {
        return Err(ValueError::WrongFieldKind("supported_mech"));
    };
    Ok(tlv::encode_oid(mech)?)
}

pub fn decode_req_flags(bytes: &[u8]) -> Result<FieldValue, ValueError> {
    let (unused_bits, octets) = tlv::decode_bit_string(bytes)?;
    if octets.len() > 1 {
        return Err(ValueError::FlagsTooLong(octets.len()));
    }
    let bits = octets.first().copied().unwrap_or_default();
    // DER leaves the unused trailing bits zero
    if bits & ((1 << unused_bits) - 1) != 0 {
        return Err(ValueError::UnusedBitsSet(unused_bits));
    }
    Ok(FieldValue::ReqFlags(ReqFlags::from_bits_retain(bits)))
}
pub fn encode_req_flags(value: &FieldValue) -> Result<Vec<u8>, ValueError> {
    let FieldValue::ReqFlags(flags) = value else {
        return Err(ValueError::WrongFieldKind("req_flags"));
    };
    let bits = flags.bits();
    // named bit lists drop their trailing zero bits
    let encoded = match bits {
        0 => tlv::encode_bit_string(0, &[])?,
        _ => tlv::encode_bit_string(bits.trailing_zeros() as u8, &[bits])?,
    };
    Ok(encoded)
}

pub fn decode_neg_state(bytes: &[u8]) -> Result<FieldValue, ValueError> {
    let state = NegState::from_der(bytes).map_err(|err| match err.kind() {
        ErrorKind::Value { .. } => ValueError::UndefinedNegState,
        _ => ValueError::Der(err),
    })?;
    Ok(FieldValue::NegState(state))
}
pub fn encode_neg_state(value: &FieldValue) -> Result<Vec<u8>, ValueError> {
    let FieldValue::NegState(state) = value else {
        return Err(ValueError::WrongFieldKind("neg_state"));
    };
    Ok(state.to_der()?)
}

pub fn decode_octets(bytes: &[u8]) -> Result<FieldValue, ValueError> {
    Ok(FieldValue::Bytes(tlv::decode_octet_string(bytes)?))
}
pub fn encode_octets(value: &FieldValue) -> Result<Vec<u8>, ValueError> {
    let FieldValue::Bytes(bytes) = value else {
        return Err(ValueError::WrongFieldKind("octet string"));
    };
    Ok(tlv::encode_octet_string(bytes)?)
}
