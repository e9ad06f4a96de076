//! Thin adapter over `der` for the tag/length/value framing SPNEGO is built from.
//!
//! Everything above this module speaks in [`WireTag`]s and borrowed [`Element`]s and never touches `der`'s
//! reader/writer types directly.
use std::fmt::Display;

use der::{
    Decode, Encode, Header, Reader, SliceReader, Tag,
    asn1::{BitStringRef, ObjectIdentifier, OctetStringRef},
};

/// A single identifier octet as it appears on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WireTag(pub u8);
impl WireTag {
    pub const BIT_STRING: WireTag = WireTag(0x03);
    pub const OCTET_STRING: WireTag = WireTag(0x04);
    pub const OBJECT_IDENTIFIER: WireTag = WireTag(0x06);
    pub const SEQUENCE: WireTag = WireTag(0x30);
    /// `[APPLICATION 0]` constructed, the framing of every initial GSS-API token
    pub const GSS_TOKEN: WireTag = WireTag(0x60);

    /// Constructed context-specific tag `[number]`
    pub const fn context(number: u8) -> Self {
        WireTag(0xA0 | (number & 0x1F))
    }
    pub fn octet(self) -> u8 {
        self.0
    }
}
impl Display for WireTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// One decoded TLV, borrowing from the input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Element<'a> {
    pub tag: WireTag,
    /// Content octets only
    pub value: &'a [u8],
    /// Identifier, length and content octets
    pub raw: &'a [u8],
}

/// Reads the first TLV off `bytes` and returns it together with whatever follows it.
pub fn read_element(bytes: &[u8]) -> der::Result<(Element<'_>, &[u8])> {
    let mut reader = SliceReader::new(bytes)?;
    let header = Header::decode(&mut reader)?;
    let value = reader.read_slice(header.length)?;
    let consumed = usize::try_from(reader.position())?;
    let (raw, rest) = bytes.split_at(consumed);
    let element = Element {
        tag: WireTag(u8::from(header.tag)),
        value,
        raw,
    };
    Ok((element, rest))
}

/// Splits the content octets of a constructed value into its elements.
pub fn split_elements(mut bytes: &[u8]) -> der::Result<Vec<Element<'_>>> {
    let mut elements = Vec::new();
    while !bytes.is_empty() {
        let (element, rest) = read_element(bytes)?;
        elements.push(element);
        bytes = rest;
    }
    Ok(elements)
}

pub fn encode(tag: WireTag, value: &[u8]) -> der::Result<Vec<u8>> {
    let header = Header::new(Tag::try_from(tag.0)?, value.len())?;
    let mut out = header.to_der()?;
    out.extend_from_slice(value);
    Ok(out)
}

/// Concatenates already encoded elements and frames them with `tag`.
pub fn encode_constructed<I, B>(tag: WireTag, elements: I) -> der::Result<Vec<u8>>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let content = elements.into_iter().fold(Vec::new(), |mut acc, element| {
        acc.extend_from_slice(element.as_ref());
        acc
    });
    encode(tag, &content)
}

pub fn encode_oid(oid: &ObjectIdentifier) -> der::Result<Vec<u8>> {
    oid.to_der()
}
pub fn decode_oid(raw: &[u8]) -> der::Result<ObjectIdentifier> {
    ObjectIdentifier::from_der(raw)
}

pub fn encode_octet_string(data: &[u8]) -> der::Result<Vec<u8>> {
    OctetStringRef::new(data)?.to_der()
}
pub fn decode_octet_string(raw: &[u8]) -> der::Result<Vec<u8>> {
    Ok(OctetStringRef::from_der(raw)?.as_bytes().to_vec())
}

pub fn encode_bit_string(unused_bits: u8, data: &[u8]) -> der::Result<Vec<u8>> {
    BitStringRef::new(unused_bits, data)?.to_der()
}
/// Returns the unused bit count and the raw content octets
pub fn decode_bit_string(raw: &[u8]) -> der::Result<(u8, &[u8])> {
    let bits = BitStringRef::from_der(raw)?;
    Ok((bits.unused_bits(), bits.raw_bytes()))
}
