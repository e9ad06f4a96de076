use std::collections::BTreeSet;

use der::asn1::ObjectIdentifier;

use crate::tlv::WireTag;

/// Everything that can be wrong with an inbound negotiation token.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MalformedGssToken {
    #[error("malformed DER structure: {0}")]
    Structure(#[from] der::Error),
    #[error("{0} bytes of trailing data after the token")]
    TrailingData(usize),
    #[error("token is {len} bytes long, the limit is {max}")]
    TokenTooLong { len: usize, max: usize },
    #[error("the tag {0} is not the GSS-API token tag")]
    UnexpectedOuterTag(WireTag),
    #[error("the tag {0} is not the correct GSSToken mechanism tag")]
    InvalidGssTokenTag(WireTag),
    #[error("the GSSToken does not contain two elements, observed {0}")]
    InvalidElementCount(usize),
    #[error("the GSSToken's OID ({0}) does not match the SPNEGO mechanism OID")]
    MechanismOidMismatch(ObjectIdentifier),
    #[error("no negotiation token is registered for tag {0}")]
    UnknownNegotiationTokenTag(WireTag),
    #[error("the negotiation token tag {observed} does not match the requested tag {expected}")]
    NegotiationTokenTagMismatch { observed: WireTag, expected: WireTag },
    #[error("the negotiation token body has tag {0} instead of SEQUENCE")]
    InvalidSequenceTag(WireTag),
    #[error("the tag {0} is not a valid attribute tag")]
    InvalidAttributeTag(WireTag),
    #[error("the attribute with tag {0} is present multiple times")]
    DuplicateAttribute(WireTag),
    #[error("the attribute with tag {0} is not in the correct order")]
    OutOfOrderAttribute(WireTag),
    #[error(
        "not all required attributes were observed (observed: {}, required: {})",
        TagList(.observed),
        TagList(.required)
    )]
    MissingRequiredAttributes {
        observed: BTreeSet<WireTag>,
        required: BTreeSet<WireTag>,
    },
    #[error("the attribute with tag {tag} could not be decoded")]
    AttributeDecodeError {
        tag: WireTag,
        #[source]
        source: ValueError,
    },
    #[error("the token offers {count} mechanisms, the limit is {max}")]
    TooManyMechanisms { count: usize, max: usize },
}

/// Failure to build the wire form of a negotiation token
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("DER encoding failed: {0}")]
    Der(#[from] der::Error),
    #[error("required attributes are missing (present: {}, required: {})", TagList(.present), TagList(.required))]
    MissingRequiredAttributes {
        present: BTreeSet<WireTag>,
        required: BTreeSet<WireTag>,
    },
    #[error("the attribute with tag {tag} could not be encoded")]
    Attribute {
        tag: WireTag,
        #[source]
        source: ValueError,
    },
}

/// Why a single attribute value was rejected
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error(transparent)]
    Der(#[from] der::Error),
    #[error("expected tag {expected}, found {found}")]
    UnexpectedTag { expected: WireTag, found: WireTag },
    #[error("{0} bytes of trailing data inside the attribute")]
    TrailingData(usize),
    #[error("the ENUMERATED value is not a defined negotiation state")]
    UndefinedNegState,
    #[error("request flags span {0} octets, at most one is defined")]
    FlagsTooLong(usize),
    #[error("bits declared unused by the {0} unused bit count are set")]
    UnusedBitsSet(u8),
    #[error("attribute {0} was given a value of the wrong kind")]
    WrongFieldKind(&'static str),
}

struct TagList<'a>(&'a BTreeSet<WireTag>);
impl std::fmt::Display for TagList<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{tag}")?;
        }
        f.write_str("]")
    }
}
