use der::asn1::ObjectIdentifier;

use super::{NegotiationToken, TokenKind, Variant, take};
use crate::{
    attribute::{
        AttributeSchema, FieldMap, FieldValue, ReqFlags, decode_mech_types, decode_octets, decode_req_flags,
        encode_mech_types, encode_octets, encode_req_flags, schemas_ascending,
    },
    error::{EncodeError, MalformedGssToken},
    tlv::WireTag,
};

const SCHEMAS: [AttributeSchema; 4] = [
    AttributeSchema {
        tag: WireTag::context(0),
        name: "mech_types",
        required: true,
        decode: decode_mech_types,
        encode: encode_mech_types,
    },
    AttributeSchema {
        tag: WireTag::context(1),
        name: "req_flags",
        required: false,
        decode: decode_req_flags,
        encode: encode_req_flags,
    },
    AttributeSchema {
        tag: WireTag::context(2),
        name: "mech_token",
        required: false,
        decode: decode_octets,
        encode: encode_octets,
    },
    AttributeSchema {
        tag: WireTag::context(3),
        name: "mech_list_mic",
        required: false,
        decode: decode_octets,
        encode: encode_octets,
    },
];
const _: () = assert!(schemas_ascending(&SCHEMAS));

/// `negTokenInit [0]`
pub static NEG_TOKEN_INIT: Variant = Variant {
    kind: TokenKind::Init,
    tag: WireTag::context(0),
    schemas: &SCHEMAS,
    construct,
};

/// The initiator's opening message: the mechanisms it offers, most preferred first, and optionally an
/// optimistic token for the first of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NegTokenInit {
    pub mech_types: Vec<ObjectIdentifier>,
    pub req_flags: Option<ReqFlags>,
    pub mech_token: Option<Vec<u8>>,
    pub mech_list_mic: Option<Vec<u8>>,
}
impl NegTokenInit {
    pub fn new(mech_types: Vec<ObjectIdentifier>) -> Self {
        Self {
            mech_types,
            req_flags: None,
            mech_token: None,
            mech_list_mic: None,
        }
    }
    #[must_use]
    pub fn with_req_flags(self, req_flags: ReqFlags) -> Self {
        Self {
            req_flags: Some(req_flags),
            ..self
        }
    }
    #[must_use]
    pub fn with_mech_token(self, mech_token: impl Into<Vec<u8>>) -> Self {
        Self {
            mech_token: Some(mech_token.into()),
            ..self
        }
    }
    #[must_use]
    pub fn with_mech_list_mic(self, mech_list_mic: impl Into<Vec<u8>>) -> Self {
        Self {
            mech_list_mic: Some(mech_list_mic.into()),
            ..self
        }
    }
    /// The mechanism an optimistic `mech_token` belongs to
    pub fn preferred_mech(&self) -> Option<&ObjectIdentifier> {
        self.mech_types.first()
    }
    /// Decodes a GSS-API framed `NegTokenInit`
    pub fn decode(bytes: &[u8]) -> Result<Self, MalformedGssToken> {
        match crate::decode_as(bytes, TokenKind::Init)? {
            NegotiationToken::Init(init) => Ok(init),
            NegotiationToken::Resp(_) => Err(MalformedGssToken::NegotiationTokenTagMismatch {
                observed: TokenKind::Resp.tag(),
                expected: TokenKind::Init.tag(),
            }),
        }
    }
    /// Encodes the token inside the GSS-API initial context token framing
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        crate::envelope::encode_spnego(&NEG_TOKEN_INIT, &self.fields())
    }
    pub(crate) fn fields(&self) -> FieldMap {
        let mut fields = FieldMap::from([(SCHEMAS[0].name, FieldValue::MechTypes(self.mech_types.clone()))]);
        if let Some(flags) = self.req_flags {
            fields.insert(SCHEMAS[1].name, FieldValue::ReqFlags(flags));
        }
        if let Some(token) = &self.mech_token {
            fields.insert(SCHEMAS[2].name, FieldValue::Bytes(token.clone()));
        }
        if let Some(mic) = &self.mech_list_mic {
            fields.insert(SCHEMAS[3].name, FieldValue::Bytes(mic.clone()));
        }
        fields
    }
}

fn construct(mut fields: FieldMap) -> Result<NegotiationToken, MalformedGssToken> {
    let mech_types = take(&mut fields, &SCHEMAS[0], FieldValue::into_mech_types)?;
    // required fields were enforced by the attribute-set decoder
    debug_assert!(mech_types.is_some());
    Ok(NegotiationToken::Init(NegTokenInit {
        mech_types: mech_types.unwrap_or_default(),
        req_flags: take(&mut fields, &SCHEMAS[1], FieldValue::into_req_flags)?,
        mech_token: take(&mut fields, &SCHEMAS[2], FieldValue::into_bytes)?,
        mech_list_mic: take(&mut fields, &SCHEMAS[3], FieldValue::into_bytes)?,
    }))
}
