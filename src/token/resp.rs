use der::asn1::ObjectIdentifier;

use super::{NegotiationToken, TokenKind, Variant, take};
use crate::{
    attribute::{
        AttributeSchema, FieldMap, FieldValue, NegState, decode_mech, decode_neg_state, decode_octets, encode_mech,
        encode_neg_state, encode_octets, schemas_ascending,
    },
    error::{EncodeError, MalformedGssToken},
    tlv::WireTag,
};

const SCHEMAS: [AttributeSchema; 4] = [
    AttributeSchema {
        tag: WireTag::context(0),
        name: "neg_state",
        required: false,
        decode: decode_neg_state,
        encode: encode_neg_state,
    },
    AttributeSchema {
        tag: WireTag::context(1),
        name: "supported_mech",
        required: false,
        decode: decode_mech,
        encode: encode_mech,
    },
    AttributeSchema {
        tag: WireTag::context(2),
        name: "response_token",
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

/// `negTokenResp [1]`
pub static NEG_TOKEN_RESP: Variant = Variant {
    kind: TokenKind::Resp,
    tag: WireTag::context(1),
    schemas: &SCHEMAS,
    construct,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NegTokenResp {
    pub neg_state: Option<NegState>,
    pub supported_mech: Option<ObjectIdentifier>,
    pub response_token: Option<Vec<u8>>,
    pub mech_list_mic: Option<Vec<u8>>,
}
impl NegTokenResp {
    #[must_use]
    pub fn with_neg_state(self, neg_state: NegState) -> Self {
        Self {
            neg_state: Some(neg_state),
            ..self
        }
    }
    #[must_use]
    pub fn with_supported_mech(self, supported_mech: ObjectIdentifier) -> Self {
        Self {
            supported_mech: Some(supported_mech),
            ..self
        }
    }
    #[must_use]
    pub fn with_response_token(self, response_token: impl Into<Vec<u8>>) -> Self {
        Self {
            response_token: Some(response_token.into()),
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
    pub fn is_complete(&self) -> bool {
        self.neg_state == Some(NegState::AcceptCompleted)
    }
    pub fn is_rejected(&self) -> bool {
        self.neg_state == Some(NegState::Reject)
    }
    /// Decodes a GSS-API framed `NegTokenResp`
    pub fn decode(bytes: &[u8]) -> Result<Self, MalformedGssToken> {
        match crate::decode_as(bytes, TokenKind::Resp)? {
            NegotiationToken::Resp(resp) => Ok(resp),
            NegotiationToken::Init(_) => Err(MalformedGssToken::NegotiationTokenTagMismatch {
                observed: TokenKind::Init.tag(),
                expected: TokenKind::Resp.tag(),
            }),
        }
    }
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        crate::envelope::encode_spnego(&NEG_TOKEN_RESP, &self.fields())
    }
    pub(crate) fn fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        if let Some(state) = self.neg_state {
            fields.insert(SCHEMAS[0].name, FieldValue::NegState(state));
        }
        if let Some(mech) = self.supported_mech {
            fields.insert(SCHEMAS[1].name, FieldValue::Mech(mech));
        }
        if let Some(token) = &self.response_token {
            fields.insert(SCHEMAS[2].name, FieldValue::Bytes(token.clone()));
        }
        if let Some(mic) = &self.mech_list_mic {
            fields.insert(SCHEMAS[3].name, FieldValue::Bytes(mic.clone()));
        }
        fields
    }
}

fn construct(mut fields: FieldMap) -> Result<NegotiationToken, MalformedGssToken> {
    Ok(NegotiationToken::Resp(NegTokenResp {
        neg_state: take(&mut fields, &SCHEMAS[0], FieldValue::into_neg_state)?,
        supported_mech: take(&mut fields, &SCHEMAS[1], FieldValue::into_mech)?,
        response_token: take(&mut fields, &SCHEMAS[2], FieldValue::into_bytes)?,
        mech_list_mic: take(&mut fields, &SCHEMAS[3], FieldValue::into_bytes)?,
    }))
}
