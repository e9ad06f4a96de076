pub use init::{NEG_TOKEN_INIT, NegTokenInit};
pub use resp::{NEG_TOKEN_RESP, NegTokenResp};

use crate::{
    attribute::{AttributeSchema, FieldMap, FieldValue, set},
    error::{EncodeError, MalformedGssToken, ValueError},
    tlv::{self, Element, WireTag},
};

mod init;
mod resp;

/// The two alternatives of the SPNEGO `NegotiationToken` CHOICE
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NegotiationToken {
    Init(NegTokenInit),
    Resp(NegTokenResp),
}
impl NegotiationToken {
    pub fn kind(&self) -> TokenKind {
        match self {
            Self::Init(_) => TokenKind::Init,
            Self::Resp(_) => TokenKind::Resp,
        }
    }
    pub(crate) fn fields(&self) -> FieldMap {
        match self {
            Self::Init(init) => init.fields(),
            Self::Resp(resp) => resp.fields(),
        }
    }
}
impl From<NegTokenInit> for NegotiationToken {
    fn from(value: NegTokenInit) -> Self {
        Self::Init(value)
    }
}
impl From<NegTokenResp> for NegotiationToken {
    fn from(value: NegTokenResp) -> Self {
        Self::Resp(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Init,
    Resp,
}
impl TokenKind {
    pub fn variant(self) -> &'static Variant {
        match self {
            Self::Init => &NEG_TOKEN_INIT,
            Self::Resp => &NEG_TOKEN_RESP,
        }
    }
    pub fn tag(self) -> WireTag {
        self.variant().tag
    }
}

/// Static description of one negotiation token alternative
pub struct Variant {
    pub kind: TokenKind,
    pub tag: WireTag,
    pub schemas: &'static [AttributeSchema],
    construct: fn(FieldMap) -> Result<NegotiationToken, MalformedGssToken>,
}
impl Variant {
    /// Decodes the elements of the token's inner `SEQUENCE`.
    pub fn decode_body(&self, elements: &[Element<'_>]) -> Result<NegotiationToken, MalformedGssToken> {
        let fields = set::decode(elements, self.schemas)?;
        (self.construct)(fields)
    }
    /// The tagged elements making up the token's inner `SEQUENCE`, in wire order
    pub fn encode_body(&self, fields: &FieldMap) -> Result<Vec<(WireTag, Vec<u8>)>, EncodeError> {
        set::encode(fields, self.schemas)
    }
    /// `SEQUENCE { [n] value, ... }` ready to be framed by [`Variant::tag`]
    pub(crate) fn encode_sequence(&self, fields: &FieldMap) -> Result<Vec<u8>, EncodeError> {
        let elements = self
            .encode_body(fields)?
            .into_iter()
            .map(|(tag, value)| tlv::encode(tag, &value))
            .collect::<der::Result<Vec<_>>>()?;
        Ok(tlv::encode_constructed(WireTag::SEQUENCE, elements)?)
    }
}
impl std::fmt::Debug for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Variant")
            .field("kind", &self.kind)
            .field("tag", &self.tag)
            .field("schemas", &self.schemas)
            .finish_non_exhaustive()
    }
}

/// Moves an attribute out of `fields`, checking it holds the kind its schema decodes to.
fn take<T>(
    fields: &mut FieldMap,
    schema: &AttributeSchema,
    into: fn(FieldValue) -> Option<T>,
) -> Result<Option<T>, MalformedGssToken> {
    let Some(value) = fields.remove(schema.name) else {
        return Ok(None);
    };
    into(value).map(Some).ok_or(MalformedGssToken::AttributeDecodeError {
        tag: schema.tag,
        source: ValueError::WrongFieldKind(schema.name),
    })
}
