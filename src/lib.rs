//! Encoding and decoding of SPNEGO (RFC 4178) negotiation tokens.
//!
//! The initial token of a negotiation travels inside the GSS-API initial context token framing and is handled by
//! [`encode_negotiation_token`] and [`decode_negotiation_token`]. Every later token is the bare `NegotiationToken`
//! CHOICE, see [`encode_inner_negotiation_token`] and [`decode_inner_negotiation_token`].
use tracing::{debug, trace};

pub use attribute::{NegState, ReqFlags};
pub use der::asn1::ObjectIdentifier;
pub use error::{EncodeError, MalformedGssToken, ValueError};
pub use registry::Registry;
pub use settings::DecodeSettings;
pub use tlv::WireTag;
pub use token::{NegTokenInit, NegTokenResp, NegotiationToken, TokenKind, Variant};

pub mod attribute;
pub mod envelope;
mod error;
pub mod oid;
mod registry;
mod settings;
pub mod tlv;
mod token;

/// Encodes a token inside the GSS-API initial context token framing.
pub fn encode_negotiation_token(token: &NegotiationToken) -> Result<Vec<u8>, EncodeError> {
    envelope::encode_spnego(token.kind().variant(), &token.fields())
}

/// Decodes a GSS-API framed negotiation token of either kind.
pub fn decode_negotiation_token(bytes: &[u8]) -> Result<NegotiationToken, MalformedGssToken> {
    decode_negotiation_token_with(bytes, DecodeSettings::default())
}

/// Like [`decode_negotiation_token`], enforcing the limits in `settings`.
pub fn decode_negotiation_token_with(
    bytes: &[u8],
    settings: DecodeSettings,
) -> Result<NegotiationToken, MalformedGssToken> {
    decode_framed(bytes, None, settings).inspect_err(|err| debug!(%err, "rejected negotiation token"))
}

/// Decodes a GSS-API framed negotiation token that must be of the given kind.
pub fn decode_as(bytes: &[u8], kind: TokenKind) -> Result<NegotiationToken, MalformedGssToken> {
    decode_as_with(bytes, kind, DecodeSettings::default())
}

/// Like [`decode_as`], enforcing the limits in `settings`.
pub fn decode_as_with(
    bytes: &[u8],
    kind: TokenKind,
    settings: DecodeSettings,
) -> Result<NegotiationToken, MalformedGssToken> {
    decode_framed(bytes, Some(kind), settings).inspect_err(|err| debug!(%err, ?kind, "rejected negotiation token"))
}

/// Encodes a token without the GSS-API framing, as sent after the first round trip.
pub fn encode_inner_negotiation_token(token: &NegotiationToken) -> Result<Vec<u8>, EncodeError> {
    let variant = token.kind().variant();
    let body = variant.encode_sequence(&token.fields())?;
    Ok(tlv::encode(variant.tag, &body)?)
}

/// Decodes a bare `NegotiationToken` CHOICE, as received after the first round trip.
pub fn decode_inner_negotiation_token(bytes: &[u8]) -> Result<NegotiationToken, MalformedGssToken> {
    decode_inner_negotiation_token_with(bytes, DecodeSettings::default())
}

/// Like [`decode_inner_negotiation_token`], enforcing the limits in `settings`.
pub fn decode_inner_negotiation_token_with(
    bytes: &[u8],
    settings: DecodeSettings,
) -> Result<NegotiationToken, MalformedGssToken> {
    decode_inner(bytes, settings).inspect_err(|err| debug!(%err, "rejected inner negotiation token"))
}

fn decode_framed(
    bytes: &[u8],
    kind: Option<TokenKind>,
    settings: DecodeSettings,
) -> Result<NegotiationToken, MalformedGssToken> {
    settings.check_len(bytes.len())?;
    let gss_token = envelope::unwrap(bytes, &oid::SPNEGO)?;
    decode_body(gss_token.inner_tag, gss_token.inner_value, kind, settings)
}

fn decode_inner(bytes: &[u8], settings: DecodeSettings) -> Result<NegotiationToken, MalformedGssToken> {
    settings.check_len(bytes.len())?;
    let (element, rest) = tlv::read_element(bytes)?;
    if !rest.is_empty() {
        return Err(MalformedGssToken::TrailingData(rest.len()));
    }
    decode_body(element.tag, element.value, None, settings)
}

fn decode_body(
    tag: WireTag,
    value: &[u8],
    kind: Option<TokenKind>,
    settings: DecodeSettings,
) -> Result<NegotiationToken, MalformedGssToken> {
    let variant = select_variant(tag, kind)?;
    trace!(%tag, kind = ?variant.kind, "dispatching negotiation token");
    let elements = envelope::body_elements(value)?;
    let token = variant.decode_body(&elements)?;
    settings.check_token(&token)?;
    Ok(token)
}

fn select_variant(tag: WireTag, kind: Option<TokenKind>) -> Result<&'static Variant, MalformedGssToken> {
    match kind {
        Some(kind) => {
            let variant = kind.variant();
            if variant.tag != tag {
                return Err(MalformedGssToken::NegotiationTokenTagMismatch {
                    observed: tag,
                    expected: variant.tag,
                });
            }
            Ok(variant)
        }
        None => Registry::global()
            .lookup(tag)
            .ok_or(MalformedGssToken::UnknownNegotiationTokenTag(tag)),
    }
}
