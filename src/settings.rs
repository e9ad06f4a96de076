use crate::{error::MalformedGssToken, token::NegotiationToken};

/// Limits applied while decoding. The default imposes none.
///
/// `max_token_len` is checked before parsing starts and so bounds the memory a decode can use.
/// `max_mech_types` is a policy check on the decoded token; it does not stop the mechanism list from
/// being decoded first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeSettings {
    pub max_token_len: Option<usize>,
    pub max_mech_types: Option<usize>,
}
impl DecodeSettings {
    /// Rejects input longer than `max` bytes before any of it is parsed
    #[must_use]
    pub fn limit_token_len(self, max: usize) -> Self {
        Self {
            max_token_len: Some(max),
            ..self
        }
    }
    /// Rejects a `NegTokenInit` offering more than `max` mechanisms, once it has been decoded
    #[must_use]
    pub fn limit_mech_types(self, max: usize) -> Self {
        Self {
            max_mech_types: Some(max),
            ..self
        }
    }
    pub(crate) fn check_len(&self, len: usize) -> Result<(), MalformedGssToken> {
        match self.max_token_len {
            Some(max) if len > max => Err(MalformedGssToken::TokenTooLong { len, max }),
            _ => Ok(()),
        }
    }
    pub(crate) fn check_token(&self, token: &NegotiationToken) -> Result<(), MalformedGssToken> {
        let (Some(max), NegotiationToken::Init(init)) = (self.max_mech_types, token) else {
            return Ok(());
        };
        let count = init.mech_types.len();
        if count > max {
            return Err(MalformedGssToken::TooManyMechanisms { count, max });
        }
        Ok(())
    }
}
