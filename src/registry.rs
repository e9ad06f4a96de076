use std::{collections::BTreeMap, sync::OnceLock};

use crate::{
    tlv::WireTag,
    token::{NEG_TOKEN_INIT, NEG_TOKEN_RESP, Variant},
};

/// Maps the tag of a negotiation token alternative to its description.
///
/// The process-wide instance is built once on first use and never changes afterwards.
#[derive(Debug, Default)]
pub struct Registry {
    variants: BTreeMap<WireTag, &'static Variant>,
}
impl Registry {
    pub fn new() -> Self {
        Self::default()
    }
    /// Panics if a variant with the same tag is already registered
    #[must_use]
    pub fn register(mut self, variant: &'static Variant) -> Self {
        let previous = self.variants.insert(variant.tag, variant);
        assert!(
            previous.is_none(),
            "a negotiation token is already registered for tag {}",
            variant.tag
        );
        self
    }
    pub fn lookup(&self, tag: WireTag) -> Option<&'static Variant> {
        self.variants.get(&tag).copied()
    }
    pub fn tags(&self) -> impl Iterator<Item = WireTag> + '_ {
        self.variants.keys().copied()
    }
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(|| Registry::new().register(&NEG_TOKEN_INIT).register(&NEG_TOKEN_RESP))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn global_knows_both_alternatives() {
        let registry = Registry::global();
        assert_eq!(registry.tags().collect::<Vec<_>>(), [WireTag(0xA0), WireTag(0xA1)]);
        assert_eq!(registry.lookup(WireTag(0xA1)).map(|v| v.kind), Some(TokenKind::Resp));
        assert!(registry.lookup(WireTag(0xA5)).is_none());
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn duplicate_registration_panics() {
        let _ = Registry::new().register(&NEG_TOKEN_INIT).register(&NEG_TOKEN_INIT);
    }
}
