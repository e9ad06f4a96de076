use quickcheck::{Arbitrary, Gen};
use spnego::{
    NegState, NegTokenInit, NegTokenResp, NegotiationToken, ObjectIdentifier, ReqFlags, decode_inner_negotiation_token,
    decode_negotiation_token, encode_inner_negotiation_token, encode_negotiation_token, oid,
};

const KNOWN_MECHS: [ObjectIdentifier; 5] = [oid::KRB5, oid::MS_KRB5, oid::KRB5_USER_TO_USER, oid::NTLMSSP, oid::NEGOEX];
// base-128 arcs wider than four octets are rejected by the OID encoder
const ARC_LIMIT: u32 = 1 << 28;

fn mech(g: &mut Gen) -> ObjectIdentifier {
    let known = KNOWN_MECHS[usize::arbitrary(g) % KNOWN_MECHS.len()];
    if bool::arbitrary(g) {
        return known;
    }
    let head = [1, u32::from(u8::arbitrary(g) % 40), u32::arbitrary(g) % ARC_LIMIT];
    let tail: Vec<u32> = Vec::<u32>::arbitrary(g).into_iter().take(6).map(|arc| arc % ARC_LIMIT).collect();
    ObjectIdentifier::from_arcs(head.into_iter().chain(tail)).unwrap_or(known)
}

fn octets(g: &mut Gen) -> Option<Vec<u8>> {
    Option::<Vec<u8>>::arbitrary(g)
}

#[derive(Clone, Debug)]
struct AnyToken(NegotiationToken);
impl Arbitrary for AnyToken {
    fn arbitrary(g: &mut Gen) -> Self {
        let token = if bool::arbitrary(g) {
            let count = usize::arbitrary(g) % 5;
            NegotiationToken::Init(NegTokenInit {
                mech_types: (0..count).map(|_| mech(g)).collect(),
                req_flags: Option::<u8>::arbitrary(g).map(ReqFlags::from_bits_truncate),
                mech_token: octets(g),
                mech_list_mic: octets(g),
            })
        } else {
            let states = [
                NegState::AcceptCompleted,
                NegState::AcceptIncomplete,
                NegState::Reject,
                NegState::RequestMic,
            ];
            NegotiationToken::Resp(NegTokenResp {
                neg_state: bool::arbitrary(g).then(|| states[usize::arbitrary(g) % states.len()]),
                supported_mech: bool::arbitrary(g).then(|| mech(g)),
                response_token: octets(g),
                mech_list_mic: octets(g),
            })
        };
        AnyToken(token)
    }
}

#[quickcheck_macros::quickcheck]
fn framed_round_trip(token: AnyToken) -> bool {
    let encoded = encode_negotiation_token(&token.0).unwrap();
    decode_negotiation_token(&encoded).unwrap() == token.0
}

#[quickcheck_macros::quickcheck]
fn bare_round_trip(token: AnyToken) -> bool {
    let encoded = encode_inner_negotiation_token(&token.0).unwrap();
    decode_inner_negotiation_token(&encoded).unwrap() == token.0
}

#[test]
fn generated_mechanisms_use_wide_arcs() {
    let mut g = Gen::new(100);
    let mechs: Vec<_> = (0..200).map(|_| mech(&mut g)).collect();
    assert!(mechs.iter().any(|mech| !KNOWN_MECHS.contains(mech)));
    for mech in mechs {
        let init = NegTokenInit::new(vec![mech]);
        assert_eq!(NegTokenInit::decode(&init.encode().unwrap()).unwrap(), init);
    }
}

#[test]
fn every_flag_survives() {
    for flag in ReqFlags::all().iter() {
        let init = NegTokenInit::new(vec![oid::KRB5]).with_req_flags(flag);
        assert_eq!(NegTokenInit::decode(&init.encode().unwrap()).unwrap(), init);
    }
    let empty = NegTokenInit::new(vec![oid::KRB5]).with_req_flags(ReqFlags::empty());
    assert_eq!(NegTokenInit::decode(&empty.encode().unwrap()).unwrap(), empty);
}
