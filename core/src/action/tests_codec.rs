use super::*;
use crate::operation::Operation;
use proptest::prelude::*;

const START: &str = "0b8d3c0e-55a4-4f3c-9b1d-2f6a7c1e9a10";
const END: &str = "f47ac10b-58cc-4372-a567-0e02b2c3d479";

fn op_strategy() -> impl Strategy<Value = Operation> {
    (0usize..4).prop_map(|i| Operation::ALL[i])
}

#[test]
fn test_uuid_action_layout() {
    let action = ExtrudeAction::parse(START, END, Operation::Cut).unwrap();
    let encoded = action.encode().unwrap();
    let start = Uuid::parse_str(START).unwrap().as_u128();

    assert_eq!(encoded.0[0], (start >> 64) as u64);
    assert_eq!(encoded.0[1], start as u64);
    assert_eq!(encoded.0[4], 2);
    assert!(!encoded.is_integer_variant());

    let decoded = encoded.decode().unwrap();
    assert_eq!(decoded.start_face.to_string(), START);
    assert_eq!(decoded.end_face.to_string(), END);
    assert_eq!(decoded, action);
}

#[test]
fn test_integer_action_layout() {
    let action = ExtrudeAction::parse("12", "7", Operation::NewBody).unwrap();
    let encoded = action.encode().unwrap();
    assert_eq!(encoded, EncodedAction::new([0, 12, 0, 7, 4]));

    let decoded = encoded.decode().unwrap();
    assert_eq!(decoded.start_face.to_string(), "12");
    assert_eq!(decoded.end_face.to_string(), "7");
}

#[test]
fn test_integer_ids_at_u64_max() {
    let action = ExtrudeAction::new(u64::MAX, 0u64, Operation::Join);
    let encoded = action.encode().unwrap();
    assert_eq!(encoded.decode().unwrap(), action);
}

#[test]
fn test_malformed_identifier() {
    let err = ExtrudeAction::parse("face-12", "7", Operation::Join).unwrap_err();
    assert_eq!(err, CodecError::MalformedIdentifier("face-12".into()));

    // Larger than 2^64-1 and not a UUID.
    let err = ExtrudeAction::parse("18446744073709551616", "7", Operation::Join).unwrap_err();
    assert!(matches!(err, CodecError::MalformedIdentifier(_)));

    assert!("-1".parse::<FaceId>().is_err());
    assert!("".parse::<FaceId>().is_err());
}

#[test]
fn test_mixed_kinds_rejected() {
    let action = ExtrudeAction::parse(START, "3", Operation::Join).unwrap();
    match action.encode() {
        Err(CodecError::MixedIdentifierKinds { start, end }) => {
            assert_eq!(start, START);
            assert_eq!(end, "3");
        }
        other => panic!("expected MixedIdentifierKinds, got {:?}", other),
    }
}

#[test]
fn test_low_valued_uuid_pair_is_ambiguous() {
    // Both upper halves zero: the wire form would read back as integers.
    let nil = ExtrudeAction::new(Uuid::nil(), Uuid::nil(), Operation::Join);
    assert_eq!(nil.encode(), Err(CodecError::AmbiguousIdentifier));

    let small = ExtrudeAction::new(Uuid::from_u128(5), Uuid::from_u128(9), Operation::Cut);
    assert_eq!(small.encode(), Err(CodecError::AmbiguousIdentifier));
}

#[test]
fn test_zero_high_slots_always_decode_as_integers() {
    let decoded = EncodedAction::new([0, 0, 0, 0, 1]).decode().unwrap();
    assert_eq!(decoded.start_face, FaceId::Index(0));
    assert_eq!(decoded.end_face, FaceId::Index(0));
}

#[test]
fn test_one_low_uuid_is_still_unambiguous() {
    let action = ExtrudeAction::new(
        Uuid::from_u128(5),
        Uuid::parse_str(END).unwrap(),
        Operation::Intersect,
    );
    let encoded = action.encode().unwrap();
    assert_eq!(encoded.0[0], 0);
    assert_eq!(encoded.decode().unwrap(), action);
}

#[test]
fn test_invalid_operation_codes() {
    for op in [0, 5, 99, u64::MAX] {
        let err = EncodedAction::new([0, 1, 0, 2, op]).decode().unwrap_err();
        assert_eq!(err, CodecError::InvalidOperationCode(op));
    }
}

#[test]
fn test_from_slice_width() {
    assert_eq!(
        EncodedAction::from_slice(&[1, 2, 3]),
        Err(CodecError::WrongActionWidth(3))
    );
    assert_eq!(
        EncodedAction::from_slice(&[0, 1, 0, 2, 3]).unwrap(),
        EncodedAction::new([0, 1, 0, 2, 3])
    );
}

#[test]
fn test_alternate_uuid_forms_normalize() {
    let simple = START.replace('-', "");
    let action = ExtrudeAction::parse(&simple, END, Operation::Join).unwrap();
    let decoded = action.encode().unwrap().decode().unwrap();
    assert_eq!(decoded.start_face.to_string(), START);
}

#[test]
fn test_action_json_matches_engine_shape() {
    let action = ExtrudeAction::parse(START, END, Operation::NewBody).unwrap();
    let json = serde_json::to_value(action).unwrap();
    assert_eq!(json["start_face"], START);
    assert_eq!(json["end_face"], END);
    assert_eq!(json["operation"], "NewBodyFeatureOperation");

    let encoded = EncodedAction::new([0, 4, 0, 8, 1]);
    assert_eq!(serde_json::to_string(&encoded).unwrap(), "[0,4,0,8,1]");
}

proptest! {
    #[test]
    fn prop_uuid_round_trip(s in any::<u128>(), e in any::<u128>(), op in op_strategy()) {
        prop_assume!((s >> 64) != 0 || (e >> 64) != 0);
        let action = ExtrudeAction::new(Uuid::from_u128(s), Uuid::from_u128(e), op);
        let encoded = action.encode().unwrap();
        prop_assert!(!encoded.is_integer_variant());
        prop_assert_eq!(encoded.decode().unwrap(), action);
    }

    #[test]
    fn prop_integer_round_trip(s in any::<u64>(), e in any::<u64>(), op in op_strategy()) {
        let action = ExtrudeAction::parse(&s.to_string(), &e.to_string(), op).unwrap();
        let decoded = action.encode().unwrap().decode().unwrap();
        prop_assert_eq!(decoded.start_face.to_string(), s.to_string());
        prop_assert_eq!(decoded, action);
    }
}
