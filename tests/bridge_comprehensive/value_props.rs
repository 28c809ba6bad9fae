//! Property tests: values keep their identity across the boundary.

use chrono::{DateTime, NaiveDateTime};
use proptest::prelude::*;
use rust_decimal::Decimal;
use sqlbridge::{Bridge, Command, SemanticType, Session, Value};

fn through_bridge(semantic: SemanticType, value: Value) -> Value {
    let bridge = Bridge::standard();
    let (code, foreign) = bridge.encode_parameter(semantic, value).unwrap();
    bridge.decode_column(code, foreign).unwrap()
}

fn millis_datetime() -> impl Strategy<Value = NaiveDateTime> {
    // 1900-01-01 .. 2200-01-01
    (-2_208_988_800_000i64..7_258_118_400_000i64)
        .prop_map(|ms| DateTime::from_timestamp_millis(ms).unwrap().naive_utc())
}

proptest! {
    #[test]
    fn prop_int64_roundtrip(n in any::<i64>()) {
        prop_assert_eq!(through_bridge(SemanticType::Int64, Value::I64(n)), Value::I64(n));
    }

    #[test]
    fn prop_int32_roundtrip(n in any::<i32>()) {
        prop_assert_eq!(through_bridge(SemanticType::Int32, Value::I32(n)), Value::I32(n));
    }

    #[test]
    fn prop_int16_roundtrip(n in any::<i16>()) {
        prop_assert_eq!(through_bridge(SemanticType::Int16, Value::I16(n)), Value::I16(n));
    }

    #[test]
    fn prop_bool_roundtrip(b in any::<bool>()) {
        prop_assert_eq!(through_bridge(SemanticType::Boolean, Value::Bool(b)), Value::Bool(b));
    }

    #[test]
    fn prop_string_roundtrip(s in ".*") {
        prop_assert_eq!(
            through_bridge(SemanticType::AnsiString, Value::from(s.clone())),
            Value::from(s)
        );
    }

    #[test]
    fn prop_bytes_roundtrip(b in proptest::collection::vec(any::<u8>(), 0..512)) {
        prop_assert_eq!(
            through_bridge(SemanticType::Binary, Value::Bytes(b.clone())),
            Value::Bytes(b)
        );
    }

    #[test]
    fn prop_double_roundtrip(f in -1.0e300f64..1.0e300f64) {
        prop_assert_eq!(through_bridge(SemanticType::Double, Value::F64(f)), Value::F64(f));
    }

    #[test]
    fn prop_decimal_roundtrip(mantissa in any::<i64>(), scale in 0u32..10) {
        let d = Decimal::new(mantissa, scale);
        prop_assert_eq!(
            through_bridge(SemanticType::Decimal, Value::Decimal(d)),
            Value::Decimal(d)
        );
    }

    #[test]
    fn prop_datetime_roundtrip_at_millis(at in millis_datetime()) {
        prop_assert_eq!(
            through_bridge(SemanticType::DateTime, Value::DateTime(at)),
            Value::DateTime(at)
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_engine_roundtrip(n in any::<i64>(), s in "[a-zA-Z0-9 ]{0,40}", f in -1.0e12f64..1.0e12f64) {
        let mut session = Session::open_in_memory().unwrap();
        session
            .execute_non_query("CREATE TABLE p (n BIGINT, s VARCHAR(40), f DOUBLE)")
            .unwrap();
        session
            .execute_non_query(
                Command::new("INSERT INTO p VALUES (?, ?, ?)")
                    .bind(SemanticType::Int64, n)
                    .bind(SemanticType::AnsiString, s.clone())
                    .bind(SemanticType::Double, f),
            )
            .unwrap();

        let table = session.execute_query("SELECT n, s, f FROM p").unwrap();
        prop_assert_eq!(
            &table.rows()[0],
            &vec![Value::I64(n), Value::from(s), Value::F64(f)]
        );
    }
}
