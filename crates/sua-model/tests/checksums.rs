//! Checksum strength properties for the identifier family.
//!
//! Each identifier's verification digit is re-derived by exhausting the
//! final position: for any structurally valid prefix, exactly one
//! completion must validate, and every other completion must fail.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use sua_model::{Clabe, Curp, Money, Nss, Rfc};
use sua_model::{Currency, ModelError};

/// Count how many final digits complete `prefix` into a valid value.
fn valid_digit_completions(prefix: &str, is_valid: impl Fn(&str) -> bool) -> Vec<char> {
    ('0'..='9')
        .filter(|d| is_valid(&format!("{prefix}{d}")))
        .collect()
}

proptest! {
    #[test]
    fn nss_has_exactly_one_valid_check_digit(prefix in "[0-9]{10}") {
        let completions = valid_digit_completions(&prefix, |s| Nss::is_valid(s));
        prop_assert_eq!(completions.len(), 1);
    }

    #[test]
    fn clabe_has_exactly_one_valid_control_digit(
        bank in prop::sample::select(vec!["002", "012", "014", "021", "072", "127", "137", "646"]),
        rest in "[0-9]{14}",
    ) {
        let prefix = format!("{bank}{rest}");
        let completions = valid_digit_completions(&prefix, |s| Clabe::is_valid(s));
        prop_assert_eq!(completions.len(), 1);
    }

    #[test]
    fn clabe_detects_any_single_digit_flip(
        bank in prop::sample::select(vec!["002", "012", "072"]),
        rest in "[0-9]{14}",
        position in 0usize..18,
        bump in 1u8..10,
    ) {
        let prefix = format!("{bank}{rest}");
        let control = valid_digit_completions(&prefix, |s| Clabe::is_valid(s))[0];
        let valid = format!("{prefix}{control}");

        let mut bytes = valid.clone().into_bytes();
        bytes[position] = b'0' + (bytes[position] - b'0' + bump) % 10;
        let flipped = String::from_utf8(bytes).unwrap();
        prop_assert_ne!(&flipped, &valid);
        // 3, 7 and 1 are all coprime to 10, so every single-digit flip is
        // caught by the control digit (or by the bank-code catalog).
        prop_assert!(!Clabe::is_valid(&flipped));
    }

    #[test]
    fn curp_has_exactly_one_valid_check_digit(
        prefix in prop::sample::select(vec!["GOMA", "LUNA", "PERS", "SOTO", "HERR"]),
        day_offset in 0u32..20_000,
        sex in prop::sample::select(vec!['H', 'M', 'X']),
        state in prop::sample::select(vec!["DF", "JC", "NL", "MC", "NE"]),
        consonants in prop::sample::select(vec!["RRL", "MNS", "TRZ", "PLD"]),
        homoclave in 0u32..10,
    ) {
        let base = NaiveDate::from_ymd_opt(1940, 1, 1).unwrap();
        let birth = base + chrono::Days::new(u64::from(day_offset));
        prop_assume!(birth.format("%Y").to_string().starts_with("19"));

        let head = format!(
            "{prefix}{}{sex}{state}{consonants}{homoclave}",
            birth.format("%y%m%d"),
        );
        let completions = valid_digit_completions(&head, |s| Curp::is_valid(s));
        prop_assert_eq!(completions.len(), 1);

        let curp = Curp::create(&format!("{head}{}", completions[0])).unwrap();
        prop_assert_eq!(curp.birth_date(), birth);
        prop_assert_eq!(curp.sex(), sex);
        prop_assert_eq!(curp.state_code(), state);
    }

    #[test]
    fn rfc_has_exactly_one_valid_verification_char(
        prefix in prop::sample::select(vec!["GOMA", "LUNA", "PERS", "SOTO"]),
        day_offset in 0u32..20_000,
        homoclave in "[A-Z0-9]{2}",
    ) {
        let base = NaiveDate::from_ymd_opt(1940, 1, 1).unwrap();
        let date = base + chrono::Days::new(u64::from(day_offset));
        prop_assume!(date < NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());

        let head = format!("{prefix}{}{homoclave}", date.format("%y%m%d"));
        // The verification character domain is the ten digits plus 'A'.
        let completions: Vec<char> = ('0'..='9')
            .chain(std::iter::once('A'))
            .filter(|c| Rfc::is_valid(&format!("{head}{c}")))
            .collect();
        prop_assert_eq!(completions.len(), 1);
    }

    #[test]
    fn money_cents_roundtrip(cents in 0i64..=999_999_999) {
        let money = Money::from_cents(cents, Currency::Mxn);
        let encoded = money.encode_cents(9).unwrap();
        prop_assert_eq!(encoded.len(), 9);
        prop_assert!(encoded.bytes().all(|b| b.is_ascii_digit()));
        let decoded = Money::decode_cents(&encoded, Currency::Mxn).unwrap();
        prop_assert_eq!(decoded, money);
    }

    #[test]
    fn money_construction_rounds_to_two_digits(mantissa in -1_000_000_000i64..1_000_000_000) {
        let raw = Decimal::new(mantissa, 4);
        let money = Money::new(raw, Currency::Mxn);
        prop_assert!(money.amount().scale() <= 2);
    }
}

#[test]
fn cross_currency_sum_is_rejected() {
    let a = Money::from_cents(100, Currency::Mxn);
    let b = Money::from_cents(100, Currency::Usd);
    assert!(matches!(
        a.checked_add(b),
        Err(ModelError::CurrencyMismatch { .. })
    ));
}
