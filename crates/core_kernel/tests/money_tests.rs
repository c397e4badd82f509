//! Money tests for core_kernel

use core_kernel::{Currency, Money, MoneyError, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod parsing_tests {
    use super::*;

    #[test]
    fn test_amounts_as_models_write_them() {
        let cases = [
            ("1500", dec!(1500)),
            ("1,500.00", dec!(1500.00)),
            ("$1,500.00", dec!(1500.00)),
            ("1500.00 USD", dec!(1500.00)),
            ("  320.5 ", dec!(320.5)),
        ];
        for (text, expected) in cases {
            let money = Money::parse_lenient(text, Currency::USD).unwrap();
            assert_eq!(money.amount(), expected, "parsing {text:?}");
        }
    }

    #[test]
    fn test_unparseable_text_keeps_original_in_error() {
        let err = Money::parse_lenient("to be confirmed", Currency::USD).unwrap_err();
        assert_eq!(err, MoneyError::InvalidAmount("to be confirmed".to_string()));
    }

    #[test]
    fn test_two_decimal_points_are_rejected() {
        assert!(Money::parse_lenient("1.250.00", Currency::EUR).is_err());
    }

    #[test]
    fn test_parse_keeps_requested_currency() {
        let money = Money::parse_lenient("99.99", Currency::GBP).unwrap();
        assert_eq!(money.currency(), Currency::GBP);
        assert_eq!(money.to_string(), "£99.99");
    }
}

mod coverage_tests {
    use super::*;

    #[test]
    fn test_eighty_percent_coverage_rounds_to_cents() {
        let billed = Money::new(dec!(333.33), Currency::USD);
        let paid = Rate::from_percentage(dec!(80)).apply(&billed).round_to_currency();
        assert_eq!(paid.amount(), dec!(266.66));
    }

    #[test]
    fn test_payout_never_exceeds_billed_amount() {
        let billed = Money::new(dec!(1200), Currency::USD);
        let claimed = Money::new(dec!(5000), Currency::USD);
        assert_eq!(claimed.clamp_to(&billed).unwrap(), billed);
    }

    #[test]
    fn test_zero_and_negative() {
        let zero = Money::zero(Currency::CAD);
        assert!(zero.is_zero());
        assert!(!zero.is_negative());

        let refund = Money::new(dec!(-10), Currency::CAD);
        assert!(refund.is_negative());
        assert!(refund.clamp_to(&Money::new(dec!(50), Currency::CAD)).unwrap().is_zero());
    }

    #[test]
    fn test_scalar_multiplication() {
        let billed = Money::new(dec!(100), Currency::INR);
        assert_eq!((billed * Decimal::new(5, 1)).amount(), dec!(50));
    }
}

mod serde_tests {
    use super::*;

    #[test]
    fn test_currency_code_round_trip() {
        let money = Money::new(dec!(12.5), Currency::EUR);
        let json = serde_json::to_value(money).unwrap();
        assert_eq!(json["currency"], "EUR");
        let back: Money = serde_json::from_value(json).unwrap();
        assert_eq!(back, money);
    }
}
