use super::*;

/// How operator input that is not a valid number is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Reject malformed input with a validation error.
    #[default]
    Strict,
    /// Coerce malformed input to zero.
    Lenient,
}

impl InputMode {
    /// Convert a form value according to the mode.
    pub fn convert(&self, field: FormField, value: &str) -> Result<BigUint, InputError> {
        match self {
            InputMode::Strict => parse_field(field, value),
            InputMode::Lenient => Ok(safe_big_int(value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Empty,
    NotANumber,
    Negative,
}

/// The Starknet field prime, `2^251 + 17 * 2^192 + 1`.
pub fn field_prime() -> BigUint {
    (BigUint::one() << 251usize) + (BigUint::from(17u32) << 192usize) + BigUint::one()
}

/// Convert operator input into an integer, yielding zero for anything that
/// does not parse. Never fails.
///
/// Accepts decimal and `0x`-prefixed hexadecimal, ignoring surrounding
/// whitespace. Negative values also collapse to zero since field elements are
/// unsigned.
pub fn safe_big_int(value: &str) -> BigUint {
    parse_integer(value).unwrap_or_else(|_| BigUint::zero())
}

/// Convert operator input into an integer that fits a field element.
pub fn parse_field(field: FormField, value: &str) -> Result<BigUint, InputError> {
    let number = parse_integer(value).map_err(|rejection| match rejection {
        Rejection::Empty => InputError::Empty(field),
        Rejection::NotANumber => InputError::NotANumber(field),
        Rejection::Negative => InputError::Negative(field),
    })?;
    if number >= field_prime() {
        return Err(InputError::OutOfRange(field));
    }
    Ok(number)
}

fn parse_integer(value: &str) -> Result<BigUint, Rejection> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Rejection::Empty);
    }

    if let Some(magnitude) = value.strip_prefix('-') {
        let magnitude = parse_unsigned(magnitude)?;
        // "-0" is still zero
        return if magnitude.is_zero() {
            Ok(magnitude)
        } else {
            Err(Rejection::Negative)
        };
    }

    parse_unsigned(value.strip_prefix('+').unwrap_or(value))
}

fn parse_unsigned(value: &str) -> Result<BigUint, Rejection> {
    let (digits, radix) = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (value, 10),
    };

    // `from_str_radix` tolerates separators and signs that operators never
    // mean to type, so only plain digits are let through.
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(Rejection::NotANumber);
    }

    BigUint::from_str_radix(digits, radix).map_err(|_| Rejection::NotANumber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_big_int() {
        assert_eq!(safe_big_int(""), BigUint::zero());
        assert_eq!(safe_big_int("not-a-number"), BigUint::zero());
        assert_eq!(safe_big_int("42"), BigUint::from(42u32));
        assert_eq!(safe_big_int("  42 "), BigUint::from(42u32));
        assert_eq!(safe_big_int("0x2a"), BigUint::from(42u32));
        assert_eq!(safe_big_int("-42"), BigUint::zero());
        assert_eq!(safe_big_int("1_000"), BigUint::zero());
    }

    #[test]
    fn test_parse_field_accepts_large_values() {
        let value = "340282366920938463463374607431768211456";
        let expected = BigUint::one() << 128usize;
        assert_eq!(parse_field(FormField::StartPrice, value), Ok(expected));
        assert_eq!(parse_field(FormField::NftId, "-0"), Ok(BigUint::zero()));
    }

    #[test]
    fn test_parse_field_rejections() {
        assert_eq!(
            parse_field(FormField::StartPrice, ""),
            Err(InputError::Empty(FormField::StartPrice))
        );
        assert_eq!(
            parse_field(FormField::BidAmount, "12abc"),
            Err(InputError::NotANumber(FormField::BidAmount))
        );
        assert_eq!(
            parse_field(FormField::BidAmount, "-"),
            Err(InputError::NotANumber(FormField::BidAmount))
        );
        assert_eq!(
            parse_field(FormField::NftId, "0x"),
            Err(InputError::NotANumber(FormField::NftId))
        );
        assert_eq!(
            parse_field(FormField::AuctionDuration, "-5"),
            Err(InputError::Negative(FormField::AuctionDuration))
        );
        assert_eq!(
            parse_field(FormField::NftId, &field_prime().to_string()),
            Err(InputError::OutOfRange(FormField::NftId))
        );

        let err = parse_field(FormField::AuctionDuration, "-5").unwrap_err();
        assert_eq!(err.field(), FormField::AuctionDuration);
    }

    #[test]
    fn test_input_mode() {
        assert_eq!(
            InputMode::Lenient.convert(FormField::StartPrice, "ten"),
            Ok(BigUint::zero())
        );
        assert_eq!(
            InputMode::Strict.convert(FormField::StartPrice, "ten"),
            Err(InputError::NotANumber(FormField::StartPrice))
        );
        assert_eq!(InputMode::default(), InputMode::Strict);
    }

    #[test]
    fn test_field_prime() {
        let expected = BigUint::parse_bytes(
            b"800000000000011000000000000000000000000000000000000000000000001",
            16,
        )
        .unwrap();
        assert_eq!(field_prime(), expected);
    }
}
