use rand::Rng;

/// Number of decimal digits in a device identifier.
pub const IMEI_LENGTH: usize = 15;

/// Device identifier.
///
/// An IMEI-like identifier of exactly 15 decimal digits. No Luhn checksum is
/// enforced, neither on parsing nor on generation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Imei(String);

impl Imei {
    /// Generate a random identifier.
    ///
    /// Every digit is drawn uniformly, the result carries no checksum.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let digits = (0..IMEI_LENGTH)
            .map(|_| char::from(b'0' + rng.gen_range(0..=9)))
            .collect();

        Self(digits)
    }

    /// Check if the value is exactly 15 decimal digits.
    #[inline]
    pub fn is_valid(value: &str) -> bool {
        value.len() == IMEI_LENGTH && value.bytes().all(|b| b.is_ascii_digit())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Imei {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if Self::is_valid(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(crate::Error::Validation(format!(
                "identifier must be exactly {} digits, received '{}'",
                IMEI_LENGTH, s
            )))
        }
    }
}

impl std::fmt::Display for Imei {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for Imei {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn test_imei_parse() {
        assert!("352099001761481".parse::<Imei>().is_ok());
        assert!("35209900176148".parse::<Imei>().is_err());
        assert!("3520990017614812".parse::<Imei>().is_err());
        assert!("35209900176148A".parse::<Imei>().is_err());
        assert!(" 352099001761481".parse::<Imei>().is_err());
        assert!("".parse::<Imei>().is_err());
    }

    #[test]
    fn test_imei_generate() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            let imei = Imei::generate(&mut rng);
            assert!(Imei::is_valid(imei.as_str()));
        }
    }
}
