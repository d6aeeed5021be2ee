//! Ordnance Survey National Grid references.
//!
//! Converts lettered references such as `SU 387 148` to numeric
//! easting/northing metres from the grid's false origin, and back. Parsed
//! references land on the centre of the square they address, so a 6-digit
//! reference (100 m precision) becomes `xxx50`.

use std::fmt;
use std::str::FromStr;

use crate::error::LookupError;

/// Easting/northing in metres from the false origin (square `SV`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsGridRef {
    pub easting: u32,
    pub northing: u32,
}

impl OsGridRef {
    pub fn new(easting: u32, northing: u32) -> Self {
        Self { easting, northing }
    }

    /// Parse a lettered grid reference. Whitespace is ignored and letters
    /// are case-insensitive; 0 to 10 digits (an even count) may follow.
    pub fn parse(gridref: &str) -> Result<Self, LookupError> {
        let invalid = || LookupError::InvalidGridRef(gridref.to_string());

        let compact: String = gridref
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        let mut chars = compact.chars();
        let first = chars.next().and_then(letter_index).ok_or_else(invalid)?;
        let second = chars.next().and_then(letter_index).ok_or_else(invalid)?;

        // 100 km square indexes from the false origin.
        let e100k = ((first - 2) % 5) * 5 + second % 5;
        let n100k = (19 - (first / 5) * 5) - second / 5;
        if !(0..=6).contains(&e100k) || !(0..=12).contains(&n100k) {
            return Err(invalid());
        }

        let digits = chars.as_str();
        if digits.len() > 10 || digits.len() % 2 != 0 || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let precision = digits.len() / 2;
        let (easting_digits, northing_digits) = digits.split_at(precision);
        let scale = 10u32.pow((5 - precision) as u32);
        let centre = scale / 2;

        let offset = |part: &str| -> u32 {
            let value = if part.is_empty() {
                0
            } else {
                part.parse::<u32>().unwrap_or(0)
            };
            value * scale + centre
        };

        Ok(Self {
            easting: e100k as u32 * 100_000 + offset(easting_digits),
            northing: n100k as u32 * 100_000 + offset(northing_digits),
        })
    }

    /// Format with `digits` total digits (even, 2 to 10). Returns `None` for
    /// an unsupported precision or a point outside the lettered grid.
    pub fn to_string_with(&self, digits: usize) -> Option<String> {
        if !(2..=10).contains(&digits) || digits % 2 != 0 {
            return None;
        }

        let e100k = (self.easting / 100_000) as i32;
        let n100k = (self.northing / 100_000) as i32;
        if e100k > 6 || n100k > 12 {
            return None;
        }

        let mut first = (19 - n100k) - (19 - n100k) % 5 + (e100k + 10) / 5;
        let mut second = (19 - n100k) * 5 % 25 + e100k % 5;
        // 'I' is not used on the grid.
        if first > 7 {
            first += 1;
        }
        if second > 7 {
            second += 1;
        }

        let half = digits / 2;
        let divisor = 10u32.pow((5 - half) as u32);
        let easting = (self.easting % 100_000) / divisor;
        let northing = (self.northing % 100_000) / divisor;

        Some(format!(
            "{}{} {:0width$} {:0width$}",
            (b'A' + first as u8) as char,
            (b'A' + second as u8) as char,
            easting,
            northing,
            width = half
        ))
    }
}

impl FromStr for OsGridRef {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for OsGridRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_string_with(10) {
            Some(gridref) => f.write_str(&gridref),
            None => write!(f, "{},{}", self.easting, self.northing),
        }
    }
}

// A=0 .. Z=24 with 'I' skipped.
fn letter_index(c: char) -> Option<i32> {
    if !c.is_ascii_uppercase() || c == 'I' {
        return None;
    }
    let index = (c as u8 - b'A') as i32;
    Some(if index > 7 { index - 1 } else { index })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_digit_reference_lands_on_square_centre() {
        let gridref = OsGridRef::parse("SU387148").unwrap();
        assert_eq!(gridref, OsGridRef::new(438_750, 114_850));
    }

    #[test]
    fn spaces_and_case_are_ignored() {
        assert_eq!(
            OsGridRef::parse(" sx 9190 9255 ").unwrap(),
            OsGridRef::parse("SX91909255").unwrap()
        );
    }

    #[test]
    fn ten_digit_reference_is_exact() {
        let gridref = OsGridRef::parse("TG 51409 13177").unwrap();
        assert_eq!(gridref, OsGridRef::new(651_409, 313_177));
    }

    #[test]
    fn letters_only_addresses_the_100km_square_centre() {
        assert_eq!(
            OsGridRef::parse("SV").unwrap(),
            OsGridRef::new(50_000, 50_000)
        );
    }

    #[test]
    fn rejects_malformed_references() {
        for bad in ["", "S", "SI1234", "SU12345", "SU1a", "AA1234", "SU123456789012", "12SU"] {
            assert!(
                matches!(OsGridRef::parse(bad), Err(LookupError::InvalidGridRef(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn formats_back_to_letters() {
        let gridref = OsGridRef::new(438_750, 114_850);
        assert_eq!(gridref.to_string(), "SU 38750 14850");
        assert_eq!(gridref.to_string_with(6).as_deref(), Some("SU 387 148"));
        assert_eq!(gridref.to_string_with(5), None);
    }

    #[test]
    fn formatting_outside_grid_is_none() {
        assert_eq!(OsGridRef::new(800_000, 100_000).to_string_with(10), None);
    }
}
