//! Minor Planet Center packed formats
//!
//! Dates (`K14AU`), permanent numbers (`C3456`) and provisional
//! designations (`K14A12B`) are packed into short fixed-width fields in MPC
//! catalogs. Matching against those catalogs depends on these encodings
//! being byte-exact.

use crate::error::{EphemError, Result};

/// Digit alphabet for packed month and day fields
const DATE_ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Letters replacing the leading two digits of large numbers (A = 10)
const NUMBER_LETTERS: &[u8; 52] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Century letters and the first year they encode
const CENTURIES: [(char, i32); 3] = [('I', 1800), ('J', 1900), ('K', 2000)];

fn alphabet_index(symbol: u8) -> Option<u32> {
    DATE_ALPHABET
        .iter()
        .position(|&c| c == symbol)
        .map(|i| i as u32)
}

/// Decode a packed date into (year, month, day)
pub fn decode_date(code: &str) -> Result<(i32, u32, u32)> {
    let malformed = || EphemError::MalformedPackedDate(code.to_string());
    let bytes = code.as_bytes();
    if bytes.len() != 5 || !code.is_ascii() {
        return Err(malformed());
    }

    let century = CENTURIES
        .iter()
        .find(|(letter, _)| *letter as u8 == bytes[0])
        .map(|(_, year)| *year)
        .ok_or_else(malformed)?;
    let year_digits = &code[1..3];
    if !year_digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let year = century + year_digits.parse::<i32>().map_err(|_| malformed())?;

    let month = alphabet_index(bytes[3]).ok_or_else(malformed)?;
    let day = alphabet_index(bytes[4]).ok_or_else(malformed)?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(malformed());
    }
    Ok((year, month, day))
}

/// Encode (year, month, day) as a packed date; years 1800..=2099 only
pub fn encode_date(year: i32, month: u32, day: u32) -> Result<String> {
    let malformed = || EphemError::MalformedPackedDate(format!("{year:04}-{month:02}-{day:02}"));
    let (letter, base) = CENTURIES
        .iter()
        .find(|(_, base)| (*base..*base + 100).contains(&year))
        .ok_or_else(malformed)?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(malformed());
    }
    Ok(format!(
        "{}{:02}{}{}",
        letter,
        year - base,
        DATE_ALPHABET[month as usize] as char,
        DATE_ALPHABET[day as usize] as char
    ))
}

/// Pack a permanent number, accepting the bracketed `(123456)` form
///
/// Numbers above 99999 replace their leading digits with a letter,
/// so 123456 becomes `C3456`.
pub fn pack_number(number: &str) -> Result<String> {
    let digits = number.trim().trim_start_matches('(').trim_end_matches(')');
    let value: u32 = digits
        .parse()
        .map_err(|_| EphemError::MalformedIdentifier(number.to_string()))?;
    if value <= 99_999 {
        return Ok(format!("{value:05}"));
    }
    let letter = NUMBER_LETTERS
        .get((value / 10_000) as usize - 10)
        .ok_or_else(|| EphemError::MalformedIdentifier(number.to_string()))?;
    Ok(format!("{}{:04}", *letter as char, value % 10_000))
}

/// Pack a provisional designation such as `2014 AB12` into `K14A12B`
///
/// Only 19xx and 20xx designations are packed; cycle counts up to 619 are
/// supported.
pub fn pack_designation(designation: &str) -> Result<String> {
    let malformed = || EphemError::MalformedIdentifier(designation.to_string());
    let name = designation.trim();
    if !name.is_ascii() || name.len() < 7 || name.as_bytes()[4] != b' ' {
        return Err(malformed());
    }
    let letter = match &name[..2] {
        "19" => 'J',
        "20" => 'K',
        _ => return Err(malformed()),
    };
    let year = &name[2..4];
    let half_month = &name[5..6];
    let order = &name[6..7];
    let cycle_digits = &name[7..];
    if !year.bytes().all(|b| b.is_ascii_digit())
        || !cycle_digits.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(malformed());
    }

    let cycle = match cycle_digits.len() {
        0 => "00".to_string(),
        1 => format!("0{cycle_digits}"),
        2 => cycle_digits.to_string(),
        3 => {
            let lead: usize = cycle_digits[..2].parse().map_err(|_| malformed())?;
            let code = lead
                .checked_sub(10)
                .and_then(|i| NUMBER_LETTERS.get(i))
                .ok_or_else(malformed)?;
            format!("{}{}", *code as char, &cycle_digits[2..])
        }
        _ => return Err(malformed()),
    };
    Ok(format!("{letter}{year}{half_month}{cycle}{order}"))
}
