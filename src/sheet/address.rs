//! Spreadsheet cell addressing
//!
//! Addresses use the usual column-letter + row-number form (`A2`, `AB17`).
//! Column letters are bijective base-26: `A`..`Z`, then `AA`..`AZ`, `BA`, …

use std::fmt;
use std::str::FromStr;

use super::SheetError;

/// A 1-based (column, row) cell position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    /// 1-based column number (A = 1)
    pub column: u32,
    /// 1-based row number
    pub row: u32,
}

impl CellAddress {
    /// Create an address from 1-based column and row numbers
    pub fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Address in column `A` of the given row
    pub fn key(row: u32) -> Self {
        Self::new(1, row)
    }

    /// Address in column `B` of the given row
    pub fn value(row: u32) -> Self {
        Self::new(2, row)
    }

    /// Address in column `C` of the given row
    pub fn flag(row: u32) -> Self {
        Self::new(3, row)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letter(self.column), self.row)
    }
}

impl FromStr for CellAddress {
    type Err = SheetError;

    /// Parse `B7`, `aa10` or `$C$3`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s.trim().chars().filter(|c| *c != '$').collect();
        let split = cleaned
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| SheetError::invalid_address(s))?;
        let (letters, digits) = cleaned.split_at(split);

        let column = column_number(letters).ok_or_else(|| SheetError::invalid_address(s))?;
        let row: u32 = digits
            .parse()
            .map_err(|_| SheetError::invalid_address(s))?;
        if row == 0 {
            return Err(SheetError::invalid_address(s));
        }

        Ok(CellAddress::new(column, row))
    }
}

/// Convert a 1-based column number to its letters (1 -> `A`, 27 -> `AA`)
///
/// Column 0 has no letter form and yields an empty string.
pub fn column_letter(mut number: u32) -> String {
    let mut letters = Vec::new();
    while number > 0 {
        let rem = ((number - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        number = (number - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Convert column letters to a 1-based column number (`A` -> 1, `aa` -> 27)
pub fn column_number(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut number: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        number = number.checked_mul(26)?.checked_add(digit)?;
    }
    Some(number)
}

/// Convert an `R<row>C<col>` reference to A1 form
///
/// A single leading `'` is ignored. Returns `None` for anything that isn't
/// a well-formed R1C1 reference.
pub fn a1_from_r1c1(input: &str) -> Option<String> {
    let input = input.strip_prefix('\'').unwrap_or(input).to_ascii_uppercase();
    let rest = input.strip_prefix('R')?;
    let (row, column) = rest.split_once('C')?;
    let row: u32 = row.parse().ok()?;
    let column: u32 = column.parse().ok()?;
    if row == 0 || column == 0 {
        return None;
    }
    Some(CellAddress::new(column, row).to_string())
}
