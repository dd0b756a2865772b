//! Grid coordinates and bounding boxes

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell position (e.g., "A1", "ZZ100")
///
/// Positions are 0-based internally; the textual A1 form uses column
/// letters (A-ZZZ) and a 1-based row number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ...)
    pub col: u16,
}

impl Position {
    /// Create a new position
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Check whether the position lies inside the addressable grid
    pub fn is_valid(&self) -> bool {
        self.row < MAX_ROWS && self.col < MAX_COLS
    }

    /// Parse a position from A1-style notation
    ///
    /// Accepts exactly one to three uppercase column letters followed by a
    /// row number without leading zeros (`[A-Z]{1,3}[1-9][0-9]{0,4}`), and
    /// range-checks the result against the grid limits.
    ///
    /// # Examples
    /// ```
    /// use tally_sheets_core::Position;
    ///
    /// let pos = Position::parse("A1").unwrap();
    /// assert_eq!(pos.row, 0);
    /// assert_eq!(pos.col, 0);
    ///
    /// assert!(Position::parse("A0").is_err());
    /// assert!(Position::parse("a1").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();

        let letters = bytes.iter().take_while(|b| b.is_ascii_uppercase()).count();
        if letters == 0 || letters > 3 {
            return Err(Error::InvalidPosition(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let digits = &s[letters..];
        if digits.is_empty()
            || digits.len() > 5
            || !digits.bytes().all(|b| b.is_ascii_digit())
            || digits.starts_with('0')
        {
            return Err(Error::InvalidPosition(format!("bad row number in '{}'", s)));
        }

        let col = Self::letters_to_column(&s[..letters])?;

        // Rows are 1-based in text, 0-based internally
        let row: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidPosition(format!("bad row number in '{}'", s)))?;
        let row = row - 1;

        if row >= MAX_ROWS {
            return Err(Error::InvalidPosition(format!(
                "row {} out of range in '{}'",
                row + 1,
                s
            )));
        }

        Ok(Self { row, col })
    }

    /// Convert a column index to letters (0 = A, 25 = Z, 26 = AA, ...)
    pub fn column_to_letters(col: u16) -> String {
        let mut result = String::new();
        let mut n = col as u32 + 1;

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to an index (A = 0, Z = 25, AA = 26, ...)
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidPosition("empty column letters".into()));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_uppercase() {
                return Err(Error::InvalidPosition(format!(
                    "bad column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c as u32 - 'A' as u32 + 1);
        }

        let col = col - 1;

        if col >= MAX_COLS as u32 {
            return Err(Error::InvalidPosition(format!(
                "column {} out of range",
                letters
            )));
        }

        Ok(col as u16)
    }

    /// Format as an A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Row/column extent of a printable area
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub rows: u32,
    pub cols: u16,
}

impl Size {
    /// Create a new size
    pub fn new(rows: u32, cols: u16) -> Self {
        Self { rows, cols }
    }
}
