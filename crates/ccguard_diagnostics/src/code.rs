//! Rule codes with category prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The area of the coding standard a rule belongs to, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Class design rules (inheritance, special members, access), prefixed with `C`.
    Class,
    /// Declaration rules (functions, variables, enums, templates), prefixed with `D`.
    Declaration,
    /// Expression and statement rules, prefixed with `E`.
    Expression,
    /// Type conversion rules, prefixed with `T`.
    Type,
    /// Preprocessor rules, prefixed with `P`.
    Preprocessor,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Class => 'C',
            Category::Declaration => 'D',
            Category::Expression => 'E',
            Category::Type => 'T',
            Category::Preprocessor => 'P',
        }
    }
}

/// A rule code combining a category prefix and a numeric identifier.
///
/// Displayed as the category prefix followed by a zero-padded 3-digit number,
/// e.g., `C103`, `P501`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}
