#![forbid(unsafe_code)]

//! Variable categories and item placements.
//!
//! A [`Category`] is the ground truth attached to every item. A
//! [`Placement`] is where an item currently sits: one of the three buckets or
//! the unclassified pool.

use std::fmt;

/// The role a variable plays in an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "json",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Category {
    /// The single factor deliberately varied (independent variable).
    Manipulated,
    /// A factor held constant for a fair comparison.
    Controlled,
    /// The measured outcome (dependent variable).
    Responding,
}

impl Category {
    /// All categories in bucket display order.
    pub const ALL: [Category; 3] = [
        Category::Manipulated,
        Category::Controlled,
        Category::Responding,
    ];

    /// Stable text key, as used by catalog content and hint lookup.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manipulated => "manipulated",
            Self::Controlled => "controlled",
            Self::Responding => "responding",
        }
    }

    /// Parse a text key. Matching is exact and lowercase.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "manipulated" => Some(Self::Manipulated),
            "controlled" => Some(Self::Controlled),
            "responding" => Some(Self::Responding),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an item currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Placement {
    /// The neutral pool of items not yet classified.
    #[default]
    Unplaced,
    /// Inside the bucket for the given category.
    Bucket(Category),
}

impl Placement {
    /// True if this placement is the bucket for `category`.
    #[must_use]
    pub fn is_correct_for(self, category: Category) -> bool {
        self == Self::Bucket(category)
    }
}

impl From<Category> for Placement {
    fn from(category: Category) -> Self {
        Self::Bucket(category)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unplaced => f.write_str("pool"),
            Self::Bucket(c) => write!(f, "{c}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_parse() {
        for c in Category::ALL {
            assert_eq!(Category::parse(c.as_str()), Some(c));
        }
    }

    #[test]
    fn parse_rejects_unknown_and_mixed_case() {
        assert_eq!(Category::parse("independent"), None);
        assert_eq!(Category::parse("Manipulated"), None);
        assert_eq!(Category::parse(""), None);
    }

    #[test]
    fn placement_default_is_pool() {
        assert_eq!(Placement::default(), Placement::Unplaced);
    }

    #[test]
    fn placement_correctness() {
        let p = Placement::from(Category::Controlled);
        assert!(p.is_correct_for(Category::Controlled));
        assert!(!p.is_correct_for(Category::Responding));
        assert!(!Placement::Unplaced.is_correct_for(Category::Controlled));
    }

    #[test]
    fn display_uses_keys() {
        assert_eq!(Category::Responding.to_string(), "responding");
        assert_eq!(Placement::Unplaced.to_string(), "pool");
        assert_eq!(Placement::Bucket(Category::Manipulated).to_string(), "manipulated");
    }
}
