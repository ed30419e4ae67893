/// Predicate filters evaluated by the store during gets and scans
///
/// A [`Filter`] is an immutable tree built without any connection:
///
/// ```text
/// All
///  ├─→ Prefix("abc")                       row key starts with "abc"
///  └─→ One
///       ├─→ Regex(Row, ".*_(xyz|xxx)$")
///       └─→ Substring(Qualifier, "china")
/// ```
///
/// The tree is shipped with the request; the store compiles it once per
/// request ([`CompiledFilter`]) and evaluates it against every candidate
/// cell. A row is returned with the cells that pass, and rows without any
/// passing cell are skipped. An invalid regex is therefore reported by the
/// `get`/`scan` call that carries it, never while building the tree.
pub mod compiled;

use std::{cmp::Ordering, fmt};

pub use compiled::{CellView, CompiledFilter};

use crate::util::Slice;

/// Part of a cell a leaf predicate looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Row,
    Family,
    Qualifier,
    Value,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Target::Row => "row",
            Target::Family => "family",
            Target::Qualifier => "qualifier",
            Target::Value => "value",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl CompareOp {
    /// `ordering` is `target.cmp(comparand)`
    #[inline]
    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Equal => ordering == Ordering::Equal,
            CompareOp::NotEqual => ordering != Ordering::Equal,
            CompareOp::Greater => ordering == Ordering::Greater,
            CompareOp::GreaterOrEqual => ordering != Ordering::Less,
            CompareOp::Less => ordering == Ordering::Less,
            CompareOp::LessOrEqual => ordering != Ordering::Greater,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Equal => "=",
            CompareOp::NotEqual => "!=",
            CompareOp::Greater => ">",
            CompareOp::GreaterOrEqual => ">=",
            CompareOp::Less => "<",
            CompareOp::LessOrEqual => "<=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Row key starts with the given bytes
    Prefix(Slice),
    /// Unanchored regex search over the target bytes
    Regex { target: Target, pattern: String },
    /// Target bytes contain the substring, compared byte for byte
    /// (case-sensitive)
    Substring { target: Target, substring: Slice },
    /// `target op comparand`, byte-lexicographic
    Compare {
        target: Target,
        op: CompareOp,
        comparand: Slice,
    },
    /// Every child passes; an empty list passes
    All(Vec<Filter>),
    /// At least one child passes; an empty list never passes
    One(Vec<Filter>),
}

impl Filter {
    pub fn prefix(prefix: impl Into<Slice>) -> Self {
        Filter::Prefix(prefix.into())
    }

    pub fn regex(target: Target, pattern: impl Into<String>) -> Self {
        Filter::Regex {
            target,
            pattern: pattern.into(),
        }
    }

    pub fn substring(target: Target, substring: impl Into<Slice>) -> Self {
        Filter::Substring {
            target,
            substring: substring.into(),
        }
    }

    pub fn compare(target: Target, op: CompareOp, comparand: impl Into<Slice>) -> Self {
        Filter::Compare {
            target,
            op,
            comparand: comparand.into(),
        }
    }

    pub fn all(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::All(filters.into_iter().collect())
    }

    pub fn one(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::One(filters.into_iter().collect())
    }

    /// Number of leaf predicates in the tree
    pub fn leaf_count(&self) -> usize {
        match self {
            Filter::All(children) | Filter::One(children) => {
                children.iter().map(Filter::leaf_count).sum()
            }
            _ => 1,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Prefix(prefix) => write!(f, "prefix({prefix})"),
            Filter::Regex { target, pattern } => write!(f, "{target} ~ /{pattern}/"),
            Filter::Substring { target, substring } => {
                write!(f, "{target} contains \"{substring}\"")
            }
            Filter::Compare {
                target,
                op,
                comparand,
            } => write!(f, "{target} {} \"{comparand}\"", op.symbol()),
            Filter::All(children) => write_list(f, "ALL", children),
            Filter::One(children) => write_list(f, "ONE", children),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, name: &str, children: &[Filter]) -> fmt::Result {
    write!(f, "{name}[")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{child}")?;
    }
    f.write_str("]")
}
