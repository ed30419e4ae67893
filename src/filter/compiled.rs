use regex::bytes::Regex;

use crate::{
    filter::{CompareOp, Filter, Target},
    util::{Result, Status},
};

/// Borrowed view of a candidate cell
#[derive(Debug, Clone, Copy)]
pub struct CellView<'a> {
    pub row: &'a [u8],
    pub family: &'a str,
    pub qualifier: &'a [u8],
    pub value: &'a [u8],
}

impl<'a> CellView<'a> {
    #[inline]
    fn target(&self, target: Target) -> &'a [u8] {
        match target {
            Target::Row => self.row,
            Target::Family => self.family.as_bytes(),
            Target::Qualifier => self.qualifier,
            Target::Value => self.value,
        }
    }
}

/// A [`Filter`] with its regexes compiled, ready for per-cell evaluation.
#[derive(Debug)]
pub enum CompiledFilter {
    Prefix(Vec<u8>),
    Regex {
        target: Target,
        regex: Regex,
    },
    Substring {
        target: Target,
        needle: Vec<u8>,
    },
    Compare {
        target: Target,
        op: CompareOp,
        comparand: Vec<u8>,
    },
    All(Vec<CompiledFilter>),
    One(Vec<CompiledFilter>),
}

impl CompiledFilter {
    pub fn compile(filter: &Filter) -> Result<Self> {
        let compiled = match filter {
            Filter::Prefix(prefix) => CompiledFilter::Prefix(prefix.data().to_vec()),
            Filter::Regex { target, pattern } => {
                let regex = Regex::new(pattern).map_err(|e| {
                    Status::invalid_argument(format!("invalid regex filter /{pattern}/: {e}"))
                })?;
                CompiledFilter::Regex {
                    target: *target,
                    regex,
                }
            }
            Filter::Substring { target, substring } => CompiledFilter::Substring {
                target: *target,
                needle: substring.data().to_vec(),
            },
            Filter::Compare {
                target,
                op,
                comparand,
            } => CompiledFilter::Compare {
                target: *target,
                op: *op,
                comparand: comparand.data().to_vec(),
            },
            Filter::All(children) => CompiledFilter::All(
                children
                    .iter()
                    .map(CompiledFilter::compile)
                    .collect::<Result<_>>()?,
            ),
            Filter::One(children) => CompiledFilter::One(
                children
                    .iter()
                    .map(CompiledFilter::compile)
                    .collect::<Result<_>>()?,
            ),
        };
        Ok(compiled)
    }

    pub fn matches(&self, cell: &CellView<'_>) -> bool {
        match self {
            CompiledFilter::Prefix(prefix) => cell.row.starts_with(prefix),
            CompiledFilter::Regex { target, regex } => regex.is_match(cell.target(*target)),
            CompiledFilter::Substring { target, needle } => {
                contains(cell.target(*target), needle)
            }
            CompiledFilter::Compare {
                target,
                op,
                comparand,
            } => op.accepts(cell.target(*target).cmp(comparand.as_slice())),
            CompiledFilter::All(children) => children.iter().all(|c| c.matches(cell)),
            CompiledFilter::One(children) => children.iter().any(|c| c.matches(cell)),
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view<'a>(row: &'a str, qualifier: &'a str, value: &'a str) -> CellView<'a> {
        CellView {
            row: row.as_bytes(),
            family: "info",
            qualifier: qualifier.as_bytes(),
            value: value.as_bytes(),
        }
    }

    fn compile(filter: Filter) -> CompiledFilter {
        CompiledFilter::compile(&filter).unwrap()
    }

    #[test]
    fn test_all_requires_every_leaf() {
        let filter = compile(Filter::all([
            Filter::prefix("abc"),
            Filter::regex(Target::Row, ".*_(xyz|xxx)$"),
        ]));

        assert!(filter.matches(&view("abc_xyz", "q", "v")));
        assert!(filter.matches(&view("abc_xxx", "q", "v")));
        assert!(!filter.matches(&view("abc_other", "q", "v")));
        assert!(!filter.matches(&view("xyz_xyz", "q", "v")));
    }

    #[test]
    fn test_one_requires_any_leaf() {
        let filter = compile(Filter::one([
            Filter::prefix("abc"),
            Filter::substring(Target::Qualifier, "china"),
        ]));

        assert!(filter.matches(&view("abc_1", "q", "v")));
        assert!(filter.matches(&view("zzz", "in_china_town", "v")));
        assert!(!filter.matches(&view("zzz", "japan", "v")));
    }

    #[test]
    fn test_empty_combinators() {
        let cell = view("r", "q", "v");
        assert!(compile(Filter::all([])).matches(&cell));
        assert!(!compile(Filter::one([])).matches(&cell));
    }

    #[test]
    fn test_compare_targets() {
        let cell = view("row5", "age", "18");

        assert!(compile(Filter::compare(Target::Value, CompareOp::Equal, "18")).matches(&cell));
        assert!(compile(Filter::compare(Target::Value, CompareOp::Less, "2")).matches(&cell));
        assert!(compile(Filter::compare(Target::Row, CompareOp::GreaterOrEqual, "row5")).matches(&cell));
        assert!(!compile(Filter::compare(Target::Qualifier, CompareOp::NotEqual, "age")).matches(&cell));
        assert!(compile(Filter::compare(Target::Family, CompareOp::Equal, "info")).matches(&cell));
    }

    #[test]
    fn test_regex_on_raw_bytes() {
        let filter = compile(Filter::regex(Target::Qualifier, r"(?-u)^\xff\x00"));
        let cell = CellView {
            row: b"r",
            family: "f",
            qualifier: &[0xff, 0x00, 0x01],
            value: b"",
        };
        assert!(filter.matches(&cell));
    }

    #[test]
    fn test_invalid_regex_reports_invalid_argument() {
        let result = CompiledFilter::compile(&Filter::all([
            Filter::prefix("a"),
            Filter::regex(Target::Row, "(unclosed"),
        ]));
        assert_eq!(
            result.unwrap_err().code(),
            crate::util::Code::InvalidArgument
        );
    }

    #[test]
    fn test_substring_empty_needle() {
        assert!(contains(b"anything", b""));
        assert!(!contains(b"ab", b"abc"));
    }

    #[test]
    fn test_substring_is_case_sensitive() {
        let filter = compile(Filter::substring(Target::Value, "chin"));
        assert!(filter.matches(&view("r", "q", "in china")));
        assert!(!filter.matches(&view("r", "q", "China")));

        // Case-insensitive matching goes through a regex flag
        let filter = compile(Filter::regex(Target::Value, "(?i)chin"));
        assert!(filter.matches(&view("r", "q", "China")));
    }
}
