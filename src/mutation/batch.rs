use crate::util::{Result, Status};

/// Outcome of a batched write, one entry per submitted mutation in
/// submission order.
///
/// Batches carry no cross-row atomicity: some entries may be applied while
/// others failed. The report never collapses that into a single flag.
#[derive(Debug)]
pub struct BatchReport {
    results: Vec<Result<()>>,
}

impl BatchReport {
    pub(crate) fn new(results: Vec<Result<()>>) -> Self {
        BatchReport { results }
    }

    /// Per-entry results, indexed like the submitted batch
    pub fn results(&self) -> &[Result<()>] {
        &self.results
    }

    pub fn result(&self, index: usize) -> Option<&Result<()>> {
        self.results.get(index)
    }

    /// Number of entries in the batch
    #[inline]
    pub fn count(&self) -> usize {
        self.results.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn succeeded(&self) -> Vec<usize> {
        self.results
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_ok())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn failed(&self) -> Vec<(usize, &Status)> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_ref().err().map(|e| (i, e)))
            .collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.is_ok())
    }

    pub fn into_results(self) -> Vec<Result<()>> {
        self.results
    }
}
