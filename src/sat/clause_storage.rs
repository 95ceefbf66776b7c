#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Region allocator for clause records.
//!
//! Clauses live in one contiguous `u32` region and are addressed by 32-bit
//! offsets (`CRef`), so every clause handle held anywhere in the solver stays
//! valid across reallocation of the region itself. Freeing only counts the
//! words as wasted; the record stays readable until the next compaction,
//! which copies live clauses into a fresh region and rewrites every held
//! `CRef` through a forwarding word left in the relocated clause's first
//! literal slot.

use crate::sat::clause::{
    header_has_extra, header_reloced, header_set_reloced, header_size, header_word, record_words,
    Clause, ClauseMut,
};
use crate::sat::literal::Lit;
use thiserror::Error;

/// A clause reference: an offset into the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CRef(u32);

impl CRef {
    /// Sentinel for "no clause" (decision or top-level fact reasons).
    pub const UNDEF: Self = Self(u32::MAX);

    const fn offset(self) -> usize {
        self.0 as usize
    }
}

impl Default for CRef {
    fn default() -> Self {
        Self::UNDEF
    }
}

/// Raised when the arena cannot grow: either the configured memory limit or
/// the 32-bit offset space is exhausted. Surfaces as an indeterminate solve
/// result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("clause arena exhausted: {in_use} words in use, {requested} more requested")]
pub struct OutOfMemoryError {
    /// Words the failing allocation asked for.
    pub requested: usize,
    /// Words currently in use.
    pub in_use: usize,
}

/// The clause arena.
#[derive(Debug, Clone)]
pub struct ClauseAllocator {
    memory: Vec<u32>,
    wasted: usize,
    extra_clause_field: bool,
    limit_words: usize,
}

/// Offsets stay within `u32` and `CRef::UNDEF` is reserved.
const MAX_WORDS: usize = u32::MAX as usize - 1;

impl Default for ClauseAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ClauseAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    #[must_use]
    pub fn with_capacity(words: usize) -> Self {
        Self {
            memory: Vec::with_capacity(words),
            wasted: 0,
            extra_clause_field: false,
            limit_words: MAX_WORDS,
        }
    }

    /// Words currently allocated (high-water mark, including wasted ones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Words owned by freed clauses, reclaimable by compaction.
    #[must_use]
    pub const fn wasted(&self) -> usize {
        self.wasted
    }

    /// Whether problem clauses are allocated with the trailing abstraction
    /// word. Enabled while the simplifier owns the clause database.
    #[must_use]
    pub const fn extra_clause_field(&self) -> bool {
        self.extra_clause_field
    }

    pub fn set_extra_clause_field(&mut self, on: bool) {
        self.extra_clause_field = on;
    }

    /// Caps the arena at roughly `megabytes` of clause storage. Allocations
    /// past the cap fail with [`OutOfMemoryError`].
    pub fn set_memory_limit(&mut self, megabytes: usize) {
        self.limit_words = megabytes
            .saturating_mul(1024 * 1024 / 4)
            .min(MAX_WORDS);
    }

    /// Allocates a clause record and returns its reference.
    ///
    /// Learnt clauses always carry the extra word (their activity); problem
    /// clauses carry it only while `extra_clause_field` is set.
    ///
    /// # Errors
    ///
    /// Fails when the record would exceed the memory limit or the offset
    /// space.
    pub fn alloc(&mut self, lits: &[Lit], learnt: bool) -> Result<CRef, OutOfMemoryError> {
        debug_assert!(!lits.is_empty());
        let has_extra = learnt || self.extra_clause_field;
        let words = record_words(lits.len(), has_extra);
        if self.memory.len() + words > self.limit_words {
            return Err(OutOfMemoryError {
                requested: words,
                in_use: self.memory.len() - self.wasted,
            });
        }

        #[allow(clippy::cast_possible_truncation)]
        let cref = CRef(self.memory.len() as u32);
        self.memory.push(header_word(lits.len(), learnt, has_extra));
        #[allow(clippy::cast_possible_truncation)]
        self.memory.extend(lits.iter().map(|l| l.index() as u32));
        if has_extra {
            if learnt {
                self.memory.push(0.0f32.to_bits());
            } else {
                self.memory.push(crate::sat::clause::abstraction(lits.iter().copied()));
            }
        }
        Ok(cref)
    }

    /// Copies a clause from another arena into this one, used during
    /// compaction. The destination's `extra_clause_field` decides whether a
    /// problem clause keeps its abstraction word.
    fn alloc_copy(&mut self, from: Clause<'_>) -> CRef {
        let learnt = from.learnt();
        let has_extra = learnt || (self.extra_clause_field && from.has_extra());
        #[allow(clippy::cast_possible_truncation)]
        let cref = CRef(self.memory.len() as u32);
        self.memory
            .push(header_word(from.len(), learnt, has_extra));
        #[allow(clippy::cast_possible_truncation)]
        self.memory.extend(from.iter().map(|l| l.index() as u32));
        if has_extra {
            if learnt {
                self.memory.push(from.activity().to_bits());
            } else {
                self.memory.push(from.abstraction());
            }
        }
        cref
    }

    /// Read-only view of the clause at `cref`.
    ///
    /// # Panics
    ///
    /// Panics if `cref` does not address a clause record.
    #[must_use]
    pub fn clause(&self, cref: CRef) -> Clause<'_> {
        let at = cref.offset();
        let header = self.memory[at];
        let words = record_words(header_size(header), header_has_extra(header));
        Clause::from_raw(&self.memory[at..at + words])
    }

    /// Mutable view of the clause at `cref`.
    ///
    /// # Panics
    ///
    /// Panics if `cref` does not address a clause record.
    #[must_use]
    pub fn clause_mut(&mut self, cref: CRef) -> ClauseMut<'_> {
        let at = cref.offset();
        let header = self.memory[at];
        let words = record_words(header_size(header), header_has_extra(header));
        ClauseMut::from_raw(&mut self.memory[at..at + words])
    }

    /// Releases the clause's words. The record stays readable until the next
    /// compaction.
    pub fn free(&mut self, cref: CRef) {
        let c = self.clause(cref);
        self.wasted += record_words(c.len(), c.has_extra());
    }

    fn is_reloced(&self, cref: CRef) -> bool {
        header_reloced(self.memory[cref.offset()])
    }

    fn forward(&self, cref: CRef) -> CRef {
        CRef(self.memory[cref.offset() + 1])
    }

    fn set_forward(&mut self, cref: CRef, to: CRef) {
        let at = cref.offset();
        self.memory[at] = header_set_reloced(self.memory[at]);
        self.memory[at + 1] = to.0;
    }

    /// Relocates `cref` into the arena `to`, updating the caller's reference.
    /// The first relocation of a clause copies it and leaves a forwarding
    /// word behind; later relocations just follow the forwarding word.
    pub fn reloc(&mut self, cref: &mut CRef, to: &mut Self) {
        if self.is_reloced(*cref) {
            *cref = self.forward(*cref);
            return;
        }
        let new_cref = to.alloc_copy(self.clause(*cref));
        self.set_forward(*cref, new_cref);
        *cref = new_cref;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(values: &[i32]) -> Vec<Lit> {
        values.iter().map(|&v| Lit::from_dimacs(v)).collect()
    }

    #[test]
    fn test_alloc_and_read_back() {
        let mut ca = ClauseAllocator::new();
        let cr = ca.alloc(&lits(&[1, -2, 3]), false).unwrap();
        let c = ca.clause(cr);

        assert_eq!(c.len(), 3);
        assert!(!c.learnt());
        assert!(!c.has_extra());
        assert_eq!(c.lit(0), Lit::from_dimacs(1));
        assert_eq!(c.lit(2), Lit::from_dimacs(3));
    }

    #[test]
    fn test_learnt_carries_activity() {
        let mut ca = ClauseAllocator::new();
        let cr = ca.alloc(&lits(&[1, 2]), true).unwrap();
        assert!(ca.clause(cr).has_extra());
        assert!(ca.clause(cr).activity().abs() < f32::EPSILON);

        ca.clause_mut(cr).set_activity(1.5);
        assert!((ca.clause(cr).activity() - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_extra_field_gives_problem_clauses_abstractions() {
        let mut ca = ClauseAllocator::new();
        ca.set_extra_clause_field(true);
        let cr = ca.alloc(&lits(&[1, -2]), false).unwrap();
        let expected = crate::sat::clause::abstraction(lits(&[1, -2]).into_iter());
        assert_eq!(ca.clause(cr).abstraction(), expected);
    }

    #[test]
    fn test_free_counts_wasted_words() {
        let mut ca = ClauseAllocator::new();
        let cr = ca.alloc(&lits(&[1, 2, 3]), false).unwrap();
        assert_eq!(ca.wasted(), 0);
        ca.free(cr);
        assert_eq!(ca.wasted(), 4);
    }

    #[test]
    fn test_reloc_forwards_shared_references() {
        let mut ca = ClauseAllocator::new();
        let cr = ca.alloc(&lits(&[1, -2, 3]), false).unwrap();
        let mut first = cr;
        let mut second = cr;

        let mut to = ClauseAllocator::with_capacity(ca.len());
        ca.reloc(&mut first, &mut to);
        ca.reloc(&mut second, &mut to);

        assert_eq!(first, second, "second reloc must follow the forwarding word");
        let c = to.clause(first);
        assert_eq!(c.len(), 3);
        assert_eq!(c.lit(1), Lit::from_dimacs(-2));
    }

    #[test]
    fn test_memory_limit_reports_out_of_memory() {
        let mut ca = ClauseAllocator::new();
        ca.limit_words = 8;
        assert!(ca.alloc(&lits(&[1, 2, 3]), false).is_ok());
        let err = ca.alloc(&lits(&[1, 2, 3, 4, 5]), false).unwrap_err();
        assert_eq!(err.requested, 6);
    }
}
