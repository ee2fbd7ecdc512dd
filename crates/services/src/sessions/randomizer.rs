use rand::Rng;
use rand::seq::SliceRandom;

use quiz_core::model::{QuestionError, QuestionRecord, RandomizedQuestion};

/// Fix the option order for one question.
///
/// Options start in source order and go through an unbiased Fisher–Yates
/// pass (`SliceRandom::shuffle` walks from the last index down to 1, swapping
/// with a uniform index in `0..=i`), so each of the six orderings is equally
/// likely.
///
/// # Errors
///
/// Returns `QuestionError::NotAPermutation` only if the record's options
/// cannot be reattached, which the shuffle never produces.
pub fn randomize<R: Rng + ?Sized>(
    record: QuestionRecord,
    rng: &mut R,
) -> Result<RandomizedQuestion, QuestionError> {
    let mut options = record.options_in_source_order();
    options.as_mut_slice().shuffle(rng);
    RandomizedQuestion::from_options(record, options)
}

/// Randomize every fetched question, keeping the fetch order.
///
/// # Errors
///
/// Propagates `QuestionError` from [`randomize`].
pub fn randomize_all<R: Rng + ?Sized>(
    records: impl IntoIterator<Item = QuestionRecord>,
    rng: &mut R,
) -> Result<Vec<RandomizedQuestion>, QuestionError> {
    records
        .into_iter()
        .map(|record| randomize(record, &mut *rng))
        .collect()
}
