//! Candidate filtering and uniform random draws.
//!
//! All draws take the random source as a parameter so a seeded generator
//! reproduces the same paper.

use std::collections::HashSet;

use rand::seq::{index, IndexedRandom};
use rand::Rng;

use crate::model::{Question, QuestionId};

/// Drop every candidate whose id is already in `used`.
///
/// Candidate order is preserved.
pub fn exclude_used(candidates: Vec<Question>, used: &HashSet<QuestionId>) -> Vec<Question> {
    if used.is_empty() {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|q| !used.contains(&q.id))
        .collect()
}

/// Pick one candidate uniformly at random.
pub fn choose_one<'a, R: Rng + ?Sized>(
    candidates: &'a [Question],
    rng: &mut R,
) -> Option<&'a Question> {
    candidates.choose(rng)
}

/// Draw `count` distinct candidates uniformly without replacement.
///
/// The result is in draw order. Returns fewer than `count` items only when
/// there are fewer candidates than requested.
pub fn choose_many<'a, R: Rng + ?Sized>(
    candidates: &'a [Question],
    count: usize,
    rng: &mut R,
) -> Vec<&'a Question> {
    let amount = count.min(candidates.len());
    index::sample(rng, candidates.len(), amount)
        .into_iter()
        .map(|i| &candidates[i])
        .collect()
}

/// Label for the `index`-th alternative of a group: `a`, `b`, `c`, ...
pub fn option_label(index: usize) -> char {
    debug_assert!(index < 26, "option index out of range: {index}");
    char::from(b'a' + (index % 26) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use uuid::Uuid;

    use crate::model::{Difficulty, QuestionKind};

    fn questions(n: usize) -> Vec<Question> {
        let course = Uuid::new_v4();
        let unit = Uuid::new_v4();
        (0..n)
            .map(|i| Question {
                id: Uuid::new_v4(),
                course_id: course,
                text: format!("Question {i}"),
                kind: QuestionKind::ShortAnswer,
                marks: 2,
                difficulty: Difficulty::Easy,
                unit_id: unit,
                outcome_ids: vec![],
                created_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn exclude_used_keeps_order() {
        let pool = questions(4);
        let used: HashSet<_> = [pool[1].id].into_iter().collect();
        let kept = exclude_used(pool.clone(), &used);
        let ids: Vec<_> = kept.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![pool[0].id, pool[2].id, pool[3].id]);
    }

    #[test]
    fn exclude_nothing_when_set_empty() {
        let pool = questions(3);
        assert_eq!(exclude_used(pool.clone(), &HashSet::new()), pool);
    }

    #[test]
    fn choose_one_from_empty_is_none() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(choose_one(&[], &mut rng).is_none());
    }

    #[test]
    fn choose_one_returns_a_candidate() {
        let pool = questions(5);
        let mut rng = StdRng::seed_from_u64(7);
        let picked = choose_one(&pool, &mut rng).unwrap();
        assert!(pool.iter().any(|q| q.id == picked.id));
    }

    #[test]
    fn choose_many_is_distinct() {
        let pool = questions(10);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let picked = choose_many(&pool, 4, &mut rng);
            let ids: HashSet<_> = picked.iter().map(|q| q.id).collect();
            assert_eq!(picked.len(), 4);
            assert_eq!(ids.len(), 4);
        }
    }

    #[test]
    fn choose_many_caps_at_pool_size() {
        let pool = questions(1);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(choose_many(&pool, 2, &mut rng).len(), 1);
    }

    #[test]
    fn same_seed_same_draw() {
        let pool = questions(20);
        let a: Vec<_> = choose_many(&pool, 2, &mut StdRng::seed_from_u64(99))
            .iter()
            .map(|q| q.id)
            .collect();
        let b: Vec<_> = choose_many(&pool, 2, &mut StdRng::seed_from_u64(99))
            .iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn every_candidate_can_be_drawn() {
        let pool = questions(3);
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.insert(choose_one(&pool, &mut rng).unwrap().id);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn labels_are_contiguous_letters() {
        assert_eq!(option_label(0), 'a');
        assert_eq!(option_label(1), 'b');
        assert_eq!(option_label(2), 'c');
    }
}
