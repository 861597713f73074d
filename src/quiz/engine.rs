use rand::seq::SliceRandom;
use rand::Rng;

use crate::classifier::GateRequirement;
use crate::error::{GateError, GateResult};

use super::question::{Question, QuestionOrigin, Quiz, QuizItem, QuizResult};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Build a quiz honoring the requirement's source/user split.
///
/// Which questions are drawn is random; how many come from each pool is not.
/// Malformed questions are discarded before pool sizes are checked.
pub fn compose<R: Rng + ?Sized>(
    requirement: &GateRequirement,
    source_pool: &[Question],
    user_pool: &[Question],
    rng: &mut R,
) -> GateResult<Quiz> {
    let (source_needed, user_needed) = requirement.split();

    let source = usable_questions(source_pool, QuestionOrigin::Source);
    let user = usable_questions(user_pool, QuestionOrigin::UserText);

    ensure_enough(QuestionOrigin::Source, source_needed, source.len())?;
    ensure_enough(QuestionOrigin::UserText, user_needed, user.len())?;

    let mut items: Vec<QuizItem> = source
        .choose_multiple(rng, source_needed)
        .map(|question| QuizItem {
            origin: QuestionOrigin::Source,
            question: (*question).clone(),
        })
        .chain(user.choose_multiple(rng, user_needed).map(|question| QuizItem {
            origin: QuestionOrigin::UserText,
            question: (*question).clone(),
        }))
        .collect();
    items.shuffle(rng);

    Ok(Quiz {
        requirement: *requirement,
        items,
    })
}

/// Strict scoring: every question must be answered with its correct option.
///
/// `answers[i]` is the chosen option index for `quiz.items[i]`; missing
/// answers count as wrong.
pub fn score(quiz: &Quiz, answers: &[usize]) -> QuizResult {
    let correct_count = quiz
        .items
        .iter()
        .zip(answers)
        .filter(|(item, answer)| item.question.correct_index == **answer)
        .count();
    let total = quiz.len();

    QuizResult {
        passed: answers.len() == total && correct_count == total,
        correct_count,
        total,
    }
}

fn usable_questions(pool: &[Question], origin: QuestionOrigin) -> Vec<&Question> {
    pool.iter()
        .filter(|question| {
            let ok = question.is_well_formed();
            if !ok {
                log_warn!(
                    "discarding malformed {} question {} ({} options, correct index {})",
                    origin,
                    question.id,
                    question.options.len(),
                    question.correct_index
                );
            }
            ok
        })
        .collect()
}

fn ensure_enough(origin: QuestionOrigin, required: usize, available: usize) -> GateResult<()> {
    if available < required {
        return Err(GateError::InsufficientContent {
            origin,
            required,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{QuestionCount, TestMode};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn question(id: &str) -> Question {
        Question {
            id: id.into(),
            text: format!("What does {id} say?"),
            options: vec!["yes".into(), "no".into(), "maybe".into()],
            correct_index: 1,
        }
    }

    fn pool(prefix: &str, n: usize) -> Vec<Question> {
        (0..n).map(|i| question(&format!("{prefix}{i}"))).collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn mixed_draws_one_user_and_two_source() {
        let quiz = compose(
            &GateRequirement::Quoted(TestMode::Mixed),
            &pool("s", 5),
            &pool("u", 5),
            &mut rng(),
        )
        .unwrap();
        assert_eq!(quiz.len(), 3);
        assert_eq!(quiz.count_from(QuestionOrigin::Source), 2);
        assert_eq!(quiz.count_from(QuestionOrigin::UserText), 1);
        assert!(quiz
            .items
            .iter()
            .all(|item| item.question.id.starts_with(match item.origin {
                QuestionOrigin::Source => "s",
                QuestionOrigin::UserText => "u",
            })));
    }

    #[test]
    fn split_is_fixed_for_every_mode() {
        let source = pool("s", 3);
        let user = pool("u", 3);
        let cases = [
            (GateRequirement::Quoted(TestMode::SourceOnly), 3, 0),
            (GateRequirement::Quoted(TestMode::UserOnly), 0, 3),
            (GateRequirement::Original(QuestionCount::One), 0, 1),
            (GateRequirement::Original(QuestionCount::Three), 0, 3),
        ];
        for (requirement, from_source, from_user) in cases {
            let quiz = compose(&requirement, &source, &user, &mut rng()).unwrap();
            assert_eq!(quiz.count_from(QuestionOrigin::Source), from_source);
            assert_eq!(quiz.count_from(QuestionOrigin::UserText), from_user);
        }
    }

    #[test]
    fn drawn_questions_are_distinct() {
        let quiz = compose(
            &GateRequirement::Quoted(TestMode::SourceOnly),
            &pool("s", 10),
            &[],
            &mut rng(),
        )
        .unwrap();
        let ids: HashSet<_> = quiz.items.iter().map(|item| &item.question.id).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn sparse_pool_is_insufficient_content() {
        let err = compose(
            &GateRequirement::Quoted(TestMode::SourceOnly),
            &pool("s", 1),
            &pool("u", 10),
            &mut rng(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            GateError::InsufficientContent {
                origin: QuestionOrigin::Source,
                required: 3,
                available: 1,
            }
        );
        assert!(err.to_string().contains("you may still share"));
    }

    #[test]
    fn malformed_questions_do_not_count() {
        let mut user = pool("u", 1);
        user.push(Question {
            id: "one-option".into(),
            text: "?".into(),
            options: vec!["only".into()],
            correct_index: 0,
        });
        user.push(Question {
            id: "bad-index".into(),
            text: "?".into(),
            options: vec!["a".into(), "b".into()],
            correct_index: 2,
        });
        let err = compose(
            &GateRequirement::Quoted(TestMode::Mixed),
            &pool("s", 2),
            &user[1..],
            &mut rng(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GateError::InsufficientContent {
                origin: QuestionOrigin::UserText,
                available: 0,
                ..
            }
        ));

        let err = compose(
            &GateRequirement::Original(QuestionCount::Three),
            &[],
            &user,
            &mut rng(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            GateError::InsufficientContent {
                origin: QuestionOrigin::UserText,
                required: 3,
                available: 1,
            }
        );
    }

    #[test]
    fn strict_scoring_requires_every_answer() {
        let quiz = compose(
            &GateRequirement::Quoted(TestMode::Mixed),
            &pool("s", 2),
            &pool("u", 1),
            &mut rng(),
        )
        .unwrap();

        let all_right = score(&quiz, &[1, 1, 1]);
        assert!(all_right.passed);
        assert_eq!(all_right.correct_count, 3);

        let one_wrong = score(&quiz, &[1, 0, 1]);
        assert!(!one_wrong.passed);
        assert_eq!(one_wrong.correct_count, 2);

        let missing = score(&quiz, &[1, 1]);
        assert!(!missing.passed);
        assert_eq!(missing.total, 3);
    }
}
