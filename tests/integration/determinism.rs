//! Property-based tests for determinism guarantees

use proptest::prelude::*;
use stickerquiz::archetype::derive_local;
use stickerquiz::generation::{build_prompt, PromptOptions};
use stickerquiz::quiz::{AnswerSet, QuestionCatalog};

/// Pick one option per question (slider by position) and record them in
/// catalog order or reversed.
fn answer_set(catalog: &QuestionCatalog, picks: &[usize; 5], slider: u8, reversed: bool) -> AnswerSet {
    let mut choices: Vec<(String, String, Option<u8>)> = catalog
        .questions()
        .iter()
        .zip(picks.iter())
        .map(|(question, pick)| {
            if question.is_slider() {
                let option = question.slider_option(slider).unwrap();
                (question.id.clone(), option.id.clone(), Some(slider))
            } else {
                let option = &question.options[pick % question.options.len()];
                (question.id.clone(), option.id.clone(), None)
            }
        })
        .collect();
    if reversed {
        choices.reverse();
    }
    let mut answers = AnswerSet::new();
    for (question, option, intensity) in choices {
        answers.record(catalog, &question, &option, intensity).unwrap();
    }
    answers
}

/// Same answers give the same archetype and prompt, regardless of the order
/// they were given in.
#[test]
fn test_archetype_and_prompt_are_deterministic() {
    let catalog = QuestionCatalog::builtin();
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(any::<[usize; 5]>(), 0u8..=100, any::<bool>(), any::<bool>()),
            |(picks, slider, has_photo, personalize)| {
                let forward = answer_set(&catalog, &picks, slider, false);
                let backward = answer_set(&catalog, &picks, slider, true);
                prop_assert_eq!(&forward, &backward);

                let archetype = derive_local(&catalog, &forward);
                prop_assert_eq!(&archetype, &derive_local(&catalog, &backward));

                let options = PromptOptions {
                    personalize_skipped_photo: personalize,
                };
                let first = build_prompt(&archetype, &catalog, Some(&forward), has_photo, options);
                let second = build_prompt(&archetype, &catalog, Some(&backward), has_photo, options);
                prop_assert_eq!(&first, &second);
                let needle = format!("'{}'", archetype.name);
                prop_assert!(first.contains(&needle));
                Ok(())
            },
        )
        .unwrap();
}

/// Moving the slider right never selects a lower stop.
#[test]
fn test_slider_mapping_is_monotonic() {
    let catalog = QuestionCatalog::builtin();
    let slider = catalog.find("risk_appetite").unwrap();
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(0u8..=100, 0u8..=100), |(a, b)| {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let low_stop = slider.slider_option(low).unwrap().scale_value.unwrap();
            let high_stop = slider.slider_option(high).unwrap().scale_value.unwrap();
            prop_assert!(low_stop <= high_stop);
            Ok(())
        })
        .unwrap();
}

proptest! {
    #[test]
    fn prop_out_of_range_slider_values_are_rejected(value in 101u8..=255) {
        let catalog = QuestionCatalog::builtin();
        let slider = catalog.find("risk_appetite").unwrap();
        prop_assert!(slider.slider_option(value).is_err());
    }
}
