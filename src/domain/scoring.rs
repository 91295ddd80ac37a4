use crate::domain::models::{Answers, Chapter, Keyed, Trait, TraitScores};
use std::collections::BTreeMap;

pub const MIN_RESPONSE: i32 = 1;
pub const MAX_RESPONSE: i32 = 5;

/// Reverse-scores `minus` items on the 1-5 Likert scale.
pub fn transform_score(raw: i32, keyed: Keyed) -> i32 {
    match keyed {
        Keyed::Minus => (MAX_RESPONSE + 1) - raw,
        Keyed::Plus => raw,
    }
}

/// Averages answered items per trait, rounded to 2 decimals.
/// Traits without answered items score 0.
pub fn calc_scores(answers: &Answers, chapters: &[Chapter]) -> TraitScores {
    let mut totals: BTreeMap<Trait, (i64, u32)> =
        Trait::ALL.iter().map(|t| (*t, (0, 0))).collect();

    for item in chapters.iter().flat_map(|ch| ch.items.iter()) {
        let Some(&raw) = answers.get(&item.id) else {
            continue;
        };
        let raw = raw.clamp(MIN_RESPONSE, MAX_RESPONSE);
        let entry = totals.entry(item.trait_).or_insert((0, 0));
        entry.0 += transform_score(raw, item.keyed) as i64;
        entry.1 += 1;
    }

    totals
        .into_iter()
        .map(|(t, (sum, count))| {
            let score = if count > 0 {
                round2(sum as f64 / count as f64)
            } else {
                0.0
            };
            (t, score)
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Item;
    use pretty_assertions::assert_eq;

    fn item(id: &str, t: Trait, keyed: Keyed) -> Item {
        Item {
            id: id.to_string(),
            trait_: t,
            keyed,
            question_theme: format!("theme {id}"),
        }
    }

    fn chapter(id: &str, items: Vec<Item>) -> Chapter {
        Chapter {
            chapter_id: id.to_string(),
            title: format!("chapter {id}"),
            context: String::new(),
            spice_options: vec![],
            items,
        }
    }

    fn answers(pairs: &[(&str, i32)]) -> Answers {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_plus_and_minus_items_average() {
        let chapters = vec![chapter(
            "1",
            vec![
                item("1", Trait::Extraversion, Keyed::Plus),
                item("2", Trait::Extraversion, Keyed::Minus),
            ],
        )];
        let scores = calc_scores(&answers(&[("1", 5), ("2", 1)]), &chapters);
        assert_eq!(scores[&Trait::Extraversion], 5.0);
    }

    #[test]
    fn test_unmeasured_traits_score_zero() {
        let chapters = vec![chapter("1", vec![item("1", Trait::Openness, Keyed::Plus)])];
        let scores = calc_scores(&Answers::new(), &chapters);
        assert_eq!(scores.len(), 5);
        assert!(scores.values().all(|v| *v == 0.0));
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        let chapters = vec![chapter(
            "1",
            vec![
                item("a", Trait::Agreeableness, Keyed::Plus),
                item("b", Trait::Agreeableness, Keyed::Plus),
                item("c", Trait::Agreeableness, Keyed::Plus),
            ],
        )];
        let scores = calc_scores(&answers(&[("a", 4), ("b", 4), ("c", 3)]), &chapters);
        assert_eq!(scores[&Trait::Agreeableness], 3.67);
    }

    #[test]
    fn test_missing_answers_reduce_divisor() {
        let chapters = vec![chapter(
            "1",
            vec![
                item("a", Trait::Neuroticism, Keyed::Plus),
                item("b", Trait::Neuroticism, Keyed::Minus),
            ],
        )];
        let scores = calc_scores(&answers(&[("b", 2), ("zzz", 5)]), &chapters);
        assert_eq!(scores[&Trait::Neuroticism], 4.0);
    }

    #[test]
    fn test_order_independent() {
        let ch1 = chapter(
            "1",
            vec![
                item("1", Trait::Conscientiousness, Keyed::Plus),
                item("2", Trait::Openness, Keyed::Minus),
            ],
        );
        let ch2 = chapter(
            "2",
            vec![
                item("3", Trait::Conscientiousness, Keyed::Minus),
                item("4", Trait::Openness, Keyed::Plus),
            ],
        );
        let a = answers(&[("1", 2), ("2", 4), ("3", 1), ("4", 5)]);

        let forward = calc_scores(&a, &[ch1.clone(), ch2.clone()]);
        let mut rev1 = ch1;
        rev1.items.reverse();
        let mut rev2 = ch2;
        rev2.items.reverse();
        let backward = calc_scores(&a, &[rev2, rev1]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_measured_scores_stay_in_range() {
        let chapters = vec![chapter(
            "1",
            vec![
                item("1", Trait::Extraversion, Keyed::Plus),
                item("2", Trait::Agreeableness, Keyed::Minus),
                item("3", Trait::Openness, Keyed::Minus),
            ],
        )];
        for raw in MIN_RESPONSE..=MAX_RESPONSE {
            let scores = calc_scores(&answers(&[("1", raw), ("2", raw), ("3", raw)]), &chapters);
            for t in [Trait::Extraversion, Trait::Agreeableness, Trait::Openness] {
                assert!((1.0..=5.0).contains(&scores[&t]), "{t} = {}", scores[&t]);
            }
        }
    }

    #[test]
    fn test_out_of_range_raw_values_are_clamped() {
        let chapters = vec![chapter(
            "1",
            vec![
                item("1", Trait::Extraversion, Keyed::Plus),
                item("2", Trait::Openness, Keyed::Minus),
            ],
        )];
        let scores = calc_scores(&answers(&[("1", 9), ("2", -3)]), &chapters);
        assert_eq!(scores[&Trait::Extraversion], 5.0);
        assert_eq!(scores[&Trait::Openness], 5.0);
    }

    #[test]
    fn test_minus_transform_is_involution() {
        for x in MIN_RESPONSE..=MAX_RESPONSE {
            let once = transform_score(x, Keyed::Minus);
            assert!((MIN_RESPONSE..=MAX_RESPONSE).contains(&once));
            assert_eq!(transform_score(once, Keyed::Minus), x);
            assert_eq!(transform_score(x, Keyed::Plus), x);
        }
    }
}
