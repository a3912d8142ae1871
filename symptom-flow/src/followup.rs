use rand::RngCore;
use rand::seq::index;
use std::collections::HashMap;

use crate::reference::ReferenceData;

/// Chooses which symptoms to ask about after the primary one.
pub trait FollowupPlanner: Send + Sync {
    fn plan(
        &self,
        reference: &ReferenceData,
        current_symptom: &str,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<String>;
}

/// Uniform sample without replacement from the vocabulary, excluding the current symptom.
pub struct RandomFollowups;

impl FollowupPlanner for RandomFollowups {
    fn plan(
        &self,
        reference: &ReferenceData,
        current_symptom: &str,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<String> {
        sample_excluding(reference.vocabulary(), &[current_symptom], count, rng)
    }
}

/// Symptoms that share catalog diseases with the current symptom, most frequent first.
/// Ties keep vocabulary order; a short list is topped up with random symptoms.
pub struct CoOccurrenceFollowups;

impl FollowupPlanner for CoOccurrenceFollowups {
    fn plan(
        &self,
        reference: &ReferenceData,
        current_symptom: &str,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for disease in reference.catalog() {
            if !disease.symptoms.iter().any(|s| s == current_symptom) {
                continue;
            }
            for symptom in &disease.symptoms {
                if symptom != current_symptom {
                    *counts.entry(symptom.as_str()).or_default() += 1;
                }
            }
        }

        let mut ranked: Vec<(usize, &String)> = reference
            .vocabulary()
            .iter()
            .enumerate()
            .filter(|(_, s)| counts.contains_key(s.as_str()))
            .collect();
        // stable sort keeps vocabulary order between equal counts
        ranked.sort_by_key(|(_, s)| std::cmp::Reverse(counts[s.as_str()]));

        let mut planned: Vec<String> = ranked
            .into_iter()
            .take(count)
            .map(|(_, s)| s.clone())
            .collect();

        if planned.len() < count {
            let mut exclude: Vec<&str> = planned.iter().map(String::as_str).collect();
            exclude.push(current_symptom);
            let extra = sample_excluding(
                reference.vocabulary(),
                &exclude,
                count - planned.len(),
                rng,
            );
            planned.extend(extra);
        }
        planned
    }
}

fn sample_excluding(
    vocabulary: &[String],
    exclude: &[&str],
    count: usize,
    rng: &mut dyn RngCore,
) -> Vec<String> {
    let pool: Vec<&String> = vocabulary
        .iter()
        .filter(|s| !exclude.contains(&s.as_str()))
        .collect();
    let amount = count.min(pool.len());
    index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i].clone())
        .collect()
}
