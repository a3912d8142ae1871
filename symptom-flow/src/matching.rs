/// Lowercases, trims and joins words with underscores so free text lines up with
/// vocabulary identifiers such as `skin_rash`.
pub fn normalize(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Finds vocabulary entries matching the user's wording.
///
/// Entries containing the query (or contained in it) win. When there are none, any
/// entry sharing a whole word with the query matches. Results keep vocabulary order.
pub fn match_symptoms(vocabulary: &[String], query: &str, limit: usize) -> Vec<String> {
    let query = normalize(query);
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let direct: Vec<&String> = vocabulary
        .iter()
        .filter(|symptom| {
            let symptom = symptom.to_lowercase();
            symptom.contains(&query) || query.contains(&symptom)
        })
        .collect();

    let matches = if direct.is_empty() {
        let query_words: Vec<&str> = query.split('_').filter(|w| !w.is_empty()).collect();
        vocabulary
            .iter()
            .filter(|symptom| {
                let symptom = symptom.to_lowercase();
                symptom
                    .split('_')
                    .any(|word| query_words.contains(&word))
            })
            .collect()
    } else {
        direct
    };

    let mut out: Vec<String> = Vec::with_capacity(limit.min(matches.len()));
    for symptom in matches {
        if out.len() == limit {
            break;
        }
        if !out.contains(symptom) {
            out.push(symptom.clone());
        }
    }
    out
}

/// `skin_rash` -> `skin rash`
pub fn display_symptom(symptom: &str) -> String {
    symptom.replace('_', " ")
}
