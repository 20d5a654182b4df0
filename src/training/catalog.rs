use std::io::Write;

use rand::Rng;

use super::intents::TrainingRow;
use super::TrainingError;

/// A symptom intent with the label used in its training phrases.
#[derive(Debug, Clone, Copy)]
pub struct SymptomIntent {
    pub intent: &'static str,
    pub label: &'static str,
    pub response: &'static str,
}

const fn intent(
    intent: &'static str,
    label: &'static str,
    response: &'static str,
) -> SymptomIntent {
    SymptomIntent { intent, label, response }
}

/// Built-in symptom intents. "Emergency" is trained on chest pain.
pub const SYMPTOM_INTENTS: &[SymptomIntent] = &[
    intent("Fever", "fever", "I see you have a fever. How severe is it? (mild, moderate, severe)"),
    intent("Cough", "cough", "I see you have a cough. How long has it lasted?"),
    intent("Headache", "headache", "I see you have a headache. How severe is it?"),
    intent("Emergency", "chest pain", "⚠️ This seems like an emergency. Please call emergency services immediately"),
    intent("SoreThroat", "sore throat", "It seems you have a sore throat. Warm fluids and rest may help."),
    intent("ShortnessOfBreath", "shortness of breath", "⚠️ Shortness of breath may be serious. Seek medical attention if severe."),
    intent("Fatigue", "fatigue", "It seems you are fatigued. Rest and hydration are recommended."),
    intent("Nausea", "nausea", "It seems you are feeling nauseous. Can you describe more about your symptoms?"),
    intent("Vomiting", "vomiting", "It seems you are vomiting. Stay hydrated and rest. Seek medical help if severe."),
    intent("Diarrhea", "diarrhea", "It seems you have diarrhea. Stay hydrated and monitor your condition."),
    intent("MuscleAches", "muscle aches", "It seems you have muscle aches. Rest and hydration may help."),
    intent("Cold", "cold", "It seems you have a cold. Monitor symptoms and rest."),
    intent("Dizziness", "dizziness", "⚠️ Dizziness can be serious. Please rest and seek help if persistent."),
    intent("BackPain", "back pain", "It seems you have back pain. Rest and gentle stretching may help."),
    intent("StomachAche", "stomach ache", "It seems you have stomach pain. Monitor symptoms and rest."),
    intent("Rash", "rash", "It seems you have a skin rash. Avoid scratching and monitor."),
    intent("JointPain", "joint pain", "It seems you have joint pain. Rest and gentle exercises may help."),
    intent("Insomnia", "insomnia", "It seems you have sleep problems. Try relaxation techniques and sleep hygiene."),
    intent("Allergies", "allergies", "It seems you may have allergies. Avoid triggers and monitor symptoms."),
    intent("HeartPalpitations", "heart palpitations", "⚠️ Heart palpitations can be serious. Monitor and seek help if severe."),
];

/// Lead-ins prepended to each symptom label.
pub const PHRASE_VARIATIONS: &[&str] = &[
    "I have",
    "I'm experiencing",
    "Feeling",
    "Suffering from",
    "Since yesterday I have",
    "For the past few days I have",
    "My body shows",
    "I noticed",
    "Lately I have",
    "Suddenly I have",
];

pub const DEFAULT_PHRASES_PER_INTENT: usize = 25;

/// Generate `per_intent` phrases for every catalog intent, in catalog order.
pub fn generate_rows<R: Rng + ?Sized>(rng: &mut R, per_intent: usize) -> Vec<TrainingRow> {
    SYMPTOM_INTENTS
        .iter()
        .flat_map(|entry| std::iter::repeat(entry).take(per_intent))
        .map(|entry| {
            let lead = PHRASE_VARIATIONS[rng.gen_range(0..PHRASE_VARIATIONS.len())];
            TrainingRow {
                intent: entry.intent.to_string(),
                phrase: format!("{lead} {}", entry.label),
                response: entry.response.to_string(),
            }
        })
        .collect()
}

/// Write rows as CSV with an `intent,phrase,response` header.
pub fn write_rows<W: Write>(writer: W, rows: &[TrainingRow]) -> Result<(), TrainingError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn catalog_has_twenty_unique_intents() {
        assert_eq!(SYMPTOM_INTENTS.len(), 20);
        let mut names: Vec<_> = SYMPTOM_INTENTS.iter().map(|s| s.intent).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 20);
    }

    #[test]
    fn generates_per_intent_rows_in_catalog_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let rows = generate_rows(&mut rng, DEFAULT_PHRASES_PER_INTENT);
        assert_eq!(rows.len(), 500);
        assert!(rows[..25].iter().all(|r| r.intent == "Fever"));
        assert!(rows[475..].iter().all(|r| r.intent == "HeartPalpitations"));
    }

    #[test]
    fn phrases_are_variation_plus_label() {
        let mut rng = StdRng::seed_from_u64(1);
        for row in generate_rows(&mut rng, 5) {
            let entry = SYMPTOM_INTENTS.iter().find(|s| s.intent == row.intent).unwrap();
            let lead = row
                .phrase
                .strip_suffix(&format!(" {}", entry.label))
                .expect("phrase ends with label");
            assert!(PHRASE_VARIATIONS.contains(&lead), "unexpected lead-in {lead:?}");
            assert_eq!(row.response, entry.response);
        }
    }

    #[test]
    fn emergency_is_trained_on_chest_pain() {
        let mut rng = StdRng::seed_from_u64(3);
        let rows = generate_rows(&mut rng, 3);
        assert!(rows
            .iter()
            .filter(|r| r.intent == "Emergency")
            .all(|r| r.phrase.ends_with(" chest pain")));
    }

    #[test]
    fn same_seed_same_rows() {
        let a = generate_rows(&mut StdRng::seed_from_u64(42), 4);
        let b = generate_rows(&mut StdRng::seed_from_u64(42), 4);
        assert_eq!(a, b);
    }

    #[test]
    fn written_csv_has_header_and_quotes_commas() {
        let rows = vec![TrainingRow {
            intent: "Cough".into(),
            phrase: "I have cough".into(),
            response: "Rest, and fluids.".into(),
        }];
        let mut out = Vec::new();
        write_rows(&mut out, &rows).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "intent,phrase,response\nCough,I have cough,\"Rest, and fluids.\"\n"
        );
    }
}
