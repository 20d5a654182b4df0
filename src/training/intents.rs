use std::io::Read;

use serde::{Deserialize, Serialize};

use super::TrainingError;

/// One line of an `intent,phrase,response` training file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRow {
    pub intent: String,
    pub phrase: String,
    pub response: String,
}

/// Everything needed to create one intent on the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentDefinition {
    pub display_name: String,
    pub phrases: Vec<String>,
    pub responses: Vec<String>,
}

/// Read training rows from CSV with a header line.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<TrainingRow>, TrainingError> {
    csv::Reader::from_reader(reader)
        .deserialize()
        .collect::<Result<Vec<TrainingRow>, _>>()
        .map_err(TrainingError::from)
}

/// Group rows per intent, in order of first appearance.
///
/// Phrases keep their order and duplicates; responses are de-duplicated.
pub fn group_intents(rows: Vec<TrainingRow>) -> Vec<IntentDefinition> {
    let mut intents: Vec<IntentDefinition> = Vec::new();

    for row in rows {
        let idx = match intents.iter().position(|i| i.display_name == row.intent) {
            Some(idx) => idx,
            None => {
                intents.push(IntentDefinition {
                    display_name: row.intent,
                    phrases: Vec::new(),
                    responses: Vec::new(),
                });
                intents.len() - 1
            }
        };

        let def = &mut intents[idx];
        def.phrases.push(row.phrase);
        if !def.responses.contains(&row.response) {
            def.responses.push(row.response);
        }
    }

    intents
}
