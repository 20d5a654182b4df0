use super::classify::TriageCategory;

pub const URGENT_RESPONSE: &str = "Based on your symptoms, this may be urgent. \
I recommend seeking immediate medical attention. \
Would you like me to connect you to a medical assistant?";

pub const ROUTINE_RESPONSE: &str = "This doesn't appear to be an emergency. \
Would you like to schedule an appointment with a doctor?";

pub const SELF_CARE_RESPONSE: &str = "It seems like a mild condition. \
You can try resting and staying hydrated. \
Let me know if you'd like help with anything else.";

/// Fixed reply for a triage outcome.
pub fn response_for(category: TriageCategory) -> &'static str {
    match category {
        TriageCategory::Urgent => URGENT_RESPONSE,
        TriageCategory::Routine => ROUTINE_RESPONSE,
        TriageCategory::SelfCare => SELF_CARE_RESPONSE,
    }
}
