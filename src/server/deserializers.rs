use serde::{Deserialize, Deserializer};
use serde_aux::field_attributes::deserialize_number_from_string;

// the quiz page sends the selected category id as a string, "All" as the number 0
#[derive(Deserialize, Debug)]
pub struct QuizCategory {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

// `null` instead of a list happens on the first question of a quiz
pub fn deserialize_null_as_empty<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<i64>>::deserialize(deserializer)?.unwrap_or_default())
}
