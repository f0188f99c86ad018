//! Pulls the structured grading object out of free-form model text.
//!
//! Never fails: anything that cannot be read as a JSON object becomes an empty map.

use serde_json::{Map, Value};

/// Extracts the first JSON object embedded in `raw`.
///
/// The span from the first `{` to the last `}` is tried first. When that span is
/// not a valid object (two separate objects, stray braces in surrounding prose),
/// each `{` is tried in order and the first complete object that decodes wins.
pub fn extract_structured(raw: &str) -> Map<String, Value> {
    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        return Map::new();
    };
    if end < start {
        return Map::new();
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&raw[start..=end]) {
        return map;
    }

    first_decodable_object(&raw[start..]).unwrap_or_default()
}

fn first_decodable_object(text: &str) -> Option<Map<String, Value>> {
    text.match_indices('{').find_map(|(offset, _)| {
        let mut stream = serde_json::Deserializer::from_str(&text[offset..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(map))) => Some(map),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ignores_surrounding_prose() {
        let map = extract_structured("blah {\"scores\":{\"clarity\":3}} trailing");
        assert_eq!(Value::Object(map), json!({"scores": {"clarity": 3}}));
    }

    #[test]
    fn test_no_braces_is_empty() {
        assert!(extract_structured("no braces here").is_empty());
    }

    #[test]
    fn test_empty_input_is_empty() {
        assert!(extract_structured("").is_empty());
    }

    #[test]
    fn test_reversed_braces_are_empty() {
        assert!(extract_structured("} nothing here {").is_empty());
    }

    #[test]
    fn test_malformed_json_is_empty() {
        assert!(extract_structured("{scores: clarity=3}").is_empty());
    }

    #[test]
    fn test_truncated_output_is_empty() {
        assert!(extract_structured("{\"scores\": {\"clarity\": 3, \"tone\"").is_empty());
    }

    #[test]
    fn test_markdown_fences_are_ignored() {
        let raw = "Here you go:\n```json\n{\"scores\": {\"tone\": 4}, \"feedback\": []}\n```";
        let map = extract_structured(raw);
        assert_eq!(map["scores"]["tone"], json!(4));
        assert_eq!(map["feedback"], json!([]));
    }

    #[test]
    fn test_two_objects_returns_the_first() {
        let raw = r#"{"scores": {"clarity": 2}} and a revised version {"scores": {"clarity": 4}}"#;
        let map = extract_structured(raw);
        assert_eq!(map["scores"]["clarity"], json!(2));
    }

    #[test]
    fn test_stray_braces_after_object() {
        let raw = r#"{"scores": {"clarity": 3}, "feedback": []} Tip: wrap commands in {backticks}."#;
        let map = extract_structured(raw);
        assert_eq!(map["scores"]["clarity"], json!(3));
    }

    #[test]
    fn test_stray_braces_before_object() {
        let raw = r#"I used {placeholders} earlier. {"scores": {"tone": 5}}"#;
        let map = extract_structured(raw);
        assert_eq!(map["scores"]["tone"], json!(5));
    }

    #[test]
    fn test_braces_inside_strings_are_preserved() {
        let raw = r#"{"feedback": [{"aspect": "clarity", "issue": "uses {id}", "fix": "name the id"}]}"#;
        let map = extract_structured(raw);
        assert_eq!(map["feedback"][0]["issue"], json!("uses {id}"));
    }
}
