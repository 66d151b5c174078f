//! Classification of the broker's JSON answers.

use serde_json::Value;

const REDIRECT_URL_KEYS: [&str; 5] = ["redirect_url", "redirectUrl", "redirectURL", "url", "redirect"];
const NESTED_REDIRECT_URL_KEYS: [&str; 4] = ["redirect_url", "redirectUrl", "redirectURL", "url"];

/// A step the broker may insert after the credentials were accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStep {
    /// Offer to set up a Goskey confirmation
    MaxQuiz {
        /// Whether the broker allows skipping it
        skippable: bool,
    },
    /// Offer to change the password
    ChangePassword,
}

/// What a broker answer asks for next.
#[derive(Debug, Clone, PartialEq)]
pub enum BranchStep {
    /// Login complete, continue at this URL.
    RedirectReady(String),
    /// A second factor must be confirmed.
    NeedsMfa,
    /// The broker wants a code confirming an unusual login.
    NeedsAnomalyCheck,
    /// An optional step must be dismissed.
    NeedsPostStep(PostStep),
    /// `DONE` without a redirect URL.
    Done,
    /// Anything else, with its `action` (empty when absent).
    Unrecognized(String),
}

/// The `action` field of a broker answer, or `""`.
pub fn action_of(body: &Value) -> &str {
    body.get("action").and_then(Value::as_str).unwrap_or_default()
}

/// Finds the redirect URL of a broker answer under any of the keys the broker has used, top-level
/// first and then nested under `data`.
pub fn extract_redirect_url(body: &Value) -> Option<String> {
    let first_string = |object: &Value, keys: &[&str]| {
        keys.iter()
            .filter_map(|key| object.get(key).and_then(Value::as_str))
            .find(|url| !url.is_empty())
            .map(str::to_owned)
    };

    first_string(body, &REDIRECT_URL_KEYS).or_else(|| {
        body.get("data")
            .filter(|data| data.is_object())
            .and_then(|data| first_string(data, &NESTED_REDIRECT_URL_KEYS))
    })
}

/// Classifies a broker answer. A redirect URL wins over whatever `action` says.
pub fn classify(body: &Value) -> BranchStep {
    if let Some(url) = extract_redirect_url(body) {
        return BranchStep::RedirectReady(url);
    }

    match action_of(body) {
        "ENTER_MFA" => BranchStep::NeedsMfa,
        "SOLVE_ANOMALY_REACTION" => BranchStep::NeedsAnomalyCheck,
        "MAX_QUIZ" => BranchStep::NeedsPostStep(PostStep::MaxQuiz {
            skippable: body
                .pointer("/max_details/skippable")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }),
        "CHANGE_PASSWORD" => BranchStep::NeedsPostStep(PostStep::ChangePassword),
        "DONE" => BranchStep::Done,
        other => BranchStep::Unrecognized(other.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_every_top_level_key_is_a_redirect() {
        for key in REDIRECT_URL_KEYS {
            let body = json!({ key: "https://sgo.example.ru/callback" });
            assert_eq!(
                classify(&body),
                BranchStep::RedirectReady("https://sgo.example.ru/callback".to_string()),
                "key {key}"
            );
        }
    }

    #[test]
    fn test_nested_data_keys_are_a_redirect() {
        for key in NESTED_REDIRECT_URL_KEYS {
            let body = json!({ "action": "DONE", "data": { key: "https://sgo.example.ru/cb" } });
            assert_eq!(
                classify(&body),
                BranchStep::RedirectReady("https://sgo.example.ru/cb".to_string()),
                "key {key}"
            );
        }
        let body = json!({ "data": { "redirect": "https://sgo.example.ru/cb" } });
        assert_eq!(classify(&body), BranchStep::Unrecognized(String::new()));
    }

    #[test]
    fn test_redirect_wins_over_action() {
        let body = json!({ "action": "ENTER_MFA", "redirect_url": "https://sgo.example.ru/cb" });
        assert_eq!(
            classify(&body),
            BranchStep::RedirectReady("https://sgo.example.ru/cb".to_string())
        );
    }

    #[test]
    fn test_empty_url_is_ignored() {
        let body = json!({ "url": "", "redirect_url": "https://a/b" });
        assert_eq!(extract_redirect_url(&body).as_deref(), Some("https://a/b"));
        assert_eq!(extract_redirect_url(&json!({ "url": "" })), None);
    }

    #[test]
    fn test_actions() {
        assert_eq!(classify(&json!({"action": "ENTER_MFA"})), BranchStep::NeedsMfa);
        assert_eq!(
            classify(&json!({"action": "SOLVE_ANOMALY_REACTION"})),
            BranchStep::NeedsAnomalyCheck
        );
        assert_eq!(
            classify(&json!({"action": "MAX_QUIZ", "max_details": {"skippable": true}})),
            BranchStep::NeedsPostStep(PostStep::MaxQuiz { skippable: true })
        );
        assert_eq!(
            classify(&json!({"action": "MAX_QUIZ"})),
            BranchStep::NeedsPostStep(PostStep::MaxQuiz { skippable: false })
        );
        assert_eq!(
            classify(&json!({"action": "CHANGE_PASSWORD"})),
            BranchStep::NeedsPostStep(PostStep::ChangePassword)
        );
        assert_eq!(classify(&json!({"action": "DONE"})), BranchStep::Done);
        assert_eq!(
            classify(&json!({"action": "WHATEVER"})),
            BranchStep::Unrecognized("WHATEVER".to_string())
        );
        assert_eq!(classify(&Value::Null), BranchStep::Unrecognized(String::new()));
    }
}
