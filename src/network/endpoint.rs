use std::sync::LazyLock;

use regex::Regex;

/// Route của server chỉ nhận patient id dạng số (`ws/chat/(?P<patient_id>\d+)/$`).
static ROUTABLE_PATIENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("static regex is valid"));

/// Dựng `ws://{host}/ws/chat/{patient_id}/`.
///
/// Patient id được chèn nguyên văn, không percent-encode.
pub fn chat_endpoint(host: &str, patient_id: &str) -> String {
    format!("ws://{host}/ws/chat/{patient_id}/")
}

pub fn is_routable_patient_id(patient_id: &str) -> bool {
    ROUTABLE_PATIENT_ID.is_match(patient_id)
}

/// Ghi cảnh báo khi patient id không khớp route của server.
pub fn warn_if_unroutable(patient_id: &str) {
    if !is_routable_patient_id(patient_id) {
        log::warn!(
            "Patient id `{patient_id}` is not numeric; it is sent unencoded and the server route may reject it"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_follows_path_template() {
        assert_eq!(
            chat_endpoint("example.com", "42"),
            "ws://example.com/ws/chat/42/"
        );
        assert_eq!(
            chat_endpoint("127.0.0.1:8000", "7"),
            "ws://127.0.0.1:8000/ws/chat/7/"
        );
    }

    #[test]
    fn identifier_is_not_percent_encoded() {
        assert_eq!(
            chat_endpoint("example.com", "a b/c"),
            "ws://example.com/ws/chat/a b/c/"
        );
    }

    #[test]
    fn routable_ids_are_digits_only() {
        assert!(is_routable_patient_id("42"));
        assert!(!is_routable_patient_id(""));
        assert!(!is_routable_patient_id("42a"));
        assert!(!is_routable_patient_id("4 2"));
    }
}
