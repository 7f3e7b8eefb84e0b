//! Tests for auth module
//!
//! Covers the display-name fallback chain and the session claims structure.
//! Token issue/validate behavior is tested next to the jwt service.

#[cfg(test)]
mod tests {
    use super::super::models::AccessTokenInfo;

    fn identity() -> AccessTokenInfo {
        AccessTokenInfo {
            sub: "subject-1".to_string(),
            given_name: None,
            family_name: None,
            email: None,
            preferred_username: None,
            name: None,
        }
    }

    #[test]
    fn family_plus_given_name_wins() {
        let info = AccessTokenInfo {
            family_name: Some("Li".to_string()),
            given_name: Some("Wei".to_string()),
            preferred_username: Some("wli".to_string()),
            name: Some("Wei Li".to_string()),
            email: Some("wei.li@example.com".to_string()),
            ..identity()
        };

        // Family name first, no separator
        assert_eq!(info.display_name(), "LiWei");
    }

    #[test]
    fn family_name_alone_is_not_enough() {
        let info = AccessTokenInfo {
            family_name: Some("Li".to_string()),
            preferred_username: Some("wli".to_string()),
            ..identity()
        };

        assert_eq!(info.display_name(), "wli");
    }

    #[test]
    fn preferred_username_beats_name_claim() {
        let info = AccessTokenInfo {
            preferred_username: Some("wli".to_string()),
            name: Some("Wei Li".to_string()),
            ..identity()
        };

        assert_eq!(info.display_name(), "wli");
    }

    #[test]
    fn name_claim_beats_email() {
        let info = AccessTokenInfo {
            name: Some("Wei Li".to_string()),
            email: Some("wei.li@example.com".to_string()),
            ..identity()
        };

        assert_eq!(info.display_name(), "Wei Li");
    }

    #[test]
    fn email_local_part_is_used() {
        let info = AccessTokenInfo {
            email: Some("abc@x.com".to_string()),
            ..identity()
        };

        assert_eq!(info.display_name(), "abc");
    }

    #[test]
    fn falls_back_to_subject_id() {
        assert_eq!(identity().display_name(), "subject-1");
    }

    #[test]
    fn blank_values_count_as_absent() {
        let info = AccessTokenInfo {
            family_name: Some("   ".to_string()),
            given_name: Some("Wei".to_string()),
            preferred_username: Some("".to_string()),
            name: Some("  ".to_string()),
            email: Some("abc@x.com".to_string()),
            ..identity()
        };

        assert_eq!(info.display_name(), "abc");
    }

    #[test]
    fn derivation_is_deterministic() {
        let info = AccessTokenInfo {
            family_name: Some("Li".to_string()),
            given_name: Some("Wei".to_string()),
            ..identity()
        };

        assert_eq!(info.display_name(), info.display_name());
    }
}
