//! Custom test assertions

use marketplace_rbac::core::models::AccessCheckResult;

/// Assertions for access check outcomes
pub trait AccessResultAssertions {
    /// Assert the check granted access through the given role code
    fn assert_granted_by(&self, role_code: &str);

    /// Assert the check was denied with a reason mentioning `fragment`
    fn assert_denied_mentioning(&self, fragment: &str);
}

impl AccessResultAssertions for AccessCheckResult {
    fn assert_granted_by(&self, role_code: &str) {
        assert!(self.granted, "Expected access to be granted, got {:?}", self.reason);
        assert!(
            self.granted_by_roles.iter().any(|r| r == role_code),
            "Expected role '{}' among {:?}",
            role_code,
            self.granted_by_roles
        );
    }

    fn assert_denied_mentioning(&self, fragment: &str) {
        assert!(!self.granted, "Expected access to be denied");
        let reason = self.reason.as_deref().unwrap_or_default();
        assert!(
            reason.contains(fragment),
            "Expected denial reason to mention '{}', got '{}'",
            fragment,
            reason
        );
    }
}
