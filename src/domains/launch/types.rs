//! Domain records a launch is assembled from, and the launch itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Credential pair and target URL identifying one tool registration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ToolCredential {
    /// Consumer key sent in the clear as `oauth_consumer_key`.
    pub consumer_key: String,
    /// Shared secret; only ever used as signing-key input.
    pub consumer_secret: String,
    /// Exact absolute URL the tool receives the launch POST on.
    pub launch_url: String,
}

/// Custom Debug implementation to keep the secret out of logs.
impl std::fmt::Debug for ToolCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolCredential")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .field("launch_url", &self.launch_url)
            .finish()
    }
}

/// Course and resource-link data for one launch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchContext {
    pub course_id: String,
    /// Short course code, e.g. "CS101"; becomes `context_label`.
    pub course_code: String,
    pub course_title: String,
    pub resource_link_id: String,
    pub resource_link_title: String,
    /// Extra parameters, prefixed `custom_` on the wire.
    pub custom_params: BTreeMap<String, String>,
}

/// The user a launch is performed as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
}

/// Institutional role, mapped onto the two LTI role values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

impl Role {
    /// The byte-exact value for the `roles` launch parameter.
    pub fn as_lti_role(self) -> &'static str {
        match self {
            Role::Teacher => "Instructor",
            Role::Student => "Learner",
        }
    }
}

/// A fully assembled, signed launch parameter set.
///
/// Parameters keep their insertion order; `oauth_signature` is always
/// the final entry. The request is ready to render as a hidden-field
/// form that auto-submits to the tool's launch URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchRequest {
    params: Vec<(String, String)>,
}

impl LaunchRequest {
    pub(crate) fn new(params: Vec<(String, String)>) -> Self {
        Self { params }
    }

    /// All parameters in wire order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Render the hidden `<input>` fields for an auto-submit form.
    pub fn form_fields(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| {
                format!(
                    "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
                    escape_attr(k),
                    escape_attr(v)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Escape a string for use in an HTML attribute value.
fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_redacted_in_debug() {
        let cred = ToolCredential {
            consumer_key: "test_key".to_string(),
            consumer_secret: "super_secret".to_string(),
            launch_url: "http://localhost:8080/lti/launch".to_string(),
        };
        let debug_str = format!("{:?}", cred);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret"));
    }

    #[test]
    fn test_role_mapping() {
        assert_eq!(Role::Teacher.as_lti_role(), "Instructor");
        assert_eq!(Role::Student.as_lti_role(), "Learner");
    }

    #[test]
    fn test_form_fields_escape_values() {
        let req = LaunchRequest::new(vec![(
            "context_title".to_string(),
            "Tom \"Ampersand\" & Sons <b>".to_string(),
        )]);
        let html = req.form_fields();
        assert!(html.contains("Tom &quot;Ampersand&quot; &amp; Sons &lt;b&gt;"));
        assert!(!html.contains("<b>"));
    }
}
