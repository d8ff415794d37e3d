//! Launch parameter assembly and signing.
//!
//! `build_launch` produces the full LTI 1.1 parameter set for one
//! launch: the fixed LTI/OAuth parameters, context, user, outcomes
//! wiring, tool-consumer identity, and any custom parameters, signed
//! with the tool's consumer secret.

use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::domains::oauth::{build_base_string, sign, SIGNATURE_PARAM};

use super::{sourced_id, LaunchContext, LaunchError, LaunchRequest, Principal, ToolCredential};

/// Identity the platform reports about itself on every launch.
const INSTANCE_GUID: &str = "lti-sandbox.local";
const INSTANCE_NAME: &str = "LTI Sandbox";
const INSTANCE_DESCRIPTION: &str = "Local LTI 1.1 testing environment";
const PRODUCT_FAMILY_CODE: &str = "lti-sandbox";
const PRODUCT_VERSION: &str = "1.0";

/// Build and sign the complete launch parameter set.
///
/// `outcomes_url` is where the tool should POST grade results; it is
/// advertised as `lis_outcome_service_url` together with a sourced id
/// encoding `(course, resource link, user)`.
///
/// Every call generates a fresh nonce and timestamp, so retrying the
/// same logical launch produces a different signature each time.
pub fn build_launch(
    tool: &ToolCredential,
    context: &LaunchContext,
    principal: &Principal,
    outcomes_url: &str,
) -> Result<LaunchRequest, LaunchError> {
    validate(tool, context, principal, outcomes_url)?;

    let (given, family) = split_name(&principal.full_name);
    let sourced_id = sourced_id::encode(
        &context.course_id,
        &context.resource_link_id,
        &principal.id,
    );

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        .to_string();
    let nonce = Uuid::new_v4().to_string();

    let mut params: Vec<(String, String)> = vec![
        // LTI required
        ("lti_message_type".into(), "basic-lti-launch-request".into()),
        ("lti_version".into(), "LTI-1p0".into()),
        // OAuth
        ("oauth_consumer_key".into(), tool.consumer_key.clone()),
        ("oauth_signature_method".into(), "HMAC-SHA1".into()),
        ("oauth_timestamp".into(), timestamp),
        ("oauth_nonce".into(), nonce),
        ("oauth_version".into(), "1.0".into()),
        ("oauth_callback".into(), "about:blank".into()),
        // Resource link
        ("resource_link_id".into(), context.resource_link_id.clone()),
        (
            "resource_link_title".into(),
            context.resource_link_title.clone(),
        ),
        // Context (course)
        ("context_id".into(), context.course_id.clone()),
        ("context_label".into(), context.course_code.clone()),
        ("context_title".into(), context.course_title.clone()),
        ("context_type".into(), "CourseSection".into()),
        // User
        ("user_id".into(), principal.id.clone()),
        ("lis_person_name_given".into(), given),
        ("lis_person_name_family".into(), family),
        ("lis_person_name_full".into(), principal.full_name.clone()),
        (
            "lis_person_contact_email_primary".into(),
            principal.email.clone(),
        ),
        ("roles".into(), principal.role.as_lti_role().into()),
        // Outcomes service
        ("lis_outcome_service_url".into(), outcomes_url.into()),
        ("lis_result_sourcedid".into(), sourced_id),
        // Launch presentation
        ("launch_presentation_locale".into(), "en-US".into()),
        (
            "launch_presentation_document_target".into(),
            "iframe".into(),
        ),
        // Tool consumer identity
        ("tool_consumer_instance_guid".into(), INSTANCE_GUID.into()),
        ("tool_consumer_instance_name".into(), INSTANCE_NAME.into()),
        (
            "tool_consumer_instance_description".into(),
            INSTANCE_DESCRIPTION.into(),
        ),
        (
            "tool_consumer_info_product_family_code".into(),
            PRODUCT_FAMILY_CODE.into(),
        ),
        ("tool_consumer_info_version".into(), PRODUCT_VERSION.into()),
    ];

    for (key, value) in &context.custom_params {
        let key = if key.starts_with("custom_") {
            key.clone()
        } else {
            format!("custom_{key}")
        };
        params.push((key, value.clone()));
    }

    let base_string = build_base_string("POST", &tool.launch_url, &params);
    let signature = sign(&base_string, &tool.consumer_secret);
    params.push((SIGNATURE_PARAM.to_string(), signature));

    Ok(LaunchRequest::new(params))
}

/// Reject launches with blank collaborator fields before emitting
/// any wire parameter.
fn validate(
    tool: &ToolCredential,
    context: &LaunchContext,
    principal: &Principal,
    outcomes_url: &str,
) -> Result<(), LaunchError> {
    if tool.consumer_key.is_empty() {
        return Err(LaunchError::missing("consumer_key"));
    }
    if tool.consumer_secret.is_empty() {
        return Err(LaunchError::missing("consumer_secret"));
    }
    if tool.launch_url.is_empty() {
        return Err(LaunchError::missing("launch_url"));
    }
    if context.course_id.is_empty() {
        return Err(LaunchError::missing("course_id"));
    }
    if context.course_code.is_empty() {
        return Err(LaunchError::missing("course_code"));
    }
    if context.course_title.is_empty() {
        return Err(LaunchError::missing("course_title"));
    }
    if context.resource_link_id.is_empty() {
        return Err(LaunchError::missing("resource_link_id"));
    }
    if context.resource_link_title.is_empty() {
        return Err(LaunchError::missing("resource_link_title"));
    }
    if principal.id.is_empty() {
        return Err(LaunchError::missing("user_id"));
    }
    if principal.full_name.is_empty() {
        return Err(LaunchError::missing("full_name"));
    }
    if principal.email.is_empty() {
        return Err(LaunchError::missing("email"));
    }
    if outcomes_url.is_empty() {
        return Err(LaunchError::missing("outcomes_url"));
    }
    Ok(())
}

/// Split a full name into given and family parts.
///
/// First whitespace-delimited token is the given name; the rest,
/// re-joined with single spaces, is the family name. A single-token
/// name uses the full name for both, so neither field goes out empty.
fn split_name(full_name: &str) -> (String, String) {
    let mut tokens = full_name.split_whitespace();
    let given = tokens.next().unwrap_or(full_name).to_string();
    let family = tokens.collect::<Vec<_>>().join(" ");
    if family.is_empty() {
        (given, full_name.to_string())
    } else {
        (given, family)
    }
}
