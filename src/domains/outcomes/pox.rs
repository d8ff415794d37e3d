//! POX envelope codec for the Basic Outcomes service.
//!
//! Building is template-based (the envelopes are small and fixed);
//! parsing is structural via `roxmltree`, matching elements by local
//! name so that namespace prefixes and whitespace variations from
//! other implementations are tolerated. The element names themselves
//! are byte-exact per the LTI 1.1 outcomes schema.

use roxmltree::Document;

pub const POX_NAMESPACE: &str = "http://www.imsglobal.org/services/ltiv1p1/xsd/imsoms_v1p0";

/// Leaf values extracted from an inbound `replaceResultRequest`.
///
/// Every field is optional: inbound payloads are external input and
/// the handler decides what a missing piece means.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReplaceResultRequest {
    pub message_id: Option<String>,
    pub sourced_id: Option<String>,
    pub score_text: Option<String>,
}

/// Extract the three relevant leaf values from a request envelope.
///
/// Returns `None` only when the body is not well-formed XML at all;
/// a well-formed document missing some leaves yields a struct with
/// the corresponding fields unset.
pub fn parse_replace_result_request(xml: &str) -> Option<ReplaceResultRequest> {
    let doc = Document::parse(xml).ok()?;
    Some(ReplaceResultRequest {
        message_id: leaf_text(&doc, "imsx_messageIdentifier"),
        sourced_id: leaf_text(&doc, "sourcedId"),
        score_text: leaf_text(&doc, "textString"),
    })
}

/// Extract `imsx_codeMajor` from a response envelope.
pub fn parse_code_major(xml: &str) -> Option<String> {
    let doc = Document::parse(xml).ok()?;
    leaf_text(&doc, "imsx_codeMajor")
}

/// Text content of the first element with the given local name,
/// ignoring namespaces.
fn leaf_text(doc: &Document, local_name: &str) -> Option<String> {
    doc.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == local_name)
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Build a `replaceResultRequest` envelope for a grade push.
pub fn build_replace_result_request(message_id: &str, sourced_id: &str, score: f64) -> String {
    // Whole numbers keep one decimal place, so 1.0 goes out as "1.0".
    let score = if score.fract() == 0.0 {
        format!("{score:.1}")
    } else {
        score.to_string()
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<imsx_POXEnvelopeRequest xmlns="{POX_NAMESPACE}">
  <imsx_POXHeader>
    <imsx_POXRequestHeaderInfo>
      <imsx_version>V1.0</imsx_version>
      <imsx_messageIdentifier>{message_id}</imsx_messageIdentifier>
    </imsx_POXRequestHeaderInfo>
  </imsx_POXHeader>
  <imsx_POXBody>
    <replaceResultRequest>
      <resultRecord>
        <sourcedGUID>
          <sourcedId>{sourced_id}</sourcedId>
        </sourcedGUID>
        <result>
          <resultScore>
            <language>en</language>
            <textString>{score}</textString>
          </resultScore>
        </result>
      </resultRecord>
    </replaceResultRequest>
  </imsx_POXBody>
</imsx_POXEnvelopeRequest>"#,
        message_id = escape_text(message_id),
        sourced_id = escape_text(sourced_id),
    )
}

/// Build the success response envelope, echoing the inbound message
/// id as `imsx_messageRefIdentifier`.
pub fn build_success_response(message_ref_id: &str, description: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<imsx_POXEnvelopeResponse xmlns="{POX_NAMESPACE}">
  <imsx_POXHeader>
    <imsx_POXResponseHeaderInfo>
      <imsx_version>V1.0</imsx_version>
      <imsx_messageIdentifier>{message_ref_id}</imsx_messageIdentifier>
      <imsx_statusInfo>
        <imsx_codeMajor>success</imsx_codeMajor>
        <imsx_severity>status</imsx_severity>
        <imsx_description>{description}</imsx_description>
        <imsx_messageRefIdentifier>{message_ref_id}</imsx_messageRefIdentifier>
        <imsx_operationRefIdentifier>replaceResult</imsx_operationRefIdentifier>
      </imsx_statusInfo>
    </imsx_POXResponseHeaderInfo>
  </imsx_POXHeader>
  <imsx_POXBody>
    <replaceResultResponse/>
  </imsx_POXBody>
</imsx_POXEnvelopeResponse>"#,
        message_ref_id = escape_text(message_ref_id),
        description = escape_text(description),
    )
}

/// Escape a string for use as XML text content.
fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_round_trip() {
        let xml = build_replace_result_request("msg-1", "NzphYmMtMTIzOjQy", 0.85);
        let parsed = parse_replace_result_request(&xml).unwrap();
        assert_eq!(parsed.message_id.as_deref(), Some("msg-1"));
        assert_eq!(parsed.sourced_id.as_deref(), Some("NzphYmMtMTIzOjQy"));
        assert_eq!(parsed.score_text.as_deref(), Some("0.85"));
    }

    #[test]
    fn test_parse_tolerates_namespace_prefix() {
        let xml = r#"<?xml version="1.0"?>
<ims:imsx_POXEnvelopeRequest xmlns:ims="http://www.imsglobal.org/services/ltiv1p1/xsd/imsoms_v1p0">
  <ims:imsx_POXHeader>
    <ims:imsx_POXRequestHeaderInfo>
      <ims:imsx_messageIdentifier> abc </ims:imsx_messageIdentifier>
    </ims:imsx_POXRequestHeaderInfo>
  </ims:imsx_POXHeader>
  <ims:imsx_POXBody>
    <ims:replaceResultRequest>
      <ims:resultRecord>
        <ims:sourcedGUID><ims:sourcedId>SID</ims:sourcedId></ims:sourcedGUID>
        <ims:result><ims:resultScore><ims:textString>0.5</ims:textString></ims:resultScore></ims:result>
      </ims:resultRecord>
    </ims:replaceResultRequest>
  </ims:imsx_POXBody>
</ims:imsx_POXEnvelopeRequest>"#;
        let parsed = parse_replace_result_request(xml).unwrap();
        assert_eq!(parsed.message_id.as_deref(), Some("abc"));
        assert_eq!(parsed.sourced_id.as_deref(), Some("SID"));
        assert_eq!(parsed.score_text.as_deref(), Some("0.5"));
    }

    #[test]
    fn test_parse_not_xml() {
        assert_eq!(parse_replace_result_request("this is not xml <<<"), None);
    }

    #[test]
    fn test_parse_missing_leaves() {
        let parsed = parse_replace_result_request("<root><other>1</other></root>").unwrap();
        assert_eq!(parsed, ReplaceResultRequest::default());
    }

    #[test]
    fn test_response_echoes_message_ref() {
        let xml = build_success_response("msg-9", "Score received");
        assert!(xml.contains("<imsx_messageRefIdentifier>msg-9</imsx_messageRefIdentifier>"));
        assert!(xml.contains("<imsx_codeMajor>success</imsx_codeMajor>"));
        assert!(xml.contains("<replaceResultResponse/>"));
        assert_eq!(parse_code_major(&xml).as_deref(), Some("success"));
    }

    #[test]
    fn test_text_is_escaped() {
        let xml = build_replace_result_request("a&b", "<sid>", 1.0);
        assert!(xml.contains("a&amp;b"));
        assert!(xml.contains("&lt;sid&gt;"));
    }

    #[test]
    fn test_score_uses_natural_decimal_form() {
        let xml = build_replace_result_request("m", "s", 0.9);
        assert!(xml.contains("<textString>0.9</textString>"));
        let xml = build_replace_result_request("m", "s", 0.85);
        assert!(xml.contains("<textString>0.85</textString>"));
    }

    #[test]
    fn test_whole_score_keeps_one_decimal() {
        let xml = build_replace_result_request("m", "s", 1.0);
        assert!(xml.contains("<textString>1.0</textString>"));
        let xml = build_replace_result_request("m", "s", 0.0);
        assert!(xml.contains("<textString>0.0</textString>"));
    }
}
