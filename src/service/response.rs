//! Response envelopes and the XML/JSON result serializers.

use serde::Serialize;
use serde_json::{Value, json};

use crate::error::TexQueryError;
use crate::service::request::ResponseFormat;

/// One matched fragment, resolved to its source string.
#[derive(Debug, Clone, Serialize)]
pub struct Equation {
    pub distance: usize,
    pub source: String,
}

/// One ranked document with its matching fragments.
#[derive(Debug, Clone, Serialize)]
pub struct DocResult {
    #[serde(rename = "doi")]
    pub doc_id: String,
    pub equations: Vec<Equation>,
}

/// Build the success envelope for the requested format.
pub fn success(query: &str, docs: &[DocResult], format: ResponseFormat) -> Value {
    match format {
        ResponseFormat::Json => json!({
            "code": 200,
            "json": {
                "query": query,
                "results": docs,
            },
        }),
        ResponseFormat::Xml => json!({
            "code": 200,
            "headers": {"Content-type": "text/xml"},
            "body": xml_body(query, docs),
        }),
    }
}

/// Map an error onto its response envelope.
pub fn failure(err: &TexQueryError) -> Value {
    match err {
        TexQueryError::BadRequest(_) => json!({"code": 400}),
        TexQueryError::Timeout => json!({
            "code": 500,
            "headers": {"Content-type": "text/plain"},
            "body": "Error: Timed out",
        }),
        _ => json!({"code": 500}),
    }
}

fn xml_body(query: &str, docs: &[DocResult]) -> String {
    let mut xml = String::from("<results>");
    xml.push_str("<query>");
    push_escaped(&mut xml, query);
    xml.push_str("</query>");
    for doc in docs {
        xml.push_str("<result doi=\"");
        push_escaped(&mut xml, &doc.doc_id);
        xml.push_str("\">");
        for equation in &doc.equations {
            xml.push_str(&format!("<equation distance=\"{}\">", equation.distance));
            push_escaped(&mut xml, &equation.source);
            xml.push_str("</equation>");
        }
        xml.push_str("</result>");
    }
    xml.push_str("</results>");
    xml
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs() -> Vec<DocResult> {
        vec![DocResult {
            doc_id: "10.1000/demo".to_string(),
            equations: vec![Equation {
                distance: 1,
                source: r"\dot{V} < 0".to_string(),
            }],
        }]
    }

    #[test]
    fn test_xml_envelope() {
        let envelope = success("$x$", &docs(), ResponseFormat::Xml);
        assert_eq!(envelope["code"], 200);
        assert_eq!(envelope["headers"]["Content-type"], "text/xml");
        let body = envelope["body"].as_str().unwrap();
        assert_eq!(
            body,
            "<results><query>$x$</query><result doi=\"10.1000/demo\">\
             <equation distance=\"1\">\\dot{V} &lt; 0</equation></result></results>"
        );
    }

    #[test]
    fn test_json_envelope() {
        let envelope = success("$x$", &docs(), ResponseFormat::Json);
        assert_eq!(envelope["code"], 200);
        assert_eq!(envelope["json"]["query"], "$x$");
        assert_eq!(envelope["json"]["results"][0]["doi"], "10.1000/demo");
        assert_eq!(envelope["json"]["results"][0]["equations"][0]["distance"], 1);
    }

    #[test]
    fn test_xml_escaping() {
        let mut out = String::new();
        push_escaped(&mut out, r#"a<b & "c" > 'd'"#);
        assert_eq!(out, "a&lt;b &amp; &quot;c&quot; &gt; &apos;d&apos;");
    }

    #[test]
    fn test_failure_envelopes() {
        assert_eq!(
            failure(&TexQueryError::bad_request("nope")),
            serde_json::json!({"code": 400})
        );
        let timeout = failure(&TexQueryError::Timeout);
        assert_eq!(timeout["code"], 500);
        assert_eq!(timeout["body"], "Error: Timed out");
        assert_eq!(
            failure(&TexQueryError::internal("boom")),
            serde_json::json!({"code": 500})
        );
    }
}
