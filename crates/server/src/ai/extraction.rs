//! Natural language label query -> search filters

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use druglabel_core::{FilterError, FilterSet, QueryLogEntry, assemble, recover_payload};

use super::client::{Message, OracleClient};

const SYSTEM_PROMPT: &str = r#"You are an assistant that extracts structured search filters from user queries about drug labels.
Return only a valid JSON object, or a JSON array of objects when the query has several conditions.
Each object must contain the keys 'param', 'condition', 'searchQuery', 'operators' and 'searchInCountry'.

RULES:
- 'param' must exactly match one of these values:
  ["Any Section", "Revision Date", "Brand Name", "Generic Name", "Manufacturer", "Label Title",
  "Highlights", "Abuse Section", "Adverse Reactions", "Boxed Warning Section",
  "Clinical Pharmacology/Clinical Studies", "Contraindications", "Drug Interactions",
  "Dosage & Administration", "Dosage Form", "Indications and Usage",
  "Information For Patients/Caregivers", "Overdosage", "Preclinical Safety Data",
  "Pregnancy & Lactation", "Storage & Handling", "Warnings & Precautions",
  "Medguide Section", "PIL", "CMI"].
- If the query mentions a drug name, set 'param' to "Generic Name" unless the context says otherwise.
- 'condition' must be either "contains" or "not contains".
- 'searchQuery' is the exact drug or term mentioned in the query.
- 'operators' follows the user's wording:
  - If the user explicitly says "and", use "operators": "and".
  - If the user explicitly says "or" or uses ',', use "operators": "or".
  - If there is only one condition, "operators" must be null.
  - Only the last object of a multi-condition query has "operators": null.
- 'searchInCountry' must be one of ["au", "ca", "fr", "uk", "us", "eu"]; if no country is mentioned use "au,ca,fr,uk,us,eu".

If the query has several distinct conditions joined by AND or OR, return an array of objects connected with
"operators": "and" or "operators": "or" as the query says. The last object always has "operators": null.
Output JSON only. Do not include explanations or any other text."#;

/// Result of one extraction plus what the query log needs
#[derive(Debug)]
pub struct Extraction {
    pub outcome: Result<FilterSet, FilterError>,
    /// Oracle HTTP status, if a response arrived
    pub status_code: Option<u16>,
    /// Oracle round-trip time
    pub response_time: Duration,
    pub created_at: DateTime<Utc>,
}

impl Extraction {
    /// Query log row for this extraction; failures record the error kind
    pub fn log_entry(&self, user_query: &str) -> QueryLogEntry {
        let serialized = match &self.outcome {
            Ok(filters) => serde_json::to_string(filters).unwrap_or_default(),
            Err(err) => err.kind().to_string(),
        };

        QueryLogEntry::new(
            user_query,
            serialized,
            self.status_code,
            self.response_time.as_secs_f64(),
            self.created_at,
        )
    }
}

/// System instructions followed by the user's text, passed through as-is
pub fn build_messages(user_query: &str) -> Vec<Message> {
    vec![Message::system(SYSTEM_PROMPT), Message::user(user_query)]
}

/// Run one extraction end to end.
///
/// Never panics and never retries; every failure ends up in `outcome`.
pub async fn extract_filters(client: &OracleClient, user_query: &str) -> Extraction {
    let messages = build_messages(user_query);
    let created_at = Utc::now();

    let start = Instant::now();
    let completion = client.complete(&messages).await;
    let response_time = start.elapsed();

    metrics::histogram!("oracle_request_duration_seconds").record(response_time.as_secs_f64());

    let (status_code, outcome) = match completion {
        Ok(completion) => {
            tracing::debug!(body = %completion.body, "Oracle completion");
            let outcome = completion
                .content()
                .and_then(|text| recover_payload(&text))
                .and_then(|payload| assemble(&payload));
            (Some(completion.status), outcome)
        }
        Err(err) => {
            let status = match &err {
                FilterError::OracleUnavailable { status } => Some(*status),
                _ => None,
            };
            (status, Err(err))
        }
    };

    let label = match &outcome {
        Ok(filters) => {
            tracing::info!(
                filters = filters.len(),
                elapsed_ms = response_time.as_millis() as u64,
                "Extracted filters"
            );
            "success"
        }
        Err(err) => {
            tracing::warn!(
                error = %err,
                kind = err.kind(),
                status = ?status_code,
                "Filter extraction failed"
            );
            err.kind()
        }
    };
    metrics::counter!("filter_extractions_total", "outcome" => label).increment(1);

    Extraction {
        outcome,
        status_code,
        response_time,
        created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use druglabel_core::{Operator, Param};
    use serde_json::{Value as JsonValue, json};

    /// Serve `router` on an ephemeral port and return its URL
    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1/chat/completions")
    }

    /// Stub oracle that always answers with `content`
    async fn content_stub(content: &'static str) -> OracleClient {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move || async move {
                Json(json!({"choices": [{"message": {"role": "assistant", "content": content}}]}))
            }),
        );
        client_for(spawn_stub(router).await, Duration::from_secs(5))
    }

    fn client_for(url: String, timeout: Duration) -> OracleClient {
        OracleClient::new("test-key".into(), url, "test-model".into(), timeout).unwrap()
    }

    #[test]
    fn test_prompt_lists_every_section() {
        for param in Param::ALL {
            assert!(
                SYSTEM_PROMPT.contains(&format!("\"{}\"", param.display_name())),
                "{param} missing from prompt"
            );
        }
    }

    #[test]
    fn test_build_messages_passes_query_through() {
        let messages = build_messages("  brand name botox, or dysport ");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1], Message::user("  brand name botox, or dysport "));
    }

    #[tokio::test]
    async fn test_extract_with_reasoning_block() {
        let client = content_stub(
            "<think>some reasoning {not json}</think>\n{\"param\":\"brandname\",\"searchQuery\":\"botox\"}",
        )
        .await;

        let extraction = extract_filters(&client, "botox brand").await;
        let filters = extraction.outcome.unwrap();

        assert_eq!(extraction.status_code, Some(200));
        assert_eq!(filters.len(), 1);
        assert_eq!(filters.filters()[0].param(), Some(Param::BrandName));
        assert_eq!(filters.filters()[0].search_query(), "botox");
    }

    #[tokio::test]
    async fn test_extract_multi_condition() {
        let client = content_stub(
            r#"[{"param":"Generic Name","condition":"contains","searchQuery":"ibuprofen","operators":"or","searchInCountry":"us"},
                {"param":"Generic Name","condition":"contains","searchQuery":"naproxen","operators":"or","searchInCountry":"us"}]"#,
        )
        .await;

        let extraction = extract_filters(&client, "ibuprofen, naproxen in the US").await;
        let filters = extraction.outcome.unwrap();

        assert_eq!(filters.len(), 2);
        assert_eq!(filters.filters()[0].operator(), Operator::Or);
        assert_eq!(filters.filters()[1].operator(), Operator::None);
    }

    #[tokio::test]
    async fn test_extract_no_json() {
        let client = content_stub("I'm not sure what you mean.").await;

        let extraction = extract_filters(&client, "hmm").await;

        assert_eq!(extraction.outcome, Err(FilterError::NoJsonFound));
        assert_eq!(extraction.status_code, Some(200));
        assert_eq!(extraction.log_entry("hmm").serialized_filters, "no_json_found");
    }

    #[tokio::test]
    async fn test_extract_missing_content_is_no_json() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let client = client_for(spawn_stub(router).await, Duration::from_secs(5));

        let extraction = extract_filters(&client, "aspirin").await;
        assert_eq!(extraction.outcome, Err(FilterError::NoJsonFound));
    }

    #[tokio::test]
    async fn test_oracle_500_is_unavailable() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let client = client_for(spawn_stub(router).await, Duration::from_secs(5));

        let extraction = extract_filters(&client, "aspirin").await;

        assert_eq!(
            extraction.outcome,
            Err(FilterError::OracleUnavailable { status: 500 })
        );
        assert_eq!(extraction.status_code, Some(500));

        let entry = extraction.log_entry("aspirin");
        assert_eq!(entry.status_code, 500);
        assert_eq!(entry.serialized_filters, "oracle_unavailable");
    }

    #[tokio::test]
    async fn test_oracle_non_200_success_is_unavailable() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    StatusCode::ACCEPTED,
                    Json(json!({"choices": [{"message": {"content": "{\"searchQuery\":\"aspirin\"}"}}]})),
                )
            }),
        );
        let client = client_for(spawn_stub(router).await, Duration::from_secs(5));

        let extraction = extract_filters(&client, "aspirin").await;

        assert_eq!(
            extraction.outcome,
            Err(FilterError::OracleUnavailable { status: 202 })
        );
        assert_eq!(extraction.status_code, Some(202));
    }

    #[tokio::test]
    async fn test_undecodable_body_keeps_status() {
        let router = Router::new().route("/v1/chat/completions", post(|| async { "not json" }));
        let client = client_for(spawn_stub(router).await, Duration::from_secs(5));

        let extraction = extract_filters(&client, "aspirin").await;

        assert!(matches!(
            extraction.outcome,
            Err(FilterError::MalformedJson { .. })
        ));
        assert_eq!(extraction.status_code, Some(200));

        let entry = extraction.log_entry("aspirin");
        assert_eq!(entry.status_code, 200);
        assert_eq!(entry.serialized_filters, "malformed_json");
    }

    #[tokio::test]
    async fn test_oracle_timeout() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"choices": []}))
            }),
        );
        let client = client_for(spawn_stub(router).await, Duration::from_millis(200));

        let extraction = extract_filters(&client, "aspirin").await;

        assert_eq!(extraction.outcome, Err(FilterError::OracleTimeout));
        assert_eq!(extraction.status_code, None);
        assert!(extraction.response_time < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_request_body_shape() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<JsonValue>| async move {
                // Echo the request back as the completion
                let shaped = body["model"] == "test-model" && body["messages"][0]["role"] == "system";
                let param = if shaped { "Label Title" } else { "bogus" };
                let content = json!({
                    "searchQuery": body["messages"][1]["content"],
                    "param": param
                });
                Json(json!({"choices": [{"message": {"content": content.to_string()}}]}))
            }),
        );
        let client = client_for(spawn_stub(router).await, Duration::from_secs(5));

        let extraction = extract_filters(&client, "warfarin").await;
        let filters = extraction.outcome.unwrap();

        assert_eq!(filters.filters()[0].param(), Some(Param::LabelTitle));
        assert_eq!(filters.filters()[0].search_query(), "warfarin");
    }
}
