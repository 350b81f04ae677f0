use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{EmbeddingFunction, InputType};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// OpenAI-compatible `/v1/embeddings` client.
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    input: Vec<&'a str>,
    model: &'a str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    data: Vec<OpenAiEmbedding>,
}

#[derive(Deserialize)]
struct OpenAiEmbedding {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }

    fn model_dimension(model: &str) -> usize {
        match model {
            "text-embedding-3-small" | "text-embedding-ada-002" => 1536,
            "text-embedding-3-large" => 3072,
            _ => 0,
        }
    }
}

/// Places each returned embedding at the input position it answers. Every
/// requested position must be filled exactly once.
fn scatter_embeddings(
    positions: &[usize],
    data: Vec<OpenAiEmbedding>,
    vectors: &mut [Vec<f64>],
) -> Result<(), DomainError> {
    if data.len() != positions.len() {
        return Err(DomainError::EmbeddingUnavailable(format!(
            "OpenAI returned {} embeddings for {} inputs",
            data.len(),
            positions.len()
        )));
    }

    let mut filled = vec![false; positions.len()];
    for item in data {
        let slot = positions.get(item.index).ok_or_else(|| {
            DomainError::EmbeddingUnavailable(format!("OpenAI returned out-of-range index {}", item.index))
        })?;
        if std::mem::replace(&mut filled[item.index], true) {
            return Err(DomainError::EmbeddingUnavailable(format!(
                "OpenAI returned index {} twice",
                item.index
            )));
        }
        if item.embedding.is_empty() {
            return Err(DomainError::EmbeddingUnavailable(format!(
                "OpenAI returned an empty embedding at index {}",
                item.index
            )));
        }
        vectors[*slot] = item.embedding.into_iter().map(f64::from).collect();
    }
    Ok(())
}

#[async_trait::async_trait]
impl EmbeddingFunction for OpenAiEmbedder {
    async fn embed_many(&self, texts: &[String], _input_type: InputType) -> Result<Vec<Vec<f64>>, DomainError> {
        let mut vectors: Vec<Vec<f64>> = vec![vec![]; texts.len()];

        // Empty texts never reach the backend; they keep the empty vector.
        let positions: Vec<usize> = (0..texts.len()).filter(|&i| !texts[i].is_empty()).collect();
        if positions.is_empty() {
            return Ok(vectors);
        }

        let url = format!("{}/v1/embeddings", self.base_url);
        debug!(model = %self.model, count = positions.len(), "requesting embeddings");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&OpenAiRequest {
                input: positions.iter().map(|&i| texts[i].as_str()).collect(),
                model: &self.model,
            })
            .send()
            .await
            .map_err(|e| DomainError::EmbeddingUnavailable(format!("OpenAI API error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::EmbeddingUnavailable(format!("OpenAI API {status}: {body}")));
        }

        let result: OpenAiResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::EmbeddingUnavailable(format!("Parse error: {e}")))?;
        scatter_embeddings(&positions, result.data, &mut vectors)?;
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        Self::model_dimension(&self.model)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
