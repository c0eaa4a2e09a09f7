// src/services/openai.rs
//
// Cliente do serviço externo de geração de texto. O serviço de insights
// só conhece o trait `ChatCompletionClient` — a OpenAI (e o reqwest) são
// detalhe de implementação, e os testes usam um cliente falso.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use serde_json::json;
use tokio_stream::wrappers::ReceiverStream;

use crate::common::error::AppError;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// Sequência de pedaços de texto; cada leitura suspende no socket.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<String, AppError>> + Send>>;

#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    // Há credencial configurada? Sem ela o chamador nem tenta a rede.
    fn is_configured(&self) -> bool;

    // Chamada completa: devolve o texto inteiro de uma vez.
    async fn complete(&self, system_prompt: &str, user_prompt: &str)
    -> Result<String, AppError>;

    // Chamada em streaming: devolve os pedaços conforme chegam.
    async fn stream(&self, system_prompt: &str, user_prompt: &str)
    -> Result<ChatStream, AppError>;
}

pub struct OpenAiClient {
    api_key: Option<String>,
    model: String,
    http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Falha ao construir o cliente HTTP");

        Self { api_key, model, http }
    }

    fn request_body(&self, system_prompt: &str, user_prompt: &str, stream: bool) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt },
            ],
            "temperature": 0.7,
            "max_tokens": 1000,
            "stream": stream,
        })
    }

    async fn post(
        &self,
        api_key: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, AppError> {
        let response = self
            .http
            .post(OPENAI_CHAT_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("falha na requisição: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "OpenAI respondeu {status}: {detail}"
            )));
        }
        Ok(response)
    }
}

// Extrai o conteúdo incremental de um frame SSE `data: {...}` do modo
// streaming. Frames sem delta de conteúdo (ex.: role, finish_reason)
// viram `None`.
fn parse_stream_line(line: &str) -> Option<String> {
    let data = line.strip_prefix("data: ").unwrap_or(line);
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    let chunk: serde_json::Value = serde_json::from_str(data).ok()?;
    chunk["choices"][0]["delta"]["content"]
        .as_str()
        .map(|s| s.to_string())
}

#[async_trait]
impl ChatCompletionClient for OpenAiClient {
    fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::ExternalService("OPENAI_API_KEY ausente".to_string()))?;

        let body = self.request_body(system_prompt, user_prompt, false);
        let response = self.post(api_key, body).await?;

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("resposta inválida: {e}")))?;

        data["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::ExternalService("resposta sem conteúdo".to_string()))
    }

    async fn stream(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<ChatStream, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::ExternalService("OPENAI_API_KEY ausente".to_string()))?;

        let body = self.request_body(system_prompt, user_prompt, true);
        let response = self.post(api_key, body).await?;

        // Uma task lê o corpo SSE linha a linha e repassa os pedaços pelo
        // canal; se o consumidor desistir (receiver dropado), o send falha
        // e a task encerra sozinha.
        let (tx, rx) = tokio::sync::mpsc::channel::<Result<String, AppError>>(32);
        tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(piece) = bytes.next().await {
                let piece = match piece {
                    Ok(p) => p,
                    Err(e) => {
                        let _ = tx
                            .send(Err(AppError::ExternalService(format!(
                                "stream interrompido: {e}"
                            ))))
                            .await;
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&piece));

                // Frames SSE terminam em '\n'; o que sobrar no buffer é um
                // frame ainda incompleto.
                while let Some(newline) = buffer.find('\n') {
                    let line = buffer[..newline].trim().to_string();
                    buffer.drain(..=newline);

                    if line.strip_prefix("data: ").unwrap_or(&line) == "[DONE]" {
                        return;
                    }
                    if let Some(content) = parse_stream_line(&line) {
                        if tx.send(Ok(content)).await.is_err() {
                            return;
                        }
                    }
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_stream_line_extracts_delta_content() {
        let line = r#"data: {"choices":[{"delta":{"content":"Olá"}}]}"#;
        assert_eq!(parse_stream_line(line), Some("Olá".to_string()));
    }

    #[test]
    fn parse_stream_line_ignores_done_and_non_content_frames() {
        assert_eq!(parse_stream_line("data: [DONE]"), None);
        assert_eq!(
            parse_stream_line(r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#),
            None
        );
        assert_eq!(parse_stream_line(""), None);
        assert_eq!(parse_stream_line("data: isto não é json"), None);
    }

    #[test]
    fn client_without_key_is_not_configured() {
        let client = OpenAiClient::new(None, "gpt-4o-mini".to_string());
        assert!(!client.is_configured());

        let client = OpenAiClient::new(Some(String::new()), "gpt-4o-mini".to_string());
        assert!(!client.is_configured());

        let client = OpenAiClient::new(Some("sk-teste".to_string()), "gpt-4o-mini".to_string());
        assert!(client.is_configured());
    }
}
