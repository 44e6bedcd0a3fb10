use serde::Serialize;
use tracing::{debug, info};

use super::{provider_error, Interpreter};
use crate::config::ProviderConfig;
use crate::error::{Result, SonharioError};
use crate::session::UserProfile;

/// Hosted LLM client (chat-completions endpoint) that renders the dream
/// interpreter persona.
pub struct InterpretationClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl InterpretationClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// The fixed persona, parameterized only by the user's name and the
/// gendered salutation.
pub fn system_instruction(profile: &UserProfile) -> String {
    format!(
        "Você é um Intérprete de Sonhos prático e direto.\n\
         Sua missão é explicar o significado do sonho do usuário de forma clara e objetiva, \
         sem citar teorias, nomes de psicólogos (como Freud ou Jung) ou termos técnicos complexos.\n\
         \n\
         REGRAS DE RESPOSTA:\n\
         1. Comece saudando o usuário pelo nome: \"{name}\".\n\
         2. Use o tratamento \"{salutation}\" ao se dirigir ao usuário.\n\
         3. Vá direto ao ponto. Diga: \"Sua interpretação é a seguinte:\" e explique o que os \
         elementos do sonho significam na vida real.\n\
         4. Explique a causa e o efeito: \"Isso acontece porque...\", \"Isso representa...\".\n\
         5. Seja assertivo, empático e evite enrolação.\n\
         6. Não use Markdown complexo, apenas negrito para destacar pontos cruciais.",
        name = profile.name,
        salutation = profile.gender.salutation(),
    )
}

/// The dream text is the sole user message.
pub fn user_message(dream_text: &str) -> String {
    format!("Interprete este sonho de forma direta: \"{dream_text}\"")
}

#[async_trait::async_trait]
impl Interpreter for InterpretationClient {
    async fn interpret(&self, profile: &UserProfile, dream_text: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let request = ChatRequest {
            model: &self.config.interpretation_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_instruction(profile),
                },
                ChatMessage {
                    role: "user",
                    content: user_message(dream_text),
                },
            ],
            temperature: self.config.temperature,
        };

        debug!(
            "Requesting interpretation (model={}, temperature={})",
            self.config.interpretation_model, self.config.temperature
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(SonharioError::transport)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(SonharioError::transport)?;

        let prose = parse_completion(status, &body)?;
        info!("Interpretation received: {} characters", prose.chars().count());
        Ok(prose)
    }
}

/// Success is the first completion's text content; a 2xx body without it is
/// a malformed response.
pub(crate) fn parse_completion(status: u16, body: &str) -> Result<String> {
    if !(200..300).contains(&status) {
        return Err(provider_error(status, body));
    }

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| SonharioError::MalformedResponse(format!("invalid JSON: {e}")))?;

    match value
        .pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
    {
        Some(content) => Ok(content.to_string()),
        None => Err(SonharioError::MalformedResponse(
            "missing completion content".to_string(),
        )),
    }
}
