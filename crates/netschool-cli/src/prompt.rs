use inquire::{Select, Text};
use netschool_auth::prompt::{ChoicePrompt, PromptError, ProofProvider, ProofRequest};

fn prompt_error(e: inquire::InquireError) -> PromptError {
    PromptError(e.to_string())
}

/// Asks for confirmation codes on the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct InquireProofProvider;

#[async_trait::async_trait]
impl ProofProvider for InquireProofProvider {
    async fn proof(&self, request: &ProofRequest) -> Result<String, PromptError> {
        let message = request.message();
        let mut help = Vec::new();
        if let Some(left) = request.attempts_left {
            help.push(format!("{left} attempts left"));
        }
        if let Some(valid_for) = request.valid_for {
            help.push(format!("valid for {} s", valid_for.as_secs()));
        }
        let help = help.join(", ");

        let mut prompt = Text::new(&message);
        if !help.is_empty() {
            prompt = prompt.with_help_message(&help);
        }
        prompt.prompt().map_err(prompt_error)
    }
}

/// Lets the user pick from a list on the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct InquireChoicePrompt;

#[async_trait::async_trait]
impl ChoicePrompt for InquireChoicePrompt {
    async fn choose(&self, message: &str, options: &[String]) -> Result<usize, PromptError> {
        Select::new(message, options.to_vec())
            .raw_prompt()
            .map(|choice| choice.index)
            .map_err(prompt_error)
    }
}
