/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat` — Interactive chat session
- `ask`  — Send a single prompt and print the answer

Both drive the same `ChatSession`; only the view differs.
*/

use crate::config::Config;
use crate::credential;
use crate::error::Result;
use crate::providers::create_provider;
use crate::render::{self, ViewModel};
use crate::session::{ChatSession, SessionEvent};
use std::io::Write;

// Special commands parser for the interactive loop
pub mod special_commands;

/// Resolves when the user presses Ctrl-C
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Print whatever the session changed since the last flush
fn flush_events(session: &mut ChatSession) -> Result<()> {
    for event in session.drain_events() {
        match event {
            SessionEvent::MessageAppended(id) => {
                if let Some(message) = session.conversation().get(id) {
                    print!("{}", render::render_message(message));
                }
            }
            SessionEvent::ErrorChanged(Some(error)) => {
                print!("{}", render::render_error_banner(&error));
            }
            SessionEvent::PendingChanged(true) => {
                print!("{}", render::render_pending());
            }
            SessionEvent::ScrollToLatest => std::io::stdout().flush()?,
            SessionEvent::PendingChanged(false)
            | SessionEvent::ErrorChanged(None)
            | SessionEvent::DraftCleared => {}
        }
    }
    Ok(())
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Creates the provider and a `ChatSession`, then runs a readline loop.
    //! Plain input is submitted; `/`-prefixed input is a special command.

    use super::*;
    use crate::credential::Credential;
    use crate::session::SubmitOutcome;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use super::special_commands::{parse_special_command, print_help, SpecialCommand};

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `api_key` - Key from `--api-key`/`GEMINI_API_KEY`, if any
    pub async fn run_chat(config: Config, api_key: Option<String>) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let credential = credential::resolve(api_key.as_deref(), &config.credential)?;
        let provider = create_provider(&config.provider)?;
        let mut session = ChatSession::new(credential, &config);

        let mut rl = DefaultEditor::new()?;

        if config.chat.show_welcome {
            print!(
                "{}",
                render::render_welcome(&provider.model(), session.has_credential())
            );
        }

        loop {
            let prompt = render::render_prompt(&ViewModel::of(&session));
            match rl.readline(&prompt) {
                Ok(line) => {
                    let draft = match parse_special_command(&line) {
                        Ok(SpecialCommand::SetKey(key)) => {
                            match Credential::new(key) {
                                Some(credential) => {
                                    session.set_credential(Some(credential));
                                    println!("{}", "API key set for this session".green());
                                }
                                None => println!("{}", "API key cannot be blank".yellow()),
                            }
                            continue;
                        }
                        Ok(SpecialCommand::ShowStatus) => {
                            print_status(&session, &provider.model());
                            continue;
                        }
                        Ok(SpecialCommand::History) => {
                            print!("{}", render::render_view(&ViewModel::of(&session)));
                            continue;
                        }
                        Ok(SpecialCommand::Help) => {
                            print_help();
                            continue;
                        }
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::Send(text)) => text,
                        Ok(SpecialCommand::None) => line.clone(),
                        Err(e) => {
                            eprintln!("{}", e.to_string().yellow());
                            continue;
                        }
                    };

                    if draft.trim().is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line.as_str())?;

                    session.set_draft(draft);
                    let Some(prompt) = session.begin_submit() else {
                        continue;
                    };
                    flush_events(&mut session)?;

                    let result = session
                        .dispatch(provider.as_ref(), &prompt, ctrl_c())
                        .await;
                    if session.finish_submit(result) == SubmitOutcome::Cancelled {
                        println!("{}", "Request cancelled".yellow());
                    }
                    flush_events(&mut session)?;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "Type 'exit' to quit".dimmed());
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    session.dispose();
                    return Err(err.into());
                }
            }
        }

        session.dispose();
        println!("Goodbye!");
        Ok(())
    }

    fn print_status(session: &ChatSession, model: &str) {
        let key = if session.has_credential() {
            "set".green()
        } else {
            "not set".yellow()
        };
        println!("Model:    {}", model.cyan());
        println!("API key:  {}", key);
        println!("Messages: {}", session.messages().len());
        println!("State:    {:?}", session.state());
        if let Some(error) = session.last_error() {
            println!("Last error: {}", error.red());
        }
    }
}

// Ask command handler
pub mod ask {
    //! One-shot mode: submit a single prompt and print the answer.

    use super::*;
    use crate::providers::Provider;

    /// Send `prompt` once and print the answer to stdout
    ///
    /// # Errors
    ///
    /// Returns the request failure (its message is what the chat view
    /// would show in the error banner).
    pub async fn run_ask(config: Config, api_key: Option<String>, prompt: String) -> Result<()> {
        let credential = credential::resolve(api_key.as_deref(), &config.credential)?;
        let provider = create_provider(&config.provider)?;
        let mut session = ChatSession::new(credential, &config);

        let answer = ask_once(&mut session, provider.as_ref(), prompt).await;
        session.dispose();

        println!("{}", answer?);
        Ok(())
    }

    /// Submit one prompt through `session` and return the answer text
    pub async fn ask_once(
        session: &mut ChatSession,
        provider: &dyn Provider,
        prompt: String,
    ) -> Result<String> {
        session.set_draft(prompt);
        session.submit_for_answer(provider, ctrl_c()).await
    }

}
