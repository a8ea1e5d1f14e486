//! CLI channel: stdin/stdout REPL for local testing.

use async_trait::async_trait;
use futures::stream;
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use crate::bot::{Activity, OutgoingResponse};
use crate::channels::{ActivityStream, Channel};
use crate::error::ChannelError;

pub const CLI_USER: &str = "local-user";

/// Reads lines from stdin as messages and prints replies to stdout.
///
/// The session opens with a conversation update announcing the local user
/// so the welcome message is shown.
pub struct CliChannel {
    bot_id: String,
    conversation_id: String,
}

impl CliChannel {
    pub fn new(bot_id: impl Into<String>) -> Self {
        Self {
            bot_id: bot_id.into(),
            conversation_id: Uuid::new_v4().to_string(),
        }
    }

    fn stamp(&self, activity: Activity) -> Activity {
        activity.with_channel("cli").with_recipient(&self.bot_id)
    }

    /// Activity for one input line, or `None` for a quit command.
    fn activity_for_line(&self, line: &str) -> Option<Activity> {
        match line {
            "/quit" | "/exit" => None,
            _ => Some(self.stamp(Activity::message(
                &self.conversation_id,
                CLI_USER,
                line,
            ))),
        }
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<ActivityStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        let joined = self.stamp(Activity::members_added(
            &self.conversation_id,
            &[CLI_USER, self.bot_id.as_str()],
        ));
        tx.send(joined).map_err(|e| ChannelError::StartupFailed {
            name: "cli".into(),
            reason: e.to_string(),
        })?;

        let template = CliChannel {
            bot_id: self.bot_id.clone(),
            conversation_id: self.conversation_id.clone(),
        };
        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            eprint!("> ");

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            eprint!("> ");
                            continue;
                        }
                        let Some(activity) = template.activity_for_line(&line) else {
                            break;
                        };
                        if tx.send(activity).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|activity| (activity, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(
        &self,
        _activity: &Activity,
        response: &OutgoingResponse,
    ) -> Result<(), ChannelError> {
        println!("{}", response.text);
        Ok(())
    }
}
