//! Operator console: relays typed lines to the configured chat.

use crate::messenger::Messenger;
use std::io::{self, BufRead};
use std::time::Duration;
use teloxide::types::ChatId;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Lines read from standard input, or the read error that ended it.
pub type LineReceiver = mpsc::Receiver<io::Result<String>>;

/// Where console input goes and how often the loop runs.
pub struct Console<'a> {
    pub messenger: &'a dyn Messenger,
    pub chat_id: ChatId,
    pub prompt: String,
    pub idle_interval: Duration,
}

/// Why the console loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    /// Shutdown was requested elsewhere.
    Shutdown,
    /// Standard input was closed.
    EndOfInput,
    /// Reading standard input failed.
    ReadFailed,
}

/// Read stdin on a dedicated thread.
///
/// Blocking stdin reads can't be cancelled, so they must not live on the
/// runtime. The thread ends after EOF, a read error, or when the receiver
/// is dropped; a thread still blocked in `read` is left behind at exit.
pub fn stdin_lines() -> LineReceiver {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let failed = line.is_err();
            if tx.blocking_send(line).is_err() || failed {
                return;
            }
        }
    });
    rx
}

/// Build the prompt shown before each read.
pub fn prompt_for(bot_username: &str, chat_id: ChatId) -> String {
    format!("{}@{}> ", bot_username, chat_id)
}

impl Console<'_> {
    /// Run until `shutdown` is cancelled or input ends.
    ///
    /// End of input and read failures cancel `shutdown` themselves. Send
    /// failures are logged and the loop keeps going.
    pub async fn run<W>(
        &self,
        mut lines: LineReceiver,
        mut output: W,
        shutdown: &CancellationToken,
    ) -> ConsoleExit
    where
        W: AsyncWrite + Unpin,
    {
        let exit = loop {
            if shutdown.is_cancelled() {
                break ConsoleExit::Shutdown;
            }

            // A broken stdout shouldn't stop the relay.
            let _ = output.write_all(self.prompt.as_bytes()).await;
            let _ = output.flush().await;

            let line = tokio::select! {
                _ = shutdown.cancelled() => break ConsoleExit::Shutdown,
                line = lines.recv() => line,
            };

            match line {
                Some(Ok(text)) => self.relay(&text).await,
                None => {
                    tracing::info!("Console input closed");
                    break ConsoleExit::EndOfInput;
                }
                Some(Err(e)) => {
                    tracing::warn!("Failed to read console input: {}", e);
                    break ConsoleExit::ReadFailed;
                }
            }

            tokio::select! {
                _ = shutdown.cancelled() => {}
                _ = tokio::time::sleep(self.idle_interval) => {}
            }
        };

        shutdown.cancel();
        exit
    }

    async fn relay(&self, text: &str) {
        if text.is_empty() {
            return;
        }

        match self.messenger.send_text(self.chat_id, text).await {
            Ok(()) => tracing::debug!(chat_id = %self.chat_id, "Relayed console message"),
            Err(e) => tracing::warn!(
                chat_id = %self.chat_id,
                platform = self.messenger.platform_name(),
                "Failed to send console message: {}",
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messenger::testing::RecordingMessenger;

    /// Channel preloaded with `input`; closed afterwards unless kept open.
    fn lines_from(input: &[&str]) -> (mpsc::Sender<io::Result<String>>, LineReceiver) {
        let (tx, rx) = mpsc::channel(input.len() + 1);
        for line in input {
            tx.try_send(Ok(line.to_string())).unwrap();
        }
        (tx, rx)
    }

    fn closed_lines(input: &[&str]) -> LineReceiver {
        lines_from(input).1
    }

    fn console(messenger: &RecordingMessenger) -> Console<'_> {
        Console {
            messenger,
            chat_id: ChatId(-1),
            prompt: prompt_for("raspi_bot", ChatId(-1)),
            idle_interval: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_prompt_format() {
        assert_eq!(prompt_for("raspi_bot", ChatId(-1)), "raspi_bot@-1> ");
    }

    #[tokio::test]
    async fn test_lines_are_relayed_and_empty_lines_skipped() {
        let messenger = RecordingMessenger::new();
        let token = CancellationToken::new();
        let mut output = Vec::new();

        let exit = console(&messenger)
            .run(closed_lines(&["ping", "", "hello there"]), &mut output, &token)
            .await;

        assert_eq!(exit, ConsoleExit::EndOfInput);
        assert!(token.is_cancelled());
        assert_eq!(
            messenger.sent(),
            vec![
                (ChatId(-1), "ping".to_string()),
                (ChatId(-1), "hello there".to_string())
            ]
        );
        // One prompt per read, including the one answered by EOF.
        assert_eq!(String::from_utf8(output).unwrap().matches("raspi_bot@-1> ").count(), 4);
    }

    #[tokio::test]
    async fn test_send_failure_does_not_stop_loop() {
        let messenger = RecordingMessenger::failing_on(&[0]);
        let token = CancellationToken::new();

        let exit = console(&messenger)
            .run(closed_lines(&["lost", "kept"]), tokio::io::sink(), &token)
            .await;

        assert_eq!(exit, ConsoleExit::EndOfInput);
        assert_eq!(messenger.sent(), vec![(ChatId(-1), "kept".to_string())]);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_reads_nothing() {
        let messenger = RecordingMessenger::new();
        let token = CancellationToken::new();
        token.cancel();

        let exit = console(&messenger)
            .run(closed_lines(&["ping"]), tokio::io::sink(), &token)
            .await;

        assert_eq!(exit, ConsoleExit::Shutdown);
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_blocked_read() {
        let messenger = RecordingMessenger::new();
        let token = CancellationToken::new();
        // Sender kept alive: the read never completes.
        let (_tx, lines) = lines_from(&[]);

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let exit = console(&messenger).run(lines, tokio::io::sink(), &token).await;

        assert_eq!(exit, ConsoleExit::Shutdown);
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_read_error_requests_shutdown() {
        let messenger = RecordingMessenger::new();
        let token = CancellationToken::new();
        let (tx, lines) = lines_from(&["before"]);
        tx.try_send(Err(io::Error::other("stdin gone"))).unwrap();
        drop(tx);

        let exit = console(&messenger).run(lines, tokio::io::sink(), &token).await;

        assert_eq!(exit, ConsoleExit::ReadFailed);
        assert!(token.is_cancelled());
        assert_eq!(messenger.sent(), vec![(ChatId(-1), "before".to_string())]);
    }
}
