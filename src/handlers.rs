//! Update handlers and the dispatcher's error logger.

use crate::error::HandlerError;
use crate::messenger::Messenger;
use crate::routing::{InboundUpdate, Route};
use futures_util::future::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use teloxide::error_handlers::ErrorHandler;
use teloxide::types::ChatId;

/// Reply to /start.
pub const START_REPLY: &str = "Hi, I'm Raspi Surveillance Bot!";
/// Reply to /help.
pub const HELP_REPLY: &str = "This is the Raspi Surveillance Bot.";
/// Reply to any command other than /start and /help.
pub const UNKNOWN_REPLY: &str = "Sorry, I didn't understand that command.";

/// Outcome of a single handler run.
pub type HandlerResult = Result<(), HandlerError>;

async fn reply(
    messenger: &dyn Messenger,
    handler: &'static str,
    chat_id: ChatId,
    text: &str,
) -> HandlerResult {
    messenger
        .send_text(chat_id, text)
        .await
        .map_err(|source| HandlerError {
            handler,
            chat_id,
            source,
        })
}

/// Handle the /start command.
pub async fn start(messenger: &dyn Messenger, chat_id: ChatId) -> HandlerResult {
    reply(messenger, "start", chat_id, START_REPLY).await
}

/// Handle the /help command.
pub async fn help(messenger: &dyn Messenger, chat_id: ChatId) -> HandlerResult {
    reply(messenger, "help", chat_id, HELP_REPLY).await
}

/// Reflect plain text back to its chat.
pub async fn echo(messenger: &dyn Messenger, chat_id: ChatId, text: &str) -> HandlerResult {
    reply(messenger, "echo", chat_id, text).await
}

/// Handle any command we don't know.
pub async fn unknown(messenger: &dyn Messenger, chat_id: ChatId) -> HandlerResult {
    reply(messenger, "unknown", chat_id, UNKNOWN_REPLY).await
}

/// Dispatcher endpoint: run the handler the update was routed to.
pub async fn dispatch(messenger: Arc<dyn Messenger>, update: InboundUpdate) -> HandlerResult {
    tracing::debug!(
        chat_id = %update.chat_id,
        handler = update.route.handler_name(),
        "Dispatching update"
    );

    let messenger = messenger.as_ref();
    match &update.route {
        Route::Start => start(messenger, update.chat_id).await,
        Route::Help => help(messenger, update.chat_id).await,
        Route::Echo(text) => echo(messenger, update.chat_id, text).await,
        Route::Unknown => unknown(messenger, update.chat_id).await,
    }
}

/// Logs every handler error and lets the dispatcher carry on.
#[derive(Debug, Default)]
pub struct DispatchErrorLogger {
    logged: AtomicUsize,
}

impl DispatchErrorLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of errors logged so far.
    pub fn logged(&self) -> usize {
        self.logged.load(Ordering::Relaxed)
    }

    fn log(&self, error: &HandlerError) {
        self.logged.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(
            chat_id = %error.chat_id,
            handler = error.handler,
            "Update caused error: {}",
            error.source
        );
    }
}

impl ErrorHandler<HandlerError> for DispatchErrorLogger {
    fn handle_error(self: Arc<Self>, error: HandlerError) -> BoxFuture<'static, ()> {
        self.log(&error);
        Box::pin(async {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messenger::testing::RecordingMessenger;

    fn update(chat: i64, route: Route) -> InboundUpdate {
        InboundUpdate {
            chat_id: ChatId(chat),
            route,
        }
    }

    #[tokio::test]
    async fn test_start_replies_with_greeting() {
        let messenger = Arc::new(RecordingMessenger::new());
        dispatch(messenger.clone(), update(5, Route::Start))
            .await
            .unwrap();

        assert_eq!(
            messenger.sent(),
            vec![(ChatId(5), "Hi, I'm Raspi Surveillance Bot!".to_string())]
        );
    }

    #[tokio::test]
    async fn test_help_replies_with_description() {
        let messenger = Arc::new(RecordingMessenger::new());
        dispatch(messenger.clone(), update(5, Route::Help))
            .await
            .unwrap();

        assert_eq!(messenger.sent(), vec![(ChatId(5), HELP_REPLY.to_string())]);
        assert!(!HELP_REPLY.is_empty());
    }

    #[tokio::test]
    async fn test_echo_is_verbatim() {
        let messenger = Arc::new(RecordingMessenger::new());
        for text in ["hello", "  two  spaces ", "ünïcødé 🎥", "line\nbreak"] {
            dispatch(messenger.clone(), update(-9, Route::Echo(text.to_string())))
                .await
                .unwrap();
        }

        let payloads: Vec<_> = messenger.sent().into_iter().map(|(_, t)| t).collect();
        assert_eq!(payloads, vec!["hello", "  two  spaces ", "ünïcødé 🎥", "line\nbreak"]);
    }

    #[tokio::test]
    async fn test_unknown_command_apologises() {
        let messenger = Arc::new(RecordingMessenger::new());
        let route = Route::classify(Some("/foo"), "raspi_bot").unwrap();
        dispatch(messenger.clone(), update(3, route)).await.unwrap();

        assert_eq!(
            messenger.sent(),
            vec![(
                ChatId(3),
                "Sorry, I didn't understand that command.".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_failure_is_logged_once_and_dispatch_continues() {
        let messenger = Arc::new(RecordingMessenger::failing_on(&[0]));
        let logger = DispatchErrorLogger::new();

        for upd in [update(1, Route::Start), update(2, Route::Echo("still here".into()))] {
            if let Err(e) = dispatch(messenger.clone(), upd).await {
                logger.clone().handle_error(e).await;
            }
        }

        assert_eq!(logger.logged(), 1);
        assert_eq!(
            messenger.sent(),
            vec![(ChatId(2), "still here".to_string())]
        );
    }

    #[tokio::test]
    async fn test_handler_error_names_handler_and_chat() {
        let messenger = RecordingMessenger::failing_on(&[0]);
        let err = unknown(&messenger, ChatId(77)).await.unwrap_err();

        assert_eq!(err.handler, "unknown");
        assert_eq!(err.chat_id, ChatId(77));
        assert!(err.to_string().contains("77"));
    }
}
