use finbot_core::config::FinbotConfig;
use finbot_core::error::{FinbotError, Result};
use finbot_core::responder::Resolver;
use finbot_core::session::{ConversationMessage, ConversationSession};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{RwLock, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// The log plus the token of the current epoch.
///
/// Every reset starts a new epoch: the old token is cancelled and replaced by a
/// fresh child of the controller's token, so shutdown cancels every epoch too.
struct SessionState {
    log: ConversationSession,
    epoch: CancellationToken,
}

/// State shared between the controller handle and its worker task.
struct Shared {
    state: RwLock<SessionState>,
    /// Number of exchanges of the current epoch still waiting for their reply.
    /// Only changed while `state` is write-locked.
    pending: watch::Sender<usize>,
}

/// One queued exchange: resolve `text` and append the reply.
struct ExchangeJob {
    text: String,
    /// Cancelled by a reset after submission, or by shutdown.
    epoch: CancellationToken,
    reply: oneshot::Sender<Result<ConversationMessage>>,
}

/// Handle to the assistant reply of one accepted submission.
#[derive(Debug)]
pub struct PendingReply {
    rx: oneshot::Receiver<Result<ConversationMessage>>,
}

impl PendingReply {
    /// Waits for the assistant message.
    ///
    /// Fails with `Cancelled` if the session was reset or shut down first.
    pub async fn wait(self) -> Result<ConversationMessage> {
        self.rx
            .await
            .map_err(|_| FinbotError::cancelled("session closed before the reply was ready"))?
    }
}

/// Mediates between user input and the resolver for one conversation.
///
/// Submissions are processed by a single worker task in FIFO order: the user
/// message is appended at once, the reply after the simulated typing delay.
/// A submission made while an earlier reply is pending is queued behind it,
/// so replies always land in submission order.
pub struct SessionController {
    shared: Arc<Shared>,
    jobs: mpsc::UnboundedSender<ExchangeJob>,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SessionController {
    /// Starts a controller and its worker task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(resolver: Resolver, typing_delay: Duration) -> Self {
        let cancel = CancellationToken::new();
        let (pending, _) = watch::channel(0usize);
        let shared = Arc::new(Shared {
            state: RwLock::new(SessionState {
                log: ConversationSession::new(),
                epoch: cancel.child_token(),
            }),
            pending,
        });
        let (jobs, rx) = mpsc::unbounded_channel();

        let worker = tokio::spawn(run_worker(
            shared.clone(),
            resolver,
            typing_delay,
            rx,
            cancel.clone(),
        ));
        tracing::info!(delay_ms = typing_delay.as_millis() as u64, "Started session");

        Self {
            shared,
            jobs,
            cancel,
            worker: Mutex::new(Some(worker)),
        }
    }

    pub fn from_config(resolver: Resolver, config: &FinbotConfig) -> Self {
        Self::new(resolver, config.typing_delay())
    }

    /// Submits user text.
    ///
    /// Blank text is ignored and yields `Ok(None)`. Otherwise the user message
    /// is in the log when this returns, and the returned handle resolves to the
    /// assistant reply.
    pub async fn submit(&self, text: &str) -> Result<Option<PendingReply>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        if self.cancel.is_cancelled() {
            return Err(FinbotError::cancelled("session has been shut down"));
        }

        let (reply, rx) = oneshot::channel();
        {
            let mut state = self.shared.state.write().await;
            state.log.append(ConversationMessage::user(text));
            let job = ExchangeJob {
                text: text.to_string(),
                epoch: state.epoch.clone(),
                reply,
            };
            if self.jobs.send(job).is_err() {
                return Err(FinbotError::cancelled("session worker has stopped"));
            }
            self.shared.pending.send_modify(|n| *n += 1);
        }
        tracing::debug!(pending = *self.shared.pending.borrow(), "Queued exchange");

        Ok(Some(PendingReply { rx }))
    }

    /// Clears the log back to the greeting.
    ///
    /// Replies of exchanges submitted before the reset are discarded at once,
    /// including one whose typing delay is running, so composing ends here.
    pub async fn reset(&self) {
        let mut state = self.shared.state.write().await;
        state.epoch.cancel();
        state.epoch = self.cancel.child_token();
        state.log.reset();
        self.shared.pending.send_replace(0);
        tracing::info!("Session reset");
    }

    /// A copy of the whole log.
    pub async fn messages(&self) -> Vec<ConversationMessage> {
        self.shared.state.read().await.log.messages().to_vec()
    }

    /// A copy of the last `n` messages, oldest first.
    pub async fn last_messages(&self, n: usize) -> Vec<ConversationMessage> {
        self.shared.state.read().await.log.last_messages(n).to_vec()
    }

    /// True while at least one reply is pending.
    pub fn is_composing(&self) -> bool {
        *self.shared.pending.borrow() > 0
    }

    /// Watches the number of pending replies; the view shows "typing" while it is non-zero.
    pub fn subscribe_composing(&self) -> watch::Receiver<usize> {
        self.shared.pending.subscribe()
    }

    /// Stops the worker. Pending replies are dropped, never appended.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                tracing::warn!("Session worker ended abnormally: {}", e);
            }
        }
        tracing::info!("Session shut down");
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn discarded(cancel: &CancellationToken) -> FinbotError {
    if cancel.is_cancelled() {
        FinbotError::cancelled("session has been shut down")
    } else {
        FinbotError::cancelled("session was reset")
    }
}

async fn run_worker(
    shared: Arc<Shared>,
    resolver: Resolver,
    typing_delay: Duration,
    mut rx: mpsc::UnboundedReceiver<ExchangeJob>,
    cancel: CancellationToken,
) {
    loop {
        let job = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            job = rx.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        tokio::select! {
            biased;
            _ = job.epoch.cancelled() => {
                let _ = job.reply.send(Err(discarded(&cancel)));
                if cancel.is_cancelled() {
                    break;
                }
                tracing::debug!("Discarding reply submitted before reset");
                continue;
            }
            _ = tokio::time::sleep(typing_delay) => {}
        }

        let content = resolver.resolve(&job.text);
        let outcome = {
            let mut state = shared.state.write().await;
            if job.epoch.is_cancelled() {
                Err(discarded(&cancel))
            } else {
                let message = state.log.append(ConversationMessage::assistant(content)).clone();
                shared.pending.send_modify(|n| *n = n.saturating_sub(1));
                Ok(message)
            }
        };
        let _ = job.reply.send(outcome);
    }

    // Remaining jobs are dropped; their waiters observe a closed channel.
    rx.close();
    shared.pending.send_replace(0);
    tracing::debug!("Session worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use finbot_core::responder::{
        FixedChoice, ResponseTableSet, builtin::FALLBACK_REPLY, builtin::GREETING_REPLY,
    };
    use finbot_core::session::{GREETING_MESSAGE, MessageRole};

    const DELAY: Duration = Duration::from_millis(1000);

    fn controller() -> SessionController {
        SessionController::new(Resolver::builtin(), DELAY)
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_submissions_are_ignored() {
        let controller = controller();
        assert!(controller.submit("").await.unwrap().is_none());
        assert!(controller.submit("   ").await.unwrap().is_none());
        assert!(controller.submit("\n\t").await.unwrap().is_none());

        assert_eq!(controller.messages().await.len(), 1);
        assert!(!controller.is_composing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_money_exchange() {
        let controller = controller();
        let reply = controller.submit("save money").await.unwrap().unwrap();
        let assistant = reply.wait().await.unwrap();

        let save = ResponseTableSet::builtin()
            .keywords
            .get("save")
            .unwrap()
            .candidates
            .clone();

        let last = controller.last_messages(2).await;
        assert_eq!(last[0].role, MessageRole::User);
        assert_eq!(last[0].content, "save money");
        assert_eq!(last[1].role, MessageRole::Assistant);
        assert!(save.contains(&last[1].content));
        assert_eq!(last[1], assistant);
    }

    #[tokio::test(start_paused = true)]
    async fn test_user_message_is_appended_before_reply() {
        let controller = controller();
        let _reply = controller.submit("hello").await.unwrap().unwrap();

        let messages = controller.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "hello");
        assert!(controller.is_composing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_waits_for_typing_delay() {
        let controller = controller();
        let start = tokio::time::Instant::now();
        let reply = controller.submit("hello").await.unwrap().unwrap();
        let message = reply.wait().await.unwrap();

        assert!(start.elapsed() >= DELAY);
        assert_eq!(message.content, GREETING_REPLY);
        assert!(!controller.is_composing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_submissions_reply_in_order() {
        let controller = SessionController::new(
            Resolver::new(
                Arc::new(ResponseTableSet::builtin()),
                Arc::new(FixedChoice(0)),
            ),
            DELAY,
        );

        let first = controller.submit("hello").await.unwrap().unwrap();
        let second = controller.submit("asdkjasdkj").await.unwrap().unwrap();
        let third = controller.submit("what is inflation").await.unwrap().unwrap();
        assert_eq!(*controller.subscribe_composing().borrow(), 3);

        third.wait().await.unwrap();
        first.wait().await.unwrap();
        second.wait().await.unwrap();

        let replies: Vec<String> = controller
            .messages()
            .await
            .into_iter()
            .filter(|m| m.role == MessageRole::Assistant)
            .skip(1) // greeting
            .map(|m| m.content)
            .collect();
        assert_eq!(replies.len(), 3);
        assert_eq!(replies[0], GREETING_REPLY);
        assert_eq!(replies[1], FALLBACK_REPLY);
        assert!(replies[2].starts_with("INFLATION: "));

        let stamps: Vec<_> = controller
            .messages()
            .await
            .iter()
            .map(|m| m.timestamp)
            .collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
        assert!(!controller.is_composing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_discards_pending_reply() {
        let controller = controller();
        let reply = controller.submit("hello").await.unwrap().unwrap();
        controller.reset().await;

        let err = reply.wait().await.unwrap_err();
        assert!(err.is_cancelled());

        let messages = controller.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, GREETING_MESSAGE);
        assert!(!controller.is_composing());

        // The session keeps working after a reset
        let reply = controller.submit("hey").await.unwrap().unwrap();
        assert_eq!(reply.wait().await.unwrap().content, GREETING_REPLY);
        assert_eq!(controller.messages().await.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_ends_composing_at_once() {
        let controller = controller();
        let typing = controller.submit("hello").await.unwrap().unwrap();
        let queued = controller.submit("hello again").await.unwrap().unwrap();

        // The first reply is halfway through its typing delay
        tokio::time::sleep(DELAY / 2).await;
        controller.reset().await;

        assert!(!controller.is_composing());
        assert_eq!(*controller.subscribe_composing().borrow(), 0);
        assert_eq!(controller.messages().await.len(), 1);
        assert!(typing.wait().await.unwrap_err().is_cancelled());
        assert!(queued.wait().await.unwrap_err().is_cancelled());

        // The next exchange waits for one delay, not the rest of the old one as well
        let start = tokio::time::Instant::now();
        let reply = controller.submit("hey").await.unwrap().unwrap();
        assert!(controller.is_composing());
        let message = reply.wait().await.unwrap();
        let elapsed = start.elapsed();

        assert!(elapsed >= DELAY);
        assert!(elapsed < DELAY + DELAY / 2);
        assert_eq!(message.content, GREETING_REPLY);
        assert_eq!(controller.messages().await.len(), 3);
        assert!(!controller.is_composing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drops_pending_reply() {
        let controller = controller();
        let first = controller.submit("hello").await.unwrap().unwrap();
        let second = controller.submit("hello again").await.unwrap().unwrap();
        controller.shutdown().await;

        assert!(first.wait().await.unwrap_err().is_cancelled());
        assert!(second.wait().await.unwrap_err().is_cancelled());
        assert_eq!(controller.messages().await.len(), 3);
        assert!(!controller.is_composing());

        let err = controller.submit("anyone?").await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_worker() {
        let controller = controller();
        let reply = controller.submit("hello").await.unwrap().unwrap();
        drop(controller);
        assert!(reply.wait().await.unwrap_err().is_cancelled());
    }
}
