use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use feed_core::{
    update, Effect, FeedError, FeedState, FetchFailure, FetchMode, FetchOutcome, FetchedPage, Msg,
    PageRequest, RequestToken,
};
use feed_logging::{feed_debug, feed_error, feed_info, feed_warn};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::{
    build_page_url, decode_page, EngineError, FeedEndpoint, ItemParser, ReqwestTransport,
    Transport, TransportSettings,
};

/// Callback invoked on the apply thread with the items a fetch added.
pub type Completion<T> = Box<dyn FnOnce(FetchOutcome<T>) + Send + 'static>;

enum ApplyCommand<T> {
    /// Effects produced by a caller-side update, plus the completion it brought.
    Execute {
        effects: Vec<Effect<T>>,
        completion: Option<(FetchMode, Completion<T>)>,
    },
    Fetched {
        token: RequestToken,
        result: Result<FetchedPage<T>, FetchFailure>,
    },
    Shutdown,
}

/// Paginated remote feed with dedup-on-merge.
///
/// Every entry point returns after a short lock of the feed state. Fetches
/// run on a background runtime; their results are merged, and completions
/// invoked, on a single apply thread owned by this handle.
pub struct FeedFetcher<T> {
    state: Arc<Mutex<FeedState<T>>>,
    cmd_tx: mpsc::Sender<ApplyCommand<T>>,
}

impl<T> FeedFetcher<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(
        endpoint: FeedEndpoint,
        transport: Arc<dyn Transport>,
        parser: Arc<dyn ItemParser<Item = T>>,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("feed-fetch")
            .enable_all()
            .build()?;

        feed_info!("Starting feed fetcher for {:?}", endpoint);
        let state = Arc::new(Mutex::new(FeedState::new()));
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let apply_loop = ApplyLoop {
            state: state.clone(),
            runtime,
            context: Arc::new(FetchContext {
                endpoint,
                transport,
                parser,
            }),
            cmd_tx: cmd_tx.clone(),
            pending: HashMap::new(),
            cancel: CancellationToken::new(),
        };
        thread::Builder::new()
            .name("feed-apply".to_string())
            .spawn(move || apply_loop.run(cmd_rx))?;

        Ok(Self { state, cmd_tx })
    }

    /// Builds a fetcher backed by [`ReqwestTransport`].
    pub fn with_settings(
        endpoint: FeedEndpoint,
        settings: TransportSettings,
        parser: Arc<dyn ItemParser<Item = T>>,
    ) -> Result<Self, EngineError> {
        let transport = ReqwestTransport::new(settings)?;
        Self::new(endpoint, Arc::new(transport), parser)
    }

    pub fn count(&self) -> usize {
        lock(&self.state).len()
    }

    pub fn item_at(&self, index: usize) -> Result<T, FeedError> {
        lock(&self.state).item_at(index).cloned()
    }

    pub fn index_of(&self, item: &T) -> Result<usize, FeedError>
    where
        T: PartialEq,
    {
        lock(&self.state).index_of(item)
    }

    /// Empties the feed, resets pagination and cancels running fetches.
    ///
    /// Completions of cancelled fetches receive [`FetchFailure::Cancelled`].
    pub fn clear_feed(&self) {
        self.dispatch(Msg::ClearRequested, None);
    }

    /// Loads the page after the current one and appends its unseen items.
    ///
    /// Ignored, and `on_complete` dropped uncalled, while a previous
    /// next-page request is still running.
    pub fn request_next_page<F>(&self, page_size: u32, on_complete: F)
    where
        F: FnOnce(FetchOutcome<T>) + Send + 'static,
    {
        self.dispatch(
            Msg::NextPageRequested { page_size },
            Some((FetchMode::NextPage, Box::new(on_complete))),
        );
    }

    /// Reloads page one and replaces the feed with it.
    ///
    /// Ignored, and `on_complete` dropped uncalled, while a previous refresh
    /// is still running.
    pub fn refresh_feed<F>(&self, page_size: u32, on_complete: F)
    where
        F: FnOnce(FetchOutcome<T>) + Send + 'static,
    {
        self.dispatch(
            Msg::RefreshRequested { page_size },
            Some((FetchMode::Refresh, Box::new(on_complete))),
        );
    }

    fn dispatch(&self, msg: Msg<T>, completion: Option<(FetchMode, Completion<T>)>) {
        let mut state = lock(&self.state);
        let effects = step(&mut state, msg);
        // Sent before unlocking so the apply loop sees effects in update order.
        let command = ApplyCommand::Execute {
            effects,
            completion,
        };
        if self.cmd_tx.send(command).is_err() {
            feed_error!("Apply loop has stopped; request dropped");
        }
    }
}

impl<T> Drop for FeedFetcher<T> {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(ApplyCommand::Shutdown);
    }
}

struct FetchContext<T> {
    endpoint: FeedEndpoint,
    transport: Arc<dyn Transport>,
    parser: Arc<dyn ItemParser<Item = T>>,
}

struct ApplyLoop<T> {
    state: Arc<Mutex<FeedState<T>>>,
    runtime: Runtime,
    context: Arc<FetchContext<T>>,
    cmd_tx: mpsc::Sender<ApplyCommand<T>>,
    pending: HashMap<FetchMode, Completion<T>>,
    /// Shared by every fetch started since the last cancellation.
    cancel: CancellationToken,
}

impl<T> ApplyLoop<T>
where
    T: Clone + Send + 'static,
{
    fn run(mut self, commands: mpsc::Receiver<ApplyCommand<T>>) {
        while let Ok(command) = commands.recv() {
            match command {
                ApplyCommand::Execute {
                    effects,
                    completion,
                } => {
                    if let Some((mode, completion)) = completion {
                        self.register(mode, completion, &effects);
                    }
                    self.execute(effects);
                }
                ApplyCommand::Fetched { token, result } => {
                    let effects = step(&mut lock(&self.state), Msg::PageFetched { token, result });
                    self.execute(effects);
                }
                ApplyCommand::Shutdown => break,
            }
        }
        self.cancel.cancel();
        feed_debug!(
            "Apply loop stopped with {} completions outstanding",
            self.pending.len()
        );
    }

    fn register(&mut self, mode: FetchMode, completion: Completion<T>, effects: &[Effect<T>]) {
        let accepted = effects.iter().any(|effect| match effect {
            Effect::StartFetch { token, .. } => token.mode == mode,
            Effect::Deliver { mode: target, .. } => *target == mode,
            Effect::CancelInFlight => false,
        });
        if accepted {
            self.pending.insert(mode, completion);
        } else {
            feed_debug!("{:?} fetch already in progress; request dropped", mode);
        }
    }

    fn execute(&mut self, effects: Vec<Effect<T>>) {
        for effect in effects {
            match effect {
                Effect::StartFetch { token, request } => self.spawn_fetch(token, request),
                Effect::Deliver { mode, outcome } => self.deliver(mode, outcome),
                Effect::CancelInFlight => {
                    self.cancel.cancel();
                    self.cancel = CancellationToken::new();
                }
            }
        }
    }

    fn spawn_fetch(&self, token: RequestToken, request: PageRequest) {
        feed_debug!(
            "{:?} fetch #{} for page {} (limit {})",
            token.mode,
            token.seq,
            request.page,
            request.page_size
        );
        let context = self.context.clone();
        let cmd_tx = self.cmd_tx.clone();
        let cancel = self.cancel.clone();
        self.runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    feed_debug!("{:?} fetch #{} cancelled", token.mode, token.seq);
                }
                result = fetch_page(&context, request) => {
                    let _ = cmd_tx.send(ApplyCommand::Fetched { token, result });
                }
            }
        });
    }

    fn deliver(&mut self, mode: FetchMode, outcome: FetchOutcome<T>) {
        match &outcome {
            Ok(items) => feed_info!("{:?} fetch added {} items", mode, items.len()),
            Err(FetchFailure::Cancelled | FetchFailure::Superseded) => {
                feed_debug!("{:?} fetch discarded", mode)
            }
            Err(err) => feed_warn!("{:?} fetch failed: {}", mode, err),
        }

        let Some(completion) = self.pending.remove(&mode) else {
            feed_debug!("No completion registered for {:?}", mode);
            return;
        };
        if panic::catch_unwind(AssertUnwindSafe(|| completion(outcome))).is_err() {
            feed_error!("{:?} completion panicked", mode);
        }
    }
}

async fn fetch_page<T>(
    context: &FetchContext<T>,
    request: PageRequest,
) -> Result<FetchedPage<T>, FetchFailure> {
    let url = build_page_url(&context.endpoint, request)?;
    let headers = [context.endpoint.credential_header()];
    let response = context.transport.get(&url, &headers).await?;
    let page = decode_page(&response, &*context.parser)?;
    if page.skipped_records > 0 {
        feed_warn!(
            "Page {} had {} unparseable records",
            request.page,
            page.skipped_records
        );
    }
    Ok(page)
}

fn step<T: Clone>(state: &mut FeedState<T>, msg: Msg<T>) -> Vec<Effect<T>> {
    let current = std::mem::take(state);
    let (next, effects) = update(current, msg);
    *state = next;
    effects
}

fn lock<T>(state: &Mutex<FeedState<T>>) -> MutexGuard<'_, FeedState<T>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
