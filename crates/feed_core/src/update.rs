use crate::{Effect, FeedState, FetchFailure, FetchMode, FetchedPage, Msg, RequestToken};

/// Pure update function: applies a message to state and returns any effects.
pub fn update<T: Clone>(mut state: FeedState<T>, msg: Msg<T>) -> (FeedState<T>, Vec<Effect<T>>) {
    let effects = match msg {
        Msg::NextPageRequested { page_size } => {
            if state.is_fetching(FetchMode::NextPage) {
                return (state, Vec::new());
            }
            if page_size == 0 {
                return (state, vec![reject(FetchMode::NextPage)]);
            }
            if state.pagination().is_exhausted() {
                // Nothing left on the server; complete without touching the network.
                return (
                    state,
                    vec![Effect::Deliver {
                        mode: FetchMode::NextPage,
                        outcome: Ok(Vec::new()),
                    }],
                );
            }
            let (token, request) = state.begin_fetch(FetchMode::NextPage, page_size);
            vec![Effect::StartFetch { token, request }]
        }
        Msg::RefreshRequested { page_size } => {
            if state.is_fetching(FetchMode::Refresh) {
                return (state, Vec::new());
            }
            if page_size == 0 {
                return (state, vec![reject(FetchMode::Refresh)]);
            }
            // Any page fetch still in flight was issued against the old feed.
            state.bump_epoch();
            state.reset_current_page();
            let (token, request) = state.begin_fetch(FetchMode::Refresh, page_size);
            vec![Effect::StartFetch { token, request }]
        }
        Msg::PageFetched { token, result } => page_fetched(&mut state, token, result),
        Msg::ClearRequested => {
            state.clear();
            state.bump_epoch();
            // Cancel first so no cancelled fetch can still answer once its completion has run.
            let mut effects = vec![Effect::CancelInFlight];
            effects.extend(state.release_all().into_iter().map(|mode| Effect::Deliver {
                mode,
                outcome: Err(FetchFailure::Cancelled),
            }));
            effects
        }
    };

    (state, effects)
}

fn page_fetched<T: Clone>(
    state: &mut FeedState<T>,
    token: RequestToken,
    result: Result<FetchedPage<T>, FetchFailure>,
) -> Vec<Effect<T>> {
    let Some(in_flight) = state.finish_fetch(token) else {
        // Slot was released by a clear; its completion has already been delivered.
        return Vec::new();
    };

    let outcome = if token.epoch != state.epoch() {
        Err(FetchFailure::Superseded)
    } else {
        result.map(|page| state.apply_page(page, in_flight.page_size, token.mode.is_replacing()))
    };

    vec![Effect::Deliver {
        mode: token.mode,
        outcome,
    }]
}

fn reject<T>(mode: FetchMode) -> Effect<T> {
    Effect::Deliver {
        mode,
        outcome: Err(FetchFailure::InvalidPageSize),
    }
}
