use std::cell::RefCell;
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use chirp_types::api::{InteractAction, InteractRequest, InteractResponse};

use crate::error::FeedError;
use crate::render::action_icon;

/// Where the page goes when an interaction needs a signed-in viewer.
pub const SIGN_IN_ROUTE: &str = "/signin/";

/// Sends toggle commands to the interaction endpoint.
pub trait InteractionTransport {
    fn send(&self, request: InteractRequest) -> impl Future<Output = Result<InteractResponse, FeedError>>;
}

/// The like or rechirp button of one rendered chirp.
pub trait ActionButton {
    fn set_icon(&self, icon: &str);
    fn set_count(&self, count: u64);
}

/// Whole-page navigation.
pub trait Navigator {
    fn navigate(&self, route: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// Server accepted the toggle; whatever it reported was applied.
    Applied {
        active: Option<bool>,
        count: Option<u64>,
    },
    /// Viewer is not signed in; the page was sent to the sign-in route.
    SignInRequired,
    /// Server refused with another error code. UI unchanged.
    Rejected(String),
    /// Transport, decode or timeout failure. UI unchanged.
    Failed,
    /// The same toggle on the same chirp was still in flight.
    Suppressed,
}

/// Toggles likes and rechirps. No optimistic updates: buttons only change
/// to what the server reports.
pub struct InteractionClient<T, N> {
    transport: T,
    navigator: N,
    timeout: Duration,
    in_flight: RefCell<HashSet<(i64, InteractAction)>>,
}

impl<T: InteractionTransport, N: Navigator> InteractionClient<T, N> {
    pub fn new(transport: T, navigator: N, timeout: Duration) -> Self {
        Self {
            transport,
            navigator,
            timeout,
            in_flight: RefCell::new(HashSet::new()),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub async fn toggle<B: ActionButton + ?Sized>(
        &self,
        chirp_id: i64,
        action: InteractAction,
        button: &B,
    ) -> InteractionOutcome {
        let key = (chirp_id, action);
        if !self.in_flight.borrow_mut().insert(key) {
            debug!(chirp_id, %action, "Toggle already in flight; ignoring click");
            return InteractionOutcome::Suppressed;
        }
        let _release = InFlightRelease {
            in_flight: &self.in_flight,
            key,
        };

        let request = InteractRequest { chirp_id, action };
        let result = match tokio::time::timeout(self.timeout, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(FeedError::Timeout(self.timeout)),
        };

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                error!(chirp_id, %action, "Error updating interaction: {}", e);
                return InteractionOutcome::Failed;
            }
        };

        if response.success {
            let (active, count) = response.state_for(action);
            if let Some(active) = active {
                button.set_icon(action_icon(action, active));
            }
            if let Some(count) = count {
                button.set_count(count);
            }
            return InteractionOutcome::Applied { active, count };
        }

        if response.is_not_signed_in() {
            info!(chirp_id, %action, "Interaction needs a signed-in viewer; redirecting");
            self.navigator.navigate(SIGN_IN_ROUTE);
            return InteractionOutcome::SignInRequired;
        }

        let code = response.error.unwrap_or_default();
        warn!(chirp_id, %action, code = %code, "Interaction rejected");
        InteractionOutcome::Rejected(code)
    }
}

struct InFlightRelease<'a> {
    in_flight: &'a RefCell<HashSet<(i64, InteractAction)>>,
    key: (i64, InteractAction),
}

impl Drop for InFlightRelease<'_> {
    fn drop(&mut self) {
        self.in_flight.borrow_mut().remove(&self.key);
    }
}
