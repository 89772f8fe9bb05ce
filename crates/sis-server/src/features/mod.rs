//! Feature modules implementing the SIS bulk data API
//!
//! Each feature is a vertical slice with its own commands, queries, and
//! routes:
//!
//! - **imports**: file upload, validation preview, commit, cancellation
//! - **exports**: extract generation, status polling, artifact download
//!
//! Commands and queries follow the mediator pattern from the `mediator`
//! crate; routes call the handlers directly and translate their errors into
//! HTTP responses.

pub mod exports;
pub mod imports;

use crate::state::AppState;
use axum::Router;

/// Creates the API router with all feature routes mounted
///
/// - `/imports` - Import job pipeline
/// - `/exports` - Export job pipeline
pub fn router(state: AppState) -> Router<()> {
    Router::new()
        .nest("/imports", imports::imports_routes())
        .nest("/exports", exports::exports_routes())
        .with_state(state)
}
