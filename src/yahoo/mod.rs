//! Yahoo Fantasy API: endpoints, pagination, shape decoding and normalization.

pub mod endpoints;
pub mod normalize;
pub mod paginate;
pub mod settings;
pub mod shape;
pub mod types;

pub use endpoints::{EndpointClient, FetchPolicy, PageParams, RawPayload, Resource};
pub use normalize::{normalize, Categories, Diagnostic, Normalized};
pub use paginate::{collect_pages, paginate, PageCursor, RawPage};
pub use settings::load_or_fetch_league_settings;
pub use types::{Entity, EntityKind, LeagueSettings, StoredEntity};
