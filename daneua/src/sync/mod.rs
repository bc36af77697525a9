//! Client-side sync layer
//!
//! Everything between the backend and a feature: the typed gateway, change
//! feed subscriptions, the reconciled collection each view renders and the
//! mount lifetime that ties them together.

pub mod feed;
pub mod gateway;
pub mod reconciler;
pub mod scope;
pub mod typing;
pub mod view;

pub use feed::{Change, FeedEvent, SignalSubscription, Subscription};
pub use gateway::Gateway;
pub use reconciler::{Collection, Comparator};
pub use scope::MountScope;
pub use typing::TypingIndicator;
pub use view::{LoadState, View};
