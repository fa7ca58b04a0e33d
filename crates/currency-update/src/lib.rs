pub mod notifier;
pub mod release;
pub mod state;
pub mod version;

pub use notifier::{check_interval, UpdateNotifier, EXTENSION_TITLE};
pub use release::{GithubReleaseSource, ReleaseInfo, ReleaseSource, RELEASE_CHECK_TIMEOUT};
pub use state::{UpdateState, UpdateStateStore};
pub use version::{is_newer, Version};
