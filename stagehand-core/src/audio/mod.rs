//! Audio instance lifecycle: categorized playback, fades and release.

mod instance;
#[cfg(feature = "kira")]
mod kira_output;
mod port;
mod registry;

pub use instance::{Category, FadeState, InstanceId, InstanceSnapshot};
#[cfg(feature = "kira")]
pub use kira_output::{volume_to_db, KiraHandle, KiraPlaybackPort, KiraSound};
pub use port::{PlaybackHandle, PlaybackParams, SoundBuffer, SoundPlaybackPort};
pub use registry::{AudioInstanceRegistry, PlayOptions};
