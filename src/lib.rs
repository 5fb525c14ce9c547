//! # imgcomp
//!
//! Pixel-level comparison of two raster images: load them (converting JPEG XL
//! through an external decoder), scale them for display, compute an amplified
//! difference swatch with a mean-absolute-error metric, and render an
//! interactive "slider" overlay of one image over the other.
//!
//! # Architecture
//!
//! ```text
//! path A ─┐                          ┌─ preview A ─┐
//!         ├─ codec ─ rayon::join ────┤             ├─ slider frame (crop + overlay)
//! path B ─┘                          └─ preview B ─┘
//!                   full-res A, B ──── diff ──── swatch + MAE
//! ```
//!
//! Every transform in [`imaging`] is a pure function that allocates a fresh
//! output buffer. The only state lives in a [`session::ComparisonSession`],
//! which the caller owns.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Decode, fit-to-bounds geometry, resize, crop, and the diff engine |
//! | [`tools`] | `Converter` / `TrashService` capabilities backed by external programs |
//! | [`session`] | `ComparisonSession`: the two loaded images plus settings |
//! | [`debounce`] | Latest-wins debouncer for high-frequency crop requests |
//! | [`ignore_log`] | Append-only log of ignored pairs, with order-insensitive lookup |
//! | [`config`] | `imgcomp.toml` loading, merging over stock defaults, validation |
//! | [`format`] | Thousands separators and path wrapping for display |
//! | [`output`] | CLI rendering of image summaries, diff verdicts, JSON reports |
//!
//! # Design Decisions
//!
//! ## The First Image Is the Canonical Frame
//!
//! When the two images differ in size, the second is resampled to the first
//! image's dimensions before comparison. The swatch has the first image's size
//! and `pixel_count` is its area. Swapping the arguments can therefore change
//! the metric; callers that want a symmetric answer must compare both ways.
//!
//! ## Premultiplied Alpha
//!
//! Channels are compared after premultiplying by alpha in 16-bit space, then
//! truncated to 8 bits. Two fully transparent pixels compare equal whatever
//! their color channels hold.
//!
//! ## External Tools Behind Traits
//!
//! JPEG XL decoding and trashing are delegated to programs found on `PATH`.
//! [`tools::Converter`] and [`tools::TrashService`] keep that boundary narrow,
//! so everything above it is tested with in-process fakes.

pub mod config;
pub mod debounce;
pub mod format;
pub mod ignore_log;
pub mod imaging;
pub mod output;
pub mod session;
pub mod tools;

#[cfg(test)]
pub(crate) mod test_helpers;
