// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree-wide configuration.

/// Configuration shared by every layer of a
/// [`LayerStore`](crate::layer::LayerStore).
///
/// Passed once at construction via
/// [`LayerStore::with_settings`](crate::layer::LayerStore::with_settings).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerTreeSettings {
    /// Whether animations may run on the compositor.
    ///
    /// When disabled, [`LayerStore::add_animation`] returns `false` and the
    /// caller is expected to fall back to driving the property from the main
    /// side with ordinary setters.
    ///
    /// [`LayerStore::add_animation`]: crate::layer::LayerStore::add_animation
    pub accelerated_animation_enabled: bool,
}

impl LayerTreeSettings {
    /// Default settings: accelerated animation enabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            accelerated_animation_enabled: true,
        }
    }

    /// Settings for hosts that cannot run compositor-side animations.
    #[must_use]
    pub const fn without_accelerated_animation() -> Self {
        Self {
            accelerated_animation_enabled: false,
        }
    }
}

impl Default for LayerTreeSettings {
    fn default() -> Self {
        Self::new()
    }
}
