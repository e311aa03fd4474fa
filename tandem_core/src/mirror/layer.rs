// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The compositor-side copy of one layer.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Size, Vec2};

use crate::animation::AnimationController;
use crate::color::Color;
use crate::filter::FilterOperations;
use crate::layer::{LayerKey, LayerKind, ScrollbarOrientation};
use crate::region::Region;
use crate::transform::Transform3d;

/// Thumb geometry of a scrollbar mirror, derived from the layer it tracks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollbarGeometry {
    /// Id of the scrolled layer.
    pub scroll_layer: LayerKey,
    /// Axis tracked.
    pub orientation: ScrollbarOrientation,
    /// Scroll offset along the axis, compositor delta included.
    pub current_pos: f64,
    /// Extent of the scrolled content along the axis.
    pub total_size: f64,
    /// Largest scroll offset along the axis.
    pub maximum: f64,
}

/// A layer as the compositor sees it.
///
/// Mirrored properties are plain public fields: the commit overwrites them,
/// and compositor-side code (animation, scrolling) writes the ones it owns.
/// Structure, pending damage, and scroll reconciliation state are private and
/// only change through methods.
#[derive(Clone, Debug)]
pub struct MirrorLayer {
    key: LayerKey,
    pub(crate) parent: Option<LayerKey>,
    pub(crate) children: Vec<LayerKey>,
    pub(crate) mask: Option<LayerKey>,
    pub(crate) replica: Option<LayerKey>,
    pub(crate) scrollbar: Option<ScrollbarGeometry>,
    pub(crate) horizontal_scrollbar: Option<LayerKey>,
    pub(crate) vertical_scrollbar: Option<LayerKey>,
    pub(crate) animations: AnimationController,
    update_rect: Rect,
    scroll_delta: Vec2,
    sent_scroll_delta: Vec2,
    pub(crate) stacking_order_changed: bool,

    /// Layer size.
    pub bounds: Size,
    /// Position of the anchor point in the parent's space.
    pub position: Point,
    /// Anchor point as a fraction of bounds.
    pub anchor_point: Point,
    /// Depth component of the anchor point.
    pub anchor_point_z: f64,
    /// Content transform. Owned by the compositor while animating.
    pub transform: Transform3d,
    /// Transform applied to children.
    pub sublayer_transform: Transform3d,
    /// Opacity. Owned by the compositor while animating.
    pub opacity: f32,
    /// Background color.
    pub background_color: Color,
    /// Whether the content is opaque.
    pub contents_opaque: bool,
    /// Whether the back face is visible.
    pub double_sided: bool,
    /// Whether descendants are clipped to bounds.
    pub masks_to_bounds: bool,
    /// Whether the layer always gets a render surface.
    pub force_render_surface: bool,
    /// Whether the layer has content of its own.
    pub draws_content: bool,
    /// Whether children share the layer's 3D space.
    pub preserves_3d: bool,
    /// Whether backface visibility comes from the parent.
    pub use_parent_backface_visibility: bool,
    /// Whether text uses subpixel antialiasing.
    pub use_lcd_text: bool,
    /// Whether missing tiles draw as a checkerboard.
    pub draw_checkerboard_for_missing_tiles: bool,
    /// Content filters.
    pub filters: FilterOperations,
    /// Background filters.
    pub background_filters: FilterOperations,
    /// Debugging name.
    pub debug_name: String,
    /// Debug border color.
    pub debug_border_color: Color,
    /// Debug border width.
    pub debug_border_width: f64,
    /// Scroll offset last committed by the main side.
    pub scroll_position: Vec2,
    /// Largest scroll offset.
    pub max_scroll_position: Vec2,
    /// Whether the compositor may scroll the layer.
    pub scrollable: bool,
    /// Whether scrolling must go through the main side.
    pub should_scroll_on_main_thread: bool,
    /// Whether wheel handlers are registered.
    pub have_wheel_event_handlers: bool,
    /// Area where input must go to the main side.
    pub non_fast_scrollable_region: Region,
    /// Whether fixed-position descendants are positioned against this layer.
    pub is_container_for_fixed_position_layers: bool,
    /// Whether the layer is fixed to its container.
    pub fixed_to_container_layer: bool,
}

impl MirrorLayer {
    /// Creates a content mirror with default properties.
    #[must_use]
    pub fn new(key: LayerKey) -> Self {
        Self {
            key,
            parent: None,
            children: Vec::new(),
            mask: None,
            replica: None,
            scrollbar: None,
            horizontal_scrollbar: None,
            vertical_scrollbar: None,
            animations: AnimationController::for_layer(key),
            update_rect: Rect::ZERO,
            scroll_delta: Vec2::ZERO,
            sent_scroll_delta: Vec2::ZERO,
            stacking_order_changed: false,
            bounds: Size::ZERO,
            position: Point::ORIGIN,
            anchor_point: Point::new(0.5, 0.5),
            anchor_point_z: 0.0,
            transform: Transform3d::IDENTITY,
            sublayer_transform: Transform3d::IDENTITY,
            opacity: 1.0,
            background_color: Color::TRANSPARENT,
            contents_opaque: false,
            double_sided: true,
            masks_to_bounds: false,
            force_render_surface: false,
            draws_content: false,
            preserves_3d: false,
            use_parent_backface_visibility: false,
            use_lcd_text: false,
            draw_checkerboard_for_missing_tiles: false,
            filters: FilterOperations::new(),
            background_filters: FilterOperations::new(),
            debug_name: String::new(),
            debug_border_color: Color::TRANSPARENT,
            debug_border_width: 0.0,
            scroll_position: Vec2::ZERO,
            max_scroll_position: Vec2::ZERO,
            scrollable: false,
            should_scroll_on_main_thread: false,
            have_wheel_event_handlers: false,
            non_fast_scrollable_region: Region::new(),
            is_container_for_fixed_position_layers: false,
            fixed_to_container_layer: false,
        }
    }

    /// Creates the mirror variant matching a main-side layer kind.
    #[must_use]
    pub fn for_kind(key: LayerKey, kind: LayerKind) -> Self {
        let mut layer = Self::new(key);
        if let LayerKind::Scrollbar {
            scroll_layer,
            orientation,
        } = kind
        {
            layer.scrollbar = Some(ScrollbarGeometry {
                scroll_layer,
                orientation,
                current_pos: 0.0,
                total_size: 0.0,
                maximum: 0.0,
            });
        }
        layer
    }

    /// The id shared with the main-side layer.
    #[must_use]
    pub fn key(&self) -> LayerKey {
        self.key
    }

    /// Parent id, if any.
    #[must_use]
    pub fn parent(&self) -> Option<LayerKey> {
        self.parent
    }

    /// Child ids in stacking order.
    #[must_use]
    pub fn children(&self) -> &[LayerKey] {
        &self.children
    }

    /// Id of the mask mirror.
    #[must_use]
    pub fn mask_layer(&self) -> Option<LayerKey> {
        self.mask
    }

    /// Id of the replica mirror.
    #[must_use]
    pub fn replica_layer(&self) -> Option<LayerKey> {
        self.replica
    }

    /// Thumb geometry, for scrollbar mirrors.
    #[must_use]
    pub fn scrollbar(&self) -> Option<&ScrollbarGeometry> {
        self.scrollbar.as_ref()
    }

    /// The horizontal scrollbar tracking this layer, if any.
    #[must_use]
    pub fn horizontal_scrollbar_layer(&self) -> Option<LayerKey> {
        self.horizontal_scrollbar
    }

    /// The vertical scrollbar tracking this layer, if any.
    #[must_use]
    pub fn vertical_scrollbar_layer(&self) -> Option<LayerKey> {
        self.vertical_scrollbar
    }

    /// The compositor's copy of the layer's animations.
    #[must_use]
    pub fn animation_controller(&self) -> &AnimationController {
        &self.animations
    }

    /// Whether the layer moved within its parent since the last draw.
    #[must_use]
    pub fn stacking_order_changed(&self) -> bool {
        self.stacking_order_changed
    }

    /// Damage not yet drawn.
    #[must_use]
    pub fn update_rect(&self) -> Rect {
        self.update_rect
    }

    /// Replaces the pending damage.
    pub fn set_update_rect(&mut self, rect: Rect) {
        self.update_rect = rect;
    }

    /// Scroll applied on the compositor and not yet absorbed by the main side.
    #[must_use]
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }

    /// Overwrites the compositor scroll delta.
    pub fn set_scroll_delta(&mut self, delta: Vec2) {
        self.scroll_delta = delta;
    }

    /// Part of the scroll delta already reported to the main side.
    #[must_use]
    pub fn sent_scroll_delta(&self) -> Vec2 {
        self.sent_scroll_delta
    }

    /// Records how much of the scroll delta has been reported.
    pub fn set_sent_scroll_delta(&mut self, delta: Vec2) {
        self.sent_scroll_delta = delta;
    }

    /// Effective scroll offset: committed position plus compositor delta.
    #[must_use]
    pub fn current_scroll_offset(&self) -> Vec2 {
        self.scroll_position + self.scroll_delta
    }

    /// Scrolls by `delta`, clamped to `[0, max_scroll_position]`.
    ///
    /// Returns the part of `delta` that could not be applied.
    pub fn scroll_by(&mut self, delta: Vec2) -> Vec2 {
        let min = -self.scroll_position;
        let max = self.max_scroll_position - self.scroll_position;
        let wanted = self.scroll_delta + delta;
        let clamped = Vec2::new(clamp(wanted.x, min.x, max.x), clamp(wanted.y, min.y, max.y));
        let applied = clamped - self.scroll_delta;
        self.scroll_delta = clamped;
        delta - applied
    }

    /// Clears per-draw change tracking: pending damage and the stacking-order
    /// flag.
    pub fn reset_change_tracking(&mut self) {
        self.update_rect = Rect::ZERO;
        self.stacking_order_changed = false;
    }
}

fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.min(hi).max(lo)
}
