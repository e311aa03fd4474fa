// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-layer properties and their setters.
//!
//! Every setter compares first and does nothing when the value is unchanged.
//! A real change marks the layer's `PROPERTIES` channel and requests a commit
//! from the host, except where noted: [`set_bounds`](LayerStore::set_bounds)
//! and [`set_contents_opaque`](LayerStore::set_contents_opaque) request a
//! repaint instead, and [`set_use_lcd_text`](LayerStore::set_use_lcd_text)
//! requests nothing.

use alloc::string::String;

use kurbo::{Point, Rect, Size, Vec2};

use crate::color::Color;
use crate::filter::FilterOperations;
use crate::region::Region;
use crate::transform::Transform3d;

use super::id::LayerId;
use super::kind::LayerKind;
use super::store::LayerStore;

/// Main-side state of one layer.
#[derive(Clone, Debug)]
pub(crate) struct LayerProperties {
    // -- Geometry --
    pub(crate) bounds: Size,
    pub(crate) position: Point,
    pub(crate) anchor_point: Point,
    pub(crate) anchor_point_z: f64,
    pub(crate) transform: Transform3d,
    pub(crate) sublayer_transform: Transform3d,

    // -- Visual --
    pub(crate) opacity: f32,
    pub(crate) background_color: Color,
    pub(crate) contents_opaque: bool,
    pub(crate) double_sided: bool,
    pub(crate) masks_to_bounds: bool,
    pub(crate) force_render_surface: bool,
    pub(crate) is_drawable: bool,
    pub(crate) preserves_3d: bool,
    pub(crate) use_parent_backface_visibility: bool,
    pub(crate) use_lcd_text: bool,
    pub(crate) draw_checkerboard_for_missing_tiles: bool,
    pub(crate) filters: FilterOperations,
    pub(crate) background_filters: FilterOperations,

    // -- Debug --
    pub(crate) debug_name: String,
    pub(crate) debug_border_color: Color,
    pub(crate) debug_border_width: f64,

    // -- Scroll --
    pub(crate) scroll_position: Vec2,
    pub(crate) max_scroll_position: Vec2,
    pub(crate) scrollable: bool,
    pub(crate) should_scroll_on_main_thread: bool,
    pub(crate) have_wheel_event_handlers: bool,
    pub(crate) non_fast_scrollable_region: Region,
    pub(crate) non_fast_scrollable_region_changed: bool,

    // -- Fixed position --
    pub(crate) is_container_for_fixed_position_layers: bool,
    pub(crate) fixed_to_container_layer: bool,

    // -- Pending change state --
    pub(crate) needs_display: bool,
    pub(crate) update_rect: Rect,
    pub(crate) stacking_order_changed: bool,
    pub(crate) is_mask: bool,
}

impl Default for LayerProperties {
    fn default() -> Self {
        Self {
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
            is_drawable: false,
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
            non_fast_scrollable_region_changed: false,
            is_container_for_fixed_position_layers: false,
            fixed_to_container_layer: false,
            needs_display: false,
            update_rect: Rect::ZERO,
            stacking_order_changed: false,
            is_mask: false,
        }
    }
}

/// Generates a getter and a commit-requesting setter for a `Copy` field.
macro_rules! commit_property {
    ($(#[$doc:meta])* $field:ident, $setter:ident: $ty:ty) => {
        $(#[$doc])*
        #[must_use]
        pub fn $field(&self, id: LayerId) -> $ty {
            self.validate(id);
            self.props[id.idx as usize].$field
        }

        $(#[$doc])*
        ///
        /// Requests a commit when the value changes.
        pub fn $setter(&mut self, id: LayerId, value: $ty) {
            if self.update(id, |p| &mut p.$field, value) {
                self.request_commit(id.idx);
            }
        }
    };
}

impl LayerStore {
    commit_property!(
        /// Position of the anchor point in the parent's space.
        position, set_position: Point
    );
    commit_property!(
        /// Anchor point as a fraction of bounds; transforms pivot around it.
        anchor_point, set_anchor_point: Point
    );
    commit_property!(
        /// Depth component of the anchor point.
        anchor_point_z, set_anchor_point_z: f64
    );
    commit_property!(
        /// Transform applied to the layer's own content.
        transform, set_transform: Transform3d
    );
    commit_property!(
        /// Transform applied to the layer's children.
        sublayer_transform, set_sublayer_transform: Transform3d
    );
    commit_property!(
        /// Layer opacity in `[0, 1]`.
        opacity, set_opacity: f32
    );
    commit_property!(
        /// Color drawn behind the content.
        background_color, set_background_color: Color
    );
    commit_property!(
        /// Whether the back face is visible when the layer is flipped.
        double_sided, set_double_sided: bool
    );
    commit_property!(
        /// Whether descendants are clipped to the layer's bounds.
        masks_to_bounds, set_masks_to_bounds: bool
    );
    commit_property!(
        /// Whether the layer always gets its own render surface.
        force_render_surface, set_force_render_surface: bool
    );
    commit_property!(
        /// Whether the layer has content of its own to draw.
        is_drawable, set_is_drawable: bool
    );
    commit_property!(
        /// Whether children share the layer's 3D space.
        preserves_3d, set_preserves_3d: bool
    );
    commit_property!(
        /// Whether backface visibility is taken from the parent.
        use_parent_backface_visibility, set_use_parent_backface_visibility: bool
    );
    commit_property!(
        /// Whether missing tiles draw as a checkerboard.
        draw_checkerboard_for_missing_tiles, set_draw_checkerboard_for_missing_tiles: bool
    );
    commit_property!(
        /// Color of the debug border.
        debug_border_color, set_debug_border_color: Color
    );
    commit_property!(
        /// Width of the debug border.
        debug_border_width, set_debug_border_width: f64
    );
    commit_property!(
        /// Current scroll offset.
        scroll_position, set_scroll_position: Vec2
    );
    commit_property!(
        /// Largest allowed scroll offset.
        max_scroll_position, set_max_scroll_position: Vec2
    );
    commit_property!(
        /// Whether the compositor may scroll the layer.
        scrollable, set_scrollable: bool
    );
    commit_property!(
        /// Whether scrolling must go through the main side.
        should_scroll_on_main_thread, set_should_scroll_on_main_thread: bool
    );
    commit_property!(
        /// Whether wheel handlers are registered on the layer.
        have_wheel_event_handlers, set_have_wheel_event_handlers: bool
    );
    commit_property!(
        /// Whether the layer stays fixed relative to its container.
        fixed_to_container_layer, set_fixed_to_container_layer: bool
    );

    /// Returns the layer's size.
    #[must_use]
    pub fn bounds(&self, id: LayerId) -> Size {
        self.validate(id);
        self.props[id.idx as usize].bounds
    }

    /// Sets the layer's size.
    ///
    /// Growing from an empty size to a non-empty one requests a full repaint;
    /// any other change requests a commit.
    pub fn set_bounds(&mut self, id: LayerId, bounds: Size) {
        self.validate(id);
        let old = self.props[id.idx as usize].bounds;
        if old == bounds {
            return;
        }
        let first_resize = old.is_zero_area() && !bounds.is_zero_area();
        self.props[id.idx as usize].bounds = bounds;
        if first_resize {
            self.set_needs_display(id);
        } else {
            self.request_commit(id.idx);
        }
    }

    /// Whether the content covers its bounds with opaque pixels.
    #[must_use]
    pub fn contents_opaque(&self, id: LayerId) -> bool {
        self.validate(id);
        self.props[id.idx as usize].contents_opaque
    }

    /// Sets whether the content is opaque. A change requests a full repaint.
    pub fn set_contents_opaque(&mut self, id: LayerId, opaque: bool) {
        if self.update(id, |p| &mut p.contents_opaque, opaque) {
            self.set_needs_display(id);
        }
    }

    /// Whether text is rendered with subpixel antialiasing.
    #[must_use]
    pub fn use_lcd_text(&self, id: LayerId) -> bool {
        self.validate(id);
        self.props[id.idx as usize].use_lcd_text
    }

    /// Sets LCD text rendering.
    ///
    /// Takes effect on the next commit requested for another reason; no
    /// commit is requested here.
    pub fn set_use_lcd_text(&mut self, id: LayerId, use_lcd_text: bool) {
        self.validate(id);
        self.props[id.idx as usize].use_lcd_text = use_lcd_text;
    }

    /// Filters applied to the layer's content.
    #[must_use]
    pub fn filters(&self, id: LayerId) -> &FilterOperations {
        self.validate(id);
        &self.props[id.idx as usize].filters
    }

    /// Sets the content filters.
    ///
    /// A non-empty chain also tells the host it needs a filter context.
    pub fn set_filters(&mut self, id: LayerId, filters: FilterOperations) {
        let needs_context = !filters.is_empty();
        if self.update(id, |p| &mut p.filters, filters) {
            self.request_commit(id.idx);
            if needs_context && let Some(host) = self.host_at(id.idx) {
                host.set_needs_filter_context(true);
            }
        }
    }

    /// Filters applied to what is behind the layer.
    #[must_use]
    pub fn background_filters(&self, id: LayerId) -> &FilterOperations {
        self.validate(id);
        &self.props[id.idx as usize].background_filters
    }

    /// Sets the background filters.
    ///
    /// A non-empty chain also tells the host it needs a filter context.
    pub fn set_background_filters(&mut self, id: LayerId, filters: FilterOperations) {
        let needs_context = !filters.is_empty();
        if self.update(id, |p| &mut p.background_filters, filters) {
            self.request_commit(id.idx);
            if needs_context && let Some(host) = self.host_at(id.idx) {
                host.set_needs_filter_context(true);
            }
        }
    }

    /// Name shown in debugging tools.
    #[must_use]
    pub fn debug_name(&self, id: LayerId) -> &str {
        self.validate(id);
        &self.props[id.idx as usize].debug_name
    }

    /// Sets the debugging name.
    pub fn set_debug_name(&mut self, id: LayerId, name: impl Into<String>) {
        if self.update(id, |p| &mut p.debug_name, name.into()) {
            self.request_commit(id.idx);
        }
    }

    /// Area where input must be handled on the main side.
    #[must_use]
    pub fn non_fast_scrollable_region(&self, id: LayerId) -> &Region {
        self.validate(id);
        &self.props[id.idx as usize].non_fast_scrollable_region
    }

    /// Sets the non-fast-scrollable region.
    ///
    /// The region is only copied to the mirror on commits following a change.
    pub fn set_non_fast_scrollable_region(&mut self, id: LayerId, region: Region) {
        if self.update(id, |p| &mut p.non_fast_scrollable_region, region) {
            self.props[id.idx as usize].non_fast_scrollable_region_changed = true;
            self.request_commit(id.idx);
        }
    }

    /// Whether fixed-position descendants are positioned against this layer.
    #[must_use]
    pub fn is_container_for_fixed_position_layers(&self, id: LayerId) -> bool {
        self.validate(id);
        self.props[id.idx as usize].is_container_for_fixed_position_layers
    }

    /// Whether the layer has content to draw.
    ///
    /// Scrollbars always draw; content layers draw when
    /// [drawable](Self::set_is_drawable).
    #[must_use]
    pub fn draws_content(&self, id: LayerId) -> bool {
        self.validate(id);
        self.draws_content_at(id.idx)
    }

    /// Whether the layer was flagged as a mask.
    #[must_use]
    pub fn is_mask(&self, id: LayerId) -> bool {
        self.validate(id);
        self.props[id.idx as usize].is_mask
    }

    /// Whether the layer moved within its parent's children since the last
    /// commit.
    #[must_use]
    pub fn stacking_order_changed(&self, id: LayerId) -> bool {
        self.validate(id);
        self.props[id.idx as usize].stacking_order_changed
    }

    pub(crate) fn draws_content_at(&self, idx: u32) -> bool {
        match self.kind[idx as usize] {
            LayerKind::Scrollbar { .. } => true,
            LayerKind::Content => self.props[idx as usize].is_drawable,
        }
    }

    /// Writes `value` into the field selected by `field`.
    ///
    /// Returns `false` (and writes nothing) when the value is unchanged.
    pub(crate) fn update<T: PartialEq>(
        &mut self,
        id: LayerId,
        field: impl FnOnce(&mut LayerProperties) -> &mut T,
        value: T,
    ) -> bool {
        self.validate(id);
        let slot = field(&mut self.props[id.idx as usize]);
        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }
}
