/// Interactive scatter canvas
///
/// Owns the idle/panning pointer state machine and turns gestures into
/// viewport messages. Every message carries the live canvas size so the
/// application can keep its viewport dimensions in sync without a separate
/// resize listener. Drawing is a straight pass over the projected points,
/// cached until the application invalidates it.
use iced::keyboard;
use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Frame, Geometry, Path, Program};
use iced::widget::image::FilterMethod;
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};

use crate::app::{LoadedPreview, Message};
use crate::plot::projection::{self, DisplayPoint};
use crate::plot::transform;
use crate::state::dataset::FeatureTable;
use crate::state::viewport::ViewportState;

/// Browser-like pixels per scroll line
const WHEEL_LINE_STEP: f32 = 60.0;

/// Minimum hover pick radius in pixels, for small zoom levels
const MIN_PICK_RADIUS: f32 = 4.0;

/// Longest edge of the hover preview in pixels
const PREVIEW_MAX_EDGE: f32 = 140.0;

/// Gap between the cursor and the hover preview
const PREVIEW_OFFSET: f32 = 14.0;

/// Canvas interactions, reported together with the live canvas size
#[derive(Debug, Clone)]
pub enum PlotEvent {
    /// Pan delta in normalized data space
    Panned { dx: f32, dy: f32 },
    /// Wheel delta in browser-like pixels
    Wheeled { delta: f32 },
    /// Hover target changed or moved; `row` indexes the feature table
    Hovered { row: Option<usize>, cursor: Point },
    /// The canvas was measured at a new size
    Resized,
}

/// Pan gesture state: idle until a press lands on the canvas, then panning
/// with the anchor carried in normalized data space. The delta accumulates
/// incrementally from the previous position, not the original press, so
/// fast moves cannot drift.
#[derive(Debug, Clone, Default)]
pub struct DragState {
    panning: bool,
    anchor: Option<(f32, f32)>,
    modifiers: keyboard::Modifiers,
}

pub struct ScatterPlot<'a> {
    pub table: Option<&'a FeatureTable>,
    pub selected_x: Option<&'a str>,
    pub selected_y: Option<&'a str>,
    pub viewport: &'a ViewportState,
    pub hovered_row: Option<usize>,
    pub preview: Option<(&'a LoadedPreview, Point)>,
    pub cache: &'a canvas::Cache,
}

impl<'a> ScatterPlot<'a> {
    /// Project with the live canvas size, which may be fresher than the
    /// application's stored viewport dimensions
    fn points_for(&self, size: Size) -> Vec<DisplayPoint> {
        let Some(table) = self.table else {
            return Vec::new();
        };
        let viewport = self.viewport.with_canvas_size(size.width, size.height);
        projection::project(table, self.selected_x, self.selected_y, &viewport)
    }

    fn size_changed(&self, size: Size) -> bool {
        size.width != self.viewport.canvas_width || size.height != self.viewport.canvas_height
    }
}

/// Convert an iced scroll delta to browser-like wheel pixels
fn wheel_delta(delta: mouse::ScrollDelta) -> f32 {
    match delta {
        mouse::ScrollDelta::Lines { y, .. } => y * WHEEL_LINE_STEP,
        mouse::ScrollDelta::Pixels { y, .. } => y,
    }
}

/// Place the preview next to the cursor, flipped inward near the edges
fn preview_rect(width: u32, height: u32, cursor: Point, canvas: Size) -> Rectangle {
    let long_edge = width.max(height).max(1) as f32;
    let scale = PREVIEW_MAX_EDGE / long_edge;
    let w = (width as f32 * scale).max(1.0);
    let h = (height as f32 * scale).max(1.0);

    let mut x = cursor.x + PREVIEW_OFFSET;
    let mut y = cursor.y + PREVIEW_OFFSET;
    if x + w > canvas.width {
        x = (cursor.x - PREVIEW_OFFSET - w).max(0.0);
    }
    if y + h > canvas.height {
        y = (cursor.y - PREVIEW_OFFSET - h).max(0.0);
    }

    Rectangle {
        x,
        y,
        width: w,
        height: h,
    }
}

impl<'a> Program<Message> for ScatterPlot<'a> {
    type State = DragState;

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let size = bounds.size();
        let viewport = self.viewport.with_canvas_size(size.width, size.height);

        match event {
            canvas::Event::Keyboard(keyboard::Event::ModifiersChanged(modifiers)) => {
                // cosmetic only: switches the cursor affordance, never the view
                state.modifiers = modifiers;
            }

            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                if cursor.position_in(bounds).is_some() {
                    return (
                        canvas::event::Status::Captured,
                        Some(Message::Plot(
                            size,
                            PlotEvent::Wheeled {
                                delta: wheel_delta(delta),
                            },
                        )),
                    );
                }
            }

            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(position) = cursor.position_in(bounds) {
                    state.panning = true;
                    state.anchor = Some(transform::to_data(position.x, position.y, &viewport));
                    return (canvas::event::Status::Captured, None);
                }
            }

            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                if state.panning {
                    state.panning = false;
                    state.anchor = None;
                    return (canvas::event::Status::Captured, None);
                }
            }

            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if state.panning {
                    if let (Some(position), Some((anchor_x, anchor_y))) =
                        (cursor.position_in(bounds), state.anchor)
                    {
                        let (x, y) = transform::to_data(position.x, position.y, &viewport);
                        state.anchor = Some((x, y));
                        return (
                            canvas::event::Status::Captured,
                            Some(Message::Plot(
                                size,
                                PlotEvent::Panned {
                                    dx: x - anchor_x,
                                    dy: y - anchor_y,
                                },
                            )),
                        );
                    }
                } else if let Some(position) = cursor.position_in(bounds) {
                    let radius = (viewport.point_size() / 2.0).max(MIN_PICK_RADIUS);
                    let points = self.points_for(size);
                    let hit =
                        projection::hit_test(&points, position.x, position.y, radius)
                            .map(|p| p.row);

                    // report on change, and keep reporting while over a point
                    // so the preview follows the cursor
                    if hit != self.hovered_row || hit.is_some() {
                        return (
                            canvas::event::Status::Captured,
                            Some(Message::Plot(
                                size,
                                PlotEvent::Hovered {
                                    row: hit,
                                    cursor: position,
                                },
                            )),
                        );
                    }

                    if self.size_changed(size) {
                        return (
                            canvas::event::Status::Ignored,
                            Some(Message::Plot(size, PlotEvent::Resized)),
                        );
                    }
                } else if self.hovered_row.is_some() {
                    // cursor left the canvas entirely
                    return (
                        canvas::event::Status::Ignored,
                        Some(Message::Plot(
                            size,
                            PlotEvent::Hovered {
                                row: None,
                                cursor: Point::ORIGIN,
                            },
                        )),
                    );
                }
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<Geometry> {
        let size = bounds.size();

        let points_layer = self.cache.draw(renderer, size, |frame| {
            let palette = theme.extended_palette();
            let viewport = self.viewport.with_canvas_size(size.width, size.height);
            let radius = (viewport.point_size() / 2.0).max(1.0);

            for point in &self.points_for(size) {
                let color = if self.hovered_row == Some(point.row) {
                    palette.primary.strong.color
                } else {
                    palette.primary.base.color
                };
                frame.fill(
                    &Path::circle(Point::new(point.screen_x, point.screen_y), radius),
                    color,
                );
            }
        });

        let mut layers = vec![points_layer];

        // the preview follows the cursor, so it stays out of the cache
        if let Some((preview, cursor_position)) = self.preview {
            let mut overlay = Frame::new(renderer, size);
            let rect = preview_rect(preview.width, preview.height, cursor_position, size);

            overlay.fill_rectangle(
                Point::new(rect.x - 2.0, rect.y - 2.0),
                Size::new(rect.width + 4.0, rect.height + 4.0),
                Color::from_rgba(0.0, 0.0, 0.0, 0.8),
            );
            overlay.draw_image(
                rect,
                canvas::Image::new(preview.handle.clone()).filter_method(FilterMethod::Linear),
            );
            layers.push(overlay.into_geometry());
        }

        layers
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if cursor.position_in(bounds).is_none() {
            return mouse::Interaction::default();
        }
        if state.panning {
            mouse::Interaction::Grabbing
        } else if state.modifiers.command() || state.modifiers.control() {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::Grab
        }
    }
}
