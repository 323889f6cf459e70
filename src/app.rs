/// Application shell
///
/// Elm-style: one state bag, one message enum, `update` mutates,
/// `view` is pure. The viewport is the single source of truth for the
/// transform; every change flows event -> new state -> re-derived points
/// -> render, with no mutation chained through callbacks.
use std::path::PathBuf;

use iced::widget::image::Handle;
use iced::widget::{button, canvas, column, container, pick_list, row, text};
use iced::{event, window, Alignment, Element, Event, Length, Point, Size, Subscription, Task, Theme};
use rfd::FileDialog;

use crate::config::Config;
use crate::plot::canvas::{PlotEvent, ScatterPlot};
use crate::resolver;
use crate::state::dataset::{CellValue, Dataset};
use crate::state::viewport::ViewportState;
use crate::upload::{self, UploadError};

/// A decoded image ready to draw next to the cursor
///
/// Exactly one of these is alive per viewer; replacing the hover state
/// drops the previous handle and releases its pixels.
#[derive(Debug, Clone)]
pub struct LoadedPreview {
    pub handle: Handle,
    pub width: u32,
    pub height: u32,
}

/// The point currently under the cursor
struct HoverState {
    row: usize,
    cursor: Point,
    preview: Option<LoadedPreview>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked the "Open Folder" button
    OpenFolder,
    /// Something was dropped onto the window
    FolderDropped(PathBuf),
    /// Background dataset load finished
    UploadFinished {
        generation: u64,
        result: Result<Dataset, UploadError>,
    },
    FeatureXSelected(String),
    FeatureYSelected(String),
    /// Canvas interaction, with the live canvas size
    Plot(Size, PlotEvent),
    /// Hover preview bytes were read and decoded
    PreviewLoaded {
        row: usize,
        result: Result<LoadedPreview, String>,
    },
}

/// Main application state
pub struct FeatureScope {
    dataset: Option<Dataset>,
    selected_x: Option<String>,
    selected_y: Option<String>,
    viewport: ViewportState,
    hovered: Option<HoverState>,
    /// Status message to display to the user
    status: String,
    /// Monotonic upload counter; results from older generations are stale
    upload_generation: u64,
    /// Abort handle for the in-flight load, superseded uploads cancel it
    inflight_upload: Option<iced::task::Handle>,
    plot_cache: canvas::Cache,
    config: Config,
}

impl FeatureScope {
    /// Create a new instance of the application
    pub fn new() -> (Self, Task<Message>) {
        let config = Config::load();

        let status = match &config.last_folder {
            Some(folder) => format!(
                "Last session: {}. Open or drop a folder to plot.",
                folder.display()
            ),
            None => "Open or drop a folder with images and a features CSV.".to_string(),
        };

        (
            FeatureScope {
                dataset: None,
                selected_x: None,
                selected_y: None,
                viewport: ViewportState::default(),
                hovered: None,
                status,
                upload_generation: 0,
                inflight_upload: None,
                plot_cache: canvas::Cache::new(),
                config,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenFolder => {
                // Show the native folder picker dialog
                let folder = FileDialog::new()
                    .set_title("Select a folder with images and a features CSV")
                    .pick_folder();

                match folder {
                    Some(path) => self.begin_upload(path),
                    None => Task::none(),
                }
            }

            Message::FolderDropped(path) => {
                if path.is_dir() {
                    self.begin_upload(path)
                } else {
                    self.status = "Drop a folder, not a single file.".to_string();
                    Task::none()
                }
            }

            Message::UploadFinished { generation, result } => {
                if generation != self.upload_generation {
                    // a newer upload superseded this one while it ran
                    log::info!("discarding stale upload result (generation {})", generation);
                    return Task::none();
                }
                self.inflight_upload = None;

                match result {
                    Ok(dataset) => self.finish_upload(dataset),
                    Err(error) => {
                        // prior dataset stays on screen
                        log::warn!("upload failed: {}", error);
                        self.status = format!("Upload failed: {}", error);
                    }
                }
                Task::none()
            }

            Message::FeatureXSelected(name) => {
                self.selected_x = Some(name.clone());
                self.config.last_x = Some(name);
                self.config.save();
                self.plot_cache.clear();
                self.hovered = None;
                Task::none()
            }

            Message::FeatureYSelected(name) => {
                self.selected_y = Some(name.clone());
                self.config.last_y = Some(name);
                self.config.save();
                self.plot_cache.clear();
                self.hovered = None;
                Task::none()
            }

            Message::Plot(size, plot_event) => self.on_plot_event(size, plot_event),

            Message::PreviewLoaded { row, result } => {
                let Some(hover) = &mut self.hovered else {
                    return Task::none();
                };
                if hover.row != row {
                    // hover moved on; dropping the result releases the handle
                    return Task::none();
                }

                match result {
                    Ok(preview) => hover.preview = Some(preview),
                    Err(message) => {
                        log::warn!("hover preview failed: {}", message);
                        hover.preview = self
                            .dataset
                            .as_ref()
                            .and_then(|d| d.table.cell("thumbnail", row))
                            .and_then(|cell| cell.as_text())
                            .and_then(decode_thumbnail);
                    }
                }
                Task::none()
            }
        }
    }

    /// Build the user interface
    pub fn view(&self) -> Element<Message> {
        let features = self
            .dataset
            .as_ref()
            .map(|d| d.table.feature_names())
            .unwrap_or_default();

        let toolbar = row![
            button("Open Folder").on_press(Message::OpenFolder).padding(8),
            pick_list(
                features.clone(),
                self.selected_x.clone(),
                Message::FeatureXSelected,
            )
            .placeholder("X feature"),
            pick_list(features, self.selected_y.clone(), Message::FeatureYSelected)
                .placeholder("Y feature"),
            text(&self.status).size(14),
        ]
        .spacing(12)
        .align_y(Alignment::Center);

        let plot = canvas(ScatterPlot {
            table: self.dataset.as_ref().map(|d| &d.table),
            selected_x: self.selected_x.as_deref(),
            selected_y: self.selected_y.as_deref(),
            viewport: &self.viewport,
            hovered_row: self.hovered.as_ref().map(|h| h.row),
            preview: self
                .hovered
                .as_ref()
                .and_then(|h| h.preview.as_ref().map(|p| (p, h.cursor))),
            cache: &self.plot_cache,
        })
        .width(Length::Fill)
        .height(Length::Fill);

        container(column![toolbar, plot].spacing(12).padding(12))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        event::listen_with(handle_window_event)
    }

    /// Set the application theme
    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    /// Start loading a folder, superseding any load still in flight
    fn begin_upload(&mut self, folder: PathBuf) -> Task<Message> {
        if let Some(handle) = self.inflight_upload.take() {
            // explicit cancellation, not a last-write-wins race
            handle.abort();
        }
        self.upload_generation += 1;
        let generation = self.upload_generation;

        self.status = format!("Loading {}…", folder.display());

        let (task, handle) = Task::perform(upload::load_dataset(folder), move |result| {
            Message::UploadFinished { generation, result }
        })
        .abortable();

        self.inflight_upload = Some(handle);
        task
    }

    /// Install a freshly loaded dataset and restore feature selections
    fn finish_upload(&mut self, dataset: Dataset) {
        let features = dataset.table.feature_names();
        self.selected_x = pick_feature(&features, self.config.last_x.as_deref(), 0);
        self.selected_y = pick_feature(&features, self.config.last_y.as_deref(), 1);

        self.status = format!(
            "Loaded {}: {} rows, {} feature columns.",
            dataset.name(),
            dataset.table.row_count(),
            features.len()
        );

        self.config.last_folder = Some(dataset.root.clone());
        self.config.last_x = self.selected_x.clone();
        self.config.last_y = self.selected_y.clone();
        self.config.save();

        self.dataset = Some(dataset);
        self.hovered = None;
        self.viewport.reset_view();
        self.plot_cache.clear();
    }

    /// Apply a canvas interaction
    ///
    /// The carried size is applied first, so a resize can never leave the
    /// stored viewport out of sync with what the canvas actually measured.
    fn on_plot_event(&mut self, size: Size, plot_event: PlotEvent) -> Task<Message> {
        if size.width != self.viewport.canvas_width || size.height != self.viewport.canvas_height
        {
            self.viewport.set_canvas_size(size.width, size.height);
            self.plot_cache.clear();
        }

        match plot_event {
            PlotEvent::Resized => Task::none(),

            PlotEvent::Wheeled { delta } => {
                self.viewport.apply_wheel(delta);
                self.plot_cache.clear();
                Task::none()
            }

            PlotEvent::Panned { dx, dy } => {
                self.viewport.pan_by(dx, dy);
                self.plot_cache.clear();
                Task::none()
            }

            PlotEvent::Hovered { row: None, .. } => {
                if self.hovered.is_some() {
                    self.hovered = None;
                    self.plot_cache.clear();
                }
                Task::none()
            }

            PlotEvent::Hovered {
                row: Some(row),
                cursor,
            } => {
                if let Some(hover) = &mut self.hovered {
                    if hover.row == row {
                        // same point, the preview just follows the cursor
                        hover.cursor = cursor;
                        return Task::none();
                    }
                }
                self.plot_cache.clear();

                let Some(dataset) = &self.dataset else {
                    self.hovered = None;
                    return Task::none();
                };

                let id = dataset
                    .table
                    .cell("id", row)
                    .cloned()
                    .unwrap_or(CellValue::Null);

                match resolver::resolve_image(dataset, &id) {
                    Some(path) => {
                        self.hovered = Some(HoverState {
                            row,
                            cursor,
                            preview: None,
                        });
                        Task::perform(load_preview(path), move |result| {
                            Message::PreviewLoaded { row, result }
                        })
                    }
                    None => {
                        // no file on disk; fall back to the CSV thumbnail
                        let preview = dataset
                            .table
                            .cell("thumbnail", row)
                            .and_then(|cell| cell.as_text())
                            .and_then(decode_thumbnail);
                        self.hovered = Some(HoverState {
                            row,
                            cursor,
                            preview,
                        });
                        Task::none()
                    }
                }
            }
        }
    }
}

fn handle_window_event(
    event: Event,
    _status: event::Status,
    _window: window::Id,
) -> Option<Message> {
    match event {
        Event::Window(window::Event::FileDropped(path)) => Some(Message::FolderDropped(path)),
        _ => None,
    }
}

/// Restore a saved feature selection when it still exists, otherwise fall
/// back to the nth feature column
fn pick_feature(features: &[String], saved: Option<&str>, index: usize) -> Option<String> {
    saved
        .filter(|name| features.iter().any(|f| f == name))
        .map(str::to_string)
        .or_else(|| features.get(index).cloned())
}

/// Read and decode an image file for the hover preview
async fn load_preview(path: PathBuf) -> Result<LoadedPreview, String> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| format!("read {}: {}", path.display(), e))?;

    // decode once to validate the bytes and learn the dimensions
    tokio::task::spawn_blocking(move || {
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| format!("decode {}: {}", path.display(), e))?;
        Ok(LoadedPreview {
            width: decoded.width(),
            height: decoded.height(),
            handle: Handle::from_bytes(bytes),
        })
    })
    .await
    .map_err(|e| format!("task join error: {}", e))?
}

/// Decode a base64 PNG thumbnail carried inside the CSV
fn decode_thumbnail(encoded: &str) -> Option<LoadedPreview> {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;

    let bytes = match BASE64.decode(encoded.trim().as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("thumbnail cell is not valid base64: {}", e);
            return None;
        }
    };
    let decoded = match image::load_from_memory(&bytes) {
        Ok(decoded) => decoded,
        Err(e) => {
            log::warn!("thumbnail did not decode: {}", e);
            return None;
        }
    };

    Some(LoadedPreview {
        width: decoded.width(),
        height: decoded.height(),
        handle: Handle::from_bytes(bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_feature_prefers_saved_selection() {
        let features = vec!["area".to_string(), "solidity".to_string()];

        assert_eq!(
            pick_feature(&features, Some("solidity"), 0),
            Some("solidity".to_string())
        );
        // saved column no longer exists: fall back by position
        assert_eq!(
            pick_feature(&features, Some("gone"), 1),
            Some("solidity".to_string())
        );
        assert_eq!(pick_feature(&features, None, 0), Some("area".to_string()));
        assert_eq!(pick_feature(&[], None, 0), None);
    }

    #[test]
    fn test_decode_thumbnail_rejects_garbage() {
        assert!(decode_thumbnail("not base64!!!").is_none());
        // valid base64, not an image
        assert!(decode_thumbnail("aGVsbG8=").is_none());
    }
}
