use std::path::{Path, PathBuf};

use eframe::egui;
use log::{error, info};

use crate::{
    config::Config,
    error::{Error, Result},
    folder::ImageFolder,
    preview::Preview,
};

// ── Actions ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavAction {
    SelectFolder,
    Previous,
    Next,
    Delete,
}

// ── Session ─────────────────────────────────────────────────────────────────

/// Folder browsing shared by both tools: the image list, the preview of the
/// current image and the last error to show.
pub struct Session {
    folder: Option<ImageFolder>,
    pub preview: Preview,
    extensions: Vec<String>,
    error: Option<String>,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self {
            folder: None,
            preview: Preview::new(config.min_drag_distance),
            extensions: config.extensions.clone(),
            error: None,
        }
    }

    pub fn folder(&self) -> Option<&ImageFolder> {
        self.folder.as_ref()
    }

    pub fn folder_mut(&mut self) -> Option<&mut ImageFolder> {
        self.folder.as_mut()
    }

    pub fn current(&self) -> Option<&Path> {
        self.folder.as_ref()?.current()
    }

    pub fn open_folder(&mut self, root: impl Into<PathBuf>) -> Result<()> {
        self.folder = Some(ImageFolder::open(root, &self.extensions)?);
        self.reload_current()
    }

    /// Decodes the current image into the preview.
    pub fn reload_current(&mut self) -> Result<()> {
        let Some(path) = self.current().map(Path::to_path_buf) else {
            self.preview.clear();
            return Ok(());
        };
        match image::open(&path) {
            Ok(img) => {
                info!("Showing {} ({}x{})", path.display(), img.width(), img.height());
                self.preview.set_image(img);
                Ok(())
            }
            Err(e) => {
                self.preview.clear();
                Err(Error::image(&path)(e))
            }
        }
    }

    pub fn previous(&mut self) -> Result<()> {
        if self.folder.as_mut().is_some_and(ImageFolder::previous) {
            self.reload_current()?;
        }
        Ok(())
    }

    pub fn next(&mut self) -> Result<()> {
        if self.folder.as_mut().is_some_and(ImageFolder::next) {
            self.reload_current()?;
        }
        Ok(())
    }

    /// Deletes the current image from disk and shows the one that replaces it.
    pub fn delete_current(&mut self) -> Result<PathBuf> {
        let deleted = self.folder.as_mut().ok_or(Error::NoImage)?.delete_current()?;
        self.reload_current()?;
        Ok(deleted)
    }

    pub fn apply(&mut self, action: NavAction) -> Result<()> {
        match action {
            NavAction::SelectFolder => {
                if let Some(dir) = rfd::FileDialog::new()
                    .set_title("Select Folder")
                    .pick_folder()
                {
                    self.open_folder(dir)?;
                }
                Ok(())
            }
            NavAction::Previous => self.previous(),
            NavAction::Next => self.next(),
            NavAction::Delete => self.delete_current().map(|_| ()),
        }
    }

    pub fn report(&mut self, e: Error) {
        error!("{e}");
        self.error = Some(e.to_string());
    }

    /// Runs `f` and shows its error, if any.
    pub fn try_or_report<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Option<T> {
        match f(self) {
            Ok(v) => Some(v),
            Err(e) => {
                self.report(e);
                None
            }
        }
    }
}

// ── Widgets ─────────────────────────────────────────────────────────────────

impl Session {
    /// Single-key navigation; ignored while typing into a text field.
    pub fn shortcut(&self, ctx: &egui::Context) -> Option<NavAction> {
        if ctx.wants_keyboard_input() {
            return None;
        }
        let folder = self.folder.as_ref()?;
        ctx.input(|i| {
            if i.key_pressed(egui::Key::X) && folder.current().is_some() {
                Some(NavAction::Delete)
            } else if i.key_pressed(egui::Key::C) && folder.has_previous() {
                Some(NavAction::Previous)
            } else if i.key_pressed(egui::Key::V) && folder.has_next() {
                Some(NavAction::Next)
            } else {
                None
            }
        })
    }

    pub fn nav_ui(&self, ui: &mut egui::Ui) -> Option<NavAction> {
        let mut action = None;
        let folder = self.folder.as_ref();

        if ui.button("Select Folder").clicked() {
            action = Some(NavAction::SelectFolder);
        }
        let folder_text = folder.map_or_else(
            || "No folder selected".to_string(),
            |f| f.root().display().to_string(),
        );
        ui.add(egui::Label::new(folder_text).wrap());

        ui.horizontal(|ui| {
            let can_prev = folder.is_some_and(ImageFolder::has_previous);
            let can_next = folder.is_some_and(ImageFolder::has_next);
            if ui
                .add_enabled(can_prev, egui::Button::new("Previous (C)"))
                .clicked()
            {
                action = Some(NavAction::Previous);
            }
            if ui
                .add_enabled(can_next, egui::Button::new("Next (V)"))
                .clicked()
            {
                action = Some(NavAction::Next);
            }
        });

        let has_current = folder.is_some_and(|f| f.current().is_some());
        if ui
            .add_enabled(has_current, egui::Button::new("Delete Image (X)"))
            .clicked()
        {
            action = Some(NavAction::Delete);
        }

        ui.label(folder.map_or_else(|| "Image: 0/0".to_string(), ImageFolder::counter_label));
        if let Some(name) = self.current().and_then(Path::file_name) {
            ui.monospace(name.to_string_lossy().into_owned());
        }
        action
    }

    pub fn show_error(&mut self, ctx: &egui::Context) {
        let Some(message) = self.error.clone() else {
            return;
        };
        let mut open = true;
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(&message);
                if ui.button("OK").clicked() {
                    self.error = None;
                }
            });
        if !open {
            self.error = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn session_in(dir: &Path, names: &[&str]) -> Session {
        for name in names {
            RgbImage::new(6, 4).save(dir.join(name)).unwrap();
        }
        let mut session = Session::new(&Config::default());
        session.open_folder(dir).unwrap();
        session
    }

    #[test]
    fn opening_shows_first_image() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_in(dir.path(), &["b.png", "a.png"]);
        assert_eq!(session.current(), Some(dir.path().join("a.png").as_path()));
        assert_eq!(session.preview.image_size(), Some([6, 4]));
    }

    #[test]
    fn deleting_last_image_empties_preview() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path(), &["a.png"]);
        session.apply(NavAction::Delete).unwrap();
        assert!(session.current().is_none());
        assert!(!session.preview.has_image());
        assert!(!dir.path().join("a.png").exists());
    }

    #[test]
    fn undecodable_image_is_reported_and_skippable() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path(), &["b.png"]);
        std::fs::write(dir.path().join("a.png"), b"garbage").unwrap();

        assert!(matches!(session.open_folder(dir.path()), Err(Error::Image { .. })));
        assert!(!session.preview.has_image());

        session.apply(NavAction::Next).unwrap();
        assert!(session.preview.has_image());
    }
}
