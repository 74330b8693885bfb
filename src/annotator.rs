use eframe::egui;
use log::{info, warn};

use crate::{
    annotation::{self, BoxAnnotation},
    config::Config,
    error::{Error, Result},
    geometry::PixelRect,
    preview::Overlay,
    session::{NavAction, Session},
};

const INSTRUCTIONS: &str = "Instructions:\n\
    1. Select folder with images\n\
    2. Type the label\n\
    3. Click and drag around the object\n\
    4. Release to save the box\n\n\
    Keyboard Shortcuts:\n\
    X - Delete image\n\
    C - Previous image\n\
    V - Next image\n\
    N - Next unannotated image\n\
    Del - Clear annotation";

const BOX_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 60, 60);

// ── Actions ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Nav(NavAction),
    NextUnannotated,
    Clear,
}

// ── App ─────────────────────────────────────────────────────────────────────

pub struct AnnotateApp {
    session: Session,
    label: String,
    advance: bool,
    /// Sidecar of the image on screen.
    annotation: Option<BoxAnnotation>,
}

impl AnnotateApp {
    pub fn new(config: &Config) -> Self {
        let mut app = Self {
            session: Session::new(config),
            label: config.default_label.clone(),
            advance: config.advance_after_annotate,
            annotation: None,
        };
        if let Some(dir) = config.image_dir.clone() {
            app.session.try_or_report(|s| s.open_folder(dir));
            app.refresh_annotation();
        }
        app
    }

    fn refresh_annotation(&mut self) {
        self.annotation = None;
        let Some(path) = self.session.current() else {
            return;
        };
        match annotation::load(path) {
            Ok(a) => self.annotation = a,
            Err(e) => self.session.report(e),
        }
    }

    pub(crate) fn annotate(&mut self, rect: PixelRect) -> Result<()> {
        let path = self
            .session
            .current()
            .ok_or(Error::NoImage)?
            .to_path_buf();
        let size = self.session.preview.image_size().ok_or(Error::NoImage)?;
        let ann = BoxAnnotation::new(&path, size, self.label.trim(), rect);
        annotation::save(&path, &ann)?;
        self.annotation = Some(ann);
        if self.advance {
            self.session.next()?;
        }
        Ok(())
    }

    pub(crate) fn apply(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Nav(NavAction::Delete) => {
                let Some(path) = self.session.current().map(|p| p.to_path_buf()) else {
                    return Ok(());
                };
                let deleted = self.session.delete_current();
                // no orphaned boxes once the image is gone
                if !path.exists() {
                    if let Err(e) = annotation::remove(&path) {
                        warn!("Could not remove annotation of {}: {e}", path.display());
                    }
                }
                deleted?;
            }
            Action::Nav(nav) => self.session.apply(nav)?,
            Action::NextUnannotated => {
                let moved = self
                    .session
                    .folder_mut()
                    .is_some_and(|f| f.next_where(|p| !annotation::exists(p)));
                if moved {
                    self.session.reload_current()?;
                } else {
                    info!("No unannotated image after the current one");
                }
            }
            Action::Clear => {
                if let Some(path) = self.session.current() {
                    annotation::remove(path)?;
                }
            }
        }
        Ok(())
    }

    fn shortcut(&self, ctx: &egui::Context) -> Option<Action> {
        if let Some(nav) = self.session.shortcut(ctx) {
            return Some(Action::Nav(nav));
        }
        if ctx.wants_keyboard_input() || self.session.current().is_none() {
            return None;
        }
        ctx.input(|i| {
            if i.key_pressed(egui::Key::N) {
                Some(Action::NextUnannotated)
            } else if i.key_pressed(egui::Key::Delete) && self.annotation.is_some() {
                Some(Action::Clear)
            } else {
                None
            }
        })
    }

    fn controls_ui(&mut self, ui: &mut egui::Ui) -> Option<Action> {
        let mut action = self.session.nav_ui(ui).map(Action::Nav);
        let has_current = self.session.current().is_some();

        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Label:");
            ui.text_edit_singleline(&mut self.label);
        });
        ui.checkbox(&mut self.advance, "Next image after saving");

        let status = match &self.annotation {
            Some(a) => format!(
                "Annotated: {} at {},{} {}x{}",
                a.label, a.bbox.x, a.bbox.y, a.bbox.width, a.bbox.height
            ),
            None => "Not annotated".to_string(),
        };
        ui.label(status);

        if ui
            .add_enabled(
                self.annotation.is_some(),
                egui::Button::new("Clear Annotation (Del)"),
            )
            .clicked()
        {
            action = Some(Action::Clear);
        }
        if ui
            .add_enabled(has_current, egui::Button::new("Next Unannotated (N)"))
            .clicked()
        {
            action = Some(Action::NextUnannotated);
        }

        ui.separator();
        ui.label(INSTRUCTIONS);
        action
    }
}

// ── eframe App impl ─────────────────────────────────────────────────────────

impl eframe::App for AnnotateApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut action = self.shortcut(ctx);

        egui::SidePanel::left("controls")
            .resizable(false)
            .default_width(260.0)
            .show(ctx, |ui| {
                if let Some(a) = self.controls_ui(ui) {
                    action = Some(a);
                }
            });

        let overlay = self.annotation.as_ref().map(|a| Overlay {
            rect: a.bbox,
            color: BOX_COLOR,
            caption: (!a.label.is_empty()).then(|| a.label.clone()),
        });
        let selection = egui::CentralPanel::default()
            .show(ctx, |ui| self.session.preview.show(ui, overlay.as_ref()))
            .inner;

        let mut changed = false;
        if let Some(action) = action {
            info!("{action:?}");
            if let Err(e) = self.apply(action) {
                self.session.report(e);
            }
            changed = true;
        }
        if let Some(rect) = selection {
            if let Err(e) = self.annotate(rect) {
                self.session.report(e);
            }
            changed = true;
        }
        if changed {
            self.refresh_annotation();
        }

        self.session.show_error(ctx);
    }
}

// ── Entry Point ─────────────────────────────────────────────────────────────

pub fn run_native(config: Config) -> eframe::Result {
    info!("Run with config: {config:?}");
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.viewport)
            .with_title("Bounding Box Annotator"),
        ..Default::default()
    };

    eframe::run_native(
        "Bounding Box Annotator",
        options,
        Box::new(move |_cc| Ok(Box::new(AnnotateApp::new(&config)))),
    )
}
