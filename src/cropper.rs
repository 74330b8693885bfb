use eframe::egui;
use log::info;

use crate::{
    config::Config,
    crop,
    error::{Error, Result},
    geometry::PixelRect,
    session::Session,
};

const INSTRUCTIONS: &str = "Instructions:\n\
    1. Select folder with images\n\
    2. Click and drag to crop\n\
    3. Release to save cropped area\n\n\
    Keyboard Shortcuts:\n\
    X - Delete image\n\
    C - Previous image\n\
    V - Next image";

// ── App ─────────────────────────────────────────────────────────────────────

pub struct CropApp {
    session: Session,
    crop_prefix: String,
    status: Option<String>,
}

impl CropApp {
    pub fn new(config: &Config) -> Self {
        let mut app = Self {
            session: Session::new(config),
            crop_prefix: config.crop_prefix.clone(),
            status: None,
        };
        if let Some(dir) = config.image_dir.clone() {
            app.session.try_or_report(|s| s.open_folder(dir));
        }
        app
    }

    /// Saves the selection as a new file, then deletes the original. The
    /// original stays if the crop could not be written.
    pub(crate) fn crop_and_advance(&mut self, rect: PixelRect) -> Result<()> {
        let path = self
            .session
            .current()
            .ok_or(Error::NoImage)?
            .to_path_buf();
        let out = crop::crop_to_sibling(&path, rect, &self.crop_prefix)?;
        self.status = Some(format!(
            "Saved {}",
            out.file_name().unwrap_or_default().to_string_lossy()
        ));
        self.session.delete_current()?;
        Ok(())
    }
}

// ── eframe App impl ─────────────────────────────────────────────────────────

impl eframe::App for CropApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut action = self.session.shortcut(ctx);

        egui::SidePanel::left("controls")
            .resizable(false)
            .default_width(240.0)
            .show(ctx, |ui| {
                if let Some(a) = self.session.nav_ui(ui) {
                    action = Some(a);
                }
                ui.separator();
                ui.label(INSTRUCTIONS);
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.label(status);
                }
            });

        let selection = egui::CentralPanel::default()
            .show(ctx, |ui| self.session.preview.show(ui, None))
            .inner;

        if let Some(action) = action {
            info!("{action:?}");
            self.session.try_or_report(|s| s.apply(action));
        }
        if let Some(rect) = selection {
            if let Err(e) = self.crop_and_advance(rect) {
                self.session.report(e);
            }
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
            .with_title("Image Cropping Tool"),
        ..Default::default()
    };

    eframe::run_native(
        "Image Cropping Tool",
        options,
        Box::new(move |_cc| Ok(Box::new(CropApp::new(&config)))),
    )
}
