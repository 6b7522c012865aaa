//! Launcher main loop: browse the library, launch the picked game, repeat.

use std::process::ExitCode;

use anyhow::Context;
use shelf::{ListItem, ListSession, SessionOptions};

use crate::config::ResolvedConfig;
use crate::decode::FileDecoder;
use crate::gpu::GpuTexture;
use crate::launcher::EmulatorLauncher;
use crate::library::{scan_for_roms, MetadataStore};
use crate::open::SystemOpener;
use crate::shell::{ShellOptions, WindowShell};
use crate::text::FontRasterizer;

const NO_ROMS_MESSAGE: &str = "No ROM files found in games directory. Please add some .nes files.";

struct App {
    // Declared before `shell`: cached textures must drop before the device.
    session: ListSession<GpuTexture>,
    shell: WindowShell,
}

impl App {
    fn fail(&mut self, message: &str) -> ExitCode {
        tracing::error!(message, "startup failed");
        self.session.show_error(&mut self.shell, message);
        ExitCode::FAILURE
    }

    fn browse(&mut self, items: &[ListItem], roms: &[std::path::PathBuf], launcher: &EmulatorLauncher) {
        while let Some(index) = self.session.display_list(&mut self.shell, items) {
            let Some(rom) = roms.get(index) else {
                continue;
            };
            if let Err(e) = launcher.launch(rom) {
                tracing::warn!(rom = %rom.display(), error = %e, "launch failed");
                self.session
                    .show_error(&mut self.shell, &format!("Failed to launch game: {e}"));
            }
        }
    }
}

pub fn run(config: ResolvedConfig) -> anyhow::Result<ExitCode> {
    let fonts = FontRasterizer::load(&config.font_path, &config.assets_dir, config.font_size)
        .context("Failed to load font")?;

    let shell = WindowShell::open(ShellOptions {
        title: config.window_title.clone(),
        width: config.window_width,
        height: config.window_height,
    })
    .context("Failed to initialize UI")?;

    let options = SessionOptions {
        link_label: config.link_label.clone(),
        frame_interval: config.frame_interval,
        ..SessionOptions::default()
    };
    let session = ListSession::new(
        Box::new(fonts),
        Box::new(FileDecoder::new(&config.assets_dir)),
        Box::new(SystemOpener),
        options,
    );
    let mut app = App { session, shell };

    let launcher = match EmulatorLauncher::new(config.emulator.clone()) {
        Ok(launcher) => launcher,
        Err(e) => return Ok(app.fail(&format!("Failed to initialize emulator: {e}"))),
    };

    let roms = match scan_for_roms(&config.games_dir) {
        Ok(roms) => roms,
        Err(e) => {
            let message = format!("Failed to read games directory {}: {e}", config.games_dir.display());
            return Ok(app.fail(&message));
        }
    };
    if roms.is_empty() {
        return Ok(app.fail(NO_ROMS_MESSAGE));
    }

    let items = MetadataStore::new(&config.metadata_dir, &config.assets_dir).list_items(&roms);
    tracing::info!(count = items.len(), dir = %config.games_dir.display(), "library loaded");

    app.browse(&items, &roms, &launcher);

    tracing::info!("launcher closed");
    Ok(ExitCode::SUCCESS)
}
